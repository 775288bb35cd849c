//! Animation and transition events.

use std::fmt;
use std::str::FromStr;

use crate::host::ElementId;
use common::error::EngineError;
use style::properties::TransitionProperty;

/// The DOM event types the engine can ask to have queued.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimationEventKind {
    AnimationStart,
    AnimationIteration,
    AnimationEnd,
    TransitionEnd,
}

impl AnimationEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnimationEventKind::AnimationStart => "animationstart",
            AnimationEventKind::AnimationIteration => "animationiteration",
            AnimationEventKind::AnimationEnd => "animationend",
            AnimationEventKind::TransitionEnd => "transitionend",
        }
    }

    /// Whether this event completes the effect that sent it.
    pub fn is_end(&self) -> bool {
        matches!(self, AnimationEventKind::AnimationEnd | AnimationEventKind::TransitionEnd)
    }
}

impl FromStr for AnimationEventKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "animationstart" => Ok(AnimationEventKind::AnimationStart),
            "animationiteration" => Ok(AnimationEventKind::AnimationIteration),
            "animationend" => Ok(AnimationEventKind::AnimationEnd),
            "transitionend" => Ok(AnimationEventKind::TransitionEnd),
            other => Err(EngineError::descriptor(format!("unknown event type {other}"))),
        }
    }
}

impl fmt::Display for AnimationEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event the engine asks the host to queue.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationEvent {
    pub kind: AnimationEventKind,
    pub element: ElementId,
    /// Animation name, or property name for `transitionend`.
    pub name: String,
    /// Seconds of active time when the event was generated.
    pub elapsed_time: f64,
}

/// An event decided during a state change and held by an instance until
/// its zero-delay dispatch timer fires.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PendingEvent {
    pub kind: AnimationEventKind,
    pub name: String,
    pub elapsed_time: f64,
    /// Transition target, for finishing the transition after `transitionend`.
    pub property: Option<TransitionProperty>,
    /// Keyframe animation position, for finishing after `animationend`.
    pub index: usize,
}

impl PendingEvent {
    pub fn into_event(self, element: ElementId) -> AnimationEvent {
        AnimationEvent {
            kind: self.kind,
            element,
            name: self.name,
            elapsed_time: self.elapsed_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(AnimationEventKind::TransitionEnd.as_str(), "transitionend");
        assert_eq!(
            "animationiteration".parse::<AnimationEventKind>().unwrap(),
            AnimationEventKind::AnimationIteration
        );
        assert!("click".parse::<AnimationEventKind>().is_err());
    }

    #[test]
    fn test_end_kinds() {
        assert!(AnimationEventKind::AnimationEnd.is_end());
        assert!(AnimationEventKind::TransitionEnd.is_end());
        assert!(!AnimationEventKind::AnimationStart.is_end());
    }

    #[test]
    fn test_pending_into_event() {
        let pending = PendingEvent {
            kind: AnimationEventKind::AnimationStart,
            name: "pulse".into(),
            elapsed_time: 0.0,
            property: None,
            index: 2,
        };
        let event = pending.into_event(ElementId(7));
        assert_eq!(event.element, ElementId(7));
        assert_eq!(event.name, "pulse");
    }
}
