//! Transition and keyframe animation descriptors.
//!
//! These are produced by the cascade and consumed, read-only, by the
//! animation engine.

use crate::computed::ComputedStyle;
use crate::properties::{PropertyId, TransitionProperty};
use common::error::{EngineError, EngineResult};
use indexmap::IndexSet;
use ordered_float::OrderedFloat;
use std::sync::Arc;
use std::time::Duration;

/// Timing function applied to the fractional position within an iteration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TimingFunction {
    Linear,
    CubicBezier { x1: f64, y1: f64, x2: f64, y2: f64 },
}

impl TimingFunction {
    pub const EASE: TimingFunction = TimingFunction::CubicBezier { x1: 0.25, y1: 0.1, x2: 0.25, y2: 1.0 };
    pub const EASE_IN: TimingFunction = TimingFunction::CubicBezier { x1: 0.42, y1: 0.0, x2: 1.0, y2: 1.0 };
    pub const EASE_OUT: TimingFunction = TimingFunction::CubicBezier { x1: 0.0, y1: 0.0, x2: 0.58, y2: 1.0 };
    pub const EASE_IN_OUT: TimingFunction = TimingFunction::CubicBezier { x1: 0.42, y1: 0.0, x2: 0.58, y2: 1.0 };

    /// Build a cubic-bezier timing function. X control points must lie in `[0, 1]`.
    pub fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64) -> EngineResult<Self> {
        if ![x1, y1, x2, y2].iter().all(|v| v.is_finite()) {
            return Err(EngineError::timing("control points must be finite"));
        }
        if !(0.0..=1.0).contains(&x1) || !(0.0..=1.0).contains(&x2) {
            return Err(EngineError::timing(format!(
                "x control points out of range: {x1}, {x2}"
            )));
        }
        Ok(TimingFunction::CubicBezier { x1, y1, x2, y2 })
    }

    /// Look up a keyword (`linear`, `ease`, `ease-in`, `ease-out`, `ease-in-out`).
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "linear" => Some(TimingFunction::Linear),
            "ease" => Some(TimingFunction::EASE),
            "ease-in" => Some(TimingFunction::EASE_IN),
            "ease-out" => Some(TimingFunction::EASE_OUT),
            "ease-in-out" => Some(TimingFunction::EASE_IN_OUT),
            _ => None,
        }
    }
}

impl Default for TimingFunction {
    fn default() -> Self {
        TimingFunction::EASE
    }
}

/// Iteration count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IterationCount {
    Count(u32),
    Infinite,
}

impl IterationCount {
    pub fn is_zero(&self) -> bool {
        matches!(self, IterationCount::Count(0))
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, IterationCount::Infinite)
    }
}

impl Default for IterationCount {
    fn default() -> Self {
        IterationCount::Count(1)
    }
}

/// Direction of successive iterations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AnimationDirection {
    #[default]
    Normal,
    /// Odd iterations run backwards.
    Alternate,
}

/// Play state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlayState {
    #[default]
    Running,
    Paused,
}

/// One keyframe: a style snapshot at an offset in `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Keyframe {
    pub offset: f64,
    pub style: Arc<ComputedStyle>,
}

impl Keyframe {
    pub fn new(offset: f64, style: impl Into<Arc<ComputedStyle>>) -> Self {
        Self {
            offset,
            style: style.into(),
        }
    }
}

/// A named, sorted list of keyframes and the properties they declare.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyframeList {
    name: String,
    frames: Vec<Keyframe>,
    properties: IndexSet<PropertyId>,
}

impl KeyframeList {
    /// Build a keyframe list. Frames are sorted by offset; the sort is stable
    /// so duplicate offsets keep declaration order.
    pub fn new(
        name: impl Into<String>,
        mut frames: Vec<Keyframe>,
        properties: impl IntoIterator<Item = PropertyId>,
    ) -> EngineResult<Self> {
        let name = name.into();
        if let Some(bad) = frames
            .iter()
            .find(|f| !f.offset.is_finite() || !(0.0..=1.0).contains(&f.offset))
        {
            return Err(EngineError::keyframes(format!(
                "{name}: offset {} out of range",
                bad.offset
            )));
        }
        frames.sort_by_key(|f| OrderedFloat(f.offset));
        Ok(Self {
            name,
            frames,
            properties: properties.into_iter().collect(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frames(&self) -> &[Keyframe] {
        &self.frames
    }

    pub fn properties(&self) -> &IndexSet<PropertyId> {
        &self.properties
    }

    pub fn contains_property(&self, property: PropertyId) -> bool {
        self.properties.contains(&property)
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }
}

/// Configuration of one transition or keyframe animation.
///
/// Transitions use `property`; keyframe animations use `name` and
/// `keyframes`.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationDescriptor {
    pub name: String,
    pub property: TransitionProperty,
    pub duration: Duration,
    pub delay: Duration,
    pub iteration_count: IterationCount,
    pub direction: AnimationDirection,
    pub timing_function: TimingFunction,
    pub play_state: PlayState,
    pub keyframes: Option<Arc<KeyframeList>>,
}

impl AnimationDescriptor {
    /// A transition on `property`.
    pub fn transition(property: impl Into<TransitionProperty>, duration: Duration) -> Self {
        Self {
            name: String::new(),
            property: property.into(),
            duration,
            delay: Duration::ZERO,
            iteration_count: IterationCount::default(),
            direction: AnimationDirection::Normal,
            timing_function: TimingFunction::default(),
            play_state: PlayState::Running,
            keyframes: None,
        }
    }

    /// A keyframe animation running `keyframes`.
    pub fn keyframes(keyframes: Arc<KeyframeList>, duration: Duration) -> Self {
        Self {
            name: keyframes.name().to_string(),
            property: TransitionProperty::All,
            keyframes: Some(keyframes),
            ..Self::transition(TransitionProperty::All, duration)
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_iterations(mut self, iteration_count: IterationCount) -> Self {
        self.iteration_count = iteration_count;
        self
    }

    pub fn with_direction(mut self, direction: AnimationDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_timing_function(mut self, timing_function: TimingFunction) -> Self {
        self.timing_function = timing_function;
        self
    }

    pub fn with_play_state(mut self, play_state: PlayState) -> Self {
        self.play_state = play_state;
        self
    }

    #[inline]
    pub fn duration_secs(&self) -> f64 {
        self.duration.as_secs_f64()
    }

    #[inline]
    pub fn delay_secs(&self) -> f64 {
        self.delay.as_secs_f64()
    }

    /// Whether this descriptor can never produce visible output: zero
    /// duration and delay, or zero iterations.
    pub fn is_degenerate(&self) -> bool {
        (self.duration.is_zero() && self.delay.is_zero()) || self.iteration_count.is_zero()
    }

    /// Whether a keyframe descriptor has a name and at least one keyframe.
    pub fn has_keyframes(&self) -> bool {
        !self.name.is_empty() && self.keyframes.as_ref().is_some_and(|k| !k.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(offset: f64, opacity: f32) -> Keyframe {
        Keyframe::new(
            offset,
            ComputedStyle {
                opacity,
                ..ComputedStyle::default()
            },
        )
    }

    #[test]
    fn test_keyframes_sorted() {
        let list = KeyframeList::new(
            "fade",
            vec![frame(1.0, 1.0), frame(0.0, 0.0), frame(0.5, 0.2)],
            [PropertyId::Opacity],
        )
        .unwrap();
        let offsets: Vec<f64> = list.frames().iter().map(|f| f.offset).collect();
        assert_eq!(offsets, vec![0.0, 0.5, 1.0]);
        assert!(list.contains_property(PropertyId::Opacity));
        assert!(!list.contains_property(PropertyId::Left));
    }

    #[test]
    fn test_keyframes_reject_bad_offset() {
        let result = KeyframeList::new("bad", vec![frame(1.5, 0.0)], [PropertyId::Opacity]);
        assert!(matches!(result, Err(EngineError::InvalidKeyframes(_))));
        let result = KeyframeList::new("nan", vec![frame(f64::NAN, 0.0)], Vec::<PropertyId>::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_cubic_bezier_validation() {
        assert!(TimingFunction::cubic_bezier(0.1, -2.0, 0.9, 3.0).is_ok());
        assert!(TimingFunction::cubic_bezier(1.2, 0.0, 0.5, 1.0).is_err());
        assert!(TimingFunction::cubic_bezier(0.2, f64::INFINITY, 0.5, 1.0).is_err());
        assert_eq!(TimingFunction::from_keyword("EASE-IN"), Some(TimingFunction::EASE_IN));
    }

    #[test]
    fn test_degenerate_descriptors() {
        let t = AnimationDescriptor::transition(PropertyId::Left, Duration::ZERO);
        assert!(t.is_degenerate());
        let t = t.with_delay(Duration::from_millis(10));
        assert!(!t.is_degenerate());
        let t = t.with_iterations(IterationCount::Count(0));
        assert!(t.is_degenerate());
    }

    #[test]
    fn test_keyframe_descriptor() {
        let list = Arc::new(KeyframeList::new("pulse", vec![], Vec::<PropertyId>::new()).unwrap());
        let d = AnimationDescriptor::keyframes(list, Duration::from_secs(1));
        assert_eq!(d.name, "pulse");
        assert!(!d.has_keyframes());
    }
}
