//! Interfaces the engine consumes from its surroundings.
//!
//! The host owns render elements, the event queue and the style
//! recomputation pass. The engine talks to it in two phases: while it is
//! advancing state machines it only asks questions and requests the start of
//! effects; everything else it wants to tell the host is collected as
//! [`HostEffect`]s and delivered once its own collections are consistent.

use crate::events::{AnimationEvent, AnimationEventKind};
use style::computed::ComputedStyle;
use style::properties::TransitionProperty;

/// Stable identifier of a render element, chosen by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

/// Identifier of the document an element belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DocumentId(pub u64);

/// Sink for DOM events. The engine never dispatches events itself.
pub trait EventQueue {
    fn enqueue_animation_event(&mut self, event: AnimationEvent);
}

/// Everything the engine needs from render elements and the page.
pub trait AnimationHost: EventQueue {
    /// Document that owns `element`.
    fn document_of(&self, element: ElementId) -> DocumentId;

    /// Whether anything listens for `kind` on `element`. Without a
    /// listener, effects finish synchronously instead of waiting on the
    /// deferred event.
    fn has_event_listener(&self, element: ElementId, kind: AnimationEventKind) -> bool;

    /// Hand a transition to the element. Return `true` if the element will
    /// report the start time later through `set_transition_start_time`.
    fn begin_transition(
        &mut self,
        element: ElementId,
        start_time: Option<f64>,
        property: TransitionProperty,
        from: &ComputedStyle,
        to: &ComputedStyle,
    ) -> bool;

    /// Hand a keyframe animation to the element. Return `true` if the
    /// element will report the start time later through
    /// `set_animation_start_time`.
    fn begin_keyframe_animation(&mut self, element: ElementId, start_time: Option<f64>, index: usize) -> bool;

    fn transition_finished(&mut self, element: ElementId, property: TransitionProperty);

    fn animation_finished(&mut self, element: ElementId, name: &str, index: usize, reset: bool);

    /// Mark the element's style dirty.
    fn set_needs_style_recalc(&mut self, element: ElementId);

    /// Ask for a style recomputation pass soon. Requests between passes
    /// coalesce.
    fn request_style_recompute(&mut self);

    fn suspend_element_animations(&mut self, _element: ElementId) {}

    fn resume_element_animations(&mut self, _element: ElementId) {}
}

/// A notification held back until the engine has finished mutating.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum HostEffect {
    Event(AnimationEvent),
    TransitionFinished {
        element: ElementId,
        property: TransitionProperty,
    },
    AnimationFinished {
        element: ElementId,
        name: String,
        index: usize,
        reset: bool,
    },
    NeedsStyleRecalc(ElementId),
    RequestStyleRecompute,
    SuspendElement(ElementId),
    ResumeElement(ElementId),
}

/// Deliver collected effects in order. Recompute requests collapse into one.
pub(crate) fn flush_effects(host: &mut dyn AnimationHost, effects: Vec<HostEffect>) {
    let mut recompute = false;
    for effect in effects {
        match effect {
            HostEffect::Event(event) => host.enqueue_animation_event(event),
            HostEffect::TransitionFinished { element, property } => {
                host.transition_finished(element, property)
            }
            HostEffect::AnimationFinished {
                element,
                name,
                index,
                reset,
            } => host.animation_finished(element, &name, index, reset),
            HostEffect::NeedsStyleRecalc(element) => host.set_needs_style_recalc(element),
            HostEffect::RequestStyleRecompute => recompute = true,
            HostEffect::SuspendElement(element) => host.suspend_element_animations(element),
            HostEffect::ResumeElement(element) => host.resume_element_animations(element),
        }
    }
    if recompute {
        host.request_style_recompute();
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashSet;

    /// A host that records every call.
    #[derive(Debug, Default)]
    pub struct RecordingHost {
        pub listeners: HashSet<(ElementId, AnimationEventKind)>,
        pub defer_start_times: bool,
        pub events: Vec<AnimationEvent>,
        pub began_transitions: Vec<(ElementId, TransitionProperty, Option<f64>)>,
        pub began_animations: Vec<(ElementId, usize, Option<f64>)>,
        pub finished_transitions: Vec<(ElementId, TransitionProperty)>,
        pub finished_animations: Vec<(ElementId, String, usize, bool)>,
        pub dirty: Vec<ElementId>,
        pub recompute_requests: usize,
        pub suspended: Vec<ElementId>,
        pub resumed: Vec<ElementId>,
    }

    impl RecordingHost {
        pub fn listen(&mut self, element: ElementId, kind: AnimationEventKind) {
            self.listeners.insert((element, kind));
        }

        pub fn event_kinds(&self) -> Vec<AnimationEventKind> {
            self.events.iter().map(|e| e.kind).collect()
        }
    }

    impl EventQueue for RecordingHost {
        fn enqueue_animation_event(&mut self, event: AnimationEvent) {
            self.events.push(event);
        }
    }

    impl AnimationHost for RecordingHost {
        fn document_of(&self, _element: ElementId) -> DocumentId {
            DocumentId(1)
        }

        fn has_event_listener(&self, element: ElementId, kind: AnimationEventKind) -> bool {
            self.listeners.contains(&(element, kind))
        }

        fn begin_transition(
            &mut self,
            element: ElementId,
            start_time: Option<f64>,
            property: TransitionProperty,
            _from: &ComputedStyle,
            _to: &ComputedStyle,
        ) -> bool {
            self.began_transitions.push((element, property, start_time));
            self.defer_start_times
        }

        fn begin_keyframe_animation(&mut self, element: ElementId, start_time: Option<f64>, index: usize) -> bool {
            self.began_animations.push((element, index, start_time));
            self.defer_start_times
        }

        fn transition_finished(&mut self, element: ElementId, property: TransitionProperty) {
            self.finished_transitions.push((element, property));
        }

        fn animation_finished(&mut self, element: ElementId, name: &str, index: usize, reset: bool) {
            self.finished_animations.push((element, name.to_string(), index, reset));
        }

        fn set_needs_style_recalc(&mut self, element: ElementId) {
            self.dirty.push(element);
        }

        fn request_style_recompute(&mut self) {
            self.recompute_requests += 1;
        }

        fn suspend_element_animations(&mut self, element: ElementId) {
            self.suspended.push(element);
        }

        fn resume_element_animations(&mut self, element: ElementId) {
            self.resumed.push(element);
        }
    }
}
