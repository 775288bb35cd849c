//! A single-element host that logs what the engine asks of it.

use animation::{AnimationEvent, AnimationEventKind, AnimationHost, DocumentId, ElementId, EventQueue};
use style::computed::ComputedStyle;
use style::properties::TransitionProperty;
use tracing::debug;

/// The document every player element belongs to.
pub const DOCUMENT: DocumentId = DocumentId(1);

#[derive(Debug, Default)]
pub struct PlayerHost {
    listen: bool,
    events: Vec<AnimationEvent>,
    recompute_requested: bool,
    started: usize,
    finished: usize,
}

impl PlayerHost {
    /// A host with listeners for every animation event when `listen` is set.
    pub fn new(listen: bool) -> Self {
        Self {
            listen,
            ..Self::default()
        }
    }

    pub fn take_events(&mut self) -> Vec<AnimationEvent> {
        std::mem::take(&mut self.events)
    }

    /// Whether a recompute was requested since the last call.
    pub fn take_recompute(&mut self) -> bool {
        std::mem::replace(&mut self.recompute_requested, false)
    }

    /// Effects handed to the element so far.
    pub fn started(&self) -> usize {
        self.started
    }

    pub fn finished(&self) -> usize {
        self.finished
    }
}

impl EventQueue for PlayerHost {
    fn enqueue_animation_event(&mut self, event: AnimationEvent) {
        debug!(kind = %event.kind, name = %event.name, elapsed = event.elapsed_time, "event queued");
        self.events.push(event);
    }
}

impl AnimationHost for PlayerHost {
    fn document_of(&self, _element: ElementId) -> DocumentId {
        DOCUMENT
    }

    fn has_event_listener(&self, _element: ElementId, _kind: AnimationEventKind) -> bool {
        self.listen
    }

    fn begin_transition(
        &mut self,
        element: ElementId,
        start_time: Option<f64>,
        property: TransitionProperty,
        _from: &ComputedStyle,
        _to: &ComputedStyle,
    ) -> bool {
        debug!(element = element.0, %property, ?start_time, "begin transition");
        self.started += 1;
        false
    }

    fn begin_keyframe_animation(&mut self, element: ElementId, start_time: Option<f64>, index: usize) -> bool {
        debug!(element = element.0, index, ?start_time, "begin keyframe animation");
        self.started += 1;
        false
    }

    fn transition_finished(&mut self, element: ElementId, property: TransitionProperty) {
        debug!(element = element.0, %property, "transition finished");
        self.finished += 1;
    }

    fn animation_finished(&mut self, element: ElementId, name: &str, index: usize, reset: bool) {
        debug!(element = element.0, name, index, reset, "animation finished");
        self.finished += 1;
    }

    fn set_needs_style_recalc(&mut self, _element: ElementId) {}

    fn request_style_recompute(&mut self) {
        self.recompute_requested = true;
    }
}
