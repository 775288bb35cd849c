//! Public entry point of the animation engine.

use crate::clock::{Clock, SystemClock};
use crate::composite::CompositeAnimation;
use crate::config::AnimationConfig;
use crate::host::{AnimationHost, DocumentId, ElementId};
use crate::registry::AnimationRegistry;
use crate::wrappers::PropertyWrapperTable;
use std::sync::Arc;
use style::computed::ComputedStyle;
use style::properties::{PropertyId, TransitionProperty};
use tracing::{debug, warn};

/// Runs CSS transitions and keyframe animations for a set of elements.
///
/// The host feeds style changes through [`reconcile`](Self::reconcile),
/// commits through [`style_committed`](Self::style_committed), and calls
/// [`service_timers`](Self::service_timers) whenever
/// [`next_timer_deadline`](Self::next_timer_deadline) passes.
pub struct AnimationController {
    registry: AnimationRegistry,
    clock: Box<dyn Clock>,
}

impl AnimationController {
    pub fn new(config: AnimationConfig) -> Self {
        Self::with_clock(config, Box::new(SystemClock::new()))
    }

    pub fn with_clock(config: AnimationConfig, clock: Box<dyn Clock>) -> Self {
        let wrappers = Arc::new(PropertyWrapperTable::new(&config));
        Self::with_wrappers(config, wrappers, clock)
    }

    /// Share a property table between controllers.
    pub fn with_wrappers(config: AnimationConfig, wrappers: Arc<PropertyWrapperTable>, clock: Box<dyn Clock>) -> Self {
        debug!(
            properties = wrappers.len(),
            accelerated = config.accelerated_properties.len(),
            "animation controller created"
        );
        Self {
            registry: AnimationRegistry::new(config, wrappers),
            clock,
        }
    }

    pub fn config(&self) -> &AnimationConfig {
        self.registry.config()
    }

    pub fn wrappers(&self) -> &PropertyWrapperTable {
        self.registry.wrappers()
    }

    /// Current engine time in seconds.
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Compute the style to render for `element`, given its previous style
    /// and the newly computed target.
    pub fn reconcile(
        &mut self,
        host: &mut dyn AnimationHost,
        element: ElementId,
        current: Option<&Arc<ComputedStyle>>,
        target: &Arc<ComputedStyle>,
    ) -> Arc<ComputedStyle> {
        let now = self.clock.now();
        self.registry.reconcile(host, now, element, current, target)
    }

    /// Stop everything on `element`, e.g. when it leaves the tree.
    pub fn cancel_all(&mut self, host: &mut dyn AnimationHost, element: ElementId) {
        let now = self.clock.now();
        self.registry.cancel_all(host, now, element);
    }

    /// Freeze every animation in `document`.
    pub fn suspend(&mut self, host: &mut dyn AnimationHost, document: DocumentId) {
        let now = self.clock.now();
        self.registry.suspend(host, now, document);
    }

    pub fn resume(&mut self, host: &mut dyn AnimationHost, document: DocumentId) {
        let now = self.clock.now();
        self.registry.resume(host, now, document);
    }

    pub fn is_suspended(&self, document: DocumentId) -> bool {
        self.registry.is_document_suspended(document)
    }

    /// Styles from the last recompute have been applied; pending starts may
    /// proceed.
    pub fn style_committed(&mut self, host: &mut dyn AnimationHost) {
        let now = self.clock.now();
        self.registry.style_committed(host, now);
    }

    /// Report the start time of keyframe animations the element deferred.
    pub fn set_animation_start_time(&mut self, host: &mut dyn AnimationHost, element: ElementId, time: f64) {
        let now = self.clock.now();
        self.registry.set_animation_start_time(host, now, element, time);
    }

    /// Report the start time of a transition the element deferred.
    pub fn set_transition_start_time(
        &mut self,
        host: &mut dyn AnimationHost,
        element: ElementId,
        property: TransitionProperty,
        time: f64,
    ) {
        let now = self.clock.now();
        self.registry
            .set_transition_start_time(host, now, element, property, time);
    }

    pub fn is_animating_property(&self, element: ElementId, property: PropertyId) -> bool {
        self.registry.is_animating_property(element, property)
    }

    pub fn has_animations(&self) -> bool {
        self.registry.has_animations()
    }

    pub fn composite(&self, element: ElementId) -> Option<&CompositeAnimation> {
        self.registry.composite(element)
    }

    /// When the next timer is due, in engine seconds.
    pub fn next_timer_deadline(&self) -> Option<f64> {
        self.registry.next_timer_deadline()
    }

    /// Fire the timers due now. Returns how many fired.
    pub fn service_timers(&mut self, host: &mut dyn AnimationHost) -> usize {
        let now = self.clock.now();
        self.registry.service_timers(host, now)
    }

    /// Service timers until none are due, including zero-delay timers
    /// started along the way. Bounded by `max_timer_rounds`.
    pub fn drain_due_timers(&mut self, host: &mut dyn AnimationHost) -> usize {
        let rounds = self.registry.config().max_timer_rounds;
        let mut total = 0;
        for _ in 0..rounds {
            let fired = self.service_timers(host);
            if fired == 0 {
                return total;
            }
            total += fired;
        }
        warn!(rounds, "timer rounds exhausted");
        total
    }

    /// Drop finished animations that owe no events.
    pub fn cleanup_finished_animations(&mut self) -> usize {
        self.registry.cleanup_finished()
    }
}

impl Default for AnimationController {
    fn default() -> Self {
        Self::new(AnimationConfig::default())
    }
}

impl std::fmt::Debug for AnimationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationController")
            .field("now", &self.clock.now())
            .field("has_animations", &self.has_animations())
            .finish()
    }
}
