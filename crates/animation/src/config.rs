//! Engine configuration.

use smallvec::{smallvec, SmallVec};
use std::time::Duration;
use style::properties::PropertyId;

/// Animation engine configuration.
#[derive(Clone, Debug)]
pub struct AnimationConfig {
    /// Period of the shared timer that drives software animations.
    pub software_timer_interval: Duration,
    /// Properties whose effects are handed to the compositor.
    pub accelerated_properties: SmallVec<[PropertyId; 2]>,
    /// Upper bound on timer batches processed by one `drain_due_timers` call.
    pub max_timer_rounds: usize,
}

impl AnimationConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// A configuration where every property animates in software.
    pub fn software_only() -> Self {
        Self {
            accelerated_properties: SmallVec::new(),
            ..Self::default()
        }
    }

    /// Set the software timer period.
    pub fn with_software_timer_interval(mut self, interval: Duration) -> Self {
        self.software_timer_interval = interval;
        self
    }

    /// Set which properties are animated on the compositor.
    pub fn with_accelerated_properties(mut self, properties: impl IntoIterator<Item = PropertyId>) -> Self {
        self.accelerated_properties = properties.into_iter().collect();
        self
    }

    /// Set the timer batch bound.
    pub fn with_max_timer_rounds(mut self, rounds: usize) -> Self {
        self.max_timer_rounds = rounds.max(1);
        self
    }

    pub fn is_accelerated(&self, property: PropertyId) -> bool {
        self.accelerated_properties.contains(&property)
    }

    pub(crate) fn software_timer_secs(&self) -> f64 {
        self.software_timer_interval.as_secs_f64()
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            software_timer_interval: Duration::from_millis(25),
            accelerated_properties: smallvec![PropertyId::Opacity, PropertyId::Transform],
            max_timer_rounds: 64,
        }
    }
}
