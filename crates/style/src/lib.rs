//! Style snapshots and animation descriptors.
//!
//! This crate holds the values the cascade hands to the animation engine:
//! resolved [`ComputedStyle`] snapshots and the transition and keyframe
//! descriptors declared on them.

pub mod animations;
pub mod computed;
pub mod properties;

pub use animations::{
    AnimationDescriptor, AnimationDirection, IterationCount, Keyframe, KeyframeList, PlayState,
    TimingFunction,
};
pub use computed::ComputedStyle;
pub use properties::{PropertyId, TransitionProperty};
