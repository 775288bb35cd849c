//! CSS transitions and keyframe animations.
//!
//! The engine sits between style computation and rendering. For each
//! element it keeps a [`CompositeAnimation`] holding the running
//! transitions and keyframe animations, and folds their current values into
//! the element's target style:
//! - transitions between old and new computed values
//! - keyframe animations with iterations, alternation and play state
//! - hand-off of accelerated properties to the element
//!
//! Time is virtual. The host drives it through [`AnimationController`],
//! which reads a [`Clock`] and fires timers when asked.

pub mod bezier;
pub mod blend;
pub mod clock;
pub mod composite;
pub mod config;
pub mod controller;
pub mod events;
pub mod host;
pub mod instance;
pub mod keyframe;
pub mod registry;
pub mod timer;
pub mod transition;
pub mod wrappers;

pub use bezier::UnitBezier;
pub use blend::Blend;
pub use clock::{Clock, ManualClock, SystemClock};
pub use composite::CompositeAnimation;
pub use config::AnimationConfig;
pub use controller::AnimationController;
pub use events::{AnimationEvent, AnimationEventKind};
pub use host::{AnimationHost, DocumentId, ElementId, EventQueue};
pub use instance::{Animation, AnimationKind, AnimationState, InstanceId};
pub use keyframe::KeyframeData;
pub use registry::CompositeKey;
pub use transition::TransitionData;
pub use wrappers::{PropertyWrapper, PropertyWrapperTable};
