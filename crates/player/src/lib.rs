//! Headless player for the animation engine.
//!
//! Drives a single element through a scripted sequence of style changes and
//! reports the rendered values and events frame by frame.

pub mod host;
pub mod runner;
pub mod scenario;

pub use host::PlayerHost;
pub use runner::{run_realtime, run_simulated, FrameSample, Player, RunReport};
pub use scenario::{Scenario, ScenarioKind};

/// Player version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
