//! Frame loop driving one element through a scenario.

use crate::host::PlayerHost;
use crate::scenario::{Scenario, ScenarioKind, StyleChange};
use animation::{AnimationConfig, AnimationController, Clock, ElementId, ManualClock, SystemClock};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use style::computed::ComputedStyle;
use tracing::{debug, info};

const ELEMENT: ElementId = ElementId(1);

/// Rendered values of one frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FrameSample {
    pub time: f64,
    pub opacity: f32,
    pub left: f32,
    pub background: String,
}

impl FrameSample {
    fn capture(time: f64, style: &ComputedStyle) -> Self {
        Self {
            time,
            opacity: style.opacity,
            left: style.left.resolve(0.0),
            background: style.background_color.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EventRecord {
    pub time: f64,
    pub kind: String,
    pub name: String,
    pub elapsed_time: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    pub scenario: ScenarioKind,
    pub frames: Vec<FrameSample>,
    pub events: Vec<EventRecord>,
    pub effects_started: usize,
    pub effects_finished: usize,
}

/// One element, its host, and the controller animating it.
pub struct Player {
    controller: AnimationController,
    host: PlayerHost,
    rendered: Arc<ComputedStyle>,
    target: Arc<ComputedStyle>,
    changes: VecDeque<StyleChange>,
    report: RunReport,
}

impl Player {
    pub fn new(scenario: Scenario, config: AnimationConfig, clock: Box<dyn Clock>) -> Self {
        Self {
            controller: AnimationController::with_clock(config, clock),
            host: PlayerHost::new(true),
            rendered: scenario.initial.clone(),
            target: scenario.initial,
            changes: scenario.changes.into(),
            report: RunReport {
                scenario: scenario.kind,
                frames: Vec::new(),
                events: Vec::new(),
                effects_started: 0,
                effects_finished: 0,
            },
        }
    }

    /// Render one frame at the controller's current time.
    pub fn step(&mut self) -> &FrameSample {
        let now = self.controller.now();
        self.controller.drain_due_timers(&mut self.host);

        while self.changes.front().is_some_and(|c| c.at <= now) {
            if let Some(change) = self.changes.pop_front() {
                debug!(at = change.at, "target style changed");
                self.target = change.style;
            }
        }

        let rendered = self
            .controller
            .reconcile(&mut self.host, ELEMENT, Some(&self.rendered), &self.target);
        self.rendered = rendered;
        self.controller.drain_due_timers(&mut self.host);
        self.controller.style_committed(&mut self.host);
        self.controller.drain_due_timers(&mut self.host);
        self.host.take_recompute();
        self.controller.cleanup_finished_animations();

        for event in self.host.take_events() {
            self.report.events.push(EventRecord {
                time: now,
                kind: event.kind.to_string(),
                name: event.name,
                elapsed_time: event.elapsed_time,
            });
        }

        let index = self.report.frames.len();
        self.report.frames.push(FrameSample::capture(now, &self.rendered));
        &self.report.frames[index]
    }

    /// No pending style changes and no scheduled timers.
    pub fn is_settled(&self) -> bool {
        self.changes.is_empty() && self.controller.next_timer_deadline().is_none()
    }

    pub fn finish(mut self) -> RunReport {
        self.report.effects_started = self.host.started();
        self.report.effects_finished = self.host.finished();
        info!(
            frames = self.report.frames.len(),
            events = self.report.events.len(),
            "run finished"
        );
        self.report
    }
}

/// Step through `scenario` on a virtual clock.
pub fn run_simulated(scenario: Scenario, config: AnimationConfig, frame: Duration, limit: f64) -> RunReport {
    let clock = ManualClock::new();
    let mut player = Player::new(scenario, config, Box::new(clock.clone()));
    let frame = frame.as_secs_f64();
    let mut index: u32 = 0;
    loop {
        let now = f64::from(index) * frame;
        clock.set(now);
        player.step();
        if now >= limit && player.is_settled() {
            break;
        }
        // Hard stop well past the nominal end.
        if now >= limit * 4.0 + 1.0 {
            break;
        }
        index += 1;
    }
    player.finish()
}

/// Play `scenario` against the wall clock, one frame per tick.
pub async fn run_realtime(scenario: Scenario, config: AnimationConfig, frame: Duration, limit: f64) -> RunReport {
    let mut player = Player::new(scenario, config, Box::new(SystemClock::new()));
    let mut ticker = tokio::time::interval(frame);
    loop {
        ticker.tick().await;
        let now = player.step().time;
        if (now >= limit && player.is_settled()) || now >= limit * 4.0 + 1.0 {
            break;
        }
    }
    player.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(kind: ScenarioKind, config: AnimationConfig) -> RunReport {
        let duration = Duration::from_secs(1);
        let scenario = Scenario::build(kind, duration).unwrap();
        let limit = scenario.nominal_length(duration);
        run_simulated(scenario, config, Duration::from_millis(50), limit)
    }

    fn kinds(report: &RunReport) -> Vec<&str> {
        report.events.iter().map(|e| e.kind.as_str()).collect()
    }

    #[test]
    fn test_fade_reaches_target() {
        let report = run(ScenarioKind::Fade, AnimationConfig::default());
        let first = &report.frames[0];
        assert!(first.opacity > 0.99);
        let last = report.frames.last().unwrap();
        assert_eq!(last.opacity, 0.0);
        assert_eq!(kinds(&report), vec!["transitionend"]);
        assert_eq!(report.events[0].name, "opacity");
        assert!(report.effects_finished >= 1);
    }

    #[test]
    fn test_slide_is_monotonic() {
        let report = run(ScenarioKind::Slide, AnimationConfig::software_only());
        let lefts: Vec<f32> = report.frames.iter().map(|f| f.left).collect();
        assert!(lefts.windows(2).all(|w| w[0] <= w[1] + 1e-3));
        assert_eq!(lefts.last().copied(), Some(200.0));
        assert_eq!(report.frames.last().map(|f| f.background.as_str()), Some("#0000ff"));
        assert_eq!(kinds(&report), vec!["transitionend", "transitionend"]);
    }

    #[test]
    fn test_pulse_events() {
        let report = run(ScenarioKind::Pulse, AnimationConfig::default());
        assert_eq!(
            kinds(&report),
            vec!["animationstart", "animationiteration", "animationiteration", "animationend"]
        );
        let dimmest = report.frames.iter().map(|f| f.opacity).fold(1.0_f32, f32::min);
        assert!(dimmest < 0.35);
    }

    #[test]
    fn test_override_pauses_transition() {
        let report = run(ScenarioKind::Override, AnimationConfig::software_only());
        assert!(kinds(&report).contains(&"animationend"));
        let last = report.frames.last().unwrap();
        assert_eq!(last.left, 200.0);
    }
}
