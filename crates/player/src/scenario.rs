//! Canned style timelines for the player.

use clap::ValueEnum;
use common::error::EngineResult;
use common::Color;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use style::animations::{
    AnimationDescriptor, AnimationDirection, IterationCount, Keyframe, KeyframeList, TimingFunction,
};
use style::computed::{ComputedStyle, SizeValue};
use style::properties::PropertyId;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioKind {
    /// Opacity transition from visible to hidden.
    #[default]
    Fade,
    /// Position and background transitions.
    Slide,
    /// Alternating keyframe animation.
    Pulse,
    /// A keyframe animation takes over a running transition.
    Override,
}

/// A target style that takes effect at `at` seconds.
#[derive(Clone, Debug)]
pub struct StyleChange {
    pub at: f64,
    pub style: Arc<ComputedStyle>,
}

#[derive(Clone, Debug)]
pub struct Scenario {
    pub kind: ScenarioKind,
    pub initial: Arc<ComputedStyle>,
    /// Ordered by `at`.
    pub changes: Vec<StyleChange>,
}

fn at(at: f64, style: ComputedStyle) -> StyleChange {
    StyleChange {
        at,
        style: Arc::new(style),
    }
}

impl Scenario {
    pub fn build(kind: ScenarioKind, duration: Duration) -> EngineResult<Self> {
        let secs = duration.as_secs_f64();
        let scenario = match kind {
            ScenarioKind::Fade => {
                let transitions = vec![AnimationDescriptor::transition(PropertyId::Opacity, duration)];
                let initial = ComputedStyle {
                    transitions: transitions.clone(),
                    ..ComputedStyle::default()
                };
                let hidden = ComputedStyle {
                    opacity: 0.0,
                    transitions,
                    ..ComputedStyle::default()
                };
                Scenario {
                    kind,
                    initial: Arc::new(initial),
                    changes: vec![at(0.0, hidden)],
                }
            }
            ScenarioKind::Slide => {
                let transitions = vec![
                    AnimationDescriptor::transition(PropertyId::Left, duration)
                        .with_timing_function(TimingFunction::EASE_IN_OUT),
                    AnimationDescriptor::transition(PropertyId::BackgroundColor, duration)
                        .with_timing_function(TimingFunction::Linear),
                ];
                let initial = ComputedStyle {
                    left: SizeValue::Length(0.0),
                    background_color: Color::WHITE,
                    transitions: transitions.clone(),
                    ..ComputedStyle::default()
                };
                let moved = ComputedStyle {
                    left: SizeValue::Length(200.0),
                    background_color: Color::BLUE,
                    transitions,
                    ..ComputedStyle::default()
                };
                Scenario {
                    kind,
                    initial: Arc::new(initial),
                    changes: vec![at(0.0, moved)],
                }
            }
            ScenarioKind::Pulse => {
                let frame = |offset: f64, opacity: f32, color: Color| {
                    Keyframe::new(
                        offset,
                        ComputedStyle {
                            opacity,
                            background_color: color,
                            ..ComputedStyle::default()
                        },
                    )
                };
                let list = KeyframeList::new(
                    "pulse",
                    vec![
                        frame(0.0, 1.0, Color::WHITE),
                        frame(0.5, 0.3, Color::RED),
                        frame(1.0, 1.0, Color::WHITE),
                    ],
                    [PropertyId::Opacity, PropertyId::BackgroundColor],
                )?;
                let initial = ComputedStyle {
                    animations: vec![AnimationDescriptor::keyframes(Arc::new(list), duration)
                        .with_iterations(IterationCount::Count(3))
                        .with_direction(AnimationDirection::Alternate)],
                    ..ComputedStyle::default()
                };
                Scenario {
                    kind,
                    initial: Arc::new(initial),
                    changes: Vec::new(),
                }
            }
            ScenarioKind::Override => {
                let transitions = vec![AnimationDescriptor::transition(PropertyId::Left, duration * 2)
                    .with_timing_function(TimingFunction::Linear)];
                let initial = ComputedStyle {
                    left: SizeValue::Length(0.0),
                    transitions: transitions.clone(),
                    ..ComputedStyle::default()
                };
                let moved = ComputedStyle {
                    left: SizeValue::Length(200.0),
                    transitions,
                    ..ComputedStyle::default()
                };
                let nudge = KeyframeList::new(
                    "nudge",
                    vec![
                        Keyframe::new(0.0, ComputedStyle { left: SizeValue::Length(0.0), ..ComputedStyle::default() }),
                        Keyframe::new(1.0, ComputedStyle { left: SizeValue::Length(50.0), ..ComputedStyle::default() }),
                    ],
                    [PropertyId::Left],
                )?;
                let nudged = ComputedStyle {
                    animations: vec![AnimationDescriptor::keyframes(Arc::new(nudge), duration)
                        .with_timing_function(TimingFunction::Linear)],
                    ..moved.clone()
                };
                Scenario {
                    kind,
                    initial: Arc::new(initial),
                    changes: vec![at(0.0, moved), at(secs / 2.0, nudged)],
                }
            }
        };
        Ok(scenario)
    }

    /// Time by which every change has been applied and has had a chance to
    /// run to completion.
    pub fn nominal_length(&self, duration: Duration) -> f64 {
        let last_change = self.changes.last().map_or(0.0, |c| c.at);
        let secs = duration.as_secs_f64();
        match self.kind {
            ScenarioKind::Fade | ScenarioKind::Slide => last_change + secs,
            ScenarioKind::Pulse => secs * 3.0,
            ScenarioKind::Override => last_change + secs * 3.0,
        }
    }
}
