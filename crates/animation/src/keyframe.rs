//! Keyframe animations: a named, multi-stop effect declared by an
//! `animation` entry.

use crate::host::HostEffect;
use crate::instance::{Animation, AnimationContext, AnimationKind, CompositeRequest, InstanceId, StateInput};
use std::sync::Arc;
use style::animations::{AnimationDescriptor, AnimationDirection, IterationCount, Keyframe, KeyframeList, PlayState};
use style::computed::ComputedStyle;
use style::properties::PropertyId;
use tracing::{debug, warn};

/// Keyframe payload of an [`Animation`].
#[derive(Debug)]
pub struct KeyframeData {
    pub(crate) keyframes: Arc<KeyframeList>,
    /// Position of the descriptor in the element's animation list.
    pub(crate) index: usize,
    /// Whether transitions on our properties are currently paused for us.
    pub(crate) claimed: bool,
}

impl KeyframeData {
    pub fn keyframes(&self) -> &Arc<KeyframeList> {
        &self.keyframes
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn start_effect(&self, ctx: &mut AnimationContext<'_>, start_time: Option<f64>) -> bool {
        ctx.host.begin_keyframe_animation(ctx.element, start_time, self.index)
    }

    pub(crate) fn end_effect(&self, ctx: &mut AnimationContext<'_>, reset: bool) {
        ctx.effect(HostEffect::AnimationFinished {
            element: ctx.element,
            name: self.keyframes.name().to_string(),
            index: self.index,
            reset,
        });
        if reset {
            ctx.effect(HostEffect::NeedsStyleRecalc(ctx.element));
        }
    }

    /// Ask the composite to pause transitions on our properties.
    pub(crate) fn claim_properties(&mut self, ctx: &mut AnimationContext<'_>) {
        if !self.claimed {
            self.claimed = true;
            ctx.requests.push(CompositeRequest::Override(self.keyframes.clone()));
        }
    }

    pub(crate) fn release_properties(&mut self, ctx: &mut AnimationContext<'_>) {
        if self.claimed {
            self.claimed = false;
            ctx.requests.push(CompositeRequest::Release(self.keyframes.clone()));
        }
    }
}

/// The keyframe pair around `t`, as indices into `frames`.
///
/// `t` at or past 1 holds the final pair so a finished iteration lands on
/// the last keyframe.
fn bracket(frames: &[Keyframe], t: f64) -> Option<(usize, usize)> {
    let mut from = None;
    for (i, frame) in frames.iter().enumerate() {
        if t < frame.offset {
            return from.map(|f| (f, i));
        }
        from = Some(i);
    }
    if t >= 1.0 && frames.len() >= 2 {
        return Some((frames.len() - 2, frames.len() - 1));
    }
    None
}

impl Animation {
    /// A keyframe animation for the descriptor at `index`.
    ///
    /// Returns `None` if the descriptor carries no keyframes.
    pub(crate) fn new_keyframe(id: InstanceId, descriptor: AnimationDescriptor, index: usize) -> Option<Self> {
        let keyframes = descriptor.keyframes.clone()?;
        let data = KeyframeData {
            keyframes,
            index,
            claimed: false,
        };
        Some(Animation::with_kind(id, descriptor, AnimationKind::Keyframe(data)))
    }

    pub fn keyframe_data(&self) -> Option<&KeyframeData> {
        match &self.kind {
            AnimationKind::Keyframe(k) => Some(k),
            AnimationKind::Transition(_) => None,
        }
    }

    /// Animation name, for keyframe animations.
    pub fn name(&self) -> Option<&str> {
        self.keyframe_data().map(|k| k.keyframes.name())
    }

    /// Position within the iteration, before easing, with alternate
    /// iterations reversed.
    fn iteration_fraction(&self, now: f64) -> f64 {
        let duration = self.descriptor.duration_secs();
        if duration <= 0.0 {
            return 1.0;
        }
        let elapsed = self.elapsed(now).max(0.0);
        if let IterationCount::Count(n) = self.descriptor.iteration_count {
            if elapsed >= duration * n as f64 {
                return if self.ends_reversed() { 0.0 } else { 1.0 };
            }
        }
        let t = elapsed / duration;
        let iteration = t.floor();
        let fraction = t - iteration;
        if self.descriptor.direction == AnimationDirection::Alternate && iteration as u64 % 2 == 1 {
            1.0 - fraction
        } else {
            fraction
        }
    }

    /// Advance the keyframe animation and blend its properties into `out`.
    pub(crate) fn animate_keyframe(
        &mut self,
        ctx: &mut AnimationContext<'_>,
        target: &Arc<ComputedStyle>,
        out: &mut Option<ComputedStyle>,
        suspended: bool,
    ) {
        let Some(keyframes) = self.keyframe_data().map(|k| k.keyframes.clone()) else {
            return;
        };

        if self.is_new() && self.descriptor.play_state == PlayState::Running && !suspended {
            self.update_state_machine(StateInput::StartAnimation, ctx);
        }
        if self.is_postactive() {
            return;
        }
        // Hold the underlying style through a positive delay.
        if self.is_preactive() && self.descriptor.delay_secs() > 0.0 {
            return;
        }

        let t = self.iteration_fraction(ctx.now);
        let frames = keyframes.frames();
        let Some((from_index, to_index)) = bracket(frames, t) else {
            warn!(name = keyframes.name(), t, "no keyframe bracket, ending animation");
            self.update_state_machine(StateInput::EndNow, ctx);
            return;
        };
        let (from, to) = (&frames[from_index], &frames[to_index]);
        let offset = from.offset;
        let scale = 1.0 / (to.offset - from.offset);
        let progress = self.progress(ctx.now, scale, offset);

        let dst = out.get_or_insert_with(|| (**target).clone());
        for property in keyframes.properties() {
            if ctx.wrappers.blend_property(*property, dst, &from.style, &to.style, progress) {
                self.animating = true;
            }
        }
    }

    pub(crate) fn keyframe_affects(&self, property: PropertyId) -> bool {
        self.keyframe_data()
            .is_some_and(|k| k.keyframes.contains_property(property))
    }

    /// Replace the descriptor after a play-state-only change.
    pub(crate) fn update_keyframe_descriptor(
        &mut self,
        descriptor: AnimationDescriptor,
        suspended: bool,
        ctx: &mut AnimationContext<'_>,
    ) {
        let run = descriptor.play_state == PlayState::Running;
        self.descriptor = descriptor;
        if !suspended {
            debug!(instance = self.id.0, run, "keyframe play state updated");
            self.update_play_state(run, ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::AnimationEventKind;
    use crate::host::ElementId;
    use crate::instance::testing::Harness;
    use crate::instance::AnimationState;
    use std::time::Duration;
    use style::animations::TimingFunction;

    fn opacity(value: f32) -> ComputedStyle {
        ComputedStyle {
            opacity: value,
            ..ComputedStyle::default()
        }
    }

    fn pulse() -> Arc<KeyframeList> {
        Arc::new(
            KeyframeList::new(
                "pulse",
                vec![
                    Keyframe::new(0.0, opacity(0.0)),
                    Keyframe::new(0.5, opacity(0.8)),
                    Keyframe::new(1.0, opacity(0.2)),
                ],
                [PropertyId::Opacity],
            )
            .unwrap(),
        )
    }

    fn descriptor() -> AnimationDescriptor {
        AnimationDescriptor::keyframes(pulse(), Duration::from_secs(1))
            .with_timing_function(TimingFunction::Linear)
            .with_iterations(IterationCount::Count(2))
            .with_direction(AnimationDirection::Alternate)
    }

    fn keyframe_animation(descriptor: AnimationDescriptor) -> Animation {
        Animation::new_keyframe(InstanceId(1), descriptor, 0).unwrap()
    }

    fn frame_at(h: &mut Harness, anim: &mut Animation, now: f64) -> Option<f32> {
        h.now = now;
        let target = Arc::new(ComputedStyle::default());
        let mut out = None;
        let mut ctx = h.ctx();
        anim.animate_keyframe(&mut ctx, &target, &mut out, false);
        out.map(|s| s.opacity)
    }

    fn start(h: &mut Harness, anim: &mut Animation) {
        frame_at(h, anim, 0.0);
        h.run_timers(anim, 0.0);
        let mut ctx = h.ctx();
        anim.style_committed(&mut ctx);
    }

    #[test]
    fn test_bracket_lookup() {
        let list = pulse();
        let frames = list.frames();
        assert_eq!(bracket(frames, 0.0), Some((0, 1)));
        assert_eq!(bracket(frames, 0.25), Some((0, 1)));
        assert_eq!(bracket(frames, 0.5), Some((1, 2)));
        assert_eq!(bracket(frames, 0.99), Some((1, 2)));
        assert_eq!(bracket(frames, 1.0), Some((1, 2)));
        assert_eq!(bracket(&frames[1..], 0.25), None);
    }

    #[test]
    fn test_alternate_iterations() {
        let mut h = Harness::new();
        let mut anim = keyframe_animation(descriptor());
        start(&mut h, &mut anim);
        assert_eq!(anim.start_time(), Some(0.0));

        let value = |v: Option<f32>| v.unwrap();
        // Forward: halfway between the first two keyframes.
        assert!((value(frame_at(&mut h, &mut anim, 0.25)) - 0.4).abs() < 1e-4);
        // The middle keyframe is hit exactly.
        assert!((value(frame_at(&mut h, &mut anim, 0.5)) - 0.8).abs() < 1e-4);
        // Backward: 1.25 maps to 0.75, halfway between the last two.
        assert!((value(frame_at(&mut h, &mut anim, 1.25)) - 0.5).abs() < 1e-4);
        assert!((value(frame_at(&mut h, &mut anim, 1.75)) - 0.4).abs() < 1e-4);
    }

    #[test]
    fn test_reversed_final_iteration_settles_on_first_keyframe() {
        let mut h = Harness::new();
        let mut anim = keyframe_animation(descriptor());
        start(&mut h, &mut anim);
        h.run_timers(&mut anim, 1.0);

        let near_end = frame_at(&mut h, &mut anim, 1.99).unwrap();
        assert!((near_end - 0.016).abs() < 1e-3);
        // The end timer has not fired yet; the sampled frame must not jump.
        assert_eq!(anim.state(), AnimationState::Ending);
        assert!(frame_at(&mut h, &mut anim, 2.0).unwrap().abs() < 1e-6);
        assert_eq!(anim.progress(2.0, 1.0, 0.0), 0.0);
    }

    #[test]
    fn test_start_claims_properties_and_sends_event() {
        let mut h = Harness::new();
        h.host.listen(ElementId(1), AnimationEventKind::AnimationStart);
        let mut anim = keyframe_animation(descriptor());

        frame_at(&mut h, &mut anim, 0.0);
        h.run_timers(&mut anim, 0.0);
        let mut ctx = h.ctx();
        anim.style_committed(&mut ctx);
        assert!(matches!(ctx.requests.as_slice(), [CompositeRequest::Override(_)]));
        drop(ctx);
        assert_eq!(h.host.began_animations, vec![(ElementId(1), 0, None)]);

        h.run_timers(&mut anim, 0.0);
        assert!(h.effects.iter().any(|e| matches!(
            e,
            HostEffect::Event(ev) if ev.kind == AnimationEventKind::AnimationStart && ev.name == "pulse"
        )));
    }

    #[test]
    fn test_delay_holds_underlying_style() {
        let mut h = Harness::new();
        let mut anim = keyframe_animation(descriptor().with_delay(Duration::from_millis(300)));
        assert_eq!(frame_at(&mut h, &mut anim, 0.0), None);
        assert_eq!(anim.state(), AnimationState::StartWaitDelayTimer);
    }

    #[test]
    fn test_runs_to_completion() {
        let mut h = Harness::new();
        h.host.listen(ElementId(1), AnimationEventKind::AnimationIteration);
        let mut anim = keyframe_animation(descriptor());
        start(&mut h, &mut anim);

        h.run_timers(&mut anim, 1.0);
        assert_eq!(anim.iteration(), 1);
        h.run_timers(&mut anim, 2.0);
        assert!(anim.is_postactive());
        assert_eq!(frame_at(&mut h, &mut anim, 2.5), None);

        let iterations = h
            .effects
            .iter()
            .filter(|e| matches!(e, HostEffect::Event(ev) if ev.kind == AnimationEventKind::AnimationIteration))
            .count();
        assert_eq!(iterations, 1);
        assert!(h.effects.iter().any(|e| matches!(
            e,
            HostEffect::AnimationFinished { reset: true, .. }
        )));
    }

    #[test]
    fn test_missing_bracket_ends_animation() {
        let list = Arc::new(KeyframeList::new("late", vec![Keyframe::new(0.5, opacity(1.0))], [PropertyId::Opacity]).unwrap());
        let mut h = Harness::new();
        let mut anim = keyframe_animation(AnimationDescriptor::keyframes(list, Duration::from_secs(1)));
        start(&mut h, &mut anim);
        assert_eq!(frame_at(&mut h, &mut anim, 0.1), None);
        assert!(anim.is_postactive());
    }
}
