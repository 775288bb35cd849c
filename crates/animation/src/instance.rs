//! The per-instance animation state machine.
//!
//! An [`Animation`] is either a transition or a keyframe animation; the
//! shared lifecycle lives here and the variant-specific behavior is
//! selected by matching on [`AnimationKind`].
//!
//! ```text
//! New -> StartWaitDelayTimer -> StartWaitStyleCommit -> StartWaitResponse
//!     -> Looping <-> Ending -> Done
//! ```
//!
//! Every active state has a paused counterpart. `MakeNew`, `Restart` and
//! `EndNow` are accepted in any state.

use crate::bezier::{solve_epsilon, UnitBezier};
use crate::events::{AnimationEventKind, PendingEvent};
use crate::host::{AnimationHost, ElementId, HostEffect};
use crate::keyframe::KeyframeData;
use crate::registry::CompositeKey;
use crate::timer::{TimerId, TimerQueue};
use crate::transition::TransitionData;
use crate::wrappers::PropertyWrapperTable;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;
use style::animations::{AnimationDescriptor, AnimationDirection, IterationCount, KeyframeList, TimingFunction};
use tracing::{debug, trace, warn};

/// Slack for comparing timeline positions computed from timer deadlines.
const TIME_EPSILON: f64 = 1e-6;

/// Identifier of an instance within its composite animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub u64);

/// Lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationState {
    New,
    StartWaitDelayTimer,
    StartWaitStyleCommit,
    StartWaitResponse,
    Looping,
    Ending,
    PausedWaitTimer,
    PausedWaitResponse,
    PausedRun,
    Done,
}

impl fmt::Display for AnimationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Inputs to the state machine. Timer inputs carry the elapsed active time
/// they were scheduled for.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum StateInput {
    MakeNew,
    StartAnimation,
    Restart,
    StartTimerFired(f64),
    StyleCommitted,
    StartTimeSet(f64),
    LoopTimerFired(f64),
    EndTimerFired(f64),
    PauseOverride,
    ResumeOverride,
    PlayStateRunning,
    PlayStatePaused,
    EndNow,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AdvanceKind {
    Start,
    Iteration,
    End,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum TimerAction {
    Advance { kind: AdvanceKind, elapsed: f64 },
    Dispatch(PendingEvent),
}

/// What a scheduled timer is for.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum TimerTarget {
    Instance {
        composite: CompositeKey,
        instance: InstanceId,
        action: TimerAction,
    },
    SoftwareTick,
}

/// Changes an instance asks of its siblings. The composite applies them
/// once the instance call has returned.
#[derive(Clone, Debug)]
pub(crate) enum CompositeRequest {
    Override(Arc<KeyframeList>),
    Release(Arc<KeyframeList>),
}

/// Everything an instance may touch while it changes state.
pub(crate) struct AnimationContext<'a> {
    pub now: f64,
    pub element: ElementId,
    pub composite: CompositeKey,
    pub host: &'a mut dyn AnimationHost,
    pub timers: &'a mut TimerQueue<TimerTarget>,
    pub wrappers: &'a PropertyWrapperTable,
    pub effects: &'a mut Vec<HostEffect>,
    pub requests: Vec<CompositeRequest>,
}

impl AnimationContext<'_> {
    pub fn effect(&mut self, effect: HostEffect) {
        self.effects.push(effect);
    }

    /// Mark the element dirty and ask for a recompute pass.
    pub fn request_recompute(&mut self) {
        self.effects.push(HostEffect::NeedsStyleRecalc(self.element));
        self.effects.push(HostEffect::RequestStyleRecompute);
    }
}

/// Variant-specific payload.
#[derive(Debug)]
pub enum AnimationKind {
    Transition(TransitionData),
    Keyframe(KeyframeData),
}

/// One running transition or keyframe animation.
#[derive(Debug)]
pub struct Animation {
    pub(crate) id: InstanceId,
    pub(crate) descriptor: AnimationDescriptor,
    pub(crate) state: AnimationState,
    pub(crate) iteration: u32,
    pub(crate) start_time: Option<f64>,
    pub(crate) pause_time: Option<f64>,
    pub(crate) delay_remaining: Option<f64>,
    pub(crate) waited_for_response: bool,
    pub(crate) waiting_for_end_event: bool,
    pub(crate) animating: bool,
    pub(crate) advance_timer: Option<TimerId>,
    pub(crate) dispatch_timers: SmallVec<[TimerId; 2]>,
    pub(crate) kind: AnimationKind,
}

impl Animation {
    pub(crate) fn with_kind(id: InstanceId, descriptor: AnimationDescriptor, kind: AnimationKind) -> Self {
        Self {
            id,
            descriptor,
            state: AnimationState::New,
            iteration: 0,
            start_time: None,
            pause_time: None,
            delay_remaining: None,
            waited_for_response: false,
            waiting_for_end_event: false,
            animating: false,
            advance_timer: None,
            dispatch_timers: SmallVec::new(),
            kind,
        }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn descriptor(&self) -> &AnimationDescriptor {
        &self.descriptor
    }

    pub fn kind(&self) -> &AnimationKind {
        &self.kind
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn start_time(&self) -> Option<f64> {
        self.start_time
    }

    pub fn pause_time(&self) -> Option<f64> {
        self.pause_time
    }

    /// Completed iterations since the last (re)start.
    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    pub fn is_new(&self) -> bool {
        self.state == AnimationState::New
    }

    /// Not yet producing time-based output.
    pub fn is_preactive(&self) -> bool {
        matches!(
            self.state,
            AnimationState::New
                | AnimationState::StartWaitDelayTimer
                | AnimationState::StartWaitStyleCommit
                | AnimationState::StartWaitResponse
                | AnimationState::PausedWaitTimer
                | AnimationState::PausedWaitResponse
        )
    }

    pub fn is_postactive(&self) -> bool {
        self.state == AnimationState::Done
    }

    /// Whether wall-clock time currently accrues.
    pub fn is_running(&self) -> bool {
        self.pause_time.is_none()
    }

    pub fn is_paused(&self) -> bool {
        self.pause_time.is_some()
    }

    pub fn waiting_for_start_time(&self) -> bool {
        self.state == AnimationState::StartWaitResponse
    }

    pub fn waiting_for_end_event(&self) -> bool {
        self.waiting_for_end_event
    }

    /// Whether the last blend touched a property that needs software ticks.
    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub(crate) fn set_animating(&mut self, animating: bool) {
        self.animating = animating;
    }

    pub fn is_transition(&self) -> bool {
        matches!(self.kind, AnimationKind::Transition(_))
    }

    /// Name used in events: the animation name, or the transitioned property.
    pub fn event_name(&self) -> String {
        match &self.kind {
            AnimationKind::Transition(t) => t.property.name().to_string(),
            AnimationKind::Keyframe(k) => k.keyframes.name().to_string(),
        }
    }

    /// Active time since the start, frozen while paused.
    pub fn elapsed(&self, now: f64) -> f64 {
        match (self.start_time, self.pause_time) {
            (Some(start), None) => now - start,
            (Some(start), Some(paused)) => paused - start,
            (None, _) => 0.0,
        }
    }

    /// Eased progress through the current iteration.
    ///
    /// `scale` and `offset` map the iteration fraction into a sub-range
    /// before easing; keyframe animations use them to address one bracket.
    pub fn progress(&self, now: f64, scale: f64, offset: f64) -> f64 {
        if self.is_preactive() || self.start_time.is_none() {
            return 0.0;
        }
        let elapsed = self.elapsed(now);
        if elapsed < 0.0 {
            return 0.0;
        }

        let duration = self.descriptor.duration_secs();
        if self.is_postactive() || duration <= 0.0 {
            return self.terminal_progress();
        }
        if let IterationCount::Count(n) = self.descriptor.iteration_count {
            if elapsed >= duration * n as f64 {
                return self.terminal_progress();
            }
        }

        let mut t = elapsed / duration;
        let iteration = t.floor();
        t -= iteration;
        if self.descriptor.direction == AnimationDirection::Alternate && iteration as u64 % 2 == 1 {
            t = 1.0 - t;
        }
        if scale != 1.0 || offset != 0.0 {
            t = (t - offset) * scale;
        }

        match self.descriptor.timing_function {
            TimingFunction::Linear => t,
            TimingFunction::CubicBezier { x1, y1, x2, y2 } => {
                UnitBezier::new(x1, y1, x2, y2).solve(t, solve_epsilon(duration))
            }
        }
    }

    /// Whether the last iteration runs backwards.
    pub(crate) fn ends_reversed(&self) -> bool {
        match self.descriptor.iteration_count {
            IterationCount::Count(n) => {
                self.descriptor.direction == AnimationDirection::Alternate && n.saturating_sub(1) % 2 == 1
            }
            IterationCount::Infinite => false,
        }
    }

    /// Progress once the active duration is over.
    fn terminal_progress(&self) -> f64 {
        if self.ends_reversed() {
            0.0
        } else {
            1.0
        }
    }

    fn set_state(&mut self, state: AnimationState) {
        trace!(instance = self.id.0, from = %self.state, to = %state, "animation state change");
        self.state = state;
    }

    fn ignore(&self, input: StateInput) {
        match input {
            // Host-driven; arriving out of turn means the host lost track.
            StateInput::StyleCommitted | StateInput::StartTimeSet(_) => {
                warn!(instance = self.id.0, state = %self.state, ?input, "host input ignored");
            }
            _ => trace!(instance = self.id.0, state = %self.state, ?input, "input ignored"),
        }
    }

    fn arm_advance(&mut self, ctx: &mut AnimationContext<'_>, delay: f64, kind: AdvanceKind, elapsed: f64) {
        self.cancel_advance_timer(ctx);
        let target = TimerTarget::Instance {
            composite: ctx.composite,
            instance: self.id,
            action: TimerAction::Advance { kind, elapsed },
        };
        self.advance_timer = Some(ctx.timers.start_one_shot(ctx.now, delay, target));
    }

    fn cancel_advance_timer(&mut self, ctx: &mut AnimationContext<'_>) {
        if let Some(id) = self.advance_timer.take() {
            ctx.timers.stop(id);
        }
    }

    /// Cancel every pending timer, dropping undelivered events.
    pub(crate) fn cancel_timers(&mut self, ctx: &mut AnimationContext<'_>) {
        self.cancel_advance_timer(ctx);
        for id in self.dispatch_timers.drain(..) {
            ctx.timers.stop(id);
        }
        self.waiting_for_end_event = false;
    }

    pub(crate) fn update_state_machine(&mut self, input: StateInput, ctx: &mut AnimationContext<'_>) {
        use AnimationState::*;
        use StateInput::*;

        match input {
            MakeNew => {
                let was_active = !matches!(self.state, New | Done);
                self.cancel_advance_timer(ctx);
                self.set_state(New);
                self.reset_timeline();
                if was_active {
                    self.end_effect(ctx, false);
                }
                return;
            }
            Restart => {
                let was_active = !matches!(self.state, New | Done);
                self.cancel_timers(ctx);
                self.set_state(New);
                self.reset_timeline();
                if was_active {
                    self.end_effect(ctx, false);
                }
                self.update_state_machine(StartAnimation, ctx);
                return;
            }
            EndNow => {
                self.cancel_timers(ctx);
                self.set_state(Done);
                self.end_effect(ctx, true);
                self.release_overrides(ctx);
                return;
            }
            PauseOverride => {
                self.update_state_machine(PlayStatePaused, ctx);
                return;
            }
            ResumeOverride => {
                self.update_state_machine(PlayStateRunning, ctx);
                return;
            }
            _ => {}
        }

        match self.state {
            New => match input {
                StartAnimation | PlayStateRunning if self.can_start() => {
                    self.waited_for_response = false;
                    self.pause_time = None;
                    let delay = self
                        .delay_remaining
                        .take()
                        .unwrap_or_else(|| self.descriptor.delay_secs());
                    self.set_state(StartWaitDelayTimer);
                    self.arm_advance(ctx, delay, AdvanceKind::Start, 0.0);
                }
                _ => self.ignore(input),
            },
            StartWaitDelayTimer => match input {
                StartTimerFired(_) => {
                    self.set_state(StartWaitStyleCommit);
                    ctx.request_recompute();
                }
                PlayStatePaused => {
                    self.delay_remaining = self.advance_timer.and_then(|id| ctx.timers.remaining(id, ctx.now));
                    self.cancel_advance_timer(ctx);
                    self.pause_time = Some(ctx.now);
                    self.set_state(PausedWaitTimer);
                }
                _ => self.ignore(input),
            },
            StartWaitStyleCommit => match input {
                StyleCommitted => {
                    self.set_state(StartWaitResponse);
                    self.on_activate(ctx);
                    self.request_start(ctx, None);
                }
                PlayStatePaused => {
                    self.delay_remaining = Some(0.0);
                    self.pause_time = Some(ctx.now);
                    self.set_state(PausedWaitTimer);
                }
                _ => self.ignore(input),
            },
            StartWaitResponse => match input {
                StartTimeSet(time) => {
                    if self.start_time.is_none() {
                        self.start_time = Some(time);
                    }
                    self.waited_for_response = false;
                    self.prime_event_timers(ctx);
                    ctx.request_recompute();
                }
                PlayStatePaused => {
                    self.pause_time = Some(ctx.now);
                    self.end_effect(ctx, false);
                    self.set_state(PausedWaitResponse);
                }
                _ => self.ignore(input),
            },
            Looping | Ending => match input {
                LoopTimerFired(elapsed) if self.state == Looping => {
                    self.iteration += 1;
                    self.on_iteration(ctx, elapsed);
                    self.prime_event_timers(ctx);
                }
                EndTimerFired(elapsed) if self.state == Ending => {
                    self.set_state(Done);
                    self.on_end(ctx, elapsed);
                    self.release_overrides(ctx);
                    ctx.request_recompute();
                }
                PlayStatePaused => {
                    self.pause_time = Some(ctx.now);
                    self.cancel_advance_timer(ctx);
                    self.end_effect(ctx, false);
                    self.set_state(PausedRun);
                }
                _ => self.ignore(input),
            },
            PausedWaitTimer => match input {
                PlayStateRunning => {
                    self.pause_time = None;
                    self.set_state(New);
                    self.update_state_machine(StartAnimation, ctx);
                }
                _ => self.ignore(input),
            },
            PausedWaitResponse | PausedRun => match input {
                PlayStateRunning => {
                    let paused_at = self.pause_time.take();
                    if self.state == PausedRun {
                        if let (Some(start), Some(paused_at)) = (self.start_time, paused_at) {
                            self.start_time = Some(start + (ctx.now - paused_at));
                        }
                    } else {
                        self.start_time = None;
                    }
                    self.set_state(StartWaitResponse);
                    self.request_start(ctx, self.start_time);
                }
                _ => self.ignore(input),
            },
            Done => self.ignore(input),
        }
    }

    fn reset_timeline(&mut self) {
        self.start_time = None;
        self.pause_time = None;
        self.delay_remaining = None;
        self.iteration = 0;
        self.waited_for_response = false;
    }

    /// Hand the effect to the element; assign the start time ourselves unless
    /// the element promises to report it.
    fn request_start(&mut self, ctx: &mut AnimationContext<'_>, start_time: Option<f64>) {
        let deferred = !self.is_overridden() && self.start_effect(ctx, start_time);
        if deferred {
            self.waited_for_response = true;
        } else {
            self.update_state_machine(StateInput::StartTimeSet(ctx.now), ctx);
        }
    }

    /// Arm the next iteration or end timer from the current position.
    fn prime_event_timers(&mut self, ctx: &mut AnimationContext<'_>) {
        let elapsed = self.elapsed(ctx.now);
        let duration = self.descriptor.duration_secs();
        let total = match self.descriptor.iteration_count {
            IterationCount::Infinite => None,
            IterationCount::Count(n) => Some(duration * n as f64),
        };

        // A start time reported ahead of `now` delays the first boundary.
        let lead = (-elapsed).max(0.0);
        let elapsed = elapsed.max(0.0);

        let (left, next) = if duration <= 0.0 {
            (0.0, 0.0)
        } else if total.map_or(true, |total| elapsed < total) {
            let mut left = duration - elapsed % duration;
            if left < TIME_EPSILON {
                left += duration;
            }
            (left, elapsed + left)
        } else {
            (0.0, total.unwrap_or(elapsed))
        };
        let left = left + lead;

        if duration > 0.0 && total.map_or(true, |total| next + TIME_EPSILON < total) {
            self.set_state(AnimationState::Looping);
            self.arm_advance(ctx, left, AdvanceKind::Iteration, next);
        } else {
            let end = total.unwrap_or(next);
            self.set_state(AnimationState::Ending);
            self.arm_advance(ctx, left, AdvanceKind::End, end);
        }
    }

    /// Queue `kind` for zero-delay dispatch if anyone listens. Returns
    /// whether an event was scheduled.
    pub(crate) fn send_event(&mut self, ctx: &mut AnimationContext<'_>, kind: AnimationEventKind, elapsed: f64) -> bool {
        if !ctx.host.has_event_listener(ctx.element, kind) {
            return false;
        }
        let (property, index) = match &self.kind {
            AnimationKind::Transition(t) => (Some(t.property), 0),
            AnimationKind::Keyframe(k) => (None, k.index),
        };
        let pending = PendingEvent {
            kind,
            name: self.event_name(),
            elapsed_time: elapsed,
            property,
            index,
        };
        if kind.is_end() {
            self.waiting_for_end_event = true;
        }
        let target = TimerTarget::Instance {
            composite: ctx.composite,
            instance: self.id,
            action: TimerAction::Dispatch(pending),
        };
        self.dispatch_timers.push(ctx.timers.start_one_shot(ctx.now, 0.0, target));
        true
    }

    /// A timer owned by this instance fired.
    pub(crate) fn fire_timer(&mut self, ctx: &mut AnimationContext<'_>, timer: TimerId, action: TimerAction) {
        match action {
            TimerAction::Advance { kind, elapsed } => {
                if self.advance_timer != Some(timer) {
                    return;
                }
                self.advance_timer = None;
                let input = match kind {
                    AdvanceKind::Start => StateInput::StartTimerFired(elapsed),
                    AdvanceKind::Iteration => StateInput::LoopTimerFired(elapsed),
                    AdvanceKind::End => StateInput::EndTimerFired(elapsed),
                };
                self.update_state_machine(input, ctx);
            }
            TimerAction::Dispatch(pending) => {
                let Some(pos) = self.dispatch_timers.iter().position(|t| *t == timer) else {
                    return;
                };
                self.dispatch_timers.remove(pos);
                let finishes = pending.kind.is_end();
                ctx.effect(HostEffect::Event(pending.into_event(ctx.element)));
                if finishes {
                    self.waiting_for_end_event = false;
                    self.end_effect(ctx, true);
                    ctx.effect(HostEffect::NeedsStyleRecalc(ctx.element));
                }
            }
        }
    }

    /// Follow a play-state change from the descriptor or the document.
    pub(crate) fn update_play_state(&mut self, run: bool, ctx: &mut AnimationContext<'_>) {
        if self.is_running() != run || self.is_new() {
            let input = if run {
                StateInput::PlayStateRunning
            } else {
                StateInput::PlayStatePaused
            };
            self.update_state_machine(input, ctx);
        }
    }

    /// Deliver an externally reported start time.
    pub(crate) fn on_start_time_response(&mut self, ctx: &mut AnimationContext<'_>, time: f64) {
        if self.waiting_for_start_time() {
            self.update_state_machine(StateInput::StartTimeSet(time), ctx);
        }
    }

    /// The style for the pending start has been committed.
    pub(crate) fn style_committed(&mut self, ctx: &mut AnimationContext<'_>) {
        if self.state == AnimationState::StartWaitStyleCommit {
            self.update_state_machine(StateInput::StyleCommitted, ctx);
        }
    }

    /// Release everything before the instance is dropped.
    pub(crate) fn teardown(&mut self, ctx: &mut AnimationContext<'_>) {
        debug!(instance = self.id.0, name = %self.event_name(), state = %self.state, "tearing down animation");
        if self.waiting_for_end_event {
            self.waiting_for_end_event = false;
            self.end_effect(ctx, true);
        }
        if self.is_postactive() {
            self.cancel_timers(ctx);
        } else {
            self.update_state_machine(StateInput::EndNow, ctx);
        }
    }

    fn can_start(&self) -> bool {
        match &self.kind {
            AnimationKind::Transition(t) => t.has_styles(),
            AnimationKind::Keyframe(_) => true,
        }
    }

    pub fn is_overridden(&self) -> bool {
        match &self.kind {
            AnimationKind::Transition(t) => t.overridden,
            AnimationKind::Keyframe(_) => false,
        }
    }

    fn start_effect(&mut self, ctx: &mut AnimationContext<'_>, start_time: Option<f64>) -> bool {
        match &self.kind {
            AnimationKind::Transition(t) => t.start_effect(ctx, start_time),
            AnimationKind::Keyframe(k) => k.start_effect(ctx, start_time),
        }
    }

    pub(crate) fn end_effect(&mut self, ctx: &mut AnimationContext<'_>, reset: bool) {
        match &self.kind {
            AnimationKind::Transition(t) => t.end_effect(ctx),
            AnimationKind::Keyframe(k) => k.end_effect(ctx, reset),
        }
    }

    fn on_activate(&mut self, ctx: &mut AnimationContext<'_>) {
        if let AnimationKind::Keyframe(k) = &mut self.kind {
            k.claim_properties(ctx);
            self.send_event(ctx, AnimationEventKind::AnimationStart, 0.0);
        }
    }

    fn on_iteration(&mut self, ctx: &mut AnimationContext<'_>, elapsed: f64) {
        if !self.is_transition() {
            self.send_event(ctx, AnimationEventKind::AnimationIteration, elapsed);
        }
    }

    fn on_end(&mut self, ctx: &mut AnimationContext<'_>, elapsed: f64) {
        let kind = if self.is_transition() {
            AnimationEventKind::TransitionEnd
        } else {
            AnimationEventKind::AnimationEnd
        };
        if !self.send_event(ctx, kind, elapsed) {
            self.end_effect(ctx, true);
        }
    }

    fn release_overrides(&mut self, ctx: &mut AnimationContext<'_>) {
        if let AnimationKind::Keyframe(k) = &mut self.kind {
            k.release_properties(ctx);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::Harness;
    use super::*;
    use crate::transition::TransitionData;
    use std::time::Duration;
    use style::computed::ComputedStyle;
    use style::properties::PropertyId;

    fn transition(descriptor: AnimationDescriptor) -> Animation {
        let from = Arc::new(ComputedStyle::default());
        let to = Arc::new(ComputedStyle {
            opacity: 0.0,
            ..ComputedStyle::default()
        });
        let mut data = TransitionData::new(descriptor.property);
        data.from = Some(from);
        data.to = Some(to);
        Animation::with_kind(InstanceId(1), descriptor, AnimationKind::Transition(data))
    }

    fn linear(duration_ms: u64) -> AnimationDescriptor {
        AnimationDescriptor::transition(PropertyId::Opacity, Duration::from_millis(duration_ms))
            .with_timing_function(TimingFunction::Linear)
    }

    #[test]
    fn test_start_sequence() {
        let mut h = Harness::new();
        let mut anim = transition(linear(1000).with_delay(Duration::from_millis(200)));

        let mut ctx = h.ctx();
        anim.update_state_machine(StateInput::StartAnimation, &mut ctx);
        assert_eq!(anim.state(), AnimationState::StartWaitDelayTimer);

        h.run_timers(&mut anim, 0.1);
        assert_eq!(anim.state(), AnimationState::StartWaitDelayTimer);

        h.run_timers(&mut anim, 0.2);
        assert_eq!(anim.state(), AnimationState::StartWaitStyleCommit);
        assert!(h.effects.contains(&HostEffect::RequestStyleRecompute));

        let mut ctx = h.ctx();
        anim.style_committed(&mut ctx);
        assert_eq!(anim.state(), AnimationState::Ending);
        assert_eq!(anim.start_time(), Some(0.2));
        assert_eq!(h.host.began_transitions.len(), 1);
    }

    #[test]
    fn test_deferred_start_time() {
        let mut h = Harness::new();
        h.host.defer_start_times = true;
        let mut anim = transition(linear(1000));
        h.start(&mut anim, 0.0);
        assert!(anim.waiting_for_start_time());

        let mut ctx = h.ctx();
        anim.on_start_time_response(&mut ctx, 0.05);
        assert_eq!(anim.start_time(), Some(0.05));
        assert_eq!(anim.state(), AnimationState::Ending);

        // A second response is ignored.
        let mut ctx = h.ctx();
        anim.on_start_time_response(&mut ctx, 0.5);
        assert_eq!(anim.start_time(), Some(0.05));
    }

    #[test]
    fn test_progress_linear_and_done() {
        let mut h = Harness::new();
        let mut anim = transition(linear(1000));
        assert_eq!(anim.progress(0.0, 1.0, 0.0), 0.0);

        h.start(&mut anim, 0.0);
        assert!((anim.progress(0.25, 1.0, 0.0) - 0.25).abs() < 1e-9);
        assert!((anim.progress(0.75, 1.0, 0.0) - 0.75).abs() < 1e-9);

        h.run_timers(&mut anim, 1.0);
        assert!(anim.is_postactive());
        assert_eq!(anim.progress(1.5, 1.0, 0.0), 1.0);
        let finished = h
            .effects
            .iter()
            .filter(|e| matches!(e, HostEffect::TransitionFinished { .. }))
            .count();
        assert_eq!(finished, 1);
    }

    #[test]
    fn test_iterations_alternate() {
        let mut h = Harness::new();
        let mut anim = transition(
            linear(1000)
                .with_iterations(IterationCount::Count(3))
                .with_direction(AnimationDirection::Alternate),
        );
        h.start(&mut anim, 0.0);
        assert_eq!(anim.state(), AnimationState::Looping);

        // Forward, backward, forward again.
        assert!((anim.progress(0.25, 1.0, 0.0) - 0.25).abs() < 1e-9);
        assert!((anim.progress(1.25, 1.0, 0.0) - 0.75).abs() < 1e-9);
        assert!((anim.progress(2.25, 1.0, 0.0) - 0.25).abs() < 1e-9);

        h.run_timers(&mut anim, 1.0);
        assert_eq!(anim.iteration(), 1);
        assert_eq!(anim.state(), AnimationState::Looping);
        h.run_timers(&mut anim, 2.0);
        assert_eq!(anim.iteration(), 2);
        assert_eq!(anim.state(), AnimationState::Ending);
        h.run_timers(&mut anim, 3.0);
        assert_eq!(anim.state(), AnimationState::Done);
    }

    #[test]
    fn test_progress_monotonic_within_iteration() {
        let mut h = Harness::new();
        let mut anim = transition(
            linear(1000)
                .with_timing_function(TimingFunction::EASE_IN_OUT)
                .with_iterations(IterationCount::Infinite),
        );
        h.start(&mut anim, 0.0);
        let mut last = 0.0;
        for i in 0..100 {
            let p = anim.progress(i as f64 / 100.0, 1.0, 0.0);
            assert!(p + 1e-3 >= last);
            last = p;
        }
    }

    #[test]
    fn test_pause_preserves_phase() {
        let mut h = Harness::new();
        let mut anim = transition(linear(1000));
        h.start(&mut anim, 0.0);

        h.now = 0.3;
        let mut ctx = h.ctx();
        anim.update_state_machine(StateInput::PlayStatePaused, &mut ctx);
        assert_eq!(anim.state(), AnimationState::PausedRun);
        let phase = anim.elapsed(0.3);
        assert!((anim.elapsed(5.0) - phase).abs() < 1e-9);

        // The end timer was cancelled while paused.
        h.run_timers(&mut anim, 2.0);
        assert_eq!(anim.state(), AnimationState::PausedRun);

        h.now = 2.0;
        let mut ctx = h.ctx();
        anim.update_state_machine(StateInput::PlayStateRunning, &mut ctx);
        assert_eq!(anim.state(), AnimationState::Ending);
        assert!((anim.elapsed(2.0) - phase).abs() < 1e-9);
        assert!((anim.start_time().unwrap() - 1.7).abs() < 1e-9);

        h.run_timers(&mut anim, 2.69);
        assert_eq!(anim.state(), AnimationState::Ending);
        h.run_timers(&mut anim, 2.71);
        assert_eq!(anim.state(), AnimationState::Done);
    }

    #[test]
    fn test_pause_during_delay_keeps_remaining_delay() {
        let mut h = Harness::new();
        let mut anim = transition(linear(1000).with_delay(Duration::from_millis(500)));
        let mut ctx = h.ctx();
        anim.update_state_machine(StateInput::StartAnimation, &mut ctx);

        h.now = 0.2;
        let mut ctx = h.ctx();
        anim.update_state_machine(StateInput::PlayStatePaused, &mut ctx);
        assert_eq!(anim.state(), AnimationState::PausedWaitTimer);

        h.now = 1.0;
        let mut ctx = h.ctx();
        anim.update_state_machine(StateInput::PlayStateRunning, &mut ctx);
        assert_eq!(anim.state(), AnimationState::StartWaitDelayTimer);

        h.run_timers(&mut anim, 1.29);
        assert_eq!(anim.state(), AnimationState::StartWaitDelayTimer);
        h.run_timers(&mut anim, 1.31);
        assert_eq!(anim.state(), AnimationState::StartWaitStyleCommit);
    }

    #[test]
    fn test_end_now_cancels_timers() {
        let mut h = Harness::new();
        let mut anim = transition(linear(1000));
        h.start(&mut anim, 0.0);
        assert!(!h.timers.is_empty());

        let mut ctx = h.ctx();
        anim.update_state_machine(StateInput::EndNow, &mut ctx);
        assert!(anim.is_postactive());
        assert!(h.timers.is_empty());
    }

    #[test]
    fn test_end_event_deferred_with_listener() {
        let mut h = Harness::new();
        h.host.listen(ElementId(1), AnimationEventKind::TransitionEnd);
        let mut anim = transition(linear(100));
        h.start(&mut anim, 0.0);

        // Fire only the end timer; the dispatch timer is scheduled, not run.
        h.now = 0.1;
        for (id, target) in h.timers.pop_due(0.1) {
            if let TimerTarget::Instance { action, .. } = target {
                let mut ctx = h.ctx();
                anim.fire_timer(&mut ctx, id, action);
            }
        }
        assert!(anim.is_postactive());
        assert!(anim.waiting_for_end_event());
        assert!(!h
            .effects
            .iter()
            .any(|e| matches!(e, HostEffect::TransitionFinished { .. })));

        h.run_timers(&mut anim, 0.1);
        assert!(!anim.waiting_for_end_event());
        let events: Vec<_> = h
            .effects
            .iter()
            .filter_map(|e| match e {
                HostEffect::Event(ev) => Some(ev.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, AnimationEventKind::TransitionEnd);
        assert_eq!(events[0].name, "opacity");
        assert!((events[0].elapsed_time - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_teardown_finalizes_pending_end() {
        let mut h = Harness::new();
        h.host.listen(ElementId(1), AnimationEventKind::TransitionEnd);
        let mut anim = transition(linear(100));
        h.start(&mut anim, 0.0);
        h.now = 0.1;
        for (id, target) in h.timers.pop_due(0.1) {
            if let TimerTarget::Instance { action, .. } = target {
                let mut ctx = h.ctx();
                anim.fire_timer(&mut ctx, id, action);
            }
        }
        assert!(anim.waiting_for_end_event());

        let mut ctx = h.ctx();
        anim.teardown(&mut ctx);
        assert!(!anim.waiting_for_end_event());
        assert!(h.timers.is_empty());
        assert!(h
            .effects
            .iter()
            .any(|e| matches!(e, HostEffect::TransitionFinished { .. })));
    }

    #[test]
    fn test_ignored_input_keeps_state() {
        let mut h = Harness::new();
        let mut anim = transition(linear(100));
        let mut ctx = h.ctx();
        anim.update_state_machine(StateInput::LoopTimerFired(1.0), &mut ctx);
        assert!(anim.is_new());
    }

    #[test]
    fn test_late_start_time_ignored() {
        let mut h = Harness::new();
        let mut anim = transition(linear(1000));
        h.start(&mut anim, 0.0);
        assert_eq!(anim.state(), AnimationState::Ending);

        h.now = 0.5;
        let mut ctx = h.ctx();
        anim.update_state_machine(StateInput::StartTimeSet(0.4), &mut ctx);
        anim.update_state_machine(StateInput::StyleCommitted, &mut ctx);
        assert_eq!(anim.state(), AnimationState::Ending);
        assert_eq!(anim.start_time(), Some(0.0));
    }
}
