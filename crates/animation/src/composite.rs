//! All transitions and keyframe animations of one element.

use crate::host::{ElementId, HostEffect};
use crate::instance::{Animation, AnimationContext, CompositeRequest, InstanceId, TimerAction, TimerTarget};
use crate::timer::{TimerId, TimerQueue};
use crate::wrappers::PropertyWrapperTable;
use indexmap::IndexMap;
use std::sync::Arc;
use style::animations::{AnimationDescriptor, PlayState};
use style::computed::ComputedStyle;
use style::properties::{PropertyId, TransitionProperty};
use tracing::{debug, trace};

/// Whether two keyframe descriptors name the same animation, ignoring play
/// state.
fn same_animation(a: &AnimationDescriptor, b: &AnimationDescriptor) -> bool {
    a.name == b.name
        && a.duration == b.duration
        && a.delay == b.delay
        && a.iteration_count == b.iteration_count
        && a.direction == b.direction
        && a.timing_function == b.timing_function
        && a.keyframes == b.keyframes
}

/// Per-element animation state.
#[derive(Debug)]
pub struct CompositeAnimation {
    element: ElementId,
    transitions: IndexMap<TransitionProperty, Animation>,
    keyframes: Vec<Animation>,
    suspended: bool,
    /// Keyframe descriptors last applied; `None` before the first update.
    applied_animations: Option<Vec<AnimationDescriptor>>,
    next_instance: u64,
}

impl CompositeAnimation {
    pub(crate) fn new(element: ElementId, suspended: bool) -> Self {
        Self {
            element,
            transitions: IndexMap::new(),
            keyframes: Vec::new(),
            suspended,
            applied_animations: None,
            next_instance: 1,
        }
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn transitions(&self) -> impl Iterator<Item = &Animation> {
        self.transitions.values()
    }

    pub fn transition(&self, property: TransitionProperty) -> Option<&Animation> {
        self.transitions.get(&property)
    }

    pub fn keyframe_animations(&self) -> &[Animation] {
        &self.keyframes
    }

    pub fn keyframe_animation(&self, name: &str) -> Option<&Animation> {
        self.keyframes.iter().find(|k| k.name() == Some(name))
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty() && self.keyframes.is_empty()
    }

    /// Whether the composite may be dropped: no instances, and no keyframe
    /// declarations whose completion must be remembered.
    pub(crate) fn is_idle(&self) -> bool {
        self.is_empty() && self.applied_animations.as_ref().map_or(true, |a| a.is_empty())
    }

    pub fn is_animating(&self) -> bool {
        self.instances().any(|a| a.is_animating())
    }

    pub(crate) fn clear_animating(&mut self) {
        for anim in self.instances_mut() {
            anim.set_animating(false);
        }
    }

    fn instances(&self) -> impl Iterator<Item = &Animation> {
        self.transitions.values().chain(self.keyframes.iter())
    }

    fn instances_mut(&mut self) -> impl Iterator<Item = &mut Animation> {
        self.transitions.values_mut().chain(self.keyframes.iter_mut())
    }

    fn instance_mut(&mut self, id: InstanceId) -> Option<&mut Animation> {
        self.instances_mut().find(|a| a.id() == id)
    }

    fn allocate_id(&mut self) -> InstanceId {
        let id = InstanceId(self.next_instance);
        self.next_instance += 1;
        id
    }

    /// Produce the animated style for `target`. Returns `None` when nothing
    /// blended.
    pub(crate) fn animate(
        &mut self,
        ctx: &mut AnimationContext<'_>,
        current: Option<&Arc<ComputedStyle>>,
        target: &Arc<ComputedStyle>,
    ) -> Option<ComputedStyle> {
        let mut out = None;

        self.update_transitions(ctx, target);
        if let Some(current) = current {
            for anim in self.transitions.values_mut() {
                anim.animate_transition(ctx, current, target, &mut out, self.suspended);
            }
        }
        self.apply_requests(ctx);

        self.update_keyframe_animations(ctx, target);
        for anim in self.keyframes.iter_mut() {
            anim.animate_keyframe(ctx, target, &mut out, self.suspended);
        }
        self.apply_requests(ctx);

        out
    }

    /// Match transition instances to the declarations in `target`.
    fn update_transitions(&mut self, ctx: &mut AnimationContext<'_>, target: &ComputedStyle) {
        let mut wanted: IndexMap<TransitionProperty, &AnimationDescriptor> = IndexMap::new();
        for descriptor in &target.transitions {
            if descriptor.is_degenerate() {
                trace!(property = %descriptor.property, "skipping degenerate transition");
                continue;
            }
            wanted.entry(descriptor.property).or_insert(descriptor);
        }

        self.transitions.retain(|property, anim| {
            let keep = wanted.get(property).is_some_and(|d| *d == anim.descriptor());
            if !keep {
                debug!(property = %property, "transition no longer declared");
                anim.teardown(ctx);
            }
            keep
        });

        for (property, descriptor) in wanted {
            if !self.transitions.contains_key(&property) {
                let id = self.allocate_id();
                self.transitions
                    .insert(property, Animation::new_transition(id, descriptor.clone()));
            }
        }
    }

    /// Match keyframe instances to the `animation` declarations in `target`.
    fn update_keyframe_animations(&mut self, ctx: &mut AnimationContext<'_>, target: &ComputedStyle) {
        let wanted = &target.animations;
        if self.applied_animations.as_deref() == Some(wanted.as_slice()) {
            return;
        }

        let same_list = self.applied_animations.as_ref().is_some_and(|applied| {
            applied.len() == wanted.len() && applied.iter().zip(wanted).all(|(a, b)| same_animation(a, b))
        });

        if same_list {
            for anim in self.keyframes.iter_mut() {
                let Some(index) = anim.keyframe_data().map(|k| k.index()) else {
                    continue;
                };
                let Some(descriptor) = wanted.get(index) else {
                    continue;
                };
                if descriptor.play_state != anim.descriptor().play_state {
                    anim.update_keyframe_descriptor(descriptor.clone(), self.suspended, ctx);
                }
            }
        } else {
            for mut anim in self.keyframes.drain(..) {
                anim.teardown(ctx);
            }
            for (index, descriptor) in wanted.iter().enumerate() {
                if !descriptor.has_keyframes() || descriptor.is_degenerate() {
                    trace!(name = %descriptor.name, "skipping animation without effect");
                    continue;
                }
                let id = self.allocate_id();
                if let Some(anim) = Animation::new_keyframe(id, descriptor.clone(), index) {
                    debug!(name = %descriptor.name, index, "keyframe animation created");
                    self.keyframes.push(anim);
                }
            }
        }
        self.applied_animations = Some(wanted.clone());
    }

    /// Apply the sibling requests queued in `ctx`.
    pub(crate) fn apply_requests(&mut self, ctx: &mut AnimationContext<'_>) {
        while !ctx.requests.is_empty() {
            let requests = std::mem::take(&mut ctx.requests);
            for request in requests {
                let (list, overridden) = match request {
                    CompositeRequest::Override(list) => (list, true),
                    CompositeRequest::Release(list) => (list, false),
                };
                let wrappers = ctx.wrappers;
                let suspended = self.suspended;
                for (key, anim) in self.transitions.iter_mut() {
                    let claimed = match key {
                        TransitionProperty::Property(p) => list.contains_property(*p),
                        TransitionProperty::All => list
                            .properties()
                            .iter()
                            .any(|p| anim.transition_affects(wrappers, *p)),
                    };
                    if !claimed {
                        continue;
                    }
                    if overridden || !suspended {
                        anim.set_overridden(overridden, ctx);
                    } else {
                        // Left paused; `resume` picks it up.
                        anim.clear_overridden();
                    }
                }
            }
        }
    }

    /// Deliver a fired timer to the instance that owns it.
    pub(crate) fn fire_timer(
        &mut self,
        ctx: &mut AnimationContext<'_>,
        instance: InstanceId,
        timer: TimerId,
        action: TimerAction,
    ) {
        match self.instance_mut(instance) {
            Some(anim) => anim.fire_timer(ctx, timer, action),
            None => trace!(instance = instance.0, "timer for a removed animation"),
        }
    }

    pub(crate) fn style_committed(&mut self, ctx: &mut AnimationContext<'_>) {
        for anim in self.instances_mut() {
            anim.style_committed(ctx);
        }
    }

    pub(crate) fn set_animation_start_time(&mut self, ctx: &mut AnimationContext<'_>, time: f64) {
        for anim in self.keyframes.iter_mut() {
            anim.on_start_time_response(ctx, time);
        }
    }

    pub(crate) fn set_transition_start_time(
        &mut self,
        ctx: &mut AnimationContext<'_>,
        property: TransitionProperty,
        time: f64,
    ) {
        if let Some(anim) = self.transitions.get_mut(&property) {
            anim.on_start_time_response(ctx, time);
        }
    }

    pub(crate) fn suspend(&mut self, ctx: &mut AnimationContext<'_>) {
        if self.suspended {
            return;
        }
        self.suspended = true;
        for anim in self.instances_mut() {
            anim.update_play_state(false, ctx);
        }
        ctx.effect(HostEffect::SuspendElement(self.element));
    }

    pub(crate) fn resume(&mut self, ctx: &mut AnimationContext<'_>) {
        if !self.suspended {
            return;
        }
        self.suspended = false;
        for anim in self.keyframes.iter_mut() {
            if anim.descriptor().play_state == PlayState::Running {
                anim.update_play_state(true, ctx);
            }
        }
        for anim in self.transitions.values_mut() {
            if anim.has_transition_styles() && !anim.is_overridden() {
                anim.update_play_state(true, ctx);
            }
        }
        ctx.effect(HostEffect::ResumeElement(self.element));
    }

    /// Whether some running instance currently drives `property`.
    pub fn is_animating_property(&self, wrappers: &PropertyWrapperTable, property: PropertyId) -> bool {
        self.instances().any(|anim| {
            !anim.is_preactive()
                && !anim.is_postactive()
                && (anim.transition_affects(wrappers, property) || anim.keyframe_affects(property))
        })
    }

    /// Drop finished instances that owe no event.
    ///
    /// A finished transition stays until a reconcile pass has swapped its
    /// output for the target style.
    pub(crate) fn cleanup_finished(&mut self, timers: &mut TimerQueue<TimerTarget>) -> usize {
        let finished = |anim: &Animation| anim.is_postactive() && !anim.waiting_for_end_event();
        let mut removed = Vec::new();

        self.transitions.retain(|_, anim| {
            let drop = anim.is_transition_finalized() && (anim.is_new() || finished(anim));
            if drop {
                removed.push(anim.advance_timer.take());
            }
            !drop
        });
        self.keyframes.retain_mut(|anim| {
            let drop = finished(anim);
            if drop {
                removed.push(anim.advance_timer.take());
            }
            !drop
        });

        for id in removed.iter().flatten() {
            timers.stop(*id);
        }
        removed.len()
    }

    /// Tear down every instance.
    pub(crate) fn teardown_all(&mut self, ctx: &mut AnimationContext<'_>) {
        for (_, mut anim) in self.transitions.drain(..) {
            anim.teardown(ctx);
        }
        for mut anim in self.keyframes.drain(..) {
            anim.teardown(ctx);
        }
        ctx.requests.clear();
    }
}
