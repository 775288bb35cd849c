//! Implicit animations: a single property (or `all`) moving from the
//! element's current style to a new target style.

use crate::host::HostEffect;
use crate::instance::{Animation, AnimationContext, AnimationKind, InstanceId, StateInput};
use crate::wrappers::PropertyWrapperTable;
use std::sync::Arc;
use style::animations::AnimationDescriptor;
use style::computed::ComputedStyle;
use style::properties::{PropertyId, TransitionProperty};
use tracing::debug;

/// Transition payload of an [`Animation`].
#[derive(Debug)]
pub struct TransitionData {
    pub(crate) property: TransitionProperty,
    pub(crate) from: Option<Arc<ComputedStyle>>,
    pub(crate) to: Option<Arc<ComputedStyle>>,
    /// Paused because a keyframe animation claimed the property.
    pub(crate) overridden: bool,
    /// A reconcile pass has applied the end of the last run.
    pub(crate) finalized: bool,
}

impl TransitionData {
    pub(crate) fn new(property: TransitionProperty) -> Self {
        Self {
            property,
            from: None,
            to: None,
            overridden: false,
            finalized: false,
        }
    }

    pub fn property(&self) -> TransitionProperty {
        self.property
    }

    pub fn from_style(&self) -> Option<&Arc<ComputedStyle>> {
        self.from.as_ref()
    }

    pub fn to_style(&self) -> Option<&Arc<ComputedStyle>> {
        self.to.as_ref()
    }

    pub fn is_overridden(&self) -> bool {
        self.overridden
    }

    pub(crate) fn has_styles(&self) -> bool {
        self.from.is_some() && self.to.is_some()
    }

    pub(crate) fn start_effect(&self, ctx: &mut AnimationContext<'_>, start_time: Option<f64>) -> bool {
        match (&self.from, &self.to) {
            (Some(from), Some(to)) => ctx
                .host
                .begin_transition(ctx.element, start_time, self.property, from, to),
            _ => false,
        }
    }

    pub(crate) fn end_effect(&self, ctx: &mut AnimationContext<'_>) {
        ctx.effect(HostEffect::TransitionFinished {
            element: ctx.element,
            property: self.property,
        });
    }
}

impl Animation {
    /// A transition created from a `transition` declaration.
    pub(crate) fn new_transition(id: InstanceId, descriptor: AnimationDescriptor) -> Self {
        let data = TransitionData::new(descriptor.property);
        Animation::with_kind(id, descriptor, AnimationKind::Transition(data))
    }

    pub fn transition_data(&self) -> Option<&TransitionData> {
        match &self.kind {
            AnimationKind::Transition(t) => Some(t),
            AnimationKind::Keyframe(_) => None,
        }
    }

    pub fn transition_property(&self) -> Option<TransitionProperty> {
        self.transition_data().map(|t| t.property)
    }

    /// Starting style of a transition.
    pub fn from_style(&self) -> Option<&Arc<ComputedStyle>> {
        self.transition_data().and_then(|t| t.from.as_ref())
    }

    pub fn to_style(&self) -> Option<&Arc<ComputedStyle>> {
        self.transition_data().and_then(|t| t.to.as_ref())
    }

    fn transition_data_mut(&mut self) -> Option<&mut TransitionData> {
        match &mut self.kind {
            AnimationKind::Transition(t) => Some(t),
            AnimationKind::Keyframe(_) => None,
        }
    }

    /// Replace the endpoints and restart when both are present.
    pub(crate) fn reset_transition(
        &mut self,
        ctx: &mut AnimationContext<'_>,
        from: Option<Arc<ComputedStyle>>,
        to: Option<Arc<ComputedStyle>>,
    ) {
        let Some(data) = self.transition_data_mut() else {
            return;
        };
        data.from = from;
        data.to = to;
        if data.has_styles() {
            data.finalized = false;
            self.update_state_machine(StateInput::Restart, ctx);
        }
    }

    /// Pause or resume because a keyframe animation claimed the property.
    pub(crate) fn set_overridden(&mut self, overridden: bool, ctx: &mut AnimationContext<'_>) {
        let Some(data) = self.transition_data_mut() else {
            return;
        };
        if data.overridden == overridden {
            return;
        }
        data.overridden = overridden;
        debug!(instance = self.id.0, overridden, "transition override changed");
        let input = if overridden {
            StateInput::PauseOverride
        } else {
            StateInput::ResumeOverride
        };
        self.update_state_machine(input, ctx);
    }

    pub(crate) fn clear_overridden(&mut self) {
        if let Some(data) = self.transition_data_mut() {
            data.overridden = false;
        }
    }

    /// Whether the end of the last run has reached a reconcile pass, so the
    /// instance can be dropped without the target style being lost.
    pub(crate) fn is_transition_finalized(&self) -> bool {
        self.transition_data().is_some_and(|t| t.finalized)
    }

    pub(crate) fn has_transition_styles(&self) -> bool {
        self.transition_data().is_some_and(|t| t.has_styles())
    }

    /// Advance the transition against the new target and blend into `out`.
    ///
    /// `out` starts as `None` and is cloned from `target` on first write.
    pub(crate) fn animate_transition(
        &mut self,
        ctx: &mut AnimationContext<'_>,
        current: &Arc<ComputedStyle>,
        target: &Arc<ComputedStyle>,
        out: &mut Option<ComputedStyle>,
        suspended: bool,
    ) {
        if suspended || self.is_paused() {
            return;
        }
        let Some(property) = self.transition_property() else {
            return;
        };

        if self.is_new() && ctx.wrappers.properties_equal(property, current, target) {
            return;
        }

        if self.is_postactive() {
            self.update_state_machine(StateInput::MakeNew, ctx);
            self.reset_transition(ctx, None, None);
            if let Some(data) = self.transition_data_mut() {
                data.finalized = true;
            }
            return;
        }

        let retargeted = self
            .to_style()
            .map_or(true, |to| !ctx.wrappers.properties_equal(property, to, target));
        if self.is_new() || retargeted {
            let mut from = current.clone();
            // Opacity may run off the main thread, so `current` can be stale.
            // Restart from the value actually on screen.
            if !self.is_new() && property.covers(PropertyId::Opacity) {
                if let (Some(old_from), Some(old_to)) = (self.from_style(), self.to_style()) {
                    let progress = self.progress(ctx.now, 1.0, 0.0);
                    let mut adjusted = (**current).clone();
                    ctx.wrappers
                        .blend_property(PropertyId::Opacity, &mut adjusted, old_from, old_to, progress);
                    from = Arc::new(adjusted);
                }
            }
            debug!(property = %property, "transition retargeted");
            self.reset_transition(ctx, Some(from), Some(target.clone()));
        }

        let (Some(from), Some(to)) = (self.from_style().cloned(), self.to_style().cloned()) else {
            return;
        };
        let progress = self.progress(ctx.now, 1.0, 0.0);
        let dst = out.get_or_insert_with(|| (**target).clone());
        if ctx.wrappers.blend_properties(property, dst, &from, &to, progress) {
            self.animating = true;
        }
    }

    /// Whether this transition changes `property`.
    pub(crate) fn transition_affects(&self, wrappers: &PropertyWrapperTable, property: PropertyId) -> bool {
        let Some(data) = self.transition_data() else {
            return false;
        };
        match data.property {
            TransitionProperty::Property(p) => p == property,
            TransitionProperty::All => match (&data.from, &data.to) {
                (Some(from), Some(to)) => !wrappers.properties_equal(property.into(), from, to),
                _ => false,
            },
        }
    }
}
