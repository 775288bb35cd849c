//! Engine-wide bookkeeping: composites per element, the virtual timer
//! queue, the software tick, and document suspension.

use crate::composite::CompositeAnimation;
use crate::config::AnimationConfig;
use crate::host::{flush_effects, AnimationHost, DocumentId, ElementId, HostEffect};
use crate::instance::{AnimationContext, TimerTarget};
use crate::timer::{TimerId, TimerQueue};
use crate::wrappers::PropertyWrapperTable;
use slotmap::{new_key_type, SlotMap};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use style::computed::{ComputedStyle, ZIndex};
use style::properties::{PropertyId, TransitionProperty};
use tracing::{debug, info, trace};

new_key_type! {
    /// Handle of a composite animation in the registry.
    pub struct CompositeKey;
}

struct Entry {
    document: DocumentId,
    composite: CompositeAnimation,
}

pub(crate) struct AnimationRegistry {
    config: AnimationConfig,
    wrappers: Arc<PropertyWrapperTable>,
    composites: SlotMap<CompositeKey, Entry>,
    elements: HashMap<ElementId, CompositeKey>,
    timers: TimerQueue<TimerTarget>,
    software_timer: Option<TimerId>,
    suspended_documents: HashSet<DocumentId>,
}

impl AnimationRegistry {
    pub fn new(config: AnimationConfig, wrappers: Arc<PropertyWrapperTable>) -> Self {
        Self {
            config,
            wrappers,
            composites: SlotMap::with_key(),
            elements: HashMap::new(),
            timers: TimerQueue::new(),
            software_timer: None,
            suspended_documents: HashSet::new(),
        }
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    pub fn wrappers(&self) -> &PropertyWrapperTable {
        &self.wrappers
    }

    /// Run `f` on one composite with a fresh context. Sibling requests are
    /// applied before returning; host effects go to `effects`.
    fn with_composite<R>(
        &mut self,
        key: CompositeKey,
        now: f64,
        host: &mut dyn AnimationHost,
        effects: &mut Vec<HostEffect>,
        f: impl FnOnce(&mut CompositeAnimation, &mut AnimationContext<'_>) -> R,
    ) -> Option<R> {
        let Self {
            composites,
            timers,
            wrappers,
            ..
        } = self;
        let entry = composites.get_mut(key)?;
        let mut ctx = AnimationContext {
            now,
            element: entry.composite.element(),
            composite: key,
            host,
            timers,
            wrappers: &**wrappers,
            effects,
            requests: Vec::new(),
        };
        let result = f(&mut entry.composite, &mut ctx);
        entry.composite.apply_requests(&mut ctx);
        Some(result)
    }

    fn ensure_composite(&mut self, host: &dyn AnimationHost, element: ElementId) -> CompositeKey {
        if let Some(key) = self.elements.get(&element) {
            return *key;
        }
        let document = host.document_of(element);
        let suspended = self.suspended_documents.contains(&document);
        let key = self.composites.insert(Entry {
            document,
            composite: CompositeAnimation::new(element, suspended),
        });
        self.elements.insert(element, key);
        debug!(element = element.0, suspended, "composite animation created");
        key
    }

    pub fn composite(&self, element: ElementId) -> Option<&CompositeAnimation> {
        let key = self.elements.get(&element)?;
        self.composites.get(*key).map(|e| &e.composite)
    }

    /// Fold running animations into `target`.
    pub fn reconcile(
        &mut self,
        host: &mut dyn AnimationHost,
        now: f64,
        element: ElementId,
        current: Option<&Arc<ComputedStyle>>,
        target: &Arc<ComputedStyle>,
    ) -> Arc<ComputedStyle> {
        let declared = target.has_animation_declarations()
            || current.is_some_and(|c| c.has_animation_declarations());
        if !declared && !self.elements.contains_key(&element) {
            return target.clone();
        }

        let key = self.ensure_composite(host, element);
        let mut effects = Vec::new();
        let blended = self
            .with_composite(key, now, host, &mut effects, |composite, ctx| {
                composite.animate(ctx, current, target)
            })
            .flatten();
        flush_effects(host, effects);
        self.update_software_timer(now);

        match blended {
            Some(mut style) => {
                // An animated opacity or transform creates a stacking context.
                if style.z_index == ZIndex::Auto && style.needs_stacking_context() {
                    style.z_index = ZIndex::Number(0);
                }
                Arc::new(style)
            }
            None => target.clone(),
        }
    }

    /// Tear down every animation of `element` and forget it.
    pub fn cancel_all(&mut self, host: &mut dyn AnimationHost, now: f64, element: ElementId) {
        let Some(key) = self.elements.get(&element).copied() else {
            return;
        };
        let mut effects = Vec::new();
        let suspended = self
            .with_composite(key, now, host, &mut effects, |composite, ctx| {
                composite.teardown_all(ctx);
                composite.is_suspended()
            })
            .unwrap_or(true);
        if !suspended {
            effects.push(HostEffect::NeedsStyleRecalc(element));
        }
        self.composites.remove(key);
        self.elements.remove(&element);
        debug!(element = element.0, "animations cancelled");
        flush_effects(host, effects);
        self.update_software_timer(now);
    }

    fn keys_for_document(&self, document: DocumentId) -> Vec<CompositeKey> {
        self.composites
            .iter()
            .filter(|(_, e)| e.document == document)
            .map(|(k, _)| k)
            .collect()
    }

    pub fn suspend(&mut self, host: &mut dyn AnimationHost, now: f64, document: DocumentId) {
        if !self.suspended_documents.insert(document) {
            return;
        }
        info!(document = document.0, "suspending animations");
        let mut effects = Vec::new();
        for key in self.keys_for_document(document) {
            self.with_composite(key, now, host, &mut effects, |composite, ctx| composite.suspend(ctx));
        }
        flush_effects(host, effects);
        self.update_software_timer(now);
    }

    pub fn resume(&mut self, host: &mut dyn AnimationHost, now: f64, document: DocumentId) {
        if !self.suspended_documents.remove(&document) {
            return;
        }
        info!(document = document.0, "resuming animations");
        let mut effects = Vec::new();
        for key in self.keys_for_document(document) {
            self.with_composite(key, now, host, &mut effects, |composite, ctx| composite.resume(ctx));
        }
        flush_effects(host, effects);
        self.update_software_timer(now);
    }

    pub fn is_document_suspended(&self, document: DocumentId) -> bool {
        self.suspended_documents.contains(&document)
    }

    /// The host has committed the styles produced by the last recompute.
    pub fn style_committed(&mut self, host: &mut dyn AnimationHost, now: f64) {
        let keys: Vec<_> = self.composites.keys().collect();
        let mut effects = Vec::new();
        for key in keys {
            self.with_composite(key, now, host, &mut effects, |composite, ctx| {
                composite.style_committed(ctx)
            });
        }
        flush_effects(host, effects);
    }

    pub fn set_animation_start_time(&mut self, host: &mut dyn AnimationHost, now: f64, element: ElementId, time: f64) {
        let Some(key) = self.elements.get(&element).copied() else {
            return;
        };
        let mut effects = Vec::new();
        self.with_composite(key, now, host, &mut effects, |composite, ctx| {
            composite.set_animation_start_time(ctx, time)
        });
        flush_effects(host, effects);
    }

    pub fn set_transition_start_time(
        &mut self,
        host: &mut dyn AnimationHost,
        now: f64,
        element: ElementId,
        property: TransitionProperty,
        time: f64,
    ) {
        let Some(key) = self.elements.get(&element).copied() else {
            return;
        };
        let mut effects = Vec::new();
        self.with_composite(key, now, host, &mut effects, |composite, ctx| {
            composite.set_transition_start_time(ctx, property, time)
        });
        flush_effects(host, effects);
    }

    pub fn is_animating_property(&self, element: ElementId, property: PropertyId) -> bool {
        self.composite(element)
            .is_some_and(|c| c.is_animating_property(&self.wrappers, property))
    }

    pub fn has_animations(&self) -> bool {
        self.composites.values().any(|e| !e.composite.is_empty())
    }

    pub fn next_timer_deadline(&self) -> Option<f64> {
        self.timers.next_deadline()
    }

    /// Fire every timer due at `now`. Returns how many fired.
    pub fn service_timers(&mut self, host: &mut dyn AnimationHost, now: f64) -> usize {
        let due = self.timers.pop_due(now);
        let fired = due.len();
        let mut effects = Vec::new();
        for (id, target) in due {
            match target {
                TimerTarget::SoftwareTick => self.software_tick(&mut effects),
                TimerTarget::Instance {
                    composite,
                    instance,
                    action,
                } => {
                    let delivered = self.with_composite(composite, now, host, &mut effects, |c, ctx| {
                        c.fire_timer(ctx, instance, id, action)
                    });
                    if delivered.is_none() {
                        trace!(instance = instance.0, "timer for a removed composite");
                    }
                }
            }
        }
        flush_effects(host, effects);
        self.update_software_timer(now);
        fired
    }

    /// Dirty every element with software-driven animations.
    fn software_tick(&mut self, effects: &mut Vec<HostEffect>) {
        let mut any = false;
        for entry in self.composites.values_mut() {
            let composite = &mut entry.composite;
            if composite.is_suspended() || !composite.is_animating() {
                continue;
            }
            composite.clear_animating();
            effects.push(HostEffect::NeedsStyleRecalc(composite.element()));
            any = true;
        }
        if any {
            effects.push(HostEffect::RequestStyleRecompute);
        }
        self.cleanup_finished();
    }

    /// Run the software tick only while something needs it.
    fn update_software_timer(&mut self, now: f64) {
        let needed = self
            .composites
            .values()
            .any(|e| !e.composite.is_suspended() && e.composite.is_animating());
        match (needed, self.software_timer) {
            (true, None) => {
                let interval = self.config.software_timer_secs();
                self.software_timer = Some(self.timers.start_repeating(now, interval, TimerTarget::SoftwareTick));
                trace!(interval, "software timer started");
            }
            (false, Some(id)) => {
                self.timers.stop(id);
                self.software_timer = None;
                trace!("software timer stopped");
            }
            _ => {}
        }
    }

    /// Drop finished instances, then composites with nothing left to track.
    pub fn cleanup_finished(&mut self) -> usize {
        let mut removed = 0;
        for entry in self.composites.values_mut() {
            removed += entry.composite.cleanup_finished(&mut self.timers);
        }
        let idle: Vec<_> = self
            .composites
            .iter()
            .filter(|(_, e)| e.composite.is_idle())
            .map(|(k, e)| (k, e.composite.element()))
            .collect();
        for (key, element) in idle {
            self.composites.remove(key);
            self.elements.remove(&element);
        }
        if removed > 0 {
            debug!(removed, "finished animations cleaned up");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::AnimationEventKind;
    use crate::host::testing::RecordingHost;
    use std::time::Duration;
    use style::animations::{AnimationDescriptor, TimingFunction};
    use style::computed::SizeValue;

    const ELEMENT: ElementId = ElementId(7);

    fn registry() -> AnimationRegistry {
        let config = AnimationConfig::default();
        let wrappers = Arc::new(PropertyWrapperTable::new(&config));
        AnimationRegistry::new(config, wrappers)
    }

    fn styles(property: PropertyId) -> (Arc<ComputedStyle>, Arc<ComputedStyle>) {
        let decls = vec![AnimationDescriptor::transition(property, Duration::from_secs(1))
            .with_timing_function(TimingFunction::Linear)];
        let old = Arc::new(ComputedStyle {
            opacity: 1.0,
            left: SizeValue::Length(0.0),
            transitions: decls.clone(),
            ..ComputedStyle::default()
        });
        let new = Arc::new(ComputedStyle {
            opacity: 0.0,
            left: SizeValue::Length(100.0),
            transitions: decls,
            ..ComputedStyle::default()
        });
        (old, new)
    }

    /// Reconcile, fire the start timer, commit.
    fn start(registry: &mut AnimationRegistry, host: &mut RecordingHost, old: &Arc<ComputedStyle>, new: &Arc<ComputedStyle>) {
        registry.reconcile(host, 0.0, ELEMENT, Some(old), new);
        registry.service_timers(host, 0.0);
        registry.style_committed(host, 0.0);
    }

    #[test]
    fn test_reconcile_without_declarations_is_passthrough() {
        let mut registry = registry();
        let mut host = RecordingHost::default();
        let style = Arc::new(ComputedStyle::default());
        let out = registry.reconcile(&mut host, 0.0, ELEMENT, Some(&style), &style);
        assert!(Arc::ptr_eq(&out, &style));
        assert!(registry.composite(ELEMENT).is_none());
    }

    #[test]
    fn test_software_timer_runs_while_animating() {
        let mut registry = registry();
        let mut host = RecordingHost::default();
        let (old, new) = styles(PropertyId::Left);
        start(&mut registry, &mut host, &old, &new);
        assert!(registry.software_timer.is_some());

        host.dirty.clear();
        let fired = registry.service_timers(&mut host, 0.025);
        assert_eq!(fired, 1);
        assert_eq!(host.dirty, vec![ELEMENT]);
        assert!(host.recompute_requests > 0);
        // Nothing re-blended since the tick, so it stops.
        assert!(registry.software_timer.is_none());
    }

    #[test]
    fn test_accelerated_only_needs_no_software_timer() {
        let mut registry = registry();
        let mut host = RecordingHost::default();
        let (old, new) = styles(PropertyId::Opacity);
        let out = registry.reconcile(&mut host, 0.0, ELEMENT, Some(&old), &new);
        assert!(registry.software_timer.is_none());
        // Animated opacity forces a stacking context.
        assert_eq!(out.z_index, ZIndex::Number(0));
    }

    #[test]
    fn test_cancel_all_forgets_element() {
        let mut registry = registry();
        let mut host = RecordingHost::default();
        let (old, new) = styles(PropertyId::Left);
        start(&mut registry, &mut host, &old, &new);

        registry.cancel_all(&mut host, 0.5, ELEMENT);
        assert!(registry.composite(ELEMENT).is_none());
        assert!(registry.next_timer_deadline().is_none());
        assert!(host.finished_transitions.contains(&(ELEMENT, PropertyId::Left.into())));
        assert!(!registry.has_animations());
    }

    #[test]
    fn test_suspended_document_freezes_phase() {
        let mut registry = registry();
        let mut host = RecordingHost::default();
        let (old, new) = styles(PropertyId::Left);
        start(&mut registry, &mut host, &old, &new);

        registry.suspend(&mut host, 0.25, DocumentId(1));
        assert!(registry.is_document_suspended(DocumentId(1)));
        assert_eq!(host.suspended, vec![ELEMENT]);
        assert_eq!(registry.service_timers(&mut host, 5.0), 0);

        registry.resume(&mut host, 5.0, DocumentId(1));
        let composite = registry.composite(ELEMENT).unwrap();
        let anim = composite.transition(PropertyId::Left.into()).unwrap();
        assert!((anim.elapsed(5.0) - 0.25).abs() < 1e-9);
        assert_eq!(host.resumed, vec![ELEMENT]);
    }

    #[test]
    fn test_end_event_and_cleanup() {
        let mut registry = registry();
        let mut host = RecordingHost::default();
        host.listen(ELEMENT, AnimationEventKind::TransitionEnd);
        let (old, new) = styles(PropertyId::Left);
        start(&mut registry, &mut host, &old, &new);

        registry.service_timers(&mut host, 1.0);
        assert!(host.events.is_empty());
        assert!(host.finished_transitions.is_empty());

        registry.service_timers(&mut host, 1.0);
        assert_eq!(host.event_kinds(), vec![AnimationEventKind::TransitionEnd]);
        assert_eq!(host.finished_transitions.len(), 1);

        // Kept until a reconcile pass has rendered the end value.
        assert_eq!(registry.cleanup_finished(), 0);
        let out = registry.reconcile(&mut host, 1.0, ELEMENT, Some(&old), &new);
        assert_eq!(out.left, SizeValue::Length(100.0));
        assert_eq!(registry.cleanup_finished(), 1);
        assert!(registry.composite(ELEMENT).is_none());
    }

    #[test]
    fn test_software_ticks_across_end_land_on_target() {
        let config = AnimationConfig::default().with_software_timer_interval(Duration::from_millis(250));
        let wrappers = Arc::new(PropertyWrapperTable::new(&config));
        let mut registry = AnimationRegistry::new(config, wrappers);
        let mut host = RecordingHost::default();
        let (old, new) = styles(PropertyId::Left);

        let mut rendered = old.clone();
        let mut lefts = Vec::new();
        for step in 0..=8 {
            let now = f64::from(step) * 0.25;
            for _ in 0..8 {
                if registry.service_timers(&mut host, now) == 0 {
                    break;
                }
            }
            rendered = registry.reconcile(&mut host, now, ELEMENT, Some(&rendered), &new);
            registry.service_timers(&mut host, now);
            registry.style_committed(&mut host, now);
            lefts.push(rendered.left);
        }

        assert_eq!(lefts[3], SizeValue::Length(75.0));
        assert_eq!(lefts[4], SizeValue::Length(100.0));
        assert!(lefts[4..].iter().all(|l| *l == SizeValue::Length(100.0)));
        assert_eq!(host.began_transitions.len(), 1);
    }
}
