//! One-shot and repeating timers on a virtual timeline.
//!
//! Nothing here sleeps. The owner asks for due timers with
//! [`TimerQueue::pop_due`] whenever its run loop wakes up.

use ordered_float::OrderedFloat;
use slotmap::{new_key_type, SlotMap};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

new_key_type! {
    /// Handle to a scheduled timer.
    pub struct TimerId;
}

#[derive(Debug)]
struct Timer<T> {
    deadline: f64,
    interval: Option<f64>,
    seq: u64,
    payload: T,
}

/// Deadline-ordered timer storage with lazy cancellation.
#[derive(Debug)]
pub struct TimerQueue<T> {
    timers: SlotMap<TimerId, Timer<T>>,
    heap: BinaryHeap<Reverse<(OrderedFloat<f64>, u64, TimerId)>>,
    seq: u64,
}

impl<T: Clone> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            timers: SlotMap::with_key(),
            heap: BinaryHeap::new(),
            seq: 0,
        }
    }

    fn push(&mut self, id: TimerId, deadline: f64) {
        self.seq += 1;
        if let Some(timer) = self.timers.get_mut(id) {
            timer.deadline = deadline;
            timer.seq = self.seq;
        }
        self.heap.push(Reverse((OrderedFloat(deadline), self.seq, id)));
    }

    /// Fire `payload` once, `delay` seconds after `now`.
    pub fn start_one_shot(&mut self, now: f64, delay: f64, payload: T) -> TimerId {
        let id = self.timers.insert(Timer {
            deadline: now,
            interval: None,
            seq: 0,
            payload,
        });
        self.push(id, now + delay.max(0.0));
        id
    }

    /// Fire `payload` every `interval` seconds, first at `now + interval`.
    pub fn start_repeating(&mut self, now: f64, interval: f64, payload: T) -> TimerId {
        let interval = interval.max(f64::EPSILON);
        let id = self.timers.insert(Timer {
            deadline: now,
            interval: Some(interval),
            seq: 0,
            payload,
        });
        self.push(id, now + interval);
        id
    }

    /// Cancel a timer. Unknown or already fired ids are ignored.
    pub fn stop(&mut self, id: TimerId) -> bool {
        self.timers.remove(id).is_some()
    }

    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    /// Seconds left before `id` fires.
    pub fn remaining(&self, id: TimerId, now: f64) -> Option<f64> {
        self.timers.get(id).map(|t| (t.deadline - now).max(0.0))
    }

    pub fn next_deadline(&self) -> Option<f64> {
        self.timers
            .values()
            .map(|t| OrderedFloat(t.deadline))
            .min()
            .map(|d| d.0)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Remove and return every timer due at `now`, earliest first.
    ///
    /// One-shot timers are dropped; repeating timers are rescheduled past
    /// `now`. Timers started while the caller handles the result are not
    /// part of this batch.
    pub fn pop_due(&mut self, now: f64) -> Vec<(TimerId, T)> {
        let mut due = Vec::new();
        while let Some(Reverse((deadline, seq, id))) = self.heap.peek().copied() {
            if deadline.0 > now {
                break;
            }
            self.heap.pop();

            let Some(timer) = self.timers.get(id) else {
                continue;
            };
            if timer.seq != seq {
                continue;
            }

            let (interval, last) = (timer.interval, timer.deadline);
            due.push((id, timer.payload.clone()));
            match interval {
                Some(interval) => {
                    let mut next = last + interval;
                    if next <= now {
                        next = now + interval;
                    }
                    self.push(id, next);
                }
                None => {
                    self.timers.remove(id);
                }
            }
        }
        due
    }
}

impl<T: Clone> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_shot_fires_once_in_order() {
        let mut queue = TimerQueue::new();
        queue.start_one_shot(0.0, 0.2, "late");
        queue.start_one_shot(0.0, 0.1, "early");

        assert!(queue.pop_due(0.05).is_empty());
        let fired: Vec<_> = queue.pop_due(0.5).into_iter().map(|(_, p)| p).collect();
        assert_eq!(fired, vec!["early", "late"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_zero_delay_is_not_synchronous() {
        let mut queue = TimerQueue::new();
        let id = queue.start_one_shot(1.0, 0.0, ());
        assert!(queue.is_active(id));
        assert_eq!(queue.pop_due(1.0).len(), 1);
        assert!(!queue.is_active(id));
    }

    #[test]
    fn test_stop_cancels() {
        let mut queue = TimerQueue::new();
        let id = queue.start_one_shot(0.0, 0.1, 1);
        assert!(queue.stop(id));
        assert!(!queue.stop(id));
        assert!(queue.pop_due(1.0).is_empty());
    }

    #[test]
    fn test_repeating_reschedules() {
        let mut queue = TimerQueue::new();
        let id = queue.start_repeating(0.0, 0.025, "tick");
        assert_eq!(queue.pop_due(0.025).len(), 1);
        assert!(queue.is_active(id));
        assert!((queue.next_deadline().unwrap() - 0.05).abs() < 1e-9);

        // A late wake-up fires once and skips ahead.
        assert_eq!(queue.pop_due(1.0).len(), 1);
        assert!((queue.next_deadline().unwrap() - 1.025).abs() < 1e-9);
    }

    #[test]
    fn test_remaining() {
        let mut queue = TimerQueue::new();
        let id = queue.start_one_shot(0.0, 2.0, ());
        assert!((queue.remaining(id, 0.5).unwrap() - 1.5).abs() < 1e-9);
        queue.stop(id);
        assert_eq!(queue.remaining(id, 0.5), None);
    }
}
