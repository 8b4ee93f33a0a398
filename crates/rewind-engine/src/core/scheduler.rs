//! Activation scheduling against a scrubbing clock.
//!
//! The scheduler keeps every entity's activation window in two orderings, one
//! by start time and one by kill time, plus one cursor into each. The cursors
//! are the number of entries whose boundary is at or before the current time,
//! so moving the clock only walks the entries whose boundary was crossed, in
//! whichever direction the clock moved.
//!
//! Structural changes are queued and applied at the start of the next
//! `advance`. A single change is patched in place; a larger batch rebuilds
//! the orderings and recalculates from scratch.

use std::collections::{HashMap, HashSet};

use crate::api::config::EngineConfig;
use crate::api::types::{ActivationWindow, EntityId, Transition};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Slot {
    id: EntityId,
    start: f32,
    kill: f32,
}

impl Slot {
    fn new(id: EntityId, window: ActivationWindow) -> Self {
        Self { id, start: window.start, kill: window.kill }
    }
}

/// A buffered structural change.
#[derive(Debug, Clone, Copy)]
enum PendingOp {
    Insert(EntityId, ActivationWindow),
    Remove(EntityId),
    Retime(EntityId, ActivationWindow),
}

impl PendingOp {
    fn id(self) -> EntityId {
        match self {
            PendingOp::Insert(id, _) | PendingOp::Remove(id) | PendingOp::Retime(id, _) => id,
        }
    }
}

/// Membership changes accumulated during one `advance`, collapsed so that an
/// entity toggled on and back off reports nothing.
#[derive(Debug, Default)]
struct TransitionLog {
    initial: HashMap<EntityId, bool>,
    order: Vec<EntityId>,
}

impl TransitionLog {
    fn touch(&mut self, id: EntityId, was_active: bool) {
        if !self.initial.contains_key(&id) {
            self.initial.insert(id, was_active);
            self.order.push(id);
        }
    }

    fn finish(&mut self, active: &HashSet<EntityId>) -> Vec<Transition> {
        let mut transitions = Vec::new();
        for id in self.order.drain(..) {
            let was = self.initial.get(&id).copied().unwrap_or(false);
            let now = active.contains(&id);
            match (was, now) {
                (false, true) => transitions.push(Transition::Activated(id)),
                (true, false) => transitions.push(Transition::Deactivated(id)),
                _ => {}
            }
        }
        self.initial.clear();
        transitions
    }
}

/// Tracks which entities are alive at the current clock value.
#[derive(Debug)]
pub struct ActivationScheduler {
    windows: HashMap<EntityId, ActivationWindow>,
    /// Sorted by `(start, id)`.
    by_start: Vec<Slot>,
    /// Sorted by `(kill, id)`.
    by_kill: Vec<Slot>,
    /// Entries of `by_start` with `start <= current_time`.
    activate_index: usize,
    /// Entries of `by_kill` with `kill <= current_time`.
    deactivate_index: usize,
    active: HashSet<EntityId>,
    current_time: f32,
    pending: Vec<PendingOp>,
    recalculate_threshold: usize,
    log: TransitionLog,
}

impl ActivationScheduler {
    pub fn new() -> Self {
        Self::with_config(&EngineConfig::default())
    }

    pub fn with_config(config: &EngineConfig) -> Self {
        let capacity = config.initial_capacity;
        Self {
            windows: HashMap::with_capacity(capacity),
            by_start: Vec::with_capacity(capacity),
            by_kill: Vec::with_capacity(capacity),
            activate_index: 0,
            deactivate_index: 0,
            active: HashSet::with_capacity(capacity),
            current_time: 0.0,
            pending: Vec::new(),
            recalculate_threshold: config.recalculate_threshold,
            log: TransitionLog::default(),
        }
    }

    // -- Queued mutation --

    /// Schedule a new entity. Applied on the next `advance`.
    pub fn queue_insert(&mut self, id: EntityId, window: ActivationWindow) {
        self.pending.push(PendingOp::Insert(id, window));
    }

    /// Schedule removal of an entity. Applied on the next `advance`.
    pub fn queue_remove(&mut self, id: EntityId) {
        self.pending.push(PendingOp::Remove(id));
    }

    /// Schedule a change of an entity's window. Applied on the next `advance`.
    pub fn queue_retime(&mut self, id: EntityId, window: ActivationWindow) {
        self.pending.push(PendingOp::Retime(id, window));
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    // -- Clock --

    /// Apply queued changes, then move the clock to `time`.
    ///
    /// Returns one transition per entity whose membership actually changed
    /// during this call.
    pub fn advance(&mut self, time: f32) -> Vec<Transition> {
        if time.is_nan() {
            log::warn!("ignoring advance to NaN time");
            return Vec::new();
        }

        self.apply_pending();

        if time >= self.current_time {
            self.step_forward(time);
        } else {
            self.step_backward(time);
        }
        self.current_time = time;

        let transitions = self.log.finish(&self.active);
        for transition in &transitions {
            log::trace!("{:?} at {}", transition, time);
        }
        transitions
    }

    /// Reset cursors and the active set, then replay forward from the first
    /// entry to `time`. Queued changes are applied first.
    pub fn recalculate(&mut self, time: f32) -> Vec<Transition> {
        if time.is_nan() {
            log::warn!("ignoring recalculation at NaN time");
            return Vec::new();
        }
        self.apply_pending();
        self.current_time = time;
        self.replay();
        self.log.finish(&self.active)
    }

    /// Forget every entity and pending change. No transitions are reported,
    /// so the owner is responsible for hiding whatever was active.
    pub fn clear(&mut self) {
        self.windows.clear();
        self.by_start.clear();
        self.by_kill.clear();
        self.activate_index = 0;
        self.deactivate_index = 0;
        self.active.clear();
        self.pending.clear();
        self.log = TransitionLog::default();
    }

    // -- Queries --

    /// Number of scheduled entities (pending changes excluded).
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.windows.contains_key(&id)
    }

    pub fn is_active(&self, id: EntityId) -> bool {
        self.active.contains(&id)
    }

    /// Currently active entities, in no particular order.
    pub fn active(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.active.iter().copied()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    /// `(activate_index, deactivate_index)`.
    pub fn cursors(&self) -> (usize, usize) {
        (self.activate_index, self.deactivate_index)
    }

    pub fn window(&self, id: EntityId) -> Option<ActivationWindow> {
        self.windows.get(&id).copied()
    }

    // -- Internals --

    fn step_forward(&mut self, time: f32) {
        while let Some(slot) = self.by_start.get(self.activate_index) {
            if slot.start > time {
                break;
            }
            let id = slot.id;
            self.activate_index += 1;
            self.set_active(id, true);
        }
        while let Some(slot) = self.by_kill.get(self.deactivate_index) {
            if slot.kill > time {
                break;
            }
            let id = slot.id;
            self.deactivate_index += 1;
            self.set_active(id, false);
        }
    }

    fn step_backward(&mut self, time: f32) {
        while self.deactivate_index > 0 {
            let slot = self.by_kill[self.deactivate_index - 1];
            if slot.kill <= time {
                break;
            }
            self.deactivate_index -= 1;
            self.set_active(slot.id, true);
        }
        while self.activate_index > 0 {
            let slot = self.by_start[self.activate_index - 1];
            if slot.start <= time {
                break;
            }
            self.activate_index -= 1;
            self.set_active(slot.id, false);
        }
    }

    fn set_active(&mut self, id: EntityId, active: bool) {
        let was_active = self.active.contains(&id);
        self.log.touch(id, was_active);
        if active {
            self.active.insert(id);
        } else {
            self.active.remove(&id);
        }
    }

    fn replay(&mut self) {
        let previous: Vec<EntityId> = self.active.drain().collect();
        for id in previous {
            self.log.touch(id, true);
        }
        self.activate_index = 0;
        self.deactivate_index = 0;
        let time = self.current_time;
        self.step_forward(time);
    }

    fn apply_pending(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let ops = std::mem::take(&mut self.pending);

        if ops.len() > self.recalculate_threshold {
            log::debug!(
                "applying {} scheduler changes with full recalculation at {}",
                ops.len(),
                self.current_time
            );
            for op in ops {
                self.apply_to_windows(op);
            }
            self.rebuild_orderings();
            self.replay();
        } else {
            for op in ops {
                self.patch(op);
            }
        }
    }

    /// Batch path: only the window map is touched, orderings are rebuilt after.
    fn apply_to_windows(&mut self, op: PendingOp) {
        match op {
            PendingOp::Insert(id, window) => {
                if self.windows.contains_key(&id) {
                    log::warn!("entity {} already scheduled, insert ignored", id);
                } else {
                    self.windows.insert(id, window);
                }
            }
            PendingOp::Remove(id) => {
                if self.windows.remove(&id).is_none() {
                    log::warn!("entity {} not scheduled, remove ignored", id);
                }
            }
            PendingOp::Retime(id, window) => match self.windows.get_mut(&id) {
                Some(existing) => *existing = window,
                None => log::warn!("entity {} not scheduled, retime ignored", id),
            },
        }
    }

    /// Single-change path: sorted insertion/removal, then cursor recomputation.
    fn patch(&mut self, op: PendingOp) {
        match op {
            PendingOp::Insert(id, window) => {
                if self.windows.contains_key(&id) {
                    log::warn!("entity {} already scheduled, insert ignored", id);
                    return;
                }
                self.windows.insert(id, window);
                self.insert_sorted(Slot::new(id, window));
            }
            PendingOp::Remove(id) => {
                let Some(window) = self.windows.remove(&id) else {
                    log::warn!("entity {} not scheduled, remove ignored", id);
                    return;
                };
                self.remove_sorted(Slot::new(id, window));
            }
            PendingOp::Retime(id, window) => {
                let Some(existing) = self.windows.get_mut(&id) else {
                    log::warn!("entity {} not scheduled, retime ignored", id);
                    return;
                };
                let old = Slot::new(id, *existing);
                *existing = window;
                self.remove_sorted(old);
                self.insert_sorted(Slot::new(id, window));
            }
        }

        self.seek_cursors();
        let id = op.id();
        let now = self
            .windows
            .get(&id)
            .is_some_and(|w| w.contains(self.current_time));
        self.set_active(id, now);
    }

    fn insert_sorted(&mut self, slot: Slot) {
        let at = self.by_start.partition_point(|s| start_key(s) < start_key(&slot));
        self.by_start.insert(at, slot);
        let at = self.by_kill.partition_point(|s| kill_key(s) < kill_key(&slot));
        self.by_kill.insert(at, slot);
    }

    fn remove_sorted(&mut self, slot: Slot) {
        let at = self.by_start.partition_point(|s| start_key(s) < start_key(&slot));
        if self.by_start.get(at).is_some_and(|s| s.id == slot.id) {
            self.by_start.remove(at);
        }
        let at = self.by_kill.partition_point(|s| kill_key(s) < kill_key(&slot));
        if self.by_kill.get(at).is_some_and(|s| s.id == slot.id) {
            self.by_kill.remove(at);
        }
    }

    fn rebuild_orderings(&mut self) {
        self.by_start.clear();
        self.by_start
            .extend(self.windows.iter().map(|(&id, &window)| Slot::new(id, window)));
        self.by_start.sort_by_key(start_key);
        self.by_kill.clear();
        self.by_kill.extend_from_slice(&self.by_start);
        self.by_kill.sort_by_key(kill_key);
    }

    /// Binary-search both cursors for the current time.
    fn seek_cursors(&mut self) {
        let time = self.current_time;
        self.activate_index = self.by_start.partition_point(|s| s.start <= time);
        self.deactivate_index = self.by_kill.partition_point(|s| s.kill <= time);
    }
}

impl Default for ActivationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Ordering key with the id as tie-break, so equal times sort deterministically.
#[inline]
fn start_key(slot: &Slot) -> (OrdF32, EntityId) {
    (OrdF32(slot.start), slot.id)
}

#[inline]
fn kill_key(slot: &Slot) -> (OrdF32, EntityId) {
    (OrdF32(slot.kill), slot.id)
}

/// Total order over window times.
#[derive(Debug, Clone, Copy, PartialEq)]
struct OrdF32(f32);

impl Eq for OrdF32 {}

impl PartialOrd for OrdF32 {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrdF32 {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::Rng;

    const A: EntityId = EntityId(1);
    const B: EntityId = EntityId(2);

    fn window(start: f32, kill: f32) -> ActivationWindow {
        ActivationWindow::new(start, kill)
    }

    fn sorted(ids: impl Iterator<Item = EntityId>) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = ids.collect();
        ids.sort();
        ids
    }

    fn active(s: &ActivationScheduler) -> Vec<EntityId> {
        sorted(s.active())
    }

    /// Linear-scan reference for the active set.
    fn expected(windows: &HashMap<EntityId, ActivationWindow>, time: f32) -> Vec<EntityId> {
        sorted(
            windows
                .iter()
                .filter(|(_, w)| w.contains(time))
                .map(|(&id, _)| id),
        )
    }

    /// Linear-scan reference for the cursors.
    fn expected_cursors(windows: &HashMap<EntityId, ActivationWindow>, time: f32) -> (usize, usize) {
        (
            windows.values().filter(|w| w.start <= time).count(),
            windows.values().filter(|w| w.kill <= time).count(),
        )
    }

    fn two_entities() -> ActivationScheduler {
        let mut s = ActivationScheduler::new();
        // Two queued changes: goes through the recalculation path.
        s.queue_insert(A, window(0.0, 2.0));
        s.queue_insert(B, window(1.0, 3.0));
        s
    }

    #[test]
    fn concrete_scrub_scenario() {
        let mut s = two_entities();

        assert_eq!(s.advance(0.0), vec![Transition::Activated(A)]);
        assert_eq!(active(&s), vec![A]);

        assert_eq!(s.advance(1.5), vec![Transition::Activated(B)]);
        assert_eq!(active(&s), vec![A, B]);

        assert_eq!(s.advance(2.5), vec![Transition::Deactivated(A)]);
        assert_eq!(active(&s), vec![B]);

        let back = s.advance(0.5);
        assert_eq!(active(&s), vec![A]);
        assert_eq!(back.len(), 2);
        assert!(back.contains(&Transition::Activated(A)));
        assert!(back.contains(&Transition::Deactivated(B)));
    }

    #[test]
    fn boundaries_are_half_open() {
        let mut s = two_entities();
        s.advance(2.0);
        assert_eq!(active(&s), vec![B]);
        s.advance(3.0);
        assert!(active(&s).is_empty());
        s.advance(1.0);
        assert_eq!(active(&s), vec![A, B]);
    }

    #[test]
    fn repeated_advance_is_idempotent() {
        let mut s = two_entities();
        s.advance(1.5);
        let cursors = s.cursors();
        assert!(s.advance(1.5).is_empty());
        assert_eq!(s.cursors(), cursors);
        assert_eq!(active(&s), vec![A, B]);
    }

    #[test]
    fn jumping_over_a_whole_window_reports_nothing() {
        let mut s = ActivationScheduler::new();
        s.queue_insert(A, window(1.0, 2.0));
        assert!(s.advance(0.0).is_empty());
        assert!(s.advance(5.0).is_empty());
        assert!(s.advance(0.5).is_empty());
        assert_eq!(s.cursors(), (0, 0));
    }

    #[test]
    fn forward_and_backward_agree() {
        let mut forward = two_entities();
        let mut backward = two_entities();
        forward.advance(0.0);
        forward.advance(1.5);
        backward.advance(10.0);
        backward.advance(1.5);
        assert_eq!(active(&forward), active(&backward));
        assert_eq!(forward.cursors(), backward.cursors());
    }

    #[test]
    fn live_insert_activates_immediately() {
        let mut s = two_entities();
        s.advance(1.5);
        let c = EntityId(3);
        s.queue_insert(c, window(1.0, 5.0));
        assert_eq!(s.pending_len(), 1);
        assert_eq!(s.advance(1.5), vec![Transition::Activated(c)]);
        assert_eq!(active(&s), vec![A, B, c]);
        assert_eq!(s.cursors(), (3, 0));
    }

    #[test]
    fn live_insert_in_the_past_stays_inactive() {
        let mut s = two_entities();
        s.advance(2.5);
        let c = EntityId(3);
        s.queue_insert(c, window(0.0, 1.0));
        assert!(s.advance(2.5).is_empty());
        assert_eq!(s.cursors(), (3, 2));
        // And it comes back when scrubbing into it.
        let back = s.advance(0.5);
        assert!(back.contains(&Transition::Activated(c)));
        assert_eq!(active(&s), vec![A, c]);
    }

    #[test]
    fn live_remove_deactivates_and_forgets() {
        let mut s = two_entities();
        s.advance(1.5);
        s.queue_remove(A);
        assert_eq!(s.advance(1.5), vec![Transition::Deactivated(A)]);
        assert_eq!(active(&s), vec![B]);
        assert_eq!(s.len(), 1);
        s.advance(0.5);
        assert!(active(&s).is_empty());
    }

    #[test]
    fn retime_moves_the_window() {
        let mut s = two_entities();
        s.advance(1.5);
        s.queue_retime(A, window(5.0, 6.0));
        assert_eq!(s.advance(1.5), vec![Transition::Deactivated(A)]);
        let later = s.advance(5.5);
        assert_eq!(later.len(), 2);
        assert!(later.contains(&Transition::Activated(A)));
        assert!(later.contains(&Transition::Deactivated(B)));
        assert_eq!(s.window(A), Some(window(5.0, 6.0)));
    }

    #[test]
    fn unknown_remove_is_ignored() {
        let mut s = two_entities();
        s.advance(1.5);
        s.queue_remove(EntityId(99));
        assert!(s.advance(1.5).is_empty());
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn insert_and_remove_in_one_batch_cancel_out() {
        let mut s = two_entities();
        s.advance(1.5);
        let c = EntityId(3);
        s.queue_insert(c, window(1.0, 2.0));
        s.queue_remove(c);
        assert!(s.advance(1.5).is_empty());
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn recalculation_reports_only_net_changes() {
        let mut s = two_entities();
        s.advance(1.5);
        let transitions = s.recalculate(1.5);
        assert!(transitions.is_empty());
        assert_eq!(active(&s), vec![A, B]);
    }

    #[test]
    fn higher_threshold_patches_batches_in_place() {
        let config = EngineConfig { recalculate_threshold: 8, ..EngineConfig::default() };
        let mut s = ActivationScheduler::with_config(&config);
        s.queue_insert(A, window(0.0, 2.0));
        s.queue_insert(B, window(1.0, 3.0));
        s.advance(1.5);
        assert_eq!(active(&s), vec![A, B]);
        assert_eq!(s.cursors(), (2, 0));
    }

    #[test]
    fn clear_forgets_everything() {
        let mut s = two_entities();
        s.advance(1.5);
        s.clear();
        assert!(s.is_empty());
        assert_eq!(s.active_count(), 0);
        assert_eq!(s.cursors(), (0, 0));
        assert!(s.advance(2.0).is_empty());
    }

    #[test]
    fn nan_time_is_ignored() {
        let mut s = two_entities();
        s.advance(1.5);
        assert!(s.advance(f32::NAN).is_empty());
        assert_eq!(s.current_time(), 1.5);
        assert_eq!(active(&s), vec![A, B]);
    }

    #[test]
    fn matches_linear_scan_for_random_sets_and_times() {
        let mut rng = Rng::new(0x5eed);
        for round in 0..20 {
            let config = EngineConfig {
                recalculate_threshold: (round % 3) as usize,
                ..EngineConfig::default()
            };
            let mut s = ActivationScheduler::with_config(&config);
            let mut windows = HashMap::new();
            let mut next_id = 0u32;

            for _ in 0..60 {
                // Random structural changes, sometimes none.
                for _ in 0..rng.next_int(4) {
                    match rng.next_int(3) {
                        0 => {
                            let start = rng.next_range(-5.0, 50.0);
                            let w = window(start, start + rng.next_range(0.01, 10.0));
                            let id = EntityId(next_id);
                            next_id += 1;
                            s.queue_insert(id, w);
                            windows.insert(id, w);
                        }
                        1 if !windows.is_empty() => {
                            let id = EntityId(rng.next_int(next_id));
                            if windows.remove(&id).is_some() {
                                s.queue_remove(id);
                            }
                        }
                        _ if !windows.is_empty() => {
                            let id = EntityId(rng.next_int(next_id));
                            if windows.contains_key(&id) {
                                let start = rng.next_range(-5.0, 50.0);
                                let w = window(start, start + rng.next_range(0.01, 10.0));
                                s.queue_retime(id, w);
                                windows.insert(id, w);
                            }
                        }
                        _ => {}
                    }
                }

                let before = active(&s);
                let time = rng.next_range(-10.0, 60.0);
                let transitions = s.advance(time);

                let want = expected(&windows, time);
                assert_eq!(active(&s), want, "round {} time {}", round, time);
                assert_eq!(s.cursors(), expected_cursors(&windows, time));

                // Transitions are exactly the membership diff.
                for t in &transitions {
                    match *t {
                        Transition::Activated(id) => {
                            assert!(!before.contains(&id) && want.contains(&id))
                        }
                        Transition::Deactivated(id) => {
                            assert!(before.contains(&id) && !want.contains(&id))
                        }
                    }
                }
                let changed = want.iter().filter(|id| !before.contains(id)).count()
                    + before.iter().filter(|id| !want.contains(id)).count();
                assert_eq!(transitions.len(), changed);
            }
        }
    }
}
