//! A single logical timeline of deferred actions.
//!
//! Every multi-step exchange in the simulator is a chain of small actions
//! registered here with a delay. Actions fire in order of their due time and,
//! for equal due times, in the order they were scheduled. Nothing is
//! preempted: an action runs to completion and may schedule more actions.
//!
//! Actions may belong to a task. While an action of a task is executing, any
//! action it schedules joins the same task, so cancelling a task removes its
//! whole family of pending continuations before any of them can fire.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::{self, Display},
    time::Duration,
};

/// Identifies a cancellable group of scheduled actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

impl Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

/// Orders the queue by due time, breaking ties by scheduling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct EventKey {
    due: Duration,
    sequence: u64,
}

/// An action waiting in the queue.
#[derive(Debug, Clone, PartialEq)]
pub struct Scheduled<A> {
    pub due: Duration,
    pub task: Option<TaskId>,
    pub action: A,
}

#[derive(Debug)]
pub struct Scheduler<A> {
    now: Duration,
    sequence: u64,
    queue: BTreeMap<EventKey, (Option<TaskId>, A)>,
    next_task: u64,
    live_tasks: BTreeSet<TaskId>,
    /// The task of the action currently executing, inherited by anything it
    /// schedules.
    current_task: Option<TaskId>,
}

impl<A> Default for Scheduler<A> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            sequence: 0,
            queue: BTreeMap::new(),
            next_task: 0,
            live_tasks: BTreeSet::new(),
            current_task: None,
        }
    }
}

impl<A> Scheduler<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current simulated time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// The number of actions waiting to fire.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// The due time of the next action, if any.
    pub fn next_due(&self) -> Option<Duration> {
        self.queue.keys().next().map(|key| key.due)
    }

    /// Creates a new task that actions can be scheduled into.
    pub fn spawn_task(&mut self) -> TaskId {
        let task = TaskId(self.next_task);
        self.next_task += 1;
        self.live_tasks.insert(task);
        task
    }

    /// Whether the task exists and has not been cancelled.
    pub fn is_live(&self, task: TaskId) -> bool {
        self.live_tasks.contains(&task)
    }

    /// Schedules an action `delay` after the current time. The action joins
    /// the task of the currently executing action, if there is one.
    pub fn schedule(&mut self, delay: Duration, action: A) {
        self.insert(self.current_task, delay, action);
    }

    /// Schedules an action into a specific task. Scheduling into a cancelled
    /// task does nothing.
    pub fn schedule_in(&mut self, task: TaskId, delay: Duration, action: A) {
        self.insert(Some(task), delay, action);
    }

    fn insert(&mut self, task: Option<TaskId>, delay: Duration, action: A) {
        if let Some(task) = task {
            if !self.live_tasks.contains(&task) {
                tracing::trace!(target: "TASK", %task, "dropping action scheduled into cancelled task");
                return;
            }
        }
        let key = EventKey {
            due: self.now + delay,
            sequence: self.sequence,
        };
        self.sequence += 1;
        self.queue.insert(key, (task, action));
    }

    /// Cancels a task, removing every pending action that belongs to it.
    /// Returns how many actions were removed.
    pub fn cancel(&mut self, task: TaskId) -> usize {
        self.live_tasks.remove(&task);
        let before = self.queue.len();
        self.queue.retain(|_, (owner, _)| *owner != Some(task));
        before - self.queue.len()
    }

    /// Removes the next action if it is due at or before `until`, moving the
    /// clock forward to its due time.
    pub fn pop_due(&mut self, until: Duration) -> Option<Scheduled<A>> {
        let key = *self.queue.keys().next()?;
        if key.due > until {
            return None;
        }
        let (task, action) = self.queue.remove(&key)?;
        self.now = self.now.max(key.due);
        Some(Scheduled {
            due: key.due,
            task,
            action,
        })
    }

    /// Moves the clock forward without firing anything. The clock never runs
    /// backwards.
    pub fn advance_clock(&mut self, to: Duration) {
        self.now = self.now.max(to);
    }

    /// Marks the start of executing an action of `task`.
    pub fn enter(&mut self, task: Option<TaskId>) {
        self.current_task = task;
    }

    /// Marks the end of executing an action.
    pub fn leave(&mut self) {
        self.current_task = None;
    }

    /// Drops every pending action and every task. The clock is kept.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.live_tasks.clear();
        self.current_task = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn drain(scheduler: &mut Scheduler<&'static str>, until: Duration) -> Vec<&'static str> {
        let mut fired = Vec::new();
        while let Some(entry) = scheduler.pop_due(until) {
            fired.push(entry.action);
        }
        fired
    }

    #[test]
    fn fires_in_due_order_then_fifo() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(ms(500), "c");
        scheduler.schedule(ms(100), "a");
        scheduler.schedule(ms(500), "d");
        scheduler.schedule(ms(100), "b");

        assert_eq!(drain(&mut scheduler, ms(400)), ["a", "b"]);
        assert_eq!(scheduler.now(), ms(100));
        assert_eq!(drain(&mut scheduler, ms(1000)), ["c", "d"]);
        assert_eq!(scheduler.now(), ms(500));
    }

    #[test]
    fn delays_are_relative_to_now() {
        let mut scheduler = Scheduler::new();
        scheduler.advance_clock(ms(1000));
        scheduler.schedule(ms(200), "late");
        assert_eq!(scheduler.next_due(), Some(ms(1200)));
        scheduler.advance_clock(ms(10));
        assert_eq!(scheduler.now(), ms(1000));
    }

    #[test]
    fn cancel_removes_descendants() {
        let mut scheduler = Scheduler::new();
        let task = scheduler.spawn_task();
        scheduler.schedule_in(task, ms(100), "tick");
        scheduler.schedule(ms(150), "unrelated");

        let tick = scheduler.pop_due(ms(100)).unwrap();
        assert_eq!(tick.task, Some(task));
        scheduler.enter(tick.task);
        scheduler.schedule(ms(50), "child");
        scheduler.leave();

        assert_eq!(scheduler.pending(), 2);
        assert_eq!(scheduler.cancel(task), 1);
        assert!(!scheduler.is_live(task));

        scheduler.schedule_in(task, ms(10), "too late");
        assert_eq!(drain(&mut scheduler, ms(10_000)), ["unrelated"]);
    }

    #[test]
    fn clear_keeps_clock() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(ms(5), "x");
        scheduler.pop_due(ms(5));
        scheduler.schedule(ms(5), "y");
        scheduler.clear();
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(scheduler.now(), ms(5));
    }
}
