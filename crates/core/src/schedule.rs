use std::time::Duration;

/// Identifies a pending timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Timer<T> {
    id: TimerId,
    deadline: Duration,
    task: T,
}

/// Host-driven timers and display-frame callbacks.
///
/// The scheduler never reads a clock. The host moves time forward with
/// [`advance`](Scheduler::advance) and runs frames with
/// [`take_frame`](Scheduler::take_frame), so every delay is deterministic in
/// tests. Timers cannot be cancelled; a task that may go stale must check its
/// own preconditions when it runs.
#[derive(Debug)]
pub struct Scheduler<T> {
    now: Duration,
    next_id: u64,
    timers: Vec<Timer<T>>,
    frame: Vec<T>,
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            timers: Vec::new(),
            frame: Vec::new(),
        }
    }

    /// Current monotonic time as last reported by the host.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Run `task` once `delay` has elapsed.
    pub fn set_timeout(&mut self, delay: Duration, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            deadline: self.now.saturating_add(delay),
            task,
        });
        id
    }

    /// Run `task` on the next display frame.
    pub fn request_frame(&mut self, task: T) {
        self.frame.push(task);
    }

    /// Move time to `now` and return the tasks that became due, ordered by
    /// deadline and then by scheduling order. Time never moves backwards.
    pub fn advance(&mut self, now: Duration) -> Vec<T> {
        self.now = self.now.max(now);
        let current = self.now;

        let (mut due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.timers)
            .into_iter()
            .partition(|t| t.deadline <= current);
        self.timers = pending;

        due.sort_by_key(|t| (t.deadline, t.id));
        due.into_iter().map(|t| t.task).collect()
    }

    /// Tasks queued for the current frame. Anything requested while these
    /// run lands in the next frame.
    pub fn take_frame(&mut self) -> Vec<T> {
        std::mem::take(&mut self.frame)
    }

    pub fn has_frame_pending(&self) -> bool {
        !self.frame.is_empty()
    }

    /// The earliest pending deadline, for hosts that arm a single timer.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.iter().map(|t| t.deadline).min()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn timers_fire_in_deadline_order() {
        let mut s = Scheduler::new();
        s.set_timeout(ms(300), "late");
        s.set_timeout(ms(100), "early");
        s.set_timeout(ms(100), "early-second");

        assert!(s.advance(ms(50)).is_empty());
        assert_eq!(s.next_deadline(), Some(ms(100)));
        assert_eq!(s.advance(ms(1000)), vec!["early", "early-second", "late"]);
        assert_eq!(s.pending_timers(), 0);
    }

    #[test]
    fn delays_are_relative_to_current_time() {
        let mut s = Scheduler::new();
        s.advance(ms(1000));
        s.set_timeout(ms(500), 1);
        assert!(s.advance(ms(1499)).is_empty());
        assert_eq!(s.advance(ms(1500)), vec![1]);
    }

    #[test]
    fn time_does_not_run_backwards() {
        let mut s: Scheduler<u8> = Scheduler::new();
        s.advance(ms(200));
        s.advance(ms(100));
        assert_eq!(s.now(), ms(200));
    }

    #[test]
    fn frame_requests_made_during_a_frame_wait_for_the_next() {
        let mut s = Scheduler::new();
        s.request_frame('a');
        let current = s.take_frame();
        assert_eq!(current, vec!['a']);
        s.request_frame('b');
        assert!(s.has_frame_pending());
        assert_eq!(s.take_frame(), vec!['b']);
        assert!(!s.has_frame_pending());
    }
}
