use std::time::Duration;

const MIN_PERIOD: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone, Copy)]
struct Timer {
    handle: TimerHandle,
    remaining: Duration,
    period: Option<Duration>,
}

/// Simulated-time timers. Every scheduled timer gets a fresh handle, so a
/// fire that arrives after its owner moved on can be told apart from the
/// current one and dropped.
#[derive(Debug, Default)]
pub struct TickScheduler {
    next_id: u64,
    timers: Vec<Timer>,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_once(&mut self, delay: Duration) -> TimerHandle {
        self.push(delay, None)
    }

    pub fn schedule_repeating(&mut self, period: Duration) -> TimerHandle {
        let period = period.max(MIN_PERIOD);
        self.push(period, Some(period))
    }

    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.timers.len();
        self.timers.retain(|timer| timer.handle != handle);
        self.timers.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.timers.iter().any(|timer| timer.handle == handle)
    }

    pub fn pending_count(&self) -> usize {
        self.timers.len()
    }

    /// Advances simulated time by `dt` and returns every fire in
    /// chronological order. Repeating timers may fire several times within
    /// one call; timers due at the same instant fire in scheduling order.
    pub fn advance(&mut self, dt: Duration) -> Vec<TimerHandle> {
        let mut fired = Vec::new();
        let mut budget = dt;
        while let Some(handle) = self.next_fire(&mut budget) {
            fired.push(handle);
        }
        self.elapse(budget);
        fired
    }

    /// Pops the earliest fire due within `budget`, moving simulated time up to
    /// it and charging that span to `budget`. Owners that cancel timers while
    /// handling a fire should drain with this instead of `advance`, then hand
    /// the leftover budget to `elapse`.
    pub fn next_fire(&mut self, budget: &mut Duration) -> Option<TimerHandle> {
        let (index, due) = self
            .timers
            .iter()
            .enumerate()
            .min_by_key(|(_, timer)| (timer.remaining, timer.handle.0))
            .map(|(index, timer)| (index, timer.remaining))?;
        if due > *budget {
            return None;
        }

        *budget -= due;
        self.elapse(due);

        let timer = self.timers[index];
        match timer.period {
            Some(period) => self.timers[index].remaining = period,
            None => {
                self.timers.remove(index);
            }
        }
        Some(timer.handle)
    }

    /// Moves simulated time forward without firing anything.
    pub fn elapse(&mut self, dt: Duration) {
        for timer in &mut self.timers {
            timer.remaining = timer.remaining.saturating_sub(dt);
        }
    }

    fn push(&mut self, delay: Duration, period: Option<Duration>) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.timers.push(Timer {
            handle,
            remaining: delay,
            period,
        });
        handle
    }
}
