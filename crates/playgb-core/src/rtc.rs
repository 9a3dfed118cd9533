use log::debug;

/// One hour.
pub const DEFAULT_MAX_CATCH_UP_SECS: u64 = 60 * 60;

/// Replays wall-clock seconds into the core's one-second RTC tick. Seconds
/// beyond the per-tick cap carry over to later ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtcCatchUp {
    last_epoch: u64,
    max_step: u64,
}

impl RtcCatchUp {
    pub fn new(now_epoch: u64, max_step: u64) -> Self {
        Self {
            last_epoch: now_epoch,
            max_step,
        }
    }

    pub fn last_epoch(&self) -> u64 {
        self.last_epoch
    }

    /// Calls `tick` once per elapsed second, at most `max_step` times, and
    /// returns how many seconds were replayed. A clock that went backwards
    /// replays nothing.
    pub fn catch_up(&mut self, now_epoch: u64, mut tick: impl FnMut()) -> u64 {
        let elapsed = now_epoch.saturating_sub(self.last_epoch);
        let delta = elapsed.min(self.max_step);
        if delta < elapsed {
            debug!("RTC is {elapsed}s behind; replaying {delta}s this tick");
        }

        for _ in 0..delta {
            tick();
        }
        self.last_epoch += delta;
        delta
    }
}
