use phoniebox_core::PlaybackState;
use std::time::Duration;
use tokio::time::Instant;

/// Single shutdown deadline driven by playback state transitions.
///
/// At most one deadline exists; starting a new one replaces the old. An idle
/// time of zero disables the timer entirely.
#[derive(Debug, Clone)]
pub struct WatchdogTimer {
    idle: Duration,
    deadline: Option<Instant>,
}

impl WatchdogTimer {
    pub fn new(idle_seconds: u64) -> Self {
        Self {
            idle: Duration::from_secs(idle_seconds),
            deadline: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.idle.is_zero()
    }

    pub fn idle_time(&self) -> Duration {
        self.idle
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Schedules shutdown `idle` from `now`, replacing any live deadline.
    pub fn start(&mut self, now: Instant) {
        if !self.is_enabled() {
            return;
        }
        if self.deadline.is_some() {
            tracing::warn!("starting shutdown timer although a previous one exists");
            self.cancel();
        }
        self.deadline = now.checked_add(self.idle);
        if self.deadline.is_none() {
            tracing::warn!(
                "idle time of {}s is beyond the clock range, not scheduling shutdown",
                self.idle.as_secs()
            );
        }
    }

    /// Drops the live deadline. Returns whether there was one.
    pub fn cancel(&mut self) -> bool {
        let cancelled = self.deadline.take().is_some();
        if cancelled {
            tracing::info!("cancelling shutdown timer");
        }
        cancelled
    }

    /// Playing cancels the countdown; leaving playing (or starting up in a
    /// non-playing state) starts it. Moves between paused and stopped leave a
    /// running countdown alone.
    pub fn on_state_change(
        &mut self,
        old: Option<PlaybackState>,
        new: PlaybackState,
        now: Instant,
    ) {
        tracing::debug!("playback state changed from {old:?} to {new}");
        if new == PlaybackState::Playing {
            self.cancel();
        } else if matches!(old, None | Some(PlaybackState::Playing)) && self.is_enabled() {
            tracing::info!(
                "starting {} second shutdown timer (state: {new})",
                self.idle.as_secs()
            );
            self.start(now);
        }
    }

    /// Clears and reports a deadline that has been reached.
    pub fn take_expired(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
