use crate::host::PlaybackHost;
use crate::shutdown::{PowerOff, ShutdownError};
use phoniebox_core::PlaybackState;
use std::sync::Arc;

pub const DEFAULT_SEEK_SECONDS: i64 = 5;
pub const DEFAULT_VOLUME_STEP: i32 = 5;
/// Assumed mixer volume when the host reports none.
pub const UNKNOWN_VOLUME: i32 = 50;
/// Below this position `cd_previous` changes track instead of restarting it.
pub const CD_PREVIOUS_THRESHOLD_MS: u64 = 3000;

/// Phoniebox control functions on top of a [`PlaybackHost`].
pub struct PhonieboxControls {
    host: Arc<dyn PlaybackHost>,
    power: Box<dyn PowerOff>,
}

impl std::fmt::Debug for PhonieboxControls {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhonieboxControls").finish_non_exhaustive()
    }
}

impl PhonieboxControls {
    pub fn new(host: Arc<dyn PlaybackHost>, power: Box<dyn PowerOff>) -> Self {
        Self { host, power }
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.host.state()
    }

    /// Powers off the box. Failures are logged and returned, never retried.
    pub fn shutdown(&self) -> Result<(), ShutdownError> {
        tracing::info!("executing phoniebox shutdown");
        self.power.power_off().map_err(|err| {
            tracing::error!("error shutting down phoniebox: {err}");
            err
        })
    }

    pub fn play_pause(&self) {
        let state = self.host.state();
        tracing::info!("play_pause (state {state})");
        match state {
            PlaybackState::Playing => self.host.pause(),
            PlaybackState::Paused => self.host.resume(),
            PlaybackState::Stopped => self.host.play(None),
        }
    }

    /// Compact-disc style previous: restarts the current track once it has
    /// played for a few seconds, otherwise goes one track back. From the
    /// first track, or without a current track, it wraps to the last one.
    pub fn cd_previous(&self) {
        let Some((length, current)) = self.tracklist("cd_previous") else {
            return;
        };
        let position = current.map_or(0, |track| track.position_ms);

        match current {
            Some(track) if position >= CD_PREVIOUS_THRESHOLD_MS => {
                tracing::debug!("restarting track {}", track.id);
                self.host.seek(0);
            }
            Some(track) if track.id > 1 => self.host.previous(),
            _ => self.host.play(Some(length)),
        }
    }

    /// Previous track, wrapping from the first (or no) track to the last.
    pub fn previous(&self) {
        let Some((length, current)) = self.tracklist("previous") else {
            return;
        };
        match current {
            Some(track) if track.id > 1 => self.host.previous(),
            _ => self.host.play(Some(length)),
        }
    }

    /// Next track, wrapping from the last (or no) track to the first.
    pub fn next(&self) {
        let Some((length, current)) = self.tracklist("next") else {
            return;
        };
        match current {
            Some(track) if track.id < length => self.host.next(),
            _ => self.host.play(Some(1)),
        }
    }

    pub fn seek_fwd(&self, seconds: i64) {
        self.seek_by(seconds);
    }

    pub fn seek_bwd(&self, seconds: i64) {
        self.seek_by(seconds.saturating_neg());
    }

    pub fn volume_up(&self, step: i32) {
        self.adjust_volume(step);
    }

    pub fn volume_down(&self, step: i32) {
        self.adjust_volume(step.saturating_neg());
    }

    pub fn mute_unmute(&self) {
        let muted = self.host.mute().unwrap_or(false);
        tracing::info!("mute_unmute (muted {muted})");
        self.host.set_mute(!muted);
    }

    /// Tracklist length and current track, or `None` when the list is empty.
    fn tracklist(&self, action: &str) -> Option<(u32, Option<crate::TrackRef>)> {
        let length = self.host.tracklist_length();
        let current = self.host.current_track();
        tracing::info!(
            "{action} - track {} of {length}",
            current.map_or(0, |track| track.id)
        );
        let length = u32::try_from(length).ok().filter(|len| *len > 0)?;
        Some((length, current))
    }

    fn seek_by(&self, seconds: i64) {
        let Some(track) = self.host.current_track() else {
            tracing::debug!("seek ignored, no current track");
            return;
        };
        let offset_ms = seconds.saturating_mul(1000);
        let position = i64::try_from(track.position_ms)
            .unwrap_or(i64::MAX)
            .saturating_add(offset_ms)
            .max(0);
        tracing::info!("seek by {seconds}s to {position}ms");
        self.host.seek(position as u64);
    }

    fn adjust_volume(&self, step: i32) {
        let current = self.host.volume();
        tracing::info!("volume step {step} (current {current:?})");
        let base = current.map_or(UNKNOWN_VOLUME, i32::from);
        let volume = base.saturating_add(step).clamp(0, 100);
        self.host.set_volume(volume as u8);
    }
}
