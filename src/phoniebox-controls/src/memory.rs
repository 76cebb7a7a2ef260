use crate::host::{PlaybackHost, StateChange, TrackId, TrackRef};
use phoniebox_core::PlaybackState;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Command received by an [`InMemoryHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCall {
    Play(Option<TrackId>),
    Pause,
    Resume,
    Seek(u64),
    Next,
    Previous,
    SetVolume(u8),
    SetMute(bool),
}

#[derive(Debug)]
struct HostState {
    state: PlaybackState,
    tracklist_length: usize,
    current: Option<TrackId>,
    position_ms: u64,
    volume: Option<u8>,
    muted: Option<bool>,
    calls: Vec<HostCall>,
}

/// Playback host without audio output.
///
/// Keeps a tracklist cursor, mixer settings and a log of every command it
/// received, and publishes [`StateChange`]s to subscribers. Used by the
/// simulator and in tests.
#[derive(Debug)]
pub struct InMemoryHost {
    inner: Mutex<HostState>,
    listeners: Mutex<Vec<UnboundedSender<StateChange>>>,
}

impl Default for InMemoryHost {
    fn default() -> Self {
        Self::new(0)
    }
}

impl InMemoryHost {
    pub fn new(tracklist_length: usize) -> Self {
        Self {
            inner: Mutex::new(HostState {
                state: PlaybackState::Stopped,
                tracklist_length,
                current: None,
                position_ms: 0,
                volume: None,
                muted: None,
                calls: Vec::new(),
            }),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Receives every subsequent playback state transition.
    pub fn subscribe(&self) -> UnboundedReceiver<StateChange> {
        let (tx, rx) = mpsc::unbounded_channel();
        lock(&self.listeners).push(tx);
        rx
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.inner().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.inner().calls.clear();
    }

    pub fn set_tracklist_length(&self, length: usize) {
        let mut inner = self.inner();
        inner.tracklist_length = length;
        if inner.current.is_some_and(|id| id as usize > length) {
            inner.current = None;
        }
    }

    /// Positions the cursor without issuing a command.
    pub fn set_current(&self, track: Option<TrackId>, position_ms: u64) {
        let mut inner = self.inner();
        inner.current = track;
        inner.position_ms = position_ms;
    }

    pub fn set_mixer(&self, volume: Option<u8>, muted: Option<bool>) {
        let mut inner = self.inner();
        inner.volume = volume;
        inner.muted = muted;
    }

    /// Changes the playback state as if the player did it on its own.
    pub fn set_state(&self, state: PlaybackState) {
        let change = transition(&mut *self.inner(), state);
        self.publish(change);
    }

    fn inner(&self) -> MutexGuard<'_, HostState> {
        lock(&self.inner)
    }

    fn command<F>(&self, call: HostCall, apply: F)
    where
        F: FnOnce(&mut HostState) -> Option<PlaybackState>,
    {
        let change = {
            let mut inner = self.inner();
            inner.calls.push(call);
            apply(&mut *inner).and_then(|state| transition(&mut *inner, state))
        };
        self.publish(change);
    }

    fn publish(&self, change: Option<StateChange>) {
        if let Some(change) = change {
            lock(&self.listeners).retain(|tx| tx.send(change).is_ok());
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn transition(inner: &mut HostState, state: PlaybackState) -> Option<StateChange> {
    let old = std::mem::replace(&mut inner.state, state);
    (old != state).then_some(StateChange {
        old: Some(old),
        new: state,
    })
}

impl PlaybackHost for InMemoryHost {
    fn state(&self) -> PlaybackState {
        self.inner().state
    }

    fn current_track(&self) -> Option<TrackRef> {
        let inner = self.inner();
        inner.current.map(|id| TrackRef {
            id,
            position_ms: inner.position_ms,
        })
    }

    fn tracklist_length(&self) -> usize {
        self.inner().tracklist_length
    }

    fn play(&self, track_id: Option<TrackId>) {
        self.command(HostCall::Play(track_id), |inner| {
            let target = track_id.or(inner.current).or(Some(1))?;
            if target == 0 || target as usize > inner.tracklist_length {
                return None;
            }
            inner.current = Some(target);
            inner.position_ms = 0;
            Some(PlaybackState::Playing)
        });
    }

    fn pause(&self) {
        self.command(HostCall::Pause, |inner| {
            (inner.state == PlaybackState::Playing).then_some(PlaybackState::Paused)
        });
    }

    fn resume(&self) {
        self.command(HostCall::Resume, |inner| {
            (inner.state == PlaybackState::Paused).then_some(PlaybackState::Playing)
        });
    }

    fn seek(&self, position_ms: u64) {
        self.command(HostCall::Seek(position_ms), |inner| {
            if inner.current.is_some() {
                inner.position_ms = position_ms;
            }
            None
        });
    }

    fn next(&self) {
        self.command(HostCall::Next, |inner| {
            let current = inner.current?;
            inner.position_ms = 0;
            if (current as usize) < inner.tracklist_length {
                inner.current = Some(current + 1);
                None
            } else {
                inner.current = None;
                Some(PlaybackState::Stopped)
            }
        });
    }

    fn previous(&self) {
        self.command(HostCall::Previous, |inner| {
            let current = inner.current?;
            inner.current = Some(current.saturating_sub(1).max(1));
            inner.position_ms = 0;
            None
        });
    }

    fn volume(&self) -> Option<u8> {
        self.inner().volume
    }

    fn set_volume(&self, volume: u8) {
        self.command(HostCall::SetVolume(volume), |inner| {
            inner.volume = Some(volume.min(100));
            None
        });
    }

    fn mute(&self) -> Option<bool> {
        self.inner().muted
    }

    fn set_mute(&self, muted: bool) {
        self.command(HostCall::SetMute(muted), |inner| {
            inner.muted = Some(muted);
            None
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_starts_first_track_and_notifies() {
        let host = InMemoryHost::new(3);
        let mut changes = host.subscribe();

        host.play(None);

        assert_eq!(host.state(), PlaybackState::Playing);
        assert_eq!(host.current_track().map(|t| t.id), Some(1));
        assert_eq!(
            changes.try_recv().unwrap(),
            StateChange {
                old: Some(PlaybackState::Stopped),
                new: PlaybackState::Playing
            }
        );
    }

    #[test]
    fn play_on_empty_tracklist_stays_stopped() {
        let host = InMemoryHost::new(0);
        let mut changes = host.subscribe();
        host.play(None);
        assert_eq!(host.state(), PlaybackState::Stopped);
        assert!(changes.try_recv().is_err());
        assert_eq!(host.calls(), vec![HostCall::Play(None)]);
    }

    #[test]
    fn pause_resume_only_from_matching_state() {
        let host = InMemoryHost::new(1);
        host.resume();
        assert_eq!(host.state(), PlaybackState::Stopped);
        host.play(Some(1));
        host.pause();
        assert_eq!(host.state(), PlaybackState::Paused);
        host.resume();
        assert_eq!(host.state(), PlaybackState::Playing);
    }

    #[test]
    fn next_past_end_stops() {
        let host = InMemoryHost::new(2);
        host.play(Some(2));
        host.next();
        assert_eq!(host.current_track(), None);
        assert_eq!(host.state(), PlaybackState::Stopped);
    }

    #[test]
    fn shrinking_tracklist_drops_cursor() {
        let host = InMemoryHost::new(5);
        host.set_current(Some(4), 1000);
        host.set_tracklist_length(2);
        assert_eq!(host.current_track(), None);
    }

    #[test]
    fn closed_subscribers_are_dropped() {
        let host = InMemoryHost::new(1);
        drop(host.subscribe());
        host.set_state(PlaybackState::Paused);
        assert!(lock(&host.listeners).is_empty());
    }
}
