use phoniebox_core::PlaybackState;

/// 1-based position of a track in the host's tracklist.
pub type TrackId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackRef {
    pub id: TrackId,
    pub position_ms: u64,
}

/// Notification that the host's playback state changed. `old` is `None`
/// when the previous state is unknown, e.g. right after startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub old: Option<PlaybackState>,
    pub new: PlaybackState,
}

/// The media player core the buttons control.
///
/// Commands are fire-and-forget: implementations backed by an asynchronous
/// player should enqueue the request and return immediately.
pub trait PlaybackHost: Send + Sync {
    fn state(&self) -> PlaybackState;

    fn current_track(&self) -> Option<TrackRef>;

    fn tracklist_length(&self) -> usize;

    /// Starts playback of `track_id`, or of the current/first track when `None`.
    fn play(&self, track_id: Option<TrackId>);

    fn pause(&self);

    fn resume(&self);

    fn seek(&self, position_ms: u64);

    fn next(&self);

    fn previous(&self);

    /// Mixer volume in percent, `None` if the mixer can't tell.
    fn volume(&self) -> Option<u8>;

    fn set_volume(&self, volume: u8);

    fn mute(&self) -> Option<bool>;

    fn set_mute(&self, muted: bool);
}
