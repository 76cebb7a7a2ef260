//! Playback actions a phoniebox button can trigger.
//!
//! [`PhonieboxControls`] translates high level actions (play/pause, CD style
//! previous, volume steps, ...) into calls on a [`PlaybackHost`], and the
//! [`Action`] registry maps configured function names onto them.

mod controls;
mod host;
mod memory;
mod registry;
mod shutdown;

pub use controls::{
    PhonieboxControls, CD_PREVIOUS_THRESHOLD_MS, DEFAULT_SEEK_SECONDS, DEFAULT_VOLUME_STEP,
    UNKNOWN_VOLUME,
};
pub use host::{PlaybackHost, StateChange, TrackId, TrackRef};
pub use memory::{HostCall, InMemoryHost};
pub use registry::{Action, ActionArgs};
pub use shutdown::{CommandPowerOff, DryRunPowerOff, PowerOff, ShutdownError};
