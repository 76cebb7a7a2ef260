use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of addressable GPIO lines (BCM 0..=27).
pub const PIN_COUNT: usize = 28;

/// Index of a GPIO line, guaranteed to be below [`PIN_COUNT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PinIndex(u8);

impl PinIndex {
    pub fn new(index: u8) -> Option<Self> {
        (usize::from(index) < PIN_COUNT).then_some(Self(index))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn as_usize(self) -> usize {
        usize::from(self.0)
    }

    pub fn all() -> impl Iterator<Item = PinIndex> {
        (0..PIN_COUNT as u8).map(PinIndex)
    }
}

impl fmt::Display for PinIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gpio{}", self.0)
    }
}

/// Button edge a binding can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EdgeKind {
    Pressed,
    Released,
    Held,
}

impl EdgeKind {
    pub const ALL: [EdgeKind; 3] = [EdgeKind::Pressed, EdgeKind::Released, EdgeKind::Held];

    /// Name used in configuration keys, e.g. `gpio3.when_held`.
    pub fn config_name(self) -> &'static str {
        match self {
            EdgeKind::Pressed => "when_pressed",
            EdgeKind::Released => "when_released",
            EdgeKind::Held => "when_held",
        }
    }

    pub fn from_config_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|edge| edge.config_name() == name)
    }

    /// Position of this edge in a per-pin binding table.
    pub fn index(self) -> usize {
        match self {
            EdgeKind::Pressed => 0,
            EdgeKind::Released => 1,
            EdgeKind::Held => 2,
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config_name())
    }
}

/// Playback state as reported by the host player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybackState {
    Playing,
    Paused,
    Stopped,
}

impl PlaybackState {
    pub fn as_str(self) -> &'static str {
        match self {
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
            PlaybackState::Stopped => "stopped",
        }
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown playback state '{0}' (expected playing, paused or stopped)")]
pub struct ParseStateError(String);

impl FromStr for PlaybackState {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "playing" => Ok(PlaybackState::Playing),
            "paused" => Ok(PlaybackState::Paused),
            "stopped" => Ok(PlaybackState::Stopped),
            _ => Err(ParseStateError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pin_index_is_bounded() {
        assert!(PinIndex::new(0).is_some());
        assert!(PinIndex::new(27).is_some());
        assert!(PinIndex::new(28).is_none());
        assert_eq!(PinIndex::all().count(), PIN_COUNT);
    }

    #[test]
    fn edge_names_round_trip() {
        for edge in EdgeKind::ALL {
            assert_eq!(EdgeKind::from_config_name(edge.config_name()), Some(edge));
        }
        assert_eq!(EdgeKind::from_config_name("when_clicked"), None);
    }

    #[test]
    fn playback_state_parses_case_insensitively() {
        assert_eq!("Playing".parse::<PlaybackState>().unwrap(), PlaybackState::Playing);
        assert!("buffering".parse::<PlaybackState>().is_err());
    }
}
