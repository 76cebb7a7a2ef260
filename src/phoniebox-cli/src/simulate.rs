use crate::frontend::Frontend;
use phoniebox_controls::{InMemoryHost, PlaybackHost};
use phoniebox_core::{EdgeKind, ParseStateError, PinIndex, PlaybackState};
use phoniebox_gpio::PinEvent;
use std::str::FromStr;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};

/// One line of simulator input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimCommand {
    Edge(PinIndex, EdgeKind),
    /// Press immediately followed by release.
    Click(PinIndex),
    State(PlaybackState),
    Tracks(usize),
    Status,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimCommandError {
    #[error("unknown command '{0}' (try press/release/hold/click N, state X, tracks N, status, quit)")]
    Unknown(String),
    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),
    #[error("unexpected argument '{0}'")]
    TrailingArgument(String),
    #[error("invalid pin '{0}', expected 0-27")]
    InvalidPin(String),
    #[error("invalid track count '{0}'")]
    InvalidCount(String),
    #[error(transparent)]
    State(#[from] ParseStateError),
}

impl FromStr for SimCommand {
    type Err = SimCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Err(SimCommandError::Unknown(String::new()));
        };
        let argument = words.next();
        if let Some(extra) = words.next() {
            return Err(SimCommandError::TrailingArgument(extra.to_string()));
        }

        let parsed = match command {
            "press" => SimCommand::Edge(pin("press", argument)?, EdgeKind::Pressed),
            "release" => SimCommand::Edge(pin("release", argument)?, EdgeKind::Released),
            "hold" => SimCommand::Edge(pin("hold", argument)?, EdgeKind::Held),
            "click" => SimCommand::Click(pin("click", argument)?),
            "state" => SimCommand::State(required("state", argument)?.parse::<PlaybackState>()?),
            "tracks" => {
                let count = required("tracks", argument)?;
                SimCommand::Tracks(
                    count
                        .parse::<usize>()
                        .map_err(|_| SimCommandError::InvalidCount(count.to_string()))?,
                )
            }
            "status" | "quit" | "exit" => {
                if let Some(extra) = argument {
                    return Err(SimCommandError::TrailingArgument(extra.to_string()));
                }
                if command == "status" {
                    SimCommand::Status
                } else {
                    SimCommand::Quit
                }
            }
            other => return Err(SimCommandError::Unknown(other.to_string())),
        };
        Ok(parsed)
    }
}

fn required<'a>(
    command: &'static str,
    argument: Option<&'a str>,
) -> Result<&'a str, SimCommandError> {
    argument.ok_or(SimCommandError::MissingArgument(command))
}

fn pin(command: &'static str, argument: Option<&str>) -> Result<PinIndex, SimCommandError> {
    let raw = required(command, argument)?;
    let raw_index = raw.strip_prefix("gpio").unwrap_or(raw);
    raw_index
        .parse::<u8>()
        .ok()
        .and_then(PinIndex::new)
        .ok_or_else(|| SimCommandError::InvalidPin(raw.to_string()))
}

/// Reads commands from stdin until `quit`, end of input or Ctrl-C.
pub async fn run(frontend: &Frontend, host: &InMemoryHost) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<SimCommand>() {
            Ok(SimCommand::Quit) => break,
            Ok(command) => {
                if !apply(command, frontend, host) {
                    break;
                }
            }
            Err(err) => println!("{err}"),
        }
    }
    Ok(())
}

/// Returns `false` once the dispatcher is gone.
fn apply(command: SimCommand, frontend: &Frontend, host: &InMemoryHost) -> bool {
    match command {
        SimCommand::Edge(pin, edge) => frontend.send(PinEvent::new(pin, edge)),
        SimCommand::Click(pin) => {
            frontend.send(PinEvent::new(pin, EdgeKind::Pressed))
                && frontend.send(PinEvent::new(pin, EdgeKind::Released))
        }
        SimCommand::State(state) => {
            host.set_state(state);
            true
        }
        SimCommand::Tracks(count) => {
            host.set_tracklist_length(count);
            true
        }
        SimCommand::Status => {
            println!("{}", status_line(host));
            true
        }
        SimCommand::Quit => false,
    }
}

fn status_line(host: &InMemoryHost) -> String {
    let track = host
        .current_track()
        .map(|track| format!("{} @ {}ms", track.id, track.position_ms))
        .unwrap_or_else(|| "none".to_string());
    let volume = host
        .volume()
        .map(|volume| volume.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    format!(
        "state: {} | track: {track} of {} | volume: {volume} | muted: {}",
        host.state(),
        host.tracklist_length(),
        host.mute().unwrap_or(false)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pin(index: u8) -> PinIndex {
        PinIndex::new(index).unwrap()
    }

    #[test]
    fn parses_button_commands() {
        assert_eq!(
            "press 17".parse::<SimCommand>(),
            Ok(SimCommand::Edge(pin(17), EdgeKind::Pressed))
        );
        assert_eq!(
            "  release gpio4 ".parse::<SimCommand>(),
            Ok(SimCommand::Edge(pin(4), EdgeKind::Released))
        );
        assert_eq!("hold 0".parse::<SimCommand>(), Ok(SimCommand::Edge(pin(0), EdgeKind::Held)));
        assert_eq!("click 27".parse::<SimCommand>(), Ok(SimCommand::Click(pin(27))));
    }

    #[test]
    fn parses_host_commands() {
        assert_eq!(
            "state Paused".parse::<SimCommand>(),
            Ok(SimCommand::State(PlaybackState::Paused))
        );
        assert_eq!("tracks 3".parse::<SimCommand>(), Ok(SimCommand::Tracks(3)));
        assert_eq!("status".parse::<SimCommand>(), Ok(SimCommand::Status));
        assert_eq!("quit".parse::<SimCommand>(), Ok(SimCommand::Quit));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            "press 28".parse::<SimCommand>(),
            Err(SimCommandError::InvalidPin("28".into()))
        );
        assert_eq!(
            "hold".parse::<SimCommand>(),
            Err(SimCommandError::MissingArgument("hold"))
        );
        assert_eq!(
            "tracks many".parse::<SimCommand>(),
            Err(SimCommandError::InvalidCount("many".into()))
        );
        assert_eq!(
            "status now".parse::<SimCommand>(),
            Err(SimCommandError::TrailingArgument("now".into()))
        );
        assert_eq!(
            "rewind 3".parse::<SimCommand>(),
            Err(SimCommandError::Unknown("rewind".into()))
        );
        assert!(matches!(
            "state loud".parse::<SimCommand>(),
            Err(SimCommandError::State(_))
        ));
    }

    #[test]
    fn status_reports_host_state() {
        let host = InMemoryHost::new(4);
        host.set_current(Some(2), 1500);
        host.set_mixer(Some(40), Some(false));
        host.set_state(PlaybackState::Playing);
        assert_eq!(
            status_line(&host),
            "state: playing | track: 2 @ 1500ms of 4 | volume: 40 | muted: false"
        );
    }
}
