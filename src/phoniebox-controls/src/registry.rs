use crate::controls::{PhonieboxControls, DEFAULT_SEEK_SECONDS, DEFAULT_VOLUME_STEP};
use phoniebox_core::ArgValue;
use std::collections::BTreeMap;
use std::fmt;

/// Everything a button can be bound to, addressed by its config name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Shutdown,
    PlayPause,
    CdPrevious,
    Previous,
    Next,
    SeekBackward,
    SeekForward,
    VolumeUp,
    VolumeDown,
    Mute,
}

/// Optional argument an action was configured with. Absent arguments fall
/// back to the action's default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionArgs {
    #[default]
    None,
    Seconds(i64),
    VolStep(i32),
}

impl Action {
    pub const ALL: [Action; 10] = [
        Action::Shutdown,
        Action::PlayPause,
        Action::CdPrevious,
        Action::Previous,
        Action::Next,
        Action::SeekBackward,
        Action::SeekForward,
        Action::VolumeUp,
        Action::VolumeDown,
        Action::Mute,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Action::Shutdown => "shutdown",
            Action::PlayPause => "play_pause",
            Action::CdPrevious => "cdprev",
            Action::Previous => "prev",
            Action::Next => "next",
            Action::SeekBackward => "seek_bwd",
            Action::SeekForward => "seek_fwd",
            Action::VolumeUp => "vol_up",
            Action::VolumeDown => "vol_down",
            Action::Mute => "mute",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|action| action.name() == name)
    }

    /// Argument key this action understands, if any.
    pub fn accepted_arg(self) -> Option<&'static str> {
        match self {
            Action::SeekBackward | Action::SeekForward => Some("seconds"),
            Action::VolumeUp | Action::VolumeDown => Some("vol_step"),
            _ => None,
        }
    }

    /// Picks the understood argument out of a configured argument map.
    /// Other keys are ignored; a non-numeric value falls back to the default.
    pub fn args(self, provided: &BTreeMap<String, ArgValue>) -> ActionArgs {
        for key in provided.keys() {
            if Some(key.as_str()) != self.accepted_arg() {
                tracing::debug!("{} ignores argument '{key}'", self.name());
            }
        }

        let Some(key) = self.accepted_arg() else {
            return ActionArgs::None;
        };
        let Some(value) = provided.get(key) else {
            return ActionArgs::None;
        };
        let Some(number) = value.as_f64() else {
            tracing::warn!("{}: {key}={value} is not a number, using default", self.name());
            return ActionArgs::None;
        };

        let number = number.round();
        match key {
            "seconds" => ActionArgs::Seconds(number as i64),
            _ => ActionArgs::VolStep(number as i32),
        }
    }

    pub fn invoke(self, controls: &PhonieboxControls, args: ActionArgs) {
        let seconds = match args {
            ActionArgs::Seconds(seconds) => seconds,
            _ => DEFAULT_SEEK_SECONDS,
        };
        let step = match args {
            ActionArgs::VolStep(step) => step,
            _ => DEFAULT_VOLUME_STEP,
        };

        match self {
            Action::Shutdown => {
                // already logged by the controls
                let _ = controls.shutdown();
            }
            Action::PlayPause => controls.play_pause(),
            Action::CdPrevious => controls.cd_previous(),
            Action::Previous => controls.previous(),
            Action::Next => controls.next(),
            Action::SeekBackward => controls.seek_bwd(seconds),
            Action::SeekForward => controls.seek_fwd(seconds),
            Action::VolumeUp => controls.volume_up(step),
            Action::VolumeDown => controls.volume_down(step),
            Action::Mute => controls.mute_unmute(),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{HostCall, InMemoryHost};
    use crate::shutdown::DryRunPowerOff;
    use crate::PlaybackHost;
    use std::sync::Arc;

    fn args(entries: &[(&str, ArgValue)]) -> BTreeMap<String, ArgValue> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn resolves_every_name() {
        for action in Action::ALL {
            assert_eq!(Action::from_name(action.name()), Some(action));
        }
        assert_eq!(Action::from_name(" next "), Some(Action::Next));
        assert_eq!(Action::from_name("rewind"), None);
        assert_eq!(Action::from_name("Next"), None);
    }

    #[test]
    fn picks_only_understood_argument() {
        let provided = args(&[
            ("seconds", ArgValue::Int(10)),
            ("vol_step", ArgValue::Int(2)),
        ]);
        assert_eq!(Action::SeekForward.args(&provided), ActionArgs::Seconds(10));
        assert_eq!(Action::VolumeUp.args(&provided), ActionArgs::VolStep(2));
        assert_eq!(Action::PlayPause.args(&provided), ActionArgs::None);
    }

    #[test]
    fn non_numeric_argument_uses_default() {
        let provided = args(&[("seconds", ArgValue::Str("ten".into()))]);
        assert_eq!(Action::SeekBackward.args(&provided), ActionArgs::None);

        let provided = args(&[("vol_step", ArgValue::Float(2.6))]);
        assert_eq!(Action::VolumeDown.args(&provided), ActionArgs::VolStep(3));
    }

    #[test]
    fn invoke_applies_arguments_and_defaults() {
        let host = Arc::new(InMemoryHost::new(1));
        let controls = PhonieboxControls::new(host.clone(), Box::new(DryRunPowerOff));
        host.set_current(Some(1), 20_000);

        Action::SeekForward.invoke(&controls, ActionArgs::Seconds(10));
        Action::SeekBackward.invoke(&controls, ActionArgs::None);
        Action::VolumeUp.invoke(&controls, ActionArgs::VolStep(20));
        Action::VolumeDown.invoke(&controls, ActionArgs::None);

        assert_eq!(
            host.calls(),
            vec![
                HostCall::Seek(30_000),
                HostCall::Seek(25_000),
                HostCall::SetVolume(70),
                HostCall::SetVolume(65),
            ]
        );
        assert_eq!(host.volume(), Some(65));
    }
}
