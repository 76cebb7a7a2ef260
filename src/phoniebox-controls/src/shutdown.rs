use std::process::Command;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShutdownError {
    #[error("failed to spawn shutdown command: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("shutdown command exited with status {0}")]
    NonZeroExit(i32),
    #[error("shutdown command was terminated by a signal")]
    Terminated,
}

/// Powers off the box.
pub trait PowerOff: Send + Sync {
    fn power_off(&self) -> Result<(), ShutdownError>;
}

/// Runs an external command such as `sudo /sbin/poweroff`.
#[derive(Debug, Clone)]
pub struct CommandPowerOff {
    program: String,
    args: Vec<String>,
}

impl CommandPowerOff {
    /// Builds the command from `argv`; returns `None` for an empty list.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

impl PowerOff for CommandPowerOff {
    fn power_off(&self) -> Result<(), ShutdownError> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .status()
            .map_err(ShutdownError::Spawn)?;
        match status.code() {
            Some(0) => Ok(()),
            Some(code) => Err(ShutdownError::NonZeroExit(code)),
            None => Err(ShutdownError::Terminated),
        }
    }
}

/// Only logs the request; for simulation.
#[derive(Debug, Default, Clone)]
pub struct DryRunPowerOff;

impl PowerOff for DryRunPowerOff {
    fn power_off(&self) -> Result<(), ShutdownError> {
        tracing::info!("dry run: skipping power off");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_argv_has_no_command() {
        assert!(CommandPowerOff::from_argv(&[]).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn exit_status_is_reported() {
        let ok = CommandPowerOff::from_argv(&["true".into()]).unwrap();
        assert!(ok.power_off().is_ok());

        let failing = CommandPowerOff::from_argv(&["sh".into(), "-c".into(), "exit 3".into()]).unwrap();
        assert!(matches!(
            failing.power_off(),
            Err(ShutdownError::NonZeroExit(3))
        ));
    }

    #[test]
    fn missing_program_fails_to_spawn() {
        let missing = CommandPowerOff::from_argv(&["/nonexistent/phoniebox-poweroff".into()]).unwrap();
        assert!(matches!(missing.power_off(), Err(ShutdownError::Spawn(_))));
    }
}
