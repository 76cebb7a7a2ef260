use phoniebox_core::{EdgeKind, PinElectricalConfig, PinIndex};
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// A debounced edge reported by the GPIO driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinEvent {
    pub pin: PinIndex,
    pub edge: EdgeKind,
}

impl PinEvent {
    pub fn new(pin: PinIndex, edge: EdgeKind) -> Self {
        Self { pin, edge }
    }
}

/// Channel the driver's interrupt callbacks push events into. The receiving
/// end is drained by a single dispatcher task.
pub fn pin_event_channel() -> (UnboundedSender<PinEvent>, UnboundedReceiver<PinEvent>) {
    mpsc::unbounded_channel()
}

#[derive(Debug, Error)]
pub enum GpioDriverError {
    #[error("{pin} is unavailable: {reason}")]
    Unavailable { pin: PinIndex, reason: String },
}

/// Electrical side of the button lines. Debouncing and hold detection
/// happen in the driver, which reports the resulting [`PinEvent`]s.
pub trait GpioDriver {
    fn configure_pin(
        &mut self,
        pin: PinIndex,
        config: &PinElectricalConfig,
    ) -> Result<(), GpioDriverError>;
}

/// Driver without hardware; remembers what it was asked to configure.
#[derive(Debug, Default)]
pub struct NullGpioDriver {
    configured: Vec<(PinIndex, PinElectricalConfig)>,
}

impl NullGpioDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn configured(&self) -> &[(PinIndex, PinElectricalConfig)] {
        &self.configured
    }
}

impl GpioDriver for NullGpioDriver {
    fn configure_pin(
        &mut self,
        pin: PinIndex,
        config: &PinElectricalConfig,
    ) -> Result<(), GpioDriverError> {
        tracing::debug!(
            "configuring {pin}: pull_up={:?} active_high={:?} bounce={:?} hold={:?} repeat={}",
            config.pull_mode.pull_up(),
            config.pull_mode.active_high(),
            config.bounce(),
            config.hold(),
            config.hold_repeat
        );
        self.configured.push((pin, *config));
        Ok(())
    }
}
