use crate::driver::{GpioDriver, GpioDriverError, PinEvent};
use phoniebox_controls::{Action, ActionArgs, PhonieboxControls};
use phoniebox_core::{
    EdgeKind, FunctionConfig, GpioSettings, PinElectricalConfig, PinIndex, PIN_COUNT,
};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("cannot assign {pin}.{edge}: unknown fn type '{fn_type}'")]
    UnknownAction {
        pin: PinIndex,
        edge: EdgeKind,
        fn_type: String,
    },
    #[error("cannot configure {pin}.{edge}: {pin} not configured")]
    PinNotConfigured { pin: PinIndex, edge: EdgeKind },
    #[error("cannot assign {fn_type} to {pin}.{edge}: already assigned")]
    DuplicateBinding {
        pin: PinIndex,
        edge: EdgeKind,
        fn_type: String,
    },
}

/// An action attached to a pin edge, with its arguments already resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub action: Action,
    pub args: ActionArgs,
}

/// Where a button is in its press / hold / release cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonState {
    #[default]
    Unconfigured,
    Idle,
    Pressed,
    Held,
}

#[derive(Debug, Clone, Default)]
pub struct PinSlot {
    config: Option<PinElectricalConfig>,
    bindings: [Option<Binding>; 3],
    state: ButtonState,
    was_held: bool,
}

impl PinSlot {
    pub fn config(&self) -> Option<&PinElectricalConfig> {
        self.config.as_ref()
    }

    pub fn binding(&self, edge: EdgeKind) -> Option<&Binding> {
        self.bindings[edge.index()].as_ref()
    }

    pub fn state(&self) -> ButtonState {
        self.state
    }

    /// Set by a hold, consumed by the following release.
    pub fn was_held(&self) -> bool {
        self.was_held
    }

    /// Advances the button state and returns the binding to fire, if any.
    fn on_edge(&mut self, edge: EdgeKind) -> Option<Binding> {
        match edge {
            EdgeKind::Pressed => {
                self.state = ButtonState::Pressed;
                self.binding(edge).copied()
            }
            EdgeKind::Held => {
                self.state = ButtonState::Held;
                self.was_held = true;
                self.binding(edge).copied()
            }
            EdgeKind::Released => {
                self.state = ButtonState::Idle;
                if std::mem::take(&mut self.was_held) {
                    // the hold already fired; a release must not fire twice
                    return None;
                }
                self.binding(edge).copied()
            }
        }
    }
}

/// Owns the 28 pin slots and turns edge events into action invocations.
pub struct GpioDispatcher {
    slots: [PinSlot; PIN_COUNT],
    controls: Arc<PhonieboxControls>,
    errors: Vec<BindingError>,
}

impl std::fmt::Debug for GpioDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpioDispatcher")
            .field("slots", &self.slots)
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}

impl GpioDispatcher {
    /// Dispatcher with every pin unconfigured.
    pub fn new(controls: Arc<PhonieboxControls>) -> Self {
        Self {
            slots: std::array::from_fn(|_| PinSlot::default()),
            controls,
            errors: Vec::new(),
        }
    }

    /// Sets up all configured pins, then applies every binding. A failing
    /// pin or binding is logged and recorded; it never stops the others.
    pub fn configure(
        settings: &GpioSettings,
        driver: &mut dyn GpioDriver,
        controls: Arc<PhonieboxControls>,
    ) -> Self {
        let mut dispatcher = Self::new(controls);

        for (pin, config) in &settings.pins {
            if let Err(err) = dispatcher.configure_pin(driver, *pin, config) {
                tracing::error!("failed to configure {pin}: {err}");
            }
        }

        for entry in &settings.bindings {
            if let Err(err) = dispatcher.bind(entry.pin, entry.edge, &entry.function) {
                tracing::error!("{err}");
                dispatcher.errors.push(err);
            }
        }

        dispatcher
    }

    pub fn configure_pin(
        &mut self,
        driver: &mut dyn GpioDriver,
        pin: PinIndex,
        config: &PinElectricalConfig,
    ) -> Result<(), GpioDriverError> {
        driver.configure_pin(pin, config)?;
        let slot = &mut self.slots[pin.as_usize()];
        slot.config = Some(*config);
        slot.state = ButtonState::Idle;
        Ok(())
    }

    /// Attaches `function` to the edge of a configured pin.
    pub fn bind(
        &mut self,
        pin: PinIndex,
        edge: EdgeKind,
        function: &FunctionConfig,
    ) -> Result<(), BindingError> {
        let fn_type = function.fn_type.trim();
        let action = Action::from_name(fn_type).ok_or_else(|| BindingError::UnknownAction {
            pin,
            edge,
            fn_type: fn_type.to_string(),
        })?;

        let slot = &mut self.slots[pin.as_usize()];
        if slot.config.is_none() {
            return Err(BindingError::PinNotConfigured { pin, edge });
        }
        let target = &mut slot.bindings[edge.index()];
        if target.is_some() {
            return Err(BindingError::DuplicateBinding {
                pin,
                edge,
                fn_type: fn_type.to_string(),
            });
        }

        *target = Some(Binding {
            action,
            args: action.args(&function.args),
        });
        tracing::info!("{action} assigned to {pin}.{edge}");
        Ok(())
    }

    pub fn slot(&self, pin: PinIndex) -> &PinSlot {
        &self.slots[pin.as_usize()]
    }

    pub fn slots(&self) -> impl Iterator<Item = (PinIndex, &PinSlot)> {
        PinIndex::all().zip(self.slots.iter())
    }

    /// Problems found while applying the configured bindings.
    pub fn binding_errors(&self) -> &[BindingError] {
        &self.errors
    }

    pub fn controls(&self) -> &Arc<PhonieboxControls> {
        &self.controls
    }

    pub fn handle_event(&mut self, event: PinEvent) {
        self.handle_edge(event.pin, event.edge);
    }

    /// Reacts to one debounced edge. Unbound edges do nothing.
    pub fn handle_edge(&mut self, pin: PinIndex, edge: EdgeKind) {
        if let Some(binding) = self.advance(pin, edge) {
            binding.action.invoke(&self.controls, binding.args);
        }
    }

    /// Advances the pin's button state for `edge` and returns the binding
    /// that should fire, leaving the invocation to the caller.
    pub fn advance(&mut self, pin: PinIndex, edge: EdgeKind) -> Option<Binding> {
        let slot = &mut self.slots[pin.as_usize()];
        if slot.config.is_none() {
            tracing::debug!("ignoring {edge} on unconfigured {pin}");
            return None;
        }

        let held_before = slot.was_held;
        let fired = slot.on_edge(edge);
        match fired {
            Some(binding) => tracing::debug!("{pin}.{edge} -> {}", binding.action),
            None if edge == EdgeKind::Released && held_before => {
                tracing::debug!("{pin} is released but was held");
            }
            None => {}
        }
        fired
    }
}
