use phoniebox_controls::{PhonieboxControls, StateChange};
use phoniebox_core::GpioSettings;
use phoniebox_gpio::{pin_event_channel, spawn_dispatcher, GpioDispatcher, GpioDriver, PinEvent};
use phoniebox_idle::IdleWatchdog;
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::{JoinError, JoinHandle};

/// The running box: button dispatcher plus optional idle watchdog.
#[derive(Debug)]
pub struct Frontend {
    events: UnboundedSender<PinEvent>,
    dispatcher: JoinHandle<GpioDispatcher>,
    watchdog: Option<IdleWatchdog>,
    forwarder: Option<JoinHandle<()>>,
}

impl Frontend {
    /// Configures the buttons and starts the background tasks. The watchdog
    /// only runs when `idle_seconds` is non-zero; host state changes arriving
    /// on `state_changes` are forwarded to it.
    pub fn start(
        settings: &GpioSettings,
        driver: &mut dyn GpioDriver,
        controls: Arc<PhonieboxControls>,
        idle_seconds: u64,
        state_changes: UnboundedReceiver<StateChange>,
    ) -> Self {
        let dispatcher = GpioDispatcher::configure(settings, driver, controls.clone());
        let (events, rx) = pin_event_channel();
        let dispatcher = spawn_dispatcher(dispatcher, rx);

        let (watchdog, forwarder) = if idle_seconds > 0 {
            let watchdog = IdleWatchdog::start(idle_seconds, controls);
            let forwarder = tokio::spawn(forward(state_changes, watchdog.notifier()));
            (Some(watchdog), Some(forwarder))
        } else {
            tracing::info!("idle shutdown disabled");
            (None, None)
        };

        Self {
            events,
            dispatcher,
            watchdog,
            forwarder,
        }
    }

    pub fn has_watchdog(&self) -> bool {
        self.watchdog.is_some()
    }

    /// Queues a pin edge for the dispatcher. Returns `false` if it has stopped.
    pub fn send(&self, event: PinEvent) -> bool {
        self.events.send(event).is_ok()
    }

    /// Stops the watchdog, drains pending pin events and hands back the
    /// dispatcher.
    pub async fn stop(self) -> Result<GpioDispatcher, JoinError> {
        if let Some(forwarder) = self.forwarder {
            forwarder.abort();
        }
        if let Some(mut watchdog) = self.watchdog {
            watchdog.stop().await;
        }
        drop(self.events);
        self.dispatcher.await
    }
}

async fn forward(
    mut changes: UnboundedReceiver<StateChange>,
    notifier: phoniebox_idle::WatchdogNotifier,
) {
    while let Some(change) = changes.recv().await {
        if !notifier.playback_state_changed(change) {
            break;
        }
    }
}
