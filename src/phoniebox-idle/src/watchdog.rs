use crate::timer::WatchdogTimer;
use phoniebox_controls::{PhonieboxControls, StateChange};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

#[derive(Debug)]
enum Command {
    StateChanged(StateChange),
    Stop,
}

/// Handle for delivering playback state changes to a running watchdog.
#[derive(Debug, Clone)]
pub struct WatchdogNotifier {
    tx: UnboundedSender<Command>,
}

impl WatchdogNotifier {
    /// Returns `false` once the watchdog has stopped.
    pub fn playback_state_changed(&self, change: StateChange) -> bool {
        self.tx.send(Command::StateChanged(change)).is_ok()
    }
}

/// Watches playback state and powers off after `idle_seconds` without
/// playback. Owns a single task; all transitions are applied there in
/// arrival order.
#[derive(Debug)]
pub struct IdleWatchdog {
    notifier: WatchdogNotifier,
    task: Option<JoinHandle<()>>,
}

impl IdleWatchdog {
    /// Spawns the watchdog and treats the host's current state as a
    /// transition from "unknown", so a box that starts idle begins counting
    /// down right away.
    pub fn start(idle_seconds: u64, controls: Arc<PhonieboxControls>) -> Self {
        let mut timer = WatchdogTimer::new(idle_seconds);
        timer.on_state_change(None, controls.playback_state(), Instant::now());

        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(timer, controls, rx));
        Self {
            notifier: WatchdogNotifier { tx },
            task: Some(task),
        }
    }

    pub fn notifier(&self) -> WatchdogNotifier {
        self.notifier.clone()
    }

    pub fn playback_state_changed(&self, change: StateChange) {
        self.notifier.playback_state_changed(change);
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Cancels any pending shutdown and waits for the task to end. Calling
    /// it again is a no-op.
    pub async fn stop(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        let _ = self.notifier.tx.send(Command::Stop);
        if let Err(err) = task.await {
            tracing::error!("idle watchdog task failed: {err}");
        }
    }
}

async fn run(
    mut timer: WatchdogTimer,
    controls: Arc<PhonieboxControls>,
    mut commands: UnboundedReceiver<Command>,
) {
    loop {
        let deadline = timer.deadline();
        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::StateChanged(change)) => {
                    timer.on_state_change(change.old, change.new, Instant::now());
                }
                Some(Command::Stop) | None => break,
            },
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                if timer.take_expired(Instant::now()) {
                    shutdown(controls.clone()).await;
                }
            }
        }
    }
    timer.cancel();
    tracing::debug!("idle watchdog stopped");
}

async fn shutdown(controls: Arc<PhonieboxControls>) {
    tracing::info!("idle time exceeded");
    // the power-off command blocks until it exits
    match tokio::task::spawn_blocking(move || controls.shutdown()).await {
        Ok(_) => {}
        Err(err) => tracing::error!("shutdown task failed: {err}"),
    }
}
