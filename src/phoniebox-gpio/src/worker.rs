use crate::dispatcher::GpioDispatcher;
use crate::driver::PinEvent;
use phoniebox_controls::Action;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

/// Runs `dispatcher` on its own task so edge events from independent
/// interrupt sources are handled strictly one at a time.
///
/// `shutdown` runs an external command and is moved to the blocking pool;
/// the task ends once every sender is dropped and those commands have
/// returned, and hands the dispatcher back.
pub fn spawn_dispatcher(
    mut dispatcher: GpioDispatcher,
    mut events: UnboundedReceiver<PinEvent>,
) -> JoinHandle<GpioDispatcher> {
    tokio::spawn(async move {
        let mut pending = Vec::new();
        while let Some(event) = events.recv().await {
            let Some(binding) = dispatcher.advance(event.pin, event.edge) else {
                continue;
            };
            if binding.action == Action::Shutdown {
                let controls = dispatcher.controls().clone();
                pending.push(tokio::task::spawn_blocking(move || {
                    binding.action.invoke(&controls, binding.args)
                }));
            } else {
                binding.action.invoke(dispatcher.controls(), binding.args);
            }
        }
        tracing::debug!("pin event channel closed, stopping dispatcher");
        for task in pending {
            if let Err(err) = task.await {
                tracing::error!("shutdown task failed: {err}");
            }
        }
        dispatcher
    })
}
