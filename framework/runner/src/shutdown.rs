use stampede_core::prelude::ShutdownHandle;
use tokio::signal;

/// Trigger `handle` when the process receives Ctrl-C.
pub(crate) fn start_shutdown_listener(runtime: &tokio::runtime::Runtime, handle: ShutdownHandle) {
    runtime.spawn(async move {
        if let Err(e) = signal::ctrl_c().await {
            log::warn!("Failed to listen for Ctrl-C, the run can only stop on its own: {e}");
            return;
        }
        handle.shutdown();
        println!("Received shutdown signal, shutting down...");
    });
}
