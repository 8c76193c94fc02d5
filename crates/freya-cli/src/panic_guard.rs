//! Output cleanup on panic.

use freya_core::ChannelMap;
use freya_hardware::PinctrlController;
use tracing::error;

/// Install a hook that drives every output low and exits with status 1.
///
/// The hook runs before the release profile aborts, on the panicking
/// thread, so it shells out synchronously instead of touching the runtime.
/// `None` (dry run) skips the sweep but keeps the exit status.
pub fn install(controller: Option<PinctrlController>) {
    let previous = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |info| {
        previous(info);
        error!("Panic, driving all digital outputs low");

        if let Some(controller) = &controller {
            let report = controller.all_low_blocking(&ChannelMap::default());
            if !report.is_complete() {
                error!(
                    "Digital outputs {:?} may still be on",
                    report.failed.iter().map(|c| c.number()).collect::<Vec<_>>()
                );
            }
        }

        std::process::exit(1);
    }));
}
