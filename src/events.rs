//! Draining the device's asynchronous event queue.

use crate::config::EventConfig;
use crate::driver::DeviceHandle;
use crate::errors::{CameraError, Result};
use std::time::Duration;

/// Poll without waiting until the device reports a timeout.
///
/// Returns whether at least one real event was consumed. Payloads are only
/// logged. A poll error stops the drain and is returned. At most
/// `max_events_per_drain` events are consumed per call; reaching that bound
/// returns `true`.
pub fn consume_events<H: DeviceHandle>(handle: &mut H, config: &EventConfig) -> Result<bool> {
    let limit = config.max_events_per_drain.max(1);
    let mut consumed: u32 = 0;

    while consumed < limit {
        let event = handle
            .poll_event(Duration::ZERO)
            .map_err(|e| CameraError::driver("wait for event", e))?;
        if event.is_timeout() {
            log::debug!("Drained {} camera events", consumed);
            return Ok(consumed > 0);
        }
        log::trace!("Camera event: {:?}", event);
        consumed += 1;
    }

    log::warn!(
        "Stopped draining camera events after {} without a timeout",
        limit
    );
    Ok(true)
}
