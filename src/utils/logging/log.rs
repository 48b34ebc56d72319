//! Standardized log lines for load and analysis steps
//!
//! Targets are anything displayable: partition file paths, download URLs or
//! table names.

use std::fmt::Display;
use std::time::Duration;

/// Log an operation start
pub fn log_operation_start(operation: &str, target: impl Display) {
    log::info!("{operation} {target}");
}

/// Log an operation completion with item count and optional elapsed time
pub fn log_operation_complete(
    operation: &str,
    target: impl Display,
    items: usize,
    elapsed: Option<Duration>,
) {
    match elapsed {
        Some(duration) => log::info!("Successfully {operation} {items} items from {target} in {duration:?}"),
        None => log::info!("Successfully {operation} {items} items from {target}"),
    }
}

/// Log a warning, optionally naming the target it concerns
pub fn log_warning(message: &str, target: Option<&dyn Display>) {
    if let Some(target) = target {
        log::warn!("{message}: {target}");
    } else {
        log::warn!("{message}");
    }
}
