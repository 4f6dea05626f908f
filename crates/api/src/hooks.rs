//! Global panic-hook wiring
//!
//! Funnels panics (the uncaught-error path of a Rust process) through the
//! error reporter as `critical` reports, tagged with their origin. The
//! installer chains to the previously installed hook so existing panic
//! output is preserved, and it is idempotent: a second install is detected
//! and ignored, so reports are never duplicated.

use std::panic::PanicHookInfo;
use std::sync::atomic::{AtomicBool, Ordering};

use beacon_core::classify;
use beacon_core::ports::EnvironmentProbe;
use beacon_domain::{ContextMap, ContextValue, ErrorReport, Severity};
use tracing::debug;

use crate::registry::registry;

static PANIC_HOOK_INSTALLED: AtomicBool = AtomicBool::new(false);

/// Install the panic hook once
///
/// Panics captured while the registry holds a context are filed as
/// `critical` reports (escalating an immediate flush attempt); the previous
/// hook runs afterwards either way.
pub fn install_panic_hook() {
    if PANIC_HOOK_INSTALLED.swap(true, Ordering::SeqCst) {
        debug!("panic hook already installed; ignoring");
        return;
    }

    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        report_panic(info);
        previous(info);
    }));
}

fn report_panic(info: &PanicHookInfo<'_>) {
    let Some(context) = registry().get() else {
        return;
    };

    let message = panic_message(info);

    let mut report_context = ContextMap::new();
    report_context.insert("origin".to_string(), ContextValue::from("panic_hook"));
    if let Some(location) = info.location() {
        report_context.insert("file".to_string(), ContextValue::from(location.file()));
        report_context
            .insert("line".to_string(), ContextValue::from(i64::from(location.line())));
    }

    // Severity is forced to critical; only the category is inferred.
    let (_, category) = classify::classify(&message, Some(&report_context), false);
    let report = ErrorReport::new(
        format!("Uncaught panic: {message}"),
        Severity::Critical,
        category,
        context.environment().capture(),
    )
    .with_context(report_context);

    context.reporter().report(report);
}

fn panic_message(info: &PanicHookInfo<'_>) -> String {
    if let Some(message) = info.payload().downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = info.payload().downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
