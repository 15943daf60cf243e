// Event hook backed by tracing
use shoal_core::port::EventHook;
use tracing::trace;

/// Emits every lifecycle event as a trace-level log line
pub struct TracingEventHook;

impl EventHook for TracingEventHook {
    fn fire_event(&self, name: &str) {
        trace!(event = %name, "Lifecycle event");
    }
}
