// Panic isolation for processor execution
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tracing::error;

/// Result of a panic-guarded execution
#[derive(Debug)]
pub enum PanicGuardResult<T> {
    /// Execution completed (the value may itself be an error)
    Success(T),
    /// Execution panicked
    Panicked(String),
}

/// Drive a future with panic isolation
///
/// A panic inside `future` is caught and returned as
/// `PanicGuardResult::Panicked` instead of unwinding into the pool.
///
/// # Example
/// ```text
/// match execute_guarded_async(processor.process("default", &unit)).await {
///     PanicGuardResult::Success(result) => { /* handler returned */ }
///     PanicGuardResult::Panicked(msg) => println!("Caught panic: {}", msg),
/// }
/// ```
pub async fn execute_guarded_async<F, T>(future: F) -> PanicGuardResult<T>
where
    F: std::future::Future<Output = T>,
{
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(value) => PanicGuardResult::Success(value),
        Err(panic_info) => {
            let panic_msg = panic_message(panic_info.as_ref());
            error!(panic_msg = %panic_msg, "Processor task panicked");
            PanicGuardResult::Panicked(panic_msg)
        }
    }
}

fn panic_message(panic_info: &(dyn Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_success_passes_value_through() {
        let result = execute_guarded_async(async { 42 }).await;
        assert!(matches!(result, PanicGuardResult::Success(42)));
    }

    #[tokio::test]
    async fn test_panic_is_caught_with_message() {
        let result = execute_guarded_async(async {
            if true {
                panic!("handler exploded");
            }
            0
        })
        .await;

        match result {
            PanicGuardResult::Panicked(msg) => assert_eq!(msg, "handler exploded"),
            other => panic!("expected panic, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_formatted_panic_message() {
        let result = execute_guarded_async(async {
            let id = 7;
            if id > 0 {
                panic!("message {} failed", id);
            }
        })
        .await;

        assert!(matches!(result, PanicGuardResult::Panicked(ref m) if m == "message 7 failed"));
    }
}
