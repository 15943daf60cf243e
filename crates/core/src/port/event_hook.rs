// Event Hook Port (observability, side-effect only)

/// Fired when the dispatch loop is about to poll a queue
pub const DISPATCH_EVENT: &str = "dispatch";

/// Lifecycle event sink
pub trait EventHook: Send + Sync {
    fn fire_event(&self, name: &str);
}

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Mock hook recording fired event names
    #[derive(Default)]
    pub struct MockEventHook {
        events: Mutex<Vec<String>>,
    }

    impl MockEventHook {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }

        pub fn count(&self, name: &str) -> usize {
            self.events.lock().unwrap().iter().filter(|e| *e == name).count()
        }
    }

    impl EventHook for MockEventHook {
        fn fire_event(&self, name: &str) {
            self.events.lock().unwrap().push(name.to_string());
        }
    }
}
