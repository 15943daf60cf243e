// Application Layer - Dispatch loop and admission control

pub mod manager;

// Re-exports
pub use manager::{FetchErrorPolicy, Manager, ManagerConfig};
