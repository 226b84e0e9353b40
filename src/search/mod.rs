//! Debounced search pipeline: keystrokes settle in the debouncer, settled
//! queries are dispatched by the coordinator, stale responses are discarded.

pub mod coordinator;
pub mod debounce;

pub use coordinator::{SearchCoordinator, SearchEvent};
pub use debounce::QueryDebouncer;
