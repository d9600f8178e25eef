//! Client-side task cache with optimistic mutations.
//!
//! [`TaskState`] holds the two category lists and changes only through
//! [`TaskMsg`]. [`TaskStore`] drives it against a [`TaskBackend`]: every
//! mutation is applied locally first, then reconciled with the server row on
//! success or rolled back on failure.

pub mod backend;
pub mod state;
pub mod store;

pub use backend::TaskBackend;
pub use state::{LocalId, LocalTask, TaskMsg, TaskState};
pub use store::{StoreError, TaskStore};
