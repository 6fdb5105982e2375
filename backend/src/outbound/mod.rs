//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **memory**: process-local record store used by tests and demos
//! - **rest_store**: reqwest-backed JSON document API
//! - **timeout_store**: deadline wrapper for any record store
//!
//! Adapters are thin translators between domain documents and transport
//! representations. They contain no business logic.

pub mod memory;
pub mod rest_store;
pub mod timeout_store;
