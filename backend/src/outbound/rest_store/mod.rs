//! REST record store adapter.
//!
//! This module provides a reqwest implementation of the `RecordStore` port
//! against a JSON document API.

mod dto;
mod http_store;

pub use http_store::{RestRecordStore, RestRecordStoreBuildError};
