//! Domain layer for Threadline.
//!
//! Holds the conversation models, the [`ThreadStore`](thread::ThreadStore)
//! state container, and the capability traits (persistence, credentials,
//! asynchronous services) that the other crates implement or consume.

pub mod api;
pub mod auth;
pub mod config;
pub mod country;
pub mod error;
pub mod storage;
pub mod thread;

// Re-export common error type
pub use error::ThreadlineError;
