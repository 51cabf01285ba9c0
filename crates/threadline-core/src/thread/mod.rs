//! Thread domain module.
//!
//! This module contains the conversation models, the in-memory thread
//! store with its persistence hook, and the asynchronous service traits
//! the send/delete/load protocols talk to.
//!
//! # Module Structure
//!
//! - `model`: `Thread` and the persisted `ThreadSnapshot`
//! - `message`: `Message` and `MessageRole`
//! - `store`: `ThreadStore`, the single source of truth
//! - `in_flight`: per-thread outstanding-send guard and load counter
//! - `repository`: snapshot persistence trait
//! - `service`: reply / delete / bulk-load service traits

mod in_flight;
mod message;
mod model;
mod repository;
mod service;
mod store;

pub use in_flight::{LoadGuard, SendGuard};
pub use message::{Message, MessageRole};
pub use model::{Thread, ThreadSnapshot};
pub use repository::SnapshotRepository;
pub use service::{DeleteService, ReplyService, ThreadSource};
pub use store::{StoreState, ThreadStore};
