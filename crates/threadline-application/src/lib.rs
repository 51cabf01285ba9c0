//! Application layer for Threadline.
//!
//! Use cases coordinating the [`ThreadStore`](threadline_core::thread::ThreadStore)
//! with the injected asynchronous services: the optimistic send protocol,
//! bulk loading, deletion, and the credential gate.

pub mod auth_usecase;
pub mod chat_usecase;
pub mod login_flow;

pub use auth_usecase::AuthUseCase;
pub use chat_usecase::{ChatUseCase, DeleteOutcome, PendingReply, ReplyOutcome};
pub use login_flow::{LoginFlow, LoginStep};
