//! Delayed in-process stand-ins for the chat back end.
//!
//! Each service sleeps for its configured delay before answering, so the
//! optimistic send / delete / load protocols see realistic interleavings.

pub mod delete;
pub mod otp;
pub mod reply;
pub mod threads;

pub use delete::MockDeleteService;
pub use otp::MockOtpService;
pub use reply::MockReplyService;
pub use threads::{MockThreadSource, seed_threads};
