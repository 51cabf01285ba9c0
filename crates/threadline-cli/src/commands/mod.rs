pub mod auth;
pub mod chat;
pub mod countries;
pub mod demo;

use threadline_core::thread::Thread;

/// One-line summary of a thread for listings.
pub(crate) fn thread_line(thread: &Thread) -> String {
    format!(
        "{}  {}  ({} messages)",
        thread.id,
        thread.title,
        thread.message_count()
    )
}

/// Prints every message of a thread.
pub(crate) fn print_thread(thread: &Thread) {
    println!("# {}", thread.title);
    for message in &thread.messages {
        println!("[{}] {}", message.role, message.content.trim_end());
    }
}
