use anyhow::Result;
use threadline_application::ReplyOutcome;

use super::{print_thread, thread_line};
use crate::app::AppBootstrap;

pub async fn threads(app: &AppBootstrap, refresh: bool) -> Result<()> {
    app.require_login()?;

    if refresh || app.store.is_empty() {
        let count = app.chat.load_threads().await?;
        tracing::debug!("[threads] Loaded {} thread(s)", count);
    }

    let threads = app.store.threads();
    if threads.is_empty() {
        println!("No threads yet.");
    }
    for thread in &threads {
        println!("{}", thread_line(thread));
    }
    Ok(())
}

pub async fn send(app: &AppBootstrap, thread_id: Option<&str>, text: &str) -> Result<()> {
    app.require_login()?;

    let pending = app.chat.send_message(thread_id, text)?;
    let thread_id = pending.thread_id().to_string();
    if pending.created() {
        println!("Started thread {}", thread_id);
    }
    println!("[user] {}", text);

    match pending.settle().await? {
        ReplyOutcome::Applied(reply) => println!("[{}] {}", reply.role, reply.content.trim_end()),
        ReplyOutcome::Discarded => println!("Reply discarded, thread is gone."),
    }

    if let Some(thread) = app.store.find(&thread_id) {
        println!();
        print_thread(&thread);
    }
    Ok(())
}

pub async fn delete(app: &AppBootstrap, thread_id: &str, current: Option<&str>) -> Result<()> {
    app.require_login()?;

    let outcome = app.chat.delete_thread(thread_id, current).await?;
    println!("Chat successfully deleted");
    if outcome.redirect_to_new_thread {
        println!("The open thread was deleted; starting a new chat.");
    }
    Ok(())
}
