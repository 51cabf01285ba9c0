//! Scripted walk through login, sending, deletion, and logout.

use anyhow::Result;
use threadline_application::ReplyOutcome;
use threadline_core::config::AppConfig;

use super::{print_thread, thread_line};
use crate::app::AppBootstrap;

pub async fn run(config: AppConfig) -> Result<()> {
    let config = AppConfig {
        offline_countries: true,
        ..config
    };
    let app = AppBootstrap::in_memory(config)?;

    println!("== Login");
    let mut flow = app.login_flow();
    flow.load_countries().await?;
    flow.set_phone_number("9876543210");
    flow.request_code().await?;
    println!("Code sent to {}", flow.full_phone_number());
    flow.verify("123456", true).await?;
    println!("Authenticated: {}", app.auth.is_authenticated()?);

    println!("\n== Load threads");
    app.chat.load_threads().await?;
    for thread in app.store.threads() {
        println!("{}", thread_line(&thread));
    }

    println!("\n== New thread");
    let pending = app.chat.send_message(None, "What is an optimistic update?")?;
    let new_id = pending.thread_id().to_string();
    println!(
        "Visible before reply: {} message(s), loading={}",
        app.store.find(&new_id).map(|t| t.message_count()).unwrap_or(0),
        app.store.is_loading()
    );
    if let Err(e) = app.chat.send_message(Some(&new_id), "Are you there?") {
        println!("Second send rejected: {}", e);
    }
    pending.settle().await?;
    if let Some(thread) = app.store.find(&new_id) {
        print_thread(&thread);
    }
    println!("loading={}", app.store.is_loading());

    println!("\n== Delete while a reply is pending");
    if let Some(target) = app.store.threads().get(1).cloned() {
        let pending = app.chat.send_message(Some(&target.id), "One more thing")?;
        let (deleted, settled) = tokio::join!(
            app.chat.delete_thread(&target.id, Some(&target.id)),
            pending.settle()
        );
        let deleted = deleted?;
        match settled? {
            ReplyOutcome::Applied(_) => println!("Reply landed before the deletion"),
            ReplyOutcome::Discarded => println!("Reply discarded"),
        }
        println!(
            "Deleted {} (redirect to new chat: {})",
            deleted.thread_id, deleted.redirect_to_new_thread
        );
    }
    println!("{} thread(s) left", app.store.len());

    println!("\n== Logout");
    app.auth.logout()?;
    println!(
        "threads={} authenticated={}",
        app.store.len(),
        app.auth.is_authenticated()?
    );
    Ok(())
}
