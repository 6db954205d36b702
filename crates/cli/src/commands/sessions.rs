//! `docent sessions` — List saved conversation threads.

use anyhow::Context;
use docent_config::AppConfig;
use docent_core::SessionStore;
use docent_sessions::FileStore;

pub async fn run() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load config")?;
    let store = FileStore::new(config.sessions_dir());

    let ids = store.list().await.context("Failed to list sessions")?;
    if ids.is_empty() {
        println!("No sessions yet.");
        return Ok(());
    }

    for id in ids {
        match store.load(&id).await {
            Ok(Some(session)) => {
                println!(
                    "{id}  {} messages  updated {}",
                    session.messages.len(),
                    session.updated_at.format("%Y-%m-%d %H:%M")
                );
            }
            _ => println!("{id}"),
        }
    }

    Ok(())
}
