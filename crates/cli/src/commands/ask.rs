//! `docent ask` — One-shot question mode.

use anyhow::Context;
use docent_config::AppConfig;
use docent_core::SessionId;

pub async fn run(text: String, session: Option<String>) -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load config")?;
    let runtime = super::bootstrap(config).await;

    let thread_id = session.map(SessionId::from).unwrap_or_else(SessionId::new);

    let report = runtime.assistant.run_turn(&thread_id, &text).await?;

    println!("{}", report.answer.text());
    if !report.answer.sources().is_empty() {
        println!(
            "(sources: {}; confidence {})",
            report.answer.sources().join(", "),
            report.answer.confidence()
        );
    }
    if let Some(e) = &report.persist_error {
        eprintln!("Warning: session not saved: {e}");
    }

    Ok(())
}
