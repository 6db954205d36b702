//! `docent chat` — Interactive assistant session.

use anyhow::Context;
use docent_config::AppConfig;
use docent_core::{SessionId, SessionStore};
use tokio::io::AsyncBufReadExt;

use super::Runtime;

pub async fn run(session: Option<String>) -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load config")?;
    let runtime = super::bootstrap(config).await;

    let mut thread_id = session.map(SessionId::from).unwrap_or_else(SessionId::new);

    print_banner(&runtime, &thread_id).await;

    if !runtime.has_provider {
        print_key_guidance();
    }

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    prompt()?;
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.is_empty() {
            prompt()?;
            continue;
        }

        match input {
            "/quit" | "/exit" => break,
            "/help" => print_help(),
            "/clear" => {
                thread_id = SessionId::new();
                println!("  Started a new session: {thread_id}");
            }
            "/sessions" => list_sessions(&runtime).await,
            "/stats" => print_stats(&runtime, &thread_id).await,
            _ if input.starts_with("/load") => {
                let dir = input.strip_prefix("/load").map(str::trim).unwrap_or("");
                if dir.is_empty() {
                    println!("  Usage: /load <directory>");
                } else {
                    match runtime.retriever.load_directory(dir).await {
                        Ok(count) => println!("  Indexed {count} documents from {dir}"),
                        Err(e) => eprintln!("  [Error] Could not index {dir}: {e}"),
                    }
                }
            }
            _ if input.starts_with('/') => {
                println!("  Unknown command: {input}. Type /help for commands.");
            }
            _ => {
                eprint!("  ...");
                match runtime.assistant.run_turn(&thread_id, input).await {
                    Ok(report) => {
                        eprint!("\r     \r");
                        println!();
                        for line in report.answer.text().lines() {
                            println!("  Assistant > {line}");
                        }
                        if !report.answer.sources().is_empty() {
                            println!(
                                "  (sources: {}; confidence {})",
                                report.answer.sources().join(", "),
                                report.answer.confidence()
                            );
                        }
                        if let Some(e) = &report.persist_error {
                            eprintln!("  [Warning] Session not saved: {e}");
                        }
                        println!();
                    }
                    Err(e) => {
                        eprint!("\r     \r");
                        eprintln!("  [Error] {e}");
                        println!();
                    }
                }
            }
        }

        prompt()?;
    }

    println!();
    println!("  Goodbye! 👋");
    println!();

    Ok(())
}

fn prompt() -> anyhow::Result<()> {
    use std::io::Write;
    print!("  You > ");
    std::io::stdout().flush()?;
    Ok(())
}

async fn print_banner(runtime: &Runtime, thread_id: &SessionId) {
    let provider = if runtime.has_provider {
        runtime.config.provider.name.as_str()
    } else {
        "none (degraded mode)"
    };

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║        Docent — Interactive Assistant        ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Provider:   {provider}");
    println!("  Model:      {}", runtime.config.provider.model);
    println!("  Documents:  {} indexed", runtime.retriever.len().await);
    println!("  Session:    {thread_id}");
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type /help for commands, /quit to exit.");
    println!();
}

fn print_help() {
    println!("  /help            Show this help");
    println!("  /clear           Start a fresh session");
    println!("  /sessions        List saved sessions");
    println!("  /stats           Show session statistics");
    println!("  /load <dir>      Index a directory of documents");
    println!("  /quit            Exit");
}

fn print_key_guidance() {
    eprintln!("  NOTE: No API key configured. Answers will be degraded.");
    eprintln!();
    eprintln!("  Set one of these environment variables:");
    eprintln!("    DOCENT_API_KEY = 'sk-...'   (generic)");
    eprintln!("    OPENAI_API_KEY = 'sk-...'   (for OpenAI direct)");
    eprintln!();
    eprintln!("  Or add it to your config file:");
    eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
    eprintln!();
    eprintln!("  Example config:");
    for line in AppConfig::example_toml().lines() {
        eprintln!("    {line}");
    }
    eprintln!();
}

async fn list_sessions(runtime: &Runtime) {
    match runtime.store.list().await {
        Ok(ids) if ids.is_empty() => println!("  No sessions yet."),
        Ok(ids) => {
            for id in ids {
                println!("  {id}");
            }
        }
        Err(e) => eprintln!("  [Error] Could not list sessions: {e}"),
    }
}

async fn print_stats(runtime: &Runtime, thread_id: &SessionId) {
    let messages = match runtime.store.load(thread_id).await {
        Ok(Some(session)) => session.messages.len(),
        _ => 0,
    };
    println!("  Session:    {thread_id}");
    println!("  Messages:   {messages}");
    println!("  Documents:  {} indexed", runtime.retriever.len().await);

    let actions = runtime.assistant.get_actions(thread_id).await;
    if !actions.is_empty() {
        println!("  Last turn:  {}", actions.join(" -> "));
    }
}
