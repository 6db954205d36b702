//! Command implementations — one module per subcommand.

pub mod ask;
pub mod chat;
pub mod sessions;

use std::sync::Arc;

use docent_agent::Assistant;
use docent_config::AppConfig;
use docent_core::Provider;
use docent_providers::OpenAiCompatProvider;
use docent_retrieval::KeywordRetriever;
use docent_sessions::FileStore;

/// Everything a command needs after wiring: the assistant plus direct
/// handles on the store and retriever for session listing and `/load`.
pub(crate) struct Runtime {
    pub assistant: Assistant,
    pub store: Arc<FileStore>,
    pub retriever: Arc<KeywordRetriever>,
    pub config: AppConfig,
    pub has_provider: bool,
}

/// Build the runtime from configuration: index documents, open the
/// session store, register tools, and attach a provider when one is
/// configured. A missing API key is not fatal; the assistant still
/// runs and answers with a degraded response.
pub(crate) async fn bootstrap(config: AppConfig) -> Runtime {
    let retriever = Arc::new(KeywordRetriever::new());
    if let Some(dir) = &config.documents.dir {
        match retriever.load_directory(dir).await {
            Ok(count) => tracing::info!(count, dir = %dir.display(), "Indexed documents"),
            Err(e) => tracing::warn!(dir = %dir.display(), error = %e, "Could not index documents"),
        }
    }

    let store = Arc::new(FileStore::new(config.sessions_dir()));
    let tools = Arc::new(docent_tools::default_registry(retriever.clone()));

    let provider = build_provider(&config);
    let has_provider = provider.is_some();

    let mut assistant = Assistant::new(store.clone())
        .with_tools(tools)
        .with_model(&config.provider.model)
        .with_temperature(config.provider.temperature);
    if let Some(provider) = provider {
        assistant = assistant.with_provider(provider);
    }

    Runtime {
        assistant,
        store,
        retriever,
        config,
        has_provider,
    }
}

/// Pick a provider from config. Ollama needs no key; OpenAI-style
/// endpoints do, so without one we return `None` and the assistant
/// degrades gracefully.
fn build_provider(config: &AppConfig) -> Option<Arc<dyn Provider>> {
    if config.provider.name == "ollama" {
        let provider = OpenAiCompatProvider::ollama(config.provider.base_url.as_deref());
        return Some(Arc::new(provider));
    }
    config.api_key.as_ref().map(|key| {
        let provider = match &config.provider.base_url {
            Some(base) => OpenAiCompatProvider::new("openai", base, key),
            None => OpenAiCompatProvider::openai(key),
        };
        Arc::new(provider) as Arc<dyn Provider>
    })
}
