//! CLI command implementations.

pub mod briefing;
pub mod chat;
pub mod condition;
pub mod ingest;
pub mod summarize;

use std::sync::Arc;

use medbrief_backend::AzureChatBackend;
use medbrief_config::AppConfig;
use medbrief_core::backend::GenerationBackend;
use medbrief_core::store::DocumentStore;
use medbrief_store::SearchIndexStore;

/// Load config and construct the shared store/backend pair.
///
/// Fails early with setup instructions when either API key is missing.
pub fn setup() -> Result<
    (AppConfig, Arc<dyn DocumentStore>, Arc<dyn GenerationBackend>),
    Box<dyn std::error::Error>,
> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if !config.has_credentials() {
        eprintln!();
        eprintln!("  ERROR: Missing API credentials!");
        eprintln!();
        eprintln!("  Set these environment variables:");
        eprintln!("    MEDBRIEF_SEARCH_KEY   — document index API key");
        eprintln!("    MEDBRIEF_OPENAI_KEY   — generation backend API key");
        eprintln!("                            (AZURE_OPENAI_API_KEY also accepted)");
        eprintln!();
        eprintln!("  Or add them to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("Missing API credentials. See above for setup instructions.".into());
    }

    let store = Arc::new(SearchIndexStore::new(
        &config.search,
        config.retrieval.history_fetch_cap,
    )?) as Arc<dyn DocumentStore>;
    let backend = Arc::new(AzureChatBackend::new(&config.backend)?) as Arc<dyn GenerationBackend>;

    Ok((config, store, backend))
}
