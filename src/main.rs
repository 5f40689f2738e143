use anyhow::Result;
use std::sync::Arc;

use hangsearch::cli::{App, Console};
use hangsearch::config::AppConfig;
use hangsearch::llm::{LlmProvider, OpenAiProvider};
use hangsearch::logging::init_logging;
use hangsearch::session::Session;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    init_logging(&config.log_dir)?;

    let console = Console::new();
    for warning in config.warnings() {
        tracing::warn!("{}", warning);
        console.print_warning(&warning);
    }

    let llm: Option<Arc<dyn LlmProvider>> = match config.llm.api_key {
        Some(_) => {
            let provider: Arc<dyn LlmProvider> = Arc::new(OpenAiProvider::from_config(&config.llm)?);
            tracing::info!(
                "Using {} (provider: {})",
                provider.model(),
                provider.provider_name()
            );
            Some(provider)
        }
        None => None,
    };

    let session = Session::new(&config, llm);
    App::new(console, session).run().await
}
