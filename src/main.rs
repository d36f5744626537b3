//! Runtime translation service
//!
//! Usage:
//!   runtime-translation                         # Serve the preview API (default)
//!   runtime-translation serve
//!   runtime-translation languages               # List supported languages
//!   runtime-translation translate fr Hello world
//!
//! Required environment variables:
//! - TRANSLATION_API_BASE
//!
//! Optional:
//! - DEFAULT_LANGUAGE (defaults to en)
//! - GEO_DETECTION (defaults to on)
//! - GEO_API_URL
//! - PREFERENCES_FILE (defaults to data/preferences.json)
//! - HTTP_TIMEOUT_SECS (defaults to 10)
//! - PORT (defaults to 8080)

use anyhow::{bail, Result};
use runtime_translation::{api::TranslationApi, config::Config, server, TranslationProvider};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("runtime_translation=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        None | Some("serve") => {
            let provider = TranslationProvider::from_config(&config)?;
            server::serve(provider, config.port).await
        }
        Some("languages") => {
            let provider =
                TranslationProvider::builder(TranslationApi::new(config.http_client()?, &config.api_base))
                    .build()?;
            for language in provider.languages().await? {
                println!("{}\t{}", language.code, language.display_name);
            }
            Ok(())
        }
        Some("translate") => {
            let text = args.get(2..).map(|words| words.join(" ")).unwrap_or_default();
            let Some(language) = args.get(1).filter(|_| !text.is_empty()) else {
                bail!("Usage: runtime-translation translate <language> <text...>");
            };

            // One-shot translation: no detection, nothing persisted
            let provider =
                TranslationProvider::builder(TranslationApi::new(config.http_client()?, &config.api_base))
                    .build()?;
            provider.set_current_language(language)?;

            provider.t(&text);
            provider.wait_idle().await;

            if let Some(error) = provider.status().translation_error {
                bail!("Translation failed: {}", error);
            }
            info!("Translated {} chars to '{}'", text.len(), language);
            println!("{}", provider.t(&text));
            Ok(())
        }
        Some(other) => bail!("Unknown command '{}'. Expected serve, languages or translate", other),
    }
}
