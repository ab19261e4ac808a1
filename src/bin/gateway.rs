//! English Buddy inference gateway.
//!
//! Serves `POST /chain/invoke` on `GATEWAY_BIND` (default `127.0.0.1:8000`),
//! prepending the tutor persona to every request before calling the hosted
//! chat model.  Provider credentials (`GROQ_API_KEY`) are read here and never
//! leave this process.

use std::sync::Arc;
use std::time::Duration;

use english_buddy::{
    config::AppConfig,
    gateway::{router, serve, InferenceGateway},
    llm::{ApiChatModel, Persona},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::load()?;

    let persona = Persona::from_optional_file(config.llm.persona_file.as_deref())?;
    log::info!(
        "persona loaded ({} chars, {})",
        persona.instruction().len(),
        match &config.llm.persona_file {
            Some(path) => path.display().to_string(),
            None => "built-in".into(),
        }
    );

    if config.llm.api_key.is_none() {
        log::warn!("GROQ_API_KEY is not set; provider calls will likely be rejected");
    }
    log::info!("chat model: {} at {}", config.llm.model, config.llm.base_url);

    let gateway = InferenceGateway::new(
        Arc::new(persona),
        Arc::new(ApiChatModel::from_config(&config.llm)),
        Duration::from_secs(config.llm.timeout_secs),
    );

    serve(&config.gateway.bind_address, router(Arc::new(gateway))).await
}
