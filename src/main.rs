//! English Buddy chat client.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`], writing a default `settings.toml` on first run,
//!    then apply env overrides.
//! 3. Create the tokio runtime used for gateway and transcription calls.
//! 4. Wire the gateway client and transcription adapter into a
//!    [`SessionController`].
//! 5. Run [`eframe::run_native`] until the window is closed.
//!
//! The client never talks to the chat model directly; it only knows the
//! gateway's address (`API_URL`).

use std::sync::Arc;

use anyhow::Context;
use eframe::egui;
use english_buddy::{
    app::ChatApp,
    config::{AppConfig, AppPaths},
    gateway::GatewayClient,
    session::SessionController,
    stt::{ApiSttEngine, TranscriptionAdapter},
};

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    let (width, height) = config.ui.window_size;
    let viewport = egui::ViewportBuilder::default()
        .with_title("English Buddy")
        .with_inner_size([width, height])
        .with_min_inner_size([420.0, 360.0]);

    eframe::NativeOptions {
        viewport,
        ..Default::default()
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("English Buddy starting up");

    let paths = AppPaths::new();
    if !paths.settings_file.exists() {
        // Defaults only; env overrides (credentials) are never written out.
        match AppConfig::default().save() {
            Ok(()) => log::info!("wrote default settings to {}", paths.settings_file.display()),
            Err(e) => log::warn!("could not write default settings: {e}"),
        }
    }

    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        let mut config = AppConfig::default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    let gateway = Arc::new(GatewayClient::from_config(&config.gateway));
    log::info!("tutor gateway: {}", gateway.invoke_url());

    if config.stt.api_key.is_none() {
        log::warn!("GROQ_API_KEY is not set; voice input will fail");
    }
    let transcriber = Arc::new(TranscriptionAdapter::new(Arc::new(
        ApiSttEngine::from_config(&config.stt),
    )));

    let controller = SessionController::new(gateway, transcriber, config.stt.min_duration_secs);
    let app = ChatApp::new(controller, runtime.handle().clone(), &config);

    eframe::run_native(
        "English Buddy",
        native_options(&config),
        Box::new(move |_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("UI failed: {e}"))
}
