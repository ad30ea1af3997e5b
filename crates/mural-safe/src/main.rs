//! Mural Safe: a desktop wallet console with Safe multisig management.

use eyre::WrapErr;

use mural_safe_adapters::AdapterConfig;

mod app;
mod bridge;
mod navbar;
mod pages;
mod state;
mod ui;

pub const APP_ID: &str = "mural-safe";

fn main() -> eyre::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!(
        git = env!("GIT_HASH"),
        built = env!("BUILD_TIME"),
        "starting Mural Safe"
    );

    let config = AdapterConfig::from_env().wrap_err("invalid environment configuration")?;
    let bridge = bridge::ConsoleBridge::from_config(&config)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("mural-worker")
        .enable_all()
        .build()
        .wrap_err("failed to start background runtime")?;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Mural Safe")
            .with_inner_size([900.0, 720.0])
            .with_min_inner_size([600.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Mural Safe",
        native_options,
        Box::new(move |cc| Ok(Box::new(app::App::new(cc, config, bridge, runtime)))),
    )
    .map_err(|e| eyre::eyre!("gui terminated: {e}"))
}
