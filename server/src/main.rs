mod api;
mod api_error;
mod cleanup_task;
mod game_session_manager;
mod promo;
mod server_config;
mod telegram;
mod web_server;

use std::sync::Arc;

use clap::Parser;
use common::config::{ConfigManager, FileContentConfigProvider, Validate};
use common::{log, logger};

use cleanup_task::CleanupTask;
use game_session_manager::GameSessionManager;
use promo::PromoIssuer;
use server_config::{ServerConfig, DEFAULT_CONFIG_PATH};
use telegram::{LinkRegistry, LogNotifier, Notifier};
use web_server::{run_web_server, WebServerState};

#[derive(Parser)]
#[command(name = "tictactoe_server")]
struct Args {
    /// YAML config file; defaults are used when it does not exist.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Overrides `bind_address` from the config file.
    #[arg(long)]
    bind: Option<String>,

    #[arg(long)]
    use_log_prefix: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let prefix = if args.use_log_prefix {
        Some("Server".to_string())
    } else {
        None
    };
    logger::init_logger(prefix);

    let config_manager: ConfigManager<FileContentConfigProvider, ServerConfig> =
        ConfigManager::from_yaml_file(&args.config);
    let mut config = config_manager.get_config()?;
    if let Some(bind) = args.bind {
        config.bind_address = bind;
        config.validate()?;
    }
    log!("Loaded config from {}", args.config);

    let promo_issuer = PromoIssuer::new(config.promo.clone());
    let session_manager = GameSessionManager::new(promo_issuer, config.first_player);
    let link_registry = LinkRegistry::new(
        config.telegram.link_code_length,
        config.telegram.link_code_ttl(),
        config.telegram.linked_code_ttl(),
    );
    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);

    if config.telegram.enabled {
        log!("Telegram linking enabled");
    }

    let cleanup_task = CleanupTask::new(
        session_manager.clone(),
        link_registry.clone(),
        config.cleanup.check_interval(),
        config.cleanup.inactivity_timeout(),
    );
    tokio::spawn(async move {
        cleanup_task.run().await;
    });

    let state = WebServerState {
        session_manager,
        link_registry,
        notifier,
        telegram: config.telegram.clone(),
    };

    run_web_server(
        state,
        &config.bind_address,
        config.static_files_path.as_deref(),
    )
    .await?;

    log!("Server shut down gracefully");

    Ok(())
}
