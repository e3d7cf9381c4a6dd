use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};

use cambio::adapter::{sqlite, HttpRateProvider, SqliteStore, StoreDefaults};
use cambio::config::Config;
use cambio::core::{ConversationEngine, EngineConfig, RateCache};
use cambio::error::Result;

/// Telegram currency-conversion bot with rate caching and threshold alerts.
#[derive(Parser)]
#[command(name = "cambio", version)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, default_value = "config.toml")]
    config: String,

    /// Validate the configuration and exit.
    #[arg(long)]
    check_config: bool,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    if cli.check_config {
        println!("configuration OK");
        return;
    }

    config.init_logging();
    info!("cambio starting");

    tokio::select! {
        result = run(config) => {
            if let Err(e) = result {
                error!(error = %e, "Fatal error");
                std::process::exit(1);
            }
        }
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    info!("cambio stopped");
}

async fn run(config: Config) -> Result<()> {
    let pool = sqlite::create_pool(&config.database.url)?;
    sqlite::prepare_database(&pool)?;
    let store = Arc::new(SqliteStore::new(
        pool,
        config.bot.history_cap,
        StoreDefaults {
            language: config.bot.default_language,
            favorites: config.default_favorites(),
        },
    ));

    let provider = HttpRateProvider::new(&config.provider.api_url, config.request_timeout())?;
    let cache = Arc::new(RateCache::new(
        Arc::new(provider),
        config.base_currency(),
        config.staleness(),
    ));

    // Warm the cache; a failure here is not fatal, the next stale
    // interaction retries.
    if let Err(e) = cache.refresh().await {
        warn!(error = %e, "initial rate fetch failed");
    }

    let engine = Arc::new(ConversationEngine::new(
        cache.clone(),
        store.clone(),
        EngineConfig {
            target_keyboard_limit: config.bot.target_keyboard_limit,
            showcase: config.showcase_currencies(),
        },
    ));

    #[cfg(feature = "telegram")]
    {
        use cambio::adapter::telegram::{run_dispatcher, TelegramNotifier};
        use cambio::core::AlertEvaluator;
        use cambio::error::ConfigError;

        if config.telegram.bot_token.is_empty() {
            return Err(ConfigError::MissingField {
                field: "telegram.bot_token",
            }
            .into());
        }

        let bot = teloxide::Bot::new(&config.telegram.bot_token);
        let notifier = Arc::new(TelegramNotifier::new(bot.clone()));
        let evaluator = AlertEvaluator::new(
            cache,
            store,
            notifier,
            config.alert_poll_interval(),
            config.alert_initial_delay(),
        );
        tokio::spawn(async move { evaluator.run().await });

        run_dispatcher(bot, engine).await;
        Ok(())
    }

    #[cfg(not(feature = "telegram"))]
    {
        let _ = engine;
        error!("built without the `telegram` feature; no transport available");
        Ok(())
    }
}
