use anyhow::Context;
use clap::Parser;
use crafthall_bot::{Bot, BotSettings};
use crafthall_core::config::CrafthallConfig;
use crafthall_onebot::{ChannelReply, OneBotClient};
use crafthall_store::sqlite::Table;
use crafthall_store::SqliteStore;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "crafthall", author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "crafthall.toml")]
    config: String,

    /// Path to the profile database (overrides the config file)
    #[arg(short, long, env = "CRAFTHALL_DB")]
    db: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    info!("Initializing Crafthall...");

    // 1. Load config
    let mut config = CrafthallConfig::load_or_default(&args.config);
    if let Some(db) = args.db {
        config.store.db_path = db;
    }
    let onebot = config
        .onebot
        .clone()
        .context("No OneBot connection configured: set [onebot] ws_url or ONEBOT_WS_URL")?;
    if config.bot.owner_id.is_none() {
        warn!("No owner configured; delete_all_profiles is disabled");
    }

    // 2. Open the profile store
    info!("Opening profile store at {}...", config.store.db_path);
    let store = Arc::new(SqliteStore::new(&config.store.db_path).await?);
    info!(
        "Loaded {} profiles and {} recipes",
        store.count_rows(Table::Profiles).await?,
        store.count_rows(Table::Recipes).await?
    );

    // 3. Connect to the chat platform
    let bot = Bot::new(store.clone(), BotSettings::from(&config.bot));
    let (client, mut inbound) = OneBotClient::new(&onebot.ws_url, onebot.access_token.as_deref())?;

    info!("Crafthall online, listening for `{}` commands", bot.settings().prefix);

    loop {
        tokio::select! {
            msg = inbound.recv() => {
                let Some(msg) = msg else {
                    warn!("OneBot connection task stopped");
                    break;
                };
                let bot = bot.clone();
                let reply = ChannelReply::new(client.clone(), msg.channel);
                // One task per message: a pending confirmation must not block other members
                tokio::spawn(async move {
                    bot.handle(&msg.incoming, &reply).await;
                });
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down...");
                break;
            }
        }
    }

    store.close().await;
    Ok(())
}
