pub mod confirm;
pub mod handlers;

pub use confirm::{ConfirmOutcome, Confirmations, PendingConfirmation};

use crafthall_core::command::{self, Command};
use crafthall_core::config::BotConfig;
use crafthall_core::{Incoming, MemberId, ProfileStore, Reply};
use handlers::Context;
use std::sync::Arc;
use std::time::Duration;

/// Reply sent when a command fails for reasons the member cannot fix.
pub const FAILURE_REPLY: &str = "Something went wrong while running that command.";

#[derive(Debug, Clone)]
pub struct BotSettings {
    pub prefix: String,
    pub owner_id: Option<MemberId>,
    pub confirm_timeout: Duration,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self::from(&BotConfig::default())
    }
}

impl From<&BotConfig> for BotSettings {
    fn from(cfg: &BotConfig) -> Self {
        Self {
            prefix: cfg.prefix.clone(),
            owner_id: cfg.owner_id,
            confirm_timeout: Duration::from_secs(cfg.confirm_timeout_secs),
        }
    }
}

/// Routes incoming messages to pending confirmations or command handlers.
///
/// Cheap to clone. Callers should run each `handle` call in its own task:
/// a handler waiting for a confirmation stays suspended until answered or
/// timed out.
#[derive(Clone)]
pub struct Bot {
    store: Arc<dyn ProfileStore>,
    settings: Arc<BotSettings>,
    confirmations: Confirmations,
}

impl Bot {
    pub fn new(store: Arc<dyn ProfileStore>, settings: BotSettings) -> Self {
        Self {
            store,
            settings: Arc::new(settings),
            confirmations: Confirmations::new(),
        }
    }

    pub fn settings(&self) -> &BotSettings {
        &self.settings
    }

    pub fn confirmations(&self) -> &Confirmations {
        &self.confirmations
    }

    /// Process one message. Faults are logged and answered with
    /// [`FAILURE_REPLY`]; nothing is returned to the caller.
    pub async fn handle(&self, incoming: &Incoming, reply: &dyn Reply) {
        let author = &incoming.author;
        if self.confirmations.offer(author.id, &incoming.text) {
            tracing::debug!("Member {} confirmed a pending prompt", author.id);
            return;
        }

        let command = match command::parse(&self.settings.prefix, &incoming.text) {
            None => return,
            Some(Ok(cmd)) => cmd,
            Some(Err(usage_err)) => {
                tracing::debug!("Usage error from member {}: {}", author.id, usage_err);
                if let Err(e) = reply.reply(&usage_err.to_string()).await {
                    tracing::error!("Failed to send usage reply: {}", e);
                }
                return;
            }
        };

        let name = command.name();
        tracing::info!("Member {} ran {}", author.id, name);

        let ctx = Context {
            store: self.store.as_ref(),
            settings: &self.settings,
            confirmations: &self.confirmations,
            invoker: author,
            reply,
        };
        if let Err(e) = dispatch(&ctx, command).await {
            tracing::error!("Command {} from member {} failed: {:#}", name, author.id, e);
            if let Err(e) = reply.reply(FAILURE_REPLY).await {
                tracing::error!("Failed to send failure reply: {}", e);
            }
        }
    }
}

async fn dispatch(ctx: &Context<'_>, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Register { character_name, skill_level } => {
            handlers::register(ctx, &character_name, skill_level).await
        }
        Command::AddRecipe { name, required_skill } => {
            handlers::add_recipe(ctx, &name, required_skill).await
        }
        Command::Recipe { name } => handlers::recipe(ctx, &name).await,
        Command::AddSkill { skill_name, level } => {
            handlers::add_skill(ctx, &skill_name, level).await
        }
        Command::AddStat { stat_name, value } => handlers::add_stat(ctx, &stat_name, value).await,
        Command::View { target } => handlers::view(ctx, target).await,
        Command::DeleteProfile => handlers::delete_profile(ctx).await,
        Command::DeleteAllProfiles => handlers::delete_all_profiles(ctx).await,
        Command::Help => handlers::help(ctx).await,
    }
}
