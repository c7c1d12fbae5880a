//! One handler per command. Each validates its input, talks to the store and
//! answers with the reply texts members already know.

use anyhow::Result;
use crafthall_core::catalog::{self, skill_listing, stat_listing};
use crafthall_core::command::{usage, COMMANDS};
use crafthall_core::{Invoker, MemberId, ProfileStore, Reply, Stat};

use crate::confirm::{ConfirmOutcome, Confirmations};
use crate::BotSettings;

/// Everything a handler needs for one invocation.
pub struct Context<'a> {
    pub store: &'a dyn ProfileStore,
    pub settings: &'a BotSettings,
    pub confirmations: &'a Confirmations,
    pub invoker: &'a Invoker,
    pub reply: &'a dyn Reply,
}

pub async fn register(
    ctx: &Context<'_>,
    character_name: &str,
    skill_level: Option<i64>,
) -> Result<()> {
    let Some(skill_level) = skill_level else {
        let msg = format!(
            "Please provide a skill level. Usage: {}",
            usage(&ctx.settings.prefix, "register")
        );
        return ctx.reply.reply(&msg).await;
    };

    ctx.store
        .upsert_profile(ctx.invoker.id, character_name, skill_level)
        .await?;
    ctx.reply
        .reply(&format!("{} registered with skill level {}.", character_name, skill_level))
        .await
}

pub async fn add_recipe(ctx: &Context<'_>, name: &str, required_skill: i64) -> Result<()> {
    ctx.store.upsert_recipe(name, required_skill).await?;
    ctx.reply
        .reply(&format!(
            "Recipe '{}' added with required skill level {}.",
            name, required_skill
        ))
        .await
}

pub async fn recipe(ctx: &Context<'_>, name: &str) -> Result<()> {
    let Some(required_skill) = ctx.store.find_recipe(name).await? else {
        return ctx.reply.reply("Recipe not found.").await;
    };

    let crafters = ctx.store.find_eligible_crafters(required_skill).await?;
    let msg = if crafters.is_empty() {
        format!("No crafters with the required skill level for '{}'.", name)
    } else {
        format!(
            "Recipe '{}' requires skill level {}. Crafters available: {}",
            name,
            required_skill,
            crafters.join(", ")
        )
    };
    ctx.reply.reply(&msg).await
}

pub async fn add_skill(ctx: &Context<'_>, skill_name: &str, level: i64) -> Result<()> {
    let skill_name = skill_name.to_lowercase();
    let Some(category) = catalog::classify(&skill_name) else {
        let msg = format!(
            "Invalid skill '{}'. Please provide a valid skill. Valid skills are:\n{}",
            skill_name,
            skill_listing()
        );
        return ctx.reply.reply(&msg).await;
    };

    ctx.store
        .upsert_skill(ctx.invoker.id, category, &skill_name, level)
        .await?;
    ctx.reply
        .reply(&format!(
            "Skill '{}' in category '{}' added with level {}.",
            skill_name, category, level
        ))
        .await
}

pub async fn add_stat(ctx: &Context<'_>, stat_name: &str, value: i64) -> Result<()> {
    let stat_name = stat_name.to_lowercase();
    let Some(stat) = Stat::parse(&stat_name) else {
        let msg = format!("Invalid stat '{}'. Valid stats are: {}", stat_name, stat_listing());
        return ctx.reply.reply(&msg).await;
    };

    ctx.store.set_stat(ctx.invoker.id, stat, value).await?;
    ctx.reply
        .reply(&format!("{} set to {}.", stat.label(), value))
        .await
}

pub async fn view(ctx: &Context<'_>, target: Option<MemberId>) -> Result<()> {
    let (member_id, name) = match target {
        Some(id) if id != ctx.invoker.id => {
            let name = match ctx.store.find_profile(id).await? {
                Some(profile) => profile.character_name,
                None => format!("member {}", id),
            };
            (id, name)
        }
        _ => (ctx.invoker.id, ctx.invoker.display_name.clone()),
    };

    let mut msg = format!("Stats for {}:\n", name);
    match ctx.store.get_stats(member_id).await? {
        Some(sheet) => {
            for (stat, value) in sheet.entries() {
                let value = value.map_or_else(|| "Not set".to_string(), |v| v.to_string());
                msg.push_str(&format!("{}: {}\n", stat.label(), value));
            }
        }
        None => msg.push_str("No stats found.\n"),
    }
    ctx.reply.reply(&msg).await
}

pub async fn delete_profile(ctx: &Context<'_>) -> Result<()> {
    let member_id = ctx.invoker.id;
    if !ctx.store.has_profile_data(member_id).await? {
        return ctx.reply.reply("You don't have a profile to delete.").await;
    }

    let prompt = format!(
        "Are you sure you want to delete your profile, {}? This action cannot be undone. Type `confirm` to proceed.",
        ctx.invoker.display_name
    );
    if !confirm(ctx, &prompt).await? {
        return Ok(());
    }

    ctx.store.delete_profile(member_id).await?;
    ctx.reply
        .reply(&format!(
            "Your profile has been successfully deleted, {}.",
            ctx.invoker.display_name
        ))
        .await
}

pub async fn delete_all_profiles(ctx: &Context<'_>) -> Result<()> {
    if ctx.settings.owner_id != Some(ctx.invoker.id) {
        tracing::warn!("Member {} tried to delete all profiles", ctx.invoker.id);
        return ctx
            .reply
            .reply("You do not have permission to delete all profiles.")
            .await;
    }

    let prompt = "Are you sure you want to delete all profiles in this server? This action cannot be undone. Type `confirm` to proceed.";
    if !confirm(ctx, prompt).await? {
        return Ok(());
    }

    ctx.store.delete_all().await?;
    ctx.reply.reply("All profiles have been successfully deleted.").await
}

pub async fn help(ctx: &Context<'_>) -> Result<()> {
    let mut msg = String::from("Available commands:\n");
    for (name, _) in COMMANDS {
        msg.push_str(&usage(&ctx.settings.prefix, name));
        msg.push('\n');
    }
    ctx.reply.reply(&msg).await
}

/// Prompt, then wait for the invoker to type `confirm`. Replies on its own
/// when the answer never comes; returns true only when confirmed.
async fn confirm(ctx: &Context<'_>, prompt: &str) -> Result<bool> {
    // Register before prompting so a fast reply cannot be missed
    let pending = ctx.confirmations.begin(ctx.invoker.id);
    ctx.reply.reply(prompt).await?;

    match pending.wait(ctx.settings.confirm_timeout).await {
        ConfirmOutcome::Confirmed => Ok(true),
        ConfirmOutcome::TimedOut => {
            ctx.reply
                .reply("Profile deletion timed out. No changes were made.")
                .await?;
            Ok(false)
        }
        ConfirmOutcome::Superseded => {
            ctx.reply
                .reply("Profile deletion cancelled. No changes were made.")
                .await?;
            Ok(false)
        }
    }
}
