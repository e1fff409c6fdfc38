// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Staff slash commands.

use tracing::{info, warn};

use tix_core::Id;

use super::{invoker, ui, TicketBot};
use crate::discord::model::{
    ChannelEdit, Interaction, InteractionReply, OutgoingMessage, PermissionOverwrite, Permissions,
    User,
};
use crate::error::{Error, Result};
use crate::platform::Platform;

/// `/ticket-setup`: post the dropdown embed into the setup channel.
pub(super) async fn setup<P: Platform>(
    bot: &TicketBot<P>,
    interaction: &Interaction,
) -> Result<()> {
    if !bot.config.can_setup(interaction.roles()) {
        return bot
            .platform
            .respond(interaction, ui::notice("You cannot use this command."))
            .await;
    }
    let guild_id = bot.guild_id(interaction);
    let guild = bot.platform.guild(guild_id).await?;
    let channel_id = bot.config.setup_channel_id;
    bot.platform
        .send_message(
            channel_id,
            OutgoingMessage::embed(ui::setup_embed(&guild.name, &bot.config.branding))
                .with_components(ui::dropdown(&bot.config.categories)),
        )
        .await?;
    info!(channel = %channel_id, "setup embed posted");
    bot.platform
        .respond(
            interaction,
            ui::notice_for(
                format!("Ticket embed sent successfully! <#{channel_id}>"),
                ui::CONFIRM_TTL,
            ),
        )
        .await
}

/// The `user` option of add/remove, resolved to a full user.
fn target_user(interaction: &Interaction) -> Result<&User> {
    interaction
        .option_id("user")
        .and_then(|id| interaction.resolved_user(id))
        .ok_or_else(|| Error::Interaction("missing user option".to_string()))
}

/// `/ticket-add user`: give a member access to the ticket channel.
pub(super) async fn add<P: Platform>(bot: &TicketBot<P>, interaction: &Interaction) -> Result<()> {
    let Some(channel) = bot.staff_ticket_channel(interaction).await? else {
        return Ok(());
    };
    let inviter = invoker(interaction)?;
    let target = target_user(interaction)?;

    if target.id == inviter.id {
        return bot
            .platform
            .respond(
                interaction,
                ui::notice("You cannot add **yourself** to the ticket."),
            )
            .await;
    }
    let roles = member_roles(interaction, target.id);
    if bot.has_access(&channel, target.id, roles) {
        return bot
            .platform
            .respond(
                interaction,
                ui::notice(format!("{} is already in the ticket.", target.mention())),
            )
            .await;
    }

    bot.platform
        .set_overwrite(
            channel.id,
            PermissionOverwrite::member(
                target.id,
                Permissions::participant(),
                Permissions::empty(),
            ),
        )
        .await?;
    info!(channel = %channel.id, user = %target.username, "user added to ticket");
    bot.platform
        .respond(
            interaction,
            InteractionReply::Message(OutgoingMessage::text(format!(
                "{} added {} to the ticket.",
                inviter.mention(),
                target.mention()
            ))),
        )
        .await
}

/// `/ticket-remove user`: revoke a member's access to the ticket channel.
pub(super) async fn remove<P: Platform>(
    bot: &TicketBot<P>,
    interaction: &Interaction,
) -> Result<()> {
    let Some(channel) = bot.staff_ticket_channel(interaction).await? else {
        return Ok(());
    };
    let remover = invoker(interaction)?;
    let target = target_user(interaction)?;

    if target.id == remover.id {
        return bot
            .platform
            .respond(
                interaction,
                ui::notice("You cannot remove **yourself** from the ticket."),
            )
            .await;
    }
    let roles = member_roles(interaction, target.id);
    if !bot.has_access(&channel, target.id, roles) {
        return bot
            .platform
            .respond(
                interaction,
                ui::notice(format!("{} is not in the ticket.", target.mention())),
            )
            .await;
    }

    bot.platform
        .set_overwrite(
            channel.id,
            PermissionOverwrite::member(
                target.id,
                Permissions::empty(),
                Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES,
            ),
        )
        .await?;
    info!(channel = %channel.id, user = %target.username, "user removed from ticket");
    bot.platform
        .respond(
            interaction,
            InteractionReply::Message(OutgoingMessage::text(format!(
                "{} removed {} from the ticket.",
                remover.mention(),
                target.mention()
            ))),
        )
        .await
}

fn member_roles(interaction: &Interaction, user_id: Id) -> &[Id] {
    interaction
        .resolved_member(user_id)
        .map(|m| m.roles.as_slice())
        .unwrap_or_default()
}

/// `/ticket-rename newname`.
pub(super) async fn rename<P: Platform>(
    bot: &TicketBot<P>,
    interaction: &Interaction,
) -> Result<()> {
    let Some(channel) = bot.staff_ticket_channel(interaction).await? else {
        return Ok(());
    };
    let user = invoker(interaction)?;
    let new_name = interaction.option_str("newname").unwrap_or_default().trim();

    if new_name.is_empty() {
        return bot
            .platform
            .respond(
                interaction,
                ui::notice("The **new name** is not valid; you must provide a name."),
            )
            .await;
    }
    if new_name == channel.name() {
        return bot
            .platform
            .respond(
                interaction,
                ui::notice(format!("The channel name is already **{new_name}**.")),
            )
            .await;
    }

    if !ensure_open(bot, interaction, channel.id).await? {
        return Ok(());
    }
    let edit = ChannelEdit {
        name: Some(new_name.to_string()),
        ..ChannelEdit::default()
    };
    let edited = match bot.platform.edit_channel(channel.id, edit).await {
        Ok(edited) => edited,
        Err(e) => return edit_failed(bot, interaction, channel.id, "renamed", e).await,
    };
    // The platform may normalize the name (case, spaces); store what it kept
    let final_name = match edited.name() {
        "" => new_name.to_string(),
        name => name.to_string(),
    };
    if !update_ticket(bot, interaction, |db| db.rename_ticket(channel.id, &final_name)).await? {
        return Ok(());
    }
    info!(channel = %channel.id, name = %final_name, "ticket renamed");

    bot.platform
        .send_message(
            channel.id,
            OutgoingMessage::text(format!(
                "{} renamed the ticket to **{final_name}**.",
                user.mention()
            )),
        )
        .await?;
    bot.platform
        .respond(
            interaction,
            ui::notice(format!(
                "{}, you successfully renamed the ticket to **{final_name}**!",
                user.mention()
            )),
        )
        .await
}

/// `/ticket-move category`.
pub(super) async fn move_ticket<P: Platform>(
    bot: &TicketBot<P>,
    interaction: &Interaction,
) -> Result<()> {
    let Some(channel) = bot.staff_ticket_channel(interaction).await? else {
        return Ok(());
    };
    let user = invoker(interaction)?;
    let Some(target) = interaction
        .option_id("category")
        .and_then(|id| interaction.resolved_channel(id))
    else {
        return bot
            .platform
            .respond(
                interaction,
                ui::notice("The **selected category** was not found."),
            )
            .await;
    };
    let target_name = target.name().to_string();

    if channel.parent_id == Some(target.id) {
        return bot
            .platform
            .respond(
                interaction,
                ui::notice(format!("The ticket is already in **{target_name}**.")),
            )
            .await;
    }
    if bot.config.category_by_id(target.id).is_none() {
        return bot
            .platform
            .respond(
                interaction,
                ui::notice("The **selected category** is not a **ticket category**."),
            )
            .await;
    }

    let target_id = target.id;
    if !ensure_open(bot, interaction, channel.id).await? {
        return Ok(());
    }
    let edit = ChannelEdit {
        parent_id: Some(target_id),
        ..ChannelEdit::default()
    };
    if let Err(e) = bot.platform.edit_channel(channel.id, edit).await {
        return edit_failed(bot, interaction, channel.id, "moved", e).await;
    }
    if !update_ticket(bot, interaction, |db| {
        db.move_ticket(channel.id, target_id, &target_name)
    })
    .await?
    {
        return Ok(());
    }
    info!(channel = %channel.id, category = %target_name, "ticket moved");

    bot.platform
        .send_message(
            channel.id,
            OutgoingMessage::text(format!(
                "{} moved the ticket to **{target_name}**.",
                user.mention()
            )),
        )
        .await?;
    bot.platform
        .respond(
            interaction,
            ui::notice(format!(
                "{}, you successfully moved the ticket to **{target_name}**!",
                user.mention()
            )),
        )
        .await
}

/// `/ticket-close`: ask for confirmation with a close button.
pub(super) async fn close_request<P: Platform>(
    bot: &TicketBot<P>,
    interaction: &Interaction,
) -> Result<()> {
    let Some(channel) = bot.staff_ticket_channel(interaction).await? else {
        return Ok(());
    };
    let open = bot.db.lock().await.find_open_ticket(channel.id)?;
    if open.is_none() {
        return bot
            .platform
            .respond(
                interaction,
                ui::notice("Error: Ticket not found in the **database**."),
            )
            .await;
    }
    bot.platform
        .respond(
            interaction,
            InteractionReply::Message(
                OutgoingMessage::embed(ui::close_confirm_embed(&bot.config.branding))
                    .with_components(ui::close_button_row())
                    .ephemeral()
                    .delete_after(ui::CONFIRM_TTL),
            ),
        )
        .await
}

/// Tell the user when the current channel has no open ticket row.
async fn ensure_open<P: Platform>(
    bot: &TicketBot<P>,
    interaction: &Interaction,
    channel_id: Id,
) -> Result<bool> {
    let open = bot.db.lock().await.find_open_ticket(channel_id)?.is_some();
    if !open {
        bot.platform
            .respond(
                interaction,
                ui::notice("Error: Ticket not found in the **database**."),
            )
            .await?;
    }
    Ok(open)
}

/// Report a channel edit the platform refused; the row is left untouched.
async fn edit_failed<P: Platform>(
    bot: &TicketBot<P>,
    interaction: &Interaction,
    channel_id: Id,
    action: &str,
    error: Error,
) -> Result<()> {
    warn!(channel = %channel_id, "ticket could not be {}: {}", action, error);
    let text = match error {
        Error::RateLimited { .. } => {
            format!("The ticket could not be {action} right now; please try again later.")
        }
        _ => format!("The ticket could not be {action}."),
    };
    bot.platform.respond(interaction, ui::notice(text)).await
}

/// Apply a write to the ticket row for the current channel.
///
/// Returns false after telling the user when the row is missing or closed.
async fn update_ticket<P, F>(
    bot: &TicketBot<P>,
    interaction: &Interaction,
    write: F,
) -> Result<bool>
where
    P: Platform,
    F: FnOnce(&mut tix_core::Database) -> tix_core::Result<()>,
{
    let result = write(&mut *bot.db.lock().await);
    match result {
        Ok(()) => Ok(true),
        Err(tix_core::Error::TicketNotFound(_)) | Err(tix_core::Error::TicketNotOpen(_)) => {
            bot.platform
                .respond(
                    interaction,
                    ui::notice("Error: Ticket not found in the **database**."),
                )
                .await?;
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[path = "manage_tests.rs"]
mod tests;
