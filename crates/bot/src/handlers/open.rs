// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Opening tickets: dropdown selection and the open modal.

use chrono::Utc;
use tracing::{info, warn};

use tix_core::{Id, NewTicket};

use super::{invoker, ui, TicketBot};
use crate::config::CategoryOption;
use crate::discord::model::{
    Channel, Interaction, InteractionReply, NewChannel, OutgoingMessage, PermissionOverwrite,
    Permissions, User, CHANNEL_TEXT,
};
use crate::error::Result;
use crate::platform::Platform;

/// Dropdown selected: show the open modal for the chosen category.
pub(super) async fn select<P: Platform>(
    bot: &TicketBot<P>,
    interaction: &Interaction,
) -> Result<()> {
    let user = invoker(interaction)?;
    let option = interaction
        .values()
        .first()
        .and_then(|value| bot.config.category(value));

    let reply = match option {
        Some(option) => InteractionReply::Modal(ui::open_modal(option)),
        None => ui::notice_for(
            format!(
                "{}, the selected value is not a valid option. Please try again.",
                user.mention()
            ),
            ui::CONFIRM_TTL,
        ),
    };
    bot.platform.respond(interaction, reply).await
}

/// Open modal submitted: create the ticket channel and record the ticket.
pub(super) async fn submit<P: Platform>(
    bot: &TicketBot<P>,
    interaction: &Interaction,
    value: &str,
) -> Result<()> {
    bot.platform
        .respond(interaction, InteractionReply::Defer { ephemeral: true })
        .await?;

    let user = invoker(interaction)?;
    let Some(option) = bot.config.category(value) else {
        return followup(
            bot,
            interaction,
            format!(
                "{}, the selected value is not a valid option. Please try again.",
                user.mention()
            ),
        )
        .await;
    };

    let existing = bot.db.lock().await.find_open_by_opener(user.id)?;
    if let Some(ticket) = existing {
        return point_at_existing(bot, interaction, ticket.channel_id, &ticket.channel_name).await;
    }

    let guild_id = bot.guild_id(interaction);
    let channel = bot
        .platform
        .create_channel(guild_id, ticket_channel(bot, guild_id, user, option))
        .await?;
    let category_name = category_name(bot, option).await;

    let new = NewTicket {
        channel_id: channel.id,
        channel_name: channel.name().to_string(),
        category_id: option.category_id,
        category_name,
        opener_id: user.id,
        opener_name: user.username.clone(),
    };
    let created = bot.db.lock().await.create_ticket(&new, Utc::now());
    match created {
        Ok(ticket) => info!(
            channel = %ticket.channel_id,
            opener = %ticket.opener_name,
            category = %ticket.category_name,
            "ticket opened"
        ),
        Err(tix_core::Error::AlreadyOpen { .. }) => {
            // Lost a race with another submit from the same user
            discard_channel(bot, &channel).await;
            let winner = bot.db.lock().await.find_open_by_opener(user.id)?;
            return match winner {
                Some(ticket) => {
                    point_at_existing(bot, interaction, ticket.channel_id, &ticket.channel_name)
                        .await
                }
                None => followup(bot, interaction, "Please try again.".to_string()).await,
            };
        }
        Err(e) => {
            discard_channel(bot, &channel).await;
            return Err(e.into());
        }
    }

    let nickname = interaction.modal_value(ui::NICKNAME_INPUT).unwrap_or_default();
    let problem = interaction.modal_value(ui::PROBLEM_INPUT).unwrap_or_default();

    bot.platform
        .send_message(
            channel.id,
            OutgoingMessage::text(format!(
                "{}{}",
                user.mention(),
                ui::role_mentions(&bot.config.staff_role_ids)
            )),
        )
        .await?;
    let welcome = bot
        .platform
        .send_message(
            channel.id,
            OutgoingMessage::embed(ui::welcome_embed(
                user,
                nickname,
                problem,
                &bot.config.branding,
            )),
        )
        .await?;
    followup(
        bot,
        interaction,
        format!("Your ticket has been created: {}", channel.mention()),
    )
    .await?;
    bot.platform
        .send_message(
            channel.id,
            OutgoingMessage::default().with_components(ui::close_button_row()),
        )
        .await?;
    if let Err(e) = bot.platform.pin_message(channel.id, welcome.id).await {
        warn!(channel = %channel.id, "failed to pin welcome message: {}", e);
    }
    Ok(())
}

/// Channel layout for a new ticket: hidden from everyone except staff and
/// the opener.
fn ticket_channel<P: Platform>(
    bot: &TicketBot<P>,
    guild_id: Id,
    user: &User,
    option: &CategoryOption,
) -> NewChannel {
    let mut overwrites = vec![PermissionOverwrite::role(
        guild_id,
        Permissions::empty(),
        Permissions::VIEW_CHANNEL,
    )];
    overwrites.extend(bot.config.staff_role_ids.iter().map(|role| {
        PermissionOverwrite::role(*role, Permissions::participant(), Permissions::empty())
    }));
    overwrites.push(PermissionOverwrite::member(
        user.id,
        Permissions::participant(),
        Permissions::empty(),
    ));

    NewChannel {
        name: format!("ticket-{}", user.username),
        kind: CHANNEL_TEXT,
        parent_id: Some(option.category_id),
        topic: Some(format!("{} ticket opened by {}", option.label, user.username)),
        permission_overwrites: overwrites,
    }
}

/// The category's channel name, falling back to the dropdown label.
async fn category_name<P: Platform>(bot: &TicketBot<P>, option: &CategoryOption) -> String {
    match bot.platform.channel(option.category_id).await {
        Ok(Some(category)) if category.name.is_some() => category.name().to_string(),
        Ok(_) => option.label.clone(),
        Err(e) => {
            warn!(category = %option.category_id, "failed to fetch category: {}", e);
            option.label.clone()
        }
    }
}

async fn point_at_existing<P: Platform>(
    bot: &TicketBot<P>,
    interaction: &Interaction,
    channel_id: Id,
    channel_name: &str,
) -> Result<()> {
    let text = match bot.platform.channel(channel_id).await? {
        Some(channel) => format!("You already have an open ticket: {}", channel.mention()),
        None => format!(
            "You already have an open ticket named **{channel_name}**, but the channel was not found. Please contact the staff."
        ),
    };
    followup(bot, interaction, text).await
}

async fn discard_channel<P: Platform>(bot: &TicketBot<P>, channel: &Channel) {
    if let Err(e) = bot.platform.delete_channel(channel.id).await {
        warn!(channel = %channel.id, "failed to delete unused ticket channel: {}", e);
    }
}

async fn followup<P: Platform>(
    bot: &TicketBot<P>,
    interaction: &Interaction,
    text: String,
) -> Result<()> {
    bot.platform
        .followup(interaction, OutgoingMessage::text(text).ephemeral())
        .await
}

#[cfg(test)]
#[path = "open_tests.rs"]
mod tests;
