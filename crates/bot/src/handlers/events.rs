// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Gateway events that are not interactions.

use tracing::{info, warn};

use super::{ui, TicketBot};
use crate::discord::model::{Channel, MemberRemove, OutgoingMessage, Ready};
use crate::error::{Error, Result};
use crate::platform::Platform;

/// Register the slash commands and log what the bot is connected to.
pub(super) async fn ready<P: Platform>(bot: &TicketBot<P>, ready: &Ready) -> Result<()> {
    let guild_id = bot.config.guild_id;
    if !ready.guilds.iter().any(|g| g.id == guild_id) {
        return Err(Error::Config(format!(
            "bot {} is not a member of guild {}",
            ready.user.username, guild_id
        )));
    }

    let count = bot
        .platform
        .register_commands(ready.application.id, guild_id, &ui::commands())
        .await?;
    let (open, closed) = bot.db.lock().await.count_by_status()?;
    info!(
        bot = %ready.user.username,
        guild = %guild_id,
        commands = count,
        open,
        closed,
        "bot ready"
    );
    Ok(())
}

/// Drop the row of an open ticket whose channel was deleted by hand.
pub(super) async fn channel_deleted<P: Platform>(
    bot: &TicketBot<P>,
    channel: &Channel,
) -> Result<()> {
    if bot.db.lock().await.delete_open_ticket(channel.id)? {
        info!(channel = %channel.id, "ticket channel deleted, row removed");
    }
    Ok(())
}

/// Tell staff when an opener leaves the guild with a ticket still open.
pub(super) async fn member_removed<P: Platform>(
    bot: &TicketBot<P>,
    removed: &MemberRemove,
) -> Result<()> {
    if removed.guild_id != bot.config.guild_id {
        return Ok(());
    }
    let Some(ticket) = bot.db.lock().await.find_open_by_opener(removed.user.id)? else {
        return Ok(());
    };
    if bot.platform.channel(ticket.channel_id).await?.is_none() {
        warn!(
            channel = %ticket.channel_id,
            "open ticket channel not found for departed member"
        );
        return Ok(());
    }

    bot.platform
        .send_message(
            ticket.channel_id,
            OutgoingMessage::text(ui::role_mentions(&bot.config.staff_role_ids))
                .with_embed(ui::member_left_embed(
                    &removed.user.username,
                    &bot.config.branding,
                ))
                .with_components(ui::close_button_row()),
        )
        .await?;
    info!(
        channel = %ticket.channel_id,
        user = %removed.user.username,
        "opener left the guild"
    );
    Ok(())
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
