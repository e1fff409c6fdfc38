// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Closing tickets.
//!
//! The database row is closed first. Whoever flips it from open to closed
//! owns the rest of the flow (transcript, delivery, channel deletion); a
//! concurrent closer is told the ticket is already closed and stops there.

use std::time::Duration;

use chrono::Utc;
use tracing::{error, info, warn};

use tix_core::transcript::{self, content_type_for};
use tix_core::{
    Id, InlineAttachment, Ticket, TranscriptEmbed, TranscriptHeader, TranscriptMessage,
};

use super::{invoker, ui, TicketBot};
use crate::discord::model::{
    Embed, Interaction, InteractionReply, Message, OutgoingMessage, PermissionOverwrite,
    Permissions,
};
use crate::error::Result;
use crate::platform::Platform;

/// Close button clicked: staff get the close-reason modal.
pub(super) async fn button<P: Platform>(
    bot: &TicketBot<P>,
    interaction: &Interaction,
) -> Result<()> {
    let user = invoker(interaction)?;
    let reply = if bot.is_staff(interaction) {
        InteractionReply::Modal(ui::close_modal())
    } else {
        ui::notice_for(
            format!(
                "{}, you don't have sufficient permissions to close this ticket.",
                user.mention()
            ),
            ui::CONFIRM_TTL,
        )
    };
    bot.platform.respond(interaction, reply).await
}

/// Close-reason modal submitted.
pub(super) async fn submit<P: Platform>(
    bot: &TicketBot<P>,
    interaction: &Interaction,
) -> Result<()> {
    if !bot.is_staff(interaction) {
        return bot
            .platform
            .respond(
                interaction,
                InteractionReply::ephemeral(
                    "You do not have the required permissions to close this ticket.",
                ),
            )
            .await;
    }
    let user = invoker(interaction)?;
    let Some(channel_id) = interaction.channel_id else {
        return Ok(());
    };
    let reason = interaction
        .modal_value(ui::REASON_INPUT)
        .map(str::trim)
        .filter(|r| !r.is_empty());

    let closed = bot.db.lock().await.close_ticket(
        channel_id,
        user.id,
        &user.username,
        reason,
        Utc::now(),
    );
    let ticket = match closed {
        Ok(ticket) => ticket,
        Err(tix_core::Error::AlreadyClosed(_)) => {
            return bot
                .platform
                .respond(
                    interaction,
                    InteractionReply::ephemeral("This ticket has already been closed."),
                )
                .await;
        }
        Err(tix_core::Error::TicketNotFound(_)) => {
            return bot
                .platform
                .respond(
                    interaction,
                    InteractionReply::ephemeral("Error: Ticket not found in the **database**."),
                )
                .await;
        }
        Err(e) => return Err(e.into()),
    };
    info!(
        channel = %ticket.channel_id,
        closer = %user.username,
        "ticket closed"
    );

    bot.platform
        .respond(
            interaction,
            InteractionReply::ephemeral(format!(
                "The ticket will be closed in a few seconds... (Transcript: <#{}>)",
                bot.config.transcript_channel_id
            )),
        )
        .await?;
    bot.platform
        .send_message(
            channel_id,
            OutgoingMessage::text(format!(
                "The ticket was closed by {}... (This ticket will be closed in a few seconds)",
                user.mention()
            )),
        )
        .await?;

    let guild_id = bot.guild_id(interaction);
    if let Err(e) = lock_channel(bot, channel_id, guild_id).await {
        warn!(channel = %channel_id, "failed to lock ticket channel: {}", e);
    }

    match build_transcript(bot, &ticket, guild_id).await {
        Ok(html) => deliver_transcript(bot, &ticket, reason, guild_id, html).await,
        Err(e) => error!(channel = %channel_id, "failed to build transcript: {}", e),
    }

    tokio::time::sleep(Duration::from_secs(bot.config.close_delay_secs)).await;
    bot.platform.delete_channel(channel_id).await
}

/// Deny `SEND_MESSAGES` for everyone, keeping the rest of their overwrite.
async fn lock_channel<P: Platform>(bot: &TicketBot<P>, channel_id: Id, guild_id: Id) -> Result<()> {
    let current = bot
        .platform
        .channel(channel_id)
        .await?
        .and_then(|c| c.overwrite_for(guild_id).cloned())
        .unwrap_or_else(|| {
            PermissionOverwrite::role(guild_id, Permissions::empty(), Permissions::empty())
        });
    bot.platform
        .set_overwrite(channel_id, current.with_denied(Permissions::SEND_MESSAGES))
        .await
}

fn transcript_message(message: &Message) -> TranscriptMessage {
    TranscriptMessage {
        id: message.id,
        author_id: message.author.id,
        author_name: message.author.display_name().to_string(),
        avatar_url: Some(message.author.avatar_url()),
        timestamp: message.timestamp,
        content: message.content.clone(),
        embeds: message.embeds.iter().map(transcript_embed).collect(),
        attachments: message.attachments.clone(),
    }
}

fn transcript_embed(embed: &Embed) -> TranscriptEmbed {
    TranscriptEmbed {
        author: embed.author.as_ref().map(|a| a.name.clone()),
        title: embed.title.clone(),
        description: embed.description.clone(),
        fields: embed
            .fields
            .iter()
            .map(|f| (f.name.clone(), f.value.clone()))
            .collect(),
        footer: embed.footer.as_ref().map(|f| f.text.clone()),
    }
}

/// Render the full channel history with every attachment embedded.
///
/// Attachments that fail to download stay as links.
async fn build_transcript<P: Platform>(
    bot: &TicketBot<P>,
    ticket: &Ticket,
    guild_id: Id,
) -> Result<String> {
    let history = bot.platform.messages(ticket.channel_id).await?;
    let guild_name = match bot.platform.guild(guild_id).await {
        Ok(guild) => guild.name,
        Err(e) => {
            warn!(guild = %guild_id, "failed to fetch guild: {}", e);
            bot.config.branding.name.clone()
        }
    };
    let header = TranscriptHeader {
        guild_name,
        channel_name: ticket.channel_name.clone(),
        channel_id: ticket.channel_id,
        generated_at: Utc::now(),
    };
    let messages: Vec<TranscriptMessage> = history.iter().map(transcript_message).collect();
    let html = transcript::render(&header, &messages);

    let mut inline = Vec::new();
    for message in &history {
        for attachment in &message.attachments {
            match bot.platform.download(&attachment.url).await {
                Ok(bytes) => inline.push(InlineAttachment {
                    message_id: message.id,
                    url: attachment.url.clone(),
                    filename: attachment.filename.clone(),
                    content_type: content_type_for(
                        &attachment.filename,
                        attachment.content_type.as_deref(),
                    ),
                    bytes,
                }),
                Err(e) => warn!(
                    filename = %attachment.filename,
                    "failed to download attachment: {}", e
                ),
            }
        }
    }
    Ok(transcript::inline_attachments(&html, &inline))
}

/// Post the transcript to the archive channel and DM it to the opener.
async fn deliver_transcript<P: Platform>(
    bot: &TicketBot<P>,
    ticket: &Ticket,
    reason: Option<&str>,
    guild_id: Id,
    html: String,
) {
    let filename = ui::transcript_filename(&ticket.channel_name);
    let message = OutgoingMessage::embed(ui::transcript_embed(ticket, reason))
        .with_file(filename, html.into_bytes());

    if let Err(e) = bot
        .platform
        .send_message(bot.config.transcript_channel_id, message.clone())
        .await
    {
        error!(channel = %ticket.channel_id, "failed to post transcript: {}", e);
    }

    match bot.platform.member(guild_id, ticket.opener_id).await {
        Ok(Some(_)) => {
            let sent = match bot.platform.dm_channel(ticket.opener_id).await {
                Ok(dm) => bot.platform.send_message(dm.id, message).await.map(|_| ()),
                Err(e) => Err(e),
            };
            if let Err(e) = sent {
                warn!("unable to send a DM to {}: {}", ticket.opener_name, e);
            }
        }
        Ok(None) => info!(opener = %ticket.opener_name, "opener left, skipping DM"),
        Err(e) => warn!(opener = %ticket.opener_name, "failed to look up opener: {}", e),
    }
}

#[cfg(test)]
#[path = "close_tests.rs"]
mod tests;
