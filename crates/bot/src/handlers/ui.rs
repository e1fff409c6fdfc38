// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Embeds, components and command definitions shown to users.
//!
//! Component identity lives entirely in `custom_id`s, so menus and buttons
//! posted before a restart keep working.

use std::time::Duration;

use chrono::{DateTime, Utc};

use tix_core::{Id, Ticket};

use crate::config::{Branding, CategoryOption};
use crate::discord::model::{
    CommandOptionSpec, CommandSpec, Component, Embed, Emoji, InteractionReply, Modal,
    OutgoingMessage, SelectOption, User, BUTTON_DANGER, CHANNEL_CATEGORY, OPTION_CHANNEL,
    OPTION_STRING, OPTION_USER, TEXT_INPUT_PARAGRAPH, TEXT_INPUT_SHORT,
};

pub const SELECT_ID: &str = "tix:select";
pub const OPEN_MODAL_PREFIX: &str = "tix:open:";
pub const CLOSE_BUTTON_ID: &str = "tix:close";
pub const CLOSE_MODAL_ID: &str = "tix:close-reason";

pub const NICKNAME_INPUT: &str = "nickname";
pub const PROBLEM_INPUT: &str = "problem";
pub const REASON_INPUT: &str = "reason";

const EMBED_COLOR: u32 = 0x0a0a0a;
const TRANSCRIPT_COLOR: u32 = 0x3498db;
const DATE_FORMAT: &str = "%d/%m/%Y %H:%M:%S";
const MODAL_TITLE_MAX: usize = 45;

/// How long short ephemeral notices stay up.
pub const NOTICE_TTL: Duration = Duration::from_secs(5);
/// How long the close confirmation stays up.
pub const CONFIRM_TTL: Duration = Duration::from_secs(10);

/// A short ephemeral reply that deletes itself.
pub fn notice(text: impl Into<String>) -> InteractionReply {
    notice_for(text, NOTICE_TTL)
}

pub fn notice_for(text: impl Into<String>, ttl: Duration) -> InteractionReply {
    InteractionReply::Message(OutgoingMessage::text(text).ephemeral().delete_after(ttl))
}

pub fn format_date(at: DateTime<Utc>) -> String {
    at.format(DATE_FORMAT).to_string()
}

pub fn role_mentions(roles: &[Id]) -> String {
    roles.iter().map(|r| format!("<@&{r}>")).collect()
}

fn branded(embed: Embed, branding: &Branding) -> Embed {
    embed
        .footer(branding.name.clone(), branding.avatar_url.clone())
        .thumbnail(branding.avatar_url.clone())
}

pub fn setup_embed(guild_name: &str, branding: &Branding) -> Embed {
    branded(
        Embed::new()
            .description(format!(
                "### {guild_name} - Ticket System\n\n> Need help? No problem! Use the menu below to create a new ticket where our staff will assist you."
            ))
            .color(EMBED_COLOR),
        branding,
    )
}

/// The "open a ticket" dropdown, one option per configured category.
pub fn dropdown(categories: &[CategoryOption]) -> Vec<Component> {
    let options = categories
        .iter()
        .map(|c| SelectOption {
            label: c.label.clone(),
            value: c.value.clone(),
            description: c.description.clone(),
            emoji: c.emoji.clone().map(|name| Emoji { name }),
        })
        .collect();
    vec![Component::action_row(vec![Component::select_menu(
        SELECT_ID,
        "🎫〢Select an option to open a ticket",
        options,
    )])]
}

pub fn open_modal_id(value: &str) -> String {
    format!("{OPEN_MODAL_PREFIX}{value}")
}

pub fn open_modal(option: &CategoryOption) -> Modal {
    let mut title = format!("🚨 | Ticket {}", option.label);
    if title.chars().count() > MODAL_TITLE_MAX {
        title = title.chars().take(MODAL_TITLE_MAX).collect();
    }
    Modal {
        custom_id: open_modal_id(&option.value),
        title,
        components: vec![
            Component::action_row(vec![Component::text_input(
                NICKNAME_INPUT,
                "Nickname",
                TEXT_INPUT_SHORT,
                true,
                Some(100),
            )]),
            Component::action_row(vec![Component::text_input(
                PROBLEM_INPUT,
                "What's your problem?",
                TEXT_INPUT_PARAGRAPH,
                true,
                Some(1000),
            )]),
        ],
    }
}

pub fn close_button_row() -> Vec<Component> {
    vec![Component::action_row(vec![Component::button(
        BUTTON_DANGER,
        CLOSE_BUTTON_ID,
        "Close Ticket",
        Some("🔒"),
    )])]
}

pub fn close_modal() -> Modal {
    Modal {
        custom_id: CLOSE_MODAL_ID.to_string(),
        title: "🧩 | Close Ticket".to_string(),
        components: vec![Component::action_row(vec![Component::text_input(
            REASON_INPUT,
            "Reason for closing ticket",
            TEXT_INPUT_PARAGRAPH,
            true,
            Some(1000),
        )])],
    }
}

pub fn welcome_embed(user: &User, nickname: &str, problem: &str, branding: &Branding) -> Embed {
    let description = format!(
        "Hello, {}\nA staff member will assist you shortly.\n\n\
         Thank you for opening a ticket! We are working to respond as quickly as possible.\n\
         We are a bit behind, but we will do our best to help you.\n\n\
         **Note: current wait times may be high (up to 24h), so please do not tag staff members.**\n\n\
         **Details:**\n> **Nickname**: **``{}``**\n> **Problem**: **``{}``**",
        user.mention(),
        nickname,
        problem
    );
    branded(
        Embed::new()
            .author("✅ How can we help you?", Some(user.avatar_url()))
            .description(description)
            .color(EMBED_COLOR),
        branding,
    )
}

pub fn member_left_embed(username: &str, branding: &Branding) -> Embed {
    branded(
        Embed::new()
            .description(format!(
                "### {username} - LEFT THE SERVER\n> The member **{username}** has left the server. This ticket can now be closed at any time; use the button below to close it."
            ))
            .color(EMBED_COLOR),
        branding,
    )
}

pub fn close_confirm_embed(branding: &Branding) -> Embed {
    branded(
        Embed::new()
            .title("Ticket Closure")
            .description(format!(
                "> Are you sure you want to close this **ticket**? (You have **{}** __seconds__ to close it)",
                CONFIRM_TTL.as_secs()
            ))
            .color(0),
        branding,
    )
}

/// Summary posted with the transcript file.
pub fn transcript_embed(ticket: &Ticket, reason: Option<&str>) -> Embed {
    let closer = ticket
        .closer_id
        .map(|id| format!("<@{id}>"))
        .unwrap_or_else(|| "`unknown`".to_string());
    let closed_on = ticket
        .closed_at
        .map(format_date)
        .unwrap_or_else(|| "-".to_string());
    Embed::new()
        .title("📄 | New Transcript Generated")
        .color(TRANSCRIPT_COLOR)
        .field("🆔 Ticket ID", format!("`{}`", ticket.channel_id), true)
        .field("📁 Category", format!("`{}`", ticket.category_name), true)
        .field("🔒 Closed by", closer, true)
        .field("👤 Opened by", format!("<@{}>", ticket.opener_id), true)
        .field("📅 Opened on", format!("`{}`", format_date(ticket.opened_at)), true)
        .field("📅 Closed on", format!("`{closed_on}`"), true)
        .field(
            "📝 Reason for closing",
            format!("```{}```", reason.unwrap_or("No reason given")),
            true,
        )
}

pub fn transcript_filename(channel_name: &str) -> String {
    format!("transcript-{channel_name}.html")
}

/// The guild slash commands.
pub fn commands() -> Vec<CommandSpec> {
    vec![
        CommandSpec::new("ticket-setup", "Send the ticket setup embed"),
        CommandSpec::new("ticket-add", "Add a user to a ticket").option(CommandOptionSpec::new(
            OPTION_USER,
            "user",
            "The user to add to the ticket",
        )),
        CommandSpec::new("ticket-remove", "Remove a user from a ticket").option(
            CommandOptionSpec::new(OPTION_USER, "user", "The user to remove from the ticket"),
        ),
        CommandSpec::new("ticket-rename", "Rename a ticket").option(CommandOptionSpec::new(
            OPTION_STRING,
            "newname",
            "The new name of the ticket",
        )),
        CommandSpec::new("ticket-move", "Move a ticket to another category").option(
            CommandOptionSpec::new(
                OPTION_CHANNEL,
                "category",
                "The category where the ticket will be moved",
            )
            .channel_types(&[CHANNEL_CATEGORY]),
        ),
        CommandSpec::new("ticket-close", "Close the ticket"),
    ]
}

#[cfg(test)]
#[path = "ui_tests.rs"]
mod tests;
