// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory [`Platform`] for handler tests.
//!
//! Records every call and keeps just enough channel state (overwrites,
//! names, parents, history) for the handlers to read back what they wrote.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use tix_core::{Database, Id};

use super::TicketBot;
use crate::config::Config;
use crate::discord::model::{
    Channel, ChannelEdit, CommandOption, CommandSpec, Component, Guild, Interaction,
    InteractionData, InteractionReply, Member, Message, NewChannel, OutgoingMessage,
    PermissionOverwrite, Resolved, User, CHANNEL_CATEGORY, CHANNEL_TEXT, COMPONENT_ACTION_ROW,
    COMPONENT_BUTTON, COMPONENT_SELECT_MENU, COMPONENT_TEXT_INPUT, INTERACTION_COMMAND,
    INTERACTION_COMPONENT, INTERACTION_MODAL_SUBMIT, OPTION_CHANNEL, OPTION_STRING, OPTION_USER,
};
use crate::error::{Error, Result};
use crate::platform::Platform;

pub const GUILD: Id = Id(100);
pub const STAFF_ROLE: Id = Id(200);
pub const SETUP_CHANNEL: Id = Id(300);
pub const TRANSCRIPT_CHANNEL: Id = Id(301);
pub const ASSISTANCE: Id = Id(400);
pub const BILLING: Id = Id(401);
pub const BOT_USER: Id = Id(9);

pub const CONFIG: &str = r#"
guild_id = "100"
staff_role_ids = ["200"]
setup_channel_id = "300"
transcript_channel_id = "301"
close_delay_secs = 0

[[categories]]
value = "1"
label = "Assistance"
category_id = "400"

[[categories]]
value = "2"
label = "Billing"
category_id = "401"
"#;

#[derive(Default)]
pub struct FakeState {
    pub responses: Vec<InteractionReply>,
    pub followups: Vec<OutgoingMessage>,
    pub sent: Vec<(Id, OutgoingMessage)>,
    pub pins: Vec<(Id, Id)>,
    pub deleted: Vec<Id>,
    pub overwrites: Vec<(Id, PermissionOverwrite)>,
    pub edits: Vec<(Id, ChannelEdit)>,
    pub channels: HashMap<Id, Channel>,
    pub history: HashMap<Id, Vec<Message>>,
    pub downloads: HashMap<String, Vec<u8>>,
    pub members: HashMap<Id, Member>,
    pub registered: Vec<CommandSpec>,
    pub dms: Vec<Id>,
    pub fail_dm: bool,
    pub fail_edit: bool,
    next_id: u64,
}

impl FakeState {
    fn next_id(&mut self) -> Id {
        self.next_id += 1;
        Id(10_000 + self.next_id)
    }

    /// Text content of every message sent to a channel, in order.
    pub fn texts_in(&self, channel_id: Id) -> Vec<String> {
        self.sent
            .iter()
            .filter(|(c, _)| *c == channel_id)
            .filter_map(|(_, m)| m.content.clone())
            .collect()
    }

    /// Content of the last interaction response that carried a message.
    pub fn last_reply_text(&self) -> Option<String> {
        self.responses.iter().rev().find_map(|r| match r {
            InteractionReply::Message(m) => m.content.clone(),
            _ => None,
        })
    }

    pub fn last_followup_text(&self) -> Option<String> {
        self.followups.last().and_then(|m| m.content.clone())
    }
}

#[derive(Default)]
pub struct FakePlatform {
    state: Mutex<FakeState>,
}

impl FakePlatform {
    /// A guild with both ticket categories and the setup/transcript channels.
    pub fn new() -> Self {
        let platform = FakePlatform::default();
        platform.add_channel(category(ASSISTANCE, "Assistance"));
        platform.add_channel(category(BILLING, "Billing"));
        platform.add_channel(text_channel(SETUP_CHANNEL, "tickets", None));
        platform.add_channel(text_channel(TRANSCRIPT_CHANNEL, "transcripts", None));
        platform
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn add_channel(&self, channel: Channel) {
        self.state().channels.insert(channel.id, channel);
    }

    pub fn add_member(&self, user: User, roles: Vec<Id>) {
        self.state().members.insert(user.id, member(user, roles));
    }

    pub fn add_history(&self, channel_id: Id, message: Message) {
        self.state()
            .history
            .entry(channel_id)
            .or_default()
            .push(message);
    }
}

fn not_found(what: &str) -> Error {
    Error::Api {
        status: 404,
        message: format!("Unknown {what}"),
    }
}

#[async_trait]
impl Platform for FakePlatform {
    async fn respond(&self, _interaction: &Interaction, reply: InteractionReply) -> Result<()> {
        self.state().responses.push(reply);
        Ok(())
    }

    async fn followup(&self, _interaction: &Interaction, message: OutgoingMessage) -> Result<()> {
        self.state().followups.push(message);
        Ok(())
    }

    async fn channel(&self, channel_id: Id) -> Result<Option<Channel>> {
        Ok(self.state().channels.get(&channel_id).cloned())
    }

    async fn create_channel(&self, guild_id: Id, new: NewChannel) -> Result<Channel> {
        let mut state = self.state();
        let channel = Channel {
            id: state.next_id(),
            kind: new.kind,
            guild_id: Some(guild_id),
            name: Some(new.name),
            parent_id: new.parent_id,
            permission_overwrites: new.permission_overwrites,
        };
        state.channels.insert(channel.id, channel.clone());
        Ok(channel)
    }

    async fn edit_channel(&self, channel_id: Id, edit: ChannelEdit) -> Result<Channel> {
        let mut state = self.state();
        state.edits.push((channel_id, edit.clone()));
        if state.fail_edit {
            return Err(Error::RateLimited {
                retry_after: Some(300.0),
            });
        }
        let channel = state
            .channels
            .get_mut(&channel_id)
            .ok_or_else(|| not_found("Channel"))?;
        if let Some(name) = edit.name {
            channel.name = Some(name.to_lowercase().replace(' ', "-"));
        }
        if let Some(parent) = edit.parent_id {
            channel.parent_id = Some(parent);
        }
        Ok(channel.clone())
    }

    async fn delete_channel(&self, channel_id: Id) -> Result<()> {
        let mut state = self.state();
        state.channels.remove(&channel_id);
        state.deleted.push(channel_id);
        Ok(())
    }

    async fn set_overwrite(&self, channel_id: Id, overwrite: PermissionOverwrite) -> Result<()> {
        let mut state = self.state();
        state.overwrites.push((channel_id, overwrite.clone()));
        if let Some(channel) = state.channels.get_mut(&channel_id) {
            channel.permission_overwrites.retain(|o| o.id != overwrite.id);
            channel.permission_overwrites.push(overwrite);
        }
        Ok(())
    }

    async fn send_message(&self, channel_id: Id, message: OutgoingMessage) -> Result<Message> {
        let mut state = self.state();
        let sent = Message {
            id: state.next_id(),
            channel_id,
            author: user(BOT_USER, "tix"),
            content: message.content.clone().unwrap_or_default(),
            timestamp: Utc::now(),
            embeds: message.embeds.clone(),
            attachments: Vec::new(),
        };
        state.sent.push((channel_id, message));
        state
            .history
            .entry(channel_id)
            .or_default()
            .push(sent.clone());
        Ok(sent)
    }

    async fn pin_message(&self, channel_id: Id, message_id: Id) -> Result<()> {
        self.state().pins.push((channel_id, message_id));
        Ok(())
    }

    async fn messages(&self, channel_id: Id) -> Result<Vec<Message>> {
        Ok(self
            .state()
            .history
            .get(&channel_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        self.state()
            .downloads
            .get(url)
            .cloned()
            .ok_or_else(|| not_found("Attachment"))
    }

    async fn dm_channel(&self, user_id: Id) -> Result<Channel> {
        let mut state = self.state();
        if state.fail_dm {
            return Err(Error::Api {
                status: 403,
                message: "Cannot send messages to this user (code 50007)".to_string(),
            });
        }
        state.dms.push(user_id);
        Ok(Channel {
            id: Id(user_id.get() + 1_000_000),
            kind: 1,
            guild_id: None,
            name: None,
            parent_id: None,
            permission_overwrites: Vec::new(),
        })
    }

    async fn member(&self, _guild_id: Id, user_id: Id) -> Result<Option<Member>> {
        Ok(self.state().members.get(&user_id).cloned())
    }

    async fn guild(&self, guild_id: Id) -> Result<Guild> {
        Ok(Guild {
            id: guild_id,
            name: "Test Guild".to_string(),
        })
    }

    async fn register_commands(
        &self,
        _application_id: Id,
        _guild_id: Id,
        commands: &[CommandSpec],
    ) -> Result<usize> {
        let mut state = self.state();
        state.registered = commands.to_vec();
        Ok(commands.len())
    }
}

// Builders

pub fn config() -> Config {
    Config::from_toml_str(CONFIG).unwrap()
}

pub fn bot() -> TicketBot<FakePlatform> {
    TicketBot::new(
        config(),
        Database::open_in_memory().unwrap(),
        FakePlatform::new(),
    )
}

pub fn user(id: Id, username: &str) -> User {
    User {
        id,
        username: username.to_string(),
        global_name: None,
        avatar: None,
        bot: false,
    }
}

pub fn member(user: User, roles: Vec<Id>) -> Member {
    Member {
        user: Some(user),
        roles,
        nick: None,
    }
}

pub fn staff(id: Id, username: &str) -> Member {
    member(user(id, username), vec![STAFF_ROLE])
}

pub fn customer(id: Id, username: &str) -> Member {
    member(user(id, username), Vec::new())
}

pub fn category(id: Id, name: &str) -> Channel {
    Channel {
        id,
        kind: CHANNEL_CATEGORY,
        guild_id: Some(GUILD),
        name: Some(name.to_string()),
        parent_id: None,
        permission_overwrites: Vec::new(),
    }
}

pub fn text_channel(id: Id, name: &str, parent_id: Option<Id>) -> Channel {
    Channel {
        id,
        kind: CHANNEL_TEXT,
        guild_id: Some(GUILD),
        name: Some(name.to_string()),
        parent_id,
        permission_overwrites: Vec::new(),
    }
}

fn interaction(kind: u8, data: InteractionData, invoker: Member, channel_id: Id) -> Interaction {
    Interaction {
        id: Id(1),
        application_id: Id(2),
        kind,
        data: Some(data),
        guild_id: Some(GUILD),
        channel_id: Some(channel_id),
        member: Some(invoker),
        user: None,
        token: "token".to_string(),
    }
}

pub fn command(name: &str, invoker: Member, channel_id: Id) -> Interaction {
    command_with(name, Vec::new(), None, invoker, channel_id)
}

pub fn command_with(
    name: &str,
    options: Vec<CommandOption>,
    resolved: Option<Resolved>,
    invoker: Member,
    channel_id: Id,
) -> Interaction {
    interaction(
        INTERACTION_COMMAND,
        InteractionData {
            name: Some(name.to_string()),
            options,
            resolved,
            ..InteractionData::default()
        },
        invoker,
        channel_id,
    )
}

/// A command with a single `user` option resolving to `target`.
pub fn user_command(
    name: &str,
    target: Member,
    invoker: Member,
    channel_id: Id,
) -> Interaction {
    let target_user = target.user.clone().unwrap();
    let mut resolved = Resolved::default();
    resolved.users.insert(target_user.id, target_user.clone());
    resolved.members.insert(
        target_user.id,
        Member {
            user: None,
            ..target
        },
    );
    command_with(
        name,
        vec![option(OPTION_USER, "user", json!(target_user.id.to_string()))],
        Some(resolved),
        invoker,
        channel_id,
    )
}

pub fn string_command(
    name: &str,
    option_name: &str,
    value: &str,
    invoker: Member,
    channel_id: Id,
) -> Interaction {
    command_with(
        name,
        vec![option(OPTION_STRING, option_name, json!(value))],
        None,
        invoker,
        channel_id,
    )
}

/// A command with a single `category` option resolving to `target`.
pub fn channel_command(
    name: &str,
    target: Channel,
    invoker: Member,
    channel_id: Id,
) -> Interaction {
    let mut resolved = Resolved::default();
    let id = target.id;
    resolved.channels.insert(id, target);
    command_with(
        name,
        vec![option(OPTION_CHANNEL, "category", json!(id.to_string()))],
        Some(resolved),
        invoker,
        channel_id,
    )
}

fn option(kind: u8, name: &str, value: serde_json::Value) -> CommandOption {
    CommandOption {
        name: name.to_string(),
        kind,
        value: Some(value),
        options: Vec::new(),
    }
}

pub fn click(custom_id: &str, invoker: Member, channel_id: Id) -> Interaction {
    interaction(
        INTERACTION_COMPONENT,
        InteractionData {
            custom_id: Some(custom_id.to_string()),
            component_type: Some(COMPONENT_BUTTON),
            ..InteractionData::default()
        },
        invoker,
        channel_id,
    )
}

pub fn choose(custom_id: &str, value: &str, invoker: Member, channel_id: Id) -> Interaction {
    interaction(
        INTERACTION_COMPONENT,
        InteractionData {
            custom_id: Some(custom_id.to_string()),
            component_type: Some(COMPONENT_SELECT_MENU),
            values: vec![value.to_string()],
            ..InteractionData::default()
        },
        invoker,
        channel_id,
    )
}

pub fn submit_modal(
    custom_id: &str,
    fields: &[(&str, &str)],
    invoker: Member,
    channel_id: Id,
) -> Interaction {
    let rows = fields
        .iter()
        .map(|(id, value)| Component {
            kind: COMPONENT_ACTION_ROW,
            components: vec![Component {
                kind: COMPONENT_TEXT_INPUT,
                custom_id: Some(id.to_string()),
                value: Some(value.to_string()),
                ..Component::default()
            }],
            ..Component::default()
        })
        .collect();
    interaction(
        INTERACTION_MODAL_SUBMIT,
        InteractionData {
            custom_id: Some(custom_id.to_string()),
            components: rows,
            ..InteractionData::default()
        },
        invoker,
        channel_id,
    )
}
