// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Discord API objects used by the bot.
//!
//! Only the fields the bot reads or writes are modelled. Unknown fields are
//! ignored on input and optional fields are omitted on output.

use chrono::{DateTime, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::time::Duration;

use tix_core::{AttachmentRef, Id};

use crate::error::Result;

const CDN_BASE: &str = "https://cdn.discordapp.com";

pub const CHANNEL_TEXT: u8 = 0;
pub const CHANNEL_CATEGORY: u8 = 4;

pub const OVERWRITE_ROLE: u8 = 0;
pub const OVERWRITE_MEMBER: u8 = 1;

/// Flag that makes an interaction reply visible only to the invoker.
pub const MESSAGE_FLAG_EPHEMERAL: u64 = 1 << 6;

pub const INTERACTION_PING: u8 = 1;
pub const INTERACTION_COMMAND: u8 = 2;
pub const INTERACTION_COMPONENT: u8 = 3;
pub const INTERACTION_MODAL_SUBMIT: u8 = 5;

pub const COMPONENT_ACTION_ROW: u8 = 1;
pub const COMPONENT_BUTTON: u8 = 2;
pub const COMPONENT_SELECT_MENU: u8 = 3;
pub const COMPONENT_TEXT_INPUT: u8 = 4;

pub const BUTTON_DANGER: u8 = 4;
pub const TEXT_INPUT_SHORT: u8 = 1;
pub const TEXT_INPUT_PARAGRAPH: u8 = 2;

pub const OPTION_STRING: u8 = 3;
pub const OPTION_USER: u8 = 6;
pub const OPTION_CHANNEL: u8 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Id,
    pub username: String,
    #[serde(default)]
    pub global_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bot: bool,
}

impl User {
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }

    pub fn display_name(&self) -> &str {
        self.global_name.as_deref().unwrap_or(&self.username)
    }

    /// Custom avatar if set, else the default avatar for the account.
    pub fn avatar_url(&self) -> String {
        match &self.avatar {
            Some(hash) => format!("{CDN_BASE}/avatars/{}/{hash}.png", self.id),
            None => format!("{CDN_BASE}/embed/avatars/{}.png", (self.id.get() >> 22) % 6),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Absent on members embedded in resolved data.
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub roles: Vec<Id>,
    #[serde(default)]
    pub nick: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guild {
    pub id: Id,
    pub name: String,
}

/// A set of permission bits, sent as a decimal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Permissions(pub u64);

impl Permissions {
    pub const VIEW_CHANNEL: Permissions = Permissions(1 << 10);
    pub const SEND_MESSAGES: Permissions = Permissions(1 << 11);
    pub const ATTACH_FILES: Permissions = Permissions(1 << 15);
    pub const READ_MESSAGE_HISTORY: Permissions = Permissions(1 << 16);

    pub const fn empty() -> Self {
        Permissions(0)
    }

    /// What a ticket participant gets: see, talk, attach and scroll back.
    pub const fn participant() -> Self {
        Permissions(
            Self::VIEW_CHANNEL.0
                | Self::SEND_MESSAGES.0
                | Self::ATTACH_FILES.0
                | Self::READ_MESSAGE_HISTORY.0,
        )
    }

    pub fn contains(self, other: Permissions) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn remove(&mut self, other: Permissions) {
        self.0 &= !other.0;
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Permissions {
    type Output = Permissions;

    fn bitor(self, rhs: Permissions) -> Permissions {
        Permissions(self.0 | rhs.0)
    }
}

impl BitOrAssign for Permissions {
    fn bitor_assign(&mut self, rhs: Permissions) {
        self.0 |= rhs.0;
    }
}

impl Serialize for Permissions {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Permissions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct PermissionsVisitor;

        impl Visitor<'_> for PermissionsVisitor {
            type Value = Permissions;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a permission bitset as a string or integer")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Permissions, E> {
                v.parse::<u64>()
                    .map(Permissions)
                    .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Permissions, E> {
                Ok(Permissions(v))
            }
        }

        deserializer.deserialize_any(PermissionsVisitor)
    }
}

/// A role or member specific allow/deny pair on a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionOverwrite {
    pub id: Id,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub allow: Permissions,
    #[serde(default)]
    pub deny: Permissions,
}

impl PermissionOverwrite {
    pub fn role(id: Id, allow: Permissions, deny: Permissions) -> Self {
        PermissionOverwrite {
            id,
            kind: OVERWRITE_ROLE,
            allow,
            deny,
        }
    }

    pub fn member(id: Id, allow: Permissions, deny: Permissions) -> Self {
        PermissionOverwrite {
            id,
            kind: OVERWRITE_MEMBER,
            allow,
            deny,
        }
    }

    /// Moves `perms` from allowed to denied, keeping everything else.
    pub fn with_denied(mut self, perms: Permissions) -> Self {
        self.allow.remove(perms);
        self.deny |= perms;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: Id,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub guild_id: Option<Id>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub parent_id: Option<Id>,
    #[serde(default)]
    pub permission_overwrites: Vec<PermissionOverwrite>,
}

impl Channel {
    pub fn mention(&self) -> String {
        format!("<#{}>", self.id)
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn overwrite_for(&self, id: Id) -> Option<&PermissionOverwrite> {
        self.permission_overwrites.iter().find(|o| o.id == id)
    }
}

/// Body of a channel creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewChannel {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    pub permission_overwrites: Vec<PermissionOverwrite>,
}

/// Body of a channel modification request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChannelEdit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Id>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Id,
    pub channel_id: Id,
    pub author: User,
    #[serde(default)]
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub embeds: Vec<Embed>,
    #[serde(default)]
    pub attachments: Vec<AttachmentRef>,
}

// Embeds

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<EmbedAuthor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedAuthor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedFooter {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedImage {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

impl Embed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    pub fn author(mut self, name: impl Into<String>, icon_url: Option<String>) -> Self {
        self.author = Some(EmbedAuthor {
            name: name.into(),
            icon_url,
        });
        self
    }

    pub fn footer(mut self, text: impl Into<String>, icon_url: Option<String>) -> Self {
        self.footer = Some(EmbedFooter {
            text: text.into(),
            icon_url,
        });
        self
    }

    pub fn thumbnail(mut self, url: Option<String>) -> Self {
        self.thumbnail = url.map(|url| EmbedImage { url });
        self
    }

    pub fn timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.timestamp = Some(at);
        self
    }

    pub fn field(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
        inline: bool,
    ) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }
}

// Components

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emoji {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<Emoji>,
}

/// A message or modal component.
///
/// Discord tags components with an integer `type`, so every kind shares this
/// one struct and unused fields stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<Emoji>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Component>,
}

impl Component {
    pub fn action_row(components: Vec<Component>) -> Self {
        Component {
            kind: COMPONENT_ACTION_ROW,
            components,
            ..Default::default()
        }
    }

    pub fn button(style: u8, custom_id: &str, label: &str, emoji: Option<&str>) -> Self {
        Component {
            kind: COMPONENT_BUTTON,
            style: Some(style),
            custom_id: Some(custom_id.to_string()),
            label: Some(label.to_string()),
            emoji: emoji.map(|name| Emoji {
                name: name.to_string(),
            }),
            ..Default::default()
        }
    }

    pub fn select_menu(custom_id: &str, placeholder: &str, options: Vec<SelectOption>) -> Self {
        Component {
            kind: COMPONENT_SELECT_MENU,
            custom_id: Some(custom_id.to_string()),
            placeholder: Some(placeholder.to_string()),
            options,
            ..Default::default()
        }
    }

    pub fn text_input(
        custom_id: &str,
        label: &str,
        style: u8,
        required: bool,
        max_length: Option<u16>,
    ) -> Self {
        Component {
            kind: COMPONENT_TEXT_INPUT,
            custom_id: Some(custom_id.to_string()),
            label: Some(label.to_string()),
            style: Some(style),
            required: Some(required),
            max_length,
            ..Default::default()
        }
    }
}

// Outgoing messages and interaction replies

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// A message to post to a channel or as an interaction reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutgoingMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Component>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,
    /// Sent as a multipart attachment alongside the JSON body.
    #[serde(skip)]
    pub file: Option<FileUpload>,
    /// Interaction follow-ups only: delete the original reply after this long.
    #[serde(skip)]
    pub delete_after: Option<Duration>,
}

impl OutgoingMessage {
    pub fn text(content: impl Into<String>) -> Self {
        OutgoingMessage {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn embed(embed: Embed) -> Self {
        OutgoingMessage {
            embeds: vec![embed],
            ..Default::default()
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_embed(mut self, embed: Embed) -> Self {
        self.embeds.push(embed);
        self
    }

    pub fn with_components(mut self, components: Vec<Component>) -> Self {
        self.components = components;
        self
    }

    pub fn with_file(mut self, filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.file = Some(FileUpload {
            filename: filename.into(),
            bytes,
        });
        self
    }

    pub fn ephemeral(mut self) -> Self {
        self.flags = Some(self.flags.unwrap_or(0) | MESSAGE_FLAG_EPHEMERAL);
        self
    }

    pub fn is_ephemeral(&self) -> bool {
        self.flags.unwrap_or(0) & MESSAGE_FLAG_EPHEMERAL != 0
    }

    pub fn delete_after(mut self, after: Duration) -> Self {
        self.delete_after = Some(after);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Modal {
    pub custom_id: String,
    pub title: String,
    pub components: Vec<Component>,
}

/// The initial response to an interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionReply {
    Message(OutgoingMessage),
    Modal(Modal),
    /// Acknowledge now, answer later with a follow-up.
    Defer { ephemeral: bool },
}

impl InteractionReply {
    pub fn ephemeral(content: impl Into<String>) -> Self {
        InteractionReply::Message(OutgoingMessage::text(content).ephemeral())
    }
}

// Interactions

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandOption {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub options: Vec<CommandOption>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resolved {
    #[serde(default)]
    pub users: HashMap<Id, User>,
    #[serde(default)]
    pub members: HashMap<Id, Member>,
    #[serde(default)]
    pub channels: HashMap<Id, Channel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub options: Vec<CommandOption>,
    #[serde(default)]
    pub resolved: Option<Resolved>,
    #[serde(default)]
    pub custom_id: Option<String>,
    #[serde(default)]
    pub component_type: Option<u8>,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub components: Vec<Component>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub id: Id,
    pub application_id: Id,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub data: Option<InteractionData>,
    #[serde(default)]
    pub guild_id: Option<Id>,
    #[serde(default)]
    pub channel_id: Option<Id>,
    #[serde(default)]
    pub member: Option<Member>,
    #[serde(default)]
    pub user: Option<User>,
    pub token: String,
}

impl Interaction {
    pub fn command_name(&self) -> Option<&str> {
        self.data.as_ref()?.name.as_deref()
    }

    pub fn custom_id(&self) -> Option<&str> {
        self.data.as_ref()?.custom_id.as_deref()
    }

    pub fn values(&self) -> &[String] {
        self.data.as_ref().map(|d| d.values.as_slice()).unwrap_or_default()
    }

    fn option(&self, name: &str) -> Option<&CommandOption> {
        self.data.as_ref()?.options.iter().find(|o| o.name == name)
    }

    pub fn option_str(&self, name: &str) -> Option<&str> {
        self.option(name)?.value.as_ref()?.as_str()
    }

    /// User, channel and role options arrive as snowflake strings.
    pub fn option_id(&self, name: &str) -> Option<Id> {
        self.option_str(name)?.parse().ok()
    }

    /// The submitted value of a text input in a modal.
    pub fn modal_value(&self, custom_id: &str) -> Option<&str> {
        self.data
            .as_ref()?
            .components
            .iter()
            .flat_map(|row| row.components.iter())
            .find(|c| c.custom_id.as_deref() == Some(custom_id))?
            .value
            .as_deref()
    }

    /// Who triggered the interaction, in a guild or a DM.
    pub fn invoker(&self) -> Option<&User> {
        self.member
            .as_ref()
            .and_then(|m| m.user.as_ref())
            .or(self.user.as_ref())
    }

    pub fn roles(&self) -> &[Id] {
        self.member
            .as_ref()
            .map(|m| m.roles.as_slice())
            .unwrap_or_default()
    }

    fn resolved(&self) -> Option<&Resolved> {
        self.data.as_ref()?.resolved.as_ref()
    }

    pub fn resolved_user(&self, id: Id) -> Option<&User> {
        self.resolved()?.users.get(&id)
    }

    pub fn resolved_member(&self, id: Id) -> Option<&Member> {
        self.resolved()?.members.get(&id)
    }

    pub fn resolved_channel(&self, id: Id) -> Option<&Channel> {
        self.resolved()?.channels.get(&id)
    }
}

// Application commands

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOptionSpec {
    #[serde(rename = "type")]
    pub kind: u8,
    pub name: String,
    pub description: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub channel_types: Vec<u8>,
}

impl CommandOptionSpec {
    pub fn new(kind: u8, name: &str, description: &str) -> Self {
        CommandOptionSpec {
            kind,
            name: name.to_string(),
            description: description.to_string(),
            required: true,
            channel_types: Vec::new(),
        }
    }

    pub fn channel_types(mut self, types: &[u8]) -> Self {
        self.channel_types = types.to_vec();
        self
    }
}

/// A guild slash command definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSpec {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandOptionSpec>,
}

impl CommandSpec {
    pub fn new(name: &str, description: &str) -> Self {
        CommandSpec {
            name: name.to_string(),
            description: description.to_string(),
            options: Vec::new(),
        }
    }

    pub fn option(mut self, option: CommandOptionSpec) -> Self {
        self.options.push(option);
        self
    }
}

// Gateway

/// A gateway frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayPayload {
    pub op: u8,
    #[serde(default)]
    pub d: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApplicationRef {
    pub id: Id,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GuildRef {
    pub id: Id,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Ready {
    pub user: User,
    pub application: ApplicationRef,
    #[serde(default)]
    pub guilds: Vec<GuildRef>,
    pub session_id: String,
    #[serde(default)]
    pub resume_gateway_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MemberRemove {
    pub guild_id: Id,
    pub user: User,
}

/// A dispatched gateway event the bot reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Ready(Ready),
    ChannelDelete(Channel),
    MemberRemove(MemberRemove),
    InteractionCreate(Box<Interaction>),
    Other(String),
}

impl Event {
    /// Decode a dispatch (`op` 0) by its event name.
    pub fn parse(name: &str, data: Value) -> Result<Event> {
        let event = match name {
            "READY" => Event::Ready(serde_json::from_value(data)?),
            "CHANNEL_DELETE" => Event::ChannelDelete(serde_json::from_value(data)?),
            "GUILD_MEMBER_REMOVE" => Event::MemberRemove(serde_json::from_value(data)?),
            "INTERACTION_CREATE" => {
                Event::InteractionCreate(Box::new(serde_json::from_value(data)?))
            }
            other => Event::Other(other.to_string()),
        };
        Ok(event)
    }

    pub fn name(&self) -> &str {
        match self {
            Event::Ready(_) => "READY",
            Event::ChannelDelete(_) => "CHANNEL_DELETE",
            Event::MemberRemove(_) => "GUILD_MEMBER_REMOVE",
            Event::InteractionCreate(_) => "INTERACTION_CREATE",
            Event::Other(name) => name,
        }
    }
}

/// Error body returned by the REST API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: u64,
    #[serde(default)]
    pub message: String,
}

impl ApiErrorBody {
    /// Best-effort message from a failed response body.
    pub fn describe(body: &str) -> String {
        match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(err) if !err.message.is_empty() => format!("{} (code {})", err.message, err.code),
            _ => body.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
