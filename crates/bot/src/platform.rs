// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The chat platform as seen by the ticket handlers.
//!
//! Handlers only talk to Discord through this trait, so they can be driven
//! by [`crate::discord::RestClient`] in production and by an in-memory
//! recorder in tests.

use async_trait::async_trait;

use tix_core::Id;

use crate::discord::model::{
    Channel, ChannelEdit, CommandSpec, Guild, Interaction, InteractionReply, Member, Message,
    NewChannel, OutgoingMessage, PermissionOverwrite,
};
use crate::error::Result;

#[async_trait]
pub trait Platform: Send + Sync {
    /// Send the initial response to an interaction. Must happen once, quickly.
    async fn respond(&self, interaction: &Interaction, reply: InteractionReply) -> Result<()>;

    /// Send a follow-up after the initial (possibly deferred) response.
    async fn followup(&self, interaction: &Interaction, message: OutgoingMessage) -> Result<()>;

    /// Fetch a channel, or `None` if it no longer exists.
    async fn channel(&self, channel_id: Id) -> Result<Option<Channel>>;

    async fn create_channel(&self, guild_id: Id, channel: NewChannel) -> Result<Channel>;

    async fn edit_channel(&self, channel_id: Id, edit: ChannelEdit) -> Result<Channel>;

    async fn delete_channel(&self, channel_id: Id) -> Result<()>;

    /// Create or replace the overwrite for one role or member.
    async fn set_overwrite(&self, channel_id: Id, overwrite: PermissionOverwrite) -> Result<()>;

    async fn send_message(&self, channel_id: Id, message: OutgoingMessage) -> Result<Message>;

    async fn pin_message(&self, channel_id: Id, message_id: Id) -> Result<()>;

    /// The whole channel history, oldest first.
    async fn messages(&self, channel_id: Id) -> Result<Vec<Message>>;

    /// Fetch attachment bytes from the CDN.
    async fn download(&self, url: &str) -> Result<Vec<u8>>;

    /// Open (or reuse) the DM channel with a user.
    async fn dm_channel(&self, user_id: Id) -> Result<Channel>;

    /// Look up a guild member, or `None` if they are not in the guild.
    async fn member(&self, guild_id: Id, user_id: Id) -> Result<Option<Member>>;

    async fn guild(&self, guild_id: Id) -> Result<Guild>;

    /// Replace the guild's slash commands; returns how many were registered.
    async fn register_commands(
        &self,
        application_id: Id,
        guild_id: Id,
        commands: &[CommandSpec],
    ) -> Result<usize>;
}
