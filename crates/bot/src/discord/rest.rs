// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Discord REST client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};

use tix_core::transcript::content_type_for;
use tix_core::Id;

use super::model::{
    ApiErrorBody, Channel, ChannelEdit, CommandSpec, Guild, Interaction, InteractionReply,
    Member, Message, NewChannel, OutgoingMessage, PermissionOverwrite, MESSAGE_FLAG_EPHEMERAL,
};
use crate::error::{Error, Result};
use crate::platform::Platform;

pub const API_BASE: &str = "https://discord.com/api/v10";

/// Page size for message history requests (the API maximum).
const HISTORY_PAGE: usize = 100;

const CALLBACK_MESSAGE: u8 = 4;
const CALLBACK_DEFERRED: u8 = 5;
const CALLBACK_MODAL: u8 = 9;

/// Authenticated client for the Discord HTTP API.
#[derive(Clone)]
pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl RestClient {
    pub fn new(token: &str) -> Self {
        Self::with_base_url(token, API_BASE)
    }

    pub fn with_base_url(token: &str, base_url: &str) -> Self {
        RestClient {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.authed(self.client.get(self.url(path)))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.authed(self.client.post(self.url(path)))
    }

    fn put(&self, path: &str) -> RequestBuilder {
        self.authed(self.client.put(self.url(path)))
    }

    fn patch(&self, path: &str) -> RequestBuilder {
        self.authed(self.client.patch(self.url(path)))
    }

    fn delete(&self, path: &str) -> RequestBuilder {
        self.authed(self.client.delete(self.url(path)))
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header(AUTHORIZATION, format!("Bot {}", self.token))
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        Ok(send(request).await?.json::<T>().await?)
    }

    /// Runs a request that should 404 for missing resources.
    async fn optional<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Option<T>> {
        match self.json(request).await {
            Ok(value) => Ok(Some(value)),
            Err(Error::Api { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Deletes an interaction reply after a delay, in the background.
    fn schedule_delete(&self, interaction: &Interaction, message: &str, after: Duration) {
        let request = self.delete(&format!(
            "/webhooks/{}/{}/messages/{message}",
            interaction.application_id, interaction.token
        ));
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            if let Err(e) = send(request).await {
                debug!("failed to delete interaction reply: {}", e);
            }
        });
    }
}

/// Sends a request and maps non-success statuses to errors.
async fn send(request: RequestBuilder) -> Result<Response> {
    let response = request.send().await?;
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok());
        warn!("rate limited (retry after {:?}s)", retry_after);
        return Err(Error::RateLimited { retry_after });
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Api {
            status: status.as_u16(),
            message: ApiErrorBody::describe(&body),
        });
    }

    Ok(response)
}

/// Attaches a message as JSON, or as multipart with `payload_json` when it
/// carries a file.
fn with_message_body(
    request: RequestBuilder,
    body: &Value,
    message: &OutgoingMessage,
) -> Result<RequestBuilder> {
    let Some(file) = &message.file else {
        return Ok(request.json(body));
    };
    let mime = content_type_for(&file.filename, None);
    let part = Part::bytes(file.bytes.clone())
        .file_name(file.filename.clone())
        .mime_str(&mime)?;
    let form = Form::new()
        .text("payload_json", serde_json::to_string(body)?)
        .part("files[0]", part);
    Ok(request.multipart(form))
}

/// Body of an interaction callback.
pub fn callback_body(reply: &InteractionReply) -> Result<Value> {
    let body = match reply {
        InteractionReply::Message(message) => json!({
            "type": CALLBACK_MESSAGE,
            "data": serde_json::to_value(message)?,
        }),
        InteractionReply::Defer { ephemeral } => {
            let flags = if *ephemeral { MESSAGE_FLAG_EPHEMERAL } else { 0 };
            json!({ "type": CALLBACK_DEFERRED, "data": { "flags": flags } })
        }
        InteractionReply::Modal(modal) => json!({
            "type": CALLBACK_MODAL,
            "data": serde_json::to_value(modal)?,
        }),
    };
    Ok(body)
}

#[async_trait]
impl Platform for RestClient {
    async fn respond(&self, interaction: &Interaction, reply: InteractionReply) -> Result<()> {
        let body = callback_body(&reply)?;
        let request = self.post(&format!(
            "/interactions/{}/{}/callback",
            interaction.id, interaction.token
        ));
        let request = match &reply {
            InteractionReply::Message(message) => with_message_body(request, &body, message)?,
            _ => request.json(&body),
        };
        send(request).await?;

        if let InteractionReply::Message(OutgoingMessage {
            delete_after: Some(after),
            ..
        }) = &reply
        {
            self.schedule_delete(interaction, "@original", *after);
        }
        Ok(())
    }

    async fn followup(&self, interaction: &Interaction, message: OutgoingMessage) -> Result<()> {
        let body = serde_json::to_value(&message)?;
        let request = self.post(&format!(
            "/webhooks/{}/{}?wait=true",
            interaction.application_id, interaction.token
        ));
        let sent: Message = self
            .json(with_message_body(request, &body, &message)?)
            .await?;
        if let Some(after) = message.delete_after {
            self.schedule_delete(interaction, &sent.id.to_string(), after);
        }
        Ok(())
    }

    async fn channel(&self, channel_id: Id) -> Result<Option<Channel>> {
        self.optional(self.get(&format!("/channels/{channel_id}")))
            .await
    }

    async fn create_channel(&self, guild_id: Id, channel: NewChannel) -> Result<Channel> {
        self.json(self.post(&format!("/guilds/{guild_id}/channels")).json(&channel))
            .await
    }

    async fn edit_channel(&self, channel_id: Id, edit: ChannelEdit) -> Result<Channel> {
        self.json(self.patch(&format!("/channels/{channel_id}")).json(&edit))
            .await
    }

    async fn delete_channel(&self, channel_id: Id) -> Result<()> {
        send(self.delete(&format!("/channels/{channel_id}"))).await?;
        Ok(())
    }

    async fn set_overwrite(&self, channel_id: Id, overwrite: PermissionOverwrite) -> Result<()> {
        let request = self
            .put(&format!("/channels/{channel_id}/permissions/{}", overwrite.id))
            .json(&overwrite);
        send(request).await?;
        Ok(())
    }

    async fn send_message(&self, channel_id: Id, message: OutgoingMessage) -> Result<Message> {
        let body = serde_json::to_value(&message)?;
        let request = self.post(&format!("/channels/{channel_id}/messages"));
        self.json(with_message_body(request, &body, &message)?)
            .await
    }

    async fn pin_message(&self, channel_id: Id, message_id: Id) -> Result<()> {
        send(self.put(&format!("/channels/{channel_id}/pins/{message_id}"))).await?;
        Ok(())
    }

    async fn messages(&self, channel_id: Id) -> Result<Vec<Message>> {
        let mut all: Vec<Message> = Vec::new();
        let mut before: Option<Id> = None;
        loop {
            let mut path = format!("/channels/{channel_id}/messages?limit={HISTORY_PAGE}");
            if let Some(before) = before {
                path.push_str(&format!("&before={before}"));
            }
            // Pages come newest first
            let page: Vec<Message> = self.json(self.get(&path)).await?;
            let done = page.len() < HISTORY_PAGE;
            before = page.last().map(|m| m.id);
            all.extend(page);
            if done || before.is_none() {
                break;
            }
        }
        all.reverse();
        debug!(channel = %channel_id, count = all.len(), "fetched channel history");
        Ok(all)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = send(self.client.get(url)).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn dm_channel(&self, user_id: Id) -> Result<Channel> {
        let body = json!({ "recipient_id": user_id });
        self.json(self.post("/users/@me/channels").json(&body)).await
    }

    async fn member(&self, guild_id: Id, user_id: Id) -> Result<Option<Member>> {
        self.optional(self.get(&format!("/guilds/{guild_id}/members/{user_id}")))
            .await
    }

    async fn guild(&self, guild_id: Id) -> Result<Guild> {
        self.json(self.get(&format!("/guilds/{guild_id}"))).await
    }

    async fn register_commands(
        &self,
        application_id: Id,
        guild_id: Id,
        commands: &[CommandSpec],
    ) -> Result<usize> {
        let request = self
            .put(&format!("/applications/{application_id}/guilds/{guild_id}/commands"))
            .json(commands);
        let registered: Vec<Value> = self.json(request).await?;
        Ok(registered.len())
    }
}

#[cfg(test)]
#[path = "rest_tests.rs"]
mod tests;
