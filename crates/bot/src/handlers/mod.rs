// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Gateway event and interaction handlers.
//!
//! [`TicketBot`] owns the configuration, the ticket database and the
//! platform. Each dispatched event runs in its own task; the database lock is
//! only held for single queries, never across platform calls.

mod close;
mod events;
mod manage;
mod open;
pub mod ui;

#[cfg(test)]
pub(crate) mod test_platform;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, error};

use tix_core::{Database, Id};

use crate::config::Config;
use crate::discord::model::{
    Channel, Event, Interaction, Permissions, User, INTERACTION_COMMAND, INTERACTION_COMPONENT,
    INTERACTION_MODAL_SUBMIT, OVERWRITE_MEMBER,
};
use crate::discord::EventHandler;
use crate::error::{Error, Result};
use crate::platform::Platform;

/// The ticket bot: configuration, storage and the platform it acts on.
pub struct TicketBot<P> {
    pub(crate) config: Arc<Config>,
    pub(crate) db: Mutex<Database>,
    pub(crate) platform: P,
}

impl<P: Platform> TicketBot<P> {
    pub fn new(config: Config, db: Database, platform: P) -> Self {
        TicketBot {
            config: Arc::new(config),
            db: Mutex::new(db),
            platform,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Handle one dispatched gateway event.
    pub async fn handle_event(&self, event: Event) -> Result<()> {
        match event {
            Event::Ready(ready) => events::ready(self, &ready).await,
            Event::ChannelDelete(channel) => events::channel_deleted(self, &channel).await,
            Event::MemberRemove(removed) => events::member_removed(self, &removed).await,
            Event::InteractionCreate(interaction) => self.handle_interaction(&interaction).await,
            Event::Other(name) => {
                debug!(event = %name, "ignoring event");
                Ok(())
            }
        }
    }

    /// Route an interaction by command name or `custom_id`.
    pub async fn handle_interaction(&self, interaction: &Interaction) -> Result<()> {
        match interaction.kind {
            INTERACTION_COMMAND => match interaction.command_name().unwrap_or_default() {
                "ticket-setup" => manage::setup(self, interaction).await,
                "ticket-add" => manage::add(self, interaction).await,
                "ticket-remove" => manage::remove(self, interaction).await,
                "ticket-rename" => manage::rename(self, interaction).await,
                "ticket-move" => manage::move_ticket(self, interaction).await,
                "ticket-close" => manage::close_request(self, interaction).await,
                other => {
                    debug!(command = other, "unknown command");
                    Ok(())
                }
            },
            INTERACTION_COMPONENT => match interaction.custom_id().unwrap_or_default() {
                ui::SELECT_ID => open::select(self, interaction).await,
                ui::CLOSE_BUTTON_ID => close::button(self, interaction).await,
                other => {
                    debug!(custom_id = other, "unknown component");
                    Ok(())
                }
            },
            INTERACTION_MODAL_SUBMIT => {
                let custom_id = interaction.custom_id().unwrap_or_default();
                if let Some(value) = custom_id.strip_prefix(ui::OPEN_MODAL_PREFIX) {
                    open::submit(self, interaction, value).await
                } else if custom_id == ui::CLOSE_MODAL_ID {
                    close::submit(self, interaction).await
                } else {
                    debug!(custom_id, "unknown modal");
                    Ok(())
                }
            }
            other => {
                debug!(kind = other, "ignoring interaction type");
                Ok(())
            }
        }
    }

    pub(crate) fn guild_id(&self, interaction: &Interaction) -> Id {
        interaction.guild_id.unwrap_or(self.config.guild_id)
    }

    pub(crate) fn is_staff(&self, interaction: &Interaction) -> bool {
        self.config.is_staff(interaction.roles())
    }

    /// Staff-only, ticket-category-only guard for the management commands.
    ///
    /// Replies to the user and returns `None` when the command may not run
    /// here; otherwise returns the current channel.
    pub(crate) async fn staff_ticket_channel(
        &self,
        interaction: &Interaction,
    ) -> Result<Option<Channel>> {
        if !self.is_staff(interaction) {
            self.platform
                .respond(interaction, ui::notice("You cannot use this command."))
                .await?;
            return Ok(None);
        }
        let channel = match interaction.channel_id {
            Some(id) => self.platform.channel(id).await?,
            None => None,
        };
        match channel {
            Some(channel) if self.config.is_ticket_category(channel.parent_id) => Ok(Some(channel)),
            _ => {
                self.platform
                    .respond(
                        interaction,
                        ui::notice("This command can only be used in a **ticket category**."),
                    )
                    .await?;
                Ok(None)
            }
        }
    }

    /// True if the user can read and write in the channel, either through
    /// their own overwrite or through a staff or allowed role.
    pub(crate) fn has_access(&self, channel: &Channel, user_id: Id, roles: &[Id]) -> bool {
        let needed = Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES;
        if let Some(own) = channel
            .overwrite_for(user_id)
            .filter(|o| o.kind == OVERWRITE_MEMBER)
        {
            if own.deny.0 & needed.0 != 0 {
                return false;
            }
            if own.allow.contains(needed) {
                return true;
            }
        }
        roles.iter().any(|role| {
            self.config.staff_role_ids.contains(role)
                || channel
                    .overwrite_for(*role)
                    .is_some_and(|o| o.allow.contains(needed))
        })
    }
}

/// The user behind an interaction.
pub(crate) fn invoker(interaction: &Interaction) -> Result<&User> {
    interaction
        .invoker()
        .ok_or_else(|| Error::Interaction("interaction has no user".to_string()))
}

#[async_trait]
impl<P: Platform + 'static> EventHandler for TicketBot<P> {
    async fn handle(&self, event: Event) {
        let name = event.name().to_string();
        if let Err(e) = self.handle_event(event).await {
            error!(event = %name, "handler failed: {}", e);
        }
    }
}
