//! dueping-discord: posts digests to a Discord channel through the bot REST API

pub mod client;
pub mod payload;

pub use client::{ChannelInfo, DiscordClient, DiscordConfig};
pub use payload::{Embed, EmbedField, MAX_EMBED_FIELDS, MessagePayload, messages_for};
