//! Message bodies for `POST /channels/{id}/messages`.

use serde::{Deserialize, Serialize};

use dueping_core::{Digest, EmbedSection};

/// Discord rejects an embed with more fields than this (HTTP 400).
pub const MAX_EMBED_FIELDS: usize = 25;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
}

impl Embed {
    pub fn over_field_limit(&self) -> bool {
        self.fields.len() > MAX_EMBED_FIELDS
    }
}

impl From<&EmbedSection> for Embed {
    fn from(section: &EmbedSection) -> Self {
        Self {
            title: section.title.clone(),
            color: section.color,
            fields: section
                .entries
                .iter()
                .map(|e| EmbedField {
                    name: e.label.clone(),
                    value: e.value.clone(),
                    inline: false,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllowedMentions {
    pub parse: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub embeds: Vec<Embed>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_mentions: Option<AllowedMentions>,
}

impl MessagePayload {
    /// Plain-text role ping, with role mentions explicitly allowed.
    pub fn mention(content: &str) -> Self {
        Self {
            content: Some(content.to_string()),
            embeds: Vec::new(),
            allowed_mentions: Some(AllowedMentions {
                parse: vec!["roles".to_string()],
            }),
        }
    }

    pub fn embeds(digest: &Digest) -> Self {
        Self {
            content: None,
            embeds: digest.sections.iter().map(Embed::from).collect(),
            allowed_mentions: None,
        }
    }
}

/// The messages one digest turns into, in send order.
pub fn messages_for(digest: &Digest) -> Vec<MessagePayload> {
    let mut out = Vec::with_capacity(2);
    if let Some(mention) = &digest.mention {
        out.push(MessagePayload::mention(mention));
    }
    out.push(MessagePayload::embeds(digest));
    out
}
