// Discord message building blocks: alert embeds and the message body.
//
// Only the subset of the message object the bot sends. Serialized field names
// match the Discord REST API.

use serde::{Deserialize, Serialize};

/// Alert embed colour (discord.py's `Colour.red()`).
pub const ALERT_COLOR: u32 = 0xE74C3C;

/// Invisible field name/value used as a layout spacer.
pub const SPACER: &str = "\u{200b}";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

impl EmbedField {
    pub fn new(name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            inline,
        }
    }

    pub fn spacer() -> Self {
        Self::new(SPACER, SPACER, true)
    }

    pub fn is_spacer(&self) -> bool {
        self.name == SPACER
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    pub color: u32,
    #[serde(default)]
    pub fields: Vec<EmbedField>,
}

impl Embed {
    pub fn new(title: impl Into<String>, color: u32) -> Self {
        Self {
            title: title.into(),
            color,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField::new(name, value, inline));
        self
    }

    pub fn spacer(mut self) -> Self {
        self.fields.push(EmbedField::spacer());
        self
    }

    /// Value of the first field called `name`.
    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}

/// JSON body for `POST /channels/{id}/messages`: optional text, optional
/// alert embed.
pub fn message_payload(content: Option<&str>, embed: Option<&Embed>) -> serde_json::Value {
    let mut payload = serde_json::json!({
        // Never ping anyone from alert text, only from explicit operator pings.
        "allowed_mentions": { "parse": [] },
    });

    if let Some(content) = content {
        payload["content"] = serde_json::Value::String(content.to_string());
    }

    if let Some(embed) = embed {
        payload["embeds"] = serde_json::json!([embed]);
    }

    payload
}
