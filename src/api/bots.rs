//! Bots: create, list, post as, destroy

use super::attachments::Attachment;
use crate::error::Result;
use crate::http::Session;
use crate::pagination::Params;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// A bot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bot {
    /// Bot ID
    pub bot_id: String,
    /// Group the bot lives in
    pub group_id: String,
    /// Bot name
    pub name: String,
    /// Avatar
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// POST-back URL for new messages
    #[serde(default)]
    pub callback_url: Option<String>,
    /// Fields this crate does not model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The bot manager
#[derive(Debug, Clone, Copy)]
pub struct Bots<'a> {
    session: &'a Session,
}

impl<'a> Bots<'a> {
    pub(crate) fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// List your bots
    pub async fn list(&self) -> Result<Vec<Bot>> {
        let response = self.session.get("bots", &Params::new()).await?;
        Ok(serde_json::from_value(response.data()?)?)
    }

    /// Create a new bot in a group
    pub async fn create(
        &self,
        name: &str,
        group_id: &str,
        avatar_url: Option<&str>,
        callback_url: Option<&str>,
    ) -> Result<Bot> {
        let mut bot = Map::new();
        bot.insert("name".to_string(), Value::String(name.to_string()));
        bot.insert("group_id".to_string(), Value::String(group_id.to_string()));
        if let Some(avatar_url) = avatar_url {
            bot.insert(
                "avatar_url".to_string(),
                Value::String(avatar_url.to_string()),
            );
        }
        if let Some(callback_url) = callback_url {
            bot.insert(
                "callback_url".to_string(),
                Value::String(callback_url.to_string()),
            );
        }
        let payload = json!({ "bot": bot });
        let response = self.session.post("bots", Some(&payload)).await?;
        let data = response.data()?;
        let raw = data.get("bot").cloned().unwrap_or(data);
        Ok(serde_json::from_value(raw)?)
    }

    /// Post a message to the bot's group as the bot
    pub async fn post(&self, bot_id: &str, text: &str, attachments: &[Attachment]) -> Result<()> {
        let mut payload = json!({ "bot_id": bot_id, "text": text });
        if !attachments.is_empty() {
            payload["attachments"] = serde_json::to_value(attachments)?;
        }
        self.session.post("bots/post", Some(&payload)).await?.ok()
    }

    /// Destroy a bot
    pub async fn destroy(&self, bot_id: &str) -> Result<()> {
        let payload = json!({ "bot_id": bot_id });
        self.session
            .post("bots/destroy", Some(&payload))
            .await?
            .ok()
    }
}
