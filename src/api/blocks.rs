//! Blocks between you and other users

use crate::error::{Error, Result};
use crate::http::Session;
use crate::pagination::Params;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A block between you and another user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    /// Your user ID
    pub user_id: String,
    /// The blocked user's ID
    pub blocked_user_id: String,
    /// When the block was created (unix seconds on the wire)
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
    /// Fields this crate does not model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Block manager for your own user
#[derive(Debug, Clone, Copy)]
pub struct Blocks<'a> {
    session: &'a Session,
    user_id: &'a str,
}

impl<'a> Blocks<'a> {
    pub(crate) fn new(session: &'a Session, user_id: &'a str) -> Self {
        Self { session, user_id }
    }

    fn params(&self, other_user_id: Option<&str>) -> Params {
        let mut params = Params::new();
        params.insert("user".to_string(), self.user_id.to_string());
        if let Some(other) = other_user_id {
            params.insert("otherUser".to_string(), other.to_string());
        }
        params
    }

    /// List the users you have blocked
    pub async fn list(&self) -> Result<Vec<Block>> {
        let response = self.session.get("blocks", &self.params(None)).await?;
        let data = response.data()?;
        let raw = data.get("blocks").cloned().ok_or(Error::MissingData)?;
        Ok(serde_json::from_value(raw)?)
    }

    /// Whether a block exists between you and the given user
    pub async fn between(&self, other_user_id: &str) -> Result<bool> {
        let response = self
            .session
            .get("blocks", &self.params(Some(other_user_id)))
            .await?;
        let data = response.data()?;
        data.get("between")
            .and_then(Value::as_bool)
            .ok_or(Error::MissingData)
    }

    /// Block the given user
    pub async fn block(&self, other_user_id: &str) -> Result<Block> {
        let response = self
            .session
            .post_query("blocks", &self.params(Some(other_user_id)))
            .await?;
        let data = response.data()?;
        let raw = data.get("block").cloned().ok_or(Error::MissingData)?;
        Ok(serde_json::from_value(raw)?)
    }

    /// Unblock the given user
    pub async fn unblock(&self, other_user_id: &str) -> Result<()> {
        self.session
            .delete("blocks", &self.params(Some(other_user_id)))
            .await?
            .ok()
    }
}
