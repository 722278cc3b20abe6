//! Direct-message conversations

use super::messages::DirectMessage;
use crate::error::Result;
use crate::http::Session;
use crate::pagination::{FetchFn, PageCursor, Pager, Params};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The other participant of a chat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatUser {
    /// The other user's ID
    pub id: String,
    /// Display name
    pub name: String,
    /// Avatar
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// A one-on-one conversation with another user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    /// Creation time (unix seconds on the wire)
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
    /// Last update time (unix seconds on the wire)
    #[serde(with = "chrono::serde::ts_seconds")]
    pub updated_at: DateTime<Utc>,
    /// Total message count
    #[serde(default)]
    pub messages_count: u64,
    /// The most recent message
    #[serde(default)]
    pub last_message: Option<DirectMessage>,
    /// Who the chat is with
    pub other_user: ChatUser,
    /// Fields this crate does not model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The chat manager
#[derive(Debug, Clone, Copy)]
pub struct Chats<'a> {
    session: &'a Session,
}

impl<'a> Chats<'a> {
    pub(crate) fn new(session: &'a Session) -> Self {
        Self { session }
    }

    fn fetch_fn(&self) -> FetchFn<'a, Chat> {
        let session = self.session;
        Box::new(move |params| {
            Box::pin(async move {
                let response = session.get("chats", &params).await?;
                if response.is_not_modified() {
                    return Ok(Vec::new());
                }
                Ok(serde_json::from_value(response.data()?)?)
            })
        })
    }

    /// List your chats by page
    pub async fn list(&self, page: Option<u32>, per_page: Option<u32>) -> Result<Pager<'a, Chat>> {
        let mut params = Params::new();
        params.insert("page".to_string(), page.unwrap_or(1).to_string());
        if let Some(per_page) = per_page {
            params.insert("per_page".to_string(), per_page.to_string());
        }
        Pager::open(self.fetch_fn(), Box::new(PageCursor), params).await
    }

    /// List every chat
    pub async fn list_all(&self, per_page: Option<u32>) -> Result<Vec<Chat>> {
        self.list(None, per_page).await?.all().await
    }
}
