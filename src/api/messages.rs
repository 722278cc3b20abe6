//! Group messages, direct messages, the gallery, likes, and the leaderboard

use super::attachments::Attachment;
use crate::error::{Error, Result};
use crate::http::Session;
use crate::pagination::{
    format_timestamp, FetchFn, IdAnchor, IdCursor, Pager, Params, TimeAnchor, TimeCursor,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use uuid::Uuid;

// ============================================================================
// Entities
// ============================================================================

/// A message in a group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Message ID
    pub id: String,
    /// Client-supplied creation key
    #[serde(default)]
    pub source_guid: Option<String>,
    /// Creation time (unix seconds on the wire)
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
    /// Author's user ID
    #[serde(default)]
    pub user_id: Option<String>,
    /// Group the message belongs to
    #[serde(default)]
    pub group_id: Option<String>,
    /// Author's display name at post time
    #[serde(default)]
    pub name: Option<String>,
    /// Author's avatar
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Message text; absent for attachment-only messages
    #[serde(default)]
    pub text: Option<String>,
    /// Whether the server generated this message
    #[serde(default)]
    pub system: bool,
    /// User IDs that liked the message
    #[serde(default)]
    pub favorited_by: Vec<String>,
    /// Attachments
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Fields this crate does not model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl IdAnchor for Message {
    fn anchor_id(&self) -> &str {
        &self.id
    }
}

impl TimeAnchor for Message {
    fn anchor_time(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// A message in a direct conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectMessage {
    /// Message ID
    pub id: String,
    /// Client-supplied creation key
    #[serde(default)]
    pub source_guid: Option<String>,
    /// Creation time (unix seconds on the wire)
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
    /// Sending user
    #[serde(default)]
    pub sender_id: Option<String>,
    /// Receiving user
    #[serde(default)]
    pub recipient_id: Option<String>,
    /// Author's user ID
    #[serde(default)]
    pub user_id: Option<String>,
    /// Conversation key, when the API provides one
    #[serde(default)]
    pub conversation_id: Option<String>,
    /// Author's display name at post time
    #[serde(default)]
    pub name: Option<String>,
    /// Author's avatar
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Message text; absent for attachment-only messages
    #[serde(default)]
    pub text: Option<String>,
    /// User IDs that liked the message
    #[serde(default)]
    pub favorited_by: Vec<String>,
    /// Attachments
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Fields this crate does not model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DirectMessage {
    /// The conversation key: the API's value when present, otherwise the
    /// participant IDs sorted and joined, which is how the API derives it.
    pub fn conversation_key(&self) -> Option<String> {
        if let Some(id) = &self.conversation_id {
            return Some(id.clone());
        }
        let (sender, recipient) = (self.sender_id.as_ref()?, self.recipient_id.as_ref()?);
        let mut ids = [sender.as_str(), recipient.as_str()];
        ids.sort_unstable();
        Some(format!("{}+{}", ids[0], ids[1]))
    }
}

impl IdAnchor for DirectMessage {
    fn anchor_id(&self) -> &str {
        &self.id
    }
}

impl TimeAnchor for DirectMessage {
    fn anchor_time(&self) -> DateTime<Utc> {
        self.created_at
    }
}

fn entities_from<T: serde::de::DeserializeOwned>(data: &Value, key: &str) -> Result<Vec<T>> {
    let raw = data.get(key).cloned().ok_or(Error::MissingData)?;
    Ok(serde_json::from_value(raw)?)
}

fn build_message(
    text: Option<&str>,
    attachments: &[Attachment],
    source_guid: Option<&str>,
) -> Result<Value> {
    if text.is_none() && attachments.is_empty() {
        return Err(Error::EmptyMessage);
    }
    let mut message = Map::new();
    message.insert(
        "source_guid".to_string(),
        Value::String(source_guid.map_or_else(|| Uuid::new_v4().to_string(), ToString::to_string)),
    );
    if let Some(text) = text {
        message.insert("text".to_string(), Value::String(text.to_string()));
    }
    if !attachments.is_empty() {
        message.insert("attachments".to_string(), serde_json::to_value(attachments)?);
    }
    Ok(Value::Object(message))
}

// ============================================================================
// Group Messages
// ============================================================================

/// Message manager for one group
#[derive(Debug, Clone, Copy)]
pub struct Messages<'a> {
    session: &'a Session,
    group_id: &'a str,
}

impl<'a> Messages<'a> {
    pub(crate) fn new(session: &'a Session, group_id: &'a str) -> Self {
        Self { session, group_id }
    }

    fn path(&self) -> String {
        format!("groups/{}/messages", self.group_id)
    }

    fn fetch_fn(&self) -> FetchFn<'a, Message> {
        let session = self.session;
        let path = self.path();
        Box::new(move |params| {
            let path = path.clone();
            Box::pin(async move {
                let response = session.get(&path, &params).await?;
                if response.is_not_modified() {
                    return Ok(Vec::new());
                }
                entities_from(&response.data()?, "messages")
            })
        })
    }

    /// Return a page of messages from the group.
    ///
    /// With no cursor parameter this starts at the most recent message and
    /// pages backward.
    pub async fn list(&self) -> Result<Pager<'a, Message>> {
        self.list_with(Params::new()).await
    }

    /// Return a page of messages using raw listing parameters.
    ///
    /// At most one of `before_id`, `after_id`, `since_id` may be supplied.
    pub async fn list_with(&self, params: Params) -> Result<Pager<'a, Message>> {
        let cursor = IdCursor::detect(&params)?;
        Pager::open(self.fetch_fn(), Box::new(cursor), params).await
    }

    /// Page backward from the message with the given ID
    pub async fn list_before(&self, message_id: &str) -> Result<Pager<'a, Message>> {
        let mut params = Params::new();
        params.insert("before_id".to_string(), message_id.to_string());
        self.list_with(params).await
    }

    /// Page forward, oldest first, without skipping any messages
    pub async fn list_after(&self, message_id: &str) -> Result<Pager<'a, Message>> {
        let mut params = Params::new();
        params.insert("after_id".to_string(), message_id.to_string());
        self.list_with(params).await
    }

    /// Fetch the most recent messages newer than the given ID.
    ///
    /// There may exist messages between the given one and those returned;
    /// use [`list_after`](Self::list_after) to avoid skipping.
    pub async fn list_since(&self, message_id: &str) -> Result<Pager<'a, Message>> {
        let mut params = Params::new();
        params.insert("since_id".to_string(), message_id.to_string());
        self.list_with(params).await
    }

    /// Post a new message to the group.
    ///
    /// Needs text or at least one attachment. `source_guid` defaults to a
    /// fresh uuid.
    pub async fn create(
        &self,
        text: Option<&str>,
        attachments: &[Attachment],
        source_guid: Option<&str>,
    ) -> Result<Message> {
        let payload = json!({ "message": build_message(text, attachments, source_guid)? });
        let response = self.session.post(&self.path(), Some(&payload)).await?;
        let data = response.data()?;
        let raw = data.get("message").cloned().ok_or(Error::MissingData)?;
        Ok(serde_json::from_value(raw)?)
    }
}

// ============================================================================
// Direct Messages
// ============================================================================

/// Message manager for the conversation with one other user
#[derive(Debug, Clone, Copy)]
pub struct DirectMessages<'a> {
    session: &'a Session,
    other_user_id: &'a str,
}

impl<'a> DirectMessages<'a> {
    pub(crate) fn new(session: &'a Session, other_user_id: &'a str) -> Self {
        Self {
            session,
            other_user_id,
        }
    }

    fn fetch_fn(&self) -> FetchFn<'a, DirectMessage> {
        let session = self.session;
        Box::new(move |params| {
            Box::pin(async move {
                let response = session.get("direct_messages", &params).await?;
                if response.is_not_modified() {
                    return Ok(Vec::new());
                }
                entities_from(&response.data()?, "direct_messages")
            })
        })
    }

    /// Return a page of the conversation's messages
    pub async fn list(&self) -> Result<Pager<'a, DirectMessage>> {
        self.list_with(Params::new()).await
    }

    /// Return a page using raw listing parameters
    pub async fn list_with(&self, mut params: Params) -> Result<Pager<'a, DirectMessage>> {
        let cursor = IdCursor::detect(&params)?;
        params.insert(
            "other_user_id".to_string(),
            self.other_user_id.to_string(),
        );
        Pager::open(self.fetch_fn(), Box::new(cursor), params).await
    }

    /// Page backward from the message with the given ID
    pub async fn list_before(&self, message_id: &str) -> Result<Pager<'a, DirectMessage>> {
        let mut params = Params::new();
        params.insert("before_id".to_string(), message_id.to_string());
        self.list_with(params).await
    }

    /// Fetch the most recent messages newer than the given ID
    pub async fn list_since(&self, message_id: &str) -> Result<Pager<'a, DirectMessage>> {
        let mut params = Params::new();
        params.insert("since_id".to_string(), message_id.to_string());
        self.list_with(params).await
    }

    /// Send a direct message to the other user
    pub async fn create(
        &self,
        text: Option<&str>,
        attachments: &[Attachment],
        source_guid: Option<&str>,
    ) -> Result<DirectMessage> {
        let mut message = build_message(text, attachments, source_guid)?;
        message["recipient_id"] = Value::String(self.other_user_id.to_string());
        let payload = json!({ "direct_message": message });
        let response = self.session.post("direct_messages", Some(&payload)).await?;
        let data = response.data()?;
        let raw = data
            .get("direct_message")
            .cloned()
            .ok_or(Error::MissingData)?;
        Ok(serde_json::from_value(raw)?)
    }
}

// ============================================================================
// Gallery
// ============================================================================

/// Pages through a group's attachment gallery by timestamp
#[derive(Debug, Clone, Copy)]
pub struct Gallery<'a> {
    session: &'a Session,
    group_id: &'a str,
}

impl<'a> Gallery<'a> {
    pub(crate) fn new(session: &'a Session, group_id: &'a str) -> Self {
        Self { session, group_id }
    }

    fn fetch_fn(&self) -> FetchFn<'a, Message> {
        let session = self.session;
        let path = format!("conversations/{}/gallery", self.group_id);
        Box::new(move |params| {
            let path = path.clone();
            Box::pin(async move {
                let response = session.get(&path, &params).await?;
                if response.is_not_modified() {
                    return Ok(Vec::new());
                }
                entities_from(&response.data()?, "messages")
            })
        })
    }

    /// Return a page of gallery messages, newest first
    pub async fn list(&self) -> Result<Pager<'a, Message>> {
        self.list_with(Params::new()).await
    }

    /// Return a page using raw listing parameters.
    ///
    /// At most one of `before`, `after`, `since` may be supplied; values are
    /// wire-format timestamps.
    pub async fn list_with(&self, params: Params) -> Result<Pager<'a, Message>> {
        let cursor = TimeCursor::detect(&params)?;
        Pager::open(self.fetch_fn(), Box::new(cursor), params).await
    }

    /// Page backward from the given instant
    pub async fn list_before(&self, instant: DateTime<Utc>) -> Result<Pager<'a, Message>> {
        let mut params = Params::new();
        params.insert("before".to_string(), format_timestamp(instant));
        self.list_with(params).await
    }

    /// Page forward, oldest first, from the given instant
    pub async fn list_after(&self, instant: DateTime<Utc>) -> Result<Pager<'a, Message>> {
        let mut params = Params::new();
        params.insert("after".to_string(), format_timestamp(instant));
        self.list_with(params).await
    }

    /// Fetch the most recent gallery messages newer than the given instant
    pub async fn list_since(&self, instant: DateTime<Utc>) -> Result<Pager<'a, Message>> {
        let mut params = Params::new();
        params.insert("since".to_string(), format_timestamp(instant));
        self.list_with(params).await
    }
}

// ============================================================================
// Leaderboard
// ============================================================================

/// Leaderboard period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// The past day
    Day,
    /// The past week
    Week,
    /// The past month
    Month,
}

impl Period {
    fn as_str(self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
        }
    }
}

/// The most-liked messages of a group
#[derive(Debug, Clone, Copy)]
pub struct Leaderboard<'a> {
    session: &'a Session,
    group_id: &'a str,
}

impl<'a> Leaderboard<'a> {
    pub(crate) fn new(session: &'a Session, group_id: &'a str) -> Self {
        Self { session, group_id }
    }

    async fn fetch(&self, suffix: Option<&str>, params: Params) -> Result<Vec<Message>> {
        let mut path = format!("groups/{}/likes", self.group_id);
        if let Some(suffix) = suffix {
            path = format!("{path}/{suffix}");
        }
        let response = self.session.get(&path, &params).await?;
        entities_from(&response.data()?, "messages")
    }

    /// The group's most-liked messages for a period
    pub async fn list(&self, period: Period) -> Result<Vec<Message>> {
        let mut params = Params::new();
        params.insert("period".to_string(), period.as_str().to_string());
        self.fetch(None, params).await
    }

    /// Most-liked messages of the past day
    pub async fn list_day(&self) -> Result<Vec<Message>> {
        self.list(Period::Day).await
    }

    /// Most-liked messages of the past week
    pub async fn list_week(&self) -> Result<Vec<Message>> {
        self.list(Period::Week).await
    }

    /// Most-liked messages of the past month
    pub async fn list_month(&self) -> Result<Vec<Message>> {
        self.list(Period::Month).await
    }

    /// Your own most-liked messages
    pub async fn list_mine(&self) -> Result<Vec<Message>> {
        self.fetch(Some("mine"), Params::new()).await
    }

    /// Messages of yours that others liked most
    pub async fn list_for_me(&self) -> Result<Vec<Message>> {
        self.fetch(Some("for_me"), Params::new()).await
    }
}

// ============================================================================
// Likes
// ============================================================================

/// Like/unlike one message in a conversation
#[derive(Debug, Clone, Copy)]
pub struct Likes<'a> {
    session: &'a Session,
    conversation_id: &'a str,
    message_id: &'a str,
}

impl<'a> Likes<'a> {
    pub(crate) fn new(session: &'a Session, conversation_id: &'a str, message_id: &'a str) -> Self {
        Self {
            session,
            conversation_id,
            message_id,
        }
    }

    fn path(&self, action: &str) -> String {
        format!(
            "messages/{}/{}/{action}",
            self.conversation_id, self.message_id
        )
    }

    /// Like the message
    pub async fn like(&self) -> Result<()> {
        self.session.post(&self.path("like"), None).await?.ok()
    }

    /// Remove your like from the message
    pub async fn unlike(&self) -> Result<()> {
        self.session.post(&self.path("unlike"), None).await?.ok()
    }
}
