//! Group memberships and asynchronous bulk-add results
//!
//! Adding members is asynchronous on the server side: the add call returns a
//! `results_id`, and a separate results endpoint answers "not ready yet"
//! (HTTP 503), "expired" (HTTP 404), or the final member list. A
//! [`MembershipRequest`] tracks that lifecycle: it stays pending across any
//! number of not-ready checks, then transitions exactly once to ready or
//! expired and never queries the server again.
//!
//! Because the API does not guarantee the returned members arrive in order
//! or one-for-one, every submitted item gets a client-side correlation key
//! (`guid`) before the request goes out; results are partitioned into
//! successes and failures by matching those keys.

use crate::error::{Error, Result};
use crate::http::Session;
use crate::pagination::Params;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;
use uuid::Uuid;

// ============================================================================
// Entities
// ============================================================================

/// A member of a group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    /// Membership ID (distinct from the user ID)
    #[serde(default)]
    pub id: Option<String>,
    /// The member's user ID
    pub user_id: String,
    /// Display name within the group
    pub nickname: String,
    /// Avatar
    #[serde(default)]
    pub image_url: Option<String>,
    /// Whether you muted this member
    #[serde(default)]
    pub muted: bool,
    /// Whether the server kicked the member automatically
    #[serde(default)]
    pub autokicked: bool,
    /// Roles such as `admin` or `owner`
    #[serde(default)]
    pub roles: Vec<String>,
    /// Fields this crate does not model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One member to add in a bulk-add request.
///
/// Exactly one identifying field (`user_id`, `email`, or `phone_number`)
/// should be set; [`Memberships::add`] rejects items with none before any
/// network I/O.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMember {
    /// Display name for the new member
    pub nickname: String,
    /// Identify the member by user ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Identify the member by email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Identify the member by phone number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// Correlation key, assigned by [`Memberships::add`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
}

impl NewMember {
    /// Add a member by user ID
    pub fn by_user_id(nickname: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            nickname: nickname.into(),
            user_id: Some(user_id.into()),
            email: None,
            phone_number: None,
            guid: None,
        }
    }

    /// Add a member by email
    pub fn by_email(nickname: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            nickname: nickname.into(),
            user_id: None,
            email: Some(email.into()),
            phone_number: None,
            guid: None,
        }
    }

    /// Add a member by phone number
    pub fn by_phone(nickname: impl Into<String>, phone_number: impl Into<String>) -> Self {
        Self {
            nickname: nickname.into(),
            user_id: None,
            email: None,
            phone_number: Some(phone_number.into()),
            guid: None,
        }
    }

    fn has_identifier(&self) -> bool {
        self.user_id.is_some() || self.email.is_some() || self.phone_number.is_some()
    }
}

/// Outcome of one results-endpoint query
#[derive(Debug, Clone)]
pub enum ResultsStatus {
    /// The server is still processing the request
    NotReady,
    /// The results existed once but are gone; they will never be available
    Expired,
    /// Processing finished; the raw member records, correlation keys intact
    Ready(Vec<Map<String, Value>>),
}

/// The outcome of a bulk add, partitioned by correlation key
#[derive(Debug, Clone)]
pub struct MembershipResults {
    /// Members the server actually added
    pub members: Vec<Member>,
    /// Submitted items with no matching result
    pub failures: Vec<NewMember>,
}

// ============================================================================
// Manager
// ============================================================================

/// Membership manager for one group
#[derive(Debug, Clone, Copy)]
pub struct Memberships<'a> {
    session: &'a Session,
    group_id: &'a str,
}

impl<'a> Memberships<'a> {
    pub(crate) fn new(session: &'a Session, group_id: &'a str) -> Self {
        Self { session, group_id }
    }

    fn path(&self, suffix: &str) -> String {
        format!("groups/{}/members/{suffix}", self.group_id)
    }

    /// Submit a bulk-add request.
    ///
    /// Every item must carry an identifying field. Each gets a correlation
    /// key derived from one batch uuid plus its position, so keys are
    /// pairwise distinct even for field-for-field identical items.
    pub async fn add(&self, members: Vec<NewMember>) -> Result<MembershipRequest<'a>> {
        for member in &members {
            if !member.has_identifier() {
                return Err(Error::MissingIdentifier {
                    nickname: member.nickname.clone(),
                });
            }
        }

        let batch = Uuid::new_v4();
        let members: Vec<NewMember> = members
            .into_iter()
            .enumerate()
            .map(|(index, mut member)| {
                member.guid = Some(format!("{batch}-{index}"));
                member
            })
            .collect();

        let payload = json!({ "members": members });
        let response = self.session.post(&self.path("add"), Some(&payload)).await?;
        let data = response.data()?;
        let results_id = data
            .get("results_id")
            .and_then(Value::as_str)
            .ok_or(Error::MissingData)?
            .to_string();

        debug!(%results_id, count = members.len(), "submitted bulk add");
        Ok(MembershipRequest {
            memberships: *self,
            results_id,
            requests: members,
            state: RequestState::Pending,
        })
    }

    /// Query the results endpoint once.
    ///
    /// The two protocol statuses come back as values, not errors; anything
    /// else the server refuses with propagates as a transport/API error.
    pub async fn check(&self, results_id: &str) -> Result<ResultsStatus> {
        let response = self
            .session
            .get(&self.path(&format!("results/{results_id}")), &Params::new())
            .await?;

        match response.status().as_u16() {
            503 => Ok(ResultsStatus::NotReady),
            404 => Ok(ResultsStatus::Expired),
            _ => {
                let data = response.data()?;
                let raw = data.get("members").cloned().ok_or(Error::MissingData)?;
                Ok(ResultsStatus::Ready(serde_json::from_value(raw)?))
            }
        }
    }

    /// Remove a member from the group by membership ID
    pub async fn remove(&self, membership_id: &str) -> Result<()> {
        self.session
            .post(&self.path(&format!("{membership_id}/remove")), None)
            .await?
            .ok()
    }
}

// ============================================================================
// Membership Request
// ============================================================================

#[derive(Debug)]
enum RequestState {
    Pending,
    Ready(MembershipResults),
    Expired,
}

/// An in-flight bulk-add request.
///
/// State machine: `Pending` until the results endpoint answers, then
/// `Ready` or `Expired` forever. Terminal outcomes are cached; [`get`]
/// replays them without touching the network.
///
/// [`get`]: MembershipRequest::get
#[derive(Debug)]
pub struct MembershipRequest<'a> {
    memberships: Memberships<'a>,
    results_id: String,
    requests: Vec<NewMember>,
    state: RequestState,
}

impl MembershipRequest<'_> {
    /// The server-issued results ID
    pub fn results_id(&self) -> &str {
        &self.results_id
    }

    /// The submitted items, correlation keys assigned
    pub fn requests(&self) -> &[NewMember] {
        &self.requests
    }

    /// Whether the request has already reached ready or expired, without
    /// querying the server
    pub fn is_terminal(&self) -> bool {
        !matches!(self.state, RequestState::Pending)
    }

    /// Whether the request has reached a terminal state, querying the
    /// results endpoint once if it has not.
    ///
    /// Transport errors during the query propagate; the not-ready and
    /// expired statuses do not.
    pub async fn is_ready(&mut self) -> Result<bool> {
        if matches!(self.state, RequestState::Pending) {
            match self.memberships.check(&self.results_id).await? {
                ResultsStatus::NotReady => {}
                ResultsStatus::Expired => self.state = RequestState::Expired,
                ResultsStatus::Ready(raw) => {
                    self.state = RequestState::Ready(self.partition(raw)?);
                }
            }
        }
        Ok(!matches!(self.state, RequestState::Pending))
    }

    /// Check periodically until the request is terminal or `timeout`
    /// elapses, then return what [`get`](Self::get) returns.
    ///
    /// Sleeps `interval` between checks, one check in flight at a time. A
    /// poll that times out surfaces [`Error::ResultsNotReady`], never a
    /// partial result.
    pub async fn poll(
        &mut self,
        timeout: Duration,
        interval: Duration,
    ) -> Result<&MembershipResults> {
        let deadline = Instant::now() + timeout;
        while !self.is_ready().await? && Instant::now() < deadline {
            tokio::time::sleep(interval).await;
        }
        self.get()
    }

    /// The cached outcome.
    ///
    /// Pending surfaces [`Error::ResultsNotReady`], expired surfaces
    /// [`Error::ResultsExpired`], ready returns the partitioned results.
    /// Idempotent; performs no I/O.
    pub fn get(&self) -> Result<&MembershipResults> {
        match &self.state {
            RequestState::Ready(results) => Ok(results),
            RequestState::Expired => Err(Error::ResultsExpired {
                results_id: self.results_id.clone(),
            }),
            RequestState::Pending => Err(Error::ResultsNotReady {
                results_id: self.results_id.clone(),
            }),
        }
    }

    /// Match returned members against the submitted items by correlation
    /// key. Submitted items with no matching key are failures; the key is
    /// stripped from matches before constructing the [`Member`], since it
    /// is not a real API field.
    fn partition(&self, raw: Vec<Map<String, Value>>) -> Result<MembershipResults> {
        let mut by_guid: HashMap<String, Map<String, Value>> = raw
            .into_iter()
            .filter_map(|mut record| {
                let guid = record.remove("guid")?;
                Some((guid.as_str()?.to_string(), record))
            })
            .collect();

        let mut members = Vec::new();
        let mut failures = Vec::new();
        for request in &self.requests {
            let guid = request.guid.as_deref().unwrap_or_default();
            match by_guid.remove(guid) {
                Some(record) => members.push(serde_json::from_value(Value::Object(record))?),
                None => failures.push(request.clone()),
            }
        }
        Ok(MembershipResults { members, failures })
    }
}
