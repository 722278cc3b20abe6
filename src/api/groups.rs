//! Groups: listing, lifecycle, and ownership

use super::memberships::Member;
use crate::error::{Error, Result};
use crate::http::Session;
use crate::pagination::{FetchFn, PageCursor, Pager, Params};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

// ============================================================================
// Entities
// ============================================================================

/// A group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    /// Group ID
    pub id: String,
    /// Group ID as the membership endpoints expect it
    pub group_id: String,
    /// Group name
    pub name: String,
    /// Short description
    #[serde(default)]
    pub description: Option<String>,
    /// Avatar image
    #[serde(default)]
    pub image_url: Option<String>,
    /// User ID of the creator
    #[serde(default)]
    pub creator_user_id: Option<String>,
    /// Creation time (unix seconds on the wire)
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
    /// Last update time (unix seconds on the wire)
    #[serde(with = "chrono::serde::ts_seconds")]
    pub updated_at: DateTime<Utc>,
    /// Undocumented flag the update endpoint insists on
    #[serde(default)]
    pub office_mode: bool,
    /// Join URL, when sharing is enabled
    #[serde(default)]
    pub share_url: Option<String>,
    /// Current members; omitted by the API for very large groups
    #[serde(default)]
    pub members: Vec<Member>,
    /// Membership cap
    #[serde(default)]
    pub max_members: Option<u32>,
    /// Fields this crate does not model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Group {
    /// Find a member by user ID
    pub fn member_with_user_id(&self, user_id: &str) -> Option<&Member> {
        self.members
            .iter()
            .find(|member| member.user_id == user_id)
    }
}

/// Fields for creating or updating a group
#[derive(Debug, Clone, Default, Serialize)]
pub struct GroupForm {
    /// Group name (140 characters maximum)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Short description (255 characters maximum)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Image service URL for the avatar
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Whether to generate a share URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share: Option<bool>,
    /// Undocumented flag the update endpoint insists on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub office_mode: Option<bool>,
}

impl GroupForm {
    /// A form with just a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// The result of requesting a group owner change
#[derive(Debug, Clone, Deserialize)]
pub struct OwnerChange {
    /// The group
    pub group_id: String,
    /// The proposed new owner
    pub owner_id: String,
    /// Status code string from the API
    pub status: String,
}

impl OwnerChange {
    /// Whether the owner change went through
    pub fn is_success(&self) -> bool {
        self.status == "200"
    }

    /// Human-readable meaning of the status code
    pub fn reason(&self) -> &'static str {
        match self.status.as_str() {
            "200" => "everything checked out",
            "400" => "the group is already owned by that user",
            "403" => "you must own a group to change its owner",
            "404" => "either the new owner is not a member of the group, or the new owner or the group were not found",
            "405" => "request object is missing required field or any of the required fields is not an ID",
            _ => "unknown",
        }
    }
}

// ============================================================================
// Manager
// ============================================================================

/// The group manager
#[derive(Debug, Clone, Copy)]
pub struct Groups<'a> {
    session: &'a Session,
}

impl<'a> Groups<'a> {
    pub(crate) fn new(session: &'a Session) -> Self {
        Self { session }
    }

    fn fetch_fn(&self) -> FetchFn<'a, Group> {
        let session = self.session;
        Box::new(move |params| {
            Box::pin(async move {
                let response = session.get("groups", &params).await?;
                if response.is_not_modified() {
                    return Ok(Vec::new());
                }
                Ok(serde_json::from_value(response.data()?)?)
            })
        })
    }

    /// List groups by page.
    ///
    /// `omit` excludes heavyweight fields (currently only `memberships`) so
    /// very large groups fit in a response.
    pub async fn list(
        &self,
        page: Option<u32>,
        per_page: Option<u32>,
        omit: Option<&str>,
    ) -> Result<Pager<'a, Group>> {
        let mut params = Params::new();
        params.insert("page".to_string(), page.unwrap_or(1).to_string());
        if let Some(per_page) = per_page {
            params.insert("per_page".to_string(), per_page.to_string());
        }
        if let Some(omit) = omit {
            params.insert("omit".to_string(), omit.to_string());
        }
        Pager::open(self.fetch_fn(), Box::new(PageCursor), params).await
    }

    /// List every group.
    ///
    /// The API orders groups by recent activity, so draining all pages is
    /// the reliable way to get the complete set.
    pub async fn list_all(&self, per_page: Option<u32>, omit: Option<&str>) -> Result<Vec<Group>> {
        self.list(None, per_page, omit).await?.all().await
    }

    /// List groups you have left
    pub async fn list_former(&self) -> Result<Vec<Group>> {
        let response = self.session.get("groups/former", &Params::new()).await?;
        Ok(serde_json::from_value(response.data()?)?)
    }

    /// Get a single group by ID
    pub async fn get(&self, id: &str) -> Result<Group> {
        let response = self
            .session
            .get(&format!("groups/{id}"), &Params::new())
            .await?;
        Ok(serde_json::from_value(response.data()?)?)
    }

    /// Create a new group
    pub async fn create(&self, form: &GroupForm) -> Result<Group> {
        let payload = serde_json::to_value(form)?;
        let response = self.session.post("groups", Some(&payload)).await?;
        Ok(serde_json::from_value(response.data()?)?)
    }

    /// Update the details of a group
    pub async fn update(&self, id: &str, form: &GroupForm) -> Result<Group> {
        let payload = serde_json::to_value(form)?;
        let response = self
            .session
            .post(&format!("groups/{id}/update"), Some(&payload))
            .await?;
        Ok(serde_json::from_value(response.data()?)?)
    }

    /// Destroy a group. You must be the owner.
    pub async fn destroy(&self, id: &str) -> Result<()> {
        self.session
            .post(&format!("groups/{id}/destroy"), None)
            .await?
            .ok()
    }

    /// Join a group using a share token
    pub async fn join(&self, group_id: &str, share_token: &str) -> Result<Group> {
        let response = self
            .session
            .post(&format!("groups/{group_id}/join/{share_token}"), None)
            .await?;
        let data = response.data()?;
        let raw = data.get("group").cloned().ok_or(Error::MissingData)?;
        Ok(serde_json::from_value(raw)?)
    }

    /// Rejoin a former group
    pub async fn rejoin(&self, group_id: &str) -> Result<Group> {
        let payload = json!({ "group_id": group_id });
        let response = self.session.post("groups/join", Some(&payload)).await?;
        Ok(serde_json::from_value(response.data()?)?)
    }

    /// Change the owner of a group. You must be the current owner.
    pub async fn change_owner(&self, group_id: &str, owner_id: &str) -> Result<OwnerChange> {
        let payload = json!({
            "requests": [{ "group_id": group_id, "owner_id": owner_id }],
        });
        let response = self
            .session
            .post("groups/change_owners", Some(&payload))
            .await?;
        let data = response.data()?;
        let results = data
            .get("results")
            .and_then(Value::as_array)
            .ok_or(Error::MissingData)?;
        // the API answers one result per request, and we sent exactly one
        let raw = results.first().cloned().ok_or(Error::MissingData)?;
        Ok(serde_json::from_value(raw)?)
    }
}
