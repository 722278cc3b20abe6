//! Your own user record and SMS mode

use crate::error::Result;
use crate::http::Session;
use crate::pagination::Params;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Your user record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    /// User ID
    pub id: String,
    /// Display name
    pub name: String,
    /// Email on file
    #[serde(default)]
    pub email: Option<String>,
    /// Phone number on file
    #[serde(default)]
    pub phone_number: Option<String>,
    /// Avatar
    #[serde(default)]
    pub image_url: Option<String>,
    /// Account creation time (unix seconds on the wire)
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
    /// Last update time (unix seconds on the wire)
    #[serde(with = "chrono::serde::ts_seconds")]
    pub updated_at: DateTime<Utc>,
    /// Whether SMS mode is on
    #[serde(default)]
    pub sms: bool,
    /// Fields this crate does not model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Fields for updating your user record
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    /// New display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// New avatar URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// New zip code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
}

/// Manager for your own user
#[derive(Debug, Clone, Copy)]
pub struct User<'a> {
    session: &'a Session,
}

impl<'a> User<'a> {
    pub(crate) fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Fetch your user record
    pub async fn me(&self) -> Result<UserInfo> {
        let response = self.session.get("users/me", &Params::new()).await?;
        Ok(serde_json::from_value(response.data()?)?)
    }

    /// Update your user record
    pub async fn update(&self, update: &UserUpdate) -> Result<UserInfo> {
        let payload = serde_json::to_value(update)?;
        let response = self.session.post("users/update", Some(&payload)).await?;
        Ok(serde_json::from_value(response.data()?)?)
    }

    /// SMS mode controls
    pub fn sms_mode(&self) -> SmsMode<'a> {
        SmsMode {
            session: self.session,
        }
    }
}

/// Turn SMS delivery on or off
#[derive(Debug, Clone, Copy)]
pub struct SmsMode<'a> {
    session: &'a Session,
}

impl SmsMode<'_> {
    /// Enable SMS mode for up to 48 hours.
    ///
    /// Passing a `registration_id` also disables push notifications for
    /// that device.
    pub async fn enable(&self, duration: u32, registration_id: Option<&str>) -> Result<()> {
        let mut payload = json!({ "duration": duration });
        if let Some(registration_id) = registration_id {
            payload["registration_id"] = Value::String(registration_id.to_string());
        }
        self.session
            .post("users/sms_mode", Some(&payload))
            .await?
            .ok()
    }

    /// Disable SMS mode
    pub async fn disable(&self) -> Result<()> {
        self.session
            .post("users/sms_mode/delete", None)
            .await?
            .ok()
    }
}
