//! The top-level client
//!
//! A [`Client`] owns one [`Session`] and hands out lightweight managers that
//! borrow it. Managers are `Copy`; make them as needed:
//!
//! ```rust,ignore
//! let client = Client::new(token)?;
//! let groups = client.groups().list_all(Some(50), None).await?;
//! let request = client
//!     .memberships(&groups[0].group_id)
//!     .add(vec![NewMember::by_email("sam", "sam@example.com")])
//!     .await?;
//! ```

use crate::api::{
    Blocks, Bots, Chats, DirectMessages, Gallery, Groups, Images, Leaderboard, Likes, Memberships,
    Messages, User,
};
use crate::config::Config;
use crate::error::Result;
use crate::http::Session;

/// A client for the messaging API, bound to one access token
#[derive(Debug)]
pub struct Client {
    session: Session,
}

impl Client {
    /// Create a client with default endpoints for the given token
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_config(Config::new(token))
    }

    /// Create a client with a custom configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self {
            session: Session::new(config)?,
        })
    }

    /// The underlying session
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The group manager
    pub fn groups(&self) -> Groups<'_> {
        Groups::new(&self.session)
    }

    /// The chat manager
    pub fn chats(&self) -> Chats<'_> {
        Chats::new(&self.session)
    }

    /// The bot manager
    pub fn bots(&self) -> Bots<'_> {
        Bots::new(&self.session)
    }

    /// Manager for your own user
    pub fn user(&self) -> User<'_> {
        User::new(&self.session)
    }

    /// The image service manager
    pub fn images(&self) -> Images<'_> {
        Images::new(&self.session)
    }

    /// Message manager for a group
    pub fn messages<'a>(&'a self, group_id: &'a str) -> Messages<'a> {
        Messages::new(&self.session, group_id)
    }

    /// Message manager for the conversation with another user
    pub fn direct_messages<'a>(&'a self, other_user_id: &'a str) -> DirectMessages<'a> {
        DirectMessages::new(&self.session, other_user_id)
    }

    /// Gallery manager for a group
    pub fn gallery<'a>(&'a self, group_id: &'a str) -> Gallery<'a> {
        Gallery::new(&self.session, group_id)
    }

    /// Leaderboard manager for a group
    pub fn leaderboard<'a>(&'a self, group_id: &'a str) -> Leaderboard<'a> {
        Leaderboard::new(&self.session, group_id)
    }

    /// Membership manager for a group
    pub fn memberships<'a>(&'a self, group_id: &'a str) -> Memberships<'a> {
        Memberships::new(&self.session, group_id)
    }

    /// Block manager for your own user
    pub fn blocks<'a>(&'a self, user_id: &'a str) -> Blocks<'a> {
        Blocks::new(&self.session, user_id)
    }

    /// Like/unlike manager for one message
    pub fn likes<'a>(
        &'a self,
        conversation_id: &'a str,
        message_id: &'a str,
    ) -> Likes<'a> {
        Likes::new(&self.session, conversation_id, message_id)
    }
}
