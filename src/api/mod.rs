//! Resource managers and entities
//!
//! One manager per API resource. Managers borrow the [`Session`] from the
//! [`Client`](crate::Client), build their own paths, and wrap raw JSON into
//! typed entities. List endpoints hand a fetch closure to a
//! [`Pager`](crate::pagination::Pager); everything else is a single-shot
//! request.

mod attachments;
mod blocks;
mod bots;
mod chats;
mod groups;
mod images;
mod memberships;
mod messages;
mod user;

pub use attachments::Attachment;
pub use blocks::{Block, Blocks};
pub use bots::{Bot, Bots};
pub use chats::{Chat, ChatUser, Chats};
pub use groups::{Group, GroupForm, Groups, OwnerChange};
pub use images::{Images, UploadedImage};
pub use memberships::{
    Member, MembershipRequest, MembershipResults, Memberships, NewMember, ResultsStatus,
};
pub use messages::{
    DirectMessage, DirectMessages, Gallery, Leaderboard, Likes, Message, Messages, Period,
};
pub use user::{SmsMode, User, UserInfo, UserUpdate};

#[cfg(test)]
mod tests;
