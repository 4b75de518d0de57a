use serde::{Deserialize, Serialize};

use crate::models::{ChannelKind, VerificationLevel};

/// Events pushed to store subscribers after each committed mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum StoreEvent {
    /// A new post was appended
    PostCreated { post_id: String, author_id: String },

    /// A like was flipped; `liked` is the state after the toggle
    LikeToggled {
        post_id: String,
        user_id: String,
        liked: bool,
    },

    /// A comment was appended to a post
    CommentAdded {
        post_id: String,
        comment_id: String,
        author_id: String,
    },

    /// A new account entered the Users collection
    UserRegistered { user_id: String },

    /// Profile or settings fields changed
    ProfileUpdated { user_id: String },

    /// A follow edge was added (duplicates are suppressed and not emitted)
    Followed {
        follower_id: String,
        target_id: String,
    },

    /// A verification level was requested and recorded
    VerificationRequested {
        user_id: String,
        level: VerificationLevel,
    },

    /// A trust penalty was applied
    TrustPenalized { user_id: String, trust_score: u8 },

    /// A notification was created for a user
    NotificationSent {
        notification_id: String,
        user_id: String,
    },

    /// All of a user's notifications were marked read
    NotificationsRead { user_id: String },

    /// A direct conversation was created (lookups of existing ones do not emit)
    ConversationStarted { conversation_id: String },

    /// A group conversation was created
    GroupCreated {
        conversation_id: String,
        owner_id: String,
    },

    /// A message entered the Messages collection
    MessageSent {
        message_id: String,
        sender_id: String,
        conversation_id: Option<String>,
    },

    /// A community was created with its owner as first member
    CommunityCreated {
        community_id: String,
        owner_id: String,
    },

    /// A user became a member of a public community
    CommunityJoined {
        community_id: String,
        user_id: String,
    },

    /// A user was queued for approval on a private community
    JoinRequested {
        community_id: String,
        user_id: String,
    },

    /// A member left a community
    CommunityLeft {
        community_id: String,
        user_id: String,
    },

    /// A pending join request was accepted or declined
    JoinRequestResolved {
        community_id: String,
        user_id: String,
        accepted: bool,
    },

    /// A channel was added to a server community
    ChannelCreated {
        community_id: String,
        channel_id: String,
        kind: ChannelKind,
    },

    /// A channel was removed from a server community
    ChannelDeleted {
        community_id: String,
        channel_id: String,
    },
}

impl StoreEvent {
    /// Returns the user whose view this event primarily concerns, if the
    /// event is scoped to one. Events returning `None` are collection-wide.
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::UserRegistered { user_id }
            | Self::ProfileUpdated { user_id }
            | Self::VerificationRequested { user_id, .. }
            | Self::TrustPenalized { user_id, .. }
            | Self::NotificationSent { user_id, .. }
            | Self::NotificationsRead { user_id }
            | Self::CommunityJoined { user_id, .. }
            | Self::JoinRequested { user_id, .. }
            | Self::CommunityLeft { user_id, .. }
            | Self::JoinRequestResolved { user_id, .. } => Some(user_id.as_str()),
            Self::Followed { target_id, .. } => Some(target_id.as_str()),
            _ => None,
        }
    }
}
