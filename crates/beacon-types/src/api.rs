use serde::{Deserialize, Serialize};

use crate::models::{
    CommunityKind, CommunityVisibility, ContentSettings, NotificationKind, NotificationSettings,
    PrivacySettings, SecuritySettings,
};

// -- Posts --

/// A post carries at most one media attachment; the variant makes
/// image/video mutually exclusive by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "url", rename_all = "lowercase")]
pub enum PostMedia {
    Image(String),
    Video(String),
}

// -- Users --

/// Profile fields a caller may change. Everything absent stays untouched;
/// identity, trust, counters and relationship lists are not reachable here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfileUpdate {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub has_completed_onboarding: Option<bool>,
}

/// Section-level settings replacement. A privacy replacement also refreshes
/// the user's top-level `is_private` mirror.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub privacy: Option<PrivacySettings>,
    pub notifications: Option<NotificationSettings>,
    pub content: Option<ContentSettings>,
    pub security: Option<SecuritySettings>,
}

// -- Notifications --

/// Everything the caller supplies for a notification; the store stamps the
/// id, timestamp and unread flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationDraft {
    pub user_id: String,
    pub kind: NotificationKind,
    pub actor_id: Option<String>,
    pub post_id: Option<String>,
    pub community_id: Option<String>,
    pub message: Option<String>,
}

// -- Messages --

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageDraft {
    pub sender_id: String,
    pub receiver_id: Option<String>,
    pub conversation_id: Option<String>,
    pub community_id: Option<String>,
    pub channel_id: Option<String>,
    pub content: String,
    pub reply_to_id: Option<String>,
}

// -- Communities --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityDraft {
    pub kind: CommunityKind,
    pub name: String,
    pub description: String,
    pub purpose: Option<String>,
    pub category: Option<String>,
    pub rules: String,
    pub visibility: CommunityVisibility,
    pub avatar_url: Option<String>,
}
