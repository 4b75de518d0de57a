use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationLevel {
    None,
    Blue,
    Green,
    Purple,
    Grey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Limited,
    Suspended,
    Banned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommunityRole {
    Owner,
    Admin,
    Moderator,
    Member,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Announcement,
    Discussion,
    Chat,
    Resources,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Voice,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Followers,
    Private,
}

/// Communities are only ever public or private; the followers-only level
/// exists for posts alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommunityVisibility {
    Public,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationKind {
    Direct,
    Group,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommunityKind {
    Server,
    Group,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Like,
    Comment,
    Follow,
    System,
    CommunityInvite,
    CommunityRequest,
}

// -- User settings --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileVisibility {
    Public,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessagePolicy {
    Everyone,
    Followers,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitePolicy {
    Everyone,
    Following,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensitiveFilter {
    Strict,
    Standard,
    Off,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrivacySettings {
    pub profile_visibility: ProfileVisibility,
    pub allow_messages: MessagePolicy,
    pub allow_community_invites: InvitePolicy,
    pub show_online_status: bool,
    pub allow_search: bool,
}

impl Default for PrivacySettings {
    fn default() -> Self {
        Self {
            profile_visibility: ProfileVisibility::Public,
            allow_messages: MessagePolicy::Followers,
            allow_community_invites: InvitePolicy::Following,
            show_online_status: true,
            allow_search: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationSettings {
    pub email_updates: bool,
    pub push_likes: bool,
    pub push_comments: bool,
    pub push_follows: bool,
    pub push_mentions: bool,
    pub push_messages: bool,
    pub community_activity: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email_updates: true,
            push_likes: false,
            push_comments: true,
            push_follows: false,
            push_mentions: true,
            push_messages: true,
            community_activity: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSettings {
    pub sensitive_filter: SensitiveFilter,
    pub language: String,
    pub autoplay_videos: bool,
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self {
            sensitive_filter: SensitiveFilter::Standard,
            language: "en".into(),
            autoplay_videos: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecuritySettings {
    pub two_factor_enabled: bool,
    pub login_alerts: bool,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            two_factor_enabled: false,
            login_alerts: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    pub privacy: PrivacySettings,
    pub notifications: NotificationSettings,
    pub content: ContentSettings,
    pub security: SecuritySettings,
}

// -- Entities --

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub followers_count: u32,
    pub following_count: u32,
    pub post_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub bio: String,
    pub avatar_url: Option<String>,

    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub country_code: Option<String>,

    pub joined_at: DateTime<Utc>,
    pub is_email_verified: bool,
    pub is_phone_verified: bool,
    pub verification_level: VerificationLevel,
    /// Internal 0-100 score, mutated only by system trust operations.
    pub trust_score: u8,

    pub account_status: AccountStatus,
    pub status_reason: Option<String>,
    pub suspension_ends_at: Option<DateTime<Utc>>,

    /// Aggregated by the store; always equals the backing list cardinalities.
    pub stats: UserStats,
    pub followers: Vec<String>,
    pub following: Vec<String>,

    pub has_completed_onboarding: bool,
    /// Mirror of `settings.privacy.profile_visibility`.
    pub is_private: bool,

    pub settings: UserSettings,
    pub trusted_devices: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub kind: ChannelKind,
    pub description: Option<String>,
    pub is_locked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Community {
    pub id: String,
    pub kind: CommunityKind,
    pub name: String,
    pub description: String,
    pub purpose: Option<String>,
    pub category: Option<String>,
    pub rules: String,
    pub owner_id: String,
    pub visibility: CommunityVisibility,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,

    /// Servers only; insertion order is display order.
    pub channels: Vec<Channel>,

    pub members: Vec<String>,
    /// member id -> role; domain always equals `members`.
    pub member_roles: HashMap<String, CommunityRole>,
    /// Pending approvals, disjoint from `members`.
    pub join_requests: Vec<String>,
}

/// 1:1 and ad-hoc group chats outside of communities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub kind: ConversationKind,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub participants: Vec<String>,
    pub owner_id: Option<String>,
    pub admins: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub last_message_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostStats {
    pub like_count: u32,
    pub comment_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub author_id: String,
    pub community_id: Option<String>,
    pub channel_id: Option<String>,
    pub content: String,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub visibility: Visibility,
    pub created_at: DateTime<Utc>,

    pub stats: PostStats,

    /// Cheap non-cryptographic fingerprint for duplicate/spam heuristics.
    pub content_hash: String,
    pub is_flagged: bool,
    /// Membership implies "liked"; unique per user.
    pub likes: Vec<String>,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub author_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub kind: NotificationKind,
    pub actor_id: Option<String>,
    pub post_id: Option<String>,
    pub community_id: Option<String>,
    pub message: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub sender_id: String,
    /// Direct messages.
    pub receiver_id: Option<String>,
    /// Group chats.
    pub conversation_id: Option<String>,
    /// Community channel chats.
    pub community_id: Option<String>,
    pub channel_id: Option<String>,

    pub kind: MessageKind,
    /// Empty for voice messages.
    pub content: String,
    pub media_url: Option<String>,
    /// Voice message duration in seconds.
    pub duration_secs: Option<u32>,

    pub created_at: DateTime<Utc>,
    pub is_read: bool,
    pub reply_to_id: Option<String>,
}

impl User {
    /// A fresh account with default settings, as created at signup.
    pub fn new(username: String, display_name: String, email: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            username,
            display_name,
            bio: String::new(),
            avatar_url: None,
            email,
            phone_number: None,
            country_code: None,
            joined_at: Utc::now(),
            is_email_verified: false,
            is_phone_verified: false,
            verification_level: VerificationLevel::None,
            trust_score: 50,
            account_status: AccountStatus::Active,
            status_reason: None,
            suspension_ends_at: None,
            stats: UserStats::default(),
            followers: Vec::new(),
            following: Vec::new(),
            has_completed_onboarding: false,
            is_private: false,
            settings: UserSettings::default(),
            trusted_devices: Vec::new(),
        }
    }
}
