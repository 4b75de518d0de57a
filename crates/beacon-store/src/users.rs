use chrono::Utc;
use tracing::warn;

use beacon_types::api::{NotificationDraft, SettingsUpdate, UserProfileUpdate};
use beacon_types::events::StoreEvent;
use beacon_types::models::{
    AccountStatus, NotificationKind, ProfileVisibility, User, VerificationLevel,
};

use crate::error::StoreError;
use crate::guard::ActionKind;
use crate::{Store, USERS};

/// Trust cost of one guard violation.
const PENALTY_STEP: u8 = 10;

impl Store {
    /// Appends a fully-formed account. Username/email uniqueness is the
    /// caller's responsibility (the auth layer validates before invoking).
    pub fn register_user(&mut self, user: User) {
        let user_id = user.id.clone();
        self.users.push(user);
        self.persist(USERS, &self.users);
        self.emit(StoreEvent::UserRegistered { user_id });
    }

    /// Applies the enumerated profile fields; everything else on the entity
    /// is unreachable through this path. A missing user is a no-op.
    pub fn update_user_profile(&mut self, user_id: &str, update: UserProfileUpdate) {
        let Some(user) = self.users.iter_mut().find(|u| u.id == user_id) else {
            return;
        };

        if let Some(display_name) = update.display_name {
            user.display_name = display_name;
        }
        if let Some(bio) = update.bio {
            user.bio = bio;
        }
        if let Some(avatar_url) = update.avatar_url {
            user.avatar_url = Some(avatar_url);
        }
        if let Some(done) = update.has_completed_onboarding {
            user.has_completed_onboarding = done;
        }

        self.persist(USERS, &self.users);
        self.emit(StoreEvent::ProfileUpdated {
            user_id: user_id.to_string(),
        });
    }

    /// Replaces whole settings sections. Changing privacy re-derives the
    /// top-level `is_private` mirror in the same step.
    pub fn update_user_settings(&mut self, user_id: &str, update: SettingsUpdate) {
        let Some(user) = self.users.iter_mut().find(|u| u.id == user_id) else {
            return;
        };

        if let Some(privacy) = update.privacy {
            user.is_private = privacy.profile_visibility == ProfileVisibility::Private;
            user.settings.privacy = privacy;
        }
        if let Some(notifications) = update.notifications {
            user.settings.notifications = notifications;
        }
        if let Some(content) = update.content {
            user.settings.content = content;
        }
        if let Some(security) = update.security {
            user.settings.security = security;
        }

        self.persist(USERS, &self.users);
        self.emit(StoreEvent::ProfileUpdated {
            user_id: user_id.to_string(),
        });
    }

    /// Adds the follow edge on both sides and bumps both counters in one
    /// step. Followers/following behave as sets: a repeated follow is a
    /// no-op returning `false`. The target is told via a notification.
    /// Self-follows are the caller's contract to prevent.
    pub fn follow_user(&mut self, current_id: &str, target_id: &str) -> Result<bool, StoreError> {
        self.admit(current_id, ActionKind::Follow, Utc::now())?;

        let Some(current) = self.users.iter_mut().find(|u| u.id == current_id) else {
            return Ok(false);
        };
        if current.following.iter().any(|id| id == target_id) {
            return Ok(false);
        }
        current.following.push(target_id.to_string());
        current.stats.following_count += 1;

        if let Some(target) = self.users.iter_mut().find(|u| u.id == target_id) {
            target.followers.push(current_id.to_string());
            target.stats.followers_count += 1;
        }

        self.persist(USERS, &self.users);
        self.send_notification(NotificationDraft {
            user_id: target_id.to_string(),
            kind: NotificationKind::Follow,
            actor_id: Some(current_id.to_string()),
            post_id: None,
            community_id: None,
            message: None,
        });
        self.emit(StoreEvent::Followed {
            follower_id: current_id.to_string(),
            target_id: target_id.to_string(),
        });
        Ok(true)
    }

    /// Records a requested verification level on the account. The demo
    /// grants immediately; there is no review queue.
    pub fn request_verification(&mut self, user_id: &str, level: VerificationLevel) {
        let Some(user) = self.users.iter_mut().find(|u| u.id == user_id) else {
            return;
        };
        user.verification_level = level;

        self.persist(USERS, &self.users);
        self.emit(StoreEvent::VerificationRequested {
            user_id: user_id.to_string(),
            level,
        });
    }

    /// Lowers a user's trust score. The score only ever moves down through
    /// this path and bottoms out at zero; crossing the floor downgrades an
    /// active account to limited.
    pub fn penalize(&mut self, user_id: &str, reason: &str) {
        let floor = self.limits.min_trust_score;
        let Some(user) = self.users.iter_mut().find(|u| u.id == user_id) else {
            return;
        };

        user.trust_score = user.trust_score.saturating_sub(PENALTY_STEP);
        if user.trust_score < floor && user.account_status == AccountStatus::Active {
            user.account_status = AccountStatus::Limited;
            user.status_reason = Some(reason.to_string());
        }
        let trust_score = user.trust_score;
        warn!("penalized user {} to trust {}: {}", user_id, trust_score, reason);

        self.persist(USERS, &self.users);
        self.emit(StoreEvent::TrustPenalized {
            user_id: user_id.to_string(),
            trust_score,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_db::Database;
    use beacon_types::models::PrivacySettings;

    fn test_user(id: &str) -> User {
        let mut user = User::new(id.to_string(), id.to_string(), None);
        user.id = id.to_string();
        user
    }

    fn store_with_users(ids: &[&str]) -> Store {
        let mut store = Store::open(Database::open_in_memory().unwrap());
        for id in ids {
            store.register_user(test_user(id));
        }
        store
    }

    #[test]
    fn follow_updates_both_sides_and_counters() {
        let mut store = store_with_users(&["alice", "bob"]);

        assert!(store.follow_user("alice", "bob").unwrap());

        let alice = store.get_user("alice").unwrap();
        assert_eq!(alice.following, vec!["bob".to_string()]);
        assert_eq!(alice.stats.following_count, 1);

        let bob = store.get_user("bob").unwrap();
        assert_eq!(bob.followers, vec!["alice".to_string()]);
        assert_eq!(bob.stats.followers_count, 1);
    }

    #[test]
    fn repeated_follow_is_suppressed() {
        let mut store = store_with_users(&["alice", "bob"]);

        assert!(store.follow_user("alice", "bob").unwrap());
        assert!(!store.follow_user("alice", "bob").unwrap());

        let alice = store.get_user("alice").unwrap();
        assert_eq!(alice.following.len(), 1);
        assert_eq!(alice.stats.following_count, 1);
        let bob = store.get_user("bob").unwrap();
        assert_eq!(bob.followers.len(), 1);
        assert_eq!(bob.stats.followers_count, 1);
    }

    #[test]
    fn follow_notifies_the_target() {
        let mut store = store_with_users(&["alice", "bob"]);
        store.follow_user("alice", "bob").unwrap();

        let notifs: Vec<_> = store.notifications_for("bob").collect();
        assert_eq!(notifs.len(), 1);
        assert_eq!(notifs[0].kind, NotificationKind::Follow);
        assert_eq!(notifs[0].actor_id.as_deref(), Some("alice"));
        assert!(!notifs[0].is_read);

        // The duplicate follow above all else must not notify again
        store.follow_user("alice", "bob").unwrap();
        assert_eq!(store.notifications_for("bob").count(), 1);
    }

    #[test]
    fn profile_update_touches_only_named_fields() {
        let mut store = store_with_users(&["alice"]);
        store.follow_user("alice", "bob").ok();

        store.update_user_profile(
            "alice",
            UserProfileUpdate {
                bio: Some("new bio".into()),
                ..Default::default()
            },
        );

        let alice = store.get_user("alice").unwrap();
        assert_eq!(alice.bio, "new bio");
        assert_eq!(alice.username, "alice");
        assert_eq!(alice.trust_score, 50);
        assert_eq!(alice.following.len(), 1);
    }

    #[test]
    fn privacy_update_refreshes_the_mirror() {
        let mut store = store_with_users(&["alice"]);

        store.update_user_settings(
            "alice",
            SettingsUpdate {
                privacy: Some(PrivacySettings {
                    profile_visibility: ProfileVisibility::Private,
                    ..Default::default()
                }),
                ..Default::default()
            },
        );
        assert!(store.get_user("alice").unwrap().is_private);

        store.update_user_settings(
            "alice",
            SettingsUpdate {
                privacy: Some(PrivacySettings::default()),
                ..Default::default()
            },
        );
        assert!(!store.get_user("alice").unwrap().is_private);
    }

    #[test]
    fn penalize_saturates_at_zero_and_limits_the_account() {
        let mut store = store_with_users(&["alice"]);

        for _ in 0..10 {
            store.penalize("alice", "spam");
        }

        let alice = store.get_user("alice").unwrap();
        assert_eq!(alice.trust_score, 0);
        assert_eq!(alice.account_status, AccountStatus::Limited);
    }

    #[test]
    fn low_trust_blocks_guarded_actions() {
        let mut store = store_with_users(&["alice", "bob"]);
        for _ in 0..4 {
            store.penalize("alice", "spam");
        }
        assert_eq!(store.get_user("alice").unwrap().trust_score, 10);

        let err = store.follow_user("alice", "bob").unwrap_err();
        assert_eq!(err, StoreError::TrustTooLow { score: 10, min: 20 });
        assert!(store.get_user("bob").unwrap().followers.is_empty());
    }

    #[test]
    fn verification_request_records_the_level() {
        let mut store = store_with_users(&["alice"]);
        store.request_verification("alice", VerificationLevel::Blue);
        assert_eq!(
            store.get_user("alice").unwrap().verification_level,
            VerificationLevel::Blue
        );
    }
}
