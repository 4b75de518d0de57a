use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

use crate::error::StoreError;

/// High-frequency action ceilings and the trust floor. The defaults are the
/// production anti-abuse policy; tests construct tighter ones.
#[derive(Debug, Clone)]
pub struct RateLimits {
    pub posts_per_10_min: u32,
    pub follows_per_min: u32,
    pub likes_per_min: u32,
    pub community_creates_per_day: u32,
    pub min_trust_score: u8,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            posts_per_10_min: 5,
            follows_per_min: 20,
            likes_per_min: 60,
            community_creates_per_day: 3,
            min_trust_score: 20,
        }
    }
}

/// Guarded action categories, each with its own sliding window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Post,
    Follow,
    Like,
    CommunityCreate,
}

impl ActionKind {
    fn window(self) -> TimeDelta {
        match self {
            Self::Post => TimeDelta::minutes(10),
            Self::Follow | Self::Like => TimeDelta::minutes(1),
            Self::CommunityCreate => TimeDelta::hours(24),
        }
    }

    fn window_label(self) -> &'static str {
        match self {
            Self::Post => "10 minutes",
            Self::Follow | Self::Like => "minute",
            Self::CommunityCreate => "24 hours",
        }
    }

    fn ceiling(self, limits: &RateLimits) -> u32 {
        match self {
            Self::Post => limits.posts_per_10_min,
            Self::Follow => limits.follows_per_min,
            Self::Like => limits.likes_per_min,
            Self::CommunityCreate => limits.community_creates_per_day,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Post => "post",
            Self::Follow => "follow",
            Self::Like => "like",
            Self::CommunityCreate => "community creation",
        })
    }
}

/// Per-user timestamp log for each guarded action category.
#[derive(Debug, Default)]
struct ActivityLog {
    posts: Vec<DateTime<Utc>>,
    follows: Vec<DateTime<Utc>>,
    likes: Vec<DateTime<Utc>>,
    community_creates: Vec<DateTime<Utc>>,
}

impl ActivityLog {
    fn entries_mut(&mut self, kind: ActionKind) -> &mut Vec<DateTime<Utc>> {
        match kind {
            ActionKind::Post => &mut self.posts,
            ActionKind::Follow => &mut self.follows,
            ActionKind::Like => &mut self.likes,
            ActionKind::CommunityCreate => &mut self.community_creates,
        }
    }
}

/// Sliding-window rate guard. `check` prunes entries that fell out of the
/// window, rejects if the ceiling is already reached, and otherwise records
/// the action — one call is both the decision and the bookkeeping.
#[derive(Debug, Default)]
pub struct ActivityGuard {
    log: HashMap<String, ActivityLog>,
}

impl ActivityGuard {
    pub fn check(
        &mut self,
        limits: &RateLimits,
        user_id: &str,
        kind: ActionKind,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let window = kind.window();
        let ceiling = kind.ceiling(limits);

        let entries = self.log.entry(user_id.to_string()).or_default().entries_mut(kind);
        entries.retain(|t| now.signed_duration_since(*t) < window);

        if entries.len() as u32 >= ceiling {
            warn!("{} rate limit hit for user {}", kind, user_id);
            return Err(StoreError::RateLimited {
                action: kind,
                limit: ceiling,
                window: kind.window_label(),
            });
        }

        entries.push(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn admits_up_to_ceiling_then_rejects() {
        let limits = RateLimits::default();
        let mut guard = ActivityGuard::default();
        let now = Utc::now();

        for _ in 0..5 {
            guard.check(&limits, "u1", ActionKind::Post, now).unwrap();
        }

        let err = guard.check(&limits, "u1", ActionKind::Post, now).unwrap_err();
        assert_eq!(
            err,
            StoreError::RateLimited {
                action: ActionKind::Post,
                limit: 5,
                window: "10 minutes",
            }
        );
    }

    #[test]
    fn entries_expire_with_the_window() {
        let limits = RateLimits::default();
        let mut guard = ActivityGuard::default();
        let start = Utc::now();

        for _ in 0..5 {
            guard.check(&limits, "u1", ActionKind::Post, start).unwrap();
        }
        assert!(guard.check(&limits, "u1", ActionKind::Post, start).is_err());

        // Eleven minutes later the whole log has aged out
        let later = start + TimeDelta::minutes(11);
        assert!(guard.check(&limits, "u1", ActionKind::Post, later).is_ok());
    }

    #[test]
    fn categories_and_users_are_independent() {
        let limits = RateLimits::default();
        let mut guard = ActivityGuard::default();
        let now = Utc::now();

        for _ in 0..5 {
            guard.check(&limits, "u1", ActionKind::Post, now).unwrap();
        }

        // Same user, different category
        assert!(guard.check(&limits, "u1", ActionKind::Like, now).is_ok());
        // Different user, exhausted category
        assert!(guard.check(&limits, "u2", ActionKind::Post, now).is_ok());
    }

    #[test]
    fn follow_ceiling_is_per_minute() {
        let limits = RateLimits::default();
        let mut guard = ActivityGuard::default();
        let now = Utc::now();

        for _ in 0..20 {
            guard.check(&limits, "u1", ActionKind::Follow, now).unwrap();
        }
        assert!(guard.check(&limits, "u1", ActionKind::Follow, now).is_err());
    }
}
