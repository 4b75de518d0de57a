pub mod error;
pub mod guard;

mod communities;
mod messaging;
mod notifications;
mod posts;
mod users;

pub use error::StoreError;
pub use guard::{ActionKind, ActivityGuard, RateLimits};

use chrono::{DateTime, Utc};
use crossbeam_channel::{Receiver, Sender, unbounded};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use beacon_db::Database;
use beacon_types::events::StoreEvent;
use beacon_types::models::{Community, Conversation, Message, Notification, Post, User};

pub(crate) const USERS: &str = "users";
pub(crate) const POSTS: &str = "posts";
pub(crate) const NOTIFICATIONS: &str = "notifications";
pub(crate) const MESSAGES: &str = "messages";
pub(crate) const CONVERSATIONS: &str = "conversations";
pub(crate) const COMMUNITIES: &str = "communities";

/// The normalized in-memory collections and every mutation over them.
///
/// One owned instance is passed explicitly to its consumers; mutations run
/// to completion on the calling thread, so readers only ever observe fully
/// applied state. After each committed mutation the touched collections are
/// re-serialized to the database (best-effort — the in-memory state is the
/// source of truth for the session) and subscribers receive a `StoreEvent`.
pub struct Store {
    db: Database,
    limits: RateLimits,

    pub(crate) users: Vec<User>,
    pub(crate) posts: Vec<Post>,
    pub(crate) notifications: Vec<Notification>,
    pub(crate) messages: Vec<Message>,
    pub(crate) conversations: Vec<Conversation>,
    pub(crate) communities: Vec<Community>,

    pub(crate) guard: ActivityGuard,
    subscribers: Vec<Sender<StoreEvent>>,
}

impl Store {
    pub fn open(db: Database) -> Self {
        Self::with_limits(db, RateLimits::default())
    }

    pub fn with_limits(db: Database, limits: RateLimits) -> Self {
        let store = Self {
            users: hydrate(&db, USERS),
            posts: hydrate(&db, POSTS),
            notifications: hydrate(&db, NOTIFICATIONS),
            messages: hydrate(&db, MESSAGES),
            conversations: hydrate(&db, CONVERSATIONS),
            communities: hydrate(&db, COMMUNITIES),
            db,
            limits,
            guard: ActivityGuard::default(),
            subscribers: Vec::new(),
        };
        info!(
            "Store hydrated: {} users, {} posts, {} communities",
            store.users.len(),
            store.posts.len(),
            store.communities.len()
        );
        store
    }

    /// The underlying database, for collaborators that own adjacent records
    /// (the session marker belongs to the auth layer).
    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Registers an observer. Every committed mutation pushes one event;
    /// dropped receivers are pruned on the next send.
    pub fn subscribe(&mut self) -> Receiver<StoreEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub(crate) fn emit(&mut self, event: StoreEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Fire-and-forget mirror to durable storage. A write failure must not
    /// disturb the in-memory state, so it is logged and swallowed.
    pub(crate) fn persist<T: Serialize>(&self, name: &str, value: &T) {
        if let Err(e) = self.db.save_collection(name, value) {
            warn!("failed to persist `{}` snapshot: {:#}", name, e);
        }
    }

    /// Runs the trust floor and the sliding-window guard for one action.
    /// Rejections happen before any collection is touched; a rate violation
    /// additionally costs the offender trust.
    pub(crate) fn admit(
        &mut self,
        user_id: &str,
        kind: ActionKind,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        if let Some(user) = self.users.iter().find(|u| u.id == user_id) {
            let score = user.trust_score;
            let min = self.limits.min_trust_score;
            if score < min {
                warn!("rejecting {} from user {}: trust {} < {}", kind, user_id, score, min);
                return Err(StoreError::TrustTooLow { score, min });
            }
        }

        match self.guard.check(&self.limits, user_id, kind, now) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.penalize(user_id, &format!("{kind} rate limit exceeded"));
                Err(err)
            }
        }
    }

    // -- Read snapshots --

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn communities(&self) -> &[Community] {
        &self.communities
    }

    pub fn get_user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn get_post(&self, id: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }

    pub fn get_community(&self, id: &str) -> Option<&Community> {
        self.communities.iter().find(|c| c.id == id)
    }

    pub fn get_conversation(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    pub fn notifications_for<'a>(
        &'a self,
        user_id: &'a str,
    ) -> impl Iterator<Item = &'a Notification> {
        self.notifications.iter().filter(move |n| n.user_id == user_id)
    }
}

/// Missing and unreadable snapshots both hydrate as an empty collection —
/// corrupt storage must never prevent startup.
fn hydrate<T: DeserializeOwned>(db: &Database, name: &str) -> Vec<T> {
    match db.load_collection::<Vec<T>>(name) {
        Ok(Some(items)) => items,
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!("discarding unreadable `{}` snapshot: {:#}", name, e);
            Vec::new()
        }
    }
}
