use chrono::Utc;
use uuid::Uuid;

use beacon_types::api::NotificationDraft;
use beacon_types::events::StoreEvent;
use beacon_types::models::Notification;

use crate::{NOTIFICATIONS, Store};

impl Store {
    /// The one and only creation path for notifications: stamps the id,
    /// timestamp and unread flag, then prepends. Operations that need to
    /// notify someone route through here, never into the collection.
    pub fn send_notification(&mut self, draft: NotificationDraft) -> String {
        let notification = Notification {
            id: Uuid::new_v4().to_string(),
            user_id: draft.user_id,
            kind: draft.kind,
            actor_id: draft.actor_id,
            post_id: draft.post_id,
            community_id: draft.community_id,
            message: draft.message,
            is_read: false,
            created_at: Utc::now(),
        };
        let notification_id = notification.id.clone();
        let user_id = notification.user_id.clone();

        // Newest first
        self.notifications.insert(0, notification);
        self.persist(NOTIFICATIONS, &self.notifications);
        self.emit(StoreEvent::NotificationSent {
            notification_id: notification_id.clone(),
            user_id,
        });
        notification_id
    }

    /// Marks every one of the user's notifications read. There is no
    /// selective variant; other users' entries are untouched.
    pub fn mark_notifications_read(&mut self, user_id: &str) {
        let mut changed = false;
        for n in self.notifications.iter_mut().filter(|n| n.user_id == user_id) {
            changed |= !n.is_read;
            n.is_read = true;
        }
        if !changed {
            return;
        }

        self.persist(NOTIFICATIONS, &self.notifications);
        self.emit(StoreEvent::NotificationsRead {
            user_id: user_id.to_string(),
        });
    }
}
