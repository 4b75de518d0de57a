use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use chrono::Utc;
use uuid::Uuid;

use beacon_types::api::MessageDraft;
use beacon_types::events::StoreEvent;
use beacon_types::models::{Conversation, ConversationKind, Message, MessageKind};

use crate::error::StoreError;
use crate::{CONVERSATIONS, MESSAGES, Store};

impl Store {
    /// Returns the existing direct conversation for the unordered pair, or
    /// creates one. At most one direct conversation ever exists per pair.
    pub fn start_direct_conversation(&mut self, user_id: &str, target_id: &str) -> String {
        let existing = self.conversations.iter().find(|c| {
            c.kind == ConversationKind::Direct
                && c.participants.iter().any(|p| p == user_id)
                && c.participants.iter().any(|p| p == target_id)
        });
        if let Some(convo) = existing {
            return convo.id.clone();
        }

        let now = Utc::now();
        let convo = Conversation {
            id: Uuid::new_v4().to_string(),
            kind: ConversationKind::Direct,
            name: None,
            avatar_url: None,
            participants: vec![user_id.to_string(), target_id.to_string()],
            owner_id: None,
            admins: Vec::new(),
            created_at: now,
            last_message_at: now,
        };
        let convo_id = convo.id.clone();

        self.conversations.push(convo);
        self.persist(CONVERSATIONS, &self.conversations);
        self.emit(StoreEvent::ConversationStarted {
            conversation_id: convo_id.clone(),
        });
        convo_id
    }

    /// Creates a group whose participant set is the input plus the creator,
    /// deduplicated. The creator starts as sole owner and admin.
    pub fn create_group_conversation(
        &mut self,
        creator_id: &str,
        name: &str,
        participants: &[String],
    ) -> String {
        let mut members: Vec<String> = Vec::with_capacity(participants.len() + 1);
        for p in participants {
            if p != creator_id && !members.contains(p) {
                members.push(p.clone());
            }
        }
        members.push(creator_id.to_string());

        let now = Utc::now();
        let convo = Conversation {
            id: Uuid::new_v4().to_string(),
            kind: ConversationKind::Group,
            name: Some(name.to_string()),
            avatar_url: None,
            participants: members,
            owner_id: Some(creator_id.to_string()),
            admins: vec![creator_id.to_string()],
            created_at: now,
            last_message_at: now,
        };
        let convo_id = convo.id.clone();

        self.conversations.push(convo);
        self.persist(CONVERSATIONS, &self.conversations);
        self.emit(StoreEvent::GroupCreated {
            conversation_id: convo_id.clone(),
            owner_id: creator_id.to_string(),
        });
        convo_id
    }

    /// Appends a text message. Sender and content are required; a targeted
    /// conversation gets its `last_message_at` bumped in the same step.
    pub fn send_message(&mut self, draft: MessageDraft) -> Result<String, StoreError> {
        if draft.sender_id.is_empty() {
            return Err(StoreError::MissingField("sender_id"));
        }
        if draft.content.is_empty() {
            return Err(StoreError::MissingField("content"));
        }

        let message = Message {
            id: Uuid::new_v4().to_string(),
            sender_id: draft.sender_id,
            receiver_id: draft.receiver_id,
            conversation_id: draft.conversation_id,
            community_id: draft.community_id,
            channel_id: draft.channel_id,
            kind: MessageKind::Text,
            content: draft.content,
            media_url: None,
            duration_secs: None,
            created_at: Utc::now(),
            is_read: false,
            reply_to_id: draft.reply_to_id,
        };
        self.commit_message(message)
    }

    /// Appends a voice message: the audio payload becomes a playable data
    /// URI, content stays empty and the duration is stamped. Content is not
    /// required here, the sender still is.
    pub fn send_voice_message(
        &mut self,
        draft: MessageDraft,
        audio: &[u8],
        duration_secs: u32,
    ) -> Result<String, StoreError> {
        if draft.sender_id.is_empty() {
            return Err(StoreError::MissingField("sender_id"));
        }

        let message = Message {
            id: Uuid::new_v4().to_string(),
            sender_id: draft.sender_id,
            receiver_id: draft.receiver_id,
            conversation_id: draft.conversation_id,
            community_id: draft.community_id,
            channel_id: draft.channel_id,
            kind: MessageKind::Voice,
            content: String::new(),
            media_url: Some(format!("data:audio/webm;base64,{}", B64.encode(audio))),
            duration_secs: Some(duration_secs),
            created_at: Utc::now(),
            is_read: false,
            reply_to_id: draft.reply_to_id,
        };
        self.commit_message(message)
    }

    fn commit_message(&mut self, message: Message) -> Result<String, StoreError> {
        let message_id = message.id.clone();
        let sender_id = message.sender_id.clone();
        let conversation_id = message.conversation_id.clone();
        let sent_at = message.created_at;

        self.messages.push(message);
        self.persist(MESSAGES, &self.messages);

        if let Some(convo_id) = &conversation_id {
            if let Some(convo) = self.conversations.iter_mut().find(|c| c.id == *convo_id) {
                convo.last_message_at = sent_at;
                self.persist(CONVERSATIONS, &self.conversations);
            }
        }

        self.emit(StoreEvent::MessageSent {
            message_id: message_id.clone(),
            sender_id,
            conversation_id,
        });
        Ok(message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_db::Database;

    fn draft(sender: &str, content: &str) -> MessageDraft {
        MessageDraft {
            sender_id: sender.to_string(),
            content: content.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn direct_conversation_is_deduplicated_either_way_round() {
        let mut store = Store::open(Database::open_in_memory().unwrap());

        let first = store.start_direct_conversation("alice", "bob");
        let second = store.start_direct_conversation("bob", "alice");

        assert_eq!(first, second);
        assert_eq!(store.conversations().len(), 1);
    }

    #[test]
    fn distinct_pairs_get_distinct_conversations() {
        let mut store = Store::open(Database::open_in_memory().unwrap());

        let ab = store.start_direct_conversation("alice", "bob");
        let ac = store.start_direct_conversation("alice", "carol");

        assert_ne!(ab, ac);
        assert_eq!(store.conversations().len(), 2);
    }

    #[test]
    fn group_participants_include_creator_exactly_once() {
        let mut store = Store::open(Database::open_in_memory().unwrap());

        let id = store.create_group_conversation(
            "alice",
            "plans",
            &["bob".to_string(), "alice".to_string(), "carol".to_string(), "bob".to_string()],
        );

        let convo = store.get_conversation(&id).unwrap();
        let mut participants = convo.participants.clone();
        participants.sort();
        assert_eq!(participants, vec!["alice", "bob", "carol"]);
        assert_eq!(convo.owner_id.as_deref(), Some("alice"));
        assert_eq!(convo.admins, vec!["alice".to_string()]);
    }

    #[test]
    fn message_requires_sender_and_content() {
        let mut store = Store::open(Database::open_in_memory().unwrap());

        assert_eq!(
            store.send_message(draft("", "hi")),
            Err(StoreError::MissingField("sender_id"))
        );
        assert_eq!(
            store.send_message(draft("alice", "")),
            Err(StoreError::MissingField("content"))
        );
        assert!(store.messages().is_empty());
    }

    #[test]
    fn message_bumps_only_its_conversation() {
        let mut store = Store::open(Database::open_in_memory().unwrap());
        let target = store.start_direct_conversation("alice", "bob");
        let other = store.start_direct_conversation("alice", "carol");
        let other_before = store.get_conversation(&other).unwrap().last_message_at;

        let mut d = draft("alice", "hello");
        d.conversation_id = Some(target.clone());
        let message_id = store.send_message(d).unwrap();

        let sent_at = store
            .messages()
            .iter()
            .find(|m| m.id == message_id)
            .unwrap()
            .created_at;
        assert_eq!(store.get_conversation(&target).unwrap().last_message_at, sent_at);
        assert_eq!(store.get_conversation(&other).unwrap().last_message_at, other_before);
    }

    #[test]
    fn message_to_unknown_conversation_still_lands() {
        let mut store = Store::open(Database::open_in_memory().unwrap());

        let mut d = draft("alice", "hello?");
        d.conversation_id = Some("ghost".to_string());
        store.send_message(d).unwrap();

        assert_eq!(store.messages().len(), 1);
        assert!(store.conversations().is_empty());
    }

    #[test]
    fn voice_message_has_playable_media_and_no_content() {
        let mut store = Store::open(Database::open_in_memory().unwrap());
        let convo = store.start_direct_conversation("alice", "bob");

        let mut d = draft("alice", "");
        d.conversation_id = Some(convo.clone());
        let id = store.send_voice_message(d, &[1, 2, 3, 4], 7).unwrap();

        let msg = store.messages().iter().find(|m| m.id == id).unwrap();
        assert_eq!(msg.kind, MessageKind::Voice);
        assert!(msg.content.is_empty());
        assert_eq!(msg.duration_secs, Some(7));
        let media = msg.media_url.as_deref().unwrap();
        assert!(media.starts_with("data:audio/webm;base64,"));
        assert_eq!(store.get_conversation(&convo).unwrap().last_message_at, msg.created_at);
    }
}
