use chrono::Utc;
use std::collections::HashMap;
use uuid::Uuid;

use beacon_types::api::CommunityDraft;
use beacon_types::events::StoreEvent;
use beacon_types::models::{
    Channel, ChannelKind, Community, CommunityKind, CommunityRole, CommunityVisibility,
};

use crate::error::StoreError;
use crate::guard::ActionKind;
use crate::{COMMUNITIES, Store};

impl Store {
    /// Creates a community with the owner pre-seated as its first member,
    /// holding the owner role. Creation is the most abuse-prone operation
    /// and carries the per-day ceiling.
    pub fn create_community(
        &mut self,
        owner_id: &str,
        draft: CommunityDraft,
    ) -> Result<String, StoreError> {
        let now = Utc::now();
        self.admit(owner_id, ActionKind::CommunityCreate, now)?;

        let mut member_roles = HashMap::new();
        member_roles.insert(owner_id.to_string(), CommunityRole::Owner);

        let community = Community {
            id: Uuid::new_v4().to_string(),
            kind: draft.kind,
            name: draft.name,
            description: draft.description,
            purpose: draft.purpose,
            category: draft.category,
            rules: draft.rules,
            owner_id: owner_id.to_string(),
            visibility: draft.visibility,
            avatar_url: draft.avatar_url,
            created_at: now,
            channels: Vec::new(),
            members: vec![owner_id.to_string()],
            member_roles,
            join_requests: Vec::new(),
        };
        let community_id = community.id.clone();

        self.communities.push(community);
        self.persist(COMMUNITIES, &self.communities);
        self.emit(StoreEvent::CommunityCreated {
            community_id: community_id.clone(),
            owner_id: owner_id.to_string(),
        });
        Ok(community_id)
    }

    /// Public communities admit directly as a member; private ones queue a
    /// join request instead — never both. Repeats and existing members are
    /// no-ops, as is a missing community.
    pub fn join_community(&mut self, user_id: &str, community_id: &str) {
        let Some(community) = self.communities.iter_mut().find(|c| c.id == community_id) else {
            return;
        };
        if community.members.iter().any(|m| m == user_id) {
            return;
        }

        let event = match community.visibility {
            CommunityVisibility::Public => {
                community.members.push(user_id.to_string());
                community
                    .member_roles
                    .insert(user_id.to_string(), CommunityRole::Member);
                StoreEvent::CommunityJoined {
                    community_id: community_id.to_string(),
                    user_id: user_id.to_string(),
                }
            }
            CommunityVisibility::Private => {
                if community.join_requests.iter().any(|r| r == user_id) {
                    return;
                }
                community.join_requests.push(user_id.to_string());
                StoreEvent::JoinRequested {
                    community_id: community_id.to_string(),
                    user_id: user_id.to_string(),
                }
            }
        };

        self.persist(COMMUNITIES, &self.communities);
        self.emit(event);
    }

    /// Removes the member and their role entry together, keeping the role
    /// map's domain equal to the member list. The owner cannot leave; that
    /// would orphan the community.
    pub fn leave_community(&mut self, user_id: &str, community_id: &str) -> Result<(), StoreError> {
        let Some(community) = self.communities.iter_mut().find(|c| c.id == community_id) else {
            return Ok(());
        };
        if community.owner_id == user_id {
            return Err(StoreError::OwnerCannotLeave);
        }

        let before = community.members.len();
        community.members.retain(|m| m != user_id);
        community.member_roles.remove(user_id);
        if community.members.len() == before {
            return Ok(());
        }

        self.persist(COMMUNITIES, &self.communities);
        self.emit(StoreEvent::CommunityLeft {
            community_id: community_id.to_string(),
            user_id: user_id.to_string(),
        });
        Ok(())
    }

    /// Clears the pending request unconditionally; acceptance additionally
    /// seats the user as a plain member.
    pub fn respond_to_join_request(&mut self, community_id: &str, user_id: &str, accept: bool) {
        let Some(community) = self.communities.iter_mut().find(|c| c.id == community_id) else {
            return;
        };

        let before = community.join_requests.len();
        community.join_requests.retain(|r| r != user_id);
        let mut changed = community.join_requests.len() != before;

        if accept && !community.members.iter().any(|m| m == user_id) {
            community.members.push(user_id.to_string());
            community
                .member_roles
                .insert(user_id.to_string(), CommunityRole::Member);
            changed = true;
        }
        if !changed {
            return;
        }

        self.persist(COMMUNITIES, &self.communities);
        self.emit(StoreEvent::JoinRequestResolved {
            community_id: community_id.to_string(),
            user_id: user_id.to_string(),
            accepted: accept,
        });
    }

    /// Appends a channel to a server community. Groups have no channels, so
    /// the call quietly does nothing for them, as it does for a missing
    /// community. Returns the new channel's id when one was created.
    pub fn create_channel(
        &mut self,
        community_id: &str,
        name: &str,
        kind: ChannelKind,
        description: &str,
    ) -> Option<String> {
        let community = self
            .communities
            .iter_mut()
            .find(|c| c.id == community_id && c.kind == CommunityKind::Server)?;

        let channel = Channel {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            kind,
            description: (!description.is_empty()).then(|| description.to_string()),
            is_locked: false,
        };
        let channel_id = channel.id.clone();

        community.channels.push(channel);
        self.persist(COMMUNITIES, &self.communities);
        self.emit(StoreEvent::ChannelCreated {
            community_id: community_id.to_string(),
            channel_id: channel_id.clone(),
            kind,
        });
        Some(channel_id)
    }

    /// Removes a channel from a server community. Posts and messages
    /// already tagged with the channel keep their references; orphans are
    /// tolerated by design.
    pub fn delete_channel(&mut self, community_id: &str, channel_id: &str) {
        let Some(community) = self
            .communities
            .iter_mut()
            .find(|c| c.id == community_id && c.kind == CommunityKind::Server)
        else {
            return;
        };

        let before = community.channels.len();
        community.channels.retain(|ch| ch.id != channel_id);
        if community.channels.len() == before {
            return;
        }

        self.persist(COMMUNITIES, &self.communities);
        self.emit(StoreEvent::ChannelDeleted {
            community_id: community_id.to_string(),
            channel_id: channel_id.to_string(),
        });
    }
}
