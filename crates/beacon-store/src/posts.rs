use chrono::Utc;
use uuid::Uuid;

use beacon_types::api::PostMedia;
use beacon_types::events::StoreEvent;
use beacon_types::models::{Comment, Post, PostStats, Visibility};

use crate::error::StoreError;
use crate::guard::ActionKind;
use crate::{POSTS, Store, USERS};

impl Store {
    /// Appends a new post with zeroed counters and bumps the author's post
    /// count in the same step. The author's existence is the caller's
    /// contract, as is content length; neither is validated here. No
    /// notifications fan out from post creation.
    pub fn create_post(
        &mut self,
        author_id: &str,
        content: &str,
        media: Option<PostMedia>,
        visibility: Visibility,
        community_id: Option<String>,
        channel_id: Option<String>,
    ) -> Result<String, StoreError> {
        let now = Utc::now();
        self.admit(author_id, ActionKind::Post, now)?;

        let (image_url, video_url) = match media {
            Some(PostMedia::Image(url)) => (Some(url), None),
            Some(PostMedia::Video(url)) => (None, Some(url)),
            None => (None, None),
        };

        let post = Post {
            id: Uuid::new_v4().to_string(),
            author_id: author_id.to_string(),
            community_id,
            channel_id,
            content: content.to_string(),
            image_url,
            video_url,
            visibility,
            created_at: now,
            stats: PostStats::default(),
            content_hash: content_fingerprint(content),
            is_flagged: false,
            likes: Vec::new(),
            comments: Vec::new(),
        };
        let post_id = post.id.clone();

        // Newest first
        self.posts.insert(0, post);

        if let Some(author) = self.users.iter_mut().find(|u| u.id == author_id) {
            author.stats.post_count += 1;
            self.persist(USERS, &self.users);
        }
        self.persist(POSTS, &self.posts);

        self.emit(StoreEvent::PostCreated {
            post_id: post_id.clone(),
            author_id: author_id.to_string(),
        });
        Ok(post_id)
    }

    /// Flips `user_id`'s membership in the post's like set, adjusting the
    /// counter by exactly one in the same step. Returns the liked state
    /// after the toggle; a missing post is a no-op reported as `false`.
    pub fn toggle_like(&mut self, post_id: &str, user_id: &str) -> Result<bool, StoreError> {
        self.admit(user_id, ActionKind::Like, Utc::now())?;

        let Some(post) = self.posts.iter_mut().find(|p| p.id == post_id) else {
            return Ok(false);
        };

        let liked = if let Some(pos) = post.likes.iter().position(|id| id == user_id) {
            post.likes.remove(pos);
            post.stats.like_count -= 1;
            false
        } else {
            post.likes.push(user_id.to_string());
            post.stats.like_count += 1;
            true
        };

        self.persist(POSTS, &self.posts);
        self.emit(StoreEvent::LikeToggled {
            post_id: post_id.to_string(),
            user_id: user_id.to_string(),
            liked,
        });
        Ok(liked)
    }

    /// Appends a comment in arrival order and bumps the counter. A missing
    /// post is a no-op.
    pub fn add_comment(&mut self, post_id: &str, author_id: &str, content: &str) {
        let Some(post) = self.posts.iter_mut().find(|p| p.id == post_id) else {
            return;
        };

        let comment = Comment {
            id: Uuid::new_v4().to_string(),
            author_id: author_id.to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
        };
        let comment_id = comment.id.clone();

        post.comments.push(comment);
        post.stats.comment_count += 1;

        self.persist(POSTS, &self.posts);
        self.emit(StoreEvent::CommentAdded {
            post_id: post_id.to_string(),
            comment_id,
            author_id: author_id.to_string(),
        });
    }
}

/// The duplicate-content fingerprint: the classic `h*31 + c` string hash
/// over UTF-16 code units, wrapped to 32 bits, rendered in decimal. Cheap
/// and non-cryptographic on purpose.
pub fn content_fingerprint(content: &str) -> String {
    let mut hash: i32 = 0;
    for unit in content.encode_utf16() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(unit as i32);
    }
    hash.to_string()
}
