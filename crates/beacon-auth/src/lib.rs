pub mod avatar;
pub mod validation;

use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use beacon_store::Store;
use beacon_types::api::{SettingsUpdate, UserProfileUpdate};
use beacon_types::models::User;

/// What a new account needs; everything else gets defaults. The demo is
/// passwordless by design — no credential is collected or checked.
#[derive(Debug, Clone)]
pub struct SignupData {
    pub email: String,
    pub full_name: String,
    pub username: String,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("username must be lowercase letters, digits or underscores")]
    InvalidUsername,
    #[error("invalid email address")]
    InvalidEmail,
    #[error("username already taken")]
    UsernameTaken,
    #[error("email already registered")]
    EmailTaken,
}

/// Session state for the authentication collaborator. It holds nothing but
/// the signed-in user's id; the Users collection is the join target for
/// everything else, and the durable marker lives next to the collections.
pub struct Auth {
    current_user_id: Option<String>,
    pending_two_factor_secret: Option<String>,
}

impl Auth {
    /// Restores the session from the durable marker. A marker pointing at a
    /// user the store no longer knows is treated as signed out.
    pub fn restore(store: &Store) -> Self {
        let current_user_id = match store.db().session_user() {
            Ok(marker) => marker.filter(|id| store.get_user(id).is_some()),
            Err(e) => {
                warn!("could not read session marker: {:#}", e);
                None
            }
        };

        Self {
            current_user_id,
            pending_two_factor_secret: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user_id.is_some()
    }

    pub fn current_user_id(&self) -> Option<&str> {
        self.current_user_id.as_deref()
    }

    pub fn current_user<'a>(&self, store: &'a Store) -> Option<&'a User> {
        self.current_user_id
            .as_deref()
            .and_then(|id| store.get_user(id))
    }

    /// Validates, registers and signs in a new account. Uniqueness is
    /// checked here, case-insensitively, because the store's `register_user`
    /// trusts its caller.
    pub fn signup(&mut self, store: &mut Store, data: SignupData) -> Result<String, AuthError> {
        if !validation::valid_username(&data.username) {
            return Err(AuthError::InvalidUsername);
        }
        if !validation::valid_email(&data.email) {
            return Err(AuthError::InvalidEmail);
        }
        if store
            .users()
            .iter()
            .any(|u| u.username.eq_ignore_ascii_case(&data.username))
        {
            return Err(AuthError::UsernameTaken);
        }
        if store.users().iter().any(|u| {
            u.email
                .as_deref()
                .is_some_and(|e| e.eq_ignore_ascii_case(&data.email))
        }) {
            return Err(AuthError::EmailTaken);
        }

        let mut user = User::new(data.username.clone(), data.full_name, Some(data.email));
        user.bio = data.bio.unwrap_or_default();
        user.avatar_url = Some(avatar::default_avatar(&data.username));
        user.trusted_devices.push("current device".to_string());
        let user_id = user.id.clone();

        store.register_user(user);
        self.persist_marker(store, &user_id);
        self.current_user_id = Some(user_id.clone());

        info!("new account {} signed up", data.username);
        Ok(user_id)
    }

    /// Signs in by username or email, case-insensitively.
    pub fn login(&mut self, store: &Store, identifier: &str) -> bool {
        let found = store.users().iter().find(|u| {
            u.username.eq_ignore_ascii_case(identifier)
                || u.email
                    .as_deref()
                    .is_some_and(|e| e.eq_ignore_ascii_case(identifier))
        });

        match found {
            Some(user) => {
                let user_id = user.id.clone();
                self.persist_marker(store, &user_id);
                self.current_user_id = Some(user_id);
                true
            }
            None => false,
        }
    }

    pub fn logout(&mut self, store: &Store) {
        if let Err(e) = store.db().clear_session_user() {
            warn!("could not clear session marker: {:#}", e);
        }
        self.current_user_id = None;
        self.pending_two_factor_secret = None;
    }

    /// Profile changes for the signed-in user; no-op when signed out.
    pub fn update_profile(&self, store: &mut Store, update: UserProfileUpdate) {
        if let Some(id) = self.current_user_id.as_deref() {
            store.update_user_profile(id, update);
        }
    }

    pub fn update_settings(&self, store: &mut Store, update: SettingsUpdate) {
        if let Some(id) = self.current_user_id.as_deref() {
            store.update_user_settings(id, update);
        }
    }

    pub fn complete_onboarding(&self, store: &mut Store) {
        self.update_profile(
            store,
            UserProfileUpdate {
                has_completed_onboarding: Some(true),
                ..Default::default()
            },
        );
    }

    // -- Mock two-factor --
    // Demo-grade: any six digits verify. Real TOTP would live behind the
    // same three calls.

    pub fn enable_two_factor(&mut self) -> String {
        let token = Uuid::new_v4().simple().to_string();
        let secret = format!("BEACON-SECURE-{}", token[..6].to_uppercase());
        self.pending_two_factor_secret = Some(secret.clone());
        secret
    }

    pub fn verify_two_factor(&mut self, store: &mut Store, code: &str) -> bool {
        if code.len() != 6 || !code.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }

        if self.pending_two_factor_secret.take().is_some() {
            if let Some(user) = self.current_user(store) {
                let mut security = user.settings.security.clone();
                security.two_factor_enabled = true;
                self.update_settings(
                    store,
                    SettingsUpdate {
                        security: Some(security),
                        ..Default::default()
                    },
                );
            }
        }
        true
    }

    pub fn disable_two_factor(&self, store: &mut Store) {
        if let Some(user) = self.current_user(store) {
            let mut security = user.settings.security.clone();
            security.two_factor_enabled = false;
            self.update_settings(
                store,
                SettingsUpdate {
                    security: Some(security),
                    ..Default::default()
                },
            );
        }
    }

    pub fn two_factor_required(&self, store: &Store) -> bool {
        self.current_user(store)
            .is_some_and(|u| u.settings.security.two_factor_enabled)
    }

    fn persist_marker(&self, store: &Store, user_id: &str) {
        if let Err(e) = store.db().set_session_user(user_id) {
            warn!("could not persist session marker: {:#}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_db::Database;

    fn signup_data(username: &str, email: &str) -> SignupData {
        SignupData {
            email: email.to_string(),
            full_name: username.to_uppercase(),
            username: username.to_string(),
            bio: None,
        }
    }

    fn fresh_store() -> Store {
        Store::open(Database::open_in_memory().unwrap())
    }

    #[test]
    fn signup_builds_the_default_account() {
        let mut store = fresh_store();
        let mut auth = Auth::restore(&store);

        let id = auth
            .signup(&mut store, signup_data("ada", "ada@example.com"))
            .unwrap();

        let user = store.get_user(&id).unwrap();
        assert_eq!(user.username, "ada");
        assert_eq!(user.trust_score, 50);
        assert!(!user.has_completed_onboarding);
        assert!(!user.is_private);
        assert!(user.avatar_url.as_deref().unwrap().starts_with("data:image/svg+xml"));
        assert!(auth.is_authenticated());
        assert_eq!(store.db().session_user().unwrap(), Some(id));
    }

    #[test]
    fn signup_rejects_duplicates_case_insensitively() {
        let mut store = fresh_store();
        let mut auth = Auth::restore(&store);
        auth.signup(&mut store, signup_data("ada", "ada@example.com"))
            .unwrap();

        // "Ada" fails the format check before uniqueness is even consulted
        assert_eq!(
            auth.signup(&mut store, signup_data("Ada", "other@example.com")),
            Err(AuthError::InvalidUsername)
        );
        assert_eq!(
            auth.signup(&mut store, signup_data("ada", "other@example.com")),
            Err(AuthError::UsernameTaken)
        );
        assert_eq!(
            auth.signup(&mut store, signup_data("grace", "ADA@example.com")),
            Err(AuthError::EmailTaken)
        );
        assert_eq!(store.users().len(), 1);
    }

    #[test]
    fn login_matches_username_or_email() {
        let mut store = fresh_store();
        let mut auth = Auth::restore(&store);
        auth.signup(&mut store, signup_data("ada", "ada@example.com"))
            .unwrap();
        auth.logout(&store);

        assert!(auth.login(&store, "ADA"));
        auth.logout(&store);
        assert!(auth.login(&store, "ada@EXAMPLE.com"));
        assert!(!auth.login(&store, "nobody"));
    }

    #[test]
    fn session_restores_and_drops_stale_markers() {
        let mut store = fresh_store();
        let id = {
            let mut auth = Auth::restore(&store);
            auth.signup(&mut store, signup_data("ada", "ada@example.com"))
                .unwrap()
        };

        let restored = Auth::restore(&store);
        assert_eq!(restored.current_user_id(), Some(id.as_str()));

        store.db().set_session_user("gone").unwrap();
        let stale = Auth::restore(&store);
        assert!(!stale.is_authenticated());
    }

    #[test]
    fn logout_clears_the_marker() {
        let mut store = fresh_store();
        let mut auth = Auth::restore(&store);
        auth.signup(&mut store, signup_data("ada", "ada@example.com"))
            .unwrap();

        auth.logout(&store);
        assert!(!auth.is_authenticated());
        assert_eq!(store.db().session_user().unwrap(), None);
    }

    #[test]
    fn two_factor_round_trip() {
        let mut store = fresh_store();
        let mut auth = Auth::restore(&store);
        auth.signup(&mut store, signup_data("ada", "ada@example.com"))
            .unwrap();
        assert!(!auth.two_factor_required(&store));

        let secret = auth.enable_two_factor();
        assert!(secret.starts_with("BEACON-SECURE-"));

        assert!(!auth.verify_two_factor(&mut store, "abc123"));
        assert!(!auth.verify_two_factor(&mut store, "12345"));
        assert!(auth.verify_two_factor(&mut store, "123456"));
        assert!(auth.two_factor_required(&store));

        auth.disable_two_factor(&mut store);
        assert!(!auth.two_factor_required(&store));
    }
}
