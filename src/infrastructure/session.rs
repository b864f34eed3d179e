use crate::application::ports::session::{SessionCallback, SessionChange, SessionProvider};
use crate::shared::observers::{ObserverDisposer, Observers};
use std::sync::RwLock;

#[derive(Debug, Clone)]
struct SignedIn {
    user_id: String,
    access_token: String,
}

/// Session held in memory, updated by whatever performs authentication.
#[derive(Default)]
pub struct StaticSession {
    current: RwLock<Option<SignedIn>>,
    listeners: Observers<SessionChange>,
}

impl StaticSession {
    pub fn signed_in(user_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        let session = Self::default();
        session.sign_in(user_id, access_token);
        session
    }

    /// Stores the credentials. Listeners hear about it unless the same user
    /// was already signed in.
    pub fn sign_in(&self, user_id: impl Into<String>, access_token: impl Into<String>) {
        let user_id = user_id.into();
        let change = {
            let mut current = self
                .current
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let same_user = current
                .as_ref()
                .is_some_and(|session| session.user_id == user_id);
            *current = Some(SignedIn {
                user_id: user_id.clone(),
                access_token: access_token.into(),
            });
            (!same_user).then_some(SessionChange::SignedIn { user_id })
        };

        if let Some(change) = change {
            tracing::info!(target: "sync::session", "user signed in");
            self.listeners.notify(&change);
        }
    }

    pub fn sign_out(&self) {
        let previous = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();

        if previous.is_some() {
            tracing::info!(target: "sync::session", "user signed out");
            self.listeners.notify(&SessionChange::SignedOut);
        }
    }

    fn read(&self) -> Option<SignedIn> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl SessionProvider for StaticSession {
    fn current_user_id(&self) -> Option<String> {
        self.read().map(|session| session.user_id)
    }

    fn access_token(&self) -> Option<String> {
        self.read().map(|session| session.access_token)
    }

    fn on_change(&self, callback: SessionCallback) -> ObserverDisposer {
        self.listeners.register(callback)
    }
}
