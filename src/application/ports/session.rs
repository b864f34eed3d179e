use crate::shared::observers::ObserverDisposer;

/// Session transition reported by the auth layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionChange {
    SignedIn { user_id: String },
    SignedOut,
}

pub type SessionCallback = Box<dyn Fn(&SessionChange) + Send + Sync>;

/// Read access to the signed-in user, consumed from the auth layer.
pub trait SessionProvider: Send + Sync {
    fn current_user_id(&self) -> Option<String>;
    fn access_token(&self) -> Option<String>;

    /// Called synchronously when the signed-in user changes or signs out.
    /// A token refresh for the same user is not a change.
    fn on_change(&self, callback: SessionCallback) -> ObserverDisposer;
}
