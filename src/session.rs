use tokio::sync::watch;
use tracing::info;

/// Process-wide authentication state: the presence of a stored token string
/// is the entire contract. The holder is injected wherever the flag is
/// consulted; nothing reads ambient storage directly.
///
/// Signing up or logging in stores a sentinel token; no credential
/// verification exists in this scope.
pub struct SessionStore {
    flag: watch::Sender<Option<String>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        let (flag, _) = watch::channel(None);
        Self { flag }
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sign_in(&self, token: impl Into<String>) {
        self.flag.send_replace(Some(token.into()));
        info!("session flag set");
    }

    pub fn sign_out(&self) {
        self.flag.send_replace(None);
        info!("session flag cleared");
    }

    pub fn is_signed_in(&self) -> bool {
        self.flag.borrow().is_some()
    }

    pub fn token(&self) -> Option<String> {
        self.flag.borrow().clone()
    }

    /// Change-notified view of the flag, for navigation components that
    /// react to sign-in state.
    pub fn watch(&self) -> watch::Receiver<Option<String>> {
        self.flag.subscribe()
    }
}
