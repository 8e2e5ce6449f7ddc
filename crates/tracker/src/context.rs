use crate::{api::ApiClient, auth::AuthSession, error::Result, toast::Notifier};

/// Collaborators every collection needs, built once and cloned into each.
#[derive(Clone, Debug)]
pub struct TrackerContext {
    pub api: ApiClient,
    pub auth: AuthSession,
    pub notifier: Notifier,
}

impl TrackerContext {
    pub fn new(base_url: &str, auth: AuthSession, notifier: Notifier) -> Result<Self> {
        let api = ApiClient::new(base_url, auth.clone())?;
        Ok(Self {
            api,
            auth,
            notifier,
        })
    }

    /// Guard for mutating operations.
    ///
    /// Shows `"Please log in to {action}."` and returns `false` when there is
    /// no session.
    pub(crate) fn require_auth(&self, action: &str) -> bool {
        if self.auth.is_authenticated() {
            return true;
        }
        tracing::debug!("skipping \"{action}\": not authenticated");
        self.notifier.error(format!("Please log in to {action}."));
        false
    }
}
