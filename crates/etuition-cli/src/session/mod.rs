//! Session handling for CLI commands.
//!
//! Each invocation rebuilds the in-memory [`SessionStore`] from the stored
//! file and, when the backend rejects the credential during the command,
//! removes the file so the next invocation starts signed out.

pub mod storage;

use anyhow::{Context, Result};
use tracing::debug;

use etuition_core::{ApiUrl, RoleCache, SessionStore};
use etuition_http::{AuthenticatedClient, ClientConfig, HttpRoleResolver, MarketplaceApi};

use crate::cli::GlobalArgs;
use crate::output;
use storage::StoredSession;

/// The session and client a command runs with.
pub struct CliSession {
    store: SessionStore,
    client: AuthenticatedClient,
    persisted: bool,
}

impl CliSession {
    /// Open the stored session, or an anonymous one if none is stored.
    ///
    /// A stored session keeps talking to the backend it was created against.
    pub fn open(global: &GlobalArgs) -> Result<Self> {
        let stored = storage::load_session().context("Failed to load session")?;

        let store = SessionStore::new();
        let api = match &stored {
            Some(stored) => {
                store.login(stored.identity.clone(), stored.credential());
                stored.api.clone()
            }
            None => ApiUrl::new(&global.api).context("Invalid API URL")?,
        };

        Self::with_store(api, store, global, stored.is_some())
    }

    /// Open the stored session and fail if there is none.
    pub fn require(global: &GlobalArgs) -> Result<Self> {
        let session = Self::open(global)?;
        if !session.persisted {
            anyhow::bail!("No active session. Run 'etuition session login' first.");
        }
        Ok(session)
    }

    /// Start a fresh session against `api` without touching the stored file.
    pub fn fresh(api: ApiUrl, store: SessionStore, global: &GlobalArgs) -> Result<Self> {
        Self::with_store(api, store, global, false)
    }

    fn with_store(
        api: ApiUrl,
        store: SessionStore,
        global: &GlobalArgs,
        persisted: bool,
    ) -> Result<Self> {
        let config = ClientConfig::new(api).timeout(global.timeout());
        let client = AuthenticatedClient::with_config(config, store.clone())
            .context("Failed to create API client")?;

        Ok(Self {
            store,
            client,
            persisted,
        })
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn client(&self) -> &AuthenticatedClient {
        &self.client
    }

    pub fn api(&self) -> MarketplaceApi {
        MarketplaceApi::new(self.client.clone())
    }

    pub fn roles(&self) -> RoleCache<HttpRoleResolver> {
        RoleCache::new(HttpRoleResolver::new(self.client.clone()))
    }

    /// Persist the current session, replacing any stored one.
    pub fn save(&mut self) -> Result<()> {
        let snapshot = self.store.snapshot();
        let identity = snapshot
            .identity()
            .context("Cannot save a session with no identity")?;

        storage::save_session(&StoredSession::new(
            self.client.base_url().clone(),
            identity.clone(),
            snapshot.credential(),
        ))
        .context("Failed to save session")?;
        self.persisted = true;
        Ok(())
    }

    /// Sync the stored file with the in-memory session after a command ran.
    ///
    /// Call on both success and failure paths: a rejected credential shows
    /// up as an error, and the stored file must go with it.
    pub fn close(self) -> Result<()> {
        if self.persisted && !self.store.snapshot().is_authenticated() {
            debug!("Session cleared during command, removing stored session");
            storage::clear_session().context("Failed to clear session")?;
            output::error("Session rejected by the backend; you have been logged out.");
        }
        Ok(())
    }
}
