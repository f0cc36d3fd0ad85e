//! API key storage in the system keyring
//!
//! The key is kept under service `parley`, user `api_key`. A key from the
//! configuration file or `PARLEY_API_KEY` always wins over the keyring.

use crate::config::GatewayConfig;
use crate::error::{ParleyError, Result};

/// Keyring service name
pub const KEYRING_SERVICE: &str = "parley";

/// Keyring user name
pub const KEYRING_USER: &str = "api_key";

/// Handle on the keyring entry holding the API key
#[derive(Debug, Clone)]
pub struct CredentialStore {
    service: String,
    user: String,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self {
            service: KEYRING_SERVICE.to_string(),
            user: KEYRING_USER.to_string(),
        }
    }
}

impl CredentialStore {
    /// Store `api_key`, replacing any previous value
    ///
    /// # Errors
    ///
    /// Returns `ParleyError::InvalidMessage` for a blank key and
    /// `ParleyError::Keyring` if the credential store refuses the write.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use parley::credentials::CredentialStore;
    ///
    /// CredentialStore::default().save_api_key("sk-...").unwrap();
    /// ```
    pub fn save_api_key(&self, api_key: &str) -> Result<()> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(ParleyError::InvalidMessage("API key is empty".to_string()).into());
        }

        let entry = keyring::Entry::new(&self.service, &self.user).map_err(ParleyError::Keyring)?;
        entry.set_password(api_key).map_err(ParleyError::Keyring)?;
        tracing::debug!("Stored API key in keyring");
        Ok(())
    }

    /// Load the stored key, `Ok(None)` when nothing has been saved
    ///
    /// # Errors
    ///
    /// Returns `ParleyError::Keyring` if the credential store fails
    pub fn load_api_key(&self) -> Result<Option<String>> {
        let entry = keyring::Entry::new(&self.service, &self.user).map_err(ParleyError::Keyring)?;

        match entry.get_password() {
            Ok(key) if key.trim().is_empty() => Ok(None),
            Ok(key) => Ok(Some(key)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(ParleyError::Keyring(e).into()),
        }
    }

    /// Remove the stored key; a no-op when nothing is stored
    ///
    /// # Errors
    ///
    /// Returns `ParleyError::Keyring` if the credential store fails
    pub fn delete_api_key(&self) -> Result<()> {
        let entry = keyring::Entry::new(&self.service, &self.user).map_err(ParleyError::Keyring)?;

        match entry.delete_password() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(ParleyError::Keyring(e).into()),
        }
    }
}

/// Fill in `config.api_key` from the keyring when it is not already set
///
/// Keyring failures are logged and treated as "no key"; the gateway reports
/// the missing credential when a message is actually sent.
pub fn resolve_api_key(config: &mut GatewayConfig, store: &CredentialStore) {
    if has_key(config) {
        return;
    }

    match store.load_api_key() {
        Ok(Some(key)) => {
            tracing::debug!("Using API key from keyring");
            config.api_key = Some(key);
        }
        Ok(None) => tracing::debug!("No API key in keyring"),
        Err(e) => tracing::warn!("Could not read API key from keyring: {}", e),
    }
}

fn has_key(config: &GatewayConfig) -> bool {
    config
        .api_key
        .as_deref()
        .is_some_and(|key| !key.trim().is_empty())
}
