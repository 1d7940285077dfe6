//! Credential registry holding one provider access token per business entity.
//!
//! Tokens are loaded once at startup and kept in memory. The raw value is only reachable from
//! inside the crate (the provider client reads it to build the bearer header); everything
//! else, logs and errors included, sees the masked hint.

use std::{collections::HashMap, fmt, sync::Arc};

use crate::server::{error::sync::SyncError, model::entity::EntityProfile, util::mask::mask_secret};

/// Opaque provider access token.
///
/// `Debug` and `Display` render the masked hint, never the secret.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AccessToken(Arc<str>);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Arc::from(token.into()))
    }

    /// Raw token value for the bearer header.
    pub(crate) fn expose(&self) -> &str {
        &self.0
    }

    /// Masked form safe for logs and errors, e.g. `secret-t...`.
    pub fn masked(&self) -> String {
        mask_secret(&self.0)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&self.masked()).finish()
    }
}

impl fmt::Display for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

/// Maps entity slugs to their provider access tokens.
#[derive(Clone, Default)]
pub struct CredentialRegistry {
    tokens: Arc<HashMap<String, AccessToken>>,
}

impl CredentialRegistry {
    /// Creates a registry from `entity slug -> token` pairs. Empty tokens are ignored.
    pub fn new(tokens: HashMap<String, String>) -> Self {
        let tokens = tokens
            .into_iter()
            .filter(|(_, token)| !token.trim().is_empty())
            .map(|(entity, token)| (entity, AccessToken::new(token)))
            .collect();

        Self {
            tokens: Arc::new(tokens),
        }
    }

    /// Loads the token of each profile from the environment variable it names.
    ///
    /// Profiles whose variable is unset or empty are left unregistered and will be skipped
    /// with `MissingCredential` at sync time.
    pub fn from_env(profiles: &[EntityProfile]) -> Self {
        Self::from_lookup(profiles, |var| std::env::var(var).ok())
    }

    /// Loads tokens using a custom variable lookup.
    pub fn from_lookup<F>(profiles: &[EntityProfile], lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut tokens = HashMap::new();

        for profile in profiles {
            match lookup(&profile.credential_env) {
                Some(token) if !token.trim().is_empty() => {
                    tokens.insert(profile.slug.clone(), token);
                }
                _ => {
                    tracing::warn!(
                        entity = %profile.slug,
                        variable = %profile.credential_env,
                        "No access token configured for entity; it will be skipped during sync"
                    );
                }
            }
        }

        Self::new(tokens)
    }

    /// Resolves the access token of an entity.
    ///
    /// # Returns
    /// - `Ok(AccessToken)` - Token registered for the entity
    /// - `Err(SyncError::MissingCredential)` - No token is registered for the entity
    pub fn resolve(&self, entity: &str) -> Result<AccessToken, SyncError> {
        self.tokens
            .get(entity)
            .cloned()
            .ok_or_else(|| SyncError::MissingCredential(entity.to_string()))
    }

    /// Masked hint of an entity's token for display, `None` if no token is registered.
    pub fn masked_hint(&self, entity: &str) -> Option<String> {
        self.tokens.get(entity).map(AccessToken::masked)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl fmt::Debug for CredentialRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.tokens.iter()).finish()
    }
}
