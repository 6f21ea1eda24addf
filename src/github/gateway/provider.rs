//! Construction of gateways from the stored credential.

use std::sync::{Arc, Mutex, PoisonError};

use crate::github::error::ForgeError;
use crate::github::repo_key::PersonalAccessToken;

use super::ForgeGateway;
use super::forge::OctocrabForgeGateway;

/// Produces a gateway authorised with a given token.
///
/// The credential lives in the store and may change between commands, so
/// callers ask for a gateway per command instead of holding one.
#[cfg_attr(test, mockall::automock)]
pub trait GatewayProvider: Send + Sync {
    /// Returns a gateway authorised with `token`.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying client cannot be built.
    fn gateway(&self, token: &PersonalAccessToken) -> Result<Arc<dyn ForgeGateway>, ForgeError>;
}

type CachedGateway = (String, Arc<OctocrabForgeGateway>);

/// Builds [`OctocrabForgeGateway`] instances, reusing the last one while the
/// token is unchanged.
pub struct OctocrabGatewayProvider {
    api_base: String,
    cached: Mutex<Option<CachedGateway>>,
}

impl OctocrabGatewayProvider {
    /// Creates a provider targeting `api_base`.
    #[must_use]
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            cached: Mutex::new(None),
        }
    }
}

impl GatewayProvider for OctocrabGatewayProvider {
    fn gateway(&self, token: &PersonalAccessToken) -> Result<Arc<dyn ForgeGateway>, ForgeError> {
        let mut cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some((_, gateway)) = cached
            .as_ref()
            .filter(|(cached_token, _)| cached_token == token.value())
        {
            return Ok(Arc::clone(gateway) as Arc<dyn ForgeGateway>);
        }

        let gateway = Arc::new(OctocrabForgeGateway::for_token(token, &self.api_base)?);
        *cached = Some((token.value().to_owned(), Arc::clone(&gateway)));
        Ok(gateway)
    }
}
