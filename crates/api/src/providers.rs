//! Provider selection from configuration.
//!
//! A provider with credentials gets its HTTP client; one without runs the
//! deterministic local implementation.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tama_providers::{
    ConversationProvider, ImageProvider, LocalPaymentProvider, LocalResponder, PaymentProvider,
    PlaceholderImageProvider, ProviderError, StabilityClient, StripeClient, StudioClient,
};

use crate::config::ProviderConfig;

/// Whether a provider talks to its remote API or runs locally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Remote,
    #[default]
    Local,
}

impl Mode {
    fn keyed<T>(key: &Option<T>) -> Self {
        if key.is_some() {
            Self::Remote
        } else {
            Self::Local
        }
    }
}

/// Per-provider [`Mode`], reported by `/health`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProviderModes {
    pub images: Mode,
    pub conversation: Mode,
    pub payments: Mode,
}

/// The collaborators handlers call through.
#[derive(Clone)]
pub struct Providers {
    pub images: Arc<dyn ImageProvider>,
    pub conversation: Arc<dyn ConversationProvider>,
    pub payments: Arc<dyn PaymentProvider>,
    /// Upper bound on any single provider call.
    pub timeout: Duration,
    pub modes: ProviderModes,
}

impl Providers {
    /// Build the provider set described by `config`.
    ///
    /// Fails only when a provider is half-configured.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let timeout = config.timeout();

        let images: Arc<dyn ImageProvider> = match &config.sd_api_key {
            Some(key) => Arc::new(StabilityClient::new(
                config.sd_api_url.clone(),
                key.clone(),
                timeout,
            )?),
            None => Arc::new(PlaceholderImageProvider),
        };

        let conversation: Arc<dyn ConversationProvider> = match &config.conversation_api_key {
            Some(key) => {
                let workspace_id = config
                    .conversation_workspace_id
                    .clone()
                    .ok_or(ProviderError::NotConfigured("CONVERSATION_WORKSPACE_ID"))?;
                Arc::new(StudioClient::new(
                    config.conversation_api_url.clone(),
                    key.clone(),
                    workspace_id,
                    timeout,
                )?)
            }
            None => Arc::new(LocalResponder),
        };

        let payments: Arc<dyn PaymentProvider> = match &config.stripe_secret_key {
            Some(key) => Arc::new(StripeClient::new(
                config.stripe_api_url.clone(),
                key.clone(),
                config.stripe_webhook_secret.clone(),
                timeout,
            )?),
            None => Arc::new(LocalPaymentProvider::new(
                config.stripe_webhook_secret.clone(),
            )),
        };

        let modes = ProviderModes {
            images: Mode::keyed(&config.sd_api_key),
            conversation: Mode::keyed(&config.conversation_api_key),
            payments: Mode::keyed(&config.stripe_secret_key),
        };
        tracing::info!(?modes, "Providers configured");

        Ok(Self {
            images,
            conversation,
            payments,
            timeout,
            modes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn local_config() -> ProviderConfig {
        ProviderConfig {
            sd_api_url: "https://images.test".into(),
            sd_api_key: None,
            conversation_api_url: "https://chat.test".into(),
            conversation_api_key: None,
            conversation_workspace_id: None,
            stripe_api_url: "https://pay.test".into(),
            stripe_secret_key: None,
            stripe_webhook_secret: "whsec".into(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn local_providers_without_keys() {
        let providers = Providers::from_config(&local_config()).unwrap();
        assert_eq!(providers.timeout, Duration::from_secs(5));
        assert_eq!(providers.modes, ProviderModes::default());
    }

    #[test]
    fn keyed_providers_are_remote() {
        let config = ProviderConfig {
            sd_api_key: Some("sd".into()),
            stripe_secret_key: Some("sk".into()),
            ..local_config()
        };
        let providers = Providers::from_config(&config).unwrap();
        assert_eq!(providers.modes.images, Mode::Remote);
        assert_eq!(providers.modes.conversation, Mode::Local);
        assert_eq!(providers.modes.payments, Mode::Remote);
    }

    #[test]
    fn conversation_key_requires_workspace() {
        let config = ProviderConfig {
            conversation_api_key: Some("key".into()),
            ..local_config()
        };
        assert_matches!(
            Providers::from_config(&config).err(),
            Some(ProviderError::NotConfigured("CONVERSATION_WORKSPACE_ID"))
        );
    }
}
