//! Payment capture: checkout creation and webhook verification.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tama_core::types::{DbId, Ntg};

use crate::error::{http_client, parse_response, ProviderError};
use crate::signature;

/// What to charge for.
#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub payment_id: DbId,
    pub account_id: DbId,
    /// USD cents.
    pub amount_usd: i64,
    pub amount_ntg: Ntg,
    pub success_url: String,
    pub cancel_url: String,
}

/// A created checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkout {
    pub checkout_ref: String,
    pub checkout_url: String,
}

/// A webhook that passed signature verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookEvent {
    pub event_type: String,
    /// Id of the object the event refers to; matched against `checkout_ref`.
    pub object_id: String,
    /// The session's `payment_status`, when the object carries one.
    pub payment_status: Option<String>,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn create_charge(&self, request: &ChargeRequest) -> Result<Checkout, ProviderError>;

    /// Verify `signature_header` over the raw `payload` and parse the event.
    fn verify_webhook(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<WebhookEvent, ProviderError>;
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    event_type: String,
    data: RawEventData,
}

#[derive(Debug, Deserialize)]
struct RawEventData {
    object: RawEventObject,
}

#[derive(Debug, Deserialize)]
struct RawEventObject {
    id: String,
    #[serde(default)]
    payment_status: Option<String>,
}

/// Verify and parse a webhook with the shared signature scheme.
fn verify_and_parse(
    secret: &str,
    payload: &[u8],
    signature_header: &str,
) -> Result<WebhookEvent, ProviderError> {
    signature::verify(
        secret,
        payload,
        signature_header,
        chrono::Utc::now().timestamp(),
    )?;
    let raw: RawEvent = serde_json::from_slice(payload)
        .map_err(|e| ProviderError::Malformed(format!("webhook body: {e}")))?;
    Ok(WebhookEvent {
        event_type: raw.event_type,
        object_id: raw.data.object.id,
        payment_status: raw.data.object.payment_status,
    })
}

// ---------------------------------------------------------------------------
// Stripe-style HTTP client
// ---------------------------------------------------------------------------

pub struct StripeClient {
    client: reqwest::Client,
    api_url: String,
    secret_key: String,
    webhook_secret: String,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    url: Option<String>,
}

impl StripeClient {
    pub fn new(
        api_url: String,
        secret_key: String,
        webhook_secret: String,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(timeout)?,
            api_url: api_url.trim_end_matches('/').to_string(),
            secret_key,
            webhook_secret,
        })
    }
}

#[async_trait]
impl PaymentProvider for StripeClient {
    async fn create_charge(&self, request: &ChargeRequest) -> Result<Checkout, ProviderError> {
        let form = [
            ("mode", "payment".to_string()),
            ("payment_method_types[0]", "card".to_string()),
            ("line_items[0][quantity]", "1".to_string()),
            ("line_items[0][price_data][currency]", "usd".to_string()),
            (
                "line_items[0][price_data][unit_amount]",
                request.amount_usd.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]",
                format!("{} NTG Tokens", request.amount_ntg),
            ),
            ("success_url", request.success_url.clone()),
            ("cancel_url", request.cancel_url.clone()),
            ("metadata[payment_id]", request.payment_id.to_string()),
            ("metadata[account_id]", request.account_id.to_string()),
            ("metadata[amount_ntg]", request.amount_ntg.to_string()),
        ];

        let response = self
            .client
            .post(format!("{}/checkout/sessions", self.api_url))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await?;

        let session: SessionResponse = parse_response(response).await?;
        let checkout_url = session
            .url
            .ok_or_else(|| ProviderError::Malformed("checkout session has no url".to_string()))?;
        Ok(Checkout {
            checkout_ref: session.id,
            checkout_url,
        })
    }

    fn verify_webhook(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<WebhookEvent, ProviderError> {
        verify_and_parse(&self.webhook_secret, payload, signature_header)
    }
}

// ---------------------------------------------------------------------------
// Local provider
// ---------------------------------------------------------------------------

/// Mints local checkout refs and verifies webhooks with the configured
/// secret. Used when no payment API key is configured.
pub struct LocalPaymentProvider {
    webhook_secret: String,
}

impl LocalPaymentProvider {
    pub fn new(webhook_secret: String) -> Self {
        Self { webhook_secret }
    }

    /// The checkout ref minted for `payment_id`.
    pub fn checkout_ref_for(payment_id: DbId) -> String {
        format!("cs_local_{payment_id}")
    }
}

#[async_trait]
impl PaymentProvider for LocalPaymentProvider {
    async fn create_charge(&self, request: &ChargeRequest) -> Result<Checkout, ProviderError> {
        let checkout_ref = Self::checkout_ref_for(request.payment_id);
        let separator = if request.success_url.contains('?') { '&' } else { '?' };
        Ok(Checkout {
            checkout_url: format!("{}{separator}session_id={checkout_ref}", request.success_url),
            checkout_ref,
        })
    }

    fn verify_webhook(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<WebhookEvent, ProviderError> {
        verify_and_parse(&self.webhook_secret, payload, signature_header)
    }
}
