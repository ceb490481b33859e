//! Handlers for the `/payments` resource.
//!
//! Checkout creation talks to the payment provider with no transaction
//! open. The webhook is the only path that completes a payment and credits
//! NTG.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use tama_core::error::CoreError;
use tama_core::payment::{
    find_package, NtgPackage, WebhookOutcome, MIN_CHECKOUT_USD_CENTS, NTG_PACKAGES,
};
use tama_core::search::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use tama_core::types::{DbId, Ntg};
use tama_db::engine::payment::{self as engine, Settlement};
use tama_db::engine::ledger;
use tama_db::models::payment::Payment;
use tama_db::repositories::PaymentRepo;
use tama_providers::fallback::bounded;
use tama_providers::ChargeRequest;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Header carrying `t=<unix>,v1=<hex hmac>`.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub balance_ntg: Ntg,
}

/// One of the pairs listed by `GET /payments/packages`.
#[derive(Debug, Deserialize, Validate)]
pub struct CheckoutRequest {
    /// USD cents.
    #[validate(range(min = MIN_CHECKOUT_USD_CENTS, message = "must be at least 99 cents"))]
    pub amount_usd: i64,
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub amount_ntg: Ntg,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub payment_id: DbId,
    pub checkout_ref: String,
    pub checkout_url: String,
}

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
    /// `applied`, `unchanged` or `ignored`.
    pub outcome: &'static str,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/payments/balance
pub async fn balance(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<BalanceResponse>>> {
    let balance_ntg = ledger::balance(&state.pool, auth.account_id).await?;
    Ok(Json(DataResponse {
        data: BalanceResponse { balance_ntg },
    }))
}

/// GET /api/v1/payments
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Payment>>>> {
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
    let offset = clamp_offset(params.offset);
    let payments = PaymentRepo::list_by_account(&state.pool, auth.account_id, limit, offset).await?;
    Ok(Json(DataResponse { data: payments }))
}

/// GET /api/v1/payments/packages
pub async fn packages() -> Json<DataResponse<&'static [NtgPackage]>> {
    Json(DataResponse {
        data: &NTG_PACKAGES,
    })
}

/// POST /api/v1/payments/checkout
///
/// Record a pending payment and open a provider checkout for it. A
/// provider failure fails the payment and returns 502.
pub async fn checkout(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CheckoutRequest>,
) -> AppResult<Json<DataResponse<CheckoutResponse>>> {
    input.validate()?;
    let package = find_package(input.amount_usd, input.amount_ntg).ok_or_else(|| {
        tracing::info!(
            account_id = auth.account_id,
            amount_usd = input.amount_usd,
            amount_ntg = input.amount_ntg,
            "Checkout rejected: not a catalog package",
        );
        AppError::Core(CoreError::Validation(
            "amount_usd and amount_ntg must match a package from /payments/packages".into(),
        ))
    })?;

    let payment = PaymentRepo::create_pending(
        &state.pool,
        auth.account_id,
        package.amount_usd,
        package.amount_ntg,
    )
    .await?;

    let frontend = &state.config.frontend_url;
    let request = ChargeRequest {
        payment_id: payment.id,
        account_id: auth.account_id,
        amount_usd: payment.amount_usd,
        amount_ntg: payment.amount_ntg,
        success_url: format!("{frontend}/payments/success"),
        cancel_url: format!("{frontend}/payments/cancel"),
    };

    let providers = &state.providers;
    let checkout = match bounded(providers.timeout, providers.payments.create_charge(&request)).await
    {
        Ok(checkout) => checkout,
        Err(err) => {
            engine::mark_failed(&state.pool, payment.id).await?;
            return Err(AppError::PaymentProvider(format!(
                "Checkout for payment {} failed: {err}",
                payment.id
            )));
        }
    };

    PaymentRepo::set_checkout_ref(&state.pool, payment.id, &checkout.checkout_ref).await?;

    tracing::info!(
        account_id = auth.account_id,
        payment_id = payment.id,
        amount_usd = payment.amount_usd,
        amount_ntg = payment.amount_ntg,
        "Checkout created",
    );

    Ok(Json(DataResponse {
        data: CheckoutResponse {
            payment_id: payment.id,
            checkout_ref: checkout.checkout_ref,
            checkout_url: checkout.checkout_url,
        },
    }))
}

/// POST /api/v1/payments/webhook
///
/// Public. The signature is checked over the raw body before anything is
/// parsed. Verified events the server does not act on are acknowledged so
/// the provider stops redelivering them.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<WebhookAck>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Missing Stripe-Signature header".into()))?;

    let event = state
        .providers
        .payments
        .verify_webhook(&body, signature)
        .map_err(|err| {
            tracing::warn!(error = %err, "Webhook rejected");
            AppError::BadRequest("Invalid webhook signature or payload".into())
        })?;

    let Some(outcome) =
        WebhookOutcome::from_event(&event.event_type, event.payment_status.as_deref())
    else {
        tracing::debug!(
            event_type = %event.event_type,
            payment_status = ?event.payment_status,
            "Webhook event ignored",
        );
        return Ok(Json(WebhookAck {
            received: true,
            outcome: "ignored",
        }));
    };

    let settlement = engine::settle_by_checkout_ref(&state.pool, &event.object_id, outcome).await?;
    let outcome = match settlement {
        Settlement::Applied { .. } => "applied",
        Settlement::Unchanged(_) => "unchanged",
        Settlement::Unknown => "ignored",
    };

    Ok(Json(WebhookAck {
        received: true,
        outcome,
    }))
}
