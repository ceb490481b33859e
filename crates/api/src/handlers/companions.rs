//! Handlers for the `/companions` resource.
//!
//! Creation calls the image and conversation providers before touching the
//! database, so no transaction is held across a network call. The quota is
//! prechecked first to avoid paying for provider work that would be
//! rejected, and enforced again atomically on insert.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tama_core::error::CoreError;
use tama_core::quota::{QuotaStatus, VARIANT_COUNT};
use tama_core::search::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use tama_core::style::Style;
use tama_core::types::{DbId, Ntg};
use tama_core::validation::normalize_name;
use tama_db::engine::companion as engine;
use tama_db::models::companion::{Companion, CompanionView, CreateCompanion, UpdateCompanion};
use tama_db::repositories::CompanionRepo;
use tama_providers::fallback::{generate_or_placeholders, provision_agent_or_local};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Name used in the portrait prompt when previewing without one.
const PREVIEW_NAME: &str = "Companion";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCompanionRequest {
    #[validate(length(min = 2, max = 50, message = "must be 2 to 50 characters"))]
    pub name: String,
    pub style: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct GenerateVariantsRequest {
    pub style: String,
    #[validate(length(min = 2, max = 50, message = "must be 2 to 50 characters"))]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCompanionRequest {
    #[validate(length(min = 2, max = 50, message = "must be 2 to 50 characters"))]
    pub name: Option<String>,
    #[validate(url(message = "must be a valid URL"))]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SelectAvatarRequest {
    #[validate(url(message = "must be a valid URL"))]
    pub avatar_url: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedCompanion {
    pub companion: CompanionView,
    pub variants: Vec<String>,
    /// `free` or `paid`.
    pub generation: &'static str,
    pub balance: Ntg,
}

#[derive(Debug, Serialize)]
pub struct Variants {
    pub style: Style,
    pub variants: Vec<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/companions/quota
pub async fn quota(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<QuotaStatus>>> {
    let status = engine::quota_status(&state.pool, auth.account_id).await?;
    Ok(Json(DataResponse { data: status }))
}

/// POST /api/v1/companions
///
/// Create a companion, consuming the free generation or charging for it.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateCompanionRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<CreatedCompanion>>)> {
    input.validate()?;
    let name = normalize_name(&input.name)?;
    let style: Style = input.style.parse()?;

    engine::precheck(&state.pool, auth.account_id).await?;

    let providers = &state.providers;
    let agent = provision_agent_or_local(
        providers.conversation.as_ref(),
        &name,
        style,
        providers.timeout,
    )
    .await;
    let variants = generate_or_placeholders(
        providers.images.as_ref(),
        style,
        &name,
        VARIANT_COUNT,
        providers.timeout,
    )
    .await;

    let outcome = engine::create_companion(
        &state.pool,
        &CreateCompanion {
            account_id: auth.account_id,
            name,
            style: style.as_str().to_string(),
            avatar_url: variants.first().cloned(),
            agent_ref: Some(agent.agent_ref),
            scene_ref: Some(agent.scene_ref),
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: CreatedCompanion {
                companion: outcome.companion.into(),
                variants,
                generation: outcome.decision.label(),
                balance: outcome.balance,
            },
        }),
    ))
}

/// POST /api/v1/companions/generate-variants
///
/// Preview avatars for a style. Free; nothing is stored.
pub async fn generate_variants(
    _auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<GenerateVariantsRequest>,
) -> AppResult<Json<DataResponse<Variants>>> {
    input.validate()?;
    let style: Style = input.style.parse()?;
    let name = input.name.as_deref().map(str::trim).unwrap_or(PREVIEW_NAME);

    let variants = generate_or_placeholders(
        state.providers.images.as_ref(),
        style,
        name,
        VARIANT_COUNT,
        state.providers.timeout,
    )
    .await;

    Ok(Json(DataResponse {
        data: Variants { style, variants },
    }))
}

/// GET /api/v1/companions
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<CompanionView>>>> {
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
    let offset = clamp_offset(params.offset);
    let companions =
        CompanionRepo::list_by_account(&state.pool, auth.account_id, limit, offset).await?;
    Ok(Json(DataResponse {
        data: companions.into_iter().map(CompanionView::from).collect(),
    }))
}

/// GET /api/v1/companions/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<CompanionView>>> {
    let companion = find_owned(&state, id, auth.account_id).await?;
    Ok(Json(DataResponse {
        data: companion.into(),
    }))
}

/// PUT /api/v1/companions/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCompanionRequest>,
) -> AppResult<Json<DataResponse<CompanionView>>> {
    input.validate()?;
    let name = input.name.as_deref().map(normalize_name).transpose()?;
    let changes = UpdateCompanion {
        name,
        avatar_url: input.avatar_url,
    };
    apply_update(&state, id, auth.account_id, &changes).await
}

/// PUT /api/v1/companions/{id}/avatar
///
/// Select one of the generated variants as the avatar.
pub async fn select_avatar(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SelectAvatarRequest>,
) -> AppResult<Json<DataResponse<CompanionView>>> {
    input.validate()?;
    let changes = UpdateCompanion {
        name: None,
        avatar_url: Some(input.avatar_url),
    };
    apply_update(&state, id, auth.account_id, &changes).await
}

/// DELETE /api/v1/companions/{id}
///
/// Completions, the chat session and its messages go with it.
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !CompanionRepo::delete(&state.pool, id, auth.account_id).await? {
        return Err(companion_not_found(id));
    }
    tracing::info!(account_id = auth.account_id, companion_id = id, "Companion deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/companions/{id}/regenerate-avatar
///
/// Fresh variants for an existing companion. Free; the current avatar is
/// kept until one is selected.
pub async fn regenerate_avatar(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Variants>>> {
    let companion = find_owned(&state, id, auth.account_id).await?;
    let style: Style = companion
        .style
        .parse()
        .map_err(|_| AppError::InternalError(format!("Stored style '{}' is invalid", companion.style)))?;

    let variants = generate_or_placeholders(
        state.providers.images.as_ref(),
        style,
        &companion.name,
        VARIANT_COUNT,
        state.providers.timeout,
    )
    .await;

    Ok(Json(DataResponse {
        data: Variants { style, variants },
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn companion_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Companion",
        id,
    })
}

async fn find_owned(state: &AppState, id: DbId, account_id: DbId) -> AppResult<Companion> {
    CompanionRepo::find_owned(&state.pool, id, account_id)
        .await?
        .ok_or_else(|| companion_not_found(id))
}

async fn apply_update(
    state: &AppState,
    id: DbId,
    account_id: DbId,
    changes: &UpdateCompanion,
) -> AppResult<Json<DataResponse<CompanionView>>> {
    let companion = CompanionRepo::update(&state.pool, id, account_id, changes)
        .await?
        .ok_or_else(|| companion_not_found(id))?;
    Ok(Json(DataResponse {
        data: companion.into(),
    }))
}
