//! Category API endpoints

use api_types::category::{CategoryListResponse, CategoryNew, CategoryView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{Category, EngineError, Session, SessionContext};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn view(category: Category) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
        description: category.description,
        image_url: category.image_url,
    }
}

pub async fn list(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
) -> Result<Json<CategoryListResponse>, ServerError> {
    let ctx = SessionContext::from(session);
    let categories = state.engine.list_categories(&ctx).await?;

    Ok(Json(CategoryListResponse {
        categories: categories.into_iter().map(view).collect(),
    }))
}

pub async fn create(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    let ctx = SessionContext::from(session);
    let category = state
        .engine
        .add_category(
            &ctx,
            &payload.name,
            payload.description.as_deref(),
            payload.image_url.as_deref(),
        )
        .await?
        .ok_or(EngineError::Unauthenticated)?;

    Ok((StatusCode::CREATED, Json(view(category))))
}

pub async fn update(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryNew>,
) -> Result<Json<CategoryView>, ServerError> {
    let ctx = SessionContext::from(session);
    let category = state
        .engine
        .update_category(
            &ctx,
            id,
            &payload.name,
            payload.description.as_deref(),
            payload.image_url.as_deref(),
        )
        .await?
        .ok_or(EngineError::Unauthenticated)?;

    Ok(Json(view(category)))
}

pub async fn delete(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    let ctx = SessionContext::from(session);
    state.engine.delete_category(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
