//! Account endpoints

use api_types::auth::{PasswordChange, SignUp, SignedUp};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::{IdentityGateway, LocalIdentity, Session};

use crate::{ServerError, server::ServerState};

/// Handle requests for creating a new account. Needs no credentials.
pub async fn sign_up(
    State(state): State<ServerState>,
    Json(payload): Json<SignUp>,
) -> Result<(StatusCode, Json<SignedUp>), ServerError> {
    let session = state
        .engine
        .register_user(&payload.email, &payload.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SignedUp {
            user_id: session.user_id,
            email: session.email,
        }),
    ))
}

/// Handle requests for changing the caller's password.
pub async fn change_password(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Json(payload): Json<PasswordChange>,
) -> Result<StatusCode, ServerError> {
    let gateway = IdentityGateway::new(
        LocalIdentity::with_session(state.engine.clone(), session),
        state.notifier.clone(),
    );
    gateway
        .change_password(
            &payload.current_password,
            &payload.new_password,
            &payload.confirm_password,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
