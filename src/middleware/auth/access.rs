//! credential 探索 → 署名検証 → claims policy → Visitor を extensions に入れる
//!
//! Two layers, run in this order:
//! - `find_token`: locates the credential and stores it as `Credential`
//! - `verify_token`: verifies it, runs the claims policy and stores `Visitor`
//!
//! Any stage failure answers with the failure envelope and the request never
//! reaches the handler.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;
use crate::services::auth::{AuthError, AuthScope, AuthStage, Credential};
use crate::state::AppState;

/// 認証を掛けたい router に middleware を適用する。
///
/// 例：
/// ```ignore
/// let v1 = api::v1::routes();
/// let v1 = middleware::auth::access::apply(v1, state.clone());
/// app = app.nest("/api/v1", v1);
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // 後から追加した layer が先に実行される
    router
        .layer(middleware::from_fn_with_state(state.clone(), verify_token))
        .layer(middleware::from_fn_with_state(state, find_token))
}

pub async fn find_token(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let credential = match state.auth.locate(req.headers(), req.uri()) {
        Ok(credential) => credential,
        Err(err) => {
            tracing::warn!(stage = %AuthStage::NoToken, error = %err, "authentication rejected");
            return Err(err.into());
        }
    };

    // middleware → middleware への受け渡し
    req.extensions_mut().insert(credential);

    Ok(next.run(req).await)
}

pub async fn verify_token(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let Some(credential) = req.extensions().get::<Credential>().cloned() else {
        tracing::error!("verify_token ran without find_token");
        return Err(AuthError::InternalTokenMissing.into());
    };

    let claims = match state.auth.verify(&credential).await {
        Ok(claims) => claims,
        Err(err) => {
            tracing::warn!(stage = %AuthStage::TokenFound, error = %err, "authentication rejected");
            return Err(err.into());
        }
    };

    let scope = match state
        .auth
        .validate(&claims, AuthScope::with_credential(credential))
        .await
    {
        Ok(scope) => scope,
        Err(err) => {
            tracing::warn!(stage = %AuthStage::Verified, error = %err, "authentication rejected");
            return Err(err.into());
        }
    };

    match scope.into_visitor() {
        Some(visitor) => {
            tracing::debug!(
                stage = %AuthStage::VisitorAttached,
                user_id = visitor.user_id(),
                "request authenticated"
            );
            // middleware → extractor への受け渡し
            req.extensions_mut().insert(visitor);
        }
        None => {
            tracing::debug!(stage = %AuthStage::ClaimsValidated, "claims accepted without visitor");
        }
    }

    Ok(next.run(req).await)
}
