use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::Visitor;
use crate::state::AppState;

/// Handler で Visitor を受け取るための extractor
/// auth middleware が Visitor を request.extensions() に insert 済みである前提
/// 見つからない場合は配線ミスなので 500 を返す
pub struct VisitorExtractor(pub Visitor);

impl FromRequestParts<AppState> for VisitorExtractor
where
    AppState: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Visitor>()
            .cloned()
            .map(VisitorExtractor)
            .ok_or_else(|| {
                tracing::error!("visitor requested on a route without the auth layer");
                AppError::internal("Internal Server Error: visitor not found")
            })
    }
}
