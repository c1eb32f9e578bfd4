/*
 * Responsibility
 * - GET /visitor: 認証済みの Visitor をそのまま返す
 * - credential 自体はレスポンスに含めない
 */
use axum::Json;

use crate::api::v1::extractors::VisitorExtractor;
use crate::response::Envelope;
use crate::services::auth::Visitor;

pub async fn current_visitor(VisitorExtractor(visitor): VisitorExtractor) -> Json<Envelope<Visitor>> {
    Json(Envelope::success(visitor))
}
