/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - 認証が必要な範囲は app 側で middleware::auth::access::apply を掛ける
 */
use axum::{Router, routing::get};

use crate::api::v1::handlers::visitor::current_visitor;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/visitor", get(current_visitor))
}
