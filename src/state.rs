/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - ex: auth: AuthPipeline (locator / verifier / claims policy)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 * - リクエストを跨いで変更される値は持たない (読み取り専用の設定のみ)
 */
use std::sync::Arc;

use crate::services::auth::AuthPipeline;

#[derive(Clone, Debug)]
pub struct AppState {
    pub auth: Arc<AuthPipeline>,
}

impl AppState {
    pub fn new(auth: Arc<AuthPipeline>) -> Self {
        Self { auth }
    }
}
