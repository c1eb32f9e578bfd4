/*
 * Responsibility
 * - GET /ping (疎通用, 認証なし)
 */
pub async fn ping() -> &'static str {
    "."
}
