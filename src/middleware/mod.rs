/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth: credential 検証 + Visitor の付与
 * - http: request-id / access log
 */
pub mod auth;
pub mod http;
