/*!
 * Visitor extractor
 *
 * Responsibility:
 * - 認証済みリクエストの Visitor を handler に提供する
 * - Visitor 自体の型は services::auth::visitor が持つ
 */

mod core;

pub use core::VisitorExtractor;
