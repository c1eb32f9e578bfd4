pub mod access;
pub mod cached;
pub mod error;
pub mod keys;
pub mod locator;
pub mod pipeline;
pub mod token;
pub mod validator;
pub mod visitor;

use url::Url;

pub use access::{AccessLoader, AccessProfile, HttpAccessLoader};
pub use error::AuthError;
pub use keys::{HttpKeyResolver, KeyResolver};
pub use locator::{TokenLocator, TokenSource};
pub use pipeline::{AuthPipeline, AuthStage};
pub use token::{Claims, TokenVerifier};
pub use validator::{AccessProfileValidator, ClaimsValidator};
pub use visitor::{AuthScope, Credential, Visitor};

/// `base` with `segments` appended as percent-encoded path segments.
///
/// Returns `None` for URLs that cannot carry a path (e.g. `mailto:`).
pub(crate) fn service_url(base: &Url, segments: &[&str]) -> Option<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .extend(segments);
    Some(url)
}
