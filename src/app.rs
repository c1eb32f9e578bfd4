/*
 * Responsibility
 * - Config読み込み → 依存生成 → Router 組み立て
 * - Middleware の適用 (Request-Id / Trace / auth)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::Result;
use axum::{Router, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::api::v1::handlers::health;
use crate::config::Config;
use crate::middleware;
use crate::services::auth::{
    AccessLoader, AccessProfileValidator, AuthPipeline, HttpAccessLoader, HttpKeyResolver,
    KeyResolver, TokenLocator, TokenVerifier,
    cached::{CachedAccessLoader, CachedKeyResolver},
};
use crate::state::AppState;

fn init_tracing() {
    // RUST_LOG があればそちらを優先
    // ex: RUST_LOG=info,iam_gate=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // development: プロセスごと落として即気付けるようにする
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting iam-gate in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// 鍵サービス / アクセスサービスのクライアントを組み立てて AppState に詰める
pub fn build_state(config: &Config) -> Result<AppState> {
    let http = reqwest::Client::builder().build()?;

    let keys = HttpKeyResolver::new(config.keys_service_url.clone(), http.clone());
    let keys: Arc<dyn KeyResolver> = match config.key_cache_ttl {
        Some(ttl) => {
            tracing::info!(ttl_seconds = ttl.as_secs(), "public key cache enabled");
            Arc::new(CachedKeyResolver::new(keys, ttl))
        }
        None => Arc::new(keys),
    };

    let access = HttpAccessLoader::new(config.access_service_url.clone(), http);
    let access: Arc<dyn AccessLoader> = match config.access_cache_ttl {
        Some(ttl) => {
            tracing::info!(ttl_seconds = ttl.as_secs(), "access profile cache enabled");
            Arc::new(CachedAccessLoader::new(access, ttl))
        }
        None => Arc::new(access),
    };

    let pipeline = AuthPipeline::new(
        TokenLocator::default(),
        TokenVerifier::new(keys, config.token_leeway_seconds),
        Arc::new(AccessProfileValidator::new(access)),
    );

    Ok(AppState::new(Arc::new(pipeline)))
}

pub fn build_router(state: AppState) -> Router {
    let v1 = middleware::auth::access::apply(api::v1::routes(), state.clone());

    let app = Router::new()
        .route("/ping", get(health::ping))
        .nest("/api/v1", v1)
        .with_state(state);

    middleware::http::apply(app)
}
