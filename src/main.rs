use axum::http::HeaderValue;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod constants;
mod error;
mod models;
mod platform;
mod services;

use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "packmint_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!("Starting packmint backend");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("Platform schema: {}", config.platform_schema);
    if config.is_testnet() {
        tracing::warn!("Running against a non-production environment");
    }

    let platform = platform::from_config(&config)?;
    let app_state = api::AppState {
        config: config.clone(),
        platform,
    };

    let app = build_router(app_state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: api::AppState) -> Router {
    let cors = cors_from_config(&state.config);

    Router::new()
        .route("/", get(api::health::root))
        .route("/health", get(api::health::health_check))
        // Wallet verification flow
        .route("/start-auth", get(api::auth::start_auth))
        .route("/check-auth/{session_id}", get(api::auth::check_auth))
        // Payment-gated mint saga
        .route("/mint", post(api::mint::mint))
        // Catalog reporting
        .route("/balances/{wallet}", get(api::tokens::balances))
        .route("/supply", get(api::tokens::supply))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_from_config(config: &Config) -> CorsLayer {
    let raw = config.cors_allowed_origins.trim();
    if raw.is_empty() || raw == "*" {
        return CorsLayer::very_permissive();
    }

    let allowed: Vec<HeaderValue> = raw
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<HeaderValue>().ok())
        .collect();

    if allowed.is_empty() {
        tracing::warn!("No valid CORS origins parsed; falling back to permissive");
        return CorsLayer::very_permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::models::{TokenBalance, TokenSupply, TransactionState};
    use crate::platform::mock::MockPlatform;

    fn app(platform: Arc<MockPlatform>) -> Router {
        build_router(api::AppState {
            config: Config::for_tests(),
            platform,
        })
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn full_saga_from_start_auth_to_minted_pack() {
        let platform = Arc::new(MockPlatform::new("sess-1"));
        platform.script_tx_states(vec![
            TransactionState::Pending,
            TransactionState::Pending,
            TransactionState::Executed,
        ]);
        let app = app(platform.clone());

        // start-auth hands back the session handle and QR payload
        let response = app
            .clone()
            .oneshot(Request::builder().uri("/start-auth").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["id"], "sess-1");
        assert!(body["qrPayload"].as_str().unwrap().contains("sess-1"));

        // unresolved: null address, and repeat calls answer the same
        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .uri("/check-auth/sess-1")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(json_body(response).await["address"], serde_json::Value::Null);
        }

        // the user completes verification out-of-band
        platform.link_wallet("0xabc");
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/check-auth/sess-1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(json_body(response).await["address"], "0xabc");

        // mint: charge confirms after two pending polls, pack of 5 lands
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/mint")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"sessionId":"sess-1"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        let minted = body["mintedTokens"].as_array().unwrap();
        assert_eq!(minted.len(), 5);
        for token in minted {
            let id = token["id"].as_u64().unwrap();
            assert!((1..=3).contains(&id));
            assert!(token["name"].is_string());
        }

        let batches = platform.minted.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].1, "0xabc");
    }

    #[tokio::test]
    async fn unknown_session_maps_to_404() {
        let app = app(Arc::new(MockPlatform::new("sess-1")));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/check-auth/sess-unknown")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "SESSION_NOT_FOUND");
    }

    #[tokio::test]
    async fn mint_without_linked_wallet_is_a_caller_error() {
        let app = app(Arc::new(MockPlatform::new("sess-1")));
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/mint")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"sessionId":"sess-1"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "WALLET_NOT_LINKED");
    }

    #[tokio::test]
    async fn rejected_payment_never_mints() {
        let platform = Arc::new(MockPlatform::new("sess-1"));
        platform.link_wallet("0xabc");
        platform.script_tx_states(vec![
            TransactionState::Pending,
            TransactionState::Canceled,
        ]);
        let app = app(platform.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/mint")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"sessionId":"sess-1"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "PAYMENT_REJECTED");
        assert!(body["error"]["message"].as_str().unwrap().contains("CANCELED"));
        assert_eq!(platform.mint_count(), 0);
    }

    #[tokio::test]
    async fn payment_timeout_never_mints() {
        let platform = Arc::new(MockPlatform::new("sess-1"));
        platform.link_wallet("0xabc");
        // scripted to stay pending past the configured timeout
        let app = app(platform.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/mint")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"sessionId":"sess-1"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "PAYMENT_TIMEOUT");
        assert_eq!(platform.mint_count(), 0);
    }

    #[tokio::test]
    async fn balances_are_keyed_by_token_id() {
        let mut mock = MockPlatform::new("sess-1");
        mock.balances = vec![
            TokenBalance { token_id: 1, balance: 4 },
            TokenBalance { token_id: 3, balance: 1 },
        ];
        let app = app(Arc::new(mock));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/balances/0xabc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["1"], 4);
        assert_eq!(body["3"], 1);
        assert!(body.get("2").is_none());
    }

    #[tokio::test]
    async fn supply_reports_remaining_under_the_cap() {
        let mut mock = MockPlatform::new("sess-1");
        mock.supplies = vec![
            TokenSupply { token_id: 1, supply: 50 },
            TokenSupply { token_id: 2, supply: 30 },
            TokenSupply { token_id: 3, supply: 10 },
        ];
        let app = app(Arc::new(mock));

        let response = app
            .oneshot(Request::builder().uri("/supply").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(response).await;
        // 3 tokens * 50 cap = 150 total, 90 minted
        assert_eq!(body["remaining"], 60);
    }

    #[tokio::test]
    async fn supply_is_floored_at_zero() {
        let mut mock = MockPlatform::new("sess-1");
        mock.supplies = vec![TokenSupply { token_id: 1, supply: 500 }];
        let app = app(Arc::new(mock));

        let response = app
            .oneshot(Request::builder().uri("/supply").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(json_body(response).await["remaining"], 0);
    }

    #[tokio::test]
    async fn health_reports_the_active_schema() {
        let app = app(Arc::new(MockPlatform::new("sess-1")));
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["platform_schema"], "auth-session");
    }
}
