//! axum router for the gateway process.
//!
//! | Route                      | Method | Body                          |
//! |----------------------------|--------|-------------------------------|
//! | `/chain/invoke`            | POST   | [`InvokeRequest`] → [`InvokeResponse`] |
//! | `/chain/batch`             | POST   | [`BatchRequest`] → [`BatchResponse`]   |
//! | `/chain/input_schema`      | GET    | JSON schema                   |
//! | `/chain/output_schema`     | GET    | JSON schema                   |
//! | `/health`                  | GET    | `{ "status": "ok" }`          |
//!
//! Provider failures are answered with `502` and an [`ErrorBody`]; they never
//! escape as a panic or a dropped connection.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tokio::net::TcpListener;

use super::service::{Gateway, GatewayError};
use super::wire::{
    input_schema, output_schema, BatchRequest, BatchResponse, ErrorBody, InvokeRequest,
    InvokeResponse,
};

/// Shared, immutable handler state.
#[derive(Clone)]
struct GatewayState {
    gateway: Arc<dyn Gateway>,
}

/// Build the gateway router around any [`Gateway`] implementation.
pub fn router(gateway: Arc<dyn Gateway>) -> Router {
    Router::new()
        .route("/chain/invoke", post(invoke_handler))
        .route("/chain/batch", post(batch_handler))
        .route("/chain/input_schema", get(input_schema_handler))
        .route("/chain/output_schema", get(output_schema_handler))
        .route("/health", get(health_handler))
        .with_state(GatewayState { gateway })
}

/// Bind `addr` and serve `app` until Ctrl-C.
pub async fn serve(addr: &str, app: Router) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    log::info!("gateway listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            log::info!("gateway shutting down");
        })
        .await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn invoke_handler(
    State(state): State<GatewayState>,
    Json(req): Json<InvokeRequest>,
) -> Response {
    match state.gateway.invoke(&req.input.text).await {
        Ok(output) => Json(InvokeResponse { output }).into_response(),
        Err(e) => error_response(e),
    }
}

async fn batch_handler(
    State(state): State<GatewayState>,
    Json(req): Json<BatchRequest>,
) -> Response {
    let mut output = Vec::with_capacity(req.inputs.len());
    for input in &req.inputs {
        match state.gateway.invoke(&input.text).await {
            Ok(reply) => output.push(reply),
            Err(e) => return error_response(e),
        }
    }
    Json(BatchResponse { output }).into_response()
}

async fn input_schema_handler() -> Json<serde_json::Value> {
    Json(input_schema())
}

async fn output_schema_handler() -> Json<serde_json::Value> {
    Json(output_schema())
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

fn error_response(e: GatewayError) -> Response {
    log::warn!("gateway: request failed: {e}");
    (
        StatusCode::BAD_GATEWAY,
        Json(ErrorBody {
            detail: e.to_string(),
        }),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt;

    struct Echo;

    #[async_trait]
    impl Gateway for Echo {
        async fn invoke(&self, text: &str) -> Result<String, GatewayError> {
            Ok(format!("echo: {text}"))
        }
    }

    struct Down;

    #[async_trait]
    impl Gateway for Down {
        async fn invoke(&self, _text: &str) -> Result<String, GatewayError> {
            Err(GatewayError::Unreachable("model offline".into()))
        }
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn invoke_returns_output() {
        let app = router(Arc::new(Echo));
        let resp = app
            .oneshot(post_json(
                "/chain/invoke",
                r#"{"input":{"text":"Hello"},"config":{},"kwargs":{}}"#,
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, serde_json::json!({ "output": "echo: Hello" }));
    }

    #[tokio::test]
    async fn invoke_accepts_bare_input() {
        let app = router(Arc::new(Echo));
        let resp = app
            .oneshot(post_json("/chain/invoke", r#"{"input":{"text":"hi"}}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn provider_failure_is_502_without_output() {
        let app = router(Arc::new(Down));
        let resp = app
            .oneshot(post_json("/chain/invoke", r#"{"input":{"text":"Hello"}}"#))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(resp).await;
        assert!(json.get("output").is_none());
        assert!(json["detail"].as_str().unwrap().contains("model offline"));
    }

    #[tokio::test]
    async fn malformed_request_is_client_error() {
        let app = router(Arc::new(Echo));
        let resp = app
            .oneshot(post_json("/chain/invoke", r#"{"text":"no envelope"}"#))
            .await
            .unwrap();
        assert!(resp.status().is_client_error());
    }

    #[tokio::test]
    async fn batch_preserves_order() {
        let app = router(Arc::new(Echo));
        let resp = app
            .oneshot(post_json(
                "/chain/batch",
                r#"{"inputs":[{"text":"a"},{"text":"b"}]}"#,
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            body_json(resp).await,
            serde_json::json!({ "output": ["echo: a", "echo: b"] })
        );
    }

    #[tokio::test]
    async fn batch_failure_is_502() {
        let app = router(Arc::new(Down));
        let resp = app
            .oneshot(post_json("/chain/batch", r#"{"inputs":[{"text":"a"}]}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn schemas_and_health_are_served() {
        let app = router(Arc::new(Echo));

        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/chain/input_schema")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(body_json(resp).await["properties"]["text"]["type"], "string");

        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/chain/output_schema")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(body_json(resp).await["type"], "string");

        let resp = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_json(resp).await["status"], "ok");
    }
}
