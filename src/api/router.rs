use std::net::SocketAddr;

use axum::{
    Router,
    body::Body,
    extract::{ConnectInfo, Request, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::Value;

use crate::{
    AppState,
    api::{
        dispatcher::dispatch_method,
        types::{JsonRpcRequest, JsonRpcResponse},
    },
    error::{AppError, JsonRpcErrorResponse},
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(rpc_handler))
}

async fn rpc_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();

    let client_key = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    const MAX_BODY_SIZE: usize = 1024 * 1024;

    let body_bytes = match axum::body::to_bytes(body, MAX_BODY_SIZE).await {
        Ok(b) => b,
        Err(e) => {
            let msg = if e.to_string().contains("length limit") {
                "Request body too large (max 1MB)"
            } else {
                "Parse error"
            };
            return build_json_response(JsonRpcErrorResponse::from_error(
                &AppError::InvalidParams(msg.into()),
                None,
            ));
        }
    };

    let request: JsonRpcRequest = match serde_json::from_slice(&body_bytes) {
        Ok(req) => req,
        Err(_) => {
            return build_json_response(JsonRpcErrorResponse::from_error(
                &AppError::InvalidParams("Parse error".into()),
                None,
            ));
        }
    };

    if request.jsonrpc != "2.0" {
        return build_json_response(JsonRpcErrorResponse::from_error(
            &AppError::InvalidParams("Invalid JSON-RPC version".into()),
            request.id,
        ));
    }

    match dispatch_method(&request.method, request.params, state, &client_key).await {
        Ok(value) => match serde_json::to_value(JsonRpcResponse::new(value, request.id)) {
            Ok(response_value) => build_json_response(response_value),
            Err(e) => AppError::from(e).into_response(),
        },
        Err(err) => {
            tracing::debug!(method = %request.method, error = %err, "RPC call failed");
            build_json_response(JsonRpcErrorResponse::from_error(&err, request.id))
        }
    }
}

fn build_json_response(value: Value) -> Response {
    match serde_json::to_string(&value) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        Err(e) => AppError::from(e).into_response(),
    }
}
