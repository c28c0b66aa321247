use serde_json::Value;

use crate::{
    AppState,
    api::{
        methods::{
            canvas::{
                get_active_canvases, get_canvas, get_complete_canvases, get_pending_canvases,
                get_pixel,
            },
            chain::{get_balance, get_tip, submit_transaction},
            statistics::get_total_transactions,
            view::{get_pixels, get_view},
        },
        types::{
            GetBalanceParams, GetCanvasParams, GetPixelParams, GetTipParams,
            GetTotalTransactionsParams, GetViewParams, ListCanvasesParams,
            SubmitTransactionParams,
        },
    },
    error::AppError,
};

macro_rules! dispatch {
    ($param_type:ty, $handler:path, $params:expr, $state:expr) => {{
        let mut p: $param_type =
            serde_json::from_value($params).map_err(|e| AppError::InvalidParams(e.to_string()))?;

        p.state = Some($state);

        let result = $handler(p).await?;
        serde_json::to_value(result).map_err(AppError::from)
    }};
}

async fn dispatch_canvas(method: &str, params: Value, state: AppState) -> Result<Value, AppError> {
    match method {
        "canvas.getCanvas" => dispatch!(GetCanvasParams, get_canvas, params, state),
        "canvas.getPendingCanvases" => {
            dispatch!(ListCanvasesParams, get_pending_canvases, params, state)
        }
        "canvas.getActiveCanvases" => {
            dispatch!(ListCanvasesParams, get_active_canvases, params, state)
        }
        "canvas.getCompleteCanvases" => {
            dispatch!(ListCanvasesParams, get_complete_canvases, params, state)
        }
        "canvas.getPixel" => dispatch!(GetPixelParams, get_pixel, params, state),
        _ => Err(AppError::MethodNotFound(method.to_string())),
    }
}

async fn dispatch_view(method: &str, params: Value, state: AppState) -> Result<Value, AppError> {
    match method {
        "view.getView" => dispatch!(GetViewParams, get_view, params, state),
        "view.getPixels" => dispatch!(GetViewParams, get_pixels, params, state),
        _ => Err(AppError::MethodNotFound(method.to_string())),
    }
}

async fn dispatch_chain(method: &str, params: Value, state: AppState) -> Result<Value, AppError> {
    match method {
        "chain.getTip" => dispatch!(GetTipParams, get_tip, params, state),
        "chain.getBalance" => dispatch!(GetBalanceParams, get_balance, params, state),
        "chain.submitTransaction" => {
            dispatch!(SubmitTransactionParams, submit_transaction, params, state)
        }
        _ => Err(AppError::MethodNotFound(method.to_string())),
    }
}

async fn dispatch_statistics(
    method: &str,
    params: Value,
    state: AppState,
) -> Result<Value, AppError> {
    match method {
        "statistics.getTotalTransactions" => dispatch!(
            GetTotalTransactionsParams,
            get_total_transactions,
            params,
            state
        ),
        _ => Err(AppError::MethodNotFound(method.to_string())),
    }
}

pub async fn dispatch_method(
    method: &str,
    params: Value,
    state: AppState,
    client_key: &str,
) -> Result<Value, AppError> {
    let limiter = match method {
        "chain.submitTransaction" => Some(&state.rate_limiters.submit),
        _ => None,
    };

    if let Some(limiter) = limiter {
        limiter.enforce(client_key).await?;
    }

    // Methods without arguments accept omitted params.
    let params = match params {
        Value::Null => Value::Object(Default::default()),
        params => params,
    };

    if method.starts_with("canvas.") {
        return dispatch_canvas(method, params, state).await;
    }
    if method.starts_with("view.") {
        return dispatch_view(method, params, state).await;
    }
    if method.starts_with("chain.") {
        return dispatch_chain(method, params, state).await;
    }
    if method.starts_with("statistics.") {
        return dispatch_statistics(method, params, state).await;
    }
    Err(AppError::MethodNotFound(method.to_string()))
}
