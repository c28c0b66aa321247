use crate::{
    api::{
        methods::app_state,
        types::{CanvasResponse, GetCanvasParams, GetPixelParams, ListCanvasesParams, PixelResponse},
    },
    error::Result,
    services::canvas::query,
};

pub async fn get_canvas(params: GetCanvasParams) -> Result<Option<CanvasResponse>> {
    let app_state = app_state(params.state)?;
    let canvas_id = params.canvas_id;

    if let Some(canvas) = app_state.cache.local.get_canvas(canvas_id).await {
        return Ok(Some(CanvasResponse::from(canvas.as_ref())));
    }

    match query::get_canvas(app_state.chain.store().as_ref(), canvas_id).await? {
        Some(canvas) => {
            let canvas = app_state.cache.local.set_canvas(canvas_id, canvas).await;
            Ok(Some(CanvasResponse::from(canvas.as_ref())))
        }
        None => Ok(None),
    }
}

pub async fn get_pending_canvases(params: ListCanvasesParams) -> Result<Vec<u32>> {
    let app_state = app_state(params.state)?;
    query::get_pending_canvases(app_state.chain.store().as_ref()).await
}

pub async fn get_active_canvases(params: ListCanvasesParams) -> Result<Vec<u32>> {
    let app_state = app_state(params.state)?;
    query::get_active_canvases(app_state.chain.store().as_ref()).await
}

pub async fn get_complete_canvases(params: ListCanvasesParams) -> Result<Vec<u32>> {
    let app_state = app_state(params.state)?;
    query::get_complete_canvases(app_state.chain.store().as_ref()).await
}

pub async fn get_pixel(params: GetPixelParams) -> Result<Option<PixelResponse>> {
    let app_state = app_state(params.state)?;

    Ok(query::get_pixel(
        app_state.chain.store().as_ref(),
        params.canvas_id,
        params.x,
        params.y,
    )
    .await?
    .map(PixelResponse::from))
}
