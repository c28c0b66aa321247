use crate::{
    api::{methods::app_state, types::GetViewParams},
    error::Result,
};

/// Base64 of the packed bitmap, or `null` when the canvas has no live view.
pub async fn get_view(params: GetViewParams) -> Result<Option<String>> {
    let app_state = app_state(params.state)?;
    Ok(app_state.views.get_view(params.canvas_id).await)
}

pub async fn get_pixels(params: GetViewParams) -> Result<Option<Vec<Vec<u8>>>> {
    let app_state = app_state(params.state)?;
    Ok(app_state.views.get_pixels(params.canvas_id).await)
}
