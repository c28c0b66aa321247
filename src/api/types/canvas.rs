use serde::{Deserialize, Serialize};

use crate::{
    AppState,
    ledger::entities::Canvas,
    services::canvas::query::PixelOwnership,
};

#[derive(Deserialize)]
pub struct GetCanvasParams {
    pub canvas_id: u32,

    #[serde(skip)]
    pub state: Option<AppState>,
}

#[derive(Deserialize)]
pub struct ListCanvasesParams {
    #[serde(skip)]
    pub state: Option<AppState>,
}

#[derive(Deserialize)]
pub struct GetPixelParams {
    pub canvas_id: u32,
    pub x: u32,
    pub y: u32,

    #[serde(skip)]
    pub state: Option<AppState>,
}

#[derive(Debug, Serialize)]
pub struct CanvasResponse {
    pub owner: String,
    pub cost_per_pixel: u64,
    pub start_block_height: u64,
    pub end_block_height: u64,
    pub width: u32,
    pub height: u32,
    pub time_between_draws: u32,
    pub colour_palette: String,
    pub max_pixels_per_transaction: u32,
    pub label: String,
    pub state: &'static str,
}

impl From<&Canvas> for CanvasResponse {
    fn from(canvas: &Canvas) -> Self {
        Self {
            owner: canvas.owner.to_hex(),
            cost_per_pixel: canvas.cost_per_pixel,
            start_block_height: canvas.start_block_height,
            end_block_height: canvas.end_block_height,
            width: canvas.width,
            height: canvas.height,
            time_between_draws: canvas.time_between_draws,
            colour_palette: hex::encode(canvas.colour_palette.to_bytes()),
            max_pixels_per_transaction: canvas.max_pixels_per_transaction,
            label: canvas.label.clone(),
            state: canvas.state.as_str(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PixelResponse {
    pub owner: String,
    pub colour: u32,
}

impl From<PixelOwnership> for PixelResponse {
    fn from(pixel: PixelOwnership) -> Self {
        Self {
            owner: pixel.owner.to_hex(),
            colour: pixel.colour,
        }
    }
}
