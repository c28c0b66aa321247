use prost::Message;

use crate::error::{AppError, Result};

pub const CANVAS_MODULE_ID: u32 = 1000;

pub const CREATE_CANVAS_ASSET_ID: u32 = 0;
pub const CHANGE_CANVAS_ASSET_ID: u32 = 1;
pub const DRAW_PIXEL_ASSET_ID: u32 = 4;
pub const DRAW_PIXELS_ASSET_ID: u32 = 5;

#[derive(Clone, PartialEq, Message)]
pub struct CreateCanvasAsset {
    #[prost(uint32, tag = "1")]
    pub canvas_id: u32,
    #[prost(uint64, tag = "2")]
    pub cost_per_pixel: u64,
    #[prost(uint64, tag = "3")]
    pub start_block_height: u64,
    #[prost(uint64, tag = "4")]
    pub end_block_height: u64,
    #[prost(uint32, tag = "5")]
    pub width: u32,
    #[prost(uint32, tag = "6")]
    pub height: u32,
    #[prost(uint32, tag = "7")]
    pub time_between_draws: u32,
    #[prost(bytes = "vec", tag = "8")]
    pub colour_palette: Vec<u8>,
    #[prost(uint32, tag = "9")]
    pub max_pixels_per_transaction: u32,
    #[prost(string, optional, tag = "10")]
    pub label: Option<String>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ChangeCanvasAsset {
    #[prost(uint32, tag = "1")]
    pub canvas_id: u32,
    #[prost(uint64, optional, tag = "2")]
    pub cost_per_pixel: Option<u64>,
    #[prost(uint64, optional, tag = "3")]
    pub start_block_height: Option<u64>,
    #[prost(uint64, optional, tag = "4")]
    pub end_block_height: Option<u64>,
    #[prost(uint32, optional, tag = "5")]
    pub width: Option<u32>,
    #[prost(uint32, optional, tag = "6")]
    pub height: Option<u32>,
    #[prost(uint32, optional, tag = "7")]
    pub time_between_draws: Option<u32>,
    #[prost(bytes = "vec", optional, tag = "8")]
    pub colour_palette: Option<Vec<u8>>,
    #[prost(uint32, optional, tag = "9")]
    pub max_pixels_per_transaction: Option<u32>,
    #[prost(string, optional, tag = "10")]
    pub label: Option<String>,
}

/// One pixel addressed by packed coordinate with a 24-bit RGB colour.
#[derive(Clone, PartialEq, Message)]
pub struct DrawPixelAsset {
    #[prost(uint32, tag = "1")]
    pub canvas_id: u32,
    #[prost(uint32, tag = "2")]
    pub coords: u32,
    #[prost(uint32, tag = "3")]
    pub colour: u32,
}

/// A batch of 24-bit coordinates paired with 4-bit palette indices.
#[derive(Clone, PartialEq, Message)]
pub struct DrawPixelsAsset {
    #[prost(uint32, tag = "1")]
    pub canvas_id: u32,
    #[prost(bytes = "vec", tag = "2")]
    pub coords: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub colours: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransactionPayload {
    CreateCanvas(CreateCanvasAsset),
    ChangeCanvas(ChangeCanvasAsset),
    DrawPixel(DrawPixelAsset),
    DrawPixels(DrawPixelsAsset),
}

impl TransactionPayload {
    pub fn module_id(&self) -> u32 {
        CANVAS_MODULE_ID
    }

    pub fn module_name(&self) -> &'static str {
        "canvas"
    }

    pub fn asset_id(&self) -> u32 {
        match self {
            Self::CreateCanvas(_) => CREATE_CANVAS_ASSET_ID,
            Self::ChangeCanvas(_) => CHANGE_CANVAS_ASSET_ID,
            Self::DrawPixel(_) => DRAW_PIXEL_ASSET_ID,
            Self::DrawPixels(_) => DRAW_PIXELS_ASSET_ID,
        }
    }

    pub fn asset_name(&self) -> &'static str {
        match self {
            Self::CreateCanvas(_) => "createCanvas",
            Self::ChangeCanvas(_) => "changeCanvas",
            Self::DrawPixel(_) => "drawPixel",
            Self::DrawPixels(_) => "drawPixels",
        }
    }

    pub fn canvas_id(&self) -> u32 {
        match self {
            Self::CreateCanvas(asset) => asset.canvas_id,
            Self::ChangeCanvas(asset) => asset.canvas_id,
            Self::DrawPixel(asset) => asset.canvas_id,
            Self::DrawPixels(asset) => asset.canvas_id,
        }
    }

    pub fn encode_asset(&self) -> Vec<u8> {
        match self {
            Self::CreateCanvas(asset) => asset.encode_to_vec(),
            Self::ChangeCanvas(asset) => asset.encode_to_vec(),
            Self::DrawPixel(asset) => asset.encode_to_vec(),
            Self::DrawPixels(asset) => asset.encode_to_vec(),
        }
    }

    pub fn decode(module_id: u32, asset_id: u32, asset: &[u8]) -> Result<Self> {
        if module_id != CANVAS_MODULE_ID {
            return Err(AppError::InvalidParams(format!(
                "Unknown module {module_id}"
            )));
        }

        match asset_id {
            CREATE_CANVAS_ASSET_ID => Ok(Self::CreateCanvas(CreateCanvasAsset::decode(asset)?)),
            CHANGE_CANVAS_ASSET_ID => Ok(Self::ChangeCanvas(ChangeCanvasAsset::decode(asset)?)),
            DRAW_PIXEL_ASSET_ID => Ok(Self::DrawPixel(DrawPixelAsset::decode(asset)?)),
            DRAW_PIXELS_ASSET_ID => Ok(Self::DrawPixels(DrawPixelsAsset::decode(asset)?)),
            other => Err(AppError::InvalidParams(format!("Unknown asset {other}"))),
        }
    }
}
