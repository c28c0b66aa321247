//! Ledger records and their field-numbered binary encodings.
//!
//! Tags and integer widths are part of the persisted format and must not change.

use prost::Message;

use crate::{
    codec::Palette,
    error::{AppError, Result},
    ledger::address::Address,
};

#[derive(Clone, PartialEq, Message)]
pub struct CanvasRecord {
    #[prost(bytes = "vec", tag = "1")]
    pub owner: Vec<u8>,
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
    #[prost(string, tag = "10")]
    pub label: String,
    #[prost(uint32, tag = "11")]
    pub state: u32,
}

#[derive(Clone, PartialEq, Message)]
pub struct DrawCooldownRecord {
    #[prost(uint32, tag = "1")]
    pub last_block_height: u32,
}

#[derive(Clone, PartialEq, Message)]
pub struct PixelRecord {
    #[prost(bytes = "vec", tag = "1")]
    pub owner: Vec<u8>,
    #[prost(uint32, tag = "2")]
    pub colour: u32,
}

#[derive(Clone, PartialEq, Message)]
pub struct CanvasIdSetRecord {
    #[prost(uint32, repeated, tag = "1")]
    pub canvas_ids: Vec<u32>,
}

#[derive(Clone, PartialEq, Message)]
pub struct AddressRecord {
    #[prost(bytes = "vec", tag = "1")]
    pub address: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct BalanceRecord {
    #[prost(uint64, tag = "1")]
    pub amount: u64,
}

#[derive(Clone, PartialEq, Message)]
pub struct CounterRecord {
    #[prost(uint64, tag = "1")]
    pub value: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanvasState {
    Pending = 0,
    Active = 1,
    Complete = 2,
}

impl CanvasState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Complete => "complete",
        }
    }
}

impl TryFrom<u32> for CanvasState {
    type Error = AppError;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            0 => Ok(Self::Pending),
            1 => Ok(Self::Active),
            2 => Ok(Self::Complete),
            other => Err(AppError::Inconsistency(format!(
                "unknown canvas state {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    pub owner: Address,
    pub cost_per_pixel: u64,
    pub start_block_height: u64,
    pub end_block_height: u64,
    pub width: u32,
    pub height: u32,
    pub time_between_draws: u32,
    pub colour_palette: Palette,
    pub max_pixels_per_transaction: u32,
    pub label: String,
    pub state: CanvasState,
}

impl Canvas {
    pub fn capacity(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    pub fn encode(&self) -> Vec<u8> {
        CanvasRecord::from(self).encode_to_vec()
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        CanvasRecord::decode(bytes)?.try_into()
    }
}

impl From<&Canvas> for CanvasRecord {
    fn from(canvas: &Canvas) -> Self {
        Self {
            owner: canvas.owner.as_bytes().to_vec(),
            cost_per_pixel: canvas.cost_per_pixel,
            start_block_height: canvas.start_block_height,
            end_block_height: canvas.end_block_height,
            width: canvas.width,
            height: canvas.height,
            time_between_draws: canvas.time_between_draws,
            colour_palette: canvas.colour_palette.to_bytes(),
            max_pixels_per_transaction: canvas.max_pixels_per_transaction,
            label: canvas.label.clone(),
            state: canvas.state as u32,
        }
    }
}

impl TryFrom<CanvasRecord> for Canvas {
    type Error = AppError;

    fn try_from(record: CanvasRecord) -> Result<Self> {
        Ok(Self {
            owner: Address::from_slice(&record.owner)?,
            cost_per_pixel: record.cost_per_pixel,
            start_block_height: record.start_block_height,
            end_block_height: record.end_block_height,
            width: record.width,
            height: record.height,
            time_between_draws: record.time_between_draws,
            colour_palette: Palette::from_bytes(&record.colour_palette)?,
            max_pixels_per_transaction: record.max_pixels_per_transaction,
            label: record.label,
            state: CanvasState::try_from(record.state)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::palette::PALETTE_BYTES;

    fn sample_canvas() -> Canvas {
        Canvas {
            owner: Address::new([7; 20]),
            cost_per_pixel: 250,
            start_block_height: 10,
            end_block_height: 110,
            width: 64,
            height: 32,
            time_between_draws: 5,
            colour_palette: Palette::from_bytes(&[9; PALETTE_BYTES]).unwrap(),
            max_pixels_per_transaction: 16,
            label: "harbour".to_string(),
            state: CanvasState::Active,
        }
    }

    #[test]
    fn canvas_survives_binary_encoding() {
        let canvas = sample_canvas();
        assert_eq!(Canvas::decode(&canvas.encode()).unwrap(), canvas);
    }

    #[test]
    fn canvas_fields_use_fixed_tags() {
        let bytes = sample_canvas().encode();
        // field 1, length-delimited, 20 bytes
        assert_eq!(&bytes[..2], &[0x0A, 20]);
        // field 2, varint
        assert_eq!(bytes[22], 0x10);
    }

    #[test]
    fn unknown_state_is_an_inconsistency() {
        let mut record = CanvasRecord::from(&sample_canvas());
        record.state = 7;
        assert!(matches!(
            Canvas::try_from(record),
            Err(AppError::Inconsistency(_))
        ));
    }

    #[test]
    fn cooldown_record_is_a_single_varint() {
        let encoded = DrawCooldownRecord {
            last_block_height: 300,
        }
        .encode_to_vec();
        assert_eq!(encoded, vec![0x08, 0xAC, 0x02]);
    }
}
