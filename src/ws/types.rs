use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum RoomCanvasUpdate {
    /// Hex of the 24-bit coordinates and 4-bit colours that changed.
    ViewChanged { coords: String, colours: String },
    PixelChanged {
        address: String,
        block_height: u64,
        coords: u32,
        colour: u32,
    },
    Started,
    Completed,
    ConnectionCount { count: usize },
}

#[derive(Deserialize)]
pub struct WsQuery {
    pub canvas_id: u32,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    Ping,
}
