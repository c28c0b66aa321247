use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::Result,
    ledger::CanvasEvent,
    services::consumer::EventConsumer,
    ws::{RoomManager, types::RoomCanvasUpdate},
};

/// Forwards canvas events to the room of the canvas they concern.
pub struct EventRelay {
    rooms: Arc<RoomManager>,
}

impl EventRelay {
    pub fn new(rooms: Arc<RoomManager>) -> Self {
        Self { rooms }
    }
}

pub fn room_update(event: &CanvasEvent) -> Option<(u32, RoomCanvasUpdate)> {
    match event {
        CanvasEvent::Started { canvas_id } => Some((*canvas_id, RoomCanvasUpdate::Started)),
        CanvasEvent::Completed { canvas_id } => Some((*canvas_id, RoomCanvasUpdate::Completed)),
        CanvasEvent::ViewChanged(change) => Some((
            change.canvas_id,
            RoomCanvasUpdate::ViewChanged {
                coords: hex::encode(&change.coords),
                colours: hex::encode(&change.colours),
            },
        )),
        CanvasEvent::PixelChanged {
            address,
            block_height,
            pixel,
        } => Some((
            pixel.canvas_id,
            RoomCanvasUpdate::PixelChanged {
                address: address.to_hex(),
                block_height: *block_height,
                coords: pixel.coords,
                colour: pixel.colour,
            },
        )),
        _ => None,
    }
}

#[async_trait]
impl EventConsumer for EventRelay {
    fn name(&self) -> &'static str {
        "ws-relay"
    }

    async fn initialise(&self) -> Result<()> {
        Ok(())
    }

    async fn handle(&self, event: &CanvasEvent) -> Result<()> {
        if let Some((canvas_id, update)) = room_update(event) {
            self.rooms.broadcast(canvas_id, update).await;
        }
        Ok(())
    }

    async fn resync(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::events::ViewChange;

    #[tokio::test]
    async fn relays_view_changes_to_canvas_room() {
        let rooms = Arc::new(RoomManager::initialize(4));
        let room = rooms.get_or_create_room(5).await;
        let mut receiver = room.subscribe().unwrap();
        let relay = EventRelay::new(Arc::clone(&rooms));

        relay
            .handle(&CanvasEvent::ViewChanged(ViewChange {
                canvas_id: 5,
                coords: vec![0x00, 0x00, 0x03],
                colours: vec![0x07],
            }))
            .await
            .unwrap();

        assert_eq!(
            receiver.recv().await.unwrap(),
            RoomCanvasUpdate::ViewChanged {
                coords: "000003".into(),
                colours: "07".into(),
            }
        );
    }

    #[test]
    fn ignores_block_events() {
        let block = Arc::new(crate::ledger::Block::new(1, 0, vec![]));
        assert!(room_update(&CanvasEvent::NewBlock(block)).is_none());
    }
}
