use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::broadcast::{self, Receiver, Sender};

use crate::ws::types::RoomCanvasUpdate;

pub struct Room {
    canvas_id: u32,
    sender: Sender<RoomCanvasUpdate>,
    connection_count: AtomicUsize,
    max_connections: usize,
}

impl Room {
    pub fn new(canvas_id: u32, max_connections: usize) -> Self {
        const BROADCAST_BUFFER_SIZE: usize = 256;

        let (sender, _) = broadcast::channel(BROADCAST_BUFFER_SIZE);
        Self {
            canvas_id,
            sender,
            connection_count: AtomicUsize::new(0),
            max_connections,
        }
    }

    pub fn canvas_id(&self) -> u32 {
        self.canvas_id
    }

    pub fn connection_count(&self) -> usize {
        self.connection_count.load(Ordering::SeqCst)
    }

    /// Returns `None` when the room is full.
    pub fn subscribe(&self) -> Option<Receiver<RoomCanvasUpdate>> {
        loop {
            let count = self.connection_count.load(Ordering::SeqCst);
            if count >= self.max_connections {
                return None;
            }

            match self.connection_count.compare_exchange(
                count,
                count + 1,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return Some(self.sender.subscribe()),
                Err(_) => continue,
            }
        }
    }

    pub fn unsubscribe(&self) {
        self.connection_count.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn broadcast(&self, update: RoomCanvasUpdate) {
        let _ = self.sender.send(update);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refuses_subscribers_beyond_capacity() {
        let room = Room::new(1, 2);

        let first = room.subscribe();
        let second = room.subscribe();
        assert!(first.is_some() && second.is_some());
        assert!(room.subscribe().is_none());

        room.unsubscribe();
        assert_eq!(room.connection_count(), 1);
        assert!(room.subscribe().is_some());
    }

    #[tokio::test]
    async fn broadcasts_to_subscribers() {
        let room = Room::new(1, 4);
        let mut receiver = room.subscribe().unwrap();

        room.broadcast(RoomCanvasUpdate::Started);

        assert_eq!(receiver.recv().await.unwrap(), RoomCanvasUpdate::Started);
    }
}
