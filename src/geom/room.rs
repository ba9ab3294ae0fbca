use crate::geom::subroom::SubRoom;
use anyhow::{anyhow, Result};

/// Room condition flag set by traffic-control tooling; routing strategies
/// may penalize smoked rooms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomState {
    Clean,
    Smoked,
}

/// An ordered collection of subrooms on one level of the building.
#[derive(Debug, Clone)]
pub struct Room {
    id: usize,
    caption: String,
    z_pos: f64,
    state: RoomState,
    subrooms: Vec<SubRoom>,
}

impl Room {
    pub fn new(id: usize, caption: &str, z_pos: f64) -> Self {
        Self {
            id,
            caption: caption.to_string(),
            z_pos,
            state: RoomState::Clean,
            subrooms: Vec::new(),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn z_pos(&self) -> f64 {
        self.z_pos
    }

    pub fn state(&self) -> RoomState {
        self.state
    }

    pub fn set_state(&mut self, state: RoomState) {
        self.state = state;
    }

    /// Appends a subroom. Subroom ids double as positions, so they must
    /// arrive in order.
    pub fn add_subroom(&mut self, subroom: SubRoom) -> Result<()> {
        if subroom.id() != self.subrooms.len() {
            return Err(anyhow!(
                "room {}: subroom id {} does not match its position {}",
                self.id,
                subroom.id(),
                self.subrooms.len()
            ));
        }
        self.subrooms.push(subroom);
        Ok(())
    }

    pub fn subroom(&self, id: usize) -> Result<&SubRoom> {
        self.subrooms
            .get(id)
            .ok_or_else(|| anyhow!("room {}: no subroom with id {}", self.id, id))
    }

    pub(crate) fn subroom_mut(&mut self, id: usize) -> Result<&mut SubRoom> {
        let room_id = self.id;
        self.subrooms
            .get_mut(id)
            .ok_or_else(|| anyhow!("room {}: no subroom with id {}", room_id, id))
    }

    pub fn subrooms(&self) -> &[SubRoom] {
        &self.subrooms
    }

    pub(crate) fn subrooms_mut(&mut self) -> &mut [SubRoom] {
        &mut self.subrooms
    }

    pub fn subroom_count(&self) -> usize {
        self.subrooms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::subroom::SubRoomKind;

    #[test]
    fn test_subroom_ids_are_positions() {
        let mut room = Room::new(0, "hall", 0.0);
        room.add_subroom(SubRoom::new(0, 0, SubRoomKind::Normal))
            .unwrap();
        room.add_subroom(SubRoom::new(1, 0, SubRoomKind::Normal))
            .unwrap();
        assert!(room
            .add_subroom(SubRoom::new(5, 0, SubRoomKind::Normal))
            .is_err());
        assert_eq!(room.subroom_count(), 2);
        assert!(room.subroom(1).is_ok());
        assert!(room.subroom(2).is_err());
    }

    #[test]
    fn test_state() {
        let mut room = Room::new(0, "hall", 0.0);
        assert_eq!(room.state(), RoomState::Clean);
        room.set_state(RoomState::Smoked);
        assert_eq!(room.state(), RoomState::Smoked);
    }
}
