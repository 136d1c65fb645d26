//! Seat bookkeeping: which live connection plays which side.

use std::collections::HashMap;

use pong_shared::world::Side;

use crate::error::ServerError;

/// Server-assigned connection identifier.
pub type ConnId = u32;

/// At most one connection per seat, at most two seated connections.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    seats: HashMap<ConnId, Side>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seat `conn`, preferring `left`. A connection that already holds a seat
    /// keeps it.
    pub fn assign_seat(&mut self, conn: ConnId) -> Result<Side, ServerError> {
        if let Some(side) = self.seat_of(conn) {
            return Ok(side);
        }
        let side = Side::ALL
            .into_iter()
            .find(|side| !self.is_taken(*side))
            .ok_or(ServerError::SeatUnavailable)?;
        self.seats.insert(conn, side);
        Ok(side)
    }

    /// Free `conn`'s seat. Returns the seat it held, if any.
    pub fn release_seat(&mut self, conn: ConnId) -> Option<Side> {
        self.seats.remove(&conn)
    }

    pub fn seat_of(&self, conn: ConnId) -> Option<Side> {
        self.seats.get(&conn).copied()
    }

    pub fn is_taken(&self, side: Side) -> bool {
        self.seats.values().any(|s| *s == side)
    }

    /// Occupied seats in seat order.
    pub fn occupied(&self) -> Vec<Side> {
        Side::ALL
            .into_iter()
            .filter(|side| self.is_taken(*side))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_two_connections_get_left_then_right() {
        let mut registry = SessionRegistry::new();
        assert_eq!(registry.assign_seat(1).unwrap(), Side::Left);
        assert_eq!(registry.assign_seat(2).unwrap(), Side::Right);
        assert_eq!(registry.occupied(), vec![Side::Left, Side::Right]);
    }

    #[test]
    fn third_connection_is_rejected() {
        let mut registry = SessionRegistry::new();
        registry.assign_seat(1).unwrap();
        registry.assign_seat(2).unwrap();
        assert!(matches!(
            registry.assign_seat(3),
            Err(ServerError::SeatUnavailable)
        ));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.seat_of(3), None);
    }

    #[test]
    fn assignment_is_idempotent() {
        let mut registry = SessionRegistry::new();
        assert_eq!(registry.assign_seat(1).unwrap(), Side::Left);
        assert_eq!(registry.assign_seat(1).unwrap(), Side::Left);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.assign_seat(2).unwrap(), Side::Right);
        // Re-asking with a full room still returns the held seat.
        assert_eq!(registry.assign_seat(2).unwrap(), Side::Right);
    }

    #[test]
    fn released_seat_is_reused() {
        let mut registry = SessionRegistry::new();
        registry.assign_seat(1).unwrap();
        registry.assign_seat(2).unwrap();

        assert_eq!(registry.release_seat(1), Some(Side::Left));
        assert_eq!(registry.occupied(), vec![Side::Right]);
        assert_eq!(registry.assign_seat(3).unwrap(), Side::Left);
    }

    #[test]
    fn releasing_unknown_connection_is_noop() {
        let mut registry = SessionRegistry::new();
        registry.assign_seat(1).unwrap();
        assert_eq!(registry.release_seat(42), None);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn no_seat_is_ever_shared() {
        let mut registry = SessionRegistry::new();
        let mut next = 1;
        for round in 0..50 {
            while registry.assign_seat(next).is_ok() {
                next += 1;
            }
            next += 1;
            let seats: Vec<Side> = registry.seats.values().copied().collect();
            assert!(seats.len() <= 2);
            if seats.len() == 2 {
                assert_ne!(seats[0], seats[1]);
            }
            let victim = *registry.seats.keys().nth(round % 2).unwrap();
            registry.release_seat(victim);
        }
    }
}
