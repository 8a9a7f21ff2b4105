//! Session (gene) model.
//!
//! A session is one course's teacher/room/slot assignment. All four
//! fields are dense indices into the owning [`ProblemInstance`].
//!
//! [`ProblemInstance`]: super::ProblemInstance

use serde::{Deserialize, Serialize};

/// One scheduled course meeting.
///
/// Immutable value: operators build new sessions instead of editing
/// existing ones. Equality and hashing cover all four fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Session {
    /// Course index.
    pub course: usize,
    /// Teacher index.
    pub teacher: usize,
    /// Room index.
    pub room: usize,
    /// Time slot index.
    pub slot: usize,
}

impl Session {
    /// Creates a new session.
    pub fn new(course: usize, teacher: usize, room: usize, slot: usize) -> Self {
        Self {
            course,
            teacher,
            room,
            slot,
        }
    }

    /// Returns a copy moved to another room.
    pub fn with_room(self, room: usize) -> Self {
        Self { room, ..self }
    }

    /// Returns a copy moved to another time slot.
    pub fn with_slot(self, slot: usize) -> Self {
        Self { slot, ..self }
    }

    /// Whether two sessions compete for the same teacher or room at the same slot.
    pub fn clashes_with(&self, other: &Session) -> bool {
        self.slot == other.slot && (self.teacher == other.teacher || self.room == other.room)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_session_equality_covers_all_fields() {
        let a = Session::new(1, 2, 3, 4);
        assert_eq!(a, Session::new(1, 2, 3, 4));
        assert_ne!(a, Session::new(1, 2, 3, 5));
        assert_ne!(a, Session::new(1, 2, 0, 4));

        let set: HashSet<Session> = [a, Session::new(1, 2, 3, 4)].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_with_room_and_slot() {
        let a = Session::new(0, 1, 2, 3);
        let moved = a.with_room(7);
        assert_eq!(moved.room, 7);
        assert_eq!(moved.slot, 3);
        assert_eq!(a.room, 2);

        let shifted = a.with_slot(9);
        assert_eq!(shifted.slot, 9);
        assert_eq!(shifted.room, 2);
    }

    #[test]
    fn test_clashes_with() {
        let a = Session::new(0, 1, 1, 5);
        assert!(a.clashes_with(&Session::new(1, 1, 2, 5))); // same teacher
        assert!(a.clashes_with(&Session::new(1, 2, 1, 5))); // same room
        assert!(!a.clashes_with(&Session::new(1, 1, 1, 6))); // other slot
        assert!(!a.clashes_with(&Session::new(1, 2, 2, 5)));
    }
}
