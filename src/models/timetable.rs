//! Timetable (solution) model.
//!
//! A timetable is the reported form of a chromosome: its sessions, the
//! fitness they scored, and any conflicts found by an exact evaluation.
//! It may contain conflicts, since the optimizer is best-effort.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::Session;

/// A scored timetable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timetable {
    /// Scheduled sessions, in chromosome order.
    pub sessions: Vec<Session>,
    /// Fitness in [0, 1].
    pub fitness: f64,
    /// Conflicts detected in this timetable.
    pub conflicts: Vec<Conflict>,
}

/// A single detected conflict, attributed to the session that caused it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    /// Type of conflict.
    pub kind: ConflictKind,
    /// Course of the offending session.
    pub course: usize,
    /// Slot of the offending session.
    pub slot: usize,
    /// Human-readable description.
    pub message: String,
}

/// Classification of timetable conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConflictKind {
    /// Teacher is not qualified for the course.
    IneligibleTeacher,
    /// Teacher is not available at the slot.
    UnavailableTeacher,
    /// Teacher already teaches another session at the slot.
    TeacherDoubleBooked,
    /// Students in the room at the slot exceed its capacity.
    RoomOverCapacity,
    /// Room already hosts another session at the slot.
    RoomDoubleBooked,
    /// Students attend another course at the same slot.
    StudentClash,
}

impl ConflictKind {
    /// All kinds, in reporting order.
    pub const ALL: [ConflictKind; 6] = [
        ConflictKind::IneligibleTeacher,
        ConflictKind::UnavailableTeacher,
        ConflictKind::TeacherDoubleBooked,
        ConflictKind::RoomOverCapacity,
        ConflictKind::RoomDoubleBooked,
        ConflictKind::StudentClash,
    ];
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConflictKind::IneligibleTeacher => "ineligible teacher",
            ConflictKind::UnavailableTeacher => "unavailable teacher",
            ConflictKind::TeacherDoubleBooked => "teacher double-booked",
            ConflictKind::RoomOverCapacity => "room over capacity",
            ConflictKind::RoomDoubleBooked => "room double-booked",
            ConflictKind::StudentClash => "student clash",
        };
        f.write_str(label)
    }
}

impl Conflict {
    /// Creates a conflict record.
    pub fn new(kind: ConflictKind, session: &Session, message: impl Into<String>) -> Self {
        Self {
            kind,
            course: session.course,
            slot: session.slot,
            message: message.into(),
        }
    }
}

impl Timetable {
    /// Creates a timetable without conflict details.
    pub fn new(sessions: Vec<Session>, fitness: f64) -> Self {
        Self {
            sessions,
            fitness,
            conflicts: Vec::new(),
        }
    }

    /// Attaches detected conflicts.
    pub fn with_conflicts(mut self, conflicts: Vec<Conflict>) -> Self {
        self.conflicts = conflicts;
        self
    }

    /// Whether no conflict was recorded.
    pub fn is_conflict_free(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Number of scheduled courses.
    pub fn scheduled_count(&self) -> usize {
        self.sessions.len()
    }

    /// Session of a course, if scheduled.
    pub fn session_for_course(&self, course: usize) -> Option<&Session> {
        self.sessions.iter().find(|s| s.course == course)
    }

    /// Sessions held at a slot.
    pub fn sessions_in_slot(&self, slot: usize) -> Vec<&Session> {
        self.sessions.iter().filter(|s| s.slot == slot).collect()
    }

    /// Sessions taught by a teacher.
    pub fn sessions_for_teacher(&self, teacher: usize) -> Vec<&Session> {
        self.sessions.iter().filter(|s| s.teacher == teacher).collect()
    }

    /// Sessions held in a room.
    pub fn sessions_for_room(&self, room: usize) -> Vec<&Session> {
        self.sessions.iter().filter(|s| s.room == room).collect()
    }

    /// Sessions grouped by slot, ordered by slot.
    pub fn by_slot(&self) -> BTreeMap<usize, Vec<&Session>> {
        let mut grouped: BTreeMap<usize, Vec<&Session>> = BTreeMap::new();
        for s in &self.sessions {
            grouped.entry(s.slot).or_default().push(s);
        }
        grouped
    }

    /// Fraction of slots in which a room is occupied.
    ///
    /// Returns `None` if `slot_count` is zero.
    pub fn room_utilization(&self, room: usize, slot_count: usize) -> Option<f64> {
        if slot_count == 0 {
            return None;
        }
        let mut slots: Vec<usize> = self.sessions_for_room(room).iter().map(|s| s.slot).collect();
        slots.sort_unstable();
        slots.dedup();
        Some(slots.len() as f64 / slot_count as f64)
    }

    /// Number of conflicts per kind.
    pub fn conflict_tally(&self) -> BTreeMap<ConflictKind, usize> {
        let mut tally = BTreeMap::new();
        for c in &self.conflicts {
            *tally.entry(c.kind).or_insert(0) += 1;
        }
        tally
    }
}
