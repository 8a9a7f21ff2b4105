//! Timetabling domain models.
//!
//! Provides the data types describing a timetabling problem and its
//! solutions. All entities are identified by dense `usize` indices.
//!
//! # Domain Mappings
//!
//! | u-timetable | University | School | Conference |
//! |-------------|------------|--------|------------|
//! | Course | Course | Class | Talk |
//! | Teacher | Lecturer | Teacher | Speaker |
//! | Room | Lecture hall | Classroom | Track room |
//! | Slot | Weekly period | Lesson period | Time block |

mod instance;
mod session;
mod timetable;

pub use instance::{ProblemInstance, ProblemInstanceBuilder, UNLIMITED_CAPACITY};
pub use session::Session;
pub use timetable::{Conflict, ConflictKind, Timetable};
