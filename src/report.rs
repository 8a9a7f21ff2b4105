//! Plain-text timetable reports.
//!
//! Renders a [`Timetable`] as a weekly grid: slots are grouped into days
//! of `slot_times.len()` periods each, every period lists its sessions as
//! `Course (Teacher, Room n)` or `(free)`, and a footer summarizes
//! coverage, fitness and remaining conflicts.
//!
//! ```text
//! MONDAY:
//!   08:00: Computing 1 (Prof. Adams, Room 2) | Physics 1 (Prof. Clark, Room 1)
//!   10:00: (free)
//! ```

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{ProblemInstance, Timetable};

/// How slot indices map onto a week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportLayout {
    /// Day headings, in slot order. Days past the list are numbered.
    pub day_names: Vec<String>,
    /// Start time of each period of a day.
    pub slot_times: Vec<String>,
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self {
            day_names: ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"]
                .map(String::from)
                .to_vec(),
            slot_times: ["08:00", "10:00", "14:00", "16:00", "18:00"]
                .map(String::from)
                .to_vec(),
        }
    }
}

impl ReportLayout {
    /// Periods per day (at least 1).
    pub fn slots_per_day(&self) -> usize {
        self.slot_times.len().max(1)
    }

    /// Heading of a day.
    pub fn day_name(&self, day: usize) -> String {
        self.day_names
            .get(day)
            .cloned()
            .unwrap_or_else(|| format!("Day {}", day + 1))
    }

    /// Label of a slot within its day.
    pub fn slot_time(&self, slot: usize) -> String {
        let period = slot % self.slots_per_day();
        self.slot_times
            .get(period)
            .cloned()
            .unwrap_or_else(|| format!("Period {}", period + 1))
    }
}

/// A timetable bound to its instance and layout, printable with `Display`.
pub struct TimetableReport<'a> {
    instance: &'a ProblemInstance,
    timetable: &'a Timetable,
    layout: &'a ReportLayout,
}

impl<'a> TimetableReport<'a> {
    pub fn new(instance: &'a ProblemInstance, timetable: &'a Timetable, layout: &'a ReportLayout) -> Self {
        Self {
            instance,
            timetable,
            layout,
        }
    }
}

impl fmt::Display for TimetableReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inst = self.instance;
        let per_day = self.layout.slots_per_day();
        let slots = inst.slot_count();
        let days = slots.div_ceil(per_day);
        let by_slot = self.timetable.by_slot();

        for day in 0..days {
            writeln!(f, "{}:", self.layout.day_name(day).to_uppercase())?;
            for slot in day * per_day..((day + 1) * per_day).min(slots) {
                write!(f, "  {}: ", self.layout.slot_time(slot))?;
                match by_slot.get(&slot) {
                    Some(sessions) if !sessions.is_empty() => {
                        let cells: Vec<String> = sessions
                            .iter()
                            .map(|s| {
                                format!(
                                    "{} ({}, Room {})",
                                    inst.course_name(s.course),
                                    inst.teacher_name(s.teacher),
                                    s.room + 1
                                )
                            })
                            .collect();
                        writeln!(f, "{}", cells.join(" | "))?;
                    }
                    _ => writeln!(f, "(free)")?,
                }
            }
            writeln!(f)?;
        }

        writeln!(f, "SUMMARY:")?;
        writeln!(
            f,
            "  Scheduled courses: {} / {}",
            self.timetable.scheduled_count(),
            inst.course_count()
        )?;
        writeln!(f, "  Fitness: {:.4}", self.timetable.fitness)?;
        if self.timetable.is_conflict_free() {
            writeln!(f, "  Conflicts: none")?;
        } else {
            let tally: Vec<String> = self
                .timetable
                .conflict_tally()
                .iter()
                .map(|(kind, n)| format!("{kind}: {n}"))
                .collect();
            writeln!(
                f,
                "  Conflicts: {} ({})",
                self.timetable.conflicts.len(),
                tally.join(", ")
            )?;
        }
        let unscheduled: Vec<String> = (0..inst.course_count())
            .filter(|&c| self.timetable.session_for_course(c).is_none())
            .map(|c| inst.course_name(c))
            .collect();
        if !unscheduled.is_empty() {
            writeln!(f, "  Unscheduled: {}", unscheduled.join(", "))?;
        }
        Ok(())
    }
}

/// Renders a timetable as a weekly grid with a summary footer.
pub fn render_timetable(instance: &ProblemInstance, timetable: &Timetable, layout: &ReportLayout) -> String {
    TimetableReport::new(instance, timetable, layout).to_string()
}

/// Writes the rendered report to a file.
///
/// # Errors
/// [`Error::Io`](crate::Error::Io) if the file cannot be written.
pub fn write_report(
    path: impl AsRef<Path>,
    instance: &ProblemInstance,
    timetable: &Timetable,
    layout: &ReportLayout,
) -> Result<()> {
    fs::write(path, render_timetable(instance, timetable, layout))?;
    Ok(())
}
