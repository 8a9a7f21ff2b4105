//! Problem instance model.
//!
//! The immutable description of one timetabling run: how many courses,
//! teachers, rooms, slots and students exist, which teachers may teach
//! which course, when each teacher is available, how large each room is,
//! and which students are enrolled in each course.
//!
//! Instances are produced by an explicit step ([`ProblemInstance::builder`],
//! [`ProblemInstance::from_json_str`], or the synthetic generator) and are
//! only read afterwards, so they can be shared across worker threads
//! without synchronization.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::validation::validate_instance;

/// Capacity assigned to rooms whose size was never set.
pub const UNLIMITED_CAPACITY: u32 = u32::MAX;

/// Immutable timetabling problem.
///
/// All entities are identified by dense indices: courses `0..course_count`,
/// teachers `0..teacher_count`, and so on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemInstance {
    course_count: usize,
    teacher_count: usize,
    room_count: usize,
    slot_count: usize,
    student_count: usize,
    /// course → sorted qualifying teachers.
    eligibility: Vec<Vec<usize>>,
    /// teacher × slot availability grid.
    availability: Vec<Vec<bool>>,
    room_capacities: Vec<u32>,
    /// course → sorted enrolled students.
    enrollments: Vec<Vec<usize>>,
    #[serde(default)]
    course_names: Vec<String>,
    #[serde(default)]
    teacher_names: Vec<String>,
}

impl ProblemInstance {
    /// Starts building an instance with the given dimensions.
    ///
    /// Every teacher starts fully available, every room unlimited, and
    /// every course with no eligible teacher and no students.
    pub fn builder(
        course_count: usize,
        teacher_count: usize,
        room_count: usize,
        slot_count: usize,
        student_count: usize,
    ) -> ProblemInstanceBuilder {
        ProblemInstanceBuilder {
            instance: Self {
                course_count,
                teacher_count,
                room_count,
                slot_count,
                student_count,
                eligibility: vec![Vec::new(); course_count],
                availability: vec![vec![true; slot_count]; teacher_count],
                room_capacities: vec![UNLIMITED_CAPACITY; room_count],
                enrollments: vec![Vec::new(); course_count],
                course_names: Vec::new(),
                teacher_names: Vec::new(),
            },
        }
    }

    /// Parses and validates an instance from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut instance: Self = serde_json::from_str(json)?;
        instance.normalize();
        validate_instance(&instance).map_err(Error::InvalidInstance)?;
        Ok(instance)
    }

    /// Reads and validates an instance from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serializes the instance as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Number of courses.
    #[inline]
    pub fn course_count(&self) -> usize {
        self.course_count
    }

    /// Number of teachers.
    #[inline]
    pub fn teacher_count(&self) -> usize {
        self.teacher_count
    }

    /// Number of rooms.
    #[inline]
    pub fn room_count(&self) -> usize {
        self.room_count
    }

    /// Number of time slots.
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Number of students.
    #[inline]
    pub fn student_count(&self) -> usize {
        self.student_count
    }

    /// Teachers qualified for a course (sorted). Empty for unknown courses.
    pub fn eligible_teachers(&self, course: usize) -> &[usize] {
        self.eligibility.get(course).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `teacher` may teach `course`.
    pub fn is_eligible(&self, course: usize, teacher: usize) -> bool {
        self.eligible_teachers(course).binary_search(&teacher).is_ok()
    }

    /// Whether `teacher` is available at `slot`. Out-of-range lookups are unavailable.
    pub fn is_available(&self, teacher: usize, slot: usize) -> bool {
        self.availability
            .get(teacher)
            .and_then(|row| row.get(slot))
            .copied()
            .unwrap_or(false)
    }

    /// Seating capacity of a room (0 for unknown rooms).
    pub fn room_capacity(&self, room: usize) -> u32 {
        self.room_capacities.get(room).copied().unwrap_or(0)
    }

    /// Students enrolled in a course (sorted).
    pub fn enrolled_students(&self, course: usize) -> &[usize] {
        self.enrollments.get(course).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Display name of a course, falling back to its index.
    pub fn course_name(&self, course: usize) -> String {
        self.course_names
            .get(course)
            .cloned()
            .unwrap_or_else(|| format!("Course {}", course + 1))
    }

    /// Display name of a teacher, falling back to its index.
    pub fn teacher_name(&self, teacher: usize) -> String {
        self.teacher_names
            .get(teacher)
            .cloned()
            .unwrap_or_else(|| format!("Teacher {}", teacher + 1))
    }

    /// Courses that no teacher is qualified for. These can never be scheduled.
    pub fn courses_without_teacher(&self) -> Vec<usize> {
        (0..self.course_count)
            .filter(|&c| self.eligible_teachers(c).is_empty())
            .collect()
    }

    pub(crate) fn availability_rows(&self) -> &[Vec<bool>] {
        &self.availability
    }

    pub(crate) fn room_capacities(&self) -> &[u32] {
        &self.room_capacities
    }

    pub(crate) fn eligibility_rows(&self) -> &[Vec<usize>] {
        &self.eligibility
    }

    pub(crate) fn enrollment_rows(&self) -> &[Vec<usize>] {
        &self.enrollments
    }

    pub(crate) fn course_names(&self) -> &[String] {
        &self.course_names
    }

    pub(crate) fn teacher_names(&self) -> &[String] {
        &self.teacher_names
    }

    /// Sorts and deduplicates the per-course index lists.
    fn normalize(&mut self) {
        for row in self.eligibility.iter_mut().chain(self.enrollments.iter_mut()) {
            row.sort_unstable();
            row.dedup();
        }
    }
}

/// Builder for [`ProblemInstance`].
///
/// # Example
/// ```
/// use u_timetable::models::ProblemInstance;
///
/// let instance = ProblemInstance::builder(2, 1, 1, 4, 10)
///     .with_eligible(0, [0])
///     .with_eligible(1, [0])
///     .with_room_capacity(0, 30)
///     .with_enrollment(0, [1, 2, 3])
///     .build()
///     .unwrap();
/// assert!(instance.is_eligible(1, 0));
/// ```
#[derive(Debug, Clone)]
pub struct ProblemInstanceBuilder {
    instance: ProblemInstance,
}

impl ProblemInstanceBuilder {
    /// Sets the qualifying teachers of a course.
    pub fn with_eligible(mut self, course: usize, teachers: impl IntoIterator<Item = usize>) -> Self {
        if let Some(row) = self.instance.eligibility.get_mut(course) {
            *row = teachers.into_iter().collect();
        }
        self
    }

    /// Makes every teacher eligible for every course.
    pub fn with_all_eligible(mut self) -> Self {
        let all: Vec<usize> = (0..self.instance.teacher_count).collect();
        for row in &mut self.instance.eligibility {
            row.clone_from(&all);
        }
        self
    }

    /// Sets one cell of the availability grid.
    pub fn with_availability(mut self, teacher: usize, slot: usize, available: bool) -> Self {
        if let Some(cell) = self
            .instance
            .availability
            .get_mut(teacher)
            .and_then(|row| row.get_mut(slot))
        {
            *cell = available;
        }
        self
    }

    /// Replaces the whole availability grid (teacher × slot).
    pub fn with_availability_grid(mut self, grid: Vec<Vec<bool>>) -> Self {
        self.instance.availability = grid;
        self
    }

    /// Sets a room's capacity.
    pub fn with_room_capacity(mut self, room: usize, capacity: u32) -> Self {
        if let Some(c) = self.instance.room_capacities.get_mut(room) {
            *c = capacity;
        }
        self
    }

    /// Sets the students enrolled in a course.
    pub fn with_enrollment(mut self, course: usize, students: impl IntoIterator<Item = usize>) -> Self {
        if let Some(row) = self.instance.enrollments.get_mut(course) {
            *row = students.into_iter().collect();
        }
        self
    }

    /// Sets course display names.
    pub fn with_course_names(mut self, names: Vec<String>) -> Self {
        self.instance.course_names = names;
        self
    }

    /// Sets teacher display names.
    pub fn with_teacher_names(mut self, names: Vec<String>) -> Self {
        self.instance.teacher_names = names;
        self
    }

    /// Validates and freezes the instance.
    pub fn build(mut self) -> Result<ProblemInstance> {
        self.instance.normalize();
        validate_instance(&self.instance).map_err(Error::InvalidInstance)?;
        Ok(self.instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_instance() -> ProblemInstance {
        ProblemInstance::builder(3, 2, 2, 4, 20)
            .with_eligible(0, [1, 0, 1])
            .with_eligible(1, [1])
            .with_availability(1, 2, false)
            .with_room_capacity(0, 25)
            .with_enrollment(0, [5, 3, 5, 1])
            .with_course_names(vec!["Algorithms".into(), "Networks".into(), "Databases".into()])
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_normalizes_lists() {
        let inst = sample_instance();
        assert_eq!(inst.eligible_teachers(0), &[0, 1]);
        assert_eq!(inst.enrolled_students(0), &[1, 3, 5]);
        assert!(inst.eligible_teachers(2).is_empty());
        assert!(inst.eligible_teachers(99).is_empty());
    }

    #[test]
    fn test_eligibility_and_availability() {
        let inst = sample_instance();
        assert!(inst.is_eligible(0, 0));
        assert!(!inst.is_eligible(1, 0));
        assert!(inst.is_available(0, 2));
        assert!(!inst.is_available(1, 2));
        assert!(!inst.is_available(5, 0));
        assert!(!inst.is_available(0, 99));
    }

    #[test]
    fn test_capacities_default_unlimited() {
        let inst = sample_instance();
        assert_eq!(inst.room_capacity(0), 25);
        assert_eq!(inst.room_capacity(1), UNLIMITED_CAPACITY);
        assert_eq!(inst.room_capacity(7), 0);
    }

    #[test]
    fn test_names_fall_back_to_index() {
        let inst = sample_instance();
        assert_eq!(inst.course_name(0), "Algorithms");
        assert_eq!(inst.course_name(2), "Databases");
        assert_eq!(inst.course_name(5), "Course 6");
        assert_eq!(inst.teacher_name(1), "Teacher 2");
    }

    #[test]
    fn test_courses_without_teacher() {
        let inst = sample_instance();
        assert_eq!(inst.courses_without_teacher(), vec![2]);
    }

    #[test]
    fn test_json_roundtrip() {
        let inst = sample_instance();
        let json = inst.to_json_string().unwrap();
        let parsed = ProblemInstance::from_json_str(&json).unwrap();
        assert_eq!(parsed, inst);
    }

    #[test]
    fn test_json_rejects_bad_grid() {
        let inst = sample_instance();
        let mut value: serde_json::Value = serde_json::from_str(&inst.to_json_string().unwrap()).unwrap();
        value["availability"] = serde_json::json!([[true]]);
        let err = ProblemInstance::from_json_str(&value.to_string()).unwrap_err();
        assert!(matches!(err, Error::InvalidInstance(_)));
    }
}
