//! Input validation for timetabling instances.
//!
//! Checks structural integrity of a [`ProblemInstance`] before it is
//! handed to the optimizer. Detects:
//! - Tables whose length disagrees with the declared dimensions
//! - Eligibility entries naming teachers that do not exist
//! - Enrollment entries naming students that do not exist
//! - Missing rooms or time slots, which make every placement impossible
//!
//! Courses nobody can teach are deliberately *not* errors: they stay
//! unscheduled and only lower fitness. [`ProblemInstance::courses_without_teacher`]
//! lists them for diagnostics.

use crate::models::ProblemInstance;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A per-entity table has the wrong number of entries.
    DimensionMismatch,
    /// An eligibility list references a teacher outside `0..teacher_count`.
    UnknownTeacher,
    /// An enrollment list references a student outside `0..student_count`.
    UnknownStudent,
    /// The instance has no rooms or no time slots.
    EmptyDimension,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a problem instance.
///
/// Checks:
/// 1. At least one room and one time slot exist
/// 2. Eligibility and enrollment tables have one row per course
/// 3. The availability grid is `teacher_count × slot_count`
/// 4. There is one capacity per room
/// 5. Name lists, when given, match their entity counts
/// 6. Every referenced teacher and student exists
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_instance(instance: &ProblemInstance) -> ValidationResult {
    let mut errors = Vec::new();

    if instance.room_count() == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyDimension,
            "instance has no rooms",
        ));
    }
    if instance.slot_count() == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyDimension,
            "instance has no time slots",
        ));
    }

    check_len(
        &mut errors,
        "eligibility",
        instance.course_count(),
        instance.eligibility_rows().len(),
    );
    check_len(
        &mut errors,
        "enrollments",
        instance.course_count(),
        instance.enrollment_rows().len(),
    );
    check_len(
        &mut errors,
        "availability",
        instance.teacher_count(),
        instance.availability_rows().len(),
    );
    check_len(
        &mut errors,
        "room capacities",
        instance.room_count(),
        instance.room_capacities().len(),
    );
    if !instance.course_names().is_empty() {
        check_len(
            &mut errors,
            "course names",
            instance.course_count(),
            instance.course_names().len(),
        );
    }
    if !instance.teacher_names().is_empty() {
        check_len(
            &mut errors,
            "teacher names",
            instance.teacher_count(),
            instance.teacher_names().len(),
        );
    }

    for (teacher, row) in instance.availability_rows().iter().enumerate() {
        if row.len() != instance.slot_count() {
            errors.push(ValidationError::new(
                ValidationErrorKind::DimensionMismatch,
                format!(
                    "availability of teacher {teacher}: expected {} slots, found {}",
                    instance.slot_count(),
                    row.len()
                ),
            ));
        }
    }

    for (course, teachers) in instance.eligibility_rows().iter().enumerate() {
        for &t in teachers {
            if t >= instance.teacher_count() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownTeacher,
                    format!("course {course} lists unknown teacher {t}"),
                ));
            }
        }
    }

    for (course, students) in instance.enrollment_rows().iter().enumerate() {
        if let Some(&s) = students.iter().find(|&&s| s >= instance.student_count()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownStudent,
                format!("course {course} enrolls unknown student {s}"),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_len(errors: &mut Vec<ValidationError>, table: &str, expected: usize, found: usize) {
    if expected != found {
        errors.push(ValidationError::new(
            ValidationErrorKind::DimensionMismatch,
            format!("{table}: expected {expected} entries, found {found}"),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn kinds(err: Error) -> Vec<ValidationErrorKind> {
        match err {
            Error::InvalidInstance(errors) => errors.into_iter().map(|e| e.kind).collect(),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_valid_instance() {
        let result = ProblemInstance::builder(3, 2, 2, 5, 10)
            .with_all_eligible()
            .with_enrollment(0, [0, 9])
            .build();
        assert!(result.is_ok());
    }

    #[test]
    fn test_course_without_teacher_is_not_an_error() {
        let inst = ProblemInstance::builder(2, 1, 1, 1, 1)
            .with_eligible(0, [0])
            .build()
            .unwrap();
        assert_eq!(inst.courses_without_teacher(), vec![1]);
    }

    #[test]
    fn test_unknown_teacher() {
        let err = ProblemInstance::builder(1, 2, 1, 1, 1)
            .with_eligible(0, [0, 5])
            .build()
            .unwrap_err();
        assert!(kinds(err).contains(&ValidationErrorKind::UnknownTeacher));
    }

    #[test]
    fn test_unknown_student() {
        let err = ProblemInstance::builder(1, 1, 1, 1, 3)
            .with_enrollment(0, [0, 3])
            .build()
            .unwrap_err();
        assert!(kinds(err).contains(&ValidationErrorKind::UnknownStudent));
    }

    #[test]
    fn test_empty_dimensions() {
        let err = ProblemInstance::builder(1, 1, 0, 0, 1).build().unwrap_err();
        let kinds = kinds(err);
        assert_eq!(
            kinds
                .iter()
                .filter(|k| **k == ValidationErrorKind::EmptyDimension)
                .count(),
            2
        );
    }

    #[test]
    fn test_ragged_availability_grid() {
        let err = ProblemInstance::builder(1, 2, 1, 3, 1)
            .with_availability_grid(vec![vec![true; 3], vec![true; 2]])
            .build()
            .unwrap_err();
        assert!(kinds(err).contains(&ValidationErrorKind::DimensionMismatch));
    }

    #[test]
    fn test_name_list_length() {
        let err = ProblemInstance::builder(2, 1, 1, 1, 1)
            .with_course_names(vec!["Only one".into()])
            .build()
            .unwrap_err();
        assert!(kinds(err).contains(&ValidationErrorKind::DimensionMismatch));
    }

    #[test]
    fn test_multiple_errors() {
        let err = ProblemInstance::builder(1, 1, 0, 2, 1)
            .with_eligible(0, [4])
            .with_enrollment(0, [7])
            .build()
            .unwrap_err();
        assert!(kinds(err).len() >= 3);
    }
}
