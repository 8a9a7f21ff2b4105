//! Synthetic problem instances.
//!
//! [`InstanceGenerator`] draws random but realistic instances: each teacher
//! is qualified for a handful of courses, is available in most slots,
//! every course enrolls a few dozen students and rooms seat 30 to 100.
//! Three presets mirror the reference problem scales.
//!
//! Generation is fully determined by the RNG passed in.

use std::ops::RangeInclusive;

use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::ProblemInstance;

const AREAS: [&str; 10] = [
    "Computing",
    "Mathematics",
    "Physics",
    "Chemistry",
    "Biology",
    "Engineering",
    "Management",
    "Economics",
    "Psychology",
    "History",
];

const SURNAMES: [&str; 12] = [
    "Adams", "Baker", "Clark", "Davis", "Evans", "Foster", "Garcia", "Harris", "Ito", "Jensen",
    "Kim", "Lopez",
];

/// Shape of a generated instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorParams {
    pub courses: usize,
    pub teachers: usize,
    pub rooms: usize,
    pub slots: usize,
    pub students: usize,
    /// Probability that a teacher is available in a given slot.
    pub availability: f64,
    /// Students enrolled per course (capped at `students`).
    pub students_per_course: RangeInclusive<usize>,
    /// Seats per room.
    pub room_capacity: RangeInclusive<u32>,
}

impl GeneratorParams {
    /// 15 courses, 6 teachers, 4 rooms, 20 slots, 100 students.
    pub fn small() -> Self {
        Self {
            courses: 15,
            teachers: 6,
            rooms: 4,
            slots: 20,
            students: 100,
            availability: 0.8,
            students_per_course: 20..=40,
            room_capacity: 30..=100,
        }
    }

    /// 150 courses, 30 teachers, 20 rooms, 50 slots, 1000 students.
    pub fn medium() -> Self {
        Self {
            courses: 150,
            teachers: 30,
            rooms: 20,
            slots: 50,
            students: 1000,
            availability: 0.7,
            students_per_course: 20..=50,
            ..Self::small()
        }
    }

    /// 500 courses, 100 teachers, 50 rooms, 100 slots, 5000 students.
    pub fn large() -> Self {
        Self {
            courses: 500,
            teachers: 100,
            rooms: 50,
            slots: 100,
            students: 5000,
            ..Self::medium()
        }
    }

    /// Courses each teacher is qualified for: `max(3, courses / teachers + 2)`,
    /// capped at the course count.
    pub fn courses_per_teacher(&self) -> usize {
        let per = if self.teachers == 0 {
            0
        } else {
            (self.courses / self.teachers + 2).max(3)
        };
        per.min(self.courses)
    }

    fn validate(&self) -> Result<()> {
        if self.rooms == 0 || self.slots == 0 {
            return Err(Error::InvalidConfig(
                "generator needs at least one room and one slot".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.availability) {
            return Err(Error::InvalidConfig(format!(
                "availability must be within [0, 1], got {}",
                self.availability
            )));
        }
        if self.students_per_course.is_empty() || self.room_capacity.is_empty() {
            return Err(Error::InvalidConfig(
                "students_per_course and room_capacity ranges must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Draws random instances from [`GeneratorParams`].
#[derive(Debug, Clone)]
pub struct InstanceGenerator {
    params: GeneratorParams,
}

impl InstanceGenerator {
    pub fn new(params: GeneratorParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &GeneratorParams {
        &self.params
    }

    /// Generates a validated instance.
    ///
    /// # Errors
    /// [`Error::InvalidConfig`] for degenerate parameters (no rooms or
    /// slots, probability outside [0, 1], empty ranges).
    pub fn generate<R: Rng>(&self, rng: &mut R) -> Result<ProblemInstance> {
        let p = &self.params;
        p.validate()?;

        let mut builder = ProblemInstance::builder(p.courses, p.teachers, p.rooms, p.slots, p.students)
            .with_course_names(course_names(p.courses))
            .with_teacher_names(teacher_names(p.teachers));

        let availability = (0..p.teachers)
            .map(|_| (0..p.slots).map(|_| rng.random_bool(p.availability)).collect())
            .collect();
        builder = builder.with_availability_grid(availability);

        let per_teacher = p.courses_per_teacher();
        let mut qualified: Vec<Vec<usize>> = vec![Vec::new(); p.courses];
        for teacher in 0..p.teachers {
            for course in index::sample(rng, p.courses, per_teacher) {
                qualified[course].push(teacher);
            }
        }
        for (course, teachers) in qualified.into_iter().enumerate() {
            builder = builder.with_eligible(course, teachers);
        }

        for room in 0..p.rooms {
            builder = builder.with_room_capacity(room, rng.random_range(p.room_capacity.clone()));
        }

        for course in 0..p.courses {
            let n = rng.random_range(p.students_per_course.clone()).min(p.students);
            builder = builder.with_enrollment(course, index::sample(rng, p.students, n));
        }

        let instance = builder.build()?;
        debug!(
            "generated instance: {} courses, {} teachers, {} rooms, {} slots, {} untaught courses",
            instance.course_count(),
            instance.teacher_count(),
            instance.room_count(),
            instance.slot_count(),
            instance.courses_without_teacher().len()
        );
        Ok(instance)
    }
}

/// "Computing 1", "Mathematics 1", …, "Computing 2", …
fn course_names(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| format!("{} {}", AREAS[i % AREAS.len()], i / AREAS.len() + 1))
        .collect()
}

/// "Prof. Adams", …, "Prof. Lopez", "Prof. Adams 2", …
fn teacher_names(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            let round = i / SURNAMES.len();
            let surname = SURNAMES[i % SURNAMES.len()];
            if round == 0 {
                format!("Prof. {surname}")
            } else {
                format!("Prof. {surname} {}", round + 1)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_small_instance_shape() {
        let mut rng = SmallRng::seed_from_u64(42);
        let inst = InstanceGenerator::new(GeneratorParams::small())
            .generate(&mut rng)
            .unwrap();

        assert_eq!(inst.course_count(), 15);
        assert_eq!(inst.teacher_count(), 6);
        assert_eq!(inst.room_count(), 4);
        assert_eq!(inst.slot_count(), 20);
        assert_eq!(inst.course_name(0), "Computing 1");
        assert_eq!(inst.course_name(10), "Computing 2");
        assert_eq!(inst.teacher_name(1), "Prof. Baker");

        for room in 0..4 {
            assert!((30..=100).contains(&inst.room_capacity(room)));
        }
        for course in 0..15 {
            let n = inst.enrolled_students(course).len();
            assert!((20..=40).contains(&n), "course {course} enrolls {n}");
        }
    }

    #[test]
    fn test_eligibility_scheme() {
        let params = GeneratorParams::medium();
        assert_eq!(params.courses_per_teacher(), 7);
        let mut rng = SmallRng::seed_from_u64(42);
        let inst = InstanceGenerator::new(params).generate(&mut rng).unwrap();

        let total: usize = (0..inst.course_count())
            .map(|c| inst.eligible_teachers(c).len())
            .sum();
        assert_eq!(total, 30 * 7);
    }

    #[test]
    fn test_availability_rate() {
        let mut rng = SmallRng::seed_from_u64(42);
        let inst = InstanceGenerator::new(GeneratorParams::large())
            .generate(&mut rng)
            .unwrap();
        let available = (0..inst.teacher_count())
            .flat_map(|t| (0..inst.slot_count()).map(move |s| (t, s)))
            .filter(|&(t, s)| inst.is_available(t, s))
            .count();
        let rate = available as f64 / (100 * 100) as f64;
        assert!((0.65..0.75).contains(&rate), "availability rate {rate}");
    }

    #[test]
    fn test_same_seed_same_instance() {
        let gen = InstanceGenerator::new(GeneratorParams::small());
        let a = gen.generate(&mut SmallRng::seed_from_u64(7)).unwrap();
        let b = gen.generate(&mut SmallRng::seed_from_u64(7)).unwrap();
        assert_eq!(a.to_json_string().unwrap(), b.to_json_string().unwrap());
    }

    #[test]
    fn test_degenerate_params() {
        let mut rng = SmallRng::seed_from_u64(42);
        let params = GeneratorParams {
            slots: 0,
            ..GeneratorParams::small()
        };
        assert!(InstanceGenerator::new(params).generate(&mut rng).is_err());

        let params = GeneratorParams {
            availability: 1.5,
            ..GeneratorParams::small()
        };
        assert!(InstanceGenerator::new(params).generate(&mut rng).is_err());
    }

    #[test]
    fn test_more_teachers_than_courses() {
        let params = GeneratorParams {
            courses: 2,
            teachers: 5,
            ..GeneratorParams::small()
        };
        assert_eq!(params.courses_per_teacher(), 2);
        let mut rng = SmallRng::seed_from_u64(42);
        let inst = InstanceGenerator::new(params).generate(&mut rng).unwrap();
        assert_eq!(inst.eligible_teachers(0).len(), 5);
    }
}
