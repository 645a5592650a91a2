//! # Capacity Rule
//!
//! A course is full when its enrolled student count reaches the configured
//! maximum. The rule is observational: stores never reject a write because
//! a course would exceed capacity, and the predicate is recomputed from the
//! current membership on every call.

use crate::primitives::DEFAULT_MAX_STUDENTS_PER_COURSE;
use crate::{Course, CourseId};
use serde::{Deserialize, Serialize};

/// The configured maximum number of students per course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacity {
    max_students: usize,
}

impl Default for Capacity {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_STUDENTS_PER_COURSE)
    }
}

impl Capacity {
    #[must_use]
    pub const fn new(max_students: usize) -> Self {
        Self { max_students }
    }

    #[must_use]
    pub const fn max_students(self) -> usize {
        self.max_students
    }

    /// `true` iff `course.students.len() >= max_students`.
    ///
    /// A capacity of zero reports every course as full.
    #[must_use]
    pub fn is_full(self, course: &Course) -> bool {
        course.enrolled() >= self.max_students
    }

    /// Build a capacity report for a course.
    #[must_use]
    pub fn report(self, course: &Course) -> CapacityReport {
        let enrolled = course.enrolled();
        CapacityReport {
            course: course.id,
            enrolled,
            max_students: self.max_students,
            remaining: self.max_students.saturating_sub(enrolled),
            is_full: self.is_full(course),
        }
    }
}

/// Capacity status of a single course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityReport {
    pub course: CourseId,
    pub enrolled: usize,
    pub max_students: usize,
    /// Free seats, saturating at zero when the course is over capacity.
    pub remaining: usize,
    pub is_full: bool,
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StudentId;
    use std::collections::BTreeSet;

    fn course_with(n: u64) -> Course {
        Course {
            id: CourseId(1),
            name: "Math".to_string(),
            students: (1..=n).map(StudentId).collect::<BTreeSet<_>>(),
        }
    }

    #[test]
    fn full_at_exact_maximum() {
        let capacity = Capacity::new(3);
        assert!(capacity.is_full(&course_with(3)));
    }

    #[test]
    fn not_full_one_below_maximum() {
        let capacity = Capacity::new(3);
        assert!(!capacity.is_full(&course_with(2)));
    }

    #[test]
    fn over_capacity_is_full_with_no_remaining() {
        let report = Capacity::new(2).report(&course_with(5));
        assert!(report.is_full);
        assert_eq!(report.enrolled, 5);
        assert_eq!(report.remaining, 0);
    }

    #[test]
    fn zero_capacity_is_always_full() {
        assert!(Capacity::new(0).is_full(&course_with(0)));
    }

    #[test]
    fn empty_course_reports_all_seats_free() {
        let report = Capacity::default().report(&course_with(0));
        assert!(!report.is_full);
        assert_eq!(report.remaining, DEFAULT_MAX_STUDENTS_PER_COURSE);
    }
}
