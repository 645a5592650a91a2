//! # Core Type Definitions
//!
//! This module contains all core types for the Roster enrollment model:
//! - Identifiers (`StudentId`, `CourseId`)
//! - Records (`Student`, `Course`)
//! - Write inputs (`NewStudent`, `StudentPatch`, `NewCourse`, `CoursePatch`)
//! - Error types (`RosterError`)
//!
//! ## Ordering Guarantees
//!
//! Identifiers implement `Ord` and are assigned in creation order, so a
//! `BTreeMap` keyed by id iterates in creation order. Course membership is a
//! `BTreeSet`, which makes the serialized student list deterministic even
//! though the relation itself is unordered.

use crate::primitives::{MAX_MEMBERSHIP_BATCH, MAX_NAME_LENGTH};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// System-assigned identifier of a student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StudentId(pub u64);

/// System-assigned identifier of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CourseId(pub u64);

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// STUDENT
// =============================================================================

/// A person who may enroll in courses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub birth_date: Option<NaiveDate>,
}

/// Input for creating a student. The id is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewStudent {
    pub name: String,
    pub birth_date: Option<NaiveDate>,
}

impl NewStudent {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            birth_date: None,
        }
    }

    #[must_use]
    pub fn born(mut self, date: NaiveDate) -> Self {
        self.birth_date = Some(date);
        self
    }

    pub fn validate(&self) -> Result<(), RosterError> {
        validate_name(&self.name)
    }
}

/// Partial update of a student.
///
/// `birth_date` is doubly optional: `None` leaves the date untouched,
/// `Some(None)` clears it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub birth_date: Option<Option<NaiveDate>>,
}

impl StudentPatch {
    pub fn validate(&self) -> Result<(), RosterError> {
        match &self.name {
            Some(name) => validate_name(name),
            None => Ok(()),
        }
    }

    /// Apply this patch to a student record in place.
    pub fn apply(self, student: &mut Student) {
        if let Some(name) = self.name {
            student.name = name;
        }
        if let Some(birth_date) = self.birth_date {
            student.birth_date = birth_date;
        }
    }
}

// =============================================================================
// COURSE
// =============================================================================

/// An entity students enroll in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    pub students: BTreeSet<StudentId>,
}

impl Course {
    /// Number of students currently enrolled.
    #[must_use]
    pub fn enrolled(&self) -> usize {
        self.students.len()
    }

    /// Check whether the course has reached the given capacity.
    #[must_use]
    pub fn is_full(&self, capacity: crate::Capacity) -> bool {
        capacity.is_full(self)
    }
}

/// Input for creating a course. The id is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewCourse {
    pub name: String,
    pub students: BTreeSet<StudentId>,
}

impl NewCourse {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            students: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_students(mut self, students: impl IntoIterator<Item = StudentId>) -> Self {
        self.students.extend(students);
        self
    }

    pub fn validate(&self) -> Result<(), RosterError> {
        validate_name(&self.name)?;
        validate_membership(&self.students)
    }
}

/// Partial update of a course.
///
/// A `students` value replaces the whole membership set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CoursePatch {
    pub name: Option<String>,
    pub students: Option<BTreeSet<StudentId>>,
}

impl CoursePatch {
    #[must_use]
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            students: None,
        }
    }

    pub fn validate(&self) -> Result<(), RosterError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(students) = &self.students {
            validate_membership(students)?;
        }
        Ok(())
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

fn validate_name(name: &str) -> Result<(), RosterError> {
    if name.trim().is_empty() {
        return Err(RosterError::Validation(
            "name may not be blank".to_string(),
        ));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(RosterError::Validation(format!(
            "name length {} exceeds maximum {} bytes",
            name.len(),
            MAX_NAME_LENGTH
        )));
    }
    Ok(())
}

fn validate_membership(students: &BTreeSet<StudentId>) -> Result<(), RosterError> {
    if students.len() > MAX_MEMBERSHIP_BATCH {
        return Err(RosterError::Validation(format!(
            "student list of {} exceeds maximum {}",
            students.len(),
            MAX_MEMBERSHIP_BATCH
        )));
    }
    Ok(())
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Roster system.
///
/// `CourseNotFound` / `StudentNotFound` are raised when the addressed record
/// itself is missing. `UnknownStudent` is raised when a request body refers
/// to a student that does not exist.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("Course not found: {0}")]
    CourseNotFound(CourseId),

    #[error("Student not found: {0}")]
    StudentNotFound(StudentId),

    #[error("Invalid student reference: {0}")]
    UnknownStudent(StudentId),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_name_rejected() {
        assert!(NewCourse::new("   ").validate().is_err());
        assert!(NewStudent::new("").validate().is_err());
        assert!(NewCourse::new("Math").validate().is_ok());
    }

    #[test]
    fn oversized_name_rejected() {
        let name = "x".repeat(MAX_NAME_LENGTH + 1);
        assert!(matches!(
            NewCourse::new(name).validate(),
            Err(RosterError::Validation(_))
        ));
    }

    #[test]
    fn patch_without_fields_is_valid() {
        assert!(CoursePatch::default().validate().is_ok());
        assert!(StudentPatch::default().validate().is_ok());
    }

    #[test]
    fn student_patch_clears_birth_date() {
        let date = NaiveDate::from_ymd_opt(2001, 2, 3).expect("date");
        let mut student = Student {
            id: StudentId(1),
            name: "Ann".to_string(),
            birth_date: Some(date),
        };

        StudentPatch {
            name: None,
            birth_date: Some(None),
        }
        .apply(&mut student);

        assert_eq!(student.name, "Ann");
        assert_eq!(student.birth_date, None);
    }

    #[test]
    fn course_is_full_at_capacity() {
        let course = Course {
            id: CourseId(1),
            name: "Math".to_string(),
            students: [StudentId(1), StudentId(2)].into_iter().collect(),
        };

        assert!(course.is_full(crate::Capacity::new(2)));
        assert!(course.is_full(crate::Capacity::new(0)));
        assert!(!course.is_full(crate::Capacity::new(3)));
    }

    #[test]
    fn course_membership_is_deduplicated_and_ordered() {
        let course = NewCourse::new("Math").with_students([StudentId(3), StudentId(1), StudentId(3)]);
        let ids: Vec<_> = course.students.iter().copied().collect();
        assert_eq!(ids, vec![StudentId(1), StudentId(3)]);
    }
}
