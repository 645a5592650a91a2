//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API and their
//! conversions to and from the core model.

use chrono::NaiveDate;
use roster_core::{
    CapacityReport, Course, CourseFilter, CourseId, CoursePatch, NewCourse, NewStudent,
    RosterError, Student, StudentFilter, StudentId, StudentPatch,
};
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// Body of every 4xx/5xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

// =============================================================================
// COURSE
// =============================================================================

/// Course representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseJson {
    pub id: u64,
    pub name: String,
    /// Enrolled student ids, ascending.
    pub students: Vec<u64>,
}

impl From<&Course> for CourseJson {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id.0,
            name: course.name.clone(),
            students: course.students.iter().map(|s| s.0).collect(),
        }
    }
}

/// Body of `POST /courses/` and `PUT /courses/{id}/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseRequest {
    pub name: String,
    #[serde(default)]
    pub students: Vec<u64>,
}

impl CourseRequest {
    #[must_use]
    pub fn to_new_course(&self) -> NewCourse {
        NewCourse::new(self.name.clone()).with_students(self.students.iter().copied().map(StudentId))
    }

    /// Full replacement expressed as a patch touching every field.
    #[must_use]
    pub fn to_replacement(&self) -> CoursePatch {
        CoursePatch {
            name: Some(self.name.clone()),
            students: Some(self.students.iter().copied().map(StudentId).collect()),
        }
    }
}

/// Body of `PATCH /courses/{id}/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoursePatchRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub students: Option<Vec<u64>>,
}

impl CoursePatchRequest {
    #[must_use]
    pub fn to_patch(&self) -> CoursePatch {
        CoursePatch {
            name: self.name.clone(),
            students: self
                .students
                .as_ref()
                .map(|ids| ids.iter().copied().map(StudentId).collect()),
        }
    }
}

// =============================================================================
// STUDENT
// =============================================================================

/// Student representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentJson {
    pub id: u64,
    pub name: String,
    pub birth_date: Option<NaiveDate>,
}

impl From<&Student> for StudentJson {
    fn from(student: &Student) -> Self {
        Self {
            id: student.id.0,
            name: student.name.clone(),
            birth_date: student.birth_date,
        }
    }
}

/// Body of `POST /students/` and `PUT /students/{id}/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentRequest {
    pub name: String,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
}

impl StudentRequest {
    #[must_use]
    pub fn to_new_student(&self) -> NewStudent {
        NewStudent {
            name: self.name.clone(),
            birth_date: self.birth_date,
        }
    }

    #[must_use]
    pub fn to_replacement(&self) -> StudentPatch {
        StudentPatch {
            name: Some(self.name.clone()),
            birth_date: Some(self.birth_date),
        }
    }
}

/// Body of `PATCH /students/{id}/`.
///
/// An explicit `"birth_date": null` clears the date; omitting the field
/// leaves it unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudentPatchRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub birth_date: Option<Option<NaiveDate>>,
}

impl StudentPatchRequest {
    #[must_use]
    pub fn to_patch(&self) -> StudentPatch {
        StudentPatch {
            name: self.name.clone(),
            birth_date: self.birth_date,
        }
    }
}

/// Mark a field as present, so `null` becomes `Some(None)`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

// =============================================================================
// LIST FILTER
// =============================================================================

/// Query string of the list endpoints: `?id=<n>&name=<s>`.
///
/// Kept as raw strings so an empty `id=` means "no filter" while a
/// non-numeric id is a client error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    pub id: Option<String>,
    pub name: Option<String>,
}

impl ListQuery {
    fn parse_id(&self) -> Result<Option<u64>, RosterError> {
        match self.id.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| RosterError::Validation(format!("id: '{}' is not a number", raw))),
        }
    }

    fn name(&self) -> Option<String> {
        self.name.clone().filter(|n| !n.is_empty())
    }

    pub fn to_course_filter(&self) -> Result<CourseFilter, RosterError> {
        Ok(CourseFilter {
            id: self.parse_id()?.map(CourseId),
            name: self.name(),
        })
    }

    pub fn to_student_filter(&self) -> Result<StudentFilter, RosterError> {
        Ok(StudentFilter {
            id: self.parse_id()?.map(StudentId),
            name: self.name(),
        })
    }
}

// =============================================================================
// CAPACITY RESPONSE
// =============================================================================

/// Capacity status of a course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityResponse {
    pub course_id: u64,
    pub enrolled: usize,
    pub max_students: usize,
    pub remaining: usize,
    pub is_full: bool,
}

impl From<CapacityReport> for CapacityResponse {
    fn from(report: CapacityReport) -> Self {
        Self {
            course_id: report.course.0,
            enrolled: report.enrolled,
            max_students: report.max_students,
            remaining: report.remaining,
            is_full: report.is_full,
        }
    }
}
