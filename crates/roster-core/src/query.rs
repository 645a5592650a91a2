//! # List Filters
//!
//! Exact-match filters applied to listings. All set fields must match;
//! an empty filter matches everything.

use crate::{Course, CourseId, Student, StudentId};

/// Filter over the course listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseFilter {
    pub id: Option<CourseId>,
    pub name: Option<String>,
}

impl CourseFilter {
    #[must_use]
    pub fn by_id(id: CourseId) -> Self {
        Self {
            id: Some(id),
            name: None,
        }
    }

    #[must_use]
    pub fn matches(&self, course: &Course) -> bool {
        self.id.is_none_or(|id| course.id == id)
            && self.name.as_deref().is_none_or(|name| course.name == name)
    }
}

/// Filter over the student listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentFilter {
    pub id: Option<StudentId>,
    pub name: Option<String>,
}

impl StudentFilter {
    #[must_use]
    pub fn matches(&self, student: &Student) -> bool {
        self.id.is_none_or(|id| student.id == id)
            && self.name.as_deref().is_none_or(|name| student.name == name)
    }
}
