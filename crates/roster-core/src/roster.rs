//! # Roster Facade
//!
//! `Roster` combines a storage backend with the configured course capacity.
//! It is the single entry point used by the HTTP API and the CLI.
//!
//! ## Storage Backends
//!
//! - `InMemory`: uses `MemoryStore` (fast, volatile)
//! - `Persistent`: uses `RedbStore` for disk-backed ACID storage

use crate::capacity::{Capacity, CapacityReport};
use crate::config::RosterConfig;
use crate::query::{CourseFilter, StudentFilter};
use crate::storage::RedbStore;
use crate::store::{MemoryStore, RosterStore};
use crate::{
    Course, CourseId, CoursePatch, NewCourse, NewStudent, RosterError, Student, StudentId,
    StudentPatch,
};
use std::path::Path;

/// Storage backend for a Roster.
#[derive(Debug)]
pub enum StorageBackend {
    InMemory(MemoryStore),
    Persistent(RedbStore),
}

impl Default for StorageBackend {
    fn default() -> Self {
        Self::InMemory(MemoryStore::new())
    }
}

/// Enrollment data plus the capacity rule applied to it.
#[derive(Debug, Default)]
pub struct Roster {
    backend: StorageBackend,
    capacity: Capacity,
}

impl Roster {
    /// Create an empty in-memory roster with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty in-memory roster with the given capacity.
    #[must_use]
    pub fn with_capacity(capacity: Capacity) -> Self {
        Self {
            backend: StorageBackend::default(),
            capacity,
        }
    }

    /// Open or create a redb-backed roster.
    pub fn with_redb(path: impl AsRef<Path>, capacity: Capacity) -> Result<Self, RosterError> {
        Ok(Self {
            backend: StorageBackend::Persistent(RedbStore::open(path)?),
            capacity,
        })
    }

    /// Open a roster for the named backend (`"memory"` or `"redb"`).
    pub fn open(backend: &str, path: &Path, config: &RosterConfig) -> Result<Self, RosterError> {
        match backend {
            "redb" => Self::with_redb(path, config.capacity()),
            "memory" => Ok(Self::with_capacity(config.capacity())),
            other => Err(RosterError::ConfigError(format!(
                "Unknown backend: {}. Use: memory, redb",
                other
            ))),
        }
    }

    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(self.backend, StorageBackend::Persistent(_))
    }

    #[must_use]
    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    fn store(&self) -> &dyn RosterStore {
        match &self.backend {
            StorageBackend::InMemory(store) => store,
            StorageBackend::Persistent(store) => store,
        }
    }

    fn store_mut(&mut self) -> &mut dyn RosterStore {
        match &mut self.backend {
            StorageBackend::InMemory(store) => store,
            StorageBackend::Persistent(store) => store,
        }
    }

    // =========================================================================
    // STUDENTS
    // =========================================================================

    pub fn create_student(&mut self, new: NewStudent) -> Result<Student, RosterError> {
        self.store_mut().insert_student(new)
    }

    /// Fetch a student, failing with `StudentNotFound` when absent.
    pub fn student(&self, id: StudentId) -> Result<Student, RosterError> {
        self.store()
            .get_student(id)?
            .ok_or(RosterError::StudentNotFound(id))
    }

    pub fn students(&self, filter: &StudentFilter) -> Result<Vec<Student>, RosterError> {
        let mut students = self.store().list_students()?;
        students.retain(|s| filter.matches(s));
        Ok(students)
    }

    pub fn update_student(
        &mut self,
        id: StudentId,
        patch: StudentPatch,
    ) -> Result<Student, RosterError> {
        self.store_mut().update_student(id, patch)
    }

    pub fn delete_student(&mut self, id: StudentId) -> Result<(), RosterError> {
        self.store_mut().delete_student(id)
    }

    pub fn student_count(&self) -> Result<usize, RosterError> {
        self.store().student_count()
    }

    // =========================================================================
    // COURSES
    // =========================================================================

    pub fn create_course(&mut self, new: NewCourse) -> Result<Course, RosterError> {
        self.store_mut().insert_course(new)
    }

    /// Fetch a course, failing with `CourseNotFound` when absent.
    pub fn course(&self, id: CourseId) -> Result<Course, RosterError> {
        self.store()
            .get_course(id)?
            .ok_or(RosterError::CourseNotFound(id))
    }

    /// List courses in creation order, keeping those matching `filter`.
    pub fn courses(&self, filter: &CourseFilter) -> Result<Vec<Course>, RosterError> {
        if let Some(id) = filter.id {
            return Ok(self
                .store()
                .get_course(id)?
                .into_iter()
                .filter(|c| filter.matches(c))
                .collect());
        }
        let mut courses = self.store().list_courses()?;
        courses.retain(|c| filter.matches(c));
        Ok(courses)
    }

    pub fn update_course(
        &mut self,
        id: CourseId,
        patch: CoursePatch,
    ) -> Result<Course, RosterError> {
        self.store_mut().update_course(id, patch)
    }

    pub fn delete_course(&mut self, id: CourseId) -> Result<(), RosterError> {
        self.store_mut().delete_course(id)
    }

    pub fn course_count(&self) -> Result<usize, RosterError> {
        self.store().course_count()
    }

    // =========================================================================
    // MEMBERSHIP & CAPACITY
    // =========================================================================

    pub fn enroll(&mut self, course: CourseId, student: StudentId) -> Result<Course, RosterError> {
        self.store_mut().enroll(course, student)
    }

    pub fn unenroll(
        &mut self,
        course: CourseId,
        student: StudentId,
    ) -> Result<Course, RosterError> {
        self.store_mut().unenroll(course, student)
    }

    /// Whether the course has reached the configured capacity.
    ///
    /// Recomputed from current membership on every call.
    pub fn is_full(&self, id: CourseId) -> Result<bool, RosterError> {
        Ok(self.capacity.is_full(&self.course(id)?))
    }

    pub fn capacity_report(&self, id: CourseId) -> Result<CapacityReport, RosterError> {
        Ok(self.capacity.report(&self.course(id)?))
    }
}

// =============================================================================
// TESTS
// =============================================================================
