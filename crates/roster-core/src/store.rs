//! # Entity Store
//!
//! The `RosterStore` trait defines the storage operations over students,
//! courses and their membership. This module also provides `MemoryStore`,
//! the in-memory implementation. The disk-backed implementation lives in
//! [`crate::storage`].
//!
//! All data structures use `BTreeMap` so listing order equals id order,
//! which equals creation order.

use crate::primitives::FIRST_ID;
use crate::{
    Course, CourseId, CoursePatch, NewCourse, NewStudent, RosterError, Student, StudentId,
    StudentPatch,
};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// ROSTERSTORE TRAIT
// =============================================================================

/// Storage operations over students, courses and membership.
///
/// Every mutating operation is all-or-nothing: when it returns an error,
/// nothing was written. Ids are never reused after deletion.
pub trait RosterStore {
    /// Create a student and return it with its assigned id.
    fn insert_student(&mut self, new: NewStudent) -> Result<Student, RosterError>;

    fn get_student(&self, id: StudentId) -> Result<Option<Student>, RosterError>;

    /// All students in creation order.
    fn list_students(&self) -> Result<Vec<Student>, RosterError>;

    fn update_student(
        &mut self,
        id: StudentId,
        patch: StudentPatch,
    ) -> Result<Student, RosterError>;

    /// Delete a student and remove it from every course it belongs to.
    fn delete_student(&mut self, id: StudentId) -> Result<(), RosterError>;

    fn student_count(&self) -> Result<usize, RosterError>;

    /// Create a course. Every referenced student must exist; otherwise
    /// `RosterError::UnknownStudent` is returned.
    fn insert_course(&mut self, new: NewCourse) -> Result<Course, RosterError>;

    fn get_course(&self, id: CourseId) -> Result<Option<Course>, RosterError>;

    /// All courses in creation order.
    fn list_courses(&self) -> Result<Vec<Course>, RosterError>;

    /// Apply a partial update. A `students` value replaces the membership.
    fn update_course(&mut self, id: CourseId, patch: CoursePatch)
    -> Result<Course, RosterError>;

    /// Delete a course together with its memberships.
    fn delete_course(&mut self, id: CourseId) -> Result<(), RosterError>;

    fn course_count(&self) -> Result<usize, RosterError>;

    /// Add a student to a course. Enrolling twice is a no-op.
    fn enroll(&mut self, course: CourseId, student: StudentId) -> Result<Course, RosterError>;

    /// Remove a student from a course. Removing a non-member is a no-op.
    fn unenroll(&mut self, course: CourseId, student: StudentId) -> Result<Course, RosterError>;
}

/// Advance an id counter, returning the id to hand out.
pub(crate) fn allocate_id(next: &mut u64) -> Result<u64, RosterError> {
    let id = *next;
    *next = id
        .checked_add(1)
        .ok_or_else(|| RosterError::IoError("id space exhausted".to_string()))?;
    Ok(id)
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// In-memory store. Fast and volatile.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    students: BTreeMap<StudentId, Student>,
    courses: BTreeMap<CourseId, Course>,
    next_student_id: u64,
    next_course_id: u64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            students: BTreeMap::new(),
            courses: BTreeMap::new(),
            next_student_id: FIRST_ID,
            next_course_id: FIRST_ID,
        }
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn check_students(&self, students: &BTreeSet<StudentId>) -> Result<(), RosterError> {
        match students.iter().find(|id| !self.students.contains_key(id)) {
            Some(missing) => Err(RosterError::UnknownStudent(*missing)),
            None => Ok(()),
        }
    }

    fn course_mut(&mut self, id: CourseId) -> Result<&mut Course, RosterError> {
        self.courses
            .get_mut(&id)
            .ok_or(RosterError::CourseNotFound(id))
    }
}

impl RosterStore for MemoryStore {
    fn insert_student(&mut self, new: NewStudent) -> Result<Student, RosterError> {
        new.validate()?;
        let id = StudentId(allocate_id(&mut self.next_student_id)?);
        let student = Student {
            id,
            name: new.name,
            birth_date: new.birth_date,
        };
        self.students.insert(id, student.clone());
        Ok(student)
    }

    fn get_student(&self, id: StudentId) -> Result<Option<Student>, RosterError> {
        Ok(self.students.get(&id).cloned())
    }

    fn list_students(&self) -> Result<Vec<Student>, RosterError> {
        Ok(self.students.values().cloned().collect())
    }

    fn update_student(
        &mut self,
        id: StudentId,
        patch: StudentPatch,
    ) -> Result<Student, RosterError> {
        let student = self
            .students
            .get_mut(&id)
            .ok_or(RosterError::StudentNotFound(id))?;
        patch.validate()?;
        patch.apply(student);
        Ok(student.clone())
    }

    fn delete_student(&mut self, id: StudentId) -> Result<(), RosterError> {
        if self.students.remove(&id).is_none() {
            return Err(RosterError::StudentNotFound(id));
        }
        for course in self.courses.values_mut() {
            course.students.remove(&id);
        }
        Ok(())
    }

    fn student_count(&self) -> Result<usize, RosterError> {
        Ok(self.students.len())
    }

    fn insert_course(&mut self, new: NewCourse) -> Result<Course, RosterError> {
        new.validate()?;
        self.check_students(&new.students)?;
        let id = CourseId(allocate_id(&mut self.next_course_id)?);
        let course = Course {
            id,
            name: new.name,
            students: new.students,
        };
        self.courses.insert(id, course.clone());
        Ok(course)
    }

    fn get_course(&self, id: CourseId) -> Result<Option<Course>, RosterError> {
        Ok(self.courses.get(&id).cloned())
    }

    fn list_courses(&self) -> Result<Vec<Course>, RosterError> {
        Ok(self.courses.values().cloned().collect())
    }

    fn update_course(
        &mut self,
        id: CourseId,
        patch: CoursePatch,
    ) -> Result<Course, RosterError> {
        if !self.courses.contains_key(&id) {
            return Err(RosterError::CourseNotFound(id));
        }
        patch.validate()?;
        if let Some(students) = &patch.students {
            self.check_students(students)?;
        }

        let course = self.course_mut(id)?;
        if let Some(name) = patch.name {
            course.name = name;
        }
        if let Some(students) = patch.students {
            course.students = students;
        }
        Ok(course.clone())
    }

    fn delete_course(&mut self, id: CourseId) -> Result<(), RosterError> {
        self.courses
            .remove(&id)
            .map(|_| ())
            .ok_or(RosterError::CourseNotFound(id))
    }

    fn course_count(&self) -> Result<usize, RosterError> {
        Ok(self.courses.len())
    }

    fn enroll(&mut self, course: CourseId, student: StudentId) -> Result<Course, RosterError> {
        if !self.courses.contains_key(&course) {
            return Err(RosterError::CourseNotFound(course));
        }
        if !self.students.contains_key(&student) {
            return Err(RosterError::StudentNotFound(student));
        }
        let record = self.course_mut(course)?;
        record.students.insert(student);
        Ok(record.clone())
    }

    fn unenroll(&mut self, course: CourseId, student: StudentId) -> Result<Course, RosterError> {
        if !self.courses.contains_key(&course) {
            return Err(RosterError::CourseNotFound(course));
        }
        if !self.students.contains_key(&student) {
            return Err(RosterError::StudentNotFound(student));
        }
        let record = self.course_mut(course)?;
        record.students.remove(&student);
        Ok(record.clone())
    }
}

// =============================================================================
// TESTS
// =============================================================================
