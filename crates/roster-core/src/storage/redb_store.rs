//! # redb-backed Roster Storage
//!
//! A disk-backed store using the redb embedded database, providing:
//! - ACID transactions (one write transaction per operation)
//! - Crash safety (copy-on-write B-trees)
//! - MVCC (concurrent readers, single writer)
//!
//! ## Layout
//!
//! Membership is stored twice, keyed `(course, student)` and
//! `(student, course)`, so both "students of a course" and "courses of a
//! student" are single range scans. Both tables are always written in the
//! same transaction.

use crate::primitives::FIRST_ID;
use crate::store::{RosterStore, allocate_id};
use crate::{
    Course, CourseId, CoursePatch, NewCourse, NewStudent, RosterError, Student, StudentId,
    StudentPatch,
};
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::collections::BTreeSet;
use std::path::Path;

/// Table for students: StudentId(u64) -> serialized Student bytes
const STUDENTS: TableDefinition<u64, &[u8]> = TableDefinition::new("students");

/// Table for courses: CourseId(u64) -> serialized CourseRecord bytes
const COURSES: TableDefinition<u64, &[u8]> = TableDefinition::new("courses");

/// Membership by course: (course_id, student_id) -> ()
const ENROLLMENTS: TableDefinition<(u64, u64), ()> = TableDefinition::new("enrollments");

/// Membership by student: (student_id, course_id) -> ()
const ENROLLMENTS_BY_STUDENT: TableDefinition<(u64, u64), ()> =
    TableDefinition::new("enrollments_by_student");

/// Table for metadata: key string -> value u64
const METADATA: TableDefinition<&str, u64> = TableDefinition::new("metadata");

const NEXT_STUDENT_ID: &str = "next_student_id";
const NEXT_COURSE_ID: &str = "next_course_id";

/// Course columns other than membership.
#[derive(Debug, Serialize, Deserialize)]
struct CourseRecord {
    name: String,
}

fn io_err(e: impl std::fmt::Display) -> RosterError {
    RosterError::IoError(e.to_string())
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, RosterError> {
    postcard::to_allocvec(value).map_err(|e| RosterError::SerializationError(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, RosterError> {
    postcard::from_bytes(bytes).map_err(|e| RosterError::SerializationError(e.to_string()))
}

/// Second components of every key in `table` whose first component is `first`.
fn keys_under(
    table: &impl ReadableTable<(u64, u64), ()>,
    first: u64,
) -> Result<Vec<u64>, RosterError> {
    let mut out = Vec::new();
    for entry in table.range((first, 0)..=(first, u64::MAX)).map_err(io_err)? {
        let (key, _) = entry.map_err(io_err)?;
        out.push(key.value().1);
    }
    Ok(out)
}

fn load_course(
    courses: &impl ReadableTable<u64, &'static [u8]>,
    enrollments: &impl ReadableTable<(u64, u64), ()>,
    id: CourseId,
) -> Result<Option<Course>, RosterError> {
    let Some(record) = courses
        .get(id.0)
        .map_err(io_err)?
        .map(|data| decode::<CourseRecord>(data.value()))
        .transpose()?
    else {
        return Ok(None);
    };

    let students: BTreeSet<StudentId> = keys_under(enrollments, id.0)?
        .into_iter()
        .map(StudentId)
        .collect();

    Ok(Some(Course {
        id,
        name: record.name,
        students,
    }))
}

fn check_students(
    students: &impl ReadableTable<u64, &'static [u8]>,
    ids: &BTreeSet<StudentId>,
) -> Result<(), RosterError> {
    for id in ids {
        if students.get(id.0).map_err(io_err)?.is_none() {
            return Err(RosterError::UnknownStudent(*id));
        }
    }
    Ok(())
}

/// A disk-backed roster store using redb.
///
/// Id counters are cached in memory and only advanced after the
/// transaction that consumed them commits.
pub struct RedbStore {
    db: Database,
    next_student_id: u64,
    next_course_id: u64,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore")
            .field("next_student_id", &self.next_student_id)
            .field("next_course_id", &self.next_course_id)
            .finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a roster database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RosterError> {
        let db = Database::create(path.as_ref()).map_err(io_err)?;

        // Initialize tables if they don't exist
        {
            let write_txn = db.begin_write().map_err(io_err)?;
            let _ = write_txn.open_table(STUDENTS).map_err(io_err)?;
            let _ = write_txn.open_table(COURSES).map_err(io_err)?;
            let _ = write_txn.open_table(ENROLLMENTS).map_err(io_err)?;
            let _ = write_txn.open_table(ENROLLMENTS_BY_STUDENT).map_err(io_err)?;
            let _ = write_txn.open_table(METADATA).map_err(io_err)?;
            write_txn.commit().map_err(io_err)?;
        }

        let (next_student_id, next_course_id) = {
            let read_txn = db.begin_read().map_err(io_err)?;
            let table = read_txn.open_table(METADATA).map_err(io_err)?;
            let read = |key: &str| -> Result<u64, RosterError> {
                Ok(table
                    .get(key)
                    .map_err(io_err)?
                    .map(|v| v.value())
                    .unwrap_or(FIRST_ID))
            };
            (read(NEXT_STUDENT_ID)?, read(NEXT_COURSE_ID)?)
        };

        Ok(Self {
            db,
            next_student_id,
            next_course_id,
        })
    }

    /// Compact the database file.
    pub fn compact(&mut self) -> Result<(), RosterError> {
        self.db.compact().map_err(io_err)?;
        Ok(())
    }

    /// Shared body of `enroll` / `unenroll`.
    fn set_membership(
        &mut self,
        course: CourseId,
        student: StudentId,
        member: bool,
    ) -> Result<Course, RosterError> {
        let write_txn = self.db.begin_write().map_err(io_err)?;
        let updated = {
            let courses = write_txn.open_table(COURSES).map_err(io_err)?;
            let students = write_txn.open_table(STUDENTS).map_err(io_err)?;
            let mut enrollments = write_txn.open_table(ENROLLMENTS).map_err(io_err)?;
            let mut by_student = write_txn
                .open_table(ENROLLMENTS_BY_STUDENT)
                .map_err(io_err)?;

            if courses.get(course.0).map_err(io_err)?.is_none() {
                return Err(RosterError::CourseNotFound(course));
            }
            if students.get(student.0).map_err(io_err)?.is_none() {
                return Err(RosterError::StudentNotFound(student));
            }

            if member {
                enrollments
                    .insert((course.0, student.0), ())
                    .map_err(io_err)?;
                by_student
                    .insert((student.0, course.0), ())
                    .map_err(io_err)?;
            } else {
                enrollments
                    .remove((course.0, student.0))
                    .map_err(io_err)?;
                by_student
                    .remove((student.0, course.0))
                    .map_err(io_err)?;
            }

            load_course(&courses, &enrollments, course)?
                .ok_or(RosterError::CourseNotFound(course))?
        };
        write_txn.commit().map_err(io_err)?;
        Ok(updated)
    }
}

// =============================================================================
// ROSTERSTORE TRAIT IMPLEMENTATION
// =============================================================================

impl RosterStore for RedbStore {
    fn insert_student(&mut self, new: NewStudent) -> Result<Student, RosterError> {
        new.validate()?;

        let mut next = self.next_student_id;
        let id = StudentId(allocate_id(&mut next)?);
        let student = Student {
            id,
            name: new.name,
            birth_date: new.birth_date,
        };
        let bytes = encode(&student)?;

        let write_txn = self.db.begin_write().map_err(io_err)?;
        {
            let mut students = write_txn.open_table(STUDENTS).map_err(io_err)?;
            students.insert(id.0, bytes.as_slice()).map_err(io_err)?;
            let mut meta = write_txn.open_table(METADATA).map_err(io_err)?;
            meta.insert(NEXT_STUDENT_ID, next).map_err(io_err)?;
        }
        write_txn.commit().map_err(io_err)?;

        // Update in-memory state only after successful commit.
        self.next_student_id = next;
        Ok(student)
    }

    fn get_student(&self, id: StudentId) -> Result<Option<Student>, RosterError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let students = read_txn.open_table(STUDENTS).map_err(io_err)?;
        students
            .get(id.0)
            .map_err(io_err)?
            .map(|data| decode::<Student>(data.value()))
            .transpose()
    }

    fn list_students(&self) -> Result<Vec<Student>, RosterError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let students = read_txn.open_table(STUDENTS).map_err(io_err)?;

        let mut out = Vec::new();
        for entry in students.iter().map_err(io_err)? {
            let (_, value) = entry.map_err(io_err)?;
            out.push(decode::<Student>(value.value())?);
        }
        Ok(out)
    }

    fn update_student(
        &mut self,
        id: StudentId,
        patch: StudentPatch,
    ) -> Result<Student, RosterError> {
        let write_txn = self.db.begin_write().map_err(io_err)?;
        let student = {
            let mut students = write_txn.open_table(STUDENTS).map_err(io_err)?;
            let mut student = students
                .get(id.0)
                .map_err(io_err)?
                .map(|data| decode::<Student>(data.value()))
                .transpose()?
                .ok_or(RosterError::StudentNotFound(id))?;

            patch.validate()?;
            patch.apply(&mut student);

            let bytes = encode(&student)?;
            students.insert(id.0, bytes.as_slice()).map_err(io_err)?;
            student
        };
        write_txn.commit().map_err(io_err)?;
        Ok(student)
    }

    fn delete_student(&mut self, id: StudentId) -> Result<(), RosterError> {
        let write_txn = self.db.begin_write().map_err(io_err)?;
        {
            let mut students = write_txn.open_table(STUDENTS).map_err(io_err)?;
            if students.remove(id.0).map_err(io_err)?.is_none() {
                return Err(RosterError::StudentNotFound(id));
            }

            let mut enrollments = write_txn.open_table(ENROLLMENTS).map_err(io_err)?;
            let mut by_student = write_txn
                .open_table(ENROLLMENTS_BY_STUDENT)
                .map_err(io_err)?;

            for course in keys_under(&by_student, id.0)? {
                enrollments.remove((course, id.0)).map_err(io_err)?;
                by_student.remove((id.0, course)).map_err(io_err)?;
            }
        }
        write_txn.commit().map_err(io_err)?;
        Ok(())
    }

    fn student_count(&self) -> Result<usize, RosterError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let students = read_txn.open_table(STUDENTS).map_err(io_err)?;
        Ok(students.len().map_err(io_err)? as usize)
    }

    fn insert_course(&mut self, new: NewCourse) -> Result<Course, RosterError> {
        new.validate()?;

        let mut next = self.next_course_id;
        let id = CourseId(allocate_id(&mut next)?);
        let bytes = encode(&CourseRecord {
            name: new.name.clone(),
        })?;

        let write_txn = self.db.begin_write().map_err(io_err)?;
        {
            let students = write_txn.open_table(STUDENTS).map_err(io_err)?;
            check_students(&students, &new.students)?;

            let mut courses = write_txn.open_table(COURSES).map_err(io_err)?;
            courses.insert(id.0, bytes.as_slice()).map_err(io_err)?;

            let mut enrollments = write_txn.open_table(ENROLLMENTS).map_err(io_err)?;
            let mut by_student = write_txn
                .open_table(ENROLLMENTS_BY_STUDENT)
                .map_err(io_err)?;
            for student in &new.students {
                enrollments.insert((id.0, student.0), ()).map_err(io_err)?;
                by_student.insert((student.0, id.0), ()).map_err(io_err)?;
            }

            let mut meta = write_txn.open_table(METADATA).map_err(io_err)?;
            meta.insert(NEXT_COURSE_ID, next).map_err(io_err)?;
        }
        write_txn.commit().map_err(io_err)?;

        self.next_course_id = next;
        Ok(Course {
            id,
            name: new.name,
            students: new.students,
        })
    }

    fn get_course(&self, id: CourseId) -> Result<Option<Course>, RosterError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let courses = read_txn.open_table(COURSES).map_err(io_err)?;
        let enrollments = read_txn.open_table(ENROLLMENTS).map_err(io_err)?;
        load_course(&courses, &enrollments, id)
    }

    fn list_courses(&self) -> Result<Vec<Course>, RosterError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let courses = read_txn.open_table(COURSES).map_err(io_err)?;
        let enrollments = read_txn.open_table(ENROLLMENTS).map_err(io_err)?;

        let mut out = Vec::new();
        for entry in courses.iter().map_err(io_err)? {
            let (key, value) = entry.map_err(io_err)?;
            let record: CourseRecord = decode(value.value())?;
            let id = key.value();
            let students = keys_under(&enrollments, id)?
                .into_iter()
                .map(StudentId)
                .collect();
            out.push(Course {
                id: CourseId(id),
                name: record.name,
                students,
            });
        }
        Ok(out)
    }

    fn update_course(
        &mut self,
        id: CourseId,
        patch: CoursePatch,
    ) -> Result<Course, RosterError> {
        let write_txn = self.db.begin_write().map_err(io_err)?;
        let course = {
            let mut courses = write_txn.open_table(COURSES).map_err(io_err)?;
            let mut record = courses
                .get(id.0)
                .map_err(io_err)?
                .map(|data| decode::<CourseRecord>(data.value()))
                .transpose()?
                .ok_or(RosterError::CourseNotFound(id))?;

            patch.validate()?;

            let mut enrollments = write_txn.open_table(ENROLLMENTS).map_err(io_err)?;
            if let Some(replacement) = &patch.students {
                let students = write_txn.open_table(STUDENTS).map_err(io_err)?;
                check_students(&students, replacement)?;

                let mut by_student = write_txn
                    .open_table(ENROLLMENTS_BY_STUDENT)
                    .map_err(io_err)?;
                for student in keys_under(&enrollments, id.0)? {
                    enrollments.remove((id.0, student)).map_err(io_err)?;
                    by_student.remove((student, id.0)).map_err(io_err)?;
                }
                for student in replacement {
                    enrollments.insert((id.0, student.0), ()).map_err(io_err)?;
                    by_student.insert((student.0, id.0), ()).map_err(io_err)?;
                }
            }

            if let Some(name) = patch.name {
                record.name = name;
                let bytes = encode(&record)?;
                courses.insert(id.0, bytes.as_slice()).map_err(io_err)?;
            }

            load_course(&courses, &enrollments, id)?.ok_or(RosterError::CourseNotFound(id))?
        };
        write_txn.commit().map_err(io_err)?;
        Ok(course)
    }

    fn delete_course(&mut self, id: CourseId) -> Result<(), RosterError> {
        let write_txn = self.db.begin_write().map_err(io_err)?;
        {
            let mut courses = write_txn.open_table(COURSES).map_err(io_err)?;
            if courses.remove(id.0).map_err(io_err)?.is_none() {
                return Err(RosterError::CourseNotFound(id));
            }

            let mut enrollments = write_txn.open_table(ENROLLMENTS).map_err(io_err)?;
            let mut by_student = write_txn
                .open_table(ENROLLMENTS_BY_STUDENT)
                .map_err(io_err)?;
            for student in keys_under(&enrollments, id.0)? {
                enrollments.remove((id.0, student)).map_err(io_err)?;
                by_student.remove((student, id.0)).map_err(io_err)?;
            }
        }
        write_txn.commit().map_err(io_err)?;
        Ok(())
    }

    fn course_count(&self) -> Result<usize, RosterError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let courses = read_txn.open_table(COURSES).map_err(io_err)?;
        Ok(courses.len().map_err(io_err)? as usize)
    }

    fn enroll(&mut self, course: CourseId, student: StudentId) -> Result<Course, RosterError> {
        self.set_membership(course, student, true)
    }

    fn unenroll(&mut self, course: CourseId, student: StudentId) -> Result<Course, RosterError> {
        self.set_membership(course, student, false)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    #[test]
    fn basic_operations() {
        let temp = tempdir().expect("temp dir");
        let mut store = RedbStore::open(temp.path().join("test.redb")).expect("open db");

        let ann = store.insert_student(NewStudent::new("Ann")).expect("insert");
        let course = store
            .insert_course(NewCourse::new("Math").with_students([ann.id]))
            .expect("insert");

        assert_eq!(ann.id, StudentId(1));
        assert_eq!(course.id, CourseId(1));
        assert_eq!(store.course_count().expect("count"), 1);
        assert_eq!(store.student_count().expect("count"), 1);

        let loaded = store.get_course(course.id).expect("get").expect("exists");
        assert_eq!(loaded, course);
    }

    #[test]
    fn recovery_persistence_after_reopen() {
        let temp = tempdir().expect("temp dir");
        let db_path = temp.path().join("test.redb");
        let birth = NaiveDate::from_ymd_opt(2000, 1, 31).expect("date");

        // Phase 1: create data
        {
            let mut store = RedbStore::open(&db_path).expect("open db");
            let ann = store
                .insert_student(NewStudent::new("Ann").born(birth))
                .expect("insert");
            store
                .insert_course(NewCourse::new("Math").with_students([ann.id]))
                .expect("insert");
        }

        // Phase 2: verify data and counters survived
        {
            let mut store = RedbStore::open(&db_path).expect("reopen db");
            let ann = store
                .get_student(StudentId(1))
                .expect("get")
                .expect("exists");
            assert_eq!(ann.birth_date, Some(birth));

            let course = store.get_course(CourseId(1)).expect("get").expect("exists");
            assert!(course.students.contains(&StudentId(1)));

            let next = store.insert_course(NewCourse::new("Art")).expect("insert");
            assert_eq!(next.id, CourseId(2));
        }
    }

    #[test]
    fn ids_not_reused_after_delete_and_reopen() {
        let temp = tempdir().expect("temp dir");
        let db_path = temp.path().join("test.redb");

        {
            let mut store = RedbStore::open(&db_path).expect("open db");
            let course = store.insert_course(NewCourse::new("A")).expect("insert");
            store.delete_course(course.id).expect("delete");
        }

        let mut store = RedbStore::open(&db_path).expect("reopen db");
        let course = store.insert_course(NewCourse::new("B")).expect("insert");
        assert_eq!(course.id, CourseId(2));
    }

    #[test]
    fn unknown_student_aborts_course_insert() {
        let temp = tempdir().expect("temp dir");
        let mut store = RedbStore::open(temp.path().join("test.redb")).expect("open db");

        let result = store.insert_course(NewCourse::new("Math").with_students([StudentId(5)]));
        assert!(matches!(result, Err(RosterError::UnknownStudent(StudentId(5)))));
        assert_eq!(store.course_count().expect("count"), 0);

        // The aborted insert must not consume an id.
        let course = store.insert_course(NewCourse::new("Math")).expect("insert");
        assert_eq!(course.id, CourseId(1));
    }

    #[test]
    fn delete_student_clears_both_membership_tables() {
        let temp = tempdir().expect("temp dir");
        let mut store = RedbStore::open(temp.path().join("test.redb")).expect("open db");

        let ann = store.insert_student(NewStudent::new("Ann")).expect("insert");
        let bob = store.insert_student(NewStudent::new("Bob")).expect("insert");
        let math = store
            .insert_course(NewCourse::new("Math").with_students([ann.id, bob.id]))
            .expect("insert");
        let art = store
            .insert_course(NewCourse::new("Art").with_students([ann.id]))
            .expect("insert");

        store.delete_student(ann.id).expect("delete");

        let math = store.get_course(math.id).expect("get").expect("exists");
        let art = store.get_course(art.id).expect("get").expect("exists");
        assert_eq!(math.students.into_iter().collect::<Vec<_>>(), vec![bob.id]);
        assert!(art.students.is_empty());
    }

    #[test]
    fn delete_course_then_delete_student_succeeds() {
        let temp = tempdir().expect("temp dir");
        let mut store = RedbStore::open(temp.path().join("test.redb")).expect("open db");

        let ann = store.insert_student(NewStudent::new("Ann")).expect("insert");
        let math = store
            .insert_course(NewCourse::new("Math").with_students([ann.id]))
            .expect("insert");

        store.delete_course(math.id).expect("delete course");
        assert!(store.get_course(math.id).expect("get").is_none());
        store.delete_student(ann.id).expect("delete student");
        assert_eq!(store.student_count().expect("count"), 0);
    }

    #[test]
    fn enroll_and_unenroll() {
        let temp = tempdir().expect("temp dir");
        let mut store = RedbStore::open(temp.path().join("test.redb")).expect("open db");

        let ann = store.insert_student(NewStudent::new("Ann")).expect("insert");
        let math = store.insert_course(NewCourse::new("Math")).expect("insert");

        let enrolled = store.enroll(math.id, ann.id).expect("enroll");
        assert_eq!(enrolled.enrolled(), 1);

        let dropped = store.unenroll(math.id, ann.id).expect("unenroll");
        assert_eq!(dropped.enrolled(), 0);

        assert!(matches!(
            store.enroll(CourseId(9), ann.id),
            Err(RosterError::CourseNotFound(CourseId(9)))
        ));
        assert!(matches!(
            store.enroll(math.id, StudentId(9)),
            Err(RosterError::StudentNotFound(StudentId(9)))
        ));
    }

    #[test]
    fn update_course_rename_keeps_members() {
        let temp = tempdir().expect("temp dir");
        let mut store = RedbStore::open(temp.path().join("test.redb")).expect("open db");

        let ann = store.insert_student(NewStudent::new("Ann")).expect("insert");
        let math = store
            .insert_course(NewCourse::new("Math").with_students([ann.id]))
            .expect("insert");

        let renamed = store
            .update_course(math.id, CoursePatch::rename("Algebra"))
            .expect("update");
        assert_eq!(renamed.name, "Algebra");
        assert!(renamed.students.contains(&ann.id));
    }

    #[test]
    fn update_student_clears_birth_date() {
        let temp = tempdir().expect("temp dir");
        let mut store = RedbStore::open(temp.path().join("test.redb")).expect("open db");
        let birth = NaiveDate::from_ymd_opt(1999, 12, 1).expect("date");

        let ann = store
            .insert_student(NewStudent::new("Ann").born(birth))
            .expect("insert");
        let updated = store
            .update_student(
                ann.id,
                StudentPatch {
                    name: Some("Anna".to_string()),
                    birth_date: Some(None),
                },
            )
            .expect("update");

        assert_eq!(updated.name, "Anna");
        assert_eq!(updated.birth_date, None);
        assert_eq!(
            store.get_student(ann.id).expect("get").expect("exists"),
            updated
        );
    }

    #[test]
    fn recovery_compact_and_reopen() {
        let temp = tempdir().expect("temp dir");
        let db_path = temp.path().join("test.redb");

        {
            let mut store = RedbStore::open(&db_path).expect("open db");
            for i in 0..50 {
                store
                    .insert_course(NewCourse::new(format!("course-{i}")))
                    .expect("insert");
            }
            store.compact().expect("compact");
        }

        let store = RedbStore::open(&db_path).expect("reopen db");
        assert_eq!(store.course_count().expect("count"), 50);
        let names: Vec<_> = store
            .list_courses()
            .expect("list")
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names.first().map(String::as_str), Some("course-0"));
        assert_eq!(names.last().map(String::as_str), Some("course-49"));
    }
}
