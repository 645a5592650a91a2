//! # Property-Based Tests
//!
//! Invariants of id assignment, listing order and the capacity rule.

use proptest::collection::vec;
use proptest::prelude::*;
use roster_core::{
    Capacity, CourseFilter, CourseId, MemoryStore, NewCourse, NewStudent, Roster, RosterStore,
    StudentId,
};

proptest! {
    /// `is_full` holds exactly when enrolled >= capacity.
    #[test]
    fn is_full_matches_threshold(max in 0usize..40, enrolled in 0usize..40) {
        let mut roster = Roster::with_capacity(Capacity::new(max));
        let students: Vec<StudentId> = (0..enrolled)
            .map(|i| roster.create_student(NewStudent::new(format!("s{i}"))).expect("student").id)
            .collect();
        let course = roster
            .create_course(NewCourse::new("Math").with_students(students))
            .expect("course");

        prop_assert_eq!(roster.is_full(course.id).expect("is_full"), enrolled >= max);
    }

    /// Listing returns exactly the surviving courses, in creation order.
    #[test]
    fn listing_follows_creation_order(deletions in vec(any::<bool>(), 1..30)) {
        let mut store = MemoryStore::new();
        let mut expected = Vec::new();

        for (i, delete) in deletions.iter().enumerate() {
            let course = store.insert_course(NewCourse::new(format!("c{i}"))).expect("insert");
            if *delete {
                store.delete_course(course.id).expect("delete");
            } else {
                expected.push(course.id);
            }
        }

        let listed: Vec<CourseId> = store
            .list_courses()
            .expect("list")
            .into_iter()
            .map(|c| c.id)
            .collect();
        prop_assert_eq!(listed, expected.clone());
        prop_assert_eq!(store.course_count().expect("count"), expected.len());
    }

    /// Ids are strictly increasing regardless of interleaved deletes.
    #[test]
    fn ids_strictly_increase(ops in vec(any::<bool>(), 1..50)) {
        let mut store = MemoryStore::new();
        let mut last = 0u64;

        for delete_after in ops {
            let student = store.insert_student(NewStudent::new("s")).expect("insert");
            prop_assert!(student.id.0 > last);
            last = student.id.0;
            if delete_after {
                store.delete_student(student.id).expect("delete");
            }
        }
    }

    /// Filtering by an existing id yields exactly that course.
    #[test]
    fn id_filter_returns_exactly_one(count in 1u64..20, pick in 0u64..20) {
        let mut roster = Roster::new();
        for i in 0..count {
            roster.create_course(NewCourse::new(format!("c{i}"))).expect("course");
        }
        let target = CourseId(pick % count + 1);

        let found = roster.courses(&CourseFilter::by_id(target)).expect("list");
        prop_assert_eq!(found.len(), 1);
        prop_assert_eq!(found[0].id, target);
    }
}
