//! Unit tests for API types serialization/deserialization.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use chrono::NaiveDate;
use roster::api::{
    CourseJson, CoursePatchRequest, CourseRequest, HealthResponse, ListQuery, StudentJson,
    StudentPatchRequest, StudentRequest,
};
use roster_core::{CourseId, StudentId};

// =============================================================================
// HEALTH RESPONSE TESTS
// =============================================================================

#[test]
fn test_health_response_default() {
    let health = HealthResponse::default();
    assert_eq!(health.status, "ok");
    assert!(!health.version.is_empty());
}

// =============================================================================
// COURSE TESTS
// =============================================================================

#[test]
fn test_course_json_serialization_shape() {
    let course = CourseJson {
        id: 1,
        name: "Algebra".to_string(),
        students: vec![1, 4],
    };

    let json = serde_json::to_string(&course).unwrap();
    assert_eq!(json, r#"{"id":1,"name":"Algebra","students":[1,4]}"#);
}

#[test]
fn test_course_request_students_default_to_empty() {
    let request: CourseRequest = serde_json::from_str(r#"{"name":"Biology"}"#).unwrap();

    assert!(request.students.is_empty());
    assert!(request.to_new_course().students.is_empty());
}

#[test]
fn test_course_request_replacement_touches_every_field() {
    let request: CourseRequest =
        serde_json::from_str(r#"{"name":"Biology","students":[2,2,5]}"#).unwrap();

    let patch = request.to_replacement();
    assert_eq!(patch.name.as_deref(), Some("Biology"));
    let students = patch.students.unwrap();
    assert_eq!(students.len(), 2);
    assert!(students.contains(&StudentId(5)));
}

#[test]
fn test_course_patch_request_omitted_fields_untouched() {
    let request: CoursePatchRequest = serde_json::from_str(r#"{"name":"Chem"}"#).unwrap();

    let patch = request.to_patch();
    assert_eq!(patch.name.as_deref(), Some("Chem"));
    assert!(patch.students.is_none());
}

// =============================================================================
// STUDENT TESTS
// =============================================================================

#[test]
fn test_student_json_date_format() {
    let student = StudentJson {
        id: 3,
        name: "Ada".to_string(),
        birth_date: NaiveDate::from_ymd_opt(1815, 12, 10),
    };

    let json = serde_json::to_string(&student).unwrap();
    assert!(json.contains(r#""birth_date":"1815-12-10""#));
}

#[test]
fn test_student_json_without_date_is_null() {
    let student = StudentJson {
        id: 3,
        name: "Ada".to_string(),
        birth_date: None,
    };

    let json = serde_json::to_string(&student).unwrap();
    assert!(json.contains(r#""birth_date":null"#));
}

#[test]
fn test_student_request_optional_birth_date() {
    let request: StudentRequest = serde_json::from_str(r#"{"name":"Grace"}"#).unwrap();
    assert!(request.to_new_student().birth_date.is_none());
}

#[test]
fn test_student_patch_distinguishes_null_from_missing() {
    let missing: StudentPatchRequest = serde_json::from_str(r#"{"name":"Ada"}"#).unwrap();
    assert_eq!(missing.to_patch().birth_date, None);

    let null: StudentPatchRequest = serde_json::from_str(r#"{"birth_date":null}"#).unwrap();
    assert_eq!(null.to_patch().birth_date, Some(None));

    let set: StudentPatchRequest =
        serde_json::from_str(r#"{"birth_date":"2001-02-03"}"#).unwrap();
    assert_eq!(
        set.to_patch().birth_date,
        Some(NaiveDate::from_ymd_opt(2001, 2, 3))
    );
}

// =============================================================================
// LIST QUERY TESTS
// =============================================================================

#[test]
fn test_list_query_numeric_id() {
    let query = ListQuery {
        id: Some(" 7 ".to_string()),
        name: None,
    };

    let filter = query.to_course_filter().unwrap();
    assert_eq!(filter.id, Some(CourseId(7)));
    assert!(filter.name.is_none());
}

#[test]
fn test_list_query_rejects_non_numeric_id() {
    let query = ListQuery {
        id: Some("seven".to_string()),
        name: None,
    };

    assert!(query.to_course_filter().is_err());
    assert!(query.to_student_filter().is_err());
}

#[test]
fn test_list_query_blank_values_are_no_filter() {
    let query = ListQuery {
        id: Some(String::new()),
        name: Some(String::new()),
    };

    let filter = query.to_student_filter().unwrap();
    assert!(filter.id.is_none());
    assert!(filter.name.is_none());
}
