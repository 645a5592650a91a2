//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.

use super::{
    AppState,
    error::ApiError,
    types::{
        CapacityResponse, CoursePatchRequest, CourseJson, CourseRequest, HealthResponse,
        ListQuery, StudentJson, StudentPatchRequest, StudentRequest,
    },
};
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use roster_core::{CourseId, StudentId};

type JsonBody<T> = Result<Json<T>, JsonRejection>;
type IdPath = Result<Path<u64>, PathRejection>;
type ListParams = Result<Query<ListQuery>, QueryRejection>;

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// COURSE HANDLERS
// =============================================================================

/// `GET /courses/` with optional `id` / `name` exact filters.
pub async fn list_courses(
    State(state): State<AppState>,
    params: ListParams,
) -> Result<Json<Vec<CourseJson>>, ApiError> {
    let Query(params) = params?;
    let filter = params.to_course_filter()?;

    let roster = state.roster.read().await;
    let courses = roster.courses(&filter)?;
    Ok(Json(courses.iter().map(CourseJson::from).collect()))
}

/// `GET /courses/{id}/`
pub async fn get_course(
    State(state): State<AppState>,
    path: IdPath,
) -> Result<Json<CourseJson>, ApiError> {
    let Path(id) = path?;
    let roster = state.roster.read().await;
    let course = roster.course(CourseId(id))?;
    Ok(Json(CourseJson::from(&course)))
}

/// `POST /courses/`
pub async fn create_course(
    State(state): State<AppState>,
    body: JsonBody<CourseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body?;

    let mut roster = state.roster.write().await;
    let course = roster.create_course(request.to_new_course())?;
    tracing::info!(course_id = course.id.0, students = course.enrolled(), "course created");

    Ok((StatusCode::CREATED, Json(CourseJson::from(&course))))
}

/// `PUT /courses/{id}/`
pub async fn replace_course(
    State(state): State<AppState>,
    path: IdPath,
    body: JsonBody<CourseRequest>,
) -> Result<Json<CourseJson>, ApiError> {
    let Path(id) = path?;
    let Json(request) = body?;

    let mut roster = state.roster.write().await;
    let course = roster.update_course(CourseId(id), request.to_replacement())?;
    Ok(Json(CourseJson::from(&course)))
}

/// `PATCH /courses/{id}/`
pub async fn update_course(
    State(state): State<AppState>,
    path: IdPath,
    body: JsonBody<CoursePatchRequest>,
) -> Result<Json<CourseJson>, ApiError> {
    let Path(id) = path?;
    let Json(request) = body?;

    let mut roster = state.roster.write().await;
    let course = roster.update_course(CourseId(id), request.to_patch())?;
    Ok(Json(CourseJson::from(&course)))
}

/// `DELETE /courses/{id}/`
pub async fn delete_course(
    State(state): State<AppState>,
    path: IdPath,
) -> Result<StatusCode, ApiError> {
    let Path(id) = path?;

    let mut roster = state.roster.write().await;
    roster.delete_course(CourseId(id))?;
    tracing::info!(course_id = id, "course deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// `GET /courses/{id}/capacity/`
pub async fn course_capacity(
    State(state): State<AppState>,
    path: IdPath,
) -> Result<Json<CapacityResponse>, ApiError> {
    let Path(id) = path?;
    let roster = state.roster.read().await;
    let report = roster.capacity_report(CourseId(id))?;
    Ok(Json(CapacityResponse::from(report)))
}

// =============================================================================
// MEMBERSHIP HANDLERS
// =============================================================================

/// `POST /courses/{id}/students/{student_id}/`
pub async fn enroll_student(
    State(state): State<AppState>,
    path: Result<Path<(u64, u64)>, PathRejection>,
) -> Result<Json<CourseJson>, ApiError> {
    let Path((course_id, student_id)) = path?;

    let mut roster = state.roster.write().await;
    let course = roster.enroll(CourseId(course_id), StudentId(student_id))?;
    if course.is_full(roster.capacity()) {
        tracing::info!(
            course_id,
            enrolled = course.enrolled(),
            max = roster.capacity().max_students(),
            "course is full"
        );
    }
    Ok(Json(CourseJson::from(&course)))
}

/// `DELETE /courses/{id}/students/{student_id}/`
pub async fn unenroll_student(
    State(state): State<AppState>,
    path: Result<Path<(u64, u64)>, PathRejection>,
) -> Result<Json<CourseJson>, ApiError> {
    let Path((course_id, student_id)) = path?;

    let mut roster = state.roster.write().await;
    let course = roster.unenroll(CourseId(course_id), StudentId(student_id))?;
    Ok(Json(CourseJson::from(&course)))
}

// =============================================================================
// STUDENT HANDLERS
// =============================================================================

/// `GET /students/` with optional `id` / `name` exact filters.
pub async fn list_students(
    State(state): State<AppState>,
    params: ListParams,
) -> Result<Json<Vec<StudentJson>>, ApiError> {
    let Query(params) = params?;
    let filter = params.to_student_filter()?;

    let roster = state.roster.read().await;
    let students = roster.students(&filter)?;
    Ok(Json(students.iter().map(StudentJson::from).collect()))
}

/// `GET /students/{id}/`
pub async fn get_student(
    State(state): State<AppState>,
    path: IdPath,
) -> Result<Json<StudentJson>, ApiError> {
    let Path(id) = path?;
    let roster = state.roster.read().await;
    let student = roster.student(StudentId(id))?;
    Ok(Json(StudentJson::from(&student)))
}

/// `POST /students/`
pub async fn create_student(
    State(state): State<AppState>,
    body: JsonBody<StudentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body?;

    let mut roster = state.roster.write().await;
    let student = roster.create_student(request.to_new_student())?;
    tracing::info!(student_id = student.id.0, "student created");

    Ok((StatusCode::CREATED, Json(StudentJson::from(&student))))
}

/// `PUT /students/{id}/`
pub async fn replace_student(
    State(state): State<AppState>,
    path: IdPath,
    body: JsonBody<StudentRequest>,
) -> Result<Json<StudentJson>, ApiError> {
    let Path(id) = path?;
    let Json(request) = body?;

    let mut roster = state.roster.write().await;
    let student = roster.update_student(StudentId(id), request.to_replacement())?;
    Ok(Json(StudentJson::from(&student)))
}

/// `PATCH /students/{id}/`
pub async fn update_student(
    State(state): State<AppState>,
    path: IdPath,
    body: JsonBody<StudentPatchRequest>,
) -> Result<Json<StudentJson>, ApiError> {
    let Path(id) = path?;
    let Json(request) = body?;

    let mut roster = state.roster.write().await;
    let student = roster.update_student(StudentId(id), request.to_patch())?;
    Ok(Json(StudentJson::from(&student)))
}

/// `DELETE /students/{id}/`
///
/// Also removes the student from every course.
pub async fn delete_student(
    State(state): State<AppState>,
    path: IdPath,
) -> Result<StatusCode, ApiError> {
    let Path(id) = path?;

    let mut roster = state.roster.write().await;
    roster.delete_student(StudentId(id))?;
    tracing::info!(student_id = id, "student deleted");

    Ok(StatusCode::NO_CONTENT)
}
