//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::{CourseCommand, StudentCommand};
use crate::api::{self, CapacityResponse, CourseJson, StudentJson};
use roster_core::config::MAX_STUDENTS_ENV;
use roster_core::{
    CourseFilter, CourseId, CoursePatch, NewCourse, NewStudent, Roster, RosterConfig, RosterError,
    StudentFilter, StudentId,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Settings file picked up from the working directory when `--config` is absent.
const DEFAULT_CONFIG_FILE: &str = "roster.toml";

/// Global options shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub database: PathBuf,
    pub backend: String,
    pub config: Option<PathBuf>,
    pub json_mode: bool,
    pub verbose: bool,
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(ctx: &Context, host: &str, port: u16) -> Result<(), RosterError> {
    let roster = load_roster(ctx)?;

    println!("Roster Enrollment Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:         {}", host);
    println!("  Port:         {}", port);
    println!("  Backend:      {}", ctx.backend);
    println!("  Database:     {:?}", ctx.database);
    println!("  Max students: {}", roster.capacity().max_students());
    println!();
    println!("Endpoints:");
    println!("  GET|POST              /api/v1/courses/");
    println!("  GET|PUT|PATCH|DELETE  /api/v1/courses/{{id}}/");
    println!("  GET                   /api/v1/courses/{{id}}/capacity/");
    println!("  POST|DELETE           /api/v1/courses/{{id}}/students/{{student_id}}/");
    println!("  GET|POST              /api/v1/students/");
    println!("  GET|PUT|PATCH|DELETE  /api/v1/students/{{id}}/");
    println!("  GET                   /health");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, roster).await
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Initialize new database.
pub fn cmd_init(ctx: &Context, force: bool) -> Result<(), RosterError> {
    if ctx.backend != "redb" {
        return Err(RosterError::ConfigError(
            "init only applies to the redb backend".to_string(),
        ));
    }

    if ctx.database.exists() {
        if !force {
            return Err(RosterError::IoError(
                "Database already exists. Use --force to overwrite.".to_string(),
            ));
        }
        std::fs::remove_file(&ctx.database)
            .map_err(|e| RosterError::IoError(format!("Remove db: {}", e)))?;
    }

    let roster = load_roster(ctx)?;
    tracing::debug!(persistent = roster.is_persistent(), "database created");
    println!("Initialized new redb database at {:?}", ctx.database);

    Ok(())
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

#[derive(Debug, Serialize)]
struct StatusOutput {
    database: String,
    backend: String,
    courses: usize,
    students: usize,
    full_courses: usize,
    max_students_per_course: usize,
}

/// Show record counts and the capacity setting.
pub fn cmd_status(ctx: &Context) -> Result<(), RosterError> {
    let roster = load_roster(ctx)?;
    let courses = roster.courses(&CourseFilter::default())?;
    let capacity = roster.capacity();

    let status = StatusOutput {
        database: ctx.database.to_string_lossy().into_owned(),
        backend: ctx.backend.clone(),
        courses: courses.len(),
        students: roster.student_count()?,
        full_courses: courses.iter().filter(|c| c.is_full(capacity)).count(),
        max_students_per_course: capacity.max_students(),
    };

    if ctx.json_mode {
        return print_json(&status);
    }

    println!("Roster Status");
    println!("=============");
    println!("Database: {}", status.database);
    println!("Backend:  {}", status.backend);
    println!();
    println!("Courses:      {}", status.courses);
    println!("Students:     {}", status.students);
    println!("Full courses: {}", status.full_courses);
    println!("Max students: {}", status.max_students_per_course);

    if ctx.verbose {
        println!();
        for course in &courses {
            println!(
                "  #{:<5} {:<32} {:>4}/{}",
                course.id,
                course.name,
                course.enrolled(),
                capacity.max_students()
            );
        }
    }

    Ok(())
}

// =============================================================================
// COURSE COMMANDS
// =============================================================================

/// Dispatch `roster course ...`.
pub fn cmd_course(ctx: &Context, command: CourseCommand) -> Result<(), RosterError> {
    let mut roster = load_roster(ctx)?;

    match command {
        CourseCommand::List { id, name } => {
            let filter = CourseFilter {
                id: id.map(CourseId),
                name,
            };
            let courses: Vec<CourseJson> = roster
                .courses(&filter)?
                .iter()
                .map(CourseJson::from)
                .collect();

            if ctx.json_mode {
                return print_json(&courses);
            }
            if courses.is_empty() {
                println!("No courses");
            }
            for course in &courses {
                print_course(course);
            }
        }
        CourseCommand::Show { id } => {
            let course = CourseJson::from(&roster.course(CourseId(id))?);
            if ctx.json_mode {
                return print_json(&course);
            }
            print_course(&course);
        }
        CourseCommand::Add { name, students } => {
            let new = NewCourse::new(name).with_students(students.into_iter().map(StudentId));
            let course = CourseJson::from(&roster.create_course(new)?);
            if ctx.json_mode {
                return print_json(&course);
            }
            println!("Created course #{}", course.id);
        }
        CourseCommand::Rename { id, name } => {
            let renamed = roster.update_course(CourseId(id), CoursePatch::rename(name))?;
            let course = CourseJson::from(&renamed);
            if ctx.json_mode {
                return print_json(&course);
            }
            println!("Renamed course #{} to '{}'", course.id, course.name);
        }
        CourseCommand::Delete { id } => {
            roster.delete_course(CourseId(id))?;
            if !ctx.json_mode {
                println!("Deleted course #{}", id);
            }
        }
        CourseCommand::Capacity { id } => {
            let report = CapacityResponse::from(roster.capacity_report(CourseId(id))?);
            if ctx.json_mode {
                return print_json(&report);
            }
            println!("Course #{}", report.course_id);
            println!("  Enrolled:  {} / {}", report.enrolled, report.max_students);
            println!("  Remaining: {}", report.remaining);
            println!("  Full:      {}", if report.is_full { "yes" } else { "no" });
        }
    }

    Ok(())
}

fn print_course(course: &CourseJson) {
    let students: Vec<String> = course.students.iter().map(u64::to_string).collect();
    println!("#{:<5} {} [{}]", course.id, course.name, students.join(", "));
}

// =============================================================================
// STUDENT COMMANDS
// =============================================================================

/// Dispatch `roster student ...`.
pub fn cmd_student(ctx: &Context, command: StudentCommand) -> Result<(), RosterError> {
    let mut roster = load_roster(ctx)?;

    match command {
        StudentCommand::List { id, name } => {
            let filter = StudentFilter {
                id: id.map(StudentId),
                name,
            };
            let students: Vec<StudentJson> = roster
                .students(&filter)?
                .iter()
                .map(StudentJson::from)
                .collect();

            if ctx.json_mode {
                return print_json(&students);
            }
            if students.is_empty() {
                println!("No students");
            }
            for student in &students {
                match student.birth_date {
                    Some(date) => println!("#{:<5} {} ({})", student.id, student.name, date),
                    None => println!("#{:<5} {}", student.id, student.name),
                }
            }
        }
        StudentCommand::Add { name, birth_date } => {
            let new = NewStudent { name, birth_date };
            let student = StudentJson::from(&roster.create_student(new)?);
            if ctx.json_mode {
                return print_json(&student);
            }
            println!("Created student #{}", student.id);
        }
        StudentCommand::Delete { id } => {
            roster.delete_student(StudentId(id))?;
            if !ctx.json_mode {
                println!("Deleted student #{}", id);
            }
        }
    }

    Ok(())
}

// =============================================================================
// ENROLLMENT COMMANDS
// =============================================================================

/// Add a student to a course.
pub fn cmd_enroll(ctx: &Context, course: u64, student: u64) -> Result<(), RosterError> {
    let mut roster = load_roster(ctx)?;
    let updated = roster.enroll(CourseId(course), StudentId(student))?;
    let full = updated.is_full(roster.capacity());

    if ctx.json_mode {
        return print_json(&CourseJson::from(&updated));
    }
    println!(
        "Enrolled student #{} in course #{} ({}/{})",
        student,
        course,
        updated.enrolled(),
        roster.capacity().max_students()
    );
    if full {
        println!("Course #{} is now full", course);
    }
    Ok(())
}

/// Remove a student from a course.
pub fn cmd_unenroll(ctx: &Context, course: u64, student: u64) -> Result<(), RosterError> {
    let mut roster = load_roster(ctx)?;
    let updated = roster.unenroll(CourseId(course), StudentId(student))?;

    if ctx.json_mode {
        return print_json(&CourseJson::from(&updated));
    }
    println!(
        "Removed student #{} from course #{} ({}/{})",
        student,
        course,
        updated.enrolled(),
        roster.capacity().max_students()
    );
    Ok(())
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Resolve the settings file: `--config` if given, else `./roster.toml` if present.
fn config_path(ctx: &Context) -> Option<PathBuf> {
    ctx.config.clone().or_else(|| {
        let fallback = Path::new(DEFAULT_CONFIG_FILE);
        fallback.is_file().then(|| fallback.to_path_buf())
    })
}

/// Resolve settings from the config file and a capacity override.
fn resolve_config(ctx: &Context, env_value: Option<&str>) -> Result<RosterConfig, RosterError> {
    let config_file = config_path(ctx);
    let config = RosterConfig::load_with(config_file.as_deref(), env_value)?;
    tracing::debug!(
        config = ?config_file,
        max_students = config.max_students_per_course,
        "settings loaded"
    );
    Ok(config)
}

/// Open the roster named by the global options.
pub fn load_roster(ctx: &Context) -> Result<Roster, RosterError> {
    let env_value = std::env::var(MAX_STUDENTS_ENV).ok();
    let config = resolve_config(ctx, env_value.as_deref())?;
    open_roster(ctx, &config)
}

fn open_roster(ctx: &Context, config: &RosterConfig) -> Result<Roster, RosterError> {
    Roster::open(&ctx.backend, &ctx.database, config)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), RosterError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| RosterError::SerializationError(e.to_string()))?;
    println!("{}", text);
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn context(dir: &tempfile::TempDir) -> Context {
        Context {
            database: dir.path().join("roster.redb"),
            backend: "redb".to_string(),
            config: None,
            json_mode: true,
            verbose: false,
        }
    }

    #[test]
    fn init_refuses_existing_database_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);

        cmd_init(&ctx, false).unwrap();
        assert!(cmd_init(&ctx, false).is_err());
        cmd_init(&ctx, true).unwrap();
    }

    #[test]
    fn commands_share_the_database() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);

        cmd_student(
            &ctx,
            StudentCommand::Add {
                name: "Ada".to_string(),
                birth_date: None,
            },
        )
        .unwrap();
        cmd_course(
            &ctx,
            CourseCommand::Add {
                name: "Algebra".to_string(),
                students: vec![],
            },
        )
        .unwrap();
        cmd_enroll(&ctx, 1, 1).unwrap();

        let roster = load_roster(&ctx).unwrap();
        let course = roster.course(CourseId(1)).unwrap();
        assert!(course.students.contains(&StudentId(1)));
    }

    #[test]
    fn explicit_config_sets_capacity() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("settings.toml");
        std::fs::write(&config, "max_students_per_course = 3\n").unwrap();

        let mut ctx = context(&dir);
        ctx.config = Some(config);

        let resolved = resolve_config(&ctx, None).unwrap();
        let roster = open_roster(&ctx, &resolved).unwrap();
        assert_eq!(roster.capacity().max_students(), 3);
    }

    #[test]
    fn capacity_override_beats_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("settings.toml");
        std::fs::write(&config, "max_students_per_course = 5\n").unwrap();

        let mut ctx = context(&dir);
        ctx.config = Some(config);

        let resolved = resolve_config(&ctx, Some("8")).unwrap();
        let roster = open_roster(&ctx, &resolved).unwrap();
        assert_eq!(roster.capacity().max_students(), 8);
    }

    #[test]
    fn invalid_capacity_override_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);

        assert!(matches!(
            resolve_config(&ctx, Some("lots")),
            Err(RosterError::ConfigError(_))
        ));
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(&dir);
        ctx.backend = "file".to_string();

        let resolved = resolve_config(&ctx, None).unwrap();
        assert!(matches!(
            open_roster(&ctx, &resolved),
            Err(RosterError::ConfigError(_))
        ));
    }
}
