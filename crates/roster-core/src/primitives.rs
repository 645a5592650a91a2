//! # Model Limits
//!
//! Fixed limits and defaults for the Roster model. These are compiled into
//! the binary; the only runtime-configurable value is the course capacity
//! (see [`crate::config::RosterConfig`]).

/// Default maximum number of students per course when no configuration is
/// supplied.
pub const DEFAULT_MAX_STUDENTS_PER_COURSE: usize = 20;

/// Maximum length for student and course names, in bytes.
pub const MAX_NAME_LENGTH: usize = 1024;

/// Maximum number of student references accepted in a single course write.
///
/// This bounds request bodies, not enrollment: `enroll` may still push a
/// course past this size one student at a time.
pub const MAX_MEMBERSHIP_BATCH: usize = 10_000;

/// First id handed out by a fresh store.
pub const FIRST_ID: u64 = 1;
