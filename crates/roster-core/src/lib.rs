//! # roster-core
//!
//! The enrollment model for Roster - THE MODEL.
//!
//! Students, courses, the many-to-many membership between them, and the
//! capacity rule: a course is full when its enrolled student count reaches
//! the configured maximum.
//!
//! ## Architectural Constraints
//!
//! - No async, no network dependencies (pure Rust)
//! - Ids are assigned in creation order and never reused
//! - Capacity is observational; no write is rejected for exceeding it

// =============================================================================
// MODULES
// =============================================================================

pub mod capacity;
pub mod config;
pub mod primitives;
pub mod query;
pub mod roster;
pub mod storage;
pub mod store;
pub mod types;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use types::{
    Course, CourseId, CoursePatch, NewCourse, NewStudent, RosterError, Student, StudentId,
    StudentPatch,
};

pub use capacity::{Capacity, CapacityReport};
pub use config::RosterConfig;
pub use query::{CourseFilter, StudentFilter};
pub use roster::{Roster, StorageBackend};
pub use storage::RedbStore;
pub use store::{MemoryStore, RosterStore};
