//! # Roster CLI Module
//!
//! This module implements the CLI interface for Roster.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `init` - Initialize new database
//! - `status` - Show record counts and capacity setting
//! - `course` - List, show, add, rename, delete courses; show capacity
//! - `student` - List, add, delete students
//! - `enroll` / `unenroll` - Change course membership

mod commands;

use clap::{Parser, Subcommand};
use roster_core::RosterError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Roster - student/course enrollment server
#[derive(Parser, Debug)]
#[command(name = "roster")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the roster database
    #[arg(short = 'D', long, global = true, default_value = "roster.redb")]
    pub database: PathBuf,

    /// Storage backend: "redb" (ACID database) or "memory" (volatile)
    #[arg(short = 'B', long, global = true, default_value = "redb")]
    pub backend: String,

    /// Path to a TOML settings file (default: ./roster.toml if present)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8000")]
        port: u16,
    },

    /// Initialize a new empty database
    Init {
        /// Force initialization even if database exists
        #[arg(short, long)]
        force: bool,
    },

    /// Show record counts and capacity setting
    Status,

    /// Course operations
    #[command(subcommand)]
    Course(CourseCommand),

    /// Student operations
    #[command(subcommand)]
    Student(StudentCommand),

    /// Add a student to a course
    Enroll {
        /// Course id
        course: u64,
        /// Student id
        student: u64,
    },

    /// Remove a student from a course
    Unenroll {
        /// Course id
        course: u64,
        /// Student id
        student: u64,
    },
}

/// `roster course ...`
#[derive(Subcommand, Debug)]
pub enum CourseCommand {
    /// List courses, optionally filtered by exact id or name
    List {
        #[arg(long)]
        id: Option<u64>,
        #[arg(long)]
        name: Option<String>,
    },

    /// Show one course
    Show { id: u64 },

    /// Create a course
    Add {
        name: String,

        /// Initial student ids (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        students: Vec<u64>,
    },

    /// Rename a course
    Rename { id: u64, name: String },

    /// Delete a course
    Delete { id: u64 },

    /// Show capacity status of a course
    Capacity { id: u64 },
}

/// `roster student ...`
#[derive(Subcommand, Debug)]
pub enum StudentCommand {
    /// List students, optionally filtered by exact id or name
    List {
        #[arg(long)]
        id: Option<u64>,
        #[arg(long)]
        name: Option<String>,
    },

    /// Create a student
    Add {
        name: String,

        /// Birth date (YYYY-MM-DD)
        #[arg(short, long)]
        birth_date: Option<chrono::NaiveDate>,
    },

    /// Delete a student and remove it from every course
    Delete { id: u64 },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), RosterError> {
    let ctx = Context {
        database: cli.database,
        backend: cli.backend,
        config: cli.config,
        json_mode: cli.json_mode,
        verbose: cli.verbose,
    };

    match cli.command {
        Some(Commands::Server { host, port }) => cmd_server(&ctx, &host, port).await,
        Some(Commands::Init { force }) => cmd_init(&ctx, force),
        Some(Commands::Course(command)) => cmd_course(&ctx, command),
        Some(Commands::Student(command)) => cmd_student(&ctx, command),
        Some(Commands::Enroll { course, student }) => cmd_enroll(&ctx, course, student),
        Some(Commands::Unenroll { course, student }) => cmd_unenroll(&ctx, course, student),
        // No subcommand - show status by default
        Some(Commands::Status) | None => cmd_status(&ctx),
    }
}
