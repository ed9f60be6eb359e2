use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "studysync")]
#[command(about = "Offline sync queue and learning progress tracker")]
#[command(long_about = "studysync - offline sync queue and learning progress tracker

Queues writes made while offline and replays them in order once the
connection returns. Tracks lesson completion, watch time, streaks and
achievements per course.

QUICK START:
  studysync network offline                  Simulate losing the connection
  studysync queue add create comment '{\"body\":\"hi\"}'
  studysync network online                   Reconnect and sync the queue
  studysync progress init alice rust-101 l1 l2 l3
  studysync progress complete alice rust-101 l1

OUTPUT FORMATS:
  --output pretty    Human-readable colored output (default)
  --output json      Machine-readable JSON for scripting

ENVIRONMENT:
  STUDYSYNC_HOME     Data directory (default ~/.studysync)
  STUDYSYNC_LOG      Log filter, e.g. 'debug' or 'studysync=trace'")]
#[command(version, propagate_version = true)]
pub struct Cli {
    /// Output format for command results
    ///
    /// Use 'pretty' for human-readable colored output (default),
    /// or 'json' for machine-readable output suitable for scripting.
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Log debug details to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for command results.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable colored output.
    #[default]
    Pretty,
    /// Machine-readable JSON output.
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage the offline mutation queue
    ///
    /// Writes made while offline wait here until the connection returns.
    ///
    /// # Examples
    ///
    ///   studysync queue add create comment '{"body": "Great lesson"}'
    ///   studysync queue list
    ///   studysync queue sync
    #[command(alias = "q")]
    Queue(QueueArgs),

    /// Simulate connectivity changes
    ///
    /// Going online replays the queue through the outbox.
    ///
    /// # Examples
    ///
    ///   studysync network offline
    ///   studysync network online --connection wifi
    ///   studysync network status
    #[command(alias = "net")]
    Network(NetworkArgs),

    /// Track course progress
    ///
    /// # Examples
    ///
    ///   studysync progress init alice rust-101 intro ownership borrowing
    ///   studysync progress complete alice rust-101 intro --time 300
    ///   studysync progress watch alice rust-101 ownership 45
    ///   studysync progress summary alice
    #[command(alias = "p")]
    Progress(ProgressArgs),

    /// Time a lesson viewing session
    ///
    /// Runs a live session timer for the given duration, crediting watch
    /// time to the lesson on every interval and when the session ends.
    ///
    /// # Examples
    ///
    ///   studysync session alice rust-101 intro 5m
    ///   studysync session alice rust-101 intro 90s --interval 10
    Session(SessionArgs),
}

#[derive(Args)]
pub struct QueueArgs {
    #[command(subcommand)]
    pub command: QueueCommands,
}

#[derive(Subcommand)]
pub enum QueueCommands {
    /// Queue a mutation for later sync
    Add {
        /// Mutation type (create, update, delete)
        mutation_type: String,

        /// Target entity, e.g. comment or enrollment
        entity: String,

        /// JSON payload
        #[arg(default_value = "{}")]
        data: String,
    },

    /// List pending mutations
    #[command(alias = "ls")]
    List,

    /// Show pending count and connectivity
    Status,

    /// Sync pending mutations now
    Sync,

    /// Drop every pending mutation
    Clear,
}

#[derive(Args)]
pub struct NetworkArgs {
    #[command(subcommand)]
    pub command: NetworkCommands,
}

#[derive(Subcommand)]
pub enum NetworkCommands {
    /// Mark the device online and sync the queue
    Online {
        /// Connection type (wifi, cellular, ethernet)
        #[arg(long, short = 'c')]
        connection: Option<String>,
    },

    /// Mark the device offline
    Offline,

    /// Show connectivity and the status badge
    Status,
}

#[derive(Args)]
pub struct ProgressArgs {
    #[command(subcommand)]
    pub command: ProgressCommands,
}

#[derive(Subcommand)]
pub enum ProgressCommands {
    /// Enroll a user in a course
    Init {
        user: String,
        course: String,

        /// Lesson ids in course order
        #[arg(required = true)]
        lessons: Vec<String>,
    },

    /// Mark a lesson complete (or incomplete with --undo)
    Complete {
        user: String,
        course: String,
        lesson: String,

        /// Mark the lesson incomplete instead
        #[arg(long)]
        undo: bool,

        /// Extra seconds spent on the lesson
        #[arg(long, short = 't', default_value = "0")]
        time: u64,
    },

    /// Record video watch time for a lesson
    Watch {
        user: String,
        course: String,
        lesson: String,

        /// Seconds watched
        seconds: u64,

        /// Playback position in seconds
        #[arg(long, default_value = "0")]
        position: u64,
    },

    /// Show progress for one course, or every course of a user
    Show {
        user: String,
        course: Option<String>,
    },

    /// Summarize a user's progress across courses
    Summary { user: String },

    /// List a user's achievements
    Achievements { user: String },
}

#[derive(Args)]
pub struct SessionArgs {
    pub user: String,
    pub course: String,
    pub lesson: String,

    /// How long to run, e.g. 90s, 5m, 1h30m
    pub duration: String,

    /// Seconds between flushes (defaults to the configured interval)
    #[arg(long)]
    pub interval: Option<u64>,
}
