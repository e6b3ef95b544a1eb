//! Typed failures for configuration parsing and validation.
//!
//! Every way a run configuration can be rejected has its own variant, with
//! the offending values carried as fields. The `Display` text of a variant is
//! the diagnostic the tool shows the operator; the caller prints it to
//! standard output and aborts, so no variant here ever terminates the
//! process itself.

use thiserror::Error;

use crate::args::SHORT_USAGE;
use crate::config::RECOMMENDED_DESCRIPTOR_LIMIT;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// A rejected run configuration.
///
/// Parse-time and validation-time failures travel through the same type:
/// the caller treats every variant as "abort before any network work". The
/// one special case is [`Help`](ConfigError::Help), an intentional early
/// exit rather than a fault; its payload is the full usage text.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// `-h/--help` was given; the payload is the rendered usage block.
    #[error("{0}")]
    Help(String),

    /// Unknown flag, malformed invocation, or a bare command line.
    #[error("{detail}\n{usage}", usage = SHORT_USAGE)]
    Usage { detail: String },

    /// `-m/--markinterval` outside the 1-100 percent range.
    #[error("mark interval must be between 1 and 100 percent (got {0})")]
    MarkIntervalOutOfRange(u32),

    /// `-t/--time` below one second.
    #[error("client run time must be at least one second (got {0})")]
    RuntimeTooShort(u32),

    /// More concurrent sessions requested than sessions to run in total.
    #[error("total clients ({total}) must be greater than or equal to concurrent clients ({concurrent})")]
    TotalBelowConcurrent { total: u32, concurrent: u32 },

    /// Higher session start rate requested than sessions to run in total.
    #[error("total clients ({total}) must be greater than or equal to clients per second ({per_sec})")]
    TotalBelowRate { total: u32, per_sec: u32 },

    /// Both concurrency strategies given at once.
    #[error(
        "specify either concurrent clients (-P {concurrent}) or clients per second (-S {per_sec}), not both"
    )]
    ConcurrencyModeConflict { concurrent: u32, per_sec: u32 },

    /// `-r/--repeat 0`; zero iterations is meaningless and -1 already means
    /// "run forever".
    #[error("repeat count cannot be 0; use -1 to repeat forever")]
    ZeroRepeat,

    /// Sequential run asks for more sessions than descriptors are available.
    #[error(
        "total clients ({total}) exceed the open file descriptor limit ({ceiling})\nraise the limit with 'ulimit -n {advice}'",
        advice = RECOMMENDED_DESCRIPTOR_LIMIT
    )]
    TotalAboveCeiling { total: u32, ceiling: u64 },

    /// Concurrent run asks for more simultaneous sessions than descriptors
    /// are available.
    #[error(
        "concurrent clients ({concurrent}) exceed the open file descriptor limit ({ceiling})\nraise the limit with 'ulimit -n {advice}'",
        advice = RECOMMENDED_DESCRIPTOR_LIMIT
    )]
    ConcurrentAboveCeiling { concurrent: u32, ceiling: u64 },

    /// A soft descriptor-pressure warning was presented and the
    /// confirmation gate refused it. The interactive gate never refuses
    /// (the operator aborts with Ctrl-C instead); this arises only with
    /// embedder-supplied gates.
    #[error("descriptor pressure not confirmed: {required} sessions against a limit of {ceiling}")]
    LimitWarningDeclined { required: u32, ceiling: u64 },

    /// Neither `-c` nor `-s` was given.
    #[error(
        "no role selected: run as a server (-s) or connect as a client (-c <host>)\n{usage}",
        usage = SHORT_USAGE
    )]
    MissingRole,
}
