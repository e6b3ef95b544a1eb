//! Configuration for the csperf network throughput benchmark.
//!
//! csperf runs as a pair of processes: a client that streams fixed-size
//! data blocks and a server that sinks or echoes them. Everything a run
//! needs to know is decided up front, here: the command line is parsed
//! into a [`Config`], defaults fill the gaps, and the cross-field rules
//! that make a run feasible are enforced before any socket opens.
//!
//! # Quick Start
//!
//! ```
//! use csperf_config::{AutoConfirm, Config, FixedCeiling};
//!
//! let argv = ["csperf", "-c", "server-a", "-C", "10", "-P", "5"];
//! let config = Config::from_args_with(argv, &FixedCeiling::at(1024), &mut AutoConfirm)?;
//!
//! assert!(config.is_client());
//! assert_eq!(config.server_hostname.as_deref(), Some("server-a"));
//! assert_eq!(config.concurrent_clients, 5);
//! # Ok::<(), csperf_config::ConfigError>(())
//! ```
//!
//! The csperf binary itself calls [`Config::from_args`], which probes the
//! host's real descriptor limit and confirms soft warnings on stdin.
//!
//! # Failure Contract
//!
//! Every rejected command line is a [`ConfigError`] whose display text is
//! the diagnostic for the operator. csperf prints it to standard output
//! and exits non-zero without starting the run; nothing in this crate
//! terminates the process. Validation is first-violation-wins, in a
//! fixed order: role, session counts against each other, concurrency
//! mode exclusivity, repeat count, then the host's descriptor ceiling.
//!
//! # Resource Limits
//!
//! Runs that need more file descriptors than the host allows fail
//! outright; runs that need more than half the limit go through a
//! [`ConfirmationGate`]. Both the limit lookup and the gate are traits,
//! so embedders and tests swap in [`FixedCeiling`] and [`AutoConfirm`]
//! for deterministic behavior instead of the host probe and stdin.

mod args;
mod config;
mod error;
mod limits;

pub use config::{
    Config, DEFAULT_BLOCK_SIZE, DEFAULT_CLIENT_OUTPUT_FILE, DEFAULT_MARK_INTERVAL, DEFAULT_PORT,
    DEFAULT_SERVER_OUTPUT_FILE, DEFAULT_TOTAL_BLOCKS, RECOMMENDED_DESCRIPTOR_LIMIT, Role,
    TransferMode,
};
pub use error::{ConfigError, Result};
pub use limits::{
    AutoConfirm, ConfirmationGate, DescriptorCeilingProbe, FixedCeiling, RlimitProbe, StdinGate,
};
