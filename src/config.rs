//! Run configuration: defaults, lifecycle, and invariant checks.
//!
//! A [`Config`] is born with fixed defaults, has command-line overrides
//! overlaid onto it, and is then validated as a whole. Validation is
//! first-violation-wins: checks run in a fixed order and the first one
//! that fails is reported, with no attempt to aggregate the rest.
//!
//! The configuration is built once, before any networking starts, and is
//! read-only from then on. Owned strings are released when the value
//! drops; single ownership makes a second release unrepresentable.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::args::Args;
use crate::error::{ConfigError, Result};
use crate::limits::{ConfirmationGate, DescriptorCeilingProbe, RlimitProbe, StdinGate};

/// TCP port used when `-p/--port` is not given.
pub const DEFAULT_PORT: u16 = 5001;

/// Bytes per data block when `-B/--blocksize` is not given.
pub const DEFAULT_BLOCK_SIZE: u32 = 1024;

/// Blocks a client sends per session when `-n/--numblocks` is not given.
pub const DEFAULT_TOTAL_BLOCKS: u32 = 1;

/// Progress mark granularity when `-m/--markinterval` is not given.
pub const DEFAULT_MARK_INTERVAL: u32 = 100;

/// Client run report path when `-l/--logfile` does not override it.
pub const DEFAULT_CLIENT_OUTPUT_FILE: &str = "csperf_client.txt";

/// Server run report path when `-l/--logfile` does not override it.
pub const DEFAULT_SERVER_OUTPUT_FILE: &str = "csperf_server.txt";

/// Descriptor limit the resource warnings advise raising the host to.
pub const RECOMMENDED_DESCRIPTOR_LIMIT: u64 = 20_000;

/// Which side of the benchmark this process plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Connects out to a server and drives the transfer.
    Client,
    /// Listens for clients and sinks or echoes their blocks.
    Server,
}

/// Direction of data flow within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransferMode {
    /// The client streams blocks and the server discards them.
    HalfDuplex,
    /// The server echoes every block back to the client.
    Echo,
}

/// Everything a benchmark run needs to know, resolved and checked.
///
/// Built through [`Config::from_args`] (or [`Config::from_args_with`] for
/// deterministic embedding), after which it is an immutable contract for
/// the transfer engine. The engine also serializes it into run reports,
/// hence the serde derives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Role this process plays; `None` until `-c` or `-s` picks one.
    pub role: Option<Role>,
    /// Host a client connects to. Meaningful only for [`Role::Client`].
    pub server_hostname: Option<String>,
    /// Listen port for the server, connect port for the client.
    pub server_port: u16,
    /// Bytes per transferred block.
    pub data_block_size: u32,
    /// Blocks a client sends per session.
    pub total_data_blocks: u32,
    /// Direction of data flow within a session.
    pub transfer_mode: TransferMode,
    /// Client sessions to run across the whole test.
    pub total_clients: u32,
    /// Sessions kept open at once; 0 means run sequentially.
    pub concurrent_clients: u32,
    /// New sessions started per second; 0 means unpaced.
    pub clients_per_sec: u32,
    /// Full test iterations; -1 repeats forever.
    pub repeat_count: i32,
    /// Seconds a client stays active; 0 means block-count driven.
    pub client_runtime: u32,
    /// Progress mark granularity in percent of a session's blocks.
    pub mark_interval_percentage: u32,
    /// Where the client writes its run report.
    pub client_output_file: String,
    /// Where the server writes its run report.
    pub server_output_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            role: None,
            server_hostname: None,
            server_port: DEFAULT_PORT,
            data_block_size: DEFAULT_BLOCK_SIZE,
            total_data_blocks: DEFAULT_TOTAL_BLOCKS,
            transfer_mode: TransferMode::HalfDuplex,
            total_clients: 1,
            concurrent_clients: 0,
            clients_per_sec: 0,
            repeat_count: 1,
            client_runtime: 0,
            mark_interval_percentage: DEFAULT_MARK_INTERVAL,
            client_output_file: DEFAULT_CLIENT_OUTPUT_FILE.to_string(),
            server_output_file: DEFAULT_SERVER_OUTPUT_FILE.to_string(),
        }
    }
}

impl Config {
    /// Parse a command line and validate the result against the live host.
    ///
    /// Probes the real open-descriptor limit and routes soft resource
    /// warnings through an interactive stdin prompt, so this is the entry
    /// point for the csperf binary itself:
    ///
    /// ```no_run
    /// use csperf_config::Config;
    ///
    /// let config = match Config::from_args(std::env::args()) {
    ///     Ok(config) => config,
    ///     Err(err) => {
    ///         println!("{err}");
    ///         std::process::exit(1);
    ///     }
    /// };
    /// ```
    ///
    /// # Errors
    ///
    /// See [`ConfigError`]; the display text of the error is the
    /// diagnostic to show the operator.
    pub fn from_args<I, T>(argv: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self::from_args_with(argv, &RlimitProbe, &mut StdinGate)
    }

    /// Parse a command line with a caller-supplied probe and gate.
    ///
    /// Embedders and tests use this to pin the descriptor ceiling and to
    /// answer soft warnings without touching stdin.
    ///
    /// ```
    /// use csperf_config::{AutoConfirm, Config, FixedCeiling};
    ///
    /// let argv = ["csperf", "-c", "server-a", "-C", "100", "-P", "10"];
    /// let config = Config::from_args_with(argv, &FixedCeiling::at(4096), &mut AutoConfirm)?;
    ///
    /// assert_eq!(config.total_clients, 100);
    /// assert_eq!(config.concurrent_clients, 10);
    /// # Ok::<(), csperf_config::ConfigError>(())
    /// ```
    pub fn from_args_with<I, T>(
        argv: I,
        probe: &dyn DescriptorCeilingProbe,
        gate: &mut dyn ConfirmationGate,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let tokens: Vec<String> = argv.into_iter().map(Into::into).collect();
        let args = Args::from_tokens(&tokens)?;

        let mut config = Config::default();
        args.overlay(&mut config)?;
        config.validate_with(probe, gate)?;

        debug!("run configuration ready: {:?}", config);
        Ok(config)
    }

    /// True when this process drives the transfer.
    pub fn is_client(&self) -> bool {
        self.role == Some(Role::Client)
    }

    /// True when this process listens for clients.
    pub fn is_server(&self) -> bool {
        self.role == Some(Role::Server)
    }

    /// Run report path for the resolved role.
    pub fn output_file(&self) -> &str {
        if self.is_server() {
            &self.server_output_file
        } else {
            &self.client_output_file
        }
    }

    /// Check cross-field invariants against the live host.
    ///
    /// Equivalent to [`Config::validate_with`] with the real resource
    /// limit probe and the interactive stdin gate; soft warnings block
    /// until the operator answers.
    pub fn validate(&self) -> Result<()> {
        self.validate_with(&RlimitProbe, &mut StdinGate)
    }

    /// Check cross-field invariants with a caller-supplied probe and gate.
    ///
    /// The server role has no cross-field constraints beyond being set.
    /// For clients the checks run in a fixed order and stop at the first
    /// violation: session counts against each other, concurrency mode
    /// exclusivity, repeat count, then the descriptor ceiling.
    pub fn validate_with(
        &self,
        probe: &dyn DescriptorCeilingProbe,
        gate: &mut dyn ConfirmationGate,
    ) -> Result<()> {
        match self.role {
            Some(Role::Server) => Ok(()),
            Some(Role::Client) => {
                if self.total_clients < self.concurrent_clients {
                    return Err(ConfigError::TotalBelowConcurrent {
                        total: self.total_clients,
                        concurrent: self.concurrent_clients,
                    });
                }
                if self.total_clients < self.clients_per_sec {
                    return Err(ConfigError::TotalBelowRate {
                        total: self.total_clients,
                        per_sec: self.clients_per_sec,
                    });
                }
                if self.concurrent_clients > 0 && self.clients_per_sec > 0 {
                    return Err(ConfigError::ConcurrencyModeConflict {
                        concurrent: self.concurrent_clients,
                        per_sec: self.clients_per_sec,
                    });
                }
                if self.repeat_count == 0 {
                    return Err(ConfigError::ZeroRepeat);
                }
                self.check_descriptor_ceiling(probe, gate)
            }
            None => Err(ConfigError::MissingRole),
        }
    }

    /// Descriptor feasibility for the client role.
    ///
    /// A sequential run must fit `total_clients` under the ceiling, a
    /// concurrent run must fit `concurrent_clients`. Exceeding the ceiling
    /// is a hard failure; needing more than half of it is a soft warning
    /// that must pass the confirmation gate. When the probe cannot answer,
    /// every check here is skipped.
    fn check_descriptor_ceiling(
        &self,
        probe: &dyn DescriptorCeilingProbe,
        gate: &mut dyn ConfirmationGate,
    ) -> Result<()> {
        let Some(ceiling) = probe.descriptor_ceiling() else {
            debug!("open file descriptor limit unknown, skipping descriptor checks");
            return Ok(());
        };
        let total = u64::from(self.total_clients);
        let concurrent = u64::from(self.concurrent_clients);

        if concurrent == 0 && ceiling < total {
            return Err(ConfigError::TotalAboveCeiling {
                total: self.total_clients,
                ceiling,
            });
        }
        if ceiling < concurrent {
            return Err(ConfigError::ConcurrentAboveCeiling {
                concurrent: self.concurrent_clients,
                ceiling,
            });
        }
        if concurrent == 0 && ceiling < total * 2 {
            self.acknowledge_pressure(gate, "total clients", self.total_clients, ceiling)?;
        }
        if concurrent > 0 && ceiling < concurrent * 2 {
            self.acknowledge_pressure(gate, "concurrent clients", self.concurrent_clients, ceiling)?;
        }
        Ok(())
    }

    fn acknowledge_pressure(
        &self,
        gate: &mut dyn ConfirmationGate,
        what: &str,
        count: u32,
        ceiling: u64,
    ) -> Result<()> {
        warn!(
            "{} ({}) need more than half the open file descriptor limit ({})",
            what, count, ceiling
        );
        let warning = format!(
            "{what} ({count}) need more than half the open file descriptor limit ({ceiling}).\n\
             Closed sockets linger in TIME_WAIT, so descriptors may still run out mid-test.\n\
             Consider raising the limit with 'ulimit -n {RECOMMENDED_DESCRIPTOR_LIMIT}'."
        );
        if gate.confirm(&warning) {
            Ok(())
        } else {
            Err(ConfigError::LimitWarningDeclined {
                required: count,
                ceiling,
            })
        }
    }
}
