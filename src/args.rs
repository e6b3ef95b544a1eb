//! Command-line parsing for the csperf binary.
//!
//! Flags are collected with clap and then overlaid onto a default
//! [`Config`] in two phases: the role first, everything else after, so
//! role-dependent flags such as `-l/--logfile` land on the right side
//! regardless of where they sat on the command line. Numeric values are
//! read leniently, in the manner of C's `atoi`: parsing stops at the
//! first non-digit and malformed input yields zero. A flag given more
//! than once keeps its last value.

use std::convert::Infallible;

use clap::Parser;
use clap::error::ErrorKind;
use tracing::debug;

use crate::config::{Config, Role, TransferMode};
use crate::error::{ConfigError, Result};

/// Two-line hint shown for malformed invocations.
pub(crate) const SHORT_USAGE: &str =
    "Usage: csperf [-s|-c host] [options]\nTry 'csperf -h' for more information";

/// Raw command-line flags, one field per option.
///
/// Defaults are deliberately absent here: every field is optional and the
/// real default values live in [`Config::default`], which this struct is
/// overlaid onto. The default annotations in the help text below must be
/// kept in step with those constants.
#[derive(Parser, Debug)]
#[command(name = "csperf")]
#[command(about = "TCP client/server network throughput benchmark", long_about = None)]
#[command(override_usage = "csperf [-s|-c host] [options]")]
#[command(args_override_self = true)]
pub(crate) struct Args {
    /// Run as a client and connect to this host
    #[arg(short, long, value_name = "HOST", conflicts_with = "server")]
    client: Option<String>,

    /// Run as a server
    #[arg(short, long)]
    server: bool,

    /// Port the server listens on and the client connects to [default: 5001]
    #[arg(short, long, value_name = "PORT", value_parser = lenient_u16)]
    port: Option<u16>,

    /// Size in bytes of each data block [default: 1024]
    #[arg(short = 'B', long, value_name = "BYTES", value_parser = lenient_u32)]
    blocksize: Option<u32>,

    /// Number of data blocks to send per session [default: 1]
    #[arg(short, long, value_name = "COUNT", value_parser = lenient_u32)]
    numblocks: Option<u32>,

    /// Seconds the client stays active, instead of a block count
    #[arg(short, long, value_name = "SECONDS", value_parser = lenient_u32)]
    time: Option<u32>,

    /// Ask the server to echo every block back
    #[arg(short, long)]
    echo: bool,

    /// Total client sessions to run across the test [default: 1]
    #[arg(short = 'C', long, value_name = "COUNT", value_parser = lenient_u32)]
    total_clients: Option<u32>,

    /// Client sessions to keep open at the same time
    #[arg(short = 'P', value_name = "COUNT", value_parser = lenient_u32)]
    concurrent_clients: Option<u32>,

    /// Client sessions to start every second
    #[arg(short = 'S', value_name = "COUNT", value_parser = lenient_u32)]
    clients_per_sec: Option<u32>,

    /// Repeat the whole test this many times, -1 to repeat forever [default: 1]
    #[arg(short, long, value_name = "COUNT", allow_negative_numbers = true, value_parser = lenient_i32)]
    repeat: Option<i32>,

    /// File the run report is written to [default: csperf_client.txt or csperf_server.txt]
    #[arg(short, long, value_name = "PATH")]
    logfile: Option<String>,

    /// Progress mark granularity as a percentage of a session [default: 100]
    #[arg(short, long, value_name = "PERCENT", value_parser = lenient_u32)]
    markinterval: Option<u32>,
}

impl Args {
    /// Parse an argument vector, mapping clap's outcomes onto the crate's
    /// error taxonomy.
    ///
    /// A command line with fewer than two tokens (just the program name,
    /// or nothing at all) is rejected before clap ever sees it.
    pub(crate) fn from_tokens(tokens: &[String]) -> Result<Args> {
        if tokens.len() < 2 {
            debug!("bare command line, nothing to parse");
            return Err(ConfigError::Usage {
                detail: "no arguments given".to_string(),
            });
        }
        match Args::try_parse_from(tokens) {
            Ok(args) => Ok(args),
            Err(err) if err.kind() == ErrorKind::DisplayHelp => {
                Err(ConfigError::Help(err.to_string()))
            }
            Err(err) => {
                let detail = err
                    .to_string()
                    .lines()
                    .next()
                    .unwrap_or("invalid arguments")
                    .to_string();
                debug!("rejecting command line: {}", detail);
                Err(ConfigError::Usage { detail })
            }
        }
    }

    /// Apply the parsed flags onto `config`.
    ///
    /// The role is resolved before anything else, so `-l/--logfile` binds
    /// to the output file of the selected role no matter where it appeared
    /// on the command line. With no role selected the override is dropped;
    /// validation rejects such a configuration anyway.
    ///
    /// Range-checked options (`-m`, `-t`) fail here, without waiting for
    /// the validator.
    pub(crate) fn overlay(self, config: &mut Config) -> Result<()> {
        if let Some(host) = self.client {
            config.role = Some(Role::Client);
            config.server_hostname = Some(host);
        } else if self.server {
            config.role = Some(Role::Server);
        }

        if let Some(port) = self.port {
            config.server_port = port;
        }
        if let Some(size) = self.blocksize {
            config.data_block_size = size;
        }
        if let Some(blocks) = self.numblocks {
            config.total_data_blocks = blocks;
        }
        if self.echo {
            config.transfer_mode = TransferMode::Echo;
        }
        if let Some(total) = self.total_clients {
            config.total_clients = total;
        }
        if let Some(concurrent) = self.concurrent_clients {
            config.concurrent_clients = concurrent;
        }
        if let Some(per_sec) = self.clients_per_sec {
            config.clients_per_sec = per_sec;
        }
        if let Some(repeat) = self.repeat {
            config.repeat_count = repeat;
        }

        if let Some(mark) = self.markinterval {
            if !(1..=100).contains(&mark) {
                return Err(ConfigError::MarkIntervalOutOfRange(mark));
            }
            config.mark_interval_percentage = mark;
        }
        if let Some(runtime) = self.time {
            if runtime < 1 {
                return Err(ConfigError::RuntimeTooShort(runtime));
            }
            config.client_runtime = runtime;
        }

        if let Some(path) = self.logfile {
            match config.role {
                Some(Role::Client) => config.client_output_file = path,
                Some(Role::Server) => config.server_output_file = path,
                None => {}
            }
        }
        Ok(())
    }
}

/// Best-effort numeric conversion in the spirit of C's `atoi`.
///
/// Leading whitespace and an optional sign are accepted, parsing stops at
/// the first non-digit, and input with no leading digits yields zero.
/// Out-of-range magnitudes saturate instead of wrapping.
fn legacy_atoi(raw: &str) -> i64 {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let mut value: i64 = 0;
    for ch in digits.chars() {
        let Some(digit) = ch.to_digit(10) else { break };
        value = value.saturating_mul(10).saturating_add(i64::from(digit));
    }
    if negative { -value } else { value }
}

fn lenient_u16(raw: &str) -> std::result::Result<u16, Infallible> {
    Ok(legacy_atoi(raw).clamp(0, i64::from(u16::MAX)) as u16)
}

fn lenient_u32(raw: &str) -> std::result::Result<u32, Infallible> {
    Ok(legacy_atoi(raw).clamp(0, i64::from(u32::MAX)) as u32)
}

fn lenient_i32(raw: &str) -> std::result::Result<i32, Infallible> {
    Ok(legacy_atoi(raw).clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
}
