//! End-to-end command-line resolution scenarios, exercising the crate the
//! way the csperf binary does: argument vector in, validated configuration
//! or diagnostic out.

use csperf_config::{
    AutoConfirm, Config, ConfigError, ConfirmationGate, FixedCeiling, Role, TransferMode,
};

/// A ceiling no scenario here gets close to.
const PLENTY: u64 = 1 << 20;

struct RecordingGate {
    approve: bool,
    warnings: Vec<String>,
}

impl RecordingGate {
    fn approving() -> Self {
        RecordingGate {
            approve: true,
            warnings: Vec::new(),
        }
    }

    fn refusing() -> Self {
        RecordingGate {
            approve: false,
            warnings: Vec::new(),
        }
    }
}

impl ConfirmationGate for RecordingGate {
    fn confirm(&mut self, warning: &str) -> bool {
        self.warnings.push(warning.to_string());
        self.approve
    }
}

fn resolve(argv: &[&str]) -> csperf_config::Result<Config> {
    Config::from_args_with(argv.iter().copied(), &FixedCeiling::at(PLENTY), &mut AutoConfirm)
}

fn resolve_with(
    argv: &[&str],
    ceiling: u64,
    gate: &mut RecordingGate,
) -> csperf_config::Result<Config> {
    Config::from_args_with(argv.iter().copied(), &FixedCeiling::at(ceiling), gate)
}

#[test]
fn test_client_run_with_concurrency() {
    let config = resolve(&["csperf", "-c", "host1", "-C", "10", "-P", "5"]).unwrap();
    assert_eq!(config.role, Some(Role::Client));
    assert_eq!(config.server_hostname.as_deref(), Some("host1"));
    assert_eq!(config.total_clients, 10);
    assert_eq!(config.concurrent_clients, 5);
}

#[test]
fn test_total_clients_must_cover_concurrent() {
    let result = resolve(&["csperf", "-c", "host1", "-C", "5", "-P", "10"]);
    assert!(matches!(
        result,
        Err(ConfigError::TotalBelowConcurrent {
            total: 5,
            concurrent: 10
        })
    ));
}

#[test]
fn test_total_clients_must_cover_rate() {
    let result = resolve(&["csperf", "-c", "host1", "-C", "5", "-S", "10"]);
    assert!(matches!(
        result,
        Err(ConfigError::TotalBelowRate {
            total: 5,
            per_sec: 10
        })
    ));
}

#[test]
fn test_concurrency_strategies_conflict() {
    let result = resolve(&["csperf", "-c", "host1", "-C", "10", "-P", "3", "-S", "2"]);
    assert!(matches!(
        result,
        Err(ConfigError::ConcurrencyModeConflict {
            concurrent: 3,
            per_sec: 2
        })
    ));
}

#[test]
fn test_conflicting_strategies_without_total_fail_on_count_first() {
    // With total_clients left at its default of 1, the count comparison
    // fires before the mutual-exclusion check does.
    let result = resolve(&["csperf", "-c", "host1", "-P", "3", "-S", "2"]);
    assert!(matches!(
        result,
        Err(ConfigError::TotalBelowConcurrent {
            total: 1,
            concurrent: 3
        })
    ));
}

#[test]
fn test_server_run_with_port() {
    let config = resolve(&["csperf", "-s", "-p", "6000"]).unwrap();
    assert_eq!(config.role, Some(Role::Server));
    assert!(config.is_server());
    assert_eq!(config.server_port, 6000);
    assert_eq!(config.output_file(), "csperf_server.txt");
}

#[test]
fn test_server_skips_client_invariants() {
    // A server ignores client-side session arithmetic entirely.
    let config = resolve(&["csperf", "-s", "-r", "0", "-C", "0"]).unwrap();
    assert_eq!(config.repeat_count, 0);
}

#[test]
fn test_bare_invocation_rejected() {
    let err = resolve(&["csperf"]).unwrap_err();
    assert!(matches!(err, ConfigError::Usage { .. }));
    assert!(err.to_string().contains("Usage: csperf [-s|-c host] [options]"));
}

#[test]
fn test_defaults_survive_resolution() {
    let config = resolve(&["csperf", "-c", "host1"]).unwrap();
    assert_eq!(config.server_port, 5001);
    assert_eq!(config.data_block_size, 1024);
    assert_eq!(config.total_data_blocks, 1);
    assert_eq!(config.transfer_mode, TransferMode::HalfDuplex);
    assert_eq!(config.total_clients, 1);
    assert_eq!(config.concurrent_clients, 0);
    assert_eq!(config.clients_per_sec, 0);
    assert_eq!(config.repeat_count, 1);
    assert_eq!(config.client_runtime, 0);
    assert_eq!(config.mark_interval_percentage, 100);
    assert_eq!(config.client_output_file, "csperf_client.txt");
    assert_eq!(config.server_output_file, "csperf_server.txt");
}

#[test]
fn test_echo_mode() {
    let config = resolve(&["csperf", "-c", "host1", "-e"]).unwrap();
    assert_eq!(config.transfer_mode, TransferMode::Echo);
}

#[test]
fn test_long_flag_forms() {
    let config = resolve(&[
        "csperf",
        "--client",
        "host1",
        "--total-clients",
        "10",
        "--port",
        "9000",
        "--echo",
    ])
    .unwrap();
    assert_eq!(config.server_hostname.as_deref(), Some("host1"));
    assert_eq!(config.total_clients, 10);
    assert_eq!(config.server_port, 9000);
    assert_eq!(config.transfer_mode, TransferMode::Echo);
}

#[test]
fn test_mark_interval_rejected_at_parse_time() {
    // The range check fires during parsing, so it wins over validation
    // failures the same command line also carries.
    let result = resolve(&["csperf", "-c", "h", "-C", "5", "-P", "10", "-m", "101"]);
    assert!(matches!(result, Err(ConfigError::MarkIntervalOutOfRange(101))));

    let result = resolve(&["csperf", "-s", "-m", "0"]);
    assert!(matches!(result, Err(ConfigError::MarkIntervalOutOfRange(0))));
}

#[test]
fn test_runtime_rejected_at_parse_time() {
    let result = resolve(&["csperf", "-s", "-t", "0"]);
    assert!(matches!(result, Err(ConfigError::RuntimeTooShort(0))));
}

#[test]
fn test_repeat_count_rules() {
    let result = resolve(&["csperf", "-c", "host1", "-r", "0"]);
    assert!(matches!(result, Err(ConfigError::ZeroRepeat)));

    let config = resolve(&["csperf", "-c", "host1", "-r", "-1"]).unwrap();
    assert_eq!(config.repeat_count, -1);
}

#[test]
fn test_missing_role_rejected() {
    let err = resolve(&["csperf", "-p", "6000"]).unwrap_err();
    assert!(matches!(err, ConfigError::MissingRole));
    assert!(err.to_string().contains("no role selected"));
}

#[test]
fn test_role_flags_conflict() {
    let result = resolve(&["csperf", "-c", "host1", "-s"]);
    assert!(matches!(result, Err(ConfigError::Usage { .. })));
}

#[test]
fn test_unknown_flag_rejected() {
    let err = resolve(&["csperf", "-z"]).unwrap_err();
    assert!(matches!(err, ConfigError::Usage { .. }));
    assert!(err.to_string().contains("Try 'csperf -h' for more information"));
}

#[test]
fn test_help_carries_flag_reference() {
    let text = match resolve(&["csperf", "-h"]) {
        Err(ConfigError::Help(text)) => text,
        other => panic!("expected help, got {other:?}"),
    };
    for flag in ["--client", "--server", "--blocksize", "--numblocks", "--repeat", "--logfile"] {
        assert!(text.contains(flag), "help text is missing {flag}");
    }
}

#[test]
fn test_sequential_run_over_descriptor_limit() {
    let mut gate = RecordingGate::approving();
    let result = resolve_with(&["csperf", "-c", "host1", "-C", "100"], 50, &mut gate);
    assert!(matches!(
        result,
        Err(ConfigError::TotalAboveCeiling {
            total: 100,
            ceiling: 50
        })
    ));
    let message = result.unwrap_err().to_string();
    assert!(message.contains("ulimit -n 20000"));
    assert!(gate.warnings.is_empty());
}

#[test]
fn test_concurrent_run_over_descriptor_limit() {
    let mut gate = RecordingGate::approving();
    let result = resolve_with(
        &["csperf", "-c", "host1", "-C", "100", "-P", "80"],
        50,
        &mut gate,
    );
    assert!(matches!(
        result,
        Err(ConfigError::ConcurrentAboveCeiling {
            concurrent: 80,
            ceiling: 50
        })
    ));
}

#[test]
fn test_descriptor_pressure_warns_and_proceeds() {
    let mut gate = RecordingGate::approving();
    let config = resolve_with(&["csperf", "-c", "host1", "-C", "100"], 150, &mut gate).unwrap();
    assert_eq!(config.total_clients, 100);
    assert_eq!(gate.warnings.len(), 1);
    assert!(gate.warnings[0].contains("total clients (100)"));
    assert!(gate.warnings[0].contains("ulimit -n 20000"));
}

#[test]
fn test_descriptor_pressure_declined() {
    let mut gate = RecordingGate::refusing();
    let result = resolve_with(&["csperf", "-c", "host1", "-C", "100"], 150, &mut gate);
    assert!(matches!(
        result,
        Err(ConfigError::LimitWarningDeclined {
            required: 100,
            ceiling: 150
        })
    ));
}

#[test]
fn test_unknown_ceiling_skips_descriptor_checks() {
    let config = Config::from_args_with(
        ["csperf", "-c", "host1", "-C", "1000000"],
        &FixedCeiling::unknown(),
        &mut AutoConfirm,
    )
    .unwrap();
    assert_eq!(config.total_clients, 1_000_000);
}

#[test]
fn test_logfile_binds_to_role_set_anywhere() {
    let config = resolve(&["csperf", "-l", "run.txt", "-c", "host1"]).unwrap();
    assert_eq!(config.client_output_file, "run.txt");
    assert_eq!(config.output_file(), "run.txt");
    assert_eq!(config.server_output_file, "csperf_server.txt");
}

#[test]
fn test_config_serializes_for_run_reports() {
    let config = resolve(&["csperf", "-c", "host1", "-C", "10", "-P", "5", "-e"]).unwrap();
    let json = serde_json::to_value(&config).unwrap();
    assert_eq!(json["role"], "client");
    assert_eq!(json["transfer_mode"], "echo");
    assert_eq!(json["total_clients"], 10);

    let back: Config = serde_json::from_value(json).unwrap();
    assert_eq!(back.server_hostname.as_deref(), Some("host1"));
    assert_eq!(back.concurrent_clients, 5);
}
