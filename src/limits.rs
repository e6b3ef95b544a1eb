//! Host resource limits and the interactive confirmation gate.
//!
//! Large benchmark runs can ask for more client sessions than the host
//! allows simultaneously open file descriptors. The validator consults a
//! [`DescriptorCeilingProbe`] for the current ceiling and, when a run gets
//! close to it, routes a warning through a [`ConfirmationGate`] before
//! letting the run proceed.
//!
//! Both capabilities are traits so embedders and tests can substitute
//! deterministic implementations; the defaults ([`RlimitProbe`] and
//! [`StdinGate`]) talk to the real host and the real operator.

use std::io::{self, Read, Write};

/// Reports how many file descriptors the current process may hold open.
///
/// The probe is best-effort: `None` means the ceiling could not be
/// determined, and the validator skips every descriptor-based check in
/// that case rather than failing the run.
pub trait DescriptorCeilingProbe {
    /// Current soft limit on open descriptors, or `None` if unknown.
    fn descriptor_ceiling(&self) -> Option<u64>;
}

/// Asks whether the run may proceed past a soft resource warning.
///
/// The validator composes the warning text; the gate owns presentation and
/// the decision. Returning `false` rejects the configuration.
pub trait ConfirmationGate {
    /// Present `warning` and report whether the run may proceed.
    fn confirm(&mut self, warning: &str) -> bool;
}

/// Probe backed by the operating system's per-process resource limits.
#[derive(Debug, Default, Clone, Copy)]
pub struct RlimitProbe;

#[cfg(unix)]
impl DescriptorCeilingProbe for RlimitProbe {
    fn descriptor_ceiling(&self) -> Option<u64> {
        let mut limit: libc::rlimit = unsafe { std::mem::zeroed() };
        // SAFETY: `limit` is a valid rlimit struct for the duration of the
        // call and getrlimit writes nothing outside it.
        let rc = unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, &mut limit) };
        if rc == 0 {
            Some(limit.rlim_cur as u64)
        } else {
            None
        }
    }
}

#[cfg(not(unix))]
impl DescriptorCeilingProbe for RlimitProbe {
    fn descriptor_ceiling(&self) -> Option<u64> {
        None
    }
}

/// Probe that answers with a preset ceiling.
///
/// Used by tests and by embedders that want to enforce a limit of their
/// own choosing instead of the host's.
#[derive(Debug, Clone, Copy)]
pub struct FixedCeiling(Option<u64>);

impl FixedCeiling {
    /// A probe that always reports `ceiling` descriptors.
    pub fn at(ceiling: u64) -> Self {
        FixedCeiling(Some(ceiling))
    }

    /// A probe that always fails, as on hosts without resource limits.
    pub fn unknown() -> Self {
        FixedCeiling(None)
    }
}

impl DescriptorCeilingProbe for FixedCeiling {
    fn descriptor_ceiling(&self) -> Option<u64> {
        self.0
    }
}

/// Interactive gate for terminal use.
///
/// Prints the warning to standard output and blocks until one byte arrives
/// on standard input. Any keystroke lets the run proceed; the operator
/// backs out with Ctrl-C. End of input also proceeds, so a piped run with
/// closed stdin falls through rather than hanging.
#[derive(Debug, Default)]
pub struct StdinGate;

impl ConfirmationGate for StdinGate {
    fn confirm(&mut self, warning: &str) -> bool {
        print!("{warning}\nPress any key to continue, or Ctrl-C to abort.. ");
        let _ = io::stdout().flush();
        let mut byte = [0u8; 1];
        let _ = io::stdin().read(&mut byte);
        println!();
        true
    }
}

/// Gate that approves every warning without interaction.
#[derive(Debug, Default)]
pub struct AutoConfirm;

impl ConfirmationGate for AutoConfirm {
    fn confirm(&mut self, _warning: &str) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_rlimit_probe_reports_a_ceiling() {
        let ceiling = RlimitProbe.descriptor_ceiling();
        assert!(ceiling.is_some());
        assert!(ceiling.unwrap() > 0);
    }

    #[test]
    fn test_fixed_ceiling_reports_preset_value() {
        assert_eq!(FixedCeiling::at(1024).descriptor_ceiling(), Some(1024));
        assert_eq!(FixedCeiling::unknown().descriptor_ceiling(), None);
    }

    #[test]
    fn test_auto_confirm_approves_without_input() {
        assert!(AutoConfirm.confirm("descriptor pressure"));
    }
}
