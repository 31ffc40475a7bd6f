//! Human-in-the-loop approval over the controlling terminal.

use crate::risk::RiskLevel;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};

/// Capability for asking a human to approve a pending high-risk decision.
/// Injectable so handlers stay testable without a terminal.
pub trait ApprovalPrompter {
    /// Present a yes/no prompt for the pending decision. Returns `true`
    /// only on an explicit affirmative; absence of a terminal is denial.
    /// May block for as long as the human takes; the surrounding host
    /// caps the process, not this call.
    fn request_approval(&self, risk: RiskLevel) -> bool;
}

/// Real prompter that opens `/dev/tty` directly. Stdin already carries the
/// event payload, so the redirected standard streams are useless here.
pub struct TtyPrompter;

impl ApprovalPrompter for TtyPrompter {
    fn request_approval(&self, risk: RiskLevel) -> bool {
        let Ok(mut tty_out) = OpenOptions::new().write(true).open("/dev/tty") else {
            return false;
        };
        let Ok(tty_in) = File::open("/dev/tty") else {
            return false;
        };
        if write!(
            tty_out,
            "Governance approval required ({risk} risk). Proceed? [y/N] "
        )
        .is_err()
        {
            return false;
        }
        if tty_out.flush().is_err() {
            return false;
        }
        let mut line = String::new();
        if BufReader::new(tty_in).read_line(&mut line).is_err() {
            return false;
        }
        line.trim().eq_ignore_ascii_case("y")
    }
}

/// Prompter that denies everything without touching a terminal. Stands in
/// for `TtyPrompter` in automated tests and non-interactive contexts.
pub struct DenyAllPrompter;

impl ApprovalPrompter for DenyAllPrompter {
    fn request_approval(&self, _risk: RiskLevel) -> bool {
        false
    }
}
