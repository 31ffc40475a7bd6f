//! Governance hook entry point: one process per lifecycle event.

use governance_hook::approval::TtyPrompter;
use governance_hook::audit::AuditSink;
use governance_hook::config::PolicyConfig;
use governance_hook::input::{EventPayload, HookEvent};
use governance_hook::router::route;

use std::io::{self, Read};
use std::process::ExitCode;

fn main() -> ExitCode {
    // Event selector from argv; anything unrecognized fails open
    let Some(event) = parse_event_arg() else {
        return ExitCode::SUCCESS;
    };

    // Read JSON payload from stdin
    let mut input_str = String::new();
    if io::stdin().read_to_string(&mut input_str).is_err() {
        return ExitCode::SUCCESS; // Fail-open on read error
    }
    if input_str.trim().is_empty() {
        return ExitCode::SUCCESS; // Nothing to govern, nothing to log
    }

    let payload = match EventPayload::parse(&input_str) {
        Ok(v) => v,
        Err(_) => return ExitCode::SUCCESS, // Fail-open on parse error
    };

    // Config problems never abort startup; defaults apply silently
    let policy = PolicyConfig::load().compile();
    let sink = AuditSink::from_policy(&policy);

    let outcome = route(event, &payload, &policy, &TtyPrompter);

    // The local log is the one durability guarantee: losing it fails the
    // invocation closed
    for entry in &outcome.entries {
        if let Err(e) = sink.record(entry) {
            eprintln!("Governance audit log unavailable: {e}");
            return ExitCode::from(1);
        }
    }

    for alert in &outcome.alerts {
        eprintln!("{alert}");
    }

    outcome.action.exit_code()
}

fn parse_event_arg() -> Option<HookEvent> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--event" {
            return args.next()?.parse().ok();
        }
        if let Some(value) = arg.strip_prefix("--event=") {
            return value.parse().ok();
        }
    }
    None
}
