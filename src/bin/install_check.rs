//! Checks whether the user's settings file references the governance
//! plugin. Companion plumbing for the install flow; no policy logic.

use std::process::ExitCode;

fn main() -> ExitCode {
    let Some(settings) = dirs::home_dir().map(|h| h.join(".claude/settings.json")) else {
        eprintln!("Cannot locate home directory.");
        return ExitCode::from(1);
    };

    let installed = std::fs::read_to_string(&settings)
        .map(|content| content.contains("governance-layer"))
        .unwrap_or(false);

    if installed {
        println!("Governance plugin detected in settings.");
        ExitCode::SUCCESS
    } else {
        println!(
            "CRITICAL: governance plugin not referenced in {}.",
            settings.display()
        );
        println!("Install it before relying on the governance layer:");
        println!("  claude plugin install <repo>/plugins/governance-layer");
        ExitCode::from(1)
    }
}
