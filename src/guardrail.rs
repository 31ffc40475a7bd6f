//! Catastrophic-command guardrail for shell tool invocations.

use once_cell::sync::Lazy;
use regex::Regex;

/// Patterns that trip the hard guardrail, paired with the rule tag
/// recorded in the audit trail. Matching is textual over the stringified
/// tool input; there is no shell parsing here.
static CATASTROPHIC: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [
        // Recursive forced deletion rooted at /
        (
            "rm.recursive_root",
            r#"\brm\s+(?:-\S+\s+)*-\S*(?:r\S*f|f\S*r)\S*\s+/(?:\s|$|["'*])"#,
        ),
        // Filesystem creation on a device node
        ("mkfs.block_device", r"\bmkfs(?:\.\w+)?\s+(?:\S+\s+)*/dev/"),
        // Raw writes onto a device node
        ("dd.block_device", r"\bdd\s+(?:\S+\s+)*of=/dev/\w+"),
        // Classic fork bomb
        ("fork_bomb", r":\(\)\s*\{\s*:\|:&\s*\}\s*;"),
    ]
    .iter()
    .filter_map(|(name, pattern)| Regex::new(pattern).ok().map(|re| (*name, re)))
    .collect()
});

/// Check stringified tool input for a catastrophic command. Returns the
/// tag of the first matching rule.
pub fn match_catastrophic(text: &str) -> Option<&'static str> {
    CATASTROPHIC
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(name, _)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rm_rf_root() {
        assert_eq!(match_catastrophic("rm -rf /"), Some("rm.recursive_root"));
    }

    #[test]
    fn test_rm_fr_root() {
        assert_eq!(match_catastrophic("rm -fr /"), Some("rm.recursive_root"));
    }

    #[test]
    fn test_rm_rf_root_in_json() {
        // The router matches against the stringified tool_input
        let text = r#"{"command":"rm -rf /"}"#;
        assert_eq!(match_catastrophic(text), Some("rm.recursive_root"));
    }

    #[test]
    fn test_rm_rf_root_with_no_preserve() {
        assert_eq!(
            match_catastrophic("rm --no-preserve-root -rf /"),
            Some("rm.recursive_root")
        );
    }

    #[test]
    fn test_rm_rf_relative_allowed() {
        assert_eq!(match_catastrophic("rm -rf ./build"), None);
        assert_eq!(match_catastrophic("rm -rf build/"), None);
    }

    #[test]
    fn test_rm_rf_subdir_allowed() {
        assert_eq!(match_catastrophic("rm -rf /tmp/cache"), None);
    }

    #[test]
    fn test_rm_without_flags_allowed() {
        assert_eq!(match_catastrophic("rm /etc/passwd"), None);
    }

    #[test]
    fn test_mkfs() {
        assert_eq!(
            match_catastrophic("mkfs.ext4 /dev/sda1"),
            Some("mkfs.block_device")
        );
    }

    #[test]
    fn test_dd_to_device() {
        assert_eq!(
            match_catastrophic("dd if=/dev/zero of=/dev/sda bs=1M"),
            Some("dd.block_device")
        );
    }

    #[test]
    fn test_dd_to_file_allowed() {
        assert_eq!(match_catastrophic("dd if=in.img of=out.img"), None);
    }

    #[test]
    fn test_fork_bomb() {
        assert_eq!(match_catastrophic(":(){ :|:& };:"), Some("fork_bomb"));
    }

    #[test]
    fn test_ordinary_commands_allowed() {
        assert_eq!(match_catastrophic("ls -la"), None);
        assert_eq!(match_catastrophic("cargo build --release"), None);
        assert_eq!(match_catastrophic("git status"), None);
    }
}
