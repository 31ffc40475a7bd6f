//! Governance Hook - policy enforcement for AI coding-assistant sessions.
//!
//! Intercepts session lifecycle events (SessionStart, UserPromptSubmit,
//! PreToolUse, PostToolUse), redacts PII, classifies risk, consults a
//! human supervisor for high-risk prompts, and writes an append-only
//! audit trail with optional forwarding to a remote collector.

pub mod approval;
pub mod audit;
pub mod config;
pub mod decision;
pub mod guardrail;
pub mod input;
pub mod pii;
pub mod risk;
pub mod router;

pub use approval::{ApprovalPrompter, DenyAllPrompter, TtyPrompter};
pub use audit::{AuditEntry, AuditSink, Verdict};
pub use config::{CompiledPolicy, HitlMode, PolicyConfig};
pub use decision::{Action, Outcome};
pub use input::{EventPayload, HookEvent};
pub use pii::{Detection, detect};
pub use risk::{RiskLevel, classify};
pub use router::route;
