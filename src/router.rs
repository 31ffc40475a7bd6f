//! Per-event policy handlers and the event dispatcher.

use serde_json::json;

use crate::approval::ApprovalPrompter;
use crate::audit::{AuditEntry, Verdict};
use crate::config::{CompiledPolicy, HitlMode};
use crate::decision::{Action, Outcome};
use crate::guardrail;
use crate::input::{EventPayload, HookEvent};
use crate::pii;
use crate::risk::{self, RiskLevel};

/// Dispatch one event to its handler. Handlers are pure over (payload,
/// policy, prompter); the returned outcome carries the audit entries in
/// emission order and every stderr alert the boundary should print.
pub fn route(
    event: HookEvent,
    payload: &EventPayload,
    policy: &CompiledPolicy,
    prompter: &dyn ApprovalPrompter,
) -> Outcome {
    match event {
        HookEvent::SessionStart => handle_session_start(payload),
        HookEvent::UserPromptSubmit => handle_user_prompt(payload, policy, prompter),
        HookEvent::PreToolUse => handle_pre_tool_use(payload),
        HookEvent::PostToolUse => handle_post_tool_use(payload, policy),
    }
}

fn handle_session_start(payload: &EventPayload) -> Outcome {
    let entry = AuditEntry::new(
        "SESSION_START",
        RiskLevel::Low,
        Verdict::Allowed,
        json!({"session_id": payload.session_id}),
    );
    Outcome::new(Action::Allow)
        .with_entry(entry)
        .with_alert("Governance layer active: session audited.")
}

fn handle_user_prompt(
    payload: &EventPayload,
    policy: &CompiledPolicy,
    prompter: &dyn ApprovalPrompter,
) -> Outcome {
    let prompt = payload.prompt.as_deref().unwrap_or("");
    let detection = pii::detect(prompt, policy);
    let risk = risk::classify(prompt, policy);

    // The input check is logged for every prompt; its verdict reflects the
    // PII/keyword stage. An interactive HITL outcome gets its own entry.
    let verdict = if detection.found || (risk == RiskLevel::High && policy.hitl_mode == HitlMode::Block)
    {
        Verdict::Blocked
    } else {
        Verdict::Allowed
    };

    let input_check = AuditEntry::new(
        "INPUT_CHECK",
        risk,
        verdict,
        json!({
            "session_id": payload.session_id,
            "original_prompt": prompt,
            "redacted_prompt": detection.redacted,
            "has_pii": detection.found,
            "categories": detection.categories,
        }),
    );
    let mut outcome = Outcome::new(Action::Allow).with_entry(input_check);

    // PII overrides everything: there is no channel to hand a redacted
    // prompt back to the assistant, so blocking is the only safe action.
    if detection.found {
        outcome.action = Action::Block;
        outcome.alerts.push(format!(
            "Governance alert: PII detected in prompt. Redacted form: {}",
            detection.redacted
        ));
        outcome
            .alerts
            .push("Blocking request per PII policy.".to_string());
        return outcome;
    }

    if risk == RiskLevel::High {
        match policy.hitl_mode {
            HitlMode::Block => {
                outcome.action = Action::Block;
                outcome
                    .alerts
                    .push("Governance alert: high-risk prompt detected.".to_string());
                outcome.alerts.push(
                    "Automated processing of high-risk inputs requires human approval. Operation blocked."
                        .to_string(),
                );
            }
            HitlMode::Interactive => {
                let approved = prompter.request_approval(risk);
                let (event_type, verdict) = if approved {
                    ("HITL_APPROVAL", Verdict::Approved)
                } else {
                    ("HITL_DENIAL", Verdict::Denied)
                };
                outcome.entries.push(AuditEntry::new(
                    event_type,
                    risk,
                    verdict,
                    json!({"session_id": payload.session_id}),
                ));
                if approved {
                    outcome
                        .alerts
                        .push("High-risk prompt approved by supervisor.".to_string());
                } else {
                    outcome.action = Action::Block;
                    outcome
                        .alerts
                        .push("High-risk prompt denied by supervisor.".to_string());
                }
            }
        }
    }

    outcome
}

fn handle_pre_tool_use(payload: &EventPayload) -> Outcome {
    let tool_name = payload.tool_name();
    let input_text = payload.tool_input.to_string();

    let tripped = if tool_name == "Bash" {
        guardrail::match_catastrophic(&input_text)
    } else {
        None
    };

    let verdict = if tripped.is_some() {
        Verdict::Blocked
    } else {
        Verdict::Allowed
    };
    let entry = AuditEntry::new(
        "TOOL_USE",
        RiskLevel::Low,
        verdict,
        json!({
            "session_id": payload.session_id,
            "tool_name": tool_name,
            "tool_input": payload.tool_input,
        }),
    );

    let mut outcome = Outcome::new(Action::Allow).with_entry(entry);
    if let Some(rule) = tripped {
        outcome.action = Action::HardBlock;
        outcome
            .alerts
            .push(format!("Governance block: dangerous command blocked ({rule})."));
    }
    outcome
}

fn handle_post_tool_use(payload: &EventPayload, policy: &CompiledPolicy) -> Outcome {
    let tool_name = payload.tool_name();
    let content = payload.tool_result_text();
    let detection = pii::detect(&content, policy);

    let entry = AuditEntry::new(
        "TOOL_OUTPUT_CHECK",
        RiskLevel::Low,
        Verdict::Allowed,
        json!({
            "session_id": payload.session_id,
            "tool_name": tool_name,
            "has_pii": detection.found,
            "categories": detection.categories,
            "content_snippet": snippet(&content, 200),
        }),
    );

    // Detect-only stage: the tool already ran and its output is already
    // delivered, so this handler can flag and log but never block.
    let mut outcome = Outcome::new(Action::Allow).with_entry(entry);
    if detection.found {
        outcome.alerts.push(
            "Governance alert: tool output contains PII. Incident logged.".to_string(),
        );
    }
    outcome
}

fn snippet(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
