//! Response Normalizer — turns raw model output into a JSON career plan.
//!
//! Steps: reject empty content, warn on length truncation, strip an outer
//! markdown fence, parse JSON, then check the seven required plan keys
//! under the configured `FieldPolicy`.

use std::str::FromStr;

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::llm_client::Completion;

/// Top-level keys every career plan must carry.
pub const REQUIRED_PLAN_KEYS: [&str; 7] = [
    "readiness_score",
    "summary",
    "skill_gaps",
    "learning_path",
    "internal_opportunities",
    "mentorship_match",
    "next_30_days",
];

/// Characters of offending text echoed back on a parse failure.
const PREVIEW_CHARS: usize = 200;

const FENCE: &str = "```";

/// What to do when the parsed plan lacks required keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldPolicy {
    /// Log a warning and return the partial object.
    #[default]
    Lenient,
    /// Fail with `NormalizeError::MissingFields`.
    Strict,
}

impl FromStr for FieldPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(FieldPolicy::Lenient),
            "strict" => Ok(FieldPolicy::Strict),
            other => Err(format!("unknown field policy '{other}'")),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum NormalizeError {
    #[error("empty response (finish_reason={finish_reason:?})")]
    EmptyResponse { finish_reason: Option<String> },

    #[error("invalid JSON: {reason}")]
    InvalidJson { reason: String, preview: String },

    #[error("missing required fields: {0:?}")]
    MissingFields(Vec<String>),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FenceError {
    #[error("fenced block is empty")]
    EmptyBlock,
}

pub fn normalize_plan(completion: &Completion, policy: FieldPolicy) -> Result<Value, NormalizeError> {
    if completion.content.trim().is_empty() {
        return Err(NormalizeError::EmptyResponse {
            finish_reason: completion.finish_reason.clone(),
        });
    }

    if completion.was_truncated() {
        warn!("Model output was cut off by the token limit; the JSON may be incomplete");
    }

    let payload = extract_fenced(&completion.content).map_err(|e| NormalizeError::InvalidJson {
        reason: e.to_string(),
        preview: preview(&completion.content),
    })?;

    let plan: Value = serde_json::from_str(payload).map_err(|e| NormalizeError::InvalidJson {
        reason: e.to_string(),
        preview: preview(payload),
    })?;

    let missing = missing_keys(&plan);
    if !missing.is_empty() {
        match policy {
            FieldPolicy::Lenient => {
                warn!("Career plan is missing fields {:?}; returning partial plan", missing);
            }
            FieldPolicy::Strict => return Err(NormalizeError::MissingFields(missing)),
        }
    }

    Ok(plan)
}

/// Required keys absent from `plan` (all of them if it is not an object).
pub fn missing_keys(plan: &Value) -> Vec<String> {
    REQUIRED_PLAN_KEYS
        .iter()
        .filter(|key| plan.get(**key).is_none())
        .map(|key| key.to_string())
        .collect()
}

/// Extracts the payload of an outer markdown code fence.
///
/// - A ```` ```json ```` block wins over a generic block; otherwise the first
///   block is used. Text without fences is returned trimmed.
/// - Fences are recognised only at the start of a line, so backticks inside
///   the payload (e.g. in a JSON string) are left alone.
/// - Nested blocks are balanced: an opening fence with an info string
///   increases depth, a bare fence closes the innermost block.
/// - An unterminated block yields everything after its opening fence.
/// - When no line-level fence exists but the text contains ```` ``` ````,
///   the first inline `` ```…``` `` span is used.
pub fn extract_fenced(text: &str) -> Result<&str, FenceError> {
    let lines = line_spans(text);

    let fences: Vec<(usize, &str)> = lines
        .iter()
        .enumerate()
        .filter_map(|(i, &(start, end))| fence_info(&text[start..end]).map(|info| (i, info)))
        .collect();

    if fences.is_empty() {
        return match text.find(FENCE) {
            Some(_) => extract_inline(text),
            None => Ok(text.trim()),
        };
    }

    let open = fences
        .iter()
        .find(|(_, info)| info.eq_ignore_ascii_case("json"))
        .or_else(|| fences.first())
        .map(|(i, _)| *i)
        .unwrap_or_default();

    let mut depth = 1usize;
    let mut close = None;
    for &(i, info) in fences.iter().filter(|(i, _)| *i > open) {
        if info.is_empty() {
            depth -= 1;
            if depth == 0 {
                close = Some(i);
                break;
            }
        } else {
            depth += 1;
        }
    }

    let body_start = lines[open].1;
    let body_end = close.map(|i| lines[i].0).unwrap_or(text.len());
    let body = text.get(body_start..body_end).unwrap_or_default().trim();

    if body.is_empty() {
        Err(FenceError::EmptyBlock)
    } else {
        Ok(body)
    }
}

/// The info string of a block fence line (`""` for a bare fence).
///
/// A line only counts as a fence when the rest of it is a single word, so
/// ```` ```json {"a": 1}``` ```` is treated as inline content.
fn fence_info(line: &str) -> Option<&str> {
    let info = line.trim_start().strip_prefix(FENCE)?.trim();
    if info.contains('`') || info.contains(char::is_whitespace) {
        None
    } else {
        Some(info)
    }
}

/// Handles fences that share a line with the payload, e.g. ```` ```json {"a":1}``` ````.
fn extract_inline(text: &str) -> Result<&str, FenceError> {
    let start = match text.find("```json") {
        Some(idx) => idx + "```json".len(),
        None => text.find(FENCE).map(|idx| idx + FENCE.len()).unwrap_or(0),
    };
    let rest = &text[start..];
    let body = match rest.find(FENCE) {
        Some(end) => &rest[..end],
        None => rest,
    }
    .trim();

    if body.is_empty() {
        Err(FenceError::EmptyBlock)
    } else {
        Ok(body)
    }
}

/// Byte ranges of each line, excluding the `\n` terminator.
fn line_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = 0;
    for (idx, ch) in text.char_indices() {
        if ch == '\n' {
            spans.push((start, idx));
            start = idx + 1;
        }
    }
    spans.push((start, text.len()));
    spans
}

fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().count() > PREVIEW_CHARS {
        out.push_str("...");
    }
    out
}
