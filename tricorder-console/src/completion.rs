//! Tab completion: longest-common-prefix expansion over engine candidates.

use crate::engine::{Completions, ScriptEngine};
use crate::sink::{LogSink, Style};

/// Expand `prefix` using the engine's completion capability.
///
/// No candidates (or no completion support) leaves the input unchanged.
/// Candidates that share a common extension expand the input by it. A
/// genuinely ambiguous set (no shared extension at all) emits one Info
/// record listing every full completion and leaves the input unchanged.
pub fn expand(prefix: &str, engine: &mut dyn ScriptEngine, log: &dyn LogSink) -> String {
    let Some(Completions {
        candidates,
        token_prefix,
    }) = engine.completions(prefix)
    else {
        return prefix.to_string();
    };

    if candidates.is_empty() {
        return prefix.to_string();
    }

    let common = common_prefix(&candidates);
    if common.is_empty() {
        let listing = candidates
            .iter()
            .map(|c| format!("{token_prefix}{c}"))
            .collect::<Vec<_>>()
            .join("  ");
        log.log(&listing, Style::Info);
        return prefix.to_string();
    }

    format!("{prefix}{common}")
}

/// Longest string that is a prefix of every candidate, compared
/// character by character.
fn common_prefix(candidates: &[String]) -> String {
    let mut common: &str = &candidates[0];
    for cand in &candidates[1..] {
        let mut end = 0;
        for ((i, a), b) in common.char_indices().zip(cand.chars()) {
            if a != b {
                break;
            }
            end = i + a.len_utf8();
        }
        common = &common[..end];
        if common.is_empty() {
            break;
        }
    }
    common.to_string()
}
