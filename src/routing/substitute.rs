//! Capture substitution for destination and header templates.
//!
//! # Responsibilities
//! - Replace `$0`, `$1`..`$n` and `$name` references with captured text
//!
//! # Design Decisions
//! - Best-effort rewriting: an out-of-range index or unknown name resolves
//!   to the empty string, never an error
//! - A `$` not followed by a valid reference passes through unchanged

use crate::routing::pattern::MatchOutcome;

/// Rewrite a template, replacing capture references with captured text.
///
/// `$0` is the whole matched substring; `$<digits>` is the positional
/// capture at that 1-based index; `$<identifier>` is a named capture.
pub fn substitute(template: &str, outcome: &MatchOutcome) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }

        match chars.peek() {
            Some(&(_, d)) if d.is_ascii_digit() => {
                let mut index: usize = 0;
                while let Some(&(_, d)) = chars.peek() {
                    let Some(digit) = d.to_digit(10) else { break };
                    index = index.saturating_mul(10).saturating_add(digit as usize);
                    chars.next();
                }
                if index == 0 {
                    out.push_str(&outcome.whole);
                } else if let Some(capture) = outcome.positional.get(index - 1) {
                    out.push_str(capture);
                }
            }
            Some(&(_, a)) if a.is_ascii_alphabetic() || a == '_' => {
                let mut name = String::new();
                while let Some(&(_, a)) = chars.peek() {
                    if !a.is_ascii_alphanumeric() && a != '_' {
                        break;
                    }
                    name.push(a);
                    chars.next();
                }
                if let Some(capture) = outcome.named.get(&name) {
                    out.push_str(capture);
                }
            }
            _ => out.push('$'),
        }
    }

    out
}
