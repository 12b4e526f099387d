//! Path pattern matching.
//!
//! # Responsibilities
//! - Compile route patterns once, honoring the per-rule case flag
//! - Match a candidate path, producing positional and named captures
//!
//! # Design Decisions
//! - Anchoring is the pattern author's choice: a pattern without `^`/`$`
//!   matches anywhere in the candidate
//! - Case-insensitive by default; `caseSensitive` is a rule flag, not a
//!   pattern flag
//! - The whole-match text (`$0`) travels separately from the positional
//!   captures, which are 1-indexed

use std::collections::HashMap;

use regex::{Regex, RegexBuilder};

/// A compiled route pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
}

/// The result of matching one pattern against one candidate path.
///
/// Produced per rule evaluation and discarded after the rule is applied.
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    /// Whether the pattern matched at all. When false, all other fields
    /// are empty and the rule does not apply.
    pub matched: bool,

    /// The entire matched substring (`$0`).
    pub whole: String,

    /// Capture groups 1..n in declaration order. A group that did not
    /// participate in the match captures the empty string.
    pub positional: Vec<String>,

    /// Named capture groups that participated in the match.
    pub named: HashMap<String, String>,
}

impl Pattern {
    /// Compile a pattern. Invalid syntax is a configuration error and is
    /// surfaced to the manifest loader.
    pub fn compile(src: &str, case_sensitive: bool) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(src)
            .case_insensitive(!case_sensitive)
            .build()?;
        Ok(Self { regex })
    }

    /// The pattern source as authored.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Match a candidate path, collecting captures on success.
    pub fn matches(&self, candidate: &str) -> MatchOutcome {
        let Some(caps) = self.regex.captures(candidate) else {
            return MatchOutcome::default();
        };

        let whole = caps
            .get(0)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        let positional = (1..caps.len())
            .map(|i| {
                caps.get(i)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default()
            })
            .collect();

        let named = self
            .regex
            .capture_names()
            .flatten()
            .filter_map(|name| {
                caps.name(name)
                    .map(|m| (name.to_string(), m.as_str().to_string()))
            })
            .collect();

        MatchOutcome {
            matched: true,
            whole,
            positional,
            named,
        }
    }
}
