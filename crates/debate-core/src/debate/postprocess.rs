// Output clean-up for each turn: strip the echoed prompt/label prefix and
// suppress degenerate, looping output.

use tracing::warn;

use crate::config::RepetitionGuardConfig;

/// Remove the echoed prompt and `label` from a turn's raw text.
///
/// Everything up to and including the first occurrence of `label` is dropped,
/// then any further copies of `label` are removed until none remain, and the
/// result is trimmed. When `label` is absent (or empty) this is just a trim.
/// The result never contains `label`, so applying it twice changes nothing.
pub fn strip_label(raw: &str, label: &str) -> String {
    remove_label(cut_through_label(raw, label), label)
}

/// The model's own continuation inside `raw`.
///
/// An exact echo of `prompt` at the start is cut off, so a label that also
/// appears inside the claim or the embedded skeptic text is never mistaken
/// for the end of the prompt. Without that echo, everything through the first
/// `label` is dropped instead.
pub fn continuation<'a>(raw: &'a str, prompt: &str, label: &str) -> &'a str {
    if !prompt.is_empty() {
        if let Some(rest) = raw.strip_prefix(prompt) {
            return rest;
        }
    }
    cut_through_label(raw, label)
}

/// Remove every copy of `label` from `text` and trim.
pub fn remove_label(text: &str, label: &str) -> String {
    if label.is_empty() {
        return text.trim().to_string();
    }

    // Removing one copy can splice a new one together, hence the loop.
    let mut text = text.to_string();
    while text.contains(label) {
        text = text.replace(label, "");
    }

    text.trim().to_string()
}

fn cut_through_label<'a>(raw: &'a str, label: &str) -> &'a str {
    if label.is_empty() {
        return raw;
    }
    match raw.find(label) {
        Some(idx) => &raw[idx + label.len()..],
        None => raw,
    }
}

/// Count non-overlapping occurrences of `pattern` in `text`.
fn count_occurrences(text: &str, pattern: &str) -> usize {
    if pattern.is_empty() {
        return 0;
    }
    text.matches(pattern).count()
}

// ---------------------------------------------------------------------------
// RepetitionGuard
// ---------------------------------------------------------------------------

/// Heuristic guard against looping model output.
///
/// If any watched pattern shows up more than `max_repeats` times, the whole
/// turn is replaced with a fixed warning. Thresholds are ad hoc and tunable
/// through `[repetition_guard]`; passing the guard says nothing about the
/// coherence of the text.
#[derive(Debug, Clone)]
pub struct RepetitionGuard {
    patterns: Vec<String>,
    max_repeats: usize,
    warning: String,
}

impl RepetitionGuard {
    pub fn new(patterns: Vec<String>, max_repeats: usize, warning: impl Into<String>) -> Self {
        RepetitionGuard {
            patterns,
            max_repeats,
            warning: warning.into(),
        }
    }

    /// Build a guard from config, or `None` when the guard is disabled.
    pub fn from_config(config: &RepetitionGuardConfig) -> Option<Self> {
        config.enabled.then(|| {
            RepetitionGuard::new(
                config.patterns.clone(),
                config.max_repeats,
                config.warning.clone(),
            )
        })
    }

    /// The first watched pattern repeated past the threshold, if any.
    pub fn tripped_by(&self, text: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|p| count_occurrences(text, p) > self.max_repeats)
            .map(String::as_str)
    }

    /// The warning to show instead of `text`, if the guard trips.
    ///
    /// Run this on the continuation before label copies are removed, or a
    /// model looping on its own label is never caught.
    pub fn check(&self, text: &str) -> Option<&str> {
        let pattern = self.tripped_by(text)?;
        warn!(pattern, max_repeats = self.max_repeats, "repetition guard tripped");
        Some(&self.warning)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_echoed_prompt_through_label() {
        assert_eq!(
            strip_label("Critique this. Issues: it is flawed.", "Issues:"),
            "it is flawed."
        );
    }

    #[test]
    fn absent_label_only_trims() {
        assert_eq!(strip_label("  plain answer \n", "Defense:"), "plain answer");
    }

    #[test]
    fn empty_label_only_trims() {
        assert_eq!(strip_label("  a Defense: b ", ""), "a Defense: b");
    }

    #[test]
    fn later_copies_of_label_are_removed() {
        assert_eq!(
            strip_label("Defend X\nDefense: one Defense: two", "Defense:"),
            "one  two"
        );
    }

    #[test]
    fn spliced_label_is_removed_too() {
        // Removing the inner "ab" joins "a" and "b" into a new "ab".
        assert_eq!(strip_label("xab aabb", "ab"), "");
    }

    #[test]
    fn strip_label_is_idempotent() {
        let cases = [
            ("Critique this. Issues: it is flawed.", "Issues:"),
            ("Issues: Issues: doubled", "Issues:"),
            ("no label here", "Issues:"),
            ("Question this claim: X\nPotential issues: weak data", "Potential issues:"),
            ("xab aabb cab", "ab"),
            ("   ", "Issues:"),
        ];
        for (raw, label) in cases {
            let once = strip_label(raw, label);
            let twice = strip_label(&once, label);
            assert_eq!(once, twice, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn continuation_cuts_exact_prompt_echo() {
        let prompt = "Defend this claim: Defense: spending is too high\nDefense:";
        let raw = format!("{prompt} It funds essential services.");
        assert_eq!(
            continuation(&raw, prompt, "Defense:"),
            " It funds essential services."
        );
        // Without the exact echo the first label is the cut point.
        assert_eq!(
            continuation("Defense: it holds", "other prompt", "Defense:"),
            " it holds"
        );
        assert_eq!(continuation("no echo", "", "Defense:"), "no echo");
    }

    #[test]
    fn remove_label_drops_every_copy() {
        assert_eq!(remove_label(" a Defense: b Defense: ", "Defense:"), "a  b");
        assert_eq!(remove_label("  kept  ", ""), "kept");
    }

    #[test]
    fn guard_passes_normal_text() {
        let guard = RepetitionGuard::from_config(&RepetitionGuardConfig::default()).unwrap();
        assert_eq!(guard.check("Defense: the claim holds because of X."), None);
    }

    #[test]
    fn guard_replaces_looping_text() {
        let config = RepetitionGuardConfig::default();
        let guard = RepetitionGuard::from_config(&config).unwrap();
        let looping = "Defense: a. ".repeat(4);
        assert_eq!(guard.tripped_by(&looping), Some("Defense:"));
        assert_eq!(guard.check(&looping), Some(config.warning.as_str()));
    }

    #[test]
    fn guard_threshold_is_exclusive() {
        let guard = RepetitionGuard::new(vec!["again".into()], 3, "stuck");
        assert_eq!(guard.check("again again again"), None);
        assert_eq!(guard.check("again again again again"), Some("stuck"));
    }

    #[test]
    fn disabled_guard_is_none() {
        let config = RepetitionGuardConfig {
            enabled: false,
            ..RepetitionGuardConfig::default()
        };
        assert!(RepetitionGuard::from_config(&config).is_none());
    }

    #[test]
    fn empty_pattern_never_trips() {
        let guard = RepetitionGuard::new(vec![String::new()], 1, "stuck");
        assert_eq!(guard.check("anything"), None);
    }
}
