// Prompt templates for the skeptic and advocate turns.
//
// Templates come from `[prompts]` in debate.toml and use `{claim}` and
// `{skeptic}` placeholders. Substitution is a single left-to-right pass, so a
// claim that itself contains `{skeptic}` is inserted verbatim.

use crate::config::PromptConfig;

pub const CLAIM_PLACEHOLDER: &str = "{claim}";
pub const SKEPTIC_PLACEHOLDER: &str = "{skeptic}";

// ---------------------------------------------------------------------------
// Turn prompts
// ---------------------------------------------------------------------------

/// Build the prompt asking the model to critique `claim`.
pub fn build_skeptic_prompt(prompts: &PromptConfig, claim: &str) -> String {
    render_template(&prompts.skeptic_template, &[("claim", claim)])
}

/// Build the prompt asking the model to defend `claim` against the skeptic.
///
/// `skeptic_text` is the skeptic turn's raw output, echoed prompt included.
pub fn build_advocate_prompt(prompts: &PromptConfig, claim: &str, skeptic_text: &str) -> String {
    render_template(
        &prompts.advocate_template,
        &[("claim", claim), ("skeptic", skeptic_text)],
    )
}

// ---------------------------------------------------------------------------
// Template rendering
// ---------------------------------------------------------------------------

/// Replace `{name}` occurrences with their values in one pass.
///
/// Unknown `{...}` groups and unmatched braces are copied through unchanged.
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + 64);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];
        match after_open.find('}') {
            Some(close) => {
                let key = &after_open[..close];
                match vars.iter().find(|(name, _)| *name == key) {
                    Some((_, value)) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after_open[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
