// One-shot print mode: run a single debate and write it to stdout.

use std::io::Write;

use anyhow::Context;
use debate_core::debate::{DebateOrchestrator, Evaluator};
use debate_core::DebateReport;

/// Join claim words from the command line, falling back to `default_claim`
/// when none (or only whitespace) were given. The claim is otherwise used
/// as given.
pub fn resolve_claim(words: &[String], default_claim: &str) -> String {
    let joined = words.join(" ");
    if joined.trim().is_empty() {
        default_claim.to_string()
    } else {
        joined
    }
}

/// Plain-text rendering of a report.
pub fn format_report(report: &DebateReport) -> String {
    let metrics = &report.metrics;
    format!(
        "Claim: {claim}\n\n\
         Skeptic:\n{skeptic}\n\n\
         Advocate:\n{advocate}\n\n\
         Evaluation (advocate):\n  \
         Evidence found: {evidence} ({score})\n  \
         Length score: {length:.2}\n",
        claim = report.result.claim,
        skeptic = report.result.skeptic_text,
        advocate = report.result.advocate_text,
        evidence = if metrics.evidence_found { "yes" } else { "no" },
        score = metrics.evidence_score(),
        length = metrics.length_score,
    )
}

/// Run one debate on `claim` and write it to `out`.
pub async fn run(
    orchestrator: &DebateOrchestrator,
    evaluator: &Evaluator,
    claim: &str,
    json: bool,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let result = orchestrator.run_debate(claim).await?;
    let report = DebateReport::new(result, evaluator);

    if json {
        let body = serde_json::to_string_pretty(&report).context("failed to encode report")?;
        writeln!(out, "{body}")?;
    } else {
        write!(out, "{}", format_report(&report))?;
    }
    out.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
