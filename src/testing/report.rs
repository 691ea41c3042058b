use std::io::{self, Write};

use serde_json::Value;

use super::{BODY_EXCERPT_CHARS, SuiteResult, excerpt};

/// Renders a finished suite to some output. Computing results never depends
/// on which reporter is chosen.
pub trait Reporter {
    fn write(&self, result: &SuiteResult, out: &mut dyn Write) -> io::Result<()>;
}

/// Human-readable summary, one line per case.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextReporter {
    /// Print each response body under its case line.
    pub show_body: bool,
}

/// Pretty-printed JSON for CI pipelines.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReporter;

impl Reporter for TextReporter {
    fn write(&self, result: &SuiteResult, out: &mut dyn Write) -> io::Result<()> {
        out.write_all(report(result, self.show_body).as_bytes())
    }
}

impl Reporter for JsonReporter {
    fn write(&self, result: &SuiteResult, out: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, result)?;
        writeln!(out)
    }
}

/// Deterministic text report: durations are left out so identical outcomes
/// render identically. With `show_body`, each case line is followed by the
/// response body as compact JSON.
pub fn report(result: &SuiteResult, show_body: bool) -> String {
    let mut lines = Vec::with_capacity(result.results().len() + result.skipped().len() + 1);

    for case in result.results() {
        match case.kind {
            None => lines.push(format!("PASS  {}: {}", case.name, case.message)),
            Some(kind) => lines.push(format!("FAIL  {}: [{kind}] {}", case.name, case.message)),
        }
        if show_body {
            if let Some(body) = &case.body {
                lines.push(format!("      body: {}", render_body(body)));
            }
        }
    }
    for name in result.skipped() {
        lines.push(format!("SKIP  {name}: destructive, enable with --include-destructive"));
    }

    let total = result.results().len();
    let passed = total - result.failures().count();
    let verdict = if result.passed() { "PASSED" } else { "FAILED" };
    let mut summary = format!("{verdict}: {passed}/{total} cases passed");
    if !result.skipped().is_empty() {
        summary.push_str(&format!(", {} skipped", result.skipped().len()));
    }
    lines.push(summary);

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

fn render_body(body: &Value) -> String {
    match body {
        Value::String(raw) => excerpt(raw, BODY_EXCERPT_CHARS),
        other => excerpt(&other.to_string(), BODY_EXCERPT_CHARS),
    }
}
