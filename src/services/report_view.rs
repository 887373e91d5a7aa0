//! HTML rendering of test run reports.
//!
//! Durations shown here are computed from start/end times at render time
//! and never stored.

use chrono::{DateTime, TimeDelta, Utc};

use crate::models::{SpecStatus, SuiteRun, TestRun};

const STYLE: &str = "body { font-family: system-ui, sans-serif; max-width: 1100px; margin: 2rem auto; padding: 0 1rem; }\n\
table { border-collapse: collapse; width: 100%; margin-bottom: 1.5rem; }\n\
th, td { text-align: left; padding: 0.35rem 0.6rem; border-bottom: 1px solid #ddd; }\n\
.passed { background: #d4edda; }\n\
.failed { background: #f8d7da; }\n\
.skipped { background: #fff3cd; }\n\
.other { background: #e2e3e5; }\n\
.message { color: #666; font-size: 0.9em; white-space: pre-wrap; }\n";

/// Format `end - start` as a duration string such as `1h2m3.5s`.
pub fn calculate_duration(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    format_duration(end - start)
}

/// Format a duration the way Go's `time.Duration` prints.
///
/// Sub-second values use the largest fitting unit (`ns`, `µs`, `ms`);
/// longer values use `h`/`m`/`s` with fractional seconds, trailing zeros
/// trimmed. Zero is `0s`.
pub fn format_duration(delta: TimeDelta) -> String {
    let nanos = delta.num_nanoseconds().unwrap_or(if delta < TimeDelta::zero() {
        i64::MIN
    } else {
        i64::MAX
    });
    if nanos == 0 {
        return "0s".to_string();
    }

    let abs = nanos.unsigned_abs();
    let body = if abs < 1_000 {
        format!("{}ns", abs)
    } else if abs < 1_000_000 {
        format!("{}µs", with_fraction(abs / 1_000, abs % 1_000, 3))
    } else if abs < 1_000_000_000 {
        format!("{}ms", with_fraction(abs / 1_000_000, abs % 1_000_000, 6))
    } else {
        let total_secs = abs / 1_000_000_000;
        let hours = total_secs / 3600;
        let minutes = (total_secs % 3600) / 60;
        let seconds = with_fraction(total_secs % 60, abs % 1_000_000_000, 9);
        if hours > 0 {
            format!("{}h{}m{}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m{}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    };

    if nanos < 0 { format!("-{}", body) } else { body }
}

fn with_fraction(whole: u64, remainder: u64, digits: usize) -> String {
    if remainder == 0 {
        return whole.to_string();
    }
    let fraction = format!("{:0width$}", remainder, width = digits);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

/// Escape text for interpolation into HTML.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page_start(html: &mut String, title: &str) {
    html.push_str("<!DOCTYPE html>\n<html><head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_html(title)));
    html.push_str("<style>\n");
    html.push_str(STYLE);
    html.push_str("</style>\n</head><body>\n");
}

fn status_class(status: &SpecStatus) -> &'static str {
    match status {
        SpecStatus::Passed => "passed",
        SpecStatus::Failed => "failed",
        SpecStatus::Skipped => "skipped",
        SpecStatus::Other(_) => "other",
    }
}

fn timestamp(t: &DateTime<Utc>) -> String {
    t.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Render the list of all test runs.
pub fn render_test_runs(runs: &[TestRun]) -> String {
    let mut html = String::new();
    page_start(&mut html, "Test Runs");

    html.push_str("<h1>Test Runs</h1>\n");

    if runs.is_empty() {
        html.push_str("<p>No test runs recorded.</p>\n");
    } else {
        html.push_str("<table>\n<tr><th>ID</th><th>Project</th><th>Seed</th><th>Start</th><th>End</th><th>Duration</th><th>Suites</th><th>Specs</th></tr>\n");
        for run in runs {
            html.push_str(&format!(
                "<tr><td><a href=\"/reports/testruns/{id}\">{id}</a></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                escape_html(&run.test_project_name),
                run.test_seed,
                timestamp(&run.start_time),
                timestamp(&run.end_time),
                calculate_duration(run.start_time, run.end_time),
                run.suite_runs.len(),
                run.spec_count(),
                id = run.id,
            ));
        }
        html.push_str("</table>\n");
    }

    html.push_str("</body></html>");
    html
}

/// Render one test run with its suites and specs.
pub fn render_test_run(run: &TestRun) -> String {
    let mut html = String::new();
    page_start(&mut html, &format!("Test Run {}", run.id));

    html.push_str(&format!(
        "<h1>Test Run {} &mdash; {}</h1>\n",
        run.id,
        escape_html(&run.test_project_name)
    ));
    html.push_str(&format!(
        "<p><strong>Seed:</strong> {} &nbsp; <strong>Start:</strong> {} &nbsp; <strong>End:</strong> {} &nbsp; <strong>Duration:</strong> {}</p>\n",
        run.test_seed,
        timestamp(&run.start_time),
        timestamp(&run.end_time),
        calculate_duration(run.start_time, run.end_time)
    ));

    if run.suite_runs.is_empty() {
        html.push_str("<p>No suite runs recorded.</p>\n");
    }

    for suite in &run.suite_runs {
        render_suite(&mut html, suite);
    }

    html.push_str("</body></html>");
    html
}

fn render_suite(html: &mut String, suite: &SuiteRun) {
    html.push_str(&format!(
        "<h2>{} <small>({})</small></h2>\n",
        escape_html(&suite.suite_name),
        calculate_duration(suite.start_time, suite.end_time)
    ));

    html.push_str("<table>\n<tr><th>Spec</th><th>Status</th><th>Duration</th></tr>\n");
    for spec in &suite.spec_runs {
        html.push_str(&format!(
            "<tr class=\"{}\"><td>{}",
            status_class(&spec.status),
            escape_html(&spec.spec_description)
        ));
        if let Some(message) = spec.message.as_deref().filter(|m| !m.is_empty()) {
            html.push_str(&format!(
                "<div class=\"message\">{}</div>",
                escape_html(message)
            ));
        }
        html.push_str(&format!(
            "</td><td>{}</td><td>{}</td></tr>\n",
            escape_html(spec.status.label()),
            calculate_duration(spec.start_time, spec.end_time)
        ));
    }
    html.push_str("</table>\n");
}
