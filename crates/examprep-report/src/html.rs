//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS inlined, suitable for
//! printing or handing in.

use std::path::Path;

use anyhow::{Context, Result};

use examprep_core::report::{ExamRecord, MissedRecord};
use examprep_core::statistics::{TopicBand, TopicStat};
use examprep_core::timer::format_clock;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Escape and keep line breaks.
fn html_lines(s: &str) -> String {
    html_escape(s).replace('\n', "<br>")
}

/// Generate an HTML page for a finished exam.
pub fn generate_html(record: &ExamRecord) -> String {
    let report = &record.report;
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>Exam results: {}</title>\n",
        html_escape(&record.candidate.name)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>Exam results</h1>\n");
    let student_id = record
        .candidate
        .student_id
        .as_deref()
        .map(|id| format!(" ({})", html_escape(id)))
        .unwrap_or_default();
    html.push_str(&format!(
        "<p class=\"meta\">Candidate: <strong>{}</strong>{} | {} exam | {} | {}</p>\n",
        html_escape(&record.candidate.name),
        student_id,
        html_escape(&record.candidate.exam_type),
        record.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        record.reason
    ));
    html.push_str("</header>\n");

    // Banner
    let (banner_class, banner_text) = if report.passed {
        ("pass", "PASSED")
    } else {
        ("fail", "FAILED")
    };
    html.push_str(&format!(
        "<section class=\"banner {banner_class}\">\n<h2>{banner_text}</h2>\n<p>{}% (pass mark {}%)</p>\n</section>\n",
        report.score_percentage, record.passing_threshold
    ));

    // Stats
    html.push_str("<section class=\"stats\">\n");
    for (label, value) in [
        ("Score", format!("{}/{}", report.score, report.total_questions)),
        ("Percentage", format!("{}%", report.score_percentage)),
        ("Time taken", format_clock(report.time_taken_seconds)),
        ("Marked for review", report.marked_count.to_string()),
    ] {
        html.push_str(&format!(
            "<div class=\"stat\"><span class=\"label\">{label}</span><span class=\"value\">{value}</span></div>\n"
        ));
    }
    html.push_str("</section>\n");

    // Topics
    if !report.topic_stats.is_empty() {
        html.push_str("<section class=\"topics\">\n<h2>Performance by topic</h2>\n");
        for (band, stats) in report.topics_by_band() {
            html.push_str(&format!(
                "<h3>{}</h3>\n<div class=\"cards\">\n",
                band_heading(band)
            ));
            for stat in stats {
                html.push_str(&topic_card(stat, band));
            }
            html.push_str("</div>\n");
        }

        let focus = report.focus_topics();
        if !focus.is_empty() {
            html.push_str("<h3>Recommended focus</h3>\n<ul class=\"focus\">\n");
            for topic in focus {
                html.push_str(&format!(
                    "<li>Review <strong>{}</strong> before your next attempt.</li>\n",
                    html_escape(topic)
                ));
            }
            html.push_str("</ul>\n");
        }
        html.push_str("</section>\n");
    }

    // Missed questions
    html.push_str("<section class=\"missed\">\n<h2>Missed questions</h2>\n");
    if report.missed.is_empty() {
        html.push_str("<p>Every question was answered correctly.</p>\n");
    }
    for missed in &report.missed {
        html.push_str(&missed_card(missed));
    }
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(record).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(record: &ExamRecord, path: &Path) -> Result<()> {
    let html = generate_html(record);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

fn band_heading(band: TopicBand) -> &'static str {
    match band {
        TopicBand::Weak => "Needs work",
        TopicBand::Average => "Getting there",
        TopicBand::Strong => "Strong",
    }
}

fn topic_card(stat: &TopicStat, band: TopicBand) -> String {
    format!(
        "<div class=\"card {band}\">\n<h4>{}</h4>\n<div class=\"bar\"><div style=\"width: {}%\"></div></div>\n<p>{}/{} correct ({}%)</p>\n</div>\n",
        html_escape(&stat.topic),
        stat.percentage,
        stat.correct,
        stat.total,
        stat.percentage
    )
}

fn missed_card(missed: &MissedRecord) -> String {
    let mut card = String::new();
    card.push_str("<article class=\"card missed-card\">\n");
    card.push_str(&format!(
        "<p class=\"meta\">Question {} | {} | {}</p>\n",
        missed.position + 1,
        html_escape(&missed.topic),
        missed.kind
    ));
    card.push_str(&format!("<h4>{}</h4>\n", html_escape(&missed.question)));
    if let Some(code) = &missed.code {
        card.push_str(&format!("<pre><code>{}</code></pre>\n", html_escape(code)));
    }
    card.push_str(&format!(
        "<p class=\"yours\"><span class=\"label\">Your answer</span>{}</p>\n",
        html_lines(&missed.submitted_display())
    ));
    card.push_str(&format!(
        "<p class=\"expected\"><span class=\"label\">Correct answer</span>{}</p>\n",
        html_lines(&missed.expected_answer.display())
    ));
    if let Some((correct, total)) = missed.zones_correct {
        card.push_str(&format!(
            "<p class=\"meta\">{correct} of {total} zones correct</p>\n"
        ));
    }
    card.push_str("</article>\n");
    card
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; --avg: #fef9c3; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; --avg: #713f12; }
}
@media print { details { display: none; } }
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.banner { padding: 1rem 2rem; border-radius: 8px; }
.pass, .strong { background: var(--pass); }
.fail, .weak { background: var(--fail); }
.average { background: var(--avg); }
.stats { display: flex; gap: 1rem; flex-wrap: wrap; margin: 1rem 0; }
.stat { border: 1px solid var(--border); border-radius: 8px; padding: 0.75rem 1.25rem; }
.label { display: block; font-size: 0.8rem; color: #6b7280; }
.value { font-size: 1.4rem; font-weight: bold; }
.cards { display: grid; grid-template-columns: repeat(auto-fill, minmax(220px, 1fr)); gap: 1rem; }
.card { border: 1px solid var(--border); border-radius: 8px; padding: 1rem; margin: 0.5rem 0; }
.bar { height: 8px; background: var(--border); border-radius: 4px; }
.bar div { height: 8px; background: currentColor; border-radius: 4px; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
"#;
