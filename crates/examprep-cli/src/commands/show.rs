//! The `examprep show` command.

use std::path::PathBuf;

use anyhow::Result;

use examprep_core::report::ExamRecord;
use examprep_core::timer::format_clock;
use examprep_report::html::generate_html;

pub fn execute(record_path: PathBuf, format: String) -> Result<()> {
    let record = ExamRecord::load_json(&record_path)?;

    match format.as_str() {
        "markdown" | "md" => {
            println!("## Exam results: {}\n", record.candidate.name);
            println!("{}", record.report.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        "html" => {
            println!("{}", generate_html(&record));
        }
        _ => {
            print_summary(&record);

            let missed = &record.report.missed;
            if !missed.is_empty() {
                println!("\nMissed questions:");
                for m in missed {
                    println!("  {}. {} ({})", m.position + 1, m.question, m.topic);
                    println!("     yours:   {}", m.submitted_display().replace('\n', "; "));
                    println!(
                        "     correct: {}",
                        m.expected_answer.display().replace('\n', "; ")
                    );
                }
            }
        }
    }

    Ok(())
}

/// Headline plus a per-topic table, weakest topics first.
pub fn print_summary(record: &ExamRecord) {
    use comfy_table::{Cell, Table};

    let report = &record.report;
    let student_id = record
        .candidate
        .student_id
        .as_deref()
        .map(|id| format!(" ({id})"))
        .unwrap_or_default();

    println!(
        "\n{}{student_id}, {} exam, {}",
        record.candidate.name, record.candidate.exam_type, record.reason
    );
    println!(
        "{}: {}% ({}/{} correct, pass mark {}%) in {}",
        if report.passed { "PASSED" } else { "FAILED" },
        report.score_percentage,
        report.score,
        report.total_questions,
        record.passing_threshold,
        format_clock(report.time_taken_seconds)
    );
    if report.marked_count > 0 {
        println!("{} question(s) were still marked for review.", report.marked_count);
    }

    if !report.topic_stats.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Topic", "Correct", "Total", "Score", "Band"]);
        for (band, stats) in report.topics_by_band() {
            for stat in stats {
                table.add_row(vec![
                    Cell::new(&stat.topic),
                    Cell::new(stat.correct),
                    Cell::new(stat.total),
                    Cell::new(format!("{}%", stat.percentage)),
                    Cell::new(band),
                ]);
            }
        }
        println!("\n{table}");
    }

    let focus = report.focus_topics();
    if !focus.is_empty() {
        println!("\nRecommended focus: {}", focus.join(", "));
    }
}
