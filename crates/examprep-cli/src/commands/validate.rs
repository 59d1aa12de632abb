//! The `examprep validate` command.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;

use examprep_core::parser::{load_bank, validate_bank};
use examprep_core::statistics::TopicTally;

pub fn execute(bank_path: PathBuf) -> Result<()> {
    let questions = load_bank(&bank_path)?;

    let mut topics = TopicTally::new();
    let mut kinds: BTreeMap<&str, usize> = BTreeMap::new();
    for q in &questions {
        topics.record(&q.topic, false);
        *kinds.entry(q.kind.as_str()).or_default() += 1;
    }

    println!(
        "Question bank: {} ({} questions, {} topics)",
        bank_path.display(),
        questions.len(),
        topics.finish().len()
    );
    for (kind, count) in &kinds {
        println!("  {kind}: {count}");
    }

    let warnings = validate_bank(&questions);
    for w in &warnings {
        println!("  [{}] WARNING: {}", w.label(), w.message);
    }

    if warnings.is_empty() {
        println!("All questions valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
