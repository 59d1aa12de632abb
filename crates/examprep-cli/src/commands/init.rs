//! The `examprep init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create examprep.toml
    if std::path::Path::new("examprep.toml").exists() {
        println!("examprep.toml already exists, skipping.");
    } else {
        std::fs::write("examprep.toml", SAMPLE_CONFIG)?;
        println!("Created examprep.toml");
    }

    // Create sample bank
    std::fs::create_dir_all("banks")?;
    let sample_path = std::path::Path::new("banks/sample.json");
    if sample_path.exists() {
        println!("banks/sample.json already exists, skipping.");
    } else {
        std::fs::write(sample_path, SAMPLE_BANK)?;
        println!("Created banks/sample.json");
    }

    println!("\nNext steps:");
    println!("  1. Add your own questions under banks/");
    println!("  2. Run: examprep validate --bank banks/sample.json");
    println!("  3. Run: examprep take --name \"Your Name\" --agree-honor-code");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# examprep configuration

bank = "banks/sample.json"
question_count = 5
duration_secs = 600
passing_threshold = 80
exam_type = "practice"
output_dir = "./examprep-results"
"#;

const SAMPLE_BANK: &str = r#"[
  {
    "id": "sample-1",
    "type": "multiple-choice",
    "question": "Which tool builds and runs Rust projects?",
    "options": ["rustup", "cargo", "rustdoc", "clippy"],
    "answer": "cargo",
    "topic": "Tooling"
  },
  {
    "id": "sample-2",
    "type": "true-false",
    "question": "Variables in Rust are immutable by default.",
    "answer": "True",
    "topic": "Basics"
  },
  {
    "id": "sample-3",
    "type": "fill-in",
    "question": "A function that never returns has the return type ____.",
    "answer": "!",
    "topic": "Basics"
  },
  {
    "id": "sample-4",
    "type": "code-analysis",
    "question": "What does this print?",
    "code": "let v = vec![1, 2, 3];\nprintln!(\"{}\", v.iter().sum::<i32>());",
    "answer": "6",
    "topic": "Collections"
  },
  {
    "id": "sample-5",
    "type": "drag-and-drop",
    "question": "Match each trait to what it enables.",
    "dropZones": [
      { "placeholder": "Formatting with {}", "correctItem": "Display" },
      { "placeholder": "Formatting with {:?}", "correctItem": "Debug" }
    ],
    "draggableItems": ["Debug", "Display", "Clone"],
    "topic": "Traits"
  }
]
"#;
