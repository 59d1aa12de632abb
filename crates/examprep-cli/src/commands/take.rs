//! The `examprep take` command.

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;

use examprep_core::config::load_config_from;
use examprep_core::engine::{Command, EventSink, ExamEngine, ExamEvent};
use examprep_core::model::{AnswerInput, QuestionKind};
use examprep_core::report::{Candidate, ExamRecord};
use examprep_core::session::{ExamSession, Mode, QuestionStatus};
use examprep_core::timer::{format_clock, IntervalTicker, Urgency};
use examprep_report::html::write_html_report;
use examprep_sources::create_source;

use super::show::print_summary;

const HELP: &str = "\
Commands:
  n, next              next question        p, prev        previous question
  o, option <N>        pick option N        a, answer <T>  type an answer
  d, place <Z> <ITEM>  put ITEM in zone Z   c, clear       clear this answer
  m, mark              toggle review mark   g, goto <N>    jump to question N
  r, review            review marked        u, unmark      drop from review
  x, exit-review       leave review         l, list        question overview
  s, submit            submit the exam      h, help        this help
With questions still marked, `s` asks for confirmation: type `s` again.";

pub struct TakeArgs {
    pub bank: Option<String>,
    pub name: String,
    pub student_id: Option<String>,
    pub agree_honor_code: bool,
    pub questions: Option<usize>,
    pub minutes: Option<u64>,
    pub seed: Option<u64>,
    pub output: Option<PathBuf>,
    pub format: String,
    pub config: Option<PathBuf>,
}

/// Line typed by the candidate.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Command(Command),
    Help,
}

/// Prints events for an interactive terminal session.
struct ConsoleSink;

impl EventSink for ConsoleSink {
    fn emit(&self, event: &ExamEvent, session: &ExamSession) {
        match event {
            ExamEvent::QuestionChanged { position } => print_question(session, *position),
            ExamEvent::AnswerRecorded { position } => {
                if let (Some(answer), Some(question)) =
                    (session.answer(*position), session.question(*position))
                {
                    let (answered, total) = session.progress();
                    println!(
                        "Saved: {}  [{answered}/{total} answered]",
                        answer.preview(question)
                    );
                }
            }
            ExamEvent::MarkToggled { position, marked } => {
                let verb = if *marked { "marked" } else { "unmarked" };
                println!("Question {} {verb} for review.", position + 1);
            }
            ExamEvent::TimerTick { remaining_secs } => {
                let remaining = *remaining_secs;
                let announce = match Urgency::from_remaining(remaining) {
                    Urgency::Normal => remaining % 600 == 0,
                    Urgency::Warning => remaining % 60 == 0,
                    Urgency::Critical => remaining % 15 == 0 || remaining <= 10,
                };
                if announce && remaining > 0 {
                    println!("[{} remaining]", format_clock(remaining));
                }
            }
            ExamEvent::TimerExpired => println!("\nTime is up. Your exam is being submitted."),
            ExamEvent::ExamComplete | ExamEvent::SummaryShown => print_overview(session),
            ExamEvent::ReviewEntered { count } => {
                println!("Reviewing {count} marked question(s).");
            }
            ExamEvent::ReviewComplete => {
                println!("Review finished.");
                print_overview(session);
            }
            ExamEvent::ReviewExited => println!("Left review mode."),
            ExamEvent::SubmitPending { marked } => println!(
                "{marked} question(s) still marked for review. Type `r` to review them, or `s` again to submit."
            ),
            ExamEvent::Rejected(e) => println!("! {e}"),
            ExamEvent::Submitted { reason } => println!("\nExam {reason}."),
        }
    }
}

fn print_question(session: &ExamSession, position: usize) {
    let Some(question) = session.question(position) else {
        return;
    };
    let status = match session.question_status(position) {
        Ok(QuestionStatus::Marked) => " [marked]",
        Ok(QuestionStatus::Answered) => " [answered]",
        _ => "",
    };
    let review = if session.mode() == Mode::ReviewSubset {
        format!(
            " (review {}/{})",
            session.review_cursor() + 1,
            session.review_order().len()
        )
    } else {
        String::new()
    };

    println!(
        "\nQuestion {}/{}{review} | {} | {}{status}",
        position + 1,
        session.len(),
        question.topic,
        question.kind
    );
    println!("{}", question.question);
    if let Some(code) = &question.code {
        for line in code.lines() {
            println!("    {line}");
        }
    }

    match question.kind {
        kind if kind.is_choice() => {
            for (i, choice) in question.choices().iter().enumerate() {
                println!("  {}) {choice}", i + 1);
            }
        }
        QuestionKind::DragAndDrop => {
            for (i, zone) in question.drop_zones.iter().enumerate() {
                println!("  Zone {}: {}", i + 1, zone.placeholder);
            }
            println!("  Items: {}", question.draggable_items.join(", "));
        }
        _ => {}
    }

    if let Some(answer) = session.answer(position).filter(|a| !a.is_blank()) {
        println!("Current answer: {}", answer.display().replace('\n', "; "));
    }

    let next = match (session.mode(), session.is_last()) {
        (_, false) => "next",
        (Mode::Normal, true) => "summary",
        (Mode::ReviewSubset, true) => "finish review",
    };
    let prev = if session.is_first() { "" } else { "p: previous  " };
    println!("[{prev}n: {next}  s: submit  h: help]");
}

fn print_overview(session: &ExamSession) {
    let summary = session.summary();
    println!(
        "\nSummary: {} answered, {} unanswered, {} marked of {}",
        summary.answered, summary.unanswered, summary.marked, summary.total
    );
    for (position, question) in session.questions().iter().enumerate() {
        let (icon, preview) = match session.question_status(position) {
            Ok(QuestionStatus::Marked) => ("?", None),
            Ok(QuestionStatus::Answered) => ("*", session.answer(position)),
            _ => (" ", None),
        };
        let preview = preview
            .map(|a| format!(" -> {}", a.preview(question)))
            .unwrap_or_default();
        println!("  [{icon}] {:>2}. {}{preview}", position + 1, truncate(&question.question, 50));
    }
    println!("Type `s` to submit, `r` to review marked questions, or `g N` to revisit one.");
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        format!("{}...", s.chars().take(max).collect::<String>())
    } else {
        s.to_string()
    }
}

/// Parse one input line. Question and zone numbers are 1-based.
fn parse_input(line: &str) -> Result<Option<Input>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let number = |what: &str| -> Result<usize, String> {
        rest.parse::<usize>()
            .ok()
            .filter(|&n| n >= 1)
            .ok_or_else(|| format!("{what} must be a number starting at 1"))
    };

    let command = match verb.to_lowercase().as_str() {
        "n" | "next" => Command::Next,
        "p" | "prev" | "previous" => Command::Previous,
        "m" | "mark" => Command::ToggleMark,
        "o" | "option" => Command::Answer(AnswerInput::Option(number("option")?)),
        "a" | "answer" => Command::Answer(AnswerInput::Text(rest.to_string())),
        "c" | "clear" => Command::Answer(AnswerInput::Clear),
        "d" | "place" => {
            let (zone, item) = rest
                .split_once(char::is_whitespace)
                .ok_or("usage: place <zone> <item>")?;
            let zone = zone
                .parse::<usize>()
                .ok()
                .filter(|&z| z >= 1)
                .ok_or("zone must be a number starting at 1")?;
            Command::Answer(AnswerInput::Place(vec![(zone - 1, item.trim().to_string())]))
        }
        "g" | "goto" => Command::JumpTo(number("question")? - 1),
        "r" | "review" => Command::EnterReview,
        "u" | "unmark" => Command::RemoveFromReview,
        "x" | "exit-review" => Command::ExitReview,
        "s" | "submit" => Command::Submit,
        "l" | "list" => Command::ShowSummary,
        "h" | "help" | "?" => return Ok(Some(Input::Help)),
        other => return Err(format!("unknown command '{other}', type `h` for help")),
    };
    Ok(Some(Input::Command(command)))
}

pub async fn execute(args: TakeArgs) -> Result<()> {
    anyhow::ensure!(
        args.agree_honor_code,
        "you must agree to the honor code (--agree-honor-code) before starting"
    );
    let name = args.name.trim().to_string();
    anyhow::ensure!(!name.is_empty(), "candidate name must not be empty");

    let mut config = load_config_from(args.config.as_deref())?;
    if let Some(count) = args.questions {
        config.question_count = count;
    }
    if let Some(minutes) = args.minutes {
        config.duration_secs = minutes_to_secs(minutes)?;
    }
    config.validate()?;

    let location = args
        .bank
        .or_else(|| config.bank.clone())
        .context("no question bank given; pass --bank or set `bank` in examprep.toml")?;

    let source = create_source(&location)?;
    let bank = source.load().await?;

    let session = match args.seed {
        Some(seed) => ExamSession::initialize_with_rng(
            bank,
            config.question_count,
            &mut StdRng::seed_from_u64(seed),
        )?,
        None => ExamSession::initialize(bank, config.question_count)?,
    };

    println!(
        "{} questions from {} topic(s), {} minutes, pass mark {}%. Type `h` for help.",
        session.len(),
        session.bank_topics().len(),
        config.duration_secs / 60,
        config.passing_threshold
    );

    let (tx, rx) = mpsc::channel(16);
    spawn_input_reader(tx);

    let mut engine = ExamEngine::new(session, config.duration_secs)
        .with_threshold(config.passing_threshold)
        .with_sink(Arc::new(ConsoleSink));

    let mut ticker = IntervalTicker::every_second();
    let outcome = engine.run(rx, &mut ticker).await?;

    let candidate = Candidate {
        name,
        student_id: args.student_id,
        exam_type: config.exam_type.clone(),
    };
    let record = ExamRecord::new(
        candidate,
        config.passing_threshold,
        outcome.reason,
        outcome.report,
    );

    print_summary(&record);

    let output = args.output.unwrap_or(config.output_dir);
    let formats: Vec<&str> = match args.format.as_str() {
        "all" => vec!["json", "html"],
        "none" => vec![],
        other => other.split(',').map(str::trim).collect(),
    };

    for fmt in &formats {
        match *fmt {
            "json" => {
                let path = output.join(format!("{}.json", record.file_stem()));
                record.save_json(&path)?;
                eprintln!("Results saved to: {}", path.display());
            }
            "html" => {
                let path = output.join(format!("{}.html", record.file_stem()));
                write_html_report(&record, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
            _ => {
                eprintln!("Unknown format: {fmt}");
            }
        }
    }

    Ok(())
}

fn minutes_to_secs(minutes: u64) -> Result<u64> {
    minutes
        .checked_mul(60)
        .with_context(|| format!("--minutes {minutes} is too large"))
}

/// Read stdin on a dedicated thread. A blocking read cannot be cancelled, so the
/// thread is left to die with the process. EOF closes the channel.
fn spawn_input_reader(tx: mpsc::Sender<Command>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            match parse_input(&line) {
                Ok(Some(Input::Command(command))) => {
                    if tx.blocking_send(command).is_err() {
                        break;
                    }
                }
                Ok(Some(Input::Help)) => println!("{HELP}"),
                Ok(None) => {}
                Err(message) => println!("! {message}"),
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(line: &str) -> Command {
        match parse_input(line) {
            Ok(Some(Input::Command(command))) => command,
            other => panic!("expected a command for {line:?}, got {other:?}"),
        }
    }

    #[test]
    fn parses_navigation() {
        assert_eq!(command("n"), Command::Next);
        assert_eq!(command(" PREV "), Command::Previous);
        assert_eq!(command("g 3"), Command::JumpTo(2));
        assert_eq!(command("s"), Command::Submit);
        assert_eq!(command("r"), Command::EnterReview);
        assert_eq!(command("u"), Command::RemoveFromReview);
        assert_eq!(command("list"), Command::ShowSummary);
    }

    #[test]
    fn parses_answers() {
        assert_eq!(command("o 2"), Command::Answer(AnswerInput::Option(2)));
        assert_eq!(
            command("a  the borrow checker "),
            Command::Answer(AnswerInput::Text("the borrow checker".into()))
        );
        assert_eq!(
            command("place 2 Display"),
            Command::Answer(AnswerInput::Place(vec![(1, "Display".into())]))
        );
        assert_eq!(command("clear"), Command::Answer(AnswerInput::Clear));
    }

    #[test]
    fn minutes_convert_without_overflow() {
        assert_eq!(minutes_to_secs(45).unwrap(), 2700);
        let err = minutes_to_secs(u64::MAX).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_input("o zero").is_err());
        assert!(parse_input("g 0").is_err());
        assert!(parse_input("place Display").is_err());
        assert!(parse_input("dance").is_err());
        assert_eq!(parse_input("   "), Ok(None));
        assert_eq!(parse_input("h"), Ok(Some(Input::Help)));
    }
}
