use criterion::{black_box, criterion_group, criterion_main, Criterion};

use examprep_core::evaluator::{free_text_matches, is_correct};
use examprep_core::model::{Answer, Question};
use examprep_core::scoring::score;
use examprep_core::session::ExamSession;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn make_bank(n: usize) -> Vec<Question> {
    (0..n)
        .map(|i| {
            let topic = format!("Topic {}", i % 8);
            let question = match i % 3 {
                0 => Question::multiple_choice(&format!("Q{i}"), &["a", "b", "c"], "a"),
                1 => Question::fill_in(&format!("Q{i}"), "borrow checker"),
                _ => Question::true_false(&format!("Q{i}"), "True"),
            };
            question.with_id(i.to_string()).with_topic(&topic)
        })
        .collect()
}

fn answered_session(n: usize) -> ExamSession {
    let mut session =
        ExamSession::initialize_with_rng(make_bank(n), n, &mut StdRng::seed_from_u64(42))
            .expect("bank is not empty");
    for position in 0..n {
        let answer = match position % 4 {
            0 => Answer::Choice("a".into()),
            1 => Answer::Text("The Borrow Checker!".into()),
            2 => Answer::Choice("true".into()),
            _ => continue,
        };
        session
            .record_answer(position, answer)
            .expect("position in range");
    }
    session
}

fn bench_evaluator(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluator");

    let fill_in = Question::fill_in("Who enforces aliasing rules?", "borrow checker");
    let answer = Answer::Text("  The Borrow Checker.  ".into());

    group.bench_function("free_text_match", |b| {
        b.iter(|| free_text_matches(black_box("  The Borrow Checker.  "), black_box("borrow checker")))
    });

    group.bench_function("is_correct_fill_in", |b| {
        b.iter(|| is_correct(black_box(&fill_in), black_box(Some(&answer))))
    });

    group.finish();
}

fn bench_scoring(c: &mut Criterion) {
    let mut group = c.benchmark_group("scoring");

    for n in [40, 200, 1000] {
        let session = answered_session(n);
        group.bench_function(format!("{n}_questions"), |b| {
            b.iter(|| score(black_box(&session), 80, 0))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_evaluator, bench_scoring);
criterion_main!(benches);
