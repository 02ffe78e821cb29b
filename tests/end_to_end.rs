use analogy_eval::{
    AnalogyEvaluator, AnyVectors, BitLevel, Encoding, EvaluationState, Event, Header, LoadError,
    LoadOptions, Representation, SectionReport, Tally, VectorWriter, WordVectors,
};
use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;
use tempfile::TempDir;

const H: f32 = std::f32::consts::FRAC_1_SQRT_2;

// Features: royal, male, female, country, capital.
fn vocabulary() -> Vec<(&'static str, [f32; 5])> {
    vec![
        ("king", [H, H, 0.0, 0.0, 0.0]),
        ("queen", [H, 0.0, H, 0.0, 0.0]),
        ("man", [0.0, 1.0, 0.0, 0.0, 0.0]),
        ("woman", [0.0, 0.0, 1.0, 0.0, 0.0]),
        ("france", [0.0, 0.0, 0.0, 1.0, 0.0]),
        ("paris", [0.0, 0.0, 0.0, H, H]),
        ("italy", [0.0, 0.1, 0.0, 1.0, 0.0]),
        ("rome", [0.0, 0.1, 0.0, H, H]),
    ]
}

fn write_table(path: &Path, binary: bool) {
    let entries = vocabulary();
    let mut w = VectorWriter::new(BufWriter::new(File::create(path).unwrap()), binary);
    w.write_header(Header {
        words: entries.len(),
        dimension: 5,
    })
    .unwrap();
    for (token, features) in &entries {
        w.write_entry(token, features).unwrap();
    }
    w.into_inner().flush().unwrap();
}

const QUESTIONS: &str = "\
: family
man king woman queen
man woman king queen
king man woman queen
man king unicorn queen
: capital-common-countries
france paris italy rome
paris france rome italy
";

fn run<R: Representation>(vectors: &WordVectors<R>) -> (EvaluationState, Vec<SectionReport>) {
    let mut state = EvaluationState::default();
    let mut reports = Vec::new();
    AnalogyEvaluator::new(vectors)
        .run(Cursor::new(QUESTIONS.as_bytes()), &mut state, |event| {
            if let Event::SectionFinished(report) = event {
                reports.push(report.clone());
            }
        })
        .unwrap();
    (state, reports)
}

#[test]
fn continuous_evaluation_from_text_and_binary_files() {
    let dir = TempDir::new().expect("create temp dir");
    for binary in [false, true] {
        let path = dir.path().join(if binary { "vectors.bin" } else { "vectors.txt" });
        write_table(&path, binary);

        let options = LoadOptions {
            binary,
            ..LoadOptions::default()
        };
        let AnyVectors::Continuous(vectors) = AnyVectors::from_file(&path, &options).unwrap() else {
            panic!("expected continuous vectors");
        };
        assert_eq!(vectors.count(), 8);

        let (state, reports) = run(&vectors);
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].label, "family");
        assert_eq!(reports[0].section, Tally { correct: 3, total: 3 });
        assert_eq!(reports[1].label, "capital-common-countries");
        assert_eq!(reports[1].section, Tally { correct: 2, total: 2 });

        assert_eq!(state.questions_seen, 6);
        assert_eq!(state.questions_scored, 5);
        assert_eq!(state.overall, Tally { correct: 5, total: 5 });
        assert_eq!(state.semantic, Tally { correct: 5, total: 5 });
        assert_eq!(state.syntactic, Tally::default());
    }
}

#[test]
fn quantized_and_truncated_load() {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("vectors.bin");
    write_table(&path, true);

    let options = LoadOptions {
        bit_level: BitLevel::new(1).unwrap(),
        word_limit: 4,
        ..LoadOptions::default()
    };
    let AnyVectors::Continuous(vectors) = AnyVectors::from_file(&path, &options).unwrap() else {
        panic!("expected continuous vectors");
    };
    assert_eq!(vectors.count(), 4);
    assert_eq!(vectors.index_of("PARIS"), None);
    // Level 1 gives every component magnitude 1/3, so all vectors are 1/sqrt(5).
    let expected = 1.0 / 5.0f32.sqrt();
    for i in 0..vectors.count() {
        assert!(vectors.vector_at(i).iter().all(|x| (x.abs() - expected).abs() < 1e-6));
    }
}

#[test]
fn bitwise_evaluation_scores_every_resolvable_question() {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("vectors.bin");
    write_table(&path, true);

    let options = LoadOptions {
        encoding: Encoding::Bitwise,
        ..LoadOptions::default()
    };
    let AnyVectors::BitPacked(vectors) = AnyVectors::from_file(&path, &options).unwrap() else {
        panic!("expected bit-packed vectors");
    };
    assert_eq!(vectors.dimension(), 5);
    assert_eq!(vectors.vector_at(0), &[0b00011u64]);

    let (state, reports) = run(&vectors);
    assert_eq!(reports.len(), 2);
    assert_eq!(state.questions_scored, 5);
    // man:king :: woman:? -> (NOT man AND king) OR woman = 00101 = queen.
    // paris:france :: rome:? -> 11010, one bit away from italy (01010).
    assert_eq!(reports[0].label, "family");
    assert_eq!(reports[0].section, Tally { correct: 3, total: 3 });
    assert_eq!(reports[1].section, Tally { correct: 2, total: 2 });
    assert_eq!(state.overall, Tally { correct: 5, total: 5 });
    assert_eq!(state.semantic, Tally { correct: 5, total: 5 });
}

#[test]
fn missing_and_truncated_files_fail_the_load() {
    let dir = TempDir::new().expect("create temp dir");
    let missing = dir.path().join("absent.bin");
    assert!(matches!(
        AnyVectors::from_file(&missing, &LoadOptions::default()),
        Err(LoadError::InputNotFound { .. })
    ));

    let path = dir.path().join("short.txt");
    std::fs::write(&path, "3 2\nking 0.5 0.5\nqueen 0.5\n").unwrap();
    let options = LoadOptions {
        binary: false,
        ..LoadOptions::default()
    };
    assert!(matches!(
        AnyVectors::from_file(&path, &options),
        Err(LoadError::TruncatedInput(_))
    ));
}
