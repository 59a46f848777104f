use tempfile::tempdir;
use zetamac_trainer::{
    analysis::{DataSufficiency, PatternKey},
    config::Config,
    export::{export, read_json, ExportFormat},
    session::{apply_session_config, borrow_candidates, FormCapabilities, FormState, Practice},
    store::ResultStore,
    training::TrainingGoal,
    ProblemResult, Trainer,
};

fn results(problems: &[(&str, f64, usize)]) -> Vec<ProblemResult> {
    problems
        .iter()
        .flat_map(|(p, t, n)| (0..*n).map(move |_| ProblemResult::now(*p, *t)))
        .collect()
}

/// Record, reopen, analyze, then run the borrow drill the analysis asks for
#[test]
fn borrow_weakness_end_to_end() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("nested").join("results.db");

    {
        let mut store = ResultStore::open(&db).unwrap();
        store
            .record_results_batch(&results(&[
                ("4 + 5", 650.0, 40),
                ("52 - 27", 3100.0, 6),
                ("12 ÷ 3", 900.0, 5),
                ("8 x 9", 1200.0, 3),
            ]))
            .unwrap();
    }

    let mut trainer = Trainer::new(ResultStore::open(&db).unwrap(), Config::default());
    let (analysis, goal) = trainer.prepare_training().unwrap();

    assert_eq!(analysis.total_results, 54);
    assert_eq!(analysis.sufficiency, DataSufficiency::Good);
    assert_eq!(
        analysis.trouble_pattern.as_ref().map(|s| s.group),
        Some(PatternKey::SubtractionBorrow)
    );
    assert_eq!(goal, Some(TrainingGoal::Borrow));

    let session = trainer
        .next_session(None, FormCapabilities::default())
        .unwrap()
        .unwrap();
    let Practice::CustomProblems { problems } = &session.practice else {
        panic!("expected custom problems, got {:?}", session.practice);
    };
    assert_eq!(problems.len(), 30);
    let candidates: Vec<String> = borrow_candidates()
        .into_iter()
        .map(|(a, b)| format!("{a} - {b}"))
        .collect();
    assert!(problems.iter().all(|p| candidates.contains(p)));

    let mut form = FormState::new(FormCapabilities::default());
    assert!(apply_session_config(&session, &mut form));
    assert!(form.sub && !form.add && !form.mul && !form.div);
    assert!(form.start);

    assert!(trainer.store().training_goal().unwrap().is_none());
}

#[test]
fn json_export_imports_into_fresh_store() {
    let mut source = ResultStore::open_in_memory().unwrap();
    source
        .record_results_batch(&results(&[("6 × 7", 2000.0, 3), ("9 - 3", 800.0, 1)]))
        .unwrap();

    let mut buf = Vec::new();
    export(&source.load_results().unwrap(), ExportFormat::Json, &mut buf).unwrap();

    let mut target = ResultStore::open_in_memory().unwrap();
    target
        .record_results_batch(&read_json(buf.as_slice()).unwrap())
        .unwrap();

    assert_eq!(target.load_results().unwrap(), source.load_results().unwrap());
    assert_eq!(target.result_count().unwrap(), 4);
}

#[test]
fn too_little_data_keeps_tables_but_no_goal() {
    let mut store = ResultStore::open_in_memory().unwrap();
    store
        .record_results_batch(&results(&[("7 × 7", 4000.0, 4)]))
        .unwrap();
    let mut trainer = Trainer::new(store, Config::default());

    let (analysis, goal) = trainer.prepare_training().unwrap();

    assert_eq!(analysis.sufficiency, DataSufficiency::Insufficient);
    assert_eq!(analysis.by_pattern[&PatternKey::Multiplication(7)].count, 8);
    assert_eq!(goal, None);
    assert_eq!(trainer.next_session(None, FormCapabilities::default()).unwrap(), None);
}
