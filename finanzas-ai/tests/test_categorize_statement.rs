use finanzas_ai::{categorize_uncategorized, BatchOptions, MockCategorizer, RuleCategorizer, RunStatus};
use finanzas_core::Dataset;
use finanzas_ingest::parse_file;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("fixtures")
        .join(name)
}

fn statements() -> Dataset {
    let mut ds = Dataset::new();
    ds.import(parse_file(fixture("bank_export_march.csv")).unwrap().transactions);
    ds.import(parse_file(fixture("bank_export_april.csv")).unwrap().transactions);
    ds
}

#[test]
fn test_rules_categorize_whole_statement() {
    let mut ds = statements();
    assert_eq!(ds.uncategorized_indices().len(), 12);

    let options = BatchOptions {
        batch_size: 5,
        restrict_to_vocabulary: false,
        apply_to_similar: true,
    };
    let report = categorize_uncategorized(&mut ds, &RuleCategorizer::new(), &options, &AtomicBool::new(false));

    assert!(report.is_completed());
    assert_eq!(report.processed, 12);
    assert!(ds.uncategorized_indices().is_empty());
    assert!(ds.vocabulary()["Food"].contains("Supermarket"));
    assert!(ds.vocabulary()["Income"].contains("Salary"));

    let mercadona: Vec<_> = ds
        .transactions()
        .iter()
        .filter(|t| t.concept == "MERCADONA VALENCIA")
        .collect();
    assert_eq!(mercadona.len(), 2);
    assert!(mercadona.iter().all(|t| t.category == "Food"));
}

#[test]
fn test_restricted_rules_leave_unknown_pairs_uncategorized() {
    let mut ds = statements();
    ds.set_category(1, "Food", "Supermarket").unwrap();

    let options = BatchOptions {
        restrict_to_vocabulary: true,
        ..BatchOptions::default()
    };
    let report = categorize_uncategorized(&mut ds, &RuleCategorizer::new(), &options, &AtomicBool::new(false));
    assert!(report.is_completed());
    assert_eq!(report.total_uncategorized, 11);

    // Only the second Mercadona row matches the existing vocabulary
    assert_eq!(report.applied.len(), 1);
    assert_eq!(report.applied[0].concept, "MERCADONA VALENCIA");
    assert_eq!(ds.uncategorized_indices().len(), 10);
}

#[test]
fn test_failed_second_batch_keeps_first() {
    let mut ds = statements();
    let svc = MockCategorizer::new("Misc", "Misc").failing_on(2);
    let options = BatchOptions {
        batch_size: 4,
        restrict_to_vocabulary: false,
        apply_to_similar: false,
    };
    let report = categorize_uncategorized(&mut ds, &svc, &options, &AtomicBool::new(false));

    assert!(matches!(report.status, RunStatus::Failed(_)));
    assert_eq!(report.processed, 4);
    assert_eq!(report.applied.len(), 4);
    assert_eq!(ds.uncategorized_indices().len(), 8);
}
