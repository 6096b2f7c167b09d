//! End-to-end reconciliation through the public API
//!
//! extract → align → remap → runs_for, checked over a table of styled
//! paragraphs and replacement texts.

use docrevise_core::{
    align, diff, extract_runs, remap, replay, runs_for, DiffMode, StyleAttributes, StyleSpan,
    StyledRun,
};

fn bold() -> StyleAttributes {
    StyleAttributes::plain().with_bold(true)
}

fn italic() -> StyleAttributes {
    StyleAttributes::plain().with_italic(true)
}

fn paragraphs() -> Vec<Vec<StyledRun>> {
    vec![
        vec![],
        vec![
            StyledRun::new("Ceci", bold()),
            StyledRun::plain(" est un text"),
        ],
        vec![StyledRun::new("Bonjour", bold())],
        vec![
            StyledRun::plain("Le "),
            StyledRun::new("café", italic()),
            StyledRun::plain(" est "),
            StyledRun::new("très", bold()),
            StyledRun::plain(" chaud."),
        ],
        vec![
            StyledRun::new("日本語", bold()),
            StyledRun::plain("のテキスト"),
        ],
    ]
}

const TARGETS: &[&str] = &[
    "",
    "Ceci est un texte",
    "Bonjour le monde",
    "Le café est très chaud !",
    "日本のテキストです",
    "Completely different sentence.",
];

fn reconcile(runs: &[StyledRun], target: &str) -> (Vec<StyleSpan>, Vec<StyledRun>) {
    let (original, spans) = extract_runs(runs);
    let ops = align(&original, target);
    let remapped = remap(&spans, &ops, target);
    let new_runs = runs_for(target, &remapped).unwrap();
    (remapped, new_runs)
}

#[test]
fn test_remapped_spans_cover_new_text() {
    for runs in paragraphs() {
        for target in TARGETS {
            let (spans, _) = reconcile(&runs, target);
            let mut cursor = 0;
            for span in &spans {
                assert_eq!(span.start, cursor, "gap before {:?} for {:?}", span, target);
                assert!(span.end > span.start);
                cursor = span.end;
            }
            assert_eq!(cursor, target.chars().count(), "coverage of {:?}", target);
        }
    }
}

#[test]
fn test_new_runs_concatenate_to_new_text() {
    for runs in paragraphs() {
        for target in TARGETS {
            let (_, new_runs) = reconcile(&runs, target);
            let text: String = new_runs.iter().map(|r| r.text.as_str()).collect();
            assert_eq!(text, *target);
        }
    }
}

#[test]
fn test_unchanged_text_keeps_runs() {
    for runs in paragraphs() {
        let (original, spans) = extract_runs(&runs);
        let (remapped, _) = reconcile(&runs, &original);
        assert_eq!(remapped, spans);
    }
}

#[test]
fn test_bold_prefix_does_not_bleed() {
    let runs = &paragraphs()[1];
    let (_, new_runs) = reconcile(runs, "Ceci est un texte");
    assert_eq!(new_runs.len(), 2);
    assert_eq!(new_runs[0], StyledRun::new("Ceci", bold()));
    assert_eq!(new_runs[1], StyledRun::plain(" est un texte"));
}

#[test]
fn test_append_extends_bold_run() {
    let runs = &paragraphs()[2];
    let (spans, _) = reconcile(runs, "Bonjour le monde");
    assert_eq!(
        spans,
        vec![StyleSpan::new(0, 16, "Bonjour le monde", bold())]
    );
}

#[test]
fn test_inner_emphasis_survives_edit() {
    let runs = &paragraphs()[3];
    let (_, new_runs) = reconcile(runs, "Le café est très chaud !");
    assert!(new_runs.contains(&StyledRun::new("café", italic())));
    assert!(new_runs.contains(&StyledRun::new("très", bold())));
}

#[test]
fn test_detailed_changes_replay() {
    for runs in paragraphs() {
        let (original, _) = extract_runs(&runs);
        for target in TARGETS {
            let records = diff(&original, target, DiffMode::Detailed);
            assert_eq!(replay(&original, &records), *target);
        }
    }
}
