//! Paragraph processing and the document pass
//!
//! One paragraph at a time, fully sequential:
//!
//! ```text
//! blank? ─► arm guard ─► extract ─► service ─► align ─► remap ─► apply ─► verify ─► diff
//! ```
//!
//! A service failure leaves the paragraph untouched and the pass moves on.
//! Media loss is repaired by the guard and reported, never raised.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::align::align;
use crate::apply::apply;
use crate::diff::{diff_with_context, ChangeRecord, DiffMode, DEFAULT_CONTEXT_CHARS};
use crate::guard::{GuardOutcome, ImageGuard};
use crate::journal::{ChangeJournal, JournalEntry};
use crate::paragraph::{ParagraphSource, StyledParagraph};
use crate::remap::remap;
use crate::service::{TextTransformer, TransformRequest};
use crate::spans::extract;

/// Instruction keywords selecting detailed change reports
pub const DEFAULT_CORRECTION_KEYWORDS: &[&str] = &[
    "correct",
    "correction",
    "grammar",
    "spelling",
    "proofread",
    "typo",
    "corrige",
    "orthographe",
    "grammaire",
];

/// Default number of preceding paragraphs sent as context
pub const DEFAULT_CONTEXT_PARAGRAPHS: usize = 2;

/// Tunables for a revision pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviseOptions {
    /// Keywords that switch the diff to detailed mode
    pub correction_keywords: Vec<String>,
    /// Preceding non-blank paragraphs sent as context
    pub context_paragraphs: usize,
    /// Context window of detailed change records
    pub diff_context_chars: usize,
    /// Language hint forwarded to the service
    pub language: Option<String>,
}

impl Default for ReviseOptions {
    fn default() -> Self {
        Self {
            correction_keywords: DEFAULT_CORRECTION_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            context_paragraphs: DEFAULT_CONTEXT_PARAGRAPHS,
            diff_context_chars: DEFAULT_CONTEXT_CHARS,
            language: None,
        }
    }
}

impl ReviseOptions {
    /// Diff mode for an instruction
    pub fn mode_for(&self, instruction: &str) -> DiffMode {
        DiffMode::for_instruction(instruction, self.correction_keywords.as_slice())
    }
}

/// What happened to one paragraph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ParagraphOutcome {
    /// Blank paragraph, not sent to the service
    Skipped,
    /// Service returned nothing or the same text
    Unchanged,
    /// New text applied
    Modified,
    /// Media was lost by the rewrite; paragraph restored to its original state
    Restored,
    /// Service failed; paragraph untouched
    Failed {
        /// Failure description
        reason: String,
    },
}

impl ParagraphOutcome {
    /// Short lowercase label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::Unchanged => "unchanged",
            Self::Modified => "modified",
            Self::Restored => "restored",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Result of processing one paragraph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParagraphReport {
    /// Zero-based paragraph index
    pub index: usize,
    /// Outcome
    pub outcome: ParagraphOutcome,
    /// Diff mode used for `changes`
    pub mode: DiffMode,
    /// Text before processing
    pub original_text: String,
    /// Text after processing
    pub final_text: String,
    /// Changes between original and final text
    pub changes: Vec<ChangeRecord>,
    /// Media objects in the paragraph after processing
    pub media_count: usize,
}

impl ParagraphReport {
    /// Report for a blank paragraph
    pub fn skipped(index: usize, text: &str) -> Self {
        Self {
            index,
            outcome: ParagraphOutcome::Skipped,
            mode: DiffMode::Summary,
            original_text: text.to_string(),
            final_text: text.to_string(),
            changes: Vec::new(),
            media_count: 0,
        }
    }

    fn untouched(
        index: usize,
        outcome: ParagraphOutcome,
        mode: DiffMode,
        text: String,
        media: usize,
    ) -> Self {
        Self {
            index,
            outcome,
            mode,
            final_text: text.clone(),
            original_text: text,
            changes: Vec::new(),
            media_count: media,
        }
    }
}

/// Runs the full guard cycle on one paragraph
pub fn process_paragraph<P, T>(
    paragraph: &mut P,
    index: usize,
    transformer: &mut T,
    instruction: &str,
    context: &[String],
    options: &ReviseOptions,
) -> ParagraphReport
where
    P: StyledParagraph + ?Sized,
    T: TextTransformer + ?Sized,
{
    let mode = options.mode_for(instruction);
    let (original, spans) = extract(&*paragraph);
    if original.trim().is_empty() {
        debug!(index, "blank paragraph skipped");
        return ParagraphReport::skipped(index, &original);
    }

    let guard = ImageGuard::arm(&*paragraph);
    let media_before = guard.media_before();
    debug!(
        index,
        spans = spans.len(),
        media = media_before,
        "paragraph extracted"
    );

    let request = TransformRequest::new(&original, instruction)
        .with_context(context)
        .with_language(options.language.as_deref());
    let new_text = match transformer.transform(&request) {
        Ok(text) => text,
        Err(e) => {
            warn!(index, error = %e, "service failed, paragraph left unchanged");
            let outcome = ParagraphOutcome::Failed {
                reason: e.to_string(),
            };
            return ParagraphReport::untouched(index, outcome, mode, original, media_before);
        }
    };

    if new_text.trim().is_empty() || new_text == original {
        debug!(index, "service returned no change");
        let outcome = ParagraphOutcome::Unchanged;
        return ParagraphReport::untouched(index, outcome, mode, original, media_before);
    }

    let ops = align(&original, &new_text);
    let remapped = remap(&spans, &ops, &new_text);
    debug!(
        index,
        ops = ops.len(),
        spans = remapped.len(),
        "spans remapped"
    );

    if let Err(e) = apply(paragraph, &new_text, &remapped) {
        warn!(index, error = %e, "could not apply remapped spans");
        let outcome = ParagraphOutcome::Failed {
            reason: e.to_string(),
        };
        return ParagraphReport::untouched(index, outcome, mode, original, media_before);
    }

    let outcome = match guard.verify(paragraph) {
        GuardOutcome::Restored => ParagraphOutcome::Restored,
        GuardOutcome::Clean | GuardOutcome::Verified => ParagraphOutcome::Modified,
    };

    let final_text = paragraph.text();
    let changes = diff_with_context(&original, &final_text, mode, options.diff_context_chars);
    debug!(
        index,
        outcome = outcome.label(),
        changes = changes.len(),
        "paragraph processed"
    );

    ParagraphReport {
        index,
        outcome,
        mode,
        original_text: original,
        final_text,
        changes,
        media_count: paragraph.media_count(),
    }
}

/// Media accounting over a whole pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Media objects before the pass
    pub initial_media_count: usize,
    /// Media objects after the pass
    pub final_media_count: usize,
    /// Paragraphs restored after losing media
    pub paragraphs_restored: Vec<usize>,
}

impl VerificationReport {
    /// No media was lost overall
    pub fn is_intact(&self) -> bool {
        self.final_media_count >= self.initial_media_count
    }
}

/// Paragraph counts per outcome
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    /// Empty or whitespace-only paragraphs, never sent to the service
    pub skipped: usize,
    /// Paragraphs the service returned empty or as they were
    pub unchanged: usize,
    /// Paragraphs rewritten with new text
    pub modified: usize,
    /// Paragraphs rolled back after a rewrite lost inline media
    pub restored: usize,
    /// Paragraphs left as-is because the service call failed
    pub failed: usize,
}

/// Result of a document pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PassReport {
    /// Per-paragraph reports in document order
    pub paragraphs: Vec<ParagraphReport>,
    /// Media verification
    pub verification: VerificationReport,
    /// The pass stopped before the last paragraph
    pub cancelled: bool,
}

impl PassReport {
    /// Counts per outcome
    pub fn counts(&self) -> OutcomeCounts {
        let mut counts = OutcomeCounts::default();
        for report in &self.paragraphs {
            match report.outcome {
                ParagraphOutcome::Skipped => counts.skipped += 1,
                ParagraphOutcome::Unchanged => counts.unchanged += 1,
                ParagraphOutcome::Modified => counts.modified += 1,
                ParagraphOutcome::Restored => counts.restored += 1,
                ParagraphOutcome::Failed { .. } => counts.failed += 1,
            }
        }
        counts
    }
}

/// Drives a revision pass over a whole document
pub struct Reviser<T> {
    transformer: T,
    options: ReviseOptions,
}

impl<T: TextTransformer> Reviser<T> {
    /// Reviser with default options
    pub fn new(transformer: T) -> Self {
        Self {
            transformer,
            options: ReviseOptions::default(),
        }
    }

    /// Replace the options
    pub fn with_options(mut self, options: ReviseOptions) -> Self {
        self.options = options;
        self
    }

    /// Current options
    pub fn options(&self) -> &ReviseOptions {
        &self.options
    }

    /// The wrapped transformer
    pub fn transformer_mut(&mut self) -> &mut T {
        &mut self.transformer
    }

    /// Processes every paragraph of `document` with `instruction`
    pub fn run<D: ParagraphSource>(
        &mut self,
        document: &mut D,
        instruction: &str,
        journal: Option<&mut dyn ChangeJournal>,
    ) -> PassReport {
        self.run_while(document, instruction, journal, |_| true)
    }

    /// Like [`Reviser::run`], asking `should_continue` before each paragraph
    pub fn run_while<D, C>(
        &mut self,
        document: &mut D,
        instruction: &str,
        mut journal: Option<&mut dyn ChangeJournal>,
        mut should_continue: C,
    ) -> PassReport
    where
        D: ParagraphSource,
        C: FnMut(usize) -> bool,
    {
        let census = document.media_census();
        let count = document.paragraph_count();
        info!(
            paragraphs = count,
            media = census.total,
            "revision pass started"
        );

        let mut report = PassReport::default();
        let mut recent: VecDeque<String> =
            VecDeque::with_capacity(self.options.context_paragraphs + 1);

        for index in 0..count {
            if !should_continue(index) {
                info!(index, "revision pass stopped");
                report.cancelled = true;
                break;
            }
            let Some(mut paragraph) = document.paragraph_mut(index) else {
                continue;
            };

            let context: Vec<String> = recent.iter().cloned().collect();
            let paragraph_report = process_paragraph(
                &mut paragraph,
                index,
                &mut self.transformer,
                instruction,
                &context,
                &self.options,
            );

            if paragraph_report.outcome != ParagraphOutcome::Skipped {
                if self.options.context_paragraphs > 0 {
                    recent.push_back(paragraph_report.final_text.clone());
                    while recent.len() > self.options.context_paragraphs {
                        recent.pop_front();
                    }
                }
                if let Some(sink) = journal.as_deref_mut() {
                    let entry = JournalEntry::from_report(&paragraph_report, instruction);
                    if let Err(e) = sink.record(&entry) {
                        warn!(index, error = %e, "change journal write failed");
                    }
                }
            }

            report.paragraphs.push(paragraph_report);
        }

        report.verification = VerificationReport {
            initial_media_count: census.total,
            final_media_count: document.media_census().total,
            paragraphs_restored: report
                .paragraphs
                .iter()
                .filter(|p| p.outcome == ParagraphOutcome::Restored)
                .map(|p| p.index)
                .collect(),
        };

        let counts = report.counts();
        info!(
            modified = counts.modified,
            unchanged = counts.unchanged,
            restored = counts.restored,
            failed = counts.failed,
            skipped = counts.skipped,
            "revision pass finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReviseError;
    use crate::paragraph::mock::{MockDocument, MockParagraph};
    use crate::service::ServiceError;
    use crate::style::{StyleAttributes, StyledRun};

    fn bold() -> StyleAttributes {
        StyleAttributes::plain().with_bold(true)
    }

    fn fixed(
        reply: &'static str,
    ) -> impl FnMut(&TransformRequest<'_>) -> Result<String, ServiceError> {
        move |_| Ok(reply.to_string())
    }

    #[test]
    fn test_scenario_1_modified_with_style_kept() {
        let mut p = MockParagraph::new(vec![
            StyledRun::new("Ceci", bold()),
            StyledRun::plain(" est un text"),
        ]);
        let report = process_paragraph(
            &mut p,
            0,
            &mut fixed("Ceci est un texte"),
            "corrige l'orthographe",
            &[],
            &ReviseOptions::default(),
        );

        assert_eq!(report.outcome, ParagraphOutcome::Modified);
        assert_eq!(report.mode, DiffMode::Detailed);
        assert_eq!(report.changes.len(), 1);
        assert_eq!(
            p.runs,
            vec![
                StyledRun::new("Ceci", bold()),
                StyledRun::plain(" est un texte"),
            ]
        );
    }

    #[test]
    fn test_scenario_3_media_loss_is_restored() {
        let original = MockParagraph::new(vec![StyledRun::plain("Figure 1 montre le resultat")])
            .with_media(1)
            .dropping_media();
        let mut p = original.clone();

        let report = process_paragraph(
            &mut p,
            4,
            &mut fixed("Figure 1 montre le résultat"),
            "correct grammar",
            &[],
            &ReviseOptions::default(),
        );

        assert_eq!(report.outcome, ParagraphOutcome::Restored);
        assert_eq!(report.final_text, report.original_text);
        assert!(report.changes.is_empty());
        assert_eq!(p, original);
    }

    #[test]
    fn test_scenario_4_empty_reply_is_unchanged() {
        let runs = vec![
            StyledRun::new("Titre", bold()),
            StyledRun::plain(" important"),
        ];
        let mut p = MockParagraph::new(runs.clone());
        let options = ReviseOptions::default();
        let report = process_paragraph(&mut p, 0, &mut fixed(""), "correct", &[], &options);

        assert_eq!(report.outcome, ParagraphOutcome::Unchanged);
        assert!(report.changes.is_empty());
        assert_eq!(p.runs, runs);
    }

    #[test]
    fn test_identical_reply_is_unchanged() {
        let mut p = MockParagraph::new(vec![StyledRun::plain("Déjà parfait.")]);
        let report = process_paragraph(
            &mut p,
            0,
            &mut fixed("Déjà parfait."),
            "correct",
            &[],
            &ReviseOptions::default(),
        );
        assert_eq!(report.outcome, ParagraphOutcome::Unchanged);
    }

    #[test]
    fn test_blank_paragraph_skips_service() {
        let mut calls = 0;
        let mut service = |_: &TransformRequest<'_>| {
            calls += 1;
            Ok("never".to_string())
        };
        let mut p = MockParagraph::new(vec![StyledRun::plain("   ")]);
        let options = ReviseOptions::default();
        let report = process_paragraph(&mut p, 0, &mut service, "x", &[], &options);
        assert_eq!(report.outcome, ParagraphOutcome::Skipped);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_service_failure_leaves_paragraph_untouched() {
        let runs = vec![StyledRun::plain("intact")];
        let mut p = MockParagraph::new(runs.clone());
        let mut failing = |_: &TransformRequest<'_>| -> Result<String, ServiceError> {
            Err(ServiceError::unavailable("connection refused"))
        };
        let options = ReviseOptions::default();
        let report = process_paragraph(&mut p, 2, &mut failing, "rewrite", &[], &options);

        let ParagraphOutcome::Failed { reason } = &report.outcome else {
            panic!("expected a failure, got {:?}", report.outcome);
        };
        assert!(reason.contains("connection refused"));
        assert_eq!(p.runs, runs);
    }

    #[test]
    fn test_pass_continues_after_failure_and_journals() {
        let mut doc = MockDocument {
            paragraphs: vec![
                MockParagraph::new(vec![StyledRun::plain("un")]),
                MockParagraph::new(vec![StyledRun::plain("")]),
                MockParagraph::new(vec![StyledRun::plain("deux")]),
                MockParagraph::new(vec![StyledRun::plain("trois")]),
            ],
        };
        let service = |req: &TransformRequest<'_>| {
            if req.text == "deux" {
                Err(ServiceError::Rejected {
                    status: 500,
                    message: "boom".into(),
                })
            } else {
                Ok(req.text.to_uppercase())
            }
        };
        let mut journal: Vec<JournalEntry> = Vec::new();
        let report = Reviser::new(service).run(&mut doc, "uppercase", Some(&mut journal));

        let counts = report.counts();
        assert_eq!(counts.modified, 2);
        assert_eq!(counts.failed, 1);
        assert_eq!(counts.skipped, 1);
        assert!(!report.cancelled);
        assert_eq!(doc.paragraphs[0].text(), "UN");
        assert_eq!(doc.paragraphs[2].text(), "deux");
        assert_eq!(doc.paragraphs[3].text(), "TROIS");

        let indices: Vec<usize> = journal.iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![0, 2, 3]);
    }

    #[test]
    fn test_context_uses_preceding_revised_paragraphs() {
        let mut doc = MockDocument {
            paragraphs: ["a", "b", "", "c", "d"]
                .iter()
                .map(|t| MockParagraph::new(vec![StyledRun::plain(*t)]))
                .collect(),
        };
        let mut seen: Vec<Vec<String>> = Vec::new();
        let service = |req: &TransformRequest<'_>| {
            seen.push(req.context.to_vec());
            Ok(format!("{}!", req.text))
        };
        Reviser::new(service).run(&mut doc, "exclaim", None);

        assert_eq!(seen[0], Vec::<String>::new());
        assert_eq!(seen[1], vec!["a!".to_string()]);
        assert_eq!(seen[2], vec!["a!".to_string(), "b!".to_string()]);
        assert_eq!(seen[3], vec!["b!".to_string(), "c!".to_string()]);
    }

    #[test]
    fn test_language_hint_is_forwarded() {
        let mut doc = MockDocument {
            paragraphs: vec![MockParagraph::new(vec![StyledRun::plain("hola")])],
        };
        let mut language = None;
        let service = |req: &TransformRequest<'_>| {
            language = req.detected_language.map(str::to_string);
            Ok(String::new())
        };
        let options = ReviseOptions {
            language: Some("es".into()),
            ..ReviseOptions::default()
        };
        Reviser::new(service).with_options(options).run(&mut doc, "x", None);
        assert_eq!(language.as_deref(), Some("es"));
    }

    #[test]
    fn test_media_safety_over_a_pass() {
        let mut doc = MockDocument {
            paragraphs: vec![
                MockParagraph::new(vec![StyledRun::plain("avec image")]).with_media(1),
                MockParagraph::new(vec![StyledRun::plain("perd image")])
                    .with_media(2)
                    .dropping_media(),
                MockParagraph::new(vec![StyledRun::plain("sans image")]),
            ],
        };
        let report = Reviser::new(|req: &TransformRequest<'_>| Ok(format!("{} ok", req.text)))
            .run(&mut doc, "rewrite", None);

        assert_eq!(report.verification.initial_media_count, 3);
        assert_eq!(report.verification.final_media_count, 3);
        assert_eq!(report.verification.paragraphs_restored, vec![1]);
        assert!(report.verification.is_intact());
        assert_eq!(doc.paragraphs[1].text(), "perd image");
        assert_eq!(doc.paragraphs[0].text(), "avec image ok");
    }

    #[test]
    fn test_should_continue_stops_between_paragraphs() {
        let mut doc = MockDocument {
            paragraphs: ["a", "b", "c"]
                .iter()
                .map(|t| MockParagraph::new(vec![StyledRun::plain(*t)]))
                .collect(),
        };
        let report = Reviser::new(|req: &TransformRequest<'_>| Ok(req.text.to_uppercase()))
            .run_while(&mut doc, "up", None, |index| index < 2);

        assert!(report.cancelled);
        assert_eq!(report.paragraphs.len(), 2);
        assert_eq!(doc.paragraphs[2].text(), "c");
    }

    struct BrokenJournal;

    impl ChangeJournal for BrokenJournal {
        fn record(&mut self, _: &JournalEntry) -> crate::error::Result<()> {
            Err(ReviseError::journal("disk full"))
        }
    }

    #[test]
    fn test_journal_failure_does_not_abort() {
        let mut doc = MockDocument {
            paragraphs: vec![
                MockParagraph::new(vec![StyledRun::plain("a")]),
                MockParagraph::new(vec![StyledRun::plain("b")]),
            ],
        };
        let mut journal = BrokenJournal;
        let report = Reviser::new(|req: &TransformRequest<'_>| Ok(req.text.to_uppercase()))
            .run(&mut doc, "up", Some(&mut journal));
        assert_eq!(report.counts().modified, 2);
    }
}
