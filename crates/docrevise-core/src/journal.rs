//! Audit records emitted once per processed paragraph

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::diff::{ChangeRecord, DiffMode};
use crate::error::Result;
use crate::pipeline::{ParagraphOutcome, ParagraphReport};

/// One structured log record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Zero-based paragraph index
    pub index: usize,
    /// Instruction sent to the service
    pub instruction: String,
    /// When the paragraph finished processing
    pub timestamp: DateTime<Utc>,
    /// Diff reporting mode
    pub mode: DiffMode,
    /// Paragraph outcome
    pub outcome: ParagraphOutcome,
    /// Text before processing
    pub original_text: String,
    /// Text after processing
    pub final_text: String,
    /// Reported changes
    pub changes: Vec<ChangeRecord>,
}

impl JournalEntry {
    /// Entry for a paragraph report, timestamped now
    pub fn from_report(report: &ParagraphReport, instruction: &str) -> Self {
        Self::at(report, instruction, Utc::now())
    }

    /// Entry for a paragraph report with an explicit timestamp
    pub fn at(report: &ParagraphReport, instruction: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            index: report.index,
            instruction: instruction.to_string(),
            timestamp,
            mode: report.mode,
            outcome: report.outcome.clone(),
            original_text: report.original_text.clone(),
            final_text: report.final_text.clone(),
            changes: report.changes.clone(),
        }
    }
}

/// Sink for journal entries
pub trait ChangeJournal {
    /// Record one entry
    fn record(&mut self, entry: &JournalEntry) -> Result<()>;
}

impl ChangeJournal for Vec<JournalEntry> {
    fn record(&mut self, entry: &JournalEntry) -> Result<()> {
        self.push(entry.clone());
        Ok(())
    }
}
