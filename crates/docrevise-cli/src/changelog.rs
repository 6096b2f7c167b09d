//! Change log writers
//!
//! Two [`ChangeJournal`] sinks: a human-readable text report and JSON lines.
//! Logs are appended to `<directory>/<stem>_<YYYYMMDD>.{txt,jsonl}`, so
//! several runs on the same day share one file.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate};

use docrevise_core::{ChangeJournal, ChangeKind, DiffMode, JournalEntry, ReviseError};

use crate::config::JournalFormat;

const RULE: &str =
    "================================================================================";
const THIN_RULE: &str =
    "--------------------------------------------------------------------------------";
const SHORT_RULE: &str = "----------------------------------------";

/// Log file path for a document processed on `date`
pub fn log_path(
    directory: &Path,
    document: &Path,
    format: JournalFormat,
    date: NaiveDate,
) -> PathBuf {
    let stem = document
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    directory.join(format!("{}_{}.{}", stem, date.format("%Y%m%d"), format.extension()))
}

fn open_append(path: &Path) -> std::io::Result<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(BufWriter::new(file))
}

/// Document facts written at the top of a text log
#[derive(Debug, Clone)]
pub struct LogHeader {
    pub document: String,
    pub paragraph_count: usize,
    pub language: Option<String>,
    pub started: DateTime<Local>,
}

/// Human-readable change report
pub struct TextJournal<W: Write> {
    writer: W,
}

impl TextJournal<BufWriter<File>> {
    /// Append to the log at `path`, creating directories as needed
    pub fn open(path: &Path, header: &LogHeader) -> std::io::Result<Self> {
        Self::new(open_append(path)?, header)
    }
}

impl<W: Write> TextJournal<W> {
    /// Start a log on `writer` with a header block
    pub fn new(mut writer: W, header: &LogHeader) -> std::io::Result<Self> {
        writeln!(writer, "{}", RULE)?;
        let started = header.started.format("%Y-%m-%d %H:%M:%S");
        writeln!(writer, "CHANGE LOG - {}", started)?;
        writeln!(writer, "Document: {}", header.document)?;
        writeln!(writer, "Paragraphs: {}", header.paragraph_count)?;
        if let Some(language) = &header.language {
            writeln!(writer, "Language: {}", language)?;
        }
        writeln!(writer, "{}", RULE)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(Self { writer })
    }

    /// The underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_entry(&mut self, entry: &JournalEntry) -> std::io::Result<()> {
        let w = &mut self.writer;
        writeln!(w, "{}", THIN_RULE)?;
        writeln!(w, "PARAGRAPH {}", entry.index + 1)?;
        writeln!(w, "Instruction: {}", entry.instruction)?;
        let timestamp = entry.timestamp.format("%Y-%m-%d %H:%M:%S UTC");
        writeln!(w, "Timestamp: {}", timestamp)?;
        writeln!(w, "Outcome: {}", entry.outcome.label())?;
        if let docrevise_core::ParagraphOutcome::Failed { reason } = &entry.outcome {
            writeln!(w, "Reason: {}", reason)?;
        }
        writeln!(w, "{}", THIN_RULE)?;
        writeln!(w)?;

        if entry.mode == DiffMode::Detailed && entry.original_text != entry.final_text {
            if entry.changes.is_empty() {
                writeln!(w, "NO DIFFERENCES DETECTED")?;
                writeln!(w)?;
            } else {
                writeln!(w, "CHANGES: {}", entry.changes.len())?;
                writeln!(w)?;
                for (i, change) in entry.changes.iter().enumerate() {
                    writeln!(w, "  [{}] {}", i + 1, change.kind.label())?;
                    writeln!(w, "      Position: character {}", change.position)?;
                    if !change.context_before.is_empty() {
                        writeln!(w, "      Context before: ...{}", change.context_before)?;
                    }
                    match change.kind {
                        ChangeKind::Replacement => {
                            writeln!(w, "      BEFORE: '{}'", change.before)?;
                            writeln!(w, "      AFTER: '{}'", change.after)?;
                        }
                        ChangeKind::Deletion => writeln!(w, "      DELETED: '{}'", change.before)?,
                        ChangeKind::Insertion => writeln!(w, "      ADDED: '{}'", change.after)?,
                    }
                    if !change.context_after.is_empty() {
                        writeln!(w, "      Context after: {}...", change.context_after)?;
                    }
                    writeln!(w)?;
                }
            }
        }

        writeln!(w, "ORIGINAL TEXT:")?;
        writeln!(w, "{}", SHORT_RULE)?;
        writeln!(w, "{}", entry.original_text)?;
        writeln!(w, "{}", SHORT_RULE)?;
        writeln!(w)?;
        writeln!(w, "FINAL TEXT:")?;
        writeln!(w, "{}", SHORT_RULE)?;
        writeln!(w, "{}", entry.final_text)?;
        writeln!(w, "{}", SHORT_RULE)?;
        writeln!(w)?;
        writeln!(w)?;
        w.flush()
    }
}

impl<W: Write> ChangeJournal for TextJournal<W> {
    fn record(&mut self, entry: &JournalEntry) -> docrevise_core::Result<()> {
        Ok(self.write_entry(entry)?)
    }
}

/// One JSON object per entry, one entry per line
pub struct JsonLinesJournal<W: Write> {
    writer: W,
}

impl JsonLinesJournal<BufWriter<File>> {
    /// Append to the log at `path`, creating directories as needed
    pub fn open(path: &Path) -> std::io::Result<Self> {
        Ok(Self::new(open_append(path)?))
    }
}

impl<W: Write> JsonLinesJournal<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// The underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ChangeJournal for JsonLinesJournal<W> {
    fn record(&mut self, entry: &JournalEntry) -> docrevise_core::Result<()> {
        serde_json::to_writer(&mut self.writer, entry)
            .map_err(|e| ReviseError::journal(e.to_string()))?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
