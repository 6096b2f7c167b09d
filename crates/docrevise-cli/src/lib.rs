//! docrevise CLI - Command-line interface library
//!
//! This library provides the CLI functionality for docrevise:
//! - Revise: rewrite every paragraph through an AI text service
//! - Inspect: list paragraphs, style spans and media
//! - Uniformize: normalise font family and body size
//!
//! # Library Usage
//!
//! ```ignore
//! use docrevise_cli::{revise_command, Settings};
//!
//! let settings = Settings::load(None)?;
//! let echo = |req: &TransformRequest<'_>| Ok(req.text.to_uppercase());
//! revise_command(&input, None, "Shout", &settings, echo, false)?;
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! # Correct spelling, writing rapport_revised.docx and LOGS/rapport_<date>.txt
//! docrevise revise rapport.docx -i "Corrige l'orthographe"
//!
//! # List paragraphs as JSON
//! docrevise inspect deck.pptx --format json
//!
//! # Apply the majority font to every run
//! docrevise uniformize rapport.docx
//! ```

pub mod app;
pub mod changelog;
pub mod config;
pub mod service;

// Re-export main entry point and types
pub use app::{
    derived_output, init_logging, inspect_command, revise_command, run_cli, uniformize_command,
    Inspection, OfficeDocument, OutputFormat, ParagraphInfo,
};
pub use changelog::{log_path, JsonLinesJournal, LogHeader, TextJournal};
pub use config::{JournalFormat, Settings};
pub use service::ChatCompletionsClient;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
