//! Configuration settings
//!
//! Settings are loaded from `docrevise.toml`:
//!
//! ```toml
//! [service]
//! endpoint = "https://api.openai.com/v1"
//! model = "gpt-4o"
//! api_key_env = "OPENAI_API_KEY"
//! temperature = 0.3
//!
//! [revision]
//! context_paragraphs = 2
//! language = "French"
//!
//! [journal]
//! directory = "LOGS"
//! format = "json"
//!
//! [uniformize]
//! font = "Calibri"
//! size_pt = 11
//! ```
//!
//! Every section and field is optional.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use docrevise_core::{
    FontSize, ReviseOptions, UniformizeOptions, DEFAULT_CONTEXT_CHARS, DEFAULT_CONTEXT_PARAGRAPHS,
};

/// Configuration file looked up in the working directory
pub const CONFIG_FILE: &str = "docrevise.toml";

/// Keyword selecting the document majority in `[uniformize]`
pub const AUTO: &str = "auto";

/// Top-level settings structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Text service connection
    pub service: ServiceSettings,
    /// Revision pass tunables
    pub revision: RevisionSettings,
    /// Change log output
    pub journal: JournalSettings,
    /// Style uniformization targets
    pub uniformize: UniformizeSettings,
}

impl Settings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Load settings from `path`, else `./docrevise.toml` if present, else defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

/// OpenAI-compatible chat service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Base URL; `/chat/completions` is appended
    pub endpoint: String,
    /// Model name, overridden by `OPENAI_MODEL`
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub temperature: f32,
    pub timeout_secs: u64,
    /// Previous exchanges kept in the conversation, in messages
    pub history: usize,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            temperature: 0.3,
            timeout_secs: 60,
            history: 5,
        }
    }
}

/// Revision pass settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevisionSettings {
    /// Instruction keywords that select detailed change records
    pub correction_keywords: Vec<String>,
    /// Preceding paragraphs sent as context
    pub context_paragraphs: usize,
    /// Characters of context around each change record
    pub diff_context_chars: usize,
    /// Document language hint (e.g. "French")
    pub language: Option<String>,
}

impl Default for RevisionSettings {
    fn default() -> Self {
        let defaults = ReviseOptions::default();
        Self {
            correction_keywords: defaults.correction_keywords,
            context_paragraphs: DEFAULT_CONTEXT_PARAGRAPHS,
            diff_context_chars: DEFAULT_CONTEXT_CHARS,
            language: None,
        }
    }
}

impl RevisionSettings {
    /// Pass options for the reviser
    pub fn to_options(&self) -> ReviseOptions {
        ReviseOptions {
            correction_keywords: self.correction_keywords.clone(),
            context_paragraphs: self.context_paragraphs,
            diff_context_chars: self.diff_context_chars,
            language: self.language.clone(),
        }
    }
}

/// Change log file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum JournalFormat {
    /// Human-readable report (`.txt`)
    #[default]
    Text,
    /// One JSON object per line (`.jsonl`)
    Json,
}

impl JournalFormat {
    /// File extension of the log
    pub fn extension(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Json => "jsonl",
        }
    }
}

/// Change log settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalSettings {
    pub directory: PathBuf,
    pub format: JournalFormat,
    pub enabled: bool,
}

impl Default for JournalSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("LOGS"),
            format: JournalFormat::Text,
            enabled: true,
        }
    }
}

/// Target font size: a number of points or `"auto"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SizeSetting {
    Points(f32),
    Keyword(String),
}

impl Default for SizeSetting {
    fn default() -> Self {
        Self::Keyword(AUTO.to_string())
    }
}

/// Style uniformization settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniformizeSettings {
    /// Font family, or `"auto"` for the document majority
    pub font: String,
    /// Body font size in points, or `"auto"` for the document majority
    pub size_pt: SizeSetting,
    /// Keep the size of single emphasised words
    pub preserve_emphasis: bool,
}

impl Default for UniformizeSettings {
    fn default() -> Self {
        Self {
            font: AUTO.to_string(),
            size_pt: SizeSetting::default(),
            preserve_emphasis: true,
        }
    }
}

impl UniformizeSettings {
    /// Uniformization options; fails on an unknown size keyword
    pub fn to_options(&self) -> Result<UniformizeOptions> {
        let font = match self.font.trim() {
            "" => None,
            f if f.eq_ignore_ascii_case(AUTO) => None,
            f => Some(f.to_string()),
        };
        let size = match &self.size_pt {
            SizeSetting::Points(pt) if *pt > 0.0 => Some(FontSize::from_points(*pt)),
            SizeSetting::Points(pt) => bail!("Invalid uniformize.size_pt: {}", pt),
            SizeSetting::Keyword(k) if k.eq_ignore_ascii_case(AUTO) => None,
            SizeSetting::Keyword(k) => {
                bail!(
                    "Invalid uniformize.size_pt: {:?} (expected a number or \"auto\")",
                    k
                )
            }
        };
        Ok(UniformizeOptions {
            font,
            size,
            preserve_emphasis: self.preserve_emphasis,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.service.model, "gpt-4o");
        assert_eq!(settings.service.api_key_env, "OPENAI_API_KEY");
        assert_eq!(settings.service.history, 5);
        assert_eq!(settings.revision.context_paragraphs, 2);
        assert_eq!(settings.revision.diff_context_chars, 20);
        let keywords = &settings.revision.correction_keywords;
        assert!(keywords.iter().any(|k| k == "orthographe"));
        assert_eq!(settings.journal.directory, PathBuf::from("LOGS"));
        assert!(settings.journal.enabled);
    }

    #[test]
    fn test_partial_file() {
        let settings = Settings::from_toml_str(
            r#"
            [service]
            model = "gpt-4o-mini"

            [journal]
            format = "json"

            [uniformize]
            font = "Calibri"
            size_pt = 11
            "#,
        )
        .unwrap();

        assert_eq!(settings.service.model, "gpt-4o-mini");
        assert_eq!(settings.service.temperature, 0.3);
        assert_eq!(settings.journal.format, JournalFormat::Json);
        assert_eq!(settings.journal.format.extension(), "jsonl");

        let options = settings.uniformize.to_options().unwrap();
        assert_eq!(options.font.as_deref(), Some("Calibri"));
        assert_eq!(options.size, Some(FontSize::from_points(11.0)));
    }

    #[test]
    fn test_auto_uniformize_targets() {
        let settings = Settings::from_toml_str("[uniformize]\nsize_pt = \"auto\"\n").unwrap();
        let options = settings.uniformize.to_options().unwrap();
        assert_eq!(options.font, None);
        assert_eq!(options.size, None);
        assert!(options.preserve_emphasis);
    }

    #[test]
    fn test_invalid_size_keyword() {
        let settings = Settings::from_toml_str("[uniformize]\nsize_pt = \"large\"\n").unwrap();
        assert!(settings.uniformize.to_options().is_err());
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let parsed = Settings::from_toml_str("[journal]\nformat = \"xml\"\n");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_revision_options() {
        let toml = "[revision]\nlanguage = \"French\"\ncontext_paragraphs = 0\n";
        let settings = Settings::from_toml_str(toml).unwrap();
        let options = settings.revision.to_options();
        assert_eq!(options.language.as_deref(), Some("French"));
        assert_eq!(options.context_paragraphs, 0);
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = Settings::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[service]\nhistory = 0\n").unwrap();
        assert_eq!(Settings::load(Some(&path)).unwrap().service.history, 0);
    }
}
