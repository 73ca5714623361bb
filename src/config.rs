//! Configuration Module - User preferences from ~/.docchunk/config.toml
//!
//! Supports:
//! - Default input/output roots
//! - Chunk geometry and worker count
//! - PDF extraction timeout
//! - Delimiters stripped by `clean`

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::clean::DEFAULT_DELIMITERS;
use crate::core::{PipelineOptions, WindowOptions};

/// docchunk configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Chunking pipeline settings
    pub chunk: ChunkConfig,
    /// Delimiter cleaning settings
    pub clean: CleanConfig,
}

/// Chunking pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkConfig {
    /// Directory containing source PDFs and text files
    pub input: PathBuf,
    /// Directory receiving one subdirectory of chunks per source
    pub output: PathBuf,
    /// Bytes per chunk
    pub chunk_size: usize,
    /// Bytes repeated between neighbouring chunks
    pub chunk_overlap: usize,
    /// Number of parallel workers (0 = auto)
    pub workers: usize,
    /// Accepted file extensions
    pub extensions: Vec<String>,
    /// Skip hidden files and directories
    pub skip_hidden: bool,
    /// Per-PDF extraction timeout, e.g. "20s" ("0s" disables)
    #[serde(with = "humantime_serde_compat")]
    pub extract_timeout: Duration,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("pdfs"),
            output: PathBuf::from("chunks"),
            chunk_size: 500,
            chunk_overlap: 50,
            workers: 0, // auto-detect
            extensions: vec!["pdf".to_string(), "txt".to_string()],
            skip_hidden: true,
            extract_timeout: Duration::from_secs(20),
        }
    }
}

impl ChunkConfig {
    /// Validate and convert into pipeline options
    pub fn to_pipeline_options(&self) -> Result<PipelineOptions> {
        let window = WindowOptions::new(self.chunk_size, self.chunk_overlap)
            .context("Invalid chunk geometry")?;

        let options = PipelineOptions {
            input: self.input.clone(),
            output: self.output.clone(),
            window,
            workers: self.workers,
            extensions: self.extensions.clone(),
            skip_hidden: self.skip_hidden,
            extract_timeout: if self.extract_timeout.is_zero() {
                None
            } else {
                Some(self.extract_timeout)
            },
        };
        options.validate().context("Invalid pipeline configuration")?;

        Ok(options)
    }
}

/// Delimiter cleaning settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanConfig {
    /// Directory whose `.txt` files are cleaned
    pub root: PathBuf,
    /// Strings removed from every file
    pub delimiters: Vec<String>,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("chunks"),
            delimiters: DEFAULT_DELIMITERS.iter().map(|d| d.to_string()).collect(),
        }
    }
}

impl Config {
    /// Load config from the default path; defaults if no file exists there
    pub fn load() -> Result<Self> {
        Self::load_or_default(&Self::default_path())
    }

    /// Load config from `path`; defaults only when the file does not exist.
    /// Unreadable or malformed files are errors.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match fs::metadata(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            _ => Self::load_from(path),
        }
    }

    /// Load config from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;

        Ok(config)
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;

        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("", "", "docchunk")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".docchunk")
                    .join("config.toml")
            })
    }

    /// Write the commented sample config to `path` unless a file is already there
    pub fn ensure_exists(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, generate_sample_config())
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        tracing::info!("Created default config at {}", path.display());
        Ok(true)
    }
}

/// `Duration` as a human-readable string ("20s", "1m 30s")
mod humantime_serde_compat {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}

/// Generate a sample config file with comments
pub fn generate_sample_config() -> String {
    r##"# docchunk configuration
# Location: ~/.config/docchunk/config.toml (or %APPDATA%\docchunk\config\config.toml on Windows)

[chunk]
# Directory containing the source PDFs and .txt files (searched recursively)
input = "pdfs"

# Output root; each source gets its own subdirectory of chunk_NNN.txt files
output = "chunks"

# Bytes per chunk (multi-byte characters may be split at a boundary)
chunk_size = 500

# Bytes shared between neighbouring chunks (must be < chunk_size)
chunk_overlap = 50

# Number of parallel workers (0 = auto-detect CPU count)
workers = 0

# File extensions to pick up
extensions = ["pdf", "txt"]

# Skip hidden files and directories
skip_hidden = true

# Give up on a PDF whose text extraction takes longer than this ("0s" = never)
extract_timeout = "20s"

[clean]
# Directory whose .txt files `docchunk clean` rewrites
root = "chunks"

# Strings removed from every file
delimiters = [",", "*", "#", "[", "]", "(", ")", "{", "}", "`", "~", "^", "=", "|"]
"##
    .to_string()
}
