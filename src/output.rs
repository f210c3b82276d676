//! Per-chapter text files. UTF-8 primary copies, plus optional Shift-JIS copies with CRLF line
//! endings under `sjis/` for older e-readers.

use encoding_rs::{EncoderResult, SHIFT_JIS};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Subdirectory (under the novel root) holding legacy-encoded copies.
pub const LEGACY_DIR: &str = "sjis";

/// Errors from the chapter file writers.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot encode {ch:?} (U+{code:04X}) on line {line} as Shift_JIS and no fallback is configured.")]
    Encoding { ch: char, code: u32, line: usize },

    #[error("Invalid fallback entry {key:?}: {reason}")]
    InvalidFallback { key: String, reason: String },
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> OutputError + '_ {
    move |source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Raw Shift_JIS bytes for characters the codec cannot represent.
///
/// Consulted only after the codec reports a character unmappable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackTable {
    entries: HashMap<char, Vec<u8>>,
}

impl Default for FallbackTable {
    fn default() -> Self {
        let entries = [
            // 髙 (hashigo-daka), IBM extension row
            ('\u{9AD9}', vec![0xFB, 0xFC]),
            // 﨑 (tatsu-saki)
            ('\u{FA11}', vec![0xFA, 0xB1]),
            // 𠮷 (tsuchi-yoshi) has no Shift_JIS code point; written as 吉
            ('\u{20BB7}', vec![0x8B, 0x67]),
        ]
        .into_iter()
        .collect();
        Self { entries }
    }
}

impl FallbackTable {
    /// A table with no entries: every unmappable character is an error.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn insert(&mut self, ch: char, bytes: Vec<u8>) {
        self.entries.insert(ch, bytes);
    }

    pub fn get(&self, ch: char) -> Option<&[u8]> {
        self.entries.get(&ch).map(Vec::as_slice)
    }

    /// Merge string-keyed entries (e.g. from the config file) over this table.
    /// Each key must be exactly one character.
    pub fn extend_from_strings(
        &mut self,
        entries: &HashMap<String, Vec<u8>>,
    ) -> Result<(), OutputError> {
        for (key, bytes) in entries {
            let mut chars = key.chars();
            let ch = match (chars.next(), chars.next()) {
                (Some(ch), None) => ch,
                _ => {
                    return Err(OutputError::InvalidFallback {
                        key: key.clone(),
                        reason: "key must be a single character".to_string(),
                    })
                }
            };
            if bytes.is_empty() {
                return Err(OutputError::InvalidFallback {
                    key: key.clone(),
                    reason: "byte sequence is empty".to_string(),
                });
            }
            self.insert(ch, bytes.clone());
        }
        Ok(())
    }
}

/// Rewrite every line ending as CRLF.
fn to_crlf(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\n', "\r\n")
}

/// Encode `text` as Shift_JIS with CRLF line endings, substituting fallback bytes for
/// characters the codec cannot represent.
pub fn encode_legacy(text: &str, fallback: &FallbackTable) -> Result<Vec<u8>, OutputError> {
    let text = to_crlf(text);
    let mut encoder = SHIFT_JIS.new_encoder();
    let mut out: Vec<u8> = Vec::with_capacity(text.len());
    let mut rest = text.as_str();
    loop {
        let needed = encoder
            .max_buffer_length_from_utf8_without_replacement(rest.len())
            .unwrap_or(rest.len() * 2 + 16);
        out.reserve(needed);
        let (result, read) = encoder.encode_from_utf8_to_vec_without_replacement(rest, &mut out, true);
        let consumed = text.len() - rest.len() + read;
        rest = &rest[read..];
        match result {
            EncoderResult::InputEmpty => return Ok(out),
            EncoderResult::OutputFull => continue,
            EncoderResult::Unmappable(ch) => match fallback.get(ch) {
                Some(bytes) => out.extend_from_slice(bytes),
                None => {
                    let line = text[..consumed].matches('\n').count() + 1;
                    return Err(OutputError::Encoding {
                        ch,
                        code: ch as u32,
                        line,
                    });
                }
            },
        }
    }
}

/// Writes chapter files under one novel's directory.
#[derive(Debug)]
pub struct OutputWriter {
    root: PathBuf,
    legacy: bool,
}

impl OutputWriter {
    /// Create `root` (and `root/sjis` when `legacy`) if missing. Existing files are left alone.
    pub fn create(root: impl Into<PathBuf>, legacy: bool) -> Result<Self, OutputError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(io_error(&root))?;
        if legacy {
            let dir = root.join(LEGACY_DIR);
            fs::create_dir_all(&dir).map_err(io_error(&dir))?;
        }
        Ok(Self { root, legacy })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn legacy(&self) -> bool {
        self.legacy
    }

    /// File name for a chapter: zero-padded index, `.txt`.
    pub fn file_name(index: u32) -> String {
        format!("{:03}.txt", index)
    }

    /// Write chapter text as UTF-8 and return the path written.
    pub fn write_primary(&self, index: u32, text: &str) -> Result<PathBuf, OutputError> {
        let path = self.root.join(Self::file_name(index));
        fs::write(&path, text).map_err(io_error(&path))?;
        Ok(path)
    }

    /// Re-encode a primary file into `sjis/` under the same name and return that path.
    pub fn write_legacy(
        &self,
        primary: &Path,
        fallback: &FallbackTable,
    ) -> Result<PathBuf, OutputError> {
        let text = fs::read_to_string(primary).map_err(io_error(primary))?;
        let bytes = encode_legacy(&text, fallback)?;
        let name = primary.file_name().ok_or_else(|| OutputError::Io {
            path: primary.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
        })?;
        let dir = primary
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(LEGACY_DIR);
        let path = dir.join(name);
        fs::write(&path, bytes).map_err(io_error(&path))?;
        Ok(path)
    }
}
