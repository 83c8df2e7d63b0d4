use anyhow::{bail, Context, Result};
use regex::Regex;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// Pulls classification keys out of plain lists, CSV or TSV exports.
///
/// The key is the first field of each line, optionally quoted. Blank lines
/// and `#` comments are skipped anywhere; other lines without a key are
/// treated as headers until the first key is seen and rejected after it.
pub struct KeyReader {
    pattern: Regex,
}

impl KeyReader {
    pub fn new() -> Result<Self> {
        let pattern = Regex::new(r#"^\s*"?([0-9*]{6}|-{6})"?\s*(?:[,;\t]|$)"#)
            .context("Failed to compile key pattern")?;
        Ok(Self { pattern })
    }

    pub fn extract(&self, text: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut header = 0usize;
        for (idx, line) in text.lines().enumerate() {
            if let Some(caps) = self.pattern.captures(line) {
                keys.push(caps[1].to_string());
                continue;
            }
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if !keys.is_empty() {
                bail!("line {}: no valid key in {line:?}", idx + 1);
            }
            header += 1;
        }
        if header > 0 {
            log::debug!("Skipped {header} header lines");
        }
        Ok(keys)
    }

    /// Read from `path`, or stdin when the path is `-` or absent
    pub fn read(&self, path: Option<&Path>) -> Result<Vec<String>> {
        let text = match path {
            Some(path) if path != Path::new("-") => fs::read_to_string(path)
                .with_context(|| format!("Failed to read keys from {}", path.display()))?,
            _ => {
                let mut buf = String::new();
                io::stdin()
                    .read_to_string(&mut buf)
                    .context("Failed to read keys from stdin")?;
                buf
            }
        };
        let keys = self.extract(&text)?;
        log::info!("Read {} keys", keys.len());
        Ok(keys)
    }
}
