use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed history file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Durable record of the entry links seen at each feed's last successful
/// fetch, keyed by feed URL.
///
/// The whole map is rewritten once per round with write-to-temp-then-rename,
/// so an interrupted save never corrupts the previous record. There is no
/// per-entry expiry: every successful fetch replaces a feed's list outright,
/// which bounds growth to the feed's own window.
#[derive(Debug)]
pub struct History {
    path: PathBuf,
    seen: HashMap<String, Vec<String>>,
}

impl History {
    /// Load the record at `path`.
    ///
    /// A missing file is an empty history; a malformed one is a hard error,
    /// since guessing at it would re-notify every known entry.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, HistoryError> {
        let path = path.into();
        let seen = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, seen })
    }

    /// Links recorded for `url` at its last successful fetch, in that
    /// fetch's document order. Unknown URLs have no prior history.
    pub fn seen(&self, url: &str) -> &[String] {
        self.seen.get(url).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Replace the recorded list for `url` with the latest fetch.
    pub fn record(&mut self, url: &str, links: Vec<String>) {
        self.seen.insert(url.to_string(), links);
    }

    /// Persist the full map atomically.
    pub fn save(&self) -> Result<(), HistoryError> {
        let tmp = tmp_path(&self.path);
        std::fs::write(&tmp, serde_json::to_string(&self.seen)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
