use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use profile::UserId;
use serde::Serialize;
use tempfile::NamedTempFile;

const GENERATED_DIR: &str = "generated_images";

static CLOCK: MonotonicClock = MonotonicClock::new();

/// Millisecond wall clock that never repeats or goes backwards within the
/// process.
#[derive(Debug)]
pub struct MonotonicClock {
    last: AtomicI64,
}

impl MonotonicClock {
    pub const fn new() -> Self {
        Self {
            last: AtomicI64::new(0),
        }
    }

    /// The clock shared by every [`ImageStore`] in the process.
    pub fn global() -> &'static MonotonicClock {
        &CLOCK
    }

    pub fn now_millis(&self) -> i64 {
        let wall = Utc::now().timestamp_millis();
        let next = |last: i64| wall.max(last + 1);
        match self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(next(last)))
        {
            Ok(prev) | Err(prev) => next(prev),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Where a generated image ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedImageRef {
    pub file_name: String,
    pub path: PathBuf,
}

/// Append-only directory of generated PNGs, `{root}/generated_images/`.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn open<P: AsRef<Path>>(root: P) -> io::Result<Self> {
        let dir = root.as_ref().join(GENERATED_DIR);
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `{user_id}_generated_{millis}.png`
    pub fn next_file_name(&self, user_id: &UserId) -> String {
        format!(
            "{user_id}_generated_{}.png",
            MonotonicClock::global().now_millis()
        )
    }

    /// Write the image under a fresh name. The file appears whole or not at
    /// all.
    pub fn persist(&self, user_id: &UserId, png: &[u8]) -> io::Result<GeneratedImageRef> {
        let file_name = self.next_file_name(user_id);
        let path = self.dir.join(&file_name);

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(png)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| e.error)?;

        Ok(GeneratedImageRef { file_name, path })
    }

    /// Map a requested file name to its path in this directory. Anything that
    /// is not a plain `.png` file name yields `None`; whether the file exists
    /// is left to the reader.
    pub fn path_for(&self, file_name: &str) -> Option<PathBuf> {
        let plain = !file_name.is_empty()
            && !file_name.starts_with('.')
            && !file_name.contains(['/', '\\'])
            && file_name.ends_with(".png");
        plain.then(|| self.dir.join(file_name))
    }
}
