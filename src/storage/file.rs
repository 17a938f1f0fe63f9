//! Event File
//!
//! Reading, writing and naming of the JSON documents that hold events.
//!
//! ## Naming
//! `<prefix><YYYYMMDD>_<8 hex>.json`, e.g. `rank3_events_20240501_1a2b3c4d.json`.
//! The prefix embeds the node rank so nodes sharing a directory never collide.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;
use crate::event::EventEntry;

/// Extension of every event file
pub const EXTENSION: &str = "json";

/// Content of a freshly created event file
pub const EMPTY_CONTENT: &[u8] = br#"{"events":[]}"#;

/// Top-level document of an event file
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct EventFile {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub events: Vec<EventEntry>,
}

/// A parsed event file together with the byte size it had on disk
#[derive(Debug)]
pub struct LoadedFile {
    pub events: Vec<EventEntry>,
    pub size: u64,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<EventEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<EventEntry>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Generate a new file name for `prefix`, dated today with a random suffix
pub fn new_file_name(prefix: &str) -> String {
    let date = chrono::Local::now().format("%Y%m%d");
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}{}_{}.{}", prefix, date, &suffix[..8], EXTENSION)
}

/// Whether `path` names an event file belonging to `prefix`
pub fn is_event_file(path: &Path, prefix: &str) -> bool {
    let has_ext = path.extension().map(|e| e == EXTENSION).unwrap_or(false);
    let has_prefix = path
        .file_name()
        .map(|n| n.to_string_lossy().starts_with(prefix))
        .unwrap_or(false);
    has_ext && has_prefix
}

/// Create a new, empty event file; fails if the path already exists
pub fn create_empty(path: &Path) -> Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    file.write_all(EMPTY_CONTENT)?;
    file.sync_all()?;
    Ok(())
}

/// Read and fully parse an event file
pub fn read(path: &Path) -> Result<LoadedFile> {
    let data = fs::read(path)?;
    let content: EventFile = serde_json::from_slice(&data)?;
    Ok(LoadedFile {
        events: content.events,
        size: data.len() as u64,
    })
}

/// Overwrite an event file with `events`, pretty-printed
///
/// Written to a sibling temp file and renamed over the target, so lock-free
/// readers see either the old or the new document, never a torn one.
pub fn write(path: &Path, events: &[EventEntry]) -> Result<()> {
    #[derive(Serialize)]
    struct Borrowed<'a> {
        events: &'a [EventEntry],
    }

    let data = serde_json::to_vec_pretty(&Borrowed { events })?;

    let tmp_path = temp_path(path);
    {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp_path)?;
        file.write_all(&data)?;
        file.sync_all()?;
    }
    fs::rename(&tmp_path, path)?;

    Ok(())
}

/// `dir/name.json` → `dir/.name.json.tmp`
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}
