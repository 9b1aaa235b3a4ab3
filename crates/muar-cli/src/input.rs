//! Event input discovery and loading

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use muar_storage::{read_events, Event};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{CliError, CliResult};

const EVENT_EXTENSIONS: &[&str] = &["jsonl", "ndjson", "json"];

fn is_event_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| EVENT_EXTENSIONS.contains(&e))
        .unwrap_or(false)
}

/// Expand files and directories into the list of event files, sorted per directory
pub fn collect_inputs(paths: &[PathBuf]) -> CliResult<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if !path.exists() {
            return Err(CliError::missing_resource(format!("input {}", path.display())));
        }
        if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .follow_links(true)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file() && is_event_file(entry.path()))
                .map(|entry| entry.into_path())
                .collect();
            found.sort();
            debug!("{} event files under {}", found.len(), path.display());
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }

    if files.is_empty() {
        return Err(CliError::invalid_args("no event files found in the given inputs"));
    }
    Ok(files)
}

/// Read every event of the given inputs, in input order
pub fn load_events(paths: &[PathBuf]) -> CliResult<Vec<Event>> {
    let mut events = Vec::new();
    for file in collect_inputs(paths)? {
        let reader = BufReader::new(File::open(&file)?);
        let batch = read_events(reader).map_err(|source| CliError::Input {
            path: file.clone(),
            source,
        })?;
        debug!("Read {} events from {}", batch.len(), file.display());
        events.extend(batch);
    }

    let mut seen = HashSet::new();
    let duplicates = events.iter().filter(|e| !seen.insert(e.id)).count();
    if duplicates > 0 {
        warn!("{} events share an event id with an earlier event", duplicates);
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use muar_storage::{write_events, EventId};

    #[test]
    fn test_directory_inputs_are_sorted() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested = temp_dir.path().join("run1");
        std::fs::create_dir_all(&nested).unwrap();

        for (name, id) in [("b.jsonl", 2), ("a.jsonl", 1)] {
            let file = File::create(nested.join(name)).unwrap();
            write_events(file, &[Event::new(EventId::new(id))]).unwrap();
        }
        std::fs::write(nested.join("notes.txt"), "not events").unwrap();

        let files = collect_inputs(&[temp_dir.path().to_path_buf()]).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a.jsonl"));

        let events = load_events(&[temp_dir.path().to_path_buf()]).unwrap();
        assert_eq!(events.iter().map(|e| e.id.raw()).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_missing_input_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(collect_inputs(&[temp_dir.path().join("nope.jsonl")]).is_err());
        assert!(collect_inputs(&[temp_dir.path().to_path_buf()]).is_err());
    }
}
