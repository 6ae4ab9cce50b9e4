//! Polling directory watcher.
//!
//! Rescans the watched tree every poll interval and turns differences
//! between consecutive scans into [`FileEvent`]s. A change is only reported
//! once the file's stamp is unchanged across two scans, so a producer still
//! writing the file is not raced. Files already present when the watcher
//! is armed are reported like new arrivals. Each event is handed to the processor
//! on its own task; the processor serializes them.

use crate::error::{ConverterError, Result};
use crate::models::FileEvent;
use crate::processor::FileProcessor;
use crate::processor::discovery::{FileStamp, discover_files};

use glob::Pattern;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::task::{self, JoinHandle};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Last observed state of one watched file
#[derive(Debug, Clone, Copy)]
struct Tracked {
    stamp: FileStamp,
    /// Change seen but not reported yet
    pending: bool,
}

/// Trigger source feeding a [`FileProcessor`]
#[derive(Debug)]
pub struct DirectoryWatcher {
    processor: FileProcessor,
    pattern: Pattern,
    snapshot: HashMap<PathBuf, Tracked>,
}

impl DirectoryWatcher {
    pub fn new(processor: FileProcessor) -> Result<Self> {
        let pattern_text = &processor.config().file_pattern;
        let pattern = Pattern::new(pattern_text).map_err(|e| {
            ConverterError::configuration(format!(
                "Invalid file pattern '{}': {}",
                pattern_text, e
            ))
        })?;

        Ok(Self {
            processor,
            pattern,
            snapshot: HashMap::new(),
        })
    }

    /// Run the watcher on its own task until the handle is aborted
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Scan forever, dispatching every detected change
    pub async fn run(mut self) {
        let config = self.processor.config();
        info!(
            "Watching {} for '{}' every {:?}",
            config.watch_dir.display(),
            config.file_pattern,
            config.poll_interval
        );

        let mut ticker = tokio::time::interval(config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match self.scan().await {
                Ok(events) => {
                    for event in events {
                        let processor = self.processor.clone();
                        tokio::spawn(async move { processor.handle_event(event).await });
                    }
                }
                Err(e) => warn!("[{}] Scan failed, retrying next tick: {}", e.category(), e),
            }
        }
    }

    /// Walk the watched directory once and return the changes since the last scan
    pub async fn scan(&mut self) -> Result<Vec<FileEvent>> {
        let root = self.processor.config().watch_dir.clone();
        let pattern = self.pattern.clone();

        let files = task::spawn_blocking(move || discover_files(&root, &pattern)).await??;
        Ok(self.diff(files))
    }

    /// Replace the snapshot with `files`, reporting changes that have settled
    fn diff(&mut self, files: Vec<(PathBuf, FileStamp)>) -> Vec<FileEvent> {
        let mut events = Vec::new();
        let mut next = HashMap::with_capacity(files.len());

        for (path, stamp) in files {
            let tracked = match self.snapshot.get(&path) {
                Some(previous) if previous.stamp == stamp => {
                    if previous.pending {
                        events.push(FileEvent::new(path.clone()));
                    }
                    Tracked {
                        stamp,
                        pending: false,
                    }
                }
                _ => Tracked {
                    stamp,
                    pending: true,
                },
            };
            next.insert(path, tracked);
        }

        if !events.is_empty() {
            debug!("Scan found {} settled changes", events.len());
        }
        self.snapshot = next;
        events
    }
}
