//! Transfer Progress
//!
//! Aggregates per-part progress of chunked transfers (files split into
//! parts) into one overall percentage per transfer.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};

/// Finished transfers remembered for late part updates
const FINISHED_MEMORY: usize = 64;

/// Tag attached to every chunk of a chunked upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartTag {
    /// Transfer key
    pub time_stamp: u64,
    pub file_name: String,
    /// Zero-based file index
    pub file_number: usize,
    /// Files in the transfer as known when this part was cut
    pub file_count: usize,
    /// Zero-based part index
    pub part: usize,
    /// Parts in this file
    pub file_parts: usize,
    pub chunk_size: usize,
}

#[derive(Debug, Default)]
struct FileProgress {
    parts: HashMap<usize, u32>,
    total: u32,
    complete: bool,
}

impl FileProgress {
    fn contribution(&self) -> u32 {
        if self.complete { 100 } else { self.total }
    }
}

#[derive(Debug)]
struct Transfer {
    adjusted_total_files: usize,
    files: BTreeMap<usize, FileProgress>,
}

/// Progress aggregation keyed by transfer
#[derive(Debug, Default)]
pub struct ProgressTracker {
    transfers: HashMap<u64, Transfer>,
    /// Most recently finished transfer keys, oldest first
    finished: VecDeque<u64>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `percent` (0..=100) for one part and return overall progress
    ///
    /// A part's value never decreases. A file is the floor of the mean of
    /// its parts and counts as a flat 100 once it reaches 99. Overall
    /// progress divides the file sum by the smallest file count seen for
    /// the transfer; the transfer is forgotten once it passes 99, and only
    /// the last `FINISHED_MEMORY` finished keys keep answering 100.
    pub fn update(&mut self, tag: &PartTag, percent: u32) -> u32 {
        if self.finished.contains(&tag.time_stamp) {
            return 100;
        }
        let file_count = tag.file_count.max(1);
        let transfer = self.transfers.entry(tag.time_stamp).or_insert_with(|| Transfer {
            adjusted_total_files: file_count,
            files: BTreeMap::new(),
        });
        transfer.adjusted_total_files = transfer.adjusted_total_files.min(file_count);

        let file = transfer.files.entry(tag.file_number).or_default();
        if !file.complete {
            let part = file.parts.entry(tag.part).or_insert(0);
            *part = (*part).max(percent.min(100));
            let parts = tag.file_parts.max(file.parts.len()).max(1) as u32;
            file.total = file.parts.values().sum::<u32>() / parts;
            if file.total >= 99 {
                file.complete = true;
            }
        }

        let sum: u32 = transfer.files.values().map(FileProgress::contribution).sum();
        let overall = (sum / transfer.adjusted_total_files as u32).min(100);
        if overall > 99 {
            self.transfers.remove(&tag.time_stamp);
            if self.finished.len() == FINISHED_MEMORY {
                self.finished.pop_front();
            }
            self.finished.push_back(tag.time_stamp);
            return 100;
        }
        overall
    }

    /// Transfers still being tracked
    pub fn active(&self) -> usize {
        self.transfers.len()
    }
}
