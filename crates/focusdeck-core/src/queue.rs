//! Bounded active work queue.
//!
//! Holds the ordered list of up to `capacity` items and the index of the
//! active one. Terminal transitions remove the active item; the next item
//! (if any remain) becomes active. The queue can persist itself to a JSON
//! file so a short-lived CLI process can resume between invocations.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::model::WorkItemSnapshot;

pub const DEFAULT_QUEUE_CAPACITY: usize = 5;

#[derive(Debug, Serialize, Deserialize)]
struct QueueFile {
    items: Vec<WorkItemSnapshot>,
    active: usize,
}

pub struct FocusQueue {
    items: Vec<WorkItemSnapshot>,
    active: usize,
    capacity: usize,
    /// Persistent queue file path, when attached.
    queue_file: Option<PathBuf>,
}

impl FocusQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            active: 0,
            capacity,
            queue_file: None,
        }
    }

    /// Queue backed by a JSON file, loading its previous contents if any.
    pub fn with_path(capacity: usize, path: PathBuf) -> Self {
        let mut queue = Self::new(capacity);
        if let Ok(content) = std::fs::read_to_string(&path) {
            if let Ok(file) = serde_json::from_str::<QueueFile>(&content) {
                queue.items = file.items;
                queue.items.truncate(capacity);
                queue.active = file.active.min(queue.items.len().saturating_sub(1));
            }
        }
        queue.queue_file = Some(path);
        queue
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn items(&self) -> &[WorkItemSnapshot] {
        &self.items
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> Option<&WorkItemSnapshot> {
        self.items.get(self.active)
    }

    /// Replace the whole queue, re-ranking positions 0..n.
    pub fn set_items(&mut self, mut items: Vec<WorkItemSnapshot>) {
        items.truncate(self.capacity);
        for (rank, item) in items.iter_mut().enumerate() {
            item.queue_position = Some(rank as u32);
        }
        self.items = items;
        self.active = 0;
    }

    /// Append one item if there is room. Returns false when full.
    pub fn push(&mut self, mut item: WorkItemSnapshot) -> bool {
        if self.items.len() >= self.capacity {
            return false;
        }
        item.queue_position = Some(self.items.len() as u32);
        self.items.push(item);
        true
    }

    /// Swap in a fresher snapshot for the active item.
    pub fn replace_active(&mut self, item: WorkItemSnapshot) {
        if let Some(slot) = self.items.get_mut(self.active) {
            *slot = item;
        }
    }

    /// Remove the active item; the next one (if any) becomes active.
    pub fn advance(&mut self) -> Option<&WorkItemSnapshot> {
        if self.items.is_empty() {
            return None;
        }
        self.items.remove(self.active);
        if self.items.is_empty() {
            self.active = 0;
            return None;
        }
        if self.active >= self.items.len() {
            self.active = 0;
        }
        self.items.get(self.active)
    }

    /// Persist to the attached file, if any.
    pub fn persist(&self) -> Result<(), std::io::Error> {
        let Some(path) = &self.queue_file else {
            return Ok(());
        };
        let file = QueueFile {
            items: self.items.clone(),
            active: self.active,
        };
        let data = serde_json::to_string_pretty(&file)?;
        std::fs::write(path, data)?;
        Ok(())
    }
}
