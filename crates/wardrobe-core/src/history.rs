//! Bounded, most-recent-first history of exported looks.

use std::collections::VecDeque;

use serde::Serialize;

use crate::catalog::MoodFilter;
use crate::encode::to_data_url;

/// Title used when a look was exported without a garment.
pub const FALLBACK_TITLE: &str = "Mood look";

/// Download file name for a look: `mood-wardrobe-<mood>.png`.
pub fn export_file_name(mood: MoodFilter) -> String {
    format!("mood-wardrobe-{}.png", mood.as_str())
}

/// One exported still.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedLook {
    /// Session-unique identifier, increasing with every export.
    pub id: u64,
    /// The garment's mood, or `all` if no garment was selected.
    pub mood: MoodFilter,
    pub title: String,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    /// PNG-encoded image.
    #[serde(skip)]
    pub png: Vec<u8>,
}

impl ExportedLook {
    /// Self-contained `data:image/png;base64,...` URL of the image.
    pub fn data_url(&self) -> String {
        to_data_url(&self.png)
    }
}

/// Rolling in-memory history. Nothing is persisted.
#[derive(Debug, Clone)]
pub struct LookHistory {
    capacity: usize,
    looks: VecDeque<ExportedLook>,
}

impl LookHistory {
    /// Create an empty history. A zero capacity is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            looks: VecDeque::with_capacity(capacity),
        }
    }

    /// Prepend a look, evicting the oldest ones beyond capacity.
    pub fn push(&mut self, look: ExportedLook) -> &ExportedLook {
        self.looks.push_front(look);
        while self.looks.len() > self.capacity {
            if let Some(evicted) = self.looks.pop_back() {
                log::debug!("evicted look {} from history", evicted.id);
            }
        }
        // capacity is at least one, so the new look survives eviction
        &self.looks[0]
    }

    /// Looks, most recent first.
    pub fn iter(&self) -> impl Iterator<Item = &ExportedLook> {
        self.looks.iter()
    }

    pub fn latest(&self) -> Option<&ExportedLook> {
        self.looks.front()
    }

    pub fn get(&self, id: u64) -> Option<&ExportedLook> {
        self.looks.iter().find(|look| look.id == id)
    }

    pub fn len(&self) -> usize {
        self.looks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.looks.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.looks.clear();
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
