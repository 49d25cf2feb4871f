use std::collections::VecDeque;

use crate::track::QueueEntry;

/// Per-session FIFO of pending tracks. Entries are never reordered or
/// deduplicated; an entry leaves only by being dequeued into the
/// session's current track or by `clear`.
#[derive(Default)]
pub struct TrackQueue {
    entries: VecDeque<QueueEntry>,
}

impl TrackQueue {
    pub fn push(&mut self, entry: QueueEntry) {
        self.entries.push_back(entry);
    }

    pub fn pop(&mut self) -> Option<QueueEntry> {
        self.entries.pop_front()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn titles(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.title().to_string()).collect()
    }

    /// One line per pending track, `idx. title - duration`, for sinks
    /// that show the queue.
    pub fn listing(&self) -> String {
        if self.entries.is_empty() {
            return "The queue is empty.".to_string();
        }
        self.entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| {
                format!("{}. {} - {}", idx + 1, entry.title(), entry.display_duration())
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
