//! Pending animation requests, played first-in first-out.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// How many play-throughs an animation gets.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Repeat {
    Times(u32),
    Forever,
}

impl Default for Repeat {
    fn default() -> Self {
        Repeat::Times(1)
    }
}

impl Repeat {
    /// Zero or negative counts play once.
    pub fn from_count(count: i64) -> Self {
        Repeat::Times(count.clamp(1, u32::MAX as i64) as u32)
    }

    /// Repeats left after one play-through, `None` when exhausted.
    pub fn after_playthrough(self) -> Option<Repeat> {
        match self {
            Repeat::Forever => Some(Repeat::Forever),
            Repeat::Times(n) if n > 1 => Some(Repeat::Times(n - 1)),
            Repeat::Times(_) => None,
        }
    }

    pub fn is_forever(&self) -> bool {
        matches!(self, Repeat::Forever)
    }
}

impl From<i32> for Repeat {
    fn from(count: i32) -> Self {
        Repeat::from_count(count as i64)
    }
}

/// A run request waiting for, or being, its turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub animation: String,
    pub repeat: Repeat,
    /// Seconds of intro blend from the previous pose; `<= 0` switches instantly.
    pub intro: f32,
    /// Set when the entry waited behind another animation.
    pub queued: bool,
}

impl QueueEntry {
    pub fn new(animation: impl Into<String>, repeat: impl Into<Repeat>) -> Self {
        Self {
            animation: animation.into(),
            repeat: repeat.into(),
            intro: 0.0,
            queued: false,
        }
    }

    pub fn with_intro(mut self, seconds: f32) -> Self {
        self.intro = if seconds.is_finite() { seconds } else { 0.0 };
        self
    }

    /// Intro length in whole steps; 0 disables blending.
    pub fn intro_steps(&self, time_resolution: f32) -> u32 {
        if self.intro <= 0.0 || time_resolution <= 0.0 {
            return 0;
        }
        ((self.intro / time_resolution).round() as u32).max(1)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnimationQueue {
    entries: VecDeque<QueueEntry>,
}

impl AnimationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mut entry: QueueEntry) {
        entry.queued = true;
        self.entries.push_back(entry);
    }

    pub fn pop(&mut self) -> Option<QueueEntry> {
        self.entries.pop_front()
    }

    pub fn peek(&self) -> Option<&QueueEntry> {
        self.entries.front()
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

    pub fn iter(&self) -> impl Iterator<Item = &QueueEntry> {
        self.entries.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.animation.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_positive_counts_play_once() {
        assert_eq!(Repeat::from(0), Repeat::Times(1));
        assert_eq!(Repeat::from(-4), Repeat::Times(1));
        assert_eq!(Repeat::from(3), Repeat::Times(3));
    }

    #[test]
    fn repeats_count_down_to_exhaustion() {
        let r = Repeat::Times(2);
        let r = r.after_playthrough();
        assert_eq!(r, Some(Repeat::Times(1)));
        assert_eq!(r.and_then(Repeat::after_playthrough), None);
        assert_eq!(
            Repeat::Forever.after_playthrough(),
            Some(Repeat::Forever)
        );
    }

    #[test]
    fn queue_is_fifo_and_marks_entries() {
        let mut q = AnimationQueue::new();
        q.push(QueueEntry::new("a", 1));
        q.push(QueueEntry::new("b", Repeat::Forever));
        assert_eq!(q.names(), vec!["a", "b"]);
        let first = q.pop().unwrap();
        assert_eq!(first.animation, "a");
        assert!(first.queued);
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn intro_steps_round_and_disable() {
        assert_eq!(QueueEntry::new("a", 1).with_intro(0.5).intro_steps(0.25), 2);
        assert_eq!(QueueEntry::new("a", 1).with_intro(0.01).intro_steps(0.25), 1);
        assert_eq!(QueueEntry::new("a", 1).with_intro(-1.0).intro_steps(0.25), 0);
        assert_eq!(QueueEntry::new("a", 1).intro_steps(0.25), 0);
    }
}
