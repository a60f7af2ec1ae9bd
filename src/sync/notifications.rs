use crate::types::Severity;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Ephemeral toast shown on top of the dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: u64,
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub created_at: Instant,
    pub expires_at: Instant,
}

/// Stacked, self-expiring notifications. Oldest entries are evicted first once full.
#[derive(Debug)]
pub struct NotificationQueue {
    entries: VecDeque<Notification>,
    capacity: usize,
    ttl: Duration,
    next_id: u64,
}

impl NotificationQueue {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            ttl,
            next_id: 1,
        }
    }

    pub fn enqueue(
        &mut self,
        title: impl Into<String>,
        message: impl Into<String>,
        severity: Severity,
        now: Instant,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        self.entries.push_back(Notification {
            id,
            title: title.into(),
            message: message.into(),
            severity,
            created_at: now,
            expires_at: now + self.ttl,
        });
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        id
    }

    /// Drop everything whose TTL has elapsed; returns how many were removed
    pub fn sweep(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|n| n.expires_at > now);
        before - self.entries.len()
    }

    pub fn dismiss_all(&mut self) {
        self.entries.clear();
    }

    /// Visible notifications, oldest first
    pub fn visible(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue() -> NotificationQueue {
        NotificationQueue::new(5, Duration::from_secs(5))
    }

    #[test]
    fn test_notifications_stack() {
        let mut q = queue();
        let now = Instant::now();
        q.enqueue("Bot Started", "Signal monitoring enabled", Severity::Success, now);
        q.enqueue("Trade", "Trade executed: Mint1", Severity::Success, now);
        let titles: Vec<_> = q.visible().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["Bot Started", "Trade"]);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut q = queue();
        let now = Instant::now();
        for i in 0..7 {
            q.enqueue(format!("n{}", i), "", Severity::Info, now);
        }
        assert_eq!(q.len(), 5);
        assert_eq!(q.visible().next().unwrap().title, "n2");
        assert_eq!(q.visible().last().unwrap().title, "n6");
    }

    #[test]
    fn test_sweep_expires_after_ttl() {
        let mut q = queue();
        let start = Instant::now();
        q.enqueue("old", "", Severity::Info, start);
        q.enqueue("new", "", Severity::Warning, start + Duration::from_secs(3));

        assert_eq!(q.sweep(start + Duration::from_secs(4)), 0);
        assert_eq!(q.sweep(start + Duration::from_secs(5)), 1);
        assert_eq!(q.visible().next().unwrap().title, "new");
        assert_eq!(q.sweep(start + Duration::from_secs(9)), 1);
        assert!(q.is_empty());
    }

    #[test]
    fn test_ids_are_unique() {
        let mut q = queue();
        let now = Instant::now();
        let a = q.enqueue("a", "", Severity::Info, now);
        let b = q.enqueue("b", "", Severity::Info, now);
        assert_ne!(a, b);
        q.dismiss_all();
        assert!(q.is_empty());
    }
}
