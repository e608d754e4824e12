use std::time::{Duration, Instant};

/// Short-lived banner such as "Acquired: Stripe".
///
/// Raising a new notice replaces the old one together with its deadline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Notice {
    current: Option<(String, Instant)>,
}

impl Notice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&mut self, text: impl Into<String>, now: Instant, ttl: Duration) {
        self.current = Some((text.into(), now + ttl));
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Text to show at `now`, if the notice has not expired
    pub fn visible(&self, now: Instant) -> Option<&str> {
        match &self.current {
            Some((text, until)) if now < *until => Some(text.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_millis(1300);

    #[test]
    fn test_notice_expires() {
        let t0 = Instant::now();
        let mut notice = Notice::new();
        notice.raise("Acquired: Loom", t0, TTL);

        assert_eq!(notice.visible(t0), Some("Acquired: Loom"));
        assert_eq!(notice.visible(t0 + Duration::from_millis(1299)), Some("Acquired: Loom"));
        assert_eq!(notice.visible(t0 + TTL), None);
    }

    #[test]
    fn test_newer_notice_supersedes() {
        let t0 = Instant::now();
        let mut notice = Notice::new();
        notice.raise("Acquired: Loom", t0, TTL);

        let t1 = t0 + Duration::from_millis(1000);
        notice.raise("Acquired: Neon", t1, TTL);

        // the first deadline passing does not clear the second notice
        assert_eq!(notice.visible(t0 + TTL), Some("Acquired: Neon"));
        assert_eq!(notice.visible(t1 + TTL), None);
    }

    #[test]
    fn test_clear() {
        let t0 = Instant::now();
        let mut notice = Notice::new();
        notice.raise("Acquired: Loom", t0, TTL);
        notice.clear();
        assert_eq!(notice.visible(t0), None);
    }
}
