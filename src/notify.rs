use std::time::{Duration, Instant};

pub const DEFAULT_TOAST_TIMEOUT: Duration = Duration::from_millis(3500);

#[derive(Debug, Clone)]
pub struct Toast {
    pub text: String,
    expires_at: Instant,
}

/// Transient notifications, oldest first
#[derive(Debug)]
pub struct Notifier {
    toasts: Vec<Toast>,
    timeout: Duration,
}

impl Notifier {
    pub fn new(timeout: Duration) -> Self {
        Self {
            toasts: Vec::new(),
            timeout,
        }
    }

    pub fn notify(&mut self, text: impl Into<String>) {
        self.notify_at(text, Instant::now());
    }

    fn notify_at(&mut self, text: impl Into<String>, now: Instant) {
        let text = text.into();
        tracing::debug!(toast = %text, "notify");
        self.toasts.push(Toast {
            text,
            expires_at: now + self.timeout,
        });
    }

    /// Drop toasts whose timeout has elapsed (called on every tick)
    pub fn prune(&mut self, now: Instant) {
        self.toasts.retain(|toast| toast.expires_at > now);
    }

    pub fn visible(&self) -> &[Toast] {
        &self.toasts
    }

    #[cfg(test)]
    pub fn texts(&self) -> Vec<&str> {
        self.toasts.iter().map(|t| t.text.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toasts_expire_independently() {
        let mut notifier = Notifier::new(Duration::from_millis(100));
        let start = Instant::now();
        notifier.notify_at("first", start);
        notifier.notify_at("second", start + Duration::from_millis(60));

        notifier.prune(start + Duration::from_millis(50));
        assert_eq!(notifier.texts(), vec!["first", "second"]);

        notifier.prune(start + Duration::from_millis(100));
        assert_eq!(notifier.texts(), vec!["second"]);

        notifier.prune(start + Duration::from_millis(200));
        assert!(notifier.visible().is_empty());
    }
}
