use chromiumoxide::Page;
use std::time::Duration;
use tokio::time::Instant;

/// When a freshly loaded page counts as rendered.
///
/// `min_wait` always elapses first. With a landmark selector the page is then
/// polled until the landmark exists or `ceiling` (measured from the start of
/// settling) is reached.
#[derive(Debug, Clone)]
pub struct SettlePolicy {
    pub min_wait: Duration,
    pub ceiling: Duration,
    pub poll_interval: Duration,
}

impl Default for SettlePolicy {
    fn default() -> Self {
        Self {
            min_wait: Duration::from_secs(1),
            ceiling: Duration::from_secs(10),
            poll_interval: Duration::from_millis(250),
        }
    }
}

impl SettlePolicy {
    /// Wait for `page` to settle; returns whether the landmark was seen.
    ///
    /// Missing landmarks are not an error: the page is used as rendered.
    pub async fn settle(&self, page: &Page, landmark: Option<&str>) -> bool {
        let deadline = Instant::now() + self.ceiling.max(self.min_wait);
        tokio::time::sleep(self.min_wait).await;

        let Some(selector) = landmark else {
            return true;
        };

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let found = tokio::time::timeout(
                remaining.max(self.poll_interval),
                page.find_element(selector),
            )
            .await;
            if matches!(found, Ok(Ok(_))) {
                return true;
            }

            if Instant::now() >= deadline {
                tracing::debug!("Landmark '{}' not found within {:?}", selector, self.ceiling);
                return false;
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_bounded() {
        let policy = SettlePolicy::default();
        assert!(policy.min_wait <= policy.ceiling);
        assert!(policy.poll_interval < policy.ceiling);
    }
}
