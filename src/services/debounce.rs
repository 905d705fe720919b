use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// 搜索框输入的默认防抖延迟
pub const DEFAULT_SEARCH_DELAY: Duration = Duration::from_millis(500);

/// 搜索词防抖（后沿触发）
///
/// 每次输入都会让之前排队的输入失效，只有最后一次输入在延迟结束后生效。
#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    delay: Duration,
    generation: Arc<AtomicU64>,
}

/// 一次排队中的搜索输入
#[derive(Debug)]
pub struct PendingSearch {
    term: String,
    generation: u64,
    latest: Arc<AtomicU64>,
    delay: Duration,
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// 排队一次输入，之前排队的输入全部作废
    pub fn queue(&self, term: impl Into<String>) -> PendingSearch {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        PendingSearch {
            term: term.into(),
            generation,
            latest: Arc::clone(&self.generation),
            delay: self.delay,
        }
    }

    /// 作废所有排队中的输入
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_DELAY)
    }
}

impl PendingSearch {
    pub fn term(&self) -> &str {
        &self.term
    }

    /// 等待延迟结束
    ///
    /// 期间没有更新的输入时返回搜索词，否则返回 `None`。
    pub async fn settle(self) -> Option<String> {
        tokio::time::sleep(self.delay).await;
        if self.latest.load(Ordering::SeqCst) == self.generation {
            Some(self.term)
        } else {
            tracing::trace!("Search term {:?} superseded", self.term);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_only_last_term_of_burst_settles() {
        let debouncer = SearchDebouncer::default();
        let started = Instant::now();

        let first = debouncer.queue("b");
        let second = debouncer.queue("be");
        let third = debouncer.queue("bea");

        let (first, second, third) = tokio::join!(first.settle(), second.settle(), third.settle());
        assert_eq!(first, None);
        assert_eq!(second, None);
        assert_eq!(third.as_deref(), Some("bea"));
        assert!(started.elapsed() >= DEFAULT_SEARCH_DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_inputs_each_settle() {
        let debouncer = SearchDebouncer::new(Duration::from_millis(200));

        let first = debouncer.queue("one").settle().await;
        let second = debouncer.queue("two").settle().await;
        assert_eq!(first.as_deref(), Some("one"));
        assert_eq!(second.as_deref(), Some("two"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_discards_pending() {
        let debouncer = SearchDebouncer::default();
        let pending = debouncer.queue("anything");
        debouncer.cancel();
        assert_eq!(pending.settle().await, None);
    }
}
