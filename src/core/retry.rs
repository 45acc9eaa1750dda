//! 有界重试：指数退避，封顶延迟
//!
//! 工具适配器本身不重试；由调用方（专家）通过 RetryPolicy 包裹每次调用。
//! 仅 Timeout / Unavailable 会重试，InvalidResponse 直接返回。

use std::future::Future;
use std::time::Duration;

use crate::core::error::ToolFailure;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(250), Duration::from_secs(4))
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: max_delay.max(base_delay),
        }
    }

    /// 只尝试一次
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// 第 attempt 次失败后的等待时间：base * 2^(attempt-1)，不超过 max_delay
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// 执行 op（参数为从 1 开始的尝试序号），可重试失败按退避重试，直至成功或用尽次数
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, ToolFailure>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, ToolFailure>>,
    {
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(failure) if failure.is_retryable() && attempt < self.max_attempts => {
                    let delay = self.delay_for(attempt);
                    tracing::warn!(
                        call = label,
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %failure,
                        "call failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(failure) => {
                    if attempt > 1 {
                        tracing::warn!(call = label, attempts = attempt, error = %failure, "retries exhausted");
                    }
                    return Err(failure);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(attempts, Duration::from_millis(1), Duration::from_millis(4))
    }

    #[test]
    fn test_exponential_backoff_capped() {
        let policy = RetryPolicy::new(6, Duration::from_millis(250), Duration::from_secs(1));
        assert_eq!(policy.delay_for(1), Duration::from_millis(250));
        assert_eq!(policy.delay_for(2), Duration::from_millis(500));
        assert_eq!(policy.delay_for(3), Duration::from_secs(1));
        assert_eq!(policy.delay_for(4), Duration::from_secs(1));
    }

    #[test]
    fn test_at_least_one_attempt() {
        let policy = RetryPolicy::new(0, Duration::ZERO, Duration::ZERO);
        assert_eq!(policy.max_attempts(), 1);
    }

    #[tokio::test]
    async fn test_retries_transient_then_succeeds() {
        let calls = AtomicU32::new(0);
        let result = fast_policy(3)
            .run("weather", |_| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(ToolFailure::Unavailable("503".into()))
                    } else {
                        Ok("sunny")
                    }
                }
            })
            .await;
        assert_eq!(result, Ok("sunny"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausted_returns_last_failure() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = fast_policy(3)
            .run("news", |attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { Err(ToolFailure::Timeout(format!("attempt {attempt}"))) }
            })
            .await;
        assert_eq!(result, Err(ToolFailure::Timeout("attempt 3".into())));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_invalid_response_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = fast_policy(5)
            .run("news", |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(ToolFailure::InvalidResponse("not rss".into())) }
            })
            .await;
        assert!(matches!(result, Err(ToolFailure::InvalidResponse(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
