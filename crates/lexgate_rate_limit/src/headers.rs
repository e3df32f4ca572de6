//! Standard quota headers rendered from a decision.

use crate::Decision;

/// Effective hourly limit.
pub const X_RATE_LIMIT_LIMIT: &str = "X-RateLimit-Limit";

/// Requests left in the current hour window.
pub const X_RATE_LIMIT_REMAINING: &str = "X-RateLimit-Remaining";

/// Epoch second at which the hour window resets.
pub const X_RATE_LIMIT_RESET: &str = "X-RateLimit-Reset";

/// Headline window size in seconds.
pub const X_RATE_LIMIT_WINDOW: &str = "X-RateLimit-Window";

/// Human-readable policy string.
pub const X_RATE_LIMIT_POLICY: &str = "X-RateLimit-Policy";

/// Seconds to wait before retrying. Only present on rejections.
pub const RETRY_AFTER: &str = "Retry-After";

impl Decision {
    /// Render the standard quota headers for this decision.
    ///
    /// The five `X-RateLimit-*` headers are always present; `Retry-After`
    /// only accompanies a rejection.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![
            (X_RATE_LIMIT_LIMIT, self.limit.to_string()),
            (X_RATE_LIMIT_REMAINING, self.remaining.to_string()),
            (X_RATE_LIMIT_RESET, self.reset_epoch.to_string()),
            (X_RATE_LIMIT_WINDOW, self.window_seconds.to_string()),
            (X_RATE_LIMIT_POLICY, self.policy.clone()),
        ];
        if let Some(retry_after) = self.retry_after {
            headers.push((RETRY_AFTER, retry_after.to_string()));
        }
        headers
    }
}
