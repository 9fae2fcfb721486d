//! Recent vulnerability advisories.

mod nvd;

use async_trait::async_trait;

pub use nvd::NvdClient;

use crate::error::ExternalServiceError;
use crate::models::Advisory;

/// Default look-back window, in days.
pub const DEFAULT_WINDOW_DAYS: u32 = 30;
/// Default number of advisories shown.
pub const DEFAULT_LIMIT: usize = 5;
/// Most advisories returned by one lookup.
pub const MAX_LIMIT: usize = 50;
/// Widest publication-date range the NVD API accepts.
pub const MAX_WINDOW_DAYS: u32 = 120;

/// A read-only source of recently published advisories.
#[async_trait]
pub trait AdvisorySource: Send + Sync {
    /// Advisories published in the last `window_days`, newest first, at most `limit`.
    async fn recent(
        &self,
        window_days: u32,
        limit: usize,
    ) -> Result<Vec<Advisory>, ExternalServiceError>;
}

/// Clamp a requested window to what the feed accepts.
pub fn clamp_window(window_days: u32) -> u32 {
    window_days.clamp(1, MAX_WINDOW_DAYS)
}

/// Order newest first and keep at most `limit`. Undated advisories sort last.
pub fn newest_first(mut advisories: Vec<Advisory>, limit: usize) -> Vec<Advisory> {
    advisories.sort_by(|a, b| b.published.cmp(&a.published));
    advisories.truncate(limit);
    advisories
}
