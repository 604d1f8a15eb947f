use chrono::Duration;

/// Attempt budget for a rate-limited key.
///
/// A key may spend `points` attempts inside one `window`. The attempt that
/// spends the last point is still allowed, but it blocks the key for `block`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limit {
    pub(crate) points: u32,
    pub(crate) window: Duration,
    pub(crate) block: Duration,
}

impl Limit {
    /// `points` is raised to at least one.
    #[must_use]
    pub fn new(points: u32, window: Duration, block: Duration) -> Self {
        Self {
            points: points.max(1),
            window,
            block,
        }
    }

    /// Login policy: 5 attempts per 5 minutes, then a 5 minute block.
    #[must_use]
    pub fn login() -> Self {
        Self::new(5, Duration::minutes(5), Duration::minutes(5))
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn window_secs(&self) -> u64 {
        u64::try_from(self.window.num_seconds()).unwrap_or(0)
    }

    pub fn block_secs(&self) -> u64 {
        u64::try_from(self.block.num_seconds()).unwrap_or(0)
    }
}

impl Default for Limit {
    fn default() -> Self {
        Self::login()
    }
}
