use std::time::Duration;

/// Resolver knobs, read from `MUSTER_*` environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Max host matches requested per search (`MUSTER_SEARCH_LIMIT`).
    pub search_limit: usize,
    /// Quiet period before a typed filter is searched (`MUSTER_DEBOUNCE_MS`).
    pub debounce: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self { Self { search_limit: 10, debounce: Duration::from_millis(500) } }
}

impl ResolverConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        let search_limit = get("MUSTER_SEARCH_LIMIT")
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(d.search_limit);
        let debounce = get("MUSTER_DEBOUNCE_MS")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(d.debounce);
        Self { search_limit, debounce }
    }
}
