use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = concat!("page-mirror/", env!("CARGO_PKG_VERSION"));

/// Knobs for the HTTP side of mirroring.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Applies to each request individually.
    pub timeout: Duration,
    pub user_agent: String,
    /// Upper bound on sibling assets of one page fetched at the same time.
    pub max_concurrent: usize,
    /// Also require a 2xx status for non-HTML resources.
    pub strict_asset_status: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_concurrent: 4,
            strict_asset_status: false,
        }
    }
}
