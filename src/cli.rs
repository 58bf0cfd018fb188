use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{FetchOptions, DEFAULT_USER_AGENT};

#[derive(Parser, Debug)]
#[command(
    name = "page-mirror",
    about = "A CLI utility to mirror web pages together with their images, stylesheets and scripts",
    version,
    long_about = "Downloads each given page, saves its images, stylesheets and scripts next to it and rewrites the page so it refers to the local copies."
)]
pub struct MirrorCommand {
    /// URLs of the pages to mirror
    #[arg(required = true)]
    pub urls: Vec<String>,

    /// Display metadata regarding image count, etc.
    #[arg(short, long)]
    pub metadata: bool,

    /// Print metadata as one JSON object per page instead
    #[arg(long)]
    pub json: bool,

    /// Output directory for mirrored pages
    #[arg(short, long, default_value = "output")]
    pub output_dir: PathBuf,

    /// Timeout for each request in seconds
    #[arg(long, default_value = "30")]
    pub timeout: u64,

    /// Maximum assets of one page downloaded concurrently
    #[arg(short = 'c', long, default_value = "4", value_parser = parse_positive)]
    pub max_concurrent: usize,

    /// User agent string to use for requests
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Discard assets answered with a non-success status instead of saving the body
    #[arg(long)]
    pub strict_assets: bool,

    /// Log every request and asset
    #[arg(short, long)]
    pub verbose: bool,
}

impl MirrorCommand {
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            timeout: Duration::from_secs(self.timeout),
            user_agent: self.user_agent.clone(),
            max_concurrent: self.max_concurrent,
            strict_asset_status: self.strict_assets,
        }
    }
}

fn parse_positive(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}
