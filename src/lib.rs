pub mod charset;
pub mod cli;
pub mod config;
pub mod downloader;
pub mod error;
pub mod file_manager;
pub mod html_parser;
pub mod logging;
pub mod page_data;
pub mod path_utils;
pub mod report;

// Re-export main types for convenience
pub use cli::MirrorCommand;
pub use config::FetchOptions;
pub use downloader::PageMirror;
pub use error::MirrorError;
pub use file_manager::FileManager;
pub use html_parser::{AssetFetcher, HtmlParser};
pub use page_data::{AssetFailure, AssetKind, PageData};
