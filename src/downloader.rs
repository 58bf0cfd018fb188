use std::path::{Path, PathBuf};

use futures::future::LocalBoxFuture;
use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, ClientBuilder, Response};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use url::Url;

use crate::charset;
use crate::config::FetchOptions;
use crate::error::{MirrorError, Result};
use crate::file_manager::{create_resource_dir, FileManager};
use crate::html_parser::{AssetFetcher, HtmlParser};
use crate::page_data::PageData;
use crate::path_utils::is_html_target;

/// Fetches resources and writes them to disk, rewriting HTML pages so they
/// refer to locally saved copies of their assets.
#[derive(Debug, Clone)]
pub struct PageMirror {
    client: Client,
    options: FetchOptions,
}

impl PageMirror {
    pub fn new(options: FetchOptions) -> Result<Self> {
        let client = Self::build_http_client(&options)?;
        Ok(Self { client, options })
    }

    fn build_http_client(options: &FetchOptions) -> Result<Client> {
        ClientBuilder::new()
            .use_rustls_tls()
            .user_agent(options.user_agent.as_str())
            .timeout(options.timeout)
            .build()
            .map_err(MirrorError::ClientBuild)
    }

    /// Mirrors `url` as a top-level page under `file_manager`'s output root
    /// and returns where it was saved.
    pub async fn mirror_page(
        &self,
        url: &str,
        file_manager: &FileManager,
    ) -> Result<(PathBuf, PageData)> {
        let parsed = parse_url(url)?;
        let target = file_manager.prepare_page_path(&parsed)?;
        let page_data = self.retrieve_resource(url, &target).await?;
        Ok((target, page_data))
    }

    /// Retrieves `url` into `target`.
    ///
    /// Whether the resource is treated as a page is decided by the target's
    /// extension alone: `html` means parse, mirror assets and rewrite; anything
    /// else is copied byte for byte. Pages must come back with a 2xx status;
    /// other resources are saved whatever the status, unless
    /// [`FetchOptions::strict_asset_status`] is set.
    pub fn retrieve_resource<'a>(
        &'a self,
        url: &'a str,
        target: &'a Path,
    ) -> LocalBoxFuture<'a, Result<PageData>> {
        Box::pin(self.retrieve(url, target))
    }

    async fn retrieve(&self, url: &str, target: &Path) -> Result<PageData> {
        let parsed = parse_url(url)?;

        debug!(url = %parsed, target = %target.display(), "requesting");
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|source| MirrorError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        debug!(url = %url, status = %status, "response");

        if is_html_target(target) {
            if !status.is_success() {
                return Err(MirrorError::Status {
                    url: url.to_string(),
                    status,
                });
            }
            self.save_page(url, response, target).await
        } else {
            if self.options.strict_asset_status && !status.is_success() {
                return Err(MirrorError::Status {
                    url: url.to_string(),
                    status,
                });
            }
            stream_to_file(url, response, target).await?;
            Ok(PageData::default())
        }
    }

    async fn save_page(&self, url: &str, response: Response, target: &Path) -> Result<PageData> {
        let content_type = content_type(&response);
        warn_if_not_html(url, content_type.as_deref());

        create_resource_dir(target)?;

        // Relative references resolve against where we actually ended up.
        let parser = HtmlParser::from_url(response.url().clone());
        let body = response.bytes().await.map_err(|source| MirrorError::Transport {
            url: url.to_string(),
            source,
        })?;

        let encoding = charset::detect_encoding(content_type.as_deref(), &body);
        let text = charset::decode(encoding, &body);
        let (page_data, html) = parser.mirror_document(text.as_bytes(), target, self).await?;

        fs::write(target, charset::encode(encoding, &html))
            .await
            .map_err(|e| MirrorError::filesystem(target, e))?;

        info!(
            url = %url,
            path = %target.display(),
            encoding = encoding.name(),
            images = page_data.images.len(),
            stylesheets = page_data.stylesheets.len(),
            scripts = page_data.javascripts.len(),
            failed = page_data.failed_assets.len(),
            "saved page"
        );
        Ok(page_data)
    }
}

impl AssetFetcher for PageMirror {
    fn fetch_asset<'a>(
        &'a self,
        url: &'a str,
        target: &'a Path,
    ) -> LocalBoxFuture<'a, Result<PageData>> {
        self.retrieve_resource(url, target)
    }

    fn max_concurrent(&self) -> usize {
        self.options.max_concurrent
    }
}

fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|source| MirrorError::InvalidUrl {
        url: url.to_string(),
        source,
    })
}

fn content_type(response: &Response) -> Option<String> {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

// Pages are classified by file name; a disagreeing server is only worth a note.
fn warn_if_not_html(url: &str, content_type: Option<&str>) {
    let Some(content_type) = content_type.and_then(|v| v.parse::<mime::Mime>().ok()) else {
        return;
    };
    if content_type.type_() != mime::TEXT || content_type.subtype() != mime::HTML {
        warn!(url = %url, content_type = %content_type, "parsing non-HTML response as HTML");
    }
}

/// Copies the body verbatim. A partially written file is removed again.
async fn stream_to_file(url: &str, response: Response, target: &Path) -> Result<()> {
    let mut file = File::create(target)
        .await
        .map_err(|e| MirrorError::filesystem(target, e))?;

    let copied = copy_body(url, response, &mut file, target).await;
    drop(file);

    if copied.is_err() {
        let _ = fs::remove_file(target).await;
    }
    copied
}

async fn copy_body(url: &str, response: Response, file: &mut File, target: &Path) -> Result<()> {
    let mut written = 0usize;
    let mut body = response.bytes_stream();
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|source| MirrorError::Transport {
            url: url.to_string(),
            source,
        })?;
        file.write_all(&chunk)
            .await
            .map_err(|e| MirrorError::filesystem(target, e))?;
        written += chunk.len();
    }
    file.flush()
        .await
        .map_err(|e| MirrorError::filesystem(target, e))?;

    debug!(url = %url, path = %target.display(), bytes = written, "saved resource");
    Ok(())
}
