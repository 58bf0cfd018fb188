use std::path::{Path, PathBuf};

use futures::future::LocalBoxFuture;
use futures::stream::{self, StreamExt};
use html5ever::serialize::{serialize, SerializeOpts};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{parse_document, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};
use tracing::{debug, warn};
use url::Url;

use crate::error::{MirrorError, Result};
use crate::file_manager::asset_path;
use crate::page_data::{AssetFailure, AssetKind, PageData};

/// Whatever knows how to fetch a single asset into a local file. The
/// rewriter only needs to know whether it worked.
pub trait AssetFetcher {
    fn fetch_asset<'a>(&'a self, url: &'a str, target: &'a Path)
        -> LocalBoxFuture<'a, Result<PageData>>;

    /// How many sibling assets may be in flight at once.
    fn max_concurrent(&self) -> usize {
        1
    }
}

/// An embedded asset waiting to be fetched.
struct AssetJob {
    kind: AssetKind,
    element: Handle,
    reference: String,
    url: Url,
    local_path: PathBuf,
}

/// Rewrites one HTML page relative to its own URL.
#[derive(Debug, Clone)]
pub struct HtmlParser {
    base_url: Url,
}

impl HtmlParser {
    pub fn new(base_url: &str) -> Result<Self> {
        let parsed = Url::parse(base_url).map_err(|source| MirrorError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;
        Ok(Self { base_url: parsed })
    }

    pub fn from_url(base_url: Url) -> Self {
        Self { base_url }
    }

    /// Relative, root-relative, protocol-relative and absolute references
    /// are all handled by joining onto the page URL.
    pub fn resolve_url(&self, reference: &str) -> Result<Url> {
        self.base_url
            .join(reference)
            .map_err(|source| MirrorError::Resolution {
                base: self.base_url.to_string(),
                reference: reference.to_string(),
                source,
            })
    }

    /// `body` is UTF-8; pages in other encodings are decoded beforehand.
    pub fn parse(&self, body: &[u8]) -> Result<RcDom> {
        let dom = parse_document(RcDom::default(), ParseOpts::default())
            .from_utf8()
            .read_from(&mut &body[..])
            .map_err(|source| MirrorError::Parse {
                url: self.base_url.to_string(),
                source,
            })?;

        if !dom.errors.is_empty() {
            debug!(
                url = %self.base_url,
                errors = dom.errors.len(),
                "recovered from malformed markup"
            );
        }
        Ok(dom)
    }

    /// Anchor `href`s in document order, exactly as written.
    pub fn extract_links(&self, dom: &RcDom) -> Vec<String> {
        let mut links = Vec::new();
        walk(&dom.document, &mut |node| {
            if is_element(node, "a") {
                if let Some(href) = get_attr(node, "href") {
                    links.push(href);
                }
            }
        });
        links
    }

    /// Elements carrying an asset reference, images first, then
    /// stylesheets, then scripts, each in document order.
    fn find_assets(&self, dom: &RcDom) -> Vec<(AssetKind, Handle, String)> {
        let mut found = Vec::new();
        for kind in AssetKind::ALL {
            walk(&dom.document, &mut |node| {
                if !is_element(node, kind.element()) {
                    return;
                }
                if kind == AssetKind::Stylesheet && !is_stylesheet_link(node) {
                    return;
                }
                if let Some(reference) = get_attr(node, kind.attribute()) {
                    found.push((kind, node.clone(), reference));
                }
            });
        }
        found
    }

    /// Fetches every embedded asset of `dom` next to `page_target` and points
    /// the document at the saved copies. A failing asset never fails the
    /// page: its element is left alone and the failure is recorded.
    pub async fn rewrite<F>(&self, dom: &RcDom, page_target: &Path, fetcher: &F) -> PageData
    where
        F: AssetFetcher + ?Sized,
    {
        let mut page_data = PageData {
            links: self.extract_links(dom),
            ..PageData::default()
        };

        let mut jobs = Vec::new();
        for (kind, element, reference) in self.find_assets(dom) {
            let local_path = asset_path(page_target, &reference);
            match self.resolve_url(&reference) {
                Ok(url) => jobs.push(AssetJob {
                    kind,
                    element,
                    reference,
                    url,
                    local_path,
                }),
                Err(e) => {
                    warn!(reference = %reference, error = %e, "skipping unresolvable asset");
                    page_data.failed_assets.push(AssetFailure {
                        kind,
                        reference,
                        local_path: local_path.to_string_lossy().into_owned(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let results: Vec<Result<PageData>> = stream::iter(
            jobs.iter()
                .map(|job| fetcher.fetch_asset(job.url.as_str(), &job.local_path)),
        )
        .buffered(fetcher.max_concurrent().max(1))
        .collect()
        .await;

        for (job, result) in jobs.into_iter().zip(results) {
            let local_path = job.local_path.to_string_lossy().into_owned();
            match result {
                Ok(_) => {
                    debug!(url = %job.url, path = %local_path, "mirrored asset");
                    set_attr(&job.element, job.kind.attribute(), &local_path);
                    page_data.assets_mut(job.kind).push(local_path);
                }
                Err(e) => {
                    warn!(url = %job.url, error = %e, "failed to mirror asset");
                    page_data.failed_assets.push(AssetFailure {
                        kind: job.kind,
                        reference: job.reference,
                        local_path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        page_data
    }

    pub fn serialize(&self, dom: &RcDom) -> Result<String> {
        let to_error = |source| MirrorError::Serialization {
            url: self.base_url.to_string(),
            source,
        };

        let document: SerializableHandle = dom.document.clone().into();
        let mut bytes = Vec::new();
        serialize(&mut bytes, &document, SerializeOpts::default()).map_err(to_error)?;

        String::from_utf8(bytes)
            .map_err(|e| to_error(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
    }

    /// Parse, rewrite and serialize in one go.
    pub async fn mirror_document<F>(
        &self,
        body: &[u8],
        page_target: &Path,
        fetcher: &F,
    ) -> Result<(PageData, String)>
    where
        F: AssetFetcher + ?Sized,
    {
        let dom = self.parse(body)?;
        let page_data = self.rewrite(&dom, page_target, fetcher).await;
        let html = self.serialize(&dom)?;
        Ok((page_data, html))
    }
}

fn walk(node: &Handle, visit: &mut dyn FnMut(&Handle)) {
    visit(node);
    for child in node.children.borrow().iter() {
        walk(child, visit);
    }
}

fn is_element(node: &Handle, local: &str) -> bool {
    match node.data {
        NodeData::Element { ref name, .. } => &*name.local == local,
        _ => false,
    }
}

fn get_attr(node: &Handle, attr: &str) -> Option<String> {
    match node.data {
        NodeData::Element { ref attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|a| &*a.name.local == attr)
            .map(|a| a.value.to_string()),
        _ => None,
    }
}

fn set_attr(node: &Handle, attr: &str, value: &str) {
    if let NodeData::Element { ref attrs, .. } = node.data {
        if let Some(a) = attrs.borrow_mut().iter_mut().find(|a| &*a.name.local == attr) {
            a.value = StrTendril::from_slice(value);
        }
    }
}

// `rel` is a token list, so `alternate stylesheet` counts too.
fn is_stylesheet_link(node: &Handle) -> bool {
    get_attr(node, "rel").is_some_and(|rel| {
        rel.split_ascii_whitespace()
            .any(|token| token.eq_ignore_ascii_case("stylesheet"))
    })
}
