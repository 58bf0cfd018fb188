use serde::{Deserialize, Serialize};

/// The embedded assets a page is mirrored with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    Stylesheet,
    Script,
}

impl AssetKind {
    /// Processing order within a page.
    pub const ALL: [AssetKind; 3] = [AssetKind::Image, AssetKind::Stylesheet, AssetKind::Script];

    pub fn element(self) -> &'static str {
        match self {
            AssetKind::Image => "img",
            AssetKind::Stylesheet => "link",
            AssetKind::Script => "script",
        }
    }

    /// The attribute holding the asset reference.
    pub fn attribute(self) -> &'static str {
        match self {
            AssetKind::Image | AssetKind::Script => "src",
            AssetKind::Stylesheet => "href",
        }
    }
}

/// An embedded asset that could not be mirrored. The element it came from
/// keeps its original reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetFailure {
    pub kind: AssetKind,
    pub reference: String,
    pub local_path: String,
    pub reason: String,
}

/// What was found and saved while mirroring one page. Empty unless the
/// fetched resource was HTML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageData {
    /// Raw `href` values of anchors, unresolved.
    pub links: Vec<String>,
    pub images: Vec<String>,
    pub stylesheets: Vec<String>,
    pub javascripts: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_assets: Vec<AssetFailure>,
}

impl PageData {
    pub fn assets_mut(&mut self, kind: AssetKind) -> &mut Vec<String> {
        match kind {
            AssetKind::Image => &mut self.images,
            AssetKind::Stylesheet => &mut self.stylesheets,
            AssetKind::Script => &mut self.javascripts,
        }
    }

    pub fn assets(&self, kind: AssetKind) -> &[String] {
        match kind {
            AssetKind::Image => &self.images,
            AssetKind::Stylesheet => &self.stylesheets,
            AssetKind::Script => &self.javascripts,
        }
    }

    pub fn saved_asset_count(&self) -> usize {
        self.images.len() + self.stylesheets.len() + self.javascripts.len()
    }
}
