use std::ffi::OsStr;
use std::path::Path;

/// Returns the extension of the last path segment of `name`, which may be a
/// plain filename, a filesystem path or a URL.
///
/// Query strings and fragments are ignored, as is anything before the last
/// `/`, so `https://cdn.example.com/logo?v=1.2` has no extension while
/// `style.min.css#x` yields `css`. A trailing dot does not count as an
/// extension.
pub fn get_extension(name: &str) -> Option<&str> {
    let name = name.split(['?', '#']).next().unwrap_or(name);
    let segment = name.rsplit('/').next().unwrap_or(name);

    match segment.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => Some(ext),
        _ => None,
    }
}

/// A target is treated as an HTML page purely by its file extension. No
/// content sniffing or `Content-Type` inspection takes place here.
pub fn is_html_target(target: &Path) -> bool {
    target.extension() == Some(OsStr::new("html"))
}
