use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8, WINDOWS_1252, X_USER_DEFINED};

/// How far into the body a `<meta>` charset declaration is looked for.
const PRESCAN_LIMIT: usize = 1024;

/// Picks the encoding of an HTML body: byte order mark first, then the
/// `charset` parameter of the `Content-Type` header, then a `<meta>`
/// declaration near the top of the document, then UTF-8.
pub fn detect_encoding(content_type: Option<&str>, body: &[u8]) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(body) {
        return encoding;
    }

    content_type
        .and_then(|v| v.parse::<mime::Mime>().ok())
        .and_then(|m| {
            m.get_param(mime::CHARSET)
                .and_then(|c| Encoding::for_label(c.as_str().as_bytes()))
        })
        .or_else(|| meta_charset(body))
        .unwrap_or(UTF_8)
}

/// Body as text. Anything that cannot be decoded becomes U+FFFD.
pub fn decode<'a>(encoding: &'static Encoding, body: &'a [u8]) -> Cow<'a, str> {
    let (text, had_errors) = encoding.decode_with_bom_removal(body);
    if had_errors {
        tracing::debug!(encoding = encoding.name(), "replaced malformed byte sequences");
    }
    text
}

/// Text back in the page's own encoding, so its `<meta charset>` stays true.
/// Characters the encoding lacks are written as numeric character references.
pub fn encode<'a>(encoding: &'static Encoding, html: &'a str) -> Cow<'a, [u8]> {
    let (bytes, _, _) = encoding.output_encoding().encode(html);
    bytes
}

fn meta_charset(body: &[u8]) -> Option<&'static Encoding> {
    let head = body[..body.len().min(PRESCAN_LIMIT)].to_ascii_lowercase();
    let mut rest = &head[..];

    while let Some(start) = find(rest, b"<meta") {
        rest = &rest[start + 5..];
        let end = rest.iter().position(|&b| b == b'>').unwrap_or(rest.len());
        let tag = &rest[..end];
        rest = &rest[end..];

        let Some(at) = find(tag, b"charset=") else {
            continue;
        };
        let value = &tag[at + 8..];
        let value = match value.first() {
            Some(b'"') | Some(b'\'') => &value[1..],
            _ => value,
        };
        let label_end = value
            .iter()
            .position(|b| matches!(b, b'"' | b'\'' | b';' | b'/' | b' ' | b'\t' | b'\n' | b'\r'))
            .unwrap_or(value.len());

        if let Some(encoding) = Encoding::for_label(&value[..label_end]) {
            // A declaration in ASCII-compatible markup cannot mean UTF-16.
            return Some(if encoding == UTF_16LE || encoding == UTF_16BE {
                UTF_8
            } else if encoding == X_USER_DEFINED {
                WINDOWS_1252
            } else {
                encoding
            });
        }
    }
    None
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
