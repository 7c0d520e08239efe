//! Image extraction from the XML document carried in an `mdat` body.
//!
//! The document is SMPTE-TT: a `tt` root declaring the `smpte` prefix, with
//! `smpte:image` elements holding base64 text. The prefix URI is read from
//! the document rather than hardcoded, then `image` elements are matched by
//! `(namespace URI, local name)`.

use crate::util::latin1_to_string;
use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use serde::Serialize;

/// The only encoding that produces descriptors.
pub const BASE64_ENCODING: &str = "Base64";

const ROOT_ELEMENT: &[u8] = b"tt";
const IMAGE_ELEMENT: &[u8] = b"image";
const NAMESPACE_ATTR: &[u8] = b"xmlns:smpte";
const ENCODING_ATTR: &[u8] = b"encoding";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageDescriptor {
    pub encoding: String,
    pub encoded_data: String,
}

/// Reasons a payload yields no images. None of them abort a walk.
#[derive(thiserror::Error, Debug)]
pub enum PayloadError {
    #[error("payload is not well-formed XML: {0}")]
    MalformedXml(String),
    #[error("payload has malformed attributes: {0}")]
    MalformedAttribute(#[from] quick_xml::events::attributes::AttrError),
    #[error("payload has no tt root element")]
    MissingRoot,
    #[error("tt root declares no xmlns:smpte namespace")]
    MissingNamespace,
}

impl From<quick_xml::Error> for PayloadError {
    fn from(e: quick_xml::Error) -> Self {
        PayloadError::MalformedXml(e.to_string())
    }
}

/// Parses `payload` and returns its Base64 images in document order.
///
/// The document element must be `tt`. Images with another encoding, or
/// whose first child is neither text nor CDATA, are skipped silently.
/// quick-xml does not check document structure, so depth is tracked here:
/// an unclosed element, a second top-level element or stray top-level text
/// make the whole payload malformed and nothing collected so far is kept.
pub fn extract_images(payload: &[u8]) -> Result<Vec<ImageDescriptor>, PayloadError> {
    let text = latin1_to_string(payload);
    let mut reader = NsReader::from_str(&text);

    let mut namespace: Option<String> = None;
    let mut seen_root = false;
    let mut depth = 0usize;
    // set while the next event decides whether a Base64 image has text
    let mut awaiting_text = false;
    let mut images = Vec::new();

    loop {
        let (ns, event) = reader.read_resolved_event()?;

        if awaiting_text {
            awaiting_text = false;
            let encoded_data = match &event {
                Event::Text(t) => Some(t.unescape()?.into_owned()),
                // the input is already decoded, so CDATA bytes are UTF-8
                Event::CData(c) => Some(String::from_utf8_lossy(c).into_owned()),
                _ => None,
            };
            if let Some(encoded_data) = encoded_data {
                images.push(ImageDescriptor {
                    encoding: BASE64_ENCODING.to_string(),
                    encoded_data,
                });
                continue;
            }
        }

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_start = matches!(event, Event::Start(_));
                if depth == 0 {
                    if seen_root {
                        return Err(PayloadError::MalformedXml(
                            "more than one top-level element".to_string(),
                        ));
                    }
                    if e.local_name().as_ref() != ROOT_ELEMENT {
                        return Err(PayloadError::MissingRoot);
                    }
                    seen_root = true;
                    namespace = Some(attr_value(e, NAMESPACE_ATTR)?.ok_or(PayloadError::MissingNamespace)?);
                    if is_start {
                        depth += 1;
                    }
                    continue;
                }
                if is_start {
                    depth += 1;
                }

                let Some(uri) = namespace.as_deref() else {
                    continue;
                };
                if e.local_name().as_ref() != IMAGE_ELEMENT
                    || ns != ResolveResult::Bound(Namespace(uri.as_bytes()))
                {
                    continue;
                }
                let encoding = attr_value(e, ENCODING_ATTR)?;
                if is_start && encoding.as_deref() == Some(BASE64_ENCODING) {
                    awaiting_text = true;
                }
            }
            Event::End(_) => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    PayloadError::MalformedXml("unmatched end tag".to_string())
                })?;
            }
            Event::Text(ref t) if depth == 0 && !t.iter().all(u8::is_ascii_whitespace) => {
                return Err(PayloadError::MalformedXml(
                    "text outside the root element".to_string(),
                ));
            }
            Event::CData(_) if depth == 0 => {
                return Err(PayloadError::MalformedXml(
                    "CDATA outside the root element".to_string(),
                ));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(PayloadError::MalformedXml(format!(
            "{depth} element(s) left unclosed"
        )));
    }
    if !seen_root {
        return Err(PayloadError::MissingRoot);
    }
    Ok(images)
}

/// Contained form of [`extract_images`]: logs why nothing was found and
/// returns an empty list instead of failing.
pub fn images_or_empty(payload: &[u8]) -> Vec<ImageDescriptor> {
    match extract_images(payload) {
        Ok(images) => images,
        Err(e @ (PayloadError::MissingRoot | PayloadError::MissingNamespace)) => {
            tracing::debug!("no image metadata in payload: {e}");
            Vec::new()
        }
        Err(e) => {
            tracing::warn!("skipping payload: {e}");
            Vec::new()
        }
    }
}

fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, PayloadError> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}
