//! Shared types handed from the resolver to rendering code.
//!
//! An [`ImageObject`] is built fresh per request and owned by the caller.
//! Serialised as JSON it has the shape
//! `{id, sizes: {breakpoint: {size, src: {url, url2x, width, height, default}}}, args}`
//! with `sizes` in breakpoint declaration order.

use crate::breakpoints::Breakpoint;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The image a request is about: a library attachment or a bare URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageRef {
    Attachment(u64),
    Url(String),
}

impl FromStr for ImageRef {
    type Err = String;

    /// Digits parse as an attachment id; anything else non-empty is a URL.
    /// Attachment ids start at 1.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("image reference must not be empty".into());
        }
        match s.parse::<u64>() {
            Ok(0) => Err("attachment id must be non-zero".into()),
            Ok(id) => Ok(ImageRef::Attachment(id)),
            Err(_) => Ok(ImageRef::Url(s.to_string())),
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageRef::Attachment(id) => write!(f, "{id}"),
            ImageRef::Url(url) => f.write_str(url),
        }
    }
}

/// URLs and dimensions for one breakpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImageSrc {
    pub url: String,
    pub url2x: String,
    pub width: u32,
    pub height: u32,
    /// Whether this is the plain `<img>` fallback.
    pub default: bool,
}

/// One breakpoint's entry in an [`ImageObject`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakpointImage {
    #[serde(skip)]
    pub name: String,
    pub size: Breakpoint,
    pub src: ImageSrc,
}

/// Resolver output for one (image, size) request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageObject {
    /// Attachment id, or the external-URL slug for bare URLs.
    pub id: String,
    #[serde(serialize_with = "ordered_sizes")]
    pub sizes: Vec<BreakpointImage>,
    /// Caller-supplied pass-through arguments; serialised even when empty.
    pub args: BTreeMap<String, String>,
}

impl ImageObject {
    pub fn get(&self, breakpoint: &str) -> Option<&BreakpointImage> {
        self.sizes.iter().find(|s| s.name == breakpoint)
    }

    /// The breakpoint marked as `<img>` fallback, if any.
    pub fn default_src(&self) -> Option<&ImageSrc> {
        self.sizes.iter().map(|s| &s.src).find(|src| src.default)
    }

    pub fn max_width(&self) -> u32 {
        self.sizes.iter().map(|s| s.src.width).max().unwrap_or(0)
    }
}

/// Serialise `sizes` as a JSON object keyed by breakpoint, keeping order.
fn ordered_sizes<S: Serializer>(sizes: &[BreakpointImage], serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(sizes.len()))?;
    for entry in sizes {
        map.serialize_entry(&entry.name, entry)?;
    }
    map.end()
}
