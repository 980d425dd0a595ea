//! Logical image sizes.
//!
//! A logical size such as `featured-full` maps breakpoint names to fixed
//! target dimensions. Sizes are declared in config:
//!
//! ```toml
//! [[image_sizes]]
//! name = "thumb"
//!
//! [[image_sizes.breakpoints]]
//! breakpoint = "mobile"
//! width = 400
//! height = 225
//! quality = 70
//!
//! [[image_sizes.breakpoints]]
//! breakpoint = "desktop"
//! width = 800
//! height = 450
//! callback = "top_down_crop"
//! default = true
//! ```
//!
//! When no sizes are declared at all, a table is guessed from the host's
//! registered intermediate sizes: every (size, breakpoint) pair gets the
//! intermediate size scaled down to the breakpoint width, with the height
//! left free. Breakpoints without a width are skipped.

use crate::breakpoints::BreakpointTable;
use crate::transform::{CropSetting, constrain_dimensions};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of the pseudo-size that always means "natural dimensions".
pub const FULL_SIZE: &str = "full";

/// One breakpoint's target within a logical size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SizeEntry {
    pub breakpoint: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub crop: CropSetting,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<u32>,
    /// Transform to use instead of the configured default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub default: bool,
}

impl SizeEntry {
    pub fn new(breakpoint: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            breakpoint: breakpoint.into(),
            width,
            height,
            crop: CropSetting::default(),
            quality: None,
            callback: None,
            default: false,
        }
    }
}

/// A named logical size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageSize {
    pub name: String,
    #[serde(default)]
    pub breakpoints: Vec<SizeEntry>,
}

/// A size the host CMS already knows about (`thumbnail`, `medium`, ...).
///
/// A height of 0 means the height is free.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IntermediateSize {
    pub name: String,
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

/// All logical sizes, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSizeTable {
    sizes: Vec<ImageSize>,
}

impl ImageSizeTable {
    pub fn new(sizes: Vec<ImageSize>) -> Self {
        Self { sizes }
    }

    /// Derive a table from the host's intermediate sizes.
    pub fn guess(intermediate: &[IntermediateSize], breakpoints: &BreakpointTable) -> Self {
        let sizes = intermediate
            .iter()
            .map(|size| {
                let entries = breakpoints
                    .iter()
                    .filter_map(|bp| {
                        let bp_width = breakpoints.resolve_width(&bp.name)?;
                        let (width, height) =
                            constrain_dimensions((size.width, size.height), (bp_width, size.height));
                        Some(SizeEntry::new(bp.name.clone(), width, height))
                    })
                    .collect();
                ImageSize {
                    name: size.name.clone(),
                    breakpoints: entries,
                }
            })
            .filter(|size| !size.breakpoints.is_empty())
            .collect();
        Self { sizes }
    }

    pub fn get(&self, name: &str) -> Option<&ImageSize> {
        self.sizes.iter().find(|s| s.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageSize> {
        self.sizes.iter()
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

/// What a caller asked for: a logical size name or raw dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizeRequest {
    Named(String),
    Dimensions(u32, u32),
}

impl SizeRequest {
    pub fn full() -> Self {
        SizeRequest::Named(FULL_SIZE.to_string())
    }

    pub fn is_full(&self) -> bool {
        matches!(self, SizeRequest::Named(name) if name == FULL_SIZE)
    }

    /// Replace names that cannot be served with `fallback`.
    ///
    /// Empty names, unregistered names, `full` and `post-thumbnail` all fall
    /// back. Dimension requests pass through untouched.
    pub fn normalize(self, table: &ImageSizeTable, fallback: &str) -> Self {
        match self {
            SizeRequest::Named(name)
                if name.is_empty()
                    || name == FULL_SIZE
                    || name == "post-thumbnail"
                    || !table.contains(&name) =>
            {
                SizeRequest::Named(fallback.to_string())
            }
            other => other,
        }
    }
}

impl Default for SizeRequest {
    fn default() -> Self {
        SizeRequest::full()
    }
}

impl FromStr for SizeRequest {
    type Err = std::convert::Infallible;

    /// `640x480` parses as dimensions; everything else is a name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let dims = s
            .split_once(['x', 'X'])
            .and_then(|(w, h)| Some((w.parse().ok()?, h.parse().ok()?)));
        Ok(match dims {
            Some((w, h)) => SizeRequest::Dimensions(w, h),
            None => SizeRequest::Named(s.to_string()),
        })
    }
}

impl fmt::Display for SizeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeRequest::Named(name) => f.write_str(name),
            SizeRequest::Dimensions(w, h) => write!(f, "{w}x{h}"),
        }
    }
}
