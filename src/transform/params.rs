//! Parameter types for CDN transforms.
//!
//! These structs describe *what* the CDN should do, not *how* the URL is
//! built. They sit between the [`operations`](super::operations) module
//! (which decides crop geometry for one breakpoint) and the
//! [`backend`](super::backend) (which turns parameters into a URL). Keeping
//! them separate lets tests swap the URL builder without touching geometry.
//!
//! ## Types
//!
//! - [`Quality`]: CDN compression quality (1-100), clamped on construction.
//! - [`CropSetting`]: per-size crop directive, a flag or an explicit region.
//! - [`Crop`] / [`CropHeight`]: the `crop` query parameter a transform emits.
//! - [`CdnParams`]: the full parameter set handed to the CDN, with 2x doubling.
//! - [`TransformArgs`]: one breakpoint's worth of input to a transform.

use crate::types::ImageRef;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Quality setting for CDN re-encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

/// Crop directive attached to an image size or breakpoint.
///
/// In config files this is written as `crop = true`, `crop = false`, or
/// `crop = "x,y,w,h"` for a hand-picked region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CropSetting {
    Flag(bool),
    Region(String),
}

impl CropSetting {
    /// True only for an explicit `crop = false`.
    pub fn is_disabled(&self) -> bool {
        matches!(self, CropSetting::Flag(false))
    }

    pub fn region(&self) -> Option<&str> {
        match self {
            CropSetting::Region(region) => Some(region),
            CropSetting::Flag(_) => None,
        }
    }
}

impl Default for CropSetting {
    fn default() -> Self {
        CropSetting::Flag(true)
    }
}

/// Height component of a crop band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropHeight {
    /// Exact height in pixels (`225px`).
    Pixels(u32),
    /// Percentage of the source height (`100` keeps everything).
    Percent(u32),
}

impl fmt::Display for CropHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CropHeight::Pixels(px) => write!(f, "{px}px"),
            CropHeight::Percent(pct) => write!(f, "{pct}"),
        }
    }
}

/// The `crop` query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Crop {
    /// Full-width band starting `top` pixels below the top edge.
    Band { top: u32, height: CropHeight },
    /// Caller-supplied `x,y,w,h` string, passed through untouched.
    Region(String),
}

impl fmt::Display for Crop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Crop::Band { top: 0, height } => write!(f, "0,0,100,{height}"),
            Crop::Band { top, height } => write!(f, "0,{top}px,100,{height}"),
            Crop::Region(region) => f.write_str(region),
        }
    }
}

/// Query parameters understood by the CDN.
///
/// Field names follow the Photon query-string contract: `w`, `h`, `crop`,
/// `resize`, `fit`, `quality`. An empty set means "serve the source as is".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CdnParams {
    pub w: Option<u32>,
    pub h: Option<u32>,
    pub crop: Option<Crop>,
    /// Exact `width,height` output, aspect ratio ignored.
    pub resize: Option<(u32, u32)>,
    /// Bounding `width,height` box, aspect ratio kept, never cropped.
    pub fit: Option<(u32, u32)>,
    pub quality: Option<Quality>,
}

impl CdnParams {
    pub fn is_empty(&self) -> bool {
        self == &CdnParams::default()
    }

    /// Parameters for the 2x pixel-density variant.
    ///
    /// Only width/height-bearing values double. Crop offsets, custom crop
    /// regions and quality are carried over unchanged.
    pub fn doubled(&self) -> Self {
        let double = |v: u32| v.saturating_mul(2);
        let crop = self.crop.clone().map(|crop| match crop {
            Crop::Band {
                top,
                height: CropHeight::Pixels(px),
            } => Crop::Band {
                top,
                height: CropHeight::Pixels(double(px)),
            },
            other => other,
        });
        Self {
            w: self.w.map(double),
            h: self.h.map(double),
            crop,
            resize: self.resize.map(|(w, h)| (double(w), double(h))),
            fit: self.fit.map(|(w, h)| (double(w), double(h))),
            quality: self.quality,
        }
    }

    /// Key/value pairs in canonical query-string order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(w) = self.w {
            pairs.push(("w", w.to_string()));
        }
        if let Some(h) = self.h {
            pairs.push(("h", h.to_string()));
        }
        if let Some(crop) = &self.crop {
            pairs.push(("crop", crop.to_string()));
        }
        if let Some((w, h)) = self.resize {
            pairs.push(("resize", format!("{w},{h}")));
        }
        if let Some((w, h)) = self.fit {
            pairs.push(("fit", format!("{w},{h}")));
        }
        if let Some(quality) = self.quality {
            pairs.push(("quality", quality.value().to_string()));
        }
        pairs
    }
}

/// Input to exactly one transform invocation.
///
/// Built by the resolver for a single breakpoint, consumed synchronously by
/// the pipeline and then dropped. Nothing here outlives the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformArgs {
    pub image: ImageRef,
    pub breakpoint: String,
    /// Logical size name, or `full` for dimension-derived sizes.
    pub image_size: String,
    pub width: u32,
    pub height: u32,
    pub crop: CropSetting,
    pub quality: Option<Quality>,
    /// Named transform overriding the configured default.
    pub callback: Option<String>,
    /// Marks the breakpoint used for the plain `<img>` fallback.
    pub default: bool,
}
