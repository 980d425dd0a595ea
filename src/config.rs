//! Resolver configuration.
//!
//! Handles loading, validating, and merging `breakfit.toml` files. Stock
//! defaults are overridden by a user config file; any key not given keeps its
//! default. The result is validated once, at startup, and is read-only
//! afterwards: a bad config is a fatal error, never a silent downgrade.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! base_unit_pixel = 16              # px per em when sizing em breakpoints
//! default_transform = "center_crop" # transform used when a size names none
//! bypass_downsize = false           # always build URLs with the CDN directly
//! fallback_image_size = "full"      # size used for unknown/empty size names
//! external_url_slug = "external_url"
//!
//! [[breakpoints]]
//! name = "mobile"
//! max = 640
//!
//! [[breakpoints]]
//! name = "tablet"
//! min = 640
//!
//! [[image_sizes]]
//! name = "thumb"
//! [[image_sizes.breakpoints]]
//! breakpoint = "mobile"
//! width = 400
//! height = 225
//!
//! [[intermediate_sizes]]            # host sizes used when image_sizes is empty
//! name = "thumbnail"
//! width = 150
//! height = 150
//! ```
//!
//! Arrays replace their defaults wholesale: a config that declares
//! `[[breakpoints]]` declares all of them. Unknown keys are rejected to catch
//! typos early.

use crate::breakpoints::{Breakpoint, BreakpointTable};
use crate::sizes::{FULL_SIZE, ImageSize, IntermediateSize};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Resolver configuration loaded from `breakfit.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    /// Pixels per `em` for breakpoints declared in em.
    pub base_unit_pixel: u32,
    /// Transform used when a size entry has no callback.
    pub default_transform: String,
    /// Skip the media library's scaled-URL layer and always call the CDN.
    pub bypass_downsize: bool,
    /// Size used in place of empty, unknown, `full` or `post-thumbnail` names.
    pub fallback_image_size: String,
    /// Id reported for images addressed by URL rather than attachment id.
    pub external_url_slug: String,
    /// Viewport ranges, in the order they are emitted.
    pub breakpoints: Vec<Breakpoint>,
    /// Logical sizes. When empty, a table is guessed from `intermediate_sizes`.
    pub image_sizes: Vec<ImageSize>,
    /// Sizes the host CMS registers natively.
    pub intermediate_sizes: Vec<IntermediateSize>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            base_unit_pixel: 16,
            default_transform: "center_crop".to_string(),
            bypass_downsize: false,
            fallback_image_size: FULL_SIZE.to_string(),
            external_url_slug: "external_url".to_string(),
            breakpoints: default_breakpoints(),
            image_sizes: Vec::new(),
            intermediate_sizes: default_intermediate_sizes(),
        }
    }
}

fn default_breakpoints() -> Vec<Breakpoint> {
    vec![
        Breakpoint::new("mobile").with_max(640),
        Breakpoint::new("mini-tablet").with_min(640),
        Breakpoint::new("tablet").with_min(800),
        Breakpoint::new("desktop").with_min(1040),
        Breakpoint::new("hd-desktop").with_min(1280),
        Breakpoint::new("all").with_min(0),
    ]
}

fn default_intermediate_sizes() -> Vec<IntermediateSize> {
    [
        ("thumbnail", 150, 150),
        ("medium", 300, 300),
        ("medium_large", 768, 0),
        ("large", 1024, 1024),
    ]
    .into_iter()
    .map(|(name, width, height)| IntermediateSize {
        name: name.to_string(),
        width,
        height,
    })
    .collect()
}

fn check_quality(quality: Option<u32>, context: &str) -> Result<(), ConfigError> {
    match quality {
        Some(q) if q == 0 || q > 100 => Err(ConfigError::Validation(format!(
            "{context}: quality must be 1-100"
        ))),
        _ => Ok(()),
    }
}

impl ResolverConfig {
    /// Validate the breakpoint and size tables.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_unit_pixel == 0 {
            return Err(ConfigError::Validation(
                "base_unit_pixel must be non-zero".into(),
            ));
        }
        if self.default_transform.is_empty() {
            return Err(ConfigError::Validation(
                "default_transform must not be empty".into(),
            ));
        }
        if self.breakpoints.is_empty() {
            return Err(ConfigError::Validation(
                "breakpoints must not be empty".into(),
            ));
        }

        let mut names = BTreeSet::new();
        for bp in &self.breakpoints {
            if bp.name.is_empty() {
                return Err(ConfigError::Validation(
                    "breakpoint names must not be empty".into(),
                ));
            }
            if !names.insert(bp.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate breakpoint `{}`",
                    bp.name
                )));
            }
            if !bp.is_bounded() {
                return Err(ConfigError::Validation(format!(
                    "breakpoint `{}` needs at least one of min, max or width",
                    bp.name
                )));
            }
            check_quality(bp.quality, &format!("breakpoint `{}`", bp.name))?;
        }

        let mut size_names = BTreeSet::new();
        for size in &self.image_sizes {
            if size.name.is_empty() {
                return Err(ConfigError::Validation(
                    "image size names must not be empty".into(),
                ));
            }
            if !size_names.insert(size.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate image size `{}`",
                    size.name
                )));
            }
            for entry in &size.breakpoints {
                let context = format!("image size `{}` at `{}`", size.name, entry.breakpoint);
                if entry.width == 0 {
                    return Err(ConfigError::Validation(format!("{context}: width is required")));
                }
                check_quality(entry.quality, &context)?;
            }
            if size.breakpoints.iter().filter(|e| e.default).count() > 1 {
                return Err(ConfigError::Validation(format!(
                    "image size `{}` marks more than one default breakpoint",
                    size.name
                )));
            }
        }

        for size in &self.intermediate_sizes {
            if size.width == 0 {
                return Err(ConfigError::Validation(format!(
                    "intermediate size `{}` needs a width",
                    size.name
                )));
            }
        }
        Ok(())
    }

    pub fn breakpoint_table(&self) -> BreakpointTable {
        BreakpointTable::new(self.breakpoints.clone(), self.base_unit_pixel)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(ResolverConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge overlays onto a base value in order, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlays: impl IntoIterator<Item = toml::Value>,
) -> Result<ResolverConfig, ConfigError> {
    let merged = overlays.into_iter().fold(base, merge_toml);
    let config: ResolverConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path` on top of the stock defaults.
///
/// A missing file yields the defaults. Unknown keys are rejected and the
/// result is validated.
pub fn load_config(path: &Path) -> Result<ResolverConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    let config = resolve_config(base, overlay)?;
    tracing::debug!(
        path = %path.display(),
        breakpoints = config.breakpoints.len(),
        image_sizes = config.image_sizes.len(),
        "Loaded config"
    );
    Ok(config)
}

/// Returns a fully-commented stock `breakfit.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# breakfit configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Arrays ([[breakpoints]], [[image_sizes]], [[intermediate_sizes]]) replace
# the defaults wholesale: declare all entries if you declare any.
# Unknown keys will cause an error.

# Pixels per em, used to size breakpoints declared with unit = "em".
base_unit_pixel = 16

# Transform applied when an image size entry names no callback.
# Built-ins: center_crop, top_down_crop, custom_crop, resize, fit, scale_by_width.
default_transform = "center_crop"

# Always build URLs through the CDN transform, skipping the media library's
# own pre-scaled URLs.
bypass_downsize = false

# Size used when a request names no size, an unknown size, "full" or
# "post-thumbnail". "full" means the image's natural dimensions.
fallback_image_size = "full"

# Id reported for images addressed by URL instead of attachment id.
external_url_slug = "external_url"

# ---------------------------------------------------------------------------
# Breakpoints
# ---------------------------------------------------------------------------
# name    - key used by image sizes
# min/max - viewport bounds; at least one of min, max or width is required
# unit    - "px" (default) or "em"
# width   - explicit image width for this range
# height, crop, quality - used when sizing raw dimensions
# pixel_density - add a 2x candidate to <picture> sources when above 1
#
# Widths are guessed as: width, else max, else the next larger min.

[[breakpoints]]
name = "mobile"
max = 640

[[breakpoints]]
name = "mini-tablet"
min = 640

[[breakpoints]]
name = "tablet"
min = 800

[[breakpoints]]
name = "desktop"
min = 1040

[[breakpoints]]
name = "hd-desktop"
min = 1280

[[breakpoints]]
name = "all"
min = 0

# ---------------------------------------------------------------------------
# Image sizes
# ---------------------------------------------------------------------------
# None by default, so sizes are guessed from the intermediate sizes below.
#
# [[image_sizes]]
# name = "thumb"
#
# [[image_sizes.breakpoints]]
# breakpoint = "mobile"
# width = 400
# height = 225
# crop = true            # true, false, or an "x,y,w,h" region for custom_crop
# quality = 70           # 1-100; leave unset for the CDN default
# callback = "top_down_crop"
# default = true         # at most one per size: the plain <img> fallback

# ---------------------------------------------------------------------------
# Host CMS sizes (used only when no image_sizes are declared)
# ---------------------------------------------------------------------------
[[intermediate_sizes]]
name = "thumbnail"
width = 150
height = 150

[[intermediate_sizes]]
name = "medium"
width = 300
height = 300

[[intermediate_sizes]]
name = "medium_large"
width = 768
height = 0

[[intermediate_sizes]]
name = "large"
width = 1024
height = 1024
"##
}
