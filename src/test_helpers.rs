//! Shared test utilities for the breakfit test suite.
//!
//! Provides a small standard configuration, a populated mock library, and a
//! resolver wired to both, so module tests exercise the same scenario.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let library = scenario_library();
//! let cdn = RecordingCdn::new();
//! let resolver = scenario_resolver(&library, &cdn);
//!
//! let object = resolver.image_object(&WIDE, &SizeRequest::Named("thumb".into()));
//! assert_eq!(find_src(&object, "mobile").width, 400);
//! ```

use crate::breakpoints::Breakpoint;
use crate::config::ResolverConfig;
use crate::resolve::Resolver;
use crate::sizes::{ImageSize, SizeEntry};
use crate::transform::CropSetting;
use crate::transform::backend::tests::{MockLibrary, RecordingCdn};
use crate::types::{ImageObject, ImageRef, ImageSrc};

/// 2000x1000 landscape attachment.
pub const WIDE: ImageRef = ImageRef::Attachment(1);
/// 1000x1000 square attachment.
pub const SQUARE: ImageRef = ImageRef::Attachment(2);

// =========================================================================
// Configuration
// =========================================================================

/// Breakpoints `mobile` (max 640), `tablet` (min 640), `desktop` (min 1040)
/// with two logical sizes:
///
/// ```text
/// thumb  mobile 400x225, desktop 800x450 (default)
/// hero   mobile 640x360 q75, tablet 1040x585 top_down_crop, desktop 1280x720 no crop
/// ```
pub fn scenario_config() -> ResolverConfig {
    let mut hero_mobile = SizeEntry::new("mobile", 640, 360);
    hero_mobile.quality = Some(75);
    let mut hero_tablet = SizeEntry::new("tablet", 1040, 585);
    hero_tablet.callback = Some("top_down_crop".into());
    let mut hero_desktop = SizeEntry::new("desktop", 1280, 720);
    hero_desktop.crop = CropSetting::Flag(false);

    let mut thumb_desktop = SizeEntry::new("desktop", 800, 450);
    thumb_desktop.default = true;

    ResolverConfig {
        breakpoints: vec![
            Breakpoint::new("mobile").with_max(640),
            Breakpoint::new("tablet").with_min(640),
            Breakpoint::new("desktop").with_min(1040),
        ],
        image_sizes: vec![
            ImageSize {
                name: "thumb".into(),
                breakpoints: vec![SizeEntry::new("mobile", 400, 225), thumb_desktop],
            },
            ImageSize {
                name: "hero".into(),
                breakpoints: vec![hero_mobile, hero_tablet, hero_desktop],
            },
        ],
        ..Default::default()
    }
}

/// Library holding [`WIDE`] and [`SQUARE`].
pub fn scenario_library() -> MockLibrary {
    MockLibrary::new()
        .with_attachment(1, "https://example.com/wide.jpg", 2000, 1000)
        .with_attachment(2, "https://example.com/square.jpg", 1000, 1000)
}

pub fn scenario_resolver<'a>(
    library: &'a MockLibrary,
    cdn: &'a RecordingCdn,
) -> Resolver<&'a MockLibrary, &'a RecordingCdn> {
    Resolver::new(scenario_config(), library, cdn).unwrap()
}

// =========================================================================
// Lookups, panicking with a clear message on miss
// =========================================================================

/// Find a breakpoint's src in an image object. Panics if not found.
pub fn find_src<'a>(object: &'a ImageObject, breakpoint: &str) -> &'a ImageSrc {
    object
        .get(breakpoint)
        .map(|entry| &entry.src)
        .unwrap_or_else(|| {
            let names: Vec<&str> = object.sizes.iter().map(|s| s.name.as_str()).collect();
            panic!("breakpoint '{breakpoint}' not found. Available: {names:?}")
        })
}

/// Breakpoint names of an image object, in order.
pub fn breakpoint_names(object: &ImageObject) -> Vec<&str> {
    object.sizes.iter().map(|s| s.name.as_str()).collect()
}
