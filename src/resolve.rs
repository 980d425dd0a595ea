//! Request resolution: (image, size) → [`ImageObject`].
//!
//! The [`Resolver`] owns the validated configuration tables and the two
//! collaborators. It is built once at startup and is read-only afterwards, so
//! a single instance can serve concurrent requests.
//!
//! ## Flow
//!
//! ```text
//! image + size
//!   → normalise size name          (unknown/empty/full → fallback size)
//!   → expand to TransformArgs      (one per breakpoint)
//!   → resolve_transform            (callback → default → center_crop)
//!   → URL pair                     (scaled URL from the library, else CDN)
//!   → ImageObject {id, sizes, args}
//! ```
//!
//! ## Expansion
//!
//! Named sizes from the size table emit one entry per configured breakpoint
//! of that size, in declared order. Anything else (raw dimensions, `full`,
//! names the table doesn't know) is sized per breakpoint: the requested
//! dimensions are scaled down to the breakpoint's resolved width with the
//! height left unbounded, and reported under the `full` size name.
//!
//! ## Misses
//!
//! Nothing in here fails a request. An attachment the library can't resolve
//! degrades to a 0x0 entry with empty URLs; a size entry naming an unknown
//! breakpoint is dropped; an unknown transform falls back to the default.
//! Each of these is logged at `warn`.

use crate::breakpoints::BreakpointTable;
use crate::config::{ConfigError, ResolverConfig};
use crate::sizes::{FULL_SIZE, ImageSizeTable, SizeRequest};
use crate::transform::{
    CdnParams, CdnTransform, CropSetting, Dimensions, MediaLibrary, Quality, TransformArgs,
    TransformRegistry, UNBOUNDED_HEIGHT, constrain_dimensions, resolve_transform,
};
use crate::types::{BreakpointImage, ImageObject, ImageRef, ImageSrc};
use std::collections::BTreeMap;

/// Source URL and natural size of the image a request is about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Source {
    url: String,
    dimensions: Dimensions,
}

/// Breakpoint-aware image resolver.
#[derive(Debug)]
pub struct Resolver<L, C> {
    config: ResolverConfig,
    breakpoints: BreakpointTable,
    sizes: ImageSizeTable,
    registry: TransformRegistry,
    library: L,
    cdn: C,
}

impl<L: MediaLibrary, C: CdnTransform> Resolver<L, C> {
    /// Build a resolver with only the built-in transforms.
    pub fn new(config: ResolverConfig, library: L, cdn: C) -> Result<Self, ConfigError> {
        Self::with_transforms(config, TransformRegistry::new(), library, cdn)
    }

    /// Build a resolver that also knows the host transforms in `registry`.
    ///
    /// Validates the config and checks that `default_transform` and
    /// `fallback_image_size` name something that exists. When no logical
    /// sizes are configured, the size table is guessed from the intermediate
    /// sizes.
    pub fn with_transforms(
        config: ResolverConfig,
        registry: TransformRegistry,
        library: L,
        cdn: C,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        registry
            .get(&config.default_transform)
            .map_err(|miss| ConfigError::Validation(format!("default_transform: {miss}")))?;

        let breakpoints = config.breakpoint_table();
        let sizes = if config.image_sizes.is_empty() {
            let guessed = ImageSizeTable::guess(&config.intermediate_sizes, &breakpoints);
            tracing::debug!(sizes = guessed.len(), "Guessed image sizes from intermediate sizes");
            guessed
        } else {
            ImageSizeTable::new(config.image_sizes.clone())
        };

        if config.fallback_image_size != FULL_SIZE && !sizes.contains(&config.fallback_image_size) {
            return Err(ConfigError::Validation(format!(
                "fallback_image_size `{}` is not a configured image size",
                config.fallback_image_size
            )));
        }

        Ok(Self {
            config,
            breakpoints,
            sizes,
            registry,
            library,
            cdn,
        })
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn breakpoints(&self) -> &BreakpointTable {
        &self.breakpoints
    }

    /// Configured or guessed logical sizes.
    pub fn sizes(&self) -> &ImageSizeTable {
        &self.sizes
    }

    pub fn registry(&self) -> &TransformRegistry {
        &self.registry
    }

    pub fn resolve_breakpoint_width(&self, breakpoint: &str) -> Option<u32> {
        self.breakpoints.resolve_width(breakpoint)
    }

    /// Per-breakpoint transform inputs for one request.
    ///
    /// `original` is only consulted for requests that are not a named entry
    /// of the size table.
    pub fn expand_logical_size(
        &self,
        image: &ImageRef,
        size: &SizeRequest,
        original: Dimensions,
    ) -> Vec<TransformArgs> {
        match size {
            SizeRequest::Named(name) => match self.sizes.get(name) {
                Some(image_size) => image_size
                    .breakpoints
                    .iter()
                    .filter(|entry| {
                        let known = self.breakpoints.get(&entry.breakpoint).is_some();
                        if !known {
                            tracing::warn!(
                                image_size = %name,
                                breakpoint = %entry.breakpoint,
                                "Skipping unknown breakpoint"
                            );
                        }
                        known
                    })
                    .map(|entry| TransformArgs {
                        image: image.clone(),
                        breakpoint: entry.breakpoint.clone(),
                        image_size: name.clone(),
                        width: entry.width,
                        height: entry.height,
                        crop: entry.crop.clone(),
                        quality: entry.quality.map(Quality::new),
                        callback: entry.callback.clone(),
                        default: entry.default,
                    })
                    .collect(),
                None => self.expand_dimensions(image, original),
            },
            SizeRequest::Dimensions(width, height) => {
                self.expand_dimensions(image, Dimensions::new(*width, *height))
            }
        }
    }

    /// Scale `requested` to every breakpoint's width, height unbounded.
    fn expand_dimensions(&self, image: &ImageRef, requested: Dimensions) -> Vec<TransformArgs> {
        self.breakpoints
            .iter()
            .map(|bp| {
                let max_width = self.breakpoints.resolve_width(&bp.name).unwrap_or(0);
                let max_height = bp.height.unwrap_or(UNBOUNDED_HEIGHT);
                let (width, height) = constrain_dimensions(
                    (requested.width, requested.height),
                    (max_width, max_height),
                );
                tracing::debug!(breakpoint = %bp.name, width, height, "Sized breakpoint");
                TransformArgs {
                    image: image.clone(),
                    breakpoint: bp.name.clone(),
                    image_size: FULL_SIZE.to_string(),
                    width,
                    height,
                    crop: bp.crop.map(CropSetting::Flag).unwrap_or_default(),
                    quality: bp.quality.map(Quality::new),
                    callback: None,
                    default: false,
                }
            })
            .collect()
    }

    /// Resolve an image object with no pass-through arguments.
    pub fn image_object(&self, image: &ImageRef, size: &SizeRequest) -> ImageObject {
        self.image_object_with_args(image, size, BTreeMap::new())
    }

    /// Resolve an image object, carrying `args` through untouched.
    pub fn image_object_with_args(
        &self,
        image: &ImageRef,
        size: &SizeRequest,
        args: BTreeMap<String, String>,
    ) -> ImageObject {
        let source = self.source(image);
        let size = size
            .clone()
            .normalize(&self.sizes, &self.config.fallback_image_size);

        let sizes = self
            .expand_logical_size(image, &size, source.dimensions)
            .into_iter()
            .filter_map(|transform_args| {
                let breakpoint = self.breakpoints.get(&transform_args.breakpoint)?;
                Some(BreakpointImage {
                    name: breakpoint.name.clone(),
                    size: breakpoint.clone(),
                    src: self.render_source(&source, &transform_args),
                })
            })
            .collect();

        ImageObject {
            id: match image {
                ImageRef::Attachment(id) => id.to_string(),
                ImageRef::Url(_) => self.config.external_url_slug.clone(),
            },
            sizes,
            args,
        }
    }

    /// Breakpoint → URL, in breakpoint order. A density above 1 picks the
    /// 2x URLs.
    pub fn breakpoint_urls(
        &self,
        image: &ImageRef,
        size: &SizeRequest,
        density: u32,
    ) -> Vec<(String, String)> {
        self.image_object(image, size)
            .sizes
            .into_iter()
            .map(|entry| {
                let url = if density > 1 { entry.src.url2x } else { entry.src.url };
                (entry.name, url)
            })
            .collect()
    }

    pub fn breakpoint_url(
        &self,
        image: &ImageRef,
        size: &SizeRequest,
        breakpoint: &str,
        density: u32,
    ) -> Option<String> {
        self.breakpoint_urls(image, size, density)
            .into_iter()
            .find(|(name, _)| name == breakpoint)
            .map(|(_, url)| url)
    }

    /// Source for a plain `<img>`.
    ///
    /// The default-marked breakpoint when the object has one, otherwise the
    /// untransformed image at its natural size.
    pub fn fallback_src(&self, image: &ImageRef, object: &ImageObject) -> ImageSrc {
        if let Some(src) = object.default_src() {
            return src.clone();
        }
        let source = self.source(image);
        ImageSrc {
            url2x: source.url.clone(),
            url: source.url,
            width: source.dimensions.width,
            height: source.dimensions.height,
            default: true,
        }
    }

    fn source(&self, image: &ImageRef) -> Source {
        match image {
            ImageRef::Attachment(id) => match self.library.attachment(*id) {
                Ok(attachment) => Source {
                    dimensions: attachment.dimensions(),
                    url: attachment.url,
                },
                Err(miss) => {
                    tracing::warn!(%miss, "Image lookup failed, using empty placeholder");
                    Source::default()
                }
            },
            ImageRef::Url(url) => Source {
                url: url.clone(),
                dimensions: Dimensions::default(),
            },
        }
    }

    fn render_source(&self, source: &Source, args: &TransformArgs) -> ImageSrc {
        let params = resolve_transform(
            args,
            &self.registry,
            &self.config.default_transform,
            &self.library,
        );
        let size = Dimensions::new(args.width, args.height);
        let (url, url2x) = if source.url.is_empty() {
            (String::new(), String::new())
        } else {
            (
                self.url_for(source, &args.image, size, &params),
                self.url_for(source, &args.image, size.doubled(), &params.doubled()),
            )
        };
        ImageSrc {
            url,
            url2x,
            width: args.width,
            height: args.height,
            default: args.default,
        }
    }

    fn url_for(&self, source: &Source, image: &ImageRef, size: Dimensions, params: &CdnParams) -> String {
        let scaled = match image {
            ImageRef::Attachment(id) if !self.config.bypass_downsize => {
                self.library.scaled_url(*id, size, params)
            }
            _ => None,
        };
        scaled.unwrap_or_else(|| self.cdn.transform(&source.url, params))
    }
}
