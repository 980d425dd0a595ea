//! Transform policies and dispatch.
//!
//! A transform turns one breakpoint's [`TransformArgs`] into [`CdnParams`].
//! Six policies are built in; hosts can register their own under a name and
//! point a size entry's `callback` (or the configured default) at it.
//!
//! | Built-in | Emits |
//! |---|---|
//! | `top_down_crop` | `w`, `crop=0,0,100,{h}px` |
//! | `center_crop` | `w`, `crop=0,{offset}px,100,{h}px` |
//! | `custom_crop` | `w`, caller's crop region verbatim |
//! | `resize` | `resize={w},{h}` |
//! | `fit` | `fit={w},{h}` |
//! | `scale_by_width` | `w` |
//!
//! A target height of 0 leaves the height free, so the crop policies emit
//! no `crop` band. Built-ins pass through [`apply_conditional_args`] before
//! returning; custom transforms are trusted and returned verbatim.

use super::backend::MediaLibrary;
use super::calculations::center_crop_offset;
use super::params::{CdnParams, Crop, CropHeight, TransformArgs};
use crate::types::ImageRef;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// A transform name that matches neither a registered nor a built-in policy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no transform named `{0}`")]
pub struct TransformMiss(pub String);

/// Built-in transform policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinTransform {
    TopDownCrop,
    CenterCrop,
    CustomCrop,
    Resize,
    Fit,
    ScaleByWidth,
}

impl BuiltinTransform {
    pub const ALL: [BuiltinTransform; 6] = [
        BuiltinTransform::TopDownCrop,
        BuiltinTransform::CenterCrop,
        BuiltinTransform::CustomCrop,
        BuiltinTransform::Resize,
        BuiltinTransform::Fit,
        BuiltinTransform::ScaleByWidth,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BuiltinTransform::TopDownCrop => "top_down_crop",
            BuiltinTransform::CenterCrop => "center_crop",
            BuiltinTransform::CustomCrop => "custom_crop",
            BuiltinTransform::Resize => "resize",
            BuiltinTransform::Fit => "fit",
            BuiltinTransform::ScaleByWidth => "scale_by_width",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Run the policy. `None` when the args carry no target size at all.
    pub fn apply(self, args: &TransformArgs, library: &impl MediaLibrary) -> Option<CdnParams> {
        let target = TargetSize::from_args(args)?;
        let params = match self {
            BuiltinTransform::TopDownCrop => CdnParams {
                w: Some(target.width),
                crop: target.crop_height.map(|height| Crop::Band { top: 0, height }),
                ..Default::default()
            },
            BuiltinTransform::CenterCrop => {
                let top = match (target.crop_height, &args.image) {
                    (Some(CropHeight::Pixels(height)), ImageRef::Attachment(id)) => library
                        .natural_dimensions(*id)
                        .map(|natural| center_crop_offset(natural, target.width, height))
                        .unwrap_or(0),
                    _ => 0,
                };
                CdnParams {
                    w: Some(target.width),
                    crop: target.crop_height.map(|height| Crop::Band { top, height }),
                    ..Default::default()
                }
            }
            BuiltinTransform::CustomCrop => CdnParams {
                w: Some(target.width),
                crop: args.crop.region().map(|r| Crop::Region(r.to_string())),
                ..Default::default()
            },
            BuiltinTransform::Resize => CdnParams {
                resize: Some((target.width, target.height)),
                ..Default::default()
            },
            BuiltinTransform::Fit => CdnParams {
                fit: Some((target.width, target.height)),
                ..Default::default()
            },
            BuiltinTransform::ScaleByWidth => CdnParams {
                w: Some(target.width),
                ..Default::default()
            },
        };
        Some(apply_conditional_args(params, args))
    }
}

impl fmt::Display for BuiltinTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Target geometry shared by every built-in.
struct TargetSize {
    width: u32,
    height: u32,
    /// `None` when the height is free.
    crop_height: Option<CropHeight>,
}

impl TargetSize {
    fn from_args(args: &TransformArgs) -> Option<Self> {
        if args.width == 0 && args.height == 0 {
            return None;
        }
        let crop_height = if args.crop.is_disabled() {
            Some(CropHeight::Percent(100))
        } else if args.height == 0 {
            None
        } else {
            Some(CropHeight::Pixels(args.height))
        };
        Some(Self {
            width: args.width,
            height: args.height,
            crop_height,
        })
    }
}

/// Fold the per-breakpoint context into a built-in's output.
///
/// A quality from the args fills in when the transform set none. An explicit
/// `crop = false` always removes the `crop` parameter.
pub fn apply_conditional_args(mut params: CdnParams, args: &TransformArgs) -> CdnParams {
    if params.quality.is_none() {
        params.quality = args.quality;
    }
    if args.crop.is_disabled() {
        params.crop = None;
    }
    params
}

/// A host-supplied transform.
#[derive(Clone)]
pub struct CustomTransform(Arc<dyn Fn(&TransformArgs) -> CdnParams + Send + Sync>);

impl CustomTransform {
    pub fn new(f: impl Fn(&TransformArgs) -> CdnParams + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn call(&self, args: &TransformArgs) -> CdnParams {
        (self.0)(args)
    }
}

impl fmt::Debug for CustomTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomTransform(..)")
    }
}

/// A resolved transform, ready to run.
#[derive(Debug, Clone)]
pub enum Transform {
    Builtin(BuiltinTransform),
    Custom(CustomTransform),
}

impl Transform {
    pub fn apply(&self, args: &TransformArgs, library: &impl MediaLibrary) -> CdnParams {
        match self {
            Transform::Builtin(builtin) => builtin.apply(args, library).unwrap_or_default(),
            Transform::Custom(custom) => custom.call(args),
        }
    }
}

/// Named host transforms, consulted before the built-ins.
#[derive(Debug, Clone, Default)]
pub struct TransformRegistry {
    custom: BTreeMap<String, CustomTransform>,
}

impl TransformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transform, replacing any earlier one with the same name.
    /// A registered name shadows a built-in of the same name.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        f: impl Fn(&TransformArgs) -> CdnParams + Send + Sync + 'static,
    ) -> &mut Self {
        self.custom.insert(name.into(), CustomTransform::new(f));
        self
    }

    pub fn with(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&TransformArgs) -> CdnParams + Send + Sync + 'static,
    ) -> Self {
        self.register(name, f);
        self
    }

    pub fn get(&self, name: &str) -> Result<Transform, TransformMiss> {
        if let Some(custom) = self.custom.get(name) {
            return Ok(Transform::Custom(custom.clone()));
        }
        BuiltinTransform::from_name(name)
            .map(Transform::Builtin)
            .ok_or_else(|| TransformMiss(name.to_string()))
    }

    pub fn custom_names(&self) -> impl Iterator<Item = &str> {
        self.custom.keys().map(String::as_str)
    }
}

/// Pick and run the transform for one breakpoint.
///
/// 1. `args.callback`, when it names a registered or built-in transform.
/// 2. Otherwise `default_transform`.
/// 3. Center crop if even the default cannot be found.
///
/// Unknown names are logged and skipped, never surfaced.
pub fn resolve_transform(
    args: &TransformArgs,
    registry: &TransformRegistry,
    default_transform: &str,
    library: &impl MediaLibrary,
) -> CdnParams {
    let from_callback = args.callback.as_deref().and_then(|name| {
        registry
            .get(name)
            .inspect_err(|miss| {
                tracing::warn!(
                    breakpoint = %args.breakpoint,
                    image_size = %args.image_size,
                    %miss,
                    "Falling back to default transform"
                );
            })
            .ok()
    });

    let transform = from_callback.unwrap_or_else(|| {
        registry.get(default_transform).unwrap_or_else(|miss| {
            tracing::warn!(%miss, "Default transform missing, using center_crop");
            Transform::Builtin(BuiltinTransform::CenterCrop)
        })
    });

    transform.apply(args, library)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::backend::tests::MockLibrary;
    use crate::transform::params::{CropSetting, Quality};

    fn args(width: u32, height: u32) -> TransformArgs {
        TransformArgs {
            image: ImageRef::Attachment(1),
            breakpoint: "mobile".into(),
            image_size: "thumb".into(),
            width,
            height,
            crop: CropSetting::default(),
            quality: None,
            callback: None,
            default: false,
        }
    }

    fn landscape_library() -> MockLibrary {
        MockLibrary::new().with_attachment(1, "https://example.com/wide.jpg", 2000, 1000)
    }

    fn square_library() -> MockLibrary {
        MockLibrary::new().with_attachment(1, "https://example.com/square.jpg", 1000, 1000)
    }

    // =========================================================================
    // Built-in geometry
    // =========================================================================

    #[test]
    fn center_crop_short_image_keeps_everything() {
        let params = BuiltinTransform::CenterCrop
            .apply(&args(400, 225), &landscape_library())
            .unwrap();
        assert_eq!(params.w, Some(400));
        assert_eq!(
            params.crop,
            Some(Crop::Band {
                top: 0,
                height: CropHeight::Pixels(225),
            })
        );
    }

    #[test]
    fn center_crop_tall_image_is_centered() {
        let params = BuiltinTransform::CenterCrop
            .apply(&args(400, 225), &square_library())
            .unwrap();
        assert_eq!(
            params.crop,
            Some(Crop::Band {
                top: 87,
                height: CropHeight::Pixels(225),
            })
        );
    }

    #[test]
    fn center_crop_without_metadata_uses_zero_offset() {
        let params = BuiltinTransform::CenterCrop
            .apply(&args(400, 225), &MockLibrary::new())
            .unwrap();
        assert_eq!(
            params.crop,
            Some(Crop::Band {
                top: 0,
                height: CropHeight::Pixels(225),
            })
        );
    }

    #[test]
    fn center_crop_skips_lookup_for_urls() {
        let library = square_library();
        let mut a = args(400, 225);
        a.image = ImageRef::Url("https://elsewhere.test/x.jpg".into());
        BuiltinTransform::CenterCrop.apply(&a, &library).unwrap();
        assert!(library.get_lookups().is_empty());
    }

    #[test]
    fn top_down_crop_anchors_at_top() {
        let params = BuiltinTransform::TopDownCrop
            .apply(&args(640, 360), &square_library())
            .unwrap();
        assert_eq!(params.w, Some(640));
        assert_eq!(params.crop.unwrap().to_string(), "0,0,100,360px");
    }

    #[test]
    fn free_height_emits_no_crop_band() {
        for builtin in [BuiltinTransform::TopDownCrop, BuiltinTransform::CenterCrop] {
            let params = builtin.apply(&args(768, 0), &landscape_library()).unwrap();
            assert_eq!(
                params,
                CdnParams {
                    w: Some(768),
                    ..Default::default()
                }
            );
        }
    }

    #[test]
    fn custom_crop_passes_region_through() {
        let mut a = args(300, 300);
        a.crop = CropSetting::Region("120,40,800,800".into());
        let params = BuiltinTransform::CustomCrop
            .apply(&a, &MockLibrary::new())
            .unwrap();
        assert_eq!(params.w, Some(300));
        assert_eq!(params.crop, Some(Crop::Region("120,40,800,800".into())));
    }

    #[test]
    fn resize_emits_exact_target() {
        for (w, h) in [(400, 225), (100, 900), (1, 1)] {
            let params = BuiltinTransform::Resize
                .apply(&args(w, h), &landscape_library())
                .unwrap();
            assert_eq!(params.resize, Some((w, h)));
            assert_eq!(params.w, None);
        }
    }

    #[test]
    fn resize_ignores_disabled_crop_for_height() {
        let mut a = args(400, 300);
        a.crop = CropSetting::Flag(false);
        let params = BuiltinTransform::Resize
            .apply(&a, &MockLibrary::new())
            .unwrap();
        assert_eq!(params.resize, Some((400, 300)));
    }

    #[test]
    fn fit_emits_bounding_box() {
        let params = BuiltinTransform::Fit
            .apply(&args(500, 500), &MockLibrary::new())
            .unwrap();
        assert_eq!(params.fit, Some((500, 500)));
        assert_eq!(params.crop, None);
    }

    #[test]
    fn scale_by_width_emits_width_only() {
        let params = BuiltinTransform::ScaleByWidth
            .apply(&args(800, 450), &MockLibrary::new())
            .unwrap();
        assert_eq!(
            params,
            CdnParams {
                w: Some(800),
                ..Default::default()
            }
        );
    }

    #[test]
    fn zero_target_produces_nothing() {
        for builtin in BuiltinTransform::ALL {
            assert_eq!(builtin.apply(&args(0, 0), &MockLibrary::new()), None);
        }
    }

    // =========================================================================
    // Conditional args
    // =========================================================================

    #[test]
    fn quality_is_injected_when_missing() {
        let mut a = args(400, 225);
        a.quality = Some(Quality::new(75));
        let params = BuiltinTransform::ScaleByWidth
            .apply(&a, &MockLibrary::new())
            .unwrap();
        assert_eq!(params.quality, Some(Quality::new(75)));
    }

    #[test]
    fn existing_quality_is_kept() {
        let mut a = args(400, 225);
        a.quality = Some(Quality::new(75));
        let params = CdnParams {
            quality: Some(Quality::new(40)),
            ..Default::default()
        };
        assert_eq!(
            apply_conditional_args(params, &a).quality,
            Some(Quality::new(40))
        );
    }

    #[test]
    fn disabled_crop_strips_crop_param() {
        let mut a = args(400, 225);
        a.crop = CropSetting::Flag(false);
        for builtin in [BuiltinTransform::CenterCrop, BuiltinTransform::TopDownCrop] {
            let params = builtin.apply(&a, &square_library()).unwrap();
            assert_eq!(params.crop, None);
            assert_eq!(params.w, Some(400));
        }
    }

    // =========================================================================
    // Registry and dispatch
    // =========================================================================

    #[test]
    fn builtin_names_round_trip() {
        for builtin in BuiltinTransform::ALL {
            assert_eq!(BuiltinTransform::from_name(builtin.name()), Some(builtin));
        }
        assert_eq!(BuiltinTransform::from_name("centre_crop"), None);
    }

    #[test]
    fn registry_reports_unknown_names() {
        let registry = TransformRegistry::new();
        assert_eq!(
            registry.get("sepia").unwrap_err(),
            TransformMiss("sepia".into())
        );
        assert!(matches!(
            registry.get("fit"),
            Ok(Transform::Builtin(BuiltinTransform::Fit))
        ));
    }

    #[test]
    fn callback_selects_builtin() {
        let mut a = args(400, 300);
        a.callback = Some("resize".into());
        let params = resolve_transform(&a, &TransformRegistry::new(), "center_crop", &MockLibrary::new());
        assert_eq!(params.resize, Some((400, 300)));
    }

    #[test]
    fn registered_callback_is_returned_verbatim() {
        let registry = TransformRegistry::new().with("banner", |a: &TransformArgs| CdnParams {
            fit: Some((a.width, a.height / 2)),
            ..Default::default()
        });
        let mut a = args(1000, 400);
        a.callback = Some("banner".into());
        a.crop = CropSetting::Flag(false);
        a.quality = Some(Quality::new(60));
        let params = resolve_transform(&a, &registry, "center_crop", &MockLibrary::new());
        // No conditional args: quality is not injected for custom transforms.
        assert_eq!(
            params,
            CdnParams {
                fit: Some((1000, 200)),
                ..Default::default()
            }
        );
    }

    #[test]
    fn registered_name_shadows_builtin() {
        let registry = TransformRegistry::new().with("fit", |_: &TransformArgs| CdnParams {
            w: Some(1),
            ..Default::default()
        });
        let mut a = args(400, 300);
        a.callback = Some("fit".into());
        let params = resolve_transform(&a, &registry, "center_crop", &MockLibrary::new());
        assert_eq!(params.w, Some(1));
    }

    #[test]
    fn unknown_callback_falls_back_to_default() {
        let mut a = args(400, 300);
        a.callback = Some("does_not_exist".into());
        let params = resolve_transform(&a, &TransformRegistry::new(), "scale_by_width", &MockLibrary::new());
        assert_eq!(params.w, Some(400));
        assert_eq!(params.crop, None);
    }

    #[test]
    fn default_transform_can_be_custom() {
        let registry = TransformRegistry::new().with("house_style", |_: &TransformArgs| CdnParams {
            quality: Some(Quality::new(50)),
            ..Default::default()
        });
        let params = resolve_transform(&args(400, 300), &registry, "house_style", &MockLibrary::new());
        assert_eq!(params.quality, Some(Quality::new(50)));
    }

    #[test]
    fn missing_default_uses_center_crop() {
        let params = resolve_transform(&args(400, 225), &TransformRegistry::new(), "nope", &square_library());
        assert_eq!(params.crop.unwrap().to_string(), "0,87px,100,225px");
    }

    #[test]
    fn custom_names_are_listed() {
        let registry = TransformRegistry::new()
            .with("b", |_: &TransformArgs| CdnParams::default())
            .with("a", |_: &TransformArgs| CdnParams::default());
        assert_eq!(registry.custom_names().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
