//! CDN transform pipeline: geometry in, query parameters and URLs out.
//!
//! | Step | Function |
//! |---|---|
//! | **Pick policy** | [`resolve_transform`]: callback → configured default → center crop |
//! | **Geometry** | [`BuiltinTransform::apply`] + [`apply_conditional_args`] |
//! | **Dimension math** | [`constrain_dimensions`], [`center_crop_offset`] |
//! | **URL** | [`CdnTransform`] ([`PhotonCdn`] in production) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing a transform and its output
//! - **Backend**: [`MediaLibrary`] + [`CdnTransform`] collaborator traits
//! - **Operations**: Built-in policies, registry and dispatch
//! - **Photon**: The Photon query-string URL builder

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod photon;

pub use backend::{Attachment, CdnTransform, Dimensions, LookupMiss, MediaLibrary};
pub use calculations::{UNBOUNDED_HEIGHT, center_crop_offset, constrain_dimensions};
pub use operations::{
    BuiltinTransform, CustomTransform, Transform, TransformMiss, TransformRegistry,
    apply_conditional_args, resolve_transform,
};
pub use params::{CdnParams, Crop, CropHeight, CropSetting, Quality, TransformArgs};
pub use photon::PhotonCdn;
