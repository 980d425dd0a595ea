//! Collaborator traits and shared types.
//!
//! The resolver never talks to a CMS or a CDN directly. It goes through two
//! narrow capabilities handed to it at construction:
//!
//! - [`MediaLibrary`]: attachment id → source URL and natural dimensions, plus
//!   an optional pre-rendered scaled URL from the host's own resizing layer.
//! - [`CdnTransform`]: source URL + [`CdnParams`] → transformed URL.
//!
//! The production URL builder is [`PhotonCdn`](super::photon::PhotonCdn); the
//! production library used by the CLI is
//! [`JsonLibrary`](crate::library::JsonLibrary). Tests use the recording
//! mocks in [`tests`].

use super::params::CdnParams;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An image id or URL with no resolvable metadata.
///
/// Always recovered locally: the resolver logs it and degrades to 0×0
/// dimensions rather than failing the request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupMiss {
    #[error("no attachment with id {0}")]
    UnknownAttachment(u64),
    #[error("attachment {0} has no source URL")]
    MissingUrl(u64),
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_zero(self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn doubled(self) -> Self {
        Self {
            width: self.width.saturating_mul(2),
            height: self.height.saturating_mul(2),
        }
    }
}

/// What the host CMS knows about an uploaded image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub url: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

impl Attachment {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }
}

/// Read access to the host's attachment store.
pub trait MediaLibrary: Sync {
    /// Look up an attachment by id.
    fn attachment(&self, id: u64) -> Result<Attachment, LookupMiss>;

    /// Natural (uploaded) dimensions, or `None` when unknown or zero.
    fn natural_dimensions(&self, id: u64) -> Option<Dimensions> {
        self.attachment(id)
            .ok()
            .map(|a| a.dimensions())
            .filter(|d| !d.is_zero())
    }

    /// A URL already scaled to `size` by the host's own resizing layer.
    ///
    /// `params` are the transform parameters computed for this breakpoint so
    /// the host can apply the same geometry. Hosts without such a layer keep
    /// the default, which makes the resolver call the CDN transform directly.
    fn scaled_url(&self, _id: u64, _size: Dimensions, _params: &CdnParams) -> Option<String> {
        None
    }
}

impl<T: MediaLibrary + ?Sized> MediaLibrary for &T {
    fn attachment(&self, id: u64) -> Result<Attachment, LookupMiss> {
        (**self).attachment(id)
    }

    fn natural_dimensions(&self, id: u64) -> Option<Dimensions> {
        (**self).natural_dimensions(id)
    }

    fn scaled_url(&self, id: u64, size: Dimensions, params: &CdnParams) -> Option<String> {
        (**self).scaled_url(id, size, params)
    }
}

/// The CDN image-resizing service, reduced to its URL contract.
pub trait CdnTransform: Sync {
    fn transform(&self, source_url: &str, params: &CdnParams) -> String;
}

impl<T: CdnTransform + ?Sized> CdnTransform for &T {
    fn transform(&self, source_url: &str, params: &CdnParams) -> String {
        (**self).transform(source_url, params)
    }
}
