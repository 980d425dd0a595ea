//! # breakfit
//!
//! Breakpoint-aware responsive image resolution. Given an image and a logical
//! size, breakfit works out one target size per viewport breakpoint, runs a
//! crop/fit policy for each, and produces CDN transform URLs (1x and 2x) plus
//! the `srcset`/`sizes` and `<picture>` markup browsers consume.
//!
//! # Architecture: Resolve, Transform, Render
//!
//! ```text
//! 1. Resolve    image + size   →  TransformArgs per breakpoint  (breakpoint table, size table)
//! 2. Transform  TransformArgs  →  CdnParams → URL pair          (policy registry, CDN builder)
//! 3. Render     ImageObject    →  srcset / sizes / <picture>    (Maud)
//! ```
//!
//! The configuration tables are validated once at startup and are read-only
//! afterwards. Everything a single request needs is passed explicitly, so a
//! [`resolve::Resolver`] can be shared between threads.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `breakfit.toml` loading, validation, merging, and the stock config |
//! | [`breakpoints`] | Breakpoint table and breakpoint-width resolution |
//! | [`sizes`] | Logical image sizes, size requests, and guessing from host sizes |
//! | [`transform`] | Dimension math, transform policies, collaborator traits, Photon URLs |
//! | [`resolve`] | The [`resolve::Resolver`]: image objects, breakpoint URLs, fallback source |
//! | [`types`] | Output types (`ImageObject`, `ImageSrc`) and `ImageRef` |
//! | [`markup`] | `srcset`/`sizes` serialisation and `<picture>`/`<img>` rendering |
//! | [`library`] | JSON-file media library used by the CLI |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Collaborators Are Traits
//!
//! The attachment store and the CDN are never called directly. The resolver
//! takes a [`transform::MediaLibrary`] and a [`transform::CdnTransform`] at
//! construction; tests substitute recording mocks, the CLI uses
//! [`library::JsonLibrary`] and [`transform::PhotonCdn`].
//!
//! ## Transforms Are an Enum Plus a Registry
//!
//! The six built-in policies are variants of [`transform::BuiltinTransform`]
//! and dispatch exhaustively. Host policies are closures registered by name
//! in a [`transform::TransformRegistry`]; a size entry's `callback` picks
//! either kind by name, and unknown names fall back to the configured default.
//!
//! ## Always Render Something
//!
//! A bad config is fatal at startup. Everything after that degrades instead
//! of failing: unknown images become 0x0 placeholders, unknown breakpoints
//! are dropped, unknown transforms fall back. Each recovery is logged with
//! `tracing`.

pub mod breakpoints;
pub mod config;
pub mod library;
pub mod markup;
pub mod output;
pub mod resolve;
pub mod sizes;
pub mod transform;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
