//! Photon-style CDN URL builder.
//!
//! Photon-compatible services take the image location in the path and the
//! transform in the query string:
//!
//! ```text
//! https://cdn.example.com/uploads.example.com/2024/05/dawn.jpg?w=400&crop=0,0,100,225px
//! └──────── base ────────┘└────────── source host + path ────┘└──────── params ───────┘
//! ```
//!
//! Without a base URL the parameters are appended to the source URL itself,
//! which is how a CMS with an on-the-fly resizing endpoint is addressed.
//! Commas stay literal because Photon's `crop`, `resize` and `fit` values are
//! comma-separated lists. A source that does not parse as an absolute URL
//! is passed through untransformed.

use super::backend::CdnTransform;
use super::params::CdnParams;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use url::Url;

/// Characters escaped inside a query value.
const QUERY_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?');

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotonCdn {
    base_url: Option<String>,
}

impl PhotonCdn {
    /// Append parameters to the source URL as-is.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve every image through `base_url` (e.g. `https://i0.wp.com`).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into().trim_end_matches('/').to_string()),
        }
    }

    /// Move `source` onto the base URL, keeping host, path, query and
    /// fragment.
    fn rebase(&self, source: Url) -> Option<Url> {
        let Some(base) = &self.base_url else {
            return Some(source);
        };
        let host = source.host_str()?;
        let location = match source.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let mut rebased = Url::parse(&format!("{base}/{location}{}", source.path())).ok()?;
        rebased.set_query(source.query());
        rebased.set_fragment(source.fragment());
        Some(rebased)
    }
}

/// Parse an image URL; protocol-relative URLs are read as `https`.
fn parse_source(source_url: &str) -> Option<Url> {
    match source_url.strip_prefix("//") {
        Some(rest) => Url::parse(&format!("https://{rest}")).ok(),
        None => Url::parse(source_url).ok(),
    }
}

impl CdnTransform for PhotonCdn {
    fn transform(&self, source_url: &str, params: &CdnParams) -> String {
        let Some(mut url) = parse_source(source_url).and_then(|source| self.rebase(source)) else {
            tracing::warn!(url = source_url, "Unparseable image URL passed through untransformed");
            return source_url.to_string();
        };
        if !params.is_empty() {
            let added = params
                .query_pairs()
                .into_iter()
                .map(|(key, value)| format!("{key}={}", utf8_percent_encode(&value, QUERY_VALUE)))
                .collect::<Vec<_>>()
                .join("&");
            let query = match url.query() {
                Some(existing) if !existing.is_empty() => format!("{existing}&{added}"),
                _ => added,
            };
            url.set_query(Some(&query));
        }
        url.into()
    }
}
