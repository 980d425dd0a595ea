//! Browser-facing serialisation of an [`ImageObject`].
//!
//! | Output | Function |
//! |---|---|
//! | `srcset` attribute | [`srcset`]: `url Nw`, de-duplicated, in breakpoint order |
//! | `sizes` attribute | [`sizes`]: `(min-width: …) and (max-width: …) Npx`, plus a trailing `{max}px` |
//! | `<picture>` element | [`render_picture`]: one `<source>` per breakpoint and an `<img>` fallback |
//! | `<img>` element | [`render_img`]: `srcset`/`sizes`, or lazy-load `data-` attributes |
//! | Lo-fi placeholder | [`src_from_srcset`]: smallest candidate with `quality=1` |
//!
//! HTML is generated with Maud, so every attribute value is escaped.

use crate::breakpoints::Breakpoint;
use crate::sizes::SizeRequest;
use crate::types::{BreakpointImage, ImageObject, ImageSrc};
use maud::{Markup, html};
use url::Url;

/// Caller attributes for rendered elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageAttrs {
    pub alt: String,
    /// Extra classes, space separated.
    pub class: Option<String>,
    /// Emit lazy-load `data-` attributes and a lo-fi `src` instead of `srcset`.
    pub lazy: bool,
}

fn push_unique(list: &mut Vec<String>, item: String) {
    if !list.contains(&item) {
        list.push(item);
    }
}

/// The `srcset` attribute value.
pub fn srcset(object: &ImageObject) -> String {
    let mut candidates = Vec::new();
    for entry in &object.sizes {
        if entry.src.url.is_empty() {
            continue;
        }
        push_unique(&mut candidates, format!("{} {}w", entry.src.url, entry.src.width));
    }
    candidates.join(",")
}

/// The `sizes` attribute value.
///
/// Breakpoints without bounds contribute nothing; the widest entry closes
/// the list as an unconditional length.
pub fn sizes(object: &ImageObject) -> String {
    let mut lengths = Vec::new();
    for entry in &object.sizes {
        if let Some(condition) = entry.size.media_condition() {
            push_unique(&mut lengths, format!("{condition} {}px", entry.src.width));
        }
    }
    push_unique(&mut lengths, format!("{}px", object.max_width()));
    lengths.join(",")
}

/// `media` for a `<source>`: the breakpoint's condition, or `all`.
pub fn source_media(breakpoint: &Breakpoint) -> String {
    breakpoint
        .media_condition()
        .unwrap_or_else(|| "all".to_string())
}

/// `srcset` for a `<source>`: the 1x URL, plus the 2x URL when the
/// breakpoint asks for pixel density.
fn source_srcset(entry: &BreakpointImage) -> String {
    if entry.size.wants_2x() && !entry.src.url2x.is_empty() {
        format!("{}, {} 2x", entry.src.url, entry.src.url2x)
    } else {
        entry.src.url.clone()
    }
}

/// Caller classes followed by `image-{id}` (attachments only) and
/// `size-{size}`.
pub fn image_classes(class: Option<&str>, object: &ImageObject, size: &SizeRequest) -> String {
    let mut classes: Vec<String> = class
        .unwrap_or_default()
        .split_whitespace()
        .map(str::to_string)
        .collect();
    if object.id.parse::<u64>().is_ok() {
        classes.push(format!("image-{}", object.id));
    }
    classes.push(format!("size-{size}"));
    classes.join(" ")
}

fn nonzero(value: u32) -> Option<u32> {
    (value > 0).then_some(value)
}

/// `<picture>` with a `<source>` per breakpoint and `fallback` as `<img>`.
///
/// Lazy rendering skips the `<picture>` wrapper entirely and returns the
/// lazy `<img>`.
pub fn render_picture(
    object: &ImageObject,
    fallback: &ImageSrc,
    size: &SizeRequest,
    attrs: &ImageAttrs,
) -> Markup {
    if attrs.lazy {
        return render_img(object, fallback, size, attrs);
    }
    let classes = image_classes(attrs.class.as_deref(), object, size);
    html! {
        picture id=(format!("picture-{}", object.id)) class=(classes) data-id=(object.id) {
            @for entry in &object.sizes {
                source srcset=(source_srcset(entry)) media=(source_media(&entry.size));
            }
            img src=(fallback.url) srcset=(fallback.url) alt=(attrs.alt)
                width=[nonzero(fallback.width)] height=[nonzero(fallback.height)];
        }
    }
}

/// Standalone `<img>` carrying the whole object as `srcset`/`sizes`.
///
/// In lazy mode the candidates move to `data-srcset`, `data-sizes` is
/// `auto`, `data-src` is the first candidate and `src` is the lo-fi
/// placeholder. Both fall back to `fallback` when the object has no URLs.
pub fn render_img(
    object: &ImageObject,
    fallback: &ImageSrc,
    size: &SizeRequest,
    attrs: &ImageAttrs,
) -> Markup {
    let srcset = srcset(object);
    if attrs.lazy {
        let caller = match attrs.class.as_deref() {
            Some(class) => format!("{class} lazyload"),
            None => "lazyload".to_string(),
        };
        let classes = image_classes(Some(&caller), object, size);
        let data_src = src_from_srcset(&srcset, false).unwrap_or_else(|| fallback.url.clone());
        let src = src_from_srcset(&srcset, true).unwrap_or_else(|| fallback.url.clone());
        html! {
            img class=(classes) src=(src) data-src=(data_src)
                data-srcset=(srcset) data-sizes="auto" alt=(attrs.alt) draggable="false";
        }
    } else {
        let classes = image_classes(attrs.class.as_deref(), object, size);
        html! {
            img class=(classes) src=(fallback.url) srcset=(srcset) sizes=(sizes(object))
                alt=(attrs.alt) width=[nonzero(fallback.width)] height=[nonzero(fallback.height)]
                draggable="false";
        }
    }
}

/// One `url [descriptor]` candidate from a `srcset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate<'a> {
    pub url: &'a str,
    /// Width from a `Nw` descriptor.
    pub width: Option<u32>,
}

/// Split a `srcset` into candidates.
///
/// URLs run up to the next whitespace, so commas inside a URL (crop boxes)
/// are kept; a comma ends the descriptor list.
pub fn parse_srcset(srcset: &str) -> Vec<Candidate<'_>> {
    let mut candidates = Vec::new();
    let mut rest = srcset;
    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        if rest.is_empty() {
            break;
        }
        let url_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let (url, tail) = rest.split_at(url_end);
        if url.ends_with(',') {
            candidates.push(Candidate {
                url: url.trim_end_matches(','),
                width: None,
            });
            rest = tail;
            continue;
        }
        let descriptor_end = tail.find(',').unwrap_or(tail.len());
        let width = tail[..descriptor_end]
            .split_whitespace()
            .find_map(|d| d.strip_suffix('w')?.parse().ok());
        candidates.push(Candidate { url, width });
        rest = &tail[descriptor_end..];
    }
    candidates
}

/// Pick a single `src` out of a `srcset`.
///
/// Without `lofi`, the first width candidate. With `lofi`, the narrowest
/// one, re-requested at `quality=1` as a blurry placeholder.
pub fn src_from_srcset(srcset: &str, lofi: bool) -> Option<String> {
    let mut with_width = parse_srcset(srcset)
        .into_iter()
        .filter_map(|c| Some((c.url, c.width?)));
    if !lofi {
        return with_width.next().map(|(url, _)| url.to_string());
    }
    with_width
        .min_by_key(|&(_, width)| width)
        .map(|(url, _)| with_query_param(url, "quality", "1"))
}

/// Set `key=value` in `url`'s query string, replacing an existing value.
///
/// Other pairs are kept byte for byte so crop boxes keep their commas.
/// A URL that does not parse is returned unchanged.
pub fn with_query_param(url: &str, key: &str, value: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        tracing::debug!(url, key, "Unparseable URL left unchanged");
        return url.to_string();
    };
    let mut pairs: Vec<String> = parsed
        .query()
        .unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| pair.split('=').next() != Some(key))
        .map(str::to_string)
        .collect();
    pairs.push(format!("{key}={value}"));
    parsed.set_query(Some(&pairs.join("&")));
    parsed.into()
}
