//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every entity (breakpoint, image size) leads with its positional index and
//! name; dimensions, URLs and flags follow as indented context lines. This
//! keeps the output readable as an inventory of what the resolver will do.
//!
//! # Output Format
//!
//! ## Image object
//!
//! ```text
//! Image 42 (thumb)
//! 001 mobile (max-width: 640px)
//!     400x225
//!     1x: https://cdn.example/dawn.jpg?w=400&crop=0,0,100,225px
//!     2x: https://cdn.example/dawn.jpg?w=800&crop=0,0,100,450px
//! 002 desktop (min-width: 1040px) [default]
//!     800x450
//!     ...
//! ```
//!
//! ## Config check
//!
//! ```text
//! Breakpoints
//! 001 mobile (max-width: 640px) → 640px
//! 002 all (all) → unconstrained
//!
//! Image sizes (guessed)
//! 001 thumbnail (5 breakpoints)
//!     mobile 150x150
//!
//! Default transform: center_crop
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::breakpoints::{Breakpoint, BreakpointTable};
use crate::sizes::{ImageSizeTable, SizeRequest};
use crate::types::ImageObject;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `001 mobile (max-width: 640px)`, or `002 all (all)` without bounds.
fn breakpoint_header(index: usize, breakpoint: &Breakpoint) -> String {
    let media = breakpoint
        .media_condition()
        .unwrap_or_else(|| "(all)".to_string());
    format!("{} {} {}", format_index(index), breakpoint.name, media)
}

// ============================================================================
// Image objects
// ============================================================================

/// Format a resolved image object, one block per breakpoint.
pub fn format_image_object(object: &ImageObject, size: &SizeRequest) -> Vec<String> {
    let mut lines = vec![format!("Image {} ({})", object.id, size)];

    for (i, entry) in object.sizes.iter().enumerate() {
        let mut header = breakpoint_header(i + 1, &entry.size);
        if entry.src.default {
            header.push_str(" [default]");
        }
        lines.push(header);
        lines.push(format!("{}{}x{}", indent(1), entry.src.width, entry.src.height));
        if entry.src.url.is_empty() {
            lines.push(format!("{}(no source)", indent(1)));
        } else {
            lines.push(format!("{}1x: {}", indent(1), entry.src.url));
            lines.push(format!("{}2x: {}", indent(1), entry.src.url2x));
        }
    }

    if object.sizes.is_empty() {
        lines.push(format!("{}(no breakpoints)", indent(1)));
    }
    lines
}

pub fn print_image_object(object: &ImageObject, size: &SizeRequest) {
    for line in format_image_object(object, size) {
        println!("{}", line);
    }
}

/// Format `breakpoint: url` lines.
pub fn format_breakpoint_urls(urls: &[(String, String)]) -> Vec<String> {
    urls.iter()
        .map(|(breakpoint, url)| format!("{breakpoint}: {url}"))
        .collect()
}

pub fn print_breakpoint_urls(urls: &[(String, String)]) {
    for line in format_breakpoint_urls(urls) {
        println!("{}", line);
    }
}

// ============================================================================
// Config check
// ============================================================================

/// Format the validated breakpoint and size tables.
pub fn format_config_summary(
    breakpoints: &BreakpointTable,
    sizes: &ImageSizeTable,
    guessed: bool,
    default_transform: &str,
) -> Vec<String> {
    let mut lines = vec!["Breakpoints".to_string()];
    for (i, bp) in breakpoints.iter().enumerate() {
        let width = match breakpoints.resolve_width(&bp.name) {
            Some(px) => format!("{px}px"),
            None => "unconstrained".to_string(),
        };
        lines.push(format!("{} → {}", breakpoint_header(i + 1, bp), width));
    }

    lines.push(String::new());
    lines.push(if guessed {
        "Image sizes (guessed)".to_string()
    } else {
        "Image sizes".to_string()
    });
    for (i, size) in sizes.iter().enumerate() {
        lines.push(format!(
            "{} {} ({} breakpoints)",
            format_index(i + 1),
            size.name,
            size.breakpoints.len()
        ));
        for entry in &size.breakpoints {
            let mut line = format!(
                "{}{} {}x{}",
                indent(1),
                entry.breakpoint,
                entry.width,
                entry.height
            );
            if let Some(callback) = &entry.callback {
                line.push_str(&format!(" via {callback}"));
            }
            if entry.default {
                line.push_str(" [default]");
            }
            lines.push(line);
        }
    }
    if sizes.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }

    lines.push(String::new());
    lines.push(format!("Default transform: {default_transform}"));
    lines
}

pub fn print_config_summary(
    breakpoints: &BreakpointTable,
    sizes: &ImageSizeTable,
    guessed: bool,
    default_transform: &str,
) {
    for line in format_config_summary(breakpoints, sizes, guessed, default_transform) {
        println!("{}", line);
    }
}
