//! Breakpoint table and breakpoint-width resolution.
//!
//! A breakpoint is a named viewport range. Each one needs a single pixel
//! width to size images against, picked in this order:
//!
//! 1. an explicit `width`;
//! 2. the `max` bound;
//! 3. for lower-bound-only breakpoints, the **next larger** configured `min`.
//!
//! Rule 3 picks the smallest image that is still wide enough for every
//! viewport in the range: a `min = 640` tier ends where the next tier
//! begins, so that is the width it must cover. The widest tier has no
//! successor and falls back to its own `min`.
//!
//! `em` breakpoints are multiplied by the configured base unit pixel size.
//! A resolved width of zero (e.g. a catch-all `min = 0`) counts as "no
//! width constraint".
//!
//! ```text
//! mobile   max 640   → 640
//! tablet   min 640   → 1040   (next min)
//! desktop  min 1040  → 1040   (widest tier)
//! all      min 0     → none
//! ```

use serde::{Deserialize, Serialize};

/// CSS length unit of a breakpoint's bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Px,
    Em,
}

impl Unit {
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Px => "px",
            Unit::Em => "em",
        }
    }
}

/// A named viewport condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Breakpoint {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
    #[serde(default, skip_serializing_if = "is_px")]
    pub unit: Unit,
    /// Explicit image width for this range, overriding min/max guessing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Height bound for dimension-derived sizes (unbounded when absent).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Crop flag for dimension-derived sizes (defaults to cropping).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<u32>,
    /// `<picture>` sources add a 2x candidate when this is above 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixel_density: Option<u32>,
}

fn is_px(unit: &Unit) -> bool {
    *unit == Unit::Px
}

fn nonzero(value: Option<u32>) -> Option<u32> {
    value.filter(|&v| v > 0)
}

impl Breakpoint {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min: None,
            max: None,
            unit: Unit::Px,
            width: None,
            height: None,
            crop: None,
            quality: None,
            pixel_density: None,
        }
    }

    pub fn with_min(mut self, min: u32) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: u32) -> Self {
        self.max = Some(max);
        self
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self
    }

    pub fn with_pixel_density(mut self, density: u32) -> Self {
        self.pixel_density = Some(density);
        self
    }

    /// Whether min, max or width is present at all (`min = 0` counts).
    pub fn is_bounded(&self) -> bool {
        self.min.is_some() || self.max.is_some() || self.width.is_some()
    }

    pub fn wants_2x(&self) -> bool {
        self.pixel_density.is_some_and(|d| d > 1)
    }

    /// CSS media condition, e.g. `(min-width: 640px) and (max-width: 800px)`.
    ///
    /// Zero bounds are ignored; `None` when nothing is left.
    pub fn media_condition(&self) -> Option<String> {
        let unit = self.unit.as_str();
        let min = nonzero(self.min).map(|min| format!("(min-width: {min}{unit})"));
        let max = nonzero(self.max).map(|max| format!("(max-width: {max}{unit})"));
        match (min, max) {
            (Some(min), Some(max)) => Some(format!("{min} and {max}")),
            (Some(cond), None) | (None, Some(cond)) => Some(cond),
            (None, None) => None,
        }
    }
}

/// The configured breakpoints, in declaration order.
///
/// Built once from config and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakpointTable {
    breakpoints: Vec<Breakpoint>,
    base_unit_pixel: u32,
}

impl BreakpointTable {
    pub fn new(breakpoints: Vec<Breakpoint>, base_unit_pixel: u32) -> Self {
        Self {
            breakpoints,
            base_unit_pixel,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Breakpoint> {
        self.breakpoints.iter().find(|b| b.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Breakpoint> {
        self.breakpoints.iter()
    }

    pub fn len(&self) -> usize {
        self.breakpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.breakpoints.is_empty()
    }

    pub fn base_unit_pixel(&self) -> u32 {
        self.base_unit_pixel
    }

    /// Pixel width images for this breakpoint should be sized to.
    ///
    /// `None` for unknown breakpoints and for ones that resolve to zero;
    /// callers treat that as "no width constraint".
    pub fn resolve_width(&self, name: &str) -> Option<u32> {
        let Some(breakpoint) = self.get(name) else {
            tracing::debug!(breakpoint = name, "Unknown breakpoint has no width");
            return None;
        };
        let multiplier = match breakpoint.unit {
            Unit::Em => self.base_unit_pixel,
            Unit::Px => 1,
        };
        nonzero(breakpoint.width)
            .or_else(|| nonzero(breakpoint.max))
            .or_else(|| nonzero(breakpoint.min).map(|min| self.next_min(min)))
            .map(|width| width.saturating_mul(multiplier))
    }

    /// The smallest configured `min` strictly larger than `min`, or `min`
    /// itself when it is the widest tier.
    pub fn next_min(&self, min: u32) -> u32 {
        let mut mins: Vec<u32> = self.breakpoints.iter().filter_map(|b| nonzero(b.min)).collect();
        mins.sort_unstable();
        mins.dedup();
        mins.into_iter().find(|&m| m > min).unwrap_or(min)
    }
}
