// SPDX-License-Identifier: MPL-2.0
//! Region offsets, toast height measurement and the per-region height table.

use crate::config::defaults::{MOBILE_VIEWPORT_OFFSET, VIEWPORT_OFFSET};
use crate::toast::{Position, ToastId};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================================================
// Offsets
// ==========================================================================

/// A single offset value: pixels or any CSS length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OffsetValue {
    Px(f32),
    Css(String),
}

impl OffsetValue {
    /// Renders the value as a CSS length.
    #[must_use]
    pub fn to_css(&self) -> String {
        match self {
            OffsetValue::Px(px) => format!("{px}px"),
            OffsetValue::Css(css) => css.clone(),
        }
    }
}

impl From<f32> for OffsetValue {
    fn from(px: f32) -> Self {
        OffsetValue::Px(px)
    }
}

impl From<&str> for OffsetValue {
    fn from(css: &str) -> Self {
        OffsetValue::Css(css.to_owned())
    }
}

/// Per-edge offsets; missing edges use the region default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeValues {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<OffsetValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<OffsetValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<OffsetValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<OffsetValue>,
}

/// Configured distance between the region and the viewport edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Offset {
    /// One value applied to all four edges.
    Uniform(OffsetValue),
    Edges(EdgeValues),
}

impl From<f32> for Offset {
    fn from(px: f32) -> Self {
        Offset::Uniform(OffsetValue::Px(px))
    }
}

impl From<&str> for Offset {
    fn from(css: &str) -> Self {
        Offset::Uniform(OffsetValue::from(css))
    }
}

/// Offsets resolved to CSS lengths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeOffsets {
    pub top: String,
    pub right: String,
    pub bottom: String,
    pub left: String,
}

impl EdgeOffsets {
    /// Resolves `offset`, filling anything missing with `default`.
    #[must_use]
    pub fn resolve(offset: Option<&Offset>, default: &str) -> Self {
        let edge = |value: &Option<OffsetValue>| {
            value
                .as_ref()
                .map_or_else(|| default.to_owned(), OffsetValue::to_css)
        };
        match offset {
            Some(Offset::Uniform(value)) => Self::uniform(value.to_css()),
            Some(Offset::Edges(edges)) => Self {
                top: edge(&edges.top),
                right: edge(&edges.right),
                bottom: edge(&edges.bottom),
                left: edge(&edges.left),
            },
            None => Self::uniform(default.to_owned()),
        }
    }

    fn uniform(css: String) -> Self {
        Self {
            top: css.clone(),
            right: css.clone(),
            bottom: css.clone(),
            left: css,
        }
    }
}

/// Desktop and mobile offsets of a region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionOffsets {
    pub desktop: EdgeOffsets,
    pub mobile: EdgeOffsets,
}

impl RegionOffsets {
    #[must_use]
    pub fn resolve(offset: Option<&Offset>, mobile_offset: Option<&Offset>) -> Self {
        Self {
            desktop: EdgeOffsets::resolve(offset, VIEWPORT_OFFSET),
            mobile: EdgeOffsets::resolve(mobile_offset, MOBILE_VIEWPORT_OFFSET),
        }
    }

    /// Offsets as CSS custom properties (`--offset-top`, `--mobile-offset-left`, ...).
    #[must_use]
    pub fn css_variables(&self) -> Vec<(String, String)> {
        [("--offset", &self.desktop), ("--mobile-offset", &self.mobile)]
            .into_iter()
            .flat_map(|(prefix, edges)| {
                [
                    ("top", &edges.top),
                    ("right", &edges.right),
                    ("bottom", &edges.bottom),
                    ("left", &edges.left),
                ]
                .map(|(edge, value)| (format!("{prefix}-{edge}"), value.clone()))
            })
            .collect()
    }
}

// ==========================================================================
// Height Measurement
// ==========================================================================

/// Raw size reported by the rendering layer for a toast element.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Measurement {
    pub raw_height: f32,
    /// Computed CSS `transform` of the element, if any.
    pub transform: Option<String>,
}

impl Measurement {
    #[must_use]
    pub fn new(raw_height: f32) -> Self {
        Self {
            raw_height,
            transform: None,
        }
    }

    #[must_use]
    pub fn with_transform(mut self, transform: impl Into<String>) -> Self {
        self.transform = Some(transform.into());
        self
    }

    /// Height with any vertical scale transform removed.
    #[must_use]
    pub fn height(&self) -> f32 {
        measure_height(self.raw_height, self.transform.as_deref())
    }
}

/// Divides `raw_height` by the vertical scale of `transform`.
#[must_use]
pub fn measure_height(raw_height: f32, transform: Option<&str>) -> f32 {
    raw_height / scale_y_from_transform(transform.unwrap_or("none"))
}

/// Extracts the vertical scale factor from a CSS `matrix()` or `matrix3d()`.
///
/// Anything unparsable, non-finite or non-positive yields 1.
#[must_use]
pub fn scale_y_from_transform(transform: &str) -> f32 {
    let transform = transform.trim();
    if transform.is_empty() || transform == "none" {
        return 1.0;
    }

    let scale = if let Some(args) = matrix_args(transform, "matrix3d(") {
        args.get(5).copied()
    } else if let Some(args) = matrix_args(transform, "matrix(") {
        args.get(3).copied()
    } else {
        None
    };

    scale
        .filter(|scale| scale.is_finite() && *scale > 0.0)
        .unwrap_or(1.0)
}

fn matrix_args(transform: &str, prefix: &str) -> Option<Vec<f32>> {
    let start = transform.find(prefix)? + prefix.len();
    let end = transform[start..].rfind(')')? + start;
    Some(
        transform[start..end]
            .split(',')
            .map(|value| value.trim().parse::<f32>().unwrap_or(f32::NAN))
            .collect(),
    )
}

// ==========================================================================
// Height Table
// ==========================================================================

/// Measured height of one mounted toast.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightEntry {
    pub toast_id: ToastId,
    pub height: f32,
    pub position: Position,
}

/// Heights of mounted toasts, newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeightTable {
    entries: Vec<HeightEntry>,
}

impl HeightTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or updates the height of `toast_id`.
    pub fn upsert(&mut self, toast_id: &ToastId, height: f32, position: Position) {
        match self.entries.iter_mut().find(|entry| &entry.toast_id == toast_id) {
            Some(entry) => {
                entry.height = height;
                entry.position = position;
            }
            None => self.entries.insert(
                0,
                HeightEntry {
                    toast_id: toast_id.clone(),
                    height,
                    position,
                },
            ),
        }
    }

    pub fn remove(&mut self, toast_id: &ToastId) {
        self.entries.retain(|entry| &entry.toast_id != toast_id);
    }

    #[must_use]
    pub fn get(&self, toast_id: &ToastId) -> Option<f32> {
        self.entries
            .iter()
            .find(|entry| &entry.toast_id == toast_id)
            .map(|entry| entry.height)
    }

    /// Height of the most recently registered toast at `position`.
    #[must_use]
    pub fn front_height(&self, position: Position) -> f32 {
        self.entries
            .iter()
            .find(|entry| entry.position == position)
            .map_or(0.0, |entry| entry.height)
    }

    /// Sum of the registered heights of `ids`. Unregistered ids count as 0.
    pub fn sum<'a>(&self, ids: impl IntoIterator<Item = &'a ToastId>) -> f32 {
        ids.into_iter().filter_map(|id| self.get(id)).sum()
    }

    #[must_use]
    pub fn entries(&self) -> &[HeightEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for EdgeOffsets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}
