//! Layout Model: the renderer-agnostic line sequence shared by the PDF and preview renderers.
//!
//! A document is an ordered `Vec<Line>`. Order is the only layout instruction:
//! lines carry no coordinates or page numbers, the document renderer alone
//! decides vertical placement.

use serde::{Deserialize, Serialize};

/// Placeholder shown for a meta row whose value is absent.
pub const EMPTY_META_VALUE: &str = "\u{2014}";

/// One abstract content unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Line {
    Title { text: String },
    Subtitle { text: String },
    /// Rendered uppercased, with a leading pad.
    SectionTitle { text: String },
    Body { text: String },
    Divider,
    /// Explicit vertical gap in points.
    Spacer { height: f32 },
    Meta { items: Vec<MetaItem> },
    TwoColumn(TwoColumn),
}

impl Line {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Line::Title { .. } => "title",
            Line::Subtitle { .. } => "subtitle",
            Line::SectionTitle { .. } => "sectionTitle",
            Line::Body { .. } => "body",
            Line::Divider => "divider",
            Line::Spacer { .. } => "spacer",
            Line::Meta { .. } => "meta",
            Line::TwoColumn(_) => "twoColumn",
        }
    }
}

/// A label/value row of a meta block. Rows keep insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaItem {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl MetaItem {
    pub fn new(label: impl Into<String>, value: Option<String>) -> Self {
        MetaItem {
            label: label.into(),
            value,
        }
    }

    /// The value to draw: the stored value, or an em-dash when absent.
    pub fn display_value(&self) -> &str {
        self.value.as_deref().unwrap_or(EMPTY_META_VALUE)
    }
}

/// Two independently measured bullet columns under one optional heading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwoColumn {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_title: Option<String>,
    #[serde(default)]
    pub left: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_title: Option<String>,
    #[serde(default)]
    pub right: Vec<String>,
}
