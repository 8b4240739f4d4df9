//! Layout configuration: the one set of size and spacing constants both renderers read.
//!
//! All lengths are PDF points. `LayoutConfig::default()` is the canonical set;
//! callers supply a `LayoutOverride` (every field optional) which is merged over
//! a copy of the defaults, never written into them.

use serde::{Deserialize, Serialize};

use crate::layout::model::Line;

/// A4 portrait in points.
pub const A4_WIDTH_PT: f32 = 595.28;
pub const A4_HEIGHT_PT: f32 = 841.89;

/// Share of a meta box's inner width the label column may take at most.
pub const META_LABEL_MAX_SHARE: f32 = 0.4;

/// Declares `LayoutConfig`, its all-optional `LayoutOverride` twin, the defaults
/// and the merge in one place so the three can never drift apart.
macro_rules! layout_config {
    ($( $(#[$doc:meta])* $field:ident : $default:expr ),+ $(,)?) => {
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct LayoutConfig {
            $( $(#[$doc])* pub $field: f32, )+
        }

        impl Default for LayoutConfig {
            fn default() -> Self {
                LayoutConfig { $( $field: $default, )+ }
            }
        }

        /// Partial layout configuration supplied per export.
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase", default)]
        pub struct LayoutOverride {
            $( #[serde(skip_serializing_if = "Option::is_none")] pub $field: Option<f32>, )+
        }

        impl LayoutConfig {
            /// Returns a new config with every `Some` field of `overrides` applied.
            pub fn merged(&self, overrides: &LayoutOverride) -> LayoutConfig {
                LayoutConfig {
                    $( $field: overrides.$field.unwrap_or(self.$field), )+
                }
            }
        }
    };
}

layout_config! {
    page_width: A4_WIDTH_PT,
    page_height: A4_HEIGHT_PT,
    /// Left and right margin.
    margin_x: 48.0,
    margin_top: 56.0,
    margin_bottom: 64.0,

    title_size: 22.0,
    title_leading: 28.0,
    gap_after_title: 6.0,

    subtitle_size: 12.0,
    subtitle_leading: 16.0,
    gap_after_subtitle: 10.0,

    section_size: 11.0,
    section_leading: 15.0,
    section_pad_top: 10.0,
    gap_after_section_title: 6.0,

    body_size: 10.5,
    body_leading: 15.0,
    gap_after_paragraph: 8.0,

    divider_pad_top: 16.0,
    rule_thickness: 1.0,
    divider_pad_bottom: 14.0,
    divider_extra_after: 10.0,

    meta_size: 9.5,
    meta_row_leading: 14.0,
    meta_padding: 8.0,
    /// Space between the label column and the value column.
    meta_label_gap: 12.0,
    meta_corner_radius: 6.0,
    gap_after_meta: 12.0,

    two_col_heading_size: 11.0,
    two_col_heading_leading: 15.0,
    gap_after_two_col_heading: 6.0,
    column_title_size: 10.0,
    column_title_leading: 14.0,
    gap_after_column_title: 4.0,
    bullet_size: 10.0,
    bullet_leading: 14.0,
    gap_between_bullets: 3.0,
    bullet_indent: 10.0,
    column_gap: 24.0,
    gap_after_two_column: 12.0,

    footer_size: 8.0,
    /// Footer baseline distance below the bottom margin.
    footer_offset: 28.0,

    /// Gray levels, 0 = black, 1 = white.
    ink_gray: 0.1,
    muted_gray: 0.45,
    rule_gray: 0.85,
    border_gray: 0.8,
}

/// Vertical spacing around one line, shared by both renderers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spacing {
    /// Space consumed above the content.
    pub pad_top: f32,
    /// Space consumed below the content.
    pub gap_after: f32,
}

impl LayoutConfig {
    pub fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin_x
    }

    /// The lowest y (from the page top) content may reach.
    pub fn content_bottom(&self) -> f32 {
        self.page_height - self.margin_bottom
    }

    pub fn content_height(&self) -> f32 {
        self.content_bottom() - self.margin_top
    }

    /// Per-kind spacing. The divider's rule sits between `pad_top` and `gap_after`.
    pub fn spacing(&self, line: &Line) -> Spacing {
        let (pad_top, gap_after) = match line {
            Line::Title { .. } => (0.0, self.gap_after_title),
            Line::Subtitle { .. } => (0.0, self.gap_after_subtitle),
            Line::SectionTitle { .. } => (self.section_pad_top, self.gap_after_section_title),
            Line::Body { .. } => (0.0, self.gap_after_paragraph),
            Line::Divider => (
                self.divider_pad_top,
                self.divider_pad_bottom + self.divider_extra_after,
            ),
            Line::Spacer { .. } => (0.0, 0.0),
            Line::Meta { .. } => (0.0, self.gap_after_meta),
            Line::TwoColumn(_) => (0.0, self.gap_after_two_column),
        };
        Spacing { pad_top, gap_after }
    }

    /// Total vertical space a divider consumes.
    pub fn divider_advance(&self) -> f32 {
        let spacing = self.spacing(&Line::Divider);
        spacing.pad_top + self.rule_thickness + spacing.gap_after
    }
}
