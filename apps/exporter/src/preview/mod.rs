//! Preview Renderer: an HTML approximation of the PDF output.
//!
//! Reads the same `LayoutConfig` as the document renderer, converted from points
//! to CSS pixels at 96/72. Wrapping is left to the browser's flow layout; the
//! vertical rhythm comes from `LayoutConfig::spacing`, expressed as
//! `margin-top` / `margin-bottom` instead of cursor advances. The sheet is a
//! column flex container so adjacent margins add up instead of collapsing.

use html_escape::encode_text;

use crate::layout::config::{LayoutConfig, META_LABEL_MAX_SHARE};
use crate::layout::font_metrics::FontFace;
use crate::layout::model::{Line, MetaItem, TwoColumn};

pub const PX_PER_PT: f32 = 96.0 / 72.0;

fn px(pt: f32) -> f32 {
    pt * PX_PER_PT
}

/// Formats a pixel length with at most two decimals.
fn css_px(pt: f32) -> String {
    let value = (px(pt) * 100.0).round() / 100.0;
    format!("{value}px")
}

/// One presentational block; one per input line, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewBlock {
    pub kind: &'static str,
    pub margin_top_px: f32,
    pub margin_bottom_px: f32,
    pub html: String,
}

fn text_block(tag: &str, text: &str, face: FontFace, size: f32, leading: f32, extra: &str) -> String {
    format!(
        r#"<{tag} style="margin:0;font-size:{};line-height:{};font-weight:{}{extra}">{}</{tag}>"#,
        css_px(size),
        css_px(leading),
        face.css_weight(),
        encode_text(text),
    )
}

fn meta_html(config: &LayoutConfig, items: &[MetaItem]) -> String {
    let rows: String = items
        .iter()
        .map(|item| {
            format!(
                r#"<dt style="font-weight:{};margin:0;overflow-wrap:anywhere">{}</dt><dd style="margin:0">{}</dd>"#,
                FontFace::Bold.css_weight(),
                encode_text(&item.label),
                encode_text(item.display_value()),
            )
        })
        .collect();
    format!(
        r#"<dl class="meta" style="display:grid;grid-template-columns:fit-content({}%) 1fr;column-gap:{};margin:0;padding:{};border:1px solid #ccc;border-radius:{};font-size:{};line-height:{}">{rows}</dl>"#,
        (META_LABEL_MAX_SHARE * 100.0).round(),
        css_px(config.meta_label_gap),
        css_px(config.meta_padding),
        css_px(config.meta_corner_radius),
        css_px(config.meta_size),
        css_px(config.meta_row_leading),
    )
}

fn column_html(config: &LayoutConfig, title: Option<&str>, items: &[String]) -> String {
    let mut html = String::from(r#"<div class="column" style="flex:1;min-width:0">"#);
    if let Some(title) = title {
        html.push_str(&text_block(
            "div",
            title,
            FontFace::Bold,
            config.column_title_size,
            config.column_title_leading,
            &format!(";margin-bottom:{}", css_px(config.gap_after_column_title)),
        ));
    }
    html.push_str(&format!(
        r#"<ul style="margin:0;padding-left:{};font-size:{};line-height:{}">"#,
        css_px(config.bullet_indent),
        css_px(config.bullet_size),
        css_px(config.bullet_leading),
    ));
    for (i, item) in items.iter().enumerate() {
        let gap = if i == 0 { 0.0 } else { config.gap_between_bullets };
        html.push_str(&format!(
            r#"<li style="margin-top:{}">{}</li>"#,
            css_px(gap),
            encode_text(item)
        ));
    }
    html.push_str("</ul></div>");
    html
}

fn two_column_html(config: &LayoutConfig, block: &TwoColumn) -> String {
    let mut html = String::from(r#"<div class="two-column">"#);
    if let Some(heading) = &block.heading {
        html.push_str(&text_block(
            "div",
            heading,
            FontFace::Bold,
            config.two_col_heading_size,
            config.two_col_heading_leading,
            &format!(";margin-bottom:{}", css_px(config.gap_after_two_col_heading)),
        ));
    }
    html.push_str(&format!(
        r#"<div style="display:flex;column-gap:{}">"#,
        css_px(config.column_gap)
    ));
    html.push_str(&column_html(config, block.left_title.as_deref(), &block.left));
    html.push_str(&column_html(config, block.right_title.as_deref(), &block.right));
    html.push_str("</div></div>");
    html
}

/// Maps each line to its block. Spacing comes from `LayoutConfig::spacing`.
pub fn preview_blocks(lines: &[Line], config: &LayoutConfig) -> Vec<PreviewBlock> {
    lines
        .iter()
        .map(|line| {
            let spacing = config.spacing(line);
            let html = match line {
                Line::Title { text } => {
                    text_block("h1", text, FontFace::Bold, config.title_size, config.title_leading, "")
                }
                Line::Subtitle { text } => text_block(
                    "p",
                    text,
                    FontFace::Regular,
                    config.subtitle_size,
                    config.subtitle_leading,
                    ";color:#737373",
                ),
                Line::SectionTitle { text } => text_block(
                    "h2",
                    text,
                    FontFace::Bold,
                    config.section_size,
                    config.section_leading,
                    ";text-transform:uppercase",
                ),
                Line::Body { text } => {
                    text_block("p", text, FontFace::Regular, config.body_size, config.body_leading, "")
                }
                Line::Divider => format!(
                    r#"<hr style="margin:0;border:0;border-top:{} solid #d9d9d9">"#,
                    css_px(config.rule_thickness)
                ),
                Line::Spacer { height } => format!(r#"<div style="height:{}"></div>"#, css_px(*height)),
                Line::Meta { items } => meta_html(config, items),
                Line::TwoColumn(block) => two_column_html(config, block),
            };
            PreviewBlock {
                kind: line.kind_name(),
                margin_top_px: px(spacing.pad_top),
                margin_bottom_px: px(spacing.gap_after),
                html,
            }
        })
        .collect()
}

/// Renders a complete HTML fragment: one page-width sheet holding every block.
pub fn render_preview(lines: &[Line], config: &LayoutConfig) -> String {
    let mut html = format!(
        r#"<div class="preview" style="display:flex;flex-direction:column;box-sizing:border-box;width:{};padding:{} {} {};font-family:Helvetica,Arial,sans-serif;color:#1a1a1a;background:#fff">"#,
        css_px(config.page_width),
        css_px(config.margin_top),
        css_px(config.margin_x),
        css_px(config.margin_bottom),
    );
    for block in preview_blocks(lines, config) {
        html.push_str(&format!(
            r#"<div class="line {}" style="margin-top:{}px;margin-bottom:{}px">{}</div>"#,
            block.kind,
            (block.margin_top_px * 100.0).round() / 100.0,
            (block.margin_bottom_px * 100.0).round() / 100.0,
            block.html
        ));
    }
    html.push_str("</div>");
    html
}
