//! Document Renderer: measures and paginates a line sequence into per-page draw lists.
//!
//! # Per line
//! 1. Measure the required height at the current content width using the
//!    base-14 metric tables (wrapped rows × the kind's leading).
//! 2. Break to a new page when `cursor.y + height` would pass the bottom margin
//!    (never when the cursor is already at the page top).
//! 3. Emit draw ops at `(margin_x, cursor.y)`.
//! 4. Advance the cursor by the drawn height plus the kind's trailing gap
//!    from `LayoutConfig::spacing`.
//!
//! Lines taller than the content area continue on the next page: text at row
//! boundaries, meta blocks at row boundaries (one bordered box per page) and
//! two-column blocks at bullet boundaries with the heading repeated.
//!
//! A line whose geometry comes out non-finite or non-positive is skipped with a
//! warning; the rest of the document still renders. Footers are added once the
//! page count is known.
//!
//! Coordinates here are top-down (y grows toward the page bottom). The PDF
//! writer flips them.

use tracing::{debug, warn};

use crate::errors::ExportError;
use crate::layout::config::{LayoutConfig, META_LABEL_MAX_SHARE};
use crate::layout::font_metrics::{get_metrics, FontFace};
use crate::layout::model::{Line, MetaItem, TwoColumn};
use crate::render::cursor::RenderCursor;

/// Baseline position within a row, as a fraction of the font size below the
/// half-leading. Approximates Helvetica's ascender.
const ASCENT_RATIO: f32 = 0.8;
const BULLET: &str = "\u{2022}";

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

/// One drawing instruction in top-down page coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f32,
        baseline: f32,
        face: FontFace,
        size: f32,
        gray: f32,
        text: String,
    },
    /// Horizontal rule whose top edge sits at `y`.
    Rule {
        x1: f32,
        x2: f32,
        y: f32,
        thickness: f32,
        gray: f32,
    },
    /// Stroked rounded rectangle whose top-left corner is `(x, y)`.
    RoundedRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        radius: f32,
        gray: f32,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaidOutPage {
    /// Body content, always within the margins.
    pub ops: Vec<DrawOp>,
    /// Running footer, drawn below the bottom margin.
    pub footer: Vec<DrawOp>,
}

/// Where a line landed, kept for diagnostics and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct LinePlacement {
    pub index: usize,
    pub kind: &'static str,
    /// Page the line started on.
    pub page: usize,
    /// Cursor y at the moment drawing began.
    pub y: f32,
    /// Required height (pad + content), excluding the trailing gap.
    pub height: f32,
    /// Total vertical space consumed, including pad and trailing gap.
    pub advance: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaidOutDocument {
    pub page_width: f32,
    pub page_height: f32,
    pub pages: Vec<LaidOutPage>,
    pub placements: Vec<LinePlacement>,
    /// Indices of lines skipped because of invalid geometry.
    pub skipped: Vec<usize>,
}

impl LaidOutDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Measurement
// ────────────────────────────────────────────────────────────────────────────

/// Why a line could not be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidGeometry(pub &'static str);

type Measured<T> = Result<T, InvalidGeometry>;

fn positive(value: f32, reason: &'static str) -> Measured<f32> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(InvalidGeometry(reason))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub face: FontFace,
    pub size: f32,
    pub leading: f32,
    pub gray: f32,
}

/// Text style for title, subtitle, section and body lines.
pub fn text_style(config: &LayoutConfig, line: &Line) -> Option<TextStyle> {
    let (face, size, leading, gray) = match line {
        Line::Title { .. } => (FontFace::Bold, config.title_size, config.title_leading, config.ink_gray),
        Line::Subtitle { .. } => (
            FontFace::Regular,
            config.subtitle_size,
            config.subtitle_leading,
            config.muted_gray,
        ),
        Line::SectionTitle { .. } => (
            FontFace::Bold,
            config.section_size,
            config.section_leading,
            config.ink_gray,
        ),
        Line::Body { .. } => (FontFace::Regular, config.body_size, config.body_leading, config.ink_gray),
        _ => return None,
    };
    Some(TextStyle {
        face,
        size,
        leading,
        gray,
    })
}

/// The text a text-kind line actually draws (section titles are uppercased).
pub fn display_text(line: &Line) -> Option<String> {
    match line {
        Line::Title { text } | Line::Subtitle { text } | Line::Body { text } => Some(text.clone()),
        Line::SectionTitle { text } => Some(text.to_uppercase()),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextMeasure {
    pub style: TextStyle,
    pub rows: Vec<String>,
    /// Rows × leading, without pad or gap.
    pub height: f32,
}

pub fn measure_text(config: &LayoutConfig, line: &Line) -> Measured<TextMeasure> {
    let style = text_style(config, line).ok_or(InvalidGeometry("not a text line"))?;
    let text = display_text(line).unwrap_or_default();
    let width = positive(config.content_width(), "content width")?;
    positive(style.size, "font size")?;
    positive(style.leading, "leading")?;

    let rows = get_metrics(style.face).wrap(&text, style.size, width);
    let height = rows.len() as f32 * style.leading;
    Ok(TextMeasure {
        style,
        rows,
        height,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetaRow {
    pub label_rows: Vec<String>,
    pub value_rows: Vec<String>,
}

impl MetaRow {
    pub fn row_count(&self) -> usize {
        self.label_rows.len().max(self.value_rows.len()).max(1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetaMeasure {
    pub label_width: f32,
    /// Offset of the value column from the box's left edge.
    pub value_offset: f32,
    pub value_width: f32,
    pub rows: Vec<MetaRow>,
    pub height: f32,
}

pub fn measure_meta(config: &LayoutConfig, items: &[MetaItem]) -> Measured<MetaMeasure> {
    let size = positive(config.meta_size, "meta font size")?;
    positive(config.meta_row_leading, "meta leading")?;
    let inner = positive(
        config.content_width() - 2.0 * config.meta_padding,
        "meta inner width",
    )?;

    let bold = get_metrics(FontFace::Bold);
    let regular = get_metrics(FontFace::Regular);
    let widest_label = items
        .iter()
        .map(|item| bold.width_pt(&item.label, size))
        .fold(0.0_f32, f32::max);
    let label_width = positive(
        widest_label.min(inner * META_LABEL_MAX_SHARE),
        "meta label width",
    )?;
    let value_width = positive(
        inner - label_width - config.meta_label_gap,
        "meta value width",
    )?;

    let rows: Vec<MetaRow> = items
        .iter()
        .map(|item| MetaRow {
            label_rows: bold.wrap(&item.label, size, label_width),
            value_rows: regular.wrap(item.display_value(), size, value_width),
        })
        .collect();
    let row_count: usize = rows.iter().map(MetaRow::row_count).sum();
    let height = 2.0 * config.meta_padding + row_count as f32 * config.meta_row_leading;

    Ok(MetaMeasure {
        label_width,
        value_offset: config.meta_padding + label_width + config.meta_label_gap,
        value_width,
        rows,
        height,
    })
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMeasure {
    pub title_rows: Vec<String>,
    /// Title rows plus the gap under them (zero without a title).
    pub title_height: f32,
    pub bullets: Vec<Vec<String>>,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TwoColumnMeasure {
    pub column_width: f32,
    pub heading_rows: Vec<String>,
    /// Heading rows plus the gap under them (zero without a heading).
    pub heading_height: f32,
    pub left: ColumnMeasure,
    pub right: ColumnMeasure,
    /// Heading height plus the taller column.
    pub height: f32,
}

fn measure_column(
    config: &LayoutConfig,
    title: Option<&str>,
    items: &[String],
    column_width: f32,
    bullet_width: f32,
) -> ColumnMeasure {
    let title_rows = title
        .map(|t| get_metrics(FontFace::Bold).wrap(t, config.column_title_size, column_width))
        .unwrap_or_default();
    let title_height = if title_rows.is_empty() {
        0.0
    } else {
        title_rows.len() as f32 * config.column_title_leading + config.gap_after_column_title
    };
    let mut height = title_height;

    let regular = get_metrics(FontFace::Regular);
    let bullets: Vec<Vec<String>> = items
        .iter()
        .map(|item| regular.wrap(item, config.bullet_size, bullet_width))
        .collect();
    let bullet_rows: usize = bullets.iter().map(Vec::len).sum();
    height += bullet_rows as f32 * config.bullet_leading;
    if bullets.len() > 1 {
        height += (bullets.len() - 1) as f32 * config.gap_between_bullets;
    }

    ColumnMeasure {
        title_rows,
        title_height,
        bullets,
        height,
    }
}

pub fn measure_two_column(config: &LayoutConfig, block: &TwoColumn) -> Measured<TwoColumnMeasure> {
    let width = positive(config.content_width(), "content width")?;
    positive(config.bullet_size, "bullet font size")?;
    positive(config.column_title_size, "column title font size")?;
    positive(config.two_col_heading_size, "heading font size")?;
    let column_width = positive((width - config.column_gap) / 2.0, "column width")?;
    let bullet_width = positive(column_width - config.bullet_indent, "bullet width")?;

    let heading_rows = block
        .heading
        .as_deref()
        .map(|h| get_metrics(FontFace::Bold).wrap(h, config.two_col_heading_size, width))
        .unwrap_or_default();
    let heading_height = if heading_rows.is_empty() {
        0.0
    } else {
        heading_rows.len() as f32 * config.two_col_heading_leading + config.gap_after_two_col_heading
    };

    let left = measure_column(
        config,
        block.left_title.as_deref(),
        &block.left,
        column_width,
        bullet_width,
    );
    let right = measure_column(
        config,
        block.right_title.as_deref(),
        &block.right,
        column_width,
        bullet_width,
    );
    let height = heading_height + left.height.max(right.height);

    Ok(TwoColumnMeasure {
        column_width,
        heading_rows,
        heading_height,
        left,
        right,
        height,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Renderer
// ────────────────────────────────────────────────────────────────────────────

/// Lays out `lines` into pages and appends the running footer.
///
/// Fails only when there is nothing to export.
pub fn layout_document(
    lines: &[Line],
    config: &LayoutConfig,
    footer_label: &str,
) -> Result<LaidOutDocument, ExportError> {
    if lines.is_empty() {
        return Err(ExportError::NothingToExport(
            "the document has no content".to_string(),
        ));
    }

    let mut renderer = DocumentRenderer::new(config);
    for (index, line) in lines.iter().enumerate() {
        renderer.place(index, line);
    }
    Ok(renderer.finish(footer_label))
}

/// The part of a meta block drawn inside one bordered box.
struct MetaSegment {
    top: f32,
    /// Row height drawn so far, excluding padding.
    used: f32,
    /// Where the border op goes so it sits behind the rows.
    op_index: usize,
}

impl MetaSegment {
    fn fits(&self, height: f32, pad: f32, bottom: f32) -> bool {
        self.top + 2.0 * pad + self.used + height <= bottom + 1e-3
    }
}

/// Read position of one two-column list: current bullet and wrapped line.
#[derive(Debug, Clone, Copy, Default)]
struct ColumnFlow {
    bullet: usize,
    row: usize,
}

impl ColumnFlow {
    fn is_done(&self, column: &ColumnMeasure) -> bool {
        self.bullet >= column.bullets.len()
    }
}

struct DocumentRenderer<'a> {
    config: &'a LayoutConfig,
    cursor: RenderCursor,
    pages: Vec<LaidOutPage>,
    placements: Vec<LinePlacement>,
    skipped: Vec<usize>,
}

impl<'a> DocumentRenderer<'a> {
    fn new(config: &'a LayoutConfig) -> Self {
        DocumentRenderer {
            config,
            cursor: RenderCursor::new(config.margin_top),
            pages: vec![LaidOutPage::default()],
            placements: Vec::new(),
            skipped: Vec::new(),
        }
    }

    fn place(&mut self, index: usize, line: &Line) {
        let result = match line {
            Line::Title { .. } | Line::Subtitle { .. } | Line::SectionTitle { .. } | Line::Body { .. } => {
                measure_text(self.config, line).map(|m| self.draw_text_line(index, line, m))
            }
            Line::Divider => self.draw_divider(index),
            Line::Spacer { height } => self.draw_spacer(index, *height),
            Line::Meta { items } => {
                measure_meta(self.config, items).map(|m| self.draw_meta(index, line, m))
            }
            Line::TwoColumn(block) => measure_two_column(self.config, block)
                .map(|m| self.draw_two_column(index, line, m)),
        };

        if let Err(InvalidGeometry(reason)) = result {
            warn!(
                line = index,
                kind = line.kind_name(),
                reason,
                "Skipping line with invalid geometry"
            );
            self.skipped.push(index);
        }
    }

    // ── cursor helpers ──────────────────────────────────────────────────────

    fn bottom(&self) -> f32 {
        self.config.content_bottom()
    }

    fn new_page(&mut self) {
        self.cursor.break_page();
        self.pages.push(LaidOutPage::default());
        debug!(page = self.cursor.page + 1, "Page break");
    }

    /// Breaks the page unless `height` fits or the cursor already sits at the top.
    fn ensure_room(&mut self, height: f32) {
        if !self.cursor.fits(height, self.bottom()) && !self.cursor.at_page_top() {
            self.new_page();
        }
    }

    fn push_op(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.get_mut(self.cursor.page) {
            page.ops.push(op);
        }
    }

    fn record(&mut self, index: usize, line: &Line, start: RenderCursor, height: f32) {
        let advance = if self.cursor.page == start.page {
            self.cursor.y - start.y
        } else {
            height + self.config.spacing(line).gap_after
        };
        self.placements.push(LinePlacement {
            index,
            kind: line.kind_name(),
            page: start.page,
            y: start.y,
            height,
            advance,
        });
    }

    #[allow(clippy::too_many_arguments)]
    fn text_op(&mut self, row: &str, x: f32, row_top: f32, face: FontFace, size: f32, leading: f32, gray: f32) {
        self.push_op(DrawOp::Text {
            x,
            baseline: row_top + (leading - size) / 2.0 + size * ASCENT_RATIO,
            face,
            size,
            gray,
            text: row.to_string(),
        });
    }

    // ── per-kind drawing ────────────────────────────────────────────────────

    fn draw_text_line(&mut self, index: usize, line: &Line, m: TextMeasure) {
        let spacing = self.config.spacing(line);
        let TextStyle {
            face,
            size,
            leading,
            gray,
        } = m.style;
        let x = self.config.margin_x;
        let required = spacing.pad_top + m.height;

        if required <= self.config.content_height() {
            self.ensure_room(required);
            let start = self.cursor;
            self.cursor.advance(spacing.pad_top);
            for row in &m.rows {
                let top = self.cursor.y;
                self.text_op(row, x, top, face, size, leading, gray);
                self.cursor.advance(leading);
            }
            self.cursor.advance(spacing.gap_after);
            self.record(index, line, start, required);
        } else {
            // Taller than a page: flow row by row.
            self.ensure_room(spacing.pad_top + leading);
            let start = self.cursor;
            self.cursor.advance(spacing.pad_top);
            for row in &m.rows {
                self.ensure_room(leading);
                let top = self.cursor.y;
                self.text_op(row, x, top, face, size, leading, gray);
                self.cursor.advance(leading);
            }
            self.cursor.advance(spacing.gap_after);
            self.record(index, line, start, required);
        }
    }

    fn draw_divider(&mut self, index: usize) -> Measured<()> {
        let config = self.config;
        let thickness = positive(config.rule_thickness, "rule thickness")?;
        let width = positive(config.content_width(), "content width")?;
        let spacing = config.spacing(&Line::Divider);
        let required = spacing.pad_top + thickness + config.divider_pad_bottom;

        self.ensure_room(required);
        let start = self.cursor;
        self.cursor.advance(spacing.pad_top);
        let y = self.cursor.y;
        self.push_op(DrawOp::Rule {
            x1: config.margin_x,
            x2: config.margin_x + width,
            y,
            thickness,
            gray: config.rule_gray,
        });
        self.cursor.advance(thickness);
        self.cursor.advance(spacing.gap_after);
        self.record(index, &Line::Divider, start, required);
        Ok(())
    }

    fn draw_spacer(&mut self, index: usize, height: f32) -> Measured<()> {
        if !height.is_finite() || height < 0.0 {
            return Err(InvalidGeometry("spacer height"));
        }
        let line = Line::Spacer { height };
        if self.cursor.fits(height, self.bottom()) || self.cursor.at_page_top() {
            let start = self.cursor;
            self.cursor.advance(height);
            self.record(index, &line, start, height);
        } else {
            // Absorbed by the break: the next page starts at the top margin.
            self.new_page();
            let start = self.cursor;
            self.record(index, &line, start, 0.0);
        }
        Ok(())
    }

    /// Draws a meta block. A block taller than the content area is split at
    /// row boundaries into one bordered box per page; a single row taller than
    /// a page is split between its wrapped lines.
    fn draw_meta(&mut self, index: usize, line: &Line, m: MetaMeasure) {
        let config = self.config;
        let spacing = config.spacing(line);
        let pad = config.meta_padding;
        let leading = config.meta_row_leading;
        let page_room = config.content_height() - 2.0 * pad;

        if m.height <= config.content_height() {
            self.ensure_room(m.height);
        } else {
            self.ensure_room(2.0 * pad + leading);
        }
        let start = self.cursor;
        let x = config.margin_x;
        let size = config.meta_size;

        let mut segment = self.open_meta_segment();
        for row in &m.rows {
            let row_height = row.row_count() as f32 * leading;
            if segment.used > 0.0 && !segment.fits(row_height, pad, self.bottom()) && row_height <= page_room {
                segment = self.next_meta_segment(segment);
            }
            for i in 0..row.row_count() {
                if segment.used > 0.0 && !segment.fits(leading, pad, self.bottom()) {
                    segment = self.next_meta_segment(segment);
                }
                let top = segment.top + pad + segment.used;
                if let Some(text) = row.label_rows.get(i) {
                    self.text_op(text, x + pad, top, FontFace::Bold, size, leading, config.ink_gray);
                }
                if let Some(text) = row.value_rows.get(i) {
                    self.text_op(text, x + m.value_offset, top, FontFace::Regular, size, leading, config.ink_gray);
                }
                segment.used += leading;
            }
        }
        self.close_meta_segment(&segment);

        self.cursor.advance(spacing.gap_after);
        self.record(index, line, start, m.height);
    }

    fn open_meta_segment(&self) -> MetaSegment {
        MetaSegment {
            top: self.cursor.y,
            used: 0.0,
            op_index: self.pages.get(self.cursor.page).map_or(0, |page| page.ops.len()),
        }
    }

    /// Puts the border behind the rows drawn so far and moves the cursor below it.
    fn close_meta_segment(&mut self, segment: &MetaSegment) {
        let config = self.config;
        let height = 2.0 * config.meta_padding + segment.used;
        let border = DrawOp::RoundedRect {
            x: config.margin_x,
            y: segment.top,
            width: config.content_width(),
            height,
            radius: config.meta_corner_radius,
            gray: config.border_gray,
        };
        if let Some(page) = self.pages.get_mut(self.cursor.page) {
            let at = segment.op_index.min(page.ops.len());
            page.ops.insert(at, border);
        }
        self.cursor.advance(height);
    }

    fn next_meta_segment(&mut self, segment: MetaSegment) -> MetaSegment {
        self.close_meta_segment(&segment);
        self.new_page();
        self.open_meta_segment()
    }

    /// Draws a two-column block. A block taller than the content area
    /// continues on the next page at a bullet boundary, repeating the heading
    /// and the titles of columns that still have bullets left.
    fn draw_two_column(&mut self, index: usize, line: &Line, m: TwoColumnMeasure) {
        let config = self.config;
        let spacing = config.spacing(line);

        if m.height <= config.content_height() {
            self.ensure_room(m.height);
        } else {
            let opening = |c: &ColumnMeasure| {
                c.title_height + if c.bullets.is_empty() { 0.0 } else { config.bullet_leading }
            };
            self.ensure_room(m.heading_height + opening(&m.left).max(opening(&m.right)));
        }
        let start = self.cursor;
        let x = config.margin_x;
        let right_x = x + m.column_width + config.column_gap;

        let mut left = ColumnFlow::default();
        let mut right = ColumnFlow::default();
        let mut continuation = false;
        loop {
            let top = self.cursor.y;
            let leading = config.two_col_heading_leading;
            for (i, row) in m.heading_rows.iter().enumerate() {
                let row_top = top + i as f32 * leading;
                self.text_op(row, x, row_top, FontFace::Bold, config.two_col_heading_size, leading, config.ink_gray);
            }

            let columns_top = top + m.heading_height;
            let fresh_room = config.content_height() - m.heading_height;
            let left_height = self.flow_column(&m.left, &mut left, x, columns_top, fresh_room, continuation);
            let right_height = self.flow_column(&m.right, &mut right, right_x, columns_top, fresh_room, continuation);
            self.cursor.advance(m.heading_height + left_height.max(right_height));

            if left.is_done(&m.left) && right.is_done(&m.right) {
                break;
            }
            self.new_page();
            continuation = true;
        }

        self.cursor.advance(spacing.gap_after);
        self.record(index, line, start, m.height);
    }

    /// Draws one column from `flow` onward with its own sub-cursor, stopping
    /// at the bottom margin. Returns the height drawn on this page.
    ///
    /// A bullet that does not fit is moved to the next page whole when it
    /// would fit there; otherwise it is split between its wrapped lines. At
    /// least one line is drawn per page so the flow always advances.
    fn flow_column(
        &mut self,
        column: &ColumnMeasure,
        flow: &mut ColumnFlow,
        x: f32,
        top: f32,
        fresh_room: f32,
        continuation: bool,
    ) -> f32 {
        if continuation && flow.is_done(column) {
            return 0.0;
        }
        let config = self.config;
        let bottom = self.bottom();
        let mut y = top;

        if !column.title_rows.is_empty() {
            let leading = config.column_title_leading;
            for row in &column.title_rows {
                self.text_op(row, x, y, FontFace::Bold, config.column_title_size, leading, config.ink_gray);
                y += leading;
            }
            y += config.gap_after_column_title;
        }

        let leading = config.bullet_leading;
        let size = config.bullet_size;
        let bullet_room = fresh_room - column.title_height;
        let mut drawn_any = false;
        while let Some(rows) = column.bullets.get(flow.bullet) {
            let gap = if drawn_any { config.gap_between_bullets } else { 0.0 };
            let rest = (rows.len() - flow.row) as f32 * leading;
            if drawn_any && y + gap + rest > bottom + 1e-3 && rest <= bullet_room {
                break;
            }
            y += gap;
            while let Some(row) = rows.get(flow.row) {
                if drawn_any && y + leading > bottom + 1e-3 {
                    return y - top;
                }
                if flow.row == 0 {
                    self.text_op(BULLET, x, y, FontFace::Regular, size, leading, config.muted_gray);
                }
                self.text_op(row, x + config.bullet_indent, y, FontFace::Regular, size, leading, config.ink_gray);
                y += leading;
                flow.row += 1;
                drawn_any = true;
            }
            flow.bullet += 1;
            flow.row = 0;
        }
        y - top
    }

    // ── footer ──────────────────────────────────────────────────────────────

    fn finish(mut self, footer_label: &str) -> LaidOutDocument {
        let config = self.config;
        let total = self.pages.len();
        let baseline = config.content_bottom() + config.footer_offset;
        let regular = get_metrics(FontFace::Regular);

        for (i, page) in self.pages.iter_mut().enumerate() {
            let page_text = format!("Page {} / {}", i + 1, total);
            let page_x = config.page_width - config.margin_x - regular.width_pt(&page_text, config.footer_size);
            page.footer.push(DrawOp::Text {
                x: config.margin_x,
                baseline,
                face: FontFace::Regular,
                size: config.footer_size,
                gray: config.muted_gray,
                text: footer_label.to_string(),
            });
            page.footer.push(DrawOp::Text {
                x: page_x,
                baseline,
                face: FontFace::Regular,
                size: config.footer_size,
                gray: config.muted_gray,
                text: page_text,
            });
        }

        LaidOutDocument {
            page_width: config.page_width,
            page_height: config.page_height,
            pages: self.pages,
            placements: self.placements,
            skipped: self.skipped,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::builder::{standard_header, LineBuilder};
    use crate::layout::model::EMPTY_META_VALUE;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const WORDS: &[&str] = &[
        "tour", "single", "vinyl", "playlist", "fans", "release", "mixtape", "chorus", "studio",
        "festival", "merch", "livestream", "acoustic", "remix", "newsletter",
    ];

    fn body(text: &str) -> Line {
        Line::Body {
            text: text.to_string(),
        }
    }

    fn texts_on(page: &LaidOutPage) -> Vec<&str> {
        page.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn lowest_point(op: &DrawOp) -> f32 {
        match op {
            DrawOp::Text { baseline, .. } => *baseline,
            DrawOp::Rule { y, thickness, .. } => y + thickness,
            DrawOp::RoundedRect { y, height, .. } => y + height,
        }
    }

    fn assert_within_margins(doc: &LaidOutDocument, config: &LayoutConfig) {
        let bottom = config.content_bottom();
        for (p, page) in doc.pages.iter().enumerate() {
            for op in &page.ops {
                assert!(
                    lowest_point(op) <= bottom + 1e-3,
                    "page {p}: {op:?} drawn below the bottom margin {bottom}"
                );
            }
        }
    }

    fn random_text(rng: &mut StdRng, max_words: usize) -> String {
        let n = rng.gen_range(1..=max_words);
        (0..n)
            .map(|_| WORDS[rng.gen_range(0..WORDS.len())])
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn random_line(rng: &mut StdRng) -> Line {
        match rng.gen_range(0..8) {
            0 => Line::Title {
                text: random_text(rng, 8),
            },
            1 => Line::Subtitle {
                text: random_text(rng, 12),
            },
            2 => Line::SectionTitle {
                text: random_text(rng, 5),
            },
            3 => Line::Body {
                text: random_text(rng, 400),
            },
            4 => Line::Divider,
            5 => Line::Spacer {
                height: rng.gen_range(1.0..120.0),
            },
            6 => Line::Meta {
                items: (0..rng.gen_range(1..6))
                    .map(|i| MetaItem::new(format!("Label {i}"), Some(random_text(rng, 6))))
                    .collect(),
            },
            _ => Line::TwoColumn(TwoColumn {
                heading: Some(random_text(rng, 4)),
                left_title: Some("Left".to_string()),
                left: (0..rng.gen_range(0..6)).map(|_| random_text(rng, 20)).collect(),
                right_title: None,
                right: (0..rng.gen_range(1..6)).map(|_| random_text(rng, 20)).collect(),
            }),
        }
    }

    #[test]
    fn test_empty_document_is_nothing_to_export() {
        let result = layout_document(&[], &LayoutConfig::default(), "Wavewright");
        assert!(matches!(result, Err(ExportError::NothingToExport(_))));
    }

    #[test]
    fn test_random_documents_never_draw_below_bottom_margin() {
        let config = LayoutConfig::default();
        let bottom = config.content_bottom();

        for seed in 0..64u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let count = rng.gen_range(1..60);
            let lines: Vec<Line> = (0..count).map(|_| random_line(&mut rng)).collect();
            let doc = layout_document(&lines, &config, "Wavewright").unwrap();

            assert!(doc.skipped.is_empty(), "seed {seed}: nothing should be skipped");
            for placement in &doc.placements {
                assert!(
                    placement.y <= bottom + 1e-3,
                    "seed {seed}: line {} drawn at y={} past bottom {}",
                    placement.index,
                    placement.y,
                    bottom
                );
            }
            for (p, page) in doc.pages.iter().enumerate() {
                for op in &page.ops {
                    assert!(
                        lowest_point(op) <= bottom + 1e-3,
                        "seed {seed}: page {p} op {op:?} crosses the bottom margin"
                    );
                }
            }
        }
    }

    #[test]
    fn test_divider_consumes_41_points_by_default() {
        let config = LayoutConfig::default();
        let lines = vec![Line::Divider, body("after")];
        let doc = layout_document(&lines, &config, "Wavewright").unwrap();
        let divider = &doc.placements[0];
        assert!(
            (divider.advance - 41.0).abs() < 1e-3,
            "divider advance should be 41, got {}",
            divider.advance
        );
        assert!((doc.placements[1].y - (config.margin_top + 41.0)).abs() < 1e-3);

        let rule = doc.pages[0]
            .ops
            .iter()
            .find_map(|op| match op {
                DrawOp::Rule {
                    x1,
                    x2,
                    thickness,
                    gray,
                    ..
                } => Some((*x1, *x2, *thickness, *gray)),
                _ => None,
            })
            .expect("divider draws a rule");
        assert_eq!(rule.0, config.margin_x);
        assert!((rule.1 - rule.0 - config.content_width()).abs() < 1e-3);
        assert_eq!(rule.2, 1.0);
        assert_eq!(rule.3, config.rule_gray);
    }

    #[test]
    fn test_meta_rows_keep_order_and_default_value() {
        let lines = vec![Line::Meta {
            items: vec![
                MetaItem::new("A", Some("1".to_string())),
                MetaItem::new("B", None),
            ],
        }];
        let doc = layout_document(&lines, &LayoutConfig::default(), "Wavewright").unwrap();
        let texts = texts_on(&doc.pages[0]);
        assert_eq!(texts, vec!["A", "1", "B", EMPTY_META_VALUE]);
        assert!(
            doc.pages[0]
                .ops
                .iter()
                .any(|op| matches!(op, DrawOp::RoundedRect { .. })),
            "meta block draws a rounded border"
        );
    }

    #[test]
    fn test_meta_labels_bold_values_regular() {
        let lines = vec![Line::Meta {
            items: vec![MetaItem::new("Genre", Some("Indie folk".to_string()))],
        }];
        let doc = layout_document(&lines, &LayoutConfig::default(), "Wavewright").unwrap();
        let faces: Vec<(FontFace, f32)> = doc.pages[0]
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { face, x, .. } => Some((*face, *x)),
                _ => None,
            })
            .collect();
        assert_eq!(faces[0].0, FontFace::Bold);
        assert_eq!(faces[1].0, FontFace::Regular);
        assert!(faces[1].1 > faces[0].1, "value column sits right of the label");
    }

    #[test]
    fn test_two_column_advance_follows_taller_column() {
        let config = LayoutConfig::default();
        let long = "Pitch the single to independent playlist curators with a personal note, \
                    a private streaming link, the story behind the song, two press photos, \
                    a short bio, upcoming tour dates, and a clear ask for consideration on \
                    their next refresh, then follow up exactly once a week later";
        let block = TwoColumn {
            heading: None,
            left_title: None,
            left: vec!["a", "b", "c", "d", "e"].into_iter().map(String::from).collect(),
            right_title: None,
            right: vec![long.to_string(), long.to_string()],
        };
        let measure = measure_two_column(&config, &block).unwrap();
        assert_eq!(measure.left.bullets.iter().map(Vec::len).sum::<usize>(), 5);
        assert!(
            measure.right.height > measure.left.height,
            "right column ({}) should be taller than left ({})",
            measure.right.height,
            measure.left.height
        );

        let doc = layout_document(&[Line::TwoColumn(block)], &config, "Wavewright").unwrap();
        let placement = &doc.placements[0];
        assert!((placement.height - measure.right.height).abs() < 1e-3);
        assert!(
            (placement.advance - (measure.right.height + config.gap_after_two_column)).abs() < 1e-3
        );
    }

    #[test]
    fn test_two_column_five_short_bullets_against_three_line_bullet() {
        let config = LayoutConfig::default();
        let block = TwoColumn {
            heading: None,
            left_title: None,
            left: vec!["Tour", "Merch", "Vinyl", "Radio", "Press"]
                .into_iter()
                .map(String::from)
                .collect(),
            right_title: None,
            right: vec!["Pitch the single to independent playlist curators with a personal note, \
                         a private link and the story behind the song"
                .to_string()],
        };
        let measure = measure_two_column(&config, &block).unwrap();
        assert_eq!(measure.right.bullets.len(), 1);
        assert_eq!(measure.right.bullets[0].len(), 3, "right bullet wraps to 3 lines");
        assert!(measure.left.bullets.iter().all(|rows| rows.len() == 1));

        let left_height = 5.0 * config.bullet_leading + 4.0 * config.gap_between_bullets;
        let right_height = 3.0 * config.bullet_leading;
        assert!((measure.left.height - left_height).abs() < 1e-3);
        assert!((measure.right.height - right_height).abs() < 1e-3);
        // With the default leading and bullet gap, five single-line bullets
        // outgrow one three-line bullet.
        assert!(measure.left.height > measure.right.height);

        let doc = layout_document(&[Line::TwoColumn(block)], &config, "Wavewright").unwrap();
        let placement = &doc.placements[0];
        assert!(
            (placement.advance - (left_height + config.gap_after_two_column)).abs() < 1e-3,
            "advance {} should follow the taller left column",
            placement.advance
        );
    }

    #[test]
    fn test_oversized_two_column_continues_on_next_page() {
        let config = LayoutConfig::default();
        let block = TwoColumn {
            heading: Some("Deliverables".to_string()),
            left_title: Some("Video".to_string()),
            left: (0..80).map(|i| format!("Deliverable number {i}")).collect(),
            right_title: Some("Audio".to_string()),
            right: vec!["x".to_string()],
        };
        let lines = vec![body("intro"), Line::TwoColumn(block), body("outro")];
        let doc = layout_document(&lines, &config, "Wavewright").unwrap();

        assert!(doc.page_count() > 1, "80 bullets cannot fit on one page");
        assert!(doc.skipped.is_empty());
        assert_within_margins(&doc, &config);

        let all: Vec<&str> = doc.pages.iter().flat_map(texts_on).collect();
        let numbered: Vec<String> = all
            .iter()
            .filter(|t| t.starts_with("Deliverable number"))
            .map(|t| t.to_string())
            .collect();
        let expected: Vec<String> = (0..80).map(|i| format!("Deliverable number {i}")).collect();
        assert_eq!(numbered, expected, "every bullet drawn once, in order");

        for (p, page) in doc.pages.iter().enumerate() {
            let texts = texts_on(page);
            if texts.iter().any(|t| t.starts_with("Deliverable number")) {
                assert!(texts.contains(&"Deliverables"), "page {p} repeats the heading");
                assert!(texts.contains(&"Video"), "page {p} repeats the column title");
            }
            if p > 0 {
                assert!(!texts.contains(&"Audio"), "finished column is not repeated on page {p}");
            }
        }
        assert!(all.contains(&"outro"));
    }

    #[test]
    fn test_oversized_meta_splits_into_one_box_per_page() {
        let config = LayoutConfig::default();
        let items: Vec<MetaItem> = (0..80)
            .map(|i| MetaItem::new(format!("Label {i}"), Some(format!("Value {i}"))))
            .collect();
        let doc = layout_document(&[Line::Meta { items }], &config, "Wavewright").unwrap();

        assert!(doc.page_count() > 1);
        assert_within_margins(&doc, &config);
        for (p, page) in doc.pages.iter().enumerate() {
            let boxes = page
                .ops
                .iter()
                .filter(|op| matches!(op, DrawOp::RoundedRect { .. }))
                .count();
            assert_eq!(boxes, 1, "page {p} has one bordered box");
            assert!(
                matches!(page.ops[0], DrawOp::RoundedRect { .. }),
                "border sits behind the rows on page {p}"
            );
        }

        let all: Vec<&str> = doc.pages.iter().flat_map(texts_on).collect();
        let labels: Vec<&str> = all.iter().copied().filter(|t| t.starts_with("Label")).collect();
        assert_eq!(labels.len(), 80);
        assert_eq!(labels[0], "Label 0");
        assert_eq!(labels[79], "Label 79");
        // Label and value of a row stay on the same page.
        for page in &doc.pages {
            let texts = texts_on(page);
            for label in texts.iter().filter(|t| t.starts_with("Label ")) {
                let value = label.replacen("Label", "Value", 1);
                assert!(texts.contains(&value.as_str()), "{label} split from its value");
            }
        }
    }

    #[test]
    fn test_meta_row_taller_than_page_is_split_between_lines() {
        let config = LayoutConfig::default();
        let items = vec![
            MetaItem::new("Notes", Some("setlist ".repeat(2000))),
            MetaItem::new("After", Some("done".to_string())),
        ];
        let doc = layout_document(&[Line::Meta { items }], &config, "Wavewright").unwrap();
        assert!(doc.page_count() > 1);
        assert_within_margins(&doc, &config);
        let last = doc.pages.last().map(texts_on).unwrap_or_default();
        assert!(last.contains(&"done"));
    }

    #[test]
    fn test_two_column_right_block_is_offset() {
        let config = LayoutConfig::default();
        let block = TwoColumn {
            heading: Some("Brand voice".to_string()),
            left_title: Some("Do".to_string()),
            left: vec!["Be warm".to_string()],
            right_title: Some("Avoid".to_string()),
            right: vec!["Hype".to_string()],
        };
        let measure = measure_two_column(&config, &block).unwrap();
        let doc = layout_document(&[Line::TwoColumn(block)], &config, "Wavewright").unwrap();
        let avoid_x = doc.pages[0]
            .ops
            .iter()
            .find_map(|op| match op {
                DrawOp::Text { text, x, .. } if text == "Avoid" => Some(*x),
                _ => None,
            })
            .unwrap();
        let expected = config.margin_x + measure.column_width + config.column_gap;
        assert!((avoid_x - expected).abs() < 1e-3);
        assert!(texts_on(&doc.pages[0]).contains(&BULLET));
    }

    #[test]
    fn test_standard_header_document_is_single_page() {
        let mut builder = LineBuilder::with_header("X", None, vec![]);
        builder.divider().section_title("Y").body("Z");
        let lines = builder.finish();
        let kinds: Vec<&str> = lines.iter().map(Line::kind_name).collect();
        assert_eq!(kinds, vec!["title", "divider", "divider", "sectionTitle", "body"]);

        let doc = layout_document(&lines, &LayoutConfig::default(), "Wavewright").unwrap();
        assert_eq!(doc.page_count(), 1);
        assert!(doc.placements.iter().all(|p| p.page == 0));
        assert_eq!(texts_on(&doc.pages[0]), vec!["X", "Y", "Z"]);
        assert_eq!(standard_header("X", None, vec![]).len(), 2);
    }

    #[test]
    fn test_placements_follow_line_order() {
        let lines = vec![
            Line::Title {
                text: "One".to_string(),
            },
            body("Two"),
            body("Three"),
        ];
        let doc = layout_document(&lines, &LayoutConfig::default(), "Wavewright").unwrap();
        let ys: Vec<f32> = doc.placements.iter().map(|p| p.y).collect();
        assert!(ys.windows(2).all(|w| w[0] < w[1]), "y must increase: {ys:?}");
    }

    #[test]
    fn test_overflow_starts_new_page_at_top_margin() {
        let config = LayoutConfig::default();
        let paragraph = "word ".repeat(180);
        let lines: Vec<Line> = (0..12).map(|_| body(&paragraph)).collect();
        let doc = layout_document(&lines, &config, "Wavewright").unwrap();
        assert!(doc.page_count() > 1);
        let first_on_page_two = doc.placements.iter().find(|p| p.page == 1).unwrap();
        assert!((first_on_page_two.y - config.margin_top).abs() < 1e-3);
    }

    #[test]
    fn test_oversized_body_flows_across_pages() {
        let config = LayoutConfig::default();
        let huge = "lyric ".repeat(3000);
        let doc = layout_document(&[body(&huge)], &config, "Wavewright").unwrap();
        assert!(doc.page_count() >= 2, "a huge paragraph must span pages");
        assert!(doc.skipped.is_empty());
    }

    #[test]
    fn test_footer_on_every_page() {
        let lines: Vec<Line> = (0..6).map(|_| body(&"beat ".repeat(400))).collect();
        let doc = layout_document(&lines, &LayoutConfig::default(), "Wavewright").unwrap();
        let total = doc.page_count();
        for (i, page) in doc.pages.iter().enumerate() {
            let footer: Vec<&str> = page
                .footer
                .iter()
                .filter_map(|op| match op {
                    DrawOp::Text { text, .. } => Some(text.as_str()),
                    _ => None,
                })
                .collect();
            assert_eq!(footer, vec!["Wavewright".to_string(), format!("Page {} / {}", i + 1, total)]);
        }
    }

    #[test]
    fn test_footer_is_right_aligned_and_muted() {
        let config = LayoutConfig::default();
        let doc = layout_document(&[body("hi")], &config, "Wavewright").unwrap();
        match &doc.pages[0].footer[1] {
            DrawOp::Text {
                x,
                size,
                gray,
                text,
                baseline,
                ..
            } => {
                let width = get_metrics(FontFace::Regular).width_pt(text, *size);
                assert!((x + width - (config.page_width - config.margin_x)).abs() < 1e-3);
                assert_eq!(*gray, config.muted_gray);
                assert!(*size < config.body_size);
                assert!(*baseline > config.content_bottom());
            }
            other => panic!("expected footer text, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_geometry_skips_line_without_failing() {
        let config = LayoutConfig {
            column_gap: 1000.0,
            ..LayoutConfig::default()
        };
        let lines = vec![
            body("before"),
            Line::TwoColumn(TwoColumn {
                left: vec!["x".to_string()],
                ..TwoColumn::default()
            }),
            body("after"),
        ];
        let doc = layout_document(&lines, &config, "Wavewright").unwrap();
        assert_eq!(doc.skipped, vec![1]);
        assert_eq!(texts_on(&doc.pages[0]), vec!["before", "after"]);
    }

    #[test]
    fn test_negative_spacer_is_skipped() {
        let lines = vec![Line::Spacer { height: -3.0 }, body("ok")];
        let doc = layout_document(&lines, &LayoutConfig::default(), "Wavewright").unwrap();
        assert_eq!(doc.skipped, vec![0]);
    }

    #[test]
    fn test_spacer_crossing_bottom_is_absorbed_by_break() {
        let config = LayoutConfig::default();
        let lines = vec![
            body("top"),
            Line::Spacer {
                height: config.content_height(),
            },
            body("next"),
        ];
        let doc = layout_document(&lines, &config, "Wavewright").unwrap();
        assert_eq!(doc.page_count(), 2);
        let next = &doc.placements[2];
        assert_eq!(next.page, 1);
        assert!((next.y - config.margin_top).abs() < 1e-3);
    }

    #[test]
    fn test_section_title_is_uppercased_with_pad() {
        let config = LayoutConfig::default();
        let lines = vec![Line::SectionTitle {
            text: "Audience".to_string(),
        }];
        let doc = layout_document(&lines, &config, "Wavewright").unwrap();
        assert_eq!(texts_on(&doc.pages[0]), vec!["AUDIENCE"]);
        let placement = &doc.placements[0];
        assert!(
            (placement.height - (config.section_pad_top + config.section_leading)).abs() < 1e-3
        );
    }
}
