//! Line construction: the only way domain content becomes `Line`s.
//!
//! Every string passes through `normalize_text`; empty strings, empty lists and
//! empty blocks are dropped here so the renderers never see "nothing" content.

use crate::layout::model::{Line, MetaItem, TwoColumn};
use crate::layout::text::{non_empty, non_empty_list};

/// Title used by `standard_header` when the supplied one normalizes to nothing.
const UNTITLED: &str = "Untitled";

/// Accumulates lines in order, filtering empty content.
#[derive(Debug, Default)]
pub struct LineBuilder {
    lines: Vec<Line>,
}

impl LineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a document with the standard header: title, optional subtitle,
    /// optional meta block, divider.
    pub fn with_header(title: &str, subtitle: Option<&str>, meta: Vec<MetaItem>) -> Self {
        let mut builder = Self::new();
        let title = non_empty(title).unwrap_or_else(|| UNTITLED.to_string());
        builder.lines.push(Line::Title { text: title });
        if let Some(subtitle) = subtitle {
            builder.subtitle(subtitle);
        }
        builder.meta(meta);
        builder.divider();
        builder
    }

    pub fn title(&mut self, text: &str) -> &mut Self {
        if let Some(text) = non_empty(text) {
            self.lines.push(Line::Title { text });
        }
        self
    }

    pub fn subtitle(&mut self, text: &str) -> &mut Self {
        if let Some(text) = non_empty(text) {
            self.lines.push(Line::Subtitle { text });
        }
        self
    }

    pub fn section_title(&mut self, text: &str) -> &mut Self {
        if let Some(text) = non_empty(text) {
            self.lines.push(Line::SectionTitle { text });
        }
        self
    }

    pub fn body(&mut self, text: &str) -> &mut Self {
        if let Some(text) = non_empty(text) {
            self.lines.push(Line::Body { text });
        }
        self
    }

    /// Adds one body paragraph per non-empty entry.
    pub fn paragraphs<S: AsRef<str>>(&mut self, items: &[S]) -> &mut Self {
        for item in items {
            self.body(item.as_ref());
        }
        self
    }

    pub fn divider(&mut self) -> &mut Self {
        self.lines.push(Line::Divider);
        self
    }

    /// Explicit gap in points. Non-positive or non-finite heights are dropped.
    pub fn spacer(&mut self, height: f32) -> &mut Self {
        if height.is_finite() && height > 0.0 {
            self.lines.push(Line::Spacer { height });
        }
        self
    }

    /// Meta block; rows with an empty label are dropped, empty values become absent.
    pub fn meta(&mut self, items: Vec<MetaItem>) -> &mut Self {
        let items: Vec<MetaItem> = items
            .into_iter()
            .filter_map(|item| {
                let label = non_empty(&item.label)?;
                let value = item.value.as_deref().and_then(non_empty);
                Some(MetaItem { label, value })
            })
            .collect();
        if !items.is_empty() {
            self.lines.push(Line::Meta { items });
        }
        self
    }

    /// Two-column block; dropped entirely when both columns end up empty.
    pub fn two_column(&mut self, block: TwoColumn) -> &mut Self {
        let left = non_empty_list(&block.left);
        let right = non_empty_list(&block.right);
        if left.is_empty() && right.is_empty() {
            return self;
        }
        // A title over an empty column would render as an orphan heading.
        let left_title = block
            .left_title
            .as_deref()
            .and_then(non_empty)
            .filter(|_| !left.is_empty());
        let right_title = block
            .right_title
            .as_deref()
            .and_then(non_empty)
            .filter(|_| !right.is_empty());
        self.lines.push(Line::TwoColumn(TwoColumn {
            heading: block.heading.as_deref().and_then(non_empty),
            left_title,
            left,
            right_title,
            right,
        }));
        self
    }

    /// Re-applies the construction rules to a line that arrived from outside.
    pub fn push(&mut self, line: Line) -> &mut Self {
        match line {
            Line::Title { text } => self.title(&text),
            Line::Subtitle { text } => self.subtitle(&text),
            Line::SectionTitle { text } => self.section_title(&text),
            Line::Body { text } => self.body(&text),
            Line::Divider => self.divider(),
            Line::Spacer { height } => self.spacer(height),
            Line::Meta { items } => self.meta(items),
            Line::TwoColumn(block) => self.two_column(block),
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn finish(self) -> Vec<Line> {
        self.lines
    }
}

/// Builds the standard document header as a standalone line list.
pub fn standard_header(title: &str, subtitle: Option<&str>, meta: Vec<MetaItem>) -> Vec<Line> {
    LineBuilder::with_header(title, subtitle, meta).finish()
}

/// Normalizes lines received over the wire (e.g. the raw `/exports/pdf` body).
pub fn normalize_lines(lines: Vec<Line>) -> Vec<Line> {
    let mut builder = LineBuilder::new();
    for line in lines {
        builder.push(line);
    }
    builder.finish()
}
