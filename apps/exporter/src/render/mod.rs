//! Document rendering: line sequence → paginated PDF bytes + filename.
//!
//! `document` measures and paginates into per-page draw lists, `pdf` serializes
//! them with lopdf. Layout is CPU-bound; async callers must run `render` inside
//! `tokio::task::spawn_blocking`.

pub mod cursor;
pub mod document;
pub mod filename;
pub mod pdf;

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use crate::errors::ExportError;
use crate::layout::config::{LayoutConfig, LayoutOverride};
use crate::layout::model::Line;

use document::layout_document;
use filename::export_filename;

pub const DEFAULT_PRODUCT_NAME: &str = "Wavewright";

/// Per-export filename and footer options.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportOptions {
    /// Filename tag; `ww` when absent.
    pub prefix: Option<String>,
    /// Overrides the filename base for the slug.
    pub slug: Option<String>,
    pub include_date: bool,
    /// Date stamp; today when absent and `include_date` is set.
    pub date: Option<NaiveDate>,
    /// Footer product name. Set by the service, not by clients.
    #[serde(skip)]
    pub footer_label: Option<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            prefix: None,
            slug: None,
            include_date: true,
            date: None,
            footer_label: None,
        }
    }
}

impl ExportOptions {
    pub fn filename(&self, filename_base: &str) -> String {
        let base = self
            .slug
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(filename_base);
        let date = self
            .include_date
            .then(|| self.date.unwrap_or_else(|| chrono::Local::now().date_naive()));
        export_filename(self.prefix.as_deref().unwrap_or_default(), base, date)
    }

    fn footer_label(&self) -> &str {
        self.footer_label.as_deref().unwrap_or(DEFAULT_PRODUCT_NAME)
    }
}

/// A finished export.
#[derive(Debug, Clone)]
pub struct RenderedPdf {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
    /// Indices of lines skipped for invalid geometry.
    pub skipped_lines: Vec<usize>,
}

impl RenderedPdf {
    /// Writes the PDF into `dir` under its filename and returns the full path.
    pub fn save(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.bytes)?;
        info!(path = %path.display(), bytes = self.bytes.len(), "Saved export");
        Ok(path)
    }
}

/// Renders `lines` to a PDF. `layout` is merged over a copy of the defaults.
///
/// Fails with `NothingToExport` when `lines` is empty.
pub fn render(
    lines: &[Line],
    filename_base: &str,
    layout: Option<&LayoutOverride>,
    options: &ExportOptions,
) -> Result<RenderedPdf, ExportError> {
    let defaults = LayoutConfig::default();
    let config = match layout {
        Some(overrides) => defaults.merged(overrides),
        None => defaults,
    };

    let laid_out = layout_document(lines, &config, options.footer_label())?;
    let bytes = pdf::write_pdf(
        &laid_out,
        &pdf::PdfInfo {
            title: filename_base,
            producer: options.footer_label(),
        },
    )?;
    let filename = options.filename(filename_base);

    info!(
        filename = %filename,
        lines = lines.len(),
        pages = laid_out.page_count(),
        skipped = laid_out.skipped.len(),
        "Rendered PDF"
    );

    Ok(RenderedPdf {
        filename,
        bytes,
        page_count: laid_out.page_count(),
        skipped_lines: laid_out.skipped,
    })
}
