use axum::{
    extract::State,
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::errors::{AppError, ExportError};
use crate::exports::calendar::{self, ContentCalendar, DateRange};
use crate::exports::campaign::{self, CampaignConcepts};
use crate::exports::identity_kit::{self, IdentityKit};
use crate::exports::{from_value_or_fallback, Validated};
use crate::layout::builder::normalize_lines;
use crate::layout::config::{LayoutConfig, LayoutOverride};
use crate::layout::model::Line;
use crate::preview::render_preview;
use crate::render::{self, ExportOptions, RenderedPdf};
use crate::state::AppState;

const EXPORT_SOURCE: HeaderName = HeaderName::from_static("x-export-source");
const PAGE_COUNT: HeaderName = HeaderName::from_static("x-page-count");

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Pdf,
    Preview,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfExportRequest {
    pub lines: Vec<Line>,
    pub filename_base: String,
    #[serde(default)]
    pub layout: Option<LayoutOverride>,
    #[serde(default)]
    pub options: Option<ExportOptions>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
    pub lines: Vec<Line>,
    #[serde(default)]
    pub layout: Option<LayoutOverride>,
}

/// Body of the identity-kit and campaign exports. `payload` is the model's
/// output, either as JSON or as the raw (possibly fenced) text.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainExportRequest {
    #[serde(default)]
    pub payload: Value,
    #[serde(default)]
    pub format: ExportFormat,
    #[serde(default)]
    pub layout: Option<LayoutOverride>,
    #[serde(default)]
    pub options: Option<ExportOptions>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarExportRequest {
    #[serde(default)]
    pub payload: Value,
    #[serde(default)]
    pub format: ExportFormat,
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default)]
    pub layout: Option<LayoutOverride>,
    #[serde(default)]
    pub options: Option<ExportOptions>,
}

// ────────────────────────────────────────────────────────────────────────────
// Shared response helpers
// ────────────────────────────────────────────────────────────────────────────

/// Renders on the blocking pool and optionally saves a copy to `EXPORT_DIR`.
async fn render_pdf(
    state: &AppState,
    lines: Vec<Line>,
    filename_base: String,
    layout: Option<LayoutOverride>,
    options: ExportOptions,
) -> Result<RenderedPdf, AppError> {
    let export_dir = state.config.export_dir.clone();
    let rendered = tokio::task::spawn_blocking(move || -> Result<RenderedPdf, ExportError> {
        let pdf = render::render(&lines, &filename_base, layout.as_ref(), &options)?;
        if let Some(dir) = export_dir {
            pdf.save(&dir)?;
        }
        Ok(pdf)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in render: {e}")))??;
    Ok(rendered)
}

fn pdf_response(pdf: RenderedPdf, source: &'static str) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", pdf.filename),
            ),
            (PAGE_COUNT, pdf.page_count.to_string()),
            (EXPORT_SOURCE, source.to_string()),
        ],
        pdf.bytes,
    )
        .into_response()
}

fn preview_response(lines: &[Line], layout: Option<&LayoutOverride>, source: &'static str) -> Response {
    let defaults = LayoutConfig::default();
    let config = match layout {
        Some(overrides) => defaults.merged(overrides),
        None => defaults,
    };
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
            (EXPORT_SOURCE, source),
        ],
        render_preview(lines, &config),
    )
        .into_response()
}

async fn respond<T>(
    state: &AppState,
    validated: &Validated<T>,
    lines: Vec<Line>,
    filename_base: String,
    format: ExportFormat,
    layout: Option<LayoutOverride>,
    options: ExportOptions,
) -> Result<Response, AppError> {
    info!(
        source = validated.source(),
        lines = lines.len(),
        format = ?format,
        "Building export for {filename_base}"
    );
    match format {
        ExportFormat::Preview => Ok(preview_response(&lines, layout.as_ref(), validated.source())),
        ExportFormat::Pdf => {
            let pdf = render_pdf(state, lines, filename_base, layout, options).await?;
            Ok(pdf_response(pdf, validated.source()))
        }
    }
}

fn prepared_date(options: &ExportOptions) -> NaiveDate {
    options.date.unwrap_or_else(|| chrono::Local::now().date_naive())
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/exports/pdf
pub async fn handle_export_pdf(
    State(state): State<AppState>,
    Json(req): Json<PdfExportRequest>,
) -> Result<Response, AppError> {
    let options = state.export_options(req.options);
    let lines = normalize_lines(req.lines);
    let pdf = render_pdf(&state, lines, req.filename_base, req.layout, options).await?;
    Ok(pdf_response(pdf, "client"))
}

/// POST /api/v1/exports/preview
pub async fn handle_export_preview(Json(req): Json<PreviewRequest>) -> Result<Response, AppError> {
    let lines = normalize_lines(req.lines);
    Ok(preview_response(&lines, req.layout.as_ref(), "client"))
}

/// POST /api/v1/exports/identity-kit
pub async fn handle_export_identity_kit(
    State(state): State<AppState>,
    Json(req): Json<DomainExportRequest>,
) -> Result<Response, AppError> {
    let options = state.export_options(req.options);
    let validated: Validated<IdentityKit> = from_value_or_fallback(req.payload);
    let kit = validated.payload();
    let lines = identity_kit::build_lines(kit, prepared_date(&options));
    let base = format!("{} identity kit", kit.artist_name.trim());
    respond(&state, &validated, lines, base, req.format, req.layout, options).await
}

/// POST /api/v1/exports/campaigns
pub async fn handle_export_campaigns(
    State(state): State<AppState>,
    Json(req): Json<DomainExportRequest>,
) -> Result<Response, AppError> {
    let options = state.export_options(req.options);
    let validated: Validated<CampaignConcepts> = from_value_or_fallback(req.payload);
    let concepts = validated.payload();
    let lines = campaign::build_lines(concepts, prepared_date(&options));
    let base = format!("{} campaigns", concepts.artist_name.trim());
    respond(&state, &validated, lines, base, req.format, req.layout, options).await
}

/// POST /api/v1/exports/calendar
pub async fn handle_export_calendar(
    State(state): State<AppState>,
    Json(req): Json<CalendarExportRequest>,
) -> Result<Response, AppError> {
    let range = DateRange::new(req.start, req.end).map_err(AppError::Validation)?;
    let options = state.export_options(req.options);
    let validated: Validated<ContentCalendar> =
        calendar::resolve(from_value_or_fallback(req.payload), &range);
    let lines = calendar::build_lines(validated.payload(), &range)?;
    let base = format!(
        "{} calendar {}",
        validated.payload().artist_name.trim(),
        range.start.format("%Y-%m")
    );
    respond(&state, &validated, lines, base, req.format, req.layout, options).await
}
