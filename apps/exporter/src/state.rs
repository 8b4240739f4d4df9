use crate::config::Config;
use crate::render::ExportOptions;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        AppState { config }
    }

    /// Fills in the service-owned fields of client-supplied export options.
    pub fn export_options(&self, requested: Option<ExportOptions>) -> ExportOptions {
        let mut options = requested.unwrap_or_default();
        if options.prefix.as_deref().map_or(true, |p| p.trim().is_empty()) {
            options.prefix = Some(self.config.export_prefix.clone());
        }
        options.footer_label = Some(self.config.product_name.clone());
        options
    }
}
