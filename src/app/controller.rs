//! The UI controller: owns the state, the capabilities and both previews.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::state::{AppState, Edit};
use crate::barcode::{BarcodeRenderer, BarcodeSurface, BarsRenderer};
use crate::config::StudioConfig;
use crate::error::RenderError;
use crate::export::{
    self, BARCODE_FILE_STEM, DownloadDir, ExportError, ExportFormat, ExportOptions, FileSaver,
    ImageCapture, QR_FILE_STEM, Region, RegionCapture,
};
use crate::logo::{self, LogoError};
use crate::qr::{ModuleQrRenderer, QrPreview, QrRenderer};

/// The rendering and export capabilities the controller calls into.
pub struct Capabilities {
    pub qr: Box<dyn QrRenderer>,
    pub barcode: Box<dyn BarcodeRenderer>,
    pub capture: Box<dyn RegionCapture>,
    pub saver: Box<dyn FileSaver>,
}

impl Capabilities {
    /// The built-in implementations, saving into `download_dir`.
    pub fn standard(download_dir: impl AsRef<Path>) -> Self {
        Self {
            qr: Box::new(ModuleQrRenderer),
            barcode: Box::new(BarsRenderer),
            capture: Box::new(ImageCapture),
            saver: Box::new(DownloadDir::new(download_dir.as_ref())),
        }
    }
}

/// Drives the two previews from form edits.
///
/// The QR preview is live: every edit that changes the QR request re-renders
/// it. The barcode surface only changes on [`Controller::generate_barcode`].
pub struct Controller {
    state: AppState,
    caps: Capabilities,
    qr_preview: QrPreview,
    qr_renders: usize,
    barcode_surface: BarcodeSurface,
    export_options: ExportOptions,
}

impl Controller {
    /// Mount with the given capabilities and render the initial QR preview.
    pub fn new(config: &StudioConfig, caps: Capabilities) -> Result<Self, RenderError> {
        let state = AppState::new(config.viewport_width);
        let qr_preview = render_qr(caps.qr.as_ref(), &state)?;

        Ok(Self {
            state,
            caps,
            qr_preview,
            qr_renders: 1,
            barcode_surface: BarcodeSurface::blank(),
            export_options: ExportOptions::default(),
        })
    }

    /// Mount with the built-in capabilities.
    pub fn standard(config: &StudioConfig) -> Result<Self, RenderError> {
        Self::new(config, Capabilities::standard(&config.download_dir))
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn qr_preview(&self) -> &QrPreview {
        &self.qr_preview
    }

    /// How many times the QR preview has been rendered.
    pub fn qr_render_count(&self) -> usize {
        self.qr_renders
    }

    pub fn barcode_surface(&self) -> &BarcodeSurface {
        &self.barcode_surface
    }

    pub fn export_options(&self) -> &ExportOptions {
        &self.export_options
    }

    pub fn set_export_options(&mut self, options: ExportOptions) {
        self.export_options = options;
    }

    /// Apply a form edit.
    ///
    /// If the QR request changed, the preview is re-rendered. A failed
    /// render keeps the previous preview and returns the error; the edit
    /// itself is still applied.
    pub fn dispatch(&mut self, edit: Edit) -> Result<(), RenderError> {
        tracing::debug!(?edit, "dispatch");
        let next = self.state.reduce(edit);
        let qr_changed = next.qr != self.state.qr;
        self.state = next;

        if qr_changed {
            self.refresh_qr()?;
        }
        Ok(())
    }

    fn refresh_qr(&mut self) -> Result<(), RenderError> {
        match render_qr(self.caps.qr.as_ref(), &self.state) {
            Ok(preview) => {
                self.qr_renders += 1;
                tracing::debug!(
                    size = preview.graphic().size(),
                    modules = preview.graphic().modules_per_side(),
                    logo = preview.logo().is_some(),
                    "qr rendered"
                );
                self.qr_preview = preview;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "qr render failed, keeping previous preview");
                Err(e)
            }
        }
    }

    /// Draw the barcode from the current form state.
    ///
    /// On failure the previous surface is kept.
    pub fn generate_barcode(&mut self) -> Result<(), RenderError> {
        let request = &self.state.barcode;
        let spec = request.spec(self.state.viewport_width);

        match self.caps.barcode.render(&spec) {
            Ok(surface) => {
                let (width, height) = surface.image().dimensions();
                tracing::info!(
                    symbology = %request.symbology,
                    data = spec.data,
                    width,
                    height,
                    "barcode generated"
                );
                self.barcode_surface = surface;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "barcode generation failed, keeping previous surface");
                Err(e)
            }
        }
    }

    /// Load a logo file and put it over the QR code.
    ///
    /// A failed load leaves the logo unchanged.
    pub async fn upload_logo(&mut self, path: impl AsRef<Path>) -> Result<(), UploadError> {
        let logo = logo::load(path.as_ref()).await.map_err(|e| {
            tracing::warn!(error = %e, "logo load failed");
            UploadError::Load(e)
        })?;
        self.dispatch(Edit::LogoLoaded(Arc::new(logo)))
            .map_err(UploadError::Render)
    }

    /// Capture the QR preview and save it as `QRCode.<ext>`.
    pub async fn export_qr(&self, format: ExportFormat) -> Result<PathBuf, ExportError> {
        export::export(
            self.caps.capture.as_ref(),
            self.caps.saver.as_ref(),
            Region::Qr(&self.qr_preview),
            QR_FILE_STEM,
            format,
            &self.export_options,
        )
        .await
    }

    /// Capture the barcode surface and save it as `Barcode.<ext>`.
    ///
    /// Before any generation this saves the blank surface.
    pub async fn export_barcode(&self, format: ExportFormat) -> Result<PathBuf, ExportError> {
        if self.barcode_surface.is_blank() {
            tracing::debug!("exporting barcode before generation");
        }
        export::export(
            self.caps.capture.as_ref(),
            self.caps.saver.as_ref(),
            Region::Barcode(&self.barcode_surface),
            BARCODE_FILE_STEM,
            format,
            &self.export_options,
        )
        .await
    }
}

/// Why an upload did not change the preview.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error(transparent)]
    Load(#[from] LogoError),

    /// The logo was stored but the QR preview could not be re-rendered
    #[error(transparent)]
    Render(RenderError),
}

fn render_qr(renderer: &dyn QrRenderer, state: &AppState) -> Result<QrPreview, RenderError> {
    let graphic = renderer.render(&state.qr.spec())?;
    Ok(QrPreview::new(graphic, state.qr.logo.clone()))
}
