//! # Session Loop
//!
//! Replays a stream of form events against a [`Controller`], one JSON
//! object per line:
//!
//! ```text
//! {"type": "qr_text", "value": "https://example.com"}
//! {"type": "upload_logo", "path": "logo.png"}
//! {"type": "settle"}
//! {"type": "export_qr", "format": "svg"}
//! {"type": "barcode_text", "value": "ABC-123"}
//! {"type": "symbology", "value": "CODE39"}
//! {"type": "generate_barcode"}
//! {"type": "export_barcode"}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.
//!
//! The loop is single-threaded. Each turn it takes, in priority order:
//! 1. a pending viewport resize, delivered through the [`ViewportObserver`]
//! 2. a finished logo load
//! 3. the next script line
//!
//! Logo loads run as spawned tasks and finish in any order; the last one to
//! finish wins. `settle` (and end of input) waits for all of them.

use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

use crate::app::{Controller, Edit};
use crate::barcode::Symbology;
use crate::color::HexColor;
use crate::error::{RenderError, StudioError};
use crate::export::{ExportError, ExportFormat};
use crate::logo::{self, Logo, LogoError};
use crate::viewport::{ViewportObserver, Window};

/// One line of a session script.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptEvent {
    QrText { value: String },
    QrForeground { value: HexColor },
    QrBackground { value: HexColor },
    UploadLogo { path: PathBuf },
    Resize { width: u32 },
    BarcodeText { value: String },
    Symbology { value: Symbology },
    BarcodeForeground { value: HexColor },
    BarcodeBackground { value: HexColor },
    GenerateBarcode,
    ExportQr {
        #[serde(default)]
        format: ExportFormat,
    },
    ExportBarcode {
        #[serde(default)]
        format: ExportFormat,
    },
    Settle,
}

/// What went wrong, without a user-facing message attached.
#[derive(Debug, Error)]
pub enum Failure {
    #[error(transparent)]
    Logo(LogoError),

    #[error(transparent)]
    Render(RenderError),

    #[error(transparent)]
    Export(ExportError),
}

/// Outcome of a session.
#[derive(Debug, Default)]
pub struct SessionReport {
    /// Files written, in order
    pub saved: Vec<PathBuf>,
    /// Failure signals, tagged with the script line that caused them
    pub failures: Vec<(usize, Failure)>,
}

type LoadResult = (usize, Result<Logo, LogoError>);

/// A mounted form being driven by a script.
pub struct Session {
    controller: Controller,
    window: Window,
    observer: ViewportObserver,
    loads_tx: mpsc::UnboundedSender<LoadResult>,
    loads_rx: mpsc::UnboundedReceiver<LoadResult>,
    pending_loads: usize,
    report: SessionReport,
}

impl Session {
    /// Mount the viewport observer on a window of the controller's width.
    pub fn new(controller: Controller) -> Self {
        let window = Window::new(controller.state().viewport_width);
        let observer = ViewportObserver::mount(&window);
        let (loads_tx, loads_rx) = mpsc::unbounded_channel();

        Self {
            controller,
            window,
            observer,
            loads_tx,
            loads_rx,
            pending_loads: 0,
            report: SessionReport::default(),
        }
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// Run the script to completion.
    ///
    /// Returns the report, or a [`StudioError::Script`] for a malformed line.
    pub async fn run<R>(mut self, reader: R) -> Result<(Controller, SessionReport), StudioError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();
        let mut line_no = 0usize;
        let mut input_done = false;
        let mut settling = false;

        loop {
            if settling && self.pending_loads == 0 {
                settling = false;
            }
            if input_done && self.pending_loads == 0 {
                break;
            }

            tokio::select! {
                biased;

                Some(width) = self.observer.changed() => {
                    tracing::debug!(width, "viewport resized");
                    let result = self.edit(Edit::Resized(width));
                    self.record(line_no, result);
                }

                Some((origin, result)) = self.loads_rx.recv(), if self.pending_loads > 0 => {
                    self.pending_loads -= 1;
                    self.finish_load(origin, result);
                }

                line = lines.next_line(), if !input_done && !settling => {
                    match line? {
                        None => input_done = true,
                        Some(line) => {
                            line_no += 1;
                            let trimmed = line.trim();
                            if trimmed.is_empty() || trimmed.starts_with('#') {
                                continue;
                            }
                            let event: ScriptEvent = serde_json::from_str(trimmed)
                                .map_err(|e| StudioError::Script(format!("line {}: {}", line_no, e)))?;
                            if event == ScriptEvent::Settle {
                                settling = true;
                            } else {
                                self.handle(line_no, event).await;
                            }
                        }
                    }
                }

                else => break,
            }
        }

        tracing::info!(
            saved = self.report.saved.len(),
            failures = self.report.failures.len(),
            "session finished"
        );
        Ok((self.controller, self.report))
    }

    async fn handle(&mut self, line: usize, event: ScriptEvent) {
        tracing::debug!(line, ?event, "event");
        let result = match event {
            ScriptEvent::QrText { value } => self.edit(Edit::QrText(value)),
            ScriptEvent::QrForeground { value } => self.edit(Edit::QrForeground(value)),
            ScriptEvent::QrBackground { value } => self.edit(Edit::QrBackground(value)),
            ScriptEvent::BarcodeText { value } => self.edit(Edit::BarcodeText(value)),
            ScriptEvent::Symbology { value } => self.edit(Edit::Symbology(value)),
            ScriptEvent::BarcodeForeground { value } => self.edit(Edit::BarcodeForeground(value)),
            ScriptEvent::BarcodeBackground { value } => self.edit(Edit::BarcodeBackground(value)),
            ScriptEvent::Resize { width } => {
                // Applied when the observer sees the change
                self.window.resize(width);
                Ok(())
            }
            ScriptEvent::UploadLogo { path } => {
                self.start_load(line, path);
                Ok(())
            }
            ScriptEvent::GenerateBarcode => self.controller.generate_barcode().map_err(Failure::Render),
            ScriptEvent::ExportQr { format } => {
                let saved = self.controller.export_qr(format).await;
                self.saved(saved)
            }
            ScriptEvent::ExportBarcode { format } => {
                let saved = self.controller.export_barcode(format).await;
                self.saved(saved)
            }
            ScriptEvent::Settle => Ok(()),
        };
        self.record(line, result);
    }

    fn edit(&mut self, edit: Edit) -> Result<(), Failure> {
        self.controller.dispatch(edit).map_err(Failure::Render)
    }

    fn saved(&mut self, result: Result<PathBuf, ExportError>) -> Result<(), Failure> {
        let path = result.map_err(Failure::Export)?;
        self.report.saved.push(path);
        Ok(())
    }

    fn record(&mut self, line: usize, result: Result<(), Failure>) {
        if let Err(failure) = result {
            tracing::warn!(line, ?failure, "event failed");
            self.report.failures.push((line, failure));
        }
    }

    fn start_load(&mut self, line: usize, path: PathBuf) {
        let tx = self.loads_tx.clone();
        self.pending_loads += 1;
        tokio::spawn(async move {
            let result = logo::load(&path).await;
            // The session may have ended; nothing left to update.
            let _ = tx.send((line, result));
        });
    }

    fn finish_load(&mut self, line: usize, result: Result<Logo, LogoError>) {
        let outcome = match result {
            Ok(logo) => self
                .controller
                .dispatch(Edit::LogoLoaded(Arc::new(logo)))
                .map_err(Failure::Render),
            Err(e) => Err(Failure::Logo(e)),
        };
        self.record(line, outcome);
    }
}
