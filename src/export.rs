//! # Export Pipeline
//!
//! ```text
//! preview region ──RegionCapture──▶ Blob ──FileSaver──▶ QRCode.png / Barcode.png
//! ```
//!
//! Capture is asynchronous and may fail. When it does, the saver is never
//! called and the failure comes back as [`ExportError::Capture`].

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, RgbaImage, imageops};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::barcode::BarcodeSurface;
use crate::color::HexColor;
use crate::qr::QrPreview;

/// File stem for QR exports.
pub const QR_FILE_STEM: &str = "QRCode";
/// File stem for barcode exports.
pub const BARCODE_FILE_STEM: &str = "Barcode";

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Failed to encode {format}: {reason}")]
    Encode {
        format: ExportFormat,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("Failed to write '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Capture failed: {0}")]
    Capture(#[from] CaptureError),

    #[error("Save failed: {0}")]
    Save(#[from] SaveError),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown export format '{0}' (expected png or svg)")]
pub struct UnknownFormat(pub String);

/// Export image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Svg,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Svg => "svg",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Svg => "image/svg+xml",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "svg" => Ok(ExportFormat::Svg),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

/// `<stem>.<ext>`
pub fn file_name(stem: &str, format: ExportFormat) -> String {
    format!("{}.{}", stem, format.extension())
}

/// Extra border drawn around a captured region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    /// Border width in pixels on every side
    pub padding: u32,
    pub padding_color: HexColor,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            padding: 0,
            padding_color: HexColor::WHITE,
        }
    }
}

/// Encoded image data ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// A rendered preview area that can be captured.
#[derive(Debug, Clone, Copy)]
pub enum Region<'a> {
    Qr(&'a QrPreview),
    Barcode(&'a BarcodeSurface),
}

impl Region<'_> {
    fn rasterize(&self) -> RgbaImage {
        match self {
            Region::Qr(preview) => preview.rasterize(),
            Region::Barcode(surface) => surface.image().clone(),
        }
    }

    fn to_svg(&self) -> String {
        match self {
            Region::Qr(preview) => preview.to_svg(),
            Region::Barcode(surface) => surface.to_svg(),
        }
    }

    fn dimensions(&self) -> (u32, u32) {
        match self {
            Region::Qr(preview) => {
                let size = preview.graphic().size();
                (size, size)
            }
            Region::Barcode(surface) => surface.image().dimensions(),
        }
    }
}

/// Region-to-blob capture capability.
#[async_trait]
pub trait RegionCapture: Send + Sync {
    async fn capture(
        &self,
        region: Region<'_>,
        format: ExportFormat,
        options: &ExportOptions,
    ) -> Result<Blob, CaptureError>;
}

/// Local file save capability.
pub trait FileSaver: Send + Sync {
    /// Save `blob` as `name`, returning where it landed.
    fn save(&self, name: &str, blob: &Blob) -> Result<PathBuf, SaveError>;
}

/// [`RegionCapture`] that encodes with the image crate (PNG) or emits the
/// region's own vector form (SVG).
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageCapture;

#[async_trait]
impl RegionCapture for ImageCapture {
    async fn capture(
        &self,
        region: Region<'_>,
        format: ExportFormat,
        options: &ExportOptions,
    ) -> Result<Blob, CaptureError> {
        let bytes = match format {
            ExportFormat::Png => {
                let img = pad_raster(region.rasterize(), options);
                encode_png(img)?
            }
            ExportFormat::Svg => {
                let (width, height) = region.dimensions();
                pad_svg(&region.to_svg(), width, height, options).into_bytes()
            }
        };

        Ok(Blob {
            mime: format.mime(),
            bytes,
        })
    }
}

fn encode_png(img: RgbaImage) -> Result<Vec<u8>, CaptureError> {
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| CaptureError::Encode {
            format: ExportFormat::Png,
            reason: e.to_string(),
        })?;
    Ok(out.into_inner())
}

fn pad_raster(img: RgbaImage, options: &ExportOptions) -> RgbaImage {
    if options.padding == 0 {
        return img;
    }
    let p = options.padding;
    let (width, height) = img.dimensions();
    let mut canvas = RgbaImage::from_pixel(
        width + p * 2,
        height + p * 2,
        options.padding_color.rgba(),
    );
    imageops::replace(&mut canvas, &img, p as i64, p as i64);
    canvas
}

fn pad_svg(svg: &str, width: u32, height: u32, options: &ExportOptions) -> String {
    if options.padding == 0 {
        return svg.to_string();
    }
    let p = options.padding;
    let (w, h) = (width + p * 2, height + p * 2);
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><rect width="{w}" height="{h}" fill="{}"/><g transform="translate({p} {p})">{svg}</g></svg>"#,
        options.padding_color,
    )
}

/// [`FileSaver`] writing into a downloads directory.
#[derive(Debug, Clone)]
pub struct DownloadDir {
    dir: PathBuf,
}

impl DownloadDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }
}

impl FileSaver for DownloadDir {
    fn save(&self, name: &str, blob: &Blob) -> Result<PathBuf, SaveError> {
        let path = self.dir.join(name);
        std::fs::create_dir_all(&self.dir)
            .and_then(|_| std::fs::write(&path, &blob.bytes))
            .map_err(|source| SaveError::Io {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }
}

/// Capture `region` and save it as `<stem>.<ext>`.
pub async fn export(
    capture: &dyn RegionCapture,
    saver: &dyn FileSaver,
    region: Region<'_>,
    stem: &str,
    format: ExportFormat,
    options: &ExportOptions,
) -> Result<PathBuf, ExportError> {
    let blob = capture.capture(region, format, options).await?;
    let name = file_name(stem, format);
    let path = saver.save(&name, &blob)?;
    tracing::info!(file = %path.display(), bytes = blob.bytes.len(), "exported");
    Ok(path)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::qr::{ModuleQrRenderer, QrRenderer, QrRequest};
    use crate::viewport::SizeClass;
    use std::sync::Mutex;

    /// Saver that records what it was asked to save.
    #[derive(Default)]
    pub(crate) struct RecordingSaver {
        pub saved: Mutex<Vec<(String, Blob)>>,
    }

    impl FileSaver for RecordingSaver {
        fn save(&self, name: &str, blob: &Blob) -> Result<PathBuf, SaveError> {
            self.saved
                .lock()
                .unwrap()
                .push((name.to_string(), blob.clone()));
            Ok(PathBuf::from(name))
        }
    }

    /// Capture that always fails.
    pub(crate) struct FailingCapture;

    #[async_trait]
    impl RegionCapture for FailingCapture {
        async fn capture(
            &self,
            _region: Region<'_>,
            format: ExportFormat,
            _options: &ExportOptions,
        ) -> Result<Blob, CaptureError> {
            Err(CaptureError::Encode {
                format,
                reason: "detached".to_string(),
            })
        }
    }

    fn preview() -> QrPreview {
        let graphic = ModuleQrRenderer
            .render(&QrRequest::new(SizeClass::Large).spec())
            .unwrap();
        QrPreview::new(graphic, None)
    }

    fn decode(blob: &Blob) -> RgbaImage {
        image::load_from_memory(&blob.bytes).unwrap().to_rgba8()
    }

    #[test]
    fn test_file_names() {
        assert_eq!(file_name(QR_FILE_STEM, ExportFormat::Png), "QRCode.png");
        assert_eq!(file_name(QR_FILE_STEM, ExportFormat::Svg), "QRCode.svg");
        assert_eq!(file_name(BARCODE_FILE_STEM, ExportFormat::Png), "Barcode.png");
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("PNG".parse::<ExportFormat>(), Ok(ExportFormat::Png));
        assert_eq!("svg".parse::<ExportFormat>(), Ok(ExportFormat::Svg));
        assert!("gif".parse::<ExportFormat>().is_err());
    }

    #[tokio::test]
    async fn test_png_capture_matches_preview() {
        let preview = preview();
        let blob = ImageCapture
            .capture(Region::Qr(&preview), ExportFormat::Png, &ExportOptions::default())
            .await
            .unwrap();
        assert_eq!(blob.mime, "image/png");
        assert_eq!(decode(&blob), preview.rasterize());
    }

    #[tokio::test]
    async fn test_svg_capture() {
        let preview = preview();
        let blob = ImageCapture
            .capture(Region::Qr(&preview), ExportFormat::Svg, &ExportOptions::default())
            .await
            .unwrap();
        assert_eq!(blob.mime, "image/svg+xml");
        assert_eq!(String::from_utf8(blob.bytes).unwrap(), preview.to_svg());
    }

    #[tokio::test]
    async fn test_padding_grows_image() {
        let preview = preview();
        let options = ExportOptions {
            padding: 20,
            padding_color: HexColor::parse("#ff00ff").unwrap(),
        };
        let blob = ImageCapture
            .capture(Region::Qr(&preview), ExportFormat::Png, &options)
            .await
            .unwrap();
        let img = decode(&blob);
        assert_eq!(img.dimensions(), (296, 296));
        assert_eq!(*img.get_pixel(0, 0), image::Rgba([255, 0, 255, 255]));
        assert_eq!(*img.get_pixel(20, 20), HexColor::BLACK.rgba());

        let svg = ImageCapture
            .capture(Region::Qr(&preview), ExportFormat::Svg, &options)
            .await
            .unwrap();
        let svg = String::from_utf8(svg.bytes).unwrap();
        assert!(svg.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg" width="296""#));
        assert!(svg.contains("translate(20 20)"));
    }

    #[tokio::test]
    async fn test_blank_barcode_capture() {
        let surface = BarcodeSurface::blank();
        let blob = ImageCapture
            .capture(Region::Barcode(&surface), ExportFormat::Png, &ExportOptions::default())
            .await
            .unwrap();
        assert_eq!(decode(&blob).dimensions(), (300, 150));
    }

    #[tokio::test]
    async fn test_failed_capture_never_saves() {
        let preview = preview();
        let saver = RecordingSaver::default();
        let result = export(
            &FailingCapture,
            &saver,
            Region::Qr(&preview),
            QR_FILE_STEM,
            ExportFormat::Png,
            &ExportOptions::default(),
        )
        .await;
        assert!(matches!(result, Err(ExportError::Capture(_))));
        assert!(saver.saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_export_names_file() {
        let preview = preview();
        let saver = RecordingSaver::default();
        let path = export(
            &ImageCapture,
            &saver,
            Region::Qr(&preview),
            QR_FILE_STEM,
            ExportFormat::Png,
            &ExportOptions::default(),
        )
        .await
        .unwrap();
        assert_eq!(path, PathBuf::from("QRCode.png"));
        assert_eq!(saver.saved.lock().unwrap()[0].0, "QRCode.png");
    }

    #[test]
    fn test_download_dir_writes_file() {
        let dir = std::env::temp_dir().join(format!("qrbar-{}", uuid::Uuid::new_v4()));
        let saver = DownloadDir::new(&dir);
        let blob = Blob {
            mime: "image/png",
            bytes: vec![1, 2, 3],
        };
        let path = saver.save("QRCode.png", &blob).unwrap();
        assert_eq!(path, dir.join("QRCode.png"));
        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3]);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
