//! # End-to-End Tests
//!
//! Drive the built-in controller and the session loop against a real
//! download directory, then check the files that land there.
//!
//! ## Test Coverage
//!
//! - **Mount and export**: default QR and placeholder barcode, saved as PNG and SVG
//! - **Reactivity**: QR edits re-render at once, barcode edits wait for generation
//! - **Sessions**: resize, logo upload with settle, failure signals, bad scripts
//!
//! Every test writes into its own directory under the system temp dir.

use image::{ImageFormat, Rgba, RgbaImage};
use pretty_assertions::assert_eq;
use qrbar::{
    Controller, StudioConfig, StudioError,
    app::Edit,
    barcode::Symbology,
    color::HexColor,
    export::{ExportFormat, ExportOptions},
    session::{Failure, Session},
};
use std::fs;
use std::path::PathBuf;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Fresh, empty download directory.
fn download_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("qrbar-e2e-{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn config(dir: &PathBuf, width: u32) -> StudioConfig {
    StudioConfig {
        download_dir: dir.clone(),
        viewport_width: width,
    }
}

fn read_png(path: &PathBuf) -> RgbaImage {
    image::open(path).unwrap().to_rgba8()
}

/// Write a solid red square PNG to `dir/name`.
fn write_logo(dir: &PathBuf, name: &str) -> PathBuf {
    let path = dir.join(name);
    RgbaImage::from_pixel(32, 32, Rgba([255, 0, 0, 255]))
        .save_with_format(&path, ImageFormat::Png)
        .unwrap();
    path
}

// ============================================================================
// MOUNT AND EXPORT
// ============================================================================

#[tokio::test]
async fn test_default_qr_export() {
    let dir = download_dir();
    let controller = Controller::standard(&config(&dir, 1024)).unwrap();

    let graphic = controller.qr_preview().graphic();
    assert_eq!(graphic.size(), 256);
    assert_eq!(graphic.foreground(), HexColor::BLACK);
    assert_eq!(graphic.background(), HexColor::WHITE);

    let path = controller.export_qr(ExportFormat::Png).await.unwrap();
    assert_eq!(path, dir.join("QRCode.png"));

    let img = read_png(&path);
    assert_eq!(img.dimensions(), (256, 256));
    assert!(img
        .pixels()
        .all(|p| *p == HexColor::BLACK.rgba() || *p == HexColor::WHITE.rgba()));
    assert!(img.pixels().any(|p| *p == HexColor::BLACK.rgba()));
    assert!(img.pixels().any(|p| *p == HexColor::WHITE.rgba()));

    fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn test_export_is_idempotent() {
    let dir = download_dir();
    let controller = Controller::standard(&config(&dir, 1024)).unwrap();

    let first = read_png(&controller.export_qr(ExportFormat::Png).await.unwrap());
    let second = read_png(&controller.export_qr(ExportFormat::Png).await.unwrap());
    assert_eq!(first, second);

    fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn test_placeholder_barcode() {
    let dir = download_dir();
    let mut controller = Controller::standard(&config(&dir, 1024)).unwrap();
    assert!(controller.barcode_surface().is_blank());

    controller.generate_barcode().unwrap();
    let surface = controller.barcode_surface();
    let drawing = surface.drawing().unwrap();
    assert_eq!(drawing.label(), Some("0000000000000"));

    let path = controller.export_barcode(ExportFormat::Png).await.unwrap();
    assert_eq!(path, dir.join("Barcode.png"));
    assert_eq!(read_png(&path).dimensions(), surface.image().dimensions());

    fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn test_blank_barcode_export() {
    let dir = download_dir();
    let controller = Controller::standard(&config(&dir, 1024)).unwrap();

    let path = controller.export_barcode(ExportFormat::Png).await.unwrap();
    let img = read_png(&path);
    assert_eq!(img.dimensions(), (300, 150));
    assert!(img.pixels().all(|p| p[3] == 0));

    fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn test_svg_and_padding() {
    let dir = download_dir();
    let mut controller = Controller::standard(&config(&dir, 1024)).unwrap();
    controller.set_export_options(ExportOptions {
        padding: 10,
        padding_color: HexColor::WHITE,
    });

    let png = controller.export_qr(ExportFormat::Png).await.unwrap();
    assert_eq!(read_png(&png).dimensions(), (276, 276));

    let svg = controller.export_qr(ExportFormat::Svg).await.unwrap();
    assert_eq!(svg, dir.join("QRCode.svg"));
    let text = fs::read_to_string(&svg).unwrap();
    assert!(text.starts_with("<svg"));
    assert!(text.contains("translate(10 10)"));

    fs::remove_dir_all(&dir).unwrap();
}

// ============================================================================
// REACTIVITY
// ============================================================================

#[test]
fn test_qr_is_live_barcode_is_manual() {
    let dir = download_dir();
    let mut controller = Controller::standard(&config(&dir, 1024)).unwrap();
    assert_eq!(controller.qr_render_count(), 1);

    controller
        .dispatch(Edit::QrText("hello".to_string()))
        .unwrap();
    controller
        .dispatch(Edit::QrForeground(HexColor::new(0x1a, 0x36, 0x5d)))
        .unwrap();
    assert_eq!(controller.qr_render_count(), 3);
    assert_eq!(
        controller.qr_preview().graphic().foreground(),
        HexColor::new(0x1a, 0x36, 0x5d)
    );

    controller
        .dispatch(Edit::BarcodeText("ABC-123".to_string()))
        .unwrap();
    controller
        .dispatch(Edit::Symbology(Symbology::Code39))
        .unwrap();
    assert_eq!(controller.qr_render_count(), 3);
    assert!(controller.barcode_surface().is_blank());

    controller.generate_barcode().unwrap();
    assert_eq!(
        controller.barcode_surface().drawing().unwrap().label(),
        Some("ABC-123")
    );

    // Editing after generation leaves the drawn barcode alone
    controller
        .dispatch(Edit::BarcodeText("XYZ".to_string()))
        .unwrap();
    assert_eq!(
        controller.barcode_surface().drawing().unwrap().label(),
        Some("ABC-123")
    );

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_invalid_barcode_keeps_surface() {
    let dir = download_dir();
    let mut controller = Controller::standard(&config(&dir, 1024)).unwrap();
    controller.generate_barcode().unwrap();
    let before = controller.barcode_surface().clone();

    controller
        .dispatch(Edit::Symbology(Symbology::Pharmacode))
        .unwrap();
    assert!(controller.generate_barcode().is_err());
    assert_eq!(controller.barcode_surface(), &before);

    fs::remove_dir_all(&dir).unwrap();
}

// ============================================================================
// SESSIONS
// ============================================================================

#[tokio::test]
async fn test_session_resize_before_export() {
    let dir = download_dir();
    let controller = Controller::standard(&config(&dir, 1024)).unwrap();

    let script = r#"{"type": "resize", "width": 375}
{"type": "export_qr"}
"#;
    let (controller, report) = Session::new(controller)
        .run(script.as_bytes())
        .await
        .unwrap();

    assert!(report.failures.is_empty());
    assert_eq!(report.saved, vec![dir.join("QRCode.png")]);
    assert_eq!(controller.state().viewport_width, 375);
    assert_eq!(controller.qr_preview().graphic().size(), 200);
    assert_eq!(read_png(&report.saved[0]).dimensions(), (200, 200));

    fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn test_session_logo_settles_before_export() {
    let dir = download_dir();
    let logo = write_logo(&dir, "logo.png");
    let controller = Controller::standard(&config(&dir, 1024)).unwrap();

    let script = format!(
        "# put a logo on the default code\n\
         {{\"type\": \"upload_logo\", \"path\": {}}}\n\
         {{\"type\": \"settle\"}}\n\
         {{\"type\": \"export_qr\"}}\n",
        serde_json::to_string(&logo).unwrap()
    );
    let (controller, report) = Session::new(controller)
        .run(script.as_bytes())
        .await
        .unwrap();

    assert!(report.failures.is_empty());
    let preview = controller.qr_preview();
    assert!(preview.logo().is_some());

    // The logo sits in the middle of the exported image
    let img = read_png(&report.saved[0]);
    assert_eq!(*img.get_pixel(128, 128), Rgba([255, 0, 0, 255]));

    fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn test_session_reports_failures() {
    let dir = download_dir();
    let controller = Controller::standard(&config(&dir, 1024)).unwrap();

    let script = format!(
        "{{\"type\": \"upload_logo\", \"path\": {}}}\n\
         {{\"type\": \"symbology\", \"value\": \"pharmacode\"}}\n\
         {{\"type\": \"generate_barcode\"}}\n",
        serde_json::to_string(&dir.join("logo.gif")).unwrap()
    );
    let (controller, report) = Session::new(controller)
        .run(script.as_bytes())
        .await
        .unwrap();

    assert_eq!(report.failures.len(), 2);
    assert!(report
        .failures
        .iter()
        .any(|(line, f)| *line == 1 && matches!(f, Failure::Logo(_))));
    assert!(report
        .failures
        .iter()
        .any(|(line, f)| *line == 3 && matches!(f, Failure::Render(_))));
    assert!(controller.qr_preview().logo().is_none());
    assert!(controller.barcode_surface().is_blank());

    fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn test_session_rejects_malformed_line() {
    let dir = download_dir();
    let controller = Controller::standard(&config(&dir, 1024)).unwrap();

    let script = "{\"type\": \"qr_text\", \"value\": \"ok\"}\n{\"type\": \"explode\"}\n";
    let result = Session::new(controller).run(script.as_bytes()).await;

    match result {
        Err(StudioError::Script(message)) => assert!(message.starts_with("line 2:")),
        other => panic!("expected script error, got {:?}", other.map(|(_, r)| r)),
    }

    fs::remove_dir_all(&dir).unwrap();
}
