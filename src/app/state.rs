//! Form state and the pure reducer that updates it.

use std::sync::Arc;

use crate::barcode::{BarcodeRequest, Symbology};
use crate::color::HexColor;
use crate::logo::Logo;
use crate::qr::QrRequest;
use crate::viewport::SizeClass;

/// A single form edit.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    QrText(String),
    QrForeground(HexColor),
    QrBackground(HexColor),
    LogoLoaded(Arc<Logo>),
    Resized(u32),
    BarcodeText(String),
    Symbology(Symbology),
    BarcodeForeground(HexColor),
    BarcodeBackground(HexColor),
}

/// Everything the form holds. Never mutated in place: each [`Edit`]
/// produces a new record.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub qr: QrRequest,
    pub barcode: BarcodeRequest,
    pub viewport_width: u32,
}

impl AppState {
    pub fn new(viewport_width: u32) -> Self {
        Self {
            qr: QrRequest::new(SizeClass::from_width(viewport_width)),
            barcode: BarcodeRequest::new(),
            viewport_width,
        }
    }

    pub fn size_class(&self) -> SizeClass {
        SizeClass::from_width(self.viewport_width)
    }

    /// Apply `edit`, returning the next state.
    pub fn reduce(&self, edit: Edit) -> AppState {
        let mut next = self.clone();
        match edit {
            Edit::QrText(text) => next.qr.text = text,
            Edit::QrForeground(color) => next.qr.foreground = color,
            Edit::QrBackground(color) => next.qr.background = color,
            Edit::LogoLoaded(logo) => next.qr.logo = Some(logo),
            Edit::Resized(width) => {
                next.viewport_width = width;
                next.qr.size = SizeClass::from_width(width).qr_size();
            }
            Edit::BarcodeText(text) => next.barcode.text = text,
            Edit::Symbology(symbology) => next.barcode.symbology = symbology,
            Edit::BarcodeForeground(color) => next.barcode.foreground = color,
            Edit::BarcodeBackground(color) => next.barcode.background = color,
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_initial_state() {
        let state = AppState::new(1024);
        assert_eq!(state.qr.size, 256);
        assert_eq!(state.qr.text, "");
        assert_eq!(state.qr.foreground, HexColor::BLACK);
        assert_eq!(state.qr.background, HexColor::WHITE);
        assert_eq!(state.qr.logo, None);
        assert_eq!(state.barcode.symbology, Symbology::Code128);
    }

    #[test]
    fn test_reduce_is_pure() {
        let state = AppState::new(1024);
        let next = state.reduce(Edit::QrText("hello".into()));
        assert_eq!(state.qr.text, "");
        assert_eq!(next.qr.text, "hello");
    }

    #[test]
    fn test_resize_updates_qr_size() {
        let state = AppState::new(1024).reduce(Edit::Resized(400));
        assert_eq!(state.viewport_width, 400);
        assert_eq!(state.size_class(), SizeClass::Small);
        assert_eq!(state.qr.size, 200);
    }

    #[test]
    fn test_barcode_edits_leave_qr_alone() {
        let state = AppState::new(1024);
        let next = state
            .reduce(Edit::BarcodeText("123".into()))
            .reduce(Edit::Symbology(Symbology::Msi))
            .reduce(Edit::BarcodeForeground(HexColor::new(1, 2, 3)))
            .reduce(Edit::BarcodeBackground(HexColor::new(4, 5, 6)));
        assert_eq!(next.qr, state.qr);
        assert_eq!(
            next.barcode,
            BarcodeRequest {
                text: "123".into(),
                symbology: Symbology::Msi,
                foreground: HexColor::new(1, 2, 3),
                background: HexColor::new(4, 5, 6),
            }
        );
    }
}
