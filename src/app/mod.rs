//! # App State & Controller
//!
//! The form is an immutable [`AppState`] record. Each user action becomes an
//! [`Edit`], and [`AppState::reduce`] turns `(state, edit)` into the next
//! state. The [`Controller`] owns that state and reacts to it in two ways:
//!
//! - **QR preview**: a live binding, re-rendered whenever the QR request changes
//! - **Barcode surface**: a command, drawn only by [`Controller::generate_barcode`]

mod controller;
mod state;

pub use controller::{Capabilities, Controller, UploadError};
pub use state::{AppState, Edit};
