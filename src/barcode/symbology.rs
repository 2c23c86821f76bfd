//! Symbologies exposed by the barcode selector and their module encoders.
//!
//! Code 128 and Code 39 go through the barcoders crate. MSI and Pharmacode
//! are small enough to encode here.

use barcoders::sym::code39::Code39;
use barcoders::sym::code128::Code128;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::error::RenderError;

/// Code 128 character set A switch: control codes, upper case and digits.
const CODE128_SET_A: char = '\u{00C0}';
/// Code 128 character set B switch: printable ASCII.
const CODE128_SET_B: char = '\u{0181}';
/// Code 128 character set C switch: digit pairs.
const CODE128_SET_C: char = '\u{0106}';

/// Pharmacode value range.
const PHARMACODE_MIN: u32 = 3;
const PHARMACODE_MAX: u32 = 131_070;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown symbology '{0}' (expected CODE128, CODE39, MSI or pharmacode)")]
pub struct UnknownSymbology(pub String);

/// 1D barcode format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Symbology {
    #[default]
    Code128,
    Code39,
    Msi,
    Pharmacode,
}

impl Symbology {
    /// Selector order.
    pub const ALL: [Symbology; 4] = [
        Symbology::Code128,
        Symbology::Code39,
        Symbology::Msi,
        Symbology::Pharmacode,
    ];

    /// Identifier used by the selector (`CODE128`, `CODE39`, `MSI`, `pharmacode`).
    pub fn id(self) -> &'static str {
        match self {
            Symbology::Code128 => "CODE128",
            Symbology::Code39 => "CODE39",
            Symbology::Msi => "MSI",
            Symbology::Pharmacode => "pharmacode",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Symbology::Code128 => "Code 128",
            Symbology::Code39 => "Code 39",
            Symbology::Msi => "MSI",
            Symbology::Pharmacode => "Pharmacode",
        }
    }

    /// Text as it is encoded and printed under the bars.
    pub fn normalize(self, text: &str) -> String {
        match self {
            Symbology::Code39 => text.to_uppercase(),
            _ => text.to_string(),
        }
    }

    /// Encode `text` into modules (`true` = bar).
    pub fn encode(self, text: &str) -> Result<Vec<bool>, RenderError> {
        let invalid = |reason: String| RenderError::InvalidData {
            symbology: self,
            reason,
        };

        match self {
            Symbology::Code128 => {
                let payload = code128_payload(text).map_err(invalid)?;
                let barcode = Code128::new(&payload)
                    .map_err(|e| invalid(format!("{:?}", e)))?;
                Ok(to_modules(&barcode.encode()))
            }
            Symbology::Code39 => {
                let normalized = self.normalize(text);
                let barcode = Code39::new(&normalized)
                    .map_err(|e| invalid(format!("{:?}", e)))?;
                Ok(to_modules(&barcode.encode()))
            }
            Symbology::Msi => encode_msi(text).ok_or_else(|| invalid("digits only".to_string())),
            Symbology::Pharmacode => encode_pharmacode(text).ok_or_else(|| {
                invalid(format!(
                    "integer between {} and {}",
                    PHARMACODE_MIN, PHARMACODE_MAX
                ))
            }),
        }
    }
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Symbology {
    type Err = UnknownSymbology;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Symbology::ALL
            .into_iter()
            .find(|sym| sym.id().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownSymbology(s.to_string()))
    }
}

impl TryFrom<String> for Symbology {
    type Error = UnknownSymbology;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Symbology> for String {
    fn from(sym: Symbology) -> Self {
        sym.id().to_string()
    }
}

fn is_even_digits(text: &str) -> bool {
    !text.is_empty() && text.len() % 2 == 0 && text.bytes().all(|b| b.is_ascii_digit())
}

/// Which Code 128 sets can carry an ASCII character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Code128Set {
    A,
    B,
}

impl Code128Set {
    fn switch(self) -> char {
        match self {
            Code128Set::A => CODE128_SET_A,
            Code128Set::B => CODE128_SET_B,
        }
    }

    /// The set `ch` forces, or `None` when both A and B hold it.
    fn required_by(ch: char) -> Option<Self> {
        match ch as u32 {
            0x00..=0x1F => Some(Code128Set::A),
            0x60..=0x7F => Some(Code128Set::B),
            _ => None,
        }
    }
}

/// Build the barcoders input for `text`: a start set followed by the text,
/// with a set switch wherever the next character needs the other set.
///
/// Even-length all-digit text is packed in set C.
fn code128_payload(text: &str) -> Result<String, String> {
    if let Some(ch) = text
        .chars()
        .find(|&ch| matches!(ch, CODE128_SET_A | CODE128_SET_B | CODE128_SET_C))
    {
        return Err(format!("reserved character {:?}", ch));
    }
    if let Some(ch) = text.chars().find(|ch| !ch.is_ascii()) {
        return Err(format!("non-ASCII character {:?}", ch));
    }

    if is_even_digits(text) {
        return Ok(format!("{}{}", CODE128_SET_C, text));
    }

    let mut set = text
        .chars()
        .find_map(Code128Set::required_by)
        .unwrap_or(Code128Set::B);
    let mut payload = String::with_capacity(text.len() + 2);
    payload.push(set.switch());

    for ch in text.chars() {
        if let Some(needed) = Code128Set::required_by(ch) {
            if needed != set {
                set = needed;
                payload.push(set.switch());
            }
        }
        payload.push(ch);
    }
    Ok(payload)
}

fn to_modules(encoded: &[u8]) -> Vec<bool> {
    encoded.iter().map(|&m| m == 1).collect()
}

fn push_pattern(modules: &mut Vec<bool>, pattern: &str) {
    modules.extend(pattern.bytes().map(|b| b == b'1'));
}

/// MSI Plessey without check digit: `110`, four bits per digit
/// (1 → `110`, 0 → `100`), then `1001`.
fn encode_msi(text: &str) -> Option<Vec<bool>> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let mut modules = Vec::with_capacity(7 + text.len() * 12);
    push_pattern(&mut modules, "110");
    for digit in text.bytes().map(|b| b - b'0') {
        for bit in (0..4).rev() {
            let pattern = if (digit >> bit) & 1 == 1 { "110" } else { "100" };
            push_pattern(&mut modules, pattern);
        }
    }
    push_pattern(&mut modules, "1001");
    Some(modules)
}

/// Laetus Pharmacode: wide bar (`11100`) for even steps, narrow (`100`) for
/// odd ones, built from the least significant end. The trailing gap is dropped.
fn encode_pharmacode(text: &str) -> Option<Vec<bool>> {
    let value: u32 = text.trim().parse().ok()?;
    if !(PHARMACODE_MIN..=PHARMACODE_MAX).contains(&value) {
        return None;
    }

    let mut parts: Vec<&str> = Vec::new();
    let mut z = value;
    while z != 0 {
        if z % 2 == 0 {
            parts.push("11100");
            z = (z - 2) / 2;
        } else {
            parts.push("100");
            z = (z - 1) / 2;
        }
    }

    let mut modules = Vec::new();
    for part in parts.iter().rev() {
        push_pattern(&mut modules, part);
    }
    modules.truncate(modules.len().saturating_sub(2));
    Some(modules)
}
