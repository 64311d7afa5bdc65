// this_file: crates/labelforge-barcode/src/code128.rs

//! Code 128 code values, set selection and checksum.

use labelforge_core::{Error, Result};

pub const START_A: u8 = 103;
pub const START_B: u8 = 104;
pub const START_C: u8 = 105;
pub const STOP: u8 = 106;

const SHIFT: u8 = 98;
const CODE_C: u8 = 99;
/// Switch to B from A or C (FNC4 inside B)
const CODE_B: u8 = 100;
/// Switch to A from B or C (FNC4 inside A)
const CODE_A: u8 = 101;
const FNC1: u8 = 102;

/// Bar/space widths for code values 0..=105, bar first.
pub(crate) const PATTERNS: [[u8; 6]; 106] = [
    *b"212222", *b"222122", *b"222221", *b"121223", *b"121322", *b"131222", *b"122213", *b"122312",
    *b"132212", *b"221213", *b"221312", *b"231212", *b"112232", *b"122132", *b"122231", *b"113222",
    *b"123122", *b"123221", *b"223211", *b"221132", *b"221231", *b"213212", *b"223112", *b"312131",
    *b"311222", *b"321122", *b"321221", *b"312212", *b"322112", *b"322211", *b"212123", *b"212321",
    *b"232121", *b"111323", *b"131123", *b"131321", *b"112313", *b"132113", *b"132311", *b"211313",
    *b"231113", *b"231311", *b"112133", *b"112331", *b"132131", *b"113123", *b"113321", *b"133121",
    *b"313121", *b"211331", *b"231131", *b"213113", *b"213311", *b"213131", *b"311123", *b"311321",
    *b"331121", *b"312113", *b"312311", *b"332111", *b"314111", *b"221411", *b"431111", *b"111224",
    *b"111422", *b"121124", *b"121421", *b"141122", *b"141221", *b"112214", *b"112412", *b"122114",
    *b"122411", *b"142112", *b"142211", *b"241211", *b"221114", *b"413111", *b"241112", *b"134111",
    *b"111242", *b"121142", *b"121241", *b"114212", *b"124112", *b"124211", *b"411212", *b"421112",
    *b"421211", *b"212141", *b"214121", *b"412121", *b"111143", *b"111341", *b"131141", *b"114113",
    *b"114311", *b"411113", *b"411311", *b"113141", *b"114131", *b"311141", *b"411131", *b"211412",
    *b"211214", *b"211232",
];

/// Widths of the stop character, including its terminating bar.
pub(crate) const STOP_PATTERN: [u8; 7] = *b"2331112";

/// The three Code 128 character sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeSet {
    /// Upper case, digits, punctuation and ASCII control characters
    A,
    /// Full printable ASCII
    B,
    /// Digit pairs 00-99
    C,
}

impl CodeSet {
    fn start_value(self) -> u8 {
        match self {
            CodeSet::A => START_A,
            CodeSet::B => START_B,
            CodeSet::C => START_C,
        }
    }

    fn switch_value(self) -> u8 {
        match self {
            CodeSet::A => CODE_A,
            CodeSet::B => CODE_B,
            CodeSet::C => CODE_C,
        }
    }

    fn encodes(self, byte: u8) -> bool {
        match self {
            CodeSet::A => byte < 96,
            CodeSet::B => (32..128).contains(&byte),
            CodeSet::C => byte.is_ascii_digit(),
        }
    }

    fn value_of(self, byte: u8) -> u8 {
        match self {
            CodeSet::A if byte < 32 => byte + 64,
            _ => byte - 32,
        }
    }

    fn char_of(self, value: u8) -> u8 {
        match self {
            CodeSet::A if value >= 64 => value - 64,
            _ => value + 32,
        }
    }
}

/// Width pattern of a code value, stop included.
pub(crate) fn pattern(value: u8) -> &'static [u8] {
    if value == STOP {
        &STOP_PATTERN
    } else {
        &PATTERNS[value as usize]
    }
}

/// Modulo-103 checksum over the start value and data values.
pub fn checksum(values: &[u8]) -> u8 {
    let sum: u32 = values
        .iter()
        .enumerate()
        .map(|(position, &value)| value as u32 * (position.max(1) as u32))
        .sum();
    (sum % 103) as u8
}

fn digit_run(bytes: &[u8], from: usize) -> usize {
    bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Set for a byte outside set C, looking one byte ahead to prefer the set
/// that also covers the next character.
fn letter_set(bytes: &[u8], at: usize) -> CodeSet {
    if bytes[at] < 32 {
        return CodeSet::A;
    }
    if bytes[at] >= 96 {
        return CodeSet::B;
    }
    match bytes.get(at + 1) {
        Some(&next) if next < 32 => CodeSet::A,
        _ => CodeSet::B,
    }
}

fn validate(value: &str) -> Result<&[u8]> {
    if value.is_empty() {
        return Err(Error::EmptyBarcode);
    }
    if let Some((position, ch)) = value.chars().enumerate().find(|(_, ch)| !ch.is_ascii()) {
        return Err(Error::UnsupportedBarcodeChar { ch, position });
    }
    Ok(value.as_bytes())
}

/// Encode `value` into the full sequence of code values:
/// start, data, checksum and stop.
pub fn encode_values(value: &str) -> Result<Vec<u8>> {
    let bytes = validate(value)?;
    let len = bytes.len();

    let leading_digits = digit_run(bytes, 0);
    let mut set = if leading_digits >= 4 || (leading_digits == len && len % 2 == 0) {
        CodeSet::C
    } else {
        letter_set(bytes, 0)
    };

    let mut values = Vec::with_capacity(len + 4);
    values.push(set.start_value());

    let mut i = 0;
    while i < len {
        if set == CodeSet::C {
            if i + 1 < len && bytes[i].is_ascii_digit() && bytes[i + 1].is_ascii_digit() {
                values.push((bytes[i] - b'0') * 10 + (bytes[i + 1] - b'0'));
                i += 2;
            } else {
                set = letter_set(bytes, i);
                values.push(set.switch_value());
            }
            continue;
        }

        let run = digit_run(bytes, i);
        if run >= 6 || (run >= 4 && i + run == len) {
            if run % 2 == 1 {
                values.push(set.value_of(bytes[i]));
                i += 1;
            }
            set = CodeSet::C;
            values.push(CODE_C);
            continue;
        }

        let byte = bytes[i];
        if !set.encodes(byte) {
            let other = if set == CodeSet::A { CodeSet::B } else { CodeSet::A };
            let next_stays = bytes
                .get(i + 1)
                .is_some_and(|&next| set.encodes(next) && !other.encodes(next));
            if next_stays {
                values.push(SHIFT);
                values.push(other.value_of(byte));
                i += 1;
                continue;
            }
            set = other;
            values.push(set.switch_value());
        }
        values.push(set.value_of(byte));
        i += 1;
    }

    values.push(checksum(&values));
    values.push(STOP);
    Ok(values)
}

fn decode_error(reason: impl Into<String>) -> Error {
    Error::SymbolDecode {
        reason: reason.into(),
    }
}

/// Decode a full value sequence (start, data, checksum, stop) into text.
pub fn decode_values(values: &[u8]) -> Result<String> {
    if values.len() < 3 {
        return Err(decode_error("symbol shorter than start, checksum and stop"));
    }
    let (&last, rest) = values.split_last().ok_or_else(|| decode_error("empty symbol"))?;
    if last != STOP {
        return Err(decode_error("missing stop character"));
    }
    let (&check, body) = rest
        .split_last()
        .ok_or_else(|| decode_error("missing checksum"))?;
    let expected = checksum(body);
    if check != expected {
        return Err(decode_error(format!(
            "checksum mismatch: read {check}, computed {expected}"
        )));
    }

    let mut set = match body[0] {
        START_A => CodeSet::A,
        START_B => CodeSet::B,
        START_C => CodeSet::C,
        other => return Err(decode_error(format!("invalid start value {other}"))),
    };

    let mut text = String::with_capacity(body.len() * 2);
    let mut shifted = false;
    for &value in &body[1..] {
        let current = match (shifted, set) {
            (true, CodeSet::A) => CodeSet::B,
            (true, CodeSet::B) => CodeSet::A,
            _ => set,
        };
        shifted = false;

        match (current, value) {
            (_, v) if v > FNC1 => {
                return Err(decode_error(format!("unexpected start value {v} in data")))
            }
            (CodeSet::C, v) if v < 100 => {
                text.push(char::from(b'0' + v / 10));
                text.push(char::from(b'0' + v % 10));
            }
            (CodeSet::C, CODE_B) => set = CodeSet::B,
            (CodeSet::C, CODE_A) => set = CodeSet::A,
            (_, v) if v < 96 => text.push(char::from(current.char_of(v))),
            (_, SHIFT) => shifted = true,
            (_, CODE_C) => set = CodeSet::C,
            (CodeSet::A, CODE_B) => set = CodeSet::B,
            (CodeSet::B, CODE_A) => set = CodeSet::A,
            (_, v) => {
                return Err(decode_error(format!(
                    "function character {v} is not supported"
                )))
            }
        }
    }
    if shifted {
        return Err(decode_error("dangling shift before checksum"));
    }
    Ok(text)
}
