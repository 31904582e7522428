use crate::wave::LogicValue;

/// Decode a status bit-vector into a label.
///
/// The vector is read as an unsigned integer (unknown and high-impedance bits read as 0) and
/// written out as big-endian bytes without leading zero bytes. A zero value yields the single byte
/// `0x00`. Each byte maps to its ASCII character when printable and to a space otherwise, so a
/// zero status decodes to `" "`.
pub fn decode_status(value: &LogicValue) -> String {
    let bits: Vec<bool> = value.levels().iter().map(|l| l.collapse()).collect();
    let pad = (8 - bits.len() % 8) % 8;

    let mut bytes = Vec::with_capacity((bits.len() + pad) / 8);
    let mut acc = 0u8;
    for (i, b) in std::iter::repeat_n(false, pad).chain(bits).enumerate() {
        acc = (acc << 1) | u8::from(b);
        if i % 8 == 7 {
            bytes.push(acc);
            acc = 0;
        }
    }

    let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    let bytes = match &bytes[first..] {
        [] => &[0u8][..],
        rest => rest,
    };
    bytes.iter().map(|&b| printable_or_space(b)).collect()
}

/// ASCII graphic characters, space, and the whitespace controls `\t \n \r \x0b \x0c`.
fn printable_or_space(b: u8) -> char {
    match b {
        0x20..=0x7e | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c => char::from(b),
        _ => ' ',
    }
}

/// Pad single-character labels with a trailing space.
pub fn pad_label(label: &str) -> String {
    if label.chars().count() < 2 {
        format!("{label} ")
    } else {
        label.to_string()
    }
}
