//! Entry name decoding.

use encoding_rs::Encoding;

use super::extra::UnicodePath;
use super::flags;

/// Decodes a raw entry name.
///
/// Precedence:
/// 1. general purpose bit 11 set: the bytes are UTF-8
/// 2. an Info-ZIP Unicode path block whose CRC matches the raw bytes
/// 3. the caller's legacy encoding, when one is configured
/// 4. UTF-8, when the bytes are valid UTF-8
/// 5. IBM code page 437, the ZIP default for legacy names
pub fn decode_name(
    raw: &[u8],
    entry_flags: u16,
    unicode_path: Option<&UnicodePath>,
    encoding: Option<&'static Encoding>,
) -> String {
    if entry_flags & flags::UTF8 != 0 {
        return String::from_utf8_lossy(raw).into_owned();
    }

    if let Some(unicode) = unicode_path {
        if unicode.name_crc32 == crc32fast::hash(raw) {
            return unicode.name.clone();
        }
        log::warn!(
            "Ignoring stale Unicode path '{}' (CRC {:#010x} does not match header name)",
            unicode.name,
            unicode.name_crc32
        );
    }

    match encoding {
        Some(encoding) => {
            let (decoded, _, had_errors) = encoding.decode(raw);
            if had_errors {
                log::debug!(
                    "Name bytes {:02x?} are not valid {}; using replacement characters",
                    raw,
                    encoding.name()
                );
            }
            decoded.into_owned()
        }
        None => match std::str::from_utf8(raw) {
            Ok(name) => name.to_owned(),
            Err(_) => decode_cp437(raw),
        },
    }
}

/// Upper half of IBM code page 437 (0x80..=0xFF).
///
/// `encoding_rs` only covers WHATWG encodings, which leave this one out.
const CP437_HIGH: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å', //
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ', //
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»', //
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐', //
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧', //
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀', //
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩', //
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{A0}',
];

fn decode_cp437(raw: &[u8]) -> String {
    raw.iter()
        .map(|&b| match b {
            0x00..=0x7F => char::from(b),
            _ => CP437_HIGH[usize::from(b - 0x80)],
        })
        .collect()
}
