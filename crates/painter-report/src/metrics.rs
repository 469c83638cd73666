//! Standard Type 1 font metrics and WinAnsi text encoding.
//!
//! Widths are the advance widths from the Adobe Core 14 AFM files, in 1/1000
//! of the font size. Text is measured after encoding, so characters that
//! cannot be represented are measured as the `?` that replaces them.

use strum::IntoStaticStr;

/// Glyph used for characters outside WinAnsiEncoding.
const REPLACEMENT: u8 = b'?';

/// Width assumed for encodable glyphs without a listed metric. Errs wide so
/// wrapped lines never overflow.
const FALLBACK_WIDTH: u16 = 1000;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    278, 278, 584, 584, 584, 556, 1015,
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    278, 278, 278, 469, 556, 333,
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

/// Fonts used in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr)]
pub enum Font {
    /// Body text.
    #[strum(serialize = "Helvetica")]
    Helvetica,
    /// Field labels.
    #[strum(serialize = "Helvetica-Bold")]
    HelveticaBold,
    /// The report title.
    #[strum(serialize = "Courier-Bold")]
    CourierBold,
}

impl Font {
    /// Every font, in resource order.
    pub const ALL: [Font; 3] = [Font::Helvetica, Font::HelveticaBold, Font::CourierBold];

    /// Returns the PostScript base font name.
    pub fn base_font(self) -> &'static str {
        self.into()
    }

    /// Returns the name the font is registered under in page resources.
    pub(crate) fn resource_name(self) -> &'static str {
        match self {
            Self::Helvetica => "F1",
            Self::HelveticaBold => "F2",
            Self::CourierBold => "F3",
        }
    }

    /// Returns the advance width of a WinAnsi-encoded byte, in 1/1000 em.
    pub fn byte_width(self, byte: u8) -> u16 {
        let table = match self {
            Self::CourierBold => return 600,
            Self::Helvetica => &HELVETICA,
            Self::HelveticaBold => &HELVETICA_BOLD,
        };

        match byte {
            0x20..=0x7E => table[usize::from(byte - 0x20)],
            _ => match (high_width(self, byte), fold_latin1(byte)) {
                (Some(width), _) => width,
                (None, Some(base)) => table[usize::from(base - 0x20)],
                (None, None) => FALLBACK_WIDTH,
            },
        }
    }

    /// Returns the rendered width of `text` at `size` points.
    pub fn text_width(self, text: &str, size: f32) -> f32 {
        let units: u32 = text
            .chars()
            .map(|c| u32::from(self.byte_width(encode_char(c))))
            .sum();
        units as f32 * size / 1000.0
    }
}

/// Widths of WinAnsi glyphs above ASCII that are not accented letters.
fn high_width(font: Font, byte: u8) -> Option<u16> {
    let bold = font == Font::HelveticaBold;
    let width = match byte {
        0x80 => 556,
        0x85 | 0x97 | 0xC6 => 1000,
        0x91 | 0x92 => if bold { 278 } else { 222 },
        0x93 | 0x94 => if bold { 500 } else { 333 },
        0x95 => 350,
        0x96 => 556,
        0xA0 => 278,
        0xA9 => 737,
        0xB0 => 400,
        0xD0 => 722,
        0xD7 | 0xF7 => 584,
        0xD8 => 778,
        0xDE => 667,
        0xDF => 611,
        0xE6 => 889,
        0xEC..=0xEF => 278,
        0xF0 | 0xF8 | 0xFE => if bold { 611 } else { 556 },
        _ => return None,
    };
    Some(width)
}

/// Maps an accented Latin-1 letter to its unaccented ASCII base.
fn fold_latin1(byte: u8) -> Option<u8> {
    let base = match byte {
        0x8A => b'S',
        0x8E => b'Z',
        0x9A => b's',
        0x9E => b'z',
        0x9F | 0xDD => b'Y',
        0xC0..=0xC5 => b'A',
        0xC7 => b'C',
        0xC8..=0xCB => b'E',
        0xCC..=0xCF => b'I',
        0xD1 => b'N',
        0xD2..=0xD6 => b'O',
        0xD9..=0xDC => b'U',
        0xE0..=0xE5 => b'a',
        0xE7 => b'c',
        0xE8..=0xEB => b'e',
        0xF1 => b'n',
        0xF2..=0xF6 => b'o',
        0xF9..=0xFC => b'u',
        0xFD | 0xFF => b'y',
        _ => return None,
    };
    Some(base)
}

/// Encodes one character in WinAnsiEncoding, replacing the unencodable.
pub fn encode_char(c: char) -> u8 {
    match c {
        ' '..='~' | '\u{A0}'..='\u{FF}' => c as u8,
        '\t' => b' ',
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => REPLACEMENT,
    }
}

/// Encodes text in WinAnsiEncoding.
pub fn encode(text: &str) -> Vec<u8> {
    text.chars().map(encode_char).collect()
}
