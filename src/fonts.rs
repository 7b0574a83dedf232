use std::collections::HashMap;
use std::sync::OnceLock;

use encoding_rs::UTF_16BE;
use lopdf::{Dictionary, Document, Object};

use crate::pdf::{number, resolve};

/// Unicode text for a glyph name from an `/Encoding /Differences` array.
fn glyph_name_to_text(name: &str) -> Option<String> {
    let base = name.split('.').next().unwrap_or(name);
    if base.chars().count() == 1 {
        return Some(base.to_string());
    }
    let hex_char = |h: &str| u32::from_str_radix(h, 16).ok().and_then(char::from_u32);
    if let Some(hex) = base.strip_prefix("uni") {
        if hex.is_ascii() && hex.len() % 4 == 0 && !hex.is_empty() {
            return (0..hex.len())
                .step_by(4)
                .map(|i| hex_char(&hex[i..i + 4]))
                .collect();
        }
    }
    if let Some(hex) = base.strip_prefix('u') {
        if (4..=6).contains(&hex.len()) {
            if let Some(c) = hex_char(hex) {
                return Some(c.to_string());
            }
        }
    }
    let text = match base {
        "space" | "nbspace" => " ",
        "exclam" => "!",
        "quotedbl" => "\"",
        "numbersign" => "#",
        "dollar" => "$",
        "percent" => "%",
        "ampersand" => "&",
        "quotesingle" => "'",
        "parenleft" => "(",
        "parenright" => ")",
        "asterisk" => "*",
        "plus" => "+",
        "comma" => ",",
        "hyphen" | "minus" | "sfthyphen" => "-",
        "period" => ".",
        "slash" => "/",
        "zero" => "0",
        "one" => "1",
        "two" => "2",
        "three" => "3",
        "four" => "4",
        "five" => "5",
        "six" => "6",
        "seven" => "7",
        "eight" => "8",
        "nine" => "9",
        "colon" => ":",
        "semicolon" => ";",
        "less" => "<",
        "equal" => "=",
        "greater" => ">",
        "question" => "?",
        "at" => "@",
        "bracketleft" => "[",
        "backslash" => "\\",
        "bracketright" => "]",
        "asciicircum" => "^",
        "underscore" => "_",
        "grave" => "`",
        "braceleft" => "{",
        "bar" => "|",
        "braceright" => "}",
        "asciitilde" => "~",
        "quoteleft" => "\u{2018}",
        "quoteright" => "\u{2019}",
        "quotedblleft" => "\u{201C}",
        "quotedblright" => "\u{201D}",
        "quotesinglbase" => "\u{201A}",
        "quotedblbase" => "\u{201E}",
        "endash" => "\u{2013}",
        "emdash" => "\u{2014}",
        "bullet" => "\u{2022}",
        "ellipsis" => "\u{2026}",
        "dagger" => "\u{2020}",
        "daggerdbl" => "\u{2021}",
        "section" => "\u{00A7}",
        "paragraph" => "\u{00B6}",
        "degree" => "\u{00B0}",
        "copyright" => "\u{00A9}",
        "registered" => "\u{00AE}",
        "trademark" => "\u{2122}",
        "fi" => "\u{FB01}",
        "fl" => "\u{FB02}",
        "ff" => "\u{FB00}",
        "ffi" => "\u{FB03}",
        "ffl" => "\u{FB04}",
        "germandbls" => "\u{00DF}",
        "dotlessi" => "\u{0131}",
        "multiply" => "\u{00D7}",
        "divide" => "\u{00F7}",
        "periodcentered" => "\u{00B7}",
        _ => return None,
    };
    Some(text.to_string())
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum BaseEncoding {
    WinAnsi,
    MacRoman,
    Standard,
}

impl BaseEncoding {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"WinAnsiEncoding" => Some(Self::WinAnsi),
            b"MacRomanEncoding" => Some(Self::MacRoman),
            b"StandardEncoding" => Some(Self::Standard),
            _ => None,
        }
    }

    fn lopdf_name(self) -> &'static str {
        match self {
            Self::WinAnsi => "WinAnsiEncoding",
            Self::MacRoman => "MacRomanEncoding",
            Self::Standard => "StandardEncoding",
        }
    }

    /// Text of every single-byte code, empty where the encoding has no glyph.
    fn table(self) -> &'static [String] {
        static WIN_ANSI: OnceLock<Vec<String>> = OnceLock::new();
        static MAC_ROMAN: OnceLock<Vec<String>> = OnceLock::new();
        static STANDARD: OnceLock<Vec<String>> = OnceLock::new();
        let cell = match self {
            Self::WinAnsi => &WIN_ANSI,
            Self::MacRoman => &MAC_ROMAN,
            Self::Standard => &STANDARD,
        };
        cell.get_or_init(|| {
            (0..=u8::MAX)
                .map(|b| Document::decode_text(Some(self.lopdf_name()), &[b]))
                .collect()
        })
    }

    fn decode(self, byte: u8) -> String {
        match self.table().get(usize::from(byte)) {
            Some(text) if !text.is_empty() => text.clone(),
            _ => char::from(byte).to_string(),
        }
    }
}

/// Approximate Helvetica widths at 1000 units/em for WinAnsi chars 32..=255.
fn helvetica_width(code: u32) -> f32 {
    match code {
        32 => 278.0,                          // space
        33..=47 => 333.0,                     // punctuation
        48..=57 => 556.0,                     // digits
        58..=64 => 333.0,                     // more punctuation
        73 | 74 => 278.0,                     // I J (narrow uppercase)
        77 => 833.0,                          // M (wide)
        65..=90 => 667.0,                     // uppercase A-Z (average)
        91..=96 => 333.0,                     // brackets etc.
        102 | 105 | 106 | 108 | 116 => 278.0, // narrow lowercase: f i j l t
        109 | 119 => 833.0,                   // m w (wide)
        97..=122 => 556.0,                    // lowercase a-z (average)
        _ => 556.0,
    }
}

/// Widths of the standard 14 fonts when a simple font omits `/Widths`.
#[derive(Clone, Copy, Debug, PartialEq)]
enum StandardMetrics {
    Fixed(f32),
    Helvetica,
}

impl StandardMetrics {
    fn for_base_font(base_font: &str) -> Self {
        if base_font.contains("Courier") {
            Self::Fixed(600.0)
        } else {
            Self::Helvetica
        }
    }

    fn width(self, code: u32) -> f32 {
        match self {
            Self::Fixed(w) => w,
            Self::Helvetica => helvetica_width(code),
        }
    }
}

fn default_descent(base_font: &str) -> f32 {
    if base_font.contains("Courier") {
        -157.0
    } else if base_font.contains("Times") {
        -217.0
    } else {
        -207.0
    }
}

/// Widest `/W` range or `bfrange` expanded; CIDs never exceed two bytes.
const MAX_CID_RANGE: u32 = 0xFFFF;

/// One decoded character code.
pub(crate) struct DecodedChar {
    pub(crate) code: u32,
    pub(crate) text: String,
    /// Advance width in glyph space (1/1000 em for non-Type3 fonts).
    pub(crate) width: f32,
}

/// Just enough of a PDF font to turn shown strings into positioned text.
pub(crate) struct PdfFont {
    base_font: String,
    two_byte: bool,
    widths: HashMap<u32, f32>,
    default_width: Option<f32>,
    standard: StandardMetrics,
    base_encoding: Option<BaseEncoding>,
    differences: HashMap<u32, String>,
    to_unicode: HashMap<u32, String>,
    /// Glyph-space to text-space scale (0.001 except for Type3 fonts).
    scale: f32,
    /// Descent in 1/1000 em, negative below the baseline.
    pub(crate) descent: f32,
}

impl PdfFont {
    pub(crate) fn load(doc: &Document, dict: &Dictionary) -> PdfFont {
        let subtype = dict
            .get(b"Subtype")
            .ok()
            .and_then(|o| o.as_name().ok())
            .unwrap_or(b"Type1");
        let base_font = dict
            .get(b"BaseFont")
            .ok()
            .and_then(|o| o.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).into_owned())
            .unwrap_or_default();
        let two_byte = subtype == b"Type0";

        let mut font = PdfFont {
            standard: StandardMetrics::for_base_font(&base_font),
            descent: default_descent(&base_font),
            base_font,
            two_byte,
            widths: HashMap::new(),
            default_width: None,
            base_encoding: None,
            differences: HashMap::new(),
            to_unicode: HashMap::new(),
            scale: 0.001,
        };

        if two_byte {
            let descendant = dict
                .get(b"DescendantFonts")
                .ok()
                .and_then(|o| resolve(doc, o))
                .and_then(|o| o.as_array().ok())
                .and_then(|a| a.first())
                .and_then(|o| resolve(doc, o))
                .and_then(|o| o.as_dict().ok());
            match descendant {
                Some(cid) => font.load_cid_metrics(doc, cid),
                None => font.default_width = Some(1000.0),
            }
        } else {
            font.load_simple_metrics(doc, dict);
            font.load_encoding(doc, dict);
        }
        if subtype == b"Type3" {
            font.scale = dict
                .get(b"FontMatrix")
                .ok()
                .and_then(|o| resolve(doc, o))
                .and_then(|o| o.as_array().ok())
                .and_then(|a| a.first())
                .and_then(number)
                .unwrap_or(0.001);
        }

        if let Some(stream) = dict
            .get(b"ToUnicode")
            .ok()
            .and_then(|o| resolve(doc, o))
            .and_then(|o| o.as_stream().ok())
        {
            let content = if stream.dict.get(b"Filter").is_ok() {
                stream.decompressed_content().ok()
            } else {
                Some(stream.content.clone())
            };
            match content {
                Some(bytes) => font.to_unicode = parse_to_unicode(&bytes, &font.base_font),
                None => log::warn!("cannot decompress /ToUnicode of {}", font.base_font),
            }
        }

        font
    }

    fn load_descriptor(&mut self, doc: &Document, dict: &Dictionary) {
        let Some(descriptor) = dict
            .get(b"FontDescriptor")
            .ok()
            .and_then(|o| resolve(doc, o))
            .and_then(|o| o.as_dict().ok())
        else {
            return;
        };
        if let Some(d) = descriptor.get(b"Descent").ok().and_then(number) {
            if d < 0.0 {
                self.descent = d;
            }
        }
        if let Some(w) = descriptor.get(b"MissingWidth").ok().and_then(number) {
            if w > 0.0 {
                self.default_width = Some(w);
            }
        }
    }

    fn load_simple_metrics(&mut self, doc: &Document, dict: &Dictionary) {
        self.load_descriptor(doc, dict);
        let first_char = dict
            .get(b"FirstChar")
            .ok()
            .and_then(number)
            .unwrap_or(0.0) as u32;
        if let Some(widths) = dict
            .get(b"Widths")
            .ok()
            .and_then(|o| resolve(doc, o))
            .and_then(|o| o.as_array().ok())
        {
            for (code, w) in (first_char..=u32::MAX).zip(widths) {
                if let Some(w) = resolve(doc, w).and_then(number) {
                    self.widths.insert(code, w);
                }
            }
        }
    }

    fn load_cid_metrics(&mut self, doc: &Document, cid: &Dictionary) {
        self.load_descriptor(doc, cid);
        self.default_width = Some(cid.get(b"DW").ok().and_then(number).unwrap_or(1000.0));
        let Some(w) = cid
            .get(b"W")
            .ok()
            .and_then(|o| resolve(doc, o))
            .and_then(|o| o.as_array().ok())
        else {
            return;
        };
        // Entries are either `c [w1 w2 ...]` or `c_first c_last w`.
        let mut i = 0;
        while i < w.len() {
            let Some(start) = number(&w[i]) else {
                break;
            };
            let start = start as u32;
            match w.get(i + 1).and_then(|o| resolve(doc, o)) {
                Some(Object::Array(list)) => {
                    for (code, width) in (start..=u32::MAX).zip(list) {
                        if let Some(width) = number(width) {
                            self.widths.insert(code, width);
                        }
                    }
                    i += 2;
                }
                Some(end) => {
                    let (Some(end), Some(width)) = (number(end), w.get(i + 2).and_then(number))
                    else {
                        break;
                    };
                    let end = (end as u32).min(start.saturating_add(MAX_CID_RANGE));
                    for code in start..=end {
                        self.widths.insert(code, width);
                    }
                    i += 3;
                }
                None => break,
            }
        }
    }

    fn load_encoding(&mut self, doc: &Document, dict: &Dictionary) {
        let Some(encoding) = dict.get(b"Encoding").ok().and_then(|o| resolve(doc, o)) else {
            return;
        };
        match encoding {
            Object::Name(name) => self.base_encoding = BaseEncoding::from_name(name),
            Object::Dictionary(enc) => {
                self.base_encoding = enc
                    .get(b"BaseEncoding")
                    .ok()
                    .and_then(|o| o.as_name().ok())
                    .and_then(BaseEncoding::from_name);
                let Some(diffs) = enc
                    .get(b"Differences")
                    .ok()
                    .and_then(|o| resolve(doc, o))
                    .and_then(|o| o.as_array().ok())
                else {
                    return;
                };
                let mut code = 0u32;
                for item in diffs {
                    match item {
                        Object::Name(name) => {
                            let name = String::from_utf8_lossy(name);
                            if let Some(text) = glyph_name_to_text(&name) {
                                self.differences.insert(code, text);
                            }
                            code = code.saturating_add(1);
                        }
                        other => {
                            if let Some(n) = number(other) {
                                code = n as u32;
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    pub(crate) fn is_single_byte(&self) -> bool {
        !self.two_byte
    }

    /// Scale from glyph-space widths to text space.
    pub(crate) fn width_scale(&self) -> f32 {
        self.scale
    }

    fn width_of(&self, code: u32) -> f32 {
        if let Some(&w) = self.widths.get(&code) {
            return w;
        }
        if let Some(w) = self.default_width {
            return w;
        }
        self.standard.width(code)
    }

    fn text_of(&self, code: u32) -> String {
        if let Some(text) = self.to_unicode.get(&code) {
            return text.clone();
        }
        if self.two_byte {
            return '\u{FFFD}'.to_string();
        }
        if let Some(text) = self.differences.get(&code) {
            return text.clone();
        }
        let byte = code as u8;
        self.base_encoding.unwrap_or(BaseEncoding::WinAnsi).decode(byte)
    }

    pub(crate) fn decode(&self, bytes: &[u8]) -> Vec<DecodedChar> {
        let codes: Vec<u32> = if self.two_byte {
            bytes
                .chunks(2)
                .map(|c| match c {
                    [hi, lo] => u32::from(*hi) << 8 | u32::from(*lo),
                    [b] => u32::from(*b),
                    _ => 0,
                })
                .collect()
        } else {
            bytes.iter().map(|&b| u32::from(b)).collect()
        };
        codes
            .into_iter()
            .map(|code| DecodedChar {
                code,
                text: self.text_of(code),
                width: self.width_of(code),
            })
            .collect()
    }
}

/// Code to text mapping of a ToUnicode CMap. Unparseable CMaps yield an
/// empty map and a warning.
pub(crate) fn parse_to_unicode(data: &[u8], font_name: &str) -> HashMap<u32, String> {
    let parsed = std::panic::catch_unwind(|| adobe_cmap_parser::get_unicode_map(data));
    let cmap = match parsed {
        Ok(Ok(cmap)) => cmap,
        Ok(Err(e)) => {
            log::warn!("cannot parse /ToUnicode of {font_name}: {e:?}");
            return HashMap::new();
        }
        Err(_) => {
            log::warn!("/ToUnicode of {font_name} crashed the CMap parser");
            return HashMap::new();
        }
    };
    cmap.into_iter()
        .map(|(code, utf16)| {
            let (text, _) = UTF_16BE.decode_without_bom_handling(&utf16);
            (code, text.into_owned())
        })
        .collect()
}
