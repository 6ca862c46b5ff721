use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use pdf_writer::{Filter, Name, Pdf, Rect, Ref};
use ttf_parser::Face;

use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontWeight {
    Regular,
    Bold,
}

struct TrueTypeData {
    family: String,
    data: Vec<u8>,
    face_index: u32,
}

/// Which typeface every composer draws with. Passed explicitly to each
/// document render instead of living in a global.
#[derive(Clone)]
pub struct FontConfig {
    regular: Option<Arc<TrueTypeData>>,
    bold: Option<Arc<TrueTypeData>>,
}

impl std::fmt::Debug for FontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontConfig")
            .field("family", &self.family())
            .field("embedded", &self.regular.is_some())
            .finish()
    }
}

impl Default for FontConfig {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FontConfig {
    /// Standard-14 Helvetica / Helvetica-Bold, WinAnsi encoded. Never fails.
    pub fn builtin() -> Self {
        Self {
            regular: None,
            bold: None,
        }
    }

    /// Embed TrueType/OpenType faces. `bold` falls back to `regular` when absent.
    pub fn from_truetype(family: &str, regular: Vec<u8>, bold: Option<Vec<u8>>) -> Result<Self> {
        let check = |data: &[u8], which: &str| {
            Face::parse(data, 0)
                .map(|_| ())
                .map_err(|e| Error::Config(format!("{which} font for {family:?}: {e}")))
        };
        check(&regular, "regular")?;
        if let Some(ref b) = bold {
            check(b, "bold")?;
        }
        let regular = Arc::new(TrueTypeData {
            family: family.to_string(),
            data: regular,
            face_index: 0,
        });
        let bold = match bold {
            Some(data) => Arc::new(TrueTypeData {
                family: format!("{family} Bold"),
                data,
                face_index: 0,
            }),
            None => Arc::clone(&regular),
        };
        Ok(Self {
            regular: Some(regular),
            bold: Some(bold),
        })
    }

    pub fn from_paths(regular: &Path, bold: Option<&Path>) -> Result<Self> {
        let family = regular
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Custom")
            .to_string();
        let regular_data = std::fs::read(regular)?;
        let bold_data = bold.map(std::fs::read).transpose()?;
        Self::from_truetype(&family, regular_data, bold_data)
    }

    /// Reads `AGENCY_PDF_FONT` (and optionally `AGENCY_PDF_FONT_BOLD`).
    /// Missing or unreadable fonts fall back to Helvetica with a warning.
    pub fn from_env() -> Self {
        let Ok(regular) = std::env::var("AGENCY_PDF_FONT") else {
            return Self::builtin();
        };
        let bold = std::env::var("AGENCY_PDF_FONT_BOLD").ok();
        match Self::from_paths(Path::new(&regular), bold.as_deref().map(Path::new)) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("Font {regular} unusable ({e}), using Helvetica");
                Self::builtin()
            }
        }
    }

    pub fn family(&self) -> &str {
        self.regular
            .as_ref()
            .map(|t| t.family.as_str())
            .unwrap_or("Helvetica")
    }

    pub(crate) fn load(&self) -> Result<FontSet> {
        let regular = match &self.regular {
            Some(tt) => FontEntry::truetype("F1", Arc::clone(tt))?,
            None => FontEntry::helvetica("F1", FontWeight::Regular),
        };
        let bold = match &self.bold {
            Some(tt) => FontEntry::truetype("F2", Arc::clone(tt))?,
            None => FontEntry::helvetica("F2", FontWeight::Bold),
        };
        Ok(FontSet { regular, bold })
    }
}

pub(crate) struct FontEntry {
    pub(crate) pdf_name: String,
    base_font: &'static str,
    widths_1000: HashMap<char, f32>,
    default_width: f32,
    pub(crate) ascender_ratio: f32,
    char_to_gid: Option<HashMap<char, u16>>,
    truetype: Option<Arc<TrueTypeData>>,
}

impl FontEntry {
    fn helvetica(pdf_name: &str, weight: FontWeight) -> Self {
        let table = match weight {
            FontWeight::Regular => helvetica_widths(),
            FontWeight::Bold => helvetica_bold_widths(),
        };
        let widths_1000 = (32u8..=255u8)
            .zip(table)
            .map(|(byte, w)| (winansi_to_char(byte), w))
            .collect();
        Self {
            pdf_name: pdf_name.to_string(),
            base_font: match weight {
                FontWeight::Regular => "Helvetica",
                FontWeight::Bold => "Helvetica-Bold",
            },
            widths_1000,
            default_width: 556.0,
            ascender_ratio: 0.718,
            char_to_gid: None,
            truetype: None,
        }
    }

    fn truetype(pdf_name: &str, tt: Arc<TrueTypeData>) -> Result<Self> {
        let face = Face::parse(&tt.data, tt.face_index)
            .map_err(|e| Error::Config(format!("font {:?}: {e}", tt.family)))?;
        let units = face.units_per_em() as f32;

        let mut char_to_gid = HashMap::new();
        let mut widths_1000 = HashMap::new();
        if let Some(cmap) = face.tables().cmap {
            for subtable in cmap.subtables {
                if !subtable.is_unicode() {
                    continue;
                }
                subtable.codepoints(|cp| {
                    let Some(ch) = char::from_u32(cp) else {
                        return;
                    };
                    let Some(gid) = subtable.glyph_index(cp) else {
                        return;
                    };
                    if char_to_gid.contains_key(&ch) {
                        return;
                    }
                    let adv = face
                        .glyph_hor_advance(gid)
                        .map(|a| a as f32 / units * 1000.0)
                        .unwrap_or(0.0);
                    char_to_gid.insert(ch, gid.0);
                    widths_1000.insert(ch, adv);
                });
            }
        }
        let default_width = widths_1000.get(&'n').copied().unwrap_or(500.0);

        Ok(Self {
            pdf_name: pdf_name.to_string(),
            base_font: "",
            widths_1000,
            default_width,
            ascender_ratio: face.ascender() as f32 / units,
            char_to_gid: Some(char_to_gid),
            truetype: Some(tt),
        })
    }

    /// Width of a single character in 1000-units.
    pub(crate) fn char_width_1000(&self, ch: char) -> f32 {
        if ch.is_control() {
            return 0.0;
        }
        match self.widths_1000.get(&ch) {
            Some(&w) => w,
            // Builtin fonts drop chars WinAnsi cannot encode, so they take no space.
            None if self.char_to_gid.is_none() => 0.0,
            None => self.default_width,
        }
    }

    pub(crate) fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars()
            .map(|ch| self.char_width_1000(ch) * font_size / 1000.0)
            .sum()
    }

    pub(crate) fn encode(&self, text: &str) -> Vec<u8> {
        match &self.char_to_gid {
            Some(map) => encode_as_gids(text, map),
            None => to_winansi_bytes(text),
        }
    }

    /// Write the font dictionaries. `used_chars` limits the width and
    /// ToUnicode tables of embedded fonts to what the pages reference.
    pub(crate) fn write(
        &self,
        pdf: &mut Pdf,
        font_ref: Ref,
        used_chars: &HashSet<char>,
        alloc: &mut impl FnMut() -> Ref,
    ) -> Result<()> {
        match &self.truetype {
            None => {
                pdf.type1_font(font_ref)
                    .base_font(Name(self.base_font.as_bytes()))
                    .encoding_predefined(Name(b"WinAnsiEncoding"));
                Ok(())
            }
            Some(tt) => self.write_truetype(pdf, font_ref, tt, used_chars, alloc),
        }
    }

    /// Embed as a CIDFont (Type0 composite) with Identity-H encoding. Glyph ids
    /// are the font's own, so CIDToGIDMap is Identity and the file goes in whole.
    fn write_truetype(
        &self,
        pdf: &mut Pdf,
        font_ref: Ref,
        tt: &TrueTypeData,
        used_chars: &HashSet<char>,
        alloc: &mut impl FnMut() -> Ref,
    ) -> Result<()> {
        let face = Face::parse(&tt.data, tt.face_index)
            .map_err(|e| Error::Generation(format!("font {:?}: {e}", tt.family)))?;
        let units = face.units_per_em() as f32;
        let scale = |v: f32| v / units * 1000.0;

        let bb = face.global_bounding_box();
        let bbox = Rect::new(
            scale(bb.x_min as f32),
            scale(bb.y_min as f32),
            scale(bb.x_max as f32),
            scale(bb.y_max as f32),
        );
        let cap_height = face
            .capital_height()
            .map(|h| scale(h as f32))
            .unwrap_or(700.0);

        let descriptor_ref = alloc();
        let data_ref = alloc();
        let cid_font_ref = alloc();
        let tounicode_ref = alloc();

        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&tt.data, 6);
        let data_len = i32::try_from(tt.data.len())
            .map_err(|_| Error::Generation(format!("font {:?} too large", tt.family)))?;
        pdf.stream(data_ref, &compressed)
            .filter(Filter::FlateDecode)
            .pair(Name(b"Length1"), data_len);

        let ps_name: String = tt.family.chars().filter(|c| !c.is_whitespace()).collect();

        pdf.font_descriptor(descriptor_ref)
            .name(Name(ps_name.as_bytes()))
            .flags(pdf_writer::types::FontFlags::NON_SYMBOLIC)
            .bbox(bbox)
            .italic_angle(0.0)
            .ascent(scale(face.ascender() as f32))
            .descent(scale(face.descender() as f32))
            .cap_height(cap_height)
            .stem_v(80.0)
            .font_file2(data_ref);

        let mut used_gids: Vec<(u16, f32, char)> = used_chars
            .iter()
            .filter_map(|ch| {
                let map = self.char_to_gid.as_ref()?;
                map.get(ch).map(|&gid| (gid, self.char_width_1000(*ch), *ch))
            })
            .collect();
        used_gids.sort_by_key(|&(gid, _, _)| gid);
        used_gids.dedup_by_key(|g| g.0);

        let system_info = pdf_writer::types::SystemInfo {
            registry: pdf_writer::Str(b"Adobe"),
            ordering: pdf_writer::Str(b"Identity"),
            supplement: 0,
        };
        {
            let mut cid = pdf.cid_font(cid_font_ref);
            cid.subtype(pdf_writer::types::CidFontType::Type2);
            cid.base_font(Name(ps_name.as_bytes()));
            cid.system_info(system_info);
            cid.font_descriptor(descriptor_ref);
            cid.default_width(0.0);
            cid.cid_to_gid_map_predefined(Name(b"Identity"));
            if !used_gids.is_empty() {
                let mut w = cid.widths();
                for &(gid, width, _) in &used_gids {
                    w.consecutive(gid, [width]);
                }
            }
        }

        let cmap_name = format!("{ps_name}-UTF16");
        let mut cmap = pdf_writer::types::UnicodeCmap::new(
            Name(cmap_name.as_bytes()),
            pdf_writer::types::SystemInfo {
                registry: pdf_writer::Str(b"Adobe"),
                ordering: pdf_writer::Str(b"Identity"),
                supplement: 0,
            },
        );
        for &(gid, _, ch) in &used_gids {
            cmap.pair(gid, ch);
        }
        let cmap_data = cmap.finish();
        pdf.stream(tounicode_ref, cmap_data.as_slice());

        pdf.type0_font(font_ref)
            .base_font(Name(ps_name.as_bytes()))
            .encoding_predefined(Name(b"Identity-H"))
            .descendant_font(cid_font_ref)
            .to_unicode(tounicode_ref);

        log::debug!(
            "embedded font {} as {} ({} glyphs referenced)",
            tt.family,
            self.pdf_name,
            used_gids.len()
        );
        Ok(())
    }
}

/// Regular + bold faces resolved for one document.
pub(crate) struct FontSet {
    pub(crate) regular: FontEntry,
    pub(crate) bold: FontEntry,
}

impl FontSet {
    pub(crate) fn get(&self, weight: FontWeight) -> &FontEntry {
        match weight {
            FontWeight::Regular => &self.regular,
            FontWeight::Bold => &self.bold,
        }
    }

    pub(crate) fn measure(&self, text: &str, weight: FontWeight, font_size: f32) -> f32 {
        self.get(weight).text_width(text, font_size)
    }
}

/// Windows-1252 (WinAnsi) byte to Unicode char mapping.
/// Bytes 0x80-0x9F are remapped; all others map directly to their Unicode codepoint.
fn winansi_to_char(byte: u8) -> char {
    match byte {
        0x80 => '\u{20AC}',
        0x82 => '\u{201A}',
        0x83 => '\u{0192}',
        0x84 => '\u{201E}',
        0x85 => '\u{2026}',
        0x86 => '\u{2020}',
        0x87 => '\u{2021}',
        0x88 => '\u{02C6}',
        0x89 => '\u{2030}',
        0x8A => '\u{0160}',
        0x8B => '\u{2039}',
        0x8C => '\u{0152}',
        0x8E => '\u{017D}',
        0x91 => '\u{2018}',
        0x92 => '\u{2019}',
        0x93 => '\u{201C}',
        0x94 => '\u{201D}',
        0x95 => '\u{2022}', // bullet
        0x96 => '\u{2013}',
        0x97 => '\u{2014}',
        0x98 => '\u{02DC}',
        0x99 => '\u{2122}',
        0x9A => '\u{0161}',
        0x9B => '\u{203A}',
        0x9C => '\u{0153}',
        0x9E => '\u{017E}',
        0x9F => '\u{0178}',
        _ => byte as char,
    }
}

/// Map a single Unicode char to its WinAnsi byte, or None if unmappable.
fn char_to_winansi(c: char) -> Option<u8> {
    match c as u32 {
        0x0020..=0x007E => Some(c as u8),
        0x00A0..=0x00FF => Some(c as u8),
        0x20AC => Some(0x80),
        0x201A => Some(0x82),
        0x0192 => Some(0x83),
        0x201E => Some(0x84),
        0x2026 => Some(0x85),
        0x2020 => Some(0x86),
        0x2021 => Some(0x87),
        0x02C6 => Some(0x88),
        0x2030 => Some(0x89),
        0x0160 => Some(0x8A),
        0x2039 => Some(0x8B),
        0x0152 => Some(0x8C),
        0x017D => Some(0x8E),
        0x2018 => Some(0x91),
        0x2019 => Some(0x92),
        0x201C => Some(0x93),
        0x201D => Some(0x94),
        0x2022 => Some(0x95),
        0x2013 => Some(0x96),
        0x2014 => Some(0x97),
        0x02DC => Some(0x98),
        0x2122 => Some(0x99),
        0x0161 => Some(0x9A),
        0x203A => Some(0x9B),
        0x0153 => Some(0x9C),
        0x017E => Some(0x9E),
        0x0178 => Some(0x9F),
        _ => None,
    }
}

/// Convert a UTF-8 string to WinAnsi (Windows-1252) bytes for PDF Str encoding.
/// Characters outside the code page are dropped.
pub(crate) fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars().filter_map(char_to_winansi).collect()
}

/// Encode UTF-8 text as big-endian 2-byte glyph IDs for CIDFont content streams.
pub(crate) fn encode_as_gids(text: &str, char_to_gid: &HashMap<char, u16>) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 2);
    for ch in text.chars() {
        let gid = char_to_gid.get(&ch).copied().unwrap_or(0);
        out.push((gid >> 8) as u8);
        out.push((gid & 0xFF) as u8);
    }
    out
}

/// Upper half of the code page (0x7F..=0xFF) shared by both weights, except
/// where the AFM files differ notably.
fn high_winansi_width(b: u8, bold: bool) -> f32 {
    match b {
        0x7F => 0.0,
        0x80 => 556.0,                      // euro
        0x85 | 0x89 | 0x97 | 0x99 => 1000.0, // ellipsis, permille, emdash, trademark
        0x91 | 0x92 => {
            if bold {
                278.0
            } else {
                222.0
            }
        }
        0x93 | 0x94 => {
            if bold {
                500.0
            } else {
                333.0
            }
        }
        0x95 => 350.0, // bullet
        0x96 => 556.0, // endash
        0xA0 => 278.0, // nbsp
        0xA9 | 0xAE => 737.0,
        0xB0 => 400.0,
        0xB7 => 278.0, // middle dot
        0xC0..=0xC5 => {
            if bold {
                722.0
            } else {
                667.0
            }
        }
        0xC6 => 1000.0,
        0xD7 => 584.0,
        0xE0..=0xE5 | 0xE8..=0xEB | 0xF2..=0xF6 => 556.0,
        0xEC..=0xEF => 278.0,
        _ => 556.0,
    }
}

/// Helvetica advance widths at 1000 units/em for WinAnsi chars 32..=255.
fn helvetica_widths() -> Vec<f32> {
    const ASCII: [f32; 95] = [
        278.0, 278.0, 355.0, 556.0, 556.0, 889.0, 667.0, 191.0, 333.0, 333.0, 389.0, 584.0,
        278.0, 333.0, 278.0, 278.0, 556.0, 556.0, 556.0, 556.0, 556.0, 556.0, 556.0, 556.0,
        556.0, 556.0, 278.0, 278.0, 584.0, 584.0, 584.0, 556.0, 1015.0, 667.0, 667.0, 722.0,
        722.0, 667.0, 611.0, 778.0, 722.0, 278.0, 500.0, 667.0, 556.0, 833.0, 722.0, 778.0,
        667.0, 778.0, 722.0, 667.0, 611.0, 722.0, 667.0, 944.0, 667.0, 667.0, 611.0, 278.0,
        278.0, 278.0, 469.0, 556.0, 333.0, 556.0, 556.0, 500.0, 556.0, 556.0, 278.0, 556.0,
        556.0, 222.0, 222.0, 500.0, 222.0, 833.0, 556.0, 556.0, 556.0, 556.0, 333.0, 500.0,
        278.0, 556.0, 500.0, 722.0, 500.0, 500.0, 500.0, 334.0, 260.0, 334.0, 584.0,
    ];
    (32u8..=255u8)
        .map(|b| match b {
            32..=126 => ASCII[(b - 32) as usize],
            _ => high_winansi_width(b, false),
        })
        .collect()
}

/// Helvetica-Bold advance widths at 1000 units/em for WinAnsi chars 32..=255.
fn helvetica_bold_widths() -> Vec<f32> {
    const ASCII: [f32; 95] = [
        278.0, 333.0, 474.0, 556.0, 556.0, 889.0, 722.0, 238.0, 333.0, 333.0, 389.0, 584.0,
        278.0, 333.0, 278.0, 278.0, 556.0, 556.0, 556.0, 556.0, 556.0, 556.0, 556.0, 556.0,
        556.0, 556.0, 333.0, 333.0, 584.0, 584.0, 584.0, 611.0, 975.0, 722.0, 722.0, 722.0,
        722.0, 667.0, 611.0, 778.0, 722.0, 278.0, 556.0, 722.0, 611.0, 833.0, 722.0, 778.0,
        667.0, 778.0, 722.0, 667.0, 611.0, 722.0, 667.0, 944.0, 667.0, 667.0, 611.0, 333.0,
        278.0, 333.0, 584.0, 556.0, 333.0, 556.0, 611.0, 556.0, 611.0, 556.0, 333.0, 611.0,
        611.0, 278.0, 278.0, 556.0, 278.0, 889.0, 611.0, 611.0, 611.0, 611.0, 389.0, 556.0,
        333.0, 611.0, 556.0, 778.0, 556.0, 556.0, 500.0, 389.0, 280.0, 389.0, 584.0,
    ];
    (32u8..=255u8)
        .map(|b| match b {
            32..=126 => ASCII[(b - 32) as usize],
            _ => high_winansi_width(b, true),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn winansi_keeps_euro_and_drops_unmappable() {
        assert_eq!(to_winansi_bytes("\u{20ac}5 \u{2013} ok"), vec![0x80, b'5', b' ', 0x96, b' ', b'o', b'k']);
        assert_eq!(to_winansi_bytes("\u{4e2d}a"), vec![b'a']);
    }

    #[test]
    fn garbage_font_data_is_a_config_error() {
        let err = FontConfig::from_truetype("Broken", vec![0u8; 16], None).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn builtin_bold_is_wider() {
        let set = FontConfig::builtin().load().unwrap();
        let regular = set.measure("Invoice total", FontWeight::Regular, 10.0);
        let bold = set.measure("Invoice total", FontWeight::Bold, 10.0);
        assert!(bold > regular && regular > 0.0);
    }
}
