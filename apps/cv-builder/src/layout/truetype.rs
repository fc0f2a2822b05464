//! TrueType faces loaded at startup so the PDF exporter can draw any script the font
//! covers (Hangul included).
//!
//! Only what layout and embedding need is read: the Unicode cmap, horizontal
//! advances and the header metrics for the font descriptor. The font program is
//! embedded unchanged.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;
use ttf_parser::{name_id, Face, GlyphId};

use crate::layout::font_metrics::TextMetrics;

#[derive(Debug, Error)]
pub enum FontError {
    #[error("Unreadable font: {0}")]
    Parse(String),

    #[error("Font has no Unicode character map")]
    NoUnicodeCmap,

    #[error("Font has no TrueType outlines")]
    NotTrueType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub id: u16,
    /// Advance width in font units.
    pub advance: u16,
}

pub struct EmbeddedFont {
    postscript_name: String,
    units_per_em: u16,
    ascent: i16,
    descent: i16,
    cap_height: i16,
    bbox: [i16; 4],
    notdef_advance: u16,
    glyphs: HashMap<char, Glyph>,
    data: Vec<u8>,
}

impl EmbeddedFont {
    pub fn from_ttf(data: Vec<u8>) -> Result<Self, FontError> {
        let mut font = Self::read_tables(&data)?;
        font.data = data;
        Ok(font)
    }

    fn read_tables(data: &[u8]) -> Result<Self, FontError> {
        let face = Face::parse(data, 0).map_err(|e| FontError::Parse(e.to_string()))?;
        if face.tables().glyf.is_none() {
            return Err(FontError::NotTrueType);
        }

        let mut glyphs = HashMap::new();
        if let Some(cmap) = face.tables().cmap {
            for subtable in cmap.subtables {
                if !subtable.is_unicode() {
                    continue;
                }
                subtable.codepoints(|code| {
                    let Some(c) = char::from_u32(code) else {
                        return;
                    };
                    if let Some(id) = subtable.glyph_index(code).filter(|id| id.0 != 0) {
                        glyphs.entry(c).or_insert(Glyph {
                            id: id.0,
                            advance: face.glyph_hor_advance(id).unwrap_or(0),
                        });
                    }
                });
            }
        }
        if glyphs.is_empty() {
            return Err(FontError::NoUnicodeCmap);
        }

        let postscript_name = face
            .names()
            .into_iter()
            .filter(|n| n.name_id == name_id::POST_SCRIPT_NAME)
            .find_map(|n| n.to_string())
            .map(|n| {
                n.chars()
                    .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
                    .collect::<String>()
            })
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "EmbeddedFont".to_string());

        let bbox = face.global_bounding_box();
        let ascent = face.ascender();
        Ok(Self {
            postscript_name,
            units_per_em: face.units_per_em(),
            ascent,
            descent: face.descender(),
            cap_height: face.capital_height().unwrap_or(ascent),
            bbox: [bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max],
            notdef_advance: face.glyph_hor_advance(GlyphId(0)).unwrap_or(0),
            glyphs,
            data: Vec::new(),
        })
    }

    pub fn glyph(&self, c: char) -> Option<Glyph> {
        self.glyphs.get(&c).copied()
    }

    pub fn postscript_name(&self) -> &str {
        &self.postscript_name
    }

    /// The raw font program, for `FontFile2`.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Font units to the 1000-unit PDF glyph space.
    pub fn to_glyph_space(&self, units: i32) -> i64 {
        (units as f64 * 1000.0 / self.units_per_em as f64).round() as i64
    }

    pub fn ascent(&self) -> i64 {
        self.to_glyph_space(self.ascent.into())
    }

    pub fn descent(&self) -> i64 {
        self.to_glyph_space(self.descent.into())
    }

    pub fn cap_height(&self) -> i64 {
        self.to_glyph_space(self.cap_height.into())
    }

    pub fn bbox(&self) -> [i64; 4] {
        self.bbox.map(|v| self.to_glyph_space(v.into()))
    }
}

impl TextMetrics for EmbeddedFont {
    fn char_width(&self, c: char) -> f32 {
        let advance = self.glyph(c).map_or(self.notdef_advance, |g| g.advance);
        advance as f32 / self.units_per_em as f32
    }
}

impl fmt::Debug for EmbeddedFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddedFont")
            .field("postscript_name", &self.postscript_name)
            .field("glyphs", &self.glyphs.len())
            .field("bytes", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Assembles a minimal TrueType font: empty outlines, one glyph per `(char,
    /// advance)` pair after `.notdef`, 1000 units per em, format 4 cmap.
    pub(crate) fn tiny_ttf(chars: &[(char, u16)]) -> Vec<u8> {
        let mut chars = chars.to_vec();
        chars.sort_by_key(|(c, _)| *c);
        let num_glyphs = chars.len() as u16 + 1;

        let mut head = Vec::new();
        head.extend(0x0001_0000u32.to_be_bytes()); // version
        head.extend(0x0001_0000u32.to_be_bytes()); // fontRevision
        head.extend(0u32.to_be_bytes()); // checkSumAdjustment
        head.extend(0x5F0F_3CF5u32.to_be_bytes()); // magic
        head.extend(0u16.to_be_bytes()); // flags
        head.extend(1000u16.to_be_bytes()); // unitsPerEm
        head.extend([0u8; 16]); // created, modified
        for v in [0i16, -200, 1000, 900] {
            head.extend(v.to_be_bytes()); // bbox
        }
        head.extend([0u8; 6]); // macStyle, lowestRecPPEM, fontDirectionHint
        head.extend(0i16.to_be_bytes()); // indexToLocFormat: short
        head.extend(0i16.to_be_bytes()); // glyphDataFormat

        let mut hhea = Vec::new();
        hhea.extend(0x0001_0000u32.to_be_bytes());
        hhea.extend(800i16.to_be_bytes()); // ascender
        hhea.extend((-200i16).to_be_bytes()); // descender
        hhea.extend([0u8; 26]);
        hhea.extend(num_glyphs.to_be_bytes()); // numberOfHMetrics

        let mut maxp = Vec::new();
        maxp.extend(0x0000_5000u32.to_be_bytes());
        maxp.extend(num_glyphs.to_be_bytes());

        let mut hmtx = Vec::new();
        hmtx.extend(500u16.to_be_bytes());
        hmtx.extend(0i16.to_be_bytes());
        for (_, advance) in &chars {
            hmtx.extend(advance.to_be_bytes());
            hmtx.extend(0i16.to_be_bytes());
        }

        let loca = vec![0u8; (num_glyphs as usize + 1) * 2];
        let glyf = vec![0u8; 4];

        // One segment per character plus the closing 0xFFFF segment.
        let seg_count = chars.len() as u16 + 1;
        let mut ends = Vec::new();
        let mut starts = Vec::new();
        let mut deltas = Vec::new();
        for (gid, (c, _)) in chars.iter().enumerate() {
            let code = *c as u32 as u16;
            ends.push(code);
            starts.push(code);
            deltas.push((gid as u16 + 1).wrapping_sub(code));
        }
        ends.push(0xFFFF);
        starts.push(0xFFFF);
        deltas.push(1);

        let mut subtable = Vec::new();
        subtable.extend(4u16.to_be_bytes());
        subtable.extend((16 + seg_count * 8).to_be_bytes()); // length
        subtable.extend(0u16.to_be_bytes()); // language
        subtable.extend((seg_count * 2).to_be_bytes());
        subtable.extend([0u8; 6]); // searchRange, entrySelector, rangeShift
        ends.iter().for_each(|v| subtable.extend(v.to_be_bytes()));
        subtable.extend(0u16.to_be_bytes()); // reservedPad
        starts.iter().for_each(|v| subtable.extend(v.to_be_bytes()));
        deltas.iter().for_each(|v| subtable.extend(v.to_be_bytes()));
        (0..seg_count).for_each(|_| subtable.extend(0u16.to_be_bytes())); // idRangeOffset

        let mut cmap = Vec::new();
        cmap.extend(0u16.to_be_bytes());
        cmap.extend(1u16.to_be_bytes());
        cmap.extend(3u16.to_be_bytes()); // Windows
        cmap.extend(1u16.to_be_bytes()); // Unicode BMP
        cmap.extend(12u32.to_be_bytes());
        cmap.extend(subtable);

        // Table records must be sorted by tag.
        let tables: [(&[u8; 4], Vec<u8>); 7] = [
            (b"cmap", cmap),
            (b"glyf", glyf),
            (b"head", head),
            (b"hhea", hhea),
            (b"hmtx", hmtx),
            (b"loca", loca),
            (b"maxp", maxp),
        ];
        let mut font = Vec::new();
        font.extend(0x0001_0000u32.to_be_bytes());
        font.extend((tables.len() as u16).to_be_bytes());
        font.extend([0u8; 6]);
        let mut offset = 12 + 16 * tables.len();
        let mut body = Vec::new();
        for (tag, data) in &tables {
            font.extend(tag.as_slice());
            font.extend(0u32.to_be_bytes());
            font.extend((offset as u32).to_be_bytes());
            font.extend((data.len() as u32).to_be_bytes());
            body.extend(data);
            while body.len() % 4 != 0 {
                body.push(0);
            }
            offset = 12 + 16 * tables.len() + body.len();
        }
        font.extend(body);
        font
    }

    #[test]
    fn test_loads_cmap_and_advances() {
        let font = EmbeddedFont::from_ttf(tiny_ttf(&[('김', 920), ('A', 600)])).unwrap();
        assert_eq!(font.glyph('A'), Some(Glyph { id: 1, advance: 600 }));
        assert_eq!(font.glyph('김'), Some(Glyph { id: 2, advance: 920 }));
        assert_eq!(font.glyph('z'), None);
        assert_eq!(font.postscript_name(), "EmbeddedFont");
        assert_eq!(font.ascent(), 800);
        assert_eq!(font.bbox(), [0, -200, 1000, 900]);
        assert!(!font.data().is_empty());
    }

    #[test]
    fn test_metrics_use_font_advances() {
        let font = EmbeddedFont::from_ttf(tiny_ttf(&[('김', 1000), (' ', 250)])).unwrap();
        assert!((font.measure_str("김김") - 2.0).abs() < 1e-6);
        // Unmapped characters measure as .notdef.
        assert!((font.char_width('?') - 0.5).abs() < 1e-6);
        let lines = font.wrap("김김 김김 김김", 10.0, 40.0);
        assert_eq!(lines, vec!["김김", "김김", "김김"]);
    }

    #[test]
    fn test_rejects_non_font_bytes() {
        assert!(matches!(
            EmbeddedFont::from_ttf(b"definitely not a font".to_vec()),
            Err(FontError::Parse(_))
        ));
    }
}
