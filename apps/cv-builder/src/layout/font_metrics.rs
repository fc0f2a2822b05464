//! Font metrics for layout: the `TextMetrics` seam, and static tables for the two
//! PDF base-14 faces the exporter draws with when no TrueType font is configured.
//!
//! Widths are the Adobe AFM advance widths divided by 1000, i.e. em units at the
//! configured font size. Tables cover ASCII 0x20..=0x7E (95 printable characters),
//! index = (char as usize) - 32. Anything else measures as `average_char_width`.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Font faces
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFace {
    Regular,
    Bold,
}

impl FontFace {
    pub const ALL: [FontFace; 2] = [FontFace::Regular, FontFace::Bold];

    /// PDF `BaseFont` name.
    pub fn base_font(&self) -> &'static str {
        match self {
            FontFace::Regular => "Helvetica",
            FontFace::Bold => "Helvetica-Bold",
        }
    }

    /// Key in the page resource dictionary.
    pub fn resource_name(&self) -> &'static str {
        match self {
            FontFace::Regular => "F1",
            FontFace::Bold => "F2",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Page configuration
// ────────────────────────────────────────────────────────────────────────────

/// Page geometry in PDF points (1/72 inch). All integers, so every drawn
/// coordinate is an exact integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageConfig {
    pub width_pt: i64,
    pub height_pt: i64,
    pub margin_top_pt: i64,
    pub margin_bottom_pt: i64,
    pub margin_left_pt: i64,
    pub margin_right_pt: i64,
}

impl PageConfig {
    pub fn text_width_pt(&self) -> i64 {
        self.width_pt - self.margin_left_pt - self.margin_right_pt
    }

    /// Y of the top of the text area (PDF origin is bottom-left).
    pub fn top_pt(&self) -> i64 {
        self.height_pt - self.margin_top_pt
    }
}

/// A4 portrait with 48pt (2/3 inch) margins.
pub fn a4_page_config() -> PageConfig {
    PageConfig {
        width_pt: 595,
        height_pt: 842,
        margin_top_pt: 48,
        margin_bottom_pt: 48,
        margin_left_pt: 48,
        margin_right_pt: 48,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Advance widths in em units, and the greedy word-wrap built on them.
pub trait TextMetrics {
    fn char_width(&self, c: char) -> f32;

    fn space_width(&self) -> f32 {
        self.char_width(' ')
    }

    /// Rendered width of `s` in em units.
    fn measure_str(&self, s: &str) -> f32 {
        s.chars().map(|c| self.char_width(c)).sum()
    }

    fn width_pt(&self, s: &str, size_pt: f32) -> f32 {
        self.measure_str(s) * size_pt
    }

    /// Greedy word-wrap of `text` into lines no wider than `max_width_pt`.
    ///
    /// Words wider than a full line are broken between characters. Whitespace runs
    /// collapse to one space; empty input yields no lines.
    fn wrap(&self, text: &str, size_pt: f32, max_width_pt: f32) -> Vec<String> {
        let max_width = max_width_pt / size_pt;
        let space_width = self.space_width();
        let mut lines = Vec::new();
        let mut current = String::new();
        let mut current_width = 0.0_f32;

        for word in text.split_whitespace() {
            for piece in split_long_word(self, word, max_width) {
                let piece_w = self.measure_str(&piece);
                if current.is_empty() {
                    current = piece;
                    current_width = piece_w;
                } else if current_width + space_width + piece_w > max_width {
                    lines.push(std::mem::take(&mut current));
                    current = piece;
                    current_width = piece_w;
                } else {
                    current.push(' ');
                    current.push_str(&piece);
                    current_width += space_width + piece_w;
                }
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }
}

fn split_long_word<M: TextMetrics + ?Sized>(metrics: &M, word: &str, max_width: f32) -> Vec<String> {
    if metrics.measure_str(word) <= max_width {
        return vec![word.to_string()];
    }
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut width = 0.0_f32;
    for c in word.chars() {
        let char_w = metrics.char_width(c);
        // Every piece keeps at least one character.
        if !piece.is_empty() && width + char_w > max_width {
            pieces.push(std::mem::take(&mut piece));
            width = 0.0;
        }
        piece.push(c);
        width += char_w;
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

/// The faces a page is laid out with.
pub trait FontSet {
    fn metrics(&self, face: FontFace) -> &dyn TextMetrics;
}

/// The PDF base-14 Helvetica faces; nothing to embed.
pub struct StandardFonts;

impl FontSet for StandardFonts {
    fn metrics(&self, face: FontFace) -> &dyn TextMetrics {
        get_metrics(face)
    }
}

pub struct FontMetricTable {
    pub face: FontFace,
    widths: [f32; 95],
    pub average_char_width: f32,
    pub space_width: f32,
}

impl TextMetrics for FontMetricTable {
    fn char_width(&self, c: char) -> f32 {
        let code = c as usize;
        if (32..=126).contains(&code) {
            self.widths[code - 32]
        } else {
            self.average_char_width
        }
    }

    fn space_width(&self) -> f32 {
        self.space_width
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    face: FontFace::Regular,
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
        // {      |      }      ~
        0.334, 0.260, 0.334, 0.584,
    ],
    average_char_width: 0.556,
    space_width: 0.278,
};

static HELVETICA_BOLD_TABLE: FontMetricTable = FontMetricTable {
    face: FontFace::Bold,
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.333, 0.474, 0.556, 0.556, 0.889, 0.722, 0.238, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.333, 0.333, 0.584, 0.584, 0.584, 0.611, 0.975,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.722, 0.722, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.556, 0.722, 0.611, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.333, 0.278, 0.333, 0.584, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.611, 0.556, 0.611, 0.556, 0.333, 0.611, 0.611, 0.278, 0.278, 0.556, 0.278, 0.889,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.611, 0.611, 0.611, 0.611, 0.389, 0.556, 0.333, 0.611, 0.556, 0.778, 0.556, 0.556, 0.500,
        // {      |      }      ~
        0.389, 0.280, 0.389, 0.584,
    ],
    average_char_width: 0.611,
    space_width: 0.278,
};

pub fn get_metrics(face: FontFace) -> &'static FontMetricTable {
    match face {
        FontFace::Regular => &HELVETICA_TABLE,
        FontFace::Bold => &HELVETICA_BOLD_TABLE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
