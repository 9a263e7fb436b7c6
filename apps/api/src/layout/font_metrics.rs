//! Static font-metric tables for the three PDF base-14 Helvetica faces.
//!
//! Character widths are in em units (relative to font size), taken from the
//! Adobe AFM files divided by 1000. Word wrap measures with these tables so the
//! wrapped lines match what the PDF viewer draws with the standard fonts.
//! All tables cover ASCII 0x20..=0x7E (95 printable characters).
//! Index = (char as usize) - 32.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Font face
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    Normal,
    Italic,
}

/// The concrete faces the layout engine can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFace {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
}

impl FontFace {
    /// Bold wins over italic; the engine never emits bold-italic.
    pub fn for_style(weight: FontWeight, style: FontStyle) -> Self {
        match (weight, style) {
            (FontWeight::Bold, _) => FontFace::HelveticaBold,
            (FontWeight::Normal, FontStyle::Italic) => FontFace::HelveticaOblique,
            (FontWeight::Normal, FontStyle::Normal) => FontFace::Helvetica,
        }
    }

    /// PostScript name used in the PDF font dictionary.
    pub fn base_font(&self) -> &'static str {
        match self {
            FontFace::Helvetica => "Helvetica",
            FontFace::HelveticaBold => "Helvetica-Bold",
            FontFace::HelveticaOblique => "Helvetica-Oblique",
        }
    }

    /// Resource name the content streams refer to.
    pub fn resource_name(&self) -> &'static str {
        match self {
            FontFace::Helvetica => "F1",
            FontFace::HelveticaBold => "F2",
            FontFace::HelveticaOblique => "F3",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static character-width table for a font face.
///
/// `widths[i]` = width of ASCII character `(i + 32)` in em, covering 0x20 (space) through 0x7E (~).
pub struct FontMetricTable {
    widths: [f32; 95],
    /// Width of `•`, the list bullet.
    pub bullet_width: f32,
    /// Fallback width for other non-ASCII characters.
    pub average_char_width: f32,
    pub space_width: f32,
}

impl FontMetricTable {
    /// Width of a single character in em units.
    pub fn char_width(&self, c: char) -> f32 {
        let code = c as usize;
        if (32..=126).contains(&code) {
            self.widths[code - 32]
        } else if c == '•' {
            self.bullet_width
        } else {
            self.average_char_width
        }
    }

    /// Measures the rendered width of a string in em units.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars().map(|c| self.char_width(c)).sum()
    }

    /// Measures the rendered width of a string in points at `font_size`.
    pub fn measure_pt(&self, s: &str, font_size: f32) -> f32 {
        self.measure_str(s) * font_size
    }

    /// Greedy word wrap at `max_width_pt`.
    ///
    /// Whitespace runs collapse to single spaces. A word wider than the whole line
    /// is split between characters so nothing runs past the right margin.
    /// Empty or whitespace-only text yields no lines.
    pub fn wrap_text(&self, text: &str, font_size: f32, max_width_pt: f32) -> Vec<String> {
        let max_width = max_width_pt / font_size; // em
        let mut lines: Vec<String> = Vec::new();
        let mut current = String::new();
        let mut current_width = 0.0_f32;

        for word in text.split_whitespace() {
            let word_w = self.measure_str(word);

            if word_w > max_width {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0.0;
                }
                for piece in self.split_long_word(word, max_width) {
                    lines.push(piece);
                }
                // Keep the tail of the split word open so the next word can join it.
                if let Some(last) = lines.pop() {
                    current_width = self.measure_str(&last);
                    current = last;
                }
                continue;
            }

            let space_w = if current.is_empty() {
                0.0
            } else {
                self.space_width
            };

            if !current.is_empty() && current_width + space_w + word_w > max_width {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
                current_width = word_w;
            } else {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
                current_width += space_w + word_w;
            }
        }

        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }

    fn split_long_word(&self, word: &str, max_width: f32) -> Vec<String> {
        let mut pieces = Vec::new();
        let mut piece = String::new();
        let mut width = 0.0_f32;
        for c in word.chars() {
            let w = self.char_width(c);
            if !piece.is_empty() && width + w > max_width {
                pieces.push(std::mem::take(&mut piece));
                width = 0.0;
            }
            piece.push(c);
            width += w;
        }
        if !piece.is_empty() {
            pieces.push(piece);
        }
        pieces
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

/// Shared by the upright and oblique faces.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [f32; 95] = [
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
];

static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    widths: HELVETICA_WIDTHS,
    bullet_width: 0.350,
    average_char_width: 0.556,
    space_width: 0.278,
};

static HELVETICA_BOLD_TABLE: FontMetricTable = FontMetricTable {
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
    bullet_width: 0.350,
    average_char_width: 0.611,
    space_width: 0.278,
};

/// Oblique shares the upright face's advance widths.
static HELVETICA_OBLIQUE_TABLE: FontMetricTable = FontMetricTable {
    widths: HELVETICA_WIDTHS,
    bullet_width: 0.350,
    average_char_width: 0.556,
    space_width: 0.278,
};

/// Returns the static metric table for a given face.
pub fn get_metrics(face: FontFace) -> &'static FontMetricTable {
    match face {
        FontFace::Helvetica => &HELVETICA_TABLE,
        FontFace::HelveticaBold => &HELVETICA_BOLD_TABLE,
        FontFace::HelveticaOblique => &HELVETICA_OBLIQUE_TABLE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
