//! Text preparation for PDF output — ASCII substitution for characters the
//! builtin fonts render badly, trademark-mark segmentation, and a static
//! Helvetica width table used for word wrapping.
//!
//! Widths are in em units (relative to font size), taken from the standard
//! Helvetica AFM metrics. Index = (char as usize) - 32, covering 0x20..=0x7E.

pub const PT_TO_MM: f32 = 0.352_778;

/// Replaces characters that the builtin WinAnsi fonts mangle with ASCII
/// equivalents. `™` and `®` survive as-is; the renderer draws them as raised
/// superscript runs instead of inline glyphs.
pub fn clean_text(text: &str) -> String {
    let decoded = text
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");

    let mut out = String::with_capacity(decoded.len());
    for c in decoded.chars() {
        match c {
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\u{201C}' | '\u{201D}' => out.push('"'),
            '\u{2013}' | '\u{2014}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\u{00A9}' => out.push_str("(c)"),
            '\u{00B0}' => out.push_str("deg"),
            '\u{20AC}' => out.push_str("EUR"),
            '\u{00A3}' => out.push_str("GBP"),
            '\u{00A5}' => out.push_str("JPY"),
            '\u{00BD}' => out.push_str("1/2"),
            '\u{00BC}' => out.push_str("1/4"),
            '\u{00BE}' => out.push_str("3/4"),
            '™' | '®' => out.push(c),
            c if c.is_ascii() => out.push(c),
            _ => out.push(' '),
        }
    }
    out
}

/// A run of a cleaned line: plain text, or a mark drawn as superscript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Seg {
    Text(String),
    Trademark,
    Registered,
}

/// Splits a cleaned line into text runs and superscript marks.
pub fn split_marks(text: &str) -> Vec<Seg> {
    let mut segs = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        match c {
            '™' | '®' => {
                if !current.is_empty() {
                    segs.push(Seg::Text(std::mem::take(&mut current)));
                }
                segs.push(if c == '™' {
                    Seg::Trademark
                } else {
                    Seg::Registered
                });
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        segs.push(Seg::Text(current));
    }
    segs
}

// ────────────────────────────────────────────────────────────────────────────
// Helvetica metrics
// ────────────────────────────────────────────────────────────────────────────

/// Standard Helvetica AFM widths, /1000 em.
#[rustfmt::skip]
static HELVETICA_WIDTHS: [f32; 95] = [
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

const AVERAGE_CHAR_WIDTH: f32 = 0.513;
/// Helvetica-Bold runs wider than regular by roughly this factor.
const BOLD_FACTOR: f32 = 1.08;

/// Measures a string in em units. Non-ASCII falls back to the average width;
/// the superscript marks measure as their replacement text at reduced size.
pub fn measure_em(s: &str, bold: bool) -> f32 {
    let base: f32 = s
        .chars()
        .map(|c| match c {
            '™' => 0.6 * (0.611 + 0.833), // "TM" at superscript scale
            '®' => 0.6 * 0.737,
            c => {
                let code = c as usize;
                if (32..=126).contains(&code) {
                    HELVETICA_WIDTHS[code - 32]
                } else {
                    AVERAGE_CHAR_WIDTH
                }
            }
        })
        .sum();
    if bold {
        base * BOLD_FACTOR
    } else {
        base
    }
}

/// Measured width of a string in millimetres at the given point size.
pub fn text_width_mm(s: &str, size_pt: f32, bold: bool) -> f32 {
    measure_em(s, bold) * size_pt * PT_TO_MM
}

/// Greedy word wrap against a width in millimetres. A single word wider than
/// the line gets its own line rather than being broken mid-word.
pub fn wrap_to_width(text: &str, size_pt: f32, bold: bool, max_width_mm: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if text_width_mm(&candidate, size_pt, bold) > max_width_mm && !current.is_empty() {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_substitutes_smart_punctuation() {
        assert_eq!(
            clean_text("\u{201C}don\u{2019}t\u{201D} \u{2014} wait\u{2026}"),
            "\"don't\" - wait..."
        );
    }

    #[test]
    fn test_clean_text_decodes_entities() {
        assert_eq!(clean_text("A &amp; B &lt;ok&gt;"), "A & B <ok>");
    }

    #[test]
    fn test_clean_text_keeps_marks_and_drops_unknowns() {
        assert_eq!(clean_text("Method™ © 2024 汉"), "Method™ (c) 2024  ");
    }

    #[test]
    fn test_split_marks_segments_runs() {
        let segs = split_marks("Neuro Change Method™ works");
        assert_eq!(
            segs,
            vec![
                Seg::Text("Neuro Change Method".to_string()),
                Seg::Trademark,
                Seg::Text(" works".to_string()),
            ]
        );
    }

    #[test]
    fn test_split_marks_plain_text_is_one_seg() {
        assert_eq!(
            split_marks("no marks"),
            vec![Seg::Text("no marks".to_string())]
        );
    }

    #[test]
    fn test_measure_em_matches_afm_table() {
        // "Rust" = R(0.722) + u(0.556) + s(0.500) + t(0.278) = 2.056
        let width = measure_em("Rust", false);
        assert!((width - 2.056).abs() < 1e-3, "got {width}");
    }

    #[test]
    fn test_bold_measures_wider() {
        assert!(measure_em("Milestone", true) > measure_em("Milestone", false));
    }

    #[test]
    fn test_wrap_respects_width() {
        let lines = wrap_to_width(
            "a realistic paragraph of report prose that certainly cannot fit one narrow line",
            12.0,
            false,
            60.0,
        );
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width_mm(line, 12.0, false) <= 60.0, "line too wide: {line}");
        }
    }

    #[test]
    fn test_wrap_empty_text_yields_one_empty_line() {
        assert_eq!(wrap_to_width("", 12.0, false, 100.0), vec![String::new()]);
    }

    #[test]
    fn test_wrap_oversized_word_gets_own_line() {
        let lines = wrap_to_width("short Pneumonoultramicroscopicsilicovolcanoconiosis end", 12.0, false, 30.0);
        assert!(lines.iter().any(|l| l.starts_with("Pneumono")));
    }
}
