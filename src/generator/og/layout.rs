//! Fixed 1200x630 card layout, emitted as SVG.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ 2024.06.15                          (accent) │
//! │ Title, bold, up to three lines               │
//! │ Description, up to three lines               │
//! ├──────────────────────────────────────────────┤
//! │ Site title                  Site description │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! SVG text does not wrap, so lines are broken here using approximate
//! glyph advances. Wide (CJK) characters break anywhere, other text breaks
//! at spaces.

use crate::utils::html::escape;
use std::fmt::Write;

pub const WIDTH: u32 = 1200;
pub const HEIGHT: u32 = 630;

const PAD_X: f32 = 64.0;
const PAD_Y: f32 = 56.0;
const GAP: f32 = 20.0;
const TEXT_MAX_WIDTH: f32 = 980.0;

const FOOTER_PAD_Y: f32 = 28.0;
const FOOTER_TOP: f32 = HEIGHT as f32 - (FOOTER_PAD_Y * 2.0 + 20.0 * NORMAL_LINE_HEIGHT + 1.0);

/// CSS `line-height: normal`, roughly.
const NORMAL_LINE_HEIGHT: f32 = 1.2;
const ASCENT: f32 = 0.9;
const DESCENT: f32 = 0.22;

const BACKGROUND: &str = "#0b0c0e";
const ACCENT: &str = "#2bbc89";
const FOOTER_BACKGROUND: &str = "#0f1113";
const FOOTER_BORDER: &str = "#1c2b2d";

#[derive(Debug, Clone, Copy)]
struct TextStyle {
    size: f32,
    line_height: f32,
    max_lines: usize,
    bold: bool,
}

impl TextStyle {
    fn line_box(self) -> f32 {
        self.size * self.line_height
    }

    /// Baseline offset from the top of a line box.
    fn baseline(self) -> f32 {
        (self.line_box() - (ASCENT + DESCENT) * self.size) / 2.0 + ASCENT * self.size
    }
}

const DATE: TextStyle = TextStyle {
    size: 20.0,
    line_height: NORMAL_LINE_HEIGHT,
    max_lines: 1,
    bold: false,
};
const TITLE: TextStyle = TextStyle {
    size: 64.0,
    line_height: 1.15,
    max_lines: 3,
    bold: true,
};
const DESCRIPTION: TextStyle = TextStyle {
    size: 28.0,
    line_height: 1.4,
    max_lines: 3,
    bold: false,
};
const FOOTER_TITLE: TextStyle = TextStyle {
    size: 20.0,
    line_height: NORMAL_LINE_HEIGHT,
    max_lines: 1,
    bold: true,
};
const FOOTER_DESCRIPTION: TextStyle = TextStyle {
    size: 18.0,
    line_height: NORMAL_LINE_HEIGHT,
    max_lines: 1,
    bold: false,
};

/// Per-post card text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OgCard {
    pub title: String,
    pub description: String,
    /// Already formatted, `YYYY.MM.DD`.
    pub date: String,
}

/// Site text shown in the footer band of every card.
#[derive(Debug, Clone)]
pub struct Footer {
    pub title: String,
    pub description: String,
}

/// Resolved font family names.
#[derive(Debug, Clone)]
pub struct Families {
    pub sans: String,
    pub mono: String,
}

pub fn render_svg(card: &OgCard, footer: &Footer, families: &Families) -> String {
    let sans = family_attr(&families.sans);
    let mono = family_attr(&families.mono);

    let title = wrap(&card.title, TITLE, TEXT_MAX_WIDTH);
    let description = wrap(&card.description, DESCRIPTION, TEXT_MAX_WIDTH);

    // Vertically center the text block between the paddings
    let mut block = DATE.line_box() + GAP + TITLE.line_box() * title.len() as f32;
    if !description.is_empty() {
        block += GAP + DESCRIPTION.line_box() * description.len() as f32;
    }
    let inner = FOOTER_TOP - PAD_Y * 2.0;
    let mut y = PAD_Y + ((inner - block) / 2.0).max(0.0);

    let mut svg = String::with_capacity(4096);
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}">"#
    );
    let _ = write!(
        svg,
        r#"<defs><radialGradient id="accent" gradientUnits="userSpaceOnUse" cx="{cx}" cy="0" r="600"><stop offset="0" stop-color="{ACCENT}" stop-opacity="0.25"/><stop offset="0.7" stop-color="{BACKGROUND}" stop-opacity="0"/></radialGradient></defs>"#,
        cx = WIDTH as f32 * 0.95,
    );
    let _ = write!(
        svg,
        r#"<rect width="{WIDTH}" height="{HEIGHT}" fill="{BACKGROUND}"/><rect width="{WIDTH}" height="{HEIGHT}" fill="url(#accent)"/>"#
    );

    let _ = write!(
        svg,
        r##"<text x="{PAD_X}" y="{:.1}" font-family="{mono}" font-size="{}" letter-spacing="{:.1}" fill="#9aa0a6">{}</text>"##,
        y + DATE.baseline(),
        DATE.size,
        DATE.size * 0.12,
        escape(&card.date.to_uppercase()),
    );
    y += DATE.line_box() + GAP;

    text_block(&mut svg, &title, TITLE, y, &sans, "#ffffff");
    y += TITLE.line_box() * title.len() as f32;

    if !description.is_empty() {
        y += GAP;
        text_block(&mut svg, &description, DESCRIPTION, y, &sans, "#c9cacc");
    }

    // Footer band
    let footer_height = HEIGHT as f32 - FOOTER_TOP;
    let _ = write!(
        svg,
        r#"<rect x="0" y="{FOOTER_TOP}" width="{WIDTH}" height="{footer_height}" fill="{FOOTER_BACKGROUND}"/><rect x="0" y="{FOOTER_TOP}" width="{WIDTH}" height="1" fill="{FOOTER_BORDER}"/>"#
    );

    let text_top = FOOTER_TOP + 1.0 + FOOTER_PAD_Y;
    let site_title = wrap(&footer.title, FOOTER_TITLE, TEXT_MAX_WIDTH / 2.0);
    let used = site_title.first().map_or(0.0, |line| text_width(line, FOOTER_TITLE));
    let site_description = wrap(
        &footer.description,
        FOOTER_DESCRIPTION,
        WIDTH as f32 - PAD_X * 2.0 - used - 24.0,
    );

    if let Some(line) = site_title.first() {
        let _ = write!(
            svg,
            r##"<text x="{PAD_X}" y="{:.1}" font-family="{sans}" font-size="{}" font-weight="600" fill="#e8eaed">{}</text>"##,
            text_top + FOOTER_TITLE.baseline(),
            FOOTER_TITLE.size,
            escape(line),
        );
    }
    if let Some(line) = site_description.first() {
        // Center on the title's line box
        let top = text_top + (FOOTER_TITLE.line_box() - FOOTER_DESCRIPTION.line_box()) / 2.0;
        let _ = write!(
            svg,
            r##"<text x="{}" y="{:.1}" text-anchor="end" font-family="{sans}" font-size="{}" fill="#9aa0a6">{}</text>"##,
            WIDTH as f32 - PAD_X,
            top + FOOTER_DESCRIPTION.baseline(),
            FOOTER_DESCRIPTION.size,
            escape(line),
        );
    }

    svg.push_str("</svg>");
    svg
}

fn text_block(
    svg: &mut String,
    lines: &[String],
    style: TextStyle,
    top: f32,
    family: &str,
    fill: &str,
) {
    if lines.is_empty() {
        return;
    }
    let weight = if style.bold { "700" } else { "400" };
    let _ = write!(
        svg,
        r#"<text font-family="{family}" font-size="{}" font-weight="{weight}" fill="{fill}">"#,
        style.size
    );
    for (i, line) in lines.iter().enumerate() {
        let y = top + style.line_box() * i as f32 + style.baseline();
        let _ = write!(svg, r#"<tspan x="{PAD_X}" y="{y:.1}">{}</tspan>"#, escape(line));
    }
    svg.push_str("</text>");
}

/// Quoted family for an SVG attribute.
fn family_attr(name: &str) -> String {
    format!("'{}'", escape(&name.replace('\'', "")))
}

// ============================================================================
// Line breaking
// ============================================================================

/// Break `text` into lines no wider than `max_width`, ending the last
/// allowed line with `…` when text is cut.
fn wrap(text: &str, style: TextStyle, max_width: f32) -> Vec<String> {
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();

    for token in tokens(&text) {
        let candidate = format!("{line}{token}");
        if !line.is_empty() && text_width(candidate.trim_end(), style) > max_width {
            lines.push(line.trim_end().to_owned());
            line = token.to_owned();
        } else {
            line = candidate;
        }
        // A token wider than a whole line is broken by character
        while text_width(line.trim_end(), style) > max_width {
            let (head, tail) = split_at_width(&line, style, max_width);
            lines.push(head);
            line = tail;
        }
    }
    if !line.trim().is_empty() {
        lines.push(line.trim_end().to_owned());
    }

    if lines.len() > style.max_lines {
        lines.truncate(style.max_lines);
        if let Some(last) = lines.last_mut() {
            *last = ellipsize(last, style, max_width);
        }
    }
    lines
}

/// Words (with their trailing space) and single wide characters.
fn tokens(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    for (i, c) in text.char_indices() {
        let end = i + c.len_utf8();
        if is_wide(c) {
            if start < i {
                tokens.push(&text[start..i]);
            }
            tokens.push(&text[i..end]);
            start = end;
        } else if c == ' ' {
            tokens.push(&text[start..end]);
            start = end;
        }
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }
    tokens
}

fn split_at_width(text: &str, style: TextStyle, max_width: f32) -> (String, String) {
    let mut head = String::new();
    for (i, c) in text.char_indices() {
        head.push(c);
        if text_width(&head, style) > max_width && head.chars().count() > 1 {
            head.pop();
            return (head, text[i..].to_owned());
        }
    }
    (head, String::new())
}

fn ellipsize(line: &str, style: TextStyle, max_width: f32) -> String {
    let mut line = line.trim_end().to_owned();
    while !line.is_empty() && text_width(&format!("{line}…"), style) > max_width {
        line.pop();
    }
    format!("{}…", line.trim_end())
}

/// Approximate rendered width in pixels.
fn text_width(text: &str, style: TextStyle) -> f32 {
    let ems: f32 = text.chars().map(char_em).sum();
    let bold = if style.bold { 1.05 } else { 1.0 };
    ems * style.size * bold
}

fn char_em(c: char) -> f32 {
    match c {
        _ if is_wide(c) => 1.0,
        ' ' => 0.28,
        'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '!' | '|' => 0.3,
        'f' | 't' | 'r' | '(' | ')' | '[' | ']' | '-' => 0.4,
        'm' | 'w' => 0.85,
        'M' | 'W' => 0.92,
        'A'..='Z' => 0.66,
        '0'..='9' => 0.58,
        _ => 0.56,
    }
}

/// East Asian wide and fullwidth characters, plus emoji.
fn is_wide(c: char) -> bool {
    matches!(
        c as u32,
        0x1100..=0x115F
            | 0x2E80..=0xA4CF
            | 0xAC00..=0xD7A3
            | 0xF900..=0xFAFF
            | 0xFE30..=0xFE4F
            | 0xFF00..=0xFF60
            | 0xFFE0..=0xFFE6
            | 0x1F300..=0x1FAFF
            | 0x20000..=0x3FFFD
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn families() -> Families {
        Families {
            sans: "Noto Sans JP".into(),
            mono: "Geist Mono".into(),
        }
    }

    fn footer() -> Footer {
        Footer {
            title: "Blog".into(),
            description: "バドとか、開発とか".into(),
        }
    }

    #[test]
    fn test_short_text_is_one_line() {
        assert_eq!(wrap("Hello world", TITLE, TEXT_MAX_WIDTH), ["Hello world"]);
        assert!(wrap("   ", DESCRIPTION, TEXT_MAX_WIDTH).is_empty());
    }

    #[test]
    fn test_latin_breaks_at_spaces() {
        let text = "a very long title that certainly does not fit on a single line of the card";
        let lines = wrap(text, TITLE, TEXT_MAX_WIDTH);
        assert!(lines.len() > 1);
        assert_eq!(lines.join(" "), text);
        for line in &lines {
            assert!(text_width(line, TITLE) <= TEXT_MAX_WIDTH);
        }
    }

    #[test]
    fn test_cjk_breaks_anywhere() {
        let text = "日本語のタイトルはスペースがなくても適切な位置で折り返される必要があります";
        let lines = wrap(text, TITLE, TEXT_MAX_WIDTH);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), text);
        for line in &lines {
            assert!(text_width(line, TITLE) <= TEXT_MAX_WIDTH);
        }
    }

    #[test]
    fn test_overflow_is_ellipsized() {
        let text = "あ".repeat(200);
        let lines = wrap(&text, TITLE, TEXT_MAX_WIDTH);
        assert_eq!(lines.len(), TITLE.max_lines);
        assert!(lines[2].ends_with('…'));
        assert!(text_width(&lines[2], TITLE) <= TEXT_MAX_WIDTH);
    }

    #[test]
    fn test_long_word_is_split() {
        let text = "x".repeat(60);
        let lines = wrap(&text, TITLE, TEXT_MAX_WIDTH);
        assert_eq!(lines.concat(), text);
        assert!(lines.len() > 1);
    }

    #[test]
    fn test_svg_contents() {
        let card = OgCard {
            title: "Rust & <SVG>".into(),
            description: String::new(),
            date: "2024.06.15".into(),
        };
        let svg = render_svg(&card, &footer(), &families());

        assert!(svg.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg" width="1200" height="630""#));
        assert!(svg.contains(">2024.06.15</text>"));
        assert!(svg.contains("Rust &amp; &lt;SVG&gt;"));
        assert!(svg.contains("font-family=\"'Geist Mono'\""));
        assert!(svg.contains(r#"font-weight="700""#));
        assert!(svg.contains(">Blog</text>"));
        assert!(svg.contains(">バドとか、開発とか</text>"));
        // One title line and no description block
        assert_eq!(svg.matches("<tspan").count(), 1);
    }

    #[test]
    fn test_footer_band_is_at_bottom() {
        assert!((FOOTER_TOP - 549.0).abs() < 0.01);
    }
}
