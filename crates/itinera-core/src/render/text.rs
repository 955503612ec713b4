//! Text measurement, wrapping and WinAnsi encoding for the standard
//! Helvetica fonts.

/// Approximate advance width of `c` in thousandths of an em.
///
/// Helvetica metrics grouped into a few classes. Close enough for line
/// breaking; wrapping errs on the wide side.
fn char_units(c: char, bold: bool) -> u32 {
    let base = match c {
        'i' | 'j' | 'l' | '\'' | '|' | 'í' | 'ì' | 'ï' => 230,
        ' ' | '.' | ',' | ':' | ';' | '!' | 'f' | 't' | 'I' | '(' | ')' | '/' | '[' | ']' => 280,
        'r' | '-' | '"' => 340,
        'm' | 'M' | 'W' => 840,
        'w' | '@' | '%' => 730,
        c if c.is_uppercase() => 680,
        c if c.is_ascii_digit() => 556,
        _ => 560,
    };
    if bold { base + base / 16 } else { base }
}

/// Width of `text` in points at `size`.
pub fn text_width(text: &str, size: f32, bold: bool) -> f32 {
    let units: u32 = text.chars().map(|c| char_units(c, bold)).sum();
    units as f32 * size / 1000.0
}

/// Greedy word wrap to `max_width` points.
///
/// Words wider than a full line are broken between characters. Empty input
/// yields no lines.
pub fn wrap(text: &str, size: f32, bold: bool, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_owned()
        } else {
            format!("{current} {word}")
        };

        if text_width(&candidate, size, bold) <= max_width {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }

        if text_width(word, size, bold) <= max_width {
            current = word.to_owned();
        } else {
            for c in word.chars() {
                current.push(c);
                if text_width(&current, size, bold) > max_width && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::take(&mut current));
                    current.push(c);
                }
            }
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Encode `text` for a font using `WinAnsiEncoding`. Characters outside the
/// encoding become `?`.
pub fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7e}' | '\u{a0}'..='\u{ff}' => c as u8,
            '€' => 0x80,
            '‚' => 0x82,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '\t' => b' ',
            _ => b'?',
        })
        .collect()
}
