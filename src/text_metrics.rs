use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use ttf_parser::Face;

use crate::ir::Row;

/// Horizontal padding added on each side of a label to reach card width.
const CARD_PAD_X: f32 = 16.0;
/// Narrowest card the estimator will report.
const MIN_CARD_WIDTH: f32 = 80.0;
/// Advance used when no glyph metric is available, as a fraction of size.
const FALLBACK_ADVANCE: f32 = 0.56;

static MEASURER: Lazy<Mutex<LabelMeasurer>> = Lazy::new(|| Mutex::new(LabelMeasurer::new()));

/// Estimates a width map for the rows from their labels, for hosts without
/// a render pass to measure against. Layout itself never measures text; it
/// only consumes maps like the one produced here.
pub fn estimate_widths(rows: &[Row], font_size: f32, font_family: &str) -> BTreeMap<String, f32> {
    rows.iter()
        .map(|row| {
            let label_width = measure_text_width(&row.label, font_size, font_family)
                .unwrap_or_else(|| row.label.chars().count() as f32 * font_size * FALLBACK_ADVANCE);
            (
                row.id.clone(),
                (label_width + CARD_PAD_X * 2.0).max(MIN_CARD_WIDTH),
            )
        })
        .collect()
}

/// Measures a single-line label in pixels. Returns `None` when no matching
/// font face can be resolved on this system.
pub fn measure_text_width(text: &str, font_size: f32, font_family: &str) -> Option<f32> {
    if text.is_empty() || font_size <= 0.0 {
        return Some(0.0);
    }
    let mut guard = MEASURER.lock().ok()?;
    guard.measure(text, font_size, font_family)
}

struct LabelMeasurer {
    db: Database,
    loaded_system_fonts: bool,
    cache: HashMap<String, Option<FontMetrics>>,
}

/// Advance metrics extracted once per font face. ASCII advances are tabled;
/// everything else falls back to the face's average advance.
struct FontMetrics {
    units_per_em: f32,
    ascii_advances: [u16; 128],
    average_advance: f32,
}

impl LabelMeasurer {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            cache: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font_size: f32, font_family: &str) -> Option<f32> {
        let key = font_family.trim().to_ascii_lowercase();
        if !self.cache.contains_key(&key) {
            let metrics = self.load_metrics(font_family);
            self.cache.insert(key.clone(), metrics);
        }
        let metrics = self.cache.get(&key)?.as_ref()?;

        let scale = font_size / metrics.units_per_em;
        let mut width = 0.0f32;
        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            if ch == '\t' {
                width += metrics.average_advance * scale * 4.0;
                continue;
            }
            let advance = if (ch as u32) < 128 {
                let tabled = metrics.ascii_advances[ch as usize];
                if tabled == 0 {
                    metrics.average_advance
                } else {
                    tabled as f32
                }
            } else {
                metrics.average_advance
            };
            width += advance * scale;
        }
        Some(width.max(0.0))
    }

    fn load_metrics(&mut self, font_family: &str) -> Option<FontMetrics> {
        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        enum Token {
            Generic(Family<'static>),
            Name(String),
        }
        let mut tokens: Vec<Token> = Vec::new();
        for part in font_family.split(',') {
            let raw = part.trim().trim_matches('"').trim_matches('\'');
            if raw.is_empty() {
                continue;
            }
            match raw.to_ascii_lowercase().as_str() {
                "serif" => tokens.push(Token::Generic(Family::Serif)),
                "sans-serif" | "system-ui" => tokens.push(Token::Generic(Family::SansSerif)),
                "monospace" | "ui-monospace" => tokens.push(Token::Generic(Family::Monospace)),
                "cursive" => tokens.push(Token::Generic(Family::Cursive)),
                "fantasy" => tokens.push(Token::Generic(Family::Fantasy)),
                _ => tokens.push(Token::Name(raw.to_string())),
            }
        }
        if tokens.is_empty() {
            tokens.push(Token::Generic(Family::SansSerif));
        }
        let families: Vec<Family<'_>> = tokens
            .iter()
            .map(|token| match token {
                Token::Generic(family) => *family,
                Token::Name(name) => Family::Name(name.as_str()),
            })
            .collect();

        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;

        let mut metrics: Option<FontMetrics> = None;
        self.db.with_face_data(id, |data, index| {
            if let Ok(face) = Face::parse(data, index) {
                metrics = Some(FontMetrics::from_face(&face));
            }
        });
        metrics
    }
}

impl FontMetrics {
    fn from_face(face: &Face<'_>) -> Self {
        let units_per_em = face.units_per_em().max(1) as f32;
        let mut ascii_advances = [0u16; 128];
        let mut total = 0u32;
        let mut counted = 0u32;
        for byte in 0u8..=127 {
            let ch = byte as char;
            if let Some(glyph) = face.glyph_index(ch) {
                let advance = face.glyph_hor_advance(glyph).unwrap_or(0);
                ascii_advances[byte as usize] = advance;
                if ch.is_ascii_graphic() && advance > 0 {
                    total += advance as u32;
                    counted += 1;
                }
            }
        }
        let average_advance = if counted > 0 {
            total as f32 / counted as f32
        } else {
            units_per_em * FALLBACK_ADVANCE
        };
        Self {
            units_per_em,
            ascii_advances,
            average_advance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_label_measures_zero() {
        assert_eq!(measure_text_width("", 16.0, "sans-serif"), Some(0.0));
    }

    #[test]
    fn estimates_respect_minimum_card_width() {
        let rows = vec![Row {
            id: "a".to_string(),
            label: "x".to_string(),
            bg_color: None,
            locked: false,
            parents: Vec::new(),
        }];
        let widths = estimate_widths(&rows, 16.0, "sans-serif");
        assert!(widths["a"] >= MIN_CARD_WIDTH);
    }

    #[test]
    fn longer_labels_estimate_wider() {
        let make = |id: &str, label: &str| Row {
            id: id.to_string(),
            label: label.to_string(),
            bg_color: None,
            locked: false,
            parents: Vec::new(),
        };
        let rows = vec![
            make("short", "hi"),
            make("long", "a considerably longer card label"),
        ];
        let widths = estimate_widths(&rows, 16.0, "sans-serif");
        assert!(widths["long"] > widths["short"]);
    }
}
