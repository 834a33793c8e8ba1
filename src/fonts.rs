use std::num::NonZeroUsize;

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping, Weight};
use lru::LruCache;

const MEASURE_CACHE_SIZE: usize = 4096;

#[derive(Hash, PartialEq, Eq, Clone)]
struct MeasureKey {
    text: String,
    font_size_bits: u32,
    is_bold: bool,
}

pub trait TextMeasure {
    /// Returns `(width, height)` of `text` laid out on a single run.
    fn measure_text(&mut self, text: &str, font_size: f32, is_bold: bool) -> (f32, f32);
}

/// Shapes text with the system fonts.
pub struct CosmicTextMeasure {
    font_system: FontSystem,
    cache: LruCache<MeasureKey, (f32, f32)>,
}

impl CosmicTextMeasure {
    pub fn new() -> Self {
        Self {
            font_system: FontSystem::new(),
            cache: LruCache::new(
                NonZeroUsize::new(MEASURE_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN),
            ),
        }
    }
}

impl Default for CosmicTextMeasure {
    fn default() -> Self {
        Self::new()
    }
}

impl TextMeasure for CosmicTextMeasure {
    fn measure_text(&mut self, text: &str, font_size: f32, is_bold: bool) -> (f32, f32) {
        let key = MeasureKey {
            text: text.to_string(),
            font_size_bits: font_size.to_bits(),
            is_bold,
        };

        if let Some(cached) = self.cache.get(&key) {
            return *cached;
        }

        let line_height = font_size * 1.2;
        let mut buffer = Buffer::new(
            &mut self.font_system,
            Metrics {
                font_size,
                line_height,
            },
        );

        buffer.set_size(&mut self.font_system, None, None);

        let attrs = Attrs::new()
            .family(Family::SansSerif)
            .weight(if is_bold {
                Weight::BOLD
            } else {
                Weight::NORMAL
            });

        buffer.set_text(&mut self.font_system, text, &attrs, Shaping::Advanced, None);

        let mut total_width: f32 = 0.0;
        let mut total_height: f32 = 0.0;

        for run in buffer.layout_runs() {
            total_width = total_width.max(run.line_w);
            total_height += run.line_height;
        }

        let measured = (total_width, total_height.max(line_height));
        self.cache.put(key, measured);
        measured
    }
}

/// Font-independent estimate: every character is `char_width` ems wide.
///
/// Output only depends on the input, which makes it the measurer of choice
/// for tests and for hosts without fonts installed.
#[derive(Debug, Clone, Copy)]
pub struct ApproximateMeasure {
    pub char_width: f32,
}

impl Default for ApproximateMeasure {
    fn default() -> Self {
        Self { char_width: 0.6 }
    }
}

impl TextMeasure for ApproximateMeasure {
    fn measure_text(&mut self, text: &str, font_size: f32, is_bold: bool) -> (f32, f32) {
        let factor = if is_bold { 1.1 } else { 1.0 };
        let width = text.chars().count() as f32 * font_size * self.char_width * factor;
        (width, font_size * 1.2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approximate_measure_scales_with_length_and_weight() {
        let mut measure = ApproximateMeasure::default();
        let (short, h) = measure.measure_text("id", 10.0, false);
        let (long, _) = measure.measure_text("accountid", 10.0, false);
        let (bold, _) = measure.measure_text("accountid", 10.0, true);

        assert!((short - 12.0).abs() < 1e-4);
        assert!(long > short);
        assert!(bold > long);
        assert!((h - 12.0).abs() < 1e-4);
    }
}
