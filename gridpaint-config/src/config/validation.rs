//! Range checks applied after a config file is parsed.

use super::RenderConfig;

fn clamp_unit(name: &str, value: &mut f32, warnings: &mut Vec<String>) {
    let current = *value;
    if !(0.0..=1.0).contains(&current) {
        let clamped = if current.is_nan() { 1.0 } else { current.clamp(0.0, 1.0) };
        warnings.push(format!("{name} {current} out of range [0, 1], using {clamped}"));
        *value = clamped;
    }
}

impl RenderConfig {
    /// Clamp out-of-range values in place and describe each correction.
    pub fn validate(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();

        clamp_unit("editor.transparent", &mut self.editor.transparent, &mut warnings);
        clamp_unit("message.transparent", &mut self.message.transparent, &mut warnings);

        if self.editor.cache_size == 0 {
            warnings.push("editor.cache_size must be at least 1, using 1".to_string());
            self.editor.cache_size = 1;
        }
        if self.editor.tab_stop == 0 {
            warnings.push("editor.tab_stop must be at least 1, using 1".to_string());
            self.editor.tab_stop = 1;
        }
        if self.editor.line_to_scroll == 0 {
            warnings.push("editor.line_to_scroll must be at least 1, using 1".to_string());
            self.editor.line_to_scroll = 1;
        }
        if self.editor.letter_space < 0.0 {
            warnings.push(format!(
                "editor.letter_space {} is negative, using 0",
                self.editor.letter_space
            ));
            self.editor.letter_space = 0.0;
        }
        if self.editor.smooth_scroll_duration_ms == 0 {
            warnings.push("editor.smooth_scroll_duration_ms must be positive, using 220".to_string());
            self.editor.smooth_scroll_duration_ms = crate::defaults::smooth_scroll_duration_ms();
        }

        warnings
    }
}
