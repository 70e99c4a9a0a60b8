use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const MEMORY_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

pub fn truncate_unicode(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width.saturating_sub(1) {
            result.push('\u{2026}');
            break;
        }
        result.push(ch);
        width += ch_width;
    }
    result
}

/// Pads `s` on the right to `width` display columns.
pub fn pad_right(s: &str, width: usize) -> String {
    let pad = width.saturating_sub(s.width());
    format!("{s}{}", " ".repeat(pad))
}

/// 1024-based, two decimals, B through PB.
pub fn format_memory(bytes: u64) -> String {
    let mut value = bytes as f64;
    for unit in MEMORY_UNITS {
        if value < 1024.0 {
            return format!("{value:.2} {unit}");
        }
        value /= 1024.0;
    }
    format!("{value:.2} PB")
}

/// Mebibytes with two decimals and no unit, for the fixed "Memory (MB)" column.
pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / (1024.0 * 1024.0))
}

pub fn format_cpu(percent: f32) -> String {
    format!("{percent:.1}")
}
