use chrono::{DateTime, Local};
use ratatui::layout::Rect;

// Format the window for labels: whole seconds or minutes when exact
pub fn format_window(window_ms: u64) -> String {
    if window_ms % 60_000 == 0 {
        format!("{}m", window_ms / 60_000)
    } else if window_ms % 1_000 == 0 {
        format!("{}s", window_ms / 1_000)
    } else {
        format!("{} ms", window_ms)
    }
}

// Rate label, e.g. "12 clicks / 5s"
pub fn format_rate(rate: u32, window_ms: u64) -> String {
    let unit = if rate == 1 { "click" } else { "clicks" };
    format!("{} {} / {}", rate, unit, format_window(window_ms))
}

// Clicks per second equivalent of a windowed count
pub fn per_second(rate: u32, window_ms: u64) -> f64 {
    if window_ms == 0 {
        0.0
    } else {
        rate as f64 * 1000.0 / window_ms as f64
    }
}

pub fn format_record_time(at: Option<DateTime<Local>>) -> String {
    match at {
        Some(at) => at.format("%H:%M:%S").to_string(),
        None => "earlier".to_string(),
    }
}

pub fn rect_contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x
        && column < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_labels() {
        assert_eq!(format_window(5_000), "5s");
        assert_eq!(format_window(60_000), "1m");
        assert_eq!(format_window(1_500), "1500 ms");
    }

    #[test]
    fn rate_labels() {
        assert_eq!(format_rate(1, 5_000), "1 click / 5s");
        assert_eq!(format_rate(12, 60_000), "12 clicks / 1m");
        assert!((per_second(10, 5_000) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn hit_testing() {
        let area = Rect::new(10, 5, 20, 3);
        assert!(rect_contains(area, 10, 5));
        assert!(rect_contains(area, 29, 7));
        assert!(!rect_contains(area, 30, 7));
        assert!(!rect_contains(area, 15, 8));
    }
}
