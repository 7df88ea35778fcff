//! Time formatting helpers

/// Render a second count as `MM:SS`
pub fn format_time(total_seconds: u32) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}
