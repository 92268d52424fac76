//! Visual constants: icons and colours used by every status line.

use crossterm::style::Color;

/// Default theme for scrub output
#[derive(Debug, Clone, Default)]
pub struct Theme {
    /// Colors for different UI elements
    pub colors: ColorScheme,
    /// Status icons
    pub icons: Icons,
}

/// Color scheme for UI elements
#[derive(Debug, Clone)]
pub struct ColorScheme {
    /// Operation descriptions
    pub description: Color,
    /// Sizes, durations and log excerpts
    pub secondary: Color,
    /// Success states
    pub success: Color,
    /// Warning and recovered states
    pub warning: Color,
    /// Error states
    pub error: Color,
    /// Skipped or not-applicable steps
    pub skipped: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            description: Color::Cyan,
            secondary: Color::DarkGrey,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            skipped: Color::DarkGrey,
        }
    }
}

/// Status icons for different states
#[derive(Debug, Clone)]
pub struct Icons {
    /// Planned / about to run (○)
    pub pending: &'static str,
    /// Success (✓)
    pub success: &'static str,
    /// Succeeded after repair (↻)
    pub recovered: &'static str,
    /// Failed (✗)
    pub error: &'static str,
    /// Skipped (–)
    pub skipped: &'static str,
    /// Warning (⚠)
    pub warning: &'static str,
    /// Info (ℹ)
    pub info: &'static str,
}

impl Default for Icons {
    fn default() -> Self {
        Self {
            pending: "○",
            success: "✓",
            recovered: "↻",
            error: "✗",
            skipped: "–",
            warning: "⚠",
            info: "ℹ",
        }
    }
}

/// Format bytes for human-readable display
pub fn format_size(bytes: u64) -> String {
    let kb = bytes as f64 / 1024.0;
    let mb = kb / 1024.0;
    if mb >= 1024.0 {
        format!("{:.1} GB", mb / 1024.0)
    } else if kb >= 1024.0 {
        format!("{mb:.1} MB")
    } else if kb >= 1.0 {
        format!("{kb:.1} KB")
    } else {
        format!("{bytes} B")
    }
}

/// Format a duration the way status lines show it.
pub fn format_elapsed(elapsed: std::time::Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs < 1.0 {
        format!("{}ms", elapsed.as_millis())
    } else if secs < 60.0 {
        format!("{secs:.1}s")
    } else {
        let whole = elapsed.as_secs();
        format!("{}m{:02}s", whole / 60, whole % 60)
    }
}
