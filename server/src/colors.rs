// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use lazy_static::lazy_static;
use parking_lot::RwLock;

// A palette of 20 distinct colors, handed out in order to lists and
// priorities created without an explicit color.
const PALETTE: [&str; 20] = [
    "#1f77b4", // Muted blue
    "#ff7f0e", // Orange
    "#2ca02c", // Green
    "#d62728", // Red
    "#9467bd", // Purple
    "#8c564b", // Brown
    "#e377c2", // Pink
    "#7f7f7f", // Grey
    "#bcbd22", // Olive
    "#17becf", // Cyan
    "#aec7e8", // Light blue
    "#ffbb78", // Light orange
    "#98df8a", // Light green
    "#ff9896", // Light red
    "#c5b0d5", // Light purple
    "#c49c94", // Light brown
    "#f7b6d2", // Light pink
    "#c7c7c7", // Light grey
    "#dbdb8d", // Light olive
    "#9edae5", // Light cyan
];

/// Round-robin cursor over the palette.
#[derive(Debug, Default)]
pub struct PaletteCursor {
    next_color_index: usize,
}

impl PaletteCursor {
    pub fn next_color(&mut self) -> &'static str {
        let color = PALETTE[self.next_color_index];
        self.next_color_index = (self.next_color_index + 1) % PALETTE.len();
        color
    }
}

lazy_static! {
    // Process-wide cursor shared by every request.
    static ref DEFAULT_COLORS: RwLock<PaletteCursor> = RwLock::new(PaletteCursor::default());
}

/// Returns `requested` when it carries a color, otherwise the next palette color.
pub fn color_or_default(requested: Option<&str>) -> String {
    match requested.map(str::trim).filter(|color| !color.is_empty()) {
        Some(color) => color.to_string(),
        None => DEFAULT_COLORS.write().next_color().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_color() {
        let mut cursor = PaletteCursor::default();
        assert_eq!(cursor.next_color(), "#1f77b4");
        assert_eq!(cursor.next_color(), "#ff7f0e");
        assert_eq!(cursor.next_color_index, 2);
    }

    #[test]
    fn test_palette_wraps_around() {
        let mut cursor = PaletteCursor::default();
        for _ in 0..PALETTE.len() {
            cursor.next_color();
        }
        assert_eq!(cursor.next_color_index, 0);
        assert_eq!(cursor.next_color(), PALETTE[0]);
    }

    #[test]
    fn test_explicit_color_wins() {
        assert_eq!(color_or_default(Some("#123456")), "#123456");
    }

    #[test]
    fn test_blank_color_takes_from_palette() {
        let color = color_or_default(Some("   "));
        assert!(PALETTE.contains(&color.as_str()));
    }
}
