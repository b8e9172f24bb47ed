//! Scoring: line-clear table plus drop rewards

/// Points for clearing 0, 1, 2, 3 or 4 lines with a single lock
pub const LINE_CLEAR_POINTS: [u64; 5] = [0, 100, 300, 500, 800];

/// Score tracking
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Score {
    /// Current score
    pub points: u64,
    /// Total lines cleared
    pub lines: u32,
    /// Name of the most recent line clear, for display
    pub last_clear: Option<&'static str>,
}

impl Score {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score resumed from a saved game
    pub fn restored(points: u64, lines: u32) -> Self {
        Self {
            points,
            lines,
            last_clear: None,
        }
    }

    /// Add score for a lock that cleared `lines` rows
    /// Returns the points awarded
    pub fn add_clear(&mut self, lines: usize) -> u64 {
        let awarded = LINE_CLEAR_POINTS.get(lines).copied().unwrap_or(0);
        self.points += awarded;
        self.lines += lines as u32;
        if lines > 0 {
            self.last_clear = clear_name(lines);
        }
        awarded
    }

    /// Add score for soft drop (1 point per cell)
    pub fn add_soft_drop(&mut self, cells: u32) {
        self.points += cells as u64;
    }

    /// Add score for hard drop (2 points per cell)
    pub fn add_hard_drop(&mut self, cells: u32) {
        self.points += cells as u64 * 2;
    }
}

/// Display name for a clear of `lines` rows
pub fn clear_name(lines: usize) -> Option<&'static str> {
    match lines {
        1 => Some("Single"),
        2 => Some("Double"),
        3 => Some("Triple"),
        4 => Some("Tetris"),
        _ => None,
    }
}
