use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ViewKind – which feature representation a view scores
// ---------------------------------------------------------------------------

/// The four feature representations of the source series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ViewKind {
    /// Raw values.
    Raw,
    /// First difference plus raw value.
    Delta,
    /// Trailing rolling mean over `w` rows.
    Window(usize),
    /// First difference plus raw value, labelled by window size `w`.
    WindowDelta(usize),
}

impl ViewKind {
    /// Leading rows that have no defined feature in this view.
    pub fn warmup(&self) -> usize {
        match self {
            ViewKind::Raw => 0,
            ViewKind::Delta | ViewKind::WindowDelta(_) => 1,
            ViewKind::Window(w) => w.saturating_sub(1),
        }
    }

    /// Number of feature columns handed to the scorer.
    pub fn feature_width(&self) -> usize {
        match self {
            ViewKind::Raw | ViewKind::Window(_) => 1,
            ViewKind::Delta | ViewKind::WindowDelta(_) => 2,
        }
    }

    /// Column-name prefix.
    pub fn prefix(&self) -> String {
        match self {
            ViewKind::Raw => "base".to_string(),
            ViewKind::Delta => "delta".to_string(),
            ViewKind::Window(w) => format!("window{w}"),
            ViewKind::WindowDelta(w) => format!("windowDelta{w}"),
        }
    }

    /// Human-readable title used for overlays.
    pub fn title(&self) -> String {
        match self {
            ViewKind::Raw => "Raw Input".to_string(),
            ViewKind::Delta => "Raw Input and Delta".to_string(),
            ViewKind::Window(w) => format!("Window of {w}"),
            ViewKind::WindowDelta(w) => format!("Window of {w} and Delta"),
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prefix())
    }
}

// ---------------------------------------------------------------------------
// ViewId – a kind plus its position among repeats of the same window size
// ---------------------------------------------------------------------------

/// Identity of one view within a run.
///
/// `occurrence` counts earlier views of the same kind, so a window list of
/// `[3, 3]` yields `window3` and `window3_2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ViewId {
    pub kind: ViewKind,
    pub occurrence: usize,
}

impl ViewId {
    pub fn new(kind: ViewKind) -> Self {
        ViewId {
            kind,
            occurrence: 0,
        }
    }

    /// Prefix shared by every column of this view.
    pub fn prefix(&self) -> String {
        match self.occurrence {
            0 => self.kind.prefix(),
            k => format!("{}_{}", self.kind.prefix(), k + 1),
        }
    }

    pub fn column_name(&self, role: ColumnRole) -> String {
        format!("{}{}", self.prefix(), role.suffix())
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prefix())
    }
}

/// What a result column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnRole {
    /// Continuous anomaly score (negative = anomalous).
    Scores,
    /// Binary label, −1 anomalous / 1 normal.
    Anomaly,
    /// Feature value shown for the row: raw value, difference or rolling mean.
    Incidents,
}

impl ColumnRole {
    pub const ALL: [ColumnRole; 3] = [ColumnRole::Scores, ColumnRole::Anomaly, ColumnRole::Incidents];

    fn suffix(&self) -> &'static str {
        match self {
            ColumnRole::Scores => "Scores",
            ColumnRole::Anomaly => "Anomaly",
            ColumnRole::Incidents => "Incidents",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warmups_follow_the_view_kind() {
        assert_eq!(ViewKind::Raw.warmup(), 0);
        assert_eq!(ViewKind::Delta.warmup(), 1);
        assert_eq!(ViewKind::Window(1).warmup(), 0);
        assert_eq!(ViewKind::Window(5).warmup(), 4);
        assert_eq!(ViewKind::WindowDelta(5).warmup(), 1);
    }

    #[test]
    fn column_names_never_collide_across_window_sizes() {
        let a = ViewId::new(ViewKind::Window(2)).column_name(ColumnRole::Scores);
        let b = ViewId::new(ViewKind::Window(3)).column_name(ColumnRole::Scores);
        let c = ViewId::new(ViewKind::WindowDelta(2)).column_name(ColumnRole::Scores);
        assert_eq!(a, "window2Scores");
        assert_eq!(b, "window3Scores");
        assert_eq!(c, "windowDelta2Scores");
    }

    #[test]
    fn repeated_windows_get_an_occurrence_suffix() {
        let second = ViewId {
            kind: ViewKind::Window(3),
            occurrence: 1,
        };
        assert_eq!(second.column_name(ColumnRole::Anomaly), "window3_2Anomaly");
        assert_eq!(
            ViewId::new(ViewKind::Raw).column_name(ColumnRole::Incidents),
            "baseIncidents"
        );
    }

    #[test]
    fn titles_match_overlay_captions() {
        assert_eq!(ViewKind::Delta.title(), "Raw Input and Delta");
        assert_eq!(ViewKind::WindowDelta(3).title(), "Window of 3 and Delta");
    }
}
