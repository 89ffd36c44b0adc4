//! Dense grid layout for the switcher overlay.
//!
//! [`plan`] answers one question: given `n` candidates and the available
//! area, how many rows and columns, and how large a tile, display them
//! best?  "Best" means the largest icon, not the least wasted space: every
//! row count `1..=n` is tried and the one producing the biggest tile wins,
//! the lowest row count winning ties.
//!
//! The result is a [`GridLayout`], a plain value the renderer can draw from
//! and the hit-test can be answered from.  Nothing here is stateful.
//!
//! ```text
//! ┌──────────────── panel ────────────────┐
//! │ pad                                   │
//! │   ┌cell┐ h ┌cell┐ h ┌cell┐            │
//! │   │tile│   │tile│   │tile│            │
//! │   └────┘   └────┘   └────┘            │
//! │     v                                 │
//! │   ┌cell┐ …                           │
//! └───────────────────────────────────────┘
//! ```

use crate::command::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// Tuning constants for [`plan_with`].
///
/// All lengths are in the same units as the area passed to the planner.
/// "base" values apply at the base tile size and scale down with it;
/// "min" values are floors that keep spacing visible at small sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Fraction of the height usable by the grid.  Default: `0.8`.
    pub usable_height_ratio: f64,
    /// Largest tile (icon) size.  Default: `96`.
    pub base_tile: f64,
    /// Smallest tile size.  Default: `16`.
    pub min_tile: f64,
    /// Inset around each icon, as a fraction of the icon.  Default: `0.1`.
    pub inset_ratio: f64,
    pub base_h_spacing: f64,
    pub base_v_spacing: f64,
    pub base_pad: f64,
    pub base_corner: f64,
    /// Multiplier applied to the base spacings, both when fitting and in
    /// the output.  Default: `0.0` (spacing comes from the floors only).
    pub spacing_boost: f64,
    pub min_h_spacing: f64,
    pub min_v_spacing: f64,
    pub min_pad: f64,
    pub min_corner: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            usable_height_ratio: 0.8,
            base_tile: 96.0,
            min_tile: 16.0,
            inset_ratio: 0.1,
            base_h_spacing: 4.0,
            base_v_spacing: 8.0,
            base_pad: 30.0,
            base_corner: 8.0,
            spacing_boost: 0.0,
            min_h_spacing: 4.0,
            min_v_spacing: 8.0,
            min_pad: 12.0,
            min_corner: 4.0,
        }
    }
}

/// Geometry of the candidate grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridLayout {
    pub rows: usize,
    pub cols: usize,
    /// Icon edge length.
    pub tile_size: f64,
    /// Edge length of the cell holding one icon plus its inset.
    pub cell_size: f64,
    /// Inset between the cell edge and the icon.
    pub tile_inset: f64,
    /// Corner radius of the selection highlight and the icon clip.
    pub tile_corner: f64,
    pub h_spacing: f64,
    pub v_spacing: f64,
    pub outer_pad: f64,
    /// Corner radius of the panel.
    pub corner_radius: f64,
}

/// Plan a layout for `n` candidates with the default constants.
pub fn plan(n: usize, width: f64, height: f64) -> GridLayout {
    plan_with(&LayoutConfig::default(), n, width, height)
}

/// Plan a layout for `n` candidates in a `width × height` area.
///
/// `n == 0` is sized like `n == 1`.  `width` and `height` must be
/// positive.
pub fn plan_with(cfg: &LayoutConfig, n: usize, width: f64, height: f64) -> GridLayout {
    let usable_height = height * cfg.usable_height_ratio;
    let n = n.max(1);
    let cell_factor = 1.0 + 2.0 * cfg.inset_ratio;
    let fit_h_spacing = cfg.base_h_spacing * cfg.spacing_boost;
    let fit_v_spacing = cfg.base_v_spacing * cfg.spacing_boost;

    let mut best_rows = 1;
    let mut best_tile = cfg.min_tile;

    for rows in 1..=n {
        let cols = n.div_ceil(rows);
        let max_cell_w =
            (width - 2.0 * cfg.base_pad - (cols - 1) as f64 * fit_h_spacing) / cols as f64;
        let max_cell_h =
            (usable_height - 2.0 * cfg.base_pad - (rows - 1) as f64 * fit_v_spacing) / rows as f64;
        let fit = (max_cell_w / cell_factor).min(max_cell_h / cell_factor);
        let candidate = fit.min(cfg.base_tile).max(cfg.min_tile).floor();
        if candidate > best_tile {
            best_tile = candidate;
            best_rows = rows;
        }
    }

    let rows = best_rows;
    let cols = n.div_ceil(rows);
    let scale = best_tile / cfg.base_tile;

    GridLayout {
        rows,
        cols,
        tile_size: best_tile,
        cell_size: (best_tile * cell_factor).floor(),
        tile_inset: (best_tile * cfg.inset_ratio).round(),
        tile_corner: (best_tile * 0.1).max(cfg.min_corner),
        h_spacing: (cfg.base_h_spacing * scale * cfg.spacing_boost)
            .floor()
            .max(cfg.min_h_spacing),
        v_spacing: (cfg.base_v_spacing * scale * cfg.spacing_boost)
            .floor()
            .max(cfg.min_v_spacing),
        outer_pad: (cfg.base_pad * scale).floor().max(cfg.min_pad),
        corner_radius: (cfg.base_corner * scale).floor().max(cfg.min_corner),
    }
}

impl GridLayout {
    /// Outer size of the panel: all cells, spacing between them, and the
    /// padding around them.
    pub fn panel_size(&self) -> Size {
        let w = self.cols as f64 * self.cell_size
            + self.cols.saturating_sub(1) as f64 * self.h_spacing
            + 2.0 * self.outer_pad;
        let h = self.rows as f64 * self.cell_size
            + self.rows.saturating_sub(1) as f64 * self.v_spacing
            + 2.0 * self.outer_pad;
        Size::new(w, h)
    }

    /// The panel centred in `area`.
    pub fn panel_rect(&self, area: Rect) -> Rect {
        let size = self.panel_size();
        Rect::new(
            area.x + (area.width - size.width) / 2.0,
            area.y + (area.height - size.height) / 2.0,
            size.width,
            size.height,
        )
    }

    /// Cell of candidate `index` (row-major), or `None` past the grid.
    pub fn tile_rect(&self, area: Rect, index: usize) -> Option<Rect> {
        if index >= self.rows * self.cols {
            return None;
        }
        let panel = self.panel_rect(area);
        let row = index / self.cols;
        let col = index % self.cols;
        Some(Rect::new(
            panel.x + self.outer_pad + col as f64 * (self.cell_size + self.h_spacing),
            panel.y + self.outer_pad + row as f64 * (self.cell_size + self.v_spacing),
            self.cell_size,
            self.cell_size,
        ))
    }

    /// Index of the candidate whose cell contains `p`, if any.
    ///
    /// Points in the spacing between cells, in the padding, or on an empty
    /// trailing cell (`index >= count`) hit nothing.
    pub fn tile_at(&self, area: Rect, p: Point, count: usize) -> Option<usize> {
        let panel = self.panel_rect(area);
        let lx = p.x - panel.x - self.outer_pad;
        let ly = p.y - panel.y - self.outer_pad;
        if lx < 0.0 || ly < 0.0 {
            return None;
        }
        let pitch_x = self.cell_size + self.h_spacing;
        let pitch_y = self.cell_size + self.v_spacing;
        let col = (lx / pitch_x).floor() as usize;
        let row = (ly / pitch_y).floor() as usize;
        if col >= self.cols || row >= self.rows {
            return None;
        }
        if lx - col as f64 * pitch_x >= self.cell_size || ly - row as f64 * pitch_y >= self.cell_size {
            return None;
        }
        let index = row * self.cols + col;
        (index < count).then_some(index)
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;

    const W: f64 = 1920.0;
    const H: f64 = 1080.0;

    #[test]
    fn zero_candidates_sized_like_one() {
        assert_eq!(plan(0, W, H), plan(1, W, H));
        let g = plan(0, W, H);
        assert_eq!((g.rows, g.cols), (1, 1));
    }

    #[test]
    fn few_candidates_single_row_at_base_size() {
        for n in 1..=16 {
            let g = plan(n, W, H);
            assert_eq!(g.rows, 1, "n = {}", n);
            assert_eq!(g.cols, n);
            assert_eq!(g.tile_size, 96.0);
        }
    }

    #[test]
    fn wraps_when_a_single_row_would_shrink_tiles() {
        // One row of 20 gives 77-unit tiles; two rows of 10 keep 96.
        let g = plan(20, W, H);
        assert_eq!((g.rows, g.cols), (2, 10));
        assert_eq!(g.tile_size, 96.0);
    }

    #[test]
    fn cols_is_ceil_of_n_over_rows() {
        for (w, h) in [(W, H), (800.0, 600.0), (300.0, 900.0), (150.0, 150.0)] {
            for n in 1..=120 {
                let g = plan(n, w, h);
                assert_eq!(g.cols, n.div_ceil(g.rows), "n = {} area = {}x{}", n, w, h);
                assert!(g.rows * g.cols >= n);
            }
        }
    }

    #[test]
    fn tile_size_non_increasing_in_n() {
        for (w, h) in [(W, H), (1280.0, 800.0), (640.0, 480.0), (200.0, 2000.0)] {
            let mut prev = f64::INFINITY;
            for n in 1..=150 {
                let g = plan(n, w, h);
                assert!(g.tile_size <= prev, "n = {} grew from {} to {}", n, prev, g.tile_size);
                prev = g.tile_size;
            }
        }
    }

    #[test]
    fn tile_size_clamped() {
        let tiny = plan(200, 100.0, 100.0);
        assert_eq!(tiny.tile_size, 16.0);
        assert_eq!(tiny.rows, 1, "all row counts tie at the floor; the first wins");
        let huge = plan(1, 10_000.0, 10_000.0);
        assert_eq!(huge.tile_size, 96.0);
    }

    #[test]
    fn derived_sizes_at_base_scale() {
        let g = plan(3, W, H);
        assert_eq!(g.cell_size, 115.0);
        assert_eq!(g.tile_inset, 10.0);
        assert_eq!(g.outer_pad, 30.0);
        assert_eq!(g.corner_radius, 8.0);
        assert_eq!(g.h_spacing, 4.0);
        assert_eq!(g.v_spacing, 8.0);
    }

    #[test]
    fn derived_sizes_scale_down_with_floors() {
        // (120 - 2 * 30) / 1.2 = 50
        let g = plan(1, 120.0, 1000.0);
        assert_eq!(g.tile_size, 50.0);
        assert_eq!(g.outer_pad, 15.0);
        assert_eq!(g.corner_radius, 4.0);
        assert_eq!(g.h_spacing, 4.0);
        assert_eq!(g.v_spacing, 8.0);
        assert_eq!(g.tile_corner, 5.0);
    }

    #[test]
    fn usable_height_is_eighty_percent() {
        // 1 × n columns would fit horizontally but only 80% of the height
        // may be used: (250 * 0.8 - 60) / 1.2 = 116 → clamped to 96, while
        // (200 * 0.8 - 60) / 1.2 = 83.3 → 83.
        assert_eq!(plan(1, W, 250.0).tile_size, 96.0);
        assert_eq!(plan(1, W, 200.0).tile_size, 83.0);
    }

    #[test]
    fn spacing_boost_enlarges_spacing() {
        let cfg = LayoutConfig {
            spacing_boost: 2.0,
            ..LayoutConfig::default()
        };
        let g = plan_with(&cfg, 3, W, H);
        assert_eq!(g.h_spacing, 8.0);
        assert_eq!(g.v_spacing, 16.0);
    }

    #[test]
    fn panel_size_accounts_for_spacing_and_pad() {
        let g = plan(3, W, H);
        let size = g.panel_size();
        assert_eq!(size.width, 3.0 * 115.0 + 2.0 * 4.0 + 60.0);
        assert_eq!(size.height, 115.0 + 60.0);
    }

    #[test]
    fn panel_is_centred() {
        let area = Rect::new(0.0, 0.0, W, H);
        let g = plan(3, W, H);
        let panel = g.panel_rect(area);
        assert!((panel.x + panel.width / 2.0 - W / 2.0).abs() < 1e-9);
        assert!((panel.y + panel.height / 2.0 - H / 2.0).abs() < 1e-9);
    }

    #[test]
    fn tile_at_finds_tile_centres() {
        let area = Rect::new(0.0, 0.0, W, H);
        let n = 20;
        let g = plan(n, W, H);
        for i in 0..n {
            let r = g.tile_rect(area, i).unwrap();
            let centre = Point::new(r.x + r.width / 2.0, r.y + r.height / 2.0);
            assert_eq!(g.tile_at(area, centre, n), Some(i));
        }
    }

    #[test]
    fn tile_at_misses_padding_spacing_and_empty_cells() {
        let area = Rect::new(0.0, 0.0, W, H);
        let g = plan(3, W, H);
        let panel = g.panel_rect(area);
        assert_eq!(g.tile_at(area, Point::new(panel.x + 1.0, panel.y + 1.0), 3), None);
        let first = g.tile_rect(area, 0).unwrap();
        let gap = Point::new(first.x + first.width + g.h_spacing / 2.0, first.y + 5.0);
        assert_eq!(g.tile_at(area, gap, 3), None);
        let centre = Point::new(first.x + 5.0, first.y + 5.0);
        assert_eq!(g.tile_at(area, centre, 0), None);
    }

    #[test]
    fn tile_rect_past_grid_is_none() {
        let area = Rect::new(0.0, 0.0, W, H);
        let g = plan(3, W, H);
        assert!(g.tile_rect(area, 3).is_none());
    }
}
