use super::Rect;
use crate::config::GameConfig;

/// A destructible shield made of square blocks. Anything that hits it
/// knocks out the blocks around the impact.
#[derive(Debug, Clone, PartialEq)]
pub struct Bunker {
    pub x: f32,
    pub y: f32,
    block: f32,
    rows: usize,
    cols: usize,
    /// Row-major, true while the block is intact
    blocks: Vec<bool>,
}

impl Bunker {
    /// An intact bunker: a slab with clipped top corners and an arch cut
    /// into the bottom center
    pub fn new(x: f32, y: f32, block: f32, rows: usize, cols: usize) -> Self {
        let mut blocks = vec![true; rows * cols];
        let mid = cols / 2;
        let arch_rows = rows.min(3);
        for row in rows - arch_rows..rows {
            let half_width = row + arch_rows - rows;
            for col in mid.saturating_sub(half_width)..=(mid + half_width).min(cols - 1) {
                blocks[row * cols + col] = false;
            }
        }
        if rows > 0 && cols > 1 {
            blocks[0] = false;
            blocks[cols - 1] = false;
        }
        Self {
            x,
            y,
            block,
            rows,
            cols,
            blocks,
        }
    }

    /// Whole outline, intact or not
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.x,
            self.y,
            self.cols as f32 * self.block,
            self.rows as f32 * self.block,
        )
    }

    fn block_rect(&self, row: usize, col: usize) -> Rect {
        Rect::new(
            self.x + col as f32 * self.block,
            self.y + row as f32 * self.block,
            self.block,
            self.block,
        )
    }

    /// Intact blocks overlapping `rect`, as (row, col)
    fn touching(&self, rect: &Rect) -> Vec<(usize, usize)> {
        if !self.bounds().overlaps(rect) {
            return Vec::new();
        }
        (0..self.rows)
            .flat_map(|row| (0..self.cols).map(move |col| (row, col)))
            .filter(|&(row, col)| {
                self.blocks[row * self.cols + col] && self.block_rect(row, col).overlaps(rect)
            })
            .collect()
    }

    /// Projectile impact. Erodes the 3x3 patch around the first intact block
    /// the projectile touches, taken from the side it travels in from.
    /// Returns false, leaving the bunker untouched, on a miss.
    pub fn hit(&mut self, rect: &Rect, moving_up: bool) -> bool {
        let touching = self.touching(rect);
        let impact = if moving_up {
            touching.last()
        } else {
            touching.first()
        };
        let Some(&(row, col)) = impact else {
            return false;
        };

        for r in row.saturating_sub(1)..=(row + 1).min(self.rows - 1) {
            for c in col.saturating_sub(1)..=(col + 1).min(self.cols - 1) {
                self.blocks[r * self.cols + c] = false;
            }
        }
        true
    }

    /// Knock out every block under `rect`, as invaders marching through do.
    /// Returns the number of blocks removed.
    pub fn erase(&mut self, rect: &Rect) -> usize {
        let touching = self.touching(rect);
        for &(row, col) in &touching {
            self.blocks[row * self.cols + col] = false;
        }
        touching.len()
    }

    /// Rects of the blocks still standing
    pub fn intact(&self) -> impl Iterator<Item = Rect> + '_ {
        (0..self.rows)
            .flat_map(move |row| (0..self.cols).map(move |col| (row, col)))
            .filter(|&(row, col)| self.blocks[row * self.cols + col])
            .map(|(row, col)| self.block_rect(row, col))
    }

    pub fn intact_count(&self) -> usize {
        self.blocks.iter().filter(|b| **b).count()
    }

    pub fn is_destroyed(&self) -> bool {
        self.intact_count() == 0
    }
}

/// A fresh row of bunkers spread evenly across the playfield
pub fn spawn_bunkers(config: &GameConfig) -> Vec<Bunker> {
    let count = config.bunker_count;
    if count == 0 {
        return Vec::new();
    }
    let width = config.bunker_cols as f32 * config.bunker_block;
    let gap = ((config.screen_width - count as f32 * width) / (count + 1) as f32).max(0.0);
    (0..count)
        .map(|i| {
            Bunker::new(
                gap + i as f32 * (width + gap),
                config.bunker_y(),
                config.bunker_block,
                config.bunker_rows,
                config.bunker_cols,
            )
        })
        .collect()
}
