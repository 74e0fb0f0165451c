use super::Rect;

/// Point tier, decided by the row an enemy spawns in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyTier {
    Top,
    Middle,
    Bottom,
}

impl EnemyTier {
    /// Row 0 is the top tier, rows 1-2 the middle, everything below the bottom
    pub fn for_row(row: usize) -> Self {
        match row {
            0 => EnemyTier::Top,
            1 | 2 => EnemyTier::Middle,
            _ => EnemyTier::Bottom,
        }
    }

    pub fn points(&self) -> u32 {
        match self {
            EnemyTier::Top => 30,
            EnemyTier::Middle => 20,
            EnemyTier::Bottom => 10,
        }
    }
}

/// Stable index of an enemy within its wave's grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(pub usize);

#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: EnemyId,
    pub row: usize,
    pub col: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub tier: EnemyTier,
    pub alive: bool,
}

impl Enemy {
    pub fn new(id: EnemyId, row: usize, col: usize, x: f32, y: f32, size: (f32, f32)) -> Self {
        Self {
            id,
            row,
            col,
            x,
            y,
            width: size.0,
            height: size.1,
            tier: EnemyTier::for_row(row),
            alive: true,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn points(&self) -> u32 {
        self.tier.points()
    }

    /// Where a bomb leaves the enemy: bottom center
    pub fn muzzle(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height)
    }
}
