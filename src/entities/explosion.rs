/// A short-lived burst drawn where something was destroyed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Explosion {
    /// Center in playfield pixels
    pub x: f32,
    pub y: f32,
    /// Seconds left on screen
    pub lifetime: f32,
    duration: f32,
}

impl Explosion {
    pub fn new(x: f32, y: f32, duration: f32) -> Self {
        Self {
            x,
            y,
            lifetime: duration,
            duration,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.lifetime = (self.lifetime - dt).max(0.0);
    }

    pub fn is_dead(&self) -> bool {
        self.lifetime <= 0.0
    }

    /// 0.0 when fresh, approaching 1.0 as it fades
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            1.0 - self.lifetime / self.duration
        }
    }
}
