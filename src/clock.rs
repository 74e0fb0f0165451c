use std::time::Duration;

/// Most steps run for one frame; anything beyond is dropped so a stall
/// never turns into a burst of catch-up ticks
pub const MAX_STEPS_PER_FRAME: usize = 5;

/// Turns variable frame times into a whole number of fixed simulation steps
#[derive(Debug, Clone)]
pub struct FixedStepper {
    step: Duration,
    accumulator: Duration,
}

impl FixedStepper {
    pub fn new(step: Duration) -> Self {
        Self {
            step,
            accumulator: Duration::ZERO,
        }
    }

    /// A 60 Hz stepper
    pub fn sixty_hz() -> Self {
        Self::new(Duration::from_micros(16_667))
    }

    /// Add elapsed wall time and return how many steps to run now
    pub fn advance(&mut self, elapsed: Duration) -> usize {
        if self.step.is_zero() {
            return 0;
        }
        self.accumulator += elapsed;

        let mut steps = 0;
        while self.accumulator >= self.step && steps < MAX_STEPS_PER_FRAME {
            self.accumulator -= self.step;
            steps += 1;
        }
        if steps == MAX_STEPS_PER_FRAME && self.accumulator >= self.step {
            log::debug!("Dropping {:?} of simulation time", self.accumulator);
            self.accumulator = Duration::ZERO;
        }
        steps
    }

    /// Length of one step in seconds
    pub fn dt(&self) -> f32 {
        self.step.as_secs_f32()
    }

    /// Forget any leftover time, e.g. after a pause
    pub fn reset(&mut self) {
        self.accumulator = Duration::ZERO;
    }
}
