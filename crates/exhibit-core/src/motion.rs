/// Value that follows a target with a first-order low-pass filter.
///
/// `current` moves a fixed fraction of the remaining distance every frame and
/// snaps onto `target` once the residual is below `epsilon`, so it settles
/// exactly instead of drifting forever.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Eased {
    pub current: f32,
    pub target: f32,
}

impl Eased {
    pub const fn at(value: f32) -> Self {
        Self {
            current: value,
            target: value,
        }
    }

    #[inline]
    pub fn step(&mut self, factor: f32, epsilon: f32) {
        self.current += (self.target - self.current) * factor;
        if (self.target - self.current).abs() < epsilon {
            self.current = self.target;
        }
    }

    pub fn is_settled(&self) -> bool {
        self.current == self.target
    }

    pub fn jump_to(&mut self, value: f32) {
        self.current = value;
        self.target = value;
    }
}

/// Slow side-to-side sway shown until the visitor first touches the model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IdleSway {
    pub amplitude: f32,
    pub speed: f32,
    clock: f32,
}

impl IdleSway {
    pub const fn new(amplitude: f32, speed: f32) -> Self {
        Self {
            amplitude,
            speed,
            clock: 0.0,
        }
    }

    /// Advance the idle clock and return the sway angle for this frame.
    pub fn advance(&mut self, dt_sec: f32) -> f32 {
        self.clock += dt_sec.max(0.0);
        self.angle()
    }

    pub fn angle(&self) -> f32 {
        (self.clock * self.speed).sin() * self.amplitude
    }

    pub fn clock(&self) -> f32 {
        self.clock
    }
}
