use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::time::Duration;

/// Easing profile requested for a display transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Easing {
    Linear,
    SineInOut,
    CubicOut,
    QuadOut,
}

impl Easing {
    /// Eased progress for `t` in [0, 1]; `t` outside is clamped
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
            Easing::CubicOut => 1.0 - (1.0 - t).powi(3),
            Easing::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
        }
    }
}

/// Interpolates a scalar from `from` to `to` over a fixed duration.
///
/// Driven by the host frame loop through [`Tween::advance`].
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    from: f32,
    to: f32,
    duration: Duration,
    elapsed: Duration,
    ease: Easing,
}

impl Tween {
    pub fn new(from: f32, to: f32, duration: Duration, ease: Easing) -> Self {
        Tween {
            from,
            to,
            duration,
            elapsed: Duration::ZERO,
            ease,
        }
    }

    /// Tween between two angles in degrees, going the short way round
    pub fn angle(from_deg: f32, to_deg: f32, duration: Duration, ease: Easing) -> Self {
        let delta = (to_deg - from_deg + 540.0).rem_euclid(360.0) - 180.0;
        Self::new(from_deg, from_deg + delta, duration, ease)
    }

    /// A tween that is already finished at `value`
    pub fn settled(value: f32) -> Self {
        Self::new(value, value, Duration::ZERO, Easing::Linear)
    }

    pub fn advance(&mut self, dt: Duration) {
        self.elapsed = (self.elapsed + dt).min(self.duration);
    }

    pub fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        self.elapsed.as_secs_f32() / self.duration.as_secs_f32()
    }

    pub fn value(&self) -> f32 {
        self.from + (self.to - self.from) * self.ease.apply(self.progress())
    }

    pub fn target(&self) -> f32 {
        self.to
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}
