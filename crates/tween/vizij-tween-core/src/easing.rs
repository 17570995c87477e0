//! Easing functions in the Penner form `(t, b, c, d)`.
//!
//! `t` is the elapsed time, `b` the start value, `c` the change in value and
//! `d` the total time. Animations call them as `f(progress, 0, 1, 1)`.

use std::f64::consts::PI;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Plain Penner easing function.
pub type EasingFn = fn(f64, f64, f64, f64) -> f64;

/// Shaping function applied to progress before it reaches listeners.
#[derive(Clone)]
pub struct Easing(Rc<dyn Fn(f64, f64, f64, f64) -> f64>);

impl Easing {
    pub fn new(f: impl Fn(f64, f64, f64, f64) -> f64 + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Ease a normalized progress value.
    #[inline]
    pub fn apply(&self, progress: f64) -> f64 {
        (self.0)(progress, 0.0, 1.0, 1.0)
    }

    /// Call with the full Penner arguments.
    #[inline]
    pub fn call(&self, t: f64, b: f64, c: f64, d: f64) -> f64 {
        (self.0)(t, b, c, d)
    }
}

impl fmt::Debug for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Easing(..)")
    }
}

impl From<EasingFn> for Easing {
    fn from(f: EasingFn) -> Self {
        Self::new(f)
    }
}

impl From<EasingKind> for Easing {
    fn from(kind: EasingKind) -> Self {
        Self::new(kind.function())
    }
}

/// Named easing, usable from serialized settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingKind {
    Linear,
    QuadraticIn,
    QuadraticOut,
    QuadraticInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    QuarticIn,
    QuarticOut,
    QuarticInOut,
    QuinticIn,
    QuinticOut,
    QuinticInOut,
    SinusoidalIn,
    SinusoidalOut,
    SinusoidalInOut,
    ExponentialIn,
    ExponentialOut,
    ExponentialInOut,
    CircularIn,
    CircularOut,
    CircularInOut,
    ElasticIn,
    ElasticOut,
    ElasticInOut,
    BackIn,
    BackOut,
    BackInOut,
    BounceIn,
    BounceOut,
    BounceInOut,
}

impl EasingKind {
    pub fn function(self) -> EasingFn {
        match self {
            Self::Linear => linear,
            Self::QuadraticIn => quadratic_in,
            Self::QuadraticOut => quadratic_out,
            Self::QuadraticInOut => quadratic_in_out,
            Self::CubicIn => cubic_in,
            Self::CubicOut => cubic_out,
            Self::CubicInOut => cubic_in_out,
            Self::QuarticIn => quartic_in,
            Self::QuarticOut => quartic_out,
            Self::QuarticInOut => quartic_in_out,
            Self::QuinticIn => quintic_in,
            Self::QuinticOut => quintic_out,
            Self::QuinticInOut => quintic_in_out,
            Self::SinusoidalIn => sinusoidal_in,
            Self::SinusoidalOut => sinusoidal_out,
            Self::SinusoidalInOut => sinusoidal_in_out,
            Self::ExponentialIn => exponential_in,
            Self::ExponentialOut => exponential_out,
            Self::ExponentialInOut => exponential_in_out,
            Self::CircularIn => circular_in,
            Self::CircularOut => circular_out,
            Self::CircularInOut => circular_in_out,
            Self::ElasticIn => elastic_in,
            Self::ElasticOut => elastic_out,
            Self::ElasticInOut => elastic_in_out,
            Self::BackIn => back_in,
            Self::BackOut => back_out,
            Self::BackInOut => back_in_out,
            Self::BounceIn => bounce_in,
            Self::BounceOut => bounce_out,
            Self::BounceInOut => bounce_in_out,
        }
    }
}

const BACK_OVERSHOOT: f64 = 1.70158;
const BACK_OVERSHOOT_IN_OUT: f64 = BACK_OVERSHOOT * 1.525;

pub fn linear(t: f64, b: f64, c: f64, d: f64) -> f64 {
    c * t / d + b
}

pub fn quadratic_in(t: f64, b: f64, c: f64, d: f64) -> f64 {
    let t = t / d;
    c * t * t + b
}

pub fn quadratic_out(t: f64, b: f64, c: f64, d: f64) -> f64 {
    let t = t / d;
    -c * t * (t - 2.0) + b
}

pub fn quadratic_in_out(t: f64, b: f64, c: f64, d: f64) -> f64 {
    let t = t / (d / 2.0);
    if t < 1.0 {
        return c / 2.0 * t * t + b;
    }
    let t = t - 1.0;
    -c / 2.0 * (t * (t - 2.0) - 1.0) + b
}

pub fn cubic_in(t: f64, b: f64, c: f64, d: f64) -> f64 {
    let t = t / d;
    c * t * t * t + b
}

pub fn cubic_out(t: f64, b: f64, c: f64, d: f64) -> f64 {
    let t = t / d - 1.0;
    c * (t * t * t + 1.0) + b
}

pub fn cubic_in_out(t: f64, b: f64, c: f64, d: f64) -> f64 {
    let t = t / (d / 2.0);
    if t < 1.0 {
        return c / 2.0 * t * t * t + b;
    }
    let t = t - 2.0;
    c / 2.0 * (t * t * t + 2.0) + b
}

pub fn quartic_in(t: f64, b: f64, c: f64, d: f64) -> f64 {
    let t = t / d;
    c * t.powi(4) + b
}

pub fn quartic_out(t: f64, b: f64, c: f64, d: f64) -> f64 {
    let t = t / d - 1.0;
    -c * (t.powi(4) - 1.0) + b
}

pub fn quartic_in_out(t: f64, b: f64, c: f64, d: f64) -> f64 {
    let t = t / (d / 2.0);
    if t < 1.0 {
        return c / 2.0 * t.powi(4) + b;
    }
    let t = t - 2.0;
    -c / 2.0 * (t.powi(4) - 2.0) + b
}

pub fn quintic_in(t: f64, b: f64, c: f64, d: f64) -> f64 {
    let t = t / d;
    c * t.powi(5) + b
}

pub fn quintic_out(t: f64, b: f64, c: f64, d: f64) -> f64 {
    let t = t / d - 1.0;
    c * (t.powi(5) + 1.0) + b
}

pub fn quintic_in_out(t: f64, b: f64, c: f64, d: f64) -> f64 {
    let t = t / (d / 2.0);
    if t < 1.0 {
        return c / 2.0 * t.powi(5) + b;
    }
    let t = t - 2.0;
    c / 2.0 * (t.powi(5) + 2.0) + b
}

pub fn sinusoidal_in(t: f64, b: f64, c: f64, d: f64) -> f64 {
    -c * (t / d * (PI / 2.0)).cos() + c + b
}

pub fn sinusoidal_out(t: f64, b: f64, c: f64, d: f64) -> f64 {
    c * (t / d * (PI / 2.0)).sin() + b
}

pub fn sinusoidal_in_out(t: f64, b: f64, c: f64, d: f64) -> f64 {
    -c / 2.0 * ((PI * t / d).cos() - 1.0) + b
}

pub fn exponential_in(t: f64, b: f64, c: f64, d: f64) -> f64 {
    if t == 0.0 {
        b
    } else {
        c * 2f64.powf(10.0 * (t / d - 1.0)) + b
    }
}

pub fn exponential_out(t: f64, b: f64, c: f64, d: f64) -> f64 {
    if t == d {
        b + c
    } else {
        c * (1.0 - 2f64.powf(-10.0 * t / d)) + b
    }
}

pub fn exponential_in_out(t: f64, b: f64, c: f64, d: f64) -> f64 {
    if t == 0.0 {
        return b;
    }
    if t == d {
        return b + c;
    }
    let t = t / (d / 2.0);
    if t < 1.0 {
        return c / 2.0 * 2f64.powf(10.0 * (t - 1.0)) + b;
    }
    c / 2.0 * (2.0 - 2f64.powf(-10.0 * (t - 1.0))) + b
}

pub fn circular_in(t: f64, b: f64, c: f64, d: f64) -> f64 {
    let t = t / d;
    -c * ((1.0 - t * t).sqrt() - 1.0) + b
}

pub fn circular_out(t: f64, b: f64, c: f64, d: f64) -> f64 {
    let t = t / d - 1.0;
    c * (1.0 - t * t).sqrt() + b
}

pub fn circular_in_out(t: f64, b: f64, c: f64, d: f64) -> f64 {
    let t = t / (d / 2.0);
    if t < 1.0 {
        return -c / 2.0 * ((1.0 - t * t).sqrt() - 1.0) + b;
    }
    let t = t - 2.0;
    c / 2.0 * ((1.0 - t * t).sqrt() + 1.0) + b
}

/// Amplitude and phase shift for the elastic family with the classic
/// defaults (amplitude = change, period = 0.3 of the duration).
fn elastic_shape(c: f64, p: f64) -> (f64, f64) {
    let a = c;
    let s = if a.abs() < c.abs() || a == 0.0 {
        p / 4.0
    } else {
        p / (2.0 * PI) * (c / a).asin()
    };
    (a, s)
}

pub fn elastic_in(t: f64, b: f64, c: f64, d: f64) -> f64 {
    if t == 0.0 {
        return b;
    }
    let t = t / d;
    if t == 1.0 {
        return b + c;
    }
    let p = d * 0.3;
    let (a, s) = elastic_shape(c, p);
    let t = t - 1.0;
    -(a * 2f64.powf(10.0 * t) * ((t * d - s) * (2.0 * PI) / p).sin()) + b
}

pub fn elastic_out(t: f64, b: f64, c: f64, d: f64) -> f64 {
    if t == 0.0 {
        return b;
    }
    let t = t / d;
    if t == 1.0 {
        return b + c;
    }
    let p = d * 0.3;
    let (a, s) = elastic_shape(c, p);
    a * 2f64.powf(-10.0 * t) * ((t * d - s) * (2.0 * PI) / p).sin() + c + b
}

pub fn elastic_in_out(t: f64, b: f64, c: f64, d: f64) -> f64 {
    if t == 0.0 {
        return b;
    }
    let t = t / (d / 2.0);
    if t == 2.0 {
        return b + c;
    }
    let p = d * (0.3 * 1.5);
    let (a, s) = elastic_shape(c, p);
    let t = t - 1.0;
    if t < 0.0 {
        return -0.5 * (a * 2f64.powf(10.0 * t) * ((t * d - s) * (2.0 * PI) / p).sin()) + b;
    }
    a * 2f64.powf(-10.0 * t) * ((t * d - s) * (2.0 * PI) / p).sin() * 0.5 + c + b
}

pub fn back_in(t: f64, b: f64, c: f64, d: f64) -> f64 {
    let s = BACK_OVERSHOOT;
    let t = t / d;
    c * t * t * ((s + 1.0) * t - s) + b
}

pub fn back_out(t: f64, b: f64, c: f64, d: f64) -> f64 {
    let s = BACK_OVERSHOOT;
    let t = t / d - 1.0;
    c * (t * t * ((s + 1.0) * t + s) + 1.0) + b
}

pub fn back_in_out(t: f64, b: f64, c: f64, d: f64) -> f64 {
    let s = BACK_OVERSHOOT_IN_OUT;
    let t = t / (d / 2.0);
    if t < 1.0 {
        return c / 2.0 * (t * t * ((s + 1.0) * t - s)) + b;
    }
    let t = t - 2.0;
    c / 2.0 * (t * t * ((s + 1.0) * t + s) + 2.0) + b
}

pub fn bounce_in(t: f64, b: f64, c: f64, d: f64) -> f64 {
    c - bounce_out(d - t, 0.0, c, d) + b
}

pub fn bounce_out(t: f64, b: f64, c: f64, d: f64) -> f64 {
    let t = t / d;
    if t < 1.0 / 2.75 {
        c * (7.5625 * t * t) + b
    } else if t < 2.0 / 2.75 {
        let t = t - 1.5 / 2.75;
        c * (7.5625 * t * t + 0.75) + b
    } else if t < 2.5 / 2.75 {
        let t = t - 2.25 / 2.75;
        c * (7.5625 * t * t + 0.9375) + b
    } else {
        let t = t - 2.625 / 2.75;
        c * (7.5625 * t * t + 0.984375) + b
    }
}

pub fn bounce_in_out(t: f64, b: f64, c: f64, d: f64) -> f64 {
    if t < d / 2.0 {
        bounce_in(t * 2.0, 0.0, c, d) * 0.5 + b
    } else {
        bounce_out(t * 2.0 - d, 0.0, c, d) * 0.5 + c * 0.5 + b
    }
}
