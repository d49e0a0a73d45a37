use std::time::Duration;

/// Fling speed (px/s) at which a fling is considered to have come to rest on its own.
const FLING_REST_VELOCITY: f64 = 1.0;

/// Time-based drivers of the raw scroll position.
#[derive(Debug, Clone, PartialEq)]
pub enum Animator {
    Settle(Settle),
    Fling(Fling),
}

impl Animator {
    pub fn value_at(&self, now: Duration) -> f64 {
        match self {
            Self::Settle(s) => s.value_at(now),
            Self::Fling(f) => f.value_at(now),
        }
    }

    pub fn is_done(&self, now: Duration) -> bool {
        match self {
            Self::Settle(s) => s.is_done(now),
            Self::Fling(f) => f.is_done(now),
        }
    }
}

/// Ease-out interpolation from `from` to `from + delta`.
#[derive(Debug, Clone, PartialEq)]
pub struct Settle {
    from: f64,
    delta: f64,
    start_time: Duration,
    duration: Duration,
}

impl Settle {
    pub fn new(from: f64, delta: f64, start_time: Duration, duration: Duration) -> Self {
        Self {
            from,
            delta,
            start_time,
            duration,
        }
    }

    pub fn to(&self) -> f64 {
        self.from + self.delta
    }

    pub fn is_done(&self, now: Duration) -> bool {
        now >= self.start_time + self.duration
    }

    pub fn value_at(&self, now: Duration) -> f64 {
        if self.is_done(now) {
            return self.to();
        }
        let passed = now.saturating_sub(self.start_time).as_secs_f64();
        let x = (passed / self.duration.as_secs_f64()).clamp(0.0, 1.0);
        self.from + ease_out_cubic(x) * self.delta
    }
}

fn ease_out_cubic(x: f64) -> f64 {
    1.0 - (1.0 - x).powi(3)
}

/// Exponentially decelerating motion with an unbounded range.
///
/// Velocity decays as `v0 * rate^ms`, so position follows
/// `from + v0 * (rate^(1000 t) - 1) / (1000 ln rate)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Fling {
    from: f64,
    initial_velocity: f64,
    deceleration_rate: f64,
    start_time: Duration,
    duration: Duration,
}

impl Fling {
    pub fn new(
        from: f64,
        initial_velocity: f64,
        deceleration_rate: f64,
        start_time: Duration,
    ) -> Self {
        let coeff = 1000.0 * deceleration_rate.ln();
        let decays = deceleration_rate > 0.0 && deceleration_rate < 1.0;
        let duration_s = if !decays || !(initial_velocity.abs() > FLING_REST_VELOCITY) {
            0.0
        } else {
            (FLING_REST_VELOCITY / initial_velocity.abs()).ln() / coeff
        };
        Self {
            from,
            initial_velocity,
            deceleration_rate,
            start_time,
            duration: Duration::try_from_secs_f64(duration_s).unwrap_or(Duration::ZERO),
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn is_done(&self, now: Duration) -> bool {
        now >= self.start_time + self.duration
    }

    fn elapsed(&self, now: Duration) -> f64 {
        now.saturating_sub(self.start_time)
            .min(self.duration)
            .as_secs_f64()
    }

    /// Signed velocity in px/s.
    pub fn velocity_at(&self, now: Duration) -> f64 {
        self.initial_velocity * self.deceleration_rate.powf(1000.0 * self.elapsed(now))
    }

    pub fn value_at(&self, now: Duration) -> f64 {
        if self.duration.is_zero() {
            return self.from;
        }
        let coeff = 1000.0 * self.deceleration_rate.ln();
        let decay = self.deceleration_rate.powf(1000.0 * self.elapsed(now));
        self.from + (decay - 1.0) / coeff * self.initial_velocity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_settle_reaches_target_exactly() {
        let settle = Settle::new(10.0, -60.0, ms(100), ms(250));
        assert_eq!(settle.value_at(ms(100)), 10.0);
        assert_eq!(settle.value_at(ms(50)), 10.0);
        assert!(!settle.is_done(ms(349)));
        assert!(settle.is_done(ms(350)));
        assert_eq!(settle.value_at(ms(350)), -50.0);
        assert_eq!(settle.value_at(ms(10_000)), -50.0);
    }

    #[test]
    fn test_settle_eases_out() {
        let settle = Settle::new(0.0, 100.0, ms(0), ms(200));
        let halfway = settle.value_at(ms(100));
        assert!(halfway > 50.0 && halfway < 100.0);
    }

    #[test]
    fn test_fling_decelerates_monotonically() {
        let fling = Fling::new(0.0, 3000.0, 0.998, ms(0));
        let mut last_pos = 0.0;
        let mut last_v = f64::MAX;
        for t in (0..500).step_by(16) {
            let pos = fling.value_at(ms(t));
            let v = fling.velocity_at(ms(t));
            assert!(pos >= last_pos);
            assert!(v < last_v && v > 0.0);
            last_pos = pos;
            last_v = v;
        }
    }

    #[test]
    fn test_fling_in_negative_direction() {
        let fling = Fling::new(50.0, -2000.0, 0.998, ms(0));
        assert!(fling.value_at(ms(100)) < 50.0);
        assert!(fling.velocity_at(ms(100)) < 0.0);
    }

    #[test]
    fn test_fling_comes_to_rest() {
        let fling = Fling::new(0.0, 3000.0, 0.998, ms(0));
        let end = fling.duration();
        assert!(fling.is_done(end));
        assert!(fling.velocity_at(end).abs() <= FLING_REST_VELOCITY + 1e-6);
        // total travel is bounded by v0 / (1000 * -ln(rate))
        let limit = 3000.0 / (1000.0 * -(0.998f64).ln());
        assert!(fling.value_at(end) < limit);
        assert_eq!(fling.value_at(end + ms(500)), fling.value_at(end));
    }

    #[test]
    fn test_slow_fling_is_done_immediately() {
        let fling = Fling::new(5.0, 0.5, 0.998, ms(40));
        assert!(fling.is_done(ms(40)));
        assert_eq!(fling.value_at(ms(40)), 5.0);
    }

    #[test]
    fn test_non_decaying_rate_stops_at_once() {
        for rate in [1.0, 1.5, 0.0, -0.2, f64::NAN] {
            let fling = Fling::new(12.0, 4000.0, rate, ms(10));
            assert_eq!(fling.duration(), Duration::ZERO);
            assert!(fling.is_done(ms(10)));
            assert_eq!(fling.value_at(ms(500)), 12.0);
        }
    }
}
