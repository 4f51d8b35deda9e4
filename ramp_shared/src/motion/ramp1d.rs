// ramp_shared::motion::ramp1d.rs
// Time-optimal acceleration and velocity bounded ramp for one axis

use crate::motion::kinematics::{self, Boundary, Profile};
use crate::trajectory::{RampError, Tolerance, Trajectory};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RampStatus {
    #[default]
    Unsolved,
    Solved,
}

/// Outcome of a fixed-duration solve that may need a longer duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FixedTimeSolve {
    Solved,
    /// The requested duration was too short; no ramp completes the move in
    /// less than this.
    NeedsTime(f64),
}

/// Accelerate / cruise / decelerate trajectory for a single axis.
///
/// Phase 1 covers `[0, tswitch1]` at acceleration `a1`, phase 2 covers
/// `[tswitch1, tswitch2]` at constant velocity `v`, and phase 3 covers
/// `[tswitch2, ttotal]` at acceleration `a2`. Phase 3 is evaluated
/// backwards from the end state so both boundaries are hit exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct Ramp1d {
    x0: f64,
    dx0: f64,
    x1: f64,
    dx1: f64,

    tswitch1: f64,
    tswitch2: f64,
    ttotal: f64,
    a1: f64,
    v: f64,
    a2: f64,

    status: RampStatus,
    tol: Tolerance,
}

impl Default for Ramp1d {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}

impl Ramp1d {
    pub fn new(x0: f64, dx0: f64, x1: f64, dx1: f64) -> Self {
        Self {
            x0,
            dx0,
            x1,
            dx1,
            tswitch1: 0.0,
            tswitch2: 0.0,
            ttotal: 0.0,
            a1: 0.0,
            v: 0.0,
            a2: 0.0,
            status: RampStatus::Unsolved,
            tol: Tolerance::default(),
        }
    }

    pub fn with_tolerance(mut self, tol: Tolerance) -> Self {
        self.tol = tol;
        self
    }

    /// Replaces the boundary states; any previous solve is discarded.
    pub fn set_boundary(&mut self, x0: f64, dx0: f64, x1: f64, dx1: f64) {
        *self = Self::new(x0, dx0, x1, dx1).with_tolerance(self.tol);
    }

    pub fn x0(&self) -> f64 { self.x0 }
    pub fn dx0(&self) -> f64 { self.dx0 }
    pub fn x1(&self) -> f64 { self.x1 }
    pub fn dx1(&self) -> f64 { self.dx1 }
    pub fn tswitch1(&self) -> f64 { self.tswitch1 }
    pub fn tswitch2(&self) -> f64 { self.tswitch2 }
    pub fn a1(&self) -> f64 { self.a1 }
    pub fn v(&self) -> f64 { self.v }
    pub fn a2(&self) -> f64 { self.a2 }
    pub fn status(&self) -> RampStatus { self.status }
    pub fn tolerance(&self) -> Tolerance { self.tol }

    /// Time at which `x1` is reached.
    pub fn end_time(&self) -> f64 {
        self.ttotal
    }

    pub fn is_solved(&self) -> bool {
        self.status == RampStatus::Solved
    }

    /// Largest acceleration magnitude over phases of nonzero duration.
    ///
    /// Solves clamp vanishing phases to exactly zero length, so the exact
    /// comparisons below only skip phases that are absent.
    pub fn max_abs_accel(&self) -> f64 {
        let mut a: f64 = 0.0;
        if self.tswitch1 > 0.0 {
            a = a.max(self.a1.abs());
        }
        if self.ttotal > self.tswitch2 {
            a = a.max(self.a2.abs());
        }
        a
    }

    /// Largest speed reached anywhere on the ramp.
    pub fn peak_velocity(&self) -> f64 {
        self.dx0.abs().max(self.dx1.abs()).max(self.v.abs())
    }

    fn boundary(&self) -> Boundary {
        Boundary {
            x0: self.x0,
            dx0: self.dx0,
            x1: self.x1,
            dx1: self.dx1,
        }
    }

    fn apply(&mut self, p: Profile) {
        self.tswitch1 = p.tswitch1;
        self.tswitch2 = p.tswitch2;
        self.ttotal = p.ttotal;
        self.a1 = p.a1;
        self.v = p.v;
        self.a2 = p.a2;
        self.status = RampStatus::Solved;
    }

    fn check_boundary(&self) -> Result<(), RampError> {
        if [self.x0, self.dx0, self.x1, self.dx1].iter().all(|v| v.is_finite()) {
            Ok(())
        } else {
            Err(RampError::NonFiniteBoundary {
                x0: self.x0,
                dx0: self.dx0,
                x1: self.x1,
                dx1: self.dx1,
            })
        }
    }

    fn check_accel_bound(amax: f64) -> Result<(), RampError> {
        if amax.is_finite() && amax > 0.0 {
            Ok(())
        } else {
            Err(RampError::InvalidAccelBound(amax))
        }
    }

    fn check_velocity_bound(&self, vmax: f64) -> Result<(), RampError> {
        if !(vmax.is_finite() && vmax > 0.0) {
            return Err(RampError::InvalidVelocityBound(vmax));
        }
        for velocity in [self.dx0, self.dx1] {
            if velocity.abs() > vmax + self.tol.scaled(vmax) {
                return Err(RampError::VelocityExceedsBound { velocity, vmax });
            }
        }
        Ok(())
    }

    fn check_duration(t: f64) -> Result<(), RampError> {
        if t.is_finite() && t > 0.0 {
            Ok(())
        } else {
            Err(RampError::InvalidDuration(t))
        }
    }

    /// Holds position `x` for duration `t`.
    pub fn set_constant(&mut self, x: f64, t: f64) {
        let t = if t.is_finite() { t.max(0.0) } else { 0.0 };
        self.x0 = x;
        self.x1 = x;
        self.dx0 = 0.0;
        self.dx1 = 0.0;
        self.apply(Profile {
            tswitch1: 0.0,
            tswitch2: 0.0,
            ttotal: t,
            a1: 0.0,
            v: 0.0,
            a2: 0.0,
        });
    }

    /// Moves from `x0` to `x1` at constant velocity over `t`.
    pub fn set_linear(&mut self, x0: f64, x1: f64, t: f64) -> Result<(), RampError> {
        if !(x0.is_finite() && x1.is_finite()) {
            return Err(RampError::NonFiniteBoundary { x0, dx0: 0.0, x1, dx1: 0.0 });
        }
        Self::check_duration(t)?;
        let v = (x1 - x0) / t;
        self.x0 = x0;
        self.x1 = x1;
        self.dx0 = v;
        self.dx1 = v;
        self.apply(Profile {
            tswitch1: 0.0,
            tswitch2: t,
            ttotal: t,
            a1: 0.0,
            v,
            a2: 0.0,
        });
        Ok(())
    }

    fn min_time_profile(&self, amax: f64, vmax: f64) -> Option<Profile> {
        let tol = self.tol;
        kinematics::min_time_candidates(&self.boundary(), amax, vmax, &tol)
            .into_iter()
            .fold(None, |best: Option<Profile>, p| match best {
                Some(b) if p.ttotal >= b.ttotal - tol.scaled(b.ttotal) => Some(b),
                _ => Some(p),
            })
    }

    /// Solves for the minimum-time ramp under the given bounds.
    ///
    /// Ties between the two acceleration signs go to the candidate that
    /// accelerates at `+amax` first.
    pub fn solve_min_time(&mut self, amax: f64, vmax: f64) -> Result<(), RampError> {
        self.check_boundary()?;
        Self::check_accel_bound(amax)?;
        self.check_velocity_bound(vmax)?;
        match self.min_time_profile(amax, vmax) {
            Some(p) => {
                self.apply(p);
                tracing::debug!(
                    "Min-time ramp {:.4} -> {:.4}: t={:.4} ts1={:.4} ts2={:.4} v={:.4}",
                    self.x0, self.x1, self.ttotal, self.tswitch1, self.tswitch2, self.v
                );
                Ok(())
            }
            None => {
                tracing::warn!(
                    "No min-time ramp for x0={} dx0={} x1={} dx1={} amax={} vmax={}",
                    self.x0, self.dx0, self.x1, self.dx1, amax, vmax
                );
                Err(RampError::NoSolution)
            }
        }
    }

    fn min_accel_profile(&self, end_time: f64, vmax: f64) -> Option<Profile> {
        let b = self.boundary();
        let tol = self.tol;
        let limit = vmax + tol.scaled(vmax);
        let bang_bang = kinematics::fixed_time_candidates(&b, end_time, &tol)
            .into_iter()
            .filter(|p| p.peak_speed(&b) <= limit);
        let saturated = [vmax, -vmax]
            .into_iter()
            .filter_map(|v| kinematics::saturated_fixed_time(&b, end_time, v, &tol));
        bang_bang
            .chain(saturated)
            .fold(None, |best: Option<Profile>, p| match best {
                Some(b) if p.max_abs_accel() >= b.max_abs_accel() => Some(b),
                _ => Some(p),
            })
    }

    /// Shortest duration reachable with unbounded acceleration and speed
    /// capped at `vmax`.
    fn min_time_unbounded_accel(&self, vmax: f64) -> f64 {
        self.boundary().displacement().abs() / vmax
    }

    /// Solves for the minimum peak acceleration that completes the move in
    /// exactly `end_time`.
    pub fn solve_min_accel(&mut self, end_time: f64, vmax: f64) -> Result<(), RampError> {
        match self.solve_min_accel2(end_time, vmax)? {
            FixedTimeSolve::Solved => Ok(()),
            FixedTimeSolve::NeedsTime(min_time) => Err(RampError::InfeasibleDuration {
                requested: end_time,
                min_time,
            }),
        }
    }

    /// Like `solve_min_accel`, but reports the duration the move needs
    /// instead of failing when `end_time` is too short. The ramp is left
    /// untouched in that case.
    pub fn solve_min_accel2(&mut self, end_time: f64, vmax: f64) -> Result<FixedTimeSolve, RampError> {
        self.check_boundary()?;
        Self::check_duration(end_time)?;
        self.check_velocity_bound(vmax)?;
        if let Some(p) = self.min_accel_profile(end_time, vmax) {
            self.apply(p);
            tracing::debug!(
                "Min-accel ramp {:.4} -> {:.4} in {:.4}: a={:.4} v={:.4}",
                self.x0, self.x1, end_time, self.a1, self.v
            );
            return Ok(FixedTimeSolve::Solved);
        }
        let min_time = self.min_time_unbounded_accel(vmax);
        if min_time > end_time {
            tracing::debug!("Duration {:.4} too short, needs more than {:.4}", end_time, min_time);
            Ok(FixedTimeSolve::NeedsTime(min_time))
        } else {
            Err(RampError::NoSolution)
        }
    }

    /// Fixed-duration solve that also refuses to exceed `amax`.
    pub fn solve_min_accel_bounded(&mut self, end_time: f64, amax: f64, vmax: f64) -> Result<(), RampError> {
        Self::check_accel_bound(amax)?;
        let mut trial = self.clone();
        trial.solve_min_accel(end_time, vmax)?;
        let required = trial.max_abs_accel();
        if required > amax + self.tol.scaled(amax) {
            return Err(RampError::AccelBoundExceeded { required, amax });
        }
        *self = trial;
        Ok(())
    }

    /// Solves for the earliest duration no shorter than `t_lower` that
    /// honours both bounds, and the minimum-acceleration ramp at it.
    ///
    /// With nonzero boundary velocities the durations meeting an
    /// acceleration bound can form disjoint intervals, so a duration longer
    /// than the minimum time is not always reachable.
    pub fn solve_min_time_from(&mut self, amax: f64, vmax: f64, t_lower: f64) -> Result<(), RampError> {
        self.check_boundary()?;
        Self::check_accel_bound(amax)?;
        self.check_velocity_bound(vmax)?;
        let fastest = self.min_time_profile(amax, vmax).ok_or(RampError::NoSolution)?;
        if fastest.ttotal >= t_lower {
            self.apply(fastest);
            return Ok(());
        }

        let mut candidates = vec![t_lower];
        for t in kinematics::accel_limit_durations(&self.boundary(), amax, vmax) {
            if t > t_lower {
                candidates.push(t);
                candidates.push(t + self.tol.scaled(t));
            }
        }
        let limit = amax + self.tol.scaled(amax);
        for t in candidates {
            if let Some(p) = self.min_accel_profile(t, vmax) {
                if p.max_abs_accel() <= limit {
                    self.apply(p);
                    tracing::debug!("Duration grown from {:.4} to {:.4} for a={:.4}", t_lower, t, p.a1);
                    return Ok(());
                }
            }
        }
        tracing::warn!("No bounded ramp lasting at least {:.4}", t_lower);
        Err(RampError::NoSolution)
    }

    /// Stops as fast as `amax` allows, ignoring the requested end state.
    /// `x1` and `dx1` are overwritten with the stopping state.
    pub fn solve_braking(&mut self, amax: f64) -> Result<(), RampError> {
        self.check_boundary()?;
        Self::check_accel_bound(amax)?;
        let (distance, t) = if self.tol.approx_zero(self.dx0) {
            (0.0, 0.0)
        } else {
            kinematics::braking_distance(self.dx0, amax)
        };
        let a = if t > 0.0 { -self.dx0.signum() * amax } else { 0.0 };
        self.x1 = self.x0 + distance;
        self.dx1 = 0.0;
        self.apply(Profile {
            tswitch1: t,
            tswitch2: t,
            ttotal: t,
            a1: a,
            v: 0.0,
            a2: 0.0,
        });
        tracing::debug!("Braking from v={:.4}: stops at {:.4} after {:.4}s", self.dx0, self.x1, t);
        Ok(())
    }

    /// Extends a stopped ramp with a stationary hold up to `end_time`.
    pub(crate) fn hold_until(&mut self, end_time: f64) {
        if end_time > self.ttotal && self.tswitch2 >= self.ttotal {
            self.tswitch2 = end_time;
            self.ttotal = end_time;
        }
    }

    pub fn evaluate(&self, t: f64) -> f64 {
        let t = t.max(0.0).min(self.ttotal);
        if t < self.tswitch1 {
            self.x0 + t * (self.dx0 + 0.5 * self.a1 * t)
        } else if t < self.tswitch2 {
            let ts = self.tswitch1;
            self.x0 + ts * (self.dx0 + 0.5 * self.a1 * ts) + self.v * (t - ts)
        } else {
            let u = self.ttotal - t;
            self.x1 - u * (self.dx1 - 0.5 * self.a2 * u)
        }
    }

    pub fn derivative(&self, t: f64) -> f64 {
        let t = t.max(0.0).min(self.ttotal);
        if t < self.tswitch1 {
            self.dx0 + self.a1 * t
        } else if t < self.tswitch2 {
            self.v
        } else {
            self.dx1 - self.a2 * (self.ttotal - t)
        }
    }

    pub fn accel(&self, t: f64) -> f64 {
        let t = t.max(0.0).min(self.ttotal);
        if t < self.tswitch1 {
            self.a1
        } else if t < self.tswitch2 {
            0.0
        } else {
            self.a2
        }
    }

    /// Scales time by `time_scale`, slowing the ramp down (> 1) or
    /// speeding it up (< 1) along the same path.
    pub fn dilate(&mut self, time_scale: f64) -> Result<(), RampError> {
        if !self.is_solved() {
            return Err(RampError::NotSolved);
        }
        Self::check_duration(time_scale)?;
        let inv = 1.0 / time_scale;
        self.tswitch1 *= time_scale;
        self.tswitch2 *= time_scale;
        self.ttotal *= time_scale;
        self.a1 *= inv * inv;
        self.a2 *= inv * inv;
        self.v *= inv;
        self.dx0 *= inv;
        self.dx1 *= inv;
        Ok(())
    }

    fn check_cut(&self, tcut: f64) -> Result<f64, RampError> {
        if !self.is_solved() {
            return Err(RampError::NotSolved);
        }
        let slack = self.tol.scaled(self.ttotal);
        if !(tcut >= -slack && tcut <= self.ttotal + slack) {
            return Err(RampError::InvalidCut {
                tcut,
                ttotal: self.ttotal,
            });
        }
        Ok(tcut.clamp(0.0, self.ttotal))
    }

    /// Discards `[0, tcut]`; the new start state is the state at `tcut`.
    pub fn trim_front(&mut self, tcut: f64) -> Result<(), RampError> {
        let tcut = self.check_cut(tcut)?;
        let x = self.evaluate(tcut);
        let dx = self.derivative(tcut);
        if tcut >= self.tswitch2 {
            // Only the final phase remains.
            self.v = dx;
        }
        self.x0 = x;
        self.dx0 = dx;
        self.tswitch1 = (self.tswitch1 - tcut).max(0.0);
        self.tswitch2 = (self.tswitch2 - tcut).max(0.0);
        self.ttotal = (self.ttotal - tcut).max(0.0);
        Ok(())
    }

    /// Discards `[ttotal - tcut, ttotal]`; the new end state is the state
    /// at the cut.
    pub fn trim_back(&mut self, tcut: f64) -> Result<(), RampError> {
        let tcut = self.check_cut(tcut)?;
        let tend = (self.ttotal - tcut).max(0.0);
        let x = self.evaluate(tend);
        let dx = self.derivative(tend);
        if tend <= self.tswitch1 {
            self.tswitch1 = tend;
            self.tswitch2 = tend;
            self.v = dx;
        } else if tend <= self.tswitch2 {
            self.tswitch2 = tend;
        }
        self.x1 = x;
        self.dx1 = dx;
        self.ttotal = tend;
        Ok(())
    }

    /// Checks switch-time ordering and continuity of position and velocity
    /// across the phases.
    pub fn is_valid(&self) -> bool {
        if !self.is_solved() {
            return false;
        }
        let values = [
            self.x0, self.dx0, self.x1, self.dx1, self.tswitch1, self.tswitch2, self.ttotal,
            self.a1, self.v, self.a2,
        ];
        if values.iter().any(|x| !x.is_finite()) {
            return false;
        }
        let tol = self.tol;
        let eps_t = tol.scaled(self.ttotal);
        if self.tswitch1 < -eps_t
            || self.tswitch2 < self.tswitch1 - eps_t
            || self.ttotal < self.tswitch2 - eps_t
        {
            tracing::debug!(
                "Switch times out of order: {} {} {}",
                self.tswitch1, self.tswitch2, self.ttotal
            );
            return false;
        }

        let t1 = self.tswitch1;
        let u3 = self.ttotal - self.tswitch2;
        let v_end1 = self.dx0 + self.a1 * t1;
        let v_start3 = self.dx1 - self.a2 * u3;
        if !tol.approx_eq(v_end1, self.v) || !tol.approx_eq(v_start3, self.v) {
            tracing::debug!(
                "Velocity discontinuity: {} / {} / {}",
                v_end1, self.v, v_start3
            );
            return false;
        }

        let x_forward = self.x0 + t1 * (self.dx0 + 0.5 * self.a1 * t1) + self.v * (self.tswitch2 - t1);
        let x_backward = self.x1 - u3 * (self.dx1 - 0.5 * self.a2 * u3);
        if !tol.approx_eq(x_forward, x_backward) {
            tracing::debug!("Position discontinuity: {} vs {}", x_forward, x_backward);
            return false;
        }
        true
    }
}

impl Trajectory for Ramp1d {
    type Point = f64;

    fn evaluate(&self, t: f64) -> f64 {
        Ramp1d::evaluate(self, t)
    }

    fn derivative(&self, t: f64) -> f64 {
        Ramp1d::derivative(self, t)
    }

    fn accel(&self, t: f64) -> f64 {
        Ramp1d::accel(self, t)
    }

    fn end_time(&self) -> f64 {
        self.ttotal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn solved(x0: f64, dx0: f64, x1: f64, dx1: f64, amax: f64, vmax: f64) -> Ramp1d {
        let mut ramp = Ramp1d::new(x0, dx0, x1, dx1);
        ramp.solve_min_time(amax, vmax).unwrap();
        ramp
    }

    #[test]
    fn test_trapezoidal_profile() {
        let ramp = solved(0.0, 0.0, 10.0, 0.0, 2.0, 3.0);
        assert!((ramp.v() - 3.0).abs() < EPS);
        assert!((ramp.tswitch1() - 1.5).abs() < EPS);
        assert!((ramp.end_time() - 3.0 - 5.5 / 3.0).abs() < EPS);
        assert!(ramp.tswitch2() - ramp.tswitch1() > 1.8);
        assert!(ramp.is_valid());
    }

    #[test]
    fn test_triangular_profile() {
        let ramp = solved(0.0, 0.0, 1.0, 0.0, 10.0, 100.0);
        assert_eq!(ramp.tswitch1(), ramp.tswitch2());
        assert!(ramp.v() < 100.0);
        assert!((ramp.evaluate(ramp.end_time()) - 1.0).abs() < EPS);
        assert!(ramp.is_valid());
    }

    #[test]
    fn test_stationary_solve() {
        let ramp = solved(2.0, 0.0, 2.0, 0.0, 1.0, 1.0);
        assert_eq!(ramp.end_time(), 0.0);
        assert_eq!(ramp.evaluate(0.0), 2.0);
        assert!(ramp.is_valid());
    }

    #[test]
    fn test_invalid_bounds_leave_state() {
        let mut ramp = Ramp1d::new(0.0, 2.0, 1.0, 0.0);
        assert_eq!(ramp.solve_min_time(0.0, 1.0), Err(RampError::InvalidAccelBound(0.0)));
        assert_eq!(ramp.solve_min_time(1.0, -1.0), Err(RampError::InvalidVelocityBound(-1.0)));
        assert!(matches!(
            ramp.solve_min_time(1.0, 1.0),
            Err(RampError::VelocityExceedsBound { .. })
        ));
        assert_eq!(ramp.status(), RampStatus::Unsolved);
    }

    #[test]
    fn test_non_finite_boundary_is_rejected() {
        let cases = [
            (0.0, f64::NAN, 1.0, 0.0),
            (0.0, 0.0, f64::INFINITY, 0.0),
            (f64::NEG_INFINITY, 0.0, 1.0, 0.0),
            (0.0, 0.0, 1.0, f64::NAN),
        ];
        for (x0, dx0, x1, dx1) in cases {
            let mut ramp = Ramp1d::new(x0, dx0, x1, dx1);
            assert!(matches!(ramp.solve_min_time(1.0, 1.0), Err(RampError::NonFiniteBoundary { .. })));
            assert!(matches!(ramp.solve_min_accel(2.0, 1.0), Err(RampError::NonFiniteBoundary { .. })));
            assert!(matches!(ramp.solve_min_accel2(2.0, 1.0), Err(RampError::NonFiniteBoundary { .. })));
            assert!(matches!(
                ramp.solve_min_time_from(1.0, 1.0, 3.0),
                Err(RampError::NonFiniteBoundary { .. })
            ));
            assert!(matches!(ramp.solve_braking(1.0), Err(RampError::NonFiniteBoundary { .. })));
            assert_eq!(ramp.status(), RampStatus::Unsolved);
            assert!(!ramp.is_valid());
            // Sampling an unsolved ramp must not panic.
            let _ = ramp.evaluate(0.5);
        }
        let mut ramp = Ramp1d::default();
        assert!(matches!(
            ramp.set_linear(f64::NAN, 1.0, 1.0),
            Err(RampError::NonFiniteBoundary { .. })
        ));
        assert!(!ramp.is_solved());
    }

    #[test]
    fn test_max_abs_accel_skips_absent_phases() {
        // Trimmed into the cruise: the first phase has zero length.
        let mut ramp = solved(0.0, 0.0, 10.0, 0.0, 2.0, 3.0);
        ramp.trim_front(2.0).unwrap();
        assert_eq!(ramp.tswitch1(), 0.0);
        ramp.a1 = 50.0;
        assert!((ramp.max_abs_accel() - 2.0).abs() < EPS);

        let mut ramp = Ramp1d::default();
        ramp.set_linear(0.0, 1.0, 1.0).unwrap();
        ramp.a2 = 50.0;
        assert_eq!(ramp.max_abs_accel(), 0.0);
    }

    #[test]
    fn test_inconsistent_solved_ramp_is_invalid() {
        let mut ramp = solved(0.0, 0.0, 10.0, 0.0, 2.0, 3.0);
        assert!(ramp.is_valid());
        ramp.x1 += 1.0;
        assert!(ramp.is_solved());
        assert!(!ramp.is_valid());

        let mut ramp = solved(0.0, 0.0, 1.0, 0.0, 1.0, 1.0);
        ramp.v += 0.5;
        assert!(!ramp.is_valid());

        let mut ramp = solved(0.0, 0.0, 1.0, 0.0, 1.0, 1.0);
        ramp.ttotal = f64::NAN;
        assert!(!ramp.is_valid());
        let _ = (ramp.evaluate(0.5), ramp.derivative(0.5), ramp.accel(0.5));
    }

    #[test]
    fn test_failed_solve_keeps_previous_solution() {
        let mut ramp = solved(0.0, 0.0, 1.0, 0.0, 1.0, 1.0);
        let before = ramp.clone();
        assert!(ramp.solve_min_accel(0.5, 1.0).is_err());
        assert_eq!(ramp, before);
    }

    #[test]
    fn test_set_constant_and_linear() {
        let mut ramp = Ramp1d::default();
        ramp.set_constant(3.0, 2.0);
        assert_eq!(ramp.end_time(), 2.0);
        assert_eq!(ramp.evaluate(1.0), 3.0);
        assert_eq!(ramp.derivative(1.0), 0.0);
        assert!(ramp.is_valid());

        ramp.set_linear(0.0, 4.0, 2.0).unwrap();
        assert_eq!(ramp.v(), 2.0);
        assert_eq!(ramp.dx0(), 2.0);
        assert!((ramp.evaluate(1.0) - 2.0).abs() < EPS);
        assert_eq!(ramp.evaluate(2.0), 4.0);
        assert!(ramp.is_valid());
        assert_eq!(ramp.set_linear(0.0, 1.0, 0.0), Err(RampError::InvalidDuration(0.0)));
    }

    #[test]
    fn test_min_accel_rest_to_rest() {
        let mut ramp = Ramp1d::new(0.0, 0.0, 1.0, 0.0);
        ramp.solve_min_accel(4.0, 10.0).unwrap();
        assert_eq!(ramp.end_time(), 4.0);
        assert!((ramp.a1() - 0.25).abs() < EPS);
        assert!(ramp.is_valid());
    }

    #[test]
    fn test_min_accel_clamps_cruise() {
        let mut ramp = Ramp1d::new(0.0, 0.0, 10.0, 0.0);
        ramp.solve_min_accel(5.0, 3.0).unwrap();
        assert!((ramp.v() - 3.0).abs() < EPS);
        assert!(ramp.peak_velocity() <= 3.0 + EPS);
        assert!((ramp.evaluate(5.0) - 10.0).abs() < EPS);
        assert!(ramp.is_valid());
    }

    #[test]
    fn test_min_accel_infeasible_reports_time() {
        let mut ramp = Ramp1d::new(0.0, 0.0, 10.0, 0.0);
        assert_eq!(
            ramp.solve_min_accel2(2.0, 3.0),
            Ok(FixedTimeSolve::NeedsTime(10.0 / 3.0))
        );
        assert_eq!(ramp.status(), RampStatus::Unsolved);
        assert!(matches!(
            ramp.solve_min_accel(2.0, 3.0),
            Err(RampError::InfeasibleDuration { .. })
        ));
    }

    #[test]
    fn test_min_accel_bounded_detects_overshoot() {
        let mut ramp = Ramp1d::new(0.0, 0.0, 10.0, 0.0);
        assert!(matches!(
            ramp.solve_min_accel_bounded(4.0, 2.0, 3.0),
            Err(RampError::AccelBoundExceeded { .. })
        ));
        assert!(!ramp.is_solved());
        ramp.solve_min_accel_bounded(6.0, 2.0, 3.0).unwrap();
        assert!(ramp.max_abs_accel() <= 2.0 + EPS);
    }

    #[test]
    fn test_min_time_from_skips_infeasible_gap() {
        // Moving fast through a short distance: slowing to a longer duration
        // needs more than amax until the ramp can reverse.
        let mut ramp = Ramp1d::new(0.0, 2.0, 1.0, 2.0);
        ramp.solve_min_time(1.0, 3.0).unwrap();
        let t_min = ramp.end_time();
        assert!(matches!(
            ramp.clone().solve_min_accel_bounded(2.0, 1.0, 3.0),
            Err(RampError::AccelBoundExceeded { .. })
        ));
        ramp.solve_min_time_from(1.0, 3.0, 2.0).unwrap();
        assert!(ramp.end_time() > 2.0);
        assert!(ramp.end_time() > t_min);
        assert!(ramp.max_abs_accel() <= 1.0 + EPS);
        assert!((ramp.evaluate(ramp.end_time()) - 1.0).abs() < EPS);
        assert!(ramp.is_valid());
    }

    #[test]
    fn test_braking() {
        let mut ramp = Ramp1d::new(0.0, 5.0, 0.0, 0.0);
        ramp.solve_braking(2.0).unwrap();
        assert!((ramp.end_time() - 2.5).abs() < EPS);
        assert!(ramp.derivative(2.5).abs() < EPS);
        assert!((ramp.evaluate(2.5) - 6.25).abs() < EPS);
        assert!((ramp.accel(1.0) + 2.0).abs() < EPS);
        assert!(ramp.is_valid());
    }

    #[test]
    fn test_evaluation_clamps_outside_range() {
        let ramp = solved(0.0, 1.0, 5.0, 0.0, 2.0, 3.0);
        assert_eq!(ramp.evaluate(-1.0), ramp.evaluate(0.0));
        assert_eq!(ramp.derivative(-1.0), ramp.derivative(0.0));
        assert_eq!(ramp.evaluate(100.0), ramp.evaluate(ramp.end_time()));
    }

    #[test]
    fn test_dilate_round_trip() {
        let mut ramp = solved(0.0, 0.5, 4.0, -0.5, 2.0, 3.0);
        let original = ramp.clone();
        ramp.dilate(2.0).unwrap();
        assert!((ramp.end_time() - 2.0 * original.end_time()).abs() < EPS);
        assert!((ramp.evaluate(ramp.end_time()) - 4.0).abs() < EPS);
        assert!(ramp.is_valid());
        ramp.dilate(0.5).unwrap();
        assert!((ramp.end_time() - original.end_time()).abs() < EPS);
        assert!((ramp.a1() - original.a1()).abs() < EPS);
        assert!((ramp.v() - original.v()).abs() < EPS);
        assert!((ramp.a2() - original.a2()).abs() < EPS);
        assert_eq!(ramp.dilate(0.0), Err(RampError::InvalidDuration(0.0)));
    }

    #[test]
    fn test_trim_front_matches_original() {
        let original = solved(0.0, 0.0, 10.0, 0.0, 2.0, 3.0);
        for cut in [0.5, 2.0, 4.0] {
            let mut ramp = original.clone();
            ramp.trim_front(cut).unwrap();
            assert!(ramp.is_valid());
            for i in 0..=20 {
                let t = cut + (original.end_time() - cut) * i as f64 / 20.0;
                assert!((ramp.evaluate(t - cut) - original.evaluate(t)).abs() < EPS);
                assert!((ramp.derivative(t - cut) - original.derivative(t)).abs() < EPS);
            }
        }
    }

    #[test]
    fn test_trim_back_matches_original() {
        let original = solved(0.0, 0.0, 10.0, 0.0, 2.0, 3.0);
        for cut in [0.5, 2.0, 4.0] {
            let mut ramp = original.clone();
            ramp.trim_back(cut).unwrap();
            assert!(ramp.is_valid());
            assert!((ramp.end_time() - (original.end_time() - cut)).abs() < EPS);
            for i in 0..=20 {
                let t = ramp.end_time() * i as f64 / 20.0;
                assert!((ramp.evaluate(t) - original.evaluate(t)).abs() < EPS);
            }
        }
    }

    #[test]
    fn test_trim_rejects_bad_cut() {
        let mut ramp = solved(0.0, 0.0, 1.0, 0.0, 1.0, 1.0);
        assert!(matches!(ramp.trim_front(-1.0), Err(RampError::InvalidCut { .. })));
        assert!(matches!(ramp.trim_back(10.0), Err(RampError::InvalidCut { .. })));
        assert_eq!(Ramp1d::default().trim_front(0.0), Err(RampError::NotSolved));
    }
}
