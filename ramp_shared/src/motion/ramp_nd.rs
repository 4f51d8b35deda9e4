// ramp_shared::motion::ramp_nd.rs
// Multi-axis ramp whose axes start and finish together

use crate::config::{default_max_iterations, RampConfig};
use crate::motion::ramp1d::{FixedTimeSolve, Ramp1d};
use crate::trajectory::{RampError, Tolerance, Trajectory};

/// Synchronized ramp over N axes sharing one end time.
#[derive(Debug, Clone, PartialEq)]
pub struct RampNd {
    x0: Vec<f64>,
    dx0: Vec<f64>,
    x1: Vec<f64>,
    dx1: Vec<f64>,
    end_time: f64,
    ramps: Vec<Ramp1d>,
    tol: Tolerance,
    max_iterations: usize,
}

impl RampNd {
    pub fn new(x0: Vec<f64>, dx0: Vec<f64>, x1: Vec<f64>, dx1: Vec<f64>) -> Result<Self, RampError> {
        let n = x0.len();
        for found in [dx0.len(), x1.len(), dx1.len()] {
            check_len(n, found)?;
        }
        let tol = Tolerance::default();
        let ramps = (0..n)
            .map(|i| Ramp1d::new(x0[i], dx0[i], x1[i], dx1[i]).with_tolerance(tol))
            .collect();
        Ok(Self {
            x0,
            dx0,
            x1,
            dx1,
            end_time: 0.0,
            ramps,
            tol,
            max_iterations: default_max_iterations(),
        })
    }

    /// Rest-to-rest move between two configurations.
    pub fn rest_to_rest(x0: Vec<f64>, x1: Vec<f64>) -> Result<Self, RampError> {
        let zeros = vec![0.0; x0.len()];
        Self::new(x0, zeros.clone(), x1, zeros)
    }

    pub fn with_tolerance(mut self, tol: Tolerance) -> Self {
        self.tol = tol;
        self.ramps = self.ramps.into_iter().map(|r| r.with_tolerance(tol)).collect();
        self
    }

    /// Caps the number of synchronization passes.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    pub fn with_config(self, config: &RampConfig) -> Self {
        self.with_tolerance(config.tolerance)
            .with_max_iterations(config.sync.max_iterations)
    }

    pub fn dims(&self) -> usize { self.ramps.len() }
    pub fn end_time(&self) -> f64 { self.end_time }
    pub fn ramps(&self) -> &[Ramp1d] { &self.ramps }
    pub fn x0(&self) -> &[f64] { &self.x0 }
    pub fn dx0(&self) -> &[f64] { &self.dx0 }
    pub fn x1(&self) -> &[f64] { &self.x1 }
    pub fn dx1(&self) -> &[f64] { &self.dx1 }

    pub fn is_solved(&self) -> bool {
        self.ramps.iter().all(Ramp1d::is_solved)
    }

    fn fresh_ramps(&self) -> Vec<Ramp1d> {
        (0..self.dims())
            .map(|i| Ramp1d::new(self.x0[i], self.dx0[i], self.x1[i], self.dx1[i]).with_tolerance(self.tol))
            .collect()
    }

    fn commit(&mut self, ramps: Vec<Ramp1d>, end_time: f64) {
        self.x0 = ramps.iter().map(Ramp1d::x0).collect();
        self.dx0 = ramps.iter().map(Ramp1d::dx0).collect();
        self.x1 = ramps.iter().map(Ramp1d::x1).collect();
        self.dx1 = ramps.iter().map(Ramp1d::dx1).collect();
        self.ramps = ramps;
        self.end_time = end_time;
    }

    pub fn set_constant(&mut self, x: &[f64], t: f64) {
        let t = if t.is_finite() { t.max(0.0) } else { 0.0 };
        let ramps: Vec<Ramp1d> = x
            .iter()
            .map(|&xi| {
                let mut r = Ramp1d::default().with_tolerance(self.tol);
                r.set_constant(xi, t);
                r
            })
            .collect();
        self.commit(ramps, t);
    }

    pub fn set_linear(&mut self, x0: &[f64], x1: &[f64], t: f64) -> Result<(), RampError> {
        check_len(x0.len(), x1.len())?;
        let mut ramps = Vec::with_capacity(x0.len());
        for (&a, &b) in x0.iter().zip(x1) {
            let mut r = Ramp1d::default().with_tolerance(self.tol);
            r.set_linear(a, b, t)?;
            ramps.push(r);
        }
        self.commit(ramps, t);
        Ok(())
    }

    fn check_limits(&self, limits: &[f64]) -> Result<(), RampError> {
        check_len(self.dims(), limits.len())
    }

    /// Solves every axis for minimum time, then stretches the faster axes
    /// to the slowest one with the least acceleration that fits.
    pub fn solve_min_time(&mut self, amax: &[f64], vmax: &[f64]) -> Result<(), RampError> {
        self.check_limits(amax)?;
        self.check_limits(vmax)?;
        let mut ramps = self.fresh_ramps();
        for (i, ramp) in ramps.iter_mut().enumerate() {
            ramp.solve_min_time(amax[i], vmax[i]).map_err(|e| {
                tracing::warn!("Axis {} has no min-time ramp: {}", i, e);
                e
            })?;
        }
        let end_time = ramps.iter().map(Ramp1d::end_time).fold(0.0, f64::max);
        let end_time = self.synchronize(&mut ramps, amax, vmax, end_time)?;
        self.commit(ramps, end_time);
        tracing::debug!("Synchronized {} axes at t={:.4}", self.dims(), end_time);
        Ok(())
    }

    /// Re-solves every axis to finish at a shared end time, growing it when
    /// an axis cannot meet it within its bounds.
    fn synchronize(
        &self,
        ramps: &mut [Ramp1d],
        amax: &[f64],
        vmax: &[f64],
        mut end_time: f64,
    ) -> Result<f64, RampError> {
        for pass in 0..self.max_iterations {
            tracing::trace!("Synchronization pass {} at t={:.6}", pass, end_time);
            let mut grown = None;
            for (i, ramp) in ramps.iter_mut().enumerate() {
                if ramp.end_time() == end_time {
                    continue;
                }
                let fits = match ramp.solve_min_accel2(end_time, vmax[i])? {
                    FixedTimeSolve::Solved => ramp.max_abs_accel() <= amax[i] + self.tol.scaled(amax[i]),
                    FixedTimeSolve::NeedsTime(_) => false,
                };
                if !fits {
                    ramp.solve_min_time_from(amax[i], vmax[i], end_time)?;
                    tracing::debug!(
                        "Axis {} cannot finish at {:.4}, end time grows to {:.4}",
                        i, end_time, ramp.end_time()
                    );
                    grown = Some(ramp.end_time());
                    break;
                }
            }
            match grown {
                None => return Ok(end_time),
                Some(t) => end_time = t,
            }
        }
        tracing::warn!("Synchronization gave up after {} passes", self.max_iterations);
        Err(RampError::NonConvergence {
            iterations: self.max_iterations,
            end_time,
        })
    }

    /// End time `solve_min_time` would produce, without touching `self`.
    pub fn calc_min_time(&self, amax: &[f64], vmax: &[f64]) -> Result<f64, RampError> {
        let mut trial = self.clone();
        trial.solve_min_time(amax, vmax)?;
        Ok(trial.end_time)
    }

    /// Solves every axis for minimum acceleration at a given end time.
    pub fn solve_min_accel(&mut self, vmax: &[f64], end_time: f64) -> Result<(), RampError> {
        self.check_limits(vmax)?;
        let mut ramps = self.fresh_ramps();
        for (i, ramp) in ramps.iter_mut().enumerate() {
            ramp.solve_min_accel(end_time, vmax[i])?;
        }
        self.commit(ramps, end_time);
        Ok(())
    }

    /// Constant-velocity move on every axis, as fast as `vmax` allows.
    /// Boundary velocities become the axis' cruise velocity.
    pub fn solve_min_time_linear(&mut self, vmax: &[f64]) -> Result<(), RampError> {
        self.check_limits(vmax)?;
        let mut end_time: f64 = 0.0;
        for (i, &limit) in vmax.iter().enumerate() {
            if !(limit.is_finite() && limit > 0.0) {
                return Err(RampError::InvalidVelocityBound(limit));
            }
            end_time = end_time.max((self.x1[i] - self.x0[i]).abs() / limit);
        }
        if end_time <= self.tol.absolute {
            let x0 = self.x0.clone();
            self.set_constant(&x0, 0.0);
            return Ok(());
        }
        self.solve_min_accel_linear(vmax, end_time)
    }

    /// Constant-velocity move on every axis lasting exactly `end_time`.
    pub fn solve_min_accel_linear(&mut self, vmax: &[f64], end_time: f64) -> Result<(), RampError> {
        self.check_limits(vmax)?;
        let mut ramps = Vec::with_capacity(self.dims());
        for i in 0..self.dims() {
            let mut r = Ramp1d::default().with_tolerance(self.tol);
            r.set_linear(self.x0[i], self.x1[i], end_time)?;
            if r.v().abs() > vmax[i] + self.tol.scaled(vmax[i]) {
                return Err(RampError::InfeasibleDuration {
                    requested: end_time,
                    min_time: (self.x1[i] - self.x0[i]).abs() / vmax[i],
                });
            }
            ramps.push(r);
        }
        self.commit(ramps, end_time);
        Ok(())
    }

    /// Brakes every axis as hard as its own bound allows. Axes that stop
    /// early hold still until the slowest one has stopped.
    pub fn solve_braking(&mut self, amax: &[f64]) -> Result<(), RampError> {
        self.check_limits(amax)?;
        let mut ramps = self.fresh_ramps();
        for (i, ramp) in ramps.iter_mut().enumerate() {
            ramp.solve_braking(amax[i])?;
        }
        let end_time = ramps.iter().map(Ramp1d::end_time).fold(0.0, f64::max);
        for ramp in ramps.iter_mut() {
            ramp.hold_until(end_time);
        }
        self.commit(ramps, end_time);
        Ok(())
    }

    pub fn evaluate_into(&self, t: f64, x: &mut Vec<f64>) {
        x.clear();
        x.extend(self.ramps.iter().map(|r| r.evaluate(t)));
    }

    pub fn derivative_into(&self, t: f64, dx: &mut Vec<f64>) {
        dx.clear();
        dx.extend(self.ramps.iter().map(|r| r.derivative(t)));
    }

    pub fn accel_into(&self, t: f64, ddx: &mut Vec<f64>) {
        ddx.clear();
        ddx.extend(self.ramps.iter().map(|r| r.accel(t)));
    }

    /// Positions sampled every `dt` from 0 to the end time inclusive.
    pub fn output(&self, dt: f64) -> Result<Vec<Vec<f64>>, RampError> {
        Ok(self.samples(dt)?.map(|(_, x)| x).collect())
    }

    fn for_each_ramp(
        &mut self,
        end_time: f64,
        op: impl Fn(&mut Ramp1d) -> Result<(), RampError>,
    ) -> Result<(), RampError> {
        let mut ramps = self.ramps.clone();
        for ramp in ramps.iter_mut() {
            op(ramp)?;
        }
        self.commit(ramps, end_time);
        Ok(())
    }

    pub fn dilate(&mut self, time_scale: f64) -> Result<(), RampError> {
        let end_time = self.end_time * time_scale;
        self.for_each_ramp(end_time, |r| r.dilate(time_scale))
    }

    pub fn trim_front(&mut self, tcut: f64) -> Result<(), RampError> {
        let tcut_clamped = tcut.clamp(0.0, self.end_time);
        let end_time = (self.end_time - tcut_clamped).max(0.0);
        self.for_each_ramp(end_time, |r| r.trim_front(tcut))
    }

    pub fn trim_back(&mut self, tcut: f64) -> Result<(), RampError> {
        let tcut_clamped = tcut.clamp(0.0, self.end_time);
        let end_time = (self.end_time - tcut_clamped).max(0.0);
        self.for_each_ramp(end_time, |r| r.trim_back(tcut))
    }

    /// Every axis is valid and finishes exactly at the shared end time.
    pub fn is_valid(&self) -> bool {
        self.ramps
            .iter()
            .all(|r| r.is_valid() && r.end_time() == self.end_time)
    }
}

impl Trajectory for RampNd {
    type Point = Vec<f64>;

    fn evaluate(&self, t: f64) -> Vec<f64> {
        let mut x = Vec::with_capacity(self.dims());
        self.evaluate_into(t, &mut x);
        x
    }

    fn derivative(&self, t: f64) -> Vec<f64> {
        let mut dx = Vec::with_capacity(self.dims());
        self.derivative_into(t, &mut dx);
        dx
    }

    fn accel(&self, t: f64) -> Vec<f64> {
        let mut ddx = Vec::with_capacity(self.dims());
        self.accel_into(t, &mut ddx);
        ddx
    }

    fn end_time(&self) -> f64 {
        self.end_time
    }
}

fn check_len(expected: usize, found: usize) -> Result<(), RampError> {
    if expected == found {
        Ok(())
    } else {
        Err(RampError::DimensionMismatch { expected, found })
    }
}
