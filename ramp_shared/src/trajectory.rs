// src/trajectory.rs - Shared trajectory error, tolerance and sampling logic
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RampError {
    #[error("Invalid acceleration bound: {0}")]
    InvalidAccelBound(f64),
    #[error("Invalid velocity bound: {0}")]
    InvalidVelocityBound(f64),
    #[error("Boundary velocity {velocity} exceeds velocity bound {vmax}")]
    VelocityExceedsBound { velocity: f64, vmax: f64 },
    #[error("Boundary state is not finite: x0={x0} dx0={dx0} x1={x1} dx1={dx1}")]
    NonFiniteBoundary { x0: f64, dx0: f64, x1: f64, dx1: f64 },
    #[error("Invalid duration: {0}")]
    InvalidDuration(f64),
    #[error("Cut time {tcut} outside of [0, {ttotal}]")]
    InvalidCut { tcut: f64, ttotal: f64 },
    #[error("Duration {requested} is shorter than the minimum achievable {min_time}")]
    InfeasibleDuration { requested: f64, min_time: f64 },
    #[error("Required acceleration {required} exceeds bound {amax}")]
    AccelBoundExceeded { required: f64, amax: f64 },
    #[error("No feasible ramp for the given boundary conditions")]
    NoSolution,
    #[error("Ramp has not been solved")]
    NotSolved,
    #[error("Dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("Synchronization did not converge after {iterations} passes (end time {end_time})")]
    NonConvergence { iterations: usize, end_time: f64 },
}

/// Absolute/relative tolerance used for every boundary and bound comparison.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Tolerance {
    #[serde(default = "default_absolute")]
    pub absolute: f64,
    #[serde(default = "default_relative")]
    pub relative: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            absolute: default_absolute(),
            relative: default_relative(),
        }
    }
}

impl Tolerance {
    pub fn new(absolute: f64, relative: f64) -> Self {
        Self { absolute, relative }
    }

    /// Allowed error for a quantity of the given magnitude.
    pub fn scaled(&self, magnitude: f64) -> f64 {
        self.absolute + self.relative * magnitude.abs()
    }

    pub fn approx_eq(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.scaled(a.abs().max(b.abs()))
    }

    pub fn approx_zero(&self, a: f64) -> bool {
        a.abs() <= self.absolute
    }
}

fn default_absolute() -> f64 { 1e-7 }
fn default_relative() -> f64 { 1e-9 }

/// Anything that can be sampled over `[0, end_time]`.
///
/// Times outside that interval are clamped to it.
pub trait Trajectory {
    type Point;

    fn evaluate(&self, t: f64) -> Self::Point;
    fn derivative(&self, t: f64) -> Self::Point;
    fn accel(&self, t: f64) -> Self::Point;
    fn end_time(&self) -> f64;

    /// Uniformly spaced samples from 0 to `end_time` inclusive.
    fn samples(&self, dt: f64) -> Result<Samples<'_, Self>, RampError>
    where
        Self: Sized,
    {
        Samples::new(self, dt)
    }
}

/// Restartable iterator over `(t, position)` pairs of a trajectory.
///
/// A clone keeps the current position, so cloning before consumption
/// replays the full sequence.
#[derive(Debug)]
pub struct Samples<'a, T: Trajectory> {
    trajectory: &'a T,
    dt: f64,
    index: usize,
    interior: usize,
    finished: bool,
}

impl<'a, T: Trajectory> Clone for Samples<'a, T> {
    fn clone(&self) -> Self {
        Self {
            trajectory: self.trajectory,
            dt: self.dt,
            index: self.index,
            interior: self.interior,
            finished: self.finished,
        }
    }
}

impl<'a, T: Trajectory> Samples<'a, T> {
    pub fn new(trajectory: &'a T, dt: f64) -> Result<Self, RampError> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(RampError::InvalidDuration(dt));
        }
        let end = trajectory.end_time();
        // Interior samples are the i*dt strictly before the end; the end
        // itself is always emitted last.
        let guard = 16.0 * f64::EPSILON * end.max(1.0);
        let interior = if end <= guard {
            0
        } else {
            ((end - guard) / dt).ceil() as usize
        };
        Ok(Self {
            trajectory,
            dt,
            index: 0,
            interior,
            finished: false,
        })
    }

    /// Number of samples still to be produced.
    pub fn remaining(&self) -> usize {
        if self.finished {
            0
        } else {
            self.interior - self.index + 1
        }
    }
}

impl<'a, T: Trajectory> Iterator for Samples<'a, T> {
    type Item = (f64, T::Point);

    fn next(&mut self) -> Option<Self::Item> {
        if self.index < self.interior {
            let t = self.index as f64 * self.dt;
            self.index += 1;
            Some((t, self.trajectory.evaluate(t)))
        } else if !self.finished {
            self.finished = true;
            let end = self.trajectory.end_time();
            Some((end, self.trajectory.evaluate(end)))
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}

impl<'a, T: Trajectory> ExactSizeIterator for Samples<'a, T> {}
