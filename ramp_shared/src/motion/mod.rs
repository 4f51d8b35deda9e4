// ramp_shared::motion::mod.rs
// Scalar and multi-axis parabolic ramps

pub(crate) mod kinematics;
pub mod ramp1d;
pub mod ramp_nd;

pub use ramp1d::{FixedTimeSolve, Ramp1d, RampStatus};
pub use ramp_nd::RampNd;
