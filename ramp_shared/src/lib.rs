// ramp_shared: parabolic ramp solvers shared by the host binary, tests and benches

pub mod config;
pub mod motion;
pub mod trajectory;

pub use config::{load_config, AxisLimits, ConfigError, RampConfig, SyncConfig};
pub use motion::{FixedTimeSolve, Ramp1d, RampNd, RampStatus};
pub use trajectory::{RampError, Samples, Tolerance, Trajectory};
