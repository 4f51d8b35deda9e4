// ramp-rs: trajectory sampling front end over the shared ramp solvers
pub mod output;

pub use ramp_shared::*;
