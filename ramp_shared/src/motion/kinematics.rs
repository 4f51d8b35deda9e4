// ramp_shared::motion::kinematics.rs
// Closed-form parabolic relations shared by every ramp solve

use crate::trajectory::Tolerance;

/// Boundary states of a single-axis move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Boundary {
    pub x0: f64,
    pub dx0: f64,
    pub x1: f64,
    pub dx1: f64,
}

impl Boundary {
    pub fn displacement(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn max_abs_velocity(&self) -> f64 {
        self.dx0.abs().max(self.dx1.abs())
    }
}

/// Accelerate / cruise / decelerate timing, laid out the way `Ramp1d` stores it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Profile {
    pub tswitch1: f64,
    pub tswitch2: f64,
    pub ttotal: f64,
    pub a1: f64,
    pub v: f64,
    pub a2: f64,
}

impl Profile {
    pub fn max_abs_accel(&self) -> f64 {
        self.a1.abs().max(self.a2.abs())
    }

    /// Largest speed reached, given the boundary velocities it connects.
    pub fn peak_speed(&self, b: &Boundary) -> f64 {
        b.max_abs_velocity().max(self.v.abs())
    }

    fn constant_velocity(v: f64, t: f64) -> Self {
        Self {
            tswitch1: 0.0,
            tswitch2: t,
            ttotal: t,
            a1: 0.0,
            v,
            a2: 0.0,
        }
    }
}

/// Square of the peak velocity of a two-phase profile whose first phase
/// accelerates at `a` and whose second decelerates at `-a`.
pub(crate) fn peak_velocity_sq(b: &Boundary, a: f64) -> f64 {
    a * b.displacement() + 0.5 * (b.dx0 * b.dx0 + b.dx1 * b.dx1)
}

/// Distance covered and time taken to stop from `v` at deceleration `amax`.
pub(crate) fn braking_distance(v: f64, amax: f64) -> (f64, f64) {
    let t = v.abs() / amax;
    (0.5 * v * t, t)
}

/// Real roots of `a*x^2 + b*x + c`, smallest first. Degenerates to the
/// linear case when `a` is zero.
pub(crate) fn quadratic_roots(a: f64, b: f64, c: f64) -> Vec<f64> {
    // Exact zeros here only guard the divisions below.
    if a == 0.0 {
        if b == 0.0 {
            return Vec::new();
        }
        return vec![-c / b];
    }
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return Vec::new();
    }
    let sq = disc.sqrt();
    // Avoid cancellation between b and the root of the discriminant.
    let q = -0.5 * (b + b.signum() * sq);
    let mut roots = if q == 0.0 {
        vec![0.0]
    } else {
        vec![q / a, c / q]
    };
    roots.sort_by(|x, y| x.total_cmp(y));
    roots
}

/// Two-phase profile at full acceleration, if both phase durations are
/// non-negative for the chosen peak.
fn bang_bang(b: &Boundary, a: f64, vp: f64, tol: &Tolerance) -> Option<Profile> {
    let t1 = (vp - b.dx0) / a;
    let t2 = (vp - b.dx1) / a;
    if t1 < -tol.absolute || t2 < -tol.absolute {
        return None;
    }
    let t1 = t1.max(0.0);
    let t2 = t2.max(0.0);
    Some(Profile {
        tswitch1: t1,
        tswitch2: t1,
        ttotal: t1 + t2,
        a1: a,
        v: vp,
        a2: -a,
    })
}

/// Three-phase profile accelerating at `a` to cruise speed `v` and back.
fn saturated_min_time(b: &Boundary, a: f64, v: f64, tol: &Tolerance) -> Option<Profile> {
    let t1 = (v - b.dx0) / a;
    let t3 = (v - b.dx1) / a;
    if t1 < -tol.absolute || t3 < -tol.absolute {
        return None;
    }
    let t1 = t1.max(0.0);
    let t3 = t3.max(0.0);
    let d1 = 0.5 * (b.dx0 + v) * t1;
    let d3 = 0.5 * (v + b.dx1) * t3;
    let t2 = (b.displacement() - d1 - d3) / v;
    if t2 < -tol.absolute {
        return None;
    }
    let t2 = t2.max(0.0);
    Some(Profile {
        tswitch1: t1,
        tswitch2: t1 + t2,
        ttotal: t1 + t2 + t3,
        a1: a,
        v,
        a2: -a,
    })
}

/// One constant-acceleration phase joining the boundaries directly.
fn single_parabola(b: &Boundary, amax: f64, tol: &Tolerance) -> Option<Profile> {
    let vsum = b.dx0 + b.dx1;
    let d = b.displacement();
    if tol.approx_zero(vsum) {
        if tol.approx_zero(d) && tol.approx_zero(b.dx1 - b.dx0) {
            return Some(Profile::constant_velocity(b.dx0, 0.0));
        }
        return None;
    }
    let t = 2.0 * d / vsum;
    if t <= tol.absolute {
        return None;
    }
    let a = (b.dx1 - b.dx0) / t;
    if a.abs() > amax + tol.scaled(amax) {
        return None;
    }
    Some(Profile {
        tswitch1: t,
        tswitch2: t,
        ttotal: t,
        a1: a,
        v: b.dx1,
        a2: a,
    })
}

/// Every feasible bounded profile, in tie-break order: the `+amax` first
/// candidates, then the `-amax` first ones, then the single parabola.
pub(crate) fn min_time_candidates(
    b: &Boundary,
    amax: f64,
    vmax: f64,
    tol: &Tolerance,
) -> Vec<Profile> {
    let mut out = Vec::with_capacity(5);
    for sign in [1.0, -1.0] {
        let a = sign * amax;
        let q = peak_velocity_sq(b, a);
        if q < -tol.scaled(a * b.displacement()) {
            continue;
        }
        let root = q.max(0.0).sqrt();
        for vp in [root, -root] {
            let Some(p) = bang_bang(b, a, vp, tol) else {
                continue;
            };
            if vp.abs() <= vmax + tol.scaled(vmax) {
                out.push(p);
            } else if let Some(p) = saturated_min_time(b, a, vp.signum() * vmax, tol) {
                out.push(p);
            }
        }
    }
    if let Some(p) = single_parabola(b, amax, tol) {
        if p.peak_speed(b) <= vmax + tol.scaled(vmax) {
            out.push(p);
        }
    }
    out
}

/// Minimum-acceleration two-phase profiles lasting exactly `t`, without
/// regard to any velocity bound.
///
/// With `E = D - t(dx0+dx1)/2` and `dv = dx1 - dx0` the signed
/// acceleration satisfies `t^2 a^2 - 4 E a - dv^2 = 0`.
pub(crate) fn fixed_time_candidates(b: &Boundary, t: f64, tol: &Tolerance) -> Vec<Profile> {
    let d = b.displacement();
    let dv = b.dx1 - b.dx0;
    let e = d - 0.5 * t * (b.dx0 + b.dx1);
    if tol.approx_zero(e) && tol.approx_zero(dv) {
        return vec![Profile::constant_velocity(d / t, t)];
    }
    let sq = (4.0 * e * e + t * t * dv * dv).sqrt();
    let q = if e >= 0.0 { 2.0 * e + sq } else { 2.0 * e - sq };
    let roots = [q / (t * t), -dv * dv / q];

    let mut out = Vec::with_capacity(2);
    for a in roots {
        // Division guard for `u`; a zero root carries no profile.
        if a == 0.0 || !a.is_finite() {
            continue;
        }
        // u = tswitch1 - (t - tswitch1)
        let u = dv / a;
        if u.abs() > t + tol.scaled(t) {
            continue;
        }
        let t1 = (0.5 * (t + u)).clamp(0.0, t);
        out.push(Profile {
            tswitch1: t1,
            tswitch2: t1,
            ttotal: t,
            a1: a,
            v: b.dx0 + a * t1,
            a2: -a,
        });
    }
    out
}

/// Minimum-acceleration three-phase profile lasting exactly `t` that
/// cruises at `v`.
pub(crate) fn saturated_fixed_time(b: &Boundary, t: f64, v: f64, tol: &Tolerance) -> Option<Profile> {
    let d = b.displacement();
    let num = (v - b.dx0).powi(2) + (v - b.dx1).powi(2);
    let slack = v * t - d;
    if tol.approx_zero(num) {
        return tol
            .approx_zero(slack)
            .then(|| Profile::constant_velocity(v, t));
    }
    if tol.approx_zero(slack) {
        return None;
    }
    let a = num / (2.0 * slack);
    if a * v <= 0.0 {
        return None;
    }
    let t1 = (v - b.dx0) / a;
    let t3 = (v - b.dx1) / a;
    let t2 = t - t1 - t3;
    if t1 < -tol.absolute || t3 < -tol.absolute || t2 < -tol.scaled(t) {
        return None;
    }
    let t1 = t1.max(0.0);
    let tswitch2 = (t - t3.max(0.0)).max(t1);
    Some(Profile {
        tswitch1: t1,
        tswitch2,
        ttotal: t,
        a1: a,
        v,
        a2: -a,
    })
}

/// Durations at which the fixed-time minimum acceleration of either
/// profile family equals `amax` in magnitude. These are the only places
/// the set of acceleration-feasible durations can begin.
pub(crate) fn accel_limit_durations(b: &Boundary, amax: f64, vmax: f64) -> Vec<f64> {
    let d = b.displacement();
    let s = 0.5 * (b.dx0 + b.dx1);
    let dv = b.dx1 - b.dx0;
    let mut out = Vec::new();
    for sign in [1.0, -1.0] {
        // amax^2 T^2 + 4 sign amax S T - (4 sign amax D + dv^2) = 0
        let roots = quadratic_roots(
            amax * amax,
            4.0 * sign * amax * s,
            -(4.0 * sign * amax * d + dv * dv),
        );
        out.extend(roots.into_iter().filter(|t| *t > 0.0));

        let v = sign * vmax;
        let a = sign * amax;
        let num = (v - b.dx0).powi(2) + (v - b.dx1).powi(2);
        let t = (d + num / (2.0 * a)) / v;
        if t > 0.0 {
            out.push(t);
        }
    }
    out.retain(|t| t.is_finite());
    out.sort_by(|x, y| x.total_cmp(y));
    out
}
