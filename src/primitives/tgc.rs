//! Truncated general cone editor (§4.5): independent and paired
//! scaling of `H`, `A`, `B`, `C`, `D`, absolute-rotation of `H` or the
//! `(A,B,C,D)` plane set, and the two "move end of H" variants.

use glam::{DQuat, DVec3};

use crate::error::{EditError, EditResult};
use crate::math::is_nonzero;

/// Truncated general cone: base vertex `v`, axis `h`, base-plane
/// vectors `a`,`b`, top-plane vectors `c`,`d`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tgc {
    pub v: DVec3,
    pub h: DVec3,
    pub a: DVec3,
    pub b: DVec3,
    pub c: DVec3,
    pub d: DVec3,
}

fn check_positive(op: &'static str, factor: f64) -> EditResult<()> {
    if factor <= 0.0 {
        return Err(EditError::OutOfRange {
            op,
            value: factor,
            reason: "scale factor must be positive",
        });
    }
    Ok(())
}

impl Tgc {
    pub fn scale_h(&mut self, factor: f64) -> EditResult<()> {
        check_positive("TGC_SCALE_H", factor)?;
        self.h *= factor;
        Ok(())
    }

    /// Scale `H` about the top of the cone: `V` moves so that `V + H`
    /// (the tip) stays fixed.
    pub fn scale_h_about_top(&mut self, factor: f64) -> EditResult<()> {
        check_positive("TGC_SCALE_H_CD", factor)?;
        let tip = self.v + self.h;
        self.h *= factor;
        self.v = tip - self.h;
        Ok(())
    }

    /// Scale `H` while proportionally adjusting `C`,`D` so the cone's
    /// taper ratio is preserved.
    pub fn scale_h_proportional_cd(&mut self, factor: f64) -> EditResult<()> {
        check_positive("TGC_SCALE_H_V", factor)?;
        self.h *= factor;
        self.c *= factor;
        self.d *= factor;
        Ok(())
    }

    pub fn scale_a(&mut self, factor: f64) -> EditResult<()> {
        check_positive("TGC_SCALE_A", factor)?;
        self.a *= factor;
        Ok(())
    }
    pub fn scale_b(&mut self, factor: f64) -> EditResult<()> {
        check_positive("TGC_SCALE_B", factor)?;
        self.b *= factor;
        Ok(())
    }
    pub fn scale_c(&mut self, factor: f64) -> EditResult<()> {
        check_positive("TGC_SCALE_C", factor)?;
        self.c *= factor;
        Ok(())
    }
    pub fn scale_d(&mut self, factor: f64) -> EditResult<()> {
        check_positive("TGC_SCALE_D", factor)?;
        self.d *= factor;
        Ok(())
    }

    pub fn scale_ab(&mut self, factor: f64) -> EditResult<()> {
        check_positive("TGC_SCALE_AB", factor)?;
        self.a *= factor;
        self.b *= factor;
        Ok(())
    }
    pub fn scale_cd(&mut self, factor: f64) -> EditResult<()> {
        check_positive("TGC_SCALE_CD", factor)?;
        self.c *= factor;
        self.d *= factor;
        Ok(())
    }
    pub fn scale_abcd(&mut self, factor: f64) -> EditResult<()> {
        check_positive("TGC_SCALE_ABCD", factor)?;
        self.a *= factor;
        self.b *= factor;
        self.c *= factor;
        self.d *= factor;
        Ok(())
    }

    /// Rotate `H` by an absolute Euler rotation (degrees) applied to
    /// `original_h`, the direction `H` had when the rotate sub-menu was
    /// entered — the same absolute semantics as the generic engine's
    /// `SROT` (invariant 3 of §8): a repeated call with a different
    /// `euler_deg` replaces the prior rotation rather than compounding
    /// it, since it's always applied to the cached original, not to
    /// the current `H`.
    pub fn rotate_h(&mut self, euler_deg: DVec3, original_h: DVec3) -> EditResult<()> {
        self.h = euler_to_quat(euler_deg) * original_h;
        Ok(())
    }

    /// Rotate the `(A,B,C,D)` plane set by an absolute Euler rotation,
    /// same accumulator discipline as [`Tgc::rotate_h`].
    pub fn rotate_abcd(
        &mut self,
        euler_deg: DVec3,
        original: (DVec3, DVec3, DVec3, DVec3),
    ) -> EditResult<()> {
        let new_rot = euler_to_quat(euler_deg);
        self.a = new_rot * original.0;
        self.b = new_rot * original.1;
        self.c = new_rot * original.2;
        self.d = new_rot * original.3;
        Ok(())
    }

    /// Move the tip (`V+H`) to `target`, re-deriving `A`,`B` so they
    /// stay orthogonal to the new `H` while keeping their magnitudes
    /// (the "hold the shape" move-end-of-H variant).
    pub fn move_h_end_preserve_shape(&mut self, target: DVec3) -> EditResult<()> {
        let new_h = target - self.v;
        if !is_nonzero(new_h, &crate::config::Tol::default()) {
            return Err(EditError::GeometryRejected {
                op: "TGC_MV_H",
                reason: "H would become zero-length",
            });
        }
        let a_mag = self.a.length();
        let b_mag = self.b.length();
        let (new_a, new_b) = orthogonal_basis(new_h, a_mag, b_mag);
        self.h = new_h;
        self.a = new_a;
        self.b = new_b;
        Ok(())
    }

    /// Move the tip to `target`, holding `A`,`B` fixed and simply
    /// recomputing `H` (the "free tip" variant).
    pub fn move_h_end_free(&mut self, target: DVec3) -> EditResult<()> {
        let new_h = target - self.v;
        if !is_nonzero(new_h, &crate::config::Tol::default()) {
            return Err(EditError::GeometryRejected {
                op: "TGC_MV_H_FREE",
                reason: "H would become zero-length",
            });
        }
        self.h = new_h;
        Ok(())
    }

    /// Type invariant: `H`, and the `A`/`B`/`C`/`D` vectors, must all
    /// be non-degenerate.
    pub fn is_valid(&self, tol: &crate::config::Tol) -> bool {
        is_nonzero(self.h, tol)
            && is_nonzero(self.a, tol)
            && is_nonzero(self.b, tol)
            && is_nonzero(self.c, tol)
            && is_nonzero(self.d, tol)
    }
}

fn euler_to_quat(euler_deg: DVec3) -> DQuat {
    DQuat::from_euler(
        glam::EulerRot::XYZ,
        euler_deg.x.to_radians(),
        euler_deg.y.to_radians(),
        euler_deg.z.to_radians(),
    )
}

/// Derive an orthogonal `(a, b)` pair perpendicular to `axis`, each
/// scaled to the requested magnitude, with a stable reference vector
/// so the basis doesn't flip unpredictably near the poles.
fn orthogonal_basis(axis: DVec3, a_mag: f64, b_mag: f64) -> (DVec3, DVec3) {
    let n = axis.normalize();
    let reference = if n.x.abs() < 0.9 { DVec3::X } else { DVec3::Y };
    let a_dir = reference.cross(n).normalize();
    let b_dir = n.cross(a_dir).normalize();
    (a_dir * a_mag, b_dir * b_mag)
}

/// Line-oriented parameter text I/O (§6.2): `Vertex, Height, A, B, C, D`,
/// same "strip to last colon" / CRLF-tolerant shape as
/// [`crate::primitives::scalar::param_io`].
pub mod param_io {
    use super::Tgc;
    use crate::config::Units;
    use crate::error::{EditError, EditResult};
    use glam::DVec3;

    fn fields(line: &str) -> &str {
        match line.rfind(':') {
            Some(idx) => line[idx + 1..].trim(),
            None => line.trim(),
        }
    }

    fn parse_vec3(line: &str, units: &Units, op: &'static str) -> EditResult<DVec3> {
        let nums: Vec<f64> = fields(line)
            .split_whitespace()
            .filter_map(|s| s.parse::<f64>().ok())
            .collect();
        if nums.len() != 3 {
            return Err(EditError::BadArity {
                op,
                expected: "three floats",
                got: nums.len(),
            });
        }
        Ok(DVec3::new(
            units.to_base(nums[0]),
            units.to_base(nums[1]),
            units.to_base(nums[2]),
        ))
    }

    fn non_empty_lines(text: &str) -> impl Iterator<Item = &str> {
        text.lines()
            .map(|l| l.trim_end_matches('\r'))
            .filter(|l| !l.trim().is_empty())
    }

    pub fn write_tgc(t: &Tgc, units: &Units) -> String {
        format!(
            "Vertex: {} {} {}\nHeight: {} {} {}\nA: {} {} {}\nB: {} {} {}\nC: {} {} {}\nD: {} {} {}\n",
            units.to_local(t.v.x), units.to_local(t.v.y), units.to_local(t.v.z),
            units.to_local(t.h.x), units.to_local(t.h.y), units.to_local(t.h.z),
            units.to_local(t.a.x), units.to_local(t.a.y), units.to_local(t.a.z),
            units.to_local(t.b.x), units.to_local(t.b.y), units.to_local(t.b.z),
            units.to_local(t.c.x), units.to_local(t.c.y), units.to_local(t.c.z),
            units.to_local(t.d.x), units.to_local(t.d.y), units.to_local(t.d.z),
        )
    }

    pub fn read_tgc(text: &str, units: &Units) -> EditResult<Tgc> {
        let mut lines = non_empty_lines(text);
        let v = parse_vec3(lines.next().unwrap_or(""), units, "TGC_READ_PARAMS")?;
        let h = parse_vec3(lines.next().unwrap_or(""), units, "TGC_READ_PARAMS")?;
        let a = parse_vec3(lines.next().unwrap_or(""), units, "TGC_READ_PARAMS")?;
        let b = parse_vec3(lines.next().unwrap_or(""), units, "TGC_READ_PARAMS")?;
        let c = parse_vec3(lines.next().unwrap_or(""), units, "TGC_READ_PARAMS")?;
        let d = parse_vec3(lines.next().unwrap_or(""), units, "TGC_READ_PARAMS")?;
        Ok(Tgc { v, h, a, b, c, d })
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::config::Units;

        fn sample() -> Tgc {
            Tgc {
                v: DVec3::new(1.0, 2.0, 3.0),
                h: DVec3::new(0.0, 0.0, 10.0),
                a: DVec3::new(2.0, 0.0, 0.0),
                b: DVec3::new(0.0, 2.0, 0.0),
                c: DVec3::new(1.0, 0.0, 0.0),
                d: DVec3::new(0.0, 1.0, 0.0),
            }
        }

        #[test]
        fn invariant2_round_trip() {
            let units = Units::default();
            let t = sample();
            let text = write_tgc(&t, &units);
            let back = read_tgc(&text, &units).unwrap();
            assert_eq!(back, t);
        }

        #[test]
        fn crlf_line_endings_tolerated() {
            let units = Units::default();
            let text = write_tgc(&sample(), &units).replace('\n', "\r\n");
            assert!(read_tgc(&text, &units).is_ok());
        }

        #[test]
        fn missing_line_is_bad_arity() {
            let units = Units::default();
            assert!(read_tgc("Vertex: 0 0 0\n", &units).is_err());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample() -> Tgc {
        Tgc {
            v: DVec3::ZERO,
            h: DVec3::new(0.0, 0.0, 10.0),
            a: DVec3::new(2.0, 0.0, 0.0),
            b: DVec3::new(0.0, 2.0, 0.0),
            c: DVec3::new(1.0, 0.0, 0.0),
            d: DVec3::new(0.0, 1.0, 0.0),
        }
    }

    #[test]
    fn rotate_then_inverse_restores_h() {
        let mut tgc = sample();
        let original_h = tgc.h;
        tgc.rotate_h(DVec3::new(90.0, 0.0, 0.0), original_h).unwrap();
        tgc.rotate_h(DVec3::ZERO, original_h).unwrap();
        assert_relative_eq!(tgc.h.x, original_h.x, epsilon = 1e-9);
        assert_relative_eq!(tgc.h.y, original_h.y, epsilon = 1e-9);
        assert_relative_eq!(tgc.h.z, original_h.z, epsilon = 1e-9);
    }

    #[test]
    fn scale_h_about_top_keeps_tip_fixed() {
        let mut tgc = sample();
        let tip_before = tgc.v + tgc.h;
        tgc.scale_h_about_top(2.0).unwrap();
        let tip_after = tgc.v + tgc.h;
        assert_relative_eq!(tip_before.x, tip_after.x, epsilon = 1e-9);
        assert_relative_eq!(tip_before.y, tip_after.y, epsilon = 1e-9);
        assert_relative_eq!(tip_before.z, tip_after.z, epsilon = 1e-9);
    }

    #[test]
    fn zero_scale_rejected() {
        let mut tgc = sample();
        assert!(tgc.scale_h(0.0).is_err());
    }
}
