//! The "simple scalar editor" template (§4.9): ELL, TOR, PART, ETO,
//! HYP and SUPERELL all expose a menu of independent scalar scales
//! plus uniform scale, each taking exactly one positive scalar and
//! applying the leaf-path scale factor `e_mat[15]` before mutating.

use glam::DVec3;

use crate::config::Tol;
use crate::error::{EditError, EditResult};
use crate::math::is_nonzero;

fn check_positive_scalar(op: &'static str, factor: f64) -> EditResult<()> {
    if factor <= 0.0 {
        return Err(EditError::OutOfRange {
            op,
            value: factor,
            reason: "scale factor must be positive",
        });
    }
    Ok(())
}

/// Ellipsoid: center `v`, three semi-axis vectors `a`, `b`, `c`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ell {
    pub v: DVec3,
    pub a: DVec3,
    pub b: DVec3,
    pub c: DVec3,
}

impl Ell {
    pub fn scale_a(&mut self, factor: f64, leaf_scale: f64) -> EditResult<()> {
        check_positive_scalar("ELL_SCALE_A", factor)?;
        self.a *= factor * leaf_scale;
        Ok(())
    }
    pub fn scale_b(&mut self, factor: f64, leaf_scale: f64) -> EditResult<()> {
        check_positive_scalar("ELL_SCALE_B", factor)?;
        self.b *= factor * leaf_scale;
        Ok(())
    }
    pub fn scale_c(&mut self, factor: f64, leaf_scale: f64) -> EditResult<()> {
        check_positive_scalar("ELL_SCALE_C", factor)?;
        self.c *= factor * leaf_scale;
        Ok(())
    }
    pub fn scale_uniform(&mut self, factor: f64, leaf_scale: f64) -> EditResult<()> {
        check_positive_scalar("ELL_SCALE_ABC", factor)?;
        let f = factor * leaf_scale;
        self.a *= f;
        self.b *= f;
        self.c *= f;
        Ok(())
    }
}

/// Torus: center `v`, axis `h`, major radius `r_a`, minor radius `r_h`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tor {
    pub v: DVec3,
    pub h: DVec3,
    pub r_a: f64,
    pub r_h: f64,
}

impl Tor {
    /// `TOR_R1`: scale the major radius, clamping the minor radius down
    /// if it would otherwise exceed the new major radius (torus
    /// validity requires `r_h <= r_a`).
    pub fn scale_r1(&mut self, factor: f64, leaf_scale: f64) -> EditResult<()> {
        check_positive_scalar("TOR_R1", factor)?;
        self.r_a *= factor * leaf_scale;
        if self.r_h > self.r_a {
            self.r_h = self.r_a;
        }
        Ok(())
    }

    /// `TOR_R2`: scale the minor radius, clamped to the major radius
    /// (spec scenario S2: `r_h = min(r_a, r_h*factor)`).
    pub fn scale_r2(&mut self, factor: f64, leaf_scale: f64) -> EditResult<()> {
        check_positive_scalar("TOR_R2", factor)?;
        let scaled = self.r_h * factor * leaf_scale;
        self.r_h = scaled.min(self.r_a);
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.r_h > 0.0 && self.r_h <= self.r_a
    }
}

/// Particle (PART): base point `v`, axis `h`, radii at base/tip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Part {
    pub v: DVec3,
    pub h: DVec3,
    pub r_v: f64,
    pub r_h: f64,
}

impl Part {
    pub fn scale_rv(&mut self, factor: f64, leaf_scale: f64) -> EditResult<()> {
        check_positive_scalar("PART_SCALE_V", factor)?;
        self.r_v *= factor * leaf_scale;
        Ok(())
    }
    pub fn scale_rh(&mut self, factor: f64, leaf_scale: f64) -> EditResult<()> {
        check_positive_scalar("PART_SCALE_H", factor)?;
        self.r_h *= factor * leaf_scale;
        Ok(())
    }
}

/// Elliptical torus (ETO): center `v`, axis `norm`, major radius `r`,
/// semi-major/minor of the revolved ellipse `c` (vector), `rd`
/// (scalar). Invariant: `rd <= |c|`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Eto {
    pub v: DVec3,
    pub norm: DVec3,
    pub r: f64,
    pub c: DVec3,
    pub rd: f64,
}

impl Eto {
    pub fn scale_r(&mut self, factor: f64, leaf_scale: f64) -> EditResult<()> {
        check_positive_scalar("ETO_SCALE_R", factor)?;
        self.r *= factor * leaf_scale;
        Ok(())
    }

    pub fn scale_c(&mut self, factor: f64, leaf_scale: f64) -> EditResult<()> {
        check_positive_scalar("ETO_SCALE_C", factor)?;
        self.c *= factor * leaf_scale;
        if self.rd > self.c.length() {
            self.rd = self.c.length();
        }
        Ok(())
    }

    pub fn scale_rd(&mut self, factor: f64, leaf_scale: f64, tol: &Tol) -> EditResult<()> {
        check_positive_scalar("ETO_SCALE_RD", factor)?;
        let clen = self.c.length();
        if !is_nonzero(self.c, tol) {
            return Err(EditError::GeometryRejected {
                op: "ETO_SCALE_RD",
                reason: "semi-major vector C is degenerate",
            });
        }
        self.rd = (self.rd * factor * leaf_scale).min(clen);
        Ok(())
    }
}

/// Hyperboloid (HYP): base `v`, axis `h`, semi-major vector `a`,
/// base/top radius ratio `b`, neck-to-base scale `c`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hyp {
    pub v: DVec3,
    pub h: DVec3,
    pub a: DVec3,
    pub b: f64,
    pub c: f64,
}

impl Hyp {
    pub fn scale_a(&mut self, factor: f64, leaf_scale: f64) -> EditResult<()> {
        check_positive_scalar("HYP_SCALE_A", factor)?;
        self.a *= factor * leaf_scale;
        Ok(())
    }
    pub fn scale_b(&mut self, factor: f64, leaf_scale: f64) -> EditResult<()> {
        check_positive_scalar("HYP_SCALE_B", factor)?;
        self.b *= factor * leaf_scale;
        Ok(())
    }
    pub fn scale_h(&mut self, factor: f64, leaf_scale: f64) -> EditResult<()> {
        check_positive_scalar("HYP_SCALE_H", factor)?;
        self.h *= factor * leaf_scale;
        Ok(())
    }
}

/// Superellipsoid (SUPERELL): center `v`, semi-axes `a`,`b`,`c`, and
/// the two shape exponents `n`, `e`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Superell {
    pub v: DVec3,
    pub a: DVec3,
    pub b: DVec3,
    pub c: DVec3,
    pub n: f64,
    pub e: f64,
}

impl Superell {
    pub fn scale_uniform(&mut self, factor: f64, leaf_scale: f64) -> EditResult<()> {
        check_positive_scalar("SUPERELL_SCALE_ABC", factor)?;
        let f = factor * leaf_scale;
        self.a *= f;
        self.b *= f;
        self.c *= f;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn tor_r2_scale_clamps_to_major_radius() {
        let mut t = Tor {
            v: DVec3::ZERO,
            h: DVec3::Z,
            r_a: 10.0,
            r_h: 3.0,
        };
        t.scale_r2(4.0, 1.0).unwrap();
        assert_relative_eq!(t.r_h, 10.0);
        assert!(t.is_valid());
    }

    #[test]
    fn negative_scale_rejected() {
        let mut ell = Ell {
            v: DVec3::ZERO,
            a: DVec3::X,
            b: DVec3::Y,
            c: DVec3::Z,
        };
        assert!(ell.scale_a(-1.0, 1.0).is_err());
    }

    #[test]
    fn eto_rd_clamped_to_c_length() {
        let mut eto = Eto {
            v: DVec3::ZERO,
            norm: DVec3::Z,
            r: 5.0,
            c: DVec3::new(2.0, 0.0, 0.0),
            rd: 1.0,
        };
        eto.scale_rd(10.0, 1.0, &Tol::default()).unwrap();
        assert_relative_eq!(eto.rd, 2.0);
    }
}

/// Line-oriented parameter text I/O (§6.2) for the simple-scalar
/// primitives: one field per line, "strip to last colon" on read,
/// tolerant of CRLF, same shape as [`crate::primitives::arb::param_io`].
pub mod param_io {
    use super::*;
    use crate::config::Units;

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

    pub fn write_ell(e: &Ell, units: &Units) -> String {
        format!(
            "Vertex: {} {} {}\nA: {} {} {}\nB: {} {} {}\nC: {} {} {}\n",
            units.to_local(e.v.x), units.to_local(e.v.y), units.to_local(e.v.z),
            units.to_local(e.a.x), units.to_local(e.a.y), units.to_local(e.a.z),
            units.to_local(e.b.x), units.to_local(e.b.y), units.to_local(e.b.z),
            units.to_local(e.c.x), units.to_local(e.c.y), units.to_local(e.c.z),
        )
    }

    pub fn read_ell(text: &str, units: &Units) -> EditResult<Ell> {
        let mut lines = non_empty_lines(text);
        let v = parse_vec3(lines.next().unwrap_or(""), units, "ELL_READ_PARAMS")?;
        let a = parse_vec3(lines.next().unwrap_or(""), units, "ELL_READ_PARAMS")?;
        let b = parse_vec3(lines.next().unwrap_or(""), units, "ELL_READ_PARAMS")?;
        let c = parse_vec3(lines.next().unwrap_or(""), units, "ELL_READ_PARAMS")?;
        Ok(Ell { v, a, b, c })
    }

    /// `Normal` is re-unitised on read (§6.2).
    pub fn write_tor(t: &Tor, units: &Units) -> String {
        format!(
            "Vertex: {} {} {}\nNormal: {} {} {}\nradius_1: {}\nradius_2: {}\n",
            units.to_local(t.v.x), units.to_local(t.v.y), units.to_local(t.v.z),
            t.h.x, t.h.y, t.h.z,
            units.to_local(t.r_a),
            units.to_local(t.r_h),
        )
    }

    pub fn read_tor(text: &str, units: &Units) -> EditResult<Tor> {
        let mut lines = non_empty_lines(text);
        let v = parse_vec3(lines.next().unwrap_or(""), units, "TOR_READ_PARAMS")?;
        let h_raw = parse_vec3_raw(lines.next().unwrap_or(""), "TOR_READ_PARAMS")?;
        let h = if is_nonzero(h_raw, &crate::config::Tol::default()) {
            h_raw.normalize()
        } else {
            return Err(EditError::GeometryRejected {
                op: "TOR_READ_PARAMS",
                reason: "normal vector is zero-length",
            });
        };
        let r_a = parse_scalar(lines.next().unwrap_or(""), units, "TOR_READ_PARAMS")?;
        let r_h = parse_scalar(lines.next().unwrap_or(""), units, "TOR_READ_PARAMS")?;
        Ok(Tor { v, h, r_a, r_h })
    }

    fn parse_vec3_raw(line: &str, op: &'static str) -> EditResult<DVec3> {
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
        Ok(DVec3::new(nums[0], nums[1], nums[2]))
    }

    fn parse_scalar(line: &str, units: &Units, op: &'static str) -> EditResult<f64> {
        fields(line)
            .split_whitespace()
            .next()
            .and_then(|s| s.parse::<f64>().ok())
            .map(|v| units.to_base(v))
            .ok_or(EditError::BadArity {
                op,
                expected: "one float",
                got: 0,
            })
    }

    /// SUPERELL's final line carries both shape exponents, unscaled
    /// by units (they are dimensionless), as `<n, e>` (§6.2).
    pub fn write_superell(s: &Superell, units: &Units) -> String {
        format!(
            "Vertex: {} {} {}\nA: {} {} {}\nB: {} {} {}\nC: {} {} {}\n<n, e>: {} {}\n",
            units.to_local(s.v.x), units.to_local(s.v.y), units.to_local(s.v.z),
            units.to_local(s.a.x), units.to_local(s.a.y), units.to_local(s.a.z),
            units.to_local(s.b.x), units.to_local(s.b.y), units.to_local(s.b.z),
            units.to_local(s.c.x), units.to_local(s.c.y), units.to_local(s.c.z),
            s.n, s.e,
        )
    }

    pub fn read_superell(text: &str, units: &Units) -> EditResult<Superell> {
        let mut lines = non_empty_lines(text);
        let v = parse_vec3(lines.next().unwrap_or(""), units, "SUPERELL_READ_PARAMS")?;
        let a = parse_vec3(lines.next().unwrap_or(""), units, "SUPERELL_READ_PARAMS")?;
        let b = parse_vec3(lines.next().unwrap_or(""), units, "SUPERELL_READ_PARAMS")?;
        let c = parse_vec3(lines.next().unwrap_or(""), units, "SUPERELL_READ_PARAMS")?;
        let ne_line = lines.next().unwrap_or("");
        let nums: Vec<f64> = fields(ne_line)
            .split_whitespace()
            .filter_map(|s| s.parse::<f64>().ok())
            .collect();
        if nums.len() != 2 {
            return Err(EditError::BadArity {
                op: "SUPERELL_READ_PARAMS",
                expected: "two floats (n, e)",
                got: nums.len(),
            });
        }
        Ok(Superell {
            v,
            a,
            b,
            c,
            n: nums[0],
            e: nums[1],
        })
    }

    pub fn write_part(p: &Part, units: &Units) -> String {
        format!(
            "Vertex: {} {} {}\nHeight: {} {} {}\nradius_v: {}\nradius_h: {}\n",
            units.to_local(p.v.x), units.to_local(p.v.y), units.to_local(p.v.z),
            units.to_local(p.h.x), units.to_local(p.h.y), units.to_local(p.h.z),
            units.to_local(p.r_v),
            units.to_local(p.r_h),
        )
    }

    pub fn read_part(text: &str, units: &Units) -> EditResult<Part> {
        let mut lines = non_empty_lines(text);
        let v = parse_vec3(lines.next().unwrap_or(""), units, "PART_READ_PARAMS")?;
        let h = parse_vec3(lines.next().unwrap_or(""), units, "PART_READ_PARAMS")?;
        let r_v = parse_scalar(lines.next().unwrap_or(""), units, "PART_READ_PARAMS")?;
        let r_h = parse_scalar(lines.next().unwrap_or(""), units, "PART_READ_PARAMS")?;
        Ok(Part { v, h, r_v, r_h })
    }

    /// `Normal` is re-unitised on read, same convention as [`write_tor`]/
    /// [`read_tor`].
    pub fn write_eto(e: &Eto, units: &Units) -> String {
        format!(
            "Vertex: {} {} {}\nNormal: {} {} {}\nradius_1: {}\nC: {} {} {}\nradius_2: {}\n",
            units.to_local(e.v.x), units.to_local(e.v.y), units.to_local(e.v.z),
            e.norm.x, e.norm.y, e.norm.z,
            units.to_local(e.r),
            units.to_local(e.c.x), units.to_local(e.c.y), units.to_local(e.c.z),
            units.to_local(e.rd),
        )
    }

    pub fn read_eto(text: &str, units: &Units) -> EditResult<Eto> {
        let mut lines = non_empty_lines(text);
        let v = parse_vec3(lines.next().unwrap_or(""), units, "ETO_READ_PARAMS")?;
        let norm_raw = parse_vec3_raw(lines.next().unwrap_or(""), "ETO_READ_PARAMS")?;
        let norm = if is_nonzero(norm_raw, &crate::config::Tol::default()) {
            norm_raw.normalize()
        } else {
            return Err(EditError::GeometryRejected {
                op: "ETO_READ_PARAMS",
                reason: "normal vector is zero-length",
            });
        };
        let r = parse_scalar(lines.next().unwrap_or(""), units, "ETO_READ_PARAMS")?;
        let c = parse_vec3(lines.next().unwrap_or(""), units, "ETO_READ_PARAMS")?;
        let rd = parse_scalar(lines.next().unwrap_or(""), units, "ETO_READ_PARAMS")?;
        Ok(Eto { v, norm, r, c, rd })
    }

    /// `b` (base/top radius ratio) and `c` (neck-to-base scale) are
    /// dimensionless and so are not passed through `local2base`/
    /// `base2local`, the same treatment SUPERELL gives its `<n, e>`
    /// exponent pair.
    pub fn write_hyp(h: &Hyp, units: &Units) -> String {
        format!(
            "Vertex: {} {} {}\nHeight: {} {} {}\nA: {} {} {}\nradius_ratio: {}\nneck_scale: {}\n",
            units.to_local(h.v.x), units.to_local(h.v.y), units.to_local(h.v.z),
            units.to_local(h.h.x), units.to_local(h.h.y), units.to_local(h.h.z),
            units.to_local(h.a.x), units.to_local(h.a.y), units.to_local(h.a.z),
            h.b, h.c,
        )
    }

    pub fn read_hyp(text: &str, units: &Units) -> EditResult<Hyp> {
        let mut lines = non_empty_lines(text);
        let v = parse_vec3(lines.next().unwrap_or(""), units, "HYP_READ_PARAMS")?;
        let h = parse_vec3(lines.next().unwrap_or(""), units, "HYP_READ_PARAMS")?;
        let a = parse_vec3(lines.next().unwrap_or(""), units, "HYP_READ_PARAMS")?;
        let b_line = lines.next().unwrap_or("");
        let b = fields(b_line)
            .split_whitespace()
            .next()
            .and_then(|s| s.parse::<f64>().ok())
            .ok_or(EditError::BadArity {
                op: "HYP_READ_PARAMS",
                expected: "one float (radius ratio)",
                got: 0,
            })?;
        let c_line = lines.next().unwrap_or("");
        let c = fields(c_line)
            .split_whitespace()
            .next()
            .and_then(|s| s.parse::<f64>().ok())
            .ok_or(EditError::BadArity {
                op: "HYP_READ_PARAMS",
                expected: "one float (neck scale)",
                got: 0,
            })?;
        Ok(Hyp { v, h, a, b, c })
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use approx::assert_relative_eq;

        #[test]
        fn invariant2_ell_round_trip() {
            let e = Ell {
                v: DVec3::new(1.0, 2.0, 3.0),
                a: DVec3::new(4.0, 0.0, 0.0),
                b: DVec3::new(0.0, 5.0, 0.0),
                c: DVec3::new(0.0, 0.0, 6.0),
            };
            let units = Units::new(25.4);
            let text = write_ell(&e, &units);
            let back = read_ell(&text, &units).unwrap();
            assert_relative_eq!(e.v.x, back.v.x, epsilon = 1e-6);
            assert_relative_eq!(e.c.z, back.c.z, epsilon = 1e-6);
        }

        #[test]
        fn tor_normal_is_unitised_on_read() {
            let units = Units::default();
            let text = "Vertex: 0 0 0\nNormal: 0 0 5\nradius_1: 10\nradius_2: 3\n";
            let tor = read_tor(text, &units).unwrap();
            assert_relative_eq!(tor.h.length(), 1.0, epsilon = 1e-9);
        }

        #[test]
        fn superell_round_trip_preserves_exponents() {
            let s = Superell {
                v: DVec3::ZERO,
                a: DVec3::X,
                b: DVec3::Y,
                c: DVec3::Z,
                n: 2.5,
                e: 1.2,
            };
            let units = Units::default();
            let text = write_superell(&s, &units);
            let back = read_superell(&text, &units).unwrap();
            assert_relative_eq!(s.n, back.n);
            assert_relative_eq!(s.e, back.e);
        }

        #[test]
        fn crlf_line_endings_tolerated() {
            let units = Units::default();
            let text = "Vertex: 0 0 0\r\nA: 1 0 0\r\nB: 0 1 0\r\nC: 0 0 1\r\n";
            assert!(read_ell(text, &units).is_ok());
        }

        #[test]
        fn invariant2_eto_round_trip() {
            let e = Eto {
                v: DVec3::new(1.0, -2.0, 3.0),
                norm: DVec3::Z,
                r: 5.0,
                c: DVec3::new(2.0, 0.0, 0.0),
                rd: 1.5,
            };
            let units = Units::new(25.4);
            let text = write_eto(&e, &units);
            let back = read_eto(&text, &units).unwrap();
            assert_relative_eq!(e.v.x, back.v.x, epsilon = 1e-6);
            assert_relative_eq!(e.norm.z, back.norm.z, epsilon = 1e-9);
            assert_relative_eq!(e.r, back.r, epsilon = 1e-6);
            assert_relative_eq!(e.c.x, back.c.x, epsilon = 1e-6);
            assert_relative_eq!(e.rd, back.rd, epsilon = 1e-6);
        }

        #[test]
        fn invariant2_hyp_round_trip() {
            let h = Hyp {
                v: DVec3::new(0.0, 0.0, 0.0),
                h: DVec3::new(0.0, 0.0, 10.0),
                a: DVec3::new(3.0, 0.0, 0.0),
                b: 0.5,
                c: 0.25,
            };
            let units = Units::new(25.4);
            let text = write_hyp(&h, &units);
            let back = read_hyp(&text, &units).unwrap();
            assert_relative_eq!(h.v.x, back.v.x, epsilon = 1e-6);
            assert_relative_eq!(h.h.z, back.h.z, epsilon = 1e-6);
            assert_relative_eq!(h.a.x, back.a.x, epsilon = 1e-6);
            assert_relative_eq!(h.b, back.b, epsilon = 1e-9);
            assert_relative_eq!(h.c, back.c, epsilon = 1e-9);
        }

        #[test]
        fn eto_normal_is_unitised_on_read() {
            let units = Units::default();
            let text = "Vertex: 0 0 0\nNormal: 0 0 5\nradius_1: 10\nC: 2 0 0\nradius_2: 1\n";
            let eto = read_eto(text, &units).unwrap();
            assert_relative_eq!(eto.norm.length(), 1.0, epsilon = 1e-9);
        }
    }
}
