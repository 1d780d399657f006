//! The scripting-level command surface (§6.3): small line commands a
//! host's command interpreter forwards verbatim, parsed here into the
//! same [`crate::dispatch::ArbOp`] values the menu/mouse path produces.
//! Kept separate from [`crate::dispatch`] because these are *text*
//! entry points with their own argument-count and parse-failure modes,
//! not a primitive's geometric sub-operation itself.

use glam::DVec3;

use crate::error::{EditError, EditResult};

/// `f_eqn A B C` — set a face's plane normal to `(A, B, C)` during ARB
/// face rotation; `D` is filled in by the caller as `normal . fixv`
/// (the plane must still pass through the fixed vertex).
pub fn parse_f_eqn(args: &str) -> EditResult<DVec3> {
    let nums = parse_floats(args, "F_EQN")?;
    if nums.len() != 3 {
        return Err(EditError::BadArity {
            op: "F_EQN",
            expected: "three floats (A B C)",
            got: nums.len(),
        });
    }
    let normal = DVec3::new(nums[0], nums[1], nums[2]);
    if normal.length_squared() < 1e-18 {
        return Err(EditError::GeometryRejected {
            op: "F_EQN",
            reason: "plane normal is zero-length",
        });
    }
    Ok(normal.normalize())
}

/// The two forms `edgedir` accepts (§6.3).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeDir {
    /// `edgedir dx dy dz` — explicit direction vector.
    Direction(DVec3),
    /// `edgedir rot fb` — rotation/fallback angle pair (degrees),
    /// converted to a direction the way the source's `edgedir`
    /// command does: azimuth `rot` about Z, elevation `fb` above the
    /// XY plane.
    RotFallback { rot_deg: f64, fb_deg: f64 },
}

impl EdgeDir {
    /// Resolve to a direction vector, independent of which form was
    /// supplied.
    pub fn to_direction(self) -> DVec3 {
        match self {
            EdgeDir::Direction(d) => d,
            EdgeDir::RotFallback { rot_deg, fb_deg } => {
                let rot = rot_deg.to_radians();
                let fb = fb_deg.to_radians();
                DVec3::new(
                    fb.cos() * rot.cos(),
                    fb.cos() * rot.sin(),
                    fb.sin(),
                )
            }
        }
    }
}

/// `edgedir dx dy dz | rot fb` — set the edge direction vector during
/// ARB edge move, either directly or via a rotation/fallback pair.
pub fn parse_edgedir(args: &str) -> EditResult<EdgeDir> {
    let nums = parse_floats(args, "EDGEDIR")?;
    match nums.len() {
        3 => {
            let d = DVec3::new(nums[0], nums[1], nums[2]);
            if d.length_squared() < 1e-18 {
                return Err(EditError::GeometryRejected {
                    op: "EDGEDIR",
                    reason: "edge direction is zero-length",
                });
            }
            Ok(EdgeDir::Direction(d))
        }
        2 => Ok(EdgeDir::RotFallback {
            rot_deg: nums[0],
            fb_deg: nums[1],
        }),
        n => Err(EditError::BadArity {
            op: "EDGEDIR",
            expected: "three floats (dx dy dz) or two (rot fb)",
            got: n,
        }),
    }
}

/// `extrude(face, dist)`.
pub fn parse_extrude(args: &str) -> EditResult<(usize, f64)> {
    let nums = parse_floats(args, "EXTRUDE")?;
    if nums.len() != 2 {
        return Err(EditError::BadArity {
            op: "EXTRUDE",
            expected: "two floats (face dist)",
            got: nums.len(),
        });
    }
    Ok((nums[0] as usize, nums[1]))
}

/// `permute(encoded_vertex_order)` — an 8-digit string, one digit
/// (0-7) per destination slot, the legacy source's encoding of the
/// new vertex order as a single token.
pub fn parse_permute(args: &str) -> EditResult<[usize; 8]> {
    let token = args.trim();
    if token.len() != 8 || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(EditError::BadArity {
            op: "PERMUTE",
            expected: "an 8-digit vertex order string",
            got: token.len(),
        });
    }
    let mut order = [0usize; 8];
    for (i, b) in token.bytes().enumerate() {
        order[i] = (b - b'0') as usize;
    }
    Ok(order)
}

/// `mirror_face_axis(face, axis)` — `axis` is `x`, `y` or `z`.
pub fn parse_mirror_face_axis(args: &str) -> EditResult<(usize, usize)> {
    let mut parts = args.split_whitespace();
    let face: usize = parts
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or(EditError::BadArity {
            op: "MIRROR_FACE_AXIS",
            expected: "face index then axis letter",
            got: 0,
        })?;
    let axis = match parts.next() {
        Some("x") | Some("X") => 0,
        Some("y") | Some("Y") => 1,
        Some("z") | Some("Z") => 2,
        _ => {
            return Err(EditError::OutOfRange {
                op: "MIRROR_FACE_AXIS",
                value: -1.0,
                reason: "axis must be one of x, y, z",
            })
        }
    };
    Ok((face, axis))
}

fn parse_floats(args: &str, op: &'static str) -> EditResult<Vec<f64>> {
    args.split_whitespace()
        .map(|s| {
            s.parse::<f64>().map_err(|_| EditError::BadArity {
                op,
                expected: "numeric arguments",
                got: 0,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn f_eqn_normalizes_and_rejects_zero() {
        let n = parse_f_eqn("0 0 5").unwrap();
        assert_relative_eq!(n.length(), 1.0, epsilon = 1e-9);
        assert!(parse_f_eqn("0 0 0").is_err());
    }

    #[test]
    fn edgedir_accepts_both_forms() {
        assert!(matches!(
            parse_edgedir("1 0 0").unwrap(),
            EdgeDir::Direction(_)
        ));
        assert!(matches!(
            parse_edgedir("45 30").unwrap(),
            EdgeDir::RotFallback { .. }
        ));
        assert!(parse_edgedir("1 2 3 4").is_err());
    }

    #[test]
    fn rot_fallback_zero_elevation_is_horizontal() {
        let d = EdgeDir::RotFallback {
            rot_deg: 0.0,
            fb_deg: 0.0,
        }
        .to_direction();
        assert_relative_eq!(d.x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(d.z, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn permute_requires_eight_digits() {
        assert!(parse_permute("01234567").is_ok());
        assert!(parse_permute("0123").is_err());
    }

    #[test]
    fn mirror_face_axis_parses_letter() {
        let (face, axis) = parse_mirror_face_axis("2 y").unwrap();
        assert_eq!(face, 2);
        assert_eq!(axis, 1);
    }
}
