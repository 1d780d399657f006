//! Metaball editor (§4.7): a linked list of control points, each with
//! a position, a field-strength scale, and a "goo" (blending) factor.

use glam::DVec3;

use crate::error::{EditError, EditResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderMethod {
    Metaball,
    Isopotential,
    Blob,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetaballPoint {
    pub pos: DVec3,
    pub field_strength: f64,
    pub goo: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Metaball {
    pub threshold: f64,
    pub method: RenderMethod,
    pub points: Vec<MetaballPoint>,
    /// Index of the currently selected control point, if any.
    pub selected: Option<usize>,
}

impl Metaball {
    pub fn set_threshold(&mut self, threshold: f64) -> EditResult<()> {
        if threshold <= 0.0 {
            return Err(EditError::OutOfRange {
                op: "MBALL_THRESHOLD",
                value: threshold,
                reason: "threshold must be positive",
            });
        }
        self.threshold = threshold;
        Ok(())
    }

    pub fn set_method(&mut self, method: RenderMethod) {
        self.method = method;
    }

    pub fn pick(&mut self, ray_origin: DVec3, ray_dir: DVec3) -> Option<usize> {
        let d = ray_dir.normalize_or_zero();
        let mut best: Option<(usize, f64)> = None;
        for (i, p) in self.points.iter().enumerate() {
            let to_p = p.pos - ray_origin;
            let along = to_p.dot(d);
            let closest = ray_origin + d * along;
            let dist = (p.pos - closest).length();
            if best.map(|(_, bd)| dist < bd).unwrap_or(true) {
                best = Some((i, dist));
            }
        }
        self.selected = best.map(|(i, _)| i);
        self.selected
    }

    pub fn next(&mut self) {
        if self.points.is_empty() {
            self.selected = None;
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) => (i + 1) % self.points.len(),
            None => 0,
        });
    }

    pub fn prev(&mut self) {
        if self.points.is_empty() {
            self.selected = None;
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) => (i + self.points.len() - 1) % self.points.len(),
            None => 0,
        });
    }

    fn selected_mut(&mut self, op: &'static str) -> EditResult<&mut MetaballPoint> {
        let i = self.selected.ok_or(EditError::MissingSelection {
            op,
            selection: "control point",
        })?;
        self.points.get_mut(i).ok_or(EditError::MissingSelection {
            op,
            selection: "control point",
        })
    }

    pub fn move_selected(&mut self, target: DVec3) -> EditResult<()> {
        self.selected_mut("MBALL_MOVE")?.pos = target;
        Ok(())
    }

    pub fn scale_field_strength(&mut self, factor: f64) -> EditResult<()> {
        if factor <= 0.0 {
            return Err(EditError::OutOfRange {
                op: "MBALL_SCALE_FLD",
                value: factor,
                reason: "scale factor must be positive",
            });
        }
        self.selected_mut("MBALL_SCALE_FLD")?.field_strength *= factor;
        Ok(())
    }

    pub fn scale_goo(&mut self, factor: f64) -> EditResult<()> {
        if factor <= 0.0 {
            return Err(EditError::OutOfRange {
                op: "MBALL_SCALE_GOO",
                value: factor,
                reason: "scale factor must be positive",
            });
        }
        self.selected_mut("MBALL_SCALE_GOO")?.goo *= factor;
        Ok(())
    }

    /// Insert a new point after the current one (§4.7); becomes the
    /// new selection.
    pub fn add(&mut self, point: MetaballPoint) {
        let insert_at = self.selected.map(|i| i + 1).unwrap_or(self.points.len());
        self.points.insert(insert_at, point);
        self.selected = Some(insert_at);
    }

    /// Deleting the last point is permitted but leaves an empty
    /// metaball with a warning rather than an error (§4.7) — the
    /// caller is expected to log the warning via `tracing::warn!`.
    pub fn delete_selected(&mut self) -> EditResult<()> {
        let i = self.selected.ok_or(EditError::MissingSelection {
            op: "MBALL_DELETE",
            selection: "control point",
        })?;
        self.points.remove(i);
        self.selected = if self.points.is_empty() {
            tracing::warn!("metaball has no remaining control points");
            None
        } else {
            Some(i.min(self.points.len() - 1))
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Metaball {
        Metaball {
            threshold: 1.0,
            method: RenderMethod::Metaball,
            points: vec![
                MetaballPoint {
                    pos: DVec3::ZERO,
                    field_strength: 1.0,
                    goo: 1.0,
                },
                MetaballPoint {
                    pos: DVec3::X,
                    field_strength: 1.0,
                    goo: 1.0,
                },
            ],
            selected: Some(0),
        }
    }

    #[test]
    fn delete_last_point_leaves_empty_with_no_error() {
        let mut mb = sample();
        mb.points.truncate(1);
        mb.selected = Some(0);
        mb.delete_selected().unwrap();
        assert!(mb.points.is_empty());
        assert!(mb.selected.is_none());
    }

    #[test]
    fn add_inserts_after_current_and_selects_it() {
        let mut mb = sample();
        mb.add(MetaballPoint {
            pos: DVec3::Y,
            field_strength: 2.0,
            goo: 0.5,
        });
        assert_eq!(mb.selected, Some(1));
        assert_eq!(mb.points[1].pos, DVec3::Y);
    }

    #[test]
    fn scale_without_selection_rejected() {
        let mut mb = sample();
        mb.selected = None;
        assert!(mb.scale_goo(2.0).is_err());
    }
}
