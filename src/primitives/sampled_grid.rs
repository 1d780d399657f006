//! Shared editor for the file-backed sampled-grid primitives — EBM
//! (extruded bitmap), VOL (voxel volume), DSP (displacement map) and
//! HF (height field) (§4.8). These are the only primitives whose
//! editing touches the filesystem: validating that a data file exists
//! and is large enough for the requested dimensions, via `stat`
//! (§9 — "the only blocking I/O in the core").

use std::fs;
use std::path::{Path, PathBuf};

use glam::DVec3;

use crate::error::{EditError, EditResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridKind {
    Ebm,
    Vol,
    Dsp,
    Hf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SampledGrid {
    pub kind: GridKind,
    pub file: PathBuf,
    /// Cell counts along each sampled axis (X, Y, and Z for VOL; X, Y
    /// only for EBM/DSP/HF, where the third entry is unused).
    pub dims: [u32; 3],
    /// Bytes per sample (1 for EBM/DSP's typical `unsigned char`
    /// grids, more for wider formats).
    pub bytes_per_sample: u32,
    /// Per-axis cell size.
    pub cell_size: DVec3,
    /// DSP/HF extrusion height or per-axis scale factor; unused for
    /// EBM/VOL.
    pub extrude_scale: f64,
}

fn required_bytes(dims: [u32; 3], bytes_per_sample: u32, kind: GridKind) -> u64 {
    let (x, y, z) = (dims[0] as u64, dims[1] as u64, dims[2] as u64);
    let cells = match kind {
        GridKind::Vol => x * y * z,
        _ => x * y,
    };
    cells * bytes_per_sample as u64
}

impl SampledGrid {
    /// Validate that `path` exists and is large enough for the
    /// current dimensions, then adopt it as the data source.
    pub fn set_filename(&mut self, path: impl AsRef<Path>) -> EditResult<()> {
        let path = path.as_ref();
        let meta = fs::metadata(path).map_err(|e| EditError::MissingResource {
            op: "GRID_SET_FILE",
            reason: format!("cannot stat {}: {e}", path.display()),
        })?;
        let needed = required_bytes(self.dims, self.bytes_per_sample, self.kind);
        if meta.len() < needed {
            return Err(EditError::MissingResource {
                op: "GRID_SET_FILE",
                reason: format!(
                    "{} is {} bytes, need at least {needed} for the current dimensions",
                    path.display(),
                    meta.len()
                ),
            });
        }
        self.file = path.to_path_buf();
        Ok(())
    }

    /// Change the grid dimensions, validating the *existing* file is
    /// still large enough for the new, larger dimension product
    /// before committing — the operation is idempotent on rejection
    /// (§4.8).
    pub fn set_dims(&mut self, dims: [u32; 3]) -> EditResult<()> {
        if self.file.as_os_str().is_empty() {
            self.dims = dims;
            return Ok(());
        }
        let meta = fs::metadata(&self.file).map_err(|e| EditError::MissingResource {
            op: "GRID_SET_DIMS",
            reason: format!("cannot stat {}: {e}", self.file.display()),
        })?;
        let needed = required_bytes(dims, self.bytes_per_sample, self.kind);
        if meta.len() < needed {
            return Err(EditError::MissingResource {
                op: "GRID_SET_DIMS",
                reason: format!(
                    "{} is {} bytes, too small for dimensions {:?}",
                    self.file.display(),
                    meta.len(),
                    dims
                ),
            });
        }
        self.dims = dims;
        Ok(())
    }

    pub fn set_cell_size(&mut self, size: DVec3) -> EditResult<()> {
        if size.x <= 0.0 || size.y <= 0.0 || size.z <= 0.0 {
            return Err(EditError::OutOfRange {
                op: "GRID_SET_CELL_SIZE",
                value: size.min_element(),
                reason: "cell size components must be positive",
            });
        }
        self.cell_size = size;
        Ok(())
    }

    /// DSP/HF extrusion height, or per-axis scale for DSP variants
    /// that use one (§4.8).
    pub fn set_extrude_scale(&mut self, scale: f64) -> EditResult<()> {
        if scale <= 0.0 {
            return Err(EditError::OutOfRange {
                op: "GRID_SET_EXTRUDE",
                value: scale,
                reason: "extrude scale must be positive",
            });
        }
        self.extrude_scale = scale;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn grid() -> SampledGrid {
        SampledGrid {
            kind: GridKind::Ebm,
            file: PathBuf::new(),
            dims: [4, 4, 1],
            bytes_per_sample: 1,
            cell_size: DVec3::ONE,
            extrude_scale: 1.0,
        }
    }

    #[test]
    fn set_filename_rejects_too_small_file() {
        let mut g = grid();
        let mut tmp = std::env::temp_dir();
        tmp.push("solid_edit_test_small.bin");
        {
            let mut f = fs::File::create(&tmp).unwrap();
            f.write_all(&[0u8; 4]).unwrap(); // need 4*4=16 bytes
        }
        let err = g.set_filename(&tmp).unwrap_err();
        assert!(matches!(err, EditError::MissingResource { .. }));
        let _ = fs::remove_file(&tmp);
    }

    #[test]
    fn set_filename_accepts_large_enough_file() {
        let mut g = grid();
        let mut tmp = std::env::temp_dir();
        tmp.push("solid_edit_test_ok.bin");
        {
            let mut f = fs::File::create(&tmp).unwrap();
            f.write_all(&[0u8; 16]).unwrap();
        }
        g.set_filename(&tmp).unwrap();
        assert_eq!(g.file, tmp);
        let _ = fs::remove_file(&tmp);
    }

    #[test]
    fn missing_file_rejected() {
        let mut g = grid();
        assert!(g.set_filename("/nonexistent/path/for/solid_edit").is_err());
    }
}
