//! Periodic mesh and solution point layout
//!
//! A [`Mesh`] is the ordered list of cell boundaries `x_0 < x_1 < … < x_N` of a
//! periodic domain of length `x_N - x_0`. A [`SolutionPointLayout`] places `p`
//! Chebyshev-Gauss nodes in every cell through the affine map
//!
//! ```text
//! x = x_i + (x_{i+1} - x_i) (ξ + 1) / 2        ξ ∈ [-1, 1]
//! ```
//!
//! giving `n = p · N` points stored cell by cell. Both are immutable once built.

use std::fmt;

use crate::error::{PieError, PieResult};
use crate::linalg::chebyshev_nodes;

// =================================================================================================
// Mesh
// =================================================================================================

/// Cell boundaries of a periodic 1D domain
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    boundaries: Vec<f64>,
}

impl Mesh {
    /// Build a mesh from its cell boundaries
    ///
    /// # Errors
    ///
    /// `InvalidMesh` when fewer than two boundaries are given, when a value is
    /// not finite or when the sequence is not strictly increasing.
    pub fn new(boundaries: Vec<f64>) -> PieResult<Self> {
        if boundaries.len() < 2 {
            return Err(PieError::InvalidMesh {
                reason: format!(
                    "at least one cell (two boundaries) required, got {} boundaries",
                    boundaries.len()
                ),
            });
        }
        if let Some(x) = boundaries.iter().find(|x| !x.is_finite()) {
            return Err(PieError::InvalidMesh {
                reason: format!("non-finite boundary {x}"),
            });
        }
        if let Some(i) = boundaries.windows(2).position(|w| w[1] <= w[0]) {
            return Err(PieError::InvalidMesh {
                reason: format!(
                    "boundaries must be strictly increasing: x[{}] = {} >= x[{}] = {}",
                    i,
                    boundaries[i],
                    i + 1,
                    boundaries[i + 1]
                ),
            });
        }
        Ok(Self { boundaries })
    }

    /// `n_cells` cells of equal width on `[start, end]`
    ///
    /// # Errors
    ///
    /// `InvalidMesh` when `n_cells == 0` or `end <= start`.
    pub fn uniform(start: f64, end: f64, n_cells: usize) -> PieResult<Self> {
        if n_cells == 0 {
            return Err(PieError::InvalidMesh {
                reason: "at least one cell required".to_string(),
            });
        }
        let width = (end - start) / n_cells as f64;
        let mut boundaries: Vec<f64> = (0..n_cells).map(|i| start + i as f64 * width).collect();
        boundaries.push(end);
        Self::new(boundaries)
    }

    /// Cell boundaries
    pub fn boundaries(&self) -> &[f64] {
        &self.boundaries
    }

    /// Number of cells
    pub fn n_cells(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// First boundary
    pub fn start(&self) -> f64 {
        self.boundaries[0]
    }

    /// Last boundary
    pub fn end(&self) -> f64 {
        self.boundaries[self.boundaries.len() - 1]
    }

    /// Period of the domain
    pub fn length(&self) -> f64 {
        self.end() - self.start()
    }

    /// Width of cell `i`
    pub fn cell_width(&self, i: usize) -> f64 {
        self.boundaries[i + 1] - self.boundaries[i]
    }
}

// =================================================================================================
// Solution point layout
// =================================================================================================

/// Solution points of every cell, cell-major
#[derive(Debug, Clone, PartialEq)]
pub struct SolutionPointLayout {
    mesh: Mesh,
    points_per_cell: usize,
    reference: Vec<f64>,
    coordinates: Vec<f64>,
}

impl SolutionPointLayout {
    /// Place `points_per_cell` Chebyshev-Gauss nodes in every cell of `mesh`
    ///
    /// # Errors
    ///
    /// `InvalidPointCount` when `points_per_cell == 0`.
    pub fn new(mesh: Mesh, points_per_cell: usize) -> PieResult<Self> {
        if points_per_cell == 0 {
            return Err(PieError::InvalidPointCount {
                requested: points_per_cell,
            });
        }
        let reference = chebyshev_nodes(points_per_cell);

        let mut coordinates = Vec::with_capacity(points_per_cell * mesh.n_cells());
        for cell in 0..mesh.n_cells() {
            let left = mesh.boundaries()[cell];
            let width = mesh.cell_width(cell);
            coordinates.extend(reference.iter().map(|xi| left + width * (xi + 1.0) / 2.0));
        }

        Ok(Self {
            mesh,
            points_per_cell,
            reference,
            coordinates,
        })
    }

    /// Underlying mesh
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// `p`
    pub fn points_per_cell(&self) -> usize {
        self.points_per_cell
    }

    /// `n = p · n_cells`
    pub fn n_points(&self) -> usize {
        self.coordinates.len()
    }

    /// Reference nodes in `[-1, 1]`
    pub fn reference_points(&self) -> &[f64] {
        &self.reference
    }

    /// Physical coordinates of all solution points
    pub fn coordinates(&self) -> &[f64] {
        &self.coordinates
    }

    /// Smallest and largest distance between consecutive solution points,
    /// including the periodic wrap from the last point to the first
    pub fn spacing(&self) -> (f64, f64) {
        let (Some(first), Some(last)) = (self.coordinates.first(), self.coordinates.last()) else {
            let length = self.mesh.length();
            return (length, length);
        };
        let wrap = first + self.mesh.length() - last;
        self.coordinates
            .windows(2)
            .map(|w| w[1] - w[0])
            .fold((wrap, wrap), |(min, max), dx| (min.min(dx), max.max(dx)))
    }

    /// True when all consecutive spacings agree to 1e-10 relative
    pub fn is_uniform(&self) -> bool {
        let (min, max) = self.spacing();
        (1.0 - max / min).abs() < 1e-10
    }

    /// CFL number `max(|speed|, |diffusion| / dx_min) · dt / dx_min`
    pub fn cfl_number(&self, speed: f64, diffusion: f64, dt: f64) -> f64 {
        let (dx_min, _) = self.spacing();
        speed.abs().max(diffusion.abs() / dx_min) * dt / dx_min
    }

    /// Time step giving the requested CFL number
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` when `cfl` is not positive or when both the
    /// speed and the diffusion vanish.
    pub fn time_step(&self, cfl: f64, speed: f64, diffusion: f64) -> PieResult<f64> {
        let (dx_min, _) = self.spacing();
        let rate = speed.abs().max(diffusion.abs() / dx_min);
        if !(cfl > 0.0) || rate == 0.0 {
            return Err(PieError::InvalidConfiguration {
                reason: format!(
                    "cannot derive a time step from cfl = {cfl}, speed = {speed}, diffusion = {diffusion}"
                ),
            });
        }
        Ok(cfl * dx_min / rate)
    }
}

impl fmt::Display for SolutionPointLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "on [{}, {}] (periodic)", self.mesh.start(), self.mesh.end())?;
        let (dx_min, dx_max) = self.spacing();
        if self.is_uniform() {
            writeln!(f, "dx = {dx_min:.3E}")?;
        } else {
            writeln!(f, "dx_min = {dx_min:.3E}, dx_max = {dx_max:.3E}")?;
        }
        write!(
            f,
            "n_cell = {}, n_pts = {}, p = {}",
            self.mesh.n_cells(),
            self.n_points(),
            self.points_per_cell
        )
    }
}

// =================================================================================================
// Tests
// =================================================================================================
