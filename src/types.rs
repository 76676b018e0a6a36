//! Shared type aliases.

use nalgebra::DMatrix;

/// Dynamic row-per-sample matrix of `f64` accepted by the problem
/// constructors and the high-level API (`N×2` for planar data, `N×3` for
/// spatial data).
pub type DataMatrix = DMatrix<f64>;
