//! Single-level 2D Haar wavelet transform.
//!
//! Rows are transformed first (pair averages in the left half, pair
//! half-differences in the right half), then columns of that intermediate.
//! No rounding is applied, so `inverse(forward(m))` reproduces `m` up to
//! floating-point error.

use crate::config::SubBand;
use crate::transform::{DwtError, Matrix};

/// The four half-resolution sub-bands of one decomposition level.
///
/// `hl` holds the vertical half-differences of the row averages, `lh` the
/// vertical averages of the row half-differences.
#[derive(Debug, Clone, PartialEq)]
pub struct SubBands {
    pub ll: Matrix,
    pub lh: Matrix,
    pub hl: Matrix,
    pub hh: Matrix,
}

impl SubBands {
    pub fn band(&self, band: SubBand) -> &Matrix {
        match band {
            SubBand::LH => &self.lh,
            SubBand::HL => &self.hl,
            SubBand::HH => &self.hh,
        }
    }

    pub fn band_mut(&mut self, band: SubBand) -> &mut Matrix {
        match band {
            SubBand::LH => &mut self.lh,
            SubBand::HL => &mut self.hl,
            SubBand::HH => &mut self.hh,
        }
    }
}

/// Forward transform. Fails if either dimension is odd.
pub fn forward(m: &Matrix) -> Result<SubBands, DwtError> {
    let (rows, cols) = (m.rows(), m.cols());
    if rows % 2 != 0 || cols % 2 != 0 {
        return Err(DwtError::OddDimensions { rows, cols });
    }
    let (half_r, half_c) = (rows / 2, cols / 2);

    let mut temp = Matrix::zeros(rows, cols);
    for r in 0..rows {
        for c in 0..half_c {
            let a = m.get(r, 2 * c);
            let b = m.get(r, 2 * c + 1);
            temp.set(r, c, (a + b) / 2.0);
            temp.set(r, c + half_c, (a - b) / 2.0);
        }
    }

    let mut bands = SubBands {
        ll: Matrix::zeros(half_r, half_c),
        lh: Matrix::zeros(half_r, half_c),
        hl: Matrix::zeros(half_r, half_c),
        hh: Matrix::zeros(half_r, half_c),
    };
    for r in 0..half_r {
        for c in 0..half_c {
            let a = temp.get(2 * r, c);
            let b = temp.get(2 * r + 1, c);
            bands.ll.set(r, c, (a + b) / 2.0);
            bands.hl.set(r, c, (a - b) / 2.0);

            let a = temp.get(2 * r, c + half_c);
            let b = temp.get(2 * r + 1, c + half_c);
            bands.lh.set(r, c, (a + b) / 2.0);
            bands.hh.set(r, c, (a - b) / 2.0);
        }
    }

    Ok(bands)
}

/// Inverse transform. All four sub-bands must share one shape.
pub fn inverse(bands: &SubBands) -> Result<Matrix, DwtError> {
    let SubBands { ll, lh, hl, hh } = bands;
    if !(ll.same_shape(lh) && ll.same_shape(hl) && ll.same_shape(hh)) {
        return Err(DwtError::ShapeMismatch(format!(
            "LL {}x{}, LH {}x{}, HL {}x{}, HH {}x{}",
            ll.rows(),
            ll.cols(),
            lh.rows(),
            lh.cols(),
            hl.rows(),
            hl.cols(),
            hh.rows(),
            hh.cols()
        )));
    }
    let (half_r, half_c) = (ll.rows(), ll.cols());
    let (rows, cols) = (half_r * 2, half_c * 2);

    let mut temp = Matrix::zeros(rows, cols);
    for r in 0..half_r {
        for c in 0..half_c {
            temp.set(2 * r, c, ll.get(r, c) + hl.get(r, c));
            temp.set(2 * r + 1, c, ll.get(r, c) - hl.get(r, c));
            temp.set(2 * r, c + half_c, lh.get(r, c) + hh.get(r, c));
            temp.set(2 * r + 1, c + half_c, lh.get(r, c) - hh.get(r, c));
        }
    }

    let mut m = Matrix::zeros(rows, cols);
    for r in 0..rows {
        for c in 0..half_c {
            let avg = temp.get(r, c);
            let diff = temp.get(r, c + half_c);
            m.set(r, 2 * c, avg + diff);
            m.set(r, 2 * c + 1, avg - diff);
        }
    }

    Ok(m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn assert_close(a: &Matrix, b: &Matrix) {
        assert!(a.same_shape(b));
        for (x, y) in a.as_slice().iter().zip(b.as_slice()) {
            assert!((x - y).abs() < 1e-10, "{x} != {y}");
        }
    }

    #[test]
    fn test_2x2_known_values() {
        let m = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let bands = forward(&m).unwrap();
        assert_eq!(bands.ll.as_slice(), &[2.5]);
        assert_eq!(bands.hl.as_slice(), &[-1.0]);
        assert_eq!(bands.lh.as_slice(), &[-0.5]);
        assert_eq!(bands.hh.as_slice(), &[0.0]);
    }

    #[test]
    fn test_band_shapes() {
        for n in [2usize, 4, 8] {
            let m = Matrix::from_vec(n, n, (0..n * n).map(|v| v as f64).collect()).unwrap();
            let bands = forward(&m).unwrap();
            for band in [&bands.ll, &bands.lh, &bands.hl, &bands.hh] {
                assert_eq!((band.rows(), band.cols()), (n / 2, n / 2));
            }
        }
    }

    #[test]
    fn test_constant_matrix_has_no_detail() {
        let m = Matrix::from_vec(4, 4, vec![5.0; 16]).unwrap();
        let bands = forward(&m).unwrap();
        assert!(bands.ll.as_slice().iter().all(|&v| v == 5.0));
        for band in [&bands.lh, &bands.hl, &bands.hh] {
            assert!(band.as_slice().iter().all(|&v| v == 0.0));
        }
    }

    #[test]
    fn test_odd_dimensions_rejected() {
        let m = Matrix::zeros(3, 4);
        assert_eq!(
            forward(&m),
            Err(DwtError::OddDimensions { rows: 3, cols: 4 })
        );
        assert!(forward(&Matrix::zeros(4, 5)).is_err());
    }

    #[test]
    fn test_rectangular_roundtrip() {
        let data: Vec<f64> = (0..6 * 10).map(|v| ((v * 37) % 255) as f64).collect();
        let m = Matrix::from_vec(6, 10, data).unwrap();
        assert_close(&inverse(&forward(&m).unwrap()).unwrap(), &m);
    }

    #[test]
    fn test_modified_coefficients_change_output() {
        let m = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let mut bands = forward(&m).unwrap();
        bands.hl.set(0, 0, bands.hl.get(0, 0) + 3.0);
        let out = inverse(&bands).unwrap();
        assert_ne!(out, m);
        // an HL change moves the top pair up and the bottom pair down
        assert_eq!(out.to_rows(), vec![vec![4.0, 5.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_inverse_rejects_mismatched_bands() {
        let mut bands = forward(&Matrix::zeros(4, 4)).unwrap();
        bands.hh = Matrix::zeros(1, 2);
        assert!(matches!(inverse(&bands), Err(DwtError::ShapeMismatch(_))));
    }

    proptest! {
        #[test]
        fn proptest_inverse_of_forward(
            half_r in 1usize..8,
            half_c in 1usize..8,
            seed in prop::collection::vec(-1000.0f64..1000.0, 256),
        ) {
            let (rows, cols) = (half_r * 2, half_c * 2);
            let data: Vec<f64> = seed.iter().copied().take(rows * cols).collect();
            let m = Matrix::from_vec(rows, cols, data).unwrap();
            let back = inverse(&forward(&m).unwrap()).unwrap();
            for (x, y) in back.as_slice().iter().zip(m.as_slice()) {
                prop_assert!((x - y).abs() < 1e-10);
            }
        }
    }
}
