/// Coefficients of an explicit embedded Runge–Kutta pair.
///
/// With `S` stages, `time_increments` and `weights` both have `S` entries:
/// row `r` of `weights` combines the stage derivatives `k[0..=r]` into the
/// value emitted after round `r`, and the last row is the solution weights.
/// `error_weights` has `S` entries, or `S + 1` when the pair also weights the
/// derivative at the new point.
#[derive(Debug)]
pub(crate) struct Tableau {
    pub(crate) time_increments: &'static [f64],
    pub(crate) weights: &'static [&'static [f64]],
    pub(crate) error_weights: &'static [f64],
    pub(crate) order: u32,
}

impl Tableau {
    pub(crate) const fn stages(&self) -> usize {
        self.time_increments.len()
    }

    /// Slot holding the last local error estimate.
    pub(crate) const fn error_slot(&self) -> usize {
        self.stages()
    }

    /// One slot per stage derivative plus the error slot.
    pub(crate) const fn aux_variable_count(&self) -> usize {
        self.stages() + 1
    }
}

/// Bogacki–Shampine 2(3).
pub(crate) const BOGACKI_SHAMPINE: Tableau = Tableau {
    time_increments: &[0.5, 0.75, 1.0],
    weights: &[&[0.5], &[0.0, 0.75], &[2.0 / 9.0, 1.0 / 3.0, 4.0 / 9.0]],
    error_weights: &[-5.0 / 72.0, 1.0 / 12.0, 1.0 / 9.0, -1.0 / 8.0],
    order: 3,
};

/// Cash–Karp 4(5), advancing with the fifth-order weights.
pub(crate) const CASH_KARP: Tableau = Tableau {
    time_increments: &[0.2, 0.3, 0.6, 1.0, 0.875, 1.0],
    weights: &[
        &[0.2],
        &[3.0 / 40.0, 9.0 / 40.0],
        &[0.3, -0.9, 1.2],
        &[-11.0 / 54.0, 2.5, -70.0 / 27.0, 35.0 / 27.0],
        &[
            1631.0 / 55296.0,
            175.0 / 512.0,
            575.0 / 13824.0,
            44275.0 / 110_592.0,
            253.0 / 4096.0,
        ],
        &[
            37.0 / 378.0,
            0.0,
            250.0 / 621.0,
            125.0 / 594.0,
            0.0,
            512.0 / 1771.0,
        ],
    ],
    error_weights: &[
        37.0 / 378.0 - 2825.0 / 27648.0,
        0.0,
        250.0 / 621.0 - 18575.0 / 48384.0,
        125.0 / 594.0 - 13525.0 / 55296.0,
        -277.0 / 14336.0,
        512.0 / 1771.0 - 0.25,
    ],
    order: 5,
};

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn check_consistency(tableau: &Tableau) {
        assert_eq!(tableau.weights.len(), tableau.stages());
        for (r, row) in tableau.weights.iter().enumerate() {
            assert_eq!(row.len(), r + 1);
        }

        // Solution weights sum to one and the error weights to zero.
        let last = tableau.weights[tableau.stages() - 1];
        assert_relative_eq!(last.iter().sum::<f64>(), 1.0, epsilon = 1e-14);
        assert_relative_eq!(
            tableau.error_weights.iter().sum::<f64>(),
            0.0,
            epsilon = 1e-14
        );
        assert_relative_eq!(tableau.time_increments[tableau.stages() - 1], 1.0);
    }

    #[test]
    fn bogacki_shampine_is_consistent() {
        check_consistency(&BOGACKI_SHAMPINE);
        assert_eq!(BOGACKI_SHAMPINE.error_weights.len(), 4);
        assert_eq!(BOGACKI_SHAMPINE.aux_variable_count(), 4);
    }

    #[test]
    fn cash_karp_is_consistent() {
        check_consistency(&CASH_KARP);
        assert_eq!(CASH_KARP.error_weights.len(), 6);
        assert_eq!(CASH_KARP.aux_variable_count(), 7);
    }

    #[test]
    fn stage_rows_match_their_time_increments() {
        // Rows r = 0..S-2 evaluate stage r+1, whose abscissa is time_increments[r].
        for tableau in [&BOGACKI_SHAMPINE, &CASH_KARP] {
            for r in 0..tableau.stages() - 1 {
                let sum: f64 = tableau.weights[r].iter().sum();
                assert_relative_eq!(sum, tableau.time_increments[r], epsilon = 1e-14);
            }
        }
    }
}
