/// Pending breakpoint times in ascending order.
///
/// Times within the resolution of an existing entry are merged into it.
#[derive(Debug, Clone, Default)]
pub(super) struct Breakpoints {
    times: Vec<f64>,
}

impl Breakpoints {
    pub(super) fn insert(&mut self, time: f64, resolution: f64) {
        let index = self.times.partition_point(|&t| t < time - resolution);

        if self
            .times
            .get(index)
            .is_some_and(|&t| (t - time).abs() <= resolution)
        {
            return;
        }
        self.times.insert(index, time);
    }

    /// The earliest pending breakpoint.
    pub(super) fn next(&self) -> Option<f64> {
        self.times.first().copied()
    }

    /// Returns `true` if the earliest breakpoint is at `time`.
    pub(super) fn is_at(&self, time: f64, resolution: f64) -> bool {
        self.next().is_some_and(|t| (t - time).abs() <= resolution)
    }

    /// Removes every breakpoint at or before `time`.
    pub(super) fn remove_through(&mut self, time: f64, resolution: f64) {
        let count = self.times.partition_point(|&t| t <= time + resolution);
        self.times.drain(..count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RES: f64 = 1e-10;

    #[test]
    fn keeps_times_sorted_and_merges_near_duplicates() {
        let mut breakpoints = Breakpoints::default();
        breakpoints.insert(1.0, RES);
        breakpoints.insert(0.25, RES);
        breakpoints.insert(0.5, RES);
        breakpoints.insert(0.5 + 1e-12, RES);

        assert_eq!(breakpoints.times, vec![0.25, 0.5, 1.0]);
        assert_eq!(breakpoints.next(), Some(0.25));
    }

    #[test]
    fn detects_arrival_within_resolution() {
        let mut breakpoints = Breakpoints::default();
        breakpoints.insert(0.3, RES);

        assert!(breakpoints.is_at(0.3 + 1e-12, RES));
        assert!(!breakpoints.is_at(0.29, RES));
    }

    #[test]
    fn removes_reached_breakpoints() {
        let mut breakpoints = Breakpoints::default();
        for t in [0.1, 0.2, 0.3] {
            breakpoints.insert(t, RES);
        }

        breakpoints.remove_through(0.2, RES);

        assert_eq!(breakpoints.next(), Some(0.3));

        breakpoints.remove_through(0.3, RES);
        assert_eq!(breakpoints.next(), None);
    }
}
