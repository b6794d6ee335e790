use serde::Serialize;

/// Running diagnostic of how often the simplified polygon came out with
/// exactly four vertices.
///
/// Purely observational: nothing in the detection path reads it back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HitRateStats {
    pub total_calls: u64,
    pub four_point_hits: u64,
}

impl HitRateStats {
    pub fn new() -> HitRateStats {
        HitRateStats::default()
    }

    pub fn record_call(&mut self) {
        self.total_calls += 1;
    }

    pub fn record_polygon(&mut self, vertex_count: usize) {
        if vertex_count == 4 {
            self.four_point_hits += 1;
        }
    }

    /// Hits over calls; zero before the first call.
    pub fn ratio(&self) -> f64 {
        if self.total_calls == 0 {
            0.0
        } else {
            self.four_point_hits as f64 / self.total_calls as f64
        }
    }

    pub fn reset(&mut self) {
        *self = HitRateStats::default();
    }
}

impl std::fmt::Display for HitRateStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "hit chance: {:.3} ({}/{})",
            self.ratio(),
            self.four_point_hits,
            self.total_calls
        )
    }
}
