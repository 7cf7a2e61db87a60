//! Non-fatal conditions collected during a batch for operator review

use tracing::{info, warn};

/// Counters for conditions that never fail a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Rows handed to the parser
    pub rows_read: usize,
    /// Rows rejected at the boundary (bad shape, prefecture or zip code)
    pub rows_rejected: usize,
    /// Range expressions without a parsable numeral, kept as one literal
    pub malformed_ranges: usize,
    /// Street fragments left without any kana reading
    pub unresolved_kana: usize,
    /// Groups merged into an existing zip code entry
    pub duplicate_keys: usize,
    /// Merges skipped because prefix or prefecture differed
    pub guard_violations: usize,
}

impl Diagnostics {
    /// Fold another batch's counters into this one
    pub fn absorb(&mut self, other: Diagnostics) {
        self.rows_read += other.rows_read;
        self.rows_rejected += other.rows_rejected;
        self.malformed_ranges += other.malformed_ranges;
        self.unresolved_kana += other.unresolved_kana;
        self.duplicate_keys += other.duplicate_keys;
        self.guard_violations += other.guard_violations;
    }

    pub fn has_warnings(&self) -> bool {
        self.rows_rejected + self.malformed_ranges + self.unresolved_kana + self.guard_violations > 0
    }

    /// Emit the summary line; warnings at WARN level so they stand out
    pub fn log_summary(&self) {
        info!(
            rows_read = self.rows_read,
            duplicate_keys = self.duplicate_keys,
            "Batch complete"
        );
        if self.has_warnings() {
            warn!(
                rows_rejected = self.rows_rejected,
                malformed_ranges = self.malformed_ranges,
                unresolved_kana = self.unresolved_kana,
                guard_violations = self.guard_violations,
                "Batch finished with unresolved conditions"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absorb_sums_counters() {
        let mut total = Diagnostics {
            rows_read: 3,
            unresolved_kana: 1,
            ..Default::default()
        };
        total.absorb(Diagnostics {
            rows_read: 2,
            malformed_ranges: 1,
            ..Default::default()
        });

        assert_eq!(total.rows_read, 5);
        assert_eq!(total.unresolved_kana, 1);
        assert_eq!(total.malformed_ranges, 1);
        assert!(total.has_warnings());
    }

    #[test]
    fn test_clean_batch_has_no_warnings() {
        let diag = Diagnostics {
            rows_read: 10,
            duplicate_keys: 4,
            ..Default::default()
        };
        assert!(!diag.has_warnings());
    }
}
