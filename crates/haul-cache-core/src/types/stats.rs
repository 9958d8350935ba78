//! Cache statistics

use serde::Serialize;

/// Snapshot of a cache's contents and counters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Raw entry count, including expired entries not yet swept
    pub total_entries: usize,
    /// Entries valid at the time of the scan
    pub valid_entries: usize,
    /// Entries expired at the time of the scan
    pub expired_entries: usize,
    /// Estimated size of the valid entries, e.g. `"1.25 KB"`
    pub total_size: String,
    /// `valid_entries / total_entries` as a percentage, e.g. `"66.7%"`
    pub health_ratio: String,
    /// Estimated size of the valid entries in bytes
    pub memory_bytes: usize,
    /// Number of reads that returned a value
    pub hits: u64,
    /// Number of reads that found nothing usable
    pub misses: u64,
    /// Number of write operations
    pub writes: u64,
    /// Number of explicit deletes that removed an entry
    pub deletes: u64,
    /// Number of capacity evictions
    pub evictions: u64,
}

impl CacheStats {
    /// Calculate hit ratio (0.0 to 1.0)
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Calculate miss ratio (0.0 to 1.0)
    pub fn miss_ratio(&self) -> f64 {
        1.0 - self.hit_ratio()
    }

    /// Total requests (hits + misses)
    pub fn total_requests(&self) -> u64 {
        self.hits + self.misses
    }
}

/// Format a byte count as kilobytes with two decimals
pub fn format_kilobytes(bytes: usize) -> String {
    format!("{:.2} KB", bytes as f64 / 1024.0)
}

/// Format `part / whole` as a percentage with one decimal
///
/// An empty whole reports `0.0%`.
pub fn format_percentage(part: usize, whole: usize) -> String {
    if whole == 0 {
        return "0.0%".to_string();
    }
    format!("{:.1}%", part as f64 / whole as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_stats() {
        let stats = CacheStats::default();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.hit_ratio(), 0.0);
    }

    #[test]
    fn test_hit_ratio() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            ..Default::default()
        };
        assert!((stats.hit_ratio() - 0.8).abs() < f64::EPSILON);
        assert!((stats.miss_ratio() - 0.2).abs() < f64::EPSILON);
        assert_eq!(stats.total_requests(), 100);
    }

    #[test]
    fn test_format_kilobytes() {
        assert_eq!(format_kilobytes(0), "0.00 KB");
        assert_eq!(format_kilobytes(1536), "1.50 KB");
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(2, 3), "66.7%");
        assert_eq!(format_percentage(3, 3), "100.0%");
        assert_eq!(format_percentage(0, 0), "0.0%");
    }

    #[test]
    fn test_serializes_camel_case() {
        let stats = CacheStats {
            total_entries: 2,
            valid_entries: 1,
            expired_entries: 1,
            ..Default::default()
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["totalEntries"], 2);
        assert_eq!(json["healthRatio"], "");
    }
}
