//! System and network metadata sampled alongside each snapshot
//!
//! The platform layer fills these in; the encoder only formats them.

use meterline_core::numeric::percent;

/// Resource usage of the device
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SystemMetrics {
    /// Seconds since boot
    pub uptime_s: u64,
    pub free_heap_bytes: u32,
    pub total_heap_bytes: u32,
    pub cpu_freq_mhz: u32,
    /// CPU load, when the platform measures it
    pub cpu_pct: Option<f32>,
    /// Filesystem usage, when a filesystem is mounted
    pub fs_used_pct: Option<f32>,
    pub flash_free_kb: Option<u32>,
    /// Die temperature
    pub temp_c: Option<f32>,
}

impl SystemMetrics {
    /// Share of the heap in use, `None` when the total is unknown
    pub fn mem_pct(&self) -> Option<f64> {
        let used = self.total_heap_bytes.saturating_sub(self.free_heap_bytes);
        percent(used as u64, self.total_heap_bytes as u64)
    }

    /// Free heap in whole KiB
    pub fn heap_free_kb(&self) -> u32 {
        self.free_heap_bytes / 1024
    }
}

/// Link state of the network interface
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkMetrics {
    /// Link type, e.g. `"wifi"`
    pub conn: String,
    pub ip: String,
    pub mac: String,
    pub rssi_dbm: i32,
    /// Signal-to-noise ratio, for links that report one
    pub snr_db: Option<f32>,
    pub connected: bool,
}

impl Default for NetworkMetrics {
    fn default() -> Self {
        Self {
            conn: "wifi".into(),
            ip: "0.0.0.0".into(),
            mac: "00:00:00:00:00:00".into(),
            rssi_dbm: 0,
            snr_db: None,
            connected: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_usage() {
        let system = SystemMetrics {
            free_heap_bytes: 120 * 1024,
            total_heap_bytes: 320 * 1024,
            ..Default::default()
        };
        assert_eq!(system.mem_pct(), Some(62.5));
        assert_eq!(system.heap_free_kb(), 120);
    }

    #[test]
    fn unknown_heap_size() {
        assert_eq!(SystemMetrics::default().mem_pct(), None);
    }

    #[test]
    fn free_larger_than_total_clamps_to_zero() {
        let system = SystemMetrics {
            free_heap_bytes: 2048,
            total_heap_bytes: 1024,
            ..Default::default()
        };
        assert_eq!(system.mem_pct(), Some(0.0));
    }
}
