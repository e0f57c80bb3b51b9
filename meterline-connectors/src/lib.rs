//! Payload Transmission for Meterline
//!
//! ## Overview
//!
//! The last step of a send cycle: encode the latest snapshot, hand the JSON
//! string to a [`Transmitter`], and log the status code that comes back.
//!
//! ```text
//! SensorSnapshot ──▶ TelemetryEncoder ──▶ Transmitter ──▶ status code ──▶ log
//!                          │ fails                │ fails
//!                          ▼                      ▼
//!                   skip this cycle        count and move on
//! ```
//!
//! The core never interprets the status code beyond "2xx or not"; it is
//! passed through to logging and to [`TransmitStats`] for the display.
//!
//! ## Transports
//!
//! | Transport | Feature | Module   |
//! |-----------|---------|----------|
//! | HTTP POST | `http`  | [`http`] |
//!
//! ## No Retries
//!
//! A failed send is not retried. The next send interval carries a newer
//! snapshot, which is worth more than the stale one. Because encoding is
//! deterministic, a caller that does want to resend can call
//! [`Publisher::publish`] again with the same snapshot.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use meterline_connectors::http::{HttpConfig, HttpTransmitter};
//! use meterline_connectors::{Publisher, PublishOutcome};
//! use meterline_schemas::{DeviceProfile, NetworkMetrics, SystemMetrics, TelemetryEncoder};
//! # fn snapshot() -> meterline_core::SensorSnapshot { unimplemented!() }
//!
//! let transmitter = HttpTransmitter::new(
//!     HttpConfig::new("https://ingest.example.com/api/telemetry").bearer_token("device-token"),
//! )?;
//! let mut publisher = Publisher::new(TelemetryEncoder::new(DeviceProfile::default()), transmitter);
//!
//! let network = NetworkMetrics { connected: true, ..Default::default() };
//! match publisher.publish(&snapshot(), &SystemMetrics::default(), &network) {
//!     PublishOutcome::Delivered { status } => println!("sent ({status})"),
//!     other => println!("not delivered: {other:?}"),
//! }
//! # Ok::<(), meterline_connectors::ConnectorError>(())
//! ```

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{HttpConfig, HttpTransmitter};

use meterline_core::SensorSnapshot;
use meterline_schemas::{EncodeError, NetworkMetrics, SystemMetrics, TelemetryEncoder};
use thiserror::Error;

/// Common connector errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectorError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Anything that can deliver a payload string
///
/// Returns the status code reported by the far end. A non-success code is
/// still `Ok`: the payload reached the server, which declined it.
pub trait Transmitter {
    /// Deliver one payload
    fn transmit(&mut self, payload: &str) -> Result<u16, ConnectorError>;
}

impl<T: Transmitter + ?Sized> Transmitter for &mut T {
    fn transmit(&mut self, payload: &str) -> Result<u16, ConnectorError> {
        (**self).transmit(payload)
    }
}

/// Whether a status code means the payload was accepted
pub fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Result of one send cycle
#[derive(Debug, Clone, PartialEq)]
pub enum PublishOutcome {
    /// Server accepted the payload
    Delivered { status: u16 },
    /// Server answered with a non-2xx status
    Rejected { status: u16 },
    /// Network link is down; nothing was attempted
    Offline,
    /// Payload could not be encoded; transmission skipped for this cycle
    Skipped(EncodeError),
    /// Transport failed before a status code was received
    Failed(ConnectorError),
}

impl PublishOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, PublishOutcome::Delivered { .. })
    }

    /// Status code, when the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            PublishOutcome::Delivered { status } | PublishOutcome::Rejected { status } => Some(*status),
            _ => None,
        }
    }
}

/// Running counters across send cycles
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TransmitStats {
    /// Payloads handed to the transmitter
    pub attempts: u64,
    pub delivered: u64,
    pub rejected: u64,
    /// Transport failures (no status code)
    pub failed: u64,
    /// Cycles skipped because encoding failed or the link was down
    pub skipped: u64,
    /// Bytes of payload handed to the transmitter
    pub bytes_sent: u64,
    /// Status code of the most recent answer
    pub last_status: Option<u16>,
}

impl TransmitStats {
    /// Last send reached the server and was accepted
    pub fn http_ok(&self) -> bool {
        self.last_status.is_some_and(is_success)
    }

    fn record(&mut self, outcome: &PublishOutcome) {
        match outcome {
            PublishOutcome::Delivered { status } => {
                self.delivered += 1;
                self.last_status = Some(*status);
            }
            PublishOutcome::Rejected { status } => {
                self.rejected += 1;
                self.last_status = Some(*status);
            }
            PublishOutcome::Failed(_) => {
                self.failed += 1;
                self.last_status = None;
            }
            PublishOutcome::Offline | PublishOutcome::Skipped(_) => self.skipped += 1,
        }
    }
}

/// Encoder and transmitter for one device
#[derive(Debug)]
pub struct Publisher<T> {
    encoder: TelemetryEncoder,
    transmitter: T,
    stats: TransmitStats,
}

impl<T: Transmitter> Publisher<T> {
    pub fn new(encoder: TelemetryEncoder, transmitter: T) -> Self {
        Self {
            encoder,
            transmitter,
            stats: TransmitStats::default(),
        }
    }

    /// Encode `snapshot` and send it once
    ///
    /// Never panics and never retries; every failure is reported through the
    /// returned outcome and the stats.
    pub fn publish(
        &mut self,
        snapshot: &SensorSnapshot,
        system: &SystemMetrics,
        network: &NetworkMetrics,
    ) -> PublishOutcome {
        let outcome = self.send(snapshot, system, network);
        self.stats.record(&outcome);
        outcome
    }

    fn send(&mut self, snapshot: &SensorSnapshot, system: &SystemMetrics, network: &NetworkMetrics) -> PublishOutcome {
        let seq = snapshot.stamp().sequence;
        if !network.connected {
            log::debug!("cycle {}: link down, not sending", seq);
            return PublishOutcome::Offline;
        }

        let payload = match self.encoder.encode(snapshot, system, network) {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!("cycle {}: encode failed, skipping transmission: {}", seq, e);
                return PublishOutcome::Skipped(e);
            }
        };

        self.stats.attempts += 1;
        self.stats.bytes_sent += payload.len() as u64;

        match self.transmitter.transmit(&payload) {
            Ok(status) if is_success(status) => {
                log::info!("cycle {}: HTTP {}", seq, status);
                PublishOutcome::Delivered { status }
            }
            Ok(status) => {
                log::warn!("cycle {}: HTTP {}", seq, status);
                PublishOutcome::Rejected { status }
            }
            Err(e) => {
                log::warn!("cycle {}: send failed: {}", seq, e);
                PublishOutcome::Failed(e)
            }
        }
    }

    pub fn stats(&self) -> &TransmitStats {
        &self.stats
    }

    pub fn encoder(&self) -> &TelemetryEncoder {
        &self.encoder
    }

    pub fn transmitter_mut(&mut self) -> &mut T {
        &mut self.transmitter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_range() {
        assert!(is_success(200));
        assert!(is_success(204));
        assert!(!is_success(199));
        assert!(!is_success(301));
        assert!(!is_success(500));
    }

    #[test]
    fn stats_track_last_status() {
        let mut stats = TransmitStats::default();
        stats.record(&PublishOutcome::Delivered { status: 201 });
        assert!(stats.http_ok());

        stats.record(&PublishOutcome::Rejected { status: 503 });
        assert!(!stats.http_ok());
        assert_eq!(stats.last_status, Some(503));

        stats.record(&PublishOutcome::Failed(ConnectorError::Transport("reset".into())));
        assert_eq!(stats.last_status, None);
        assert_eq!((stats.delivered, stats.rejected, stats.failed), (1, 1, 1));
    }

    #[test]
    fn skipped_cycles_keep_last_status() {
        let mut stats = TransmitStats::default();
        stats.record(&PublishOutcome::Delivered { status: 200 });
        stats.record(&PublishOutcome::Offline);
        assert_eq!(stats.skipped, 1);
        assert!(stats.http_ok());
    }
}
