//! Status Rendering for the Local Screen and Debug Log
//!
//! Two read-only views of a [`SensorSnapshot`]:
//!
//! - [`render_screen`] lays out text for a 128×64 monochrome OLED with the
//!   default 6×8 font, i.e. 8 rows of 21 characters. The result is plain text
//!   in a fixed-capacity buffer; pushing pixels is the display driver's job.
//! - [`StatusSummary`] formats the multi-line serial summary through
//!   `core::fmt::Display`, so it can go to `log`, `defmt` or a UART writer.
//!
//! ```text
//! ESP32 Monitor   WH
//! ----------------
//! V: 231V ON
//! I: 1.4A ON
//! PIR: IDLE
//! T: 24.5C H: 55%
//! RAM: 187KB
//! Up: 3605s
//! ```
//!
//! Channels that are not fitted get no row.

use core::fmt::{self, Write};

use heapless::{String, Vec};

use crate::derivation::DerivedReading;
use crate::snapshot::SensorSnapshot;

/// Characters per row (128 px / 6 px)
pub const SCREEN_COLUMNS: usize = 21;

/// Rows per screen (64 px / 8 px)
pub const SCREEN_ROWS: usize = 8;

/// Column where the connectivity indicators start (x = 100 px)
const INDICATOR_COLUMN: usize = 16;

/// One row of screen text
pub type ScreenLine = String<SCREEN_COLUMNS>;

/// A full screen of text
pub type Screen = Vec<ScreenLine, SCREEN_ROWS>;

/// Device state shown next to the sensor values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceStatus {
    /// Seconds since boot
    pub uptime_s: u64,
    /// Free heap in bytes
    pub free_heap_bytes: u32,
    /// Wi-Fi link state
    pub wifi_connected: bool,
    /// Signal strength in dBm
    pub rssi_dbm: i32,
    /// Last transmission was accepted
    pub http_ok: bool,
}

/// `fmt::Write` adapter that drops whatever does not fit
struct Clipped<'a, const N: usize>(&'a mut String<N>);

impl<const N: usize> Write for Clipped<'_, N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

fn line(args: fmt::Arguments<'_>) -> ScreenLine {
    let mut text = ScreenLine::new();
    let _ = Clipped(&mut text).write_fmt(args);
    text
}

fn on_off(reading: &DerivedReading) -> &'static str {
    if reading.valid {
        "ON"
    } else {
        "OFF"
    }
}

/// Lay out one screen for `snapshot`
pub fn render_screen(snapshot: &SensorSnapshot, status: &DeviceStatus) -> Screen {
    let mut rows = Screen::new();
    let mut push = |row: ScreenLine| {
        let _ = rows.push(row);
    };

    let title = "ESP32 Monitor";
    push(line(format_args!(
        "{:<width$}{}{}",
        title,
        if status.wifi_connected { 'W' } else { 'X' },
        if status.http_ok { 'H' } else { 'X' },
        width = INDICATOR_COLUMN
    )));
    push(line(format_args!("----------------")));

    if let Some(voltage) = snapshot.mains_voltage() {
        push(line(format_args!("V: {:.0}V {}", voltage.value, on_off(&voltage))));
    }
    if let Some(current) = snapshot.load_current() {
        push(line(format_args!("I: {:.1}A {}", current.value, on_off(&current))));
    }
    if let Some(motion) = snapshot.motion() {
        push(line(format_args!(
            "PIR: {}",
            if motion.detected { "MOTION" } else { "IDLE" }
        )));
    }
    if let Some(climate) = snapshot.climate() {
        push(line(format_args!(
            "T: {}C H: {}%",
            Reading(climate.temperature, 1),
            Reading(climate.humidity, 0)
        )));
    }

    push(line(format_args!("RAM: {}KB", status.free_heap_bytes / 1024)));
    push(line(format_args!("Up: {}s", status.uptime_s)));
    rows
}

/// Formats a reading with fixed decimals, or `-` when invalid
struct Reading(DerivedReading, usize);

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.get() {
            Some(value) => write!(f, "{:.*}", self.1, value),
            None => f.write_str("-"),
        }
    }
}

/// Multi-line serial summary of a snapshot
pub struct StatusSummary<'a> {
    /// Cycle being summarised
    pub snapshot: &'a SensorSnapshot,
    /// Indicators shown next to it
    pub status: &'a DeviceStatus,
}

impl fmt::Display for StatusSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.snapshot;
        writeln!(f, "==== ENERGY STATUS ====")?;

        if let Some(voltage) = snapshot.mains_voltage() {
            write!(f, "V: {:.1}V  ", voltage.value)?;
        }
        if let Some(current) = snapshot.load_current() {
            write!(f, "I: {:.2}A  ", current.value)?;
        }
        if let Some(motion) = snapshot.motion() {
            write!(f, "PIR: {}", if motion.detected { "MOTION" } else { "IDLE" })?;
        }
        writeln!(f)?;

        if let Some(climate) = snapshot.climate() {
            writeln!(
                f,
                "T: {}C  H: {}%",
                Reading(climate.temperature, 1),
                Reading(climate.humidity, 0)
            )?;
        }

        writeln!(
            f,
            "WiFi: {}  RSSI: {}",
            if self.status.wifi_connected { "connected" } else { "disconnected" },
            self.status.rssi_dbm
        )?;
        writeln!(
            f,
            "Uptime: {}s  RAM: {}KB",
            self.status.uptime_s,
            self.status.free_heap_bytes / 1024
        )?;
        if snapshot.flags().any() {
            let flags = snapshot.flags();
            writeln!(
                f,
                "ALARM:{}{}{}{}",
                if flags.voltage_out_of_range { " VOLT" } else { "" },
                if flags.current_overlimit { " CURR" } else { "" },
                if flags.temp_out_of_range { " TEMP" } else { "" },
                if flags.hum_out_of_range { " HUM" } else { "" },
            )?;
        }
        write!(f, "======================")
    }
}
