//! Test doubles for the hardware traits
//!
//! Available with the `std` feature, or with `mock` on `no_std` targets that
//! have an allocator.
//! Scripts repeat: a channel scripted with `[100, 4000]` alternates between
//! the two codes for as many reads as the acquirer makes.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::errors::{HalError, HalResult};
use crate::traits::{
    AnalogInput, ClimateSensor, DelayMs, DigitalInput, DigitalOutput, Level, MeterSample,
    PowerMeter,
};

#[derive(Debug, Default, Clone)]
struct Script<T> {
    values: Vec<T>,
    cursor: usize,
    fail_after: Option<usize>,
    stalls: u32,
}

impl<T: Copy> Script<T> {
    fn new(values: &[T]) -> Self {
        Self {
            values: values.to_vec(),
            cursor: 0,
            fail_after: None,
            stalls: 0,
        }
    }

    fn next(&mut self) -> Option<T> {
        if self.fail_after.is_some_and(|limit| self.cursor >= limit) {
            self.cursor += 1;
            return None;
        }
        let value = self.values.get(self.cursor % self.values.len().max(1)).copied();
        self.cursor += 1;
        value
    }
}

/// Scripted ADC, GPIO and delay in one board
#[derive(Debug, Default, Clone)]
pub struct MockBoard {
    analog: BTreeMap<u8, Script<u16>>,
    digital: BTreeMap<u8, Script<Level>>,
    writes: Vec<(u8, Level)>,
    delays: Vec<u32>,
    fail_writes: bool,
}

impl MockBoard {
    /// Board with nothing scripted
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the script for an ADC channel and rewind it
    pub fn script_analog(&mut self, channel: u8, codes: &[u16]) {
        self.analog.insert(channel, Script::new(codes));
    }

    /// Fail every read of `channel` after the first `reads`
    pub fn fail_analog_after(&mut self, channel: u8, reads: usize) {
        if let Some(script) = self.analog.get_mut(&channel) {
            script.fail_after = Some(reads);
        }
    }

    /// Answer `WouldBlock` this many times before each conversion completes
    pub fn stall_analog(&mut self, channel: u8, polls: u32) {
        if let Some(script) = self.analog.get_mut(&channel) {
            script.stalls = polls;
        }
    }

    /// Replace the script for a GPIO input and rewind it
    pub fn script_digital(&mut self, pin: u8, levels: &[Level]) {
        self.digital.insert(pin, Script::new(levels));
    }

    /// Make every output write fail
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Output writes in order
    pub fn writes(&self) -> &[(u8, Level)] {
        &self.writes
    }

    /// Delays requested, in order
    pub fn delays(&self) -> &[u32] {
        &self.delays
    }

    /// Reads attempted on an ADC channel so far
    pub fn analog_reads(&self, channel: u8) -> usize {
        self.analog.get(&channel).map_or(0, |s| s.cursor)
    }
}

impl AnalogInput for MockBoard {
    fn read(&mut self, channel: u8) -> nb::Result<u16, HalError> {
        let script = self
            .analog
            .get_mut(&channel)
            .ok_or(nb::Error::Other(HalError::Unavailable { channel }))?;
        if script.stalls > 0 {
            script.stalls -= 1;
            return Err(nb::Error::WouldBlock);
        }
        script.next().ok_or(nb::Error::Other(HalError::Timeout))
    }
}

impl DigitalInput for MockBoard {
    fn read_level(&mut self, pin: u8) -> HalResult<Level> {
        self.digital
            .get_mut(&pin)
            .ok_or(HalError::Unavailable { channel: pin })?
            .next()
            .ok_or(HalError::Timeout)
    }
}

impl DigitalOutput for MockBoard {
    fn write_level(&mut self, pin: u8, level: Level) -> HalResult<()> {
        if self.fail_writes {
            return Err(HalError::Unavailable { channel: pin });
        }
        self.writes.push((pin, level));
        Ok(())
    }
}

impl DelayMs for MockBoard {
    fn delay_ms(&mut self, ms: u32) {
        self.delays.push(ms);
    }
}

/// Climate sensor replaying (temperature, humidity) pairs
#[derive(Debug, Clone)]
pub struct ScriptedClimate {
    readings: Script<(f32, f32)>,
    current: (f32, f32),
    /// Times `begin` was called
    pub begin_calls: u32,
    /// Make `begin` fail
    pub fail_begin: bool,
}

impl ScriptedClimate {
    /// Replay `readings` in a loop
    pub fn new(readings: &[(f32, f32)]) -> Self {
        Self {
            readings: Script::new(readings),
            current: (f32::NAN, f32::NAN),
            begin_calls: 0,
            fail_begin: false,
        }
    }

    /// Always report the same pair
    pub fn constant(temperature: f32, humidity: f32) -> Self {
        Self::new(&[(temperature, humidity)])
    }
}

impl ClimateSensor for ScriptedClimate {
    fn begin(&mut self) -> HalResult<()> {
        self.begin_calls += 1;
        if self.fail_begin {
            Err(HalError::Bus { reason: "no response" })
        } else {
            Ok(())
        }
    }

    fn read_temperature(&mut self) -> f32 {
        self.current = self.readings.next().unwrap_or((f32::NAN, f32::NAN));
        self.current.0
    }

    fn read_humidity(&mut self) -> f32 {
        self.current.1
    }
}

/// Power meter replaying samples
#[derive(Debug, Clone)]
pub struct ScriptedMeter {
    samples: Script<MeterSample>,
}

impl ScriptedMeter {
    /// Replay `samples` in a loop
    pub fn new(samples: &[MeterSample]) -> Self {
        Self {
            samples: Script::new(samples),
        }
    }
}

impl PowerMeter for ScriptedMeter {
    fn read(&mut self) -> MeterSample {
        self.samples.next().unwrap_or_else(MeterSample::unavailable)
    }
}
