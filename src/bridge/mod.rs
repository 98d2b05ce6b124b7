// SPDX-FileCopyrightText: The kontrol-x1-midi authors
// SPDX-License-Identifier: MPL-2.0

//! The synchronous polling bridge between the device and the MIDI port.
//!
//! One cycle runs to completion before the next begins: read the input
//! report, translate it, send the MIDI events in order, write the LED
//! report back. All mutable state is owned by the bridge and touched
//! only from the single polling thread.

use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use hidapi::DeviceInfo;
use thiserror::Error;

use crate::{
    descriptor::INPUT_REPORT_LEN,
    engine::{CycleError, TranslationEngine},
    hid::{HidDevice, HidDeviceError, HidError},
    midi::MidiOutputConnection,
    output::OutputError,
};

/// USB vendor id of Native Instruments.
pub const VENDOR_ID: u16 = 0x17cc;

/// USB product id of the Traktor Kontrol X1.
pub const PRODUCT_ID: u16 = 0x2305;

/// Default read timeout per polling cycle.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(50);

#[must_use]
pub fn is_supported(device_info: &DeviceInfo) -> bool {
    device_info.vendor_id() == VENDOR_ID && device_info.product_id() == PRODUCT_ID
}

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Hid(#[from] HidError),

    #[error(transparent)]
    Cycle(#[from] CycleError),

    #[error(transparent)]
    MidiSend(#[from] OutputError),
}

/// Outcome of a single polling cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStatus {
    /// A report was translated and the outputs were flushed
    Translated,
    /// The read timed out, previous state preserved
    NoNewData,
}

#[allow(missing_debug_implementations)]
pub struct Bridge<M> {
    device: HidDevice,
    midi_output: M,
    engine: TranslationEngine,
    read_timeout: Duration,
}

impl<M> Bridge<M>
where
    M: MidiOutputConnection,
{
    pub fn attach(
        device: HidDevice,
        midi_output: M,
        engine: TranslationEngine,
    ) -> Result<Self, BridgeError> {
        if !is_supported(device.info()) {
            return Err(HidError::from(HidDeviceError::NotSupported).into());
        }
        if !device.is_connected() {
            return Err(HidError::from(HidDeviceError::NotConnected).into());
        }
        Ok(Self {
            device,
            midi_output,
            engine,
            read_timeout: DEFAULT_READ_TIMEOUT,
        })
    }

    #[must_use]
    pub fn detach(self) -> (HidDevice, M) {
        let Self {
            device,
            midi_output,
            ..
        } = self;
        (device, midi_output)
    }

    #[must_use]
    pub const fn engine(&self) -> &TranslationEngine {
        &self.engine
    }

    pub fn set_read_timeout(&mut self, read_timeout: Duration) {
        self.read_timeout = read_timeout;
    }

    /// Run a single polling cycle.
    ///
    /// A timed out read is not a fatal condition: the cycle becomes a
    /// no-op and the previous state is preserved.
    pub fn poll_cycle(&mut self) -> Result<CycleStatus, BridgeError> {
        let mut input = [0; INPUT_REPORT_LEN];
        let bytes_read = self.device.read(&mut input, self.read_timeout)?;
        if bytes_read == 0 {
            return Ok(CycleStatus::NoNewData);
        }
        // Short reads are handed through and rejected by the engine's
        // report validation.
        let outcome = self.engine.process_report(&input[..bytes_read])?;
        for event in &outcome.midi_events {
            log::debug!("Sending MIDI event: {event}");
            self.midi_output.send_midi_output(&event.to_bytes())?;
        }
        self.device.write(&outcome.led_report)?;
        Ok(CycleStatus::Translated)
    }

    /// Poll until the stop flag is raised.
    ///
    /// Cycle-level errors spoil a single cycle: they are logged and the
    /// loop continues. Transport and MIDI send errors are returned.
    pub fn run(&mut self, stop: &AtomicBool) -> Result<(), BridgeError> {
        while !stop.load(Ordering::Relaxed) {
            match self.poll_cycle() {
                Ok(_) => (),
                Err(BridgeError::Cycle(err)) => {
                    log::warn!("Translation cycle failed: {err}");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }
}
