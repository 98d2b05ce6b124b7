// SPDX-FileCopyrightText: The kontrol-x1-midi authors
// SPDX-License-Identifier: MPL-2.0

//! Outbound MIDI control-change events.

use derive_more::Display;

use crate::output::OutputResult;

#[cfg(feature = "midir")]
pub mod midir;
#[cfg(feature = "midir")]
pub use self::midir::{MidiPortError, MidirOutput};

/// Control-change status byte of the normal mode channel.
///
/// Chosen clear of the channels commonly occupied by other MIDI devices.
pub const MIDI_STATUS_CC_NORMAL: u8 = 0xb7;

/// Control-change status byte of the shifted mode channel.
pub const MIDI_STATUS_CC_SHIFTED: u8 = 0xb8;

/// A single outbound control-change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[display("status = {status:#04x}, cc = {controller}, value = {value}")]
pub struct MidiEvent {
    pub status: u8,
    pub controller: u8,
    /// 7-bit data value: a velocity for buttons, the decoded position
    /// for knobs.
    pub value: u8,
}

impl MidiEvent {
    #[must_use]
    pub const fn to_bytes(self) -> [u8; 3] {
        [self.status, self.controller, self.value]
    }
}

/// Outbound sink for raw MIDI messages.
pub trait MidiOutputConnection {
    fn send_midi_output(&mut self, output: &[u8]) -> OutputResult<()>;
}
