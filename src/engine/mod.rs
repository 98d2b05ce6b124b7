// SPDX-FileCopyrightText: The kontrol-x1-midi authors
// SPDX-License-Identifier: MPL-2.0

//! The translation cycle orchestrator.
//!
//! A pure transform from (previous state, raw input report) to
//! (new state, MIDI events, LED report). All I/O stays with the caller,
//! which makes every cycle directly testable without any transport.

use strum::{EnumCount, EnumIter, FromRepr};
use thiserror::Error;

use crate::{
    descriptor::{
        ButtonKind, DescriptorTable, BUTTON_BITMAP_LEN, BUTTON_BITMAP_OFFSET, INPUT_REPORT_LEN,
        OUTPUT_REPORT_LEN,
    },
    input::{decode_knob, expand_bits, ButtonState, KnobState, Transition},
    midi::{MidiEvent, MIDI_STATUS_CC_NORMAL, MIDI_STATUS_CC_SHIFTED},
    output::{encode_led_report, Led, LedIndexOverflow},
};


/// The process-wide mode selecting the live state bank.
///
/// Toggled exclusively by the shift button's active state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRepr, EnumIter, EnumCount)]
#[repr(u8)]
pub enum Mode {
    #[default]
    Normal,
    Shifted,
}

impl Mode {
    /// The MIDI control-change status byte of this mode's channel.
    #[must_use]
    pub const fn midi_status(self) -> u8 {
        match self {
            Self::Normal => MIDI_STATUS_CC_NORMAL,
            Self::Shifted => MIDI_STATUS_CC_SHIFTED,
        }
    }

    const fn from_shift(shift: bool) -> Self {
        if shift {
            Self::Shifted
        } else {
            Self::Normal
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Error)]
pub enum CycleError {
    #[error("malformed input report: expected {expected} bytes, got {len}", expected = INPUT_REPORT_LEN)]
    MalformedBuffer { len: usize },

    #[error("`{name}` references position {index} beyond the decoded input (len = {len})")]
    BufferIndexOverflow {
        name: String,
        index: usize,
        len: usize,
    },

    #[error(transparent)]
    LedIndexOverflow(#[from] LedIndexOverflow),
}

/// Everything one cycle wants to send back out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleOutcome {
    /// MIDI events in descriptor-table order, buttons before knobs
    pub midi_events: Vec<MidiEvent>,
    /// The outbound LED report
    pub led_report: [u8; OUTPUT_REPORT_LEN],
}

/// Per-cycle translation of raw input reports into MIDI events and the
/// LED report.
///
/// Holds one state bank per [`Mode`], pre-built from the same descriptor
/// table. The bank for a cycle is selected by the mode left behind by
/// the previous cycle's shift evaluation.
#[derive(Debug)]
pub struct TranslationEngine {
    table: DescriptorTable,
    button_banks: [Vec<ButtonState>; Mode::COUNT],
    knob_banks: [Vec<KnobState>; Mode::COUNT],
    mode: Mode,
}

impl TranslationEngine {
    #[must_use]
    pub fn new(table: DescriptorTable) -> Self {
        let buttons = vec![ButtonState::default(); table.buttons().len()];
        let knobs = vec![KnobState::default(); table.knobs().len()];
        Self {
            button_banks: [buttons.clone(), buttons],
            knob_banks: [knobs.clone(), knobs],
            table,
            mode: Mode::default(),
        }
    }

    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn descriptor_table(&self) -> &DescriptorTable {
        &self.table
    }

    /// Run one translation cycle over a raw input report.
    ///
    /// Decodes the button bitmap and the knob byte pairs, advances the
    /// state machines of the live bank, collects the MIDI events to send
    /// (in descriptor-table order) and encodes the outbound LED report.
    ///
    /// Errors are surfaced to the caller and never retried internally;
    /// the engine's state is only touched up to the point of failure.
    pub fn process_report(&mut self, input: &[u8]) -> Result<CycleOutcome, CycleError> {
        if input.len() != INPUT_REPORT_LEN {
            return Err(CycleError::MalformedBuffer { len: input.len() });
        }
        let button_bitmap = &input[BUTTON_BITMAP_OFFSET..BUTTON_BITMAP_OFFSET + BUTTON_BITMAP_LEN];
        let pressed_states = expand_bits(button_bitmap);
        if log::log_enabled!(log::Level::Trace) {
            for (index, pressed) in pressed_states.iter().enumerate() {
                if *pressed {
                    log::trace!("Pressed button state {index}");
                }
            }
        }

        // The bank was selected by the previous cycle's shift evaluation.
        let bank = self.mode.index();
        let table = &self.table;
        let mut midi_events = Vec::new();

        for (descriptor, state) in table.buttons().iter().zip(self.button_banks[bank].iter_mut())
        {
            let index = descriptor.buffer_index;
            if index >= pressed_states.len() {
                return Err(CycleError::BufferIndexOverflow {
                    name: descriptor.name.clone(),
                    index,
                    len: pressed_states.len(),
                });
            }
            let pressed = pressed_states[index];
            let transition = state.update(descriptor.kind, pressed);
            match transition {
                Transition::Unchanged => {}
                Transition::SwitchedOn => {
                    log::debug!("{name} switched on", name = descriptor.name);
                }
                Transition::SwitchedOff => {
                    log::debug!("{name} switched off", name = descriptor.name);
                }
            }
            if descriptor.kind == ButtonKind::Shift {
                // Published immediately: controls processed later in this
                // pass emit on the new channel, while the bank switch only
                // takes effect on the next cycle.
                self.mode = Mode::from_shift(state.is_active());
                continue;
            }
            match transition {
                Transition::Unchanged => {}
                Transition::SwitchedOn => {
                    midi_events.push(MidiEvent {
                        status: self.mode.midi_status(),
                        controller: descriptor.on_cc,
                        value: descriptor.on_velocity,
                    });
                }
                Transition::SwitchedOff => {
                    midi_events.push(MidiEvent {
                        status: self.mode.midi_status(),
                        controller: descriptor.off_cc,
                        value: descriptor.off_velocity,
                    });
                }
            }
        }

        for (descriptor, state) in table.knobs().iter().zip(self.knob_banks[bank].iter_mut()) {
            let index = descriptor.buffer_index;
            // Unreachable for a validated table, checked nevertheless
            // since the report length is externally supplied.
            if index + 1 >= input.len() {
                return Err(CycleError::BufferIndexOverflow {
                    name: descriptor.name.clone(),
                    index,
                    len: input.len(),
                });
            }
            let value = decode_knob(input[index], input[index + 1]);
            if state.replace(value) {
                log::debug!("{name} value changed to {value}", name = descriptor.name);
                midi_events.push(MidiEvent {
                    status: self.mode.midi_status(),
                    controller: descriptor.cc,
                    value,
                });
            }
        }

        // The LED report mirrors the bank selected by the mode as left
        // behind by this pass.
        let led_bank = self.mode.index();
        let leds = table
            .buttons()
            .iter()
            .zip(&self.button_banks[led_bank])
            .map(|(descriptor, state)| (descriptor, Led::from_active(state.is_active())));
        let led_report = encode_led_report(leds)?;

        Ok(CycleOutcome {
            midi_events,
            led_report,
        })
    }
}
