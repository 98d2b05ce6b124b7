// SPDX-FileCopyrightText: The kontrol-x1-midi authors
// SPDX-License-Identifier: MPL-2.0

//! Decoding of raw input reports into discrete control state.

use crate::descriptor::ButtonKind;

#[cfg(test)]
mod tests;

/// Expand a byte sequence into individual boolean states.
///
/// Bit `j` (0 = least significant) of byte `i` becomes element `8 * i + j`.
/// Total for all inputs, including the empty slice.
#[must_use]
pub fn expand_bits(bytes: &[u8]) -> Vec<bool> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for byte in bytes {
        for shift in 0..u8::BITS {
            bits.push((byte >> shift) & 1 != 0);
        }
    }
    bits
}

/// Outcome of feeding one observed press state into a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// No state change, nothing to report
    Unchanged,
    /// `active` went from `false` to `true`
    SwitchedOn,
    /// `active` went from `true` to `false`
    SwitchedOff,
}

/// Mutable state of a single pressable control within one mode bank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonState {
    active: bool,
    last_pressed: bool,
}

impl ButtonState {
    /// Whether the control is currently switched on.
    ///
    /// Drives both the MIDI on/off events and the LED brightness.
    #[must_use]
    pub const fn is_active(self) -> bool {
        self.active
    }

    /// Feed the observed press state into the per-kind state machine.
    pub fn update(&mut self, kind: ButtonKind, pressed: bool) -> Transition {
        match kind {
            ButtonKind::Toggle => {
                if self.last_pressed == pressed {
                    return Transition::Unchanged;
                }
                // Both edges are remembered, only the rising edge toggles.
                self.last_pressed = pressed;
                if !pressed {
                    return Transition::Unchanged;
                }
                self.flip_active()
            }
            // Level-triggered: `active` mirrors the raw press state.
            ButtonKind::Hold | ButtonKind::Shift => {
                if self.active == pressed {
                    return Transition::Unchanged;
                }
                self.last_pressed = pressed;
                self.flip_active()
            }
        }
    }

    fn flip_active(&mut self) -> Transition {
        self.active = !self.active;
        if self.active {
            Transition::SwitchedOn
        } else {
            Transition::SwitchedOff
        }
    }
}

/// Mutable state of a single knob within one mode bank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KnobState {
    value: u8,
}

impl KnobState {
    /// The most recently stored 7-bit value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.value
    }

    /// Store a freshly decoded value.
    ///
    /// Returns `true` if the value changed, which is what triggers the
    /// outgoing MIDI event.
    pub fn replace(&mut self, value: u8) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        true
    }
}

/// Full-scale coarse range of the knob hardware.
const KNOB_COARSE_RANGE: f32 = 16.0;

/// Combine the coarse and fine knob bytes into a position in [0, 1].
///
/// Valid hardware state keeps the coarse byte within `0..=16`. Positions
/// beyond the full-scale range saturate at 1.0 so that the derived MIDI
/// value stays within the 7-bit data range.
#[must_use]
pub fn knob_position(coarse: u8, fine: u8) -> f32 {
    let raw = f32::from(coarse) + f32::from(fine) / 256.0;
    (raw / KNOB_COARSE_RANGE).min(1.0)
}

/// Scale a position in [0, 1] to a 7-bit MIDI value.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn position_to_u7(position: f32) -> u8 {
    debug_assert!((0.0..=1.0).contains(&position));
    (position * 127.0).round() as u8
}

/// Decode a knob's two consecutive report bytes into its 7-bit MIDI value.
///
/// Monotonic in the combined raw value `coarse + fine / 256`.
#[must_use]
pub fn decode_knob(coarse: u8, fine: u8) -> u8 {
    position_to_u7(knob_position(coarse, fine))
}
