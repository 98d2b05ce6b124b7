// SPDX-FileCopyrightText: The kontrol-x1-midi authors
// SPDX-License-Identifier: MPL-2.0

//! Static description of the control surface.
//!
//! The report layout is a fixed contract with one physical device model.
//! Descriptors reference positions within that layout and are validated
//! once when the table is built.

use strum::{Display, EnumIter, EnumString};
use thiserror::Error;

/// Fixed length of the input report read from the device.
pub const INPUT_REPORT_LEN: usize = 24;

/// Fixed length of the LED report written back to the device.
pub const OUTPUT_REPORT_LEN: usize = 32;

/// Offset of the button bitmap within the input report.
pub(crate) const BUTTON_BITMAP_OFFSET: usize = 1;

/// Number of bytes occupied by the button bitmap.
pub(crate) const BUTTON_BITMAP_LEN: usize = 5;

/// Number of discrete button states in the expanded bitmap.
pub const NUM_BUTTON_STATES: usize = BUTTON_BITMAP_LEN * 8;

/// Number of addressable LED slots in the output report.
///
/// Slots are 1-based, slot 0 means "no LED".
pub const NUM_LED_SLOTS: usize = OUTPUT_REPORT_LEN - 1;

/// Kind of a physical control.
///
/// Parsed case-sensitively from the control map. Unrecognized kinds are
/// not represented here, they are filtered out before descriptors reach
/// the table (see [`crate::config`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum ControlKind {
    /// Latches on a rising edge, released by the next rising edge
    Toggle,
    /// Active exactly while pressed
    Hold,
    /// Like [`ControlKind::Hold`], but selects the mode bank instead of
    /// emitting MIDI
    Shift,
    /// Continuous rotary control occupying two input bytes
    Knob,
}

/// Kind of a pressable button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonKind {
    Toggle,
    Hold,
    Shift,
}

impl ControlKind {
    /// The pressable button kind, `None` for continuous controls.
    #[must_use]
    pub const fn button_kind(self) -> Option<ButtonKind> {
        match self {
            Self::Toggle => Some(ButtonKind::Toggle),
            Self::Hold => Some(ButtonKind::Hold),
            Self::Shift => Some(ButtonKind::Shift),
            Self::Knob => None,
        }
    }
}

/// A single control as loaded from the control map, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlDescriptor {
    pub name: String,
    pub kind: ControlKind,
    /// Buttons: bit position within the expanded button bitmap.
    /// Knobs: byte position of the coarse value within the input report.
    pub buffer_index: usize,
    /// 1-based LED slot in the output report, 0 = no LED.
    pub led_slot: usize,
    pub on_cc: u8,
    pub off_cc: u8,
    pub on_velocity: u8,
    pub off_velocity: u8,
}

/// A validated pressable control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonDescriptor {
    pub name: String,
    pub kind: ButtonKind,
    /// Bit position within the expanded button bitmap
    pub buffer_index: usize,
    /// 1-based LED slot in the output report, 0 = no LED
    pub led_slot: usize,
    pub on_cc: u8,
    pub off_cc: u8,
    pub on_velocity: u8,
    pub off_velocity: u8,
}

/// A validated continuous control.
///
/// Knobs occupy two consecutive bytes of the input report and report
/// their decoded value on a single CC number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnobDescriptor {
    pub name: String,
    /// Byte position of the coarse value within the input report
    pub buffer_index: usize,
    pub cc: u8,
}

#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("button `{name}` references bit {index} outside the {num_bits}-bit button bitmap", num_bits = NUM_BUTTON_STATES)]
    ButtonIndexOutOfBounds { name: String, index: usize },

    #[error("knob `{name}` references byte {index} outside the {report_len}-byte input report", report_len = INPUT_REPORT_LEN)]
    KnobIndexOutOfBounds { name: String, index: usize },

    #[error("`{name}` references LED slot {slot} outside the {num_slots} addressable slots", num_slots = NUM_LED_SLOTS)]
    LedSlotOutOfBounds { name: String, slot: usize },
}

/// The compiled control descriptor table.
///
/// Splits the ordered descriptor list into pressable buttons and knobs,
/// both keeping their original order. Construction fails if any
/// descriptor references a position outside the fixed report layout.
#[derive(Debug, Clone, Default)]
pub struct DescriptorTable {
    buttons: Vec<ButtonDescriptor>,
    knobs: Vec<KnobDescriptor>,
}

impl DescriptorTable {
    pub fn try_new(
        descriptors: impl IntoIterator<Item = ControlDescriptor>,
    ) -> Result<Self, DescriptorError> {
        let mut buttons = Vec::new();
        let mut knobs = Vec::new();
        for descriptor in descriptors {
            let ControlDescriptor {
                name,
                kind,
                buffer_index,
                led_slot,
                on_cc,
                off_cc,
                on_velocity,
                off_velocity,
            } = descriptor;
            if led_slot > NUM_LED_SLOTS {
                return Err(DescriptorError::LedSlotOutOfBounds {
                    name,
                    slot: led_slot,
                });
            }
            if let Some(kind) = kind.button_kind() {
                if buffer_index >= NUM_BUTTON_STATES {
                    return Err(DescriptorError::ButtonIndexOutOfBounds {
                        name,
                        index: buffer_index,
                    });
                }
                buttons.push(ButtonDescriptor {
                    name,
                    kind,
                    buffer_index,
                    led_slot,
                    on_cc,
                    off_cc,
                    on_velocity,
                    off_velocity,
                });
            } else {
                // The fine value is read from the following byte.
                if buffer_index + 1 >= INPUT_REPORT_LEN {
                    return Err(DescriptorError::KnobIndexOutOfBounds {
                        name,
                        index: buffer_index,
                    });
                }
                knobs.push(KnobDescriptor {
                    name,
                    buffer_index,
                    cc: on_cc,
                });
            }
        }
        Ok(Self { buttons, knobs })
    }

    #[must_use]
    pub fn buttons(&self) -> &[ButtonDescriptor] {
        &self.buttons
    }

    #[must_use]
    pub fn knobs(&self) -> &[KnobDescriptor] {
        &self.knobs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button(name: &str, kind: ControlKind, buffer_index: usize, led_slot: usize) -> ControlDescriptor {
        ControlDescriptor {
            name: name.to_owned(),
            kind,
            buffer_index,
            led_slot,
            on_cc: 20,
            off_cc: 20,
            on_velocity: 127,
            off_velocity: 0,
        }
    }

    fn knob(name: &str, buffer_index: usize) -> ControlDescriptor {
        ControlDescriptor {
            name: name.to_owned(),
            kind: ControlKind::Knob,
            buffer_index,
            led_slot: 0,
            on_cc: 40,
            off_cc: 0,
            on_velocity: 0,
            off_velocity: 0,
        }
    }

    #[test]
    fn splits_buttons_and_knobs_preserving_order() {
        let table = DescriptorTable::try_new([
            button("play", ControlKind::Hold, 0, 1),
            knob("gain", 8),
            button("fx1", ControlKind::Toggle, 1, 2),
            knob("filter", 10),
            button("shift", ControlKind::Shift, 2, 0),
        ])
        .unwrap();
        let button_names = table
            .buttons()
            .iter()
            .map(|descriptor| descriptor.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(["play", "fx1", "shift"], *button_names);
        let knob_names = table
            .knobs()
            .iter()
            .map(|descriptor| descriptor.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(["gain", "filter"], *knob_names);
    }

    #[test]
    fn rejects_button_index_outside_bitmap() {
        let err = DescriptorTable::try_new([button("play", ControlKind::Hold, NUM_BUTTON_STATES, 0)])
            .unwrap_err();
        assert!(matches!(
            err,
            DescriptorError::ButtonIndexOutOfBounds { index, .. } if index == NUM_BUTTON_STATES
        ));
    }

    #[test]
    fn accepts_last_button_bit() {
        let table =
            DescriptorTable::try_new([button("play", ControlKind::Hold, NUM_BUTTON_STATES - 1, 0)])
                .unwrap();
        assert_eq!(1, table.buttons().len());
    }

    #[test]
    fn rejects_knob_whose_fine_byte_leaves_the_report() {
        let err = DescriptorTable::try_new([knob("gain", INPUT_REPORT_LEN - 1)]).unwrap_err();
        assert!(matches!(err, DescriptorError::KnobIndexOutOfBounds { .. }));
    }

    #[test]
    fn accepts_last_knob_byte_pair() {
        let table = DescriptorTable::try_new([knob("gain", INPUT_REPORT_LEN - 2)]).unwrap();
        assert_eq!(1, table.knobs().len());
    }

    #[test]
    fn rejects_led_slot_outside_output_report() {
        let err = DescriptorTable::try_new([button("play", ControlKind::Hold, 0, NUM_LED_SLOTS + 1)])
            .unwrap_err();
        assert!(matches!(
            err,
            DescriptorError::LedSlotOutOfBounds { slot, .. } if slot == NUM_LED_SLOTS + 1
        ));
    }

    #[test]
    fn control_kind_from_str_is_case_sensitive() {
        assert_eq!(Ok(ControlKind::Toggle), "Toggle".parse());
        assert_eq!(Ok(ControlKind::Knob), "Knob".parse());
        assert!("toggle".parse::<ControlKind>().is_err());
        assert!("Hotcue".parse::<ControlKind>().is_err());
    }
}
