// SPDX-FileCopyrightText: The kontrol-x1-midi authors
// SPDX-License-Identifier: MPL-2.0

//! Encoding of button state into the outbound LED report.

use std::borrow::Cow;

use thiserror::Error;

use crate::descriptor::{ButtonDescriptor, NUM_LED_SLOTS, OUTPUT_REPORT_LEN};

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Send: {msg}")]
    Send { msg: Cow<'static, str> },
}

pub type OutputResult<T> = std::result::Result<T, OutputError>;

/// Simple LED
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Led {
    Off,
    On,
}

impl Led {
    #[must_use]
    pub const fn from_active(active: bool) -> Self {
        if active {
            Self::On
        } else {
            Self::Off
        }
    }
}

/// First byte of every LED report.
///
/// Points to the Consumer Page that controls the LEDs of the device.
pub const LED_REPORT_MARKER: u8 = 0x0c;

const LED_BRIGHT: u8 = 0x7f;
const LED_DIM: u8 = 0x05;

#[must_use]
pub const fn led_to_brightness(led: Led) -> u8 {
    match led {
        Led::On => LED_BRIGHT,
        Led::Off => LED_DIM,
    }
}

#[derive(Debug, Error)]
#[error("LED slot {slot} of `{name}` exceeds the output report")]
pub struct LedIndexOverflow {
    pub name: String,
    pub slot: usize,
}

/// Project button state into the fixed-size LED report.
///
/// Byte 0 carries the report marker. Every descriptor with a non-zero
/// LED slot sets byte `slot` to its brightness; bytes no descriptor
/// claims are left at their default.
pub fn encode_led_report<'a, I>(leds: I) -> Result<[u8; OUTPUT_REPORT_LEN], LedIndexOverflow>
where
    I: IntoIterator<Item = (&'a ButtonDescriptor, Led)>,
{
    let mut report = [0; OUTPUT_REPORT_LEN];
    report[0] = LED_REPORT_MARKER;
    for (descriptor, led) in leds {
        let slot = descriptor.led_slot;
        if slot == 0 {
            // No LED associated with this control.
            continue;
        }
        if slot > NUM_LED_SLOTS {
            return Err(LedIndexOverflow {
                name: descriptor.name.clone(),
                slot,
            });
        }
        report[slot] = led_to_brightness(led);
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ButtonKind;

    fn button(name: &str, led_slot: usize) -> ButtonDescriptor {
        ButtonDescriptor {
            name: name.to_owned(),
            kind: ButtonKind::Hold,
            buffer_index: 0,
            led_slot,
            on_cc: 20,
            off_cc: 20,
            on_velocity: 127,
            off_velocity: 0,
        }
    }

    #[test]
    fn report_starts_with_the_marker() {
        let leds: [(&ButtonDescriptor, Led); 0] = [];
        let report = encode_led_report(leds).unwrap();
        assert_eq!(LED_REPORT_MARKER, report[0]);
        assert!(report[1..].iter().all(|&byte| byte == 0));
    }

    #[test]
    fn slot_zero_never_touches_the_report() {
        let descriptor = button("shift", 0);
        let report = encode_led_report([(&descriptor, Led::On)]).unwrap();
        assert_eq!(LED_REPORT_MARKER, report[0]);
        assert!(report[1..].iter().all(|&byte| byte == 0));
    }

    #[test]
    fn active_buttons_are_bright_inactive_buttons_are_dim() {
        let play = button("play", 3);
        let cue = button("cue", 7);
        let report = encode_led_report([(&play, Led::On), (&cue, Led::Off)]).unwrap();
        assert_eq!(LED_BRIGHT, report[3]);
        assert_eq!(LED_DIM, report[7]);
    }

    #[test]
    fn last_slot_is_addressable() {
        let descriptor = button("fx", NUM_LED_SLOTS);
        let report = encode_led_report([(&descriptor, Led::On)]).unwrap();
        assert_eq!(LED_BRIGHT, report[OUTPUT_REPORT_LEN - 1]);
    }

    #[test]
    fn overflowing_slot_is_rejected() {
        let descriptor = button("fx", NUM_LED_SLOTS + 1);
        let err = encode_led_report([(&descriptor, Led::On)]).unwrap_err();
        assert_eq!(NUM_LED_SLOTS + 1, err.slot);
    }
}
