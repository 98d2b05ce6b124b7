// SPDX-FileCopyrightText: The kontrol-x1-midi authors
// SPDX-License-Identifier: MPL-2.0

use super::*;

#[test]
fn expand_bits_of_empty_slice() {
    assert!(expand_bits(&[]).is_empty());
}

#[test]
fn expand_bits_lsb_first() {
    let bits = expand_bits(&[0b0000_0101, 0b1000_0000]);
    assert_eq!(16, bits.len());
    assert!(bits[0]);
    assert!(!bits[1]);
    assert!(bits[2]);
    assert!(!bits[7]);
    assert!(!bits[8]);
    assert!(bits[15]);
}

#[test]
fn expand_bits_length() {
    assert_eq!(40, expand_bits(&[0xff; 5]).len());
}

#[test]
fn toggle_fires_only_on_rising_edge() {
    let mut state = ButtonState::default();

    // Press: switched on.
    assert_eq!(
        Transition::SwitchedOn,
        state.update(ButtonKind::Toggle, true)
    );
    assert!(state.is_active());

    // Sustained press: nothing.
    assert_eq!(Transition::Unchanged, state.update(ButtonKind::Toggle, true));
    assert!(state.is_active());

    // Release: nothing, but the edge is remembered.
    assert_eq!(
        Transition::Unchanged,
        state.update(ButtonKind::Toggle, false)
    );
    assert!(state.is_active());

    // Next press: switched off.
    assert_eq!(
        Transition::SwitchedOff,
        state.update(ButtonKind::Toggle, true)
    );
    assert!(!state.is_active());
}

#[test]
fn toggle_ignores_sustained_release() {
    let mut state = ButtonState::default();
    assert_eq!(
        Transition::Unchanged,
        state.update(ButtonKind::Toggle, false)
    );
    assert_eq!(
        Transition::Unchanged,
        state.update(ButtonKind::Toggle, false)
    );
    assert!(!state.is_active());
}

#[test]
fn hold_mirrors_the_pressed_level() {
    let mut state = ButtonState::default();
    assert_eq!(Transition::SwitchedOn, state.update(ButtonKind::Hold, true));
    assert!(state.is_active());
    assert_eq!(Transition::Unchanged, state.update(ButtonKind::Hold, true));
    assert_eq!(
        Transition::SwitchedOff,
        state.update(ButtonKind::Hold, false)
    );
    assert!(!state.is_active());
    assert_eq!(Transition::Unchanged, state.update(ButtonKind::Hold, false));
}

#[test]
fn shift_shares_the_hold_level_semantics() {
    let mut state = ButtonState::default();
    assert_eq!(
        Transition::SwitchedOn,
        state.update(ButtonKind::Shift, true)
    );
    assert_eq!(Transition::Unchanged, state.update(ButtonKind::Shift, true));
    assert_eq!(
        Transition::SwitchedOff,
        state.update(ButtonKind::Shift, false)
    );
}

#[test]
#[allow(clippy::float_cmp)]
fn knob_position_full_scale() {
    assert_eq!(0.0, knob_position(0, 0));
    assert_eq!(0.5, knob_position(8, 0));
    assert_eq!(1.0, knob_position(16, 0));
}

#[test]
fn knob_position_saturates_beyond_full_scale() {
    assert!(knob_position(17, 0) <= 1.0);
    assert!(knob_position(255, 255) <= 1.0);
}

#[test]
fn decode_knob_values() {
    assert_eq!(0, decode_knob(0, 0));
    // raw = 8.0 -> round((8 / 16) * 127) = 64
    assert_eq!(64, decode_knob(8, 0));
    assert_eq!(127, decode_knob(16, 0));
    // Out-of-range coarse bytes clamp to the MIDI data range.
    assert_eq!(127, decode_knob(255, 255));
}

#[test]
fn decode_knob_is_monotonic() {
    let mut last = 0;
    for coarse in 0..=16 {
        for fine in (0..=255).step_by(17) {
            let value = decode_knob(coarse, fine);
            assert!(
                value >= last,
                "decode_knob({coarse}, {fine}) = {value} < {last}"
            );
            last = value;
        }
    }
}

#[test]
fn knob_state_detects_changes() {
    let mut state = KnobState::default();
    assert!(!state.replace(0));
    assert!(state.replace(64));
    assert_eq!(64, state.value());
    assert!(!state.replace(64));
    assert!(state.replace(63));
    assert_eq!(63, state.value());
}
