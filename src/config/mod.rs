// SPDX-FileCopyrightText: The kontrol-x1-midi authors
// SPDX-License-Identifier: MPL-2.0

//! Loading and compiling the control map.
//!
//! The control map describes every control of the surface as one
//! record: buffer position, LED slot and MIDI mapping. Records
//! whose `type` names no recognized control kind (e.g. encoders) do not
//! describe a pressable button or knob and are filtered out when the
//! descriptor table is compiled.

use std::{fs, path::Path};

use serde::Deserialize;
use thiserror::Error;

use crate::descriptor::{ControlDescriptor, ControlKind, DescriptorError, DescriptorTable};

/// The bundled control map of the X1 surface.
const DEFAULT_CONTROLS: &str = include_str!("../../controls.yaml");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read control map: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse control map: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
}

/// One raw control record as stored in the control map.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ControlRecord {
    /// The control description
    pub name: String,
    /// Control kind, one of `Toggle`, `Hold`, `Shift` or `Knob`
    #[serde(rename = "type")]
    pub kind: String,
    /// Buffer index
    #[serde(rename = "bufIdx")]
    pub buffer_index: usize,
    /// LED slot, 0 = none
    #[serde(rename = "ledIdx", default)]
    pub led_index: usize,
    /// Turn on MIDI CC
    #[serde(rename = "onMidiCC", default)]
    pub on_midi_cc: u8,
    /// Turn off MIDI CC
    #[serde(rename = "offMidiCC", default)]
    pub off_midi_cc: u8,
    /// Turn on velocity
    #[serde(rename = "onVelocity", default)]
    pub on_velocity: u8,
    /// Turn off velocity
    #[serde(rename = "offVelocity", default)]
    pub off_velocity: u8,
}

/// Compile raw records into the validated descriptor table.
///
/// Records with an unrecognized kind are silently excluded, everything
/// else must pass the table's bounds validation.
pub fn compile_records(
    records: impl IntoIterator<Item = ControlRecord>,
) -> Result<DescriptorTable, DescriptorError> {
    let descriptors = records.into_iter().filter_map(|record| {
        let ControlRecord {
            name,
            kind,
            buffer_index,
            led_index,
            on_midi_cc,
            off_midi_cc,
            on_velocity,
            off_velocity,
        } = record;
        let Ok(kind) = kind.parse::<ControlKind>() else {
            // No physical button or knob behind this record.
            log::debug!("Skipping control `{name}` of kind `{kind}`");
            return None;
        };
        Some(ControlDescriptor {
            name,
            kind,
            buffer_index,
            led_slot: led_index,
            on_cc: on_midi_cc,
            off_cc: off_midi_cc,
            on_velocity,
            off_velocity,
        })
    });
    DescriptorTable::try_new(descriptors)
}

pub fn parse_records(yaml: &str) -> Result<Vec<ControlRecord>, ConfigError> {
    Ok(serde_yaml::from_str(yaml)?)
}

pub fn load_table_from_str(yaml: &str) -> Result<DescriptorTable, ConfigError> {
    let records = parse_records(yaml)?;
    Ok(compile_records(records)?)
}

pub fn load_table_from_path(path: impl AsRef<Path>) -> Result<DescriptorTable, ConfigError> {
    let yaml = fs::read_to_string(path)?;
    load_table_from_str(&yaml)
}

/// Load and compile the bundled default control map.
pub fn load_default_table() -> Result<DescriptorTable, ConfigError> {
    load_table_from_str(DEFAULT_CONTROLS)
}
