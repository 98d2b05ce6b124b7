// SPDX-FileCopyrightText: The kontrol-x1-midi authors
// SPDX-License-Identifier: MPL-2.0

//! MIDI output driven by [`midir`].

use midir::{ConnectError, InitError, MidiOutput, MidiOutputConnection, SendError};
#[cfg(unix)]
use midir::os::unix::VirtualOutput as _;
use thiserror::Error;

use crate::output::{OutputError, OutputResult};

#[derive(Debug, Error)]
pub enum MidiPortError {
    #[error(transparent)]
    Init(#[from] InitError),
    #[error(transparent)]
    ConnectOutput(#[from] ConnectError<MidiOutput>),
}

impl From<SendError> for OutputError {
    fn from(err: SendError) -> Self {
        OutputError::Send {
            msg: err.to_string().into(),
        }
    }
}

/// MIDI output port backed by a [`midir`] connection.
#[allow(missing_debug_implementations)]
pub struct MidirOutput {
    connection: MidiOutputConnection,
}

impl MidirOutput {
    /// Open a virtual output port that other MIDI applications can
    /// connect to.
    #[cfg(unix)]
    pub fn create_virtual(client_name: &str, port_name: &str) -> Result<Self, MidiPortError> {
        let client = MidiOutput::new(client_name)?;
        let connection = client.create_virtual(port_name)?;
        log::info!("Created virtual MIDI output port `{port_name}`");
        Ok(Self { connection })
    }

    #[must_use]
    pub fn from_connection(connection: MidiOutputConnection) -> Self {
        Self { connection }
    }

    #[must_use]
    pub fn into_connection(self) -> MidiOutputConnection {
        let Self { connection } = self;
        connection
    }
}

impl super::MidiOutputConnection for MidirOutput {
    fn send_midi_output(&mut self, output: &[u8]) -> OutputResult<()> {
        self.connection.send(output)?;
        Ok(())
    }
}
