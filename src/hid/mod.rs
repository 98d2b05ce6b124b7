// SPDX-FileCopyrightText: The kontrol-x1-midi authors
// SPDX-License-Identifier: MPL-2.0

//! HID transport glue.
//!
//! Thin wrappers around `hidapi` for finding and talking to the
//! controller. Read timeouts surface as zero-length reads, not as
//! errors; retry policy is entirely up to the caller.

use std::{
    ops::{Deref, DerefMut},
    time::Duration,
};

use hidapi::DeviceInfo;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HidDeviceError {
    #[error("Device not connected")]
    NotConnected,

    #[error("Device not supported")]
    NotSupported,
}

#[derive(Debug, Error)]
pub enum HidError {
    #[error(transparent)]
    Device(#[from] HidDeviceError),

    #[error(transparent)]
    Api(#[from] hidapi::HidError),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

pub type HidResult<T> = std::result::Result<T, HidError>;

#[allow(missing_debug_implementations)]
pub struct HidApi(hidapi::HidApi);

impl Deref for HidApi {
    type Target = hidapi::HidApi;

    fn deref(&self) -> &Self::Target {
        let Self(inner) = self;
        inner
    }
}

impl DerefMut for HidApi {
    fn deref_mut(&mut self) -> &mut Self::Target {
        let Self(inner) = self;
        inner
    }
}

impl HidApi {
    pub fn new() -> HidResult<Self> {
        let inner = hidapi::HidApi::new_without_enumerate()?;
        Ok(Self(inner))
    }

    /// Enumerate all connected HID devices.
    pub fn query_devices(&mut self) -> HidResult<impl Iterator<Item = &DeviceInfo>> {
        self.refresh_devices()?;
        Ok(self.device_list())
    }

    /// Find the first device matching the given vendor/product id.
    pub fn find_device(&mut self, vendor_id: u16, product_id: u16) -> HidResult<Option<HidDevice>> {
        Ok(self.query_devices()?.find_map(|info| {
            (info.vendor_id() == vendor_id && info.product_id() == product_id)
                .then(|| HidDevice::new(info.clone()))
        }))
    }
}

#[allow(missing_debug_implementations)]
pub struct HidDevice {
    info: DeviceInfo,

    connected: Option<hidapi::HidDevice>,
}

impl HidDevice {
    #[must_use]
    pub fn new(info: DeviceInfo) -> Self {
        Self {
            info,
            connected: None,
        }
    }

    #[must_use]
    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.is_some()
    }

    pub fn connect(&mut self, api: &HidApi) -> HidResult<()> {
        if self.is_connected() {
            return Ok(());
        }
        let connected = api.open_path(self.info.path())?;
        // Blocking is controlled explicitly by a timeout with each read
        // request. Set up front to ensure a consistent initial state.
        connected.set_blocking_mode(true)?;
        self.connected = Some(connected);
        debug_assert!(self.is_connected());
        Ok(())
    }

    pub fn disconnect(&mut self) {
        // The optional `HidDevice` is implicitly dropped and closed by
        // the assignment.
        self.connected = None;
        debug_assert!(!self.is_connected());
    }

    fn connected(&self) -> HidResult<&hidapi::HidDevice> {
        self.connected
            .as_ref()
            .ok_or(HidDeviceError::NotConnected.into())
    }

    /// Blocking read into the buffer.
    ///
    /// Returns the number of bytes read, 0 if the timeout expired
    /// before the device had anything to say.
    pub fn read(&self, buffer: &mut [u8], timeout: Duration) -> HidResult<usize> {
        Ok(self
            .connected()?
            .read_timeout(buffer, timeout_millis(timeout))?)
    }

    pub fn write(&self, data: &[u8]) -> HidResult<usize> {
        Ok(self.connected()?.write(data)?)
    }
}

const MAX_TIMEOUT_MILLIS: i32 = i32::MAX;

#[allow(clippy::cast_possible_truncation)]
fn timeout_millis(timeout: Duration) -> i32 {
    // Verify that the timeout is specified in full milliseconds
    // to prevent losing precision unintentionally.
    debug_assert_eq!(0, timeout.subsec_nanos() % 1_000_000);
    // Saturating conversion from u128 to i32
    timeout.as_millis().min(MAX_TIMEOUT_MILLIS as _) as _
}
