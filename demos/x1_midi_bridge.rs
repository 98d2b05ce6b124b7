// SPDX-FileCopyrightText: The kontrol-x1-midi authors
// SPDX-License-Identifier: MPL-2.0

use std::{ops::Not as _, sync::atomic::AtomicBool};

use kontrol_x1_midi::{bridge, config, midi::MidirOutput, Bridge, HidApi, TranslationEngine};

fn main() {
    pretty_env_logger::init();

    match run() {
        Ok(()) => (),
        Err(err) => log::error!("{err}"),
    }
}

fn run() -> anyhow::Result<()> {
    log::info!("Initializing HID API");
    let mut api = HidApi::new()?;

    log::info!("Searching for a Traktor Kontrol X1");
    let Some(mut device) = api.find_device(bridge::VENDOR_ID, bridge::PRODUCT_ID)? else {
        log::warn!("Found no supported device");
        return Ok(());
    };
    let device_info = device.info().clone();
    log::info!(
        "Found HID device {manufacturer_name} {product_name}: path = {path}, vid = \
         0x{vid:0.4x}, pid = 0x{pid:0.4x}, sn = '{sn}'",
        manufacturer_name = device_info
            .manufacturer_string()
            .and_then(|s| s.trim().is_empty().not().then_some(s))
            .unwrap_or("(no manufacturer name)"),
        product_name = device_info
            .product_string()
            .and_then(|s| s.trim().is_empty().not().then_some(s))
            .unwrap_or("(no product name)"),
        path = device_info.path().to_str().unwrap_or_default(),
        vid = device_info.vendor_id(),
        pid = device_info.product_id(),
        sn = device_info.serial_number().unwrap_or_default(),
    );
    device.connect(&api)?;

    let table = config::load_default_table()?;
    log::info!(
        "Loaded control map: {num_buttons} button(s), {num_knobs} knob(s)",
        num_buttons = table.buttons().len(),
        num_knobs = table.knobs().len(),
    );
    let engine = TranslationEngine::new(table);

    let midi_output = MidirOutput::create_virtual("kontrol-x1-midi", "Traktor X1")?;

    let mut bridge = Bridge::attach(device, midi_output, engine)?;
    log::info!("Polling for input reports");
    let stop = AtomicBool::new(false);
    bridge.run(&stop)?;
    Ok(())
}
