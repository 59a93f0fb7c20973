//! Keygen command - generate a fresh pair of API keys

use anyhow::Result;
use kaspay_lib::ApiKeys;

use crate::ui;

pub fn run(export: bool) -> Result<()> {
    let keys = ApiKeys::generate();

    if export {
        println!("export KASPAY_ENC_KEY={}", keys.encryption_key_base64());
        println!("export KASPAY_MAC_KEY={}", keys.mac_key_base64());
        return Ok(());
    }

    ui::header("Kaspay API Keys");
    ui::key_value("Encryption key", &keys.encryption_key_base64());
    ui::key_value("MAC key", &keys.mac_key_base64());
    println!();
    ui::info("Register both keys with Kaspay and keep them secret");

    Ok(())
}
