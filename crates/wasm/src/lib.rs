mod audio;
mod bridge;
mod dom;
mod listeners;
mod logging;
mod scan;
mod storage;

use wasm_bindgen::prelude::*;

/// Attach the page scripts to the current document.
///
/// `config_json` overrides [`stellar_core::SiteConfig`] fields; absent fields
/// keep their defaults. Call once, after the DOM is parsed.
#[wasm_bindgen]
pub fn mount(config_json: Option<String>) -> Result<(), JsError> {
    console_error_panic_hook::set_once();
    logging::init();
    bridge::mount(config_json.as_deref()).map_err(|e| JsError::new(&format!("{e:#}")))
}

/// Class names of the display modes currently on, for poking at from the
/// devtools console.
#[wasm_bindgen]
pub fn active_modes() -> Vec<String> {
    bridge::active_modes()
}
