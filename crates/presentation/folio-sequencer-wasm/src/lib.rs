use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

use folio_sequencer_core::{
    page_colors, Config, HostEvent, Inputs, Outputs, PageLayout, Session,
};

mod logging;

pub use logging::parse_level;

#[wasm_bindgen]
pub struct FolioSession {
    core: Session,
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn outputs_to_js(out: &Outputs) -> Result<JsValue, JsError> {
    swb::to_value(out).map_err(|e| JsError::new(&format!("outputs error: {e}")))
}

#[wasm_bindgen]
impl FolioSession {
    /// Create a session for one page. `config` may be undefined/null for the
    /// site defaults; `layout` is the page as measured before DOMContentLoaded.
    /// Example:
    ///   new FolioSession(null, { path: "/index.html", slides: [...], ... })
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue, layout: JsValue) -> Result<FolioSession, JsError> {
        console_error_panic_hook::set_once();

        let cfg: Config = if jsvalue_is_undefined_or_null(&config) {
            Config::default()
        } else {
            swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))?
        };
        if jsvalue_is_undefined_or_null(&layout) {
            return Err(JsError::new("layout is null/undefined"));
        }
        let layout: PageLayout =
            swb::from_value(layout).map_err(|e| JsError::new(&format!("layout error: {e}")))?;
        let core = Session::new(cfg, layout).map_err(|e| JsError::new(&format!("session error: {e}")))?;
        Ok(FolioSession { core })
    }

    /// Apply `inputs.events` then advance the clock by `dt_ms`. Returns the
    /// effects and events produced, stamped with their virtual time.
    #[wasm_bindgen]
    pub fn update(&mut self, dt_ms: f64, inputs_json: JsValue) -> Result<JsValue, JsError> {
        let inputs: Inputs = if jsvalue_is_undefined_or_null(&inputs_json) {
            Inputs::default()
        } else {
            swb::from_value(inputs_json).map_err(|e| JsError::new(&format!("inputs error: {e}")))?
        };
        outputs_to_js(self.core.update(millis(dt_ms), inputs))
    }

    /// Apply a single host event without advancing the clock.
    #[wasm_bindgen]
    pub fn handle(&mut self, event: JsValue) -> Result<JsValue, JsError> {
        let event: HostEvent =
            swb::from_value(event).map_err(|e| JsError::new(&format!("event error: {e}")))?;
        outputs_to_js(self.core.handle(event))
    }

    /// Advance the clock by `dt_ms`, firing every task that comes due.
    #[wasm_bindgen]
    pub fn advance(&mut self, dt_ms: f64) -> Result<JsValue, JsError> {
        outputs_to_js(self.core.advance(millis(dt_ms)))
    }

    /// Snapshot of phase, flags and component state.
    #[wasm_bindgen]
    pub fn view(&self) -> Result<JsValue, JsError> {
        swb::to_value(&self.core.view()).map_err(|e| JsError::new(&format!("view error: {e}")))
    }

    /// Current virtual time in ms.
    #[wasm_bindgen]
    pub fn now(&self) -> f64 {
        self.core.now() as f64
    }

    /// Time of the next scheduled task, or undefined when idle. Hosts use
    /// this to arm a single `setTimeout`.
    #[wasm_bindgen(js_name = next_due)]
    pub fn next_due(&self) -> Option<f64> {
        self.core.next_due().map(|at| at as f64)
    }
}

/// Negative and NaN durations clamp to zero.
fn millis(dt_ms: f64) -> u64 {
    if dt_ms.is_finite() && dt_ms > 0.0 {
        dt_ms.round() as u64
    } else {
        0
    }
}

/// Split card text into word and whitespace segments for word reveals.
#[wasm_bindgen(js_name = split_words)]
pub fn split_words(text: &str) -> Result<JsValue, JsError> {
    swb::to_value(&folio_sequencer_core::split_words(text))
        .map_err(|e| JsError::new(&format!("split_words error: {e}")))
}

/// Background colour for a page URL.
#[wasm_bindgen(js_name = page_color)]
pub fn page_color(url: &str) -> String {
    page_colors::page_color(url).to_string()
}

/// Logo tone (`"dark"` or `"light"`) for a page URL.
#[wasm_bindgen(js_name = logo_color)]
pub fn logo_color(url: &str) -> String {
    page_colors::logo_tone(url).as_str().to_string()
}

#[wasm_bindgen(js_name = has_dark_background)]
pub fn has_dark_background(url: &str) -> bool {
    page_colors::has_dark_background(url)
}

/// Route core `log` records to the browser console at `level`
/// (`error`, `warn`, `info`, `debug`, `trace` or `off`).
#[wasm_bindgen(js_name = init_logging)]
pub fn init_logging(level: &str) {
    console_error_panic_hook::set_once();
    logging::install(logging::parse_level(level));
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millis_clamps_bad_durations() {
        assert_eq!(millis(16.6), 17);
        assert_eq!(millis(-5.0), 0);
        assert_eq!(millis(f64::NAN), 0);
    }

    #[test]
    fn color_helpers_follow_page_table() {
        assert_eq!(page_color("proj-nqs.html"), "#000000");
        assert_eq!(logo_color("/index.html"), "dark");
        assert!(has_dark_background("https://example.com/proj-regapp.html"));
    }
}
