//! Page widgets the visualizers write into. Missing elements are skipped so
//! either page can run without the other's markup.

use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

use crate::engine::camera::CameraMode;
use crate::scene::bodies::{format_diameter, format_period, BodyDescriptor};

const INFO_PANEL: &str = "planet-info";

pub fn document() -> Option<Document> {
    web_sys::window()?.document()
}

fn element(id: &str) -> Option<HtmlElement> {
    document()?.get_element_by_id(id)?.dyn_into::<HtmlElement>().ok()
}

pub fn set_text(id: &str, text: &str) {
    if let Some(element) = element(id) {
        element.set_text_content(Some(text));
    }
}

pub fn set_visible(id: &str, visible: bool) {
    if let Some(element) = element(id) {
        let display = if visible { "block" } else { "none" };
        if element.style().set_property("display", display).is_err() {
            log::warn!("could not change display of #{id}");
        }
    }
}

pub fn show_body_info(body: &BodyDescriptor) {
    set_text("info-name", body.name);
    set_text("info-diameter", &format_diameter(body.diameter_km));
    set_text("info-period", &format_period(body.period_days));
    set_visible(INFO_PANEL, true);
}

pub fn hide_body_info() {
    set_visible(INFO_PANEL, false);
}

pub fn set_speed_label(multiplier: f32) {
    set_text("speed-value", &format!("{multiplier:.1}x"));
}

pub fn set_camera_label(mode: CameraMode) {
    set_text("camera-mode", mode.label());
}
