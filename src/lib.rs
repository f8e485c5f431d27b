mod app;
mod config;
mod engine;
mod error;
mod scene;
mod ui;

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::convert::FromWasmAbi;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Document, Event, EventTarget, HtmlCanvasElement, HtmlInputElement, KeyboardEvent, MouseEvent, Request, RequestInit,
    RequestMode, Response, WebGlRenderingContext, WheelEvent, Window,
};

use crate::app::explorer::Explorer;
use crate::app::orrery::Orrery;
use crate::config::{AppConfig, CONFIG_URL};
use crate::engine::camera::CameraMode;
use crate::engine::renderer::Renderer;
use crate::error::VizError;

const CANVAS_ID: &str = "canvas";

thread_local! {
    static ORRERY: RefCell<Option<Orrery>> = RefCell::new(None);
    static EXPLORER: RefCell<Option<Explorer>> = RefCell::new(None);
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // Trace here so the config's level can only narrow it.
    if console_log::init_with_level(log::Level::Trace).is_err() {
        web_sys::console::warn_1(&"logger already initialised".into());
    }
    log::set_max_level(log::LevelFilter::Info);
}

/// Everything both pages need before building their scene.
struct Page {
    window: Window,
    document: Document,
    canvas: HtmlCanvasElement,
    renderer: Renderer,
    config: AppConfig,
}

impl Page {
    async fn open() -> Result<Page, JsValue> {
        let window = web_sys::window().ok_or("No window")?;
        let document = window.document().ok_or("No document")?;
        let canvas = document
            .get_element_by_id(CANVAS_ID)
            .ok_or_else(|| VizError::MissingElement(CANVAS_ID.to_string()))?
            .dyn_into::<HtmlCanvasElement>()?;

        let gl = canvas
            .get_context("webgl")?
            .ok_or_else(|| VizError::Graphics("WebGL is not available".to_string()))?
            .dyn_into::<WebGlRenderingContext>()?;
        let renderer = Renderer::new(gl)?;

        let config = load_config(&window).await;
        log::set_max_level(config.level_filter());

        Ok(Page { window, document, canvas, renderer, config })
    }
}

/// Sizes the drawing buffer to the window and returns the new size.
fn fit_canvas(window: &Window, canvas: &HtmlCanvasElement) -> (u32, u32) {
    let dimension = |value: Result<JsValue, JsValue>| value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0).max(1.0) as u32;
    let width = dimension(window.inner_width());
    let height = dimension(window.inner_height());
    canvas.set_width(width);
    canvas.set_height(height);
    (width, height)
}

async fn load_config(window: &Window) -> AppConfig {
    match fetch_config(window).await {
        Ok(config) => {
            log::debug!("loaded {CONFIG_URL}");
            config
        }
        Err(err) => {
            log::warn!("using default settings: {}", err.as_string().unwrap_or_else(|| format!("{err:?}")));
            AppConfig::default()
        }
    }
}

async fn fetch_config(window: &Window) -> Result<AppConfig, JsValue> {
    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::Cors);

    let request = Request::new_with_str_and_init(CONFIG_URL, &opts)?;
    let resp: Response = JsFuture::from(window.fetch_with_request(&request)).await?.dyn_into()?;
    if !resp.ok() {
        return Err(JsValue::from_str(&format!("{CONFIG_URL} returned {}", resp.status())));
    }
    let text = JsFuture::from(resp.text()?).await?.as_string().ok_or("config body is not text")?;
    Ok(AppConfig::from_json(&text)?)
}

fn listen<E, F>(target: &EventTarget, event: &str, handler: F) -> Result<(), JsValue>
where
    E: FromWasmAbi + 'static,
    F: FnMut(E) + 'static,
{
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(E)>);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Like `listen`, for optional page controls.
fn listen_by_id<E, F>(document: &Document, id: &str, event: &str, handler: F) -> Result<(), JsValue>
where
    E: FromWasmAbi + 'static,
    F: FnMut(E) + 'static,
{
    match document.get_element_by_id(id) {
        Some(element) => listen(&element, event, handler),
        None => {
            log::debug!("no #{id} on this page");
            Ok(())
        }
    }
}

fn start_loop<F: FnMut() + 'static>(mut frame: F) -> Result<(), JsValue> {
    let f: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let g = f.clone();

    *g.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame();
        if let Some(closure) = f.borrow().as_ref() {
            if let Err(err) = request_animation_frame(closure) {
                log::error!("animation loop stopped: {err:?}");
            }
        }
    }) as Box<dyn FnMut()>));

    if let Some(closure) = g.borrow().as_ref() {
        request_animation_frame(closure)?;
    }
    Ok(())
}

fn request_animation_frame(f: &Closure<dyn FnMut()>) -> Result<i32, JsValue> {
    web_sys::window().ok_or("No window")?.request_animation_frame(f.as_ref().unchecked_ref())
}

fn with_orrery(f: impl FnOnce(&mut Orrery)) {
    ORRERY.with(|o| {
        if let Some(orrery) = o.borrow_mut().as_mut() {
            f(orrery);
        }
    });
}

fn with_explorer<R>(f: impl FnOnce(&mut Explorer) -> R) -> Option<R> {
    EXPLORER.with(|e| e.borrow_mut().as_mut().map(f))
}

#[wasm_bindgen]
pub async fn init_orrery() -> Result<(), JsValue> {
    let page = Page::open().await?;
    let (width, height) = fit_canvas(&page.window, &page.canvas);
    let orrery = Orrery::new(page.renderer, &page.config, width, height)?;
    ORRERY.with(|o| *o.borrow_mut() = Some(orrery));

    let canvas = page.canvas;
    listen(&canvas, "mousedown", |event: MouseEvent| {
        with_orrery(|orrery| orrery.handle_mouse_down(event.offset_x(), event.offset_y(), event.button()));
    })?;
    // Right-drag pans.
    listen(&canvas, "contextmenu", |event: MouseEvent| event.prevent_default())?;
    listen(&canvas, "mousemove", |event: MouseEvent| {
        with_orrery(|orrery| orrery.handle_mouse_move(event.offset_x(), event.offset_y()));
    })?;
    listen(&page.window, "mouseup", |_: MouseEvent| with_orrery(|orrery| orrery.handle_mouse_up()))?;
    listen(&canvas, "wheel", |event: WheelEvent| {
        event.prevent_default();
        with_orrery(|orrery| orrery.handle_wheel(event.delta_y() as f32));
    })?;

    let window = page.window.clone();
    listen(&page.window, "resize", move |_: Event| {
        let (width, height) = fit_canvas(&window, &canvas);
        with_orrery(|orrery| orrery.resize(width, height));
    })?;

    start_loop(|| {
        with_orrery(|orrery| {
            orrery.update();
            orrery.render();
        })
    })
}

#[wasm_bindgen]
pub async fn init_explorer() -> Result<(), JsValue> {
    let page = Page::open().await?;
    let (width, height) = fit_canvas(&page.window, &page.canvas);
    let explorer = Explorer::new(page.renderer, &page.config, width, height)?;
    EXPLORER.with(|e| *e.borrow_mut() = Some(explorer));

    let document = page.document;
    let window = page.window;
    let canvas = page.canvas;

    if let Some(slider) = document
        .get_element_by_id("speed-slider")
        .and_then(|element| element.dyn_into::<HtmlInputElement>().ok())
    {
        let target = slider.clone();
        listen(&target, "input", move |_: Event| {
            let value = slider.value();
            if let Some(Err(err)) = with_explorer(|explorer| explorer.set_time_multiplier(&value)) {
                log::warn!("{err}");
            }
        })?;
    }

    listen_by_id(&document, "toggle-orbits", "click", |_: MouseEvent| {
        with_explorer(|explorer| explorer.toggle_orbits());
    })?;
    listen_by_id(&document, "toggle-belt", "click", |_: MouseEvent| {
        with_explorer(|explorer| explorer.toggle_belt());
    })?;
    {
        let lock_target = canvas.clone();
        let lock_document = document.clone();
        listen_by_id(&document, "toggle-camera", "click", move |_: MouseEvent| {
            match with_explorer(|explorer| explorer.toggle_camera_mode()) {
                Some(CameraMode::PointerLock) => lock_target.request_pointer_lock(),
                Some(CameraMode::Orbit) => lock_document.exit_pointer_lock(),
                None => {}
            }
        })?;
    }

    {
        let lock_target = canvas.clone();
        listen(&canvas, "click", move |event: MouseEvent| {
            let wants_lock = with_explorer(|explorer| explorer.wants_pointer_lock()).unwrap_or(false);
            if wants_lock {
                lock_target.request_pointer_lock();
                return;
            }
            with_explorer(|explorer| explorer.handle_click(event.offset_x() as f32, event.offset_y() as f32));
        })?;
    }
    listen(&canvas, "mousedown", |event: MouseEvent| {
        with_explorer(|explorer| explorer.handle_mouse_down(event.offset_x(), event.offset_y(), event.button()));
    })?;
    listen(&canvas, "contextmenu", |event: MouseEvent| event.prevent_default())?;
    listen(&window, "mouseup", |_: MouseEvent| {
        with_explorer(|explorer| explorer.handle_mouse_up());
    })?;
    listen(&canvas, "mousemove", |event: MouseEvent| {
        with_explorer(|explorer| {
            explorer.handle_mouse_move(event.offset_x(), event.offset_y(), event.movement_x(), event.movement_y())
        });
    })?;
    listen(&canvas, "wheel", |event: WheelEvent| {
        event.prevent_default();
        with_explorer(|explorer| explorer.handle_wheel(event.delta_y() as f32));
    })?;

    {
        let lock_document = document.clone();
        listen(&document, "pointerlockchange", move |_: Event| {
            let locked = lock_document.pointer_lock_element().is_some();
            with_explorer(|explorer| explorer.set_pointer_locked(locked));
        })?;
    }

    listen(&window, "keydown", |event: KeyboardEvent| {
        if with_explorer(|explorer| explorer.key_down(&event.key())).unwrap_or(false) {
            event.prevent_default();
        }
    })?;
    listen(&window, "keyup", |event: KeyboardEvent| {
        if with_explorer(|explorer| explorer.key_up(&event.key())).unwrap_or(false) {
            event.prevent_default();
        }
    })?;

    {
        let resize_window = window.clone();
        listen(&window, "resize", move |_: Event| {
            let (width, height) = fit_canvas(&resize_window, &canvas);
            with_explorer(|explorer| explorer.resize(width, height));
        })?;
    }

    start_loop(|| {
        with_explorer(|explorer| {
            explorer.update();
            explorer.render();
        });
    })
}

#[wasm_bindgen]
pub fn toggle_orbits() {
    with_orrery(|orrery| orrery.toggle_orbits());
}

#[wasm_bindgen]
pub fn toggle_rotation() {
    with_orrery(|orrery| orrery.toggle_rotation());
}

/// Invalid slider text is logged and leaves the speed unchanged.
#[wasm_bindgen]
pub fn update_speed(value: &str) {
    with_orrery(|orrery| {
        if let Err(err) = orrery.update_speed(value) {
            log::warn!("{err}");
        }
    });
}
