//! Yippee entry point
//!
//! On the web this is the content-script driver: DOM view, pointer input,
//! localStorage persistence and the animation frame loop. Natively it runs a
//! short headless simulation against in-memory storage.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_pet {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{CustomEvent, Document, HtmlElement, HtmlImageElement, MouseEvent};

    use yippee::audio::{AudioManager, SoundEffect};
    use yippee::persistence::{LocalStorage, PersistedStateStore};
    use yippee::platform::{DragTracker, Message, page_point};
    use yippee::settings::Effect;
    use yippee::sim::{Event, RootModel, Viewport};
    use yippee::{FrameScheduler, Settings, TickOutcome, Visibility};

    /// Pet sprite
    const PET_SPRITE_URL: &str =
        "https://media.tenor.com/dKfHDccWYT0AAAAi/tbh-creature-pixel-art.gif";
    /// Window event the extension glue uses to forward control messages
    const MESSAGE_EVENT: &str = "yippee-message";

    fn js_err(e: impl std::fmt::Display) -> JsValue {
        JsValue::from_str(&e.to_string())
    }

    fn set_styles(el: &HtmlElement, styles: &[(&str, &str)]) {
        let style = el.style();
        for (name, value) in styles {
            let _ = style.set_property(name, value);
        }
    }

    /// Renders the model as fixed-position elements
    struct DomView {
        document: Document,
        pet: HtmlImageElement,
        apples: Vec<HtmlElement>,
    }

    impl DomView {
        fn new(document: Document) -> Result<Self, JsValue> {
            let pet: HtmlImageElement = document.create_element("img")?.dyn_into()?;
            pet.set_src(PET_SPRITE_URL);
            pet.set_class_name("yippee");
            set_styles(
                &pet,
                &[
                    ("all", "unset"),
                    ("position", "fixed"),
                    ("bottom", "0"),
                    ("left", "0px"),
                    ("max-width", "15vw"),
                    ("max-height", "25vh"),
                    ("opacity", "0.9"),
                    ("pointer-events", "none"),
                    ("z-index", "2147483647"),
                ],
            );
            document
                .body()
                .ok_or_else(|| JsValue::from_str("no body"))?
                .append_child(&pet)?;

            Ok(Self {
                document,
                pet,
                apples: Vec::new(),
            })
        }

        fn viewport(&self) -> Viewport {
            let height = web_sys::window()
                .and_then(|w| w.inner_height().ok())
                .and_then(|h| h.as_f64())
                .unwrap_or(0.0) as f32;
            Viewport {
                height,
                sprite_height: self.pet.client_height() as f32,
            }
        }

        fn set_visible(&self, visible: bool) {
            let display = if visible { "block" } else { "none" };
            let _ = self.pet.style().set_property("display", display);
            for apple in &self.apples {
                let _ = apple.style().set_property("display", display);
            }
        }

        fn create_apple(&self) -> Result<HtmlElement, JsValue> {
            let el: HtmlElement = self.document.create_element("div")?.dyn_into()?;
            el.set_text_content(Some("\u{1F34E}"));
            set_styles(
                &el,
                &[
                    ("all", "unset"),
                    ("position", "fixed"),
                    ("font-size", "32px"),
                    ("line-height", "1"),
                    ("pointer-events", "none"),
                    ("z-index", "2147483646"),
                ],
            );
            if let Some(body) = self.document.body() {
                body.append_child(&el)?;
            }
            Ok(el)
        }

        fn render(&mut self, model: &RootModel) {
            let pet = &model.yippee;
            let width = self.pet.client_width() as f32;
            let flip = if pet.flipped { -1 } else { 1 };
            let _ = self
                .pet
                .style()
                .set_property("left", &format!("{}px", pet.pos.x - 0.5 * width));
            let _ = self
                .pet
                .style()
                .set_property("bottom", &format!("{}px", pet.pos.y));
            let _ = self
                .pet
                .style()
                .set_property("transform", &format!("scale({}, 1)", flip));

            while self.apples.len() < model.apples.len() {
                match self.create_apple() {
                    Ok(el) => self.apples.push(el),
                    Err(e) => {
                        log::error!("Failed to create apple element: {:?}", e);
                        break;
                    }
                }
            }
            while self.apples.len() > model.apples.len() {
                if let Some(el) = self.apples.pop() {
                    el.remove();
                }
            }

            for (el, apple) in self.apples.iter().zip(&model.apples) {
                let style = el.style();
                let _ = style.set_property("left", &format!("{}px", apple.pos.x - 16.0));
                let _ = style.set_property("bottom", &format!("{}px", apple.pos.y));
                let _ = style.set_property("transform", &format!("rotate({}rad)", apple.rotation));
            }
        }
    }

    /// Content-script state
    struct Pet {
        scheduler: FrameScheduler<LocalStorage>,
        settings: Settings,
        settings_storage: LocalStorage,
        audio: AudioManager,
        view: DomView,
        drag: DragTracker,
    }

    impl Pet {
        fn page_visible(&self) -> bool {
            self.view.document.visibility_state() == web_sys::VisibilityState::Visible
        }

        fn frame(&mut self, time: f64) -> TickOutcome {
            let visibility = if self.settings.enabled && self.page_visible() {
                Visibility::Visible
            } else {
                Visibility::Hidden
            };
            let viewport = self.view.viewport();
            let outcome = self.scheduler.tick(time, visibility, viewport);
            if visibility == Visibility::Visible {
                self.view.render(self.scheduler.model());
            }
            outcome
        }

        fn handle_message(&mut self, message: Message) {
            match self.settings.apply(&message) {
                Effect::None => return,
                Effect::EnabledChanged(enabled) => {
                    log::info!("Pet {}", if enabled { "enabled" } else { "disabled" });
                    self.view.set_visible(enabled);
                    if enabled {
                        self.audio.play(SoundEffect::Yippee);
                    }
                }
                Effect::VolumeChanged(volume) => self.audio.set_volume(volume),
                Effect::DropApple => {
                    let viewport = self.view.viewport();
                    let x = self.scheduler.model().yippee.pos.x;
                    self.scheduler
                        .dispatch(Event::AppleDropped(Vec2::new(x, viewport.height)), viewport);
                    self.audio.play(SoundEffect::Yippee);
                    return;
                }
            }
            if let Err(e) = self.settings.save(&self.settings_storage) {
                log::warn!("Failed to save settings: {}", e);
            }
        }

        fn pointer(&self, event: &MouseEvent) -> Vec2 {
            let viewport = self.view.viewport();
            page_point(event.client_x() as f32, event.client_y() as f32, viewport.height)
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Yippee starting...");

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let settings_storage = LocalStorage::open().map_err(js_err)?;
        let settings = Settings::load(&settings_storage);

        let store = PersistedStateStore::new(LocalStorage::open().map_err(js_err)?);
        let seed = js_sys::Date::now() as u64;
        let mut scheduler = FrameScheduler::new(store, seed);
        if let Err(e) = scheduler.watch_external() {
            log::warn!("Cross-tab sync unavailable: {}", e);
        }

        let view = DomView::new(document.clone())?;
        view.set_visible(settings.enabled);
        let audio = AudioManager::new(settings.volume);

        let now = window.performance().map(|p| p.now()).unwrap_or(0.0);
        scheduler.start(now);

        let pet = Rc::new(RefCell::new(Pet {
            scheduler,
            settings,
            settings_storage,
            audio,
            view,
            drag: DragTracker::new(),
        }));

        setup_input_handlers(&document, pet.clone())?;
        setup_lifecycle_handlers(&window, pet.clone())?;

        request_animation_frame(pet);

        log::info!("Yippee running!");
        Ok(())
    }

    fn setup_input_handlers(document: &Document, pet: Rc<RefCell<Pet>>) -> Result<(), JsValue> {
        // Pointer move - new target, and drag tracking
        {
            let pet = pet.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut p = pet.borrow_mut();
                let pos = p.pointer(&event);
                p.drag.moved(pos);
                let viewport = p.view.viewport();
                p.scheduler.dispatch(Event::PointerMoved(pos), viewport);
            });
            document
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Press starts a potential drag
        {
            let pet = pet.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut p = pet.borrow_mut();
                let pos = p.pointer(&event);
                p.drag.press(pos);
            });
            document
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Release drops an apple if the pointer was dragged
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut p = pet.borrow_mut();
                if !p.settings.enabled {
                    return;
                }
                let pos = p.pointer(&event);
                if let Some(at) = p.drag.release(pos) {
                    let viewport = p.view.viewport();
                    p.scheduler.dispatch(Event::AppleDropped(at), viewport);
                    p.audio.play(SoundEffect::AppleDrop);
                }
            });
            document
                .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn setup_lifecycle_handlers(
        window: &web_sys::Window,
        pet: Rc<RefCell<Pet>>,
    ) -> Result<(), JsValue> {
        // Focus - pick up state written by other tabs
        {
            let pet = pet.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                pet.borrow_mut().scheduler.resync();
            });
            window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Control messages forwarded by the extension glue
        {
            let pet = pet.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: CustomEvent| {
                let Some(json) = event.detail().as_string() else {
                    log::warn!("Ignoring {} without a string payload", MESSAGE_EVENT);
                    return;
                };
                if let Some(message) = Message::parse(&json) {
                    pet.borrow_mut().handle_message(message);
                }
            });
            window
                .add_event_listener_with_callback(MESSAGE_EVENT, closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Page teardown
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                pet.borrow_mut().scheduler.stop();
            });
            window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn request_animation_frame(pet: Rc<RefCell<Pet>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            frame_loop(pet, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame_loop(pet: Rc<RefCell<Pet>>, time: f64) {
        let outcome = pet.borrow_mut().frame(time);
        if outcome == TickOutcome::Reschedule {
            request_animation_frame(pet);
        } else {
            log::info!("Frame loop ended");
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    if let Err(e) = wasm_pet::run() {
        log::error!("Yippee failed to start: {:?}", e);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use glam::Vec2;
    use yippee::persistence::{MemoryStorage, PersistedStateStore};
    use yippee::sim::{Event, Viewport};
    use yippee::{FrameScheduler, Visibility};

    env_logger::init();
    log::info!("Yippee (native) starting...");
    log::info!("Running a headless simulation - build for wasm32 for the browser version");

    const FRAME_MS: f64 = 1000.0 / 60.0;

    let storage = MemoryStorage::new();
    let store = PersistedStateStore::new(storage.clone());
    let mut scheduler = FrameScheduler::new(store, 1);
    let viewport = Viewport {
        height: 720.0,
        sprite_height: 120.0,
    };

    scheduler.start(0.0);
    scheduler.dispatch(Event::PointerMoved(Vec2::new(900.0, 60.0)), viewport);
    scheduler.dispatch(Event::AppleDropped(Vec2::new(400.0, 650.0)), viewport);

    for frame in 1..=900u32 {
        // Pretend the tab is in the background for the middle five seconds
        let visibility = if (300..600).contains(&frame) {
            Visibility::Hidden
        } else {
            Visibility::Visible
        };
        scheduler.tick(frame as f64 * FRAME_MS, visibility, viewport);

        if frame % 120 == 0 {
            let pet = &scheduler.model().yippee;
            log::info!(
                "frame {:4}: pet x = {:7.2}, facing {}, apples = {}",
                frame,
                pet.pos.x,
                if pet.flipped { "right" } else { "left" },
                scheduler.model().apples.len()
            );
        }
    }

    scheduler.stop();

    let saved = scheduler.store().load().unwrap_or_default();
    println!(
        "Simulated {} frames; saved pet at x = {:.2} (standoff point {:.2})",
        scheduler.frames(),
        saved.yippee.pos.x,
        900.0 - yippee::consts::ARRIVAL_RADIUS
    );
}
