//! Cannon Quiz entry point
//!
//! Handles platform-specific initialization and runs the game loop.
//!
//! The web build expects the host page (`index.html`) to provide:
//! - `#arena`: positioned container; enemies are added to it as `span.enemy`
//!   elements, which must be `position: absolute`
//! - `#cannon`: absolutely positioned element inside `#arena`
//! - `#score`, `#level`, `#current-problem`: HUD text
//! - `#answer-buttons` holding `#button1`, `#button2`, `#button3`
//! - `#game-over`: banner, hidden until the run ends

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlElement};

    use cannon_quiz::consts::*;
    use cannon_quiz::sim::{GameEvent, GameState, submit_payload, tick};
    use cannon_quiz::{Hud, HudElement, sync_hud};

    /// DOM-backed HUD
    struct DomHud {
        document: Document,
    }

    impl DomHud {
        fn element(&self, element: HudElement) -> Option<HtmlElement> {
            let Some(id) = element.dom_id() else {
                log::warn!("No DOM element for {:?}", element);
                return None;
            };
            self.document
                .get_element_by_id(id)
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        }
    }

    impl Hud for DomHud {
        fn set_text(&mut self, element: HudElement, text: &str) {
            if let Some(el) = self.element(element) {
                if el.text_content().as_deref() != Some(text) {
                    el.set_text_content(Some(text));
                }
            }
        }

        fn set_visible(&mut self, element: HudElement, visible: bool) {
            if let Some(el) = self.element(element) {
                let display = match (element, visible) {
                    (_, false) => "none",
                    (HudElement::AnswerPanel, true) => "flex",
                    (_, true) => "block",
                };
                let _ = el.style().set_property("display", display);
            }
        }
    }

    /// Game instance holding all state
    struct Game {
        state: GameState,
        hud: DomHud,
        accumulator: f32,
        last_time: f64,
    }

    impl Game {
        fn new(seed: u64, document: Document) -> Self {
            Self {
                state: GameState::new(seed),
                hud: DomHud { document },
                accumulator: 0.0,
                last_time: 0.0,
            }
        }

        /// Run simulation ticks
        fn update(&mut self, time: f64) {
            if self.last_time == 0.0 {
                self.last_time = time;
            }
            let dt = ((time - self.last_time) / 1000.0) as f32;
            self.last_time = time;
            self.accumulator += dt.min(0.1);

            let mut substeps = 0;
            while self.accumulator >= FRAME_DT && substeps < MAX_SUBSTEPS {
                tick(&mut self.state);
                self.accumulator -= FRAME_DT;
                substeps += 1;
            }
        }

        /// Apply queued gameplay events to the scene
        fn handle_events(&mut self) {
            let mut hud_dirty = false;
            for event in self.state.drain_events() {
                match event {
                    GameEvent::ProblemGenerated | GameEvent::WrongAnswer { .. } => hud_dirty = true,
                    GameEvent::EnemyTargeted { enemy_id } => {
                        self.set_enemy_class(enemy_id, "enemy targeted");
                    }
                    GameEvent::EnemyDestroyed { enemy_id, .. } => {
                        if let Some(el) = self.hud.document.get_element_by_id(&enemy_dom_id(enemy_id)) {
                            el.remove();
                        }
                        hud_dirty = true;
                    }
                    GameEvent::LevelUp { level } => {
                        log::info!("Level {} reached", level);
                        self.spawn_enemy_elements();
                        hud_dirty = true;
                    }
                    GameEvent::GameOver { score, level } => {
                        log::info!("Game over: score {} on level {}", score, level);
                        hud_dirty = true;
                    }
                }
            }
            if hud_dirty {
                sync_hud(&self.state, &mut self.hud);
            }
        }

        fn set_enemy_class(&self, enemy_id: u32, class: &str) {
            if let Some(el) = self.hud.document.get_element_by_id(&enemy_dom_id(enemy_id)) {
                let _ = el.set_attribute("class", class);
            }
        }

        /// Recreate one positioned element per enemy inside the arena
        fn spawn_enemy_elements(&self) {
            let document = &self.hud.document;
            let Some(arena) = document.get_element_by_id("arena") else {
                log::warn!("No #arena element, enemies will not be drawn");
                return;
            };
            if let Ok(stale) = arena.query_selector_all(".enemy") {
                for i in 0..stale.length() {
                    if let Some(node) = stale.item(i) {
                        if let Some(parent) = node.parent_node() {
                            let _ = parent.remove_child(&node);
                        }
                    }
                }
            }
            for enemy in &self.state.enemies {
                if let Ok(el) = document.create_element("span") {
                    el.set_id(&enemy_dom_id(enemy.id));
                    let _ = el.set_attribute("class", "enemy");
                    el.set_text_content(Some(enemy.glyph()));
                    let _ = arena.append_child(&el);
                }
            }
        }

        /// Move enemy and cannon elements to their simulated positions
        fn render(&self) {
            let document = &self.hud.document;
            for enemy in &self.state.enemies {
                if let Some(el) = document
                    .get_element_by_id(&enemy_dom_id(enemy.id))
                    .and_then(|el| el.dyn_into::<HtmlElement>().ok())
                {
                    let style = el.style();
                    let _ = style.set_property("left", &format!("{}px", enemy.pos.x));
                    let _ = style.set_property("top", &format!("{}px", enemy.pos.y));
                }
            }
            if let Some(cannon) = document
                .get_element_by_id("cannon")
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            {
                let pos = self.state.cannon_pos();
                let style = cannon.style();
                let _ = style.set_property("left", &format!("{}px", pos.x));
                let _ = style.set_property("top", &format!("{}px", pos.y));
            }
        }

        /// Match the simulation layout to the arena size
        fn resize(&mut self) {
            if let Some(arena) = self.hud.document.get_element_by_id("arena") {
                let w = arena.client_width() as f32;
                let h = arena.client_height() as f32;
                if w > 0.0 && h > 0.0 {
                    self.state.resize(w, h);
                }
            }
        }
    }

    fn enemy_dom_id(id: u32) -> String {
        format!("enemy-{}", id)
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Failed to init logger: {}", e).into());
        }

        log::info!("Cannon Quiz starting...");

        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document");
            return;
        };

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, document.clone())));
        log::info!("Game initialized with seed: {}", seed);

        {
            let mut g = game.borrow_mut();
            g.resize();
            g.spawn_enemy_elements();
            g.handle_events();
        }

        setup_answer_buttons(&document, game.clone());
        setup_resize(&window, game.clone());

        request_animation_frame(game);

        log::info!("Cannon Quiz running!");
    }

    fn setup_answer_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        for slot in 0..ANSWER_SLOTS {
            let Some(button) = HudElement::Answer(slot)
                .dom_id()
                .and_then(|id| document.get_element_by_id(id))
            else {
                log::warn!("Missing answer button {}", slot);
                continue;
            };
            let game = game.clone();
            let source = button.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let payload = source.text_content().unwrap_or_default();
                let mut g = game.borrow_mut();
                match submit_payload(&mut g.state, &payload) {
                    Ok(outcome) => log::debug!("Answer {:?}: {:?}", payload, outcome),
                    Err(e) => log::warn!("Ignoring click: {}", e),
                }
                g.handle_events();
            });
            let _ = button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(window: &web_sys::Window, game: Rc<RefCell<Game>>) {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            game.borrow_mut().resize();
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let callback: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
        let next = callback.clone();

        *callback.borrow_mut() = Some(Closure::new(move |time: f64| {
            {
                let mut g = game.borrow_mut();
                g.update(time);
                g.handle_events();
                g.render();
            }
            if let (Some(window), Some(cb)) = (web_sys::window(), next.borrow().as_ref()) {
                let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
            }
        }));

        if let (Some(window), Some(cb)) = (web_sys::window(), callback.borrow().as_ref()) {
            let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), cannon_quiz::QuizError> {
    env_logger::init();
    log::info!("Cannon Quiz (native) starting...");
    log::info!("Native mode runs a headless autoplay session - run with `trunk serve` for the web version");

    let mut args = std::env::args().skip(1);
    let tuning = match args.next() {
        Some(path) => {
            let json = std::fs::read_to_string(&path)?;
            log::info!("Loaded tuning from {}", path);
            cannon_quiz::Tuning::from_json(&json)?
        }
        None => cannon_quiz::Tuning::default(),
    };
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);

    let snapshot = autoplay::run(seed, tuning)?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless player: answers on a fixed cadence and is sometimes wrong
#[cfg(not(target_arch = "wasm32"))]
mod autoplay {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use cannon_quiz::{QuizError, Tuning};
    use cannon_quiz::consts::FRAME_DT;
    use cannon_quiz::sim::{GameEvent, GameState, Snapshot, submit_slot, tick};

    /// Frames between answers (1.5 s)
    const THINK_TICKS: u64 = 90;
    /// Chance the autoplayer picks a random button instead of the right one
    const MISTAKE_CHANCE: f64 = 0.3;
    /// Stop after ten simulated minutes
    const MAX_TICKS: u64 = 10 * 60 * 60;

    pub fn run(seed: u64, tuning: Tuning) -> Result<Snapshot, QuizError> {
        let mut state = GameState::with_tuning(seed, tuning)?;
        let mut player = Pcg32::seed_from_u64(seed ^ 0x5eed);

        while !state.game_over && state.time_ticks < MAX_TICKS {
            tick(&mut state);

            if state.time_ticks % THINK_TICKS == 0 && !state.is_busy() {
                let slot = if player.random_bool(MISTAKE_CHANCE) {
                    player.random_range(0..state.problem.choices.len())
                } else {
                    state
                        .problem
                        .choices
                        .iter()
                        .position(|&c| c == state.problem.answer)
                        .unwrap_or(0)
                };
                if let Err(e) = submit_slot(&mut state, slot) {
                    log::warn!("Autoplayer input rejected: {}", e);
                }
            }

            for event in state.drain_events() {
                match event {
                    GameEvent::LevelUp { level } => log::info!("Autoplayer reached level {}", level),
                    GameEvent::WrongAnswer { speed } => log::debug!("Autoplayer missed, speed {:.2}", speed),
                    _ => {}
                }
            }
        }

        log::info!(
            "Session ended after {:.1}s of play",
            state.time_ticks as f32 * FRAME_DT
        );
        Ok(state.snapshot())
    }
}
