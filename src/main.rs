//! Cinder Brook entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use cinder_brook::audio::{AudioManager, SoundEffect};
    use cinder_brook::input::InputState;
    use cinder_brook::render::DomRenderer;
    use cinder_brook::sim::{tick, GameEvent, GameState, LevelData};
    use cinder_brook::{Progress, Settings};

    /// Game instance holding all state
    struct Game {
        level: LevelData,
        state: GameState,
        input: InputState,
        renderer: Option<DomRenderer>,
        audio: AudioManager,
        settings: Settings,
        progress: Progress,
    }

    impl Game {
        fn new(level: LevelData) -> Self {
            let state = GameState::new(&level);
            Self {
                level,
                state,
                input: InputState::new(),
                renderer: None,
                audio: AudioManager::new(),
                settings: Settings::load(),
                progress: Progress::load(),
            }
        }

        /// One display frame: snapshot input, advance the simulation one
        /// tick, fan events out to the best-effort sinks, mirror to the DOM.
        fn frame(&mut self) {
            let frame_input = self.input.snapshot(&self.level.bindings);
            let events = tick(&mut self.state, &self.level, &frame_input);

            for event in &events {
                if let Some(effect) = SoundEffect::for_event(event) {
                    self.audio.play(effect, &self.settings);
                }
                if *event == GameEvent::Won {
                    log::info!("Level {} complete!", self.level.number);
                    if self.progress.mark_completed(self.level.number) {
                        self.progress.save();
                    }
                }
            }

            if let Some(renderer) = &self.renderer {
                renderer.draw(&self.state);
            }
        }

        /// External restart command
        fn restart(&mut self) {
            self.state.reset();
            self.input.clear();
            self.audio.play(SoundEffect::Reset, &self.settings);
            log::info!("Level {} restarted", self.level.number);
        }
    }

    /// Which level the page asked for (`?level=N`), defaulting to 1.
    fn requested_level() -> u32 {
        let Some(window) = web_sys::window() else {
            return 1;
        };
        window
            .location()
            .search()
            .ok()
            .and_then(|s| web_sys::UrlSearchParams::new_with_str(&s).ok())
            .and_then(|params| params.get("level"))
            .and_then(|v| v.parse().ok())
            .unwrap_or(1)
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Cinder Brook starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let number = requested_level();
        let level = LevelData::load_builtin(number).unwrap_or_else(|e| {
            log::warn!("Could not load level {number}: {e}; falling back to level 1");
            LevelData::load_builtin(1).expect("built-in level 1 must load")
        });
        log::info!("Loaded level {} ({})", level.number, level.name);

        let mut game = Game::new(level);
        game.renderer = DomRenderer::new(&document, &game.level);
        if game.renderer.is_none() {
            log::warn!("No #game container found - running headless");
        }

        let game = Rc::new(RefCell::new(game));

        setup_input_handlers(game.clone());
        setup_buttons(game.clone());

        request_animation_frame(game);

        log::info!("Cinder Brook running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        // Keydown: feed the held-key set; R restarts
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let key = event.key();
                // Keep arrows and space from scrolling the page
                if key.starts_with("Arrow") || key == " " {
                    event.prevent_default();
                }
                let mut g = game.borrow_mut();
                // Browsers only allow audio after a user gesture
                g.audio.resume();
                if key == "r" || key == "R" {
                    g.restart();
                    return;
                }
                g.input.key_down(&key);
            });
            let _ = document
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyup
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                game.borrow_mut().input.key_up(&event.key());
            });
            let _ = document
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window blur: drop all held keys so none stick while unfocused
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().input.clear();
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Optional DOM buttons, wired only if the page has them.
    fn setup_buttons(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().restart();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("sound-toggle") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                let enabled = g.settings.toggle_sound();
                g.settings.save();
                log::info!("Sound {}", if enabled { "on" } else { "off" });
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("music-toggle") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                let enabled = g.settings.toggle_music();
                g.settings.save();
                log::info!("Music {}", if enabled { "on" } else { "off" });
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |_time: f64| {
            game_loop(game);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// One simulation tick per display frame, unconditionally re-scheduled;
    /// the loop keeps running through deaths and even in the Won phase.
    fn game_loop(game: Rc<RefCell<Game>>) {
        game.borrow_mut().frame();
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use cinder_brook::input::{InputState, KeyBindings};
    use cinder_brook::sim::{tick, GamePhase, GameState, LevelData};

    env_logger::init();
    log::info!("Cinder Brook (native) starting...");
    log::info!("Native mode runs a headless demo - build for wasm32 to play");

    let level = LevelData::load_builtin(1).expect("built-in level 1 must load");
    let mut state = GameState::new(&level);
    let mut input = InputState::new();
    let bindings = KeyBindings::default_pair();

    // Scripted run of level 1: the fire player floats over the gated wall
    // while the water player shrinks under it, both park on their doors, and
    // the win countdown expires.
    for frame in 0u32..1200 {
        match frame {
            0 => {
                input.key_down("d");
                input.key_down("f");
                input.key_down("ArrowRight");
                input.key_down("g");
            }
            150 => input.key_up("f"),
            186 => {
                input.key_up("ArrowRight");
                input.key_up("g");
            }
            200 => input.key_up("d"),
            _ => {}
        }
        let events = tick(&mut state, &level, &input.snapshot(&bindings));
        for event in events {
            log::info!("tick {frame}: {event:?}");
        }
        if state.phase == GamePhase::Won {
            log::info!("Won after {} ticks", state.time_ticks);
            break;
        }
    }

    log::info!(
        "Demo finished in phase {:?} (fire at {:?}, water at {:?})",
        state.phase,
        state.players[0].pos,
        state.players[1].pos,
    );
}
