//! DOM render adapter
//!
//! Mirrors simulation state into absolutely-positioned DOM nodes once per
//! frame. Strictly one-way: the simulation never queries the DOM for
//! geometry, and every DOM failure here degrades to "nothing drawn".

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

use crate::sim::{Element as Affinity, GamePhase, GameState, LevelData, TileKind, ZoneKind};

/// CSS background for a player of the given element
fn player_color(element: Affinity) -> &'static str {
    match element {
        Affinity::Fire => "#ff3333",
        Affinity::Water => "#3366ff",
    }
}

fn zone_color(kind: &ZoneKind) -> &'static str {
    match kind {
        ZoneKind::Solid => "#6b4a2b",
        ZoneKind::Gated => "#8a8a8a",
        ZoneKind::Hazard {
            element: Affinity::Fire,
        } => "#cc3300",
        ZoneKind::Hazard {
            element: Affinity::Water,
        } => "#3399cc",
        ZoneKind::Transmute => "#9933cc",
        ZoneKind::Door {
            element: Affinity::Fire,
        } => "darkred",
        ZoneKind::Door {
            element: Affinity::Water,
        } => "darkblue",
    }
}

pub struct DomRenderer {
    players: [HtmlElement; 2],
    gems: Vec<HtmlElement>,
    banner: Option<Element>,
}

impl DomRenderer {
    /// Build the static level DOM under the `#game` container and the two
    /// player nodes. Returns None when the page has no usable container.
    pub fn new(document: &Document, level: &LevelData) -> Option<Self> {
        let root = document.get_element_by_id("game")?;
        root.set_inner_html("");

        let make = |class: &str| -> Option<HtmlElement> {
            let el: HtmlElement = document.create_element("div").ok()?.dyn_into().ok()?;
            el.set_class_name(class);
            let style = el.style();
            style.set_property("position", "absolute").ok()?;
            root.append_child(&el).ok()?;
            Some(el)
        };

        let place = |el: &HtmlElement, x: f32, y: f32, w: f32, h: f32| {
            let style = el.style();
            let _ = style.set_property("left", &format!("{x}px"));
            let _ = style.set_property("top", &format!("{y}px"));
            let _ = style.set_property("width", &format!("{w}px"));
            let _ = style.set_property("height", &format!("{h}px"));
        };

        // Decorative tiles first so zones draw over them
        let ts = level.tile_size;
        for (y, row) in level.tiles().iter().enumerate() {
            for (x, tile) in row.iter().enumerate() {
                if *tile != TileKind::Platform {
                    continue;
                }
                if let Some(el) = make("tile platform") {
                    place(&el, x as f32 * ts, y as f32 * ts, ts, ts);
                    let _ = el.style().set_property("background", "#a0522d");
                }
            }
        }

        for zone in &level.zones {
            if let Some(el) = make("zone") {
                let rect = zone.rect();
                place(&el, rect.pos.x, rect.pos.y, rect.size.x, rect.size.y);
                let _ = el.style().set_property("background", zone_color(&zone.kind));
            }
        }

        let mut gems = Vec::with_capacity(level.gems.len());
        for gem in &level.gems {
            let el = make("gem")?;
            place(&el, gem.x, gem.y, gem.size, gem.size);
            let style = el.style();
            let _ = style.set_property("background", player_color(gem.element));
            let _ = style.set_property("border-radius", "50%");
            gems.push(el);
        }

        let fire = make("player fire")?;
        let water = make("player water")?;

        Some(Self {
            players: [fire, water],
            gems,
            banner: document.get_element_by_id("win-banner"),
        })
    }

    /// Mirror the current simulation state into the DOM.
    pub fn draw(&self, state: &GameState) {
        for (player, el) in state.players.iter().zip(&self.players) {
            let style = el.style();
            let _ = style.set_property("left", &format!("{}px", player.pos.x));
            let _ = style.set_property("top", &format!("{}px", player.pos.y));
            let _ = style.set_property("width", &format!("{}px", player.size.x));
            let _ = style.set_property("height", &format!("{}px", player.hitbox_height()));
            let _ = style.set_property("background", player_color(player.element));
        }

        for (collected, el) in state.gems_collected.iter().zip(&self.gems) {
            let _ = el
                .style()
                .set_property("display", if *collected { "none" } else { "block" });
        }

        if let Some(banner) = &self.banner {
            let class = if state.phase == GamePhase::Won {
                ""
            } else {
                "hidden"
            };
            let _ = banner.set_attribute("class", class);
        }
    }
}
