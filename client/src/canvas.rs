use std::cell::{Cell, RefCell};
use std::f64::consts::{PI, TAU};
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, PointerEvent, WheelEvent};

use nodewar_shared::{NodeType, Team};

use crate::app::{CurrentRoom, Interaction, LocalPlayer, ViewportSignal, canvas_dimensions};
use crate::colors::{BACKGROUND, VISIBLE_INK, team_color};
use crate::render_loop::RenderScheduler;
use crate::spatial::SpatialGrid;
use crate::view::{self, ARMY_RADIUS, EDGE_WIDTH, NODE_RADIUS, Scene};
use crate::viewport::{MapBounds, Viewport};

/// Selection ring radius relative to the node radius.
const RING_RADIUS_FACTOR: f64 = 1.4;
/// Full rotation period of the selection ring dashes, in ms.
const RING_ROTATION_MS: f64 = 10_000.0;
/// Pulses per ring rotation.
const RING_PULSES: f64 = 8.0;
const RING_PULSE_MAX_SCALE: f64 = 1.1;

/// Interactive game surface: draws the visibility-gated scene and turns
/// pointer/wheel input into hover, selection, and viewport updates.
#[component]
pub fn GameCanvas() -> impl IntoView {
    let CurrentRoom(room) = expect_context();
    let LocalPlayer(player) = expect_context();
    let Interaction(interaction) = expect_context();
    let ViewportSignal(viewport) = expect_context();

    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();

    // Drag state
    let is_dragging = Rc::new(Cell::new(false));
    let last_x = Rc::new(Cell::new(0.0f64));
    let last_y = Rc::new(Cell::new(0.0f64));

    // Hit-testing grid, rebuilt whenever a snapshot replaces the live model
    let spatial: Rc<RefCell<SpatialGrid>> = Rc::new(RefCell::new(SpatialGrid::empty()));
    Effect::new({
        let spatial = spatial.clone();
        move || {
            room.with(|room| {
                *spatial.borrow_mut() = match room.as_ref().and_then(|r| r.game.as_ref()) {
                    Some(game) => SpatialGrid::build(&game.map),
                    None => SpatialGrid::empty(),
                };
            });
        }
    });

    // Fit the viewport on the first snapshot that carries a game; later
    // snapshots leave the player's pan/zoom alone.
    Effect::new(move || {
        room.with(|room| {
            let Some(game) = room.as_ref().and_then(|r| r.game.as_ref()) else {
                return;
            };
            if viewport.get_untracked().is_none() {
                let bounds =
                    MapBounds::from_positions(game.map.iter().map(|(_, n)| (n.x, n.y)));
                viewport.set(Some(Viewport::fit(bounds)));
            }
        });
    });

    let scheduler = Rc::new(RenderScheduler::new(move || {
        let Some(canvas) = canvas_ref.get_untracked() else {
            return false;
        };
        let canvas: &HtmlCanvasElement = &canvas;
        let view_px = canvas_view_size(canvas);
        let dpr = web_sys::window()
            .map(|w| w.device_pixel_ratio())
            .unwrap_or(1.0);
        let pw = (view_px.0 * dpr).round().max(1.0) as u32;
        let ph = (view_px.1 * dpr).round().max(1.0) as u32;
        if canvas.width() != pw || canvas.height() != ph {
            canvas.set_width(pw);
            canvas.set_height(ph);
        }
        let Some(ctx) = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
        else {
            return false;
        };
        let _ = ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);

        ctx.set_fill_style_str(BACKGROUND);
        ctx.fill_rect(0.0, 0.0, view_px.0, view_px.1);

        let Some(vp) = viewport.get_untracked() else {
            return false;
        };
        let observer = player
            .with_untracked(|p| p.as_ref().map(|p| p.team))
            .unwrap_or(Team::Neutral);
        let ui = interaction.get_untracked();

        room.with_untracked(|room| {
            let Some(game) = room.as_ref().and_then(|r| r.game.as_ref()) else {
                return false;
            };
            let scene = view::scene(game, observer, &ui);
            draw_scene(&ctx, &vp, view_px, &scene, js_sys::Date::now())
        })
    }));

    // Repaint on any state change the scene depends on.
    let sched = scheduler.clone();
    Effect::new(move || {
        room.track();
        interaction.track();
        viewport.track();
        sched.mark_dirty();
    });

    let view_size = move || {
        canvas_ref
            .get_untracked()
            .map(|c| canvas_view_size(&c))
            .unwrap_or_else(canvas_dimensions)
    };

    let on_wheel = move |e: WheelEvent| {
        e.prevent_default();
        let pivot = (e.offset_x() as f64, e.offset_y() as f64);
        let view = view_size();
        viewport.update(|vp| {
            if let Some(vp) = vp.as_mut() {
                vp.zoom(e.delta_y() > 0.0, pivot, view);
            }
        });
    };

    let on_pointer_down = {
        let is_dragging = is_dragging.clone();
        let last_x = last_x.clone();
        let last_y = last_y.clone();
        move |e: PointerEvent| {
            is_dragging.set(true);
            last_x.set(e.client_x() as f64);
            last_y.set(e.client_y() as f64);
            if let Some(target) = e.target()
                && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
            {
                el.set_pointer_capture(e.pointer_id()).ok();
            }
            room.with_untracked(|room| {
                let (Some(room), Some(team)) = (
                    room.as_ref(),
                    player.with_untracked(|p| p.as_ref().map(|p| p.team)),
                ) else {
                    return;
                };
                interaction.update(|ui| ui.pointer_pressed(room, team));
            });
        }
    };

    let on_pointer_move = {
        let is_dragging = is_dragging.clone();
        let last_x = last_x.clone();
        let last_y = last_y.clone();
        let spatial = spatial.clone();
        move |e: PointerEvent| {
            if is_dragging.get() {
                let dx = e.client_x() as f64 - last_x.get();
                let dy = e.client_y() as f64 - last_y.get();
                last_x.set(e.client_x() as f64);
                last_y.set(e.client_y() as f64);
                let view = view_size();
                // Dragging moves the map with the cursor: the center shifts
                // the opposite way.
                viewport.update(|vp| {
                    if let Some(vp) = vp.as_mut() {
                        vp.pan(-dx, -dy, view);
                    }
                });
                return;
            }
            let Some(vp) = viewport.get_untracked() else {
                return;
            };
            let local = canvas_ref
                .get_untracked()
                .map(|el| {
                    let rect = el.get_bounding_client_rect();
                    (
                        e.client_x() as f64 - rect.left(),
                        e.client_y() as f64 - rect.top(),
                    )
                })
                .unwrap_or((e.offset_x() as f64, e.offset_y() as f64));
            let (wx, wy) = vp.screen_to_world(local.0, local.1, view_size());
            let hit = spatial.borrow().find_at(wx, wy);
            if hit != interaction.with_untracked(|ui| ui.hovered) {
                interaction.update(|ui| match hit {
                    Some(id) => ui.pointer_entered(id),
                    None => ui.pointer_left(),
                });
            }
        }
    };

    let on_pointer_up = {
        let is_dragging = is_dragging.clone();
        move |_: PointerEvent| {
            is_dragging.set(false);
            interaction.update(|ui| ui.pointer_released());
        }
    };

    let on_pointer_leave = {
        let is_dragging = is_dragging.clone();
        move |_: PointerEvent| {
            is_dragging.set(false);
            interaction.update(|ui| {
                ui.pointer_released();
                ui.pointer_left();
            });
        }
    };

    view! {
        <canvas
            node_ref=canvas_ref
            style="position: absolute; inset: 0; width: 100%; height: 100%; touch-action: none; cursor: default;"
            on:wheel=on_wheel
            on:pointerdown=on_pointer_down
            on:pointermove=on_pointer_move
            on:pointerup=on_pointer_up
            on:pointerleave=on_pointer_leave
        />
    }
}

fn canvas_view_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
    let rect = canvas.get_bounding_client_rect();
    if rect.width() > 0.0 && rect.height() > 0.0 {
        (rect.width(), rect.height())
    } else {
        canvas_dimensions()
    }
}

/// Paint one frame. Returns true while an animation (the selection ring)
/// wants further frames.
fn draw_scene(
    ctx: &CanvasRenderingContext2d,
    vp: &Viewport,
    view_px: (f64, f64),
    scene: &Scene,
    now_ms: f64,
) -> bool {
    let scale = vp.scale(view_px);

    // Edges first, underneath everything. Fogged edges are painted neutral
    // rather than omitted so the map silhouette stays stable.
    ctx.set_line_width(EDGE_WIDTH * scale);
    for edge in &scene.edges {
        let (x1, y1) = vp.world_to_screen(edge.x1, edge.y1, view_px);
        let (x2, y2) = vp.world_to_screen(edge.x2, edge.y2, view_px);
        ctx.set_stroke_style_str(if edge.visible {
            VISIBLE_INK
        } else {
            team_color(Team::Neutral)
        });
        ctx.begin_path();
        ctx.move_to(x1, y1);
        ctx.line_to(x2, y2);
        ctx.stroke();
    }

    let mut ring: Option<(f64, f64, &str)> = None;
    for node in &scene.nodes {
        let (x, y) = vp.world_to_screen(node.x, node.y, view_px);
        let r = NODE_RADIUS * scale;

        // Fogged nodes render as an anonymous neutral circle: no owner
        // color, no building shape, no troop count.
        let owner_color = if node.visible {
            team_color(node.team)
        } else {
            team_color(Team::Neutral)
        };
        let ink = if node.visible {
            VISIBLE_INK
        } else {
            team_color(Team::Neutral)
        };
        let invert = node.hovered && node.selectable;
        let (fill, stroke) = if invert {
            (ink, owner_color)
        } else {
            (owner_color, ink)
        };

        draw_node_shape(ctx, x, y, r, node.building, fill, stroke, EDGE_WIDTH * scale);
        if let Some(troops) = node.troops {
            draw_count(ctx, x, y, troops, r, stroke);
        }
        if node.selected {
            ring = Some((x, y, owner_color));
        }
    }

    for army in &scene.armies {
        let (x, y) = vp.world_to_screen(army.x, army.y, view_px);
        let r = ARMY_RADIUS * scale;
        let color = team_color(army.team);
        ctx.set_fill_style_str(color);
        ctx.begin_path();
        let _ = ctx.arc(x, y, r, 0.0, TAU);
        ctx.fill();
        draw_count(ctx, x, y - r * 1.8, army.troops, r * 1.4, color);
    }

    if let Some((x, y, color)) = ring {
        draw_selection_ring(ctx, x, y, NODE_RADIUS * scale, color, now_ms);
    }
    ring.is_some()
}

/// Node glyphs from the game's visual language: a plain circle for an empty
/// node, a rosette of n mini-circles for each building tier (2 = Factory,
/// 3 = PowerPlant, 4 = Fort, 5 = Artillery).
fn draw_node_shape(
    ctx: &CanvasRenderingContext2d,
    x: f64,
    y: f64,
    r: f64,
    building: Option<NodeType>,
    fill: &str,
    stroke: &str,
    stroke_w: f64,
) {
    let circles = match building {
        Some(NodeType::Factory) => 2,
        Some(NodeType::PowerPlant) => 3,
        Some(NodeType::Fort) => 4,
        Some(NodeType::Artillery) => 5,
        Some(NodeType::Normal) | None => {
            ctx.set_fill_style_str(fill);
            ctx.set_stroke_style_str(stroke);
            ctx.set_line_width(stroke_w);
            ctx.begin_path();
            let _ = ctx.arc(x, y, r, 0.0, TAU);
            ctx.fill();
            ctx.stroke();
            return;
        }
    };

    let step = TAU / circles as f64;
    let mini_r = r / (1.0 + 1.0 / (PI / circles as f64).sin());
    let offset = mini_r / (step / 2.0).sin();

    ctx.set_fill_style_str(fill);
    ctx.set_stroke_style_str(stroke);
    ctx.set_line_width(stroke_w);
    let center = |i: usize| {
        let angle = step * i as f64;
        (x + angle.sin() * offset, y - angle.cos() * offset)
    };
    for i in 0..circles {
        let (cx, cy) = center(i);
        ctx.begin_path();
        let _ = ctx.arc(cx, cy, mini_r, 0.0, TAU);
        ctx.fill();
        ctx.stroke();
    }
    // Fill the area between the mini-circles so the cluster reads as one
    // solid building.
    ctx.begin_path();
    for i in 0..circles {
        let (cx, cy) = center(i);
        if i == 0 {
            ctx.move_to(cx, cy);
        } else {
            ctx.line_to(cx, cy);
        }
    }
    ctx.close_path();
    ctx.fill();
}

fn draw_count(ctx: &CanvasRenderingContext2d, x: f64, y: f64, count: u32, r: f64, color: &str) {
    ctx.set_fill_style_str(color);
    ctx.set_font(&format!(
        "{:.0}px 'Courier New', Courier, monospace",
        (r * 0.9).max(9.0)
    ));
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    let _ = ctx.fill_text(&count.to_string(), x, y);
}

fn draw_selection_ring(
    ctx: &CanvasRenderingContext2d,
    x: f64,
    y: f64,
    node_r: f64,
    color: &str,
    now_ms: f64,
) {
    let phase = (now_ms % RING_ROTATION_MS) / RING_ROTATION_MS;
    let pulse = 1.0
        + (RING_PULSE_MAX_SCALE - 1.0) * 0.5 * (1.0 - (phase * RING_PULSES * TAU).cos());
    let r = node_r * RING_RADIUS_FACTOR * pulse;
    let dash = r * PI / 10.0;

    let segments = js_sys::Array::of2(&dash.into(), &dash.into());
    let _ = ctx.set_line_dash(&segments);
    ctx.set_stroke_style_str(color);
    ctx.set_line_width((node_r * 0.15).max(1.0));
    ctx.begin_path();
    let start = phase * TAU;
    let _ = ctx.arc(x, y, r, start, start + TAU);
    ctx.stroke();
    let _ = ctx.set_line_dash(&js_sys::Array::new());
}
