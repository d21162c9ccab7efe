use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use nodewar_shared::ClientIntent;

use crate::app::{CurrentRoom, Interaction, LocalPlayer};
use crate::canvas::GameCanvas;
use crate::colors::team_color;
use crate::socket;

struct KeydownBinding {
    window: web_sys::Window,
    _handler: Closure<dyn Fn(web_sys::KeyboardEvent)>,
}

thread_local! {
    static KEYDOWN_BINDING: RefCell<Option<KeydownBinding>> = const { RefCell::new(None) };
}

fn remove_keydown_binding() {
    KEYDOWN_BINDING.with(|slot| {
        if let Some(old) = slot.borrow_mut().take() {
            let _ = old.window.remove_event_listener_with_callback(
                "keydown",
                old._handler.as_ref().unchecked_ref(),
            );
        }
    });
}

/// The current room: the game surface once the match has started, a waiting
/// panel before that.
#[component]
pub fn RoomView() -> impl IntoView {
    let CurrentRoom(room) = expect_context();
    let LocalPlayer(player) = expect_context();
    let Interaction(interaction) = expect_context();

    // Order keys are global while in a room
    Effect::new(move || {
        let Some(window) = web_sys::window() else {
            return;
        };
        remove_keydown_binding();

        let handler =
            Closure::<dyn Fn(web_sys::KeyboardEvent)>::new(move |e: web_sys::KeyboardEvent| {
                let target_tag = e
                    .target()
                    .and_then(|t| t.dyn_into::<web_sys::HtmlElement>().ok())
                    .map(|el| el.tag_name())
                    .unwrap_or_default();
                if target_tag == "INPUT" || target_tag == "TEXTAREA" {
                    return;
                }

                // Only single-character keys carry orders; "Shift" etc. pass.
                let key = e.key();
                let mut chars = key.chars();
                let (Some(c), None) = (chars.next(), chars.next()) else {
                    return;
                };

                room.with_untracked(|room| {
                    let (Some(room), Some(team)) = (
                        room.as_ref(),
                        player.with_untracked(|p| p.as_ref().map(|p| p.team)),
                    ) else {
                        return;
                    };
                    let mut intent = None;
                    interaction.update(|ui| intent = ui.key_pressed(c, room, team));
                    if let Some(intent) = intent {
                        socket::send_intent(&intent);
                    }
                });
            });

        if window
            .add_event_listener_with_callback("keydown", handler.as_ref().unchecked_ref())
            .is_ok()
        {
            KEYDOWN_BINDING.with(|slot| {
                *slot.borrow_mut() = Some(KeydownBinding {
                    window: window.clone(),
                    _handler: handler,
                });
            });
        }

        on_cleanup(remove_keydown_binding);
    });

    // The first listed player hosts: once the room fills up they start the
    // match. Sent at most once per stay in the room.
    let start_sent = Rc::new(Cell::new(false));
    Effect::new({
        let start_sent = start_sent.clone();
        move || {
            room.with(|room| {
                let Some(room) = room.as_ref() else {
                    start_sent.set(false);
                    return;
                };
                if room.game.is_some() || start_sent.get() {
                    return;
                }
                let full = room.players.len() as u32 >= room.summary.max_players;
                let is_host = player.with_untracked(|p| {
                    matches!(
                        (p.as_ref(), room.players.first()),
                        (Some(me), Some(first)) if me.id == first.id
                    )
                });
                if full && is_host {
                    start_sent.set(true);
                    socket::send_intent(&ClientIntent::StartRoom);
                }
            });
        }
    });

    let in_game = move || room.with(|r| r.as_ref().is_some_and(|r| r.game.is_some()));

    view! {
        <Show when=in_game fallback=|| view! { <WaitingPanel /> }>
            <GameCanvas />
        </Show>
    }
}

/// Pre-game roster: who is seated, who is watching, how many seats remain.
#[component]
fn WaitingPanel() -> impl IntoView {
    let CurrentRoom(room) = expect_context();

    view! {
        <div style="max-width: 480px; margin: 0 auto; padding: 48px 16px;">
            {move || {
                room.with(|room| {
                    let Some(room) = room.as_ref() else {
                        return ().into_any();
                    };
                    let seats = format!(
                        "waiting for players ({}/{})",
                        room.players.len(),
                        room.summary.max_players
                    );
                    let players = room
                        .players
                        .iter()
                        .map(|p| {
                            view! {
                                <li style="padding: 4px 0;">
                                    <span style:color=team_color(p.team)>{"\u{25CF} "}</span>
                                    {p.name.clone()}
                                </li>
                            }
                        })
                        .collect_view();
                    let spectators = (!room.spectators.is_empty()).then(|| {
                        view! {
                            <p style="color: #888888; margin-top: 16px;">
                                {format!("{} watching", room.spectators.len())}
                            </p>
                        }
                    });
                    view! {
                        <h1 style="font-size: 1.4rem; margin-bottom: 8px;">
                            {room.summary.name.clone()}
                        </h1>
                        <p style="color: #888888; margin-bottom: 24px;">{seats}</p>
                        <ul style="list-style: none; padding: 0; margin: 0;">{players}</ul>
                        {spectators}
                    }
                    .into_any()
                })
            }}
        </div>
    }
}
