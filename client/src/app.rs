use leptos::prelude::*;

use nodewar_shared::{Player, RoomSummary};

use crate::interaction::InteractionState;
use crate::lobby::Lobby;
use crate::model::Room;
use crate::room::RoomView;
use crate::socket::{self, ConnectionStatus, SocketHandles};
use crate::viewport::Viewport;

pub(crate) fn canvas_dimensions() -> (f64, f64) {
    let Some(window) = web_sys::window() else {
        return (1200.0, 800.0);
    };
    let w = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(1200.0);
    let h = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(800.0);
    (w, h)
}

/// Newtype wrappers give same-shaped signals distinct types for Leptos
/// context (without them, `provide_context` would overwrite one another).
#[derive(Clone, Copy)]
pub(crate) struct CurrentRoom(pub RwSignal<Option<Room>>);
#[derive(Clone, Copy)]
pub(crate) struct LocalPlayer(pub RwSignal<Option<Player>>);
#[derive(Clone, Copy)]
pub(crate) struct RoomList(pub RwSignal<Option<Vec<RoomSummary>>>);
#[derive(Clone, Copy)]
pub(crate) struct Interaction(pub RwSignal<InteractionState>);
#[derive(Clone, Copy)]
pub(crate) struct ViewportSignal(pub RwSignal<Option<Viewport>>);
#[derive(Clone, Copy)]
pub(crate) struct Connection(pub RwSignal<ConnectionStatus>);

/// Root application component. Provides global reactive signals via context
/// and routes between the lobby and the current room.
#[component]
pub fn App() -> impl IntoView {
    let room: RwSignal<Option<Room>> = RwSignal::new(None);
    let player: RwSignal<Option<Player>> = RwSignal::new(None);
    let room_list: RwSignal<Option<Vec<RoomSummary>>> = RwSignal::new(None);
    let interaction: RwSignal<InteractionState> = RwSignal::new(InteractionState::default());
    let viewport: RwSignal<Option<Viewport>> = RwSignal::new(None);
    let connection: RwSignal<ConnectionStatus> = RwSignal::new(ConnectionStatus::Connecting);

    provide_context(CurrentRoom(room));
    provide_context(LocalPlayer(player));
    provide_context(RoomList(room_list));
    provide_context(Interaction(interaction));
    provide_context(ViewportSignal(viewport));
    provide_context(Connection(connection));

    // Connect to the server on mount
    Effect::new(move || {
        socket::connect(SocketHandles {
            room,
            player,
            room_list,
            status: connection,
        });
        on_cleanup(|| {
            socket::disconnect();
        });
    });

    // Leaving a room (or losing it on reconnect) discards room-scoped UI
    // state so the next room starts from a clean slate.
    Effect::new(move || {
        if room.with(|r| r.is_none()) {
            interaction.set(InteractionState::default());
            viewport.set(None);
        }
    });

    view! {
        <div style="width: 100%; height: 100%; position: relative; overflow: hidden; background: #222222; color: #eeeeee; font-family: 'Courier New', Courier, monospace;">
            <Show
                when=move || room.with(|r| r.is_some())
                fallback=|| view! { <Lobby /> }
            >
                <RoomView />
            </Show>
            <ConnectionBanner />
        </div>
    }
}

/// Unobtrusive banner shown while the server channel is down.
#[component]
fn ConnectionBanner() -> impl IntoView {
    let Connection(connection) = expect_context();

    view! {
        {move || {
            let label = match connection.get() {
                ConnectionStatus::Live => return ().into_any(),
                ConnectionStatus::Connecting => "connecting\u{2026}",
                ConnectionStatus::Reconnecting => "connection lost, retrying\u{2026}",
            };
            view! {
                <div style="position: absolute; top: 8px; left: 50%; transform: translateX(-50%); z-index: 20; background: #444444; color: #eeeeee; padding: 4px 12px; border-radius: 4px; font-size: 0.8rem;">
                    {label}
                </div>
            }
            .into_any()
        }}
    }
}
