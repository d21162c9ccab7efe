use leptos::prelude::*;

use nodewar_shared::ClientIntent;

use crate::app::RoomList;
use crate::socket;

const DEFAULT_MAX_PLAYERS: u32 = 2;

/// Room browser shown while the client is not in a room.
#[component]
pub fn Lobby() -> impl IntoView {
    let RoomList(room_list) = expect_context();

    let create_room = move |_| {
        socket::send_intent(&ClientIntent::CreateRoom {
            max_players: DEFAULT_MAX_PLAYERS,
            private: false,
        });
    };

    view! {
        <div style="max-width: 480px; margin: 0 auto; padding: 48px 16px;">
            <h1 style="font-size: 1.4rem; margin-bottom: 24px;">"nodewar"</h1>
            <button
                style="background: #444444; color: #eeeeee; border: 1px solid #eeeeee; border-radius: 4px; padding: 6px 16px; cursor: pointer; font: inherit; margin-bottom: 24px;"
                on:click=create_room
            >
                "create room"
            </button>
            {move || match room_list.get() {
                None => view! { <p style="color: #888888;">"fetching rooms\u{2026}"</p> }.into_any(),
                Some(rooms) if rooms.is_empty() => {
                    view! { <p style="color: #888888;">"no open rooms"</p> }.into_any()
                }
                Some(rooms) => view! {
                    <ul style="list-style: none; padding: 0; margin: 0;">
                        {rooms
                            .into_iter()
                            .map(|room| {
                                let full = room.n_players >= room.max_players;
                                let room_id = room.id.clone();
                                view! {
                                    <li style="display: flex; align-items: center; gap: 12px; padding: 8px 0; border-bottom: 1px solid #444444;">
                                        <span style="flex: 1;">{room.name.clone()}</span>
                                        <span style="color: #888888;">
                                            {format!("{}/{}", room.n_players, room.max_players)}
                                            {(room.n_spectators > 0)
                                                .then(|| format!(" (+{} watching)", room.n_spectators))}
                                        </span>
                                        <button
                                            style="background: #444444; color: #eeeeee; border: 1px solid #eeeeee; border-radius: 4px; padding: 2px 10px; cursor: pointer; font: inherit;"
                                            on:click=move |_| {
                                                socket::send_intent(&ClientIntent::JoinRoom {
                                                    room_id: room_id.clone(),
                                                });
                                            }
                                        >
                                            {if full { "spectate" } else { "join" }}
                                        </button>
                                    </li>
                                }
                            })
                            .collect_view()}
                    </ul>
                }
                .into_any(),
            }}
        </div>
    }
}
