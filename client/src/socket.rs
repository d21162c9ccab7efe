use std::cell::{Cell, RefCell};

use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{MessageEvent, WebSocket};

use nodewar_shared::{ClientIntent, Player, RoomSummary, ServerEvent};

use crate::model::{Room, rehydrate};

const RECONNECT_BASE_MS: f64 = 500.0;
const RECONNECT_MAX_MS: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Live,
    Reconnecting,
}

/// Signals the transport feeds. All snapshot application happens inside the
/// message handler, synchronously and in receipt order; consumers only ever
/// observe the previous live model or the fully rehydrated new one.
#[derive(Clone, Copy)]
pub struct SocketHandles {
    pub room: RwSignal<Option<Room>>,
    pub player: RwSignal<Option<Player>>,
    pub room_list: RwSignal<Option<Vec<RoomSummary>>>,
    pub status: RwSignal<ConnectionStatus>,
}

struct SocketConnection {
    ws: WebSocket,
    _on_open: Closure<dyn Fn()>,
    _on_message: Closure<dyn Fn(MessageEvent)>,
    _on_error: Closure<dyn Fn()>,
    _on_close: Closure<dyn Fn()>,
}

impl SocketConnection {
    fn close(self) {
        self.ws.set_onopen(None);
        self.ws.set_onmessage(None);
        self.ws.set_onerror(None);
        self.ws.set_onclose(None);
        let _ = self.ws.close();
    }
}

struct ReconnectTimer {
    window: web_sys::Window,
    timeout_id: i32,
    _callback: Closure<dyn Fn()>,
}

impl ReconnectTimer {
    fn cancel(self) {
        self.window.clear_timeout_with_handle(self.timeout_id);
    }
}

thread_local! {
    static SOCKET: RefCell<Option<SocketConnection>> = const { RefCell::new(None) };
    static RECONNECT: RefCell<Option<ReconnectTimer>> = const { RefCell::new(None) };
    static FAILURES: Cell<u32> = const { Cell::new(0) };
}

fn backoff_ms(consecutive_failures: u32) -> f64 {
    let exponent = consecutive_failures.saturating_sub(1).min(6);
    (RECONNECT_BASE_MS * (1u32 << exponent) as f64).min(RECONNECT_MAX_MS)
}

fn server_url() -> String {
    let location = web_sys::window().map(|w| w.location());
    let host = location
        .as_ref()
        .and_then(|l| l.host().ok())
        .unwrap_or_default();
    if host.is_empty() {
        // Dev fallback when served from the filesystem.
        return "ws://localhost:3001/ws".to_string();
    }
    let scheme = match location.and_then(|l| l.protocol().ok()).as_deref() {
        Some("https:") => "wss",
        _ => "ws",
    };
    format!("{scheme}://{host}/ws")
}

fn apply_event(event: ServerEvent, handles: SocketHandles) {
    match event {
        ServerEvent::RoomList { rooms } => handles.room_list.set(Some(rooms)),
        ServerEvent::PlayerData { player } => handles.player.set(Some(player)),
        ServerEvent::RoomData { room: None } => handles.room.set(None),
        ServerEvent::RoomData { room: Some(flat) } => match rehydrate(flat) {
            Ok(live) => handles.room.set(Some(live)),
            // Malformed snapshot: keep the previous live model intact and
            // wait for the next push to self-heal.
            Err(e) => web_sys::console::warn_1(&format!("room snapshot rejected: {e}").into()),
        },
    }
}

fn schedule_reconnect(handles: SocketHandles) {
    let Some(window) = web_sys::window() else {
        return;
    };
    FAILURES.with(|f| f.set(f.get().saturating_add(1)));
    let delay = backoff_ms(FAILURES.with(Cell::get));

    let callback = Closure::<dyn Fn()>::new(move || {
        RECONNECT.with(|slot| slot.borrow_mut().take());
        connect(handles);
    });
    let Ok(timeout_id) = window.set_timeout_with_callback_and_timeout_and_arguments_0(
        callback.as_ref().unchecked_ref(),
        delay as i32,
    ) else {
        return;
    };

    RECONNECT.with(|slot| {
        let mut slot = slot.borrow_mut();
        if let Some(old) = slot.take() {
            old.cancel();
        }
        *slot = Some(ReconnectTimer {
            window,
            timeout_id,
            _callback: callback,
        });
    });
}

/// Open the server channel and feed the given signals until `disconnect`.
/// Closes and replaces any existing connection first.
pub fn connect(handles: SocketHandles) {
    handles.status.set(ConnectionStatus::Connecting);

    let ws = match WebSocket::new(&server_url()) {
        Ok(ws) => ws,
        Err(_) => {
            handles.status.set(ConnectionStatus::Reconnecting);
            schedule_reconnect(handles);
            return;
        }
    };

    let status = handles.status;
    let on_open = Closure::<dyn Fn()>::new(move || {
        FAILURES.with(|f| f.set(0));
        status.set(ConnectionStatus::Live);
    });
    ws.set_onopen(Some(on_open.as_ref().unchecked_ref()));

    let on_message = Closure::<dyn Fn(MessageEvent)>::new(move |e: MessageEvent| {
        let Some(text) = e.data().as_string() else {
            return;
        };
        match serde_json::from_str::<ServerEvent>(&text) {
            Ok(event) => apply_event(event, handles),
            Err(e) => web_sys::console::warn_1(&format!("unreadable server event: {e}").into()),
        }
    });
    ws.set_onmessage(Some(on_message.as_ref().unchecked_ref()));

    let on_error = Closure::<dyn Fn()>::new(move || {
        web_sys::console::warn_1(&"websocket error".into());
    });
    ws.set_onerror(Some(on_error.as_ref().unchecked_ref()));

    let on_close = Closure::<dyn Fn()>::new(move || {
        status.set(ConnectionStatus::Reconnecting);
        // A fresh connection gets a fresh room snapshot; nothing to replay.
        schedule_reconnect(handles);
    });
    ws.set_onclose(Some(on_close.as_ref().unchecked_ref()));

    // Replace any existing connection, unregistering its handlers cleanly.
    SOCKET.with(|slot| {
        let mut slot = slot.borrow_mut();
        if let Some(old) = slot.take() {
            old.close();
        }
        *slot = Some(SocketConnection {
            ws,
            _on_open: on_open,
            _on_message: on_message,
            _on_error: on_error,
            _on_close: on_close,
        });
    });
}

/// Tear the channel down and cancel any pending reconnect.
pub fn disconnect() {
    RECONNECT.with(|slot| {
        if let Some(timer) = slot.borrow_mut().take() {
            timer.cancel();
        }
    });
    SOCKET.with(|slot| {
        if let Some(connection) = slot.borrow_mut().take() {
            connection.close();
        }
    });
    FAILURES.with(|f| f.set(0));
}

/// Send an intent to the server. With no open channel the intent is dropped
/// on the floor: the server is the source of truth and a reconnect delivers
/// a fresh snapshot, so there is no local queue or retry.
pub fn send_intent(intent: &ClientIntent) {
    SOCKET.with(|slot| {
        let slot = slot.borrow();
        let Some(connection) = slot.as_ref() else {
            return;
        };
        if connection.ws.ready_state() != WebSocket::OPEN {
            return;
        }
        if let Ok(json) = serde_json::to_string(intent) {
            let _ = connection.ws.send_with_str(&json);
        }
    });
}
