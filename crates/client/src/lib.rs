// WASM client entry point for Snake Royale
// The core (game, input, render, session) is target independent and shared
// with the native front end; this file only wires it to the browser.

use wasm_bindgen::prelude::*;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use web_sys::{window, CloseEvent, HtmlCanvasElement, KeyboardEvent, MessageEvent, WebSocket};

// Module structure - each module handles a specific concern
pub mod game;     // World state store and the synchronizer that feeds it
pub mod input;    // Key -> protocol message routing
pub mod network;  // Transport trait, channel events, browser WebSocket
pub mod render;   // Surface trait, renderer, canvas surface
pub mod session;  // Session controller owning all of the above
mod ui;           // DOM status line
mod utils;        // Console logging and tracing

pub use game::{Phase, WorldState};
pub use network::{ChannelEvent, Transport};
pub use render::{Renderer, Surface};
pub use session::Session;

use network::Connection;
use render::CanvasSurface;
use ui::StatusLine;

/// Initialize panic hook and tracing for the browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    utils::init_tracing();
}

/// Events waiting for the session, filled by WebSocket callbacks.
type EventQueue = Rc<RefCell<VecDeque<ChannelEvent>>>;

struct WebApp {
    session: Session<Connection>,
    surface: CanvasSurface,
    status: StatusLine,
}

impl WebApp {
    fn dispatch(&mut self, event: ChannelEvent) {
        self.session.handle_event(event, &mut self.surface);
        self.refresh_status();
    }

    fn key(&mut self, key: &str) -> bool {
        let routed = self.session.handle_key(key).is_some();
        self.refresh_status();
        routed
    }

    fn refresh_status(&self) {
        self.status.show(&self.session.status_text(), self.session.phase());
    }
}

/// Browser handle JS keeps alive for the lifetime of the page.
#[wasm_bindgen]
pub struct SnakeClient {
    app: Rc<RefCell<WebApp>>,
}

#[wasm_bindgen]
impl SnakeClient {
    /// Connect to `server_url` and start drawing on the canvas `canvas_id`.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, status_id: &str, server_url: &str) -> Result<SnakeClient, JsValue> {
        init();

        let window = window().ok_or("No window")?;
        let document = window.document().ok_or("No document")?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or("Canvas not found")?
            .dyn_into::<HtmlCanvasElement>()?;

        let surface = CanvasSurface::new(canvas)?;
        let connection = Connection::new(server_url)?;
        let ws = connection.websocket().clone();
        let status = StatusLine::new(&document, status_id);

        let app = Rc::new(RefCell::new(WebApp {
            session: Session::new(connection, Renderer::default()),
            surface,
            status,
        }));
        app.borrow().refresh_status();

        let queue: EventQueue = Rc::new(RefCell::new(VecDeque::new()));
        attach_websocket_handlers(&app, &queue, &ws)?;
        setup_input_handlers(&app)?;

        Ok(SnakeClient { app })
    }

    /// Send an admin command by name (`spawnFood`, `resetGame`, `kickAll`).
    /// Returns false for unknown names.
    pub fn send_admin(&self, command: &str) -> bool {
        let Some(command) = protocol::AdminCommand::from_name(command) else {
            return false;
        };
        self.app.borrow_mut().session.send_admin(command);
        true
    }

    pub fn phase(&self) -> String {
        self.app.borrow().session.phase().as_str().to_string()
    }

    pub fn player_id(&self) -> Option<String> {
        self.app.borrow().session.world().local_id().map(str::to_string)
    }

    pub fn is_connected(&self) -> bool {
        self.app.borrow().session.transport().is_open()
    }

    pub fn status(&self) -> String {
        self.app.borrow().session.status_text()
    }
}

/// Drain queued events through the session, in order.
fn pump(app: &Rc<RefCell<WebApp>>, queue: &EventQueue) {
    // Busy means an outer pump is already draining; it will pick these up.
    let Ok(mut app) = app.try_borrow_mut() else {
        return;
    };
    loop {
        let next = queue.borrow_mut().pop_front();
        let Some(event) = next else {
            break;
        };
        app.dispatch(event);
    }
}

fn enqueue(app: &Rc<RefCell<WebApp>>, queue: &EventQueue, event: ChannelEvent) {
    queue.borrow_mut().push_back(event);
    pump(app, queue);
}

fn attach_websocket_handlers(
    app: &Rc<RefCell<WebApp>>,
    queue: &EventQueue,
    ws: &WebSocket,
) -> Result<(), JsValue> {
    // onmessage - text frames only
    {
        let app = app.clone();
        let queue = queue.clone();
        let onmessage = Closure::wrap(Box::new(move |event: MessageEvent| {
            match event.data().as_string() {
                Some(text) => enqueue(&app, &queue, ChannelEvent::Message(text)),
                None => console_log!("Ignoring non-text WebSocket frame"),
            }
        }) as Box<dyn FnMut(MessageEvent)>);
        ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
        onmessage.forget();
    }

    // onopen
    {
        let app = app.clone();
        let queue = queue.clone();
        let onopen = Closure::wrap(Box::new(move |_event: JsValue| {
            console_log!("WebSocket connected");
            enqueue(&app, &queue, ChannelEvent::Opened);
        }) as Box<dyn FnMut(JsValue)>);
        ws.set_onopen(Some(onopen.as_ref().unchecked_ref()));
        onopen.forget();
    }

    // onerror - the close event that follows carries the status change
    let onerror = Closure::wrap(Box::new(move |e: JsValue| {
        web_sys::console::error_1(&format!("WebSocket error: {:?}", e).into());
    }) as Box<dyn FnMut(JsValue)>);
    ws.set_onerror(Some(onerror.as_ref().unchecked_ref()));
    onerror.forget();

    // onclose - no reconnect, the session just reports it
    {
        let app = app.clone();
        let queue = queue.clone();
        let onclose = Closure::wrap(Box::new(move |event: CloseEvent| {
            console_log!("WebSocket closed: {}", event.code());
            enqueue(
                &app,
                &queue,
                ChannelEvent::Closed {
                    code: event.code(),
                    reason: event.reason(),
                },
            );
        }) as Box<dyn FnMut(CloseEvent)>);
        ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));
        onclose.forget();
    }

    Ok(())
}

fn setup_input_handlers(app: &Rc<RefCell<WebApp>>) -> Result<(), JsValue> {
    let window = window().ok_or("No window")?;
    let document = window.document().ok_or("No document")?;

    let app = app.clone();
    let closure = Closure::wrap(Box::new(move |event: KeyboardEvent| {
        let key = event.key();
        let Ok(mut app) = app.try_borrow_mut() else {
            return;
        };
        // Keep arrow keys from scrolling the page
        if app.key(&key) && key.starts_with("Arrow") {
            event.prevent_default();
        }
    }) as Box<dyn FnMut(_)>);

    document.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
    closure.forget();

    Ok(())
}
