use agentflow_core::{decode_frame, project, EventLog, FlowGraph, FlowNode, Lesson, Viewport};
use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Home,
    Flow,
    Raw,
    Lesson,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowView {
    Chat,
    #[default]
    Graph,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Editing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Connection {
    Connecting,
    Online,
    Offline(String),
}

/// Events published by the socket task to the app loop.
#[derive(Debug, Clone)]
pub enum FeedEvent {
    Connected,
    Frame(String),
    Disconnected(String),
}

/// One inbound frame kept for the raw debug view.
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub received_at: DateTime<Utc>,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum LessonState {
    #[default]
    Idle,
    Loading,
    Ready(Lesson),
    Failed(String),
}

pub struct App {
    pub screen: Screen,
    pub flow_view: FlowView,
    pub input_mode: InputMode,
    pub input: String,
    pub log: EventLog,
    pub graph: FlowGraph,
    pub raw_frames: Vec<RawFrame>,
    pub connection: Connection,
    pub decode_errors: u64,
    pub selected: Option<usize>,
    pub lesson: LessonState,
    pub scrollback: u16,
    pub viewport: Viewport,
    pub should_quit: bool,
    lesson_requested: bool,
    outbound: mpsc::Sender<String>,
}

impl App {
    pub fn new(outbound: mpsc::Sender<String>) -> Self {
        Self {
            screen: Screen::default(),
            flow_view: FlowView::default(),
            input_mode: InputMode::default(),
            input: String::new(),
            log: EventLog::new(),
            graph: FlowGraph::default(),
            raw_frames: Vec::new(),
            connection: Connection::Connecting,
            decode_errors: 0,
            selected: None,
            lesson: LessonState::default(),
            scrollback: 0,
            viewport: Viewport::new(800.0, 600.0),
            should_quit: false,
            lesson_requested: false,
            outbound,
        }
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        let viewport = Viewport::new(width, height);
        if viewport != self.viewport {
            self.viewport = viewport;
            self.reproject();
        }
    }

    pub fn apply_feed(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::Connected => self.connection = Connection::Online,
            FeedEvent::Disconnected(reason) => {
                self.connection = Connection::Offline(reason);
            }
            FeedEvent::Frame(raw) => self.ingest_frame(&raw),
        }
    }

    fn ingest_frame(&mut self, raw: &str) {
        self.raw_frames.push(RawFrame {
            received_at: Utc::now(),
            text: format_raw(raw),
        });
        match decode_frame(raw) {
            Ok(Some(event)) => {
                self.log.push(event);
                self.reproject();
            }
            Ok(None) => {}
            Err(err) => {
                self.decode_errors += 1;
                warn!("frame_decode_error: {err}");
            }
        }
    }

    fn reproject(&mut self) {
        self.graph = project(self.log.events(), self.viewport);
        if let Some(idx) = self.selected {
            if idx >= self.graph.nodes.len() {
                self.selected = None;
            }
        }
    }

    pub fn selected_node(&self) -> Option<&FlowNode> {
        self.selected.and_then(|idx| self.graph.nodes.get(idx))
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.input_mode == InputMode::Editing {
            self.handle_editing_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('h') => {
                self.screen = Screen::Home;
                self.scrollback = 0;
            }
            code => self.handle_screen_key(code),
        }
    }

    fn handle_screen_key(&mut self, code: KeyCode) {
        match self.screen {
            Screen::Home => match code {
                KeyCode::Char('f') => self.screen = Screen::Flow,
                KeyCode::Char('w') => self.screen = Screen::Raw,
                KeyCode::Char('l') => {
                    self.screen = Screen::Lesson;
                    if self.lesson == LessonState::Idle {
                        self.lesson_requested = true;
                    }
                }
                _ => {}
            },
            Screen::Flow => match code {
                KeyCode::Tab => self.toggle_flow_view(),
                KeyCode::Char('i') => self.input_mode = InputMode::Editing,
                KeyCode::Char('n') => self.select_next_node(),
                KeyCode::Char('p') => self.select_prev_node(),
                KeyCode::Esc => self.selected = None,
                KeyCode::Up => self.scrollback = self.scrollback.saturating_add(1),
                KeyCode::Down => self.scrollback = self.scrollback.saturating_sub(1),
                _ => {}
            },
            Screen::Raw => match code {
                KeyCode::Up => self.scrollback = self.scrollback.saturating_add(1),
                KeyCode::Down => self.scrollback = self.scrollback.saturating_sub(1),
                _ => {}
            },
            Screen::Lesson => {
                if code == KeyCode::Char('r') {
                    self.lesson_requested = true;
                }
            }
        }
    }

    fn handle_editing_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.input_mode = InputMode::Normal,
            KeyCode::Enter => self.submit_input(),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => self.input.push(c),
            _ => {}
        }
    }

    pub fn toggle_flow_view(&mut self) {
        self.flow_view = match self.flow_view {
            FlowView::Chat => FlowView::Graph,
            FlowView::Graph => FlowView::Chat,
        };
        self.scrollback = 0;
    }

    /// Sends the current input verbatim (trimmed) over the socket and
    /// clears it. Empty input is ignored.
    pub fn submit_input(&mut self) {
        let trimmed = self.input.trim();
        if trimmed.is_empty() {
            return;
        }
        match self.outbound.try_send(trimmed.to_string()) {
            Ok(()) => self.input.clear(),
            Err(err) => warn!("outbound_send_error: {err}"),
        }
    }

    pub fn select_next_node(&mut self) {
        let count = self.graph.nodes.len();
        if count == 0 {
            self.selected = None;
            return;
        }
        self.selected = Some(match self.selected {
            Some(idx) => (idx + 1) % count,
            None => 0,
        });
    }

    pub fn select_prev_node(&mut self) {
        let count = self.graph.nodes.len();
        if count == 0 {
            self.selected = None;
            return;
        }
        self.selected = Some(match self.selected {
            Some(idx) => (idx + count - 1) % count,
            None => count - 1,
        });
    }

    pub fn take_lesson_request(&mut self) -> bool {
        std::mem::take(&mut self.lesson_requested)
    }

    pub fn begin_lesson_fetch(&mut self) {
        self.lesson = LessonState::Loading;
    }

    pub fn apply_lesson(&mut self, result: Result<Lesson, String>) {
        self.lesson = match result {
            Ok(lesson) => LessonState::Ready(lesson),
            Err(err) => LessonState::Failed(err),
        };
    }
}

/// Pretty-prints a frame for the raw debug view, dropping the noisy
/// top-level uuid. Unparseable frames show verbatim.
fn format_raw(raw: &str) -> String {
    match serde_json::from_str::<Value>(raw) {
        Ok(mut value) => {
            if let Some(obj) = value.as_object_mut() {
                obj.remove("uuid");
            }
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| raw.to_string())
        }
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentflow_core::EventKind;

    fn test_app() -> App {
        let (tx, _rx) = mpsc::channel(4);
        App::new(tx)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::from(code)
    }

    #[test]
    fn accepted_frame_lands_in_log_and_graph() {
        let mut app = test_app();
        app.apply_feed(FeedEvent::Frame(
            r#"{"type":"text","content":{"content":"hi","sender":"A","recipient":"B"}}"#
                .to_string(),
        ));

        assert_eq!(app.log.len(), 1);
        assert_eq!(app.log.events()[0].kind, EventKind::Text);
        assert_eq!(app.graph.nodes.len(), 2);
        assert_eq!(app.graph.edges.len(), 1);
        assert_eq!(app.raw_frames.len(), 1);
        assert_eq!(app.decode_errors, 0);
    }

    #[test]
    fn malformed_frame_counts_as_decode_error() {
        let mut app = test_app();
        app.apply_feed(FeedEvent::Frame("TERMINATE".to_string()));

        assert_eq!(app.log.len(), 0);
        assert!(app.graph.nodes.is_empty());
        assert_eq!(app.decode_errors, 1);
        // still visible in the raw view, verbatim
        assert_eq!(app.raw_frames.len(), 1);
        assert_eq!(app.raw_frames[0].text, "TERMINATE");
    }

    #[test]
    fn blank_body_frame_is_kept_raw_but_not_logged() {
        let mut app = test_app();
        app.apply_feed(FeedEvent::Frame(
            r#"{"type":"text","content":{"content":"   "}}"#.to_string(),
        ));

        assert_eq!(app.log.len(), 0);
        assert_eq!(app.raw_frames.len(), 1);
        assert_eq!(app.decode_errors, 0);
    }

    #[test]
    fn raw_view_strips_top_level_uuid() {
        let mut app = test_app();
        app.apply_feed(FeedEvent::Frame(
            r#"{"uuid":"u-1","type":"text","content":{"content":"hi"}}"#.to_string(),
        ));

        assert!(!app.raw_frames[0].text.contains("u-1"));
        assert!(app.raw_frames[0].text.contains("\"type\""));
    }

    #[test]
    fn connection_status_follows_feed() {
        let mut app = test_app();
        assert_eq!(app.connection, Connection::Connecting);
        app.apply_feed(FeedEvent::Connected);
        assert_eq!(app.connection, Connection::Online);
        app.apply_feed(FeedEvent::Disconnected("eof".to_string()));
        assert_eq!(app.connection, Connection::Offline("eof".to_string()));
    }

    #[test]
    fn tab_toggles_chat_and_graph() {
        let mut app = test_app();
        app.screen = Screen::Flow;
        assert_eq!(app.flow_view, FlowView::Graph);
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.flow_view, FlowView::Chat);
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.flow_view, FlowView::Graph);
    }

    #[test]
    fn home_menu_routes_to_screens() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Char('f')));
        assert_eq!(app.screen, Screen::Flow);
        app.handle_key(key(KeyCode::Char('h')));
        assert_eq!(app.screen, Screen::Home);
        app.handle_key(key(KeyCode::Char('w')));
        assert_eq!(app.screen, Screen::Raw);
    }

    #[test]
    fn opening_lesson_screen_requests_a_fetch_once() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Char('l')));
        assert_eq!(app.screen, Screen::Lesson);
        assert!(app.take_lesson_request());
        assert!(!app.take_lesson_request());

        app.begin_lesson_fetch();
        assert_eq!(app.lesson, LessonState::Loading);

        // a loaded lesson is not refetched on re-entry
        app.apply_lesson(Ok(Lesson {
            title: "T".to_string(),
            objectives: "O".to_string(),
            script: "S".to_string(),
        }));
        app.handle_key(key(KeyCode::Char('h')));
        app.handle_key(key(KeyCode::Char('l')));
        assert!(!app.take_lesson_request());

        // explicit refresh always requests
        app.handle_key(key(KeyCode::Char('r')));
        assert!(app.take_lesson_request());
    }

    #[test]
    fn editing_mode_collects_and_submits_input() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut app = App::new(tx);
        app.screen = Screen::Flow;

        app.handle_key(key(KeyCode::Char('i')));
        assert_eq!(app.input_mode, InputMode::Editing);
        for c in "  run demo ".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(rx.try_recv().expect("sent message"), "run demo");
        assert!(app.input.is_empty());

        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn empty_input_is_not_sent() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut app = App::new(tx);
        app.input = "   ".to_string();
        app.submit_input();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn node_selection_wraps_both_ways() {
        let mut app = test_app();
        app.apply_feed(FeedEvent::Frame(
            r#"{"type":"text","content":{"content":"hi","sender":"A","recipient":"B"}}"#
                .to_string(),
        ));

        app.select_next_node();
        assert_eq!(app.selected_node().expect("node").id, "A");
        app.select_next_node();
        assert_eq!(app.selected_node().expect("node").id, "B");
        app.select_next_node();
        assert_eq!(app.selected_node().expect("node").id, "A");
        app.select_prev_node();
        assert_eq!(app.selected_node().expect("node").id, "B");
    }

    #[test]
    fn selection_survives_reprojection_while_in_range() {
        let mut app = test_app();
        app.apply_feed(FeedEvent::Frame(
            r#"{"type":"text","content":{"content":"hi","sender":"A","recipient":"B"}}"#
                .to_string(),
        ));
        app.select_next_node();

        app.apply_feed(FeedEvent::Frame(
            r#"{"type":"text","content":{"content":"yo","sender":"C","recipient":"A"}}"#
                .to_string(),
        ));
        // first-sighting order keeps A at slot 0
        assert_eq!(app.selected_node().expect("node").id, "A");
        assert_eq!(app.graph.nodes.len(), 3);
    }

    #[test]
    fn viewport_change_triggers_reprojection() {
        let mut app = test_app();
        app.apply_feed(FeedEvent::Frame(
            r#"{"type":"text","content":{"content":"hi","sender":"A","recipient":"B"}}"#
                .to_string(),
        ));
        let before = app.graph.clone();

        app.set_viewport(100.0, 80.0);
        assert_ne!(app.graph, before);
        assert_eq!(app.graph.nodes.len(), 2);
    }
}
