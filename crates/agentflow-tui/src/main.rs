mod state;
mod theme;
mod ui;

use agentflow_core::{extract_lesson, Lesson};
use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::{SinkExt, StreamExt};
use ratatui::{backend::CrosstermBackend, Terminal};
use serde::Deserialize;
use state::{App, FeedEvent};
use std::io;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::warn;
use tracing_subscriber::EnvFilter;
use url::Url;

const FEED_QUEUE_CAPACITY: usize = 256;
const OUTBOUND_QUEUE_CAPACITY: usize = 64;
/// Prompt sent with the one-shot lesson request.
const LESSON_INPUT: &str = "some user data";

// Terminal cells approximated as pixel glyphs so the ring cap reacts to
// the window like an on-screen viewport would.
const CELL_PIXEL_WIDTH: f64 = 8.0;
const CELL_PIXEL_HEIGHT: f64 = 16.0;

type LessonResult = std::result::Result<Lesson, String>;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "agentflow-tui",
    about = "Terminal client for watching agent-to-agent message flow"
)]
struct Args {
    /// WebSocket endpoint streaming agent chat frames.
    #[arg(long, env = "AGENTFLOW_WS_URL", default_value = "ws://127.0.0.1:8000/ws")]
    ws_url: Url,
    /// HTTP endpoint serving the one-shot lesson planning demo.
    #[arg(
        long,
        env = "AGENTFLOW_CHAT_URL",
        default_value = "http://127.0.0.1:8000/chat"
    )]
    chat_url: String,
    /// Mirror logs to stdout instead of discarding them.
    #[arg(long)]
    log_stdout: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_stdout);

    let (feed_tx, mut feed_rx) = mpsc::channel(FEED_QUEUE_CAPACITY);
    let (out_tx, out_rx) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);

    let ws_url = args.ws_url.clone();
    tokio::spawn(async move {
        socket_loop(ws_url, feed_tx, out_rx).await;
    });

    let mut app = App::new(out_tx);
    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &mut app, &mut feed_rx, &args).await;
    restore_terminal(&mut terminal)?;
    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    feed_rx: &mut mpsc::Receiver<FeedEvent>,
    args: &Args,
) -> Result<()> {
    let client = reqwest::Client::new();
    let (lesson_tx, mut lesson_rx) = mpsc::channel::<LessonResult>(4);
    let mut events = EventStream::new();

    loop {
        if app.take_lesson_request() {
            app.begin_lesson_fetch();
            let client = client.clone();
            let url = args.chat_url.clone();
            let tx = lesson_tx.clone();
            tokio::spawn(async move {
                fetch_lesson(client, url, tx).await;
            });
        }

        let size = terminal.size()?;
        app.set_viewport(
            f64::from(size.width) * CELL_PIXEL_WIDTH,
            f64::from(size.height) * CELL_PIXEL_HEIGHT,
        );
        terminal.draw(|frame| ui::render(frame, app))?;

        tokio::select! {
            Some(event) = feed_rx.recv() => app.apply_feed(event),
            Some(result) = lesson_rx.recv() => app.apply_lesson(result),
            maybe_event = events.next() => {
                if let Some(Ok(Event::Key(key))) = maybe_event {
                    if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                        app.handle_key(key);
                    }
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Bridges the chat socket and the app loop. Connects once; transport
/// failures are logged and reported, the connection is not retried.
async fn socket_loop(
    ws_url: Url,
    feed: mpsc::Sender<FeedEvent>,
    mut outbound: mpsc::Receiver<String>,
) {
    let (mut ws, _) = match connect_async(ws_url.clone()).await {
        Ok(value) => value,
        Err(err) => {
            warn!("ws_connect_error: {err}");
            let _ = feed.send(FeedEvent::Disconnected(err.to_string())).await;
            return;
        }
    };
    let _ = feed.send(FeedEvent::Connected).await;

    loop {
        tokio::select! {
            Some(message) = ws.next() => match message {
                Ok(Message::Text(text)) => {
                    let _ = feed.send(FeedEvent::Frame(text)).await;
                }
                Ok(Message::Close(_)) => {
                    let _ = feed
                        .send(FeedEvent::Disconnected("closed by server".to_string()))
                        .await;
                    break;
                }
                Ok(_) => {}
                Err(err) => {
                    warn!("ws_read_error: {err}");
                    let _ = feed.send(FeedEvent::Disconnected(err.to_string())).await;
                    break;
                }
            },
            Some(out) = outbound.recv() => {
                if let Err(err) = ws.send(Message::Text(out)).await {
                    warn!("ws_send_error: {err}");
                    let _ = feed.send(FeedEvent::Disconnected(err.to_string())).await;
                    break;
                }
            }
            else => break,
        }
    }
    let _ = ws.close(None).await;
}

async fn fetch_lesson(client: reqwest::Client, url: String, tx: mpsc::Sender<LessonResult>) {
    let result = request_lesson(&client, &url).await.map_err(|err| {
        warn!("lesson_fetch_error: {err}");
        err.to_string()
    });
    let _ = tx.send(result).await;
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ChatReply {
    #[serde(default)]
    response: String,
}

async fn request_lesson(client: &reqwest::Client, url: &str) -> Result<Lesson> {
    let response = client
        .post(url)
        .json(&serde_json::json!({ "input": LESSON_INPUT }))
        .send()
        .await?
        .error_for_status()?;
    let payload: ChatReply = response.json().await?;
    Ok(extract_lesson(&payload.response))
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn init_logging(stdout_enabled: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if stdout_enabled {
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::sink)
            .try_init();
    }
}
