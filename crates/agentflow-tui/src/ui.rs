use crate::state::{App, Connection, FlowView, InputMode, LessonState, Screen};
use crate::theme::{self, icons};
use agentflow_core::{FlowGraph, NodeRole};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Context, Line as CanvasLine},
        Block, Borders, Paragraph, Wrap,
    },
    Frame,
};

pub fn render(f: &mut Frame, app: &App) {
    let area = f.size();
    f.render_widget(
        Block::default().style(Style::new().bg(theme::BG)),
        area,
    );
    match app.screen {
        Screen::Home => render_home(f, area),
        Screen::Flow => render_flow(f, app, area),
        Screen::Raw => render_raw(f, app, area),
        Screen::Lesson => render_lesson(f, app, area),
    }
}

fn render_home(f: &mut Frame, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Min(9),
            Constraint::Percentage(30),
        ])
        .split(area);

    let text = vec![
        Line::from(Span::styled("A G E N T   F L O W", theme::TITLE_STYLE)),
        Line::from(""),
        Line::from(Span::styled(
            "Watch a multi-agent chat as a live conversation graph.",
            theme::BODY_STYLE,
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("f", theme::TITLE_STYLE),
            Span::styled("  visualize agent flow", theme::BODY_STYLE),
        ]),
        Line::from(vec![
            Span::styled("w", theme::TITLE_STYLE),
            Span::styled("  raw frame feed", theme::BODY_STYLE),
        ]),
        Line::from(vec![
            Span::styled("l", theme::TITLE_STYLE),
            Span::styled("  lesson planning demo", theme::BODY_STYLE),
        ]),
        Line::from(""),
        Line::from(Span::styled("q to quit", theme::HINT_STYLE)),
    ];

    let panel = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default().style(Style::new().bg(theme::BG)));
    f.render_widget(panel, rows[1]);
}

fn render_flow(f: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .split(area);

    f.render_widget(status_bar(app), rows[0]);

    match app.flow_view {
        FlowView::Chat => render_chat(f, app, rows[1]),
        FlowView::Graph => {
            if app.selected_node().is_some() {
                let panes = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
                    .split(rows[1]);
                render_graph(f, app, panes[0]);
                render_node_detail(f, app, panes[1]);
            } else {
                render_graph(f, app, rows[1]);
            }
        }
    }

    render_input(f, app, rows[2]);
}

fn status_bar(app: &App) -> Paragraph<'_> {
    let (icon, color, label) = match &app.connection {
        Connection::Connecting => (icons::CONNECTING, theme::WARN, "connecting".to_string()),
        Connection::Online => (icons::ONLINE, theme::ACCENT, "online".to_string()),
        Connection::Offline(reason) => {
            (icons::OFFLINE, theme::CRITICAL, format!("offline: {reason}"))
        }
    };

    let mut spans = vec![
        Span::styled(format!(" {icon} {label}"), Style::new().fg(color)),
        Span::styled(
            format!("   events {}", app.log.len()),
            Style::new().fg(theme::TEXT),
        ),
    ];
    if app.decode_errors > 0 {
        spans.push(Span::styled(
            format!("   decode errors {}", app.decode_errors),
            Style::new().fg(theme::WARN),
        ));
    }
    spans.push(Span::styled(
        "   Tab chat/graph  i input  n/p node  h home",
        theme::HINT_STYLE,
    ));

    Paragraph::new(Line::from(spans)).style(Style::new().bg(theme::SURFACE))
}

fn render_chat(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Conversation")
        .border_style(theme::panel_block_style(true));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines: Vec<Line> = Vec::new();
    for event in app.log.events() {
        lines.push(Line::from(vec![
            Span::styled(event.sender.to_uppercase(), theme::SENDER_STYLE),
            Span::styled(format!("  {}", event.kind.label()), theme::HINT_STYLE),
        ]));
        for body_line in event.body.lines() {
            lines.push(Line::from(Span::styled(
                body_line.to_string(),
                theme::BODY_STYLE,
            )));
        }
        lines.push(Line::from(""));
    }

    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "Waiting for agent messages...",
            theme::HINT_STYLE,
        )));
    }

    let offset = scroll_offset(lines.len(), inner.height, app.scrollback);
    let panel = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((offset, 0));
    f.render_widget(panel, inner);
}

fn render_graph(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Agent Flow")
        .border_style(theme::panel_block_style(true));

    if app.graph.nodes.is_empty() {
        let inner = block.inner(area);
        f.render_widget(block, area);
        let panel = Paragraph::new(Line::from(Span::styled(
            "No participants yet.",
            theme::HINT_STYLE,
        )))
        .alignment(Alignment::Center);
        f.render_widget(panel, inner);
        return;
    }

    let graph = &app.graph;
    let selected = app.selected;
    let canvas = Canvas::default()
        .block(block)
        .background_color(theme::BG)
        .x_bounds([0.0, graph.canvas])
        .y_bounds([0.0, graph.canvas])
        .paint(move |ctx| paint_graph(ctx, graph, selected));
    f.render_widget(canvas, area);
}

fn paint_graph(ctx: &mut Context, graph: &FlowGraph, selected: Option<usize>) {
    let marker = graph.marker_radius();

    for edge in &graph.edges {
        let (Some(from), Some(to)) = (graph.node(&edge.from), graph.node(&edge.to)) else {
            continue;
        };
        draw_arrow(ctx, from.x, from.y, to.x, to.y, marker, theme::ACCENT);
    }

    for (idx, node) in graph.nodes.iter().enumerate() {
        let color = theme::role_color(node.role);
        ctx.draw(&Circle {
            x: node.x,
            y: node.y,
            radius: marker,
            color,
        });
        let glyph = match node.role {
            NodeRole::Agent => icons::AGENT,
            NodeRole::Tool => icons::TOOL,
        };
        let style = if selected == Some(idx) {
            Style::new().fg(Color::Black).bg(color)
        } else {
            Style::new().fg(color)
        };
        ctx.print(
            node.x,
            node.y,
            Span::styled(format!("{glyph} {}", node.name), style),
        );
    }
}

fn draw_arrow(ctx: &mut Context, x1: f64, y1: f64, x2: f64, y2: f64, marker: f64, color: Color) {
    let dx = x2 - x1;
    let dy = y2 - y1;
    let length = (dx * dx + dy * dy).sqrt();
    if length < f64::EPSILON {
        return;
    }
    let nx = dx / length;
    let ny = dy / length;

    // stop the shaft just short of the target marker
    let tip_x = x2 - nx * (marker + 2.0);
    let tip_y = y2 - ny * (marker + 2.0);
    ctx.draw(&CanvasLine {
        x1,
        y1,
        x2: tip_x,
        y2: tip_y,
        color,
    });

    let head = 12.0;
    let half_width = 5.0;
    let base_x = tip_x - nx * head;
    let base_y = tip_y - ny * head;
    ctx.draw(&CanvasLine {
        x1: tip_x,
        y1: tip_y,
        x2: base_x - ny * half_width,
        y2: base_y + nx * half_width,
        color,
    });
    ctx.draw(&CanvasLine {
        x1: tip_x,
        y1: tip_y,
        x2: base_x + ny * half_width,
        y2: base_y - nx * half_width,
        color,
    });
}

fn render_node_detail(f: &mut Frame, app: &App, area: Rect) {
    let Some(node) = app.selected_node() else {
        return;
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Node")
        .border_style(theme::panel_block_style(true));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines = vec![
        Line::from(Span::styled(node.name.clone(), theme::TITLE_STYLE)),
        Line::from(vec![
            Span::styled("role: ", theme::HINT_STYLE),
            Span::styled(
                node.role.as_str(),
                Style::new().fg(theme::role_color(node.role)),
            ),
        ]),
        Line::from(""),
    ];
    if node.last_output.is_empty() {
        lines.push(Line::from(Span::styled(
            "No recent output.",
            theme::HINT_STYLE,
        )));
    } else {
        for body_line in node.last_output.lines() {
            lines.push(Line::from(Span::styled(
                body_line.to_string(),
                Style::new().fg(theme::OUTPUT),
            )));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Esc to close", theme::HINT_STYLE)));

    let panel = Paragraph::new(lines).wrap(Wrap { trim: false });
    f.render_widget(panel, inner);
}

fn render_input(f: &mut Frame, app: &App, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Message")
        .border_style(theme::panel_block_style(editing));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut spans = vec![Span::styled(app.input.clone(), theme::BODY_STYLE)];
    if editing {
        spans.push(Span::styled("_", Style::new().fg(theme::ACCENT)));
    } else if app.input.is_empty() {
        spans = vec![Span::styled(
            "Send a message... (press i)",
            theme::HINT_STYLE,
        )];
    }
    f.render_widget(Paragraph::new(Line::from(spans)), inner);
}

fn render_raw(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Raw Frames")
        .border_style(theme::panel_block_style(true));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines: Vec<Line> = Vec::new();
    for frame in &app.raw_frames {
        lines.push(Line::from(Span::styled(
            frame.received_at.format("%H:%M:%S%.3f").to_string(),
            theme::HINT_STYLE,
        )));
        for text_line in frame.text.lines() {
            lines.push(Line::from(Span::styled(
                text_line.to_string(),
                theme::BODY_STYLE,
            )));
        }
        lines.push(Line::from(""));
    }

    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "No frames received yet.",
            theme::HINT_STYLE,
        )));
    }

    let offset = scroll_offset(lines.len(), inner.height, app.scrollback);
    let panel = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((offset, 0));
    f.render_widget(panel, inner);
}

fn render_lesson(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Lesson Plan")
        .border_style(theme::panel_block_style(true));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines: Vec<Line> = match &app.lesson {
        LessonState::Idle => vec![Line::from(Span::styled(
            "Press r to fetch the lesson plan.",
            theme::HINT_STYLE,
        ))],
        LessonState::Loading => vec![Line::from(Span::styled(
            "Fetching lesson plan...",
            Style::new().fg(theme::WARN),
        ))],
        LessonState::Failed(err) => vec![
            Line::from(Span::styled(
                "Request failed",
                Style::new().fg(theme::CRITICAL),
            )),
            Line::from(Span::styled(err.clone(), theme::BODY_STYLE)),
            Line::from(""),
            Line::from(Span::styled("r to retry, h for home", theme::HINT_STYLE)),
        ],
        LessonState::Ready(lesson) => {
            let mut lines = vec![Line::from(Span::styled("Title", theme::TITLE_STYLE))];
            lines.push(Line::from(Span::styled(
                lesson.title.clone(),
                theme::BODY_STYLE,
            )));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("Objectives", theme::TITLE_STYLE)));
            for text_line in lesson.objectives.lines() {
                lines.push(Line::from(Span::styled(
                    text_line.to_string(),
                    theme::BODY_STYLE,
                )));
            }
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("Script", theme::TITLE_STYLE)));
            for text_line in lesson.script.lines() {
                lines.push(Line::from(Span::styled(
                    text_line.to_string(),
                    theme::BODY_STYLE,
                )));
            }
            lines
        }
    };

    let panel = Paragraph::new(lines).wrap(Wrap { trim: false });
    f.render_widget(panel, inner);
}

/// Keeps the view pinned to the newest lines; `scrollback` walks history.
fn scroll_offset(total_lines: usize, visible: u16, scrollback: u16) -> u16 {
    let total = u16::try_from(total_lines).unwrap_or(u16::MAX);
    total
        .saturating_sub(visible)
        .saturating_sub(scrollback.min(total.saturating_sub(visible)))
}
