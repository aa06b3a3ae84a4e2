//! projdeck - terminal client for a project management API
//!
//! Architecture:
//! - UI Layer (Ratatui) - synchronous terminal rendering
//! - App Layer - central state machine reconciling server mirrors
//! - Network Layer (Tokio) - async API calls

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::*, widgets::*};
use tokio::sync::mpsc;

use projdeck::app::AppActor;
use projdeck::config::Config;
use projdeck::constants::LOG_FILE;
use projdeck::messages::ui_events::{key_to_ui_event, InputField, InputMode, Panel};
use projdeck::messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};
use projdeck::models::{format_percentage, ViewedFile};
use projdeck::network::NetworkActor;
use projdeck::ui::{checkbox, completion_color, highlight_content, panel_border, render_input};
use projdeck::viewer::{self, ViewMode};

/// Terminal cleanup guard
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging to file
    let log_dir = Config::log_dir();
    let log_dir = if std::fs::create_dir_all(&log_dir).is_ok() {
        log_dir
    } else {
        PathBuf::from(".")
    };
    let file_appender = tracing_appender::rolling::never(&log_dir, LOG_FILE);
    let (non_blocking, _log_guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    let config = Config::from_env()?;
    tracing::info!(api_base = %config.api_base, timeout = ?config.timeout, "Starting");

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let _guard = TerminalGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create channels
    let (ui_tx, ui_rx) = mpsc::unbounded_channel::<UiEvent>();
    let (net_cmd_tx, net_cmd_rx) = mpsc::unbounded_channel::<NetworkCommand>();
    let (net_resp_tx, net_resp_rx) = mpsc::unbounded_channel::<NetworkResponse>();
    let (render_tx, mut render_rx) = mpsc::unbounded_channel::<RenderState>();

    // Spawn network actor
    let network_actor = NetworkActor::new(&config, net_resp_tx);
    tokio::spawn(network_actor.run(net_cmd_rx));

    // Spawn app actor
    let app_actor = AppActor::new(net_cmd_tx, render_tx);
    tokio::spawn(app_actor.run(ui_rx, net_resp_rx));

    // Run UI loop (synchronous with async polling)
    run_ui_loop(&mut terminal, &config.api_base, ui_tx, &mut render_rx).await?;

    tracing::info!("Shutting down");
    Ok(())
}

/// Run the synchronous UI rendering loop
async fn run_ui_loop(
    terminal: &mut Terminal<impl Backend>,
    api_base: &str,
    ui_tx: mpsc::UnboundedSender<UiEvent>,
    render_rx: &mut mpsc::UnboundedReceiver<RenderState>,
) -> anyhow::Result<()> {
    let mut current_state = RenderState::default();
    let mut viewer_cache = ViewerCache::default();

    loop {
        // Draw with current state
        terminal.draw(|f| draw_ui(f, &current_state, &viewer_cache, api_base))?;

        // Poll for events with timeout
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Some(event) = key_to_ui_event(key, current_state.key_context) {
                    let quit = matches!(event, UiEvent::Quit);
                    let _ = ui_tx.send(event);
                    if quit {
                        break;
                    }
                }
            }
        }

        // Check for state updates (non-blocking)
        let mut updated = false;
        while let Ok(state) = render_rx.try_recv() {
            current_state = state;
            updated = true;
        }
        if updated {
            viewer_cache.sync(current_state.viewed_file.as_ref());
        }
    }

    Ok(())
}

/// Highlighted lines of the viewed file, rebuilt only when the file changes
#[derive(Default)]
struct ViewerCache {
    source: Option<ViewedFile>,
    lines: Vec<Line<'static>>,
}

impl ViewerCache {
    fn sync(&mut self, viewed: Option<&ViewedFile>) {
        if self.source.as_ref() == viewed {
            return;
        }
        self.lines = match viewed {
            Some(viewed) => {
                let mut lines = Vec::new();
                if let Some(err) = &viewed.rendered.parse_error {
                    lines.push(Line::from(Span::styled(
                        err.clone(),
                        Style::default().fg(Color::Red),
                    )));
                    lines.push(Line::from(""));
                }
                lines.extend(highlight_content(&viewed.rendered));
                lines
            }
            None => Vec::new(),
        };
        self.source = viewed.cloned();
    }
}

// ============================================================================
// UI Drawing Functions
// ============================================================================

fn draw_ui(f: &mut Frame, state: &RenderState, viewer_cache: &ViewerCache, api_base: &str) {
    let area = f.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Length(3), // Create form
            Constraint::Min(0),    // Panels
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    draw_title_bar(f, state, api_base, main_chunks[0]);
    draw_create_form(f, state, main_chunks[1]);

    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(main_chunks[2]);

    draw_projects(f, state, panels[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(panels[1]);

    draw_tasks(f, state, right[0]);
    draw_files(f, state, right[1]);

    draw_status_bar(f, state, main_chunks[3]);

    // Popups
    if state.viewed_file.is_some() {
        draw_viewer_popup(f, state, &viewer_cache.lines, area);
    }

    if state.key_context.show_file_picker {
        draw_file_picker_popup(f, state, area);
    }

    if state.key_context.show_help {
        draw_help_popup(f, area);
    }
}

fn draw_title_bar(f: &mut Frame, state: &RenderState, api_base: &str, area: Rect) {
    let loading = if state.is_loading { " [...]" } else { "" };
    let title = Line::from(vec![
        Span::styled(
            " PROJDECK ",
            Style::default().fg(Color::Black).bg(Color::Cyan).bold(),
        ),
        Span::styled(format!(" {}", api_base), Style::default().fg(Color::Gray)),
        Span::styled(loading, Style::default().fg(Color::Yellow)),
    ]);
    f.render_widget(Paragraph::new(title), area);
}

fn is_editing(state: &RenderState, field: InputField) -> bool {
    state.key_context.input_mode == InputMode::Editing && state.active_field == field
}

/// Place the terminal cursor inside a bordered single-line input
fn set_input_cursor(f: &mut Frame, area: Rect, content: &str, cursor_position: usize) {
    let column = content
        .get(..cursor_position)
        .map(|s| s.chars().count())
        .unwrap_or(0) as u16;
    let max_x = area.x + area.width.saturating_sub(2);
    let cursor_x = (area.x + column + 1).min(max_x);
    f.set_cursor_position(Position::new(cursor_x, area.y + 1));
}

fn draw_create_form(f: &mut Frame, state: &RenderState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    let fields = [
        (InputField::Name, state.inputs.name.as_str(), " Name (n) ", chunks[0]),
        (
            InputField::Description,
            state.inputs.description.as_str(),
            " Description (Tab) | Enter: create ",
            chunks[1],
        ),
    ];

    for (field, content, title, rect) in fields {
        let editing = is_editing(state, field);
        f.render_widget(render_input(content, title, editing), rect);
        if editing {
            set_input_cursor(f, rect, content, state.cursor_position);
        }
    }
}

fn draw_projects(f: &mut Frame, state: &RenderState, area: Rect) {
    let is_focused = state.key_context.active_panel == Panel::Projects;

    let items: Vec<ListItem> = state
        .projects
        .iter()
        .map(|project| {
            let percentage = state.completion_of(project.id);
            let marker = if state.selected_project == Some(project.id) {
                "▸ "
            } else {
                "  "
            };
            let mut spans = vec![
                Span::raw(marker),
                Span::styled(project.name.clone(), Style::default().bold()),
                Span::styled(
                    format!(" {:>4}", format_percentage(percentage)),
                    Style::default().fg(completion_color(percentage)),
                ),
            ];
            if !project.description.is_empty() {
                spans.push(Span::styled(
                    format!("  {}", project.description),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let title = format!(" Projects ({}) ", state.projects.len());
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(panel_border(is_focused))
                .title(title),
        )
        .highlight_style(Style::default().fg(Color::Yellow).bold());

    if state.projects.is_empty() {
        let empty = Paragraph::new(Span::styled(
            " No projects yet. Press 'n' to create one, 'r' to refresh.",
            Style::default().fg(Color::DarkGray),
        ))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(panel_border(is_focused))
                .title(" Projects "),
        );
        f.render_widget(empty, area);
        return;
    }

    let mut list_state = ListState::default().with_selected(Some(state.project_cursor));
    f.render_stateful_widget(list, area, &mut list_state);
}

fn draw_tasks(f: &mut Frame, state: &RenderState, area: Rect) {
    let is_focused = state.key_context.active_panel == Panel::Tasks;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    let title = match (state.selected_project, state.selected_project_name()) {
        (Some(id), Some(name)) => format!(
            " Tasks: {} [{}] ",
            name,
            format_percentage(state.completion_of(id))
        ),
        _ => " Tasks (t / Enter on a project) ".to_string(),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(panel_border(is_focused))
        .title(title);

    if state.selected_project.is_none() || state.tasks.is_empty() {
        let hint = if state.selected_project.is_none() {
            " No project open."
        } else {
            " No tasks. Press 'a' to add one."
        };
        let empty = Paragraph::new(Span::styled(hint, Style::default().fg(Color::DarkGray)))
            .block(block);
        f.render_widget(empty, chunks[0]);
    } else {
        let items: Vec<ListItem> = state
            .tasks
            .iter()
            .map(|task| {
                let style = if task.done {
                    Style::default().fg(Color::DarkGray).crossed_out()
                } else {
                    Style::default()
                };
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{} ", checkbox(task.done)),
                        Style::default().fg(if task.done { Color::Green } else { Color::White }),
                    ),
                    Span::styled(task.title.clone(), style),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().fg(Color::Yellow).bold());
        let mut list_state = ListState::default();
        if is_focused {
            list_state.select(Some(state.task_cursor));
        }
        f.render_stateful_widget(list, chunks[0], &mut list_state);
    }

    let editing = is_editing(state, InputField::NewTask);
    f.render_widget(
        render_input(&state.inputs.new_task, " New task (a) | Enter: add ", editing),
        chunks[1],
    );
    if editing {
        set_input_cursor(f, chunks[1], &state.inputs.new_task, state.cursor_position);
    }
}

fn draw_files(f: &mut Frame, state: &RenderState, area: Rect) {
    let is_focused = state.key_context.active_panel == Panel::Files;

    let project_name = state
        .projects
        .get(state.project_cursor)
        .map(|p| p.name.as_str())
        .unwrap_or("-");
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(panel_border(is_focused))
        .title(format!(" Files: {} (f load, p pick, u upload) ", project_name));

    if state.files.is_empty() {
        let empty = Paragraph::new(Span::styled(
            " No files loaded.",
            Style::default().fg(Color::DarkGray),
        ))
        .block(block);
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = state
        .files
        .iter()
        .map(|file| {
            let hint = match viewer::classify(&file.filename) {
                ViewMode::External => Span::styled(" ↗", Style::default().fg(Color::Cyan)),
                ViewMode::Inline(format) => Span::styled(
                    format!(" [{}]", format.as_str()),
                    Style::default().fg(Color::DarkGray),
                ),
            };
            ListItem::new(Line::from(vec![Span::raw(file.filename.clone()), hint]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().fg(Color::Yellow).bold());
    let mut list_state = ListState::default();
    if is_focused {
        list_state.select(Some(state.file_cursor));
    }
    f.render_stateful_widget(list, area, &mut list_state);
}

fn draw_status_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let mut spans = Vec::new();

    if let Some(latest) = state.notifications.last() {
        let more = state.notifications.len() - 1;
        let suffix = if more > 0 {
            format!(" (+{} more, Esc to dismiss)", more)
        } else {
            " (Esc to dismiss)".to_string()
        };
        spans.push(Span::styled(
            format!(" {}{} ", latest, suffix),
            Style::default().fg(Color::Red),
        ));
    } else if state.is_loading {
        spans.push(Span::styled(" Loading... ", Style::default().fg(Color::Yellow)));
    } else if state.key_context.input_mode == InputMode::Editing {
        spans.push(Span::styled(
            " ESC:stop editing | arrows:move | Enter:submit ",
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        spans.push(Span::styled(
            " Tab:panel | n:new | t:tasks | f:files | x:delete | r:refresh | ?:help | q:quit ",
            Style::default().fg(Color::DarkGray),
        ));
    }

    if let Some(path) = &state.pending_file {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        spans.push(Span::styled(
            format!(" | pending: {} ", name),
            Style::default().fg(Color::Cyan),
        ));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_viewer_popup(f: &mut Frame, state: &RenderState, lines: &[Line<'static>], area: Rect) {
    let Some(viewed) = &state.viewed_file else {
        return;
    };
    let popup_area = centered_rect(80, 80, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(
            " {} [{}] (Esc close, j/k scroll) ",
            viewed.file.filename,
            viewed.rendered.format.as_str()
        ))
        .style(Style::default().bg(Color::Black));

    let content = Paragraph::new(lines.to_vec())
        .block(block)
        .scroll((state.viewer_scroll, 0));

    f.render_widget(Clear, popup_area);
    f.render_widget(content, popup_area);
}

fn draw_file_picker_popup(f: &mut Frame, state: &RenderState, area: Rect) {
    let popup_area = centered_rect(60, 20, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Choose file to upload (Tab complete, Enter select, Esc cancel) ")
        .style(Style::default().bg(Color::Black));

    let content = if state.picker_input.is_empty() {
        "Enter a file path...\n\nExample: ~/docs/roadmap.pdf"
    } else {
        &state.picker_input
    };

    let input = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(input, popup_area);
}

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);

    let help_text = r#"
 PROJDECK - Keyboard Shortcuts

 NAVIGATION
   Tab / Shift+Tab    Switch panels
   ↑ / ↓  (j / k)     Move within the panel

 PROJECTS
   n                  Edit name (Tab: description, Enter: create)
   t / Enter          Open tasks and completion
   f                  Load files
   x / Delete         Delete project
   r                  Reload all projects

 TASKS
   a                  Add a task
   Space / Enter      Toggle done

 FILES
   p                  Choose a local file
   u                  Upload it to the highlighted project
   v / Enter          View file (images, pdf, txt open externally)

 GENERAL
   Esc                Dismiss errors
   ?                  Toggle this help
   q / Ctrl+C         Quit

 Press any key to close...
"#;

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .style(Style::default().bg(Color::Black));

    let help = Paragraph::new(help_text)
        .block(block)
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
