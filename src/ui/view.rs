use chrono::Local;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::View;
use crate::filter::{self, DueState, FilterMode};
use crate::task::{parse_timestamp, Priority, Task};

use super::app::{AppState, StatusKind};
use super::editor::{CategoryPicker, EditorFieldId, EditorKind, EditorState};

const PRIORITY_WIDTH: usize = 4;
const HELP_KEY_WIDTH: usize = 14;
const LABEL_WIDTH: usize = 12;
const COLOR_TEXT: Color = Color::Rgb(234, 236, 239);
const COLOR_MUTED: Color = Color::Rgb(160, 165, 172);
const COLOR_MUTED_DARK: Color = Color::Rgb(118, 124, 130);
const COLOR_BG_MUTED: Color = Color::Rgb(52, 56, 60);
const COLOR_INFO: Color = Color::Rgb(116, 198, 219);
const COLOR_WARNING: Color = Color::Rgb(244, 200, 98);
const COLOR_ERROR: Color = Color::Rgb(255, 107, 107);
const COLOR_SUCCESS: Color = Color::Rgb(126, 210, 146);
const COLOR_ACCENT: Color = Color::Rgb(122, 170, 255);
const COLOR_BORDER_LIST: Color = Color::Rgb(92, 126, 166);
const COLOR_BORDER_DETAIL: Color = Color::Rgb(180, 156, 92);
const COLOR_MAGENTA: Color = Color::Rgb(214, 140, 230);

pub fn render(frame: &mut Frame, app: &AppState) {
    match app.app.view() {
        View::Login => render_login(frame, app),
        View::Dashboard => render_dashboard(frame, app),
    }
}

fn render_login(frame: &mut Frame, app: &AppState) {
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)].as_ref())
        .split(area);

    let content_width = chunks[0].width.saturating_sub(8).min(56);
    let modal = centered_rect(content_width, 10, chunks[0]);
    let width = modal.width.saturating_sub(2) as usize;

    let mut lines: Vec<Line<'static>> = vec![
        Line::from(Span::styled(
            "Personal Task Tracker",
            Style::default()
                .fg(COLOR_ACCENT)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Enter your username to get started",
            Style::default().fg(COLOR_MUTED),
        )),
        Line::from(""),
    ];
    let mut input = vec![label_span("Username    ")];
    input.extend(value_with_caret_spans(
        &app.login.value,
        width.saturating_sub(LABEL_WIDTH),
        Style::default().fg(COLOR_TEXT),
    ));
    lines.push(Line::from(input));
    if let Some(error) = app.login.error.as_ref() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default()
                .fg(COLOR_ERROR)
                .add_modifier(Modifier::BOLD),
        )));
    }

    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Log in")
                .border_style(Style::default().fg(COLOR_BORDER_LIST)),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, modal);

    render_footer(frame, app, chunks[1]);
}

fn render_dashboard(frame: &mut Frame, app: &AppState) {
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(1),
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(area);

    render_header(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_filter_bar(frame, app, chunks[2]);

    let main = chunks[3];
    if app.is_narrow() {
        render_list(frame, app, main);
    } else {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)].as_ref())
            .split(main);
        render_list(frame, app, chunks[0]);
        render_detail(frame, app, chunks[1]);
    }

    render_footer(frame, app, chunks[4]);

    if let Some(editor) = app.editor.as_ref() {
        render_editor_modal(frame, area, editor);
    }
    if let Some(picker) = app.category_picker.as_ref() {
        render_category_modal(frame, area, app, picker);
    }
    if let Some(task) = app.dashboard().and_then(|dashboard| dashboard.pending_delete()) {
        render_delete_confirm_modal(frame, area, task);
    }
    if app.show_help {
        render_help_modal(frame, area);
    }
}

fn render_header(frame: &mut Frame, app: &AppState, area: Rect) {
    let mut spans = vec![Span::styled(
        "Task Tracker",
        Style::default()
            .fg(COLOR_ACCENT)
            .add_modifier(Modifier::BOLD),
    )];
    if let Some(name) = app.app.username() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("Welcome, {name}"),
            Style::default().fg(COLOR_TEXT),
        ));
    }
    let overdue = app
        .dashboard()
        .map(|dashboard| dashboard.overdue_count(app.now))
        .unwrap_or(0);
    if overdue > 0 {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!(" {overdue} overdue "),
            Style::default()
                .fg(COLOR_TEXT)
                .bg(COLOR_ERROR)
                .add_modifier(Modifier::BOLD),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_tabs(frame: &mut Frame, app: &AppState, area: Rect) {
    let Some(dashboard) = app.dashboard() else {
        return;
    };
    let counts = dashboard.counts();
    let current = dashboard.filter().mode;

    let mut spans = Vec::new();
    for (idx, mode) in FilterMode::ALL.iter().copied().enumerate() {
        if idx > 0 {
            spans.push(Span::styled("  ", Style::default().fg(COLOR_MUTED_DARK)));
        }
        let text = format!("{} {} ({})", idx + 1, mode.label(), counts.for_mode(mode));
        let style = if mode == current {
            Style::default()
                .fg(filter_color(mode))
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(COLOR_MUTED)
        };
        spans.push(Span::styled(text, style));
    }

    let widget = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(COLOR_BG_MUTED)),
    );
    frame.render_widget(widget, area);
}

fn render_filter_bar(frame: &mut Frame, app: &AppState, area: Rect) {
    let Some(dashboard) = app.dashboard() else {
        return;
    };
    let state = dashboard.filter();
    let search = if app.search_active {
        format!("search: {}_", state.query)
    } else if state.query.is_empty() {
        "search: -".to_string()
    } else {
        format!("search: {}", state.query)
    };
    let search_style = if app.search_active {
        Style::default().fg(COLOR_INFO).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(COLOR_INFO)
    };

    let mut spans = vec![Span::styled(search, search_style), Span::raw("  ")];
    let categories = dashboard.categories();
    if categories.is_empty() {
        spans.push(Span::styled(
            "no categories",
            Style::default().fg(COLOR_MUTED_DARK),
        ));
    }
    for label in categories {
        let style = if state.is_selected(&label) {
            Style::default()
                .fg(COLOR_MAGENTA)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default().fg(COLOR_MAGENTA)
        };
        spans.push(Span::styled(format!("#{label}"), style));
        spans.push(Span::raw(" "));
    }
    if !state.selected_categories().is_empty() {
        spans.push(Span::styled(
            " C clear all",
            Style::default().fg(COLOR_MUTED_DARK),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_list(frame: &mut Frame, app: &AppState, area: Rect) {
    let Some(dashboard) = app.dashboard() else {
        return;
    };
    let content_width = area.width.saturating_sub(2) as usize;
    let visible = dashboard.visible();
    let query = dashboard.filter().query.as_str();
    let window = app.app.config().display.due_soon_window();

    let mut lines = Vec::new();
    if visible.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            filter::empty_state_message(dashboard.filter()),
            Style::default().fg(COLOR_MUTED),
        )));
        if dashboard.tasks().is_empty() {
            lines.push(Line::from(Span::styled(
                "press n to add your first task",
                Style::default().fg(COLOR_MUTED_DARK),
            )));
        }
    } else {
        let list_height = area.height.saturating_sub(2) as usize;
        let (start, end) = list_window(visible.len(), Some(app.selected), list_height);
        for (pos, task) in visible.iter().enumerate().take(end).skip(start) {
            let due = filter::due_state(task, app.now, window);
            lines.push(render_list_row(
                task,
                due,
                query,
                pos == app.selected,
                content_width,
            ));
        }
    }

    let title = format!("Tasks ({})", dashboard.filter().mode.label());
    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(COLOR_BORDER_LIST)),
    );
    frame.render_widget(widget, area);
}

fn render_list_row(
    task: &Task,
    due: DueState,
    query: &str,
    selected: bool,
    width: usize,
) -> Line<'static> {
    let check = if task.completed { "[x]" } else { "[ ]" };
    let priority_text = pad_text(priority_label(task.priority), PRIORITY_WIDTH);
    let due_text = match due {
        DueState::Overdue | DueState::DueSoon => format!(" {}", due.label()),
        _ => String::new(),
    };
    let tags: String = task
        .categories
        .iter()
        .map(|label| format!(" #{label}"))
        .collect();
    let used = 1 + check.len() + 1 + PRIORITY_WIDTH + 1 + due_text.chars().count();
    let title_width = width.saturating_sub(used).max(1);
    let title = truncate_text(&task.title, title_width);
    let tags = truncate_text(&tags, title_width.saturating_sub(title.chars().count()));

    let title_style = if task.completed {
        Style::default()
            .fg(COLOR_MUTED)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default().fg(COLOR_TEXT)
    };

    let mut spans = vec![
        Span::raw(" "),
        Span::styled(
            check,
            Style::default().fg(if task.completed {
                COLOR_SUCCESS
            } else {
                COLOR_MUTED
            }),
        ),
        Span::raw(" "),
        Span::styled(
            priority_text,
            Style::default()
                .fg(priority_color(task.priority))
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
    ];
    spans.extend(highlighted_spans(&title, query, title_style));
    spans.push(Span::styled(tags, Style::default().fg(COLOR_MAGENTA)));
    if !due_text.is_empty() {
        spans.push(Span::styled(
            due_text,
            Style::default()
                .fg(due_color(due))
                .add_modifier(Modifier::BOLD),
        ));
    }

    if selected {
        for span in &mut spans {
            span.style = span.style.add_modifier(Modifier::REVERSED);
        }
    }

    Line::from(spans)
}

fn render_detail(frame: &mut Frame, app: &AppState, area: Rect) {
    let content_width = area.width.saturating_sub(2) as usize;
    let lines = match app.selected_task() {
        Some(task) => build_detail_lines(app, task, content_width),
        None => vec![Line::from(Span::styled(
            "No task selected",
            Style::default().fg(COLOR_MUTED),
        ))],
    };
    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Details")
                .border_style(Style::default().fg(COLOR_BORDER_DETAIL)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, area);
}

fn build_detail_lines(app: &AppState, task: &Task, width: usize) -> Vec<Line<'static>> {
    let query = app
        .dashboard()
        .map(|dashboard| dashboard.filter().query.clone())
        .unwrap_or_default();
    let window = app.app.config().display.due_soon_window();
    let due = filter::due_state(task, app.now, window);

    let mut lines = Vec::new();
    let title_style = Style::default()
        .fg(COLOR_TEXT)
        .add_modifier(Modifier::BOLD);
    lines.push(Line::from(highlighted_spans(
        &truncate_text(&task.title, width),
        &query,
        title_style,
    )));
    lines.push(Line::from(""));

    let status = if task.completed { "done" } else { "pending" };
    lines.push(Line::from(vec![
        label_span("Status: "),
        Span::styled(
            status,
            Style::default().fg(if task.completed {
                COLOR_SUCCESS
            } else {
                COLOR_INFO
            }),
        ),
    ]));
    lines.push(Line::from(vec![
        label_span("Priority: "),
        Span::styled(
            task.priority.as_str(),
            Style::default()
                .fg(priority_color(task.priority))
                .add_modifier(Modifier::BOLD),
        ),
    ]));
    if let Some(raw) = task.due_date.as_deref() {
        let mut spans = vec![
            label_span("Due: "),
            Span::styled(display_timestamp(raw), Style::default().fg(COLOR_TEXT)),
        ];
        if matches!(due, DueState::Overdue | DueState::DueSoon) {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                due.label(),
                Style::default()
                    .fg(due_color(due))
                    .add_modifier(Modifier::BOLD),
            ));
        }
        lines.push(Line::from(spans));
    }
    lines.push(Line::from(vec![
        label_span("Created: "),
        Span::styled(display_timestamp(&task.created_at), id_style()),
    ]));
    lines.push(Line::from(vec![
        label_span("ID: "),
        Span::styled(task.id.to_string(), id_style()),
    ]));
    if !task.categories.is_empty() {
        let tags = task
            .categories
            .iter()
            .map(|label| format!("#{label}"))
            .collect::<Vec<_>>()
            .join(" ");
        lines.push(Line::from(vec![
            label_span("Categories: "),
            Span::styled(tags, Style::default().fg(COLOR_MAGENTA)),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(section_header("Description"));
    if task.description.trim().is_empty() {
        lines.push(Line::from(Span::styled(
            "(none)",
            Style::default().fg(COLOR_MUTED_DARK),
        )));
    } else {
        for text in task.description.lines() {
            lines.push(Line::from(highlighted_spans(
                text,
                &query,
                Style::default().fg(COLOR_TEXT),
            )));
        }
    }
    lines
}

fn render_footer(frame: &mut Frame, app: &AppState, area: Rect) {
    let hint = app.footer_hint();
    let hint_span = Span::styled(hint, Style::default().fg(COLOR_INFO));
    let line = if let Some((status, kind)) = app.status_line() {
        let status_style = match kind {
            StatusKind::Error => Style::default()
                .fg(COLOR_ERROR)
                .add_modifier(Modifier::BOLD),
            StatusKind::Info => Style::default().fg(COLOR_WARNING),
        };
        Line::from(vec![
            hint_span,
            Span::raw("  |  "),
            Span::styled(status, status_style),
        ])
    } else {
        Line::from(hint_span)
    };
    let counts_line = Line::from(Span::styled(
        app.task_count_summary(),
        Style::default().fg(COLOR_ACCENT),
    ));
    let widget = Paragraph::new(vec![line, counts_line])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(COLOR_BORDER_LIST)),
        );
    frame.render_widget(widget, area);
}

fn render_editor_modal(frame: &mut Frame, area: Rect, editor: &EditorState) {
    let content_width = area.width.saturating_sub(8).min(72);
    let height = 14u16.min(area.height.saturating_sub(4));
    let modal = centered_rect(content_width, height, area);
    frame.render_widget(Clear, modal);

    let title = match editor.kind() {
        EditorKind::NewTask => "New Task",
        EditorKind::EditTask => "Edit Task",
    };
    let width = modal.width.saturating_sub(2) as usize;
    let lines = if editor.confirming() {
        build_confirm_lines(editor, width)
    } else {
        build_editor_lines(editor, width)
    };
    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(COLOR_BORDER_DETAIL)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, modal);
}

fn build_editor_lines(editor: &EditorState, width: usize) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();
    let value_width = width.saturating_sub(LABEL_WIDTH + 1);
    for (idx, field) in editor.fields().iter().enumerate() {
        let is_active = idx == editor.active_index();
        let label = pad_text(field.label, LABEL_WIDTH);
        let mut spans = vec![
            Span::styled(label, Style::default().fg(COLOR_TEXT)),
            Span::raw(" "),
        ];

        if field.id == EditorFieldId::Priority {
            for priority in Priority::ALL {
                let mut style = Style::default().fg(priority_color(priority));
                if priority == editor.priority() {
                    style = style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
                }
                spans.push(Span::styled(format!(" {} ", priority.as_str()), style));
                spans.push(Span::raw(" "));
            }
            if is_active {
                spans[0].style = spans[0].style.add_modifier(Modifier::REVERSED);
            }
        } else if is_active {
            spans.extend(value_with_caret_spans(
                &field.value,
                value_width,
                Style::default().fg(COLOR_TEXT),
            ));
            spans[0].style = spans[0].style.add_modifier(Modifier::REVERSED);
        } else if field.value.trim().is_empty() {
            let placeholder = if field.required {
                "<required>"
            } else {
                match field.id {
                    EditorFieldId::Due => "(optional, YYYY-MM-DD or YYYY-MM-DDTHH:MM)",
                    EditorFieldId::Categories => "(optional, comma separated)",
                    _ => "(optional)",
                }
            };
            spans.push(Span::styled(
                truncate_text(placeholder, value_width),
                Style::default().fg(COLOR_MUTED),
            ));
        } else {
            spans.push(Span::styled(
                truncate_text(&field.value, value_width),
                Style::default().fg(COLOR_TEXT),
            ));
        }
        lines.push(Line::from(spans));
    }

    if let Some(error) = editor.error() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default()
                .fg(COLOR_ERROR)
                .add_modifier(Modifier::BOLD),
        )));
    }

    lines.push(Line::from(""));
    lines.push(help_line("tab/shift+tab", "next or previous field", width));
    lines.push(help_line("left/right", "change priority", width));
    lines.push(help_line("ctrl+s", "review and save", width));
    lines
}

fn build_confirm_lines(editor: &EditorState, width: usize) -> Vec<Line<'static>> {
    let input = editor.build_input();
    let value_width = width.saturating_sub(LABEL_WIDTH);
    let mut lines: Vec<Line<'static>> = vec![
        Line::from(Span::styled(
            "Confirm task details",
            Style::default()
                .fg(COLOR_WARNING)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            label_span(&pad_text("Title:", LABEL_WIDTH)),
            Span::styled(
                truncate_text(input.title.trim(), value_width),
                Style::default()
                    .fg(COLOR_TEXT)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            label_span(&pad_text("Priority:", LABEL_WIDTH)),
            Span::styled(
                input.priority.as_str(),
                Style::default().fg(priority_color(input.priority)),
            ),
        ]),
    ];
    if !input.description.trim().is_empty() {
        lines.push(Line::from(vec![
            label_span(&pad_text("Description:", LABEL_WIDTH)),
            Span::styled(
                truncate_text(input.description.trim(), value_width),
                Style::default().fg(COLOR_TEXT),
            ),
        ]));
    }
    if let Some(due) = input.due_date.as_deref() {
        lines.push(Line::from(vec![
            label_span(&pad_text("Due:", LABEL_WIDTH)),
            Span::styled(display_timestamp(due), Style::default().fg(COLOR_TEXT)),
        ]));
    }
    if !input.categories.is_empty() {
        lines.push(Line::from(vec![
            label_span(&pad_text("Categories:", LABEL_WIDTH)),
            Span::styled(
                truncate_text(&input.categories.join(", "), value_width),
                Style::default().fg(COLOR_MAGENTA),
            ),
        ]));
    }
    if let Some(error) = editor.error() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(COLOR_ERROR),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "y/enter save  backspace edit  esc cancel",
        Style::default().fg(COLOR_MUTED_DARK),
    )));
    lines
}

fn render_category_modal(frame: &mut Frame, area: Rect, app: &AppState, picker: &CategoryPicker) {
    let content_width = 34u16.min(area.width.saturating_sub(6));
    let height = (picker.options().len() as u16 + 4).min(area.height.saturating_sub(4));
    let modal = centered_rect(content_width, height, area);
    frame.render_widget(Clear, modal);

    let is_selected = |label: &str| {
        app.dashboard()
            .map(|dashboard| dashboard.filter().is_selected(label))
            .unwrap_or(false)
    };
    let list_height = modal.height.saturating_sub(4) as usize;
    let (start, end) = list_window(
        picker.options().len(),
        Some(picker.selected_index()),
        list_height,
    );

    let mut lines: Vec<Line<'static>> = Vec::new();
    for (idx, option) in picker.options().iter().enumerate().take(end).skip(start) {
        let mark = if is_selected(option) { "[x]" } else { "[ ]" };
        let mut span = Span::styled(
            format!("{mark} #{option}"),
            Style::default().fg(COLOR_MAGENTA),
        );
        if idx == picker.selected_index() {
            span.style = span.style.add_modifier(Modifier::REVERSED);
        }
        lines.push(Line::from(span));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "space toggle  x clear all  esc close",
        Style::default().fg(COLOR_MUTED_DARK),
    )));

    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Categories"))
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, modal);
}

fn render_delete_confirm_modal(frame: &mut Frame, area: Rect, task: &Task) {
    let content_width = area.width.saturating_sub(8).min(64);
    let height = 8u16.min(area.height.saturating_sub(6).max(7));
    let modal = centered_rect(content_width, height, area);
    frame.render_widget(Clear, modal);

    let title_width = (content_width as usize).saturating_sub(10);
    let lines: Vec<Line<'static>> = vec![
        Line::from(Span::styled(
            "Delete task?",
            Style::default()
                .fg(COLOR_ERROR)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            label_span("Title: "),
            Span::styled(
                truncate_text(&task.title, title_width),
                Style::default().fg(COLOR_TEXT),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "enter/y confirm  esc/n cancel",
            Style::default().fg(COLOR_MUTED_DARK),
        )),
    ];

    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Delete Task"))
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, modal);
}

fn render_help_modal(frame: &mut Frame, area: Rect) {
    let lines = build_list_help_lines(44);
    let height = (lines.len() as u16 + 2).min(area.height.saturating_sub(2));
    let modal = centered_rect(48, height, area);
    frame.render_widget(Clear, modal);
    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Help")
            .border_style(Style::default().fg(COLOR_BORDER_LIST)),
    );
    frame.render_widget(widget, modal);
}

fn build_list_help_lines(width: usize) -> Vec<Line<'static>> {
    vec![
        help_header("Commands"),
        help_line("j/k or up/down", "move selection", width),
        help_line("ctrl+d/u", "page down/up", width),
        help_line("n", "new task", width),
        help_line("e/enter", "edit task", width),
        help_line("space/x", "toggle complete", width),
        help_line("d", "delete task", width),
        help_line("/", "search title and description", width),
        help_line("1-6 or tab", "status/priority filter", width),
        help_line("c", "pick categories", width),
        help_line("C", "clear categories", width),
        help_line("L", "log out", width),
        help_line("q/esc", "quit", width),
        help_line("?", "hide help", width),
    ]
}

fn help_header(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default().fg(COLOR_INFO).add_modifier(Modifier::BOLD),
    ))
}

fn help_line(keys: &str, desc: &str, width: usize) -> Line<'static> {
    let key_text = pad_text(keys, HELP_KEY_WIDTH.min(width));
    let desc_width = width.saturating_sub(HELP_KEY_WIDTH + 1);
    let desc_text = truncate_text(desc, desc_width);
    Line::from(vec![
        Span::styled(
            key_text,
            Style::default()
                .fg(COLOR_ACCENT)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(desc_text, Style::default().fg(COLOR_MUTED)),
    ])
}

/// Split `text` into styled spans with search matches emphasized.
fn highlighted_spans(text: &str, query: &str, base: Style) -> Vec<Span<'static>> {
    filter::highlight(text, query)
        .into_iter()
        .map(|segment| {
            let style = if segment.matched {
                base.fg(COLOR_WARNING)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                base
            };
            Span::styled(segment.text.to_string(), style)
        })
        .collect()
}

/// Caret always sits at the end; the window scrolls to keep it visible.
fn value_with_caret_spans(value: &str, width: usize, style: Style) -> Vec<Span<'static>> {
    if width == 0 {
        return vec![Span::raw("")];
    }
    let chars: Vec<char> = value.chars().collect();
    let available = width.saturating_sub(1);
    let start = chars.len().saturating_sub(available);
    let text: String = chars[start..].iter().collect();

    let mut spans = Vec::new();
    if !text.is_empty() {
        spans.push(Span::styled(text, style));
    }
    spans.push(Span::styled(
        " ".to_string(),
        style.add_modifier(Modifier::REVERSED),
    ));
    spans
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn list_window(total: usize, selected: Option<usize>, height: usize) -> (usize, usize) {
    if total == 0 || height == 0 {
        return (0, 0);
    }
    if total <= height {
        return (0, total);
    }
    let selected = selected.unwrap_or(0);
    let mut start = selected.saturating_sub(height / 2);
    if start + height > total {
        start = total - height;
    }
    (start, start + height)
}

fn priority_label(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "HIGH",
        Priority::Medium => "MED",
        Priority::Low => "LOW",
    }
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => COLOR_ERROR,
        Priority::Medium => COLOR_WARNING,
        Priority::Low => COLOR_SUCCESS,
    }
}

fn filter_color(mode: FilterMode) -> Color {
    match mode {
        FilterMode::All => COLOR_INFO,
        FilterMode::Completed => COLOR_SUCCESS,
        FilterMode::Pending => COLOR_ACCENT,
        FilterMode::High => COLOR_ERROR,
        FilterMode::Medium => COLOR_WARNING,
        FilterMode::Low => COLOR_SUCCESS,
    }
}

fn due_color(state: DueState) -> Color {
    match state {
        DueState::Overdue => COLOR_ERROR,
        DueState::DueSoon => COLOR_WARNING,
        DueState::Done => COLOR_SUCCESS,
        DueState::Later | DueState::NoDeadline => COLOR_MUTED,
    }
}

fn display_timestamp(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(value) => value
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
        None => raw.to_string(),
    }
}

fn pad_text(value: &str, width: usize) -> String {
    let mut text = value.to_string();
    if text.chars().count() > width {
        text = truncate_text(&text, width);
    }
    format!("{text:width$}")
}

fn truncate_text(value: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= max {
        return value.to_string();
    }
    if max <= 3 {
        return chars[..max].iter().collect();
    }
    let mut out: String = chars[..(max - 3)].iter().collect();
    out.push_str("...");
    out
}

fn label_span(label: &str) -> Span<'static> {
    Span::styled(label.to_string(), Style::default().fg(COLOR_MUTED_DARK))
}

fn section_header(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default()
            .fg(COLOR_MAGENTA)
            .add_modifier(Modifier::BOLD),
    ))
}

fn id_style() -> Style {
    Style::default()
        .fg(COLOR_MUTED)
        .add_modifier(Modifier::BOLD)
}
