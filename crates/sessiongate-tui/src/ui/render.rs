use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use sessiongate_core::view::Form;
use sessiongate_core::{BackendKind, FormFocus, NoticeStyle, View};

use crate::app::App;

use super::styles;

/// Width of the auth dialog
const DIALOG_WIDTH: u16 = 46;

/// Visible width of a form field
const FIELD_WIDTH: usize = 18;

/// Maximum width of a toast
const TOAST_WIDTH: u16 = 40;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    match app.view.view {
        View::Login | View::Signup => render_auth_panel(frame, app, chunks[1]),
        View::Dashboard => render_dashboard(frame, app, chunks[1]),
    }
    render_status_bar(frame, app, chunks[2]);

    if app.view.notice_style() == NoticeStyle::Toast {
        render_toast(frame, app, chunks[1]);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  sessiongate";
    let section = app.view.view.title();

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize).saturating_sub(title.len() + section.len() + 4),
        )),
        Span::styled(section, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn field_line(label: &str, value: String, focused: bool, suffix: &str) -> Line<'static> {
    let cursor = if focused { "▌" } else { "" };
    // Keep the tail visible when the value is wider than the field
    let count = value.chars().count();
    let shown: String = value.chars().skip(count.saturating_sub(FIELD_WIDTH)).collect();
    Line::from(vec![
        Span::raw("    "),
        Span::styled(format!("{:<10}[", label), styles::muted_style()),
        Span::styled(
            format!("{:<width$}{}", shown, cursor, width = FIELD_WIDTH),
            styles::field_style(focused),
        ),
        Span::styled("]", styles::muted_style()),
        Span::styled(suffix.to_string(), styles::muted_style()),
    ])
}

fn button_line(label: &str, focused: bool) -> Line<'static> {
    let text = if focused {
        format!(" ▶ {} ◀ ", label)
    } else {
        format!("   {}   ", label)
    };
    Line::from(vec![
        Span::raw("            ["),
        Span::styled(text, styles::field_style(focused)),
        Span::raw("]"),
    ])
}

fn form_lines(form: &Form, submit_label: &str, switch_label: &str) -> Vec<Line<'static>> {
    let eye = if form.password_visible { " (shown)" } else { "" };
    vec![
        field_line("Username:", form.username.clone(), form.focus == FormFocus::Username, ""),
        field_line("Password:", form.password_display(), form.focus == FormFocus::Password, eye),
        Line::from(""),
        button_line(submit_label, form.focus == FormFocus::Submit),
        Line::from(""),
        Line::from(vec![
            Span::raw("    "),
            Span::styled(
                switch_label.to_string(),
                if form.focus == FormFocus::Switch {
                    styles::selected_style()
                } else {
                    styles::highlight_style()
                },
            ),
        ]),
    ]
}

fn render_auth_panel(frame: &mut Frame, app: &App, area: Rect) {
    let (form, submit, switch) = match app.view.view {
        View::Signup => (
            &app.view.signup_form,
            "Sign Up",
            "Already have an account? Sign in",
        ),
        View::Login | View::Dashboard => (
            &app.view.login_form,
            "Sign In",
            "No account yet? Create one",
        ),
    };

    let mut lines = vec![
        Line::from(Span::styled(
            format!("  {}", app.view.view.title()),
            styles::title_style(),
        )),
        Line::from(""),
    ];
    lines.extend(form_lines(form, submit, switch));

    if app.view.pending {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(" Working...", styles::highlight_style())));
    }

    // Inline messages sit under the form
    if app.view.notice_style() == NoticeStyle::Inline {
        if let Some(notice) = app.view.notice() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!(" {}", notice.text),
                styles::notice_style(notice.kind),
            )));
        }
    }

    let height = lines.len() as u16 + 2;
    let dialog = centered_rect_fixed(DIALOG_WIDTH, height, area);
    frame.render_widget(Clear, dialog);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, dialog);
}

fn render_dashboard(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![Line::from("")];

    match app.view.welcome {
        Some(ref message) => lines.push(Line::from(Span::styled(
            format!("  {}", message),
            styles::success_style(),
        ))),
        None if app.view.pending => lines.push(Line::from(Span::styled(
            "  Loading...",
            styles::muted_style(),
        ))),
        None => lines.push(Line::from(Span::styled(
            "  No message from the server",
            styles::muted_style(),
        ))),
    }

    if app.view.notice_style() == NoticeStyle::Inline {
        if let Some(notice) = app.view.notice() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("  {}", notice.text),
                styles::notice_style(notice.kind),
            )));
        }
    }

    let block = Block::default()
        .title(" Dashboard ")
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_toast(frame: &mut Frame, app: &App, area: Rect) {
    let Some(notice) = app.view.notice() else {
        return;
    };

    let width = (notice.text.chars().count() as u16 + 4).min(TOAST_WIDTH).min(area.width);
    let toast = Rect::new(
        area.x + area.width.saturating_sub(width + 1),
        area.y,
        width,
        3.min(area.height),
    );
    frame.render_widget(Clear, toast);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::notice_style(notice.kind));
    let paragraph = Paragraph::new(Span::styled(
        notice.text.clone(),
        styles::notice_style(notice.kind),
    ))
    .block(block);
    frame.render_widget(paragraph, toast);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let backend = match app.gate.backend_kind() {
        BackendKind::Remote => app.config.base_url.as_str(),
        BackendKind::Simulated => "simulated backend",
    };

    let hints: &[(&str, &str)] = match app.view.view {
        View::Login | View::Signup => &[
            ("Tab", "next field"),
            ("Enter", "submit"),
            ("^R", "show password"),
            ("^S", "switch panel"),
            ("Esc", "quit"),
        ],
        View::Dashboard => &[("r", "reload"), ("l", "logout"), ("q", "quit")],
    };

    let mut spans = vec![Span::raw(" ")];
    for (key, desc) in hints {
        spans.push(Span::styled(*key, styles::help_key_style()));
        spans.push(Span::raw(format!(" {}  ", desc)));
    }
    spans.push(Span::styled(format!("[{}]", backend), styles::muted_style()));

    let paragraph = Paragraph::new(Line::from(spans)).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}
