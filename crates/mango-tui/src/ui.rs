//! UI rendering with Ratatui.

use crate::app::{App, Screen};
use mango_core::{DetailFlow, EditFlow, Field, Notice, NoticeLevel, SiteSearch, Transport};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    prelude::*,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

/// Main render function.
pub fn render<T: Transport + 'static>(frame: &mut Frame, app: &App<T>) {
    let area = frame.area();
    let screen = app.screen();

    // Split into site list (35%) and details (65%)
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    render_site_list(frame, app, chunks[0], screen == Screen::List);
    render_detail(frame, app.session.detail(), chunks[1], screen == Screen::Detail);

    // Overlays, bottom to top
    if let Some(search) = app.session.search() {
        render_search_overlay(frame, search, area);
    }
    if let Some(editor) = app.session.editor() {
        render_editor(frame, editor, app.edit_focus, area);
    }
    if let Some(detail) = app.session.detail() {
        if let Some((title, question)) = detail.prompt() {
            render_confirm(frame, title, &question, area);
        }
    }
    if let Some(notice) = app.session.notice() {
        render_notice(frame, notice, area);
    }
}

fn border_color(focused: bool) -> Color {
    if focused {
        Color::Cyan
    } else {
        Color::DarkGray
    }
}

/// Render the site list.
fn render_site_list<T: Transport + 'static>(frame: &mut Frame, app: &App<T>, area: Rect, focused: bool) {
    let title = if app.session.is_busy() {
        format!(" 🥭 {} ⋯ ", app.server_label)
    } else {
        format!(" 🥭 {} ", app.server_label)
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color(focused)));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let list = app.session.list();
    if list.sites().is_empty() {
        let text = if list.is_loaded() {
            "No credentials stored"
        } else {
            "Loading..."
        };
        let message = Paragraph::new(text)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(message, chunks[0]);
    } else {
        let items: Vec<ListItem> = list
            .sites()
            .iter()
            .enumerate()
            .map(|(i, site)| {
                let style = if i == list.selected_index() {
                    Style::default()
                        .bg(Color::Rgb(60, 60, 80))
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Cyan)
                };
                ListItem::new(Line::from(format!("🔑 {site}"))).style(style)
            })
            .collect();
        frame.render_widget(List::new(items), chunks[0]);
    }

    let help = Paragraph::new("Enter: open | a: add | /: search | r: refresh | q: quit")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[1]);
}

/// Render the credential detail view.
fn render_detail(frame: &mut Frame, detail: Option<&DetailFlow>, area: Rect, focused: bool) {
    let block = Block::default()
        .title(" 📋 Credential Details ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color(focused)));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(detail) = detail else {
        let message = Paragraph::new("Select a site and press Enter")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(message, centered_rect(50, 3, inner));
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Site
            Constraint::Length(2), // Username
            Constraint::Length(2), // Password
            Constraint::Min(0),
            Constraint::Length(1), // Help line
        ])
        .split(inner);

    render_field(frame, "Site", detail.site(), chunks[0], Color::White);
    render_field(frame, "Username", detail.username_text(), chunks[1], Color::Green);
    render_field(frame, "Password", detail.password_text(), chunks[2], Color::Yellow);

    let help = if detail.is_deleting() {
        "Deleting...".to_string()
    } else if detail.accepts_actions() {
        let toggle = if detail.is_revealed() { "hide" } else { "show" };
        format!("s: {toggle} password | u: update | d: delete | Esc: close")
    } else {
        "Esc: close".to_string()
    };
    let help = Paragraph::new(help).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[4]);
}

fn render_field(frame: &mut Frame, label: &str, value: &str, area: Rect, color: Color) {
    let line = Line::from(vec![
        Span::styled(format!("{}: ", label), Style::default().fg(Color::DarkGray)),
        Span::styled(value, Style::default().fg(color)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Render the add/edit form.
fn render_editor(frame: &mut Frame, editor: &EditFlow, focus: Field, area: Rect) {
    let dialog_area = centered_rect(60.min(area.width.saturating_sub(4)), 12, area);
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .title(format!(" ✏️  {} ", editor.title()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1), // Website
            Constraint::Length(1), // Username
            Constraint::Length(1), // Password
            Constraint::Length(1), // Strength
            Constraint::Length(1), // Error
            Constraint::Min(0),
            Constraint::Length(1), // Help line
        ])
        .split(inner);

    for (field, chunk) in Field::ALL.into_iter().zip(chunks.iter()) {
        let value = match field {
            Field::Password => "*".repeat(editor.value(field).chars().count()),
            _ => editor.value(field).to_string(),
        };
        let focused = field == focus;
        let label_style = if editor.invalid_field() == Some(field) {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else if editor.is_editable(field) {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
        };
        let mut spans = vec![
            Span::styled(if focused { "▸ " } else { "  " }, Style::default().fg(Color::Cyan)),
            Span::styled(format!("{:<9}", format!("{}:", field.label())), label_style),
            Span::styled(value, Style::default().fg(Color::White)),
        ];
        if focused {
            spans.push(Span::styled(
                "_",
                Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), *chunk);
    }

    if let Some(strength) = editor.strength() {
        let color = match strength.score {
            0 | 1 => Color::Red,
            2 => Color::Yellow,
            _ => Color::Green,
        };
        let line = Line::from(vec![
            Span::styled("  Strength: ", Style::default().fg(Color::DarkGray)),
            Span::styled(strength.label, Style::default().fg(color)),
        ]);
        frame.render_widget(Paragraph::new(line), chunks[3]);
    }

    if let Some(error) = editor.error() {
        let error = Paragraph::new(error).style(Style::default().fg(Color::Red));
        frame.render_widget(error, chunks[4]);
    }

    let help = if editor.is_saving() {
        "Saving..."
    } else {
        "Tab: next field | Enter: save | Esc: cancel"
    };
    let help = Paragraph::new(help).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[6]);
}

/// Render the search overlay.
fn render_search_overlay(frame: &mut Frame, search: &SiteSearch, area: Rect) {
    let dialog_width = 60.min(area.width.saturating_sub(4));
    let dialog_height = 15.min(area.height.saturating_sub(4));
    let dialog_area = centered_rect(dialog_width, dialog_height, area);

    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .title(" 🔍 Search ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));

    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    let input_line = Line::from(vec![
        Span::styled("▸ ", Style::default().fg(Color::Magenta)),
        Span::styled(search.query(), Style::default().fg(Color::White)),
        Span::styled("_", Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK)),
    ]);
    frame.render_widget(Paragraph::new(input_line), chunks[0]);

    if !search.hits().is_empty() {
        let items: Vec<ListItem> = search
            .hits()
            .iter()
            .enumerate()
            .map(|(i, hit)| {
                let style = if i == search.selected_index() {
                    Style::default()
                        .bg(Color::Rgb(60, 40, 80))
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };
                ListItem::new(Line::from(format!("🔑 {}", hit.site))).style(style)
            })
            .collect();
        frame.render_widget(List::new(items), chunks[1]);
    } else if !search.query().is_empty() {
        let no_results = Paragraph::new("No results found")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(no_results, chunks[1]);
    }
}

/// Render a yes/no question from the detail view.
fn render_confirm(frame: &mut Frame, title: &str, question: &str, area: Rect) {
    render_dialog(
        frame,
        title,
        question,
        "y: yes | n: no",
        Color::Yellow,
        area,
    );
}

fn render_notice(frame: &mut Frame, notice: &Notice, area: Rect) {
    let color = match notice.level {
        NoticeLevel::Info => Color::Green,
        NoticeLevel::Warning => Color::Yellow,
        NoticeLevel::Error => Color::Red,
    };
    render_dialog(frame, &notice.title, &notice.message, "Enter: OK", color, area);
}

fn render_dialog(frame: &mut Frame, title: &str, message: &str, help: &str, color: Color, area: Rect) {
    let dialog_area = centered_rect(56.min(area.width.saturating_sub(4)), 8, area);
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));

    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let body = Paragraph::new(message)
        .style(Style::default().fg(Color::White))
        .wrap(Wrap { trim: true });
    frame.render_widget(body, chunks[0]);

    let help = Paragraph::new(help)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Right);
    frame.render_widget(help, chunks[1]);
}

/// Helper to create a centered rectangle.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mango_core::transport::memory::InMemoryBackend;
    use mango_core::{CredentialClient, Execution, Session};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn app() -> App<InMemoryBackend> {
        let backend = InMemoryBackend::new();
        backend.insert("example.com", "bob", "hunter2");
        let session = Session::new(CredentialClient::new(backend), Execution::Inline);
        let mut app = App::new(session, "localhost:8080");
        app.tick();
        app
    }

    fn screen_text(app: &App<InMemoryBackend>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).expect("terminal");
        terminal.draw(|frame| render(frame, app)).expect("draw");
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn list_shows_sites() {
        let app = app();
        assert!(screen_text(&app).contains("example.com"));
    }

    #[test]
    fn detail_masks_password() {
        let mut app = app();
        app.session.open_selected();
        app.tick();
        let text = screen_text(&app);
        assert!(text.contains("bob"));
        assert!(text.contains("******"));
        assert!(!text.contains("hunter2"));
    }

    #[test]
    fn editor_masks_typed_password() {
        let mut app = app();
        app.open_add();
        app.session.edit_set(Field::Password, "secret");
        let text = screen_text(&app);
        assert!(text.contains("Add Password"));
        assert!(!text.contains("secret"));
    }

    #[test]
    fn centered_rect_clamps_to_area() {
        let area = Rect::new(0, 0, 20, 10);
        let rect = centered_rect(50, 5, area);
        assert_eq!(rect.width, 20);
        assert_eq!(rect.y, 2);
    }
}
