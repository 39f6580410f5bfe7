// UI module for rendering the TUI.
// Tab bar, record tables, alert line, status bar, and modal overlays.

mod list;
mod modal;
mod tabs;

use ratatui::{prelude::*, widgets::*};

use crate::app::{App, Tab};
use crate::state::AlertLevel;

/// Main draw function that renders the entire UI.
pub fn draw(frame: &mut Frame, app: &mut App) {
    if let Some(message) = &app.fatal {
        draw_fatal(frame, message);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(1),    // Main content
            Constraint::Length(1), // Alert line
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    tabs::draw_tabs(frame, app, chunks[0]);

    match app.active_tab {
        Tab::Links => list::render_links(frame, &mut app.links, chunks[1]),
        Tab::Ads => list::render_ads(frame, &mut app.ads, chunks[1]),
    }

    draw_alert(frame, app, chunks[2]);
    draw_status_bar(frame, app, chunks[3]);

    // Modal overlays are rendered last, on top of everything.
    if let Some(prompt) = &app.login {
        modal::draw_login(frame, prompt);
    } else {
        match app.active_tab {
            Tab::Links => {
                if let Some(form) = &app.links.form {
                    modal::draw_link_form(frame, form, &app.links.selectable_ads);
                } else if let Some(shortlink) = &app.links.confirm_delete {
                    modal::draw_confirm(
                        frame,
                        &format!("Do you want to delete the entry {shortlink}?"),
                    );
                }
            }
            Tab::Ads => {
                if let Some(form) = &app.ads.form {
                    modal::draw_ad_form(frame, form);
                } else if app.ads.confirm_delete.is_some() {
                    modal::draw_confirm(frame, "Do you want to delete this ad?");
                }
            }
        }
    }
}

/// Draw the outcome line for the active tab.
fn draw_alert(frame: &mut Frame, app: &App, area: Rect) {
    let alert = match app.active_tab {
        Tab::Links => &app.links.alert,
        Tab::Ads => &app.ads.alert,
    };
    if let Some(alert) = alert {
        let color = match alert.level {
            AlertLevel::Success => Color::Green,
            AlertLevel::Error => Color::Red,
        };
        let line = Paragraph::new(format!(" {}", alert.text)).style(Style::default().fg(color));
        frame.render_widget(line, area);
    }
}

/// Draw the status bar with keybinding hints and the server version.
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mut hints = vec![
        Span::raw(" ↑↓ "),
        Span::styled("Select", Style::default().fg(Color::DarkGray)),
        Span::raw("  ←→ "),
        Span::styled("Page", Style::default().fg(Color::DarkGray)),
        Span::raw("  c "),
        Span::styled("New", Style::default().fg(Color::DarkGray)),
        Span::raw("  e "),
        Span::styled("Edit", Style::default().fg(Color::DarkGray)),
        Span::raw("  d "),
        Span::styled("Delete", Style::default().fg(Color::DarkGray)),
        Span::raw("  y "),
        Span::styled("Copy URL", Style::default().fg(Color::DarkGray)),
        Span::raw("  r "),
        Span::styled("Refresh", Style::default().fg(Color::DarkGray)),
        Span::raw("  Tab "),
        Span::styled("Switch", Style::default().fg(Color::DarkGray)),
        Span::raw("  L "),
        Span::styled("Logout", Style::default().fg(Color::DarkGray)),
        Span::raw("  q "),
        Span::styled("Quit", Style::default().fg(Color::DarkGray)),
    ];

    if let Some(config) = &app.server_config {
        hints.push(Span::styled(
            format!("  v{}", config.version),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let status = Paragraph::new(Line::from(hints));
    frame.render_widget(status, area);
}

/// Full-screen notice for a consistency-risking failure.
fn draw_fatal(frame: &mut Frame, message: &str) {
    let area = frame.area();
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Something went wrong!",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "The local view may be out of sync with the server.",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "Press r to reload everything, or q to quit.",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let notice = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(" Error "));
    frame.render_widget(notice, area);
}
