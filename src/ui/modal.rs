// Modal UI components.
// Centered dialogs for login, record forms, and delete confirmation.

use ratatui::{prelude::*, widgets::*};

use crate::api::types::AdSummary;
use crate::app::LoginPrompt;
use crate::state::ads::{AdField, AdForm, AdFormMode};
use crate::state::links::{LinkField, LinkForm, LinkFormMode};
use crate::state::EXPIRY_CHOICES;

/// Centered modal area of the given size.
fn modal_area(frame: &Frame, width: u16, height: u16) -> Rect {
    let area = frame.area();
    let x = (area.width.saturating_sub(width)) / 2;
    let y = (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

/// One labeled input row; the focused row gets a cursor block.
fn input_line(label: &str, value: String, focused: bool) -> Line<'static> {
    let mut spans = vec![
        Span::styled(format!("{label:<12}"), Style::default().fg(Color::DarkGray)),
        Span::raw(value),
    ];
    if focused {
        spans.push(Span::styled("█", Style::default().fg(Color::Yellow)));
    }
    Line::from(spans)
}

/// One labeled choice row, cycled with the arrow keys.
fn choice_line(label: &str, value: String, focused: bool) -> Line<'static> {
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Line::from(vec![
        Span::styled(format!("{label:<12}"), Style::default().fg(Color::DarkGray)),
        Span::styled(format!("< {value} >"), style),
    ])
}

fn instructions() -> Line<'static> {
    Line::from(vec![
        Span::styled(" Tab", Style::default().fg(Color::Yellow)),
        Span::styled(" Next field  ", Style::default().fg(Color::DarkGray)),
        Span::styled("←→", Style::default().fg(Color::Yellow)),
        Span::styled(" Change  ", Style::default().fg(Color::DarkGray)),
        Span::styled("Enter", Style::default().fg(Color::Yellow)),
        Span::styled(" Save  ", Style::default().fg(Color::DarkGray)),
        Span::styled("Esc", Style::default().fg(Color::Yellow)),
        Span::styled(" Cancel ", Style::default().fg(Color::DarkGray)),
    ])
}

/// Draw the password prompt shown until the session is authenticated.
pub fn draw_login(frame: &mut Frame, prompt: &LoginPrompt) {
    let area = modal_area(frame, 44, 7);
    frame.render_widget(Clear, area);

    let mut lines = vec![
        input_line("Password", "•".repeat(prompt.password.chars().count()), true),
        Line::from(""),
    ];
    if let Some(error) = &prompt.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    } else {
        lines.push(Line::from(""));
    }
    lines.push(Line::from(vec![
        Span::styled(" Enter", Style::default().fg(Color::Yellow)),
        Span::styled(" Log in  ", Style::default().fg(Color::DarkGray)),
        Span::styled("Esc", Style::default().fg(Color::Yellow)),
        Span::styled(" Quit ", Style::default().fg(Color::DarkGray)),
    ]));

    let dialog = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Login "),
    );
    frame.render_widget(dialog, area);
}

fn ad_choice_label(choice: usize, summaries: &[AdSummary]) -> String {
    match choice {
        0 => "None".to_string(),
        n => summaries
            .get(n - 1)
            .map(|ad| format!("{} (#{})", ad.name, ad.id))
            .unwrap_or_else(|| "None".to_string()),
    }
}

/// Draw the create/edit dialog for a link.
pub fn draw_link_form(frame: &mut Frame, form: &LinkForm, summaries: &[AdSummary]) {
    let area = modal_area(frame, 64, 11);
    frame.render_widget(Clear, area);

    let title = match &form.mode {
        LinkFormMode::Create => " New Short URL ".to_string(),
        LinkFormMode::Edit { shortlink } => format!(" Edit {shortlink} "),
    };

    let mut lines = vec![input_line(
        "Long URL",
        form.long_url.clone(),
        form.field == LinkField::LongUrl,
    )];
    match &form.mode {
        LinkFormMode::Create => {
            lines.push(input_line(
                "Short code",
                if form.short_code.is_empty() && form.field != LinkField::ShortCode {
                    "(auto-generated)".to_string()
                } else {
                    form.short_code.clone()
                },
                form.field == LinkField::ShortCode,
            ));
            lines.push(choice_line(
                "Expires",
                EXPIRY_CHOICES[form.expiry_choice].0.to_string(),
                form.field == LinkField::Expiry,
            ));
            lines.push(choice_line(
                "Ad",
                ad_choice_label(form.ad_choice, summaries),
                form.field == LinkField::Ad,
            ));
        }
        LinkFormMode::Edit { .. } => {
            lines.push(choice_line(
                "Ad",
                ad_choice_label(form.ad_choice, summaries),
                form.field == LinkField::Ad,
            ));
            lines.push(choice_line(
                "Reset hits",
                if form.reset_hits { "yes" } else { "no" }.to_string(),
                form.field == LinkField::ResetHits,
            ));
        }
    }
    lines.push(Line::from(""));
    lines.push(instructions());

    let dialog = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(title),
    );
    frame.render_widget(dialog, area);
}

/// Draw the create/edit dialog for an ad.
pub fn draw_ad_form(frame: &mut Frame, form: &AdForm) {
    let area = modal_area(frame, 64, 12);
    frame.render_widget(Clear, area);

    let title = match form.mode {
        AdFormMode::Create => " New Ad ".to_string(),
        AdFormMode::Edit { id } => format!(" Edit Ad #{id} "),
    };

    let lines = vec![
        input_line("Name", form.name.clone(), form.field == AdField::Name),
        input_line(
            "Image URL",
            form.image_url.clone(),
            form.field == AdField::ImageUrl,
        ),
        input_line(
            "Ad link",
            form.ad_link.clone(),
            form.field == AdField::AdLink,
        ),
        choice_line(
            "Expires",
            EXPIRY_CHOICES[form.expiry_choice].0.to_string(),
            form.field == AdField::Expiry,
        ),
        input_line(
            "Countdown",
            format!("{}s", form.countdown),
            form.field == AdField::Countdown,
        ),
        Line::from(""),
        instructions(),
    ];

    let dialog = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(title),
    );
    frame.render_widget(dialog, area);
}

/// Draw a yes/no confirmation on top of the current view.
pub fn draw_confirm(frame: &mut Frame, message: &str) {
    let area = modal_area(frame, 56, 6);
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(vec![
            Span::styled(" y", Style::default().fg(Color::Yellow)),
            Span::styled(" Delete  ", Style::default().fg(Color::DarkGray)),
            Span::styled("n", Style::default().fg(Color::Yellow)),
            Span::styled(" Cancel ", Style::default().fg(Color::DarkGray)),
        ]),
    ];

    let dialog = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .title(" Confirm "),
    );
    frame.render_widget(dialog, area);
}
