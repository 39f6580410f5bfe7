// Record list rendering for the links and ads tabs.
// Styled rows with countdown labels and page indicators.

use ratatui::{prelude::*, widgets::*};

use crate::state::links::ad_label;
use crate::state::pager::PAGE_SIZE;
use crate::state::{AdsTab, LinksTab};

/// Render an empty state message.
fn render_empty(frame: &mut Frame, area: Rect, message: &str) {
    let text = Paragraph::new(message)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(text, area);
}

/// Page indicator for a list title, with arrows only where navigation can
/// actually go.
fn page_title(name: &str, page: usize, first: bool, last: bool) -> String {
    let prev = if first { " " } else { "◀" };
    let next = if last { " " } else { "▶" };
    format!(" {name} {prev} page {} {next} ", page + 1)
}

/// Render the links table.
pub fn render_links(frame: &mut Frame, links: &mut LinksTab, area: Rect) {
    let page = links.pager.page();
    let visible = links.cache.window(page, PAGE_SIZE);

    if visible.is_empty() {
        render_empty(frame, area, "No active links.");
        return;
    }

    let items: Vec<ListItem> = visible
        .iter()
        .enumerate()
        .map(|(i, link)| {
            let row = links.rows.get(&link.shortlink);
            let expired = row.is_some_and(|r| r.expired);
            let expiry = if link.expiry_time > 0 {
                row.map(|r| r.label.clone()).unwrap_or_default()
            } else {
                "-".to_string()
            };
            let expiry_style = if expired {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::Yellow)
            };
            let short_style = if expired {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::Cyan)
            };

            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:>3} ", page * PAGE_SIZE + i + 1),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(format!("{:<16} ", link.shortlink), short_style),
                Span::raw(format!("{:<40} ", link.longlink)),
                Span::styled(
                    format!("{:<20} ", ad_label(link.ad_id, &links.selectable_ads)),
                    Style::default().fg(Color::Magenta),
                ),
                Span::styled(
                    format!("{:>6} hits ", link.hits),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(expiry, expiry_style),
            ]))
        })
        .collect();

    let first = links.pager.is_first_page();
    let last = links.pager.is_last_page(links.cache.len());
    let list_widget = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(page_title("Links", page, first, last)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list_widget, area, &mut links.list_state);
}

/// Render the ads table.
pub fn render_ads(frame: &mut Frame, ads: &mut AdsTab, area: Rect) {
    let page = ads.pager.page();
    let visible = ads.cache.window(page, PAGE_SIZE);

    if visible.is_empty() {
        render_empty(frame, area, "No ads found.");
        return;
    }

    let items: Vec<ListItem> = visible
        .iter()
        .enumerate()
        .map(|(i, ad)| {
            let row = ads.rows.get(&ad.id);
            let expired = row.is_some_and(|r| r.expired);
            let expiry = if ad.expiry_time > 0 {
                row.map(|r| r.label.clone()).unwrap_or_default()
            } else {
                "-".to_string()
            };
            let expiry_style = if expired {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::Yellow)
            };

            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:>3} ", page * PAGE_SIZE + i + 1),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(format!("{:<20} ", ad.name), Style::default().fg(Color::Cyan)),
                Span::raw(format!("{:<32} ", ad.ad_link)),
                Span::styled(
                    format!("{:>3}s countdown ", ad.countdown_seconds),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(expiry, expiry_style),
            ]))
        })
        .collect();

    let first = ads.pager.is_first_page();
    let last = ads.pager.is_last_page(ads.cache.len());
    let list_widget = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(page_title("Ads", page, first, last)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list_widget, area, &mut ads.list_state);
}
