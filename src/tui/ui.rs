use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, List, ListItem, Paragraph, Row, Table, Tabs, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthChar;

use super::{App, Tab};
use crate::calendar::CalendarDay;
use crate::models::{Appointment, Participant};
use chrono::{Datelike, Local};

const DIM: Color = Color::DarkGray;
const SELECTED_BG: Color = Color::Rgb(40, 40, 60);
const GOOD: Color = Color::Green;
const WARN: Color = Color::Yellow;
const BAD: Color = Color::Red;

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

// ─── Main render ────────────────────────────────────────────────────────────

pub fn render(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_tabs(f, app, chunks[0]);
    render_clock(f, app, chunks[0]);

    match app.active_tab {
        Tab::Dashboard => render_dashboard(f, app, chunks[1]),
        Tab::Properties => render_properties(f, app, chunks[1]),
        Tab::Calendar => render_calendar(f, app, chunks[1]),
        Tab::Inbox => render_inbox(f, app, chunks[1]),
        Tab::Clients => render_clients(f, app, chunks[1]),
    }

    render_status_bar(f, app, chunks[2]);
}

// ─── Tab Bar ────────────────────────────────────────────────────────────────

fn render_tabs(f: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, tab)| {
            Line::from(vec![
                Span::styled(format!(" {} ", i + 1), Style::default().fg(DIM)),
                Span::styled(format!("{} ", tab.title()), Style::default().fg(app.theme.text)),
            ])
        })
        .collect();

    let selected = Tab::ALL
        .iter()
        .position(|t| *t == app.active_tab)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .title(" Realty TUI ")
                .title_style(Style::default().fg(app.theme.primary).add_modifier(Modifier::BOLD)),
        )
        .select(selected)
        .highlight_style(
            Style::default()
                .fg(app.theme.primary)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        );

    f.render_widget(tabs, area);
}

// ─── Clock ──────────────────────────────────────────────────────────────────

fn render_clock(f: &mut Frame, app: &App, tab_area: Rect) {
    let time_str = format!(" {} ", Local::now().format("%a %b %d  %H:%M:%S"));
    let clock_width = time_str.len() as u16;
    let clock_area = Rect {
        x: tab_area.right().saturating_sub(clock_width),
        y: tab_area.y,
        width: clock_width.min(tab_area.width),
        height: 1,
    };
    f.render_widget(
        Paragraph::new(time_str).style(Style::default().fg(app.theme.primary)),
        clock_area,
    );
}

// ─── Status Bar ─────────────────────────────────────────────────────────────

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let sync_hint = app
        .cached_at
        .map(|t| {
            format!(
                "  synced {}",
                t.with_timezone(&Local).format("%b %d %H:%M")
            )
        })
        .unwrap_or_default();

    const SPINNER: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
    let lead = if app.loading {
        format!(" {} ", SPINNER[(app.frame_count / 2) as usize % SPINNER.len()])
    } else {
        " ".to_string()
    };

    let status = Paragraph::new(Line::from(vec![
        Span::styled(lead, Style::default().fg(WARN)),
        Span::styled(
            &app.status_message,
            Style::default().fg(if app.loading { WARN } else { app.theme.text }),
        ),
        Span::styled(
            format!(
                "  q:quit  Tab:switch  j/k:nav  h/l:month  t:today  r:refresh{sync_hint}  "
            ),
            Style::default().fg(DIM),
        ),
    ]))
    .style(Style::default().bg(app.theme.navigation));

    f.render_widget(status, area);
}

// ─── Dashboard ──────────────────────────────────────────────────────────────

fn render_dashboard(f: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(0)])
        .split(area);

    let user_name = app
        .user
        .as_ref()
        .and_then(|u| u.name.clone())
        .unwrap_or_else(|| "Agent".into());

    let unread = app.unread_count();
    let today_count = app.buckets.today.len();

    let summary = Paragraph::new(vec![
        Line::from(Span::styled(
            format!("  Welcome, {user_name}!"),
            Style::default().fg(app.theme.text).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                format!("  {} active listings", app.properties.len()),
                Style::default().fg(app.theme.primary),
            ),
            Span::styled("  |  ", Style::default().fg(DIM)),
            Span::styled(
                format!("{today_count} appointments today"),
                Style::default().fg(WARN),
            ),
            Span::styled("  |  ", Style::default().fg(DIM)),
            Span::styled(
                format!("{unread} unread messages"),
                Style::default().fg(if unread > 0 { BAD } else { GOOD }),
            ),
        ]),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Overview ")
            .title_style(Style::default().fg(app.theme.primary)),
    );
    f.render_widget(summary, chunks[0]);

    let items: Vec<ListItem> = app
        .activities
        .iter()
        .enumerate()
        .map(|(i, act)| {
            let when = act
                .occurred_at
                .map(|d| d.with_timezone(&Local).format("%b %d %H:%M").to_string())
                .unwrap_or_default();
            let kind = act.kind.as_deref().unwrap_or("activity");
            let description = act.description.as_deref().unwrap_or("(no description)");

            let is_selected = i == app.activity_list_state.selected;
            let marker = if is_selected { "> " } else { "  " };
            let bg = if is_selected { SELECTED_BG } else { Color::Reset };

            ListItem::new(Line::from(vec![
                Span::styled(marker, Style::default().fg(app.theme.primary)),
                Span::styled(format!("{when:<13}"), Style::default().fg(DIM).bg(bg)),
                Span::styled(format!("[{kind}] "), Style::default().fg(app.theme.tertiary).bg(bg)),
                Span::styled(description, Style::default().fg(app.theme.text).bg(bg)),
            ]))
        })
        .collect();

    let list = if items.is_empty() {
        List::new([ListItem::new("  No recent activity.")])
    } else {
        List::new(items)
    }
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Recent Activity ({}) ", app.activities.len()))
            .title_style(Style::default().fg(app.theme.primary)),
    );

    app.activity_list_state
        .inner
        .select(Some(app.activity_list_state.selected));
    f.render_stateful_widget(list, chunks[1], &mut app.activity_list_state.inner);
}

// ─── Properties ─────────────────────────────────────────────────────────────

fn format_price(price: Option<f64>) -> String {
    let Some(price) = price else {
        return "POA".into();
    };
    let whole = price.round() as i64;
    let mut out = String::new();
    let digits = whole.abs().to_string();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if whole < 0 {
        format!("-${out}")
    } else {
        format!("${out}")
    }
}

fn status_color(status: Option<&str>, theme_link: Color) -> Color {
    match status {
        Some("active") | Some("for_sale") => GOOD,
        Some("pending") | Some("under_offer") => WARN,
        Some("sold") => DIM,
        _ => theme_link,
    }
}

fn render_properties(f: &mut Frame, app: &mut App, area: Rect) {
    let items: Vec<ListItem> = app
        .properties
        .iter()
        .enumerate()
        .map(|(i, prop)| {
            let title = truncate(prop.title.as_deref().unwrap_or("Untitled listing"), 34);
            let address = truncate(prop.address.as_deref().unwrap_or(""), 28);
            let specs = format!(
                "{}bd/{}ba  {} sqft",
                prop.beds.unwrap_or(0),
                prop.baths.unwrap_or(0),
                prop.sqft.unwrap_or(0)
            );
            let status = prop.status.as_deref().unwrap_or("-");

            let is_selected = i == app.property_list_state.selected;
            let marker = if is_selected { "> " } else { "  " };
            let bg = if is_selected { SELECTED_BG } else { Color::Reset };

            ListItem::new(Line::from(vec![
                Span::styled(marker, Style::default().fg(app.theme.primary)),
                Span::styled(
                    format!("{title:<35}"),
                    Style::default().fg(app.theme.text).bg(bg).add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("{address:<29}"), Style::default().fg(DIM).bg(bg)),
                Span::styled(
                    format!("{:>12}  ", format_price(prop.price)),
                    Style::default().fg(app.theme.secondary).bg(bg),
                ),
                Span::styled(format!("{specs:<20}"), Style::default().fg(DIM).bg(bg)),
                Span::styled(
                    status.to_string(),
                    Style::default()
                        .fg(status_color(prop.status.as_deref(), app.theme.link))
                        .bg(bg),
                ),
            ]))
        })
        .collect();

    let list = if items.is_empty() {
        List::new([ListItem::new("  No listings yet.")])
    } else {
        List::new(items)
    }
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Properties ({}) ", app.properties.len()))
            .title_style(Style::default().fg(app.theme.primary)),
    );

    app.property_list_state
        .inner
        .select(Some(app.property_list_state.selected));
    f.render_stateful_widget(list, area, &mut app.property_list_state.inner);
}

// ─── Calendar ───────────────────────────────────────────────────────────────

fn render_calendar(f: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_month_grid(f, app, chunks[0]);
    render_agenda(f, app, chunks[1]);
}

fn render_month_grid(f: &mut Frame, app: &App, area: Rect) {
    let header = Row::new(WEEKDAYS.map(|d| Cell::from(format!(" {d}"))))
        .style(Style::default().fg(app.theme.primary).add_modifier(Modifier::BOLD))
        .bottom_margin(1);

    let rows: Vec<Row> = app
        .grid
        .chunks(7)
        .map(|week| {
            let cells: Vec<Cell> = week.iter().map(|day| day_cell(app, day)).collect();
            Row::new(cells)
        })
        .collect();

    let title = format!(" {} ", app.view_month.format("%B %Y"));
    let table = Table::new(rows, [Constraint::Ratio(1, 7); 7])
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .title_style(Style::default().fg(app.theme.primary).add_modifier(Modifier::BOLD)),
        );

    f.render_widget(table, area);
}

fn day_cell<'a>(app: &App, day: &CalendarDay) -> Cell<'a> {
    let number = if day.is_today {
        format!("[{:2}]", day.date.day())
    } else {
        format!(" {:2} ", day.date.day())
    };
    let badge = match day.appointments.len() {
        0 => "  ".to_string(),
        n => format!("•{n}"),
    };

    let mut style = if day.is_current_month {
        Style::default().fg(app.theme.text)
    } else {
        Style::default().fg(DIM)
    };
    if day.is_today {
        style = style.fg(app.theme.secondary).add_modifier(Modifier::BOLD);
    }
    if day.date == app.selected_date {
        style = style.bg(app.theme.section).fg(app.theme.section_text);
    }

    Cell::from(Line::from(vec![
        Span::raw(number),
        Span::styled(badge, Style::default().fg(WARN)),
    ]))
    .style(style)
}

fn render_agenda(f: &mut Frame, app: &App, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();

    agenda_section(app, &mut lines, "Today", &app.buckets.today);
    agenda_section(app, &mut lines, "Tomorrow", &app.buckets.tomorrow);

    let selected_label = app.selected_date.format("%a, %b %d").to_string();
    if !app.buckets.selected.is_empty() {
        agenda_section(app, &mut lines, &selected_label, &app.buckets.selected);
    }

    if app.buckets.is_empty() {
        lines.push(Line::from(Span::styled(
            "  No upcoming appointments.",
            Style::default().fg(DIM),
        )));
    }

    let agenda = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Appointments ")
            .title_style(Style::default().fg(app.theme.primary)),
    );
    f.render_widget(agenda, area);
}

fn agenda_section(app: &App, lines: &mut Vec<Line>, label: &str, appointments: &[Appointment]) {
    if appointments.is_empty() {
        return;
    }
    lines.push(Line::from(Span::styled(
        format!("── {label} ──"),
        Style::default().fg(WARN).add_modifier(Modifier::BOLD),
    )));
    for appt in appointments {
        lines.push(agenda_line(app, appt));
    }
    lines.push(Line::from(""));
}

fn agenda_line<'a>(app: &App, appt: &Appointment) -> Line<'a> {
    let time = appt
        .date
        .map(|d| d.with_timezone(&Local).format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".into());
    let title = appt.title.clone().unwrap_or_else(|| "Untitled".into());

    let mut spans = vec![
        Span::styled(format!("  {time}  "), Style::default().fg(DIM)),
        Span::styled(title, Style::default().fg(app.theme.text)),
    ];
    if let Some(ref location) = appt.location {
        spans.push(Span::styled(
            format!("  @ {location}"),
            Style::default().fg(app.theme.link),
        ));
    }
    if let Some(client_id) = appt.client_id {
        if let Some(client) = app.clients.iter().find(|c| c.id == client_id) {
            spans.push(Span::styled(
                format!("  ({})", client.name.as_deref().unwrap_or("client")),
                Style::default().fg(DIM),
            ));
        }
    }
    Line::from(spans)
}

// ─── Inbox ──────────────────────────────────────────────────────────────────

fn render_inbox(f: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let items: Vec<ListItem> = app
        .messages
        .iter()
        .enumerate()
        .map(|(i, msg)| {
            let (tag, name) = match app.resolve_sender(msg) {
                Some(p @ Participant::User(_)) => ("agent", p.display_name().to_string()),
                Some(p @ Participant::Client(_)) => ("client", p.display_name().to_string()),
                None => ("?", "Unknown sender".to_string()),
            };
            let preview = truncate(msg.body.as_deref().unwrap_or(""), 38);
            let date = msg
                .sent_at
                .map(|d| d.with_timezone(&Local).format("%b %d").to_string())
                .unwrap_or_default();

            let is_unread = msg.read == Some(false);
            let is_selected = i == app.message_list_state.selected;
            let marker = if is_selected { "> " } else { "  " };

            let name_style = if is_unread {
                Style::default().fg(app.theme.text).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(DIM)
            };

            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(marker, Style::default().fg(app.theme.primary)),
                    Span::styled(
                        name,
                        if is_selected { name_style.bg(SELECTED_BG) } else { name_style },
                    ),
                    Span::styled(format!(" [{tag}]"), Style::default().fg(app.theme.tertiary)),
                    if is_unread {
                        Span::styled(" *", Style::default().fg(BAD))
                    } else {
                        Span::raw("")
                    },
                ]),
                Line::from(vec![
                    Span::styled("    ", Style::default()),
                    Span::styled(preview, Style::default().fg(DIM)),
                    Span::styled(format!("  {date}"), Style::default().fg(DIM)),
                ]),
            ])
        })
        .collect();

    let list = if items.is_empty() {
        List::new([ListItem::new("  No messages yet.")])
    } else {
        List::new(items)
    }
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Inbox ({}) ", app.messages.len()))
            .title_style(Style::default().fg(app.theme.primary)),
    );

    app.message_list_state
        .inner
        .select(Some(app.message_list_state.selected));
    f.render_stateful_widget(list, chunks[0], &mut app.message_list_state.inner);

    let detail = if let Some(msg) = app.selected_message() {
        let from = match app.resolve_sender(msg) {
            Some(p) => p.display_name().to_string(),
            None => "Unknown sender".to_string(),
        };
        let date = msg
            .sent_at
            .map(|d| {
                d.with_timezone(&Local)
                    .format("%B %d, %Y at %H:%M")
                    .to_string()
            })
            .unwrap_or_default();
        let body = msg.body.clone().unwrap_or_else(|| "(no content)".into());

        Paragraph::new(vec![
            Line::from(Span::styled(
                format!("From {from}"),
                Style::default().fg(app.theme.text).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(date, Style::default().fg(DIM))),
            Line::from(""),
            Line::from(Span::styled(body, Style::default().fg(app.theme.text))),
        ])
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Message ")
                .title_style(Style::default().fg(app.theme.primary)),
        )
    } else {
        Paragraph::new("  Select a message to read it.").block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Message ")
                .title_style(Style::default().fg(app.theme.primary)),
        )
    };
    f.render_widget(detail, chunks[1]);
}

// ─── Clients ────────────────────────────────────────────────────────────────

fn stage_color(stage: Option<&str>) -> Color {
    match stage {
        Some("lead") => WARN,
        Some("viewing") | Some("offer") => GOOD,
        Some("closed") => DIM,
        _ => Color::Reset,
    }
}

fn render_clients(f: &mut Frame, app: &mut App, area: Rect) {
    let items: Vec<ListItem> = app
        .clients
        .iter()
        .enumerate()
        .map(|(i, client)| {
            let name = client.name.as_deref().unwrap_or("Unnamed client");
            let stage = client.stage.as_deref().unwrap_or("-");
            let email = client.email.as_deref().unwrap_or("");
            let phone = client.phone.as_deref().unwrap_or("");

            let is_selected = i == app.client_list_state.selected;
            let marker = if is_selected { "> " } else { "  " };
            let bg = if is_selected { SELECTED_BG } else { Color::Reset };

            ListItem::new(Line::from(vec![
                Span::styled(marker, Style::default().fg(app.theme.primary)),
                Span::styled(
                    format!("{name:<28}"),
                    Style::default().fg(app.theme.text).bg(bg).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("{stage:<10}"),
                    Style::default().fg(stage_color(client.stage.as_deref())).bg(bg),
                ),
                Span::styled(format!("{email:<30}"), Style::default().fg(app.theme.link).bg(bg)),
                Span::styled(phone.to_string(), Style::default().fg(DIM).bg(bg)),
            ]))
        })
        .collect();

    let list = if items.is_empty() {
        List::new([ListItem::new("  No clients yet.")])
    } else {
        List::new(items)
    }
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Clients ({}) ", app.clients.len()))
            .title_style(Style::default().fg(app.theme.primary)),
    );

    app.client_list_state
        .inner
        .select(Some(app.client_list_state.selected));
    f.render_stateful_widget(list, area, &mut app.client_list_state.inner);
}

// ─── Helpers ────────────────────────────────────────────────────────────────

/// Truncate to a display-cell budget, appending an ellipsis when text
/// was dropped. Width-aware so wide glyphs don't blow out columns.
fn truncate(s: &str, max_width: usize) -> String {
    let mut width = 0;
    let mut out = String::new();
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if width + w > max_width.saturating_sub(1) {
            out.push('…');
            return out;
        }
        width += w;
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_formats_with_thousands_separators() {
        assert_eq!(format_price(Some(450_000.0)), "$450,000");
        assert_eq!(format_price(Some(1_250_000.0)), "$1,250,000");
        assert_eq!(format_price(Some(900.0)), "$900");
        assert_eq!(format_price(None), "POA");
    }

    #[test]
    fn truncate_respects_display_width() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long listing title", 10), "a very lo…");
    }
}
