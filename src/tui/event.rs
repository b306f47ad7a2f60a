use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use std::time::Duration;

use super::{App, Tab};

pub fn poll_event(timeout: Duration) -> anyhow::Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

pub fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    match (code, modifiers) {
        (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
            app.running = false;
            return;
        }
        (KeyCode::Tab, _) | (KeyCode::Right, KeyModifiers::SHIFT) => {
            app.active_tab = app.active_tab.next();
            return;
        }
        (KeyCode::BackTab, _) | (KeyCode::Left, KeyModifiers::SHIFT) => {
            app.active_tab = app.active_tab.prev();
            return;
        }
        (KeyCode::Char('1'), _) => {
            app.active_tab = Tab::Dashboard;
            return;
        }
        (KeyCode::Char('2'), _) => {
            app.active_tab = Tab::Properties;
            return;
        }
        (KeyCode::Char('3'), _) => {
            app.active_tab = Tab::Calendar;
            return;
        }
        (KeyCode::Char('4'), _) => {
            app.active_tab = Tab::Inbox;
            return;
        }
        (KeyCode::Char('5'), _) => {
            app.active_tab = Tab::Clients;
            return;
        }
        _ => {}
    }

    // The calendar owns its own movement keys: days along the row,
    // weeks down the column, whole months with h/l.
    if app.active_tab == Tab::Calendar {
        match code {
            KeyCode::Left => app.move_selected_date(-1),
            KeyCode::Right => app.move_selected_date(1),
            KeyCode::Up | KeyCode::Char('k') => app.move_selected_date(-7),
            KeyCode::Down | KeyCode::Char('j') => app.move_selected_date(7),
            KeyCode::Char('h') | KeyCode::PageUp => app.prev_month(),
            KeyCode::Char('l') | KeyCode::PageDown => app.next_month(),
            KeyCode::Char('t') => app.jump_to_today(),
            KeyCode::Char('r') if !app.loading => app.needs_refresh = true,
            _ => {}
        }
        return;
    }

    match code {
        KeyCode::Down | KeyCode::Char('j') => {
            if let Some(ls) = app.active_list_state_mut() {
                ls.select_next();
            }
        }
        KeyCode::Up | KeyCode::Char('k') => {
            if let Some(ls) = app.active_list_state_mut() {
                ls.select_prev();
            }
        }
        KeyCode::Home | KeyCode::Char('g') => {
            if let Some(ls) = app.active_list_state_mut() {
                ls.selected = 0;
            }
        }
        KeyCode::End | KeyCode::Char('G') => {
            if let Some(ls) = app.active_list_state_mut() {
                if ls.len > 0 {
                    ls.selected = ls.len - 1;
                }
            }
        }
        KeyCode::Char('r') if !app.loading => {
            app.needs_refresh = true;
        }
        _ => {}
    }
}
