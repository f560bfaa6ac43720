//! Keyboard input handling for the TUI.
//!
//! Translates key events into view-model changes or queued gate actions.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use sessiongate_core::{FormFocus, View};

use crate::app::{App, AppState, PendingAction};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // One request at a time; keys wait until it finishes
    if app.view.pending {
        return Ok(false);
    }

    if app.view.view.is_auth_panel() {
        handle_auth_input(app, key)
    } else {
        handle_dashboard_input(app, key)
    }
}

fn submit_action(view: View) -> PendingAction {
    match view {
        View::Signup => PendingAction::Signup,
        View::Login | View::Dashboard => PendingAction::Login,
    }
}

fn handle_auth_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Quitting;
            return Ok(true);
        }
        KeyCode::Char('r') if ctrl => {
            if let Some(form) = app.view.form_mut() {
                form.toggle_password_visibility();
            }
        }
        KeyCode::Char('s') if ctrl => {
            app.view.toggle_panel();
        }
        KeyCode::Down | KeyCode::Tab => {
            if let Some(form) = app.view.form_mut() {
                form.focus = form.focus.next();
            }
        }
        KeyCode::Up | KeyCode::BackTab => {
            if let Some(form) = app.view.form_mut() {
                form.focus = form.focus.prev();
            }
        }
        KeyCode::Enter => {
            let Some(focus) = app.view.active_form().map(|f| f.focus) else {
                return Ok(false);
            };
            match focus {
                FormFocus::Username => {
                    if let Some(form) = app.view.form_mut() {
                        form.focus = FormFocus::Password;
                    }
                }
                FormFocus::Password | FormFocus::Submit => {
                    app.request(submit_action(app.view.view));
                }
                FormFocus::Switch => {
                    app.view.toggle_panel();
                }
            }
        }
        KeyCode::Backspace => {
            if let Some(form) = app.view.form_mut() {
                form.pop_char();
            }
        }
        KeyCode::Char(c) if !ctrl => {
            if let Some(form) = app.view.form_mut() {
                // Refused characters (too long, control chars) are dropped
                form.push_char(c);
            }
        }
        _ => {}
    }
    Ok(false)
}

fn handle_dashboard_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            app.state = AppState::Quitting;
            return Ok(true);
        }
        KeyCode::Char('r') => {
            app.request(PendingAction::Reload);
        }
        KeyCode::Char('l') => {
            app.logout();
        }
        _ => {}
    }
    Ok(false)
}
