//! View model for the login/signup screen and the protected dashboard.
//!
//! The gate writes navigation, notices and the dashboard text here; the front
//! end only reads it and feeds key presses into the forms.

use chrono::{DateTime, Duration, Utc};

use crate::auth::Credentials;
use crate::config::{Config, NoticeStyle};

// ============================================================================
// Constants
// ============================================================================

/// Maximum length for username input.
/// Usernames are often email addresses, 50 chars covers most.
const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Signup,
    /// Protected; only shown while an access token is stored
    Dashboard,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            View::Login => "Sign In",
            View::Signup => "Create Account",
            View::Dashboard => "Dashboard",
        }
    }

    /// Login or signup, the panels with a form.
    pub fn is_auth_panel(&self) -> bool {
        matches!(self, View::Login | View::Signup)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    pub raised_at: DateTime<Utc>,
}

/// Form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormFocus {
    Username,
    Password,
    Submit,
    /// "Switch to the other panel" link
    Switch,
}

impl FormFocus {
    pub fn next(&self) -> Self {
        match self {
            FormFocus::Username => FormFocus::Password,
            FormFocus::Password => FormFocus::Submit,
            FormFocus::Submit => FormFocus::Switch,
            FormFocus::Switch => FormFocus::Username,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            FormFocus::Username => FormFocus::Switch,
            FormFocus::Password => FormFocus::Username,
            FormFocus::Submit => FormFocus::Password,
            FormFocus::Switch => FormFocus::Submit,
        }
    }
}

/// Username/password form shared by both panels.
#[derive(Debug, Clone)]
pub struct Form {
    pub username: String,
    pub password: String,
    pub password_visible: bool,
    pub focus: FormFocus,
}

impl Default for Form {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            password_visible: false,
            focus: FormFocus::Username,
        }
    }
}

impl Form {
    /// Type a character into the focused field. Returns false if it was refused.
    pub fn push_char(&mut self, c: char) -> bool {
        match self.focus {
            FormFocus::Username if can_add_username_char(self.username.chars().count(), c) => {
                self.username.push(c);
                true
            }
            FormFocus::Password if can_add_password_char(self.password.chars().count(), c) => {
                self.password.push(c);
                true
            }
            _ => false,
        }
    }

    pub fn pop_char(&mut self) {
        match self.focus {
            FormFocus::Username => {
                self.username.pop();
            }
            FormFocus::Password => {
                self.password.pop();
            }
            FormFocus::Submit | FormFocus::Switch => {}
        }
    }

    pub fn toggle_password_visibility(&mut self) {
        self.password_visible = !self.password_visible;
    }

    /// Password as it should be drawn
    pub fn password_display(&self) -> String {
        if self.password_visible {
            self.password.clone()
        } else {
            "*".repeat(self.password.chars().count())
        }
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.username.clone(), self.password.clone())
    }

    /// Focus the first empty field, or the password when a username is prefilled.
    pub fn reset_focus(&mut self) {
        self.focus = if self.username.is_empty() {
            FormFocus::Username
        } else {
            FormFocus::Password
        };
    }
}

pub struct ViewModel {
    pub view: View,
    pub login_form: Form,
    pub signup_form: Form,
    /// Message from the dashboard endpoint
    pub welcome: Option<String>,
    /// A request is in flight
    pub pending: bool,
    notice: Option<Notice>,
    notice_style: NoticeStyle,
    toast_duration: Duration,
}

impl ViewModel {
    pub fn new(config: &Config) -> Self {
        let mut login_form = Form::default();
        if let Some(ref username) = config.last_username {
            login_form.username = username.clone();
        }
        login_form.reset_focus();

        Self {
            view: View::Login,
            login_form,
            signup_form: Form::default(),
            welcome: None,
            pending: false,
            notice: None,
            notice_style: config.notice_style,
            toast_duration: config.toast_duration(),
        }
    }

    pub fn notice_style(&self) -> NoticeStyle {
        self.notice_style
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn show_login(&mut self) {
        self.switch_panel(View::Login);
    }

    pub fn show_signup(&mut self) {
        self.switch_panel(View::Signup);
    }

    /// Flip between the login and signup panels. No-op on the dashboard.
    pub fn toggle_panel(&mut self) {
        match self.view {
            View::Login => self.show_signup(),
            View::Signup => self.show_login(),
            View::Dashboard => {}
        }
    }

    fn switch_panel(&mut self, view: View) {
        self.view = view;
        if self.notice_style == NoticeStyle::Inline {
            self.notice = None;
        }
        self.active_form_mut().reset_focus();
    }

    pub fn show_dashboard(&mut self) {
        self.view = View::Dashboard;
    }

    /// The form of the visible panel; the dashboard has none.
    pub fn active_form(&self) -> Option<&Form> {
        match self.view {
            View::Login => Some(&self.login_form),
            View::Signup => Some(&self.signup_form),
            View::Dashboard => None,
        }
    }

    fn active_form_mut(&mut self) -> &mut Form {
        match self.view {
            View::Signup => &mut self.signup_form,
            View::Login | View::Dashboard => &mut self.login_form,
        }
    }

    /// Mutable access to the visible panel's form.
    pub fn form_mut(&mut self) -> Option<&mut Form> {
        match self.view {
            View::Login => Some(&mut self.login_form),
            View::Signup => Some(&mut self.signup_form),
            View::Dashboard => None,
        }
    }

    // =========================================================================
    // Notices
    // =========================================================================

    pub fn notify(&mut self, kind: NoticeKind, text: impl Into<String>) {
        self.notify_at(kind, text, Utc::now());
    }

    pub fn notify_at(&mut self, kind: NoticeKind, text: impl Into<String>, now: DateTime<Utc>) {
        self.notice = Some(Notice {
            kind,
            text: text.into(),
            raised_at: now,
        });
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Drop a toast once its display time is over. Inline messages stay.
    pub fn expire_notices(&mut self, now: DateTime<Utc>) {
        if self.notice_style != NoticeStyle::Toast {
            return;
        }
        if let Some(ref notice) = self.notice {
            if now - notice.raised_at >= self.toast_duration {
                self.notice = None;
            }
        }
    }
}

// ============================================================================
// Input validation helpers
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a username character should be accepted
pub fn can_add_username_char(current_len: usize, c: char) -> bool {
    current_len < MAX_USERNAME_LENGTH && is_valid_input_char(c)
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}
