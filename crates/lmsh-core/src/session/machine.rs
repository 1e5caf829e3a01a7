//! Interactive session state machine for fallback mode.
//!
//! Defines the interaction protocol the remote session program implements,
//! so local simulation is observably consistent with a connected session.
//! Transitions are pure: `(state, line) -> effects`, no I/O. Display delays
//! are data (`Effect::Pause`), so the state commits with the input line and
//! only rendering is deferred.

use std::time::Duration;

use tracing::debug;

use crate::constants::REDRAW_DELAY;

use super::auth::{Role, authenticate};
use super::menu;

/// Where the session is in the login/menu flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Choosing between login and exit.
    MainMenu,
    /// Waiting for the email line.
    AwaitingEmail,
    /// Waiting for the password line.
    AwaitingPassword,
    /// Inside the role-specific menu.
    UserMenu,
    /// Waiting for any line before redrawing the menu.
    AwaitingContinue,
    /// Closed; absorbs input until restarted externally.
    Exiting,
}

/// One rendering instruction produced by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Write text without a line break.
    Write(String),
    /// Write text followed by a line break.
    WriteLine(String),
    /// Clear the display surface.
    Clear,
    /// Defer the remaining effects by this long.
    Pause(Duration),
}

/// The simulated session program.
#[derive(Debug, Default)]
pub struct SessionMachine {
    state: SessionState,
    pending_email: Option<String>,
    role: Option<Role>,
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::MainMenu
    }
}

impl SessionMachine {
    /// Create a machine at the main menu with no role.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to the initial state and return the opening screen.
    pub fn start(&mut self) -> Vec<Effect> {
        *self = Self::new();
        main_screen_effects()
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Authenticated role, if any.
    pub fn role(&self) -> Option<Role> {
        self.role
    }

    /// Interpret one completed line (record terminator already stripped).
    ///
    /// Every state handles every possible line, so the machine never gets
    /// stuck.
    pub fn handle_line(&mut self, line: &str) -> Vec<Effect> {
        debug!(state = ?self.state, "interpreting line");
        match self.state {
            SessionState::MainMenu => self.on_main_menu(line),
            SessionState::AwaitingEmail => self.on_email(line),
            SessionState::AwaitingPassword => self.on_password(line),
            SessionState::UserMenu => self.on_user_menu(line),
            SessionState::AwaitingContinue => self.on_continue(),
            SessionState::Exiting => Vec::new(),
        }
    }

    fn on_main_menu(&mut self, line: &str) -> Vec<Effect> {
        match line {
            "1" => {
                self.state = SessionState::AwaitingEmail;
                vec![Effect::Write("Email: ".into())]
            }
            "2" => {
                self.state = SessionState::Exiting;
                vec![
                    Effect::WriteLine("Exiting application...".into()),
                    Effect::Pause(REDRAW_DELAY),
                    Effect::Clear,
                    Effect::WriteLine("Library Management System has been closed.".into()),
                    Effect::WriteLine("Restart the session to start again.".into()),
                ]
            }
            _ => vec![
                Effect::WriteLine("Invalid choice! Please enter 1 or 2.".into()),
                Effect::Write(menu::CHOICE_PROMPT.into()),
            ],
        }
    }

    fn on_email(&mut self, line: &str) -> Vec<Effect> {
        self.pending_email = Some(line.to_string());
        self.state = SessionState::AwaitingPassword;
        vec![Effect::Write("Password: ".into())]
    }

    fn on_password(&mut self, line: &str) -> Vec<Effect> {
        let email = self.pending_email.take().unwrap_or_default();
        match authenticate(&email, line) {
            Some(role) => {
                debug!(%role, "credentials accepted");
                self.role = Some(role);
                self.state = SessionState::UserMenu;
                let mut effects = vec![
                    Effect::WriteLine(format!("Login successful! Welcome back, {role}.")),
                    Effect::WriteLine("Loading user menu...".into()),
                    Effect::WriteLine(String::new()),
                    Effect::Pause(REDRAW_DELAY),
                ];
                effects.extend(user_screen_effects(role));
                effects
            }
            None => {
                debug!("credentials rejected");
                self.state = SessionState::MainMenu;
                let mut effects = vec![
                    Effect::WriteLine("Invalid credentials! Please try again.".into()),
                    Effect::WriteLine(String::new()),
                    Effect::Pause(REDRAW_DELAY),
                ];
                effects.extend(main_screen_effects());
                effects
            }
        }
    }

    fn on_user_menu(&mut self, line: &str) -> Vec<Effect> {
        if line == "8" {
            self.role = None;
            self.state = SessionState::MainMenu;
            let mut effects = vec![
                Effect::WriteLine("Logging out...".into()),
                Effect::WriteLine(String::new()),
                Effect::Pause(REDRAW_DELAY),
            ];
            effects.extend(main_screen_effects());
            effects
        } else {
            self.state = SessionState::AwaitingContinue;
            vec![
                Effect::WriteLine(format!("Selected option: {line}")),
                Effect::WriteLine(
                    "This is a simulated session. In a live deployment this option is handled \
                     by the catalog backend."
                        .into(),
                ),
                Effect::WriteLine(String::new()),
                Effect::WriteLine("Press Enter to continue...".into()),
            ]
        }
    }

    fn on_continue(&mut self) -> Vec<Effect> {
        // A missing role here should not occur, but every state stays total:
        // fall back to the main screen rather than getting stuck.
        match self.role {
            Some(role) => {
                self.state = SessionState::UserMenu;
                user_screen_effects(role)
            }
            None => {
                self.state = SessionState::MainMenu;
                main_screen_effects()
            }
        }
    }
}

fn main_screen_effects() -> Vec<Effect> {
    vec![
        Effect::Clear,
        Effect::Write(menu::main_screen()),
        Effect::Write(menu::CHOICE_PROMPT.into()),
    ]
}

fn user_screen_effects(role: Role) -> Vec<Effect> {
    vec![
        Effect::Clear,
        Effect::Write(menu::user_screen(role)),
        Effect::Write(menu::CHOICE_PROMPT.into()),
    ]
}

// =============================================================================
// Tests
// =============================================================================
