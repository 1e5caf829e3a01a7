//! Menu rendering for the simulated session.
//!
//! Stateless string builders for the box-drawn screens. Which entries a
//! role sees is a fixed policy table, not computed.

use super::auth::Role;

const BOLD_MAGENTA: &str = "\x1b[1;35m";
const BOLD_YELLOW: &str = "\x1b[1;33m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// Prompt printed after every menu.
pub const CHOICE_PROMPT: &str = "\x1b[35mChoice: \x1b[0m";

const HEADER_WIDTH: usize = 40;

fn header(title: &str) -> String {
    let border = "═".repeat(HEADER_WIDTH);
    let pad = HEADER_WIDTH.saturating_sub(title.len());
    let left = " ".repeat(pad / 2);
    let right = " ".repeat(pad - pad / 2);
    format!("{BOLD_MAGENTA}╔{border}╗\n║{left}{title}{right}║\n╚{border}╝{RESET}\n")
}

fn button(label: &str, color: &str) -> String {
    let border = "─".repeat(label.len() + 2);
    format!(
        "{color}  ╔{border}╗{RESET}\n\
         {color}  ║ {label} ║{RESET}\n\
         {color}  ╚{border}╝{RESET}\n\
         {DIM}   ╚{border}╝{RESET}\n"
    )
}

fn buttons(labels: &[&str]) -> String {
    let mut block = String::new();
    for (i, label) in labels.iter().enumerate() {
        let color = if i % 2 == 0 { BOLD_YELLOW } else { BOLD_MAGENTA };
        block.push_str(&button(label, color));
        block.push('\n');
    }
    block
}

/// The main screen: banner plus the login/exit choices.
pub fn main_screen() -> String {
    format!(
        "\n{}\n{}",
        header("Library Management System"),
        buttons(&["1. Login", "2. Exit"])
    )
}

/// The role-specific user menu screen.
pub fn user_screen(role: Role) -> String {
    let entries: [&str; 4] = match role {
        Role::Student | Role::Faculty => {
            ["1. View Books", "2. Search Books", "3. Borrow Book", "8. Logout"]
        }
        Role::Librarian => ["1. Add Book", "2. Remove Book", "3. Add User", "8. Logout"],
    };
    format!("\n{}\n{}", header("User Menu"), buttons(&entries))
}
