//! Toy terminals: an input line, a command table and an append-only
//! scrollback.

pub(crate) mod commands;

use crate::bus::{Bus, Notice};
use crate::content::Profile;
use crate::theme::Section;
use commands::{Action, CommandTable};
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ShellKind {
    Hero,
    Skills,
    Contact,
}

impl ShellKind {
    pub(crate) fn table(self) -> &'static CommandTable {
        match self {
            ShellKind::Hero => &commands::HERO,
            ShellKind::Skills => &commands::SKILLS,
            ShellKind::Contact => &commands::CONTACT,
        }
    }

    fn index(self) -> usize {
        match self {
            ShellKind::Hero => 0,
            ShellKind::Skills => 1,
            ShellKind::Contact => 2,
        }
    }
}

/// What the host should do after a command ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Outcome {
    Stay,
    Navigate(Section),
    Close,
}

const INPUT_MAX: usize = 64;

pub(crate) struct Console {
    pub(crate) kind: ShellKind,
    pub(crate) input: String,
    pub(crate) scrollback: Vec<String>,
}

impl Console {
    pub(crate) fn new(kind: ShellKind, profile: &Profile) -> Self {
        Self {
            kind,
            input: String::new(),
            scrollback: (kind.table().greeting)(profile),
        }
    }

    pub(crate) fn insert(&mut self, ch: char) {
        if ch.is_control() || self.input.chars().count() >= INPUT_MAX {
            return;
        }
        self.input.push(ch);
    }

    pub(crate) fn backspace(&mut self) {
        self.input.pop();
    }

    pub(crate) fn suggestions(&self) -> Vec<&'static str> {
        self.kind.table().suggest(&self.input)
    }

    /// Tab: replace the input with the first suggestion.
    pub(crate) fn complete(&mut self) {
        if let Some(first) = self.suggestions().first() {
            self.input = first.to_string();
        }
    }

    pub(crate) fn submit(&mut self, profile: &Profile) -> Outcome {
        let raw = std::mem::take(&mut self.input);
        if raw.trim().is_empty() {
            return Outcome::Stay;
        }
        self.run(&raw, profile)
    }

    pub(crate) fn run(&mut self, raw: &str, profile: &Profile) -> Outcome {
        let table = self.kind.table();
        self.scrollback.push(format!("$ {raw}"));

        let Some(cmd) = table.lookup(raw) else {
            debug!(shell = ?self.kind, input = raw, "unknown command");
            self.scrollback.push(format!("Command not found: {}", raw.trim()));
            self.scrollback.push(table.not_found_hint.to_string());
            self.scrollback.push(String::new());
            return Outcome::Stay;
        };
        debug!(shell = ?self.kind, command = cmd.name, "dispatch");

        match &cmd.action {
            Action::Help => {
                self.scrollback.extend(table.help_lines());
                Outcome::Stay
            }
            Action::Render(f) => {
                self.scrollback.extend(f(profile));
                Outcome::Stay
            }
            Action::Navigate(lines, section) => {
                self.push_lines(lines);
                Outcome::Navigate(*section)
            }
            Action::Clear => {
                self.scrollback.clear();
                Outcome::Stay
            }
            Action::Close(lines) => {
                self.push_lines(lines);
                Outcome::Close
            }
        }
    }

    fn push_lines(&mut self, lines: &[&str]) {
        self.scrollback.extend(lines.iter().map(|l| l.to_string()));
    }
}

/// Owns one console per kind and announces open/close on the bus.
pub(crate) struct ShellHost {
    consoles: [Console; 3],
    active: Option<ShellKind>,
}

impl ShellHost {
    pub(crate) fn new(profile: &Profile) -> Self {
        Self {
            consoles: [
                Console::new(ShellKind::Hero, profile),
                Console::new(ShellKind::Skills, profile),
                Console::new(ShellKind::Contact, profile),
            ],
            active: None,
        }
    }

    pub(crate) fn active(&self) -> Option<ShellKind> {
        self.active
    }

    pub(crate) fn console(&self, kind: ShellKind) -> &Console {
        &self.consoles[kind.index()]
    }

    pub(crate) fn active_console_mut(&mut self) -> Option<&mut Console> {
        let kind = self.active?;
        Some(&mut self.consoles[kind.index()])
    }

    pub(crate) fn open(&mut self, kind: ShellKind, bus: &mut Bus) {
        if self.active.is_none() {
            bus.publish(Notice::TerminalOpened);
        }
        debug!(shell = ?kind, "terminal opened");
        self.active = Some(kind);
    }

    pub(crate) fn close(&mut self, bus: &mut Bus) {
        if let Some(kind) = self.active.take() {
            self.consoles[kind.index()].input.clear();
            bus.publish(Notice::TerminalClosed);
            debug!(shell = ?kind, "terminal closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn console(kind: ShellKind) -> (Console, Profile) {
        let p = Profile::default();
        (Console::new(kind, &p), p)
    }

    fn type_line(c: &mut Console, s: &str) {
        for ch in s.chars() {
            c.insert(ch);
        }
    }

    #[test]
    fn hero_greets_by_name() {
        let (c, p) = console(ShellKind::Hero);
        assert_eq!(c.scrollback[0], format!("Welcome to {}'s Interactive Portfolio Terminal v2.0", p.name));
    }

    #[test]
    fn unknown_command_reports_and_stays() {
        let (mut c, p) = console(ShellKind::Hero);
        let before = c.scrollback.len();
        assert_eq!(c.run("sudo rm", &p), Outcome::Stay);
        assert_eq!(
            c.scrollback[before..].to_vec(),
            vec![
                "$ sudo rm".to_string(),
                "Command not found: sudo rm".to_string(),
                "Type 'help' for available commands".to_string(),
                String::new(),
            ]
        );
    }

    #[test]
    fn navigation_commands_report_their_section() {
        let (mut c, p) = console(ShellKind::Hero);
        assert_eq!(c.run("SKILLS", &p), Outcome::Navigate(Section::Skills));
        assert_eq!(c.run("education", &p), Outcome::Navigate(Section::About));
        assert_eq!(c.run("exit", &p), Outcome::Close);
        assert!(c.scrollback.iter().any(|l| l == "Navigating to /skills"));
    }

    #[test]
    fn scrollback_only_grows_until_clear() {
        let (mut c, p) = console(ShellKind::Skills);
        let mut last = c.scrollback.len();
        for cmd in ["help", "skills", "bogus", "frontend"] {
            c.run(cmd, &p);
            assert!(c.scrollback.len() > last);
            last = c.scrollback.len();
        }
        c.run("clear", &p);
        assert!(c.scrollback.is_empty());
    }

    #[test]
    fn submit_ignores_blank_input() {
        let (mut c, p) = console(ShellKind::Contact);
        let before = c.scrollback.clone();
        type_line(&mut c, "   ");
        assert_eq!(c.submit(&p), Outcome::Stay);
        assert_eq!(c.scrollback, before);
        assert!(c.input.is_empty());
    }

    #[test]
    fn submit_runs_typed_command() {
        let (mut c, p) = console(ShellKind::Contact);
        type_line(&mut c, "email");
        c.submit(&p);
        assert!(c.scrollback.contains(&"Email: ada@example.com".to_string()));
        assert!(c.input.is_empty());
    }

    #[test]
    fn tab_completes_first_suggestion() {
        let (mut c, _) = console(ShellKind::Hero);
        type_line(&mut c, "proj");
        c.complete();
        assert_eq!(c.input, "projects");
    }

    #[test]
    fn input_line_is_bounded() {
        let (mut c, _) = console(ShellKind::Hero);
        type_line(&mut c, &"x".repeat(200));
        c.insert('\u{7}');
        assert_eq!(c.input.len(), INPUT_MAX);
        c.backspace();
        assert_eq!(c.input.len(), INPUT_MAX - 1);
    }

    #[test]
    fn host_announces_open_and_close_once() {
        let p = Profile::default();
        let mut bus = Bus::default();
        let rx = bus.subscribe();
        let mut host = ShellHost::new(&p);

        host.open(ShellKind::Hero, &mut bus);
        host.open(ShellKind::Contact, &mut bus);
        assert_eq!(host.active(), Some(ShellKind::Contact));
        host.close(&mut bus);
        host.close(&mut bus);

        let got: Vec<Notice> = rx.try_iter().collect();
        assert_eq!(got, vec![Notice::TerminalOpened, Notice::TerminalClosed]);
        assert_eq!(host.active(), None);
    }

    #[test]
    fn consoles_keep_their_own_history() {
        let p = Profile::default();
        let mut bus = Bus::default();
        let mut host = ShellHost::new(&p);
        host.open(ShellKind::Skills, &mut bus);
        if let Some(c) = host.active_console_mut() {
            c.run("categories", &p);
        }
        host.close(&mut bus);
        assert!(host.console(ShellKind::Skills).scrollback.iter().any(|l| l == "Skill Categories:"));
        assert!(!host.console(ShellKind::Hero).scrollback.iter().any(|l| l == "Skill Categories:"));
    }
}
