//! Command tables for the three terminal widgets.

use crate::content::{level_bar, Profile};
use crate::theme::Section;

pub(crate) enum Action {
    /// Prints the table's own command list.
    Help,
    Render(fn(&Profile) -> Vec<String>),
    /// Prints, then scrolls to the section after a short delay.
    Navigate(&'static [&'static str], Section),
    Clear,
    /// Prints, then closes the terminal after a short delay.
    Close(&'static [&'static str]),
}

pub(crate) struct Command {
    pub(crate) name: &'static str,
    pub(crate) summary: &'static str,
    pub(crate) action: Action,
}

pub(crate) struct CommandTable {
    pub(crate) title: &'static str,
    pub(crate) greeting: fn(&Profile) -> Vec<String>,
    /// Shown as suggestions while the input line is empty.
    pub(crate) defaults: &'static [&'static str],
    pub(crate) commands: &'static [Command],
    pub(crate) not_found_hint: &'static str,
}

impl CommandTable {
    /// Case-insensitive exact lookup on the trimmed input.
    pub(crate) fn lookup(&self, input: &str) -> Option<&Command> {
        let wanted = input.trim().to_lowercase();
        self.commands.iter().find(|c| c.name == wanted)
    }

    pub(crate) fn help_lines(&self) -> Vec<String> {
        let mut out = vec!["Available commands:".to_string()];
        for c in self.commands {
            out.push(format!("  {:<12}- {}", c.name, c.summary));
        }
        out.push(String::new());
        out
    }

    pub(crate) fn suggest(&self, input: &str) -> Vec<&'static str> {
        let needle = input.trim().to_lowercase();
        if needle.is_empty() {
            return self.defaults.to_vec();
        }
        self.commands
            .iter()
            .map(|c| c.name)
            .filter(|name| name.contains(needle.as_str()))
            .take(4)
            .collect()
    }
}

/* -----------------------------
   Hero terminal
------------------------------ */

fn hero_greeting(p: &Profile) -> Vec<String> {
    vec![
        format!("Welcome to {}'s Interactive Portfolio Terminal v2.0", p.name),
        "Type 'help' to see available commands".to_string(),
        "Use 'about', 'skills', 'projects', 'contact' to navigate".to_string(),
        String::new(),
    ]
}

pub(crate) static HERO: CommandTable = CommandTable {
    title: "portfolio-terminal",
    greeting: hero_greeting,
    defaults: &["help", "about", "skills", "projects"],
    not_found_hint: "Type 'help' for available commands",
    commands: &[
        Command {
            name: "help",
            summary: "List commands",
            action: Action::Help,
        },
        Command {
            name: "about",
            summary: "Learn about me",
            action: Action::Navigate(&["Loading about section...", "Navigating to /about", ""], Section::About),
        },
        Command {
            name: "skills",
            summary: "View technical skills",
            action: Action::Navigate(&["Loading skills terminal...", "Navigating to /skills", ""], Section::Skills),
        },
        Command {
            name: "projects",
            summary: "Browse portfolio projects",
            action: Action::Navigate(
                &["Loading project showcase...", "Navigating to /projects", ""],
                Section::Projects,
            ),
        },
        Command {
            name: "experience",
            summary: "View work experience",
            action: Action::Navigate(
                &["Loading work experience...", "Navigating to /experience", ""],
                Section::Experience,
            ),
        },
        Command {
            name: "education",
            summary: "View educational background",
            action: Action::Navigate(&["Loading education details...", "Navigating to /about", ""], Section::About),
        },
        Command {
            name: "contact",
            summary: "Get contact information",
            action: Action::Navigate(&["Opening contact terminal...", "Navigating to /contact", ""], Section::Contact),
        },
        Command {
            name: "clear",
            summary: "Clear terminal",
            action: Action::Clear,
        },
        Command {
            name: "exit",
            summary: "Close terminal",
            action: Action::Close(&["Closing terminal...", "Goodbye!"]),
        },
    ],
};

/* -----------------------------
   Skills explorer
------------------------------ */

fn skills_greeting(_: &Profile) -> Vec<String> {
    vec![
        "Skills Terminal Initialized".to_string(),
        "Type 'help' to see available commands".to_string(),
        "Type 'skills' to view all skills".to_string(),
        "Type 'categories' to see skill categories".to_string(),
        String::new(),
    ]
}

fn all_skills(p: &Profile) -> Vec<String> {
    let mut out = vec!["All Skills Overview:".to_string(), String::new()];
    for cat in p.categories() {
        out.push(format!("{}:", cat.to_uppercase()));
        for s in p.skills_in(cat) {
            out.push(format!("  {}: {} {}%", s.name, level_bar(s.level), s.level));
        }
        out.push(String::new());
    }
    out
}

fn categories(p: &Profile) -> Vec<String> {
    let mut out = vec!["Skill Categories:".to_string(), String::new()];
    for (i, cat) in p.categories().into_iter().enumerate() {
        out.push(format!("{}. {} ({} skills)", i + 1, cat, p.skills_in(cat).count()));
    }
    out.push(String::new());
    out
}

fn category_lines(p: &Profile, category: &str) -> Vec<String> {
    let mut out = Vec::new();
    if p.skills_in(category).next().is_none() {
        out.push(format!("No {category} skills listed."));
        out.push(String::new());
        return out;
    }
    out.push(format!("{category} Skills:"));
    out.push(String::new());
    for s in p.skills_in(category) {
        out.push(s.name.clone());
        out.push(format!("   Level: {} {}%", level_bar(s.level), s.level));
        out.push(format!("   {}", s.description));
        out.push(String::new());
    }
    out
}

fn frontend(p: &Profile) -> Vec<String> {
    category_lines(p, "Frontend")
}
fn backend(p: &Profile) -> Vec<String> {
    category_lines(p, "Backend")
}
fn database(p: &Profile) -> Vec<String> {
    category_lines(p, "Database")
}
fn tools(p: &Profile) -> Vec<String> {
    category_lines(p, "Tools & Platforms")
}
fn programming(p: &Profile) -> Vec<String> {
    category_lines(p, "Programming Languages")
}

pub(crate) static SKILLS: CommandTable = CommandTable {
    title: "skills-explorer",
    greeting: skills_greeting,
    defaults: &["help", "skills", "categories", "frontend"],
    not_found_hint: "Type 'help' for available commands",
    commands: &[
        Command {
            name: "help",
            summary: "List commands",
            action: Action::Help,
        },
        Command {
            name: "skills",
            summary: "Show all skills",
            action: Action::Render(all_skills),
        },
        Command {
            name: "categories",
            summary: "List skill categories",
            action: Action::Render(categories),
        },
        Command {
            name: "frontend",
            summary: "Show frontend skills",
            action: Action::Render(frontend),
        },
        Command {
            name: "backend",
            summary: "Show backend skills",
            action: Action::Render(backend),
        },
        Command {
            name: "database",
            summary: "Show database skills",
            action: Action::Render(database),
        },
        Command {
            name: "tools",
            summary: "Show tools & platforms",
            action: Action::Render(tools),
        },
        Command {
            name: "programming",
            summary: "Show programming languages",
            action: Action::Render(programming),
        },
        Command {
            name: "clear",
            summary: "Clear terminal",
            action: Action::Clear,
        },
    ],
};

/* -----------------------------
   Contact terminal
------------------------------ */

fn contact_greeting(_: &Profile) -> Vec<String> {
    vec![
        "$ ./connect".to_string(),
        "Establishing connection...".to_string(),
        "Type 'help' for available commands".to_string(),
        String::new(),
    ]
}

fn listed(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("not listed")
}

fn contact_methods(p: &Profile) -> Vec<String> {
    let c = &p.contact;
    let mut out = vec![
        "Opening contact interface...".to_string(),
        "Contact methods available:".to_string(),
    ];
    let methods = [
        ("email", &c.email),
        ("phone", &c.phone),
        ("linkedin", &c.linkedin),
        ("github", &c.github),
        ("location", &c.location),
    ];
    for (name, value) in methods {
        if value.is_some() {
            out.push(format!("  {name}"));
        }
    }
    out
}

fn email(p: &Profile) -> Vec<String> {
    vec![
        format!("Email: {}", listed(&p.contact.email)),
        "Status: Available".to_string(),
    ]
}

fn phone(p: &Profile) -> Vec<String> {
    vec![
        format!("Phone: {}", listed(&p.contact.phone)),
        "Status: Available".to_string(),
    ]
}

fn linkedin(p: &Profile) -> Vec<String> {
    vec![format!("LinkedIn: {}", listed(&p.contact.linkedin))]
}

fn github(p: &Profile) -> Vec<String> {
    vec![format!("GitHub: {}", listed(&p.contact.github))]
}

fn location(p: &Profile) -> Vec<String> {
    vec![
        format!("Location: {}", listed(&p.contact.location)),
        format!("Timezone: {}", listed(&p.contact.timezone)),
    ]
}

pub(crate) static CONTACT: CommandTable = CommandTable {
    title: "contact-terminal",
    greeting: contact_greeting,
    defaults: &["help", "contact", "email", "github"],
    not_found_hint: "Type \"help\" for available commands",
    commands: &[
        Command {
            name: "help",
            summary: "List commands",
            action: Action::Help,
        },
        Command {
            name: "contact",
            summary: "Show contact options",
            action: Action::Render(contact_methods),
        },
        Command {
            name: "email",
            summary: "Get email address",
            action: Action::Render(email),
        },
        Command {
            name: "phone",
            summary: "Get phone number",
            action: Action::Render(phone),
        },
        Command {
            name: "linkedin",
            summary: "Show LinkedIn profile",
            action: Action::Render(linkedin),
        },
        Command {
            name: "github",
            summary: "Show GitHub profile",
            action: Action::Render(github),
        },
        Command {
            name: "location",
            summary: "Show location",
            action: Action::Render(location),
        },
        Command {
            name: "clear",
            summary: "Clear terminal",
            action: Action::Clear,
        },
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn lookup_ignores_case_and_padding() {
        assert_eq!(HERO.lookup("  HeLp ").map(|c| c.name), Some("help"));
        assert!(HERO.lookup("hel").is_none());
        assert!(SKILLS.lookup("email").is_none());
        assert_eq!(CONTACT.lookup("EMAIL").map(|c| c.name), Some("email"));
    }

    #[test]
    fn suggestions_match_substrings() {
        assert_eq!(HERO.suggest(""), vec!["help", "about", "skills", "projects"]);
        assert_eq!(HERO.suggest("ex"), vec!["experience", "exit"]);
        assert_eq!(HERO.suggest("E").len(), 4);
        assert!(HERO.suggest("zzz").is_empty());
    }

    #[test]
    fn help_lists_every_command() {
        let lines = SKILLS.help_lines();
        assert_eq!(lines.len(), SKILLS.commands.len() + 2);
        assert!(lines[1].contains("help"));
        assert!(lines.iter().any(|l| l.contains("programming")));
    }

    #[test]
    fn category_listing_counts_skills() {
        let p = Profile::default();
        let lines = categories(&p);
        assert!(lines.contains(&"4. Database (3 skills)".to_string()));
    }

    #[test]
    fn missing_contact_fields_are_not_listed() {
        let mut p = Profile::default();
        p.contact.phone = None;
        assert_eq!(phone(&p)[0], "Phone: not listed");
        assert!(!contact_methods(&p).iter().any(|l| l.trim() == "phone"));
    }
}
