use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct Skill {
    pub(crate) name: String,
    pub(crate) level: u8,
    pub(crate) category: String,
    pub(crate) description: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct Project {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) tech: Vec<String>,
    #[serde(default)]
    pub(crate) url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct Job {
    pub(crate) title: String,
    pub(crate) company: String,
    pub(crate) period: String,
    pub(crate) description: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct Education {
    pub(crate) degree: String,
    pub(crate) institution: String,
    pub(crate) period: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct ContactInfo {
    pub(crate) email: Option<String>,
    pub(crate) phone: Option<String>,
    pub(crate) linkedin: Option<String>,
    pub(crate) github: Option<String>,
    pub(crate) location: Option<String>,
    pub(crate) timezone: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct Profile {
    pub(crate) name: String,
    pub(crate) handle: String,
    pub(crate) tagline: String,
    #[serde(default)]
    pub(crate) about: Vec<String>,
    #[serde(default)]
    pub(crate) education: Vec<Education>,
    #[serde(default)]
    pub(crate) experience: Vec<Job>,
    #[serde(default)]
    pub(crate) skills: Vec<Skill>,
    #[serde(default)]
    pub(crate) projects: Vec<Project>,
    #[serde(default)]
    pub(crate) contact: ContactInfo,
}

impl Profile {
    pub(crate) fn load(path: &Path) -> Result<Profile> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading profile {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing profile {}", path.display()))
    }

    /// Categories in first-seen order.
    pub(crate) fn categories(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for s in &self.skills {
            if !out.contains(&s.category.as_str()) {
                out.push(&s.category);
            }
        }
        out
    }

    pub(crate) fn skills_in<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Skill> + 'a {
        self.skills.iter().filter(move |s| s.category == category)
    }
}

/// Ten-cell bar, one block per full 10 %.
pub(crate) fn level_bar(level: u8) -> String {
    let full = (level.min(100) / 10) as usize;
    format!("{}{}", "█".repeat(full), "░".repeat(10 - full))
}

fn skill(name: &str, level: u8, category: &str, description: &str) -> Skill {
    Skill {
        name: name.to_string(),
        level,
        category: category.to_string(),
        description: description.to_string(),
    }
}

fn project(name: &str, description: &str, tech: &[&str]) -> Project {
    Project {
        name: name.to_string(),
        description: description.to_string(),
        tech: tech.iter().map(|t| t.to_string()).collect(),
        url: None,
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: "Ada Example".to_string(),
            handle: "ada".to_string(),
            tagline: "Software Engineer | Full-Stack Developer".to_string(),
            about: vec![
                "Software engineer who likes fast feedback loops, small tools and \
                 interfaces that feel alive."
                    .to_string(),
                "Most days are spent between web frontends, backend services and \
                 the glue that keeps them honest."
                    .to_string(),
            ],
            education: vec![
                Education {
                    degree: "BSc Software Engineering".to_string(),
                    institution: "Example University".to_string(),
                    period: "2021 - 2025".to_string(),
                },
                Education {
                    degree: "Higher Secondary, Pre-Engineering".to_string(),
                    institution: "Example College of Science".to_string(),
                    period: "2019 - 2021".to_string(),
                },
            ],
            experience: vec![
                Job {
                    title: "SEO Specialist".to_string(),
                    company: "Rankworks".to_string(),
                    period: "2024 - present".to_string(),
                    description: "Technical audits, site performance work and \
                                  content tooling for client sites."
                        .to_string(),
                },
                Job {
                    title: "Web Designer Intern".to_string(),
                    company: "Levelup Studio".to_string(),
                    period: "2023".to_string(),
                    description: "Built client websites with a focus on responsive \
                                  layouts and modern UI."
                        .to_string(),
                },
            ],
            skills: vec![
                skill("JavaScript", 95, "Programming Languages", "ES6+, async/await and modern JS features"),
                skill("TypeScript", 90, "Programming Languages", "Strong typing, interfaces and advanced patterns"),
                skill("Python", 85, "Programming Languages", "Backend development, automation and data processing"),
                skill("Rust", 70, "Programming Languages", "CLIs, terminal toys and small services"),
                skill("React", 95, "Frontend", "Hooks, context and component architecture"),
                skill("Next.js", 90, "Frontend", "SSR, SSG, API routes and the App Router"),
                skill("CSS", 90, "Frontend", "Flexbox, grid, animations and responsive design"),
                skill("Node.js", 90, "Backend", "Server-side JavaScript and API development"),
                skill("FastAPI", 80, "Backend", "High-performance Python web services"),
                skill("PostgreSQL", 80, "Database", "Relational design and complex queries"),
                skill("MongoDB", 85, "Database", "Document modelling and aggregation pipelines"),
                skill("Redis", 70, "Database", "Caching, sessions and pub/sub"),
                skill("Git", 90, "Tools & Platforms", "Branching strategies and collaboration"),
                skill("Docker", 75, "Tools & Platforms", "Containers for dev and deploy"),
            ],
            projects: vec![
                project(
                    "MacroMate",
                    "Health and fitness web app with personalised nutrition tracking",
                    &["React", "Node.js", "MongoDB", "Express.js"],
                ),
                project(
                    "Studio Site",
                    "Portfolio website for a creative studio with heavy animation",
                    &["HTML5", "CSS3", "JavaScript", "GSAP"],
                ),
                project(
                    "Interior Landing",
                    "Landing page for an interior design company",
                    &["HTML5", "CSS3", "Bootstrap"],
                ),
                project(
                    "Agency Site",
                    "Corporate website for a software agency",
                    &["WordPress", "PHP", "MySQL", "SEO"],
                ),
            ],
            contact: ContactInfo {
                email: Some("ada@example.com".to_string()),
                phone: Some("+1 555 0100".to_string()),
                linkedin: Some("https://www.linkedin.com/in/ada-example".to_string()),
                github: Some("https://github.com/ada-example".to_string()),
                location: Some("Somewhere, Earth".to_string()),
                timezone: Some("UTC".to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn bars_are_ten_cells() {
        assert_eq!(level_bar(95), "█████████░");
        assert_eq!(level_bar(0), "░░░░░░░░░░");
        assert_eq!(level_bar(250), "██████████");
    }

    #[test]
    fn categories_keep_first_seen_order() {
        let p = Profile::default();
        assert_eq!(
            p.categories(),
            vec!["Programming Languages", "Frontend", "Backend", "Database", "Tools & Platforms"]
        );
        assert_eq!(p.skills_in("Database").count(), 3);
    }

    #[test]
    fn loads_minimal_profile_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("me.json");
        fs::write(&path, r#"{ "name": "Bo", "handle": "bo", "tagline": "hi" }"#).unwrap();
        let p = Profile::load(&path).unwrap();
        assert_eq!(p.name, "Bo");
        assert!(p.skills.is_empty());
        assert_eq!(p.contact, ContactInfo::default());
    }

    #[test]
    fn bad_profile_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("me.json");
        fs::write(&path, "[]").unwrap();
        let err = Profile::load(&path).unwrap_err();
        assert!(err.to_string().contains("parsing profile"));
    }
}
