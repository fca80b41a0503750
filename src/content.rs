//! Static portfolio content shown by the section views.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectStatus {
    Live,
    Refactoring,
    InProgress,
}

impl ProjectStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ProjectStatus::Live => "Live",
            ProjectStatus::Refactoring => "Refactoring",
            ProjectStatus::InProgress => "In Progress",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Project {
    pub name: &'static str,
    pub description: &'static str,
    pub tech: &'static [&'static str],
    pub status: ProjectStatus,
}

#[derive(Debug, Clone, Copy)]
pub struct Skill {
    pub name: &'static str,
    /// Proficiency percentage, 0..=100
    pub level: u8,
}

#[derive(Debug, Clone, Copy)]
pub struct SkillGroup {
    pub title: &'static str,
    pub skills: &'static [Skill],
}

#[derive(Debug, Clone, Copy)]
pub struct Stat {
    pub value: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct Contact {
    pub label: &'static str,
    pub value: &'static str,
}

pub const NAME: &str = "ENZO";
pub const ROLE: &str = "DEVELOPER";
pub const TITLE: &str = "Frontend Developer";
pub const AVAILABILITY: &str = "Available for work";
pub const TAGLINE: &str =
    "專注於遊戲平台前端開發，使用 React、TypeScript、Tailwind CSS 打造高效能、響應式的使用者介面。";
pub const FOOTER: &str = "© 2026 Enzo. Built with Rust + ratatui";

pub const STATS: &[Stat] = &[
    Stat { value: "3+", label: "Years Experience" },
    Stat { value: "50+", label: "Projects Done" },
    Stat { value: "∞", label: "Lines of Code" },
];

pub const PROJECTS: &[Project] = &[
    Project {
        name: "Gaming Chat System",
        description: "Real-time messaging with VIP features and WebSocket",
        tech: &["React", "TypeScript", "WebSocket", "Zustand"],
        status: ProjectStatus::Live,
    },
    Project {
        name: "Live Capture Module",
        description: "CDN-integrated image capture and processing system",
        tech: &["TypeScript", "Vite", "CDN API"],
        status: ProjectStatus::Live,
    },
    Project {
        name: "Game Records Interface",
        description: "Comprehensive game history visualization dashboard",
        tech: &["React", "SWR", "Tailwind CSS"],
        status: ProjectStatus::Refactoring,
    },
    Project {
        name: "UE5 Platformer",
        description: "3D platformer game with Super Mario-style mechanics",
        tech: &["Unreal Engine 5", "C++", "Blueprints"],
        status: ProjectStatus::InProgress,
    },
];

pub const SKILL_GROUPS: &[SkillGroup] = &[
    SkillGroup {
        title: "FRONTEND",
        skills: &[
            Skill { name: "React", level: 95 },
            Skill { name: "TypeScript", level: 90 },
            Skill { name: "Tailwind CSS", level: 92 },
            Skill { name: "Zustand / SWR", level: 85 },
        ],
    },
    SkillGroup {
        title: "TOOLS & OTHER",
        skills: &[
            Skill { name: "Vite / Build Tools", level: 88 },
            Skill { name: "Git", level: 85 },
            Skill { name: "WebSocket", level: 82 },
            Skill { name: "Unreal Engine 5", level: 70 },
        ],
    },
];

pub const CONTACTS: &[Contact] = &[
    Contact { label: "Email", value: "enzo@example.dev" },
    Contact { label: "GitHub", value: "github.com/enzo" },
    Contact { label: "LinkedIn", value: "linkedin.com/in/enzo" },
];

/// Placeholders for the contact form. The form is display-only.
pub const CONTACT_FORM_FIELDS: &[&str] = &["Your Name", "Your Email", "Your Message"];

/// Render a skill level as a fixed-width bar, e.g. `█████░░░░░`.
pub fn level_bar(level: u8, width: usize) -> String {
    let level = level.min(100) as usize;
    let filled = (level * width + 50) / 100;
    let mut bar = "█".repeat(filled);
    bar.push_str(&"░".repeat(width - filled));
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_bar_width_is_constant() {
        for level in [0u8, 1, 49, 50, 99, 100, 200] {
            assert_eq!(level_bar(level, 20).chars().count(), 20);
        }
    }

    #[test]
    fn test_level_bar_fill() {
        assert_eq!(level_bar(0, 10), "░░░░░░░░░░");
        assert_eq!(level_bar(100, 10), "██████████");
        assert_eq!(level_bar(95, 10), "██████████");
        assert_eq!(level_bar(70, 10), "███████░░░");
    }

    #[test]
    fn test_skill_levels_in_range() {
        for group in SKILL_GROUPS {
            for skill in group.skills {
                assert!(skill.level <= 100, "{} out of range", skill.name);
            }
        }
    }
}
