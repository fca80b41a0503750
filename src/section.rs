#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
    #[default]
    Home,
    Projects,
    Skills,
    Contact,
}

impl Section {
    pub fn all() -> [Section; 4] {
        [Section::Home, Section::Projects, Section::Skills, Section::Contact]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Section::Home => "HOME",
            Section::Projects => "PROJECTS",
            Section::Skills => "SKILLS",
            Section::Contact => "CONTACT",
        }
    }

    pub fn subtitle(&self) -> &'static str {
        match self {
            Section::Home => "",
            Section::Projects => "Featured works and experiments",
            Section::Skills => "Technologies I work with",
            Section::Contact => "Let's work together",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Section::Home => 0,
            Section::Projects => 1,
            Section::Skills => 2,
            Section::Contact => 3,
        }
    }

    /// Map a number key (`1`..=`4`) to a section.
    pub fn from_digit(digit: char) -> Option<Self> {
        let n = digit.to_digit(10)? as usize;
        n.checked_sub(1).and_then(|i| Self::all().get(i).copied())
    }

    pub fn next(&self) -> Self {
        Self::all()[(self.index() + 1) % 4]
    }

    pub fn prev(&self) -> Self {
        Self::all()[(self.index() + 3) % 4]
    }
}
