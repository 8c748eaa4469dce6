//! Closed enumerations whose ids are seeded by the migrations.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn id(self) -> i32 {
        match self {
            Gender::Male => 0,
            Gender::Female => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.id() == id)
    }

    /// Parse a submitted value: either the numeric id or the label.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        match raw.parse::<i32>() {
            Ok(id) => Self::from_id(id),
            Err(_) => Self::ALL
                .into_iter()
                .find(|g| g.label().eq_ignore_ascii_case(raw)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CivilStatus {
    Single,
    Married,
    Widowed,
    Separated,
    Annulled,
}

impl CivilStatus {
    pub const ALL: [CivilStatus; 5] = [
        CivilStatus::Single,
        CivilStatus::Married,
        CivilStatus::Widowed,
        CivilStatus::Separated,
        CivilStatus::Annulled,
    ];

    pub fn id(self) -> i32 {
        match self {
            CivilStatus::Single => 0,
            CivilStatus::Married => 1,
            CivilStatus::Widowed => 2,
            CivilStatus::Separated => 3,
            CivilStatus::Annulled => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CivilStatus::Single => "Single",
            CivilStatus::Married => "Married",
            CivilStatus::Widowed => "Widowed",
            CivilStatus::Separated => "Separated",
            CivilStatus::Annulled => "Annulled",
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.id() == id)
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        match raw.parse::<i32>() {
            Ok(id) => Self::from_id(id),
            Err(_) => Self::ALL
                .into_iter()
                .find(|s| s.label().eq_ignore_ascii_case(raw)),
        }
    }
}
