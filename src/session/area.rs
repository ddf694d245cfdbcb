use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two mutually exclusive UI panels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Area {
    Record,
    #[default]
    Player,
}

impl Area {
    pub fn other(self) -> Self {
        match self {
            Area::Record => Area::Player,
            Area::Player => Area::Record,
        }
    }

    /// Label of the toggle control while this area is mounted
    pub fn toggle_label(self) -> &'static str {
        match self {
            Area::Record => "Load Reproducer",
            Area::Player => "Load Record",
        }
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Area::Record => f.write_str("Record"),
            Area::Player => f.write_str("Player"),
        }
    }
}
