use serde::{Deserialize, Serialize};
use std::fmt;

/// Account role. Serialized as `"COACH"` / `"ATHLETE"` on the wire and in the database.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Coach,
    Athlete,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Coach => "COACH",
            UserRole::Athlete => "ATHLETE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "COACH" => Some(UserRole::Coach),
            "ATHLETE" => Some(UserRole::Athlete),
            _ => None,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_uses_uppercase_names() {
        assert_eq!(serde_json::to_string(&UserRole::Coach).unwrap(), "\"COACH\"");
        assert_eq!(
            serde_json::from_str::<UserRole>("\"ATHLETE\"").unwrap(),
            UserRole::Athlete
        );
        assert!(serde_json::from_str::<UserRole>("\"coach\"").is_err());
    }

    #[test]
    fn parse_matches_as_str() {
        for role in [UserRole::Coach, UserRole::Athlete] {
            assert_eq!(UserRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(UserRole::parse("ADMIN"), None);
    }
}
