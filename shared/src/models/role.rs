//! User roles

use serde::{Deserialize, Serialize};

/// Role carried in the JWT and checked by the authorization middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Manager,
    Staff,
    Member,
}

impl UserRole {
    pub const fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::Manager => "MANAGER",
            UserRole::Staff => "STAFF",
            UserRole::Member => "MEMBER",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(UserRole::Admin),
            "MANAGER" => Ok(UserRole::Manager),
            "STAFF" => Ok(UserRole::Staff),
            "MEMBER" => Ok(UserRole::Member),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_roundtrip() {
        let json = serde_json::to_string(&UserRole::Manager).unwrap();
        assert_eq!(json, "\"MANAGER\"");
        let role: UserRole = serde_json::from_str("\"STAFF\"").unwrap();
        assert_eq!(role, UserRole::Staff);
    }

    #[test]
    fn from_str_rejects_unknown() {
        assert!("SUPERUSER".parse::<UserRole>().is_err());
        assert_eq!("ADMIN".parse::<UserRole>().unwrap(), UserRole::Admin);
    }
}
