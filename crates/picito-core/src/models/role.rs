//! Role domain model.
//!
//! Two independent role axes exist: the platform-wide [`GlobalRole`]
//! held by every user, and the organization-scoped [`OrgRole`] carried
//! by a membership. Both are closed enums so an unknown role can never
//! be constructed; parsing an unknown string yields an error instead.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PicitoError;

/// Organization-scoped role. Ordered by authority: `Member < Admin < Owner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrgRole {
    Member,
    Admin,
    Owner,
}

impl OrgRole {
    pub const ALL: [OrgRole; 3] = [OrgRole::Owner, OrgRole::Admin, OrgRole::Member];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrgRole::Owner => "owner",
            OrgRole::Admin => "admin",
            OrgRole::Member => "member",
        }
    }
}

impl fmt::Display for OrgRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrgRole {
    type Err = PicitoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(OrgRole::Owner),
            "admin" => Ok(OrgRole::Admin),
            "member" => Ok(OrgRole::Member),
            other => Err(PicitoError::validation(format!(
                "unknown organization role: {other}"
            ))),
        }
    }
}

/// Platform-wide role, independent of any organization membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlobalRole {
    Admin,
    User,
}

impl GlobalRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            GlobalRole::Admin => "admin",
            GlobalRole::User => "user",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, GlobalRole::Admin)
    }
}

impl fmt::Display for GlobalRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GlobalRole {
    type Err = PicitoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(GlobalRole::Admin),
            "user" => Ok(GlobalRole::User),
            other => Err(PicitoError::validation(format!(
                "unknown global role: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn org_role_hierarchy() {
        assert!(OrgRole::Owner > OrgRole::Admin);
        assert!(OrgRole::Admin > OrgRole::Member);
    }

    #[test]
    fn org_role_parses_lowercase_only() {
        assert_eq!("owner".parse::<OrgRole>().unwrap(), OrgRole::Owner);
        assert!("Owner".parse::<OrgRole>().is_err());
        assert!("superuser".parse::<OrgRole>().is_err());
    }

    #[test]
    fn roles_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&OrgRole::Admin).unwrap(), "\"admin\"");
        assert_eq!(serde_json::to_string(&GlobalRole::User).unwrap(), "\"user\"");
        let parsed: GlobalRole = serde_json::from_str("\"admin\"").unwrap();
        assert!(parsed.is_admin());
    }
}
