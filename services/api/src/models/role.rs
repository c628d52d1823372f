//! Role model and permission predicates
//!
//! Roles are numeric on the wire (0-3). Some token issuers serialize the role
//! claim as a JSON string instead of a number; the deserializer below is the
//! single place where that is normalized, so call sites never compare raw
//! integers or strings.

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Platform administrator
    Admin = 0,
    /// Company owner
    Owner = 1,
    /// Staff member of a company
    Staff = 2,
    /// Regular booking customer
    User = 3,
}

impl Role {
    /// Numeric wire representation
    pub fn as_i64(self) -> i64 {
        self as i64
    }

    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }

    pub fn is_owner(self) -> bool {
        self == Role::Owner
    }

    pub fn is_staff(self) -> bool {
        self == Role::Staff
    }

    pub fn is_user(self) -> bool {
        self == Role::User
    }

    /// Roles allowed to write `status`, `staff_id` and `staff_preferences`
    /// on appointments, and to run the assignment workflow.
    pub fn can_manage_appointments(self) -> bool {
        matches!(self, Role::Admin | Role::Owner)
    }
}

impl TryFrom<i64> for Role {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Role::Admin),
            1 => Ok(Role::Owner),
            2 => Ok(Role::Staff),
            3 => Ok(Role::User),
            other => Err(format!("Unknown role value: {}", other)),
        }
    }
}

impl Serialize for Role {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(self.as_i64())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(i64),
            Text(String),
        }

        let value = match Repr::deserialize(deserializer)? {
            Repr::Number(n) => n,
            Repr::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| de::Error::custom(format!("Role is not numeric: {:?}", s)))?,
        };

        Role::try_from(value).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserializes_from_number_and_numeric_string() {
        let from_number: Role = serde_json::from_str("1").unwrap();
        let from_string: Role = serde_json::from_str("\"1\"").unwrap();
        assert_eq!(from_number, Role::Owner);
        assert_eq!(from_string, Role::Owner);
        assert_eq!(from_number, from_string);
    }

    #[test]
    fn test_rejects_unknown_values() {
        assert!(serde_json::from_str::<Role>("9").is_err());
        assert!(serde_json::from_str::<Role>("\"admin\"").is_err());
        assert!(Role::try_from(-1).is_err());
    }

    #[test]
    fn test_serializes_as_number() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "3");
    }

    #[test]
    fn test_permission_predicates() {
        assert!(Role::Admin.is_admin());
        assert!(Role::Admin.can_manage_appointments());
        assert!(Role::Owner.can_manage_appointments());
        assert!(!Role::Staff.can_manage_appointments());
        assert!(!Role::User.can_manage_appointments());
        assert!(Role::User.is_user());
    }
}
