//! Staff roles

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::realtime::Channel;

/// Role carried in the signed credential
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Waiter,
    Cashier,
    Kitchen,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Waiter => "waiter",
            Self::Cashier => "cashier",
            Self::Kitchen => "kitchen",
        }
    }

    /// Real-time channels a connection with this role joins
    pub fn channels(&self) -> &'static [Channel] {
        match self {
            Self::Admin => &[Channel::Tenant, Channel::Kitchen, Channel::Admin],
            Self::Kitchen => &[Channel::Tenant, Channel::Kitchen],
            Self::Waiter | Self::Cashier => &[Channel::Tenant],
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "waiter" => Ok(Self::Waiter),
            "cashier" => Ok(Self::Cashier),
            "kitchen" => Ok(Self::Kitchen),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_channels() {
        assert_eq!(Role::Waiter.channels(), &[Channel::Tenant]);
        assert!(Role::Kitchen.channels().contains(&Channel::Kitchen));
        assert!(!Role::Kitchen.channels().contains(&Channel::Admin));
        assert_eq!(Role::Admin.channels().len(), 3);
    }

    #[test]
    fn test_role_round_trip_str() {
        for role in [Role::Admin, Role::Waiter, Role::Cashier, Role::Kitchen] {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
        assert!("chef".parse::<Role>().is_err());
    }
}
