use crate::validation::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! numeric_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wraps a raw identifier.
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the raw identifier.
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<u64>()
                    .map(Self)
                    .map_err(|_| ValidationError::PatternMismatch {
                        field: stringify!($name),
                        value: s.to_string(),
                    })
            }
        }
    };
}

numeric_id!(
    QrmarkId,
    "Identity of one printed, scannable qrmark instance (the ticket's `sub`)."
);
numeric_id!(
    UserId,
    "Identity of a redeeming user, supplied by the authenticated session."
);
numeric_id!(
    GroupId,
    "Company or group that sponsored a qrmark (the ticket's `num`)."
);
numeric_id!(SchoolId, "Identity of a school that users belong to.");
