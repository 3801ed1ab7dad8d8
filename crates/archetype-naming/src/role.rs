// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use archetype_core::NamingConfig;
use std::fmt;

/// Display role derived from a starter ratio.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RoleClass {
    #[cfg_attr(feature = "serde", serde(rename = "SP"))]
    Starter,
    #[cfg_attr(feature = "serde", serde(rename = "RP"))]
    Reliever,
    #[cfg_attr(feature = "serde", serde(rename = "SW"))]
    Swingman,
}

impl RoleClass {
    pub fn from_ratio(ratio: f64, config: &NamingConfig) -> Self {
        if ratio > config.starter_above {
            Self::Starter
        } else if ratio < config.reliever_below {
            Self::Reliever
        } else {
            Self::Swingman
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Starter => "SP",
            Self::Reliever => "RP",
            Self::Swingman => "SW",
        }
    }
}

impl fmt::Display for RoleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::RoleClass;
    use archetype_core::NamingConfig;

    #[test]
    fn cutoffs_are_exclusive() {
        let cfg = NamingConfig::default();
        assert_eq!(RoleClass::from_ratio(0.9, &cfg), RoleClass::Starter);
        assert_eq!(RoleClass::from_ratio(0.55, &cfg), RoleClass::Swingman);
        assert_eq!(RoleClass::from_ratio(0.35, &cfg), RoleClass::Swingman);
        assert_eq!(RoleClass::from_ratio(0.0, &cfg), RoleClass::Reliever);
    }
}
