//! Action categories and the strategy bitmask that gates them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Concentrated LP rebalancing.
pub const STRATEGY_LP: u8 = 1 << 0;
/// Lending yield switching.
pub const STRATEGY_YIELD: u8 = 1 << 1;
/// Leveraged position protection.
pub const STRATEGY_LIQUIDATION: u8 = 1 << 2;
pub const STRATEGY_ALL: u8 = STRATEGY_LP | STRATEGY_YIELD | STRATEGY_LIQUIDATION;

/// Category of a scoped action. The discriminant is the strategy bit index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionCategory {
    LpRebalance = 0,
    YieldSwitch = 1,
    LiquidationProtect = 2,
}

impl ActionCategory {
    pub const ALL: [ActionCategory; 3] = [
        ActionCategory::LpRebalance,
        ActionCategory::YieldSwitch,
        ActionCategory::LiquidationProtect,
    ];

    /// Bit index inside a [`StrategyMask`].
    pub fn index(&self) -> u8 {
        *self as u8
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.index() == index)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionCategory::LpRebalance => "lp_rebalance",
            ActionCategory::YieldSwitch => "yield_switch",
            ActionCategory::LiquidationProtect => "liquidation_protect",
        }
    }
}

impl fmt::Display for ActionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s.trim())
            .ok_or_else(|| {
                ValidationError::invalid_format("action", format!("unknown category '{}'", s))
            })
    }
}

/// Bitset of permitted action categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrategyMask(u8);

impl StrategyMask {
    pub fn new(bits: u8) -> Self {
        Self(bits)
    }

    pub fn all() -> Self {
        Self(STRATEGY_ALL)
    }

    pub fn bits(&self) -> u8 {
        self.0
    }

    /// True when the category's bit is set.
    pub fn permits(&self, category: ActionCategory) -> bool {
        self.0 & (1u8 << category.index()) != 0
    }

    pub fn with(self, category: ActionCategory) -> Self {
        Self(self.0 | (1u8 << category.index()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_map_to_their_bits() {
        assert_eq!(ActionCategory::LpRebalance.index(), 0);
        assert_eq!(ActionCategory::YieldSwitch.index(), 1);
        assert_eq!(ActionCategory::LiquidationProtect.index(), 2);
        assert_eq!(ActionCategory::from_index(2), Some(ActionCategory::LiquidationProtect));
        assert_eq!(ActionCategory::from_index(7), None);
    }

    #[test]
    fn mask_permits_only_set_bits() {
        let mask = StrategyMask::new(STRATEGY_LP | STRATEGY_LIQUIDATION);
        assert!(mask.permits(ActionCategory::LpRebalance));
        assert!(!mask.permits(ActionCategory::YieldSwitch));
        assert!(mask.permits(ActionCategory::LiquidationProtect));
    }

    #[test]
    fn all_mask_permits_every_category() {
        for category in ActionCategory::ALL {
            assert!(StrategyMask::all().permits(category));
        }
    }

    #[test]
    fn with_sets_additional_bit() {
        let mask = StrategyMask::new(0).with(ActionCategory::YieldSwitch);
        assert_eq!(mask.bits(), STRATEGY_YIELD);
    }

    #[test]
    fn parses_wire_names() {
        assert_eq!(
            "lp_rebalance".parse::<ActionCategory>().unwrap(),
            ActionCategory::LpRebalance
        );
        assert!("moon".parse::<ActionCategory>().is_err());
    }

    #[test]
    fn serde_uses_snake_case_names() {
        let json = serde_json::to_string(&ActionCategory::LiquidationProtect).unwrap();
        assert_eq!(json, r#""liquidation_protect""#);
    }
}
