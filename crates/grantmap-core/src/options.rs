use crate::error::EnumConversionError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Axis and sense along which the hierarchical layout orders nodes by
/// dependency depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RankDirection {
    /// Top to bottom: ranks grow downward.
    #[default]
    #[serde(rename = "TB")]
    TopBottom,
    /// Left to right: ranks grow rightward.
    #[serde(rename = "LR")]
    LeftRight,
    /// Bottom to top: ranks grow upward.
    #[serde(rename = "BT")]
    BottomTop,
    /// Right to left: ranks grow leftward.
    #[serde(rename = "RL")]
    RightLeft,
}

impl RankDirection {
    /// True when ranks advance along the x axis (LR / RL).
    pub fn is_horizontal(self) -> bool {
        matches!(self, RankDirection::LeftRight | RankDirection::RightLeft)
    }

    /// Sign of rank progression along its axis: -1 for BT and RL.
    pub fn rank_sign(self) -> f32 {
        match self {
            RankDirection::TopBottom | RankDirection::LeftRight => 1.0,
            RankDirection::BottomTop | RankDirection::RightLeft => -1.0,
        }
    }
}

impl FromStr for RankDirection {
    type Err = EnumConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TB" => Ok(RankDirection::TopBottom),
            "LR" => Ok(RankDirection::LeftRight),
            "BT" => Ok(RankDirection::BottomTop),
            "RL" => Ok(RankDirection::RightLeft),
            _ => Err(EnumConversionError::InvalidRankDirection(s.to_string())),
        }
    }
}

/// Node placement strategy for a layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutStrategy {
    #[default]
    Hierarchical,
    GridScatter,
}

impl FromStr for LayoutStrategy {
    type Err = EnumConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hierarchical" => Ok(LayoutStrategy::Hierarchical),
            "grid-scatter" => Ok(LayoutStrategy::GridScatter),
            _ => Err(EnumConversionError::InvalidLayoutStrategy(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_direction_parses_short_codes() {
        assert_eq!("TB".parse::<RankDirection>().unwrap(), RankDirection::TopBottom);
        assert_eq!("LR".parse::<RankDirection>().unwrap(), RankDirection::LeftRight);
        assert_eq!("BT".parse::<RankDirection>().unwrap(), RankDirection::BottomTop);
        assert_eq!("RL".parse::<RankDirection>().unwrap(), RankDirection::RightLeft);
        assert!("tb".parse::<RankDirection>().is_err());
    }

    #[test]
    fn rank_direction_axis_and_sign() {
        assert!(!RankDirection::TopBottom.is_horizontal());
        assert!(RankDirection::RightLeft.is_horizontal());
        assert_eq!(RankDirection::BottomTop.rank_sign(), -1.0);
        assert_eq!(RankDirection::LeftRight.rank_sign(), 1.0);
    }

    #[test]
    fn layout_strategy_parses_kebab_case() {
        assert_eq!(
            "grid-scatter".parse::<LayoutStrategy>().unwrap(),
            LayoutStrategy::GridScatter
        );
        assert!("force".parse::<LayoutStrategy>().is_err());
    }
}
