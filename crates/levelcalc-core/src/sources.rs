//! Material source estimates: what dungeon runs, exploration and the shop
//! yield between now and the deadline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::fixed::{self, Amount, Fixed64};
use crate::material::{Amounts, MaterialKey};
use crate::time::{self, Timestamp};

/// A repeatable activity with a per-run average drop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FarmPlan {
    pub daily_runs: Fixed64,
    pub average_drop: Fixed64,
}

impl FarmPlan {
    pub fn total(&self, days: u64) -> Amount {
        fixed::floor_product_times(self.daily_runs, self.average_drop, days)
    }
}

/// Daily shop purchases of one material, paid in rola.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopPlan {
    pub daily_buy: Fixed64,
    pub rola_unit_cost: Fixed64,
}

impl ShopPlan {
    pub fn total(&self, days: u64) -> Amount {
        fixed::floor_times(self.daily_buy, days)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialSources {
    pub dungeon: BTreeMap<MaterialKey, FarmPlan>,
    pub explore: BTreeMap<MaterialKey, FarmPlan>,
    pub shop: BTreeMap<MaterialKey, ShopPlan>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceEstimate {
    pub days: u64,
    pub dungeon: Amounts,
    pub explore: Amounts,
    pub shop: Amounts,
    pub shop_rola_daily: Amount,
    pub shop_rola_total: Amount,
}

impl MaterialSources {
    /// Fill a farm source from per-material averages, keeping any run counts
    /// already set.
    pub fn apply_averages(
        plans: &mut BTreeMap<MaterialKey, FarmPlan>,
        averages: &BTreeMap<MaterialKey, Fixed64>,
    ) {
        for (material, avg) in averages {
            plans.entry(material.clone()).or_default().average_drop = *avg;
        }
    }

    /// `Σ daily_buy * rola_unit_cost`, floored once.
    pub fn shop_rola_daily(&self) -> Amount {
        let bits: u128 = self
            .shop
            .values()
            .filter(|plan| plan.daily_buy > Fixed64::ZERO && plan.rola_unit_cost > Fixed64::ZERO)
            .map(|plan| plan.daily_buy.to_bits() as u128 * plan.rola_unit_cost.to_bits() as u128)
            .fold(0u128, u128::saturating_add);
        (bits >> (2 * Fixed64::FRAC_NBITS)).min(Amount::MAX as u128) as Amount
    }

    pub fn estimate(&self, days: u64) -> SourceEstimate {
        let farm = |plans: &BTreeMap<MaterialKey, FarmPlan>| -> Amounts {
            plans.iter().map(|(k, plan)| (k.clone(), plan.total(days))).collect()
        };
        let shop_rola_daily = self.shop_rola_daily();
        SourceEstimate {
            days,
            dungeon: farm(&self.dungeon),
            explore: farm(&self.explore),
            shop: self
                .shop
                .iter()
                .map(|(k, plan)| (k.clone(), plan.total(days)))
                .collect(),
            shop_rola_daily,
            shop_rola_total: shop_rola_daily.saturating_mul(days),
        }
    }

    /// [`MaterialSources::estimate`] over the whole days left until
    /// `deadline`.
    pub fn estimate_until(&self, now: Timestamp, deadline: Option<Timestamp>) -> SourceEstimate {
        self.estimate(time::days_remaining(now, deadline))
    }
}
