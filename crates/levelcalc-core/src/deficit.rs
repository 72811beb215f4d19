//! Deficit resolution: what is still missing after owned stock and passive
//! production are counted.
//!
//! Both functions here are pure and recomputed from scratch on every input
//! change.

use crate::fixed;
use crate::material::{Amounts, Rates};
use crate::time::{self, Timestamp};

/// Shortfall per required material. Never negative.
pub type DeficitReport = Amounts;

/// `max(0, required - owned - produced)` for every material in `required`.
/// Missing owned or produced entries count as zero.
pub fn resolve(required: &Amounts, owned: &Amounts, produced: &Amounts) -> DeficitReport {
    required
        .iter()
        .map(|(material, need)| {
            let have = owned.get(material).copied().unwrap_or(0);
            let gain = produced.get(material).copied().unwrap_or(0);
            (material.clone(), need.saturating_sub(have).saturating_sub(gain))
        })
        .collect()
}

/// `floor(rate * hours until deadline)` per material. A deadline in the past
/// (or none at all) produces nothing.
pub fn passive_production(rates: &Rates, now: Timestamp, deadline: Option<Timestamp>) -> Amounts {
    let millis = time::remaining_millis(now, deadline);
    rates
        .iter()
        .map(|(material, rate)| (material.clone(), fixed::produced_over(*rate, millis)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::f64_to_fixed64;
    use crate::material::MaterialKey;
    use crate::time::MILLIS_PER_HOUR;

    fn amounts(pairs: &[(&str, u64)]) -> Amounts {
        pairs.iter().map(|(k, v)| (MaterialKey::new(*k), *v)).collect()
    }

    #[test]
    fn surplus_clamps_at_zero() {
        let out = resolve(&amounts(&[("a", 5)]), &amounts(&[("a", 100)]), &Amounts::new());
        assert_eq!(out, amounts(&[("a", 0)]));
    }

    #[test]
    fn owned_and_produced_both_count() {
        let out = resolve(
            &amounts(&[("rola", 1_000), ("sand", 50)]),
            &amounts(&[("rola", 300)]),
            &amounts(&[("rola", 200), ("sand", 10)]),
        );
        assert_eq!(out, amounts(&[("rola", 500), ("sand", 40)]));
    }

    #[test]
    fn only_required_materials_are_reported() {
        let out = resolve(
            &amounts(&[("exp", 10)]),
            &amounts(&[("rola", 5)]),
            &amounts(&[("essence", 5)]),
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[&MaterialKey::new("exp")], 10);
    }

    #[test]
    fn production_runs_until_deadline() {
        let rates: Rates = [(MaterialKey::new("rola"), f64_to_fixed64(1_000.5))]
            .into_iter()
            .collect();
        let now = Timestamp(0);
        let out = passive_production(&rates, now, Some(Timestamp(2 * MILLIS_PER_HOUR)));
        assert_eq!(out[&MaterialKey::new("rola")], 2_001);
    }

    #[test]
    fn past_deadline_produces_nothing() {
        let rates: Rates = [(MaterialKey::new("rola"), f64_to_fixed64(50.0))]
            .into_iter()
            .collect();
        let now = Timestamp(10 * MILLIS_PER_HOUR);
        let out = passive_production(&rates, now, Some(Timestamp(0)));
        assert_eq!(out[&MaterialKey::new("rola")], 0);
        let out = passive_production(&rates, now, None);
        assert_eq!(out[&MaterialKey::new("rola")], 0);
    }
}
