//! The weight algebra — C1.
//!
//! Pure, synchronous integer arithmetic over a single listener rule's
//! target-group weights. No I/O and no async here; `ListenerState` is the
//! seam that talks to the load balancer.

use indexmap::IndexMap;

/// One listener rule's forward-action weights, in insertion order.
///
/// Insertion order matters: `shed`'s remainder distribution hands the
/// leftover percentage point to the *last* recipient in iteration order, so
/// an `IndexMap` is required here — a `HashMap` would make shed
/// non-deterministic across runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleWeights {
    pub rule_id: String,
    pub listener_id: String,
    pub is_default: bool,
    targets: IndexMap<String, u32>,
}

impl RuleWeights {
    pub fn new(rule_id: impl Into<String>, listener_id: impl Into<String>, is_default: bool) -> Self {
        Self {
            rule_id: rule_id.into(),
            listener_id: listener_id.into(),
            is_default,
            targets: IndexMap::new(),
        }
    }

    pub fn add_target(&mut self, target_group_id: impl Into<String>, weight: u32) {
        self.targets.insert(target_group_id.into(), weight);
    }

    pub fn weight_of(&self, target_group_id: &str) -> Option<u32> {
        self.targets.get(target_group_id).copied()
    }

    /// Target groups in insertion order, as the LB "modify" calls expect them.
    pub fn target_groups(&self) -> impl Iterator<Item = (&str, u32)> {
        self.targets.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn sum(&self) -> u32 {
        self.targets.values().sum()
    }

    /// True iff additional shedding from `source` is still allowed. The rule
    /// becomes non-sheddable *at* the cap, not beyond it — preserve the
    /// strict `<` exactly.
    pub fn is_sheddable(&self, source: &str, max_shed_pct: u32) -> bool {
        match self.targets.get(source) {
            Some(&w) => (100 - w) < max_shed_pct,
            None => false,
        }
    }

    /// True iff some other target currently holds weight > 0 — i.e. there
    /// is something to take back for `source`.
    pub fn is_restorable(&self, source: &str) -> bool {
        self.targets.iter().any(|(k, &w)| k != source && w > 0)
    }

    /// Shed up to `requested_pct` from `source`, capped so cumulative shed
    /// never exceeds `max_shed_pct`, redistributing the taken amount to the
    /// other targets in insertion order (remainder to the last recipient).
    ///
    /// No-op if `source` is unknown, if the rule is already at the shed cap,
    /// or if there is nobody to redistribute to.
    pub fn shed(&mut self, source: &str, requested_pct: u32, max_shed_pct: u32) {
        if self.targets.len() < 2 {
            return;
        }
        let Some(&w_src) = self.targets.get(source) else { return };

        let w_src = w_src as i64;
        let max_shed_pct = max_shed_pct as i64;
        let requested_pct = requested_pct as i64;

        let already_shed = 100 - w_src;
        if already_shed == max_shed_pct {
            return;
        }

        let mut new_w_src = w_src - requested_pct;
        if max_shed_pct < (100 - new_w_src) {
            // Desired shed amount exceeds the cap (or would drive the
            // source negative, which always exceeds any cap <= 100):
            // clamp to the cap.
            new_w_src = 100 - max_shed_pct;
        }
        new_w_src = new_w_src.clamp(0, 100);

        let delta = w_src - new_w_src;
        if delta <= 0 {
            return;
        }

        *self.targets.get_mut(source).expect("source checked above") = new_w_src as u32;

        let recipients: Vec<String> = self
            .targets
            .keys()
            .filter(|k| k.as_str() != source)
            .cloned()
            .collect();
        let k = recipients.len() as i64;
        let q = delta / k;
        let r = delta % k;
        let last = recipients.len() - 1;

        for (i, key) in recipients.iter().enumerate() {
            let add = if i == last { q + r } else { q };
            if let Some(v) = self.targets.get_mut(key) {
                *v += add as u32;
            }
        }
    }

    /// Restore up to `requested_pct` to `source`, reclaiming it from the
    /// other targets in insertion order. Gives back less than requested if
    /// recipients are already depleted — `source` ends up with at most
    /// `prior + requested_pct`, never above 100.
    pub fn restore(&mut self, source: &str, requested_pct: u32) {
        if !self.targets.contains_key(source) {
            return;
        }

        let mut remaining = requested_pct;
        let donors: Vec<String> = self
            .targets
            .keys()
            .filter(|k| k.as_str() != source)
            .cloned()
            .collect();

        for key in &donors {
            if remaining == 0 {
                break;
            }
            let current = *self.targets.get(key).expect("donor key");
            let taken = current.min(remaining);
            *self.targets.get_mut(key).expect("donor key") = current - taken;
            remaining -= taken;
        }

        let taken_total = requested_pct - remaining;
        if let Some(v) = self.targets.get_mut(source) {
            *v += taken_total;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(pairs: &[(&str, u32)]) -> RuleWeights {
        let mut r = RuleWeights::new("rule-1", "listener-1", false);
        for (id, w) in pairs {
            r.add_target(*id, *w);
        }
        r
    }

    #[test]
    fn shed_two_targets_scenario_a() {
        let mut r = rule(&[("primary", 100), ("secondary", 0)]);
        r.shed("primary", 20, 100);
        assert_eq!(r.weight_of("primary"), Some(80));
        assert_eq!(r.weight_of("secondary"), Some(20));
        assert_eq!(r.sum(), 100);
    }

    #[test]
    fn shed_capped_at_boundary_scenario_b() {
        let mut r = rule(&[("primary", 90), ("secondary", 10)]);
        r.shed("primary", 20, 10);
        assert_eq!(r.weight_of("primary"), Some(90));
        assert_eq!(r.weight_of("secondary"), Some(10));

        let mut r2 = rule(&[("primary", 100), ("secondary", 0)]);
        r2.shed("primary", 20, 10);
        assert_eq!(r2.weight_of("primary"), Some(90));
        assert_eq!(r2.weight_of("secondary"), Some(10));
        assert!(!r2.is_sheddable("primary", 10));
    }

    #[test]
    fn shed_three_targets_with_remainder_scenario_c() {
        let mut r = rule(&[("primary", 100), ("secondary", 0), ("tertiary", 0)]);
        r.shed("primary", 9, 100);
        assert_eq!(r.weight_of("primary"), Some(91));
        assert_eq!(r.weight_of("secondary"), Some(4));
        assert_eq!(r.weight_of("tertiary"), Some(5));
        assert_eq!(r.sum(), 100);
    }

    #[test]
    fn shed_three_targets_cumulative_matches_reference() {
        let mut r = rule(&[("primary", 100), ("secondary", 0), ("tertiary", 0)]);
        r.shed("primary", 10, 100);
        assert_eq!((r.weight_of("primary"), r.weight_of("secondary"), r.weight_of("tertiary")), (Some(90), Some(5), Some(5)));
        r.shed("primary", 9, 100);
        assert_eq!((r.weight_of("primary"), r.weight_of("secondary"), r.weight_of("tertiary")), (Some(81), Some(9), Some(10)));
        assert_eq!(r.sum(), 100);
    }

    #[test]
    fn restore_two_targets_scenario_d() {
        let mut r = rule(&[("primary", 90), ("secondary", 10)]);
        r.restore("primary", 10);
        assert_eq!(r.weight_of("primary"), Some(100));
        assert_eq!(r.weight_of("secondary"), Some(0));
        assert!(!r.is_restorable("primary"));
    }

    #[test]
    fn restore_gives_back_less_when_recipients_depleted() {
        let mut r = rule(&[("primary", 95), ("secondary", 5)]);
        r.restore("primary", 10);
        assert_eq!(r.weight_of("primary"), Some(100));
        assert_eq!(r.weight_of("secondary"), Some(0));
        assert_eq!(r.sum(), 100);
    }

    #[test]
    fn restore_never_increases_non_source_weights() {
        let mut r = rule(&[("primary", 50), ("secondary", 30), ("tertiary", 20)]);
        let before = (r.weight_of("secondary"), r.weight_of("tertiary"));
        r.restore("primary", 5);
        let after = (r.weight_of("secondary"), r.weight_of("tertiary"));
        assert!(after.0 <= before.0);
        assert!(after.1 <= before.1);
    }

    #[test]
    fn is_sheddable_no_op_when_not_sheddable() {
        let mut r = rule(&[("primary", 10), ("secondary", 90)]);
        assert!(!r.is_sheddable("primary", 90));
        let before = r.clone();
        r.shed("primary", 5, 90);
        assert_eq!(r, before);
    }

    #[test]
    fn is_restorable_no_op_when_not_restorable() {
        let mut r = rule(&[("primary", 100), ("secondary", 0)]);
        assert!(!r.is_restorable("primary"));
        let before = r.clone();
        r.restore("primary", 5);
        assert_eq!(r, before);
    }

    #[test]
    fn shed_unknown_source_is_noop() {
        let mut r = rule(&[("primary", 100), ("secondary", 0)]);
        let before = r.clone();
        r.shed("not-a-target", 10, 100);
        assert_eq!(r, before);
    }

    #[test]
    fn shed_clamps_when_requested_exceeds_source_weight() {
        let mut r = rule(&[("primary", 10), ("secondary", 90)]);
        r.shed("primary", 50, 100);
        assert_eq!(r.weight_of("primary"), Some(0));
        assert_eq!(r.sum(), 100);
    }

    #[test]
    fn weights_always_stay_in_0_to_100_and_sum_to_100() {
        let mut r = rule(&[("primary", 100), ("secondary", 0), ("tertiary", 0)]);
        for _ in 0..20 {
            r.shed("primary", 7, 60);
            assert_eq!(r.sum(), 100);
            for (_, w) in r.target_groups() {
                assert!(w <= 100);
            }
        }
        for _ in 0..20 {
            r.restore("primary", 7);
            assert_eq!(r.sum(), 100);
            for (_, w) in r.target_groups() {
                assert!(w <= 100);
            }
        }
    }
}
