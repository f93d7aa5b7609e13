//! `ListenerState` — C2. Aggregates every forwarding rule of one listener:
//! loads them from the load balancer, exposes rule-level aggregate queries,
//! and persists mutations back.

use futures::future::try_join_all;
use tracing::{error, warn};

use crate::adapters::LoadBalancerApi;
use crate::model::RuleWeights;

/// All forward-action rules of one listener, read at the start of an
/// invocation and discarded at its end — there is no long-lived state here.
pub struct ListenerState {
    rules: Vec<RuleWeights>,
}

impl ListenerState {
    /// Loads every rule of `listener_arn` from `lb`. A rule whose first
    /// action is not a forward action (redirect, fixed-response) is skipped
    /// with a warning; it carries no target-group weights this controller
    /// could shed or restore.
    ///
    /// If the describe call itself fails, this returns an empty
    /// `ListenerState` rather than propagating the error — every subsequent
    /// operation becomes a no-op and the controller's decision degrades to
    /// `Action::None`. Inability to read state produces inaction, never
    /// corruption.
    pub async fn load(lb: &dyn LoadBalancerApi, listener_arn: &str) -> Self {
        let described = match lb.describe_rules(listener_arn).await {
            Ok(rules) => rules,
            Err(err) => {
                error!(listener_arn, error = %err, "describe_rules failed; treating listener as having zero rules");
                return Self { rules: Vec::new() };
            }
        };

        let mut rules = Vec::with_capacity(described.len());
        for rule in described {
            let Some(first_action) = rule.actions.first() else {
                warn!(rule_arn = %rule.rule_arn, "rule has no actions; skipping");
                continue;
            };
            if first_action.action_type != "forward" {
                warn!(rule_arn = %rule.rule_arn, action_type = %first_action.action_type, "rule's first action is not forward; skipping");
                continue;
            }

            let mut weights = RuleWeights::new(rule.rule_arn.clone(), listener_arn.to_string(), rule.is_default);
            for (target_group_arn, weight) in &first_action.forward_targets {
                weights.add_target(target_group_arn.clone(), *weight);
            }
            rules.push(weights);
        }

        Self { rules }
    }

    pub fn rules(&self) -> &[RuleWeights] {
        &self.rules
    }

    pub fn any_sheddable(&self, source: &str, max_shed_pct: u32) -> bool {
        self.rules.iter().any(|r| r.is_sheddable(source, max_shed_pct))
    }

    pub fn any_restorable(&self, source: &str) -> bool {
        self.rules.iter().any(|r| r.is_restorable(source))
    }

    pub fn shed_all(&mut self, source: &str, requested_pct: u32, max_shed_pct: u32) {
        for rule in &mut self.rules {
            rule.shed(source, requested_pct, max_shed_pct);
        }
    }

    pub fn restore_all(&mut self, source: &str, requested_pct: u32) {
        for rule in &mut self.rules {
            rule.restore(source, requested_pct);
        }
    }

    /// Persists every rule's current weights back to the load balancer.
    /// Non-default rules go through `modify_rule`; the listener's default
    /// rule (at most one) goes through `modify_listener_default`. All writes
    /// run concurrently but this call does not return until every one of
    /// them has completed, so a caller can rely on "persisted" meaning
    /// "durable" before it re-enqueues the next tick.
    pub async fn persist(&self, lb: &dyn LoadBalancerApi, listener_arn: &str) -> anyhow::Result<()> {
        let writes = self.rules.iter().map(|rule| {
            let target_groups: Vec<(String, u32)> =
                rule.target_groups().map(|(id, w)| (id.to_string(), w)).collect();
            async move {
                if rule.is_default {
                    lb.modify_listener_default(listener_arn, &target_groups).await
                } else {
                    lb.modify_rule(&rule.rule_id, &target_groups).await
                }
            }
        });

        try_join_all(writes).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryLoadBalancer;
    use crate::adapters::{DescribedAction, DescribedRule};

    fn forward_rule(rule_arn: &str, is_default: bool, targets: &[(&str, u32)]) -> DescribedRule {
        DescribedRule {
            rule_arn: rule_arn.to_string(),
            is_default,
            actions: vec![DescribedAction {
                action_type: "forward".to_string(),
                forward_targets: targets.iter().map(|(id, w)| (id.to_string(), *w)).collect(),
            }],
        }
    }

    fn redirect_rule(rule_arn: &str) -> DescribedRule {
        DescribedRule {
            rule_arn: rule_arn.to_string(),
            is_default: false,
            actions: vec![DescribedAction { action_type: "redirect".to_string(), forward_targets: vec![] }],
        }
    }

    #[tokio::test]
    async fn load_skips_non_forward_rules() {
        let lb = InMemoryLoadBalancer::new();
        lb.seed(
            "listener/1",
            vec![forward_rule("rule/1", false, &[("tg-a", 100), ("tg-b", 0)]), redirect_rule("rule/2")],
        );

        let state = ListenerState::load(&lb, "listener/1").await;
        assert_eq!(state.rules().len(), 1);
        assert_eq!(state.rules()[0].rule_id, "rule/1");
    }

    #[tokio::test]
    async fn load_returns_empty_on_describe_failure() {
        struct Failing;
        #[async_trait::async_trait]
        impl LoadBalancerApi for Failing {
            async fn describe_rules(&self, _listener_arn: &str) -> anyhow::Result<Vec<crate::adapters::DescribedRule>> {
                Err(anyhow::anyhow!("access denied"))
            }
            async fn modify_rule(&self, _rule_arn: &str, _target_groups: &[(String, u32)]) -> anyhow::Result<()> {
                unreachable!("not exercised in this test")
            }
            async fn modify_listener_default(
                &self,
                _listener_arn: &str,
                _target_groups: &[(String, u32)],
            ) -> anyhow::Result<()> {
                unreachable!("not exercised in this test")
            }
        }

        let state = ListenerState::load(&Failing, "listener/1").await;
        assert!(state.rules().is_empty());
        assert!(!state.any_sheddable("tg-a", 100));
        assert!(!state.any_restorable("tg-a"));
    }

    #[tokio::test]
    async fn shed_all_and_persist_writes_every_rule() {
        let lb = InMemoryLoadBalancer::new();
        lb.seed(
            "listener/1",
            vec![
                forward_rule("rule/1", false, &[("tg-a", 100), ("tg-b", 0)]),
                forward_rule("rule/2", true, &[("tg-a", 100), ("tg-b", 0)]),
            ],
        );

        let mut state = ListenerState::load(&lb, "listener/1").await;
        state.shed_all("tg-a", 20, 100);
        state.persist(&lb, "listener/1").await.unwrap();

        let modifications = lb.modifications();
        assert_eq!(modifications.len(), 2);
        assert!(modifications.iter().any(|m| m.is_default_action));
        assert!(modifications.iter().any(|m| !m.is_default_action && m.target_arn == "rule/1"));
        for m in &modifications {
            assert_eq!(m.target_groups, vec![("tg-a".to_string(), 80), ("tg-b".to_string(), 20)]);
        }
    }

    #[tokio::test]
    async fn aggregate_predicates_reflect_any_rule() {
        let lb = InMemoryLoadBalancer::new();
        lb.seed(
            "listener/1",
            vec![
                forward_rule("rule/1", false, &[("tg-a", 10), ("tg-b", 90)]),
                forward_rule("rule/2", false, &[("tg-a", 100), ("tg-b", 0)]),
            ],
        );

        let state = ListenerState::load(&lb, "listener/1").await;
        assert!(state.any_sheddable("tg-a", 100));
        assert!(!state.any_sheddable("tg-a", 90));
        assert!(state.any_restorable("tg-a"));
    }
}
