use crate::models::enums::PlanId;

/// One subscription tier as sold on the pricing page.
#[derive(Debug, Clone)]
pub struct Plan {
    pub id: PlanId,
    pub name: &'static str,
    pub monthly_price_cents: i64,
    /// Stripe price id, absent for the free tier.
    pub stripe_price_id: Option<String>,
}

/// Immutable plan table, built once at startup from the environment and
/// passed around inside `AppState`.
#[derive(Debug, Clone)]
pub struct PlanCatalog {
    plans: Vec<Plan>,
}

impl PlanCatalog {
    pub fn new(stripe_price_pro: Option<String>, stripe_price_premium: Option<String>) -> Self {
        Self {
            plans: vec![
                Plan {
                    id: PlanId::Free,
                    name: "Gratuit",
                    monthly_price_cents: 0,
                    stripe_price_id: None,
                },
                Plan {
                    id: PlanId::Pro,
                    name: "Pro",
                    monthly_price_cents: 9_90,
                    stripe_price_id: stripe_price_pro,
                },
                Plan {
                    id: PlanId::Premium,
                    name: "Premium",
                    monthly_price_cents: 19_90,
                    stripe_price_id: stripe_price_premium,
                },
            ],
        }
    }

    pub fn get(&self, id: PlanId) -> &Plan {
        self.plans
            .iter()
            .find(|p| p.id == id)
            .expect("catalog always holds all three tiers")
    }

    /// True when a subscriber on `held` has access to features gated on `required`.
    pub fn allows(&self, held: PlanId, required: PlanId) -> bool {
        held >= required
    }

    /// Plan a finished trial promotes to, falling back to Pro when the
    /// profile never recorded which tier was being trialed.
    pub fn promotion_target(&self, trial_plan: Option<&str>) -> PlanId {
        trial_plan.and_then(PlanId::parse).unwrap_or(PlanId::Pro)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> PlanCatalog {
        PlanCatalog::new(Some("price_pro".into()), Some("price_premium".into()))
    }

    #[test]
    fn hierarchy_is_premium_over_pro_over_free() {
        let c = catalog();
        assert!(c.allows(PlanId::Premium, PlanId::Pro));
        assert!(c.allows(PlanId::Pro, PlanId::Pro));
        assert!(!c.allows(PlanId::Free, PlanId::Pro));
    }

    #[test]
    fn promotion_defaults_to_pro_without_a_recorded_trial_plan() {
        let c = catalog();
        assert_eq!(c.promotion_target(None), PlanId::Pro);
        assert_eq!(c.promotion_target(Some("premium")), PlanId::Premium);
        assert_eq!(c.promotion_target(Some("garbage")), PlanId::Pro);
    }

    #[test]
    fn free_tier_has_no_stripe_price() {
        assert!(catalog().get(PlanId::Free).stripe_price_id.is_none());
    }
}
