use std::fmt;

/// External platform a user can connect for revenue import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Stripe,
    Shopify,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Stripe => "stripe",
            Provider::Shopify => "shopify",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "stripe" => Some(Provider::Stripe),
            "shopify" => Some(Provider::Shopify),
            _ => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Activity category of a revenue line, in URSSAF terms.
///
/// Stored as text; `prestation` is a legacy label still present on old rows
/// and is treated as `service` for rates and ceiling buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityCategory {
    Vente,
    Service,
    Liberale,
}

impl ActivityCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityCategory::Vente => "vente",
            ActivityCategory::Service => "service",
            ActivityCategory::Liberale => "liberale",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "vente" => Some(ActivityCategory::Vente),
            "service" | "prestation" => Some(ActivityCategory::Service),
            "liberale" => Some(ActivityCategory::Liberale),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PlanId {
    Free,
    Pro,
    Premium,
}

impl PlanId {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanId::Free => "free",
            PlanId::Pro => "pro",
            PlanId::Premium => "premium",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "free" => Some(PlanId::Free),
            "pro" => Some(PlanId::Pro),
            "premium" => Some(PlanId::Premium),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanStatus {
    None,
    Trialing,
    Active,
    Canceled,
    PastDue,
    Unpaid,
}

impl PlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::None => "none",
            PlanStatus::Trialing => "trialing",
            PlanStatus::Active => "active",
            PlanStatus::Canceled => "canceled",
            PlanStatus::PastDue => "past_due",
            PlanStatus::Unpaid => "unpaid",
        }
    }
}
