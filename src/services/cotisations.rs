use crate::models::enums::ActivityCategory;

/// Annual micro-entreprise revenue ceilings, in cents.
pub const SERVICES_CEILING_CENTS: i64 = 77_700_00;
pub const VENTE_CEILING_CENTS: i64 = 188_700_00;

/// URSSAF cotisation rate for an activity category.
pub fn rate(category: ActivityCategory) -> f64 {
    match category {
        ActivityCategory::Vente => 0.123,
        ActivityCategory::Service => 0.212,
        ActivityCategory::Liberale => 0.246,
    }
}

/// Social contributions owed on a revenue line, rounded to the cent.
pub fn cotisation_cents(amount_cents: i64, category: ActivityCategory) -> i64 {
    (amount_cents as f64 * rate(category)).round() as i64
}

pub fn net_cents(amount_cents: i64, category: ActivityCategory) -> i64 {
    amount_cents - cotisation_cents(amount_cents, category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vente_rate_applies() {
        // 1 000,00 € of goods sales owes 123,00 €
        assert_eq!(cotisation_cents(100_000, ActivityCategory::Vente), 12_300);
    }

    #[test]
    fn service_net_is_amount_minus_cotisation() {
        let amount = 250_050;
        let net = net_cents(amount, ActivityCategory::Service);
        assert_eq!(net + cotisation_cents(amount, ActivityCategory::Service), amount);
    }

    #[test]
    fn liberale_has_the_highest_rate() {
        assert!(rate(ActivityCategory::Liberale) > rate(ActivityCategory::Service));
        assert!(rate(ActivityCategory::Service) > rate(ActivityCategory::Vente));
    }

    #[test]
    fn rounding_is_to_the_nearest_cent() {
        // 10,01 € * 21,2 % = 212,212 -> 212
        assert_eq!(cotisation_cents(1_001, ActivityCategory::Service), 212);
    }
}
