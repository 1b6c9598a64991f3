//! Builds the `{{variable}}` mapping a follow-up template is rendered with.

use std::collections::HashMap;

use leadflow_domain::entities::{Agent, Client};

use crate::settings::DispatcherSettings;

pub const BUDGET_NOT_SPECIFIED: &str = "Not specified";

pub fn build_variables(
    client: &Client,
    agent: &Agent,
    settings: &DispatcherSettings,
) -> HashMap<String, String> {
    let property_type = client
        .client_type
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(&settings.default_property_label);

    HashMap::from([
        ("client_name".to_string(), client.full_name.clone()),
        ("agent_name".to_string(), agent.full_name.clone()),
        (
            "agent_phone".to_string(),
            agent.phone.clone().unwrap_or_default(),
        ),
        (
            "agent_email".to_string(),
            agent.email.clone().unwrap_or_default(),
        ),
        ("property_type".to_string(), property_type.to_string()),
        (
            "preferred_locations".to_string(),
            client.preferred_locations.join(", "),
        ),
        (
            "budget_range".to_string(),
            format_budget_range(client.budget_min, client.budget_max, &settings.currency_symbol),
        ),
    ])
}

/// A range needs both bounds; a single bound reads as not specified.
pub fn format_budget_range(min: Option<f64>, max: Option<f64>, currency_symbol: &str) -> String {
    match (min, max) {
        (Some(min), Some(max)) if min.is_finite() && max.is_finite() => format!(
            "{currency_symbol}{} - {currency_symbol}{}",
            format_amount(min),
            format_amount(max)
        ),
        _ => BUDGET_NOT_SPECIFIED.to_string(),
    }
}

/// Whole units with `,` thousands separators.
pub fn format_amount(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn client() -> Client {
        Client {
            id: Uuid::new_v4(),
            full_name: "Asha".to_string(),
            email: None,
            agent_id: None,
            client_type: Some("buyer".to_string()),
            preferred_locations: vec!["Indiranagar".to_string(), "HSR Layout".to_string()],
            budget_min: Some(5_000_000.0),
            budget_max: Some(7_500_000.0),
        }
    }

    fn agent() -> Agent {
        Agent {
            id: Uuid::new_v4(),
            full_name: "Vikram".to_string(),
            phone: Some("+91 98450 00000".to_string()),
            email: None,
        }
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "0");
        assert_eq!(format_amount(999.0), "999");
        assert_eq!(format_amount(1000.0), "1,000");
        assert_eq!(format_amount(7_500_000.0), "7,500,000");
        assert_eq!(format_amount(1234.56), "1,235");
        assert_eq!(format_amount(-25_000.0), "-25,000");
    }

    #[test]
    fn test_budget_range_needs_both_bounds() {
        assert_eq!(
            format_budget_range(Some(50_000.0), Some(75_000.0), "₹"),
            "₹50,000 - ₹75,000"
        );
        assert_eq!(format_budget_range(Some(50_000.0), None, "₹"), "Not specified");
        assert_eq!(format_budget_range(None, Some(75_000.0), "$"), "Not specified");
        assert_eq!(format_budget_range(None, None, "₹"), "Not specified");
        assert_eq!(
            format_budget_range(Some(f64::NAN), Some(1.0), "₹"),
            "Not specified"
        );
    }

    #[test]
    fn test_build_variables() {
        let vars = build_variables(&client(), &agent(), &DispatcherSettings::default());
        assert_eq!(vars.len(), 7);
        assert_eq!(vars["client_name"], "Asha");
        assert_eq!(vars["agent_name"], "Vikram");
        assert_eq!(vars["agent_phone"], "+91 98450 00000");
        assert_eq!(vars["agent_email"], "");
        assert_eq!(vars["property_type"], "buyer");
        assert_eq!(vars["preferred_locations"], "Indiranagar, HSR Layout");
        assert_eq!(vars["budget_range"], "₹5,000,000 - ₹7,500,000");
    }

    #[test]
    fn test_build_variables_fallbacks() {
        let mut c = client();
        c.client_type = None;
        c.preferred_locations.clear();
        c.budget_max = None;

        let settings = DispatcherSettings {
            default_property_label: "home".to_string(),
            ..DispatcherSettings::default()
        };
        let vars = build_variables(&c, &agent(), &settings);
        assert_eq!(vars["property_type"], "home");
        assert_eq!(vars["preferred_locations"], "");
        assert_eq!(vars["budget_range"], "Not specified");

        c.client_type = Some("  ".to_string());
        let vars = build_variables(&c, &agent(), &settings);
        assert_eq!(vars["property_type"], "home");
    }
}
