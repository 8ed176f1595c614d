//! Text rendering of tours for chat replies

use crate::catalog::Tour;
use std::fmt::Write;

const DEFAULT_DESCRIPTION: &str =
    "Full tour package with accommodation, transfers and guided tours.";
const SHORT_DEFAULT_DESCRIPTION: &str =
    "Complete tour package with accommodation and transfers.";
const DEFAULT_FEATURES: &[&str] = &[
    "Accommodation",
    "Airport transfers",
    "Tour guide",
    "Selected meals",
];

/// Characters of description kept on a short card
pub const SHORT_DESCRIPTION_CHARS: usize = 200;

/// Features listed on a short card before collapsing the rest
pub const SHORT_FEATURE_COUNT: usize = 3;

/// Price without a trailing `.0` for whole amounts
pub fn format_price(price: f64) -> String {
    if price.fract() == 0.0 {
        format!("{:.0}", price)
    } else {
        format!("{:.2}", price)
    }
}

/// Full markdown card with the booking hint
pub fn format_tour(tour: &Tour) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "🌟 **{}**", tour.name().unwrap_or("Tour Package"));
    let _ = writeln!(
        out,
        "📍 **Destination:** {}",
        tour.locations_label()
            .unwrap_or_else(|| "Multiple locations".to_string())
    );
    let _ = writeln!(
        out,
        "🏢 **Operator:** {}",
        tour.organization_name().unwrap_or("Tour Company")
    );
    out.push('\n');
    let _ = writeln!(
        out,
        "💰 **Price:** ${} USD",
        format_price(tour.price().unwrap_or(0.0))
    );
    let _ = writeln!(
        out,
        "⏱️ **Duration:** {} days / {} nights",
        tour.days().unwrap_or(0),
        tour.nights().unwrap_or(0)
    );
    let _ = writeln!(
        out,
        "📅 **Dates:** {} - {}",
        tour.from_date().unwrap_or(""),
        tour.to_date().unwrap_or("")
    );
    let _ = writeln!(out, "🆔 **Tour ID:** {}", tour.slug().unwrap_or("N/A"));
    out.push('\n');
    out.push_str("📝 **Description:**\n");
    out.push_str(tour.description().unwrap_or(DEFAULT_DESCRIPTION));
    out.push_str("\n\n✨ **Included Features:**");

    let features = tour.features();
    if features.is_empty() {
        for feature in DEFAULT_FEATURES {
            let _ = write!(out, "\n• {}", feature);
        }
    } else {
        for feature in &features {
            let _ = write!(out, "\n• {}", feature);
        }
    }

    let _ = write!(
        out,
        "\n\n**📞 For more details and booking, use the tour slug: {}**",
        tour.slug().unwrap_or("contact-agent")
    );
    out
}

/// Compact Telegram card (`*bold*` markdown)
pub fn format_tour_short(tour: &Tour) -> String {
    let description = tour.description().unwrap_or(SHORT_DEFAULT_DESCRIPTION);
    let description = truncate_chars(description, SHORT_DESCRIPTION_CHARS);

    let mut out = String::new();
    let _ = writeln!(out, "🌟 *{}*", tour.name().unwrap_or("Tour Package"));
    out.push('\n');
    let _ = writeln!(
        out,
        "📍 *Destination:* {}",
        tour.locations_label()
            .unwrap_or_else(|| "Multiple Destinations".to_string())
    );
    let _ = writeln!(
        out,
        "🏢 *Operator:* {}",
        tour.organization_name().unwrap_or("Tour Company")
    );
    out.push('\n');
    let _ = writeln!(
        out,
        "💰 *Price:* ${} USD",
        format_price(tour.price().unwrap_or(0.0))
    );
    let _ = writeln!(
        out,
        "⏱️ *Duration:* {} days / {} nights",
        tour.days().unwrap_or(0),
        tour.nights().unwrap_or(0)
    );
    let _ = writeln!(
        out,
        "📅 *Dates:* {} - {}",
        tour.from_date().unwrap_or(""),
        tour.to_date().unwrap_or("")
    );
    out.push('\n');
    out.push_str("📝 *About:*\n");
    out.push_str(&description);
    out.push('\n');

    let features = tour.features();
    if !features.is_empty() {
        out.push_str("\n✨ *Included:*\n");
        for feature in features.iter().take(SHORT_FEATURE_COUNT) {
            let _ = writeln!(out, "• {}", feature);
        }
        if features.len() > SHORT_FEATURE_COUNT {
            let _ = writeln!(
                out,
                "• ...and {} more services",
                features.len() - SHORT_FEATURE_COUNT
            );
        }
    }

    out
}

/// Cut `text` to `max` characters, appending `...` when shortened
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_tour_full_card() {
        let tour = Tour::from_json(json!({
            "name": "Dubai Shopping",
            "slug": "dubai-shopping",
            "price": 450,
            "days": 5,
            "nights": 4,
            "from_date": "01.09.2025",
            "to_date": "06.09.2025",
            "organization_name": "Sayohat LLC",
            "locations": [{"name": "Dubay"}],
            "features": [{"name": "Hotel"}, {"name": "Transfer"}]
        }));

        let text = format_tour(&tour);
        assert!(text.starts_with("🌟 **Dubai Shopping**\n"));
        assert!(text.contains("📍 **Destination:** Dubay"));
        assert!(text.contains("💰 **Price:** $450 USD"));
        assert!(text.contains("⏱️ **Duration:** 5 days / 4 nights"));
        assert!(text.contains("• Hotel\n• Transfer"));
        assert!(text.ends_with("use the tour slug: dubai-shopping**"));
    }

    #[test]
    fn test_format_tour_defaults() {
        let text = format_tour(&Tour::from_json(json!({})));
        assert!(text.contains("🌟 **Tour Package**"));
        assert!(text.contains(DEFAULT_DESCRIPTION));
        assert!(text.contains("• Accommodation\n• Airport transfers\n• Tour guide\n• Selected meals"));
        assert!(text.contains("💰 **Price:** $0 USD"));
        assert!(text.ends_with("use the tour slug: contact-agent**"));
    }

    #[test]
    fn test_short_card_truncates_by_characters() {
        let long = "Ж".repeat(250);
        let tour = Tour::from_json(json!({"name": "Long", "description": long}));
        let text = format_tour_short(&tour);
        let expected = format!("{}...", "Ж".repeat(200));
        assert!(text.contains(&expected));
        assert!(!text.contains(&"Ж".repeat(201)));
    }

    #[test]
    fn test_short_card_collapses_features() {
        let tour = Tour::from_json(json!({
            "name": "Antalya",
            "features": ["Hotel", "Transfer", "Guide", "Breakfast", "Insurance"]
        }));
        let text = format_tour_short(&tour);
        assert!(text.contains("• Hotel\n• Transfer\n• Guide\n"));
        assert!(!text.contains("Breakfast"));
        assert!(text.contains("• ...and 2 more services"));
    }

    #[test]
    fn test_short_card_without_features() {
        let text = format_tour_short(&Tour::from_json(json!({"name": "Bare"})));
        assert!(!text.contains("Included"));
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(450.0), "450");
        assert_eq!(format_price(450.5), "450.50");
    }
}
