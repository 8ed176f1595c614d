//! Curated destination knowledge
//!
//! Popular destinations, which places suit which interests and seasons, and the
//! price bands behind the budget categories customers pick.

use serde::Serialize;

/// A featured destination country
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopularDestination {
    pub country: &'static str,
    pub cities: &'static [&'static str],
    pub highlights: &'static [&'static str],
    pub best_for: &'static [&'static str],
    pub season: &'static str,
}

pub const POPULAR_DESTINATIONS: &[PopularDestination] = &[
    PopularDestination {
        country: "Turkiya",
        cities: &["Istanbul", "Antaliya", "Kappadokiya", "Bodrum"],
        highlights: &["Rich history", "Beautiful beaches", "Affordable luxury", "Amazing cuisine"],
        best_for: &["Culture", "Beach", "Family", "History"],
        season: "March-November",
    },
    PopularDestination {
        country: "BAA",
        cities: &["Dubai", "Abu-Dabi", "Sharja"],
        highlights: &["Modern luxury", "Shopping", "Desert safari", "World-class hotels"],
        best_for: &["Luxury", "Shopping", "Modern architecture", "Adventure"],
        season: "October-April",
    },
    PopularDestination {
        country: "Tailand",
        cities: &["Pxuket", "Bangkok", "Pattaya"],
        highlights: &["Tropical paradise", "Thai massage", "Street food", "Temples"],
        best_for: &["Beach", "Wellness", "Food", "Adventure"],
        season: "November-March",
    },
    PopularDestination {
        country: "Misr",
        cities: &["Sharm al-Shayx", "Hurghada"],
        highlights: &["Red Sea diving", "Ancient history", "Affordable beach resort"],
        best_for: &["Beach", "Diving", "History", "Budget"],
        season: "September-May",
    },
    PopularDestination {
        country: "Gruziya",
        cities: &["Tbilisi", "Batumi"],
        highlights: &["Wine country", "Mountain beauty", "Friendly people", "Great food"],
        best_for: &["Culture", "Nature", "Food", "Adventure"],
        season: "April-October",
    },
    PopularDestination {
        country: "Maldiv orollari",
        cities: &["Male", "Bodufoludo"],
        highlights: &["Overwater bungalows", "Crystal clear waters", "Luxury resorts"],
        best_for: &["Romance", "Luxury", "Beach", "Honeymoon"],
        season: "November-April",
    },
];

/// Places to suggest per interest keyword
pub const INTEREST_PLACES: &[(&str, &[&str])] = &[
    ("beach", &["Antaliya", "Dubai", "Sharm al-Shayx", "Pxuket", "Bali", "Male"]),
    ("luxury", &["Dubai", "Abu-Dabi", "Parij", "Maldiv orollari"]),
    ("culture", &["Istanbul", "Buxoro", "Samarqand", "Parij", "Anqara"]),
    ("adventure", &["Kappadokiya", "Trabzon", "Gruziya", "Vetnam", "Xitoy"]),
    ("family", &["Antaliya", "Dubai", "Istanbul", "Tailand", "BAA"]),
    ("shopping", &["Dubai", "Istanbul", "Bangkok", "Kuala-Lumpur"]),
    ("food", &["Istanbul", "Bangkok", "Vetnam", "Malayziya"]),
    ("history", &["Turkiya", "Misr", "Gruziya", "Uzbekiston"]),
    ("romance", &["Parij", "Maldiv orollari", "Istanbul", "Bali"]),
    ("nature", &["Kappadokiya", "Gruziya", "Vetnam", "Malayziya", "Indoneziya"]),
    ("religious", &["Saudiya Arabistoni", "Turkiya", "Misr"]),
    ("wellness", &["Tailand", "Bali", "Gruziya", "Turkiya"]),
];

/// Places in season
pub const SEASON_PLACES: &[(&str, &[&str])] = &[
    ("summer", &["Turkiya", "Gruziya", "Evropa"]),
    ("winter", &["BAA", "Tailand", "Indoneziya", "Maldiv orollari", "Misr"]),
    ("spring", &["Turkiya", "Gruziya", "BAA", "Vetnam"]),
    ("autumn", &["BAA", "Turkiya", "Gruziya", "Misr"]),
];

/// Inclusive price band of a budget category
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BudgetBand {
    pub min: f64,
    pub max: f64,
}

impl BudgetBand {
    pub fn contains(&self, price: f64) -> bool {
        self.min <= price && price <= self.max
    }
}

/// Band for `budget`, `mid-range` or `luxury` (case-insensitive)
pub fn budget_band(category: &str) -> Option<BudgetBand> {
    match category.trim().to_lowercase().as_str() {
        "budget" => Some(BudgetBand { min: 0.0, max: 500.0 }),
        "mid-range" => Some(BudgetBand { min: 500.0, max: 1000.0 }),
        "luxury" => Some(BudgetBand {
            min: 1000.0,
            max: 5000.0,
        }),
        _ => None,
    }
}

/// Places suiting the interests and season, first appearance kept
///
/// An interest matches a keyword when either contains the other, so
/// `"beaches"` and `"sea & beach"` both select beach places.
pub fn places_for_interests(interests: &[String], season: Option<&str>) -> Vec<&'static str> {
    let mut places: Vec<&'static str> = Vec::new();
    let mut push = |place: &'static str| {
        if !places.contains(&place) {
            places.push(place);
        }
    };

    for interest in interests {
        let interest = interest.trim().to_lowercase();
        if interest.is_empty() {
            continue;
        }
        for (keyword, candidates) in INTEREST_PLACES {
            if keyword.contains(interest.as_str()) || interest.contains(keyword) {
                candidates.iter().copied().for_each(&mut push);
            }
        }
    }

    if let Some(season) = season {
        let season = season.trim().to_lowercase();
        if let Some((_, candidates)) = SEASON_PLACES.iter().find(|(name, _)| *name == season) {
            candidates.iter().copied().for_each(&mut push);
        }
    }

    places
}
