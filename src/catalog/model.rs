//! Tour records as served by the catalogue
//!
//! Tours are kept as the raw JSON the API returned; the accessors read the
//! fields the consultant needs and tolerate numbers sent as strings.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A tour from `/tours`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tour(Value);

impl Tour {
    pub fn from_json(value: Value) -> Self {
        Self(value)
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }

    pub fn into_json(self) -> Value {
        self.0
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Identity used to de-duplicate results across searches
    pub fn id(&self) -> Option<String> {
        match self.0.get("id")? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn slug(&self) -> Option<&str> {
        self.str_field("slug")
    }

    pub fn name(&self) -> Option<&str> {
        self.str_field("name")
    }

    pub fn price(&self) -> Option<f64> {
        self.0.get("price").and_then(number)
    }

    pub fn currency(&self) -> Option<&str> {
        self.str_field("currency")
    }

    /// Day count rounded for display
    pub fn days(&self) -> Option<i64> {
        self.day_count().map(|d| d.round() as i64)
    }

    /// Day count exactly as the catalogue sent it
    pub fn day_count(&self) -> Option<f64> {
        self.0.get("days").and_then(number)
    }

    pub fn nights(&self) -> Option<i64> {
        self.0.get("nights").and_then(number).map(|n| n.round() as i64)
    }

    pub fn from_date(&self) -> Option<&str> {
        self.str_field("from_date")
    }

    pub fn to_date(&self) -> Option<&str> {
        self.str_field("to_date")
    }

    pub fn description(&self) -> Option<&str> {
        self.str_field("description")
    }

    pub fn organization_name(&self) -> Option<&str> {
        self.str_field("organization_name")
    }

    /// Names of the included services
    pub fn features(&self) -> Vec<String> {
        self.0
            .get("features")
            .and_then(Value::as_array)
            .map(|features| {
                features
                    .iter()
                    .filter_map(|f| match f {
                        Value::String(s) => Some(s.clone()),
                        other => other.get("name").and_then(Value::as_str).map(str::to_string),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Destination label; the API sends either a string or a list of locations
    pub fn locations_label(&self) -> Option<String> {
        match self.0.get("locations")? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Array(items) => {
                let names: Vec<&str> = items
                    .iter()
                    .filter_map(|item| {
                        item.as_str()
                            .or_else(|| item.get("name").and_then(Value::as_str))
                            .or_else(|| item.get("location_name").and_then(Value::as_str))
                    })
                    .collect();
                if names.is_empty() {
                    None
                } else {
                    Some(names.join(", "))
                }
            }
            _ => None,
        }
    }
}

impl From<Value> for Tour {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Number or numeric string
pub(crate) fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Hotel option of a tour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotel {
    pub name: Option<String>,
    pub stars: Value,
    pub price: Value,
    pub currency: String,
    pub nights: Value,
    pub image: Option<String>,
    pub features: Value,
    pub location: Option<String>,
}

impl Hotel {
    fn from_json(hotel: &Value) -> Self {
        Self {
            name: opt_string(hotel, "hotel_name"),
            stars: field(hotel, "stars"),
            price: field(hotel, "price"),
            currency: opt_string(hotel, "currency").unwrap_or_else(|| "USD".to_string()),
            nights: field(hotel, "nights"),
            image: opt_string(hotel, "image"),
            features: hotel.get("features").cloned().unwrap_or_else(|| json!([])),
            location: opt_string(hotel, "location_name"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Duration {
    pub days: Value,
    pub nights: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelDates {
    pub from: Value,
    pub to: Value,
}

/// Headline facts of a tour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourSummary {
    pub id: Value,
    pub name: Value,
    pub description: Value,
    pub price: Value,
    pub currency: String,
    pub duration: Duration,
    pub dates: TravelDates,
    pub is_hot: bool,
    pub images: Value,
    pub locations: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub responsible_person: Value,
    pub organization: Value,
    pub contact_phone: Value,
}

/// Display-ready reshaping of `/tours/view/{slug}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourDetails {
    pub tour_details: TourSummary,
    /// Hotels of every tour location, flattened
    pub hotels: Vec<Hotel>,
    pub organization: Value,
    pub contact_info: ContactInfo,
    pub features: Value,
    pub facilities: Value,
    pub schedules: Value,
    pub meta_data: Value,
}

impl TourDetails {
    pub fn from_json(data: &Value) -> Self {
        let organization = data.get("organization").cloned().unwrap_or_else(|| json!({}));

        let hotels = data
            .get("locations")
            .and_then(Value::as_array)
            .map(|locations| {
                locations
                    .iter()
                    .filter_map(|location| location.get("hotels").and_then(Value::as_array))
                    .flatten()
                    .map(Hotel::from_json)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            tour_details: TourSummary {
                id: field(data, "id"),
                name: field(data, "name"),
                description: field(data, "description"),
                price: field(data, "price"),
                currency: opt_string(data, "currency").unwrap_or_else(|| "USD".to_string()),
                duration: Duration {
                    days: field(data, "days"),
                    nights: field(data, "nights"),
                },
                dates: TravelDates {
                    from: field(data, "from_date"),
                    to: field(data, "to_date"),
                },
                is_hot: data.get("is_hot").and_then(Value::as_bool).unwrap_or(false),
                images: data.get("images").cloned().unwrap_or_else(|| json!([])),
                locations: data.get("locations").cloned().unwrap_or_else(|| json!([])),
            },
            hotels,
            contact_info: ContactInfo {
                responsible_person: data
                    .get("responsible_user")
                    .cloned()
                    .unwrap_or_else(|| json!({})),
                organization: organization.clone(),
                contact_phone: field(data, "contact_phone"),
            },
            organization,
            features: data.get("features").cloned().unwrap_or_else(|| json!([])),
            facilities: data.get("facilities").cloned().unwrap_or_else(|| json!([])),
            schedules: data.get("schedules").cloned().unwrap_or_else(|| json!([])),
            meta_data: data.get("meta_data").cloned().unwrap_or_else(|| json!({})),
        }
    }
}

fn field(value: &Value, key: &str) -> Value {
    value.get(key).cloned().unwrap_or(Value::Null)
}

fn opt_string(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dubai_tour() -> Tour {
        Tour::from_json(json!({
            "id": 42,
            "slug": "dubai-5-days",
            "name": "Dubai Shopping",
            "price": "450",
            "currency": "USD",
            "days": 5,
            "nights": 4,
            "from_date": "01.09.2025",
            "to_date": "06.09.2025",
            "organization_name": "Sayohat LLC",
            "features": [{"name": "Hotel"}, {"name": "Transfer"}],
            "locations": [{"name": "Dubay"}, {"name": "Sharja"}]
        }))
    }

    #[test]
    fn test_tour_accessors() {
        let tour = dubai_tour();
        assert_eq!(tour.id().as_deref(), Some("42"));
        assert_eq!(tour.slug(), Some("dubai-5-days"));
        assert_eq!(tour.price(), Some(450.0));
        assert_eq!(tour.days(), Some(5));
        assert_eq!(tour.nights(), Some(4));
        assert_eq!(tour.features(), vec!["Hotel", "Transfer"]);
        assert_eq!(tour.locations_label().as_deref(), Some("Dubay, Sharja"));
    }

    #[test]
    fn test_tour_missing_fields() {
        let tour = Tour::from_json(json!({"name": "Mystery", "price": null, "locations": "Bali"}));
        assert!(tour.id().is_none());
        assert!(tour.price().is_none());
        assert!(tour.days().is_none());
        assert!(tour.features().is_empty());
        assert_eq!(tour.locations_label().as_deref(), Some("Bali"));
    }

    #[test]
    fn test_details_reshape_flattens_hotels() {
        let raw = json!({
            "id": 7,
            "name": "Antalya Family",
            "price": 890,
            "days": 8,
            "nights": 7,
            "from_date": "10.07.2025",
            "to_date": "17.07.2025",
            "is_hot": true,
            "contact_phone": "+998901112233",
            "responsible_user": {"name": "Dilnoza"},
            "organization": {"name": "Sayohat LLC"},
            "locations": [
                {"hotels": [{"hotel_name": "Rixos", "stars": 5, "price": 890, "nights": 7}]},
                {"hotels": [{"hotel_name": "Hilton", "stars": 4, "currency": "EUR", "location_name": "Kemer"}]},
                {"name": "no hotels"}
            ]
        });

        let details = TourDetails::from_json(&raw);
        assert_eq!(details.tour_details.currency, "USD");
        assert!(details.tour_details.is_hot);
        assert_eq!(details.tour_details.duration.days, json!(8));
        assert_eq!(details.hotels.len(), 2);
        assert_eq!(details.hotels[0].name.as_deref(), Some("Rixos"));
        assert_eq!(details.hotels[0].currency, "USD");
        assert_eq!(details.hotels[1].currency, "EUR");
        assert_eq!(details.hotels[1].location.as_deref(), Some("Kemer"));
        assert_eq!(details.contact_info.contact_phone, json!("+998901112233"));
        assert_eq!(details.contact_info.organization, json!({"name": "Sayohat LLC"}));
        assert_eq!(details.schedules, json!([]));
    }
}
