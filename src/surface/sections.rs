//! Which guidebook sections exist, and in what order.
//!
//! Presence is decided purely from the [`ContentModel`]: a section whose
//! data is absent is omitted entirely, never printed empty.
//!
//! | Order | Section | Present when |
//! |---|---|---|
//! | 1 | Welcome | always |
//! | 2 | Getting Here | address lines or directions text |
//! | 3 | Check-In | time, policies, access notes, video, or house rules |
//! | 4 | Wifi Access | a `wifi` item with a network name or password |
//! | 5 | House Manual | at least one known equipment category |
//! | 6 | Check-Out | late-checkout or before-checkout tags |
//! | 7..10 | Nearby galleries | at least one matching place (max 6 each) |

use crate::model::{ContentModel, EquipmentItem, NearbyPlace, non_empty};
use serde::Serialize;

/// Places shown per nearby gallery.
pub const GALLERY_LIMIT: usize = 6;

/// Equipment categories of the house manual, in print order.
pub const MANUAL_CATEGORIES: [&str; 6] = [
    "wifi",
    "tv",
    "kitchen",
    "air_conditioning",
    "washer",
    "pool",
];

/// Nearby-place groupings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceCategory {
    Restaurants,
    Activities,
    Attractions,
    Malls,
}

impl PlaceCategory {
    pub const ALL: [PlaceCategory; 4] = [
        Self::Restaurants,
        Self::Activities,
        Self::Attractions,
        Self::Malls,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::Restaurants => "Restaurants & Cafés",
            Self::Activities => "Activities",
            Self::Attractions => "Attractions",
            Self::Malls => "Malls",
        }
    }

    /// Place-provider type tags that belong to this category.
    fn tags(self) -> &'static [&'static str] {
        match self {
            Self::Restaurants => &[
                "restaurant",
                "cafe",
                "bar",
                "bakery",
                "meal_takeaway",
                "meal_delivery",
                "food",
            ],
            Self::Activities => &[
                "park",
                "gym",
                "spa",
                "amusement_park",
                "aquarium",
                "zoo",
                "bowling_alley",
                "movie_theater",
                "stadium",
                "campground",
                "night_club",
            ],
            Self::Attractions => &[
                "tourist_attraction",
                "museum",
                "art_gallery",
                "church",
                "place_of_worship",
                "point_of_interest",
                "natural_feature",
            ],
            Self::Malls => &[
                "shopping_mall",
                "store",
                "department_store",
                "clothing_store",
                "supermarket",
            ],
        }
    }

    pub fn matches(self, place: &NearbyPlace) -> bool {
        let tags = self.tags();
        place.types.iter().any(|t| tags.contains(&t.as_str()))
    }
}

/// Section identity, for plans and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Welcome,
    GettingHere,
    CheckIn,
    WifiAccess,
    HouseManual,
    CheckOut,
    Nearby(PlaceCategory),
}

impl SectionKind {
    pub fn title(self) -> &'static str {
        match self {
            Self::Welcome => "Welcome",
            Self::GettingHere => "Getting Here",
            Self::CheckIn => "Check-In",
            Self::WifiAccess => "Wifi Access",
            Self::HouseManual => "House Manual",
            Self::CheckOut => "Check-Out",
            Self::Nearby(category) => category.title(),
        }
    }
}

/// A present section with the model data it prints.
#[derive(Debug, Clone)]
pub enum Section<'a> {
    Welcome,
    GettingHere,
    CheckIn,
    WifiAccess(&'a EquipmentItem),
    HouseManual(Vec<&'a EquipmentItem>),
    CheckOut,
    Nearby(PlaceCategory, Vec<&'a NearbyPlace>),
}

impl Section<'_> {
    pub fn kind(&self) -> SectionKind {
        match self {
            Self::Welcome => SectionKind::Welcome,
            Self::GettingHere => SectionKind::GettingHere,
            Self::CheckIn => SectionKind::CheckIn,
            Self::WifiAccess(_) => SectionKind::WifiAccess,
            Self::HouseManual(_) => SectionKind::HouseManual,
            Self::CheckOut => SectionKind::CheckOut,
            Self::Nearby(category, _) => SectionKind::Nearby(*category),
        }
    }
}

/// The sections to print for `model`, in order.
pub fn plan_sections(model: &ContentModel) -> Vec<Section<'_>> {
    let property = &model.property;
    let mut sections = vec![Section::Welcome];

    let has_address = property
        .address
        .as_ref()
        .is_some_and(|a| !a.lines().is_empty());
    if has_address || non_empty(&property.getting_here).is_some() {
        sections.push(Section::GettingHere);
    }

    let check_in = &property.check_in;
    let has_check_in = non_empty(&check_in.time).is_some()
        || check_in.policies.iter().any(|p| p.label().is_some())
        || non_empty(&check_in.access_notes).is_some()
        || non_empty(&property.check_in_video_url).is_some()
        || property.house_rules.iter().any(|r| r.label().is_some());
    if has_check_in {
        sections.push(Section::CheckIn);
    }

    let manual = manual_items(&model.equipment);
    let wifi = manual.iter().copied().find(|item| {
        item.name == "wifi"
            && (non_empty(&item.wifi_name).is_some() || non_empty(&item.wifi_password).is_some())
    });
    if let Some(wifi) = wifi {
        sections.push(Section::WifiAccess(wifi));
    }
    if !manual.is_empty() {
        sections.push(Section::HouseManual(manual));
    }

    let check_out = &property.check_out;
    let has_check_out = check_out.late_checkout.iter().any(|t| t.label().is_some())
        || check_out.before_checkout.iter().any(|t| t.label().is_some());
    if has_check_out {
        sections.push(Section::CheckOut);
    }

    for category in PlaceCategory::ALL {
        let places: Vec<&NearbyPlace> = model
            .nearby_places
            .iter()
            .filter(|place| category.matches(place))
            .take(GALLERY_LIMIT)
            .collect();
        if !places.is_empty() {
            sections.push(Section::Nearby(category, places));
        }
    }

    sections
}

/// Equipment items in manual order, one per category.
///
/// When the input carries several items for one category the first wins.
pub fn manual_items(equipment: &[EquipmentItem]) -> Vec<&EquipmentItem> {
    let mut items = Vec::new();
    for category in MANUAL_CATEGORIES {
        let mut matching = equipment.iter().filter(|item| item.name == category);
        if let Some(first) = matching.next() {
            items.push(first);
        }
        let duplicates = matching.count();
        if duplicates > 0 {
            log::warn!("Ignoring {duplicates} duplicate '{category}' equipment item(s)");
        }
    }
    for item in equipment {
        if !MANUAL_CATEGORIES.contains(&item.name.as_str()) {
            log::debug!("Skipping equipment with unknown category '{}'", item.name);
        }
    }
    items
}

/// Display title of a manual category key.
pub fn category_title(key: &str) -> &str {
    match key {
        "wifi" => "Wifi",
        "tv" => "TV",
        "kitchen" => "Kitchen",
        "air_conditioning" => "Air Conditioning",
        "washer" => "Washer",
        "pool" => "Pool",
        other => other,
    }
}
