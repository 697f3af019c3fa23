//! Read-only guidebook content consumed by the export pipeline.
//!
//! A [`ContentModel`] is produced once by the data-access layer (outside this
//! crate) and handed to the [export controller](crate::export). Nothing in the
//! pipeline mutates it. Every optional field that is absent simply omits the
//! section that would have shown it (see [`crate::surface::plan_sections`]).
//!
//! Policy and rule fields are sets of tags. Unknown tags deserialize to an
//! `Unknown` variant and are skipped, so a newer backend adding a tag never
//! breaks an export.

use serde::{Deserialize, Serialize};

/// Everything the guidebook knows about one property.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentModel {
    pub property: Property,
    pub equipment: Vec<EquipmentItem>,
    pub nearby_places: Vec<NearbyPlace>,
    pub host: Host,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Property {
    pub name: String,
    pub description: Option<String>,
    pub address: Option<Address>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Public guidebook link encoded into the scannable code on the welcome page.
    pub guidebook_url: Option<String>,
    /// Free-text directions shown under "Getting Here".
    pub getting_here: Option<String>,
    pub check_in: CheckIn,
    pub check_out: CheckOut,
    pub house_rules: Vec<HouseRule>,
    /// Text carried by the [`HouseRule::AdditionalRules`] tag.
    pub additional_rules: Option<String>,
    pub front_photo_url: Option<String>,
    pub gallery: Vec<String>,
    pub check_in_video_url: Option<String>,
}

impl Property {
    /// Both coordinates, if the property has been geocoded.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }

    /// The photo shown on the welcome page: the front photo, else the first gallery photo.
    pub fn cover_photo(&self) -> Option<&str> {
        non_empty(&self.front_photo_url).or_else(|| {
            self.gallery
                .iter()
                .map(String::as_str)
                .find(|url| !url.trim().is_empty())
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
}

impl Address {
    /// Printable lines, skipping empty parts: street, "postal city", "region, country".
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(street) = non_empty(&self.street) {
            lines.push(street.to_string());
        }
        let locality = [non_empty(&self.postal_code), non_empty(&self.city)]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        if !locality.is_empty() {
            lines.push(locality);
        }
        let area = [non_empty(&self.region), non_empty(&self.country)]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(", ");
        if !area.is_empty() {
            lines.push(area);
        }
        lines
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckIn {
    /// Earliest arrival, as entered by the host (e.g. `"14:00"`).
    pub time: Option<String>,
    pub policies: Vec<CheckInPolicy>,
    pub access_notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckOut {
    pub time: Option<String>,
    pub late_checkout: Vec<LateCheckout>,
    pub before_checkout: Vec<BeforeCheckout>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckInPolicy {
    SelfCheckIn,
    Keybox,
    SmartLock,
    MeetHost,
    Reception,
    FlexibleHours,
    #[serde(other)]
    Unknown,
}

impl CheckInPolicy {
    pub fn label(self) -> Option<&'static str> {
        Some(match self {
            Self::SelfCheckIn => "Self check-in",
            Self::Keybox => "Keys are in a lockbox",
            Self::SmartLock => "Smart lock entry",
            Self::MeetHost => "Your host will meet you on arrival",
            Self::Reception => "Keys are available at the reception",
            Self::FlexibleHours => "Flexible arrival hours",
            Self::Unknown => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LateCheckout {
    Available,
    OnRequest,
    Paid,
    NotAvailable,
    #[serde(other)]
    Unknown,
}

impl LateCheckout {
    pub fn label(self) -> Option<&'static str> {
        Some(match self {
            Self::Available => "Late check-out is available",
            Self::OnRequest => "Late check-out on request, ask your host",
            Self::Paid => "Late check-out is possible for an extra fee",
            Self::NotAvailable => "Late check-out is not possible",
            Self::Unknown => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeforeCheckout {
    TakeOutTrash,
    TurnOffLights,
    LockDoors,
    ReturnKeys,
    RunDishwasher,
    StripBeds,
    CloseWindows,
    #[serde(other)]
    Unknown,
}

impl BeforeCheckout {
    pub fn label(self) -> Option<&'static str> {
        Some(match self {
            Self::TakeOutTrash => "Take out the trash",
            Self::TurnOffLights => "Turn off the lights",
            Self::LockDoors => "Lock the doors",
            Self::ReturnKeys => "Return the keys",
            Self::RunDishwasher => "Start the dishwasher",
            Self::StripBeds => "Strip the beds",
            Self::CloseWindows => "Close the windows",
            Self::Unknown => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HouseRule {
    NoSmoking,
    NoParties,
    NoPets,
    QuietHours,
    NoShoes,
    /// Rendered with [`Property::additional_rules`] as its text.
    AdditionalRules,
    #[serde(other)]
    Unknown,
}

impl HouseRule {
    pub fn label(self) -> Option<&'static str> {
        Some(match self {
            Self::NoSmoking => "No smoking",
            Self::NoParties => "No parties or events",
            Self::NoPets => "No pets",
            Self::QuietHours => "Quiet hours after 22:00",
            Self::NoShoes => "Please take off your shoes inside",
            Self::AdditionalRules => "Additional rules",
            Self::Unknown => return None,
        })
    }
}

/// One piece of equipment documented in the house manual.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EquipmentItem {
    /// Category key (`wifi`, `tv`, `kitchen`, ...). At most one item per key.
    pub name: String,
    pub description: Option<String>,
    pub media_url: Option<String>,
    pub media_kind: MediaKind,
    pub wifi_name: Option<String>,
    pub wifi_password: Option<String>,
}

/// Whether a media URL points at a still image or a video.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    #[default]
    Photo,
    Video,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NearbyPlace {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub rating: Option<f32>,
    pub photo_url: Option<String>,
    pub url: Option<String>,
    /// Place-provider category tags (`restaurant`, `museum`, ...).
    pub types: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Host {
    pub display_name: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub phone: Option<String>,
}

/// Trimmed contents of an optional string, `None` when absent or blank.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
