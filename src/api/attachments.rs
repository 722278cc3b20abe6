//! Message attachments
//!
//! The API tags every attachment with a `type` field. Dispatch is an
//! explicit match on that tag; types this crate does not know about
//! round-trip untouched through [`Attachment::Other`].

use serde::de::{Deserializer, Error as DeError};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One attachment on a message
#[derive(Debug, Clone, PartialEq)]
pub enum Attachment {
    /// An image hosted by the image service
    Image {
        /// Image service URL
        url: String,
    },
    /// A geographic location
    Location {
        /// Latitude as the API sends it
        lat: String,
        /// Longitude as the API sends it
        lng: String,
        /// Display name of the place
        name: String,
    },
    /// A split-the-bill token
    Split {
        /// Opaque split token
        token: String,
    },
    /// Emoji placeholders with their charmap
    Emoji {
        /// Placeholder character in the message text
        placeholder: String,
        /// Pack/offset pairs, one per emoji
        charmap: Vec<Vec<i64>>,
    },
    /// User mentions
    Mentions {
        /// Mentioned user IDs
        user_ids: Vec<String>,
        /// Text ranges the mentions cover, when the API provides them
        loci: Option<Vec<Vec<i64>>>,
    },
    /// Any attachment type this crate does not model
    Other {
        /// The wire `type` tag
        kind: String,
        /// All remaining fields, untouched
        data: Map<String, Value>,
    },
}

impl Attachment {
    /// Create an image attachment
    pub fn image(url: impl Into<String>) -> Self {
        Self::Image { url: url.into() }
    }

    /// Create a location attachment
    pub fn location(
        name: impl Into<String>,
        lat: impl Into<String>,
        lng: impl Into<String>,
    ) -> Self {
        Self::Location {
            lat: lat.into(),
            lng: lng.into(),
            name: name.into(),
        }
    }

    /// Create a mentions attachment
    pub fn mentions(user_ids: Vec<String>) -> Self {
        Self::Mentions {
            user_ids,
            loci: None,
        }
    }

    /// The wire `type` tag for this attachment
    pub fn kind(&self) -> &str {
        match self {
            Self::Image { .. } => "image",
            Self::Location { .. } => "location",
            Self::Split { .. } => "split",
            Self::Emoji { .. } => "emoji",
            Self::Mentions { .. } => "mentions",
            Self::Other { kind, .. } => kind,
        }
    }

    fn from_parts(kind: String, data: Map<String, Value>) -> Result<Self, serde_json::Error> {
        let attachment = match kind.as_str() {
            "image" => {
                let parts: ImageParts = serde_json::from_value(Value::Object(data))?;
                Self::Image { url: parts.url }
            }
            "location" => {
                let parts: LocationParts = serde_json::from_value(Value::Object(data))?;
                Self::Location {
                    lat: parts.lat,
                    lng: parts.lng,
                    name: parts.name,
                }
            }
            "split" => {
                let parts: SplitParts = serde_json::from_value(Value::Object(data))?;
                Self::Split { token: parts.token }
            }
            "emoji" => {
                let parts: EmojiParts = serde_json::from_value(Value::Object(data))?;
                Self::Emoji {
                    placeholder: parts.placeholder,
                    charmap: parts.charmap,
                }
            }
            "mentions" => {
                let parts: MentionsParts = serde_json::from_value(Value::Object(data))?;
                Self::Mentions {
                    user_ids: parts.user_ids,
                    loci: parts.loci,
                }
            }
            _ => Self::Other {
                kind: kind.clone(),
                data,
            },
        };
        Ok(attachment)
    }
}

#[derive(Deserialize)]
struct ImageParts {
    url: String,
}

#[derive(Deserialize)]
struct LocationParts {
    lat: String,
    lng: String,
    name: String,
}

#[derive(Deserialize)]
struct SplitParts {
    token: String,
}

#[derive(Deserialize)]
struct EmojiParts {
    placeholder: String,
    charmap: Vec<Vec<i64>>,
}

#[derive(Deserialize)]
struct MentionsParts {
    user_ids: Vec<String>,
    #[serde(default)]
    loci: Option<Vec<Vec<i64>>>,
}

impl<'de> Deserialize<'de> for Attachment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut map = Map::deserialize(deserializer)?;
        let kind = match map.remove("type") {
            Some(Value::String(kind)) => kind,
            _ => return Err(D::Error::missing_field("type")),
        };
        Self::from_parts(kind, map).map_err(D::Error::custom)
    }
}

impl Serialize for Attachment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", self.kind())?;
        match self {
            Self::Image { url } => {
                map.serialize_entry("url", url)?;
            }
            Self::Location { lat, lng, name } => {
                map.serialize_entry("lat", lat)?;
                map.serialize_entry("lng", lng)?;
                map.serialize_entry("name", name)?;
            }
            Self::Split { token } => {
                map.serialize_entry("token", token)?;
            }
            Self::Emoji {
                placeholder,
                charmap,
            } => {
                map.serialize_entry("placeholder", placeholder)?;
                map.serialize_entry("charmap", charmap)?;
            }
            Self::Mentions { user_ids, loci } => {
                map.serialize_entry("user_ids", user_ids)?;
                if let Some(loci) = loci {
                    map.serialize_entry("loci", loci)?;
                }
            }
            Self::Other { data, .. } => {
                for (key, value) in data {
                    map.serialize_entry(key, value)?;
                }
            }
        }
        map.end()
    }
}
