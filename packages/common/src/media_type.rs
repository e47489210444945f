#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where an uploaded image is shown on the site.
///
/// When the `sea-orm` feature is enabled, this enum can be used directly in SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// Home page carousel.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "banner"))]
    Banner,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "gallery"))]
    Gallery,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "event"))]
    Event,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Banner => "banner",
            Self::Gallery => "gallery",
            Self::Event => "event",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "banner" => Ok(Self::Banner),
            "gallery" => Ok(Self::Gallery),
            "event" => Ok(Self::Event),
            other => Err(format!(
                "Invalid media type '{other}', expected banner, gallery or event"
            )),
        }
    }
}
