//! Parameter types shared by the NASA client and the route handlers

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Upstream operation, used to annotate failures with where they came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Apod,
    ApodRange,
    MarsPhotos,
    RoverManifest,
    Neo,
    AsteroidDetails,
    Epic,
    ImageSearch,
    ImageAssets,
}

impl Endpoint {
    pub fn label(self) -> &'static str {
        match self {
            Endpoint::Apod => "APOD",
            Endpoint::ApodRange => "APOD Range",
            Endpoint::MarsPhotos => "Mars Photos",
            Endpoint::RoverManifest => "Rover Manifest",
            Endpoint::Neo => "NEO",
            Endpoint::AsteroidDetails => "Asteroid Details",
            Endpoint::Epic => "EPIC",
            Endpoint::ImageSearch => "Image Search",
            Endpoint::ImageAssets => "Image Assets",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Mars rovers served by the photos API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Rover {
    Curiosity,
    Opportunity,
    Spirit,
    Perseverance,
}

impl Rover {
    pub const ALL: [Rover; 4] = [
        Rover::Curiosity,
        Rover::Opportunity,
        Rover::Spirit,
        Rover::Perseverance,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Rover::Curiosity => "curiosity",
            Rover::Opportunity => "opportunity",
            Rover::Spirit => "spirit",
            Rover::Perseverance => "perseverance",
        }
    }
}

impl Default for Rover {
    fn default() -> Self {
        Rover::Curiosity
    }
}

impl FromStr for Rover {
    type Err = ();

    /// Case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|rover| rover.as_str().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

impl fmt::Display for Rover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Media kinds accepted by the Image and Video Library search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    Audio,
}

impl MediaType {
    pub const ALL: [MediaType; 3] = [MediaType::Image, MediaType::Video, MediaType::Audio];

    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
            MediaType::Audio => "audio",
        }
    }
}

impl Default for MediaType {
    fn default() -> Self {
        MediaType::Image
    }
}

impl FromStr for MediaType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|media| media.as_str() == s)
            .ok_or(())
    }
}
