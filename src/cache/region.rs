//! Cache regions, one per NASA resource category

use std::fmt;
use std::time::Duration;

use serde::Serialize;

const HOUR: Duration = Duration::from_secs(60 * 60);

/// A named partition of the response cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Region {
    /// Astronomy Picture of the Day
    DailyImage,
    /// Mars rover photos and mission manifests
    RoverPhotos,
    /// Near Earth Object feed and asteroid details
    NearEarthObjects,
    /// EPIC Earth imagery
    EarthImagery,
    /// Image and Video Library search and assets
    MediaSearch,
}

impl Region {
    /// Every region, in stats display order
    pub const ALL: [Region; 5] = [
        Region::DailyImage,
        Region::RoverPhotos,
        Region::NearEarthObjects,
        Region::EarthImagery,
        Region::MediaSearch,
    ];

    /// Time-to-live applied to every entry stored in this region
    ///
    /// Upstream data changes at most daily, so these are fixed per category
    /// and cannot be overridden per request.
    pub fn ttl(self) -> Duration {
        match self {
            Region::DailyImage => HOUR,
            Region::RoverPhotos => 2 * HOUR,
            Region::NearEarthObjects => HOUR,
            Region::EarthImagery => HOUR,
            Region::MediaSearch => 2 * HOUR,
        }
    }

    /// Stable name used in logs and the stats endpoint
    pub fn name(self) -> &'static str {
        match self {
            Region::DailyImage => "daily-image",
            Region::RoverPhotos => "rover-photos",
            Region::NearEarthObjects => "near-earth-objects",
            Region::EarthImagery => "earth-imagery",
            Region::MediaSearch => "media-search",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_policy_per_region() {
        assert_eq!(Region::DailyImage.ttl(), Duration::from_secs(3600));
        assert_eq!(Region::RoverPhotos.ttl(), Duration::from_secs(7200));
        assert_eq!(Region::NearEarthObjects.ttl(), Duration::from_secs(3600));
        assert_eq!(Region::EarthImagery.ttl(), Duration::from_secs(3600));
        assert_eq!(Region::MediaSearch.ttl(), Duration::from_secs(7200));
    }
}
