//! Bundled Astronomy Picture of the Day entries
//!
//! A small dated collection used when the APOD service is rate limited. A
//! request for a date outside the collection is answered with the nearest
//! bundled date.

use chrono::NaiveDate;
use serde::Serialize;

/// Entry served when no date is requested and today is not bundled
pub const BASELINE_DATE: &str = "2025-07-01";

/// One bundled APOD, field-for-field the shape of the live API
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ApodEntry {
    pub date: &'static str,
    pub explanation: &'static str,
    pub hdurl: &'static str,
    pub media_type: &'static str,
    pub service_version: &'static str,
    pub title: &'static str,
    pub url: &'static str,
}

impl ApodEntry {
    pub fn day(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date, "%Y-%m-%d").ok()
    }
}

/// Bundled entries, oldest first
pub static APOD_ENTRIES: [ApodEntry; 7] = [
    ApodEntry {
        date: "2025-06-25",
        explanation: "Saturn's largest moon Titan has a thick atmosphere and lakes of liquid methane. This infrared image from the Cassini spacecraft reveals the moon's surface features through its hazy atmosphere, showing a world both alien and fascinating.",
        hdurl: "https://apod.nasa.gov/apod/image/2303/titan_cassini_4096.jpg",
        media_type: "image",
        service_version: "v1",
        title: "Titan: Saturn's Largest Moon",
        url: "https://apod.nasa.gov/apod/image/2303/titan_cassini_1024.jpg",
    },
    ApodEntry {
        date: "2025-06-26",
        explanation: "The Eagle Nebula is a star-forming region located about 7,000 light-years away in the constellation Serpens. This iconic nebula contains the famous 'Pillars of Creation' - towering columns of gas and dust where new stars are being born.",
        hdurl: "https://apod.nasa.gov/apod/image/2304/eagle_nebula_hst_4096.jpg",
        media_type: "image",
        service_version: "v1",
        title: "The Eagle Nebula",
        url: "https://apod.nasa.gov/apod/image/2304/eagle_nebula_hst_1024.jpg",
    },
    ApodEntry {
        date: "2025-06-27",
        explanation: "This spectacular aurora was photographed from the International Space Station as it orbited high above the Earth. The dancing lights of the aurora are caused by charged particles from the Sun interacting with Earth's magnetic field and atmosphere.",
        hdurl: "https://apod.nasa.gov/apod/image/2304/aurora_iss_4096.jpg",
        media_type: "image",
        service_version: "v1",
        title: "Aurora from the Space Station",
        url: "https://apod.nasa.gov/apod/image/2304/aurora_iss_1024.jpg",
    },
    ApodEntry {
        date: "2025-06-28",
        explanation: "The Andromeda Galaxy is the nearest major galaxy to our Milky Way. This deep image shows Andromeda's spiral structure along with two prominent satellite galaxies. Also known as M31, the Andromeda Galaxy is located about 2.5 million light-years away.",
        hdurl: "https://apod.nasa.gov/apod/image/2405/M31_Dyer_4096.jpg",
        media_type: "image",
        service_version: "v1",
        title: "The Andromeda Galaxy",
        url: "https://apod.nasa.gov/apod/image/2405/M31_Dyer_1024.jpg",
    },
    ApodEntry {
        date: "2025-06-29",
        explanation: "What created this unusual planetary nebula? NGC 7027 is one of the smallest, brightest, and most unusual planetary nebulae known. The central white dwarf star is surrounded by shells of gas expelled during its final evolutionary stages.",
        hdurl: "https://apod.nasa.gov/apod/image/2305/ngc7027_hubble_2048.jpg",
        media_type: "image",
        service_version: "v1",
        title: "Planetary Nebula NGC 7027",
        url: "https://apod.nasa.gov/apod/image/2305/ngc7027_hubble_1024.jpg",
    },
    ApodEntry {
        date: "2025-06-30",
        explanation: "This stunning view shows the International Space Station silhouetted against the Sun during a solar transit. The entire transit event lasted less than a second, but this single frame captures the moment when the ISS appeared as a dark spot against our star.",
        hdurl: "https://apod.nasa.gov/apod/image/2306/IssTransitSun_Vantuyne_2048.jpg",
        media_type: "image",
        service_version: "v1",
        title: "International Space Station Transits the Sun",
        url: "https://apod.nasa.gov/apod/image/2306/IssTransitSun_Vantuyne_1024.jpg",
    },
    ApodEntry {
        date: "2025-07-01",
        explanation: "This colorized and digitally sharpened image of the Sun is composed of frames recording emission from hydrogen atoms in the solar chromosphere. A dark, serpentine filament snakes across the bright solar disk in this stunning view of solar cycle 25 activity.",
        hdurl: "https://apod.nasa.gov/apod/image/2406/Sun_Meunier_4000.jpg",
        media_type: "image",
        service_version: "v1",
        title: "A Prominent Solar Filament",
        url: "https://apod.nasa.gov/apod/image/2406/Sun_Meunier_1024.jpg",
    },
];

/// Looks up the bundled entry for an exact date
pub fn entry_for_date(entries: &'static [ApodEntry], date: NaiveDate) -> Option<&'static ApodEntry> {
    entries.iter().find(|entry| entry.day() == Some(date))
}

/// Finds the entry closest to `requested` by absolute day distance
///
/// Entries are scanned in ascending date order and only a strictly smaller
/// distance replaces the current best, so ties go to the earlier date.
pub fn nearest_entry(entries: &'static [ApodEntry], requested: NaiveDate) -> Option<&'static ApodEntry> {
    let mut dated: Vec<(NaiveDate, &'static ApodEntry)> = entries
        .iter()
        .filter_map(|entry| entry.day().map(|day| (day, entry)))
        .collect();
    dated.sort_by_key(|(day, _)| *day);

    let mut best: Option<(i64, &'static ApodEntry)> = None;
    for (day, entry) in dated {
        let distance = (day - requested).num_days().abs();
        if best.map_or(true, |(smallest, _)| distance < smallest) {
            best = Some((distance, entry));
        }
    }
    best.map(|(_, entry)| entry)
}

/// Resolves the bundled entry for a requested date
///
/// Without a date, today's entry is used if bundled and the baseline entry
/// otherwise. With a date, an exact match wins, then the nearest date.
pub fn resolve(date: Option<NaiveDate>, today: NaiveDate) -> &'static ApodEntry {
    let baseline = || {
        APOD_ENTRIES
            .iter()
            .find(|entry| entry.date == BASELINE_DATE)
            .unwrap_or(&APOD_ENTRIES[APOD_ENTRIES.len() - 1])
    };

    match date {
        None => entry_for_date(&APOD_ENTRIES, today).unwrap_or_else(baseline),
        Some(date) => entry_for_date(&APOD_ENTRIES, date)
            .or_else(|| nearest_entry(&APOD_ENTRIES, date))
            .unwrap_or_else(baseline),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    static GAPPED: [ApodEntry; 2] = [
        ApodEntry {
            date: "2025-01-01",
            explanation: "",
            hdurl: "",
            media_type: "image",
            service_version: "v1",
            title: "Early",
            url: "",
        },
        ApodEntry {
            date: "2025-01-05",
            explanation: "",
            hdurl: "",
            media_type: "image",
            service_version: "v1",
            title: "Late",
            url: "",
        },
    ];

    #[test]
    fn test_every_bundled_date_parses() {
        for entry in APOD_ENTRIES.iter() {
            assert!(entry.day().is_some(), "bad date {}", entry.date);
        }
    }

    #[test]
    fn test_exact_date_is_returned() {
        let entry = resolve(Some(ymd(2025, 6, 28)), ymd(2026, 1, 1));
        assert_eq!(entry.title, "The Andromeda Galaxy");
    }

    #[test]
    fn test_date_after_collection_uses_latest() {
        let entry = resolve(Some(ymd(2025, 8, 15)), ymd(2026, 1, 1));
        assert_eq!(entry.date, "2025-07-01");
    }

    #[test]
    fn test_date_before_collection_uses_earliest() {
        let entry = resolve(Some(ymd(1999, 1, 1)), ymd(2026, 1, 1));
        assert_eq!(entry.date, "2025-06-25");
    }

    #[test]
    fn test_tie_goes_to_earlier_date() {
        let entry = nearest_entry(&GAPPED, ymd(2025, 1, 3)).unwrap();
        assert_eq!(entry.title, "Early");
    }

    #[test]
    fn test_nearest_prefers_strictly_closer_later_date() {
        let entry = nearest_entry(&GAPPED, ymd(2025, 1, 4)).unwrap();
        assert_eq!(entry.title, "Late");
    }

    #[test]
    fn test_no_date_uses_today_when_bundled() {
        let entry = resolve(None, ymd(2025, 6, 26));
        assert_eq!(entry.title, "The Eagle Nebula");
    }

    #[test]
    fn test_no_date_defaults_to_baseline() {
        let entry = resolve(None, ymd(2026, 10, 16));
        assert_eq!(entry.date, BASELINE_DATE);
    }
}
