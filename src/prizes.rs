use crate::calendar::week_id;
use crate::models::PrizeDetails;
use chrono::{Datelike, Duration, NaiveDate};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

const IMAGE_ROOT: &str = "/static/images";
const BLANK_IMAGE: &str = "blank";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prize {
    pub name: String,
    pub description: String,
    pub image: Option<String>,
}

impl Prize {
    pub fn new(name: impl Into<String>, description: impl Into<String>, image: Option<&str>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            image: image.map(str::to_owned),
        }
    }

    pub fn details(&self) -> PrizeDetails {
        PrizeDetails {
            image: match &self.image {
                Some(file) => format!("{IMAGE_ROOT}/{file}"),
                None => BLANK_IMAGE.to_string(),
            },
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

impl fmt::Display for Prize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.description)
    }
}

/// One row of a prize catalogue file.
#[derive(Debug, Deserialize)]
pub struct PrizeEntry {
    pub year: i32,
    pub week: u32,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidWeek(pub u32);

impl fmt::Display for InvalidWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "week number must be between 1 and 53, got {}", self.0)
    }
}

impl std::error::Error for InvalidWeek {}

/// Weekly prizes keyed by ISO week id (`YYYY-WW`).
#[derive(Debug, Clone, Default)]
pub struct PrizeCatalogue {
    prizes: BTreeMap<String, Prize>,
}

impl PrizeCatalogue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<PrizeEntry>) -> Result<Self, InvalidWeek> {
        let mut catalogue = Self::new();
        for entry in entries {
            let prize = Prize::new(entry.name, entry.description, entry.image.as_deref());
            catalogue.add_prize(entry.year, entry.week, prize)?;
        }
        Ok(catalogue)
    }

    pub fn add_prize(&mut self, year: i32, week: u32, prize: Prize) -> Result<(), InvalidWeek> {
        if !(1..=53).contains(&week) {
            return Err(InvalidWeek(week));
        }
        self.prizes.insert(format!("{year}-{week:02}"), prize);
        Ok(())
    }

    pub fn prize_for(&self, date: NaiveDate) -> Option<&Prize> {
        self.prizes.get(&week_id(date))
    }

    /// Schedules the same prize for `weeks` consecutive ISO weeks starting
    /// with the week containing `start`.
    pub fn add_prize_for_weeks(
        &mut self,
        start: NaiveDate,
        weeks: u32,
        prize: Prize,
    ) -> Result<(), InvalidWeek> {
        let mut current = start;
        for _ in 0..weeks {
            let iso = current.iso_week();
            self.add_prize(iso.year(), iso.week(), prize.clone())?;
            current += Duration::weeks(1);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.prizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prizes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Prize)> {
        self.prizes.iter().map(|(week, prize)| (week.as_str(), prize))
    }

    pub fn with_defaults() -> Self {
        let defaults: [(u32, &str, &str, &str); 17] = [
            (14, "Kveld med Netflix", "Sett deg ned og kos deg med en god film eller serie", "Prize_Cinema.gif"),
            (15, "Kinotur", "Vi ser en film du velger, med slush", "Prize_Cinema.gif"),
            (16, "YT protein shake", "El gains de bimbini", "Prize.gif"),
            (17, "Strikkekveld", "En kveld hvor du lærer meg å strikke", "Prize_Knit.gif"),
            (18, "Pasta night", "Vi lager pasta, my treat", "Prize_Pasta.gif"),
            (19, "Massasje", "30 minutters massasje når det passer deg", "Prize_Massage.gif"),
            (20, "YT Protein Shake", "Påfyll etter en sterk uke", "Prize.gif"),
            (21, "Bakekveld", "Vi baker noe digg, du velger hva", "Prize_Baking.gif"),
            (22, "Spa-kveld", "Ansiktsmaske, cream soda, film og snacks", "Prize_Spa.gif"),
            (23, "YT Protein Shake", "munch munch", "Prize.gif"),
            (24, "Tur på museum", "Du velger hvilket", "Prize.gif"),
            (25, "Digital detox kveld", "En god bok og en kopp te, ingen telefoner hele kvelden", "Prize.gif"),
            (26, "Fototur i botanisk hage", "Vi tar en tur sammen og viser hverandre bildene etterpå", "Prize.gif"),
            (27, "Hjemmetrening", "Vi trener sammen hjemme", "Prize.gif"),
            (28, "Matlaging", "Lag en ny oppskrift sammen", "Prize.gif"),
            (29, "Vin og ost", "Smaking av forskjellige viner og oster", "Prize.gif"),
            (30, "DIY-prosjekt", "Start på et kreativt prosjekt hjemme", "Prize.gif"),
        ];

        let mut catalogue = Self::new();
        for (week, name, description, image) in defaults {
            catalogue
                .prizes
                .insert(format!("2025-{week:02}"), Prize::new(name, description, Some(image)));
        }
        catalogue
    }
}
