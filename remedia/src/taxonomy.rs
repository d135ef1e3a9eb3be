//! Fixed two-level symptom taxonomy of the German Synthesis repertory.
//!
//! The upper level has three values. Only symptoms of the body ("Körper")
//! carry a second-level label; the corpus stores that label in its single
//! `category` column, everything else is stored under the upper label.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
pub enum UpperCategory {
    #[serde(rename = "Gemüt")]
    Gemuet,
    #[serde(rename = "Körper")]
    Koerper,
    #[serde(rename = "Allgemein")]
    Allgemein,
}

impl UpperCategory {
    pub const ALL: [UpperCategory; 3] = [Self::Gemuet, Self::Koerper, Self::Allgemein];

    /// Literal body token. It must never appear at the start of a search path.
    pub const BODY_LABEL: &'static str = "Körper";

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemuet => "Gemüt",
            Self::Koerper => Self::BODY_LABEL,
            Self::Allgemein => "Allgemein",
        }
    }

    pub fn is_body(&self) -> bool {
        matches!(self, Self::Koerper)
    }
}

impl fmt::Display for UpperCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UpperCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s.trim())
            .ok_or_else(|| format!("Unknown upper category '{s}'"))
    }
}

macro_rules! sub_categories {
    ($($variant:ident => $label:literal),+ $(,)?) => {
        /// Body region / function labels, plus the `Nicht anwendbar` sentinel.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
        pub enum SubCategory {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl SubCategory {
            pub const ALL: &'static [SubCategory] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }
    };
}

sub_categories! {
    Schwindel => "Schwindel",
    Kopf => "Kopf",
    Auge => "Auge",
    Sehen => "Sehen",
    Ohr => "Ohr",
    Hoeren => "Hören",
    Nase => "Nase",
    Gesicht => "Gesicht",
    Mund => "Mund",
    Zaehne => "Zähne",
    InnererHals => "Innerer Hals",
    AeussererHals => "Äußerer Hals",
    AeussererHalsUndNacken => "Äußerer Hals und Nacken",
    Magen => "Magen",
    Abdomen => "Abdomen",
    Rektum => "Rektum",
    Stuhl => "Stuhl",
    Blase => "Blase",
    Nieren => "Nieren",
    Prostata => "Prostata",
    Harnroehre => "Harnröhre",
    Urin => "Urin",
    Harnorgane => "Harnorgane",
    MaennlicheGenitalien => "Männliche Genitalien",
    WeiblicheGenitalien => "Weibliche Genitalien",
    GenitalienUndSexualitaet => "Genitalien und Sexualität",
    KehlkopfUndTrachea => "Kehlkopf und Trachea",
    Atmung => "Atmung",
    Husten => "Husten",
    Auswurf => "Auswurf",
    Brust => "Brust",
    Ruecken => "Rücken",
    Extremitaeten => "Extremitäten",
    Schlaf => "Schlaf",
    Traeume => "Träume",
    Frost => "Frost",
    Fieber => "Fieber",
    Schweiss => "Schweiß",
    Haut => "Haut",
    NichtAnwendbar => "Nicht anwendbar",
}

impl SubCategory {
    pub const NOT_APPLICABLE_LABEL: &'static str = "Nicht anwendbar";

    pub fn is_applicable(&self) -> bool {
        !matches!(self, Self::NichtAnwendbar)
    }
}

impl fmt::Display for SubCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|category| category.as_str() == s.trim())
            .ok_or_else(|| format!("Unknown sub category '{s}'"))
    }
}

/// Corpus `category` value a search is restricted to.
///
/// Body symptoms filter on the sub category, everything else on the upper one.
pub fn corpus_filter_label(upper: UpperCategory, sub: SubCategory) -> &'static str {
    if upper.is_body() {
        sub.as_str()
    } else {
        upper.as_str()
    }
}
