use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// A named prayer-time field of a calendar day.
///
/// Display names match the labels users see (`"Jumua 2"`, `"Fajr Iqama"`).
/// Declaration order is the display order of a full day.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
pub enum PrayerField {
    Fajr,
    Shurouq,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
    Jumua,
    #[strum(serialize = "Jumua 2")]
    #[serde(rename = "Jumua 2")]
    Jumua2,
    #[strum(serialize = "Fajr Iqama")]
    #[serde(rename = "Fajr Iqama")]
    FajrIqama,
    #[strum(serialize = "Shurouq Iqama")]
    #[serde(rename = "Shurouq Iqama")]
    ShurouqIqama,
    #[strum(serialize = "Dhuhr Iqama")]
    #[serde(rename = "Dhuhr Iqama")]
    DhuhrIqama,
    #[strum(serialize = "Asr Iqama")]
    #[serde(rename = "Asr Iqama")]
    AsrIqama,
    #[strum(serialize = "Maghrib Iqama")]
    #[serde(rename = "Maghrib Iqama")]
    MaghribIqama,
    #[strum(serialize = "Isha Iqama")]
    #[serde(rename = "Isha Iqama")]
    IshaIqama,
}

impl PrayerField {
    /// Adhan fields eligible as "next prayer", in tie-break priority order.
    pub const ADHAN: [Self; 7] = [
        Self::Fajr,
        Self::Dhuhr,
        Self::Asr,
        Self::Maghrib,
        Self::Isha,
        Self::Jumua,
        Self::Jumua2,
    ];

    /// The six daily calendar entries, in the order the service lists them.
    pub const DAILY: [Self; 6] = [
        Self::Fajr,
        Self::Shurouq,
        Self::Dhuhr,
        Self::Asr,
        Self::Maghrib,
        Self::Isha,
    ];

    pub fn is_adhan(self) -> bool {
        self.priority().is_some()
    }

    pub fn is_iqama(self) -> bool {
        matches!(
            self,
            Self::FajrIqama
                | Self::ShurouqIqama
                | Self::DhuhrIqama
                | Self::AsrIqama
                | Self::MaghribIqama
                | Self::IshaIqama
        )
    }

    /// Position in [`ADHAN`](Self::ADHAN); lower wins a tie on time.
    pub fn priority(self) -> Option<usize> {
        Self::ADHAN.iter().position(|f| *f == self)
    }

    /// The iqama field that follows this adhan, if the service publishes one.
    pub fn iqama(self) -> Option<Self> {
        match self {
            Self::Fajr => Some(Self::FajrIqama),
            Self::Dhuhr => Some(Self::DhuhrIqama),
            Self::Asr => Some(Self::AsrIqama),
            Self::Maghrib => Some(Self::MaghribIqama),
            Self::Isha => Some(Self::IshaIqama),
            _ => None,
        }
    }
}
