use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Number of slots in each fixed-size list of a [`DailyEntry`].
pub const SLOTS: usize = 3;

/// Positional tags of `midday.caught`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaughtFlag {
    Complaining,
    Comparing,
    Criticizing,
}

impl CaughtFlag {
    pub fn index(self) -> usize {
        match self {
            CaughtFlag::Complaining => 0,
            CaughtFlag::Comparing => 1,
            CaughtFlag::Criticizing => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct Morning {
    pub gratitude: [String; SLOTS],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct Midday {
    pub caught: [bool; SLOTS],
    pub reframe: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Night {
    pub went_well: String,
    pub handled: String,
    pub improve: String,
}

/// One calendar day's reflections.
///
/// Decoding never fails on shape: missing or mistyped fields fall back to
/// their empty form, short lists are padded and long lists are cut to
/// [`SLOTS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct DailyEntry {
    pub morning: Morning,
    pub midday: Midday,
    pub night: Night,
}

/// A single section of a day, as saved by one of the three daily screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    Morning(Morning),
    Midday(Midday),
    Night(Night),
}

/// Any non-empty string counts, whitespace included.
pub fn is_filled(text: &str) -> bool {
    !text.is_empty()
}

impl Morning {
    pub fn from_value(value: Option<&Value>) -> Self {
        Self {
            gratitude: text_slots(value.and_then(|v| v.get("gratitude"))),
        }
    }

    pub fn filled_count(&self) -> usize {
        self.gratitude.iter().filter(|g| is_filled(g)).count()
    }
}

impl Midday {
    pub fn from_value(value: Option<&Value>) -> Self {
        Self {
            caught: flag_slots(value.and_then(|v| v.get("caught"))),
            reframe: text(value.and_then(|v| v.get("reframe"))),
        }
    }

    pub fn is_caught(&self, flag: CaughtFlag) -> bool {
        self.caught[flag.index()]
    }

    pub fn caught_count(&self) -> usize {
        self.caught.iter().filter(|caught| **caught).count()
    }
}

impl Night {
    pub fn from_value(value: Option<&Value>) -> Self {
        Self {
            went_well: text(value.and_then(|v| v.get("wentWell"))),
            handled: text(value.and_then(|v| v.get("handled"))),
            improve: text(value.and_then(|v| v.get("improve"))),
        }
    }

    pub fn filled_count(&self) -> usize {
        [&self.went_well, &self.handled, &self.improve]
            .into_iter()
            .filter(|field| is_filled(field))
            .count()
    }
}

impl DailyEntry {
    pub fn from_value(value: &Value) -> Self {
        Self {
            morning: Morning::from_value(value.get("morning")),
            midday: Midday::from_value(value.get("midday")),
            night: Night::from_value(value.get("night")),
        }
    }

    /// Returns a copy with one section replaced and the others untouched.
    pub fn with_section(&self, section: Section) -> Self {
        let mut entry = self.clone();
        match section {
            Section::Morning(morning) => entry.morning = morning,
            Section::Midday(midday) => entry.midday = midday,
            Section::Night(night) => entry.night = night,
        }
        entry
    }

    pub fn is_blank(&self) -> bool {
        self.morning.filled_count() == 0
            && self.midday.caught_count() == 0
            && !is_filled(&self.midday.reframe)
            && self.night.filled_count() == 0
    }
}

fn text(value: Option<&Value>) -> String {
    value.and_then(Value::as_str).unwrap_or_default().to_string()
}

fn text_slots(value: Option<&Value>) -> [String; SLOTS] {
    let items = value.and_then(Value::as_array);
    std::array::from_fn(|i| text(items.and_then(|items| items.get(i))))
}

fn flag_slots(value: Option<&Value>) -> [bool; SLOTS] {
    let items = value.and_then(Value::as_array);
    std::array::from_fn(|i| {
        items
            .and_then(|items| items.get(i))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    })
}

macro_rules! lenient_deserialize {
    ($ty:ty, $value:ident => $build:expr) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let $value = Value::deserialize(deserializer)?;
                Ok($build)
            }
        }
    };
}

lenient_deserialize!(Morning, value => Morning::from_value(Some(&value)));
lenient_deserialize!(Midday, value => Midday::from_value(Some(&value)));
lenient_deserialize!(Night, value => Night::from_value(Some(&value)));
lenient_deserialize!(DailyEntry, value => DailyEntry::from_value(&value));

/// Every stored day, keyed by `YYYY-MM-DD`. Persisted as one JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct EntryCollection {
    pub days: BTreeMap<String, DailyEntry>,
}

impl EntryCollection {
    pub fn get(&self, key: &str) -> Option<&DailyEntry> {
        self.days.get(key)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Entries in ascending key order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&String, &DailyEntry)> + ExactSizeIterator {
        self.days.iter()
    }

    pub fn with_entry(&self, key: &str, entry: DailyEntry) -> Self {
        let mut next = self.clone();
        next.days.insert(key.to_string(), entry);
        next
    }

    pub fn without(&self, key: &str) -> Self {
        let mut next = self.clone();
        next.days.remove(key);
        next
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EntryResponse {
    pub date: String,
    pub entry: DailyEntry,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveResponse {
    pub date: String,
    pub entry: Option<DailyEntry>,
    pub persisted: bool,
    pub warning: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub date: String,
    pub gratitude_count: u8,
    pub caught_count: u8,
    pub night_count: u8,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompletionPoint {
    pub date: String,
    pub percent: u8,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ComplaintGratitudePoint {
    pub date: String,
    pub complaint_percent: u8,
    pub gratitude_percent: u8,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub completion: Vec<CompletionPoint>,
    pub complaint_gratitude: Vec<ComplaintGratitudePoint>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CalendarResponse {
    pub filled_dates: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct WindowQuery {
    pub limit: Option<usize>,
}
