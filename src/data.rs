use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// Type aliases for clarity
pub type UnitId = u32;
pub type DecimalHour = f64;
pub type Hours = u32;

/// Subjects a teacher can be ticked for.
pub const SUBJECT_CATALOGUE: [&str; 16] = [
    "Mathématiques",
    "Français",
    "Histoire",
    "Géographie",
    "Sciences",
    "Physique",
    "Chimie",
    "Biologie",
    "Anglais",
    "Espagnol",
    "Allemand",
    "Sport",
    "Arts Plastiques",
    "Musique",
    "Technologie",
    "Informatique",
];

/// Sent in place of an empty subject selection.
pub const GENERAL_SUBJECT: &str = "Matière générale";

pub const DEFAULT_HEADCOUNT: u32 = 25;
pub const DEFAULT_WEEKLY_HOURS: u32 = 25;
pub const DEFAULT_CAPACITY: u32 = 30;

pub const HEADCOUNT_RANGE: (u32, u32) = (1, 50);
pub const WEEKLY_HOURS_RANGE: (u32, u32) = (1, 35);
pub const CAPACITY_RANGE: (u32, u32) = (1, 100);

/// A day of the fixed seven-day week. The French labels are the wire values
/// the scheduling service speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub enum Day {
    #[serde(rename = "Lundi")]
    Monday,
    #[serde(rename = "Mardi")]
    Tuesday,
    #[serde(rename = "Mercredi")]
    Wednesday,
    #[serde(rename = "Jeudi")]
    Thursday,
    #[serde(rename = "Vendredi")]
    Friday,
    #[serde(rename = "Samedi")]
    Saturday,
    #[serde(rename = "Dimanche")]
    Sunday,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    pub const WORKWEEK: [Day; 5] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Day::Monday => "Lundi",
            Day::Tuesday => "Mardi",
            Day::Wednesday => "Mercredi",
            Day::Thursday => "Jeudi",
            Day::Friday => "Vendredi",
            Day::Saturday => "Samedi",
            Day::Sunday => "Dimanche",
        }
    }

    pub fn from_label(label: &str) -> Option<Day> {
        Day::ALL.into_iter().find(|day| day.label() == label)
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The daily operating window, in decimal hours.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    pub start_hour: DecimalHour,
    pub end_hour: DecimalHour,
}

/// The three kinds of repeatable form unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Teacher,
    Class,
    Room,
}

impl UnitKind {
    pub fn slug(self) -> &'static str {
        match self {
            UnitKind::Teacher => "teacher",
            UnitKind::Class => "class",
            UnitKind::Room => "room",
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// A teacher card and the subjects currently ticked on it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Teacher {
    pub id: UnitId,
    #[serde(default)]
    pub subjects: Vec<String>,
}

/// A class card. Fields hold the raw input text; they are only parsed when a
/// submission is assembled.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassGroup {
    pub id: UnitId,
    #[serde(default, deserialize_with = "raw_field")]
    pub headcount: Option<String>,
    #[serde(default, deserialize_with = "raw_field")]
    pub weekly_hours: Option<String>,
}

/// A room card, raw capacity text included.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Room {
    pub id: UnitId,
    #[serde(default, deserialize_with = "raw_field")]
    pub capacity: Option<String>,
}

/// Card fields arrive as text from the page but as bare numbers from a
/// hand-written form file. Anything else reads as missing.
fn raw_field<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Integer(i64),
        Float(f64),
        Text(String),
        Other(IgnoredAny),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Integer(value)) => Some(value.to_string()),
        Some(Raw::Float(value)) => Some(value.to_string()),
        Some(Raw::Text(text)) => Some(text),
        Some(Raw::Other(_)) | None => None,
    })
}

/// Name the service gives the class sent at `index` of the submitted list.
pub fn class_name(index: usize) -> String {
    format!("Classe_{}", index + 1)
}

/// Per-class attributes as the service expects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClassLoad {
    #[serde(rename = "effectif")]
    pub headcount: u32,
    #[serde(rename = "heures_semaine")]
    pub weekly_hours: u32,
}

/// Per-room attributes as the service expects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct RoomCapacity {
    #[serde(rename = "capacite")]
    pub capacity: u32,
}

/// The grid-oriented request body.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SubmissionPayload {
    #[serde(rename = "startHour")]
    pub start_hour: DecimalHour,
    #[serde(rename = "endHour")]
    pub end_hour: DecimalHour,
    #[serde(rename = "joursActifs")]
    pub active_days: Vec<Day>,
    #[serde(rename = "nbProfs")]
    pub teacher_count: u32,
    #[serde(rename = "nbClasses")]
    pub class_count: u32,
    #[serde(rename = "nbSalles")]
    pub room_count: u32,
    #[serde(rename = "matieresProfs")]
    pub teacher_subjects: Vec<Vec<String>>,
    #[serde(rename = "effectifsClasses")]
    pub class_loads: Vec<ClassLoad>,
    #[serde(rename = "capacitesSalles")]
    pub room_capacities: Vec<RoomCapacity>,
}

impl SubmissionPayload {
    pub fn time_window(&self) -> TimeWindow {
        TimeWindow {
            start_hour: self.start_hour,
            end_hour: self.end_hour,
        }
    }
}

/// The statistics-oriented request body: per-unit lists collapse to ranges.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StatisticsPayload {
    #[serde(rename = "startHour")]
    pub start_hour: DecimalHour,
    #[serde(rename = "endHour")]
    pub end_hour: DecimalHour,
    #[serde(rename = "nbProfs")]
    pub teacher_count: u32,
    #[serde(rename = "nbClasses")]
    pub class_count: u32,
    #[serde(rename = "nbSalles")]
    pub room_count: u32,
    #[serde(rename = "heuresParSemaine")]
    pub weekly_hours: u32,
    #[serde(rename = "effectifMin")]
    pub headcount_min: u32,
    #[serde(rename = "effectifMax")]
    pub headcount_max: u32,
    #[serde(rename = "capaciteMin")]
    pub capacity_min: u32,
    #[serde(rename = "capaciteMax")]
    pub capacity_max: u32,
    #[serde(rename = "matieresProfs")]
    pub teacher_subjects: Vec<Vec<String>>,
}

/// One scheduled course returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Assignment {
    #[serde(rename = "jour")]
    pub day: String,
    #[serde(rename = "heure")]
    pub slot_label: String,
    #[serde(rename = "professeur")]
    pub teacher: String,
    #[serde(rename = "classe")]
    pub class: String,
    #[serde(rename = "salle")]
    pub room: String,
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} : {} teaches {} in {}",
            self.day, self.slot_label, self.teacher, self.class, self.room
        )
    }
}

/// The scheduling service's success body.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScheduleResult {
    #[serde(rename = "planning")]
    pub assignments: Vec<Assignment>,
    #[serde(rename = "total_cours")]
    pub total_courses: u32,
    #[serde(rename = "total_heures")]
    pub total_hours: Hours,
    #[serde(rename = "heures_par_prof")]
    pub hours_per_teacher: BTreeMap<String, Hours>,
    #[serde(rename = "heures_par_classe")]
    pub hours_per_class: BTreeMap<String, Hours>,
    #[serde(rename = "resume", default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<BTreeMap<String, String>>,
}

/// The service's structured failure body.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn card_fields_accept_numbers_or_text() {
        let class: ClassGroup =
            serde_json::from_value(json!({"id": 1, "headcount": 30, "weeklyHours": "20"})).unwrap();
        assert_eq!(class.headcount.as_deref(), Some("30"));
        assert_eq!(class.weekly_hours.as_deref(), Some("20"));

        let room: Room = serde_json::from_value(json!({"id": 2, "capacity": true})).unwrap();
        assert_eq!(room.capacity, None);
        let room: Room = serde_json::from_value(json!({"id": 3, "capacity": null})).unwrap();
        assert_eq!(room.capacity, None);
        let room: Room = serde_json::from_value(json!({"id": 4})).unwrap();
        assert_eq!(room.capacity, None);
    }

    #[test]
    fn days_use_french_wire_labels() {
        let encoded = serde_json::to_value(Day::ALL).unwrap();
        assert_eq!(
            encoded,
            json!(["Lundi", "Mardi", "Mercredi", "Jeudi", "Vendredi", "Samedi", "Dimanche"])
        );
        assert_eq!(Day::from_label("Jeudi"), Some(Day::Thursday));
        assert_eq!(Day::from_label("Thursday"), None);
    }

    #[test]
    fn payload_serializes_with_service_field_names() {
        let payload = SubmissionPayload {
            start_hour: 8.5,
            end_hour: 17.0,
            active_days: vec![Day::Monday],
            teacher_count: 1,
            class_count: 1,
            room_count: 1,
            teacher_subjects: vec![vec![GENERAL_SUBJECT.to_string()]],
            class_loads: vec![ClassLoad { headcount: 25, weekly_hours: 20 }],
            room_capacities: vec![RoomCapacity { capacity: 30 }],
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["startHour"], json!(8.5));
        assert_eq!(value["joursActifs"], json!(["Lundi"]));
        assert_eq!(value["nbSalles"], json!(1));
        assert_eq!(value["matieresProfs"], json!([["Matière générale"]]));
        assert_eq!(value["effectifsClasses"], json!([{"effectif": 25, "heures_semaine": 20}]));
        assert_eq!(value["capacitesSalles"], json!([{"capacite": 30}]));
    }

    #[test]
    fn schedule_result_decodes_without_summary() {
        let body = json!({
            "planning": [{
                "jour": "Lundi", "heure": "08:00-09:00",
                "professeur": "Prof_1", "classe": "Classe_1", "salle": "Salle_1"
            }],
            "total_cours": 1,
            "total_heures": 1,
            "heures_par_prof": {"Prof_1": 1},
            "heures_par_classe": {"Classe_1": 1}
        });

        let result: ScheduleResult = serde_json::from_value(body).unwrap();
        assert_eq!(result.assignments[0].teacher, "Prof_1");
        assert_eq!(result.hours_per_class["Classe_1"], 1);
        assert!(result.summary.is_none());
    }
}
