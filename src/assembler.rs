use crate::data::{
    CAPACITY_RANGE, ClassLoad, DEFAULT_CAPACITY, DEFAULT_HEADCOUNT, DEFAULT_WEEKLY_HOURS,
    GENERAL_SUBJECT, HEADCOUNT_RANGE, RoomCapacity, StatisticsPayload, SubmissionPayload,
    UnitKind, WEEKLY_HOURS_RANGE,
};
use crate::error::ValidationError;
use crate::session::FormState;
use itertools::{Itertools, MinMaxResult};
use log::{debug, trace};

/// Turns the form into the request body, or names the first rule it breaks.
///
/// Rules are checked in order: teachers, classes, rooms, working days, then
/// the time window. Per-unit attributes never reject; a missing or
/// unparseable value falls back to its default.
pub fn assemble(form: &FormState) -> Result<SubmissionPayload, ValidationError> {
    let units = &form.units;
    if units.count(UnitKind::Teacher) == 0 {
        return Err(ValidationError::NoTeachers);
    }
    if units.count(UnitKind::Class) == 0 {
        return Err(ValidationError::NoClasses);
    }
    if units.count(UnitKind::Room) == 0 {
        return Err(ValidationError::NoRooms);
    }
    if form.days.is_empty() {
        return Err(ValidationError::NoWorkingDays);
    }

    let window = form.time.to_window();
    if window.start_hour >= window.end_hour {
        return Err(ValidationError::InvalidTimeWindow {
            start: window.start_hour,
            end: window.end_hour,
        });
    }

    let teacher_subjects = units
        .teachers()
        .iter()
        .map(|teacher| {
            if teacher.subjects.is_empty() {
                trace!("Teacher {} has no subject, sending the general one", teacher.id);
                vec![GENERAL_SUBJECT.to_string()]
            } else {
                teacher.subjects.clone()
            }
        })
        .collect();

    let class_loads = units
        .classes()
        .iter()
        .map(|class| ClassLoad {
            headcount: parse_bounded(
                class.headcount.as_deref(),
                HEADCOUNT_RANGE,
                DEFAULT_HEADCOUNT,
            ),
            weekly_hours: parse_bounded(
                class.weekly_hours.as_deref(),
                WEEKLY_HOURS_RANGE,
                DEFAULT_WEEKLY_HOURS,
            ),
        })
        .collect();

    let room_capacities = units
        .rooms()
        .iter()
        .map(|room| RoomCapacity {
            capacity: parse_bounded(room.capacity.as_deref(), CAPACITY_RANGE, DEFAULT_CAPACITY),
        })
        .collect();

    let payload = SubmissionPayload {
        start_hour: window.start_hour,
        end_hour: window.end_hour,
        active_days: form.days.iter().copied().collect(),
        teacher_count: units.count(UnitKind::Teacher),
        class_count: units.count(UnitKind::Class),
        room_count: units.count(UnitKind::Room),
        teacher_subjects,
        class_loads,
        room_capacities,
    };
    debug!("Assembled payload: {:?}", payload);
    Ok(payload)
}

/// Parses an integer field, keeping it only when it lies in `range`.
pub fn parse_bounded(raw: Option<&str>, range: (u32, u32), default: u32) -> u32 {
    let (min, max) = range;
    raw.and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|value| (min..=max).contains(value))
        .unwrap_or(default)
}

/// Collapses per-unit lists into the ranges the statistics contract expects.
pub fn to_statistics(payload: &SubmissionPayload) -> StatisticsPayload {
    let (headcount_min, headcount_max) =
        bounds(payload.class_loads.iter().map(|load| load.headcount), DEFAULT_HEADCOUNT);
    let (capacity_min, capacity_max) =
        bounds(payload.room_capacities.iter().map(|room| room.capacity), DEFAULT_CAPACITY);
    let weekly_hours = payload
        .class_loads
        .iter()
        .map(|load| load.weekly_hours)
        .max()
        .unwrap_or(DEFAULT_WEEKLY_HOURS);

    StatisticsPayload {
        start_hour: payload.start_hour,
        end_hour: payload.end_hour,
        teacher_count: payload.teacher_count,
        class_count: payload.class_count,
        room_count: payload.room_count,
        weekly_hours,
        headcount_min,
        headcount_max,
        capacity_min,
        capacity_max,
        teacher_subjects: payload.teacher_subjects.clone(),
    }
}

fn bounds(values: impl Iterator<Item = u32>, default: u32) -> (u32, u32) {
    match values.minmax() {
        MinMaxResult::NoElements => (default, default),
        MinMaxResult::OneElement(value) => (value, value),
        MinMaxResult::MinMax(min, max) => (min, max),
    }
}
