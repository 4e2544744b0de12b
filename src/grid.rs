use crate::data::{Assignment, Day, DecimalHour};
use crate::time_window::format_hhmm;
use log::{trace, warn};
use std::collections::{BTreeMap, HashMap};

/// Width of a regular slot, in hours. The last slot of a day may be shorter.
pub const SLOT_WIDTH: DecimalHour = 1.0;

/// One row of the timetable: `[start, end)` in decimal hours.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub start: DecimalHour,
    pub end: DecimalHour,
    pub label: String,
}

/// Cuts `[start_hour, end_hour)` into one-hour slots labelled `HH:MM-HH:MM`.
///
/// An empty or inverted window yields no slots.
pub fn generate_slots(start_hour: DecimalHour, end_hour: DecimalHour) -> Vec<Slot> {
    let mut slots = Vec::new();
    if !start_hour.is_finite() || !end_hour.is_finite() {
        return slots;
    }

    // slot starts derive from the index, never from a running sum
    let mut index = 0u32;
    loop {
        let cursor = start_hour + f64::from(index) * SLOT_WIDTH;
        if cursor >= end_hour {
            break;
        }
        let end = (cursor + SLOT_WIDTH).min(end_hour);
        slots.push(Slot {
            start: cursor,
            end,
            label: format!("{}-{}", format_hhmm(cursor), format_hhmm(end)),
        });
        index += 1;
    }
    slots
}

/// Day × slot view of a schedule. Every day of the week gets a column
/// skeleton; cells keep the order assignments arrived in.
#[derive(Debug, Clone, PartialEq)]
pub struct TimetableGrid {
    slots: Vec<Slot>,
    cells: BTreeMap<Day, Vec<Vec<Assignment>>>,
    dropped: usize,
}

impl TimetableGrid {
    pub fn build(
        start_hour: DecimalHour,
        end_hour: DecimalHour,
        assignments: &[Assignment],
    ) -> Self {
        let slots = generate_slots(start_hour, end_hour);
        let slot_index: HashMap<&str, usize> = slots
            .iter()
            .enumerate()
            .map(|(i, slot)| (slot.label.as_str(), i))
            .collect();

        let mut cells: BTreeMap<Day, Vec<Vec<Assignment>>> = Day::ALL
            .into_iter()
            .map(|day| (day, vec![Vec::new(); slots.len()]))
            .collect();

        let mut dropped = 0;
        for assignment in assignments {
            let day = Day::from_label(&assignment.day);
            let index = slot_index.get(assignment.slot_label.as_str());
            match (day, index) {
                (Some(day), Some(&index)) => {
                    if let Some(column) = cells.get_mut(&day) {
                        column[index].push(assignment.clone());
                    }
                }
                _ => {
                    trace!("No grid cell for assignment: {}", assignment);
                    dropped += 1;
                }
            }
        }

        if dropped > 0 {
            warn!(
                "{} of {} assignments did not match the {} generated slots and were left out",
                dropped,
                assignments.len(),
                slots.len()
            );
        }

        Self { slots, cells, dropped }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Assignments bucketed at `(day, label)`, or `None` if that cell is not
    /// part of the skeleton.
    pub fn cell(&self, day: Day, label: &str) -> Option<&[Assignment]> {
        let index = self.slots.iter().position(|slot| slot.label == label)?;
        self.cells.get(&day).map(|column| column[index].as_slice())
    }

    /// Days holding at least one assignment, in week order.
    pub fn visible_days(&self) -> Vec<Day> {
        self.cells
            .iter()
            .filter(|(_, column)| column.iter().any(|cell| !cell.is_empty()))
            .map(|(day, _)| *day)
            .collect()
    }

    /// Number of assignments placed in a cell.
    pub fn placed(&self) -> usize {
        self.cells.values().flatten().map(Vec::len).sum()
    }

    /// Number of assignments whose day or slot matched no cell.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn assignment(day: &str, slot: &str, class: &str) -> Assignment {
        Assignment {
            day: day.to_string(),
            slot_label: slot.to_string(),
            teacher: "Prof_1".to_string(),
            class: class.to_string(),
            room: "Salle_1".to_string(),
        }
    }

    fn labels(slots: &[Slot]) -> Vec<&str> {
        slots.iter().map(|slot| slot.label.as_str()).collect()
    }

    #[test]
    fn partial_final_slot() {
        let slots = generate_slots(8.5, 10.25);
        assert_eq!(labels(&slots), vec!["08:30-09:30", "09:30-10:15"]);
    }

    #[test]
    fn slots_are_contiguous_and_cover_the_window() {
        let slots = generate_slots(6.75, 22.5);
        assert_eq!(slots.first().unwrap().start, 6.75);
        assert_eq!(slots.last().unwrap().end, 22.5);
        for pair in slots.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert_eq!(slots.len(), 16);
    }

    #[test]
    fn whole_hour_window() {
        let slots = generate_slots(8.0, 11.0);
        assert_eq!(labels(&slots), vec!["08:00-09:00", "09:00-10:00", "10:00-11:00"]);
    }

    #[test]
    fn empty_or_inverted_window_has_no_slots() {
        assert!(generate_slots(9.0, 9.0).is_empty());
        assert!(generate_slots(12.0, 9.0).is_empty());
        assert!(generate_slots(f64::NAN, 9.0).is_empty());
    }

    #[test]
    fn matching_assignments_land_in_exactly_one_cell() {
        let assignments = vec![
            assignment("Lundi", "08:00-09:00", "Classe_1"),
            assignment("Lundi", "08:00-09:00", "Classe_2"),
            assignment("Mercredi", "09:00-10:00", "Classe_1"),
        ];
        let grid = TimetableGrid::build(8.0, 10.0, &assignments);

        let cell = grid.cell(Day::Monday, "08:00-09:00").unwrap();
        assert_eq!(cell.len(), 2);
        assert_eq!(cell[0].class, "Classe_1");
        assert_eq!(cell[1].class, "Classe_2");
        assert_eq!(grid.cell(Day::Wednesday, "09:00-10:00").unwrap().len(), 1);
        assert_eq!(grid.placed(), 3);
        assert_eq!(grid.dropped(), 0);
    }

    #[test]
    fn mismatched_assignments_are_dropped() {
        let assignments = vec![
            assignment("Lundi", "07:00-08:00", "Classe_1"),
            assignment("Funday", "08:00-09:00", "Classe_1"),
            assignment("Mardi", "08:00-09:00", "Classe_1"),
        ];
        let grid = TimetableGrid::build(8.0, 10.0, &assignments);
        assert_eq!(grid.placed(), 1);
        assert_eq!(grid.dropped(), 2);
        assert!(grid.cell(Day::Monday, "07:00-08:00").is_none());
    }

    #[test]
    fn only_occupied_days_are_visible_but_all_slots_remain() {
        let assignments = vec![
            assignment("Vendredi", "08:00-09:00", "Classe_1"),
            assignment("Mardi", "09:00-10:00", "Classe_1"),
        ];
        let grid = TimetableGrid::build(8.0, 12.0, &assignments);
        assert_eq!(grid.visible_days(), vec![Day::Tuesday, Day::Friday]);
        assert_eq!(grid.slots().len(), 4);
        assert_eq!(grid.cell(Day::Friday, "11:00-12:00"), Some(&[][..]));
    }

    /// Quarter-hour windows with `6:00 <= start < end <= 23:00`.
    fn quarter_window() -> impl Strategy<Value = (DecimalHour, DecimalHour)> {
        (24u32..92)
            .prop_flat_map(|start| (Just(start), start + 1..=92))
            .prop_map(|(start, end)| (f64::from(start) / 4.0, f64::from(end) / 4.0))
    }

    proptest! {
        #[test]
        fn slots_tile_any_quarter_window((start, end) in quarter_window()) {
            let slots = generate_slots(start, end);
            prop_assert!(!slots.is_empty());
            prop_assert_eq!(slots[0].start, start);
            prop_assert_eq!(slots[slots.len() - 1].end, end);
            for pair in slots.windows(2) {
                prop_assert_eq!(pair[0].end, pair[1].start);
                prop_assert_eq!(pair[0].end - pair[0].start, SLOT_WIDTH);
            }
        }

        #[test]
        fn every_assignment_is_placed_once_or_dropped(
            (start, end) in quarter_window(),
            picks in prop::collection::vec((0usize..8, 0usize..24), 0..40)
        ) {
            let slots = generate_slots(start, end);
            let assignments: Vec<Assignment> = picks
                .iter()
                .enumerate()
                .map(|(i, &(day, slot))| {
                    let day = Day::ALL.get(day).map_or("Funday", |day| day.label());
                    let slot = slots.get(slot).map_or("25:00-26:00", |slot| slot.label.as_str());
                    assignment(day, slot, &format!("Classe_{}", i + 1))
                })
                .collect();
            let grid = TimetableGrid::build(start, end, &assignments);

            let mut matching = 0;
            for (i, &(day, slot)) in picks.iter().enumerate() {
                let class = format!("Classe_{}", i + 1);
                let hits: usize = Day::ALL
                    .into_iter()
                    .flat_map(|day| slots.iter().map(move |slot| (day, slot.label.as_str())))
                    .filter_map(|(day, label)| grid.cell(day, label))
                    .map(|cell| cell.iter().filter(|a| a.class == class).count())
                    .sum();
                let expected = usize::from(day < Day::ALL.len() && slot < slots.len());
                prop_assert_eq!(hits, expected);
                matching += expected;
            }
            prop_assert_eq!(grid.placed(), matching);
            prop_assert_eq!(grid.placed() + grid.dropped(), assignments.len());
        }
    }
}
