use crate::data::{
    ClassGroup, DEFAULT_CAPACITY, DEFAULT_HEADCOUNT, DEFAULT_WEEKLY_HOURS, Room, Teacher, UnitId,
    UnitKind,
};
use crate::ids::lowest_free_id;
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Shared shape of teacher, class and room cards.
pub trait RepeatableUnit {
    const KIND: UnitKind;

    /// A fresh unit carrying the kind's default attributes.
    fn with_id(id: UnitId) -> Self;

    fn id(&self) -> UnitId;

    fn set_id(&mut self, id: UnitId);
}

impl RepeatableUnit for Teacher {
    const KIND: UnitKind = UnitKind::Teacher;

    fn with_id(id: UnitId) -> Self {
        Teacher {
            id,
            subjects: Vec::new(),
        }
    }

    fn id(&self) -> UnitId {
        self.id
    }

    fn set_id(&mut self, id: UnitId) {
        self.id = id;
    }
}

impl RepeatableUnit for ClassGroup {
    const KIND: UnitKind = UnitKind::Class;

    fn with_id(id: UnitId) -> Self {
        ClassGroup {
            id,
            headcount: Some(DEFAULT_HEADCOUNT.to_string()),
            weekly_hours: Some(DEFAULT_WEEKLY_HOURS.to_string()),
        }
    }

    fn id(&self) -> UnitId {
        self.id
    }

    fn set_id(&mut self, id: UnitId) {
        self.id = id;
    }
}

impl RepeatableUnit for Room {
    const KIND: UnitKind = UnitKind::Room;

    fn with_id(id: UnitId) -> Self {
        Room {
            id,
            capacity: Some(DEFAULT_CAPACITY.to_string()),
        }
    }

    fn id(&self) -> UnitId {
        self.id
    }

    fn set_id(&mut self, id: UnitId) {
        self.id = id;
    }
}

/// The live units of one kind, in the order they were added.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitCollection<T> {
    units: Vec<T>,
}

impl<T> Default for UnitCollection<T> {
    fn default() -> Self {
        Self { units: Vec::new() }
    }
}

impl<T: RepeatableUnit> UnitCollection<T> {
    /// Takes units captured elsewhere. The first unit holding a positive id
    /// keeps it; a zero or repeated id moves to the lowest id still free.
    pub fn from_saved(mut units: Vec<T>) -> Self {
        let mut taken = BTreeSet::new();
        let clashing: Vec<usize> = units
            .iter()
            .enumerate()
            .filter(|(_, unit)| unit.id() == 0 || !taken.insert(unit.id()))
            .map(|(index, _)| index)
            .collect();

        for index in clashing {
            let id = lowest_free_id(taken.iter().copied());
            warn!(
                "Saved {} id {} is zero or repeated, reassigned to {}",
                T::KIND,
                units[index].id(),
                id
            );
            units[index].set_id(id);
            taken.insert(id);
        }
        Self { units }
    }

    pub fn add(&mut self) -> UnitId {
        let id = lowest_free_id(self.units.iter().map(RepeatableUnit::id));
        trace!("Allocated {} id {} next to {:?}", T::KIND, id, self.ids());
        self.units.push(T::with_id(id));
        id
    }

    /// Returns whether a unit was removed; an unknown id is not an error.
    pub fn remove(&mut self, id: UnitId) -> bool {
        let before = self.units.len();
        self.units.retain(|unit| unit.id() != id);
        self.units.len() != before
    }

    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut T> {
        self.units.iter_mut().find(|unit| unit.id() == id)
    }

    pub fn ids(&self) -> Vec<UnitId> {
        self.units.iter().map(RepeatableUnit::id).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.units.iter()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl<T> FromIterator<T> for UnitCollection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            units: iter.into_iter().collect(),
        }
    }
}

/// The visible per-kind counters the form submits alongside the units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct UnitCounts {
    pub teachers: u32,
    pub classes: u32,
    pub rooms: u32,
}

/// Owns the teacher, class and room collections of a session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitRegistry {
    teachers: UnitCollection<Teacher>,
    classes: UnitCollection<ClassGroup>,
    rooms: UnitCollection<Room>,
    counts: UnitCounts,
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from previously captured units, e.g. a saved form.
    /// Ids come out unique and positive within each kind.
    pub fn from_units(teachers: Vec<Teacher>, classes: Vec<ClassGroup>, rooms: Vec<Room>) -> Self {
        let mut registry = Self {
            teachers: UnitCollection::from_saved(teachers),
            classes: UnitCollection::from_saved(classes),
            rooms: UnitCollection::from_saved(rooms),
            counts: UnitCounts::default(),
        };
        registry.sync_counts();
        registry
    }

    pub fn add(&mut self, kind: UnitKind) -> UnitId {
        let id = match kind {
            UnitKind::Teacher => self.teachers.add(),
            UnitKind::Class => self.classes.add(),
            UnitKind::Room => self.rooms.add(),
        };
        self.sync_counts();
        debug!("Added {} {} ({} live)", kind, id, self.count(kind));
        id
    }

    pub fn remove(&mut self, kind: UnitKind, id: UnitId) -> bool {
        let removed = match kind {
            UnitKind::Teacher => self.teachers.remove(id),
            UnitKind::Class => self.classes.remove(id),
            UnitKind::Room => self.rooms.remove(id),
        };
        self.sync_counts();
        if removed {
            debug!("Removed {} {} ({} live)", kind, id, self.count(kind));
        } else {
            trace!("Ignoring removal of unknown {} {}", kind, id);
        }
        removed
    }

    pub fn count(&self, kind: UnitKind) -> u32 {
        match kind {
            UnitKind::Teacher => self.counts.teachers,
            UnitKind::Class => self.counts.classes,
            UnitKind::Room => self.counts.rooms,
        }
    }

    pub fn counts(&self) -> UnitCounts {
        self.counts
    }

    pub fn ids(&self, kind: UnitKind) -> Vec<UnitId> {
        match kind {
            UnitKind::Teacher => self.teachers.ids(),
            UnitKind::Class => self.classes.ids(),
            UnitKind::Room => self.rooms.ids(),
        }
    }

    pub fn teachers(&self) -> &UnitCollection<Teacher> {
        &self.teachers
    }

    pub fn classes(&self) -> &UnitCollection<ClassGroup> {
        &self.classes
    }

    pub fn rooms(&self) -> &UnitCollection<Room> {
        &self.rooms
    }

    pub fn teacher_mut(&mut self, id: UnitId) -> Option<&mut Teacher> {
        self.teachers.get_mut(id)
    }

    pub fn class_mut(&mut self, id: UnitId) -> Option<&mut ClassGroup> {
        self.classes.get_mut(id)
    }

    pub fn room_mut(&mut self, id: UnitId) -> Option<&mut Room> {
        self.rooms.get_mut(id)
    }

    /// Recomputes the visible counters from the live collections.
    pub fn sync_counts(&mut self) {
        self.counts = UnitCounts {
            teachers: self.teachers.len() as u32,
            classes: self.classes.len() as u32,
            rooms: self.rooms.len() as u32,
        };
    }
}
