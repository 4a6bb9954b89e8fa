use super::{N_SLOTS, Weekday};
use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Weekly grid of optional entries: one row per weekday, one cell per hourly
/// slot. Serialises as `{"Monday": [..], "Tuesday": [..], ...}` in weekday
/// order.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekGrid<T> {
    days: Vec<Vec<Option<T>>>,
}

impl<T> Default for WeekGrid<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> WeekGrid<T> {
    pub fn new() -> Self {
        let days = Weekday::ALL
            .iter()
            .map(|_| (0..N_SLOTS).map(|_| None).collect())
            .collect();
        WeekGrid { days }
    }

    pub fn get(&self, day: Weekday, slot_idx: usize) -> Option<&T> {
        self.days[day.index()].get(slot_idx).and_then(|c| c.as_ref())
    }

    pub fn day(&self, day: Weekday) -> &[Option<T>] {
        &self.days[day.index()]
    }

    /// All `duration` cells starting at `slot_idx` are empty and in range.
    pub fn is_free(&self, day: Weekday, slot_idx: usize, duration: usize) -> bool {
        slot_idx + duration <= N_SLOTS
            && (0..duration).all(|j| self.days[day.index()][slot_idx + j].is_none())
    }

    pub fn occupied(&self, day: Weekday) -> usize {
        self.days[day.index()].iter().filter(|c| c.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.days.iter().all(|d| d.iter().all(|c| c.is_none()))
    }

    /// Iterate `(day, slot, entry)` over occupied cells.
    pub fn entries(&self) -> impl Iterator<Item = (Weekday, usize, &T)> + '_ {
        Weekday::ALL.into_iter().flat_map(move |day| {
            self.days[day.index()]
                .iter()
                .enumerate()
                .filter_map(move |(i, c)| c.as_ref().map(|v| (day, i, v)))
        })
    }
}

impl<T: Clone> WeekGrid<T> {
    /// Fill `duration` cells starting at `slot_idx` with `value`.
    pub fn fill(&mut self, day: Weekday, slot_idx: usize, duration: usize, value: &T) {
        for j in 0..duration {
            if let Some(cell) = self.days[day.index()].get_mut(slot_idx + j) {
                *cell = Some(value.clone());
            }
        }
    }
}

impl<T: Serialize> Serialize for WeekGrid<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.days.len()))?;
        for day in Weekday::ALL {
            map.serialize_entry(day.as_str(), &self.days[day.index()])?;
        }
        map.end()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for WeekGrid<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: HashMap<String, Vec<Option<T>>> = HashMap::deserialize(deserializer)?;
        let mut grid = WeekGrid::new();
        for (key, cells) in raw {
            let Some(day) = Weekday::parse(&key) else { continue };
            for (i, cell) in cells.into_iter().take(N_SLOTS).enumerate() {
                grid.days[day.index()][i] = cell;
            }
        }
        Ok(grid)
    }
}
