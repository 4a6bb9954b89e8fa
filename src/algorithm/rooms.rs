// Room pools available to the scheduler.

pub const CLASSROOMS: [&str; 7] = ["CR-302", "CR-303", "CR-304", "CR-305", "CR-306", "CR-401", "CR-402"];
pub const LABS: [&str; 6] = ["CL-404", "CL-405", "CL-406", "CL-407", "CL-403", "CL-402"];
pub const SINGLE_LABS: [&str; 3] = ["CC-101", "CC-102", "CC-103"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomPool {
    Classrooms,
    Labs,
    /// Smaller labs for practicals taught to a single batch.
    SingleLabs,
}

impl RoomPool {
    pub fn rooms(self) -> &'static [&'static str] {
        match self {
            RoomPool::Classrooms => &CLASSROOMS,
            RoomPool::Labs => &LABS,
            RoomPool::SingleLabs => &SINGLE_LABS,
        }
    }

    pub fn noun(self) -> &'static str {
        match self {
            RoomPool::Classrooms => "classroom",
            RoomPool::Labs | RoomPool::SingleLabs => "lab",
        }
    }
}

pub fn all_rooms() -> impl Iterator<Item = &'static str> {
    CLASSROOMS.iter().chain(LABS.iter()).chain(SINGLE_LABS.iter()).copied()
}

/// Floor of a room: first digit after the dash (`"CR-302"` -> 3).
pub fn floor_of(room: &str) -> Option<u32> {
    room.split('-').nth(1)?.chars().next()?.to_digit(10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floors() {
        assert_eq!(floor_of("CR-302"), Some(3));
        assert_eq!(floor_of("CC-101"), Some(1));
        assert_eq!(floor_of("LAB"), None);
        assert_eq!(floor_of("X-A1"), None);
    }

    #[test]
    fn rooms_are_unique() {
        let mut all: Vec<&str> = all_rooms().collect();
        let n = all.len();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), n);
    }
}
