//! Deterministic priority-based scheduler.
//!
//! Order of work: electives (shared slot across every division in the
//! group), elective labs, visiting faculty, then core subjects in three
//! passes with progressively relaxed limits. Each pass only retries the
//! sessions the previous one could not place.

use super::constraints::{Limits, Placement};
use super::rooms::{RoomPool, all_rooms, floor_of};
use crate::models::{
    Assignment, Division, FacultySlot, N_SLOTS, SessionKind, Shift, Subject, WeekGrid, Weekday, slot_label,
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Faculty owner recorded for elective slots shared by several divisions.
pub const ELECTIVE_OWNER: &str = "ELECTIVE";

type Diagnostics = BTreeMap<String, BTreeSet<String>>;

/// One concrete session still to be placed.
#[derive(Debug, Clone)]
pub struct SessionUnit<'a> {
    pub division: &'a Division,
    pub subject: &'a Subject,
    pub faculty: String,
    pub duration: usize,
    pub kind: SessionKind,
    /// Zero-based batch index for practicals.
    pub batch: Option<usize>,
    pub single_batch: bool,
}

impl SessionUnit<'_> {
    pub fn describe(&self) -> String {
        let what = match self.kind {
            SessionKind::Theory => "Theory",
            SessionKind::Tutorial => "Tutorial",
            SessionKind::Practical => "Lab",
            SessionKind::Elective => "Elective Theory",
        };
        format!("{} for {} (Faculty: {})", what, self.subject.name, self.faculty)
    }

    fn faculty_missing(&self) -> bool {
        self.faculty.trim().is_empty()
    }

    /// Entry recorded in the unassigned list when the unit cannot be placed.
    pub fn failure(&self) -> String {
        if self.faculty_missing() {
            let what = if self.kind == SessionKind::Practical { "lab" } else { "theory" };
            format!("Faculty not defined for {} of {}", what, self.subject.name)
        } else {
            self.describe()
        }
    }

    fn room_pool(&self) -> RoomPool {
        match (self.kind, self.single_batch) {
            (SessionKind::Practical, true) => RoomPool::SingleLabs,
            (SessionKind::Practical, false) => RoomPool::Labs,
            _ => RoomPool::Classrooms,
        }
    }
}

/// Distinct named lab teachers; an empty list means the theory teacher
/// takes every batch.
fn lab_faculty_count(subject: &Subject) -> usize {
    subject
        .batch_faculty
        .iter()
        .map(|f| f.trim())
        .filter(|f| !f.is_empty())
        .collect::<BTreeSet<_>>()
        .len()
}

/// Expand a subject of a division into session units.
pub fn units_for<'a>(division: &'a Division, subject: &'a Subject, theory: bool, labs: bool) -> Vec<SessionUnit<'a>> {
    let mut out = Vec::new();
    let unit = |faculty: &str, duration: usize, kind: SessionKind, batch: Option<usize>| SessionUnit {
        division,
        subject,
        faculty: faculty.to_string(),
        duration,
        kind,
        batch,
        single_batch: lab_faculty_count(subject) <= 1,
    };

    if theory {
        for _ in 0..subject.theory {
            out.push(unit(&subject.faculty, 1, SessionKind::Theory, None));
        }
        for _ in 0..subject.tutorial {
            out.push(unit(&subject.faculty, 1, SessionKind::Tutorial, None));
        }
    }
    if labs && subject.practical > 0 {
        for b in 0..subject.batches.max(1) as usize {
            let faculty = subject.batch_faculty.get(b).unwrap_or(&subject.faculty);
            for _ in 0..subject.practical / 2 {
                out.push(unit(faculty, 2, SessionKind::Practical, Some(b)));
            }
            if subject.practical % 2 == 1 {
                out.push(unit(faculty, 1, SessionKind::Practical, Some(b)));
            }
        }
    }
    out
}

/// Divisions that share one elective subject and teacher.
#[derive(Debug, Clone)]
pub struct ElectiveGroup<'a> {
    pub elective: u32,
    pub faculty: String,
    pub members: Vec<(&'a Division, &'a Subject)>,
}

impl ElectiveGroup<'_> {
    /// Subject used for the shared theory slots (first member's).
    pub fn subject(&self) -> &Subject {
        self.members[0].1
    }
}

/// Split all subjects into elective groups, visiting-faculty sessions and
/// regular sessions, preserving input order.
pub fn group_sessions(divisions: &[Division]) -> (Vec<ElectiveGroup<'_>>, Vec<SessionUnit<'_>>, Vec<SessionUnit<'_>>) {
    let mut groups: Vec<ElectiveGroup<'_>> = Vec::new();
    let mut group_idx: HashMap<(u32, String), usize> = HashMap::new();
    let mut visiting = Vec::new();
    let mut regular = Vec::new();

    for d in divisions {
        for s in &d.subjects {
            if s.elective > 0 {
                let key = (s.elective, s.faculty.clone());
                match group_idx.get(&key) {
                    Some(&i) => groups[i].members.push((d, s)),
                    None => {
                        group_idx.insert(key, groups.len());
                        groups.push(ElectiveGroup { elective: s.elective, faculty: s.faculty.clone(), members: vec![(d, s)] });
                    }
                }
            } else if s.visiting {
                visiting.extend(units_for(d, s, true, true));
            } else {
                regular.extend(units_for(d, s, true, true));
            }
        }
    }
    (groups, visiting, regular)
}

/// Everything the scheduler produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScheduleOutcome {
    pub division_timetables: BTreeMap<String, WeekGrid<Assignment>>,
    pub faculty_timetables: BTreeMap<String, WeekGrid<FacultySlot>>,
    /// Descriptions of sessions that could not be placed, per division.
    pub unassigned: BTreeMap<String, Vec<String>>,
    /// Sorted unique `(faculty, subject)` pairs per division.
    pub teacher_subject_pairs: BTreeMap<String, Vec<(String, String)>>,
}

impl ScheduleOutcome {
    pub fn unassigned_count(&self) -> usize {
        self.unassigned.values().map(Vec::len).sum()
    }
}

pub struct Scheduler<'a> {
    divisions: &'a [Division],
    limits: Limits,
    timetables: BTreeMap<String, WeekGrid<Assignment>>,
    faculty: BTreeMap<String, WeekGrid<FacultySlot>>,
    rooms: BTreeMap<&'static str, WeekGrid<(String, String)>>,
    unassigned: BTreeMap<String, Vec<String>>,
}

fn note(diag: &mut Option<&mut Diagnostics>, day: Weekday, slot_idx: usize, reason: impl Into<String>) {
    if let Some(d) = diag.as_deref_mut() {
        d.entry(format!("{}, {}", day, slot_label(slot_idx))).or_default().insert(reason.into());
    }
}

fn report(diag: &Diagnostics, header: &str) {
    log::warn!("--- Diagnostic Report for {} ---", header);
    for (slot, reasons) in diag {
        let joined: Vec<&str> = reasons.iter().map(String::as_str).collect();
        log::warn!("  - Slot {}: {}", slot, joined.join(", "));
    }
    log::warn!("--- End of Report ---");
}

fn start_slots(shift: Shift, duration: usize) -> Vec<usize> {
    if duration == 0 || duration > N_SLOTS {
        return Vec::new();
    }
    let last = N_SLOTS - duration;
    match shift {
        Shift::Morning => (0..=last).collect(),
        Shift::Evening => (0..=last).rev().collect(),
    }
}

impl<'a> Scheduler<'a> {
    pub fn new(divisions: &'a [Division], limits: Limits) -> Self {
        let mut faculty = BTreeMap::new();
        for d in divisions {
            for s in &d.subjects {
                for name in std::iter::once(&s.faculty).chain(s.batch_faculty.iter()) {
                    if !name.is_empty() {
                        faculty.entry(name.clone()).or_insert_with(WeekGrid::new);
                    }
                }
            }
        }
        Scheduler {
            divisions,
            limits,
            timetables: divisions.iter().map(|d| (d.division.clone(), WeekGrid::new())).collect(),
            faculty,
            rooms: all_rooms().map(|r| (r, WeekGrid::new())).collect(),
            unassigned: BTreeMap::new(),
        }
    }

    fn faculty_day(&self, name: &str, day: Weekday) -> Option<&[Option<FacultySlot>]> {
        self.faculty.get(name).map(|g| g.day(day))
    }

    fn faculty_free(&self, name: &str, day: Weekday, slot_idx: usize, duration: usize) -> bool {
        self.faculty.get(name).is_none_or(|g| g.is_free(day, slot_idx, duration))
    }

    fn free_room(&self, pool: RoomPool, floors: &[u32], day: Weekday, slot_idx: usize, duration: usize) -> Option<&'static str> {
        pool.rooms().iter().copied().find(|room| {
            if !floors.is_empty() && !floor_of(room).is_some_and(|f| floors.contains(&f)) {
                return false;
            }
            self.rooms.get(room).is_some_and(|g| g.is_free(day, slot_idx, duration))
        })
    }

    fn find_slot(
        &self,
        unit: &SessionUnit<'_>,
        limits: &Limits,
        mut diag: Option<&mut Diagnostics>,
    ) -> Option<(Weekday, usize, &'static str)> {
        let division_grid = self.timetables.get(&unit.division.division)?;
        let pool = unit.room_pool();

        for slot_idx in start_slots(unit.division.morning_or_evening, unit.duration) {
            for day in Weekday::ALL {
                if !self.faculty_free(&unit.faculty, day, slot_idx, unit.duration) {
                    note(&mut diag, day, slot_idx, "Faculty busy");
                    continue;
                }
                if !division_grid.is_free(day, slot_idx, unit.duration) {
                    note(&mut diag, day, slot_idx, "Division busy");
                    continue;
                }
                if unit.subject.outside_vf_window(day, slot_idx, unit.duration) {
                    note(&mut diag, day, slot_idx, "Outside visiting faculty availability");
                    continue;
                }
                let Some(room) = self.free_room(pool, &unit.division.dept_floors, day, slot_idx, unit.duration) else {
                    note(&mut diag, day, slot_idx, format!("No free {}", pool.noun()));
                    continue;
                };
                let placement = Placement { subject: unit.subject, kind: unit.kind, slot_idx, duration: unit.duration };
                if let Err(v) = limits.check(&placement, division_grid.day(day), self.faculty_day(&unit.faculty, day)) {
                    note(&mut diag, day, slot_idx, v.to_string());
                    continue;
                }
                return Some((day, slot_idx, room));
            }
        }
        None
    }

    /// Try to place one unit. On the final pass a per-slot diagnostic report
    /// is logged when nothing fits.
    fn place(&mut self, unit: &SessionUnit<'_>, limits: &Limits, final_pass: bool) -> bool {
        if unit.faculty_missing() {
            log::warn!("{} in {}. Skipping.", unit.failure(), unit.division.division);
            return false;
        }

        let mut diag = Diagnostics::new();
        let found = self.find_slot(unit, limits, if final_pass { Some(&mut diag) } else { None });
        let Some((day, slot_idx, room)) = found else {
            log::error!("FAILED to schedule {}", unit.describe());
            if final_pass {
                report(&diag, &unit.describe());
            }
            return false;
        };

        let assignment = Assignment {
            subject: unit.subject.name.clone(),
            faculty: unit.faculty.clone(),
            room: room.to_string(),
            kind: unit.kind,
            batch: unit.batch.map(|b| format!("Batch {}", b + 1)),
        };
        log::info!(
            "Assigning {} ({}) for {} to {} {} in {}",
            unit.subject.name,
            unit.kind.as_str(),
            unit.division.division,
            day,
            slot_label(slot_idx),
            room
        );
        self.occupy(&[unit.division.division.as_str()], &unit.faculty, &unit.division.division, day, slot_idx, unit.duration, assignment);
        true
    }

    #[allow(clippy::too_many_arguments)]
    fn occupy(
        &mut self,
        divisions: &[&str],
        faculty: &str,
        owner: &str,
        day: Weekday,
        slot_idx: usize,
        duration: usize,
        assignment: Assignment,
    ) {
        for d in divisions {
            if let Some(grid) = self.timetables.get_mut(*d) {
                grid.fill(day, slot_idx, duration, &assignment);
            }
        }
        let fslot = FacultySlot {
            division: owner.to_string(),
            subject: assignment.subject.clone(),
            room: assignment.room.clone(),
            kind: assignment.kind,
        };
        self.faculty
            .entry(faculty.to_string())
            .or_default()
            .fill(day, slot_idx, duration, &fslot);
        if let Some(grid) = self.rooms.get_mut(assignment.room.as_str()) {
            grid.fill(day, slot_idx, duration, &(owner.to_string(), assignment.subject.clone()));
        }
    }

    fn record_failure(&mut self, division: &str, what: String) {
        self.unassigned.entry(division.to_string()).or_default().push(what);
    }

    /// Place one elective hour for every division of the group at once.
    fn place_elective_hour(&mut self, group: &ElectiveGroup<'_>) -> bool {
        let subject = group.subject();
        let faculty = group.faculty.as_str();
        let names: Vec<&str> = group.members.iter().map(|(d, _)| d.division.as_str()).collect();
        let mut diag = Diagnostics::new();
        let mut found = None;

        'search: for slot_idx in 0..N_SLOTS {
            for day in Weekday::ALL {
                if !self.faculty_free(faculty, day, slot_idx, 1) {
                    note(&mut Some(&mut diag), day, slot_idx, "Faculty busy");
                    continue;
                }
                if let Some(busy) = names
                    .iter()
                    .find(|n| !self.timetables.get(**n).is_some_and(|g| g.is_free(day, slot_idx, 1)))
                {
                    note(&mut Some(&mut diag), day, slot_idx, format!("Division {} busy", busy));
                    continue;
                }
                let Some(room) = self.free_room(RoomPool::Classrooms, &[], day, slot_idx, 1) else {
                    note(&mut Some(&mut diag), day, slot_idx, "No free classroom");
                    continue;
                };
                let placement = Placement { subject, kind: SessionKind::Elective, slot_idx, duration: 1 };
                let violation = names.iter().find_map(|n| {
                    let grid = self.timetables.get(*n)?;
                    self.limits
                        .check(&placement, grid.day(day), self.faculty_day(faculty, day))
                        .err()
                        .map(|v| format!("Constraint fail for {}: {}", n, v))
                });
                if let Some(reason) = violation {
                    note(&mut Some(&mut diag), day, slot_idx, reason);
                    continue;
                }
                found = Some((day, slot_idx, room));
                break 'search;
            }
        }

        let Some((day, slot_idx, room)) = found else {
            log::error!("FAILED to schedule ELECTIVE for {} for divisions: {}", subject.name, names.join(", "));
            report(&diag, &format!("elective {}", subject.name));
            return false;
        };

        log::info!(
            "Assigning ELECTIVE {} for {} to {} {} in {}",
            subject.name,
            names.join(", "),
            day,
            slot_label(slot_idx),
            room
        );
        let assignment = Assignment {
            subject: subject.name.clone(),
            faculty: faculty.to_string(),
            room: room.to_string(),
            kind: SessionKind::Elective,
            batch: None,
        };
        self.occupy(&names, faculty, ELECTIVE_OWNER, day, slot_idx, 1, assignment);
        true
    }

    fn schedule_electives(&mut self, groups: &[ElectiveGroup<'_>]) {
        log::info!("--- Phase 1: Scheduling Electives ---");
        for group in groups {
            let hours = group.subject().theory + group.subject().tutorial;
            if group.faculty.trim().is_empty() {
                log::warn!("Faculty not defined for elective {}. Skipping.", group.subject().name);
                let what = format!("Faculty not defined for elective theory of {}", group.subject().name);
                for (d, _) in &group.members {
                    for _ in 0..hours {
                        self.record_failure(&d.division, what.clone());
                    }
                }
                continue;
            }
            for _ in 0..hours {
                if !self.place_elective_hour(group) {
                    let what = format!("Elective Theory for {} (Faculty: {})", group.subject().name, group.faculty);
                    for (d, _) in &group.members {
                        self.record_failure(&d.division, what.clone());
                    }
                }
            }
        }

        log::info!("--- Phase 1.5: Scheduling Elective Labs ---");
        let limits = self.limits;
        for group in groups {
            for (division, subject) in &group.members {
                for unit in units_for(division, subject, false, true) {
                    if !self.place(&unit, &limits, true) {
                        self.record_failure(&division.division, unit.failure());
                    }
                }
            }
        }
    }

    /// Run every unit once; returns the ones that did not fit.
    fn pass<'u>(&mut self, units: Vec<SessionUnit<'u>>, limits: &Limits, final_pass: bool) -> Vec<SessionUnit<'u>> {
        units.into_iter().filter(|u| !self.place(u, limits, final_pass)).collect()
    }

    pub fn run(mut self) -> ScheduleOutcome {
        let divisions = self.divisions;
        let (groups, visiting, regular) = group_sessions(divisions);

        self.schedule_electives(&groups);

        log::info!("--- Phase 2: Scheduling Visiting Faculty ---");
        let vf_limits = self.limits.without_faculty_cap();
        for unit in self.pass(visiting, &vf_limits, false) {
            self.record_failure(&unit.division.division, unit.failure());
        }

        let strict = self.limits;
        log::info!(
            "--- Pass 3: Strict Scheduling (Subj/Day <= {}, FacCont <= {}) ---",
            strict.max_subject_hours_per_day,
            strict.max_faculty_continuous_total
        );
        let failed = self.pass(regular, &strict, false);

        let failed = if failed.is_empty() {
            failed
        } else {
            let relaxed = strict.relaxed(0, 1);
            log::warn!("--- Pass 4: Faculty Relaxation (FacCont <= {}) ---", relaxed.max_faculty_continuous_total);
            self.pass(failed, &relaxed, false)
        };

        if !failed.is_empty() {
            let relaxed = strict.relaxed(1, 1);
            log::warn!("--- Pass 5: Subject Relaxation (Subj/Day <= {}) ---", relaxed.max_subject_hours_per_day);
            for unit in self.pass(failed, &relaxed, true) {
                self.record_failure(&unit.division.division, unit.failure());
            }
        }

        self.into_outcome()
    }

    fn into_outcome(self) -> ScheduleOutcome {
        let mut teacher_subject_pairs = BTreeMap::new();
        for (div, grid) in &self.timetables {
            let pairs: BTreeSet<(String, String)> = grid
                .entries()
                .map(|(_, _, a)| (a.faculty.clone(), a.subject.clone()))
                .collect();
            if !pairs.is_empty() {
                teacher_subject_pairs.insert(div.clone(), pairs.into_iter().collect());
            }
        }
        ScheduleOutcome {
            division_timetables: self.timetables,
            faculty_timetables: self.faculty,
            unassigned: self.unassigned,
            teacher_subject_pairs,
        }
    }
}

/// Schedule every division with the default limits.
pub fn schedule(divisions: &[Division]) -> ScheduleOutcome {
    let outcome = Scheduler::new(divisions, Limits::default()).run();
    log::info!(
        "scheduled {} divisions, {} unassigned sessions",
        outcome.division_timetables.len(),
        outcome.unassigned_count()
    );
    outcome
}
