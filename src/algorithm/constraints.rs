use crate::models::{Assignment, FacultySlot, SessionKind, Subject};

/// Hard limits checked for every candidate placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_subject_hours_per_day: usize,
    pub max_faculty_continuous_theory: usize,
    pub max_faculty_continuous_total: usize,
    pub max_student_continuous_hours: usize,
    pub faculty_max_workday_span: usize,
    pub max_student_daily_hours: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_subject_hours_per_day: 3,
            max_faculty_continuous_theory: 3,
            max_faculty_continuous_total: 5,
            max_student_continuous_hours: 5,
            faculty_max_workday_span: 8,
            max_student_daily_hours: 8,
        }
    }
}

impl Limits {
    /// Copy with the subject-per-day and faculty-continuous caps raised.
    pub fn relaxed(self, subject_extra: usize, faculty_extra: usize) -> Self {
        Limits {
            max_subject_hours_per_day: self.max_subject_hours_per_day + subject_extra,
            max_faculty_continuous_total: self.max_faculty_continuous_total + faculty_extra,
            ..self
        }
    }

    /// Copy with the faculty-continuous cap effectively lifted.
    pub fn without_faculty_cap(self) -> Self {
        Limits { max_faculty_continuous_total: 99, ..self }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    #[error("Exceeds max daily hours ({0}h) for students")]
    StudentDaily(usize),
    #[error("Exceeds max subject hours ({limit}h) for '{subject}'")]
    SubjectDaily { subject: String, limit: usize },
    #[error("Creates >{0} continuous hours for students")]
    StudentContinuous(usize),
    #[error("Creates >{0} continuous theory hours for faculty")]
    FacultyContinuousTheory(usize),
    #[error("Creates >{0} continuous total hours for faculty")]
    FacultyContinuousTotal(usize),
    #[error("Exceeds faculty workday span ({0}h)")]
    WorkdaySpan(usize),
}

/// A candidate placement on one day.
#[derive(Debug, Clone, Copy)]
pub struct Placement<'a> {
    pub subject: &'a Subject,
    pub kind: SessionKind,
    pub slot_idx: usize,
    pub duration: usize,
}

impl Placement<'_> {
    fn covers(&self, idx: usize) -> bool {
        idx >= self.slot_idx && idx < self.slot_idx + self.duration
    }
}

/// Longest run of `true` values.
fn longest_run<I: IntoIterator<Item = bool>>(it: I) -> usize {
    let mut best = 0;
    let mut cur = 0;
    for b in it {
        if b {
            cur += 1;
            best = best.max(cur);
        } else {
            cur = 0;
        }
    }
    best
}

impl Limits {
    /// Check a placement against the division's and the faculty member's day.
    /// Faculty limits are skipped for visiting faculty; `faculty_day` is
    /// `None` for a teacher with nothing scheduled yet.
    pub fn check(
        &self,
        p: &Placement<'_>,
        division_day: &[Option<Assignment>],
        faculty_day: Option<&[Option<FacultySlot>]>,
    ) -> Result<(), Violation> {
        let occupied = division_day.iter().filter(|s| s.is_some()).count();
        if occupied + p.duration > self.max_student_daily_hours {
            return Err(Violation::StudentDaily(self.max_student_daily_hours));
        }

        let hours_today = division_day
            .iter()
            .flatten()
            .filter(|a| a.subject == p.subject.name)
            .count();
        if hours_today + p.duration > self.max_subject_hours_per_day {
            return Err(Violation::SubjectDaily {
                subject: p.subject.name.clone(),
                limit: self.max_subject_hours_per_day,
            });
        }

        let student_run = longest_run(
            division_day
                .iter()
                .enumerate()
                .map(|(i, s)| s.is_some() || p.covers(i)),
        );
        if student_run > self.max_student_continuous_hours {
            return Err(Violation::StudentContinuous(self.max_student_continuous_hours));
        }

        if p.subject.visiting {
            return Ok(());
        }

        // Some(true) = theory-like, Some(false) = practical, None = free
        let day_len = division_day.len();
        let teacher: Vec<Option<bool>> = (0..day_len)
            .map(|i| {
                if p.covers(i) {
                    Some(p.kind.is_theory_like())
                } else {
                    faculty_day
                        .and_then(|d| d.get(i))
                        .and_then(|s| s.as_ref())
                        .map(|s| s.kind.is_theory_like())
                }
            })
            .collect();

        let theory_run = longest_run(teacher.iter().map(|s| *s == Some(true)));
        if theory_run > self.max_faculty_continuous_theory {
            return Err(Violation::FacultyContinuousTheory(self.max_faculty_continuous_theory));
        }
        let total_run = longest_run(teacher.iter().map(|s| s.is_some()));
        if total_run > self.max_faculty_continuous_total {
            return Err(Violation::FacultyContinuousTotal(self.max_faculty_continuous_total));
        }

        let first = teacher.iter().position(|s| s.is_some());
        let last = teacher.iter().rposition(|s| s.is_some());
        if let (Some(first), Some(last)) = (first, last) {
            if last - first + 1 > self.faculty_max_workday_span {
                return Err(Violation::WorkdaySpan(self.faculty_max_workday_span));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::N_SLOTS;

    fn theory(subject: &str) -> Option<Assignment> {
        Some(Assignment {
            subject: subject.to_string(),
            faculty: "T".to_string(),
            room: "CR-302".to_string(),
            kind: SessionKind::Theory,
            batch: None,
        })
    }

    fn fac(kind: SessionKind) -> Option<FacultySlot> {
        Some(FacultySlot {
            division: "D".to_string(),
            subject: "X".to_string(),
            room: "CR-302".to_string(),
            kind,
        })
    }

    #[test]
    fn subject_daily_cap() {
        let s = Subject::new("Maths", "T");
        let mut day = vec![None; N_SLOTS];
        day[0] = theory("Maths");
        day[1] = theory("Maths");
        day[2] = theory("Maths");
        let p = Placement { subject: &s, kind: SessionKind::Theory, slot_idx: 5, duration: 1 };
        let err = Limits::default().check(&p, &day, None).unwrap_err();
        assert_eq!(err.to_string(), "Exceeds max subject hours (3h) for 'Maths'");
        assert!(Limits::default().relaxed(1, 0).check(&p, &day, None).is_ok());
    }

    #[test]
    fn student_continuous_cap() {
        let s = Subject::new("Physics", "T");
        let mut day = vec![None; N_SLOTS];
        for (i, subj) in ["A", "B", "C", "D", "E"].iter().enumerate() {
            day[i] = theory(subj);
        }
        let p = Placement { subject: &s, kind: SessionKind::Theory, slot_idx: 5, duration: 1 };
        assert_eq!(
            Limits::default().check(&p, &day, None),
            Err(Violation::StudentContinuous(5))
        );
        let p = Placement { slot_idx: 6, ..p };
        assert!(Limits::default().check(&p, &day, None).is_ok());
    }

    #[test]
    fn faculty_theory_run_resets_on_lab() {
        let s = Subject::new("Chem", "T");
        let day: Vec<Option<Assignment>> = vec![None; N_SLOTS];
        let mut fday = vec![None; N_SLOTS];
        fday[0] = fac(SessionKind::Theory);
        fday[1] = fac(SessionKind::Theory);
        fday[2] = fac(SessionKind::Theory);
        let p = Placement { subject: &s, kind: SessionKind::Theory, slot_idx: 3, duration: 1 };
        assert_eq!(
            Limits::default().check(&p, &day, Some(fday.as_slice())),
            Err(Violation::FacultyContinuousTheory(3))
        );
        let lab = Placement { kind: SessionKind::Practical, duration: 2, ..p };
        assert!(Limits::default().check(&lab, &day, Some(fday.as_slice())).is_ok());
    }

    #[test]
    fn visiting_faculty_skip_teacher_limits() {
        let mut s = Subject::new("Law", "Adv. Rao");
        s.visiting = true;
        let day: Vec<Option<Assignment>> = vec![None; N_SLOTS];
        let fday: Vec<Option<FacultySlot>> = (0..N_SLOTS).map(|i| if i < 4 { fac(SessionKind::Theory) } else { None }).collect();
        let p = Placement { subject: &s, kind: SessionKind::Theory, slot_idx: 4, duration: 1 };
        assert!(Limits::default().check(&p, &day, Some(fday.as_slice())).is_ok());
    }

    #[test]
    fn workday_span() {
        let s = Subject::new("Bio", "T");
        let day: Vec<Option<Assignment>> = vec![None; N_SLOTS];
        let mut fday = vec![None; N_SLOTS];
        fday[0] = fac(SessionKind::Theory);
        let p = Placement { subject: &s, kind: SessionKind::Theory, slot_idx: 8, duration: 1 };
        assert_eq!(Limits::default().check(&p, &day, Some(fday.as_slice())), Err(Violation::WorkdaySpan(8)));
        let p = Placement { slot_idx: 7, ..p };
        assert!(Limits::default().check(&p, &day, Some(fday.as_slice())).is_ok());
    }
}
