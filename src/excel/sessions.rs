use crate::models::{Division, LabSession, SessionKind, WholeClassSession};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionPools {
    pub whole_class_sessions: Vec<WholeClassSession>,
    /// Practical blocks per division.
    pub labs: BTreeMap<String, Vec<LabSession>>,
}

/// Expand subject hours into concrete sessions: one-hour whole-class
/// sessions for theory and tutorials, and per-batch practical blocks of two
/// hours (plus a one-hour block when the practical hours are odd).
pub fn create_sessions(divisions: &[Division]) -> SessionPools {
    let mut pools = SessionPools::default();

    for d in divisions {
        let divname = &d.division;
        for subj in &d.subjects {
            let whole = |kind: SessionKind| WholeClassSession {
                division: divname.clone(),
                subject: subj.name.clone(),
                faculty: subj.faculty.clone(),
                duration: 1,
                is_lab: false,
                is_tut: kind == SessionKind::Tutorial,
                visiting: subj.visiting,
                kind,
            };
            for _ in 0..subj.theory {
                pools.whole_class_sessions.push(whole(SessionKind::Theory));
            }
            for _ in 0..subj.tutorial {
                pools.whole_class_sessions.push(whole(SessionKind::Tutorial));
            }

            if subj.practical == 0 {
                continue;
            }
            let two_hour_blocks = subj.practical / 2;
            let one_hour_blocks = subj.practical % 2;
            if one_hour_blocks > 0 {
                log::warn!(
                    "{} - subject {} has odd practical hours ({}) -> creating {}x 1-hour practical session(s)",
                    divname,
                    subj.name,
                    subj.practical,
                    one_hour_blocks
                );
            }

            let labs = pools.labs.entry(divname.clone()).or_default();
            for batch_idx in 0..subj.batches as usize {
                let faculty = subj.batch_faculty.get(batch_idx).unwrap_or(&subj.faculty);
                let block = |duration: u32| LabSession {
                    subject: subj.name.clone(),
                    faculty: faculty.clone(),
                    duration,
                    visiting: subj.visiting,
                };
                for _ in 0..two_hour_blocks {
                    labs.push(block(2));
                }
                for _ in 0..one_hour_blocks {
                    labs.push(block(1));
                }
            }
        }
    }
    pools
}
