use super::io::normalize_header;
use strsim::jaro_winkler;

/// Columns the ingestion understands, keyed by their canonical header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Program,
    Semester,
    Division,
    Course,
    Theory,
    Practical,
    Tutorial,
    Credits,
    Batches,
    Department,
    CourseType,
    TheoryFaculty,
    BatchFaculty1,
    BatchFaculty2,
    BatchFaculty3,
    Elective,
    Combined,
    VfHours,
    Remarks,
    Availability,
}

impl Column {
    pub const ALL: [Column; 20] = [
        Column::Program,
        Column::Semester,
        Column::Division,
        Column::Course,
        Column::Theory,
        Column::Practical,
        Column::Tutorial,
        Column::Credits,
        Column::Batches,
        Column::Department,
        Column::CourseType,
        Column::TheoryFaculty,
        Column::BatchFaculty1,
        Column::BatchFaculty2,
        Column::BatchFaculty3,
        Column::Elective,
        Column::Combined,
        Column::VfHours,
        Column::Remarks,
        Column::Availability,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Column::Program => "Program",
            Column::Semester => "Semester",
            Column::Division => "Division",
            Column::Course => "Name of the Course",
            Column::Theory => "Theory",
            Column::Practical => "PRA",
            Column::Tutorial => "Tutorial",
            Column::Credits => "Credits",
            Column::Batches => "No. of Batches for Practical/ Tutorial",
            Column::Department => "Department to which Services Requested",
            Column::CourseType => "C/VF",
            Column::TheoryFaculty => "Name of Faculty (Theory)",
            Column::BatchFaculty1 => "Name of Faculty Batch 1 (Lab/Tut)",
            Column::BatchFaculty2 => "Name of Faculty Batch 2 (Lab/Tut)",
            Column::BatchFaculty3 => "Name of Faculty Batch 3 (Lab/Tut)",
            Column::Elective => "Elective",
            Column::Combined => "Combined Lectures",
            Column::VfHours => "vf hours",
            Column::Remarks => "Remarks",
            Column::Availability => "Availability",
        }
    }
}

/// Minimum Jaro-Winkler similarity for a fuzzy header match.
const FUZZY_THRESHOLD: f64 = 0.93;
/// Headers shorter than this are only matched exactly.
const FUZZY_MIN_LEN: usize = 6;

fn digits(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Maps known columns to their index in the header row.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    index: Vec<(Column, usize)>,
}

impl ColumnMap {
    /// Resolve every known column against `headers`. Exact matches (case and
    /// whitespace insensitive) win; leftovers are matched fuzzily against
    /// headers no other column claimed, requiring the same digits so that
    /// "Batch 1" never resolves to "Batch 2".
    pub fn resolve(headers: &[String]) -> Self {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
        let mut claimed = vec![false; headers.len()];
        let mut index: Vec<(Column, usize)> = Vec::new();
        let mut pending: Vec<Column> = Vec::new();

        for col in Column::ALL {
            let wanted = normalize_header(col.header());
            match normalized.iter().position(|h| !h.is_empty() && *h == wanted) {
                Some(i) if !claimed[i] => {
                    claimed[i] = true;
                    index.push((col, i));
                }
                _ => pending.push(col),
            }
        }

        for col in pending {
            let wanted = normalize_header(col.header());
            if wanted.len() < FUZZY_MIN_LEN {
                continue;
            }
            let best = normalized
                .iter()
                .enumerate()
                .filter(|(i, h)| !claimed[*i] && h.len() >= FUZZY_MIN_LEN && digits(h) == digits(&wanted))
                .map(|(i, h)| (i, jaro_winkler(h, &wanted)))
                .filter(|(_, score)| *score >= FUZZY_THRESHOLD)
                .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
            if let Some((i, score)) = best {
                log::debug!("header {:?} matched to {:?} (score {:.3})", headers[i], col.header(), score);
                claimed[i] = true;
                index.push((col, i));
            }
        }

        ColumnMap { index }
    }

    pub fn get(&self, col: Column) -> Option<usize> {
        self.index.iter().find(|(c, _)| *c == col).map(|(_, i)| *i)
    }

    pub fn contains(&self, col: Column) -> bool {
        self.get(col).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn exact_matches_ignore_case_and_spaces() {
        let map = ColumnMap::resolve(&headers(&["program", " SEMESTER ", "Name of the  Course", "pra"]));
        assert_eq!(map.get(Column::Program), Some(0));
        assert_eq!(map.get(Column::Semester), Some(1));
        assert_eq!(map.get(Column::Course), Some(2));
        assert_eq!(map.get(Column::Practical), Some(3));
        assert!(!map.contains(Column::Theory));
    }

    #[test]
    fn fuzzy_match_tolerates_typos() {
        let map = ColumnMap::resolve(&headers(&["Name of Faculty (Theroy)", "Department to which Service Requested"]));
        assert_eq!(map.get(Column::TheoryFaculty), Some(0));
        assert_eq!(map.get(Column::Department), Some(1));
    }

    #[test]
    fn batch_columns_do_not_cross_match() {
        let map = ColumnMap::resolve(&headers(&["Name of Faculty Batch 2 (Lab/Tut)"]));
        assert_eq!(map.get(Column::BatchFaculty2), Some(0));
        assert!(!map.contains(Column::BatchFaculty1));
        assert!(!map.contains(Column::BatchFaculty3));
    }
}
