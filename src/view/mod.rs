//! Server-side HTML rendering.
//!
//! - `lookup`: lenient extraction from JSON responses
//! - `html`: page templates, tables and the weekly grid

pub mod html;
pub mod lookup;

pub use html::{escape, index_page, not_found_page, report_fragment, report_page};
pub use lookup::{find_division_entry, teacher_subject_rows, decode_session, faculty_load_rows, unassigned_entries};
