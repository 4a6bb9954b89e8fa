use super::lookup::{
    FacultyLoadRow, TeacherSubjectRow, day_sessions, decode_session, division_names, faculty_load_rows,
    find_division_entry, teacher_subject_rows, unassigned_entries,
};
use crate::api_json::PROCESSED_FILE;
use crate::models::{Weekday, slot_labels};
use serde_json::Value;
use std::fmt::Write;

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLE: &str = r#"<style>
body { font-family: sans-serif; margin: 2rem; color: #222; }
.card { border: 1px solid #ccc; border-radius: 6px; padding: 1rem; margin-bottom: 1rem; }
table { border-collapse: collapse; margin-bottom: 1rem; }
th, td { border: 1px solid #bbb; padding: 4px 8px; text-align: center; vertical-align: middle; }
th { background: #ddebf7; }
td.empty { color: #999; }
td.theory { background: #eef6ff; }
td.practical { background: #eafbea; }
td.tutorial { background: #fff6e0; }
.batch { font-size: 0.8em; color: #555; }
</style>"#;

const SCRIPT: &str = r#"<script>
async function postJson(url, init) {
  const res = await fetch(url, init);
  const body = await res.json().catch(() => ({}));
  if (!res.ok) { throw new Error(body.error || res.statusText); }
  return body;
}
async function loadReport(division) {
  const q = division ? '&division=' + encodeURIComponent(division) : '';
  const res = await fetch('/report?fragment=1' + q);
  if (!res.ok) { alert('Could not load the report'); return; }
  document.getElementById('report').innerHTML = await res.text();
}
document.getElementById('upload-form').addEventListener('submit', async (ev) => {
  ev.preventDefault();
  try {
    await postJson('/upload', { method: 'POST', body: new FormData(ev.target) });
    location.reload();
  } catch (e) { alert('Upload failed: ' + e.message); }
});
document.getElementById('generate').addEventListener('click', async () => {
  try {
    const body = await postJson('/generate', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify({ processed_file: document.getElementById('generate').dataset.file })
    });
    document.getElementById('status').textContent = body.message;
    await loadReport();
  } catch (e) { alert('Generation failed: ' + e.message); }
});
document.addEventListener('change', (ev) => {
  if (ev.target.id === 'division-select') { loadReport(ev.target.value); }
});
</script>"#;

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n{}\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape(title),
        STYLE,
        body
    )
}

/// Card with the counts returned by `/upload` (`Programs`, `Faculty`,
/// `Courses`); keys are shown in the order received.
pub fn upload_summary(summary: &Value) -> String {
    let mut html = String::from("<div class=\"card\" id=\"upload-summary\">\n<h3>Upload summary</h3>\n<ul>\n");
    if let Some(obj) = summary.as_object() {
        for (k, v) in obj {
            let v = v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string());
            let _ = writeln!(html, "<li><strong>{}:</strong> {}</li>", escape(k), escape(&v));
        }
    }
    html.push_str("</ul>\n</div>\n");
    html
}

pub fn division_selector(names: &[String], selected: &str) -> String {
    let mut html = String::from("<label for=\"division-select\">Division</label>\n<select id=\"division-select\" name=\"division\">\n");
    for name in names {
        let sel = if name == selected { " selected" } else { "" };
        let _ = writeln!(html, "<option value=\"{0}\"{1}>{0}</option>", escape(name), sel);
    }
    html.push_str("</select>\n");
    html
}

/// Slots down, weekdays across. Days missing from the timetable are
/// skipped unless none match at all; free slots are shown as `-`.
pub fn timetable_grid(timetable: &Value, labels: &[String]) -> String {
    let empty = Vec::new();
    let mut days: Vec<(Weekday, &Vec<Value>)> = Weekday::ALL
        .into_iter()
        .filter_map(|d| day_sessions(timetable, d).map(|s| (d, s)))
        .collect();
    if days.is_empty() {
        days = Weekday::ALL.into_iter().map(|d| (d, &empty)).collect();
    }
    let rows = days.iter().map(|(_, s)| s.len()).max().unwrap_or(0).max(labels.len());

    let mut html = String::from("<table class=\"timetable\">\n<thead><tr><th>Time</th>");
    for (day, _) in &days {
        let _ = write!(html, "<th>{}</th>", day);
    }
    html.push_str("</tr></thead>\n<tbody>\n");
    for row in 0..rows {
        let label = labels.get(row).cloned().unwrap_or_else(|| format!("Slot {}", row + 1));
        let _ = write!(html, "<tr><th>{}</th>", escape(&label));
        for (_, sessions) in &days {
            match sessions.get(row).and_then(decode_session) {
                Some(s) => {
                    let _ = write!(
                        html,
                        "<td class=\"{}\"><strong>{}</strong>",
                        s.session_type.as_str(),
                        escape(&s.subject)
                    );
                    if let Some(batch) = &s.batch {
                        let _ = write!(html, "<br><span class=\"batch\">{}</span>", escape(batch));
                    }
                    if !s.faculty.is_empty() {
                        let _ = write!(html, "<br>{}", escape(&s.faculty));
                    }
                    if !s.room.is_empty() {
                        let _ = write!(html, "<br>[{}]", escape(&s.room));
                    }
                    html.push_str("</td>");
                }
                None => html.push_str("<td class=\"empty\">-</td>"),
            }
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n");
    html
}

pub fn faculty_load_table(rows: &[FacultyLoadRow]) -> String {
    if rows.is_empty() {
        return "<p>No faculty load data.</p>\n".to_string();
    }
    let mut html = String::from(
        "<table class=\"faculty-load\">\n<thead><tr><th>Faculty</th><th>Hours</th><th>Courses</th><th>Subjects</th></tr></thead>\n<tbody>\n",
    );
    for r in rows {
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&r.faculty),
            r.hours,
            r.course_count,
            escape(&r.courses.join(", "))
        );
    }
    html.push_str("</tbody>\n</table>\n");
    html
}

pub fn teacher_subject_table(rows: &[TeacherSubjectRow]) -> String {
    if rows.is_empty() {
        return "<p>No teacher-subject assignments for this division.</p>\n".to_string();
    }
    let mut html = String::from(
        "<table class=\"teacher-subjects\">\n<thead><tr><th>Faculty</th><th>Subject</th></tr></thead>\n<tbody>\n",
    );
    for r in rows {
        let _ = writeln!(html, "<tr><td>{}</td><td>{}</td></tr>", escape(&r.faculty), escape(&r.subject));
    }
    html.push_str("</tbody>\n</table>\n");
    html
}

pub fn unassigned_list(entries: &[String]) -> String {
    if entries.is_empty() {
        return "<p class=\"all-assigned\">All lectures were assigned.</p>\n".to_string();
    }
    let mut html = String::from("<ul class=\"unassigned\">\n");
    for e in entries {
        let _ = writeln!(html, "<li>{}</li>", escape(e));
    }
    html.push_str("</ul>\n");
    html
}

/// Report body for one division of a `/generate` response. When
/// `division` is `None` or unknown the first division is shown.
pub fn report_fragment(response: &Value, division: Option<&str>) -> String {
    let names = division_names(response);
    let Some(first) = names.first() else {
        return "<p>No timetables to show.</p>\n".to_string();
    };
    let timetables = response.get("timetables").unwrap_or(&Value::Null);
    let (selected, timetable) = division
        .and_then(|d| {
            let entry = find_division_entry(timetables, d)?;
            let key = names
                .iter()
                .find(|n| timetables.get(n.as_str()).is_some_and(|v| std::ptr::eq(v, entry)))
                .cloned()
                .unwrap_or_else(|| d.to_string());
            Some((key, entry))
        })
        .unwrap_or_else(|| (first.clone(), &timetables[first.as_str()]));

    let labels: Vec<String> = response
        .get("slotLabels")
        .and_then(Value::as_array)
        .map(|l| l.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .filter(|l: &Vec<String>| !l.is_empty())
        .unwrap_or_else(slot_labels);

    let teacher_rows = response
        .get("teacherSubjects")
        .and_then(|m| find_division_entry(m, &selected))
        .map(teacher_subject_rows)
        .unwrap_or_default();
    let unassigned = response
        .get("unassignedLectures")
        .and_then(|m| find_division_entry(m, &selected))
        .map(unassigned_entries)
        .unwrap_or_default();
    let load = response.get("facultyLoad").map(faculty_load_rows).unwrap_or_default();

    let mut html = String::new();
    if let Some(msg) = response.get("message").and_then(Value::as_str) {
        let _ = writeln!(html, "<p class=\"message\">{}</p>", escape(msg));
    }
    html.push_str(&division_selector(&names, &selected));
    let _ = writeln!(html, "<h2>Timetable: {}</h2>", escape(&selected));
    html.push_str(&timetable_grid(timetable, &labels));
    html.push_str("<h2>Faculty load</h2>\n");
    html.push_str(&faculty_load_table(&load));
    html.push_str("<h2>Teacher / subject assignments</h2>\n");
    html.push_str(&teacher_subject_table(&teacher_rows));
    html.push_str("<h2>Unassigned lectures</h2>\n");
    html.push_str(&unassigned_list(&unassigned));
    html
}

pub fn report_page(response: &Value, division: Option<&str>) -> String {
    let body = format!(
        "<h1>Generated timetables</h1>\n<p><a href=\"/\">Back</a></p>\n{}<script>\ndocument.getElementById('division-select')?.addEventListener('change', (ev) => {{\n  location.search = '?division=' + encodeURIComponent(ev.target.value);\n}});\n</script>",
        report_fragment(response, division)
    );
    page("Timetable report", &body)
}

pub fn not_found_page(message: &str) -> String {
    page("Not found", &format!("<h1>Not found</h1>\n<p>{}</p>\n<p><a href=\"/\">Back</a></p>", escape(message)))
}

/// Landing page: upload form, generate button and, when available, the
/// last upload summary and the last report.
pub fn index_page(upload: Option<&Value>, report: Option<&Value>) -> String {
    let mut body = String::from("<h1>Timetable generator</h1>\n");
    body.push_str(
        "<form id=\"upload-form\" class=\"card\" enctype=\"multipart/form-data\">\n<label>Schedule sheet (xlsx, xls, ods, csv) <input type=\"file\" name=\"file\" required></label>\n<button type=\"submit\">Upload</button>\n</form>\n",
    );
    if let Some(summary) = upload {
        body.push_str(&upload_summary(summary));
    }
    let _ = writeln!(
        body,
        "<button id=\"generate\" data-file=\"{}\">Generate timetables</button> <span id=\"status\"></span>",
        escape(PROCESSED_FILE)
    );
    body.push_str("<div id=\"report\">\n");
    if let Some(r) = report {
        body.push_str(&report_fragment(r, None));
    }
    body.push_str("</div>\n");
    body.push_str(SCRIPT);
    page("Timetable generator", &body)
}
