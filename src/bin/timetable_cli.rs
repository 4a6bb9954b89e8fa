//! Command-line front end for the ingestion and scheduling steps.
//!
//! Examples:
//!   timetable-cli ingest schedule.xlsx --out work/
//!   timetable-cli schedule work/divisions.json --out outputs/
//!   timetable-cli run schedule.xlsx
//!
//! `--out` defaults to `TIMETABLE_OUTPUT_DIR` (or `outputs`).

use std::path::{Path, PathBuf};
use std::process;

use timetabler::algorithm::{clean_dir, load_divisions, schedule_and_export};
use timetabler::excel::{schedule_from_file, write_session_files};
use timetabler::{AppConfig, Result};

fn usage() -> ! {
    eprintln!("Usage: timetable-cli <command> <path> [--out DIR]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  ingest <sheet>              Normalise a sheet into divisions.json and session files");
    eprintln!("  schedule <divisions.json>   Schedule divisions and export timetables");
    eprintln!("  run <sheet>                 Ingest then schedule");
    process::exit(1);
}

fn parse_args(default_out: PathBuf) -> (String, PathBuf, PathBuf) {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let mut out = default_out;
    if let Some(pos) = args.iter().position(|a| a == "--out") {
        if pos + 1 >= args.len() {
            usage();
        }
        out = PathBuf::from(&args[pos + 1]);
        args.drain(pos..pos + 2);
    }
    if args.len() != 2 {
        usage();
    }
    (args[0].clone(), PathBuf::from(&args[1]), out)
}

fn ingest(sheet: &Path, out: &Path) -> Result<()> {
    let processed = schedule_from_file(sheet)?;
    write_session_files(&processed, out)?;
    let s = processed.summary();
    println!(
        "Programs: {}  Faculty: {}  Courses: {}  -> {}",
        s.programs,
        s.faculty,
        s.courses,
        out.display()
    );
    Ok(())
}

fn schedule(divisions_json: &Path, out: &Path, xlsx: bool) -> Result<()> {
    let divisions = load_divisions(divisions_json)?;
    clean_dir(out)?;
    let outcome = schedule_and_export(&divisions, out, xlsx)?;
    println!(
        "{} timetables generated, {} sessions unassigned -> {}",
        outcome.division_timetables.len(),
        outcome.unassigned_count(),
        out.display()
    );
    for (division, items) in &outcome.unassigned {
        for item in items {
            println!("  [{}] {}", division, item);
        }
    }
    Ok(())
}

fn run(cmd: &str, path: &Path, out: &Path, xlsx: bool) -> Result<()> {
    match cmd {
        "ingest" => ingest(path, out),
        "schedule" => schedule(path, out, xlsx),
        "run" => {
            let work = out.join("ingest");
            ingest(path, &work)?;
            schedule(&work.join("divisions.json"), out, xlsx)
        }
        _ => usage(),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = AppConfig::from_env();
    let (cmd, path, out) = parse_args(config.output_dir.clone());
    if let Err(e) = run(&cmd, &path, &out, config.export_xlsx) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}
