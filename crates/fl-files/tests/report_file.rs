use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use fl_files::{FluentFile, ReportFileOut, ReportOptions, Skip};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

fn report_with_rows(m: usize) -> String {
    let mut text = String::from("\"report-def-0-rfile\"\n\"Iteration\" \"mass-flow\"\n(\"Iteration\" \"mass-flow\" \"outlet-temp\")\n");
    for i in 1..=m {
        text.push_str(&format!("{i} {} {}\n", 0.1 * i as f64, 300 + i));
    }
    text
}

#[test]
fn minimal_report_file() {
    let text = "...\n\n\"Iter\" \"CS-Temp\"\n1 300.0\n2 301.5\n3 302.1\n";
    let table = ReportFileOut::from_text(text, ReportOptions::default())
        .read()
        .unwrap();
    assert_eq!(table.index(), &[1, 2, 3]);
    assert_eq!(table.index_name(), Some("Iter"));
    assert_eq!(
        table.column("CS-Temp").unwrap(),
        vec![Some(300.0), Some(301.5), Some(302.1)]
    );
}

#[test]
fn skip_modes_on_disk() {
    let m = 12;
    let dir = unique_temp_dir("fl_files_report");
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    let path = dir.join("report-def-0-rfile.out");
    fs::write(&path, report_with_rows(m)).expect("failed to write report");

    let all = ReportFileOut::open(&path, ReportOptions::default())
        .unwrap()
        .read()
        .unwrap();
    assert_eq!(all.len(), m);
    assert_eq!(all.columns(), &["mass-flow", "outlet-temp"]);

    let skipped = ReportFileOut::open(&path, ReportOptions::default().with_skip(Skip::Rows(5)))
        .unwrap()
        .read()
        .unwrap();
    assert_eq!(skipped.len(), m - 5);
    assert_eq!(skipped.index()[0], 6);

    let mut converged = <ReportFileOut as FluentFile>::open_with(
        &path,
        ReportOptions::default().with_skip(Skip::Converged),
    )
    .unwrap();
    let last = FluentFile::read(&mut converged).unwrap();
    assert_eq!(last.index(), &[m as i64]);
    assert_eq!(last.get(&(m as i64), "outlet-temp"), Some(Some(312.0)));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn converged_on_empty_report_is_empty() {
    let text = "a\nb\n(\"Iteration\" \"x\")\n";
    let table = ReportFileOut::from_text(text, ReportOptions::default().with_skip(Skip::Converged))
        .read()
        .unwrap();
    assert!(table.is_empty());
    assert_eq!(table.columns(), &["x"]);
}
