use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use fl_results::{DesignPoint, ResultsError, WorkbenchProject};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

fn write(path: &Path, text: &str) {
    fs::create_dir_all(path.parent().expect("parent")).expect("failed to create dirs");
    fs::write(path, text).expect("failed to write fixture");
}

fn transcript(velocity: f64) -> String {
    format!(
        "WB->Fluent:Parameter name:inlet_velocity, value:{velocity}\n\
         WB->Fluent:Parameter name:wall_temp, value:350\n\
         \x20 iter  continuity     time/iter\n\
         \x20    1  1.0e+00  0:00:01  1\n\
         \x20    2  5.0e-01  0:00:01  0\n\
         Writing \"| gzip -2cf > run.dat.gz\"...\n"
    )
}

fn report(last: f64) -> String {
    format!("\"report-def-0-rfile\"\n\"Iteration\"\n(\"Iteration\" \"outlet-temp\")\n1 300\n2 {last}\n")
}

/// `proj/proj_files/dp0/{FFF,FFF-1,FFF-2}`; `FFF-2` has no transcript.
fn build_project(root: &Path) -> PathBuf {
    let project = root.join("proj");
    let files = project.join("proj_files");
    let progress = files.join("progress_files");

    write(&files.join("dp0/FFF/Fluent/report-def-0-rfile.out"), &report(310.0));
    write(&progress.join("dp0/FFF/Fluent/FFF.1-1-00001.trn"), &transcript(2.5));
    write(&files.join("dp0/FFF-1/Fluent/report-def-0-rfile.out"), &report(320.0));
    write(&progress.join("dp0/FFF-1/Fluent/FFF-1.1-1-00001.trn"), &transcript(5.0));
    write(&files.join("dp0/FFF-2/Fluent/report-def-0-rfile.out"), &report(330.0));
    fs::create_dir_all(files.join("dp1")).expect("failed to create dp1");
    fs::create_dir_all(files.join("user_files")).expect("failed to create user_files");
    project
}

#[test]
fn discovers_design_points_and_fluent_folders() {
    let root = unique_temp_dir("fl_results_wb");
    let project = WorkbenchProject::new(build_project(&root)).expect("project");
    assert_eq!(project.name(), "proj");

    let dps = project.design_points().expect("design points");
    let names: Vec<String> = dps.iter().map(|d| d.name()).collect();
    assert_eq!(names, vec!["dp0", "dp1"]);

    let folders = dps[0].fluent_folders().expect("fluent folders");
    assert_eq!(folders.len(), 3);
    assert_eq!(folders[0].report_files().expect("reports").len(), 1);
    assert_eq!(folders[0].solution_files().expect("transcripts").len(), 1);
    assert!(folders[2].solution_files().expect("transcripts").is_empty());

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn design_point_loads_inputs_and_responses() {
    let root = unique_temp_dir("fl_results_dp_load");
    let project = WorkbenchProject::new(build_project(&root)).expect("project");
    let dp0 = project.design_points().expect("design points").remove(0);

    let (x, y) = DesignPoint::new(dp0).load().expect("load");

    assert_eq!(x.index_name(), Some("File"));
    assert_eq!(x.index(), &["FFF".to_string(), "FFF-1".to_string()]);
    assert_eq!(x.columns(), &["inlet_velocity", "wall_temp"]);
    assert_eq!(x.get(&"FFF-1".to_string(), "inlet_velocity"), Some(Some(5.0)));

    assert_eq!(y.index(), x.index());
    assert_eq!(y.get(&"FFF".to_string(), "outlet-temp"), Some(Some(310.0)));
    assert_eq!(y.get(&"FFF-1".to_string(), "outlet-temp"), Some(Some(320.0)));

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn empty_design_point_is_an_error() {
    let root = unique_temp_dir("fl_results_dp_empty");
    let project = WorkbenchProject::new(build_project(&root)).expect("project");
    let dp1 = project.design_points().expect("design points").remove(1);

    let err = DesignPoint::new(dp1).load().unwrap_err();
    assert!(matches!(err, ResultsError::DesignPoint { .. }));

    let _ = fs::remove_dir_all(&root);
}
