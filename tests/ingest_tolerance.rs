use std::fs;

use tempfile::TempDir;

use swimcast::{
    ingest::{
        IngestError, LineError, parse_lines, parse_str,
        directory::{LoadHints, expected_file_name, ingest_directory},
        ingest_file,
    },
    model::{Event, FieldError, Swimmer},
};

const MIXED: &str = "\
# swimmerId,name,birthYear,sex,distance,stroke,course,date,timeSeconds
S1,Alex,2008,F,100,Free,SCY,2024-01-01,60.0

S1,Alex,2008,F,100,Free,SCY
S2,Blair,20x7,M,100,Free,SCY,2024-01-02,55.1
  S2 , Blair , 2007 , M , 100 , Free , SCY , 2024-01-03 , 54.9
S3,Casey,2006,F,200,Back,SCY,2024-13-01,140.0
S3,Casey,2006,F,200,Back,SCY,2024-02-01,fast
S3,Casey,2006,F,200,Back,SCY,2024-02-02,139.5
";

#[test]
fn valid_lines_survive_and_bad_lines_are_reported() {
    let report = parse_str(MIXED);

    assert_eq!(report.results.len(), 3);
    assert_eq!(report.skipped(), 4);

    let times: Vec<f64> = report.results.iter().map(|r| r.time()).collect();
    assert_eq!(times, vec![60.0, 54.9, 139.5]);

    let lines: Vec<usize> = report.diagnostics.iter().map(|d| d.line).collect();
    assert_eq!(lines, vec![4, 5, 7, 8]);

    assert_eq!(
        report.diagnostics[0].reason,
        LineError::Field(FieldError::TooFewFields { expected: 9, found: 7 })
    );
    assert!(matches!(
        report.diagnostics[1].reason,
        LineError::Field(FieldError::BadInteger { field: "birth year", .. })
    ));
    assert!(matches!(
        report.diagnostics[2].reason,
        LineError::Field(FieldError::BadDate { .. })
    ));
    assert!(matches!(
        report.diagnostics[3].reason,
        LineError::Field(FieldError::BadNumber { field: "time", .. })
    ));
}

#[test]
fn fields_are_trimmed() {
    let report = parse_lines(["  S2 , Blair , 2007 , M , 100 , Free , SCY , 2024-01-03 , 54.9  "]);
    assert_eq!(report.skipped(), 0);
    let r = &report.results[0];
    assert_eq!(r.swimmer().as_ref(), &Swimmer::new("S2", "Blair", 2007, "M"));
    assert_eq!(r.event().as_ref(), &Event::new(100, "Free", "SCY"));
}

#[test]
fn one_load_shares_swimmer_and_event_values() {
    let report = parse_lines([
        "S1,Alex,2008,F,100,Free,SCY,2024-01-01,60.0",
        "S1,Alex,2008,F,100,Free,SCY,2024-02-01,59.0",
    ]);
    assert!(std::sync::Arc::ptr_eq(report.results[0].swimmer(), report.results[1].swimmer()));
    assert!(std::sync::Arc::ptr_eq(report.results[0].event(), report.results[1].event()));
}

#[test]
fn sex_is_stored_verbatim_and_extra_columns_ignored() {
    let report = parse_lines(["S9,Jo,2010,X,50,Fly,LCM,2024-05-05,31.2,extra"]);
    assert_eq!(report.skipped(), 0);
    assert_eq!(report.results[0].swimmer().sex, "X");
}

#[test]
fn expected_name_needs_every_hint() {
    assert_eq!(
        expected_file_name(&LoadHints::new("Providence  Aquatic Club", "M", "2024")),
        Some("Providence_Aquatic_Club_M_2024.csv".to_string())
    );
    assert_eq!(expected_file_name(&LoadHints::new("Providence", "M", " ")), None);
    assert_eq!(expected_file_name(&LoadHints::default()), None);
}

#[test]
fn directory_prefers_named_file() {
    let tmp = TempDir::new().expect("tmp");
    fs::write(tmp.path().join("Providence_M_2024.csv"), "S1,Alex,2008,M,100,Free,SCY,2024-01-01,60.0\n").expect("write");
    fs::write(tmp.path().join("other.csv"), "S2,Blair,2007,M,100,Free,SCY,2024-01-01,55.0\n").expect("write");

    let report = ingest_directory(tmp.path(), &LoadHints::new("Providence", "M", "2024")).expect("load");
    assert_eq!(report.files.len(), 1);
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].swimmer().id, "S1");
}

#[test]
fn directory_falls_back_to_every_csv() {
    let tmp = TempDir::new().expect("tmp");
    fs::write(tmp.path().join("a.csv"), "S1,Alex,2008,M,100,Free,SCY,2024-01-01,60.0\nbad line\n").expect("write");
    fs::write(tmp.path().join("b.csv"), "S2,Blair,2007,M,100,Free,SCY,2024-01-01,55.0\n").expect("write");
    fs::write(tmp.path().join("notes.txt"), "S3,Casey,2006,F,100,Free,SCY,2024-01-01,58.0\n").expect("write");

    let report = ingest_directory(tmp.path(), &LoadHints::new("Nowhere", "F", "1999")).expect("load");
    assert_eq!(report.files.len(), 2);
    let ids: Vec<&str> = report.results.iter().map(|r| r.swimmer().id.as_str()).collect();
    assert_eq!(ids, vec!["S1", "S2"]);
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.diagnostics[0].line, 2);
    assert_eq!(report.diagnostics[0].file.as_deref(), Some(tmp.path().join("a.csv").as_path()));
}

#[test]
fn empty_directory_is_no_input() {
    let tmp = TempDir::new().expect("tmp");
    fs::write(tmp.path().join("readme.md"), "nothing here").expect("write");

    let err = ingest_directory(tmp.path(), &LoadHints::default()).unwrap_err();
    assert!(matches!(err, IngestError::NoInput { .. }));
}

#[test]
fn missing_file_is_io_error() {
    let tmp = TempDir::new().expect("tmp");
    let err = ingest_file(tmp.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, IngestError::Io { .. }));
}

#[test]
fn quote_characters_are_plain_text() {
    let report = parse_lines([
        r#"S1,"Alex,2008,F,100,Free,SCY,2024-01-01,60.0"#,
        r#"S2,Al "Bo" Jones,2007,M,100,Free,SCY,2024-01-01,55.0"#,
        r#"S3,"Casey" Jr,2008,F,100,Free,SCY,2024-01-01,58.0"#,
    ]);
    assert_eq!(report.skipped(), 0);
    let names: Vec<&str> = report.results.iter().map(|r| r.swimmer().name.as_str()).collect();
    assert_eq!(names, vec![r#""Alex"#, r#"Al "Bo" Jones"#, r#""Casey" Jr"#]);
}

#[test]
fn only_column_zero_hash_marks_a_comment() {
    let report = parse_lines([
        "# header comment",
        "  # indented, so not a comment",
        "S1,Alex,2008,F,100,Free,SCY,2024-01-01,60.0",
    ]);
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.diagnostics[0].line, 2);
    assert!(matches!(
        report.diagnostics[0].reason,
        LineError::Field(FieldError::TooFewFields { .. })
    ));
}

const BAD_UTF8: &[u8] = b"S1,Alex,2008,F,100,Free,SCY,2024-01-01,60.0\r\n\
S2,Bl\xffair,2007,M,100,Free,SCY,2024-01-01,55.0\n\
S3,Casey,2006,F,100,Free,SCY,2024-01-01,58.0\n";

#[test]
fn undecodable_line_is_skipped_not_the_whole_file() {
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("mixed.csv");
    fs::write(&path, BAD_UTF8).expect("write");

    let report = ingest_file(&path).expect("load");
    let ids: Vec<&str> = report.results.iter().map(|r| r.swimmer().id.as_str()).collect();
    assert_eq!(ids, vec!["S1", "S3"]);
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.diagnostics[0].line, 2);
    assert_eq!(report.diagnostics[0].reason, LineError::Encoding { column: 6 });
    assert_eq!(report.results[0].time(), 60.0);
}

#[test]
fn directory_with_one_partly_undecodable_file_still_loads() {
    let tmp = TempDir::new().expect("tmp");
    fs::write(tmp.path().join("only.csv"), BAD_UTF8).expect("write");

    let report = ingest_directory(tmp.path(), &LoadHints::default()).expect("load");
    assert_eq!(report.files.len(), 1);
    assert_eq!(report.results.len(), 2);
    assert_eq!(report.skipped(), 1);
}
