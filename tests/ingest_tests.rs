//! Ingest tests: drop file discovery, parsing, and file-level dedup

use std::fs;
use std::path::Path;

use motorsport_curation_sdk::ingest::{DedupStrategy, Ingestor};
use motorsport_curation_sdk::models::EntityKind;
use motorsport_curation_sdk::pipeline::CurationPipeline;

fn write_drop(root: &Path, drop_id: &str, files: &[(&str, &str)]) {
    let dir = root.join(drop_id);
    fs::create_dir_all(&dir).expect("create drop dir");
    for (name, content) in files {
        fs::write(dir.join(name), content).expect("write raw file");
    }
}

mod discovery_tests {
    use super::*;

    #[test]
    fn test_load_drop_reads_json_and_jsonl() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write_drop(
            tmp.path(),
            "2021-01-01",
            &[
                (
                    "constructors.json",
                    r#"[{"constructorId": 1, "constructorRef": "mclaren", "name": "McLaren"}]"#,
                ),
                (
                    "results.jsonl",
                    "{\"resultId\": 1, \"raceId\": 1, \"driverId\": 10, \"constructorId\": 1}\n\
                     {\"resultId\": 2, \"raceId\": 1, \"driverId\": 11, \"constructorId\": 1}\n",
                ),
            ],
        );

        let mut ingestor = Ingestor::new("ergast", DedupStrategy::None);
        let (drop, stats) = ingestor.load_drop(tmp.path(), "2021-01-01").unwrap();

        assert_eq!(stats.files_processed, 2);
        assert_eq!(stats.records_ingested, 3);
        assert_eq!(stats.errors_count, 0);

        let kinds: Vec<EntityKind> = drop.batches.iter().map(|(k, _)| *k).collect();
        assert!(kinds.contains(&EntityKind::Constructor));
        assert!(kinds.contains(&EntityKind::Result));
    }

    #[test]
    fn test_unrecognized_stem_is_skipped() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write_drop(
            tmp.path(),
            "2021-01-01",
            &[("sponsors.json", r#"[{"sponsorId": 1}]"#)],
        );

        let mut ingestor = Ingestor::new("ergast", DedupStrategy::None);
        let (drop, stats) = ingestor.load_drop(tmp.path(), "2021-01-01").unwrap();

        assert!(drop.batches.is_empty());
        assert_eq!(stats.files_skipped, 1);
        assert_eq!(stats.errors_count, 0);
    }

    #[test]
    fn test_malformed_file_is_reported_and_skipped() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write_drop(
            tmp.path(),
            "2021-01-01",
            &[
                ("drivers.json", "{not valid json"),
                (
                    "constructors.json",
                    r#"[{"constructorId": 1, "constructorRef": "mclaren", "name": "McLaren"}]"#,
                ),
            ],
        );

        let mut ingestor = Ingestor::new("ergast", DedupStrategy::None);
        let (drop, stats) = ingestor.load_drop(tmp.path(), "2021-01-01").unwrap();

        assert_eq!(stats.errors_count, 1);
        assert!(stats.errors[0].contains("drivers.json"));
        assert_eq!(stats.files_processed, 1);
        assert_eq!(drop.batches.len(), 1);
    }
}

mod dedup_tests {
    use super::*;

    #[test]
    fn test_re_ingesting_same_drop_skips_by_path() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write_drop(
            tmp.path(),
            "2021-01-01",
            &[(
                "constructors.json",
                r#"[{"constructorId": 1, "constructorRef": "mclaren", "name": "McLaren"}]"#,
            )],
        );

        let mut ingestor = Ingestor::new("ergast", DedupStrategy::ByPath);
        let (_, first) = ingestor.load_drop(tmp.path(), "2021-01-01").unwrap();
        assert_eq!(first.files_processed, 1);

        let (drop, second) = ingestor.load_drop(tmp.path(), "2021-01-01").unwrap();
        assert_eq!(second.files_processed, 0);
        assert_eq!(second.files_skipped, 1);
        assert!(drop.batches.is_empty());
    }

    #[test]
    fn test_identical_content_in_new_drop_skips_by_content() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let content = r#"[{"constructorId": 1, "constructorRef": "mclaren", "name": "McLaren"}]"#;
        write_drop(tmp.path(), "2021-01-01", &[("constructors.json", content)]);
        write_drop(tmp.path(), "2021-01-02", &[("constructors.json", content)]);

        let mut ingestor = Ingestor::new("ergast", DedupStrategy::ByContent);
        let (_, first) = ingestor.load_drop(tmp.path(), "2021-01-01").unwrap();
        assert_eq!(first.files_processed, 1);

        let (_, second) = ingestor.load_drop(tmp.path(), "2021-01-02").unwrap();
        assert_eq!(second.files_processed, 0);
        assert_eq!(second.files_skipped, 1);
    }
}

mod hash_failure_tests {
    use super::*;
    use motorsport_curation_sdk::ingest::DiscoveredFile;
    use std::path::PathBuf;

    #[test]
    fn test_compute_hash_on_missing_file_errors() {
        let mut file = DiscoveredFile::new(PathBuf::from("/nonexistent/raw.json"), 0);
        assert!(file.compute_hash().is_err());
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn test_unhashable_file_is_recorded_and_skipped() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write_drop(
            tmp.path(),
            "2021-01-01",
            &[(
                "constructors.json",
                r#"[{"constructorId": 1, "constructorRef": "mclaren", "name": "McLaren"}]"#,
            )],
        );
        // a pseudo-file that stats as regular but fails on read, so the
        // content-hash pass cannot hash it
        std::os::unix::fs::symlink(
            "/proc/self/mem",
            tmp.path().join("2021-01-01").join("drivers.json"),
        )
        .expect("symlink");

        let mut ingestor = Ingestor::new("ergast", DedupStrategy::ByContent);
        let (drop, stats) = ingestor.load_drop(tmp.path(), "2021-01-01").unwrap();

        assert_eq!(stats.errors_count, 1);
        assert_eq!(stats.files_skipped, 1);
        assert_eq!(stats.files_processed, 1);
        assert_eq!(drop.batches.len(), 1);
    }
}

mod pipeline_integration_tests {
    use super::*;

    #[test]
    fn test_run_drop_from_dir_end_to_end() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write_drop(
            tmp.path(),
            "2021-01-01",
            &[
                (
                    "circuits.json",
                    r#"[{"circuitId": 1, "circuitRef": "albert_park", "name": "Albert Park"}]"#,
                ),
                (
                    "races.json",
                    r#"[{"raceId": 1, "year": 2021, "round": 1, "circuitId": 1,
                         "name": "Australian Grand Prix", "date": "2021-03-28"}]"#,
                ),
                (
                    "constructors.json",
                    r#"[{"constructorId": 100, "constructorRef": "mercedes", "name": "Mercedes"}]"#,
                ),
                (
                    "drivers.json",
                    r#"[{"driverId": 10, "driverRef": "hamilton",
                         "name": {"forename": "Lewis", "surname": "Hamilton"}},
                        {"driverId": 11, "driverRef": "bottas",
                         "name": {"forename": "Valtteri", "surname": "Bottas"}}]"#,
                ),
                (
                    "results.json",
                    r#"[{"resultId": 1, "raceId": 1, "driverId": 10, "constructorId": 100,
                         "points": 25, "position": 1},
                        {"resultId": 2, "raceId": 1, "driverId": 11, "constructorId": 100,
                         "points": 18, "position": 2}]"#,
                ),
            ],
        );

        let mut ingestor = Ingestor::new("ergast", DedupStrategy::ByPath);
        let mut pipeline = CurationPipeline::new();
        let (report, stats) = pipeline
            .run_drop_from_dir(&mut ingestor, tmp.path(), "2021-01-01")
            .unwrap();

        assert_eq!(stats.files_processed, 5);
        assert!(report.schema_errors.is_empty());
        assert_eq!(report.facts_emitted, 2);

        let standings = pipeline.driver_standings(2021).expect("season 2021");
        assert_eq!(standings.rows[0].competitor_name, "Lewis Hamilton");
        assert_eq!(standings.rows[0].rank, 1);
    }
}
