//! CLI integration tests for the command orchestration.
//!
//! Tests cover:
//! - Config loading and path resolution
//! - Full pipeline over yearly extracts on disk
//! - Table output of the positioning, series and list commands
//! - Error exit codes

mod common;

use common::*;
use cotindex::adapters::file_config_adapter::FileConfigAdapter;
use cotindex::cli::{self, DataPaths};
use cotindex::domain::error::CotError;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const HEADER: &str = "Market_and_Exchange_Names,Report_Date_as_MM_DD_YYYY,CFTC_Contract_Market_Code,Open_Interest_All,NonComm_Positions_Long_All,NonComm_Positions_Short_All,Comm_Positions_Long_All,Comm_Positions_Short_All,NonRept_Positions_Long_All,NonRept_Positions_Short_All";

const VALID_INI: &str = r#"
[cot]
years = 2023, 2024
lookbacks = 3W:3

[catalog]
asset_classes = Metals, Currencies

[Metals]
symbols = GC, XAU

[Currencies]
symbols = 6E

[GC]
name = Gold
custom_lookback_weeks = 2

[XAU]
name = Spot Gold
custom_lookback_weeks = 2

[6E]
name = Euro FX
custom_lookback_weeks = 1
"#;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// One extract line; NonComm and NonRept positions are fixed.
fn line(market: &str, date: &str, code: &str, comm_long: i64) -> String {
    format!("{market},{date},{code},1000,300,100,{comm_long},0,40,60")
}

fn write_extracts(dir: &Path) {
    let y2023 = [
        line("GOLD", "12/19/2023", "088691", 0),
        line("GOLD", "12/26/2023", "88691", 5),
        line("EURO FX", "2023-12-26", "099741", 7),
        line("PLATINUM", "2023-12-26", "076651", 1),
    ];
    let y2024 = [
        line("GOLD", "2024-01-09", "088691", 5),
        line("GOLD", "2024-01-02", "088691", 10),
        line("GOLD", "2024-01-16", "088691", 0),
        line("EURO FX", "2024-01-02", "099741", 9),
    ];
    for (year, rows) in [(2023, &y2023), (2024, &y2024)] {
        let mut content = String::from(HEADER);
        for row in rows.iter() {
            content.push('\n');
            content.push_str(row);
        }
        content.push('\n');
        fs::write(dir.join(format!("{year}.csv")), content).unwrap();
    }
}

fn paths(dir: &TempDir) -> DataPaths {
    let data_dir = dir.path().join("cot");
    fs::create_dir_all(&data_dir).unwrap();
    write_extracts(&data_dir);
    DataPaths {
        data_dir,
        output_dir: dir.path().join("csv_data"),
        event_list_dir: dir.path().join("real_test_data"),
    }
}

fn read_lines(path: PathBuf) -> Vec<String> {
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("{}: {e}", path.display()))
        .lines()
        .map(str::to_string)
        .collect()
}

mod config_loading {
    use super::*;

    #[test]
    fn load_config_missing_file_is_parse_error() {
        let err = cli::load_config(Path::new("/nonexistent/cot.ini")).unwrap_err();
        assert!(matches!(err, CotError::ConfigParse { .. }));
        assert_eq!(err.exit_status(), 2);
    }

    #[test]
    fn load_config_from_disk() {
        let file = write_temp_ini(VALID_INI);
        let adapter = cli::load_config(file.path()).unwrap();
        let config = cli::build_engine_config(&adapter).unwrap();
        assert_eq!(config.years, vec![2023, 2024]);
        assert_eq!(config.unmapped_symbols(), vec!["XAU"]);
    }

    #[test]
    fn resolve_paths_defaults() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let paths = cli::resolve_paths(&adapter, None, None);
        assert_eq!(paths.data_dir, PathBuf::from(cli::DEFAULT_DATA_DIR));
        assert_eq!(paths.output_dir, PathBuf::from(cli::DEFAULT_OUTPUT_DIR));
        assert_eq!(paths.event_list_dir, PathBuf::from(cli::DEFAULT_EVENT_LIST_DIR));
    }

    #[test]
    fn resolve_paths_overrides_win() {
        let ini = "[cot]\nyears = 2024\ndata_dir = /srv/cot\noutput_dir = /srv/out\nevent_list_dir = /srv/rt\n";
        let adapter = FileConfigAdapter::from_string(ini).unwrap();

        let paths = cli::resolve_paths(&adapter, None, None);
        assert_eq!(paths.data_dir, PathBuf::from("/srv/cot"));
        assert_eq!(paths.event_list_dir, PathBuf::from("/srv/rt"));

        let paths = cli::resolve_paths(&adapter, Some("here".into()), Some("there".into()));
        assert_eq!(paths.data_dir, PathBuf::from("here"));
        assert_eq!(paths.output_dir, PathBuf::from("there"));
    }

    #[test]
    fn invalid_lookbacks_fail_validation() {
        let adapter =
            FileConfigAdapter::from_string(&VALID_INI.replace("3W:3", "3W:three")).unwrap();
        let err = cli::build_engine_config(&adapter).unwrap_err();
        assert!(matches!(err, CotError::ConfigInvalid { .. }));
    }

    const GOLD_PAIR_INI: &str = r#"
[cot]
years = 2024

[catalog]
asset_classes = Metals

[Metals]
symbols = GC, MGC

[GC]
name = Gold
custom_lookback_weeks = 2

[MGC]
name = Gold Mini
contract_code = 088691
custom_lookback_weeks = 2
"#;

    #[test]
    fn validate_accepts_valid_catalog() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let config = cli::validate_config(&adapter).unwrap();
        assert_eq!(config.instruments.len(), 3);
    }

    #[test]
    fn validate_rejects_duplicate_contract_code() {
        let adapter = FileConfigAdapter::from_string(GOLD_PAIR_INI).unwrap();
        // config values alone are fine; the catalog rejects the shared code
        assert!(cli::build_engine_config(&adapter).is_ok());

        let err = cli::validate_config(&adapter).unwrap_err();
        assert!(
            matches!(&err, CotError::ConfigInvalid { key, .. } if key == "contract_code"),
            "{err}"
        );
        assert_eq!(err.exit_status(), 2);
    }

    #[test]
    fn validate_rejects_duplicate_name() {
        let ini = GOLD_PAIR_INI
            .replace("name = Gold Mini", "name = Gold")
            .replace("contract_code = 088691", "contract_code = 999999");
        let adapter = FileConfigAdapter::from_string(&ini).unwrap();

        let err = cli::validate_config(&adapter).unwrap_err();
        assert!(
            matches!(&err, CotError::ConfigInvalid { key, .. } if key == "name"),
            "{err}"
        );
        assert_eq!(err.exit_status(), 2);
    }
}

mod pipeline {
    use super::*;

    #[test]
    fn run_pipeline_writes_every_table() {
        let dir = TempDir::new().unwrap();
        let paths = paths(&dir);
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let engine = cli::run_pipeline(&adapter, &paths).unwrap();

        assert_eq!(engine.instrument_symbols(), vec!["GC", "6E"]);

        let detailed = read_lines(paths.output_dir.join("detailed/Gold.csv"));
        assert_eq!(detailed.len(), 6);
        assert!(detailed[0].ends_with("Comm-3W-idx,LrgSpec-3W-idx,SmlSpec-3W-idx"));
        assert!(detailed[1].starts_with("0,2023-12-19,088691,1000,0,0,0,300,100,200,40,60,-20"));
        assert!(detailed[3].starts_with("2,2024-01-02,088691"));

        let summary = read_lines(paths.output_dir.join("summary/summary_Gold.csv"));
        assert_eq!(summary[3], "2024-01-02,088691,1000,10,200,-20,100,50,50,-1,-1,-1");
        assert_eq!(summary[5], "2024-01-16,088691,1000,0,200,-20,0,50,50,0,50,50");

        let positioning = read_lines(paths.output_dir.join("positioning_summary.csv"));
        assert_eq!(
            positioning,
            vec![
                "Date,Symbol,Name,Commercials,Large Specs,Small Specs",
                "2024-01-16,GC,Gold,0,50,50",
                "2024-01-02,6E,Euro FX,100,50,50",
            ]
        );

        let events = read_lines(
            paths
                .event_list_dir
                .join("RT_custom_index_event_list_Gold.csv"),
        );
        assert_eq!(events[0], "Date,Symbol,Type,Value");
        assert_eq!(events[1], "2024-01-02,GC,1,100");
        assert_eq!(events.len(), 1 + 3 * 3);

        let net = read_lines(
            paths
                .event_list_dir
                .join("RT_net_position_event_list_Euro FX.csv"),
        );
        assert_eq!(net, vec!["Date,Symbol,Type,Value", "2024-01-02,6E,1,9", "2024-01-02,6E,2,200", "2024-01-02,6E,3,-20"]);
    }

    #[test]
    fn missing_extract_is_source_error() {
        let dir = TempDir::new().unwrap();
        let paths = paths(&dir);
        fs::remove_file(paths.data_dir.join("2023.csv")).unwrap();

        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let err = cli::run_pipeline(&adapter, &paths).unwrap_err();
        assert!(matches!(err, CotError::SourceData { year: 2023, .. }));
        assert!(!paths.output_dir.exists());
    }
}

mod output {
    use super::*;

    fn computed() -> cotindex::domain::engine::IndexingEngine {
        let dir = TempDir::new().unwrap();
        let paths = paths(&dir);
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        cli::compute(&adapter, &paths.data_dir).unwrap()
    }

    fn to_string(bytes: Vec<u8>) -> String {
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn positioning_filters_combine() {
        let engine = computed();
        assert_eq!(cli::select_positioning(&engine, &[], &[]).len(), 2);

        let metals = cli::select_positioning(&engine, &["Metals".into()], &[]);
        assert_eq!(metals.len(), 1);
        assert_eq!(metals[0].symbol, "GC");

        let both = cli::select_positioning(&engine, &["Metals".into()], &["6E".into(), "GC".into()]);
        let symbols: Vec<&str> = both.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["GC", "6E"]);

        assert!(cli::select_positioning(&engine, &["Energies".into()], &[]).is_empty());
    }

    #[test]
    fn positioning_csv() {
        let engine = computed();
        let mut out = Vec::new();
        cli::write_positioning_csv(&engine.positioning_summary(), &mut out).unwrap();
        assert_eq!(
            to_string(out),
            "Date,Symbol,Name,Commercials,Large Specs,Small Specs\n\
             2024-01-16,GC,Gold,0,50,50\n\
             2024-01-02,6E,Euro FX,100,50,50\n"
        );
    }

    #[test]
    fn series_csv() {
        let engine = computed();
        let mut out = Vec::new();
        cli::write_series_csv(&engine.custom_index_series("Gold").unwrap(), &mut out).unwrap();
        let text = to_string(out);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "date,comms,lrg,sml,comms_net,lrg_net,sml_net");
        assert_eq!(lines[1], "2024-01-02,100,50,50,10,200,-20");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn catalog_listing_marks_default() {
        let engine = computed();
        let mut out = Vec::new();
        cli::write_catalog_listing(&engine, &mut out).unwrap();
        let text = to_string(out);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Metals (default)");
        assert!(lines[1].contains("GC") && lines[1].contains("Gold") && lines[1].contains("088691"));
        assert_eq!(lines[2], "Currencies");
        assert!(lines[3].contains("Euro FX"));
    }
}
