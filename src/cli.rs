//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_cot_adapter::CsvCotAdapter;
use crate::adapters::csv_export_adapter::CsvExportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::category::TraderCategory;
use crate::domain::config::{load_engine_config, EngineConfig, COT_SECTION};
use crate::domain::contract_codes::ContractCodeMap;
use crate::domain::engine::IndexingEngine;
use crate::domain::error::CotError;
use crate::domain::report::{CustomIndexPoint, PositioningRow};
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_DATA_DIR: &str = "data/cot";
pub const DEFAULT_OUTPUT_DIR: &str = "data/csv_data";
pub const DEFAULT_EVENT_LIST_DIR: &str = "data/real_test_data";

#[derive(Parser, Debug)]
#[command(name = "cotindex", about = "Commitments of Traders positioning indices")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute every index and export the CSV tables
    Run {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Print the latest positioning table
    Positioning {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(long = "asset-class")]
        asset_class: Vec<String>,
        #[arg(long)]
        symbol: Vec<String>,
    },
    /// Print the custom-index series of one instrument
    Series {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(short, long)]
        name: String,
    },
    /// List asset classes and their instruments
    List {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Run {
            config,
            data_dir,
            output_dir,
        } => run_export(&config, data_dir, output_dir),
        Command::Positioning {
            config,
            data_dir,
            asset_class,
            symbol,
        } => run_positioning(&config, data_dir, &asset_class, &symbol),
        Command::Series {
            config,
            data_dir,
            name,
        } => run_series(&config, data_dir, &name),
        Command::List { config } => run_list(&config),
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, CotError> {
    FileConfigAdapter::from_file(path).map_err(|e| CotError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Directories used by a run. Command-line overrides win over `[cot]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub event_list_dir: PathBuf,
}

pub fn resolve_paths(
    config: &dyn ConfigPort,
    data_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
) -> DataPaths {
    let configured = |key: &str, default: &str| {
        config
            .get_string(COT_SECTION, key)
            .filter(|v| !v.trim().is_empty())
            .map(|v| PathBuf::from(v.trim()))
            .unwrap_or_else(|| PathBuf::from(default))
    };
    DataPaths {
        data_dir: data_dir.unwrap_or_else(|| configured("data_dir", DEFAULT_DATA_DIR)),
        output_dir: output_dir.unwrap_or_else(|| configured("output_dir", DEFAULT_OUTPUT_DIR)),
        event_list_dir: configured("event_list_dir", DEFAULT_EVENT_LIST_DIR),
    }
}

pub fn build_engine_config(config: &dyn ConfigPort) -> Result<EngineConfig, CotError> {
    load_engine_config(config, &ContractCodeMap::builtin())
}

/// Full configuration check: config values plus the catalog's own rules
/// (unique contract codes and display names). Needs no extract data.
pub fn validate_config(config: &dyn ConfigPort) -> Result<EngineConfig, CotError> {
    let engine_config = build_engine_config(config)?;
    IndexingEngine::new(engine_config.clone())?;
    Ok(engine_config)
}

/// Loads the catalog and runs every computation stage over `data_dir`.
pub fn compute(config: &dyn ConfigPort, data_dir: &Path) -> Result<IndexingEngine, CotError> {
    let mut engine = IndexingEngine::new(build_engine_config(config)?)?;
    engine.run(&CsvCotAdapter::new(data_dir.to_path_buf()))?;
    Ok(engine)
}

pub fn run_pipeline(config: &dyn ConfigPort, paths: &DataPaths) -> Result<IndexingEngine, CotError> {
    let engine = compute(config, &paths.data_dir)?;
    engine.export(&CsvExportAdapter::new(
        paths.output_dir.clone(),
        paths.event_list_dir.clone(),
    ))?;
    Ok(engine)
}

fn run_export(
    config_path: &Path,
    data_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
) -> Result<(), CotError> {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = load_config(config_path)?;
    let paths = resolve_paths(&adapter, data_dir, output_dir);

    let engine = run_pipeline(&adapter, &paths)?;

    eprintln!("\n=== Latest Positioning ===");
    for row in engine.positioning_summary() {
        eprintln!(
            "  {:<6} {:<24} {}  Comm {:>3}  LrgSpec {:>3}  SmlSpec {:>3}",
            row.symbol,
            row.name,
            row.date,
            row.index[TraderCategory::Commercial],
            row.index[TraderCategory::LargeSpeculator],
            row.index[TraderCategory::SmallSpeculator],
        );
    }
    eprintln!("\nTables written to: {}", paths.output_dir.display());
    eprintln!("Event lists written to: {}", paths.event_list_dir.display());
    Ok(())
}

fn run_positioning(
    config_path: &Path,
    data_dir: Option<PathBuf>,
    asset_classes: &[String],
    symbols: &[String],
) -> Result<(), CotError> {
    let adapter = load_config(config_path)?;
    let paths = resolve_paths(&adapter, data_dir, None);
    let engine = compute(&adapter, &paths.data_dir)?;

    let rows = select_positioning(&engine, asset_classes, symbols);
    write_positioning_csv(&rows, io::stdout().lock())
}

/// Asset-class and symbol filters combine as a union; no filter selects all.
pub fn select_positioning(
    engine: &IndexingEngine,
    asset_classes: &[String],
    symbols: &[String],
) -> Vec<PositioningRow> {
    if asset_classes.is_empty() && symbols.is_empty() {
        return engine.positioning_summary();
    }
    let classes: Vec<&str> = asset_classes.iter().map(String::as_str).collect();
    let symbols: Vec<&str> = symbols.iter().map(String::as_str).collect();

    let mut rows = engine.positioning_by_asset_class(&classes);
    for row in engine.positioning_by_symbol(&symbols) {
        if !rows.iter().any(|r| r.symbol == row.symbol) {
            rows.push(row);
        }
    }
    rows
}

fn run_series(config_path: &Path, data_dir: Option<PathBuf>, name: &str) -> Result<(), CotError> {
    let adapter = load_config(config_path)?;
    let paths = resolve_paths(&adapter, data_dir, None);
    let engine = compute(&adapter, &paths.data_dir)?;

    let series = engine.custom_index_series(name)?;
    if series.is_empty() {
        eprintln!("{}: no computable weeks", name);
    }
    write_series_csv(&series, io::stdout().lock())
}

fn run_list(config_path: &Path) -> Result<(), CotError> {
    let adapter = load_config(config_path)?;
    let engine = IndexingEngine::new(build_engine_config(&adapter)?)?;
    write_catalog_listing(&engine, io::stdout().lock())
}

fn run_validate(config_path: &Path) -> Result<(), CotError> {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = load_config(config_path)?;
    let config = validate_config(&adapter)?;

    let years: Vec<String> = config.years.iter().map(i32::to_string).collect();
    eprintln!("  years:     {}", years.join(", "));
    let lookbacks: Vec<&str> = config.lookbacks.iter().map(|l| l.name.as_str()).collect();
    eprintln!(
        "  lookbacks: custom{}{}",
        if lookbacks.is_empty() { "" } else { ", " },
        lookbacks.join(", ")
    );

    let unmapped = config.unmapped_symbols().len();
    let included = config.instruments.len() - unmapped;
    for spec in &config.instruments {
        if spec.contract_code.is_empty() {
            eprintln!("  excluded:  {} ({}), no contract code", spec.symbol, spec.name);
        } else {
            eprintln!(
                "  included:  {} ({}) {} custom {}w",
                spec.symbol, spec.name, spec.contract_code, spec.custom_lookback_weeks
            );
        }
    }

    eprintln!(
        "\nConfiguration is valid: {} instruments included, {} excluded.",
        included, unmapped
    );
    Ok(())
}

fn csv_err(e: csv::Error) -> CotError {
    CotError::Export {
        reason: e.to_string(),
    }
}

pub fn write_positioning_csv<W: Write>(rows: &[PositioningRow], out: W) -> Result<(), CotError> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["Date", "Symbol", "Name", "Commercials", "Large Specs", "Small Specs"])
        .map_err(csv_err)?;
    for row in rows {
        let mut record = vec![
            row.date.format("%Y-%m-%d").to_string(),
            row.symbol.clone(),
            row.name.clone(),
        ];
        record.extend(row.index.iter().map(|(_, v)| v.to_string()));
        wtr.write_record(&record).map_err(csv_err)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_series_csv<W: Write>(series: &[CustomIndexPoint], out: W) -> Result<(), CotError> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record([
        "date",
        "comms",
        "lrg",
        "sml",
        "comms_net",
        "lrg_net",
        "sml_net",
    ])
    .map_err(csv_err)?;
    for point in series {
        let mut record = vec![point.date.format("%Y-%m-%d").to_string()];
        record.extend(point.index.iter().map(|(_, v)| v.to_string()));
        record.extend(point.net.iter().map(|(_, v)| v.to_string()));
        wtr.write_record(&record).map_err(csv_err)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_catalog_listing<W: Write>(engine: &IndexingEngine, mut out: W) -> Result<(), CotError> {
    let default = engine.default_asset_class();
    for asset_class in engine.asset_classes() {
        let marker = if asset_class == default { " (default)" } else { "" };
        writeln!(out, "{asset_class}{marker}")?;
        for name in engine.instruments_in_asset_class(asset_class) {
            if let Some(instrument) = engine.instrument_by_name(name) {
                writeln!(
                    out,
                    "  {:<6} {:<24} {}",
                    instrument.symbol, instrument.name, instrument.code
                )?;
            }
        }
    }
    Ok(())
}
