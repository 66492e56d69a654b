//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `sellbook_core` linkage and print a deterministic model summary.
//! - Exercise the config, logging and persistence bootstrap end to end.
//!
//! Usage: `sellbook_cli [config.json] [--json]`

use std::process::ExitCode;

use chrono::Local;
use log::{error, info};
use sellbook_core::{
    init_logging, open_db, open_db_in_memory, CoreConfig, ModelService, ModelStore,
};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let as_json = args.iter().any(|arg| arg == "--json");
    let config_path = args.iter().find(|arg| !arg.starts_with("--"));

    match run(config_path.map(String::as_str), as_json) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=cli_run module=cli status=error error={message}");
            eprintln!("sellbook: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(config_path: Option<&str>, as_json: bool) -> Result<(), String> {
    let config = match config_path {
        Some(path) => CoreConfig::load(path).map_err(|err| err.to_string())?,
        None => CoreConfig::default(),
    };
    config.validate().map_err(|err| err.to_string())?;

    if let Some(log_dir) = &config.log_dir {
        let level = config.log_level().map_err(|err| err.to_string())?;
        init_logging(level, &log_dir.to_string_lossy())?;
    }

    let conn = match &config.db_path {
        Some(path) => open_db(path),
        None => open_db_in_memory(),
    }
    .map_err(|err| err.to_string())?;
    let model = ModelStore::new(&conn)
        .load_model()
        .map_err(|err| err.to_string())?;
    info!("event=cli_run module=cli status=ok");

    print_summary(&model, as_json);
    Ok(())
}

fn print_summary(model: &ModelService, as_json: bool) {
    let now = Local::now().naive_local();
    let upcoming = model
        .schedules()
        .records()
        .iter()
        .filter(|schedule| schedule.time() >= now)
        .count();

    if as_json {
        let summary = serde_json::json!({
            "ping": sellbook_core::ping(),
            "version": sellbook_core::core_version(),
            "customers": model.customers().len(),
            "phones": model.phones().len(),
            "orders": model.orders().len(),
            "schedules": model.schedules().len(),
            "upcoming_schedules": upcoming,
            "archived_orders": model.archived_orders().len(),
        });
        println!("{summary}");
        return;
    }

    println!("sellbook_core ping={}", sellbook_core::ping());
    println!("sellbook_core version={}", sellbook_core::core_version());
    println!("customers={}", model.customers().len());
    println!("phones={}", model.phones().len());
    println!("orders={}", model.orders().len());
    println!("schedules={} upcoming={upcoming}", model.schedules().len());
    println!("archived_orders={}", model.archived_orders().len());
}
