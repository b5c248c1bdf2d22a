//! `medlist` - CLI for the doctor directory
//!
//! This binary provides the command-line interface for browsing, searching,
//! and maintaining the directory.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::fs;

use anyhow::{bail, Context};
use chrono::Utc;
use clap::Parser;
use tracing::{info, warn};

use medlist::cli::{
    Cli, Command, ConfigCommand, DeleteCommand, EditCommand, ExportCommand, OutputFormat,
    RegisterCommand, ResetCommand,
};
use medlist::{init_logging, Config, Directory, DoctorId, DoctorRecord, EditorGate, Storage};

type Catalog = Directory<Storage>;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Configuration commands never touch the database
    let command = match cli.command {
        Command::Config(config_cmd) => return handle_config(&config, config_cmd),
        other => other,
    };

    let storage = Storage::open(config.database_path(), config.storage.slot.clone())
        .context("could not open the doctor database")?;
    let mut directory = Directory::open(storage);

    match command {
        Command::List(list_cmd) => {
            let records: Vec<&DoctorRecord> = directory.records().iter().collect();
            render(&records, list_cmd.format)
        }
        Command::Search(search_cmd) => {
            let records = directory.search(&search_cmd.query);
            if records.is_empty() && search_cmd.format != OutputFormat::Json {
                println!("No doctors match \"{}\".", search_cmd.query.trim());
                return Ok(());
            }
            render(&records, search_cmd.format)
        }
        Command::Register(register_cmd) => handle_register(&mut directory, register_cmd),
        Command::Edit(edit_cmd) => handle_edit(&config, &mut directory, &edit_cmd),
        Command::Delete(delete_cmd) => handle_delete(&config, &mut directory, &delete_cmd),
        Command::Export(export_cmd) => handle_export(&directory, export_cmd),
        Command::Reset(reset_cmd) => handle_reset(&config, &mut directory, &reset_cmd),
        Command::Config(_) => Ok(()),
    }
}

fn unlock_editor(config: &Config, pin: &str) -> anyhow::Result<EditorGate> {
    let mut gate = EditorGate::new(config.editor.pin.clone());
    gate.unlock(pin);
    gate.require_unlocked()?;
    Ok(gate)
}

fn not_found_notice(id: DoctorId) {
    warn!("No doctor with id {}", id);
    println!("No doctor with id {id}; nothing changed.");
}

fn handle_register(directory: &mut Catalog, cmd: RegisterCommand) -> anyhow::Result<()> {
    let record = directory.register(cmd.into_fields())?;
    info!("Registered doctor {}", record.id);
    println!("Doctor registered successfully.");
    print_card(&record);
    Ok(())
}

fn handle_edit(config: &Config, directory: &mut Catalog, cmd: &EditCommand) -> anyhow::Result<()> {
    unlock_editor(config, &cmd.pin)?;

    let Some(existing) = directory.get(cmd.id) else {
        not_found_notice(cmd.id);
        return Ok(());
    };

    let mut fields = existing.fields();
    let mut custom = existing.custom.clone();
    cmd.apply(&mut fields);
    cmd.apply_custom(&mut custom)?;

    match directory.update(cmd.id, fields, custom) {
        Ok(record) => {
            println!("Doctor updated successfully.");
            print_card(&record);
            if directory.store().is_seed(record.id) {
                println!("Note: changes to built-in doctors last for this session only.");
            }
            Ok(())
        }
        Err(e) if e.is_not_found() => {
            not_found_notice(cmd.id);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn handle_delete(
    config: &Config,
    directory: &mut Catalog,
    cmd: &DeleteCommand,
) -> anyhow::Result<()> {
    unlock_editor(config, &cmd.pin)?;

    match directory.delete(cmd.id) {
        Ok(record) => {
            println!("Deleted {} (id {}).", record.name, record.id);
            if directory.store().is_seed(record.id) {
                println!("Note: built-in doctors reappear the next time the directory loads.");
            }
            Ok(())
        }
        Err(e) if e.is_not_found() => {
            not_found_notice(cmd.id);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn handle_export(directory: &Catalog, cmd: ExportCommand) -> anyhow::Result<()> {
    let payload = directory.export(Utc::now());
    let json = serde_json::to_string_pretty(&payload)?;

    match cmd.output {
        Some(mut path) => {
            if path.is_dir() {
                path.push(payload.backup_file_name());
            }
            fs::write(&path, json)
                .with_context(|| format!("could not write backup to {}", path.display()))?;
            println!(
                "Exported {} doctors to {}",
                payload.total_doctors,
                path.display()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn handle_reset(config: &Config, directory: &mut Catalog, cmd: &ResetCommand) -> anyhow::Result<()> {
    unlock_editor(config, &cmd.pin)?;

    if !cmd.yes {
        println!("This removes every registered and edited doctor.");
        println!("Use --yes to confirm.");
        return Ok(());
    }

    directory.reset()?;
    println!(
        "Directory reset to {} built-in doctors.",
        directory.records().len()
    );
    Ok(())
}

fn render(records: &[&DoctorRecord], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(records)?),
        OutputFormat::Table => {
            println!("{:<15} {:<30} {:<20} PHONE", "ID", "NAME", "SPECIALTY");
            for record in records {
                println!(
                    "{:<15} {:<30} {:<20} {}",
                    record.id, record.name, record.specialty, record.phone
                );
            }
        }
        OutputFormat::Plain => {
            for (i, record) in records.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                print_card(record);
            }
        }
    }
    Ok(())
}

fn print_card(record: &DoctorRecord) {
    println!("[{}] {}", record.id, record.name);
    println!("  Specialty:  {}", record.specialty);
    println!("  Phone:      {}", record.phone);
    if let Some(clinic) = &record.clinic {
        println!("  Clinic:     {clinic}");
    }
    if let Some(schedule) = &record.schedule {
        println!("  Schedule:   {schedule}");
    }
    if let Some(address) = &record.address {
        println!("  Address:    {address}");
    }
    if let Some(years) = record.experience {
        println!("  Experience: {years} years");
    }
    for (key, value) in &record.custom {
        println!("  {key}: {value}");
    }
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                let mut shown = config.clone();
                shown.editor.pin = "****".to_string();
                println!("{}", serde_json::to_string_pretty(&shown)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!("  Slot:               {}", config.storage.slot);
                println!();
                println!("[Editor]");
                println!("  PIN:                (set)");
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            if let Err(e) = Config::load_from(Some(path)) {
                bail!("Configuration error: {e}");
            }
            println!("Configuration is valid.");
        }
    }
    Ok(())
}
