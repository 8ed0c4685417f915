// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// EasyPrinter: print, scan, and copy on one office printer.
//
// Entry point. Initialises logging and app services, then runs one
// subcommand.

mod cli;
mod services;

use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;

use easyprinter_core::human_errors::humanize_error;
use easyprinter_core::types::{JobResult, PrinterStatus, TONER_UNKNOWN};
use easyprinter_device::{JobEvent, JobHandle, select_target};

use cli::{Cli, Commands, OutputFormat};
use services::app_services::AppServices;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let svc = AppServices::init();
    let format = cli.format;

    match cli.command {
        Commands::Status => {
            let status = svc.monitor().poll_once().await;
            emit(format, &status, render_status);
            ExitCode::SUCCESS
        }
        Commands::Watch => watch(&svc, format).await,
        Commands::List => list(&svc, format).await,
        Commands::Print(args) => {
            let handle = svc.workers().spawn_print(args.file.clone(), args.to_settings());
            finish_job(handle, format).await
        }
        Commands::Scan(args) => {
            let handle = svc.workers().spawn_scan(args.to_settings());
            finish_job(handle, format).await
        }
        Commands::Copy(args) => {
            let (scan_settings, print_settings) = args.to_settings();
            let handle = svc
                .workers()
                .spawn_copy(scan_settings, print_settings, args.copies);
            finish_job(handle, format).await
        }
        Commands::Config { write } => config(&svc, format, write),
    }
}

async fn watch(svc: &AppServices, format: OutputFormat) -> ExitCode {
    let monitor = svc.monitor();
    let subscription = monitor.subscribe(move |status| emit(format, status, render_status));
    monitor.start();

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "cannot listen for Ctrl-C");
    }

    monitor.stop();
    monitor.unsubscribe(subscription);
    ExitCode::SUCCESS
}

#[derive(Serialize)]
struct Listing {
    printers: Vec<String>,
    scanners: Vec<String>,
    target_printer: Option<String>,
    target_scanner: Option<String>,
}

async fn list(svc: &AppServices, format: OutputFormat) -> ExitCode {
    let discovery = svc.discovery();
    let config = svc.config();
    let (printers, scanners) = tokio::join!(discovery.list_devices(), discovery.list_scanners());
    let listing = Listing {
        target_printer: select_target(&printers, &config),
        target_scanner: select_target(&scanners, &config),
        printers,
        scanners,
    };
    emit(format, &listing, |l| {
        let mut out = String::from("Принтеры:\n");
        push_names(&mut out, &l.printers, l.target_printer.as_deref());
        out.push_str("Сканеры:\n");
        push_names(&mut out, &l.scanners, l.target_scanner.as_deref());
        out
    });
    ExitCode::SUCCESS
}

fn push_names(out: &mut String, names: &[String], target: Option<&str>) {
    if names.is_empty() {
        out.push_str("  (нет)\n");
    }
    for name in names {
        let marker = if Some(name.as_str()) == target { '*' } else { ' ' };
        out.push_str(&format!("{marker} {name}\n"));
    }
}

fn config(svc: &AppServices, format: OutputFormat, write: bool) -> ExitCode {
    let config = svc.config();
    if write {
        if let Err(e) = svc.save_config(&config) {
            eprintln!("{}", humanize_error(&e));
            return ExitCode::FAILURE;
        }
    }
    if format == OutputFormat::Text {
        println!("{} ({})", svc.config_path().display(), svc.backend().kind());
    }
    match serde_json::to_string_pretty(&config) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::error!(error = %e, "cannot serialise config"),
    }
    ExitCode::SUCCESS
}

/// Show progress on stderr and the final result on stdout.
async fn finish_job(mut handle: JobHandle, format: OutputFormat) -> ExitCode {
    let mut result = None;
    while let Some(event) = handle.events.recv().await {
        match event {
            JobEvent::Progress { message, percent } => {
                if format == OutputFormat::Text {
                    eprintln!("[{percent:>3}%] {message}");
                }
            }
            JobEvent::Completed(done) => result = Some(done),
        }
    }

    let result = result.unwrap_or_else(|| JobResult::failed(handle.id, "Задание прервано"));
    emit(format, &result, render_result);
    if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn emit<T: Serialize>(format: OutputFormat, value: &T, text: impl Fn(&T) -> String) {
    match format {
        OutputFormat::Text => println!("{}", text(value)),
        OutputFormat::Json => match serde_json::to_string(value) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::error!(error = %e, "cannot serialise output"),
        },
    }
}

fn render_status(status: &PrinterStatus) -> String {
    let name = status.name.as_deref().unwrap_or("-");
    let toner = if status.toner_percent == TONER_UNKNOWN {
        "нет данных".to_string()
    } else {
        format!("{}%", status.toner_percent)
    };
    format!(
        "{} [{}] {}: {} (очередь: {}, тонер: {})",
        status.observed_at.format("%H:%M:%S"),
        if status.online { "в сети" } else { "не в сети" },
        name,
        status.message,
        status.queue_depth,
        toner,
    )
}

fn render_result(result: &JobResult) -> String {
    match (&result.artifact_path, &result.error_message) {
        (_, Some(error)) => format!("Ошибка: {error}"),
        (Some(path), None) => format!("Готово: {}", path.display()),
        (None, None) => "Готово".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use easyprinter_core::types::{JobId, PrinterState};

    use super::*;

    #[test]
    fn status_line_shows_unknown_toner() {
        let status = PrinterStatus {
            name: Some("HP LaserJet".into()),
            online: true,
            state: PrinterState::Ready,
            message: "Готов к работе".into(),
            queue_depth: 2,
            ..PrinterStatus::default()
        };
        let line = render_status(&status);
        assert!(line.contains("HP LaserJet: Готов к работе"));
        assert!(line.contains("очередь: 2"));
        assert!(line.contains("тонер: нет данных"));
    }

    #[test]
    fn result_line_names_artifact() {
        let ok = JobResult::succeeded(JobId::new(), Some(PathBuf::from("/tmp/scan.pdf")));
        assert_eq!(render_result(&ok), "Готово: /tmp/scan.pdf");
        let failed = JobResult::failed(JobId::new(), "Принтер не найден.");
        assert_eq!(render_result(&failed), "Ошибка: Принтер не найден.");
    }

    #[test]
    fn target_is_marked_in_listing() {
        let mut out = String::new();
        push_names(
            &mut out,
            &["Canon".to_string(), "HP LaserJet".to_string()],
            Some("HP LaserJet"),
        );
        assert_eq!(out, "  Canon\n* HP LaserJet\n");
    }
}
