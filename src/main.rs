mod cli;

use plateflow::{
    config::{self, Config},
    metadata, publish, rules, scanner, sheet,
    sheet::SheetStore,
    state::RowSet,
    tracking,
};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "plateflow=trace,plateflow_av=trace".to_string()
        } else {
            "plateflow=info,plateflow_av=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Scan { root, sheet_dir } => {
            run_scan(&root, cli.config.as_deref(), sheet_dir.as_deref())
        }
        Commands::Validate { root, checks, shot } => {
            run_validate(&root, cli.config.as_deref(), &checks, shot.as_deref())
        }
        Commands::Publish {
            root,
            shot,
            dry_run,
        } => run_publish(&root, cli.config.as_deref(), shot.as_deref(), dry_run),
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Version => {
            println!("plateflow {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn scan_rows(config: &Config, root: &Path, shot: Option<&str>) -> Result<RowSet> {
    let provider = metadata::create_provider(config);
    let scanner = scanner::Scanner::new(config, provider.as_ref());
    let mut rows = scanner.scan(root)?;
    if let Some(shot) = shot {
        rows.select_where(|row| row.shot == shot);
    }
    Ok(rows)
}

fn run_scan(root: &Path, config_path: Option<&Path>, sheet_dir: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let rows = scan_rows(&config, root, None)?;

    if rows.is_empty() {
        println!("No frame sequences found under {}", root.display());
        return Ok(());
    }

    println!("{} row(s):", rows.len());
    for row in rows.rows() {
        println!(
            "  {}/{}  {}  frames {}  tc {}  {}  [{}]",
            row.sequence,
            row.shot,
            row.version_label(),
            row.frame_range(),
            if row.timecode.is_empty() {
                "-"
            } else {
                row.timecode.as_str()
            },
            if row.colorspace.is_empty() {
                "-"
            } else {
                row.colorspace.as_str()
            },
            row.scan_dir.display()
        );
    }

    if let Some(sheet_dir) = sheet_dir {
        let records: Vec<sheet::SheetRecord> = rows.rows().iter().map(Into::into).collect();
        let seq_name = rows.rows().first().map(|row| row.sequence.clone());
        let path = sheet::next_sheet_path(sheet_dir, seq_name.as_deref());
        sheet::JsonSheetStore.save(&records, &path)?;
        println!("\nSheet written: {}", path.display());
    }

    Ok(())
}

fn parse_checks(checks: &[String]) -> Result<Vec<rules::CheckKind>> {
    if checks.is_empty() {
        return Ok(rules::CheckKind::all().to_vec());
    }
    checks
        .iter()
        .map(|check| {
            check
                .parse::<rules::CheckKind>()
                .map_err(|e| anyhow::anyhow!(e))
        })
        .collect()
}

fn run_validate(
    root: &Path,
    config_path: Option<&Path>,
    checks: &[String],
    shot: Option<&str>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let checks = parse_checks(checks)?;
    let mut rows = scan_rows(&config, root, shot)?;

    if rows.selected_indices().is_empty() {
        anyhow::bail!("no rows selected for validation");
    }

    let engine = rules::ValidationEngine::new(&config);
    let report = engine.run(&mut rows, &checks);
    print!("{}", report.render());

    if report.passed() {
        println!("Validation passed.");
        Ok(())
    } else {
        anyhow::bail!("validation failed");
    }
}

fn run_publish(
    root: &Path,
    config_path: Option<&Path>,
    shot: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let mut rows = scan_rows(&config, root, shot)?;

    if rows.selected_indices().is_empty() {
        anyhow::bail!("no rows selected for publish");
    }

    let engine = rules::ValidationEngine::new(&config);
    let report = engine.run(&mut rows, rules::CheckKind::all());
    print!("{}", report.render());
    if !report.passed() {
        anyhow::bail!("validation failed; nothing published");
    }

    if dry_run {
        println!("\n[DRY RUN] Would publish:");
        for index in rows.selected_indices() {
            let row = rows.get(index).expect("selected index out of range");
            println!(
                "  {}/{} {} -> {:?}",
                row.sequence,
                row.shot,
                row.version_label(),
                row.resolved_version_dir
            );
        }
        return Ok(());
    }

    let tracker: Box<dyn tracking::TrackingService> = if config.tracking.enabled {
        Box::new(tracking::ShotGridClient::new(&config.tracking))
    } else {
        Box::new(tracking::LogTracker)
    };

    let orchestrator = publish::PublishOrchestrator::new(&config, tracker.as_ref());
    let report = orchestrator.publish(&mut rows, root);

    println!();
    for row in &report.rows {
        match &row.outcome {
            Ok(version_name) => {
                let note = if row.used_fallback_folder {
                    "  (frame folder picked by fallback)"
                } else {
                    ""
                };
                println!("  row {}: published {}{}", row.row_index + 1, version_name, note);
            }
            Err(e) => println!("  row {}: FAILED - {}", row.row_index + 1, e),
        }
    }

    if report.all_ok() {
        println!("Publish complete.");
        Ok(())
    } else {
        anyhow::bail!("one or more rows failed to publish");
    }
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    println!("Checking external tools...\n");

    let mut all_ok = true;

    let ffmpeg = plateflow_av::probe_tool("ffmpeg", config.tools.ffmpeg.as_deref(), "-version");
    if ffmpeg.available {
        print!("ok  ffmpeg");
        if let Some(version) = &ffmpeg.version {
            print!(" ({})", version);
        }
        if let Some(path) = &ffmpeg.path {
            print!(" - {}", path.display());
        }
        println!();
    } else {
        all_ok = false;
        println!("MISSING  ffmpeg");
    }

    let launcher = plateflow_av::EnvLauncher::new(
        config.tools.env_launcher.clone(),
        config.tools.header_package.clone(),
    );
    if launcher.available() {
        println!(
            "ok  environment launcher ({} -> {})",
            config.tools.env_launcher.display(),
            config.tools.header_package
        );
    } else {
        all_ok = false;
        println!(
            "MISSING  environment launcher ({})",
            config.tools.env_launcher.display()
        );
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install them to enable all features.");
    }

    Ok(())
}
