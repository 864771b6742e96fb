//! Content file maintenance for the directory
//!
//! Usage:
//!   cargo run --bin stubs -- projects [content-dir]
//!   cargo run --bin stubs -- edit-ids <dir>...

use anyhow::Result;
use circle_directory::{
    edit_ids::{backfill_edit_ids, generate_project_stubs},
    error::EntityKind,
    Config, Dataset,
};
use std::path::PathBuf;

fn usage(program: &str) -> ! {
    eprintln!("Usage: {} projects [content-dir]", program);
    eprintln!("       {} edit-ids <dir>...", program);
    eprintln!("Example: {} edit-ids content/projects content/founders", program);
    std::process::exit(1);
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("stubs");

    match args.get(1).map(String::as_str) {
        Some("projects") => run_projects(args.get(2).map(PathBuf::from)),
        Some("edit-ids") if args.len() > 2 => run_edit_ids(&args[2..]),
        _ => usage(program),
    }
}

fn run_projects(content_dir: Option<PathBuf>) -> Result<()> {
    let config = Config::from_env()?;
    let dataset = match &config.dataset {
        Some(path) => Dataset::from_path(path)?,
        None => Dataset::embedded()?,
    };
    let dir = content_dir
        .unwrap_or(config.content_dir)
        .join(EntityKind::Project.dir_name());

    println!("Writing project stubs to {:?}", dir);
    let report = generate_project_stubs(&dataset, &dir, &mut rand::thread_rng())?;

    println!("\n========================================");
    println!("Stubs complete!");
    println!("  Created: {}", report.created);
    println!("  Edit ids added: {}", report.backfilled);
    println!("  Unchanged: {}", report.unchanged);
    println!("========================================");

    Ok(())
}

fn run_edit_ids(dirs: &[String]) -> Result<()> {
    let mut rng = rand::thread_rng();
    let mut updated = 0;
    let mut unchanged = 0;

    for arg in dirs {
        let dir = PathBuf::from(arg);
        if !dir.is_dir() {
            eprintln!("Warning: {} is not a directory, skipping", arg);
            continue;
        }

        println!("\nProcessing: {:?}", dir);
        let report = backfill_edit_ids(&dir, &mut rng)?;
        println!("  ✓ {} updated, {} already had one", report.updated, report.unchanged);
        for path in &report.skipped {
            eprintln!("  ✗ {}: unreadable header", path.display());
        }

        updated += report.updated;
        unchanged += report.unchanged;
    }

    println!("\n========================================");
    println!("Edit ids complete!");
    println!("  Updated: {}", updated);
    println!("  Unchanged: {}", unchanged);
    println!("========================================");

    Ok(())
}
