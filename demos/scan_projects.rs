//! Scan a directory tree for .sb3 projects and summarize each one's index.
//!
//! Usage:
//!   cargo run --example scan_projects -- <directory>

use anyhow::{Context, Result};
use blockfind::extract::Tab;
use blockfind::index::build_index;
use blockfind::model::Project;
use blockfind::parser::{ProjectParser, ZipSource};
use camino::Utf8PathBuf;
use clap::Parser;
use rayon::prelude::*;
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(author, version, about = "Index every .sb3 project under a directory", long_about = None)]
struct Args {
    /// Directory to scan recursively for .sb3 files
    #[arg(value_name = "DIRECTORY")]
    directory: String,
}

fn load_sb3(path: &Utf8PathBuf) -> Result<Project> {
    let file = std::fs::File::open(path).with_context(|| format!("Open {}", path))?;
    let reader = std::io::BufReader::new(file);
    let mut parser = ProjectParser::new(ZipSource::new(reader)?);
    parser.parse_project_file("project.json")
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut files: Vec<Utf8PathBuf> = Vec::new();
    for entry in WalkDir::new(&args.directory) {
        let entry = entry?;
        if entry.file_type().is_file() {
            if let Ok(p) = Utf8PathBuf::from_path_buf(entry.path().to_path_buf()) {
                if p.extension() == Some("sb3") {
                    files.push(p);
                }
            }
        }
    }
    files.sort();

    if files.is_empty() {
        println!("No .sb3 files under {}", args.directory);
        return Ok(());
    }

    let summaries: Vec<String> = files
        .par_iter()
        .map(|path| match load_sb3(path) {
            Ok(project) => {
                let entity_count: usize = (0..project.targets.len())
                    .map(|idx| build_index(&project, idx, Tab::Code).len())
                    .sum();
                let block_count: usize =
                    project.targets.iter().map(|t| t.blocks.len()).sum();
                format!(
                    "{}: {} targets, {} blocks, {} entities",
                    path,
                    project.targets.len(),
                    block_count,
                    entity_count
                )
            }
            Err(err) => format!("{}: failed to parse ({})", path, err),
        })
        .collect();

    for line in summaries {
        println!("{}", line);
    }

    Ok(())
}
