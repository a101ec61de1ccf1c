//! List the indexed entities of every target in a Scratch project.
//!
//! Usage:
//!   cargo run --example list_entities -- <project.sb3|project.json>

use anyhow::{Context, Result};
use blockfind::extract::Tab;
use blockfind::index::build_index;
use blockfind::parser::{FsSource, ProjectParser, ZipSource};
use camino::Utf8PathBuf;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about = "List all indexed entities of a Scratch project", long_about = None)]
struct Args {
    /// Scratch .sb3 archive or project.json file
    #[arg(value_name = "PROJECT_FILE")]
    file: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let path = Utf8PathBuf::from(&args.file);

    let project = if path.extension() == Some("sb3") {
        let file = std::fs::File::open(&path).with_context(|| format!("Open {}", path))?;
        let reader = std::io::BufReader::new(file);
        let mut parser = ProjectParser::new(ZipSource::new(reader)?);
        parser.parse_project_file("project.json")?
    } else {
        let mut parser = ProjectParser::new(FsSource);
        parser
            .parse_project_file(&path)
            .with_context(|| format!("Failed to parse {}", path))?
    };

    for (idx, target) in project.targets.iter().enumerate() {
        let index = build_index(&project, idx, Tab::Code);
        println!(
            "{} '{}': {} entities",
            if target.is_stage { "Stage" } else { "Sprite" },
            target.name,
            index.len()
        );
        for entity in index.iter() {
            println!(
                "  {:18} {} ({} occurrence{})",
                entity.category.name(),
                entity.display_text,
                entity.occurrence_count(),
                if entity.occurrence_count() == 1 { "" } else { "s" }
            );
        }
    }

    Ok(())
}
