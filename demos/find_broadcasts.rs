//! Trace every sender and receiver of a broadcast across all targets.
//!
//! Usage:
//!   cargo run --example find_broadcasts -- <project.sb3|project.json> [EVENT]
//!
//! Without an EVENT argument, traces every broadcast declared on the stage.

use anyhow::{Context, Result};
use blockfind::parser::{FsSource, ProjectParser, ZipSource};
use blockfind::xref::broadcast_uses;
use camino::Utf8PathBuf;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Find every sender and receiver of a broadcast in a Scratch project"
)]
struct Args {
    /// Scratch .sb3 archive or project.json file
    #[arg(value_name = "PROJECT_FILE")]
    file: String,

    /// Broadcast (event) name to trace; defaults to all declared broadcasts
    #[arg(value_name = "EVENT")]
    event: Option<String>,
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

    let events: Vec<String> = match args.event {
        Some(name) => vec![name],
        None => project
            .targets
            .iter()
            .flat_map(|t| t.broadcasts.values().cloned())
            .collect(),
    };

    if events.is_empty() {
        println!("No broadcasts declared in {}", path);
        return Ok(());
    }

    for event in events {
        let uses = broadcast_uses(&project, &event);
        println!("broadcast '{}': {} use(s)", event, uses.len());
        for location in uses {
            let opcode = project
                .targets
                .get(location.target)
                .and_then(|t| t.block(&location.id))
                .map(|b| b.opcode.as_str())
                .unwrap_or("?");
            println!("  {}/{} ({})", location.target_name, location.id, opcode);
        }
    }

    Ok(())
}
