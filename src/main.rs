use anyhow::{Context, Result, bail};
use blockfind::extract::Tab;
use blockfind::finder::Finder;
use blockfind::model::Project;
use blockfind::parser::{FsSource, ProjectParser, ZipSource};
use camino::Utf8PathBuf;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about = "Index & search the blocks of Scratch .sb3 or project.json files", long_about = None)]
struct Cli {
    /// Scratch .sb3 archive or project.json file
    #[arg(value_name = "PROJECT_FILE")]
    project_file: String,

    /// Target (sprite or stage) to index by name; defaults to the first sprite
    #[arg(short, long)]
    target: Option<String>,

    /// Editor tab to index: code, costumes or sounds
    #[arg(long, default_value = "code")]
    tab: String,

    /// Filter the index with this query
    #[arg(short, long)]
    query: Option<String>,

    /// Print the parsed project as JSON instead of indexing
    #[arg(long)]
    json: bool,
}

fn load_project(path: &Utf8PathBuf) -> Result<Project> {
    if path.extension() == Some("sb3") {
        // Read from the .sb3 zip: the project document is at project.json
        let file = std::fs::File::open(path).with_context(|| format!("Open {}", path))?;
        let reader = std::io::BufReader::new(file);
        let mut parser = ProjectParser::new(ZipSource::new(reader)?);
        parser.parse_project_file("project.json")
    } else {
        // Fallback: parse a bare project.json from the filesystem
        let mut parser = ProjectParser::new(FsSource);
        parser
            .parse_project_file(path)
            .with_context(|| format!("Failed to parse {}", path))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let path = Utf8PathBuf::from(&cli.project_file);
    let project = load_project(&path)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&project)?);
        return Ok(());
    }

    let tab = match cli.tab.as_str() {
        "code" => Tab::Code,
        "costumes" => Tab::Costumes,
        "sounds" => Tab::Sounds,
        other => bail!("Unknown tab '{}': expected code, costumes or sounds", other),
    };

    let mut finder = Finder::new(project);
    if let Some(name) = &cli.target {
        let Some(idx) = finder
            .project()
            .targets
            .iter()
            .position(|t| &t.name == name)
        else {
            bail!("No target named '{}' in {}", name, path);
        };
        finder.set_target(idx);
    }
    finder.rebuild_index(tab);

    let target_name = &finder.project().targets[finder.target()].name;
    println!(
        "{}: {} entities in '{}'",
        path,
        finder.index().len(),
        target_name
    );

    let query = cli.query.as_deref().unwrap_or("");
    let view = finder.filter(query).clone();
    for m in &view.matches {
        let entity = &finder.index().entities[m.entity];
        let label = match m.highlight {
            // Bracket the matched span so the hit is visible in a terminal.
            Some((start, end)) => format!(
                "{}[{}]{}",
                &entity.display_text[..start],
                &entity.display_text[start..end],
                &entity.display_text[end..]
            ),
            None => entity.display_text.clone(),
        };
        println!(
            "  {:18} {}  ({} occurrence{})",
            entity.category.name(),
            label,
            entity.occurrence_count(),
            if entity.occurrence_count() == 1 { "" } else { "s" }
        );
    }
    if !query.is_empty() {
        println!("{} of {} entities match", view.matches.len(), finder.index().len());
    }

    Ok(())
}
