//! Command-line surface.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::generation::{OpenAiClient, Tone};
use crate::pipeline::{GenerateRequest, generate};
use crate::templates::TemplateCatalog;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "docgen", version, about = "Generate PowerPoint decks from a topic")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a presentation about a topic
    Generate(GenerateArgs),
    /// List available templates
    Templates,
    /// Show a template's constraints and layouts
    Info {
        /// Template name
        name: String,
    },
    /// Create a new template with default constraints
    InitTemplate {
        /// Template name
        name: String,
        /// Overwrite an existing template
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// What the presentation is about
    #[arg(short, long)]
    pub topic: String,

    /// Number of slides, clamped to the template's range
    #[arg(short, long)]
    pub slides: Option<usize>,

    /// Intended audience
    #[arg(short, long)]
    pub audience: Option<String>,

    #[arg(long, value_enum)]
    pub tone: Option<Tone>,

    /// Template name
    #[arg(long)]
    pub template: Option<String>,

    /// Output file (default: <output dir>/<topic>.pptx)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl From<GenerateArgs> for GenerateRequest {
    fn from(args: GenerateArgs) -> Self {
        Self {
            topic: args.topic,
            slide_count: args.slides,
            audience: args.audience,
            tone: args.tone,
            template: args.template,
            output: args.output,
        }
    }
}

/// Execute `command`, printing results to stdout.
pub async fn run(command: Command, config: &Config) -> Result<()> {
    let mut catalog = TemplateCatalog::new(&config.templates_dir);

    match command {
        Command::Generate(args) => {
            let api_key = config.require_api_key()?;
            let client = OpenAiClient::new(api_key, &config.base_url, &config.model, config.timeout)
                .map_err(|e| Error::Configuration(format!("cannot create model client: {e}")))?;

            let report = generate(config, &mut catalog, client, &args.into()).await?;
            println!(
                "Saved {} slide(s) to {}",
                report.slide_count,
                report.output_path.display()
            );
            if !report.issues.is_empty() {
                println!("{} content issue(s) left in the deck:", report.issues.len());
                for issue in &report.issues {
                    println!("  - {issue}");
                }
            }
        },
        Command::Templates => {
            let entries = catalog.list()?;
            if entries.is_empty() {
                println!("No templates found in {}", catalog.root().display());
            }
            for entry in entries {
                match entry.description {
                    Some(description) => println!(
                        "{:<16} {} ({})",
                        entry.name,
                        description,
                        entry.dir.display()
                    ),
                    None => println!("{:<16} {}", entry.name, entry.dir.display()),
                }
            }
        },
        Command::Info { name } => {
            let info = catalog.info(&name)?;
            let c = info.constraints;
            println!("{} ({})", info.entry.display_name, info.entry.dir.display());
            if let Some(description) = &info.entry.description {
                println!("  {description}");
            }
            println!("Constraints:");
            println!("  title_max_length:    {}", c.title_max_length);
            println!("  subtitle_max_length: {}", c.subtitle_max_length);
            println!("  bullet_max_length:   {}", c.bullet_max_length);
            println!("  bullets_per_slide:   {}", c.bullets_per_slide);
            println!("  slides:              {}..={}", c.slides_minimum, c.slides_maximum);
            println!("Layouts ({}):", info.layout_count);
            for (i, name) in info.layout_names.iter().enumerate() {
                println!("  {i}: {name}");
            }
        },
        Command::InitTemplate { name, force } => {
            let dir = catalog.scaffold(&name, force)?;
            println!("Created template '{}' in {}", name, dir.display());
        },
    }

    Ok(())
}
