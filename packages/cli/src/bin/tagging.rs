use clap::{Parser, Subcommand};
use colored::*;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use std::net::IpAddr;
use std::process;

use tagging_cli::{commands, run_server, Config};
use tagging_tags::{edit_string_for_tags, CountedTag, TagStorage};

#[derive(Parser)]
#[command(name = "tagging")]
#[command(about = "Tagging - free-text tags for any record")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to listen on (overrides TAGGING_API_PORT)
        #[arg(long)]
        port: Option<u16>,
        /// Address to bind (overrides TAGGING_API_HOST)
        #[arg(long)]
        host: Option<IpAddr>,
    },
    /// Show or replace the tags on a record
    Tags {
        content_type: String,
        object_id: String,
        /// Replace the record's tags with this tag string
        #[arg(long)]
        set: Option<String>,
    },
    /// List records carrying all of the given tags
    Objects { content_type: String, tags: String },
    /// List tags used together with a tag
    Related {
        content_type: String,
        tag: String,
        /// Show how many records carry each tag
        #[arg(long)]
        counts: bool,
    },
    /// Show tag usage for a content type
    Usage { content_type: String },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

async fn run(command: Commands) -> anyhow::Result<()> {
    let mut config = Config::from_env()?;

    match command {
        Commands::Serve { port, host } => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(host) = host {
                config.host = host;
            }
            run_server(config).await
        }
        Commands::Tags {
            content_type,
            object_id,
            set,
        } => {
            let storage = open_storage(&config).await?;
            let tags =
                commands::object_tags(&storage, &content_type, &object_id, set.as_deref()).await?;

            if tags.is_empty() {
                println!("{}", format!("{}:{} has no tags", content_type, object_id).yellow());
            } else {
                let names: Vec<&str> = tags.iter().map(|tag| tag.name.as_str()).collect();
                println!(
                    "{} {}",
                    format!("{}:{}", content_type, object_id).cyan().bold(),
                    edit_string_for_tags(&names)
                );
            }
            Ok(())
        }
        Commands::Objects { content_type, tags } => {
            let storage = open_storage(&config).await?;
            let objects = commands::tagged_objects(&storage, &content_type, &tags).await?;

            if objects.is_empty() {
                println!("{}", "No matching records".yellow());
                return Ok(());
            }

            let mut table = new_table();
            table.set_header(vec!["Content type", "Object ID"]);
            for object in &objects {
                table.add_row(vec![object.content_type.clone(), object.object_id.clone()]);
            }
            println!("{table}");
            println!("{}", format!("{} record(s)", objects.len()).dimmed());
            Ok(())
        }
        Commands::Related {
            content_type,
            tag,
            counts,
        } => {
            let storage = open_storage(&config).await?;
            let related = commands::related_tags(&storage, &content_type, &tag, counts).await?;
            print_counted(&related, "No related tags");
            Ok(())
        }
        Commands::Usage { content_type } => {
            let storage = open_storage(&config).await?;
            let usage = commands::model_usage(&storage, &content_type).await?;
            print_counted(&usage, &format!("No tags used on {}", content_type));
            Ok(())
        }
    }
}

async fn open_storage(config: &Config) -> anyhow::Result<TagStorage> {
    let pool = tagging_storage::connect(config.database_path.clone()).await?;
    Ok(TagStorage::with_settings(pool, config.settings.clone()))
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn print_counted(tags: &[CountedTag], empty_message: &str) {
    if tags.is_empty() {
        println!("{}", empty_message.yellow());
        return;
    }

    let with_counts = tags.iter().any(|tag| tag.count.is_some());
    let mut table = new_table();
    if with_counts {
        table.set_header(vec!["Tag", "Count"]);
    } else {
        table.set_header(vec!["Tag"]);
    }

    for tag in tags {
        match tag.count {
            Some(count) if with_counts => {
                table.add_row(vec![tag.tag.name.clone(), count.to_string()]);
            }
            _ => {
                table.add_row(vec![tag.tag.name.clone()]);
            }
        }
    }
    println!("{table}");
}
