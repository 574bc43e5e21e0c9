//! CLI application logic
//!
//! Contains the command-line interface implementation.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use jurat_core::{list_forms, normalize, preview, IntakeSource, RawClientRecord};
use jurat_intake::{
    find_client, import_clients, import_completed_drafts, parse_client_batch, sample_client,
    save_client, send_draft, submit_draft, ClientStore, JsonFileStore,
};
use jurat_render::{select_renderer, template_loader, PacketAssembler, Settings};

/// Config files looked up in the working directory
pub const CONFIG_CANDIDATES: [&str; 2] = ["jurat.toml", ".jurat.toml"];

/// Output format for listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for scripts
    Json,
}

#[derive(Parser)]
#[command(name = "jurat")]
#[command(author, version, about = "Immigration form preparation", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Rendering service URL; selects remote rendering
    #[arg(long, global = true)]
    pub service_url: Option<String>,

    /// Directory of official form templates
    #[arg(long, global = true)]
    pub templates: Option<PathBuf>,

    /// Directory holding clients.json and drafts.json
    #[arg(long, global = true, default_value = "jurat-data")]
    pub data_dir: PathBuf,
}

/// Which client a command works on
#[derive(Args, Debug, Clone, Default)]
#[group(required = true, multiple = false)]
pub struct ClientArgs {
    /// Id of a stored client
    #[arg(long)]
    pub client: Option<String>,

    /// JSON file holding one client record
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Use the built-in sample client
    #[arg(long)]
    pub sample: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported forms
    Forms {
        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show the values a form would receive
    Preview {
        #[command(flatten)]
        client: ClientArgs,

        /// Form id
        #[arg(long, default_value = "N-400")]
        form: String,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the normalized client record as JSON
    Normalize {
        #[command(flatten)]
        client: ClientArgs,
    },

    /// Render one form to PDF
    Fill {
        #[command(flatten)]
        client: ClientArgs,

        /// Form id
        #[arg(long, default_value = "N-400")]
        form: String,

        /// Output PDF file (defaults to <client-id>-<FORM-ID>.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render several forms into one PDF packet
    Packet {
        #[command(flatten)]
        client: ClientArgs,

        /// Comma-separated form ids, in page order
        #[arg(long, value_delimiter = ',', required = true)]
        forms: Vec<String>,

        /// Output PDF file (defaults to packet.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import clients from a JSON object or array
    Import {
        /// JSON file to import
        input: PathBuf,
    },

    /// List stored clients
    Clients,

    /// Manage client intake drafts
    Drafts {
        #[command(subcommand)]
        action: DraftCommands,
    },

    /// Print the sample client, or store it
    Sample {
        /// Save the sample as a new client
        #[arg(long)]
        save: bool,
    },
}

#[derive(Subcommand)]
enum DraftCommands {
    /// Create a draft and print its intake link
    Send {
        /// Form the client is asked to fill in
        #[arg(long, default_value = "N-400")]
        form: String,

        /// Base URL of the client intake page
        #[arg(long, default_value = "http://localhost:8080")]
        base_url: String,
    },

    /// List drafts
    List,

    /// Record a client's answers on a draft
    Submit {
        /// Draft id
        id: String,

        /// JSON file with the client's answers
        input: PathBuf,
    },

    /// Turn completed drafts into clients
    Import,
}

/// Run the CLI application
///
/// Parses arguments, installs logging and dispatches to the command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_logging();
    let global = &cli.global;

    match cli.command {
        Commands::Forms { format } => forms_command(format)?,
        Commands::Preview {
            client,
            form,
            format,
        } => preview_command(global, &client, &form, format)?,
        Commands::Normalize { client } => normalize_command(global, &client)?,
        Commands::Fill {
            client,
            form,
            output,
        } => {
            fill_command(global, &client, &form, output.as_deref())?;
        }
        Commands::Packet {
            client,
            forms,
            output,
        } => {
            packet_command(global, &client, &forms, output.as_deref())?;
        }
        Commands::Import { input } => {
            import_command(global, &input)?;
        }
        Commands::Clients => clients_command(global)?,
        Commands::Drafts { action } => match action {
            DraftCommands::Send { form, base_url } => {
                draft_send_command(global, &form, &base_url)?;
            }
            DraftCommands::List => draft_list_command(global)?,
            DraftCommands::Submit { id, input } => draft_submit_command(global, &id, &input)?,
            DraftCommands::Import => {
                draft_import_command(global)?;
            }
        },
        Commands::Sample { save } => sample_command(global, save)?,
    }

    Ok(())
}

/// Install the stderr log subscriber (`RUST_LOG`, default `warn`)
fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    // A second install (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Execute the forms command
pub fn forms_command(format: OutputFormat) -> Result<()> {
    let forms = list_forms();
    match format {
        OutputFormat::Text => {
            println!("jurat v{}", jurat_core::VERSION);
            println!();
            for form in forms {
                let template = if form.official_template {
                    "official template"
                } else {
                    "summary pages"
                };
                println!(
                    "  {:<7} {:>3.0}%  {} ({})",
                    form.id,
                    form.coverage * 100.0,
                    form.title,
                    template
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(forms)?);
        }
    }
    Ok(())
}

/// Execute the preview command
pub fn preview_command(
    global: &GlobalArgs,
    client: &ClientArgs,
    form_id: &str,
    format: OutputFormat,
) -> Result<()> {
    let record = resolve_client(global, client)?;
    let rows = preview(&normalize(&record), form_id);

    match format {
        OutputFormat::Text => {
            if rows.is_empty() {
                println!("No fields are defined for {}", form_id);
                return Ok(());
            }
            for row in &rows {
                let value = if row.is_missing() {
                    "(not provided)"
                } else {
                    row.value.as_str()
                };
                println!("  {:<36} {}", row.label, value);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }
    Ok(())
}

/// Execute the normalize command
pub fn normalize_command(global: &GlobalArgs, client: &ClientArgs) -> Result<()> {
    let record = resolve_client(global, client)?;
    println!("{}", serde_json::to_string_pretty(&normalize(&record))?);
    Ok(())
}

/// Execute the fill command, returning the written file
pub fn fill_command(
    global: &GlobalArgs,
    client: &ClientArgs,
    form_id: &str,
    output: Option<&Path>,
) -> Result<PathBuf> {
    let settings = effective_settings(global)?;
    let record = resolve_client(global, client)?;
    let renderer = select_renderer(&settings, template_loader(&settings)?)?;

    println!("jurat v{}", jurat_core::VERSION);
    println!("Rendering {} ({} renderer)", form_id, renderer.name());

    let document = runtime()?
        .block_on(renderer.render(&record, form_id))
        .with_context(|| format!("Failed to render {}", form_id))?;

    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&document.file_name));
    fs::write(&path, &document.bytes)
        .with_context(|| format!("Failed to write output: {}", path.display()))?;

    println!("  Wrote {} ({} bytes)", path.display(), document.bytes.len());
    println!("  {}", document.content_hash);
    Ok(path)
}

/// Execute the packet command, returning the written file
pub fn packet_command(
    global: &GlobalArgs,
    client: &ClientArgs,
    form_ids: &[String],
    output: Option<&Path>,
) -> Result<PathBuf> {
    let settings = effective_settings(global)?;
    let record = resolve_client(global, client)?;
    let renderer = select_renderer(&settings, template_loader(&settings)?)?;

    println!("jurat v{}", jurat_core::VERSION);
    println!(
        "Assembling packet: {} ({} renderer)",
        form_ids.join(", "),
        renderer.name()
    );

    let packet = runtime()?
        .block_on(PacketAssembler::new(renderer.as_ref()).assemble(form_ids, &record))
        .context("Failed to assemble packet")?;

    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&packet.file_name));
    fs::write(&path, &packet.bytes)
        .with_context(|| format!("Failed to write output: {}", path.display()))?;

    println!(
        "  Wrote {} ({} pages, {} bytes)",
        path.display(),
        packet.page_count,
        packet.bytes.len()
    );
    Ok(path)
}

/// Execute the import command, returning the new client ids
pub fn import_command(global: &GlobalArgs, input: &Path) -> Result<Vec<String>> {
    let json = read_input(input)?;
    let records = parse_client_batch(&json)
        .with_context(|| format!("Failed to import {}", input.display()))?;

    let mut store = open_store(global);
    let imported = import_clients(&mut store, records)?;

    let ids: Vec<String> = imported.iter().filter_map(|c| c.id.clone()).collect();
    println!("Imported {} clients into {}", ids.len(), store.dir().display());
    for id in &ids {
        println!("  {}", id);
    }
    Ok(ids)
}

/// Execute the clients command
pub fn clients_command(global: &GlobalArgs) -> Result<()> {
    let clients = open_store(global).load_clients()?;
    if clients.is_empty() {
        println!("No clients yet");
        return Ok(());
    }
    for client in &clients {
        let record = normalize(client);
        println!(
            "  {:<22} {:<7} {:<9} {}",
            record.id, record.form_id, record.source, record.full_name
        );
    }
    Ok(())
}

/// Execute `drafts send`, returning the intake link
pub fn draft_send_command(global: &GlobalArgs, form_id: &str, base_url: &str) -> Result<String> {
    let mut store = open_store(global);
    let draft = send_draft(&mut store, form_id)?;
    let link = draft.intake_link(base_url);
    println!("Created draft {} for {}", draft.id, draft.form_id);
    println!("  {}", link);
    Ok(link)
}

/// Execute `drafts list`
pub fn draft_list_command(global: &GlobalArgs) -> Result<()> {
    let drafts = open_store(global).load_drafts()?;
    if drafts.is_empty() {
        println!("No drafts yet");
        return Ok(());
    }
    for draft in &drafts {
        let status = serde_json::to_value(draft.status)?;
        let imported = if draft.imported_at.is_some() {
            " (imported)"
        } else {
            ""
        };
        println!(
            "  {:<10} {:<7} {}{}",
            draft.id,
            draft.form_id,
            status.as_str().unwrap_or_default(),
            imported
        );
    }
    Ok(())
}

/// Execute `drafts submit`
pub fn draft_submit_command(global: &GlobalArgs, id: &str, input: &Path) -> Result<()> {
    let record = read_single_record(input)?;
    let mut store = open_store(global);
    submit_draft(&mut store, id, record)?;
    println!("Draft {} completed", id);
    Ok(())
}

/// Execute `drafts import`, returning the new client ids
pub fn draft_import_command(global: &GlobalArgs) -> Result<Vec<String>> {
    let mut store = open_store(global);
    let imported = import_completed_drafts(&mut store)?;
    if imported.is_empty() {
        println!("No completed intakes to import yet");
        return Ok(Vec::new());
    }

    let ids: Vec<String> = imported.iter().filter_map(|c| c.id.clone()).collect();
    println!("Imported {} completed intakes", ids.len());
    for id in &ids {
        println!("  {}", id);
    }
    Ok(ids)
}

/// Execute the sample command
pub fn sample_command(global: &GlobalArgs, save: bool) -> Result<()> {
    if !save {
        println!("{}", serde_json::to_string_pretty(&sample_client())?);
        return Ok(());
    }

    let mut store = open_store(global);
    let client = save_client(&mut store, sample_client(), IntakeSource::Assistant)?;
    println!("Saved sample client {}", client.id.unwrap_or_default());
    Ok(())
}

/// Load settings from a config file, or from the working directory
pub fn load_settings(config_path: Option<&Path>) -> Result<Settings> {
    match config_path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            Settings::from_toml_str(&content)
                .with_context(|| format!("Failed to parse config: {}", path.display()))
        }
        None => {
            for candidate in CONFIG_CANDIDATES {
                if Path::new(candidate).exists() {
                    let content = fs::read_to_string(candidate)?;
                    match Settings::from_toml_str(&content) {
                        Ok(settings) => {
                            tracing::debug!("Loaded settings from {}", candidate);
                            return Ok(settings);
                        }
                        Err(e) => tracing::warn!("Ignoring {}: {}", candidate, e),
                    }
                }
            }
            Ok(Settings::default())
        }
    }
}

/// Settings with command-line overrides applied
pub fn effective_settings(global: &GlobalArgs) -> Result<Settings> {
    let mut settings = load_settings(global.config.as_deref())?;
    if let Some(url) = &global.service_url {
        settings.render.service_url = Some(url.clone());
    }
    if let Some(dir) = &global.templates {
        settings.render.template_dir = dir.clone();
    }
    Ok(settings)
}

fn open_store(global: &GlobalArgs) -> JsonFileStore {
    JsonFileStore::new(&global.data_dir)
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
}

fn read_input(path: &Path) -> Result<String> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read input: {}", path.display()))
}

fn read_single_record(path: &Path) -> Result<RawClientRecord> {
    let json = read_input(path)?;
    let mut records = parse_client_batch(&json)
        .with_context(|| format!("Failed to parse client: {}", path.display()))?;
    if records.len() != 1 {
        anyhow::bail!(
            "Expected one client in {}, found {}",
            path.display(),
            records.len()
        );
    }
    Ok(records.remove(0))
}

fn resolve_client(global: &GlobalArgs, client: &ClientArgs) -> Result<RawClientRecord> {
    if client.sample {
        return Ok(sample_client());
    }
    if let Some(path) = &client.input {
        return read_single_record(path);
    }
    match &client.client {
        Some(id) => find_client(&open_store(global), id)?
            .with_context(|| format!("Client not found: {}", id)),
        None => anyhow::bail!("Choose a client with --client, --input or --sample"),
    }
}
