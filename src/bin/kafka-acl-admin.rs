use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use kafka_acl::acl::{AclDeclaration, Reconciliation, ResourceAcls};
use kafka_acl::resource::{migrate_state, DEFAULT_PATTERN_TYPE_FILTER};
use kafka_acl::{Acl, AclGateway, AclResource, ClientConfig, KafkaTransport, Resource, ResourceState};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "kafka-acl-admin")]
#[command(about = "Declarative management of Kafka ACLs")]
#[command(version)]
pub struct Cli {
    /// Client configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Bootstrap broker, may be repeated. Overrides the config file.
    #[arg(long = "bootstrap-server")]
    pub bootstrap_servers: Vec<String>,

    /// Client id sent to the brokers
    #[arg(long)]
    pub client_id: Option<String>,

    /// Resource state file (JSON) used by create, read, delete and import
    #[arg(long, default_value = "kafka-acl.state.json")]
    pub state: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an ACL and record it in the state file
    Create(DeclarationArgs),

    /// Refresh the state file from the cluster
    Read,

    /// Delete the ACL recorded in the state file
    Delete,

    /// Adopt an existing ACL by its pipe-separated id
    Import {
        /// principal|host|operation|permission_type|resource_type|resource_name|pattern_type_filter
        id: String,
    },

    /// List every ACL in the cluster
    List,

    /// Show ACLs matching a declaration
    Describe(DeclarationArgs),
}

#[derive(Args)]
pub struct DeclarationArgs {
    /// Principal, e.g. User:alice
    #[arg(long)]
    pub principal: String,

    #[arg(long, default_value = "*")]
    pub host: String,

    /// Operation, e.g. Read, Write, All
    #[arg(long)]
    pub operation: String,

    /// Allow or Deny
    #[arg(long, default_value = "Allow")]
    pub permission_type: String,

    /// Topic, Group, Cluster or TransactionalID
    #[arg(long)]
    pub resource_type: String,

    #[arg(long)]
    pub resource_name: String,

    /// Literal, Prefixed, Match or Any
    #[arg(long, default_value = DEFAULT_PATTERN_TYPE_FILTER)]
    pub pattern_type_filter: String,
}

impl DeclarationArgs {
    fn declaration(&self) -> AclDeclaration {
        AclDeclaration::new(
            Acl::new(
                self.principal.as_str(),
                self.host.as_str(),
                self.operation.as_str(),
                self.permission_type.as_str(),
            ),
            Resource::new(
                self.resource_type.as_str(),
                self.resource_name.as_str(),
                self.pattern_type_filter.as_str(),
            ),
        )
    }
}

fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path))?,
        None => ClientConfig::default(),
    };
    if !cli.bootstrap_servers.is_empty() {
        config.bootstrap_servers = cli.bootstrap_servers.clone();
    }
    if let Some(client_id) = &cli.client_id {
        config.client_id = client_id.clone();
    }
    config.validate()?;
    Ok(config)
}

fn load_state(path: &Path) -> Result<ResourceState> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read state file {}", path.display()))?;
    let mut state: ResourceState = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse state file {}", path.display()))?;
    migrate_state(&mut state);
    Ok(state)
}

/// Read and delete act on a recorded ACL only; a cleared id means it is gone
fn require_existing(state: &ResourceState, path: &Path) -> Result<()> {
    if !state.exists() {
        bail!("state file {} holds no ACL", path.display());
    }
    Ok(())
}

fn save_state(path: &Path, state: &ResourceState) -> Result<()> {
    let content = serde_json::to_string_pretty(state)?;
    std::fs::write(path, content)
        .with_context(|| format!("failed to write state file {}", path.display()))?;
    debug!("State written to {}", path.display());
    Ok(())
}

fn print_groups(groups: &[ResourceAcls]) {
    for group in groups {
        for decl in group.declarations() {
            println!("{}", decl.id());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .init();
    }

    let config = load_config(&cli)?;
    info!("Connecting to {}", config.bootstrap_servers.join(","));
    let transport = KafkaTransport::connect(config).await?;
    let resource = AclResource::new(AclGateway::new(Arc::new(transport)));

    match &cli.command {
        Commands::Create(args) => {
            let mut state = ResourceState::from_declaration(&args.declaration());
            resource.on_create(&mut state).await?;
            save_state(&cli.state, &state)?;
            println!("Created ACL {}", state.id);
        }
        Commands::Read => {
            let mut state = load_state(&cli.state)?;
            require_existing(&state, &cli.state)?;
            match resource.on_read(&mut state).await? {
                Reconciliation::Confirmed => println!("ACL {} is in sync", state.id),
                Reconciliation::Drifted(patch) => {
                    println!("ACL {} drifted, state updated: {:?}", state.id, patch)
                }
                Reconciliation::NotFound => println!("ACL no longer exists, state cleared"),
            }
            save_state(&cli.state, &state)?;
        }
        Commands::Delete => {
            let mut state = load_state(&cli.state)?;
            require_existing(&state, &cli.state)?;
            resource.on_delete(&mut state).await?;
            state.id.clear();
            save_state(&cli.state, &state)?;
            println!("Deleted ACL");
        }
        Commands::Import { id } => {
            let mut state = ResourceState::for_import(id.as_str());
            AclResource::on_import(&mut state)?;
            // an imported id must still be confirmed against the cluster
            if let Reconciliation::NotFound = resource.on_read(&mut state).await? {
                bail!("no ACL matching {} exists in the cluster", id);
            }
            save_state(&cli.state, &state)?;
            println!("Imported ACL {}", state.id);
        }
        Commands::List => {
            let observed = resource.gateway().list_acls().await?;
            info!("{} ACL(s) found", observed.acl_count());
            print_groups(observed.groups());
        }
        Commands::Describe(args) => {
            let groups = resource.gateway().describe_acls(&args.declaration()).await?;
            print_groups(&groups);
        }
    }

    Ok(())
}
