use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod conf;
mod params;
mod path;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "form-task-parameters")]
#[command(version, about = "Resolve pp task parameters from remap-pp-components configuration", long_about = None)]
struct Cli {
    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the sorted, comma-joined source fields for a selection.
    Params {
        #[command(flatten)]
        select: SelectArgs,

        /// Print {"fields": [...]} instead of the joined string.
        #[arg(long)]
        json: bool,
    },

    /// Print the matching component entries as JSON.
    Components {
        #[command(flatten)]
        select: SelectArgs,
    },
}

#[derive(Args)]
struct SelectArgs {
    /// Grid type, e.g. native or regrid-xy.
    #[arg(long)]
    grid_type: String,

    /// temporal or static.
    #[arg(long)]
    temporal_type: String,

    /// Space-separated pp components, or "all".
    #[arg(long, default_value = "all")]
    components: String,

    /// Suffix naming app/remap-pp-components/opt/rose-app-<SUFFIX>.conf.
    #[arg(long, required_unless_present = "conf")]
    optional_config: Option<String>,

    /// Workflow root containing app/remap-pp-components.
    #[arg(long, default_value = ".")]
    workflow_dir: PathBuf,

    /// Read this configuration file directly instead of resolving one.
    #[arg(long, conflicts_with_all = ["optional_config", "workflow_dir"])]
    conf: Option<PathBuf>,

    /// Skip entries switched off with `!`/`!!`.
    #[arg(long)]
    skip_ignored: bool,
}

#[derive(Serialize)]
struct FieldsOutput {
    fields: Vec<String>,
}

impl SelectArgs {
    /// Validate the selection first, then load the configuration. A bad
    /// temporal type is reported even when the file does not exist.
    fn load(&self) -> Result<(conf::ConfNode, params::Selection)> {
        let selection =
            params::Selection::new(&self.grid_type, &self.temporal_type, &self.components)?
                .skip_ignored(self.skip_ignored);

        let conf_path = match (&self.conf, &self.optional_config) {
            (Some(conf), _) => conf.clone(),
            (None, Some(opt)) => path::conf_path(&self.workflow_dir, opt)?,
            (None, None) => anyhow::bail!("either --optional-config or --conf is required"),
        };

        let node = load_node(&conf_path)?;
        Ok((node, selection))
    }
}

fn load_node(conf_path: &Path) -> Result<conf::ConfNode> {
    let node = conf::load_conf_file(conf_path)?;
    info!(path = %conf_path.display(), "loaded component configuration");
    Ok(node)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    match cli.cmd {
        Commands::Params { select, json } => {
            let (node, selection) = select.load()?;
            if json {
                let components = params::select_components(&node, &selection)?;
                let out = FieldsOutput {
                    fields: params::source_fields(&components),
                };
                println!("{}", serde_json::to_string(&out)?);
            } else {
                println!("{}", params::form_task_parameters(&node, &selection)?);
            }
        }
        Commands::Components { select } => {
            let (node, selection) = select.load()?;
            let components = params::select_components(&node, &selection)?;
            info!(matched = components.len(), "selected pp components");
            println!("{}", serde_json::to_string_pretty(&components)?);
        }
    }

    Ok(())
}
