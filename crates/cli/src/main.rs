use anyhow::Result;
use clap::{Parser, Subcommand};
use contract_inspector::commands::{
    block_command, export_command, functions_command, graph_command, import_command,
    info_command, init_command, legend_command, list_command, remove_command, types_command,
    FilterArgs, InputArgs,
};
use contract_inspector::init_logging;

/// Control-flow graph and annotation inspector for disassembled contracts.
///
/// This CLI is a thin wrapper around `inspector-core` (exposed in code as
/// `inspector_core`). All substantive logic lives in the library.
#[derive(Parser, Debug)]
#[command(
    name = "contract-inspector",
    version,
    about = "Inspect control-flow graphs and annotations of disassembled contracts",
    long_about = None
)]
struct Cli {
    /// Enable debug logging (otherwise RUST_LOG applies).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a workspace: `.inspector/` config and cache, and `graphs/`.
    Init {
        /// Workspace root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Optional workspace name. If omitted, the name is derived from the root directory.
        #[arg(long)]
        name: Option<String>,
    },

    /// Show workspace configuration and cache status.
    Info {
        #[arg(long, default_value = ".")]
        root: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Validate a disassembly JSON file and store it in the cache.
    Import {
        #[arg(long, default_value = ".")]
        root: String,

        /// Contract address to store the disassembly under.
        #[arg(long)]
        address: String,

        /// Disassembly JSON as returned by the backend.
        #[arg(long)]
        file: String,
    },

    /// List cached disassemblies.
    List {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Remove a cached disassembly.
    Remove {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long)]
        address: String,
    },

    /// Print the graph model, filtered by function and/or block type.
    Graph {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        filter: FilterArgs,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Count blocks per type tag, restricted to the function filter.
    Types {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        filter: FilterArgs,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Print function and edge colors.
    Legend {
        #[command(flatten)]
        input: InputArgs,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// List functions with their capabilities.
    Functions {
        #[command(flatten)]
        input: InputArgs,

        /// Case-insensitive substring of the function name.
        #[arg(long)]
        name: Option<String>,

        /// Required capability (repeatable): selfdestructs, calls, delegates,
        /// creates, logs, reads, writes.
        #[arg(long = "capability")]
        capabilities: Vec<String>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Show the code listing and annotations of one block.
    Block {
        #[command(flatten)]
        input: InputArgs,

        /// Block index.
        #[arg(long)]
        index: usize,

        /// Only show annotations whose "pc name" contains this text.
        #[arg(long)]
        filter: Option<String>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Write `graphs/<address>.json` and its metadata file.
    Export {
        #[command(flatten)]
        input: InputArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Init { root, name } => init_command(&root, name)?,
        Command::Info { root, json } => info_command(&root, json)?,
        Command::Import { root, address, file } => import_command(&root, &address, &file)?,
        Command::List { root, json } => list_command(&root, json)?,
        Command::Remove { root, address } => remove_command(&root, &address)?,
        Command::Graph { input, filter, json } => graph_command(&input, &filter, json)?,
        Command::Types { input, filter, json } => types_command(&input, &filter, json)?,
        Command::Legend { input, json } => legend_command(&input, json)?,
        Command::Functions { input, name, capabilities, json } => {
            functions_command(&input, name, &capabilities, json)?
        }
        Command::Block { input, index, filter, json } => {
            block_command(&input, index, filter.as_deref(), json)?
        }
        Command::Export { input } => export_command(&input)?,
    }

    Ok(())
}
