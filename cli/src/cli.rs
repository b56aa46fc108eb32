use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use nestree::GeneratorOptions;

#[derive(Parser, Debug)]
#[command(name = "nestree", about = "Balanced, path-addressed forests for composite-key data", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log debug diagnostics (RUST_LOG takes precedence when set)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a random record file
    Generate {
        /// Record file to write
        #[arg(long, short = 'o', default_value = "initial_set.txt", env = "NESTREE_RECORDS")]
        output: PathBuf,

        #[command(flatten)]
        shape: ShapeArgs,

        /// Seed for reproducible output
        #[arg(long, env = "NESTREE_SEED")]
        seed: Option<u64>,
    },

    /// Build, commit and write the balanced tree of a record file
    Build {
        /// Record file, in any order
        #[arg(long, short = 'i', default_value = "initial_set.txt", env = "NESTREE_RECORDS")]
        input: PathBuf,

        /// Tree file to write
        #[arg(long, short = 'o', default_value = "sorted_hashes.txt", env = "NESTREE_TREE")]
        output: PathBuf,

        /// Also export the tree as a Graphviz file
        #[arg(long, env = "NESTREE_GRAPH")]
        graph: Option<PathBuf>,

        /// Key prefix to root the forest at, e.g. `0,0` for the fields of one
        /// attribute
        #[arg(long, value_delimiter = ',', env = "NESTREE_SCOPE")]
        scope: Vec<u64>,

        /// Number of existing keys in the printed read set
        #[arg(long, default_value_t = 4, env = "NESTREE_READS_EXISTING")]
        reads_existing: usize,

        /// Number of likely-missing keys in the printed read set
        #[arg(long, default_value_t = 1, env = "NESTREE_READS_MISSING")]
        reads_missing: usize,

        /// Seed for the read set
        #[arg(long, env = "NESTREE_SEED")]
        seed: Option<u64>,

        /// Print the balanced forest as an outline
        #[arg(long)]
        show: bool,
    },

    /// Recompute the commitment of a tree file and check its stored hashes
    Verify {
        /// Tree file to check
        #[arg(long, short = 'i', default_value = "sorted_hashes.txt", env = "NESTREE_TREE")]
        input: PathBuf,

        /// Expected root hash
        #[arg(long)]
        root_hash: Option<u64>,
    },
}

/// Shape of a generated record set.
#[derive(Args, Debug)]
pub struct ShapeArgs {
    #[arg(long, default_value_t = 1)]
    pub contracts: u64,

    #[arg(long, default_value_t = 1)]
    pub attributes: u64,

    #[arg(long, default_value_t = 10)]
    pub fields: u64,

    /// Exclusive upper bound of keys and values
    #[arg(long, default_value_t = 256)]
    pub max_number: u64,

    /// Weights of nesting depths 0, 1, ...
    #[arg(long, value_delimiter = ',', default_values_t = [8u32, 4, 2, 1])]
    pub depth_weights: Vec<u32>,
}

impl From<ShapeArgs> for GeneratorOptions {
    fn from(shape: ShapeArgs) -> Self {
        GeneratorOptions {
            contracts: shape.contracts,
            attributes: shape.attributes,
            fields: shape.fields,
            max_number: shape.max_number,
            depth_weights: shape.depth_weights,
            ..Default::default()
        }
    }
}
