mod cli;
mod error;

use std::path::Path;

use clap::Parser;
use cli::{Cli, Commands};
use error::{exit_with_error, CliError, CliResult};
use nestree::{
    build_forest, commit_flat, commit_forest, flatten_sorted,
    graph::write_dot_file,
    select_reads,
    serializer::{read_records_file, read_tree_file, write_records_file, write_tree_file},
    sort_records, visualize_stdout, Blake3Combiner, ForestView, GeneratorOptions, GroupingScope,
    RecordGenerator,
};
use rand::{rngs::StdRng, SeedableRng};
use tracing::{debug, info};

fn init_tracing(cli: &Cli) {
    // RUST_LOG wins, then --verbose, then info
    let default = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    if let Err(e) = run(cli) {
        exit_with_error(e);
    }
}

fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::Generate {
            output,
            shape,
            seed,
        } => generate(&output, shape.into(), seed),
        Commands::Build {
            input,
            output,
            graph,
            scope,
            reads_existing,
            reads_missing,
            seed,
            show,
        } => {
            let scope = if scope.is_empty() {
                GroupingScope::global()
            } else {
                GroupingScope::under(&scope)
            };
            build(&BuildRun {
                input: &input,
                output: &output,
                graph: graph.as_deref(),
                scope,
                reads: (reads_existing, reads_missing),
                seed,
                show,
            })
        }
        Commands::Verify { input, root_hash } => verify(&input, root_hash).map(|root_hash| {
            println!("{root_hash}");
        }),
    }
}

fn generate(output: &Path, options: GeneratorOptions, seed: Option<u64>) -> CliResult<()> {
    let generator = RecordGenerator::new(options)?;
    let records = generator.generate(&mut rng(seed));
    write_records_file(output, &records).value?;
    Ok(())
}

struct BuildRun<'a> {
    input: &'a Path,
    output: &'a Path,
    graph: Option<&'a Path>,
    scope: GroupingScope,
    reads: (usize, usize),
    seed: Option<u64>,
    show: bool,
}

fn build(run: &BuildRun) -> CliResult<()> {
    let (loaded, cost) = read_records_file(run.input).into_parts();
    debug!(bytes = cost.bytes_loaded, "loaded records");
    // record files need not be sorted, the grouper needs them to be
    let mut records = loaded?;
    sort_records(&mut records);

    let mut forest = build_forest(&records, &run.scope)?;
    let committed = commit_forest(&mut forest, &Blake3Combiner);
    let root_hash = committed.value;
    if run.show {
        visualize_stdout(&ForestView(&forest));
    }

    let flat = flatten_sorted(&forest);
    write_tree_file(run.output, &flat).value?;
    if let Some(graph) = run.graph {
        write_dot_file(graph, &flat)?;
    }
    info!(
        records = records.len(),
        nodes = flat.len(),
        combine_calls = committed.cost.combine_calls,
        root_hash,
        "built tree"
    );
    println!("root hash: {root_hash}");

    let (existing, missing) = run.reads;
    let reads = select_reads(&flat, existing, missing, &mut rng(run.seed));
    for key in &reads {
        println!("read: {key}");
    }
    Ok(())
}

/// Recommits a tree file from scratch and compares every stored hash.
fn verify(input: &Path, expected: Option<u64>) -> CliResult<u64> {
    let mut nodes = read_tree_file(input).value?;
    let stored: Vec<u64> = nodes.iter().map(|node| node.root_hash).collect();

    let computed = commit_flat(&mut nodes, &Blake3Combiner).value?;
    for (node, stored) in nodes.iter().zip(stored) {
        if node.root_hash != stored {
            return Err(CliError::HashMismatch {
                path: node.path.to_string(),
                stored,
                computed: node.root_hash,
            });
        }
    }
    if let Some(expected) = expected {
        if expected != computed {
            return Err(CliError::RootMismatch { expected, computed });
        }
    }
    info!(nodes = nodes.len(), root_hash = computed, "verified tree");
    Ok(computed)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use tempfile::TempDir;

    use super::*;

    fn build_into(dir: &TempDir, scope: GroupingScope) -> std::path::PathBuf {
        let records = dir.path().join("initial_set.txt");
        let tree = dir.path().join("sorted_hashes.txt");
        generate(&records, GeneratorOptions::default(), Some(4)).unwrap();
        build(&BuildRun {
            input: &records,
            output: &tree,
            graph: Some(dir.path().join("initial_graph.dot").as_path()),
            scope,
            reads: (4, 1),
            seed: Some(4),
            show: false,
        })
        .unwrap();
        tree
    }

    #[test]
    fn generate_build_verify() {
        let dir = TempDir::new().unwrap();
        let tree = build_into(&dir, GroupingScope::global());
        assert!(dir.path().join("initial_graph.dot").exists());

        let root_hash = verify(&tree, None).unwrap();
        assert_eq!(verify(&tree, Some(root_hash)).unwrap(), root_hash);
        assert_matches!(
            verify(&tree, Some(root_hash.wrapping_add(1))),
            Err(CliError::RootMismatch { .. })
        );
    }

    #[test]
    fn scoped_build_verifies() {
        let dir = TempDir::new().unwrap();
        let tree = build_into(&dir, GroupingScope::under(&[0, 0]));
        verify(&tree, None).unwrap();
    }

    #[test]
    fn tampered_hash_is_reported() {
        let dir = TempDir::new().unwrap();
        let tree = build_into(&dir, GroupingScope::global());
        let content = std::fs::read_to_string(&tree).unwrap();
        let mut lines: Vec<String> = content.lines().map(str::to_owned).collect();
        let mut tokens: Vec<String> = lines[0].split(' ').map(str::to_owned).collect();
        tokens[1] = "1".to_owned();
        lines[0] = tokens.join(" ");
        std::fs::write(&tree, lines.join("\n")).unwrap();

        assert_matches!(verify(&tree, None), Err(CliError::HashMismatch { stored: 1, .. }));
    }

    #[test]
    fn unsorted_record_file_is_sorted_before_grouping() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("initial_set.txt");
        let tree = dir.path().join("sorted_hashes.txt");
        std::fs::write(&input, "0 0 1 4\n0 0 0 5\n").unwrap();

        build(&BuildRun {
            input: &input,
            output: &tree,
            graph: None,
            scope: GroupingScope::under(&[0, 0]),
            reads: (2, 0),
            seed: Some(2),
            show: false,
        })
        .unwrap();

        let nodes = read_tree_file(&tree).value.unwrap();
        let mut leaves: Vec<(&[u64], Option<u64>)> = nodes
            .iter()
            .map(|node| (node.composite_key.components(), node.value()))
            .collect();
        leaves.sort();
        assert_eq!(leaves, vec![(&[0, 0, 0][..], Some(5)), (&[0, 0, 1][..], Some(4))]);
        verify(&tree, None).unwrap();
    }

    #[test]
    fn missing_input_fails_without_output() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("sorted_hashes.txt");
        let result = build(&BuildRun {
            input: &dir.path().join("absent.txt"),
            output: &output,
            graph: None,
            scope: GroupingScope::global(),
            reads: (4, 1),
            seed: Some(1),
            show: false,
        });
        assert_matches!(result, Err(CliError::Nestree(nestree::Error::Io(_))));
        assert!(!output.exists());
    }
}
