//! Line-oriented text formats for records and balanced trees.
//!
//! Record file, one record per line:
//!
//! `<contract> <attribute> <field> [<nested key>...] <value>`
//!
//! Balanced-tree file, one node per line:
//!
//! `<path> <root hash> <composite key component>... [<value>]`
//!
//! The value is present iff the path does not end in `M`. The empty path of
//! the top root is written as [`nestree_path::ROOT_TOKEN`]. Blank lines are
//! ignored on read.
//!
//! File writers never leave a partial file behind: lines go to a temporary
//! file next to the target, which replaces the target only after a complete
//! flush.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use itertools::Itertools;
use nestree_costs::{cost_return_on_error, cost_return_on_error_no_add, CostResult, CostsExt, OperationCost};
use nestree_path::NodePath;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::{
    flatten::{FlatKind, FlatNode},
    record::{CompositeKey, Record, FIXED_KEY_COMPONENTS, MAX_NESTED_KEYS},
    Error,
};

fn parse_number(token: &str, line_number: usize) -> Result<u64, Error> {
    token.parse::<u64>().map_err(|e| {
        Error::MalformedInput(format!(
            "line {line_number}: {token:?} is not a non-negative integer ({e})"
        ))
    })
}

fn write_line<W: Write>(out: &mut W, line: &str) -> CostResult<(), Error> {
    writeln!(out, "{line}")
        .map_err(Error::Io)
        .wrap_fn_cost(|written| match written {
            Ok(()) => OperationCost::with_bytes_written(line.len() as u64 + 1),
            Err(_) => OperationCost::default(),
        })
}

/// Reads non-blank lines, handing each line number and its tokens to `parse`.
fn read_lines<R, T, F>(input: R, mut parse: F) -> CostResult<Vec<T>, Error>
where
    R: BufRead,
    F: FnMut(usize, &[&str]) -> Result<T, Error>,
{
    let mut cost = OperationCost::default();
    let mut parsed = Vec::new();
    for (index, line) in input.lines().enumerate() {
        let line = cost_return_on_error_no_add!(&cost, line);
        cost.bytes_loaded += line.len() as u64 + 1;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        parsed.push(cost_return_on_error_no_add!(&cost, parse(index + 1, &tokens)));
    }
    Ok(parsed).wrap_with_cost(cost)
}

/// Formats one balanced-tree line.
pub fn format_node(node: &FlatNode) -> String {
    let mut line = format!(
        "{} {} {}",
        node.path.token(),
        node.root_hash,
        node.composite_key.components().iter().join(" ")
    );
    if let FlatKind::Leaf(value) = node.kind {
        line.push(' ');
        line.push_str(&value.to_string());
    }
    line
}

/// Parses the tokens of one balanced-tree line.
pub fn parse_node(line_number: usize, tokens: &[&str]) -> Result<FlatNode, Error> {
    let [path, root_hash, rest @ ..] = tokens else {
        return Err(Error::MalformedInput(format!(
            "line {line_number}: expected a path and a root hash"
        )));
    };
    let path = NodePath::from_token(path)?;
    let root_hash = parse_number(root_hash, line_number)?;

    let (components, kind) = if path.is_subtree_root() {
        (rest, FlatKind::SubtreeRoot)
    } else {
        match rest.split_last() {
            Some((value, components)) => (
                components,
                FlatKind::Leaf(parse_number(value, line_number)?),
            ),
            None => {
                return Err(Error::MalformedInput(format!(
                    "line {line_number}: leaf at {path} has no value"
                )))
            }
        }
    };
    if components.is_empty() {
        return Err(Error::MalformedInput(format!(
            "line {line_number}: node at {path} has no composite key"
        )));
    }
    let components = components
        .iter()
        .map(|token| parse_number(token, line_number))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FlatNode {
        path,
        composite_key: CompositeKey::new(components)?,
        kind,
        root_hash,
    })
}

/// Writes flattened nodes, one line each, in the given order.
pub fn write_tree<W: Write>(nodes: &[FlatNode], mut out: W) -> CostResult<(), Error> {
    let mut cost = OperationCost::default();
    for node in nodes {
        cost_return_on_error!(&mut cost, write_line(&mut out, &format_node(node)));
    }
    cost_return_on_error_no_add!(&cost, out.flush());
    Ok(()).wrap_with_cost(cost)
}

/// Reads a balanced-tree file's content. Root hashes are taken as stored;
/// recommit to trust them.
pub fn read_tree<R: BufRead>(input: R) -> CostResult<Vec<FlatNode>, Error> {
    read_lines(input, parse_node)
}

/// Formats one record line.
pub fn format_record(record: &Record) -> String {
    format!(
        "{} {}",
        record.key.components().iter().join(" "),
        record.value
    )
}

/// Parses the tokens of one record line.
pub fn parse_record(line_number: usize, tokens: &[&str]) -> Result<Record, Error> {
    let Some((value, components)) = tokens.split_last() else {
        return Err(Error::MalformedInput(format!("line {line_number}: empty record")));
    };
    if components.len() < FIXED_KEY_COMPONENTS
        || components.len() > FIXED_KEY_COMPONENTS + MAX_NESTED_KEYS
    {
        return Err(Error::MalformedInput(format!(
            "line {line_number}: expected {} to {} key components and a value, got {} tokens",
            FIXED_KEY_COMPONENTS,
            FIXED_KEY_COMPONENTS + MAX_NESTED_KEYS,
            tokens.len()
        )));
    }
    let components = components
        .iter()
        .map(|token| parse_number(token, line_number))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Record::new(
        CompositeKey::new(components)?,
        parse_number(value, line_number)?,
    ))
}

/// Writes records, one line each, in the given order.
pub fn write_records<W: Write>(records: &[Record], mut out: W) -> CostResult<(), Error> {
    let mut cost = OperationCost::default();
    for record in records {
        cost_return_on_error!(&mut cost, write_line(&mut out, &format_record(record)));
    }
    cost_return_on_error_no_add!(&cost, out.flush());
    Ok(()).wrap_with_cost(cost)
}

/// Reads a record file's content.
pub fn read_records<R: BufRead>(input: R) -> CostResult<Vec<Record>, Error> {
    read_lines(input, parse_record)
}

/// Runs `write` against a temporary file in the target's directory and moves
/// it over `path` once everything has been flushed.
pub(crate) fn write_atomically<F>(path: &Path, write: F) -> CostResult<(), Error>
where
    F: FnOnce(&mut BufWriter<&mut File>) -> CostResult<(), Error>,
{
    let mut cost = OperationCost::default();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = cost_return_on_error_no_add!(&cost, NamedTempFile::new_in(dir));
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        cost_return_on_error!(&mut cost, write(&mut writer));
        cost_return_on_error_no_add!(&cost, writer.flush());
    }
    cost_return_on_error_no_add!(&cost, temp.as_file().sync_all());
    cost_return_on_error_no_add!(&cost, temp.persist(path));
    debug!(path = %path.display(), bytes = cost.bytes_written, "persisted file");
    Ok(()).wrap_with_cost(cost)
}

fn open(path: &Path) -> Result<BufReader<File>, Error> {
    Ok(BufReader::new(File::open(path)?))
}

/// Writes a balanced-tree file atomically.
pub fn write_tree_file(path: &Path, nodes: &[FlatNode]) -> CostResult<(), Error> {
    let ctx = write_atomically(path, |out| write_tree(nodes, out));
    if ctx.value.is_ok() {
        info!(path = %path.display(), nodes = nodes.len(), "wrote tree file");
    }
    ctx
}

/// Reads a balanced-tree file.
pub fn read_tree_file(path: &Path) -> CostResult<Vec<FlatNode>, Error> {
    open(path)
        .wrap_with_cost(OperationCost::default())
        .flat_map_ok(read_tree)
}

/// Writes a record file atomically.
pub fn write_records_file(path: &Path, records: &[Record]) -> CostResult<(), Error> {
    let ctx = write_atomically(path, |out| write_records(records, out));
    if ctx.value.is_ok() {
        info!(path = %path.display(), records = records.len(), "wrote record file");
    }
    ctx
}

/// Reads a record file.
pub fn read_records_file(path: &Path) -> CostResult<Vec<Record>, Error> {
    open(path)
        .wrap_with_cost(OperationCost::default())
        .flat_map_ok(read_records)
}
