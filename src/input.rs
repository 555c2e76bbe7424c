// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Temporal Cascade Simulation Suite - Input Formats
//
// Plain whitespace-separated text. Blank lines and lines starting with '#'
// are skipped everywhere; line numbers in errors are 1-based and count every
// physical line.
//
//   graph        u v                      one undirected edge per line
//   windows      id login logout          one line per node, in id order
//   run list     R, then R records        id k node,time ... (k pairs)
//   bounds       id bound                 one line per run, in run order
//   rates        id rate                  one line per node, in id order

use std::fmt;
use std::io::BufRead;
use std::str::{FromStr, SplitWhitespace};

use crate::error::{CascadeError, InputError};
use crate::graph::ContactGraph;
use crate::rng::VariateSource;
use crate::types::{NodeId, RunId, Seed, Time};
use crate::window::{ConnectivityWindows, OnlineWindow};

/// Seeds of one run as listed in a run-list file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedList {
    pub id: RunId,
    pub seeds: Vec<Seed>,
}

// ─── Line reading ────────────────────────────────────────────────────────────

/// Non-blank, non-comment lines with their 1-based line numbers.
fn data_lines(
    reader: impl BufRead,
    source_name: &'static str,
) -> impl Iterator<Item = Result<(usize, String), InputError>> {
    reader
        .lines()
        .enumerate()
        .filter_map(move |(i, line)| match line {
            Err(source) => Some(Err(InputError::Io { source_name, source })),
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() || trimmed.starts_with('#') {
                    None
                } else {
                    Some(Ok((i + 1, trimmed.to_string())))
                }
            }
        })
}

fn parse_field<T: FromStr>(
    field: Option<&str>,
    what: &str,
    source_name: &'static str,
    line: usize,
) -> Result<T, InputError> {
    let raw = field.ok_or_else(|| InputError::malformed(source_name, line, format!("missing {}", what)))?;
    raw.parse()
        .map_err(|_| InputError::malformed(source_name, line, format!("invalid {} {:?}", what, raw)))
}

fn expect_end<'a>(
    mut fields: impl Iterator<Item = &'a str>,
    source_name: &'static str,
    line: usize,
) -> Result<(), InputError> {
    match fields.next() {
        None => Ok(()),
        Some(extra) => Err(InputError::malformed(source_name, line, format!("unexpected field {:?}", extra))),
    }
}

/// Read exactly `count` records. The first field of record `i` must equal
/// `expected_id(i)`; `parse_rest` consumes the remaining fields given the
/// record index and line number, and nothing may follow them.
fn keyed_records<K, T>(
    reader: impl BufRead,
    count: usize,
    source_name: &'static str,
    expected_id: impl Fn(usize) -> K,
    mut parse_rest: impl FnMut(usize, usize, &mut SplitWhitespace<'_>) -> Result<T, CascadeError>,
) -> Result<Vec<T>, CascadeError>
where
    K: FromStr + PartialEq + fmt::Display,
{
    let mut records = Vec::with_capacity(count);
    let mut last_line = 0;
    for entry in data_lines(reader, source_name) {
        if records.len() == count {
            break;
        }
        let (line, text) = entry?;
        last_line = line;
        let mut fields = text.split_whitespace();
        let id: K = parse_field(fields.next(), "id", source_name, line)?;
        let expected = expected_id(records.len());
        if id != expected {
            return Err(InputError::malformed(source_name, line, format!("expected id {}, found {}", expected, id)).into());
        }
        let record = parse_rest(records.len(), line, &mut fields)?;
        expect_end(fields, source_name, line)?;
        records.push(record);
    }
    if records.len() < count {
        return Err(InputError::Truncated { source_name, line: last_line }.into());
    }
    Ok(records)
}

// ─── Graph ───────────────────────────────────────────────────────────────────

/// Read an undirected edge list. `node_count` forces the node range;
/// otherwise it is the largest id plus one.
pub fn read_graph(reader: impl BufRead, node_count: Option<usize>) -> Result<ContactGraph, CascadeError> {
    const SOURCE: &str = "graph";
    let mut edges = Vec::new();
    for entry in data_lines(reader, SOURCE) {
        let (line, text) = entry?;
        let mut fields = text.split_whitespace();
        let u: NodeId = parse_field(fields.next(), "node id", SOURCE, line)?;
        let v: NodeId = parse_field(fields.next(), "node id", SOURCE, line)?;
        expect_end(fields, SOURCE, line)?;
        edges.push((u, v));
    }
    Ok(ContactGraph::from_edges(node_count, &edges)?)
}

// ─── Connectivity windows ────────────────────────────────────────────────────

/// Read exactly `node_count` windows in node order. Lines past the last
/// node are ignored.
pub fn read_windows(reader: impl BufRead, node_count: usize) -> Result<ConnectivityWindows, CascadeError> {
    const SOURCE: &str = "windows";
    let windows = keyed_records(reader, node_count, SOURCE, |i| i, |node, line, fields| {
        let login: Time = parse_field(fields.next(), "login time", SOURCE, line)?;
        let logout: Time = parse_field(fields.next(), "logout time", SOURCE, line)?;
        Ok(OnlineWindow::new(node as NodeId, login, logout)?)
    })?;
    Ok(ConnectivityWindows::new(windows))
}

// ─── Run list ────────────────────────────────────────────────────────────────

/// Read a run list. With `random` set to `(node_count, rng)`, each record is
/// just `id k` and its k seeds are drawn as distinct random nodes at time
/// zero instead of being read.
pub fn read_run_list(
    reader: impl BufRead,
    mut random: Option<(usize, &mut VariateSource)>,
) -> Result<Vec<SeedList>, CascadeError> {
    const SOURCE: &str = "run list";

    let mut tokens = Vec::new();
    for entry in data_lines(reader, SOURCE) {
        let (line, text) = entry?;
        tokens.extend(text.split_whitespace().map(|t| (line, t.to_string())));
    }
    let mut tokens = tokens.into_iter();
    let mut last_line = 0;
    let mut next = |what: &str| -> Result<(usize, String), InputError> {
        match tokens.next() {
            Some((line, tok)) => {
                last_line = line;
                Ok((line, tok))
            }
            None => {
                tracing::debug!(expected = what, line = last_line, "run list ended early");
                Err(InputError::Truncated { source_name: SOURCE, line: last_line })
            }
        }
    };

    let (line, raw) = next("run count")?;
    let count: usize = parse_field(Some(raw.as_str()), "run count", SOURCE, line)?;
    if count == 0 {
        return Err(InputError::malformed(SOURCE, line, "run count must be positive").into());
    }

    let mut runs = Vec::with_capacity(count);
    for _ in 0..count {
        let (line, raw) = next("run id")?;
        let id: RunId = parse_field(Some(raw.as_str()), "run id", SOURCE, line)?;
        let (line, raw) = next("seed count")?;
        let k: usize = parse_field(Some(raw.as_str()), "seed count", SOURCE, line)?;
        if k == 0 {
            return Err(InputError::malformed(SOURCE, line, format!("run {} has no seeds", id)).into());
        }

        let seeds = match random.as_mut() {
            Some((node_count, rng)) => {
                if k > *node_count {
                    return Err(InputError::malformed(
                        SOURCE,
                        line,
                        format!("run {} asks for {} seeds among {} nodes", id, k, node_count),
                    )
                    .into());
                }
                crate::params::RunParameters::new(id, 1, *node_count)
                    .with_random_seeds(k, *node_count, rng)
                    .seeds
            }
            None => {
                let mut seeds = Vec::with_capacity(k);
                for _ in 0..k {
                    let (line, raw) = next("seed")?;
                    seeds.push(parse_seed(&raw, line)?);
                }
                seeds
            }
        };
        runs.push(SeedList { id, seeds });
    }
    Ok(runs)
}

/// `node,time`
fn parse_seed(raw: &str, line: usize) -> Result<Seed, InputError> {
    const SOURCE: &str = "run list";
    let (node, time) = raw
        .split_once(',')
        .ok_or_else(|| InputError::malformed(SOURCE, line, format!("seed {:?} is not node,time", raw)))?;
    let node: NodeId = parse_field(Some(node), "seed node", SOURCE, line)?;
    let time: Time = parse_field(Some(time), "seed time", SOURCE, line)?;
    Ok(Seed::new(node, time))
}

// ─── Per-run bounds and per-node rates ───────────────────────────────────────

/// Read one `id bound` line per run. Ids must match `run_ids` position by
/// position and bounds must be positive.
pub fn read_bounds(reader: impl BufRead, run_ids: &[RunId]) -> Result<Vec<Time>, CascadeError> {
    const SOURCE: &str = "bounds";
    keyed_records(reader, run_ids.len(), SOURCE, |i| run_ids[i], |_, line, fields| {
        let bound: Time = parse_field(fields.next(), "bound", SOURCE, line)?;
        if bound <= 0 {
            return Err(InputError::malformed(SOURCE, line, format!("bound {} must be positive", bound)).into());
        }
        Ok(bound)
    })
}

/// Read one non-negative activity rate per node.
pub fn read_rates(reader: impl BufRead, node_count: usize) -> Result<Vec<f64>, CascadeError> {
    const SOURCE: &str = "rates";
    keyed_records(reader, node_count, SOURCE, |i| i, |_, line, fields| {
        let rate: f64 = parse_field(fields.next(), "rate", SOURCE, line)?;
        if !(rate.is_finite() && rate >= 0.0) {
            return Err(InputError::malformed(SOURCE, line, format!("rate {} must be non-negative", rate)).into());
        }
        Ok(rate)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_graph() {
        let text = "# contact graph\n0 1\n\n1 2\n";
        let g = read_graph(text.as_bytes(), None).unwrap();
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.degree(1), 2);

        let g = read_graph(text.as_bytes(), Some(6)).unwrap();
        assert_eq!(g.node_count(), 6);
    }

    #[test]
    fn test_read_graph_errors() {
        let err = read_graph("0 1\n1 x\n".as_bytes(), None).unwrap_err();
        assert!(matches!(err, CascadeError::Input(InputError::Malformed { line: 2, .. })), "{}", err);
        let err = read_graph("0 1 2\n".as_bytes(), None).unwrap_err();
        assert!(matches!(err, CascadeError::Input(InputError::Malformed { line: 1, .. })));
        let err = read_graph("# nothing\n".as_bytes(), None).unwrap_err();
        assert!(matches!(err, CascadeError::Graph(_)));
    }

    #[test]
    fn test_read_windows() {
        let windows = read_windows("0 0 100\n1 50 100\n".as_bytes(), 2).unwrap();
        assert_eq!(windows.len(), 2);
        assert!(windows.is_online(0, 0));
        assert!(!windows.is_online(1, 0));
    }

    #[test]
    fn test_read_windows_errors() {
        let err = read_windows("0 0 100\n2 0 10\n".as_bytes(), 2).unwrap_err();
        assert!(matches!(err, CascadeError::Input(InputError::Malformed { line: 2, .. })));

        let err = read_windows("0 0 100\n".as_bytes(), 2).unwrap_err();
        assert!(matches!(err, CascadeError::Input(InputError::Truncated { line: 1, .. })));

        let err = read_windows("0 10 5\n".as_bytes(), 1).unwrap_err();
        assert!(matches!(err, CascadeError::Window(_)));

        let err = read_windows("0 -3 5\n".as_bytes(), 1).unwrap_err();
        assert!(matches!(err, CascadeError::Window(_)));
    }

    #[test]
    fn test_keyed_files_share_line_rules() {
        // Trailing fields are rejected with the physical line number.
        let err = read_windows("# nodes\n0 0 100 7\n".as_bytes(), 1).unwrap_err();
        assert!(matches!(err, CascadeError::Input(InputError::Malformed { line: 2, .. })), "{}", err);
        let err = read_bounds("\n7 100 1\n".as_bytes(), &[7]).unwrap_err();
        assert!(matches!(err, CascadeError::Input(InputError::Malformed { line: 2, .. })), "{}", err);
        let err = read_rates("0 1.5 x\n".as_bytes(), 1).unwrap_err();
        assert!(matches!(err, CascadeError::Input(InputError::Malformed { line: 1, .. })), "{}", err);

        // Out-of-order ids are rejected the same way for nodes and runs.
        let err = read_rates("1 1.5\n0 1.5\n".as_bytes(), 2).unwrap_err();
        assert!(matches!(err, CascadeError::Input(InputError::Malformed { line: 1, .. })));
        let err = read_bounds("9 10\n7 10\n".as_bytes(), &[7, 9]).unwrap_err();
        assert!(matches!(err, CascadeError::Input(InputError::Malformed { line: 1, .. })));

        // Missing value fields and extra trailing lines.
        let err = read_bounds("7\n".as_bytes(), &[7]).unwrap_err();
        assert!(matches!(err, CascadeError::Input(InputError::Malformed { line: 1, .. })));
        let bounds = read_bounds("7 5\n8 6\n".as_bytes(), &[7]).unwrap();
        assert_eq!(bounds, vec![5]);
        let err = read_bounds("# empty\n".as_bytes(), &[7]).unwrap_err();
        assert!(matches!(err, CascadeError::Input(InputError::Truncated { line: 0, .. })));
    }

    #[test]
    fn test_read_run_list() {
        let text = "2\n7 2 0,0 3,5\n9 1\n4,12\n";
        let runs = read_run_list(text.as_bytes(), None).unwrap();
        assert_eq!(
            runs,
            vec![
                SeedList { id: 7, seeds: vec![Seed::new(0, 0), Seed::new(3, 5)] },
                SeedList { id: 9, seeds: vec![Seed::new(4, 12)] },
            ]
        );
    }

    #[test]
    fn test_read_run_list_errors() {
        let err = read_run_list("2\n7 1 0,0\n".as_bytes(), None).unwrap_err();
        assert!(matches!(err, CascadeError::Input(InputError::Truncated { .. })));

        let err = read_run_list("1\n7 1 0;0\n".as_bytes(), None).unwrap_err();
        assert!(matches!(err, CascadeError::Input(InputError::Malformed { line: 2, .. })));

        let err = read_run_list("1\n7 0\n".as_bytes(), None).unwrap_err();
        assert!(matches!(err, CascadeError::Input(InputError::Malformed { .. })));

        let err = read_run_list("0\n".as_bytes(), None).unwrap_err();
        assert!(matches!(err, CascadeError::Input(InputError::Malformed { line: 1, .. })));
    }

    #[test]
    fn test_read_run_list_random_seeds() {
        let mut rng = VariateSource::seeded(4);
        let runs = read_run_list("2\n0 3\n1 2\n".as_bytes(), Some((10, &mut rng))).unwrap();
        assert_eq!(runs[0].seeds.len(), 3);
        assert_eq!(runs[1].seeds.len(), 2);
        assert!(runs.iter().flat_map(|r| &r.seeds).all(|s| s.node < 10 && s.time == 0));

        let mut rng = VariateSource::seeded(4);
        assert!(read_run_list("1\n0 11\n".as_bytes(), Some((10, &mut rng))).is_err());
    }

    #[test]
    fn test_read_bounds() {
        let bounds = read_bounds("7 100\n9 250\n".as_bytes(), &[7, 9]).unwrap();
        assert_eq!(bounds, vec![100, 250]);

        let err = read_bounds("7 100\n8 250\n".as_bytes(), &[7, 9]).unwrap_err();
        assert!(matches!(err, CascadeError::Input(InputError::Malformed { line: 2, .. })));
        let err = read_bounds("7 0\n".as_bytes(), &[7]).unwrap_err();
        assert!(matches!(err, CascadeError::Input(InputError::Malformed { line: 1, .. })));
    }

    #[test]
    fn test_read_rates() {
        let rates = read_rates("0 1.5\n1 0\n2 0.25\n".as_bytes(), 3).unwrap();
        assert_eq!(rates, vec![1.5, 0.0, 0.25]);

        let err = read_rates("0 1.5\n1 -2\n".as_bytes(), 2).unwrap_err();
        assert!(matches!(err, CascadeError::Input(InputError::Malformed { line: 2, .. })));
        let err = read_rates("0 1.5\n".as_bytes(), 2).unwrap_err();
        assert!(matches!(err, CascadeError::Input(InputError::Truncated { .. })));
    }
}
