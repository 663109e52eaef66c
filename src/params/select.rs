//! Filter/aggregate pass over the component entries.

use crate::Result;
use crate::conf::ConfNode;
use crate::conf::node::ConfEntry;
use crate::params::error::ParamsError;
use crate::params::selection::Selection;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

/// Top-level keys that configure the remap app itself, not a component.
pub const RESERVED_KEYS: [&str; 2] = ["env", "command"];

/// A component entry that passed every filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedComponent {
    pub name: String,
    pub grid: String,
    pub freq: Option<String>,
    pub sources: Vec<String>,
}

/// Names a component key answers to: the leading `\w+` run of the key, and
/// that run cut at its first `_` (`land_cubic` -> `land_cubic`, `land`).
pub fn component_identifiers<'k>(word_re: &Regex, key: &'k str) -> Result<Vec<&'k str>> {
    let Some(m) = word_re.find(key) else {
        return Err(ParamsError::InvalidComponentKey(key.to_string()).into());
    };
    let full = m.as_str();
    let mut ids = vec![full];
    if let Some((base, _)) = full.split_once('_') {
        if !base.is_empty() {
            ids.push(base);
        }
    }
    Ok(ids)
}

/// Active value of a field the entry must carry. Ignored values count as
/// missing.
fn required<'a>(entry: &'a ConfEntry, field: &'static str) -> Result<&'a str> {
    entry.get(field).ok_or_else(|| {
        ParamsError::MissingField {
            entry: entry.name().to_string(),
            field,
        }
        .into()
    })
}

/// Walk the top-level entries in declaration order and keep the ones matching
/// `selection`. Per entry the checks short-circuit in this order: reserved
/// key, ignore state, component name, grid, cadence. `grid` is only required
/// once the component name matched; `source` only once every filter passed.
/// Unless `skip_ignored` is set, an ignored section that gets this far has no
/// active `grid` and fails as missing it.
pub fn select_components(node: &ConfNode, selection: &Selection) -> Result<Vec<SelectedComponent>> {
    let word_re = Regex::new(r"^\w+")?;
    let mut out = Vec::new();

    for entry in node.entries() {
        let name = entry.name();

        if RESERVED_KEYS.contains(&name) {
            continue;
        }

        if selection.skip_ignored && entry.is_ignored() {
            debug!(component = name, "skipping ignored entry");
            continue;
        }

        let ids = component_identifiers(&word_re, name)?;
        if !selection.components.accepts(ids.iter().copied()) {
            debug!(component = name, ?ids, "skipping: pp component not requested");
            continue;
        }

        let grid = required(entry, "grid")?;
        if !selection.accepts_grid(grid) {
            debug!(
                component = name,
                grid,
                wanted = %selection.grid_type,
                "skipping: grid type mismatch"
            );
            continue;
        }

        let freq = entry.get("freq");
        if !selection.temporal_type.accepts(freq) {
            debug!(
                component = name,
                freq,
                wanted = %selection.temporal_type,
                "skipping: temporal type mismatch"
            );
            continue;
        }

        let source = required(entry, "source")?;
        out.push(SelectedComponent {
            name: name.to_string(),
            grid: grid.to_string(),
            freq: freq.map(str::to_string),
            sources: source.split_whitespace().map(str::to_string).collect(),
        });
    }

    Ok(out)
}

/// Sorted, de-duplicated union of the selected components' source fields.
pub fn source_fields(components: &[SelectedComponent]) -> Vec<String> {
    let set: BTreeSet<&str> = components
        .iter()
        .flat_map(|c| c.sources.iter().map(String::as_str))
        .collect();
    set.into_iter().map(str::to_string).collect()
}

/// The answer as the workflow consumes it: `"a, b, c"`, or `""` when nothing
/// matched.
pub fn form_task_parameters(node: &ConfNode, selection: &Selection) -> Result<String> {
    let components = select_components(node, selection)?;
    Ok(source_fields(&components).join(", "))
}
