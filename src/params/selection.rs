//! The three things a caller asks for: grid type, temporal cadence and which
//! pp components.

use crate::params::error::ParamsError;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Marker a `freq` value carries when the component is time-invariant.
pub const STATIC_FREQ_MARKER: &str = "P0Y";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalType {
    Temporal,
    Static,
}

impl TemporalType {
    /// Whether a component with this (optional) `freq` has the requested
    /// cadence. An absent or empty `freq` always matches.
    pub fn accepts(self, freq: Option<&str>) -> bool {
        let Some(freq) = freq.filter(|f| !f.is_empty()) else {
            return true;
        };
        let is_static = freq.contains(STATIC_FREQ_MARKER);
        match self {
            TemporalType::Static => is_static,
            TemporalType::Temporal => !is_static,
        }
    }
}

impl FromStr for TemporalType {
    type Err = ParamsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "temporal" => Ok(TemporalType::Temporal),
            "static" => Ok(TemporalType::Static),
            other => Err(ParamsError::UnknownTemporalType(other.to_string())),
        }
    }
}

impl fmt::Display for TemporalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TemporalType::Temporal => "temporal",
            TemporalType::Static => "static",
        })
    }
}

/// Which pp components the caller wants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentFilter {
    All,
    Named(BTreeSet<String>),
}

impl ComponentFilter {
    /// Build from a whitespace-separated list; the token `all` anywhere in it
    /// selects everything.
    pub fn parse(pp_components: &str) -> Self {
        let names: BTreeSet<String> = pp_components
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if names.contains("all") {
            ComponentFilter::All
        } else {
            ComponentFilter::Named(names)
        }
    }

    /// `identifiers` are the candidate names for one entry (see
    /// `component_identifiers`); any hit selects it.
    pub fn accepts<'a>(&self, identifiers: impl IntoIterator<Item = &'a str>) -> bool {
        match self {
            ComponentFilter::All => true,
            ComponentFilter::Named(names) => identifiers.into_iter().any(|id| names.contains(id)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub grid_type: String,
    pub temporal_type: TemporalType,
    pub components: ComponentFilter,
    /// Skip `!`/`!!` entries instead of treating them like any other.
    pub skip_ignored: bool,
}

impl Selection {
    /// Validate the raw strings a workflow passes in. The temporal type is
    /// checked here, before any configuration entry is looked at.
    pub fn new(
        grid_type: &str,
        temporal_type: &str,
        pp_components: &str,
    ) -> Result<Self, ParamsError> {
        Ok(Self {
            grid_type: grid_type.to_string(),
            temporal_type: temporal_type.parse()?,
            components: ComponentFilter::parse(pp_components),
            skip_ignored: false,
        })
    }

    pub fn skip_ignored(mut self, skip: bool) -> Self {
        self.skip_ignored = skip;
        self
    }

    /// Compare only the part of `grid` before the first `/` (so
    /// `regrid-xy/1deg` is a `regrid-xy` grid).
    pub fn accepts_grid(&self, grid: &str) -> bool {
        grid_base(grid) == self.grid_type
    }
}

pub fn grid_base(grid: &str) -> &str {
    grid.split_once('/').map_or(grid, |(base, _)| base)
}
