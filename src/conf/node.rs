//! In-memory tree for a parsed Rose-style configuration file.
//!
//! Only two levels exist in practice: top-level entries (sections, or options
//! declared before the first section header) and the options inside a
//! section.

/// Ignore state carried by the `!` / `!!` prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfState {
    #[default]
    Normal,
    /// `!name`: switched off by the user.
    UserIgnored,
    /// `!!name`: switched off by trigger logic.
    TriggerIgnored,
}

impl ConfState {
    /// Split a leading `!`/`!!` off `raw`.
    pub fn split_prefix(raw: &str) -> (Self, &str) {
        if let Some(rest) = raw.strip_prefix("!!") {
            (ConfState::TriggerIgnored, rest)
        } else if let Some(rest) = raw.strip_prefix('!') {
            (ConfState::UserIgnored, rest)
        } else {
            (ConfState::Normal, raw)
        }
    }

    pub fn is_ignored(self) -> bool {
        self != ConfState::Normal
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfOption {
    pub key: String,
    pub value: String,
    pub state: ConfState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfEntry {
    Section {
        name: String,
        state: ConfState,
        options: Vec<ConfOption>,
    },
    /// An option declared before any section header.
    Option(ConfOption),
}

impl ConfEntry {
    pub fn name(&self) -> &str {
        match self {
            ConfEntry::Section { name, .. } => name,
            ConfEntry::Option(opt) => &opt.key,
        }
    }

    pub fn is_ignored(&self) -> bool {
        match self {
            ConfEntry::Section { state, .. } => state.is_ignored(),
            ConfEntry::Option(opt) => opt.state.is_ignored(),
        }
    }

    /// Option `key` inside this section, whatever its ignore state.
    pub fn option(&self, key: &str) -> Option<&ConfOption> {
        match self {
            ConfEntry::Section { options, .. } => options.iter().find(|o| o.key == key),
            ConfEntry::Option(_) => None,
        }
    }

    /// Active value of option `key`. An ignored section, or an ignored
    /// option, reads as absent. Root options have no children.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.is_ignored() {
            return None;
        }
        self.option(key)
            .filter(|o| !o.state.is_ignored())
            .map(|o| o.value.as_str())
    }
}

/// Parsed configuration: top-level entries in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfNode {
    entries: Vec<ConfEntry>,
}

impl ConfNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> impl Iterator<Item = &ConfEntry> {
        self.entries.iter()
    }

    /// Open (or reopen) a section. A repeated header merges into the earlier
    /// one; the most recent state wins. Returns the section's index.
    pub(crate) fn open_section(&mut self, name: &str, state: ConfState) -> usize {
        let found = self.entries.iter().position(
            |e| matches!(e, ConfEntry::Section { name: n, .. } if n == name),
        );
        match found {
            Some(idx) => {
                if let ConfEntry::Section { state: s, .. } = &mut self.entries[idx] {
                    *s = state;
                }
                idx
            }
            None => {
                self.entries.push(ConfEntry::Section {
                    name: name.to_string(),
                    state,
                    options: Vec::new(),
                });
                self.entries.len() - 1
            }
        }
    }

    /// Set an option in section `section` (or at root when `None`); a key
    /// set twice keeps its first position and takes the newer value.
    pub(crate) fn set_option(&mut self, section: Option<usize>, opt: ConfOption) {
        match section {
            Some(idx) => {
                if let ConfEntry::Section { options, .. } = &mut self.entries[idx] {
                    upsert(options, opt);
                }
            }
            None => {
                let pos = self
                    .entries
                    .iter()
                    .position(|e| matches!(e, ConfEntry::Option(o) if o.key == opt.key));
                match pos {
                    Some(idx) => self.entries[idx] = ConfEntry::Option(opt),
                    None => self.entries.push(ConfEntry::Option(opt)),
                }
            }
        }
    }

    pub(crate) fn option_mut(
        &mut self,
        section: Option<usize>,
        key: &str,
    ) -> Option<&mut ConfOption> {
        match section {
            Some(idx) => match &mut self.entries[idx] {
                ConfEntry::Section { options, .. } => options.iter_mut().find(|o| o.key == key),
                ConfEntry::Option(_) => None,
            },
            None => self.entries.iter_mut().find_map(|e| match e {
                ConfEntry::Option(o) if o.key == key => Some(o),
                _ => None,
            }),
        }
    }
}

fn upsert(options: &mut Vec<ConfOption>, opt: ConfOption) {
    match options.iter_mut().find(|o| o.key == opt.key) {
        Some(existing) => *existing = opt,
        None => options.push(opt),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn split_prefix_recognises_both_ignore_markers() {
        assert_eq!(ConfState::split_prefix("atmos"), (ConfState::Normal, "atmos"));
        assert_eq!(ConfState::split_prefix("!atmos"), (ConfState::UserIgnored, "atmos"));
        assert_eq!(ConfState::split_prefix("!!atmos"), (ConfState::TriggerIgnored, "atmos"));
    }

    #[test]
    fn reopened_section_merges_and_overrides() {
        let mut node = ConfNode::new();
        let a = node.open_section("atmos", ConfState::Normal);
        node.set_option(Some(a), opt("grid", "native"));
        node.open_section("ocean", ConfState::Normal);
        let again = node.open_section("atmos", ConfState::Normal);
        assert_eq!(a, again);
        node.set_option(Some(again), opt("grid", "regrid-xy"));

        let names: Vec<&str> = node.entries().map(|e| e.name()).collect();
        assert_eq!(names, vec!["atmos", "ocean"]);
        assert_eq!(node.entries().next().and_then(|e| e.get("grid")), Some("regrid-xy"));
    }

    #[test]
    fn root_options_have_no_children() {
        let mut node = ConfNode::new();
        node.set_option(None, opt("meta", "remap"));
        let s = node.open_section("land", ConfState::Normal);
        node.set_option(Some(s), opt("source", "soil"));

        let entries: Vec<&ConfEntry> = node.entries().collect();
        assert_eq!(entries[0].get("source"), None);
        assert_eq!(entries[1].get("source"), Some("soil"));
        assert_eq!(entries[1].get("grid"), None);
    }

    #[test]
    fn ignored_values_read_as_absent() {
        let mut node = ConfNode::new();
        let s = node.open_section("atmos", ConfState::Normal);
        node.set_option(Some(s), opt("grid", "native"));
        node.set_option(
            Some(s),
            ConfOption {
                key: "freq".to_string(),
                value: "P0Y".to_string(),
                state: ConfState::UserIgnored,
            },
        );
        let t = node.open_section("ocean", ConfState::TriggerIgnored);
        node.set_option(Some(t), opt("grid", "native"));

        let entries: Vec<&ConfEntry> = node.entries().collect();
        assert_eq!(entries[0].get("grid"), Some("native"));
        assert_eq!(entries[0].get("freq"), None);
        assert_eq!(entries[0].option("freq").map(|o| o.value.as_str()), Some("P0Y"));
        assert_eq!(entries[1].get("grid"), None);
        assert!(entries[1].option("grid").is_some());
    }

    fn opt(key: &str, value: &str) -> ConfOption {
        ConfOption {
            key: key.to_string(),
            value: value.to_string(),
            state: ConfState::Normal,
        }
    }
}
