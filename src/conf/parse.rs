use crate::Result;
use crate::conf::node::{ConfNode, ConfOption, ConfState};
use anyhow::{Context, bail};
use regex::Regex;
use std::fs;
use std::path::Path;

/// Read and parse a Rose-style configuration file.
pub fn load_conf_file(path: &Path) -> Result<ConfNode> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read configuration file {}", path.display()))?;
    parse_conf_str(&text, &path.display().to_string())
}

/// Parse configuration text. `origin` is only used in error messages.
///
/// Accepted lines:
/// [section]      [!section]      [!!section]      [] (back to root)
/// key=value      !key=value      !!key=value
///    =more       (continuation of the previous option, joined with '\n')
/// # comment
pub fn parse_conf_str(text: &str, origin: &str) -> Result<ConfNode> {
    let section_re = Regex::new(r"^\[(!{0,2})([^\]]*)\]\s*$")?;
    let option_re = Regex::new(r"^(!{0,2})([^=\s!][^=]*?)\s*=\s*(.*?)\s*$")?;

    let mut node = ConfNode::new();
    let mut section: Option<usize> = None;
    let mut last_key: Option<String> = None;

    for (lineno, raw) in text.lines().enumerate() {
        let lno = lineno + 1;
        let trimmed = raw.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        // Indented lines extend the previous option's value.
        if raw.starts_with(char::is_whitespace) {
            if let Some(key) = &last_key {
                let part = trimmed.strip_prefix('=').unwrap_or(trimmed).trim();
                let Some(opt) = node.option_mut(section, key) else {
                    bail!(
                        "configuration parse error at {}:{}: lost option {:?}",
                        origin,
                        lno,
                        key
                    );
                };
                opt.value.push('\n');
                opt.value.push_str(part);
                continue;
            }
        }

        if let Some(caps) = section_re.captures(trimmed) {
            let (state, name) = (&caps[1], caps[2].trim());
            let (state, _) = ConfState::split_prefix(state);
            section = if name.is_empty() {
                None
            } else {
                Some(node.open_section(name, state))
            };
            last_key = None;
            continue;
        }

        if let Some(caps) = option_re.captures(trimmed) {
            let (state, _) = ConfState::split_prefix(&caps[1]);
            let key = caps[2].to_string();
            node.set_option(
                section,
                ConfOption {
                    key: key.clone(),
                    value: caps[3].to_string(),
                    state,
                },
            );
            last_key = Some(key);
            continue;
        }

        bail!(
            "configuration parse error at {}:{}: cannot parse line: {:?}",
            origin,
            lno,
            raw
        );
    }

    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::node::ConfEntry;
    use pretty_assertions::assert_eq;

    fn entry<'a>(node: &'a ConfNode, name: &str) -> Option<&'a ConfEntry> {
        node.entries().find(|e| e.name() == name)
    }

    fn value<'a>(node: &'a ConfNode, section: &str, key: &str) -> Option<&'a str> {
        entry(node, section).and_then(|e| e.get(key))
    }

    fn root_value<'a>(node: &'a ConfNode, key: &str) -> Option<&'a str> {
        node.entries().find_map(|e| match e {
            ConfEntry::Option(o) if o.key == key => Some(o.value.as_str()),
            _ => None,
        })
    }

    const REMAP: &str = r#"
# remap-pp-components optional configuration
[command]
default=remap-pp-components

[env]
inputDir=$CYLC_WORKFLOW_SHARE_DIR/cycle/$CYLC_TASK_CYCLE_POINT/history/native

[atmos_static]
grid=native
freq=P0Y
source=ps orog

[land_cubic]
grid = regrid-xy/1deg
source=soil_moisture
      =land_month
"#;

    #[test]
    fn parses_sections_in_declaration_order() {
        let node = parse_conf_str(REMAP, "remap.conf").unwrap();
        let names: Vec<&str> = node.entries().map(|e| e.name()).collect();
        assert_eq!(names, vec!["command", "env", "atmos_static", "land_cubic"]);
        assert_eq!(value(&node, "atmos_static", "source"), Some("ps orog"));
        assert_eq!(value(&node, "land_cubic", "grid"), Some("regrid-xy/1deg"));
        assert_eq!(value(&node, "atmos_static", "missing"), None);
    }

    #[test]
    fn continuation_lines_join_with_newline() {
        let node = parse_conf_str(REMAP, "remap.conf").unwrap();
        assert_eq!(
            value(&node, "land_cubic", "source"),
            Some("soil_moisture\nland_month")
        );
    }

    #[test]
    fn ignore_prefixes_are_recorded_and_hide_values() {
        let text = "[!ocean]\ngrid=native\n[atmos]\ngrid=native\n!!source=sst\n[!!ice]\ngrid=native\n";
        let node = parse_conf_str(text, "t.conf").unwrap();

        let ocean = entry(&node, "ocean").unwrap();
        assert!(ocean.is_ignored());
        assert_eq!(ocean.get("grid"), None);
        assert!(entry(&node, "ice").unwrap().is_ignored());

        let atmos = entry(&node, "atmos").unwrap();
        assert!(!atmos.is_ignored());
        assert_eq!(atmos.get("source"), None);
        let source = atmos.option("source").unwrap();
        assert_eq!(source.value, "sst");
        assert_eq!(source.state, ConfState::TriggerIgnored);
    }

    #[test]
    fn root_options_precede_sections() {
        let text = "meta=remap\n[atmos]\ngrid=native\n[]\nimport=base\n";
        let node = parse_conf_str(text, "t.conf").unwrap();
        assert_eq!(root_value(&node, "meta"), Some("remap"));
        assert_eq!(root_value(&node, "import"), Some("base"));
        assert!(matches!(entry(&node, "meta"), Some(ConfEntry::Option(_))));
    }

    #[test]
    fn rejects_unparseable_line_with_location() {
        let err = parse_conf_str("[atmos]\ngrid native\n", "bad.conf").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("bad.conf:2"), "{}", msg);
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_conf_file(Path::new("/nonexistent/rose-app-x.conf")).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/rose-app-x.conf"));
    }
}
