//! Where a workflow keeps the remap-pp-components optional configurations.

use crate::Result;
use crate::params::ParamsError;
use std::path::{Path, PathBuf};

const OPT_CONF_DIR: &str = "app/remap-pp-components/opt";

/// `<workflow_dir>/app/remap-pp-components/opt/rose-app-<optional_config>.conf`
pub fn conf_path(workflow_dir: &Path, optional_config: &str) -> Result<PathBuf> {
    if optional_config.is_empty() {
        return Err(ParamsError::EmptyOptionalConfig.into());
    }
    Ok(workflow_dir
        .join(OPT_CONF_DIR)
        .join(format!("rose-app-{}.conf", optional_config)))
}
