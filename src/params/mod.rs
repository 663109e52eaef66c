//! Task parameter resolution: which source fields apply to a
//! grid / temporal / component selection.
//!
//! Split like this:
//! - selection: validated request (grid type, cadence, component filter)
//! - select: the filter pass over configuration entries + final formatting
//! - error: typed failures callers may want to match on

pub mod error;
pub mod select;
pub mod selection;

pub use error::ParamsError;
pub use select::{form_task_parameters, select_components, source_fields};
pub use selection::Selection;
