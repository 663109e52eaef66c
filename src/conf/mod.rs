//! Reader for the Rose-style configuration files that declare pp components.

pub mod node;
pub mod parse;

pub use node::ConfNode;
pub use parse::load_conf_file;
