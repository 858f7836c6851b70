//! Rewrites JSON Schema documents generated from XSD sources into a cleaner
//! form and pins each message schema to the message code in its file name.
pub mod batch;
pub mod error;
pub mod fixups;
pub mod message_code;
pub mod output;
pub mod rewrite;

pub use batch::{process_directory, BatchConfig, BatchReport};
pub use error::RewriteError;
pub use fixups::{Correction, FixupTable};
pub use message_code::MessageCode;
pub use rewrite::{rewrite_document, rewrite_node, RewriteContext, RuleError};
