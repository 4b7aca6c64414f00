//! Outforce packed project (.opf) container: data model, binary codec and
//! tree queries.

pub mod container;
pub mod encoding;
pub mod error;
pub mod material;
pub mod object;
pub mod query;
pub mod stream;
pub mod texture;
pub mod types;

pub use container::{
    load_opf, load_opf_with_warnings, parse_opf, parse_opf_with_warnings, salvage_opf, save_opf,
    save_opf_with_backup, write_opf, Salvage, OPF_MAGIC, OPF_VERSION,
};
pub use error::{OpfError, ParseWarning, Result};
pub use query::{ObjectCategory, ProjectTotals, CAN_BUILD_UNIT};
pub use types::*;
