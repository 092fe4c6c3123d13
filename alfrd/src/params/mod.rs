//! Parameter values, the shared parameter space, and resolution.
//!
//! This module provides:
//! - A tagged value type with best-effort string coercion
//! - The mutable parameter space shared by a run
//! - Resolution of declared signatures against that space
//! - Input-file parsing into parameters

mod inputfile;
mod resolve;
mod space;
mod value;

pub use inputfile::{parse_input, read_input_files, InputFile};
pub use resolve::{resolve, ParamSignature, Params};
pub use space::{ParameterSpace, RET_KEY, RET_VALID_KEY};
pub use value::ParamValue;
