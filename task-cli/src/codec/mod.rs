//! Reading and writing of the task document: a pretty-printed JSON array of
//! flat task objects.
//!
//! The codec only understands the subset of JSON the writer produces: one
//! array of objects whose values are strings or integers. Strings escape
//! only `"` and `\`. Anything the reader cannot make sense of is skipped and
//! reported rather than failing the whole load.

mod escape;
mod reader;
mod value;
mod writer;

pub use escape::{escape, unescape};
pub use reader::{ParseProblem, ParsedDocument, parse_document};
pub use value::find_value;
pub use writer::{Document, render_document};
