//! Buffered result handles and the table-qualified rows decoded from them.

pub mod column_map;
pub mod handle;
pub mod row;

pub use column_map::{ColumnMap, TableKey};
pub use handle::{ColumnMeta, QueryOutcome, ResultHandle};
pub use row::DecodedRow;
