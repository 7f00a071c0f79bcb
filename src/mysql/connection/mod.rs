mod core;
mod cursor;
mod execute;
mod metadata;

pub use self::core::MysqlDbo;
pub use execute::is_procedure_call;
