//! Query results: the lazy [`Rows`] cursor, decoded [`Row`]s, and the
//! materialized [`ResultSet`].

mod result_set;
mod row;
mod rows;

pub use result_set::ResultSet;
pub use row::{FromRow, Row};
pub use rows::Rows;
