//! Terminal presentation: theme, icons, message helpers and tables.

pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{added, deleted, empty, error, info, section, success, summary_row, updated};
pub use table::{TableBuilder, opt_cell, stats_table};
pub use theme::{Theme, theme};
