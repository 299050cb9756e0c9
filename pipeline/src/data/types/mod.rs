//! Shared data types for batch payloads and persisted tables

pub mod enums;
pub mod order;
pub mod rows;

pub use enums::CustomerType;
pub use order::{Address, Customer, LineItem, RawOrder};
pub use rows::{FactKey, LineItemRow, MergeKey, SalesFact};
