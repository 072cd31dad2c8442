pub mod config;
pub mod controller;
pub mod memory;
pub mod page;
pub mod query;
pub mod table;
pub mod visibility;

pub use config::{
  ColumnToggle,
  ControllerConfig,
  Layout,
  TaggedToggle
};
pub use controller::{
  ControllerEvent,
  TableController
};
pub use page::{
  Page,
  QueryStore
};
pub use query::SearchQuery;
pub use table::TableSnapshot;
pub use visibility::{
  ClassMutation,
  FilterOutcome,
  Target
};
