//! Visibility planning.
//!
//! Everything here is a pure function of a table snapshot, a query and the
//! toggle states. The controller applies the resulting mutations to the page in
//! one batch, so planning can be tested without any document at all.

use crate::query::SearchQuery;
use crate::table::TableSnapshot;

/// What a single class mutation addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
  /// An element looked up by id.
  Element(String),
  /// A cell of the header row.
  HeaderCell {
    column: usize
  },
  /// A body cell by its flat address.
  BodyCell {
    index: usize
  },
  /// A body row, zero-based, header excluded.
  BodyRow {
    row: usize
  },
  /// Every element carrying the given marker class.
  Tagged(String)
}

/// Add (`hidden = true`) or remove the hidden marker on a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMutation {
  pub target: Target,
  pub hidden: bool
}

impl ClassMutation {
  pub fn set(
    target: Target,
    visible: bool
  ) -> Self {
    Self {
      target,
      hidden: !visible
    }
  }
}

/// Row counts after a filter pass.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq,
)]
pub struct FilterOutcome {
  pub shown:  usize,
  pub hidden: usize
}

/// Whether each body row should be visible under `query`. A row without a key
/// cell is matched as if its key text were empty.
pub fn row_visibility(
  table: &TableSnapshot,
  query: &SearchQuery
) -> Vec<bool> {
  table
    .rows
    .iter()
    .map(|key| {
      query.matches(
        key.as_deref().unwrap_or("")
      )
    })
    .collect()
}

pub fn row_mutations(
  table: &TableSnapshot,
  query: &SearchQuery
) -> Vec<ClassMutation> {
  row_visibility(table, query)
    .into_iter()
    .enumerate()
    .map(|(row, visible)| {
      ClassMutation::set(
        Target::BodyRow {
          row
        },
        visible
      )
    })
    .collect()
}

/// Header cell plus every body cell of `column`. Empty when the column does not
/// exist in the snapshot.
pub fn column_mutations(
  table: &TableSnapshot,
  column: usize,
  visible: bool
) -> Vec<ClassMutation> {
  if column >= table.header_width {
    return Vec::new();
  }

  std::iter::once(Target::HeaderCell {
    column
  })
  .chain(
    table
      .column_cells(column)
      .map(|index| Target::BodyCell {
        index
      })
  )
  .map(|target| {
    ClassMutation::set(target, visible)
  })
  .collect()
}

pub fn tagged_mutation(
  marker_class: &str,
  visible: bool
) -> ClassMutation {
  ClassMutation::set(
    Target::Tagged(
      marker_class.to_string()
    ),
    visible
  )
}

pub fn outcome(
  mutations: &[ClassMutation]
) -> FilterOutcome {
  let hidden = mutations
    .iter()
    .filter(|m| m.hidden)
    .count();
  FilterOutcome {
    shown: mutations.len() - hidden,
    hidden
  }
}
