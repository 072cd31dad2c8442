//! In-memory stand-ins for the browser document and local storage.

use std::collections::{
  BTreeMap,
  BTreeSet
};

use anyhow::anyhow;

use crate::page::{
  Page,
  QueryStore
};
use crate::table::TableSnapshot;
use crate::visibility::{
  ClassMutation,
  Target
};

#[derive(
  Debug, Clone, Default, PartialEq, Eq,
)]
pub struct MemoryElement {
  pub classes: BTreeSet<String>,
  /// `Some` for checkbox inputs.
  pub checked: Option<bool>,
  /// `Some` for text inputs.
  pub value:   Option<String>
}

#[derive(
  Debug, Clone, Default, PartialEq, Eq,
)]
pub struct MemoryCell {
  pub text:    String,
  pub classes: BTreeSet<String>
}

impl MemoryCell {
  pub fn new(text: &str) -> Self {
    Self {
      text:    text.to_string(),
      classes: BTreeSet::new()
    }
  }
}

#[derive(
  Debug, Clone, Default, PartialEq, Eq,
)]
pub struct MemoryRow {
  pub classes: BTreeSet<String>,
  pub cells:   Vec<MemoryCell>
}

#[derive(
  Debug, Clone, Default, PartialEq, Eq,
)]
pub struct MemoryTable {
  pub header: Vec<MemoryCell>,
  pub rows:   Vec<MemoryRow>
}

impl MemoryTable {
  pub fn new(
    header: &[&str],
    rows: &[&[&str]]
  ) -> Self {
    Self {
      header: header
        .iter()
        .map(|text| MemoryCell::new(text))
        .collect(),
      rows:   rows
        .iter()
        .map(|cells| MemoryRow {
          classes: BTreeSet::new(),
          cells:   cells
            .iter()
            .map(|text| {
              MemoryCell::new(text)
            })
            .collect()
        })
        .collect()
    }
  }

  fn body_cell_mut(
    &mut self,
    index: usize
  ) -> Option<&mut MemoryCell> {
    self
      .rows
      .iter_mut()
      .flat_map(|row| row.cells.iter_mut())
      .nth(index)
  }
}

#[derive(
  Debug, Clone, Default, PartialEq, Eq,
)]
struct TaggedElement {
  marker:  String,
  classes: BTreeSet<String>
}

/// A document made of plain maps, used to drive the controller without a
/// browser.
#[derive(Debug, Clone, Default)]
pub struct MemoryPage {
  elements:    BTreeMap<String, MemoryElement>,
  tables:      BTreeMap<String, MemoryTable>,
  tagged:      Vec<TaggedElement>,
  submissions: Vec<String>
}

impl MemoryPage {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_element(
    mut self,
    id: &str
  ) -> Self {
    self.elements.insert(
      id.to_string(),
      MemoryElement::default()
    );
    self
  }

  pub fn with_checkbox(
    mut self,
    id: &str,
    checked: bool
  ) -> Self {
    self.elements.insert(
      id.to_string(),
      MemoryElement {
        checked: Some(checked),
        ..MemoryElement::default()
      }
    );
    self
  }

  pub fn with_input(
    mut self,
    id: &str,
    value: &str
  ) -> Self {
    self.elements.insert(
      id.to_string(),
      MemoryElement {
        value: Some(value.to_string()),
        ..MemoryElement::default()
      }
    );
    self
  }

  pub fn with_table(
    mut self,
    id: &str,
    table: MemoryTable
  ) -> Self {
    self
      .tables
      .insert(id.to_string(), table);
    self
  }

  /// Adds `count` scattered elements carrying `marker`.
  pub fn with_tagged(
    mut self,
    marker: &str,
    count: usize
  ) -> Self {
    for _ in 0..count {
      self.tagged.push(TaggedElement {
        marker:  marker.to_string(),
        classes: BTreeSet::from([
          marker.to_string()
        ])
      });
    }
    self
  }

  pub fn element(
    &self,
    id: &str
  ) -> Option<&MemoryElement> {
    self.elements.get(id)
  }

  pub fn table(
    &self,
    id: &str
  ) -> Option<&MemoryTable> {
    self.tables.get(id)
  }

  /// Flips a checkbox the way a user click would, without firing anything.
  pub fn set_checked(
    &mut self,
    id: &str,
    checked: bool
  ) -> bool {
    match self.elements.get_mut(id) {
      | Some(element)
        if element.checked.is_some() =>
      {
        element.checked = Some(checked);
        true
      }
      | _ => false
    }
  }

  pub fn has_class(
    &self,
    id: &str,
    class: &str
  ) -> bool {
    self.elements.get(id).is_some_and(
      |element| {
        element.classes.contains(class)
      }
    )
  }

  /// Text of the first cell of every body row not carrying `hidden_class`.
  pub fn visible_keys(
    &self,
    table_id: &str,
    hidden_class: &str
  ) -> Vec<String> {
    self
      .tables
      .get(table_id)
      .map(|table| {
        table
          .rows
          .iter()
          .filter(|row| {
            !row
              .classes
              .contains(hidden_class)
          })
          .filter_map(|row| {
            row
              .cells
              .first()
              .map(|cell| cell.text.clone())
          })
          .collect()
      })
      .unwrap_or_default()
  }

  /// Hidden flags of column `column`: header first, then one per body row
  /// that has the cell.
  pub fn column_hidden(
    &self,
    table_id: &str,
    column: usize,
    hidden_class: &str
  ) -> Vec<bool> {
    let Some(table) =
      self.tables.get(table_id)
    else {
      return vec![];
    };

    table
      .header
      .get(column)
      .into_iter()
      .chain(table.rows.iter().filter_map(
        |row| row.cells.get(column)
      ))
      .map(|cell| {
        cell.classes.contains(hidden_class)
      })
      .collect()
  }

  /// `(hidden, total)` over the elements carrying `marker`.
  pub fn tagged_hidden(
    &self,
    marker: &str,
    hidden_class: &str
  ) -> (usize, usize) {
    let tagged: Vec<&TaggedElement> = self
      .tagged
      .iter()
      .filter(|el| el.marker == marker)
      .collect();
    let hidden = tagged
      .iter()
      .filter(|el| {
        el.classes.contains(hidden_class)
      })
      .count();
    (hidden, tagged.len())
  }

  pub fn submissions(&self) -> &[String] {
    &self.submissions
  }
}

fn set_class(
  classes: &mut BTreeSet<String>,
  class: &str,
  hidden: bool
) {
  if hidden {
    classes.insert(class.to_string());
  } else {
    classes.remove(class);
  }
}

impl Page for MemoryPage {
  fn checkbox_checked(
    &self,
    id: &str
  ) -> Option<bool> {
    self
      .elements
      .get(id)
      .and_then(|element| element.checked)
  }

  fn input_value(
    &self,
    id: &str
  ) -> Option<String> {
    self
      .elements
      .get(id)
      .and_then(|element| {
        element.value.clone()
      })
  }

  fn set_input_value(
    &mut self,
    id: &str,
    value: &str
  ) -> bool {
    match self.elements.get_mut(id) {
      | Some(element)
        if element.value.is_some() =>
      {
        element.value =
          Some(value.to_string());
        true
      }
      | _ => false
    }
  }

  fn table_snapshot(
    &self,
    table_id: &str,
    key_column: usize
  ) -> Option<TableSnapshot> {
    let table = self.tables.get(table_id)?;
    Some(TableSnapshot {
      header_width:    table.header.len(),
      body_cell_count: table
        .rows
        .iter()
        .map(|row| row.cells.len())
        .sum(),
      rows:            table
        .rows
        .iter()
        .map(|row| {
          row
            .cells
            .get(key_column)
            .map(|cell| cell.text.clone())
        })
        .collect()
    })
  }

  fn apply(
    &mut self,
    table_id: &str,
    hidden_class: &str,
    mutation: &ClassMutation
  ) -> usize {
    let hidden = mutation.hidden;
    let classes = match &mutation.target {
      | Target::Element(id) => self
        .elements
        .get_mut(id)
        .map(|element| &mut element.classes),
      | Target::HeaderCell {
        column
      } => self
        .tables
        .get_mut(table_id)
        .and_then(|table| {
          table.header.get_mut(*column)
        })
        .map(|cell| &mut cell.classes),
      | Target::BodyCell {
        index
      } => self
        .tables
        .get_mut(table_id)
        .and_then(|table| {
          table.body_cell_mut(*index)
        })
        .map(|cell| &mut cell.classes),
      | Target::BodyRow {
        row
      } => self
        .tables
        .get_mut(table_id)
        .and_then(|table| {
          table.rows.get_mut(*row)
        })
        .map(|row| &mut row.classes),
      | Target::Tagged(marker) => {
        let mut touched = 0;
        for element in self
          .tagged
          .iter_mut()
          .filter(|el| &el.marker == marker)
        {
          set_class(
            &mut element.classes,
            hidden_class,
            hidden
          );
          touched += 1;
        }
        return touched;
      }
    };

    match classes {
      | Some(classes) => {
        set_class(
          classes,
          hidden_class,
          hidden
        );
        1
      }
      | None => 0
    }
  }

  fn submit_form(
    &mut self,
    form_id: &str
  ) -> bool {
    if !self.elements.contains_key(form_id)
    {
      return false;
    }
    self
      .submissions
      .push(form_id.to_string());
    true
  }
}

/// Local storage stand-in. `unavailable()` behaves like a browser with storage
/// disabled: every access fails.
#[derive(Debug, Clone)]
pub struct MemoryStore {
  values:    BTreeMap<String, String>,
  available: bool
}

impl Default for MemoryStore {
  fn default() -> Self {
    Self {
      values:    BTreeMap::new(),
      available: true
    }
  }
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn unavailable() -> Self {
    Self {
      values:    BTreeMap::new(),
      available: false
    }
  }

  pub fn with_value(
    mut self,
    key: &str,
    value: &str
  ) -> Self {
    self.values.insert(
      key.to_string(),
      value.to_string()
    );
    self
  }

  pub fn get(
    &self,
    key: &str
  ) -> Option<&str> {
    self.values.get(key).map(String::as_str)
  }
}

impl QueryStore for MemoryStore {
  fn load(
    &self,
    key: &str
  ) -> anyhow::Result<Option<String>> {
    if !self.available {
      return Err(anyhow!(
        "storage is unavailable"
      ));
    }
    Ok(self.values.get(key).cloned())
  }

  fn save(
    &mut self,
    key: &str,
    value: &str
  ) -> anyhow::Result<()> {
    if !self.available {
      return Err(anyhow!(
        "storage is unavailable"
      ));
    }
    self.values.insert(
      key.to_string(),
      value.to_string()
    );
    Ok(())
  }
}
