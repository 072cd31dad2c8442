use courserekt_core::{ClassMutation, Page, TableSnapshot, Target};
use wasm_bindgen::JsCast;
use web_sys::{
  Document,
  Element,
  HtmlFormElement,
  HtmlInputElement,
  HtmlTableElement,
  HtmlTableRowElement,
  NodeList
};

/// `Page` over the live browser document.
///
/// The header is the table's first row, body rows are the rows after it, and
/// body cells are every `td` under the table's `tbody` sections in document
/// order.
pub struct DomPage {
  document: Document
}

impl DomPage {
  pub fn new(document: Document) -> Self {
    Self {
      document
    }
  }

  fn input(
    &self,
    id: &str
  ) -> Option<HtmlInputElement> {
    self
      .document
      .get_element_by_id(id)?
      .dyn_into::<HtmlInputElement>()
      .ok()
  }

  fn table(
    &self,
    id: &str
  ) -> Option<HtmlTableElement> {
    self
      .document
      .get_element_by_id(id)?
      .dyn_into::<HtmlTableElement>()
      .ok()
  }

  fn tagged(
    &self,
    marker_class: &str
  ) -> Vec<Element> {
    let collection = self
      .document
      .get_elements_by_class_name(
        marker_class
      );
    (0..collection.length())
      .filter_map(|i| collection.item(i))
      .collect()
  }
}

/// Resolved once per batch so a full filter pass walks the table a single time.
struct TableHandles {
  rows:       Vec<Option<HtmlTableRowElement>>,
  body_cells: Option<NodeList>
}

impl TableHandles {
  fn resolve(
    table: &HtmlTableElement
  ) -> Self {
    let collection = table.rows();
    let rows = (0..collection.length())
      .map(|i| {
        collection.item(i).and_then(
          |row| {
            row
              .dyn_into::<HtmlTableRowElement>()
              .ok()
          }
        )
      })
      .collect();

    Self {
      rows,
      body_cells: table
        .query_selector_all("tbody td")
        .ok()
    }
  }

  fn header_cell(
    &self,
    column: usize
  ) -> Option<Element> {
    let header =
      self.rows.first()?.as_ref()?;
    header
      .cells()
      .item(u32::try_from(column).ok()?)
  }

  fn body_row(
    &self,
    row: usize
  ) -> Option<Element> {
    let row = self
      .rows
      .get(row.checked_add(1)?)?
      .as_ref()?;
    Some(row.clone().into())
  }

  fn body_cell(
    &self,
    index: usize
  ) -> Option<Element> {
    self
      .body_cells
      .as_ref()?
      .item(u32::try_from(index).ok()?)?
      .dyn_into::<Element>()
      .ok()
  }
}

fn set_hidden(
  element: &Element,
  hidden_class: &str,
  hidden: bool
) -> usize {
  match element
    .class_list()
    .toggle_with_force(
      hidden_class,
      hidden
    ) {
    | Ok(_) => 1,
    | Err(error) => {
      tracing::debug!(
        ?error,
        "failed toggling class"
      );
      0
    }
  }
}

impl DomPage {
  fn apply_resolved(
    &self,
    handles: Option<&TableHandles>,
    hidden_class: &str,
    mutation: &ClassMutation
  ) -> usize {
    let hidden = mutation.hidden;
    let element = match &mutation.target
    {
      | Target::Element(id) => {
        self.document.get_element_by_id(id)
      }
      | Target::HeaderCell {
        column
      } => handles.and_then(|h| {
        h.header_cell(*column)
      }),
      | Target::BodyCell {
        index
      } => handles.and_then(|h| {
        h.body_cell(*index)
      }),
      | Target::BodyRow {
        row
      } => handles.and_then(|h| {
        h.body_row(*row)
      }),
      | Target::Tagged(marker) => {
        return self
          .tagged(marker)
          .iter()
          .map(|element| {
            set_hidden(
              element,
              hidden_class,
              hidden
            )
          })
          .sum();
      }
    };

    element
      .map(|element| {
        set_hidden(
          &element,
          hidden_class,
          hidden
        )
      })
      .unwrap_or(0)
  }
}

impl Page for DomPage {
  fn checkbox_checked(
    &self,
    id: &str
  ) -> Option<bool> {
    let input = self.input(id)?;
    (input.type_() == "checkbox")
      .then(|| input.checked())
  }

  fn input_value(
    &self,
    id: &str
  ) -> Option<String> {
    self
      .input(id)
      .map(|input| input.value())
  }

  fn set_input_value(
    &mut self,
    id: &str,
    value: &str
  ) -> bool {
    match self.input(id) {
      | Some(input) => {
        input.set_value(value);
        true
      }
      | None => false
    }
  }

  fn table_snapshot(
    &self,
    table_id: &str,
    key_column: usize
  ) -> Option<TableSnapshot> {
    let table = self.table(table_id)?;
    let handles =
      TableHandles::resolve(&table);
    let key_index =
      u32::try_from(key_column).ok();

    let header_width = handles
      .rows
      .first()
      .and_then(Option::as_ref)
      .map(|row| {
        row.cells().length() as usize
      })
      .unwrap_or(0);

    let rows = handles
      .rows
      .iter()
      .skip(1)
      .map(|row| {
        // Key cells count `td`s only, the
        // same cells body addressing uses.
        let row = row.as_ref()?;
        row
          .get_elements_by_tag_name("td")
          .item(key_index?)?
          .text_content()
      })
      .collect();

    Some(TableSnapshot {
      header_width,
      body_cell_count: handles
        .body_cells
        .as_ref()
        .map(|cells| {
          cells.length() as usize
        })
        .unwrap_or(0),
      rows
    })
  }

  fn apply(
    &mut self,
    table_id: &str,
    hidden_class: &str,
    mutation: &ClassMutation
  ) -> usize {
    self.apply_all(
      table_id,
      hidden_class,
      std::slice::from_ref(mutation)
    )
  }

  fn apply_all(
    &mut self,
    table_id: &str,
    hidden_class: &str,
    mutations: &[ClassMutation]
  ) -> usize {
    let needs_table =
      mutations.iter().any(|m| {
        matches!(
          m.target,
          Target::HeaderCell { .. }
            | Target::BodyCell { .. }
            | Target::BodyRow { .. }
        )
      });
    let handles = if needs_table {
      self
        .table(table_id)
        .map(|table| {
          TableHandles::resolve(&table)
        })
    } else {
      None
    };

    mutations
      .iter()
      .map(|mutation| {
        self.apply_resolved(
          handles.as_ref(),
          hidden_class,
          mutation
        )
      })
      .sum()
  }

  fn submit_form(
    &mut self,
    form_id: &str
  ) -> bool {
    let Some(form) = self
      .document
      .get_element_by_id(form_id)
      .and_then(|el| {
        el.dyn_into::<HtmlFormElement>()
          .ok()
      })
    else {
      return false;
    };

    match form.submit() {
      | Ok(()) => true,
      | Err(error) => {
        tracing::warn!(
          ?error,
          "form submission failed"
        );
        false
      }
    }
  }
}
