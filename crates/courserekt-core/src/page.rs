use crate::table::TableSnapshot;
use crate::visibility::ClassMutation;

/// The document the controller reads from and mutates.
///
/// Every lookup may come back empty: the markup is rendered by the server and
/// differs between page layouts. Implementations must never panic on a missing
/// element or an out-of-range cell; they report that nothing was touched.
pub trait Page {
  /// `None` when the element is missing or is not a checkbox input.
  fn checkbox_checked(
    &self,
    id: &str
  ) -> Option<bool>;

  fn input_value(
    &self,
    id: &str
  ) -> Option<String>;

  /// Returns whether the input existed.
  fn set_input_value(
    &mut self,
    id: &str,
    value: &str
  ) -> bool;

  fn table_snapshot(
    &self,
    table_id: &str,
    key_column: usize
  ) -> Option<TableSnapshot>;

  /// Adds or removes `hidden_class` on the mutation target. Table targets
  /// resolve inside `table_id`. Returns the number of elements touched.
  fn apply(
    &mut self,
    table_id: &str,
    hidden_class: &str,
    mutation: &ClassMutation
  ) -> usize;

  /// Applies a whole plan. Implementations that pay for every table lookup
  /// should resolve the table once here.
  fn apply_all(
    &mut self,
    table_id: &str,
    hidden_class: &str,
    mutations: &[ClassMutation]
  ) -> usize {
    mutations
      .iter()
      .map(|mutation| {
        self.apply(
          table_id,
          hidden_class,
          mutation
        )
      })
      .sum()
  }

  /// Programmatic form submission. Returns whether the form existed.
  fn submit_form(
    &mut self,
    form_id: &str
  ) -> bool;
}

/// Durable key/value slot that carries the last search query across page loads.
pub trait QueryStore {
  fn load(
    &self,
    key: &str
  ) -> anyhow::Result<Option<String>>;

  fn save(
    &mut self,
    key: &str,
    value: &str
  ) -> anyhow::Result<()>;
}
