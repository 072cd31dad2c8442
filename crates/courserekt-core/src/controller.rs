use tracing::{
  debug,
  info,
  warn
};

use crate::config::ControllerConfig;
use crate::page::{
  Page,
  QueryStore
};
use crate::query::SearchQuery;
use crate::visibility::{
  self,
  ClassMutation,
  FilterOutcome,
  Target
};

/// The user interactions the controller reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
  ColumnToggleChanged,
  /// The checkbox bound to this marker class changed.
  TaggedToggleChanged(String),
  SearchInput,
  FormChanged
}

/// Keeps table row and column visibility in line with the page's controls.
///
/// Nothing is cached between calls: every operation re-reads the page and
/// recomputes visibility from scratch.
pub struct TableController<P, S> {
  page:   P,
  store:  S,
  config: ControllerConfig
}

impl<P: Page, S: QueryStore>
  TableController<P, S>
{
  pub fn new(
    page: P,
    store: S,
    config: ControllerConfig
  ) -> Self {
    Self {
      page,
      store,
      config
    }
  }

  pub fn page(&self) -> &P {
    &self.page
  }

  pub fn page_mut(&mut self) -> &mut P {
    &mut self.page
  }

  pub fn store(&self) -> &S {
    &self.store
  }

  pub fn into_parts(self) -> (P, S) {
    (self.page, self.store)
  }

  /// Shows or hides one column, header included. Returns the number of cells
  /// touched; zero when the table or the column does not exist.
  #[tracing::instrument(skip(self))]
  pub fn toggle_column(
    &mut self,
    column: usize,
    visible: bool
  ) -> usize {
    let Some(table) =
      self.page.table_snapshot(
        &self.config.table_id,
        self.config.key_column
      )
    else {
      debug!(table_id = %self.config.table_id, "table not found; column toggle skipped");
      return 0;
    };

    let mutations =
      visibility::column_mutations(
        &table, column, visible
      );
    if mutations.is_empty() {
      debug!(
        header_width = table.header_width,
        "column out of range; nothing \
         to toggle"
      );
    }
    self.apply_plan(&mutations)
  }

  #[tracing::instrument(skip(self))]
  pub fn toggle_tagged(
    &mut self,
    marker_class: &str,
    visible: bool
  ) -> usize {
    let mutation =
      visibility::tagged_mutation(
        marker_class,
        visible
      );
    let touched = self.apply_plan(
      std::slice::from_ref(&mutation)
    );
    debug!(touched, "toggled tagged elements");
    touched
  }

  /// Shows the body rows whose key cell contains any token of `raw`, hides
  /// the rest, and persists `raw` as typed.
  #[tracing::instrument(skip(self))]
  pub fn filter_rows(
    &mut self,
    raw: &str
  ) -> FilterOutcome {
    self.persist_query(raw);

    let Some(table) =
      self.page.table_snapshot(
        &self.config.table_id,
        self.config.key_column
      )
    else {
      debug!(table_id = %self.config.table_id, "table not found; filter skipped");
      return FilterOutcome::default();
    };

    let query = SearchQuery::parse(raw);
    let mutations =
      visibility::row_mutations(
        &table, &query
      );
    self.apply_plan(&mutations);

    let outcome =
      visibility::outcome(&mutations);
    debug!(
      tokens = ?query.tokens(),
      shown = outcome.shown,
      hidden = outcome.hidden,
      "filtered rows"
    );
    outcome
  }

  /// Shows the loading indicator and submits the reload form. Returns
  /// whether a submission was issued.
  #[tracing::instrument(skip(self))]
  pub fn request_reload(
    &mut self
  ) -> bool {
    self.show_loading_indicator();
    let submitted = self
      .page
      .submit_form(&self.config.form_id);
    if submitted {
      info!(form_id = %self.config.form_id, "submitted reload form");
    } else {
      debug!(form_id = %self.config.form_id, "reload form not found");
    }
    submitted
  }

  pub fn show_loading_indicator(
    &mut self
  ) -> bool {
    self.set_spinner(true)
  }

  pub fn hide_loading_indicator(
    &mut self
  ) -> bool {
    self.set_spinner(false)
  }

  /// Applies the configured column toggle from its checkbox state.
  pub fn sync_column_toggle(
    &mut self
  ) -> usize {
    let Some(toggle) =
      self.config.column_toggle.clone()
    else {
      return 0;
    };
    match self
      .page
      .checkbox_checked(&toggle.checkbox_id)
    {
      | Some(checked) => {
        self.toggle_column(
          toggle.column,
          checked
        )
      }
      | None => {
        debug!(checkbox_id = %toggle.checkbox_id, "column toggle checkbox not found");
        0
      }
    }
  }

  pub fn sync_tagged_toggles(
    &mut self
  ) -> usize {
    let markers: Vec<String> = self
      .config
      .tagged_toggles
      .iter()
      .map(|toggle| {
        toggle.marker_class.clone()
      })
      .collect();

    markers
      .iter()
      .map(|marker| {
        self.sync_tagged_toggle(marker)
      })
      .sum()
  }

  fn sync_tagged_toggle(
    &mut self,
    marker_class: &str
  ) -> usize {
    let Some(checkbox_id) = self
      .config
      .tagged_toggles
      .iter()
      .find(|toggle| {
        toggle.marker_class == marker_class
      })
      .map(|toggle| {
        toggle.checkbox_id.clone()
      })
    else {
      debug!(marker_class, "no toggle configured for marker");
      return 0;
    };

    match self
      .page
      .checkbox_checked(&checkbox_id)
    {
      | Some(checked) => {
        self.toggle_tagged(
          marker_class,
          checked
        )
      }
      | None => {
        debug!(checkbox_id = %checkbox_id, "tagged toggle checkbox not found");
        0
      }
    }
  }

  /// Re-runs the filter with whatever the search input currently holds.
  pub fn sync_search(
    &mut self
  ) -> FilterOutcome {
    match self.page.input_value(
      &self.config.search_input_id
    ) {
      | Some(value) => {
        self.filter_rows(&value)
      }
      | None => {
        debug!(input_id = %self.config.search_input_id, "search input not found");
        FilterOutcome::default()
      }
    }
  }

  /// Writes the persisted query back into the search input and returns it.
  /// Missing or unreadable storage yields an empty query. Without
  /// persistence the input keeps whatever the page rendered.
  #[tracing::instrument(skip(self))]
  pub fn restore_query(
    &mut self
  ) -> String {
    if !self.config.persist_query {
      return self
        .page
        .input_value(
          &self.config.search_input_id
        )
        .unwrap_or_default();
    }

    let restored = match self
      .store
      .load(&self.config.storage_key)
    {
      | Ok(value) => {
        value.unwrap_or_default()
      }
      | Err(err) => {
        warn!(error = %err, "failed reading persisted search query");
        String::new()
      }
    };

    if !self.page.set_input_value(
      &self.config.search_input_id,
      &restored
    ) {
      debug!(input_id = %self.config.search_input_id, "search input not found; query not restored");
    }
    restored
  }

  /// The document-ready pass: bring every control's effect in line with its
  /// current state, then restore and apply the last search.
  #[tracing::instrument(skip(self))]
  pub fn initialize(
    &mut self
  ) -> FilterOutcome {
    self.sync_column_toggle();
    self.sync_tagged_toggles();
    self.restore_query();
    let outcome = self.sync_search();
    info!(
      shown = outcome.shown,
      hidden = outcome.hidden,
      "table controller initialized"
    );
    outcome
  }

  pub fn handle(
    &mut self,
    event: ControllerEvent
  ) {
    debug!(?event, "handling controller event");
    match event {
      | ControllerEvent::ColumnToggleChanged => {
        self.sync_column_toggle();
      }
      | ControllerEvent::TaggedToggleChanged(
        marker
      ) => {
        self.sync_tagged_toggle(&marker);
      }
      | ControllerEvent::SearchInput => {
        self.sync_search();
      }
      | ControllerEvent::FormChanged => {
        self.request_reload();
      }
    }
  }

  fn persist_query(&mut self, raw: &str) {
    if !self.config.persist_query {
      return;
    }
    if let Err(err) = self
      .store
      .save(&self.config.storage_key, raw)
    {
      warn!(error = %err, "failed persisting search query");
    }
  }

  fn set_spinner(
    &mut self,
    visible: bool
  ) -> bool {
    let mutation = ClassMutation::set(
      Target::Element(
        self.config.spinner_id.clone()
      ),
      visible
    );
    self.apply_plan(std::slice::from_ref(
      &mutation
    )) > 0
  }

  fn apply_plan(
    &mut self,
    mutations: &[ClassMutation]
  ) -> usize {
    self.page.apply_all(
      &self.config.table_id,
      &self.config.hidden_class,
      mutations
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::Layout;
  use crate::memory::{
    MemoryPage,
    MemoryStore,
    MemoryTable
  };

  fn course_page() -> MemoryPage {
    MemoryPage::new()
      .with_element("loading-spinner")
      .with_element("course-form")
      .with_checkbox(
        "toggle-course-names-checkbox",
        true
      )
      .with_checkbox(
        "toggle-forecast-checkbox",
        false
      )
      .with_input("search-input", "")
      .with_tagged("vacancy-data", 3)
      .with_table(
        "table-data",
        MemoryTable::new(
          &["Code", "Title", "Vacancy"],
          &[
            &[
              "CS3240",
              "Interaction Design",
              "12"
            ],
            &[
              "GEC1000",
              "Global Perspectives",
              "40"
            ],
            &[
              "CS2040",
              "Data Structures",
              "0"
            ]
          ]
        )
      )
  }

  fn controller(
    page: MemoryPage
  ) -> TableController<MemoryPage, MemoryStore>
  {
    TableController::new(
      page,
      MemoryStore::new(),
      ControllerConfig::default()
    )
  }

  fn search_value(
    ctl: &TableController<
      MemoryPage,
      MemoryStore
    >
  ) -> Option<String> {
    ctl
      .page()
      .element("search-input")
      .and_then(|el| el.value.clone())
  }

  #[test]
  fn filter_shows_rows_matching_any_token()
   {
    let mut ctl = controller(course_page());
    let outcome = ctl.filter_rows("cs3 gec");

    assert_eq!(
      outcome,
      FilterOutcome {
        shown:  2,
        hidden: 1
      }
    );
    assert_eq!(
      ctl
        .page()
        .visible_keys("table-data", "hidden"),
      vec!["CS3240", "GEC1000"]
    );
  }

  #[test]
  fn empty_filter_reveals_previously_hidden_rows()
   {
    let mut ctl = controller(course_page());
    ctl.filter_rows("zzz");
    assert!(
      ctl
        .page()
        .visible_keys("table-data", "hidden")
        .is_empty()
    );

    ctl.filter_rows("");
    assert_eq!(
      ctl
        .page()
        .visible_keys("table-data", "hidden")
        .len(),
      3
    );
  }

  #[test]
  fn filter_persists_raw_query() {
    let mut ctl = controller(course_page());
    ctl.filter_rows("  cs3 ");
    assert_eq!(
      ctl.store().get("searchValue"),
      Some("  cs3 ")
    );
  }

  #[test]
  fn search_only_layout_does_not_persist()
   {
    let mut ctl = TableController::new(
      course_page(),
      MemoryStore::new(),
      ControllerConfig::for_layout(
        Layout::SearchOnly
      )
    );
    ctl.filter_rows("cs");
    assert_eq!(
      ctl.store().get("searchValue"),
      None
    );
  }

  #[test]
  fn search_only_layout_keeps_prefilled_input()
   {
    let page = course_page()
      .with_input("search-input", "cs");
    let store = MemoryStore::new()
      .with_value("searchValue", "gec");
    let mut ctl = TableController::new(
      page,
      store,
      ControllerConfig::for_layout(
        Layout::SearchOnly
      )
    );

    let outcome = ctl.initialize();

    assert_eq!(
      search_value(&ctl),
      Some("cs".to_string())
    );
    assert_eq!(
      outcome,
      FilterOutcome {
        shown:  2,
        hidden: 1
      }
    );
    assert_eq!(
      ctl.store().get("searchValue"),
      Some("gec")
    );
  }

  #[test]
  fn toggle_column_round_trip_restores_state()
   {
    let mut ctl = controller(course_page());
    let before = ctl
      .page()
      .column_hidden("table-data", 1, "hidden");

    assert_eq!(ctl.toggle_column(1, false), 4);
    assert_eq!(
      ctl
        .page()
        .column_hidden("table-data", 1, "hidden"),
      vec![true; 4]
    );

    ctl.toggle_column(1, true);
    assert_eq!(
      ctl
        .page()
        .column_hidden("table-data", 1, "hidden"),
      before
    );
    assert_eq!(
      ctl
        .page()
        .column_hidden("table-data", 0, "hidden"),
      vec![false; 4]
    );
  }

  #[test]
  fn toggle_column_out_of_range_is_noop() {
    let mut ctl = controller(course_page());
    assert_eq!(ctl.toggle_column(3, false), 0);
    assert_eq!(
      ctl.toggle_column(usize::MAX, false),
      0
    );
  }

  #[test]
  fn missing_table_degrades_silently() {
    let mut ctl = controller(
      MemoryPage::new()
        .with_input("search-input", "cs")
    );
    assert_eq!(ctl.toggle_column(1, false), 0);
    assert_eq!(
      ctl.filter_rows("cs"),
      FilterOutcome::default()
    );
    assert_eq!(
      ctl.initialize(),
      FilterOutcome::default()
    );
  }

  #[test]
  fn forecast_toggle_follows_checkbox() {
    let mut ctl = controller(course_page());
    ctl.sync_tagged_toggles();
    assert_eq!(
      ctl
        .page()
        .tagged_hidden("vacancy-data", "hidden"),
      (3, 3)
    );

    ctl
      .page_mut()
      .set_checked("toggle-forecast-checkbox", true);
    ctl.handle(
      ControllerEvent::TaggedToggleChanged(
        "vacancy-data".to_string()
      )
    );
    assert_eq!(
      ctl
        .page()
        .tagged_hidden("vacancy-data", "hidden"),
      (0, 3)
    );
  }

  #[test]
  fn reload_shows_spinner_then_submits() {
    let mut page = course_page();
    page.apply(
      "table-data",
      "hidden",
      &ClassMutation::set(
        Target::Element(
          "loading-spinner".into()
        ),
        false
      )
    );
    let mut ctl = controller(page);

    assert!(ctl.request_reload());
    assert!(
      !ctl
        .page()
        .has_class("loading-spinner", "hidden")
    );
    assert_eq!(
      ctl.page().submissions(),
      ["course-form"]
    );

    assert!(ctl.hide_loading_indicator());
    assert!(
      ctl
        .page()
        .has_class("loading-spinner", "hidden")
    );
  }

  #[test]
  fn reload_without_form_reports_no_submission()
   {
    let mut ctl = controller(MemoryPage::new());
    assert!(!ctl.request_reload());
    assert!(!ctl.show_loading_indicator());
  }

  #[test]
  fn unavailable_storage_restores_empty_query()
   {
    let page = course_page()
      .with_input("search-input", "stale");
    let mut ctl = TableController::new(
      page,
      MemoryStore::unavailable(),
      ControllerConfig::default()
    );

    assert_eq!(ctl.restore_query(), "");
    assert_eq!(
      search_value(&ctl),
      Some(String::new())
    );
    assert_eq!(ctl.filter_rows("cs").shown, 2);
  }
}
