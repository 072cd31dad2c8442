use anyhow::{
  Context,
  bail
};
use serde::{
  Deserialize,
  Serialize
};
use tracing::debug;

pub const DEFAULT_STORAGE_KEY: &str =
  "searchValue";
pub const DEFAULT_HIDDEN_CLASS: &str =
  "hidden";

/// The page versions the controller knows how to drive.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
  /// Course-title column toggle, forecast toggle, persisted search.
  #[default]
  CourseTitles,
  /// A single generic column toggle, persisted search.
  GenericColumn,
  /// Search box only; the query is neither restored nor persisted.
  SearchOnly
}

#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
pub struct ColumnToggle {
  pub checkbox_id: String,
  pub column:      usize
}

#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
pub struct TaggedToggle {
  pub checkbox_id:  String,
  pub marker_class: String
}

/// Element ids, classes and table positions the controller depends on.
#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(default)]
pub struct ControllerConfig {
  pub table_id:        String,
  pub search_input_id: String,
  pub spinner_id:      String,
  pub form_id:         String,
  pub hidden_class:    String,
  pub storage_key:     String,
  pub key_column:      usize,
  pub persist_query:   bool,
  pub column_toggle:   Option<ColumnToggle>,
  pub tagged_toggles:  Vec<TaggedToggle>
}

impl Default for ControllerConfig {
  fn default() -> Self {
    Self::for_layout(Layout::default())
  }
}

impl ControllerConfig {
  pub fn for_layout(
    layout: Layout
  ) -> Self {
    let mut cfg = Self {
      table_id:        "table-data"
        .to_string(),
      search_input_id: "search-input"
        .to_string(),
      spinner_id:      "loading-spinner"
        .to_string(),
      form_id:         "course-form"
        .to_string(),
      hidden_class:    DEFAULT_HIDDEN_CLASS
        .to_string(),
      storage_key:     DEFAULT_STORAGE_KEY
        .to_string(),
      key_column:      0,
      persist_query:   true,
      column_toggle:   None,
      tagged_toggles:  vec![]
    };

    match layout {
      | Layout::CourseTitles => {
        cfg.column_toggle =
          Some(ColumnToggle {
            checkbox_id:
              "toggle-course-names-checkbox"
                .to_string(),
            column:      1
          });
        cfg.tagged_toggles.push(
          TaggedToggle {
            checkbox_id:
              "toggle-forecast-checkbox"
                .to_string(),
            marker_class: "vacancy-data"
              .to_string()
          }
        );
      }
      | Layout::GenericColumn => {
        cfg.column_toggle =
          Some(ColumnToggle {
            checkbox_id:
              "toggle-column-checkbox"
                .to_string(),
            column:      1
          });
      }
      | Layout::SearchOnly => {
        cfg.persist_query = false;
      }
    }

    cfg
  }

  /// Parses a TOML document. A top-level `layout` key selects the preset the
  /// remaining keys override.
  #[tracing::instrument(skip(text))]
  pub fn from_toml_str(
    text: &str
  ) -> anyhow::Result<Self> {
    let table: toml::Table =
      toml::from_str(text).context(
        "failed to parse controller \
         config TOML"
      )?;
    let value = serde_json::to_value(
      &table
    )
    .context(
      "failed to convert controller \
       config TOML"
    )?;
    Self::from_json_value(value)
  }

  /// Parses a JSON object with the same shape as the TOML form.
  #[tracing::instrument(skip(text))]
  pub fn from_json_str(
    text: &str
  ) -> anyhow::Result<Self> {
    let value: serde_json::Value =
      serde_json::from_str(text).context(
        "failed to parse controller \
         config JSON"
      )?;
    Self::from_json_value(value)
  }

  pub fn from_json_value(
    value: serde_json::Value
  ) -> anyhow::Result<Self> {
    let layout =
      layout_of(value.get("layout"))?;
    Self::from_layout_and_overrides(
      layout, value
    )
  }

  fn from_layout_and_overrides(
    layout: Layout,
    overrides: serde_json::Value
  ) -> anyhow::Result<Self> {
    let serde_json::Value::Object(
      overrides
    ) = overrides
    else {
      bail!(
        "controller config must be a \
         table of keys"
      );
    };

    let base = serde_json::to_value(
      Self::for_layout(layout)
    )
    .context(
      "failed to encode layout preset"
    )?;
    let serde_json::Value::Object(
      mut merged
    ) = base
    else {
      bail!(
        "layout preset did not encode \
         as an object"
      );
    };

    for (key, value) in overrides {
      if key == "layout" {
        continue;
      }
      debug!(key = %key, "applying controller config override");
      merged.insert(key, value);
    }

    let cfg: Self = serde_json::from_value(
      serde_json::Value::Object(merged)
    )
    .context("invalid controller config")?;
    cfg.validate()?;
    Ok(cfg)
  }

  pub fn validate(
    &self
  ) -> anyhow::Result<()> {
    let ids = [
      ("table_id", &self.table_id),
      (
        "search_input_id",
        &self.search_input_id
      ),
      ("spinner_id", &self.spinner_id),
      ("form_id", &self.form_id),
      (
        "hidden_class",
        &self.hidden_class
      ),
      ("storage_key", &self.storage_key)
    ];
    for (name, value) in ids {
      if value.trim().is_empty() {
        bail!("{name} must not be empty");
      }
    }

    if let Some(toggle) =
      &self.column_toggle
    {
      if toggle
        .checkbox_id
        .trim()
        .is_empty()
      {
        bail!(
          "column_toggle.checkbox_id \
           must not be empty"
        );
      }
      if toggle.column == self.key_column
      {
        bail!(
          "column_toggle.column {} would \
           hide the key column",
          toggle.column
        );
      }
    }

    for toggle in &self.tagged_toggles {
      if toggle
        .checkbox_id
        .trim()
        .is_empty()
        || toggle
          .marker_class
          .trim()
          .is_empty()
      {
        bail!(
          "tagged toggles need both a \
           checkbox_id and a marker_class"
        );
      }
    }

    Ok(())
  }
}

fn layout_of(
  raw: Option<&serde_json::Value>
) -> anyhow::Result<Layout> {
  match raw {
    | None => Ok(Layout::default()),
    | Some(value) => {
      serde_json::from_value(
        value.clone()
      )
      .with_context(|| {
        format!("unknown layout: {value}")
      })
    }
  }
}
