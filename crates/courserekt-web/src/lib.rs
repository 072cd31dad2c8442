mod dom;
mod listeners;
mod storage;

use courserekt_core::ControllerConfig;
use wasm_bindgen::prelude::*;

pub use crate::dom::DomPage;
pub use crate::storage::LocalStorageStore;

/// Id of an optional `<script type="application/json">` element holding the
/// controller configuration.
pub const CONFIG_ELEMENT_ID: &str =
  "courserekt-config";

/// Attribute on `<html>` that keeps the start hook from wiring anything, for
/// pages that call `install` themselves.
pub const MANUAL_INSTALL_ATTRIBUTE: &str =
  "data-courserekt-manual";

fn to_js_error(
  err: anyhow::Error
) -> JsValue {
  JsValue::from_str(&format!("{err:#}"))
}

#[wasm_bindgen(start)]
pub fn start() {
  console_error_panic_hook::set_once();
  wasm_tracing::set_as_global_default();

  let Some(document) =
    web_sys::window().and_then(
      |window| window.document()
    )
  else {
    tracing::warn!(
      "no document; course table \
       controller not started"
    );
    return;
  };

  if manual_install_requested(&document)
  {
    tracing::info!(
      "manual install requested; \
       waiting for install()"
    );
    return;
  }

  let config = match embedded_config(
    &document
  ) {
    | Ok(Some(config)) => config,
    | Ok(None) => {
      ControllerConfig::default()
    }
    | Err(err) => {
      tracing::error!(
        error = %format!("{err:#}"),
        "failed parsing embedded \
         controller config; using \
         defaults"
      );
      ControllerConfig::default()
    }
  };

  listeners::install_on_ready(
    document, config
  );
}

/// Wires the controller with `config`, a plain object shaped like the JSON
/// configuration. `undefined` or `null` selects the default layout.
#[wasm_bindgen]
pub fn install(
  config: JsValue
) -> Result<(), JsValue> {
  let config = if config.is_undefined()
    || config.is_null()
  {
    ControllerConfig::default()
  } else {
    let value: serde_json::Value =
      serde_wasm_bindgen::from_value(
        config
      )
      .map_err(|err| {
        JsValue::from_str(
          &err.to_string()
        )
      })?;
    ControllerConfig::from_json_value(
      value
    )
    .map_err(to_js_error)?
  };

  let document = web_sys::window()
    .and_then(|window| {
      window.document()
    })
    .ok_or_else(|| {
      JsValue::from_str(
        "no document available"
      )
    })?;

  listeners::install_on_ready(
    document, config
  );
  Ok(())
}

/// Whether `<html>` carries
/// [`MANUAL_INSTALL_ATTRIBUTE`].
pub fn manual_install_requested(
  document: &web_sys::Document
) -> bool {
  document
    .document_element()
    .is_some_and(|root| {
      root.has_attribute(
        MANUAL_INSTALL_ATTRIBUTE
      )
    })
}

/// Reads the configuration from the
/// [`CONFIG_ELEMENT_ID`] element. A missing
/// or blank element yields `Ok(None)`.
pub fn embedded_config(
  document: &web_sys::Document
) -> anyhow::Result<
  Option<ControllerConfig>
> {
  let Some(text) = document
    .get_element_by_id(
      CONFIG_ELEMENT_ID
    )
    .and_then(|el| el.text_content())
  else {
    return Ok(None);
  };

  if text.trim().is_empty() {
    return Ok(None);
  }

  ControllerConfig::from_json_str(&text)
    .map(Some)
}
