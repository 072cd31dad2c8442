use anyhow::{
  Context,
  anyhow
};
use courserekt_core::QueryStore;

/// `QueryStore` over `window.localStorage`. Values are stored raw, so a query
/// saved by an older page script reads back unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorageStore;

fn local_storage()
-> anyhow::Result<web_sys::Storage> {
  web_sys::window()
    .context("no window available")?
    .local_storage()
    .map_err(|error| {
      anyhow!(
        "local storage access \
         denied: {error:?}"
      )
    })?
    .context(
      "local storage is disabled"
    )
}

impl QueryStore for LocalStorageStore {
  fn load(
    &self,
    key: &str
  ) -> anyhow::Result<Option<String>> {
    local_storage()?
      .get_item(key)
      .map_err(|error| {
        anyhow!(
          "failed reading {key} from \
           local storage: {error:?}"
        )
      })
  }

  fn save(
    &mut self,
    key: &str,
    value: &str
  ) -> anyhow::Result<()> {
    local_storage()?
      .set_item(key, value)
      .map_err(|error| {
        anyhow!(
          "failed writing {key} to \
           local storage: {error:?}"
        )
      })
  }
}
