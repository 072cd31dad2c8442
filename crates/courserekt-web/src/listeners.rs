use std::cell::RefCell;
use std::rc::Rc;

use courserekt_core::{
  ControllerConfig,
  ControllerEvent,
  TableController
};
use gloo::events::{
  EventListener,
  EventListenerOptions
};
use web_sys::{
  Document,
  EventTarget
};

use crate::dom::DomPage;
use crate::storage::LocalStorageStore;

pub(crate) type SharedController = Rc<
  RefCell<
    TableController<
      DomPage,
      LocalStorageStore
    >
  >
>;

/// Wires the controller once the document has been parsed, or right away
/// when that already happened.
pub(crate) fn install_on_ready(
  document: Document,
  config: ControllerConfig
) {
  if document.ready_state() == "loading"
  {
    let target = document.clone();
    EventListener::once(
      &target,
      "DOMContentLoaded",
      move |_| install(document, config)
    )
    .forget();
  } else {
    install(document, config);
  }
}

fn install(
  document: Document,
  config: ControllerConfig
) {
  let controller: SharedController =
    Rc::new(RefCell::new(
      TableController::new(
        DomPage::new(document.clone()),
        LocalStorageStore,
        config.clone()
      )
    ));

  controller.borrow_mut().initialize();

  let mut listeners = Vec::new();

  if let Some(toggle) =
    &config.column_toggle
    && let Some(checkbox) = document
      .get_element_by_id(
        &toggle.checkbox_id
      )
  {
    listeners.push(forward(
      &checkbox,
      "change",
      &controller,
      ControllerEvent::ColumnToggleChanged
    ));
  }

  for toggle in &config.tagged_toggles {
    if let Some(checkbox) = document
      .get_element_by_id(
        &toggle.checkbox_id
      )
    {
      listeners.push(forward(
        &checkbox,
        "change",
        &controller,
        ControllerEvent::TaggedToggleChanged(
          toggle.marker_class.clone()
        )
      ));
    }
  }

  if let Some(input) = document
    .get_element_by_id(
      &config.search_input_id
    )
  {
    listeners.push(forward(
      &input,
      "input",
      &controller,
      ControllerEvent::SearchInput
    ));
  }

  if let Some(form) = document
    .get_element_by_id(&config.form_id)
  {
    listeners.push(forward(
      &form,
      "change",
      &controller,
      ControllerEvent::FormChanged
    ));
    // The change handler submits programmatically; a native submit would
    // send a second request.
    listeners.push(
      EventListener::new_with_options(
        &form,
        "submit",
        EventListenerOptions::enable_prevent_default(),
        |event| event.prevent_default()
      )
    );
  }

  if let Some(window) = web_sys::window()
  {
    let controller =
      Rc::clone(&controller);
    listeners.push(EventListener::new(
      &window,
      "pageshow",
      move |_| {
        if let Ok(mut ctl) =
          controller.try_borrow_mut()
        {
          ctl.hide_loading_indicator();
        }
      }
    ));
  }

  tracing::info!(
    listeners = listeners.len(),
    "course table controller wired"
  );

  // Listeners live as long as the page does.
  for listener in listeners {
    listener.forget();
  }
}

fn forward(
  target: &EventTarget,
  event_type: &'static str,
  controller: &SharedController,
  event: ControllerEvent
) -> EventListener {
  let controller = Rc::clone(controller);
  EventListener::new(
    target,
    event_type,
    move |_| dispatch(&controller, event.clone())
  )
}

fn dispatch(
  controller: &SharedController,
  event: ControllerEvent
) {
  match controller.try_borrow_mut() {
    | Ok(mut ctl) => ctl.handle(event),
    | Err(_) => {
      tracing::warn!(
        ?event,
        "controller busy; event dropped"
      );
    }
  }
}
