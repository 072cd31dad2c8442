#![cfg(target_arch = "wasm32")]

use courserekt_core::{Layout, QueryStore};
use courserekt_web::{
    CONFIG_ELEMENT_ID, LocalStorageStore, MANUAL_INSTALL_ATTRIBUTE, embedded_config, install,
    manual_install_requested,
};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{Document, Element, Event, EventInit, HtmlInputElement};

wasm_bindgen_test_configure!(run_in_browser);

// Controls sit outside the form so their events never reach its change
// handler, which would submit and navigate away.
const FIXTURE: &str = r#"
<span id="loading-spinner" class="hidden"></span>
<input type="checkbox" id="toggle-course-names-checkbox">
<input type="checkbox" id="toggle-forecast-checkbox" checked>
<input type="text" id="search-input">
<form id="course-form"></form>
<table id="table-data">
  <thead><tr><th>Code</th><th>Title</th><th>Vacancy</th></tr></thead>
  <tbody>
    <tr><td>CS3240</td><td>Interaction Design</td><td>12 <span class="vacancy-data">(10)</span></td></tr>
    <tr><td>GEC1000</td><td>Global Perspectives</td><td>40 <span class="vacancy-data">(35)</span></td></tr>
    <tr><td>CS2040</td><td>Data Structures</td><td>0 <span class="vacancy-data">(2)</span></td></tr>
  </tbody>
</table>
"#;

fn document() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

fn mount(id: &str) -> Element {
    let document = document();
    if let Some(existing) = document.get_element_by_id(id) {
        existing.remove();
    }
    let root = document.create_element("div").unwrap();
    root.set_id(id);
    root.set_inner_html(FIXTURE);
    document.body().unwrap().append_child(&root).unwrap();
    root
}

/// Mounts the fixture with an empty stored query and wires the default layout.
fn mount_and_install(id: &str) -> Element {
    LocalStorageStore.save("searchValue", "").unwrap();
    let root = mount(id);
    install(JsValue::UNDEFINED).unwrap();
    root
}

fn input(id: &str) -> HtmlInputElement {
    document()
        .get_element_by_id(id)
        .unwrap()
        .dyn_into::<HtmlInputElement>()
        .unwrap()
}

fn fire(target: &Element, event_type: &str) -> Event {
    let init = EventInit::new();
    init.set_cancelable(true);
    let event = Event::new_with_event_init_dict(event_type, &init).unwrap();
    target.dispatch_event(&event).unwrap();
    event
}

fn visible_codes() -> Vec<String> {
    let rows = document().query_selector_all("#table-data tbody tr").unwrap();
    (0..rows.length())
        .filter_map(|i| rows.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .filter(|row| !row.class_list().contains("hidden"))
        .filter_map(|row| row.first_element_child())
        .filter_map(|cell| cell.text_content())
        .collect()
}

fn hidden_count(selector: &str) -> u32 {
    let nodes = document().query_selector_all(selector).unwrap();
    (0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .filter(|el| el.class_list().contains("hidden"))
        .count() as u32
}

#[wasm_bindgen_test]
fn install_initializes_immediately_once_document_is_parsed() {
    let root = mount_and_install("fixture-install");

    assert_ne!(document().ready_state(), "loading");
    assert_eq!(hidden_count("#table-data th, #table-data td"), 4);
    assert_eq!(hidden_count(".vacancy-data"), 0);
    assert_eq!(visible_codes().len(), 3);
    root.remove();
}

#[wasm_bindgen_test]
fn native_form_submit_is_cancelled() {
    let root = mount_and_install("fixture-submit");
    let form = document().get_element_by_id("course-form").unwrap();

    let event = fire(&form, "submit");
    assert!(event.default_prevented());
    root.remove();
}

#[wasm_bindgen_test]
fn checkbox_change_events_reach_the_controller() {
    let root = mount_and_install("fixture-change");

    let names = input("toggle-course-names-checkbox");
    names.set_checked(true);
    fire(&names, "change");
    assert_eq!(hidden_count("#table-data th, #table-data td"), 0);

    let forecast = input("toggle-forecast-checkbox");
    forecast.set_checked(false);
    fire(&forecast, "change");
    assert_eq!(hidden_count(".vacancy-data"), 3);
    root.remove();
}

#[wasm_bindgen_test]
fn search_input_event_filters_and_persists() {
    let root = mount_and_install("fixture-input");

    let search = input("search-input");
    search.set_value("cs2 gec");
    fire(&search, "input");

    assert_eq!(visible_codes(), vec!["GEC1000", "CS2040"]);
    assert_eq!(
        LocalStorageStore.load("searchValue").unwrap(),
        Some("cs2 gec".to_string())
    );

    LocalStorageStore.save("searchValue", "").unwrap();
    root.remove();
}

#[wasm_bindgen_test]
fn manual_attribute_on_root_is_detected() {
    let document = document();
    let html = document.document_element().unwrap();

    assert!(!manual_install_requested(&document));
    html.set_attribute(MANUAL_INSTALL_ATTRIBUTE, "").unwrap();
    assert!(manual_install_requested(&document));
    html.remove_attribute(MANUAL_INSTALL_ATTRIBUTE).unwrap();
    assert!(!manual_install_requested(&document));
}

#[wasm_bindgen_test]
fn embedded_config_reads_json_script() {
    let document = document();
    assert!(embedded_config(&document).unwrap().is_none());

    let script = document.create_element("script").unwrap();
    script.set_id(CONFIG_ELEMENT_ID);
    script.set_attribute("type", "application/json").unwrap();
    document.body().unwrap().append_child(&script).unwrap();

    script.set_text_content(Some("   "));
    assert!(embedded_config(&document).unwrap().is_none());

    script.set_text_content(Some(r#"{"layout": "search-only", "table_id": "courses"}"#));
    let config = embedded_config(&document).unwrap().unwrap();
    assert_eq!(config.table_id, "courses");
    assert!(!config.persist_query);
    assert!(config.column_toggle.is_none());
    assert_eq!(
        config.hidden_class,
        courserekt_core::ControllerConfig::for_layout(Layout::SearchOnly).hidden_class
    );

    script.set_text_content(Some("{not json"));
    assert!(embedded_config(&document).is_err());

    script.remove();
}
