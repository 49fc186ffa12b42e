//! End-to-end binding scenarios: a document, a model, one init, then writes.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde_json::json;
use tether_core::{Document, Element, ViewNode};
use tether_runtime::{AbsentPolicy, BindConfig, BoundView, DataBind, Model, ModelError, Value};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn fixture_model() -> serde_json::Value {
    json!({
        "label": "Schibsted",
        "subtitle": "Hooray!",
        "linkLabel": "",
        "x": {
            "y": {
                "z": "some nested property to bind",
                "zet": "super-duper-class-name"
            }
        },
        "a": {
            "b": { "c": "" },
            "bd": "sibling",
            "labelUsedForContentAndAttribute": "same for content as for title attribute"
        }
    })
}

fn bind(doc: &Document) -> BoundView<Element> {
    init_tracing();
    DataBind::initialize(BindConfig::default(), fixture_model(), doc.elements())
        .expect("fixture model binds")
}

fn by_id(doc: &Document, id: &str) -> Element {
    doc.find_by_id(id).expect("element present")
}

// ============================================================================
// Initial paint
// ============================================================================

#[test]
fn content_is_set_from_model() {
    let doc = Document::with_body([Element::new("h1")
        .with_attr("id", "1")
        .with_attr("data-bind", "label")]);
    let _view = bind(&doc);

    assert_eq!(by_id(&doc, "1").text(), "Schibsted");
}

#[test]
fn existing_attribute_is_overwritten() {
    let doc = Document::with_body([Element::new("h1")
        .with_attr("id", "1")
        .with_attr("data-bind", "label")
        .with_attr("data-bind-title", "x.y.z")
        .with_attr("title", "to be overwritten")]);
    let _view = bind(&doc);

    let el = by_id(&doc, "1");
    assert_eq!(el.text(), "Schibsted");
    assert_eq!(
        el.attribute("title").as_deref(),
        Some("some nested property to bind")
    );
}

#[test]
fn missing_attribute_is_created() {
    let doc = Document::with_body([Element::new("div")
        .with_attr("id", "1")
        .with_attr("data-bind", "noSuchLabel")
        .with_attr("data-bind-class", "x.y.zet")]);
    assert!(!by_id(&doc, "1").has_attribute("class"));

    let _view = bind(&doc);

    let el = by_id(&doc, "1");
    assert_eq!(
        el.attribute("class").as_deref(),
        Some("super-duper-class-name")
    );
    // Content bound to a missing path is blanked.
    assert_eq!(el.text(), "");
}

#[test]
fn empty_string_is_a_value_not_absent() {
    let doc = Document::with_body([Element::new("a")
        .with_attr("id", "1")
        .with_text("placeholder")
        .with_attr("data-bind", "linkLabel")
        .with_attr("data-bind-disabled", "a.b.c")]);
    let view = bind(&doc);

    let el = by_id(&doc, "1");
    assert_eq!(el.text(), "");
    assert_eq!(el.attribute("disabled").as_deref(), Some(""));
    assert_eq!(view.initial_paint().written, 2);
    assert_eq!(view.initial_paint().blanked, 0);
}

#[test]
fn one_path_can_feed_content_and_attribute() {
    let doc = Document::with_body([Element::new("p")
        .with_attr("id", "1")
        .with_attr("data-bind", "a.labelUsedForContentAndAttribute")
        .with_attr("data-bind-title", "a.labelUsedForContentAndAttribute")]);
    let view = bind(&doc);

    view.model()
        .set("a.labelUsedForContentAndAttribute", "both")
        .unwrap();

    let el = by_id(&doc, "1");
    assert_eq!(el.text(), "both");
    assert_eq!(el.attribute("title").as_deref(), Some("both"));
}

#[test]
fn unbound_elements_are_not_touched() {
    let doc = Document::with_body([
        Element::new("p").with_attr("id", "plain").with_text("static"),
        Element::new("p")
            .with_attr("id", "near-miss")
            .with_attr("data-bind2", "label")
            .with_attr("data-bind-", "label")
            .with_text("static"),
    ]);
    let view = bind(&doc);

    assert_eq!(view.bound_count(), 0);
    assert_eq!(by_id(&doc, "plain").text(), "static");
    assert_eq!(by_id(&doc, "near-miss").text(), "static");
}

#[test]
fn nested_bound_elements_are_found() {
    let inner = Element::new("span")
        .with_attr("id", "inner")
        .with_attr("data-bind", "subtitle");
    let outer = Element::new("section")
        .with_attr("data-bind-title", "label")
        .with_child(inner);
    let doc = Document::with_body([outer]);
    let view = bind(&doc);

    assert_eq!(view.bound_count(), 2);
    assert_eq!(by_id(&doc, "inner").text(), "Hooray!");
}

// ============================================================================
// Targeted updates
// ============================================================================

#[test]
fn content_follows_model_writes() {
    let doc = Document::with_body([Element::new("h2")
        .with_attr("id", "1")
        .with_attr("data-bind", "subtitle")]);
    let view = bind(&doc);
    assert_eq!(by_id(&doc, "1").text(), "Hooray!");

    assert_eq!(view.model().set("subtitle", "new content value"), Ok(true));
    assert_eq!(by_id(&doc, "1").text(), "new content value");
}

#[test]
fn nested_attribute_follows_model_writes() {
    let doc = Document::with_body([Element::new("h2")
        .with_attr("id", "1")
        .with_attr("data-bind-class", "x.y.zet")]);
    let view = bind(&doc);

    view.model().set("x.y.zet", "new attribute value").unwrap();
    assert_eq!(
        by_id(&doc, "1").attribute("class").as_deref(),
        Some("new attribute value")
    );
}

#[test]
fn equal_write_does_not_repaint() {
    let doc = Document::with_body([Element::new("h2")
        .with_attr("id", "1")
        .with_attr("data-bind", "subtitle")]);
    let view = bind(&doc);
    view.model().set("subtitle", "v").unwrap();

    // A manual edit survives an equal write because nothing is repainted.
    by_id(&doc, "1").set_text("edited");
    assert_eq!(view.model().set("subtitle", "v"), Ok(false));
    assert_eq!(by_id(&doc, "1").text(), "edited");
}

#[test]
fn writes_do_not_leak_to_related_paths() {
    let doc = Document::with_body([
        Element::new("p").with_attr("id", "abc").with_attr("data-bind", "a.b.c"),
        Element::new("p").with_attr("id", "abd").with_attr("data-bind", "a.bd"),
        Element::new("p").with_attr("id", "ab").with_attr("data-bind", "a.b").with_text("obj"),
        Element::new("p").with_attr("id", "a").with_attr("data-bind-title", "a").with_attr("title", "t"),
    ]);
    let view = bind(&doc);
    by_id(&doc, "ab").set_text("marker");

    view.model().set("a.bd", "changed").unwrap();

    assert_eq!(by_id(&doc, "abd").text(), "changed");
    assert_eq!(by_id(&doc, "abc").text(), "");
    assert_eq!(by_id(&doc, "ab").text(), "marker");
    assert_eq!(by_id(&doc, "a").attribute("title").as_deref(), Some("t"));
}

#[test]
fn each_write_repaints_once() {
    let doc = Document::with_body([Element::new("h2")
        .with_attr("id", "1")
        .with_attr("data-bind", "subtitle")]);
    let view = bind(&doc);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = Rc::clone(&seen);
    let title = by_id(&doc, "1");
    // Registered after the binder's painter, so it observes the painted text.
    let _sub = view
        .model()
        .watch("subtitle", move |_| s.borrow_mut().push(title.text()))
        .unwrap();

    for v in ["one", "two", "two", "three"] {
        view.model().set("subtitle", v).unwrap();
    }
    assert_eq!(*seen.borrow(), ["one", "two", "three"]);
}

#[test]
fn null_write_blanks_content_and_leaves_attribute() {
    let doc = Document::with_body([Element::new("p")
        .with_attr("id", "1")
        .with_attr("data-bind", "label")
        .with_attr("data-bind-title", "label")]);
    let view = bind(&doc);

    view.model().set("label", Value::Null).unwrap();

    let el = by_id(&doc, "1");
    assert_eq!(el.text(), "");
    assert_eq!(el.attribute("title").as_deref(), Some("Schibsted"));
}

#[test]
fn configured_policies_apply_to_updates() {
    let doc = Document::with_body([Element::new("p")
        .with_attr("id", "1")
        .with_attr("data-bind", "label")
        .with_attr("data-bind-title", "label")]);
    let config = BindConfig::default().with_absent(AbsentPolicy::Leave, AbsentPolicy::Blank);
    let view = DataBind::initialize(config, fixture_model(), doc.elements()).unwrap();

    view.model().set("label", Value::Null).unwrap();

    let el = by_id(&doc, "1");
    assert_eq!(el.text(), "Schibsted");
    assert_eq!(el.attribute("title").as_deref(), Some(""));
}

#[test]
fn custom_marker_syntax() {
    let doc = Document::with_body([Element::new("p")
        .with_attr("id", "1")
        .with_attr("x-text", "label")
        .with_attr("x-text:title", "subtitle")
        .with_attr("data-bind", "x.y.z")]);
    let config = BindConfig::default().with_marker("x-text").with_separator(':');
    let _view = DataBind::initialize(config, fixture_model(), doc.elements()).unwrap();

    let el = by_id(&doc, "1");
    assert_eq!(el.text(), "Schibsted");
    assert_eq!(el.attribute("title").as_deref(), Some("Hooray!"));
}

#[test]
fn writes_to_unobserved_paths_fail() {
    let doc = Document::with_body([Element::new("p").with_attr("data-bind", "later")]);
    let view = bind(&doc);

    assert_eq!(
        view.model().set("later", "x"),
        Err(ModelError::UnknownPath("later".into()))
    );
    assert_eq!(
        view.model().set("x.y.nope", "flat"),
        Err(ModelError::UnknownPath("x.y.nope".into()))
    );
}

#[test]
fn object_property_write_repaints_its_own_targets() {
    init_tracing();
    let doc = Document::with_body([
        Element::new("p")
            .with_attr("id", "xy")
            .with_attr("data-bind", "x.y"),
        Element::new("p")
            .with_attr("id", "xyz")
            .with_attr("data-bind", "x.y.z"),
    ]);
    let view = bind(&doc);
    let (xy, xyz) = (by_id(&doc, "xy"), by_id(&doc, "xyz"));
    assert_eq!(view.subscription_count(), 2);
    assert_eq!(xy.text(), "");
    assert_eq!(xyz.text(), "some nested property to bind");

    assert_eq!(view.model().set("x.y", "flat"), Ok(true));
    assert_eq!(xy.text(), "flat");
    assert_eq!(xyz.text(), "some nested property to bind");
    assert_eq!(view.model().set("x.y", "flat"), Ok(false));
}

// ============================================================================
// Re-entrancy
// ============================================================================

#[test]
fn watcher_writes_cascade_into_the_view() {
    let doc = Document::with_body([
        Element::new("h1").with_attr("id", "title").with_attr("data-bind", "label"),
        Element::new("h2").with_attr("id", "sub").with_attr("data-bind", "subtitle"),
    ]);
    let view = bind(&doc);
    let model = view.model().clone();
    let _mirror = view
        .model()
        .watch("label", move |v| {
            let upper = v.as_str().unwrap_or_default().to_uppercase();
            model.set("subtitle", upper).unwrap();
        })
        .unwrap();

    view.model().set("label", "quiet").unwrap();

    assert_eq!(by_id(&doc, "title").text(), "quiet");
    assert_eq!(by_id(&doc, "sub").text(), "QUIET");
}

#[test]
fn runaway_cascade_is_cut_off() {
    let doc = Document::with_body([Element::new("p").with_attr("id", "n").with_attr("data-bind", "n")]);
    let config = BindConfig::default().with_max_cascade(16);
    let view = DataBind::initialize(config, json!({ "n": 0 }), doc.elements()).unwrap();
    let model = view.model().clone();
    let calls = Rc::new(Cell::new(0usize));
    let c = Rc::clone(&calls);
    let _ping = view
        .model()
        .watch("n", move |v| {
            c.set(c.get() + 1);
            if let Value::Number(n) = v {
                let _ = model.set("n", n + 1.0);
            }
        })
        .unwrap();

    let err = view.model().set("n", 1).unwrap_err();

    assert!(matches!(err, ModelError::CascadeLimit { limit: 16, .. }));
    assert_eq!(calls.get(), 16);
    assert_eq!(by_id(&doc, "n").text(), "16");
    // The model stays usable afterwards.
    drop(_ping);
    assert_eq!(view.model().set("n", 100), Ok(true));
    assert_eq!(by_id(&doc, "n").text(), "100");
}

#[test]
fn shared_model_survives_view_drop() {
    let model = Model::observe(fixture_model()).unwrap();
    let doc = Document::with_body([Element::new("p").with_attr("id", "1").with_attr("data-bind", "label")]);
    let mut binder = DataBind::default();
    binder.set_observed_model(model.clone());
    let view = binder.init(doc.elements()).unwrap();
    assert_eq!(view.subscription_count(), 1);
    drop(view);

    assert_eq!(model.set("label", "after"), Ok(true));
    assert_eq!(by_id(&doc, "1").text(), "Schibsted");
    assert_eq!(model.to_json()["label"], json!("after"));
}
