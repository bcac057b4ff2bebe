use anyhow::{Context, Result};
use bindery::prelude::*;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    println!();
    println!("  ╔════════════════════════════════════════╗");
    println!("  ║          BINDERY STUDIO v0.1           ║");
    println!("  ║   markup ⇄ model  ·  console replay    ║");
    println!("  ╚════════════════════════════════════════╝");

    quick_start().context("quick start")?;
    custom_attributes().context("custom attributes")?;
    array_property().context("array property")?;

    println!();
    Ok(())
}

// ── Scenarios ─────────────────────────────────────────────────────────────

fn quick_start() -> Result<()> {
    section("QUICK START");
    let model = person(1, "Bob", "Yellow", false, "Yes");
    let mut view = View::from_markup(include_str!("../ui/quick_start.html"), model.clone())?;
    view.bind(BindingOptions::default())?;
    dump(&view)?;

    let doc = view.document().clone();
    let first = find(&doc, "name", "firstName")?;
    step("type \"Patrick\" into firstName");
    doc.type_text(first, "Patrick")?;

    let pink = doc
        .query_attr_eq(doc.root(), "value", "Pink")
        .into_iter()
        .next()
        .context("no Pink radio")?;
    step("click the Pink radio");
    doc.click(pink)?;

    step("model.set(married, true)");
    model.set("married", true)?;
    dump(&view)?;

    view.unbind();
    step("unbind, then type \"Gary\"");
    doc.type_text(first, "Gary")?;
    println!("    firstName in model: {}", model.get("firstName"));
    Ok(())
}

fn custom_attributes() -> Result<()> {
    section("CUSTOM ATTRIBUTES");
    let model = person(1, "Bob", "Yellow", false, "Yes");
    let mut view = View::from_markup(include_str!("../ui/custom_attributes.html"), model.clone())?
        .handler("customHandler", |call| {
            if let HandlerOp::SetElVal { .. } = call.op {
                let text = format!("call customHandler {}", call.model.get("id"));
                call.doc.set_text(call.el, &text);
            }
            Ok(Value::Null)
        });
    view.bind(BindingOptions::default().prop_name_attr("data-bind-prop-name"))?;
    dump(&view)?;

    step("model.set(id, 2)");
    model.set("id", 2)?;
    dump(&view)?;
    view.unbind();
    Ok(())
}

fn array_property() -> Result<()> {
    section("ARRAY PROPERTY");
    let model = person(1, "Bob", "Yellow", false, "Yes");
    model.set("pets", Value::array([pet("Gary", "Dog")]))?;

    let doc = Document::parse(include_str!("../ui/array_property.html"))?;
    let edit = find(&doc, "id", "person-edit")?;
    let mut view = View::new(doc.clone(), edit, model.clone());
    render(&mut view)?;
    dump(&view)?;

    step("set_path(pets[0].name, Max)");
    set_path(&model, "pets[0].name", "Max")?;
    println!("    model: {}", model.get("pets"));
    println!("    element still shows: {:?}", doc.value(find(&doc, "name", "pets[0].name")?));

    step("re-render");
    render(&mut view)?;
    dump(&view)?;

    step("add a pet");
    model.update_in_place("pets", |pets| {
        if let Value::Array(items) = pets {
            items.push(pet("", "Snail"));
        }
    });
    render(&mut view)?;
    let name = find(&doc, "name", "pets[1].name")?;
    doc.type_text(name, "Rocky")?;
    dump(&view)?;
    println!("    model: {}", model.get("pets"));

    view.unbind();
    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────────────────

fn person(id: i32, first_name: &str, color: &str, married: bool, employed: &str) -> Model {
    Model::with_attributes([
        ("id", Value::from(id)),
        ("firstName", Value::from(first_name)),
        ("color", Value::from(color)),
        ("married", Value::from(married)),
        ("employed", Value::from(employed)),
    ])
}

fn pet(name: &str, kind: &str) -> Value {
    Value::object([("name", Value::from(name)), ("type", Value::from(kind))])
}

/// Rebuild the pet rows from the model and bind the view again.
fn render(view: &mut View) -> Result<()> {
    view.unbind();
    let doc = view.document().clone();
    let body = doc
        .descendants(view.root())
        .into_iter()
        .find(|el| doc.tag(*el) == "tbody")
        .context("no pets table body")?;
    doc.clear_children(body);

    let count = view.model().read("pets", |pets| pets.as_array().map_or(0, <[Value]>::len));
    for i in 0..count {
        let row = include_str!("../ui/pet_row.html").replace("{index}", &i.to_string());
        doc.append_markup(body, &row)?;
    }
    log::info!("rendered {count} pet row(s)");
    view.bind(BindingOptions::default())?;
    Ok(())
}

fn find(doc: &Document, attr: &str, value: &str) -> Result<ElementId> {
    doc.find(doc.root(), attr, value)
        .with_context(|| format!("no element with {attr}={value:?}"))
}

fn dump(view: &View) -> Result<()> {
    let Some(session) = view.session() else {
        return Ok(());
    };
    for bound in session.elements() {
        let shown = view.element_value(bound.el, bound.path.as_str())?;
        let held = get_path(view.model(), bound.path.as_str())?;
        println!("    {:<16} element: {:<28} model: {held}", bound.path.as_str(), shown.to_string());
    }
    Ok(())
}

fn section(title: &str) {
    println!();
    println!("  ── {title} {}", "─".repeat(36usize.saturating_sub(title.len())));
}

fn step(what: &str) {
    println!("  > {what}");
}
