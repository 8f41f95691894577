//! Counter demo
//!
//! Binds counters declared in markup and clicks them a few times.
//!
//! Run with `RUST_LOG=brick=debug cargo run -p brick --example counter`.

use anyhow::Context as _;
use brick::{ComponentType, Components, Config, Event};
use tracing_subscriber::EnvFilter;

const PAGE: &str = r#"
<!DOCTYPE html>
<html>
<body>
    <div class="counter" data-component-name="counter" id="likes">
        <span class="value">0</span>
        <button class="inc">+</button>
        <button class="reset">reset</button>
    </div>
    <div class="counter" data-component-name="counter" id="stars">
        <span class="value">0</span>
        <button class="inc">+</button>
        <button class="reset">reset</button>
    </div>
</body>
</html>
"#;

#[derive(Default)]
struct Counter {
    value: u32,
}

fn show(counter: &mut Counter, cx: &mut brick::Context<'_>) {
    let value = cx.query(".value").ok().and_then(|found| found.first().copied());
    if let Some(node) = value {
        let text = counter.value.to_string();
        let tree = cx.tree_mut();
        tree.clear_children(node);
        let text = tree.create_text(&text);
        let _ = tree.append_child(node, text);
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut components = Components::from_html(PAGE, Config::default())?;
    components.register(
        ComponentType::<Counter>::new("counter")
            .on_selector("click", "button.inc", "increment")
            .on_selector("click", "button.reset", "reset")
            .render(show)
            .method("increment", |counter, cx, _, _| {
                counter.value += 1;
                show(counter, cx);
            })
            .method("reset", |counter, cx, _, _| {
                counter.value = 0;
                show(counter, cx);
            }),
    )?;

    let bound = components.parse(None)?;
    components.bind_events()?;
    println!("Bound {bound} counters");

    let likes = components
        .document()
        .get_element_by_id("likes")
        .context("missing #likes")?;
    let buttons: Vec<_> = {
        let tree = components.document().tree();
        tree.descendants(likes)
            .filter(|&node| tree.tag_name(node) == Some("button"))
            .collect()
    };
    let (inc, reset) = match buttons.as_slice() {
        [inc, reset] => (*inc, *reset),
        _ => anyhow::bail!("unexpected counter markup"),
    };

    for _ in 0..3 {
        components.dispatch(Event::click(inc));
    }
    let id = components.closest_component(likes).context("likes is not bound")?;
    println!(
        "likes = {} ({})",
        components.state::<Counter>(id).map_or(0, |c| c.value),
        components.document().tree().text_content(likes).split_whitespace().next().unwrap_or("")
    );

    components.dispatch(Event::click(reset));
    println!("after reset = {}", components.state::<Counter>(id).map_or(0, |c| c.value));
    println!("events handled: {}", components.events_handled());

    Ok(())
}
