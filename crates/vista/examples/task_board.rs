//! A task board rendered from one shared list through several views.
//!
//! Run with `RUST_LOG=vista=debug cargo run --example task_board` to see
//! the recompute cycle traced.

use vista::{DataView, DerivedConfig, Sequence, ViewSettings};

#[derive(Debug, Clone)]
struct Task {
    title: &'static str,
    owner: &'static str,
    estimate: u32,
    done: bool,
}

fn render(label: &str, view: &DataView<Task>) {
    let titles: Vec<&str> = view.iter().map(|task| task.title).collect();
    println!("{label:>10}: {titles:?}");
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let tasks = Sequence::new(vec![
        Task { title: "triage inbox", owner: "ana", estimate: 1, done: true },
        Task { title: "ship parser", owner: "kai", estimate: 5, done: false },
        Task { title: "write guide", owner: "ana", estimate: 3, done: false },
        Task { title: "fix flaky test", owner: "kai", estimate: 2, done: false },
        Task { title: "plan sprint", owner: "lee", estimate: 2, done: false },
    ]);

    let board = DataView::new(&tasks);
    board.subscribe(|view| render("board", view));

    board.filters().add(|task: &Task| !task.done);
    board.sort().set_by_key(|task: &Task| task.estimate);

    let settings = ViewSettings::new().with("reversed", true);
    let ana = board.derived().create(
        "ana",
        DerivedConfig::new()
            .filter(|task: &Task| task.owner == "ana")
            .apply_settings(&settings)?,
    )?;
    ana.subscribe(|view| render("ana", view));

    // Someone finishes a task behind the view's back.
    if let Some(task) = tasks.write().iter_mut().find(|task| task.title == "write guide") {
        task.done = true;
    }
    board.recompute(true);

    board.set_reversed(true);
    Ok(())
}
