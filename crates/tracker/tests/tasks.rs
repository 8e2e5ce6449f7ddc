mod support;

use serde_json::json;
use support::{Backend, assert_one_toast, toast_message};
use tracker::{AuthSession, TaskCollection, TaskNew, TaskUpdate};

fn seed_day(backend: &Backend) {
    backend.seed(
        "tasks",
        json!({"_id": "t1", "title": "Stretch", "date": "2024-03-10", "completed": false, "order": 0}),
    );
    backend.seed(
        "tasks",
        json!({"_id": "t2", "title": "Read", "date": "2024-03-10", "completed": true, "order": 1}),
    );
    backend.seed(
        "tasks",
        json!({"id": "t3", "title": "Plan week", "date": "2024-03-11", "completed": false}),
    );
}

#[tokio::test]
async fn add_posts_task_and_reloads() {
    let backend = Backend::spawn().await;
    let auth = AuthSession::with_token("t");
    let ctx = backend.context(&auth);
    let tasks = TaskCollection::new(ctx.clone()).await;
    let gets_before = backend.count("GET", "tasks");

    tasks
        .add(TaskNew {
            title: "Water plants".to_string(),
            date: "2024-03-10".to_string(),
            completed: false,
            order: None,
        })
        .await;

    let body = backend.requests("POST", "tasks")[0].body.clone().unwrap();
    assert_eq!(
        body,
        json!({"title": "Water plants", "date": "2024-03-10", "completed": false})
    );
    assert_eq!(backend.count("GET", "tasks"), gets_before + 1);

    let records = tasks.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "Water plants");
    assert!(records[0].ids.canonical().is_some());
    assert_eq!(toast_message(&ctx.notifier).as_deref(), Some("Task added!"));
}

#[tokio::test]
async fn for_date_filters_cached_tasks() {
    let backend = Backend::spawn().await;
    seed_day(&backend);
    let auth = AuthSession::with_token("t");
    let tasks = TaskCollection::new(backend.context(&auth)).await;

    let titles: Vec<_> = tasks
        .for_date("2024-03-10")
        .into_iter()
        .map(|task| task.title)
        .collect();
    assert_eq!(titles, vec!["Stretch", "Read"]);
    assert!(tasks.for_date("2024-03-12").is_empty());
}

#[tokio::test]
async fn toggle_completion_puts_inverted_flag() {
    let backend = Backend::spawn().await;
    seed_day(&backend);
    let auth = AuthSession::with_token("t");
    let ctx = backend.context(&auth);
    let tasks = TaskCollection::new(ctx.clone()).await;

    tasks.toggle_completion("t1").await;

    let put = &backend.requests("PUT", "tasks")[0];
    assert_eq!(put.id.as_deref(), Some("t1"));
    let body = put.body.as_ref().unwrap();
    assert_eq!(body["completed"], true);
    assert_eq!(body["title"], "Stretch");
    assert!(tasks.find("t1").unwrap().completed);
    assert_eq!(toast_message(&ctx.notifier).as_deref(), Some("Task updated!"));

    // Tasks known only by `id` are addressed through it.
    tasks.toggle_completion("t3").await;
    assert_eq!(
        backend.requests("PUT", "tasks")[1].id.as_deref(),
        Some("t3")
    );
    assert!(tasks.find("t3").unwrap().completed);
}

#[tokio::test]
async fn toggle_unknown_task_does_nothing() {
    let backend = Backend::spawn().await;
    seed_day(&backend);
    let auth = AuthSession::with_token("t");
    let ctx = backend.context(&auth);
    let tasks = TaskCollection::new(ctx.clone()).await;

    tasks.toggle_completion("missing").await;

    assert_eq!(backend.count("PUT", "tasks"), 0);
    assert!(ctx.notifier.current().is_none());
}

#[tokio::test]
async fn update_and_remove_reload() {
    let backend = Backend::spawn().await;
    seed_day(&backend);
    let auth = AuthSession::with_token("t");
    let ctx = backend.context(&auth);
    let tasks = TaskCollection::new(ctx.clone()).await;

    tasks
        .update(
            "t2",
            TaskUpdate {
                title: Some("Read 20 pages".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert_eq!(tasks.find("t2").unwrap().title, "Read 20 pages");

    let gets_before = backend.count("GET", "tasks");
    tasks.remove("t3").await;
    assert!(tasks.find("t3").is_none());
    assert_eq!(backend.count("GET", "tasks"), gets_before + 1);
    assert_eq!(toast_message(&ctx.notifier).as_deref(), Some("Task deleted!"));
}

#[tokio::test]
async fn reorder_is_local_only() {
    let backend = Backend::spawn().await;
    seed_day(&backend);
    let auth = AuthSession::with_token("t");
    let tasks = TaskCollection::new(backend.context(&auth)).await;
    let requests_before = backend.total_requests();

    let mut reversed = tasks.records();
    reversed.reverse();
    tasks.reorder(reversed.clone());

    assert_eq!(tasks.records(), reversed);
    assert_eq!(backend.total_requests(), requests_before);

    // The next reload brings back the server order.
    tasks.fetch_all().await;
    assert_eq!(tasks.records()[0].title, "Stretch");
}

#[tokio::test]
async fn task_operations_require_login() {
    let backend = Backend::spawn().await;
    let auth = AuthSession::new();
    let ctx = backend.context(&auth);
    let tasks = TaskCollection::new(ctx.clone()).await;

    let shown = ctx.notifier.displayed();
    tasks.reorder(Vec::new());
    assert_one_toast(&ctx.notifier, shown, "Please log in to reorder tasks.");

    let shown = ctx.notifier.displayed();
    tasks.toggle_completion("t1").await;
    assert_one_toast(&ctx.notifier, shown, "Please log in to complete tasks.");

    let shown = ctx.notifier.displayed();
    tasks
        .add(TaskNew {
            title: "x".to_string(),
            date: "2024-03-10".to_string(),
            completed: false,
            order: None,
        })
        .await;
    assert_one_toast(&ctx.notifier, shown, "Please log in to add tasks.");

    let shown = ctx.notifier.displayed();
    tasks.update("t1", TaskUpdate::default()).await;
    assert_one_toast(&ctx.notifier, shown, "Please log in to edit tasks.");

    let shown = ctx.notifier.displayed();
    tasks.remove("t1").await;
    assert_one_toast(&ctx.notifier, shown, "Please log in to delete tasks.");

    assert!(tasks.records().is_empty());
    assert_eq!(backend.total_requests(), 0);
}

#[tokio::test]
async fn failed_toggle_reports_edit_failure() {
    let backend = Backend::spawn().await;
    seed_day(&backend);
    let auth = AuthSession::with_token("t");
    let ctx = backend.context(&auth);
    let tasks = TaskCollection::new(ctx.clone()).await;

    backend.fail_writes(true);
    tasks.toggle_completion("t1").await;

    assert!(!tasks.find("t1").unwrap().completed);
    assert_eq!(
        toast_message(&ctx.notifier).as_deref(),
        Some("Failed to edit task.")
    );
}
