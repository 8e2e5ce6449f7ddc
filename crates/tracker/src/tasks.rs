use api_types::{
    RecordIds,
    task::{TaskNew, TaskUpdate, TaskView},
};

use crate::collection::{RemoteCollection, Resource};

pub type Task = TaskView;

pub struct Tasks;

impl Resource for Tasks {
    const PATH: &'static str = "tasks";
    const SINGULAR: &'static str = "task";
    const PLURAL: &'static str = "tasks";

    type Wire = TaskView;
    type Record = Task;
    type New = TaskNew;
    type Patch = TaskUpdate;

    fn from_wire(wire: TaskView) -> Task {
        wire
    }

    fn ids(record: &Task) -> &RecordIds {
        &record.ids
    }
}

pub type TaskCollection = RemoteCollection<Tasks>;

impl RemoteCollection<Tasks> {
    /// Tasks scheduled on `date` (`YYYY-MM-DD`), in cache order.
    pub fn for_date(&self, date: &str) -> Vec<Task> {
        self.filtered(|task| task.date == date)
    }

    /// Replaces the cached order with `sequence`.
    ///
    /// Local only: nothing is sent to the backend, so the next reload
    /// restores the server order.
    pub fn reorder(&self, sequence: Vec<Task>) {
        if !self.shared.ctx.require_auth("reorder tasks") {
            return;
        }
        tracing::debug!("reordered {} tasks locally", sequence.len());
        self.shared.cache.send_replace(sequence);
    }

    /// Flips `completed` on the task matching `id` through [`update`].
    /// Unknown ids are ignored.
    ///
    ///  [`update`]: RemoteCollection::update
    pub async fn toggle_completion(&self, id: &str) {
        if !self.shared.ctx.require_auth("complete tasks") {
            return;
        }
        let Some(task) = self.find(id) else {
            tracing::debug!("toggle_completion: no task with id {id}");
            return;
        };
        let target = task.ids.canonical().unwrap_or(id).to_string();
        let patch = TaskUpdate {
            completed: Some(!task.completed),
            ..TaskUpdate::from(&task)
        };
        self.update(&target, patch).await;
    }
}
