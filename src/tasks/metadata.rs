use uuid::Uuid;

/// Identity of a task: a generated unique id and a caller-supplied name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TaskMetadata {
    id: String,
    name: String,
}

impl TaskMetadata {
    pub(crate) fn new(id: String, name: String) -> Self {
        Self { id, name }
    }

    /// Unique id (UUID v4, hyphenated).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Caller-supplied name; unique only when the scheduler deduplicates.
    pub fn name(&self) -> &str {
        &self.name
    }
}

pub(crate) fn new_task_id() -> String {
    Uuid::new_v4().to_string()
}
