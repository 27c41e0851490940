//! services/api/src/adapters/memory_publisher.rs
//!
//! An in-process `CoursePublisher` that keeps published courses in memory.
//! Used when no course endpoint is configured, and by the handler tests.

use async_trait::async_trait;
use course_wizard_core::domain::Course;
use course_wizard_core::ports::{CoursePublisher, PortResult, PublishReceipt};
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryPublisher {
    published: Mutex<Vec<(Uuid, Course)>>,
}

impl MemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every course published so far, with the id it was stored under.
    pub async fn published(&self) -> Vec<(Uuid, Course)> {
        self.published.lock().await.clone()
    }
}

#[async_trait]
impl CoursePublisher for MemoryPublisher {
    async fn publish_course(&self, course: &Course) -> PortResult<PublishReceipt> {
        let id = Uuid::new_v4();
        self.published.lock().await.push((id, course.clone()));
        info!(course_id = %id, title = %course.title, "Course stored in memory");
        Ok(PublishReceipt::now(Some(id.to_string())))
    }
}
