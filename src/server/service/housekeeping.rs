use log::info;

use crate::server::controller::error::ApiError;
use crate::server::database::{Repository, Store};
use crate::server::model::housekeeping::{
    HousekeepingTask, TaskFilter, TaskPayload, TaskStatus, UNASSIGNED,
};
use crate::server::model::room::Room;
use crate::server::model::staff::Staff;
use crate::server::util::validation::{validate_optional_text, validate_required_text, MAX_NOTE_LEN};

#[derive(Clone)]
pub(crate) struct HousekeepingService {
    tasks: Repository<HousekeepingTask>,
    rooms: Repository<Room>,
    staff: Repository<Staff>,
}

impl HousekeepingService {
    pub fn new(store: &Store) -> Self {
        Self {
            tasks: Repository::new(store.clone()),
            rooms: Repository::new(store.clone()),
            staff: Repository::new(store.clone()),
        }
    }

    /// Soonest due first.
    pub async fn list(&self, filter: &TaskFilter) -> Result<Vec<HousekeepingTask>, ApiError> {
        let mut tasks: Vec<_> = self
            .tasks
            .find_all()
            .await?
            .into_iter()
            .filter(|t| filter.matches(t))
            .collect();
        tasks.sort_by(|a, b| a.due_date.cmp(&b.due_date));
        Ok(tasks)
    }

    pub async fn create(&self, payload: TaskPayload) -> Result<HousekeepingTask, ApiError> {
        validate_required_text(&payload.task_type, "Task type is required", 64)?;
        validate_optional_text(Some(&payload.notes), "Notes", MAX_NOTE_LEN)?;
        let room = self
            .rooms
            .find_by_id(&payload.room_id)
            .await?
            .ok_or_else(|| ApiError::validation("Selected room does not exist"))?;
        let assignee = match payload.assigned_to_id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) => Some(
                self.staff
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| ApiError::validation("Assigned staff member does not exist"))?,
            ),
            None => None,
        };
        let task = self
            .tasks
            .create(HousekeepingTask {
                id: String::new(),
                room_id: room.id,
                room_number: room.room_number,
                task_type: payload.task_type.trim().to_string(),
                status: TaskStatus::Pending,
                priority: payload.priority,
                assigned_to: assignee
                    .as_ref()
                    .map_or(UNASSIGNED.to_string(), |s| s.full_name.clone()),
                assigned_to_id: assignee.map(|s| s.id),
                due_date: payload.due_date,
                notes: payload.notes,
            })
            .await?;
        info!("housekeeping task {} created for room {}", task.id, task.room_number);
        Ok(task)
    }

    pub async fn update_status(&self, id: &str, status: TaskStatus) -> Result<HousekeepingTask, ApiError> {
        let mut task = self
            .tasks
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Task"))?;
        if !task.status.can_transition_to(status) {
            return Err(ApiError::illegal_transition(task.status, status));
        }
        if task.status != status {
            task.status = status;
            self.tasks.update(&task).await?;
        }
        Ok(task)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.tasks.delete(id).await?;
        Ok(())
    }
}
