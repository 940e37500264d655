use log::info;

use crate::server::controller::error::ApiError;
use crate::server::database::{Repository, Store};
use crate::server::model::staff::{Department, Staff, StaffFilter, StaffPayload};
use crate::server::util::validation::{
    validate_email, validate_non_negative, validate_required_text, MAX_NAME_LEN,
};

#[derive(Clone)]
pub(crate) struct StaffService {
    staff: Repository<Staff>,
    departments: Repository<Department>,
}

impl StaffService {
    pub fn new(store: &Store) -> Self {
        Self {
            staff: Repository::new(store.clone()),
            departments: Repository::new(store.clone()),
        }
    }

    pub async fn list(&self, filter: &StaffFilter) -> Result<Vec<Staff>, ApiError> {
        let mut staff: Vec<_> = self
            .staff
            .find_all()
            .await?
            .into_iter()
            .filter(|s| filter.matches(s))
            .collect();
        staff.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(staff)
    }

    pub async fn get(&self, id: &str) -> Result<Staff, ApiError> {
        self.staff
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Staff member"))
    }

    fn validate(payload: &StaffPayload) -> Result<(), ApiError> {
        validate_required_text(&payload.full_name, "Full name is required", MAX_NAME_LEN)?;
        validate_email(&payload.email)?;
        validate_required_text(&payload.phone, "Phone number is required", 32)?;
        validate_required_text(&payload.role, "Role is required", MAX_NAME_LEN)?;
        validate_required_text(&payload.department, "Department is required", MAX_NAME_LEN)?;
        validate_non_negative(payload.salary, "Salary cannot be negative")
    }

    fn apply(staff: &mut Staff, payload: StaffPayload) {
        staff.full_name = payload.full_name.trim().to_string();
        staff.email = payload.email.trim().to_string();
        staff.phone = payload.phone.trim().to_string();
        staff.role = payload.role.trim().to_string();
        staff.department = payload.department.trim().to_string();
        staff.status = payload.status;
        staff.join_date = payload.join_date;
        staff.salary = payload.salary;
        staff.shift = payload.shift;
    }

    pub async fn create(&self, payload: StaffPayload) -> Result<Staff, ApiError> {
        Self::validate(&payload)?;
        let mut staff = Staff {
            id: String::new(),
            full_name: String::new(),
            email: String::new(),
            phone: String::new(),
            role: String::new(),
            department: String::new(),
            status: payload.status,
            join_date: payload.join_date,
            salary: payload.salary,
            shift: payload.shift,
        };
        Self::apply(&mut staff, payload);
        let staff = self.staff.create(staff).await?;
        info!("staff member {} created", staff.id);
        Ok(staff)
    }

    pub async fn update(&self, id: &str, payload: StaffPayload) -> Result<Staff, ApiError> {
        Self::validate(&payload)?;
        let mut staff = self.get(id).await?;
        Self::apply(&mut staff, payload);
        self.staff.update(&staff).await?;
        Ok(staff)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.staff.delete(id).await?;
        info!("staff member {} deleted", id);
        Ok(())
    }

    /// Departments with head counts taken from the current staff list.
    pub async fn departments(&self) -> Result<Vec<Department>, ApiError> {
        let staff = self.staff.find_all().await?;
        let mut departments = self.departments.find_all().await?;
        for dept in departments.iter_mut() {
            dept.staff_count = staff.iter().filter(|s| s.department == dept.name).count();
        }
        departments.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(departments)
    }
}
