//! Employee model.
//!
//! The scheduled jobs walk every active employee; the employee's tenant
//! linkage decides which punch store partition their logs belong to.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineResult;
use crate::validation::{validate_email, validate_phone};

/// Represents an employee whose attendance is tracked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: Uuid,
    /// The tenant the employee belongs to, if linked.
    pub tenant_id: Option<Uuid>,
    /// Display name.
    pub full_name: String,
    /// Work email address.
    pub email: String,
    /// Contact phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Inactive employees are skipped by the scheduled jobs.
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Employee {
    /// Checks the contact fields.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::EngineError::Validation`] naming the first bad field.
    ///
    /// # Examples
    ///
    /// ```
    /// use attendance_engine::models::Employee;
    /// use uuid::Uuid;
    ///
    /// let employee = Employee {
    ///     id: Uuid::new_v4(),
    ///     tenant_id: Some(Uuid::new_v4()),
    ///     full_name: "Ama Mensah".to_string(),
    ///     email: "ama@example.com".to_string(),
    ///     phone: Some("+233 24 123 4567".to_string()),
    ///     active: true,
    /// };
    /// assert!(employee.validate().is_ok());
    /// ```
    pub fn validate(&self) -> EngineResult<()> {
        validate_email(&self.email)?;
        if let Some(phone) = &self.phone {
            validate_phone(phone)?;
        }
        Ok(())
    }
}
