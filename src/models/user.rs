//! Modelo de User
//!
//! Vista de la cuenta de créditos de un usuario tal como la consume el núcleo.
//! Un solo registro con un conjunto de roles en lugar de una jerarquía.

use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::errors::{AppError, AppResult};

/// Roles del sistema
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Passenger,
    Driver,
    Employee,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Passenger => "passenger",
            Role::Driver => "driver",
            Role::Employee => "employee",
            Role::Admin => "admin",
        }
    }

    /// Personal de la plataforma
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Employee | Role::Admin)
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "passenger" => Ok(Role::Passenger),
            "driver" => Ok(Role::Driver),
            "employee" => Ok(Role::Employee),
            "admin" => Ok(Role::Admin),
            other => Err(AppError::Internal(format!("unknown role '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub pseudo: String,
    pub email: String,
    credits: i64,
    pub roles: BTreeSet<Role>,
    /// Solo tiene sentido si el usuario es conductor
    pub licence_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(pseudo: &str, email: &str, credits: i64, roles: &[Role]) -> Self {
        Self {
            id: Uuid::new_v4(),
            pseudo: pseudo.to_string(),
            email: email.to_string(),
            credits: credits.max(0),
            roles: roles.iter().copied().collect(),
            licence_number: None,
            created_at: Utc::now(),
        }
    }

    pub fn credits(&self) -> i64 {
        self.credits
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Licencia visible solo para conductores
    pub fn driver_licence(&self) -> Option<&str> {
        if self.has_role(Role::Driver) {
            self.licence_number.as_deref()
        } else {
            None
        }
    }

    /// Retira créditos; el saldo nunca baja de cero
    pub fn debit(&mut self, amount: i64) -> AppResult<()> {
        if amount < 0 {
            return Err(AppError::InvariantViolation(format!(
                "cannot debit a negative amount ({})",
                amount
            )));
        }
        if self.credits < amount {
            return Err(AppError::InsufficientCredits {
                required: amount,
                available: self.credits,
            });
        }

        self.credits -= amount;
        Ok(())
    }

    pub fn credit(&mut self, amount: i64) -> AppResult<()> {
        if amount < 0 {
            return Err(AppError::InvariantViolation(format!(
                "cannot credit a negative amount ({})",
                amount
            )));
        }

        self.credits = self
            .credits
            .checked_add(amount)
            .ok_or_else(|| AppError::InvariantViolation("credit balance overflow".to_string()))?;
        Ok(())
    }
}

/// Fila de la tabla users; los roles se guardan como TEXT[]
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub pseudo: String,
    pub email: String,
    pub credits: i64,
    pub roles: Vec<String>,
    pub licence_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let roles = row
            .roles
            .iter()
            .map(|r| r.parse::<Role>())
            .collect::<AppResult<BTreeSet<Role>>>()?;

        if row.credits < 0 {
            return Err(AppError::InvariantViolation(format!(
                "user {} has a negative balance",
                row.id
            )));
        }

        Ok(Self {
            id: row.id,
            pseudo: row.pseudo,
            email: row.email,
            credits: row.credits,
            roles,
            licence_number: row.licence_number,
            created_at: row.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debit_never_goes_negative() {
        let mut user = User::new("alice", "alice@example.com", 15, &[Role::Passenger]);
        user.debit(10).unwrap();
        assert_eq!(user.credits(), 5);

        let err = user.debit(10).unwrap_err();
        assert!(matches!(
            err,
            AppError::InsufficientCredits { required: 10, available: 5 }
        ));
        assert_eq!(user.credits(), 5);
    }

    #[test]
    fn test_credit_rejects_negative_amounts() {
        let mut user = User::new("bob", "bob@example.com", 0, &[Role::Driver]);
        assert!(user.credit(-3).is_err());
        user.credit(7).unwrap();
        assert_eq!(user.credits(), 7);
    }

    #[test]
    fn test_licence_gated_by_driver_role() {
        let mut passenger = User::new("carla", "carla@example.com", 0, &[Role::Passenger]);
        passenger.licence_number = Some("B-123".to_string());
        assert_eq!(passenger.driver_licence(), None);

        passenger.roles.insert(Role::Driver);
        assert_eq!(passenger.driver_licence(), Some("B-123"));
    }

    #[test]
    fn test_row_conversion() {
        let row = UserRow {
            id: Uuid::new_v4(),
            pseudo: "dan".to_string(),
            email: "dan@example.com".to_string(),
            credits: 20,
            roles: vec!["passenger".to_string(), "driver".to_string()],
            licence_number: None,
            created_at: Utc::now(),
        };
        let user = User::try_from(row).unwrap();
        assert!(user.has_role(Role::Driver));
        assert!(!user.has_role(Role::Admin));

        let bad = UserRow {
            id: Uuid::new_v4(),
            pseudo: "eve".to_string(),
            email: "eve@example.com".to_string(),
            credits: 0,
            roles: vec!["pilot".to_string()],
            licence_number: None,
            created_at: Utc::now(),
        };
        assert!(User::try_from(bad).is_err());
    }
}
