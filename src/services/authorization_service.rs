//! Servicio de autorización
//!
//! Resuelve la identidad del llamador en un `Actor` con sus roles y decide
//! si puede ejecutar cada operación. Los roles se resuelven una sola vez por
//! petición, antes de abrir cualquier unidad de trabajo.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::user::Role;
use crate::repositories::store::CarpoolStore;
use crate::utils::errors::{forbidden_error, AppError, AppResult};

/// Oráculo de roles: responde qué roles tiene un usuario
#[async_trait]
pub trait RoleOracle: Send + Sync {
    /// `None` si el usuario no existe
    async fn roles_of(&self, user_id: Uuid) -> AppResult<Option<BTreeSet<Role>>>;
}

/// Lee los roles guardados en el registro del usuario
pub struct StoreRoleOracle {
    store: Arc<dyn CarpoolStore>,
}

impl StoreRoleOracle {
    pub fn new(store: Arc<dyn CarpoolStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RoleOracle for StoreRoleOracle {
    async fn roles_of(&self, user_id: Uuid) -> AppResult<Option<BTreeSet<Role>>> {
        Ok(self.store.find_user(user_id).await?.map(|user| user.roles))
    }
}

/// Llamador autenticado con sus roles
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: Uuid,
    pub roles: BTreeSet<Role>,
}

impl Actor {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.iter().any(|role| self.has_role(*role))
    }

    /// Employee o Admin
    pub fn is_staff(&self) -> bool {
        self.roles.iter().any(|role| role.is_staff())
    }
}

/// Servicio de autorización para verificar permisos y roles
pub struct AuthorizationService {
    oracle: Arc<dyn RoleOracle>,
}

impl AuthorizationService {
    pub fn new(oracle: Arc<dyn RoleOracle>) -> Self {
        Self { oracle }
    }

    /// Resuelve el llamador; un id sin usuario detrás no está autenticado
    pub async fn resolve(&self, caller: Uuid) -> AppResult<Actor> {
        match self.oracle.roles_of(caller).await? {
            Some(roles) => Ok(Actor { id: caller, roles }),
            None => Err(AppError::Unauthorized(format!("unknown caller {}", caller))),
        }
    }

    /// Verifica que el actor tenga un rol específico
    pub fn require_role(&self, actor: &Actor, role: Role, operation: &str) -> AppResult<()> {
        if actor.has_role(role) {
            Ok(())
        } else {
            Err(forbidden_error(
                operation,
                &format!("role {} required", role.as_str()),
            ))
        }
    }

    /// Verifica que el actor tenga al menos uno de los roles requeridos
    pub fn require_any_role(&self, actor: &Actor, roles: &[Role], operation: &str) -> AppResult<()> {
        if actor.has_any_role(roles) {
            return Ok(());
        }

        let names: Vec<&str> = roles.iter().map(|r| r.as_str()).collect();
        Err(forbidden_error(
            operation,
            &format!("one of [{}] required", names.join(", ")),
        ))
    }

    /// El actor actúa en su propio nombre
    pub fn require_self(&self, actor: &Actor, user_id: Uuid, operation: &str) -> AppResult<()> {
        if actor.id == user_id {
            Ok(())
        } else {
            Err(forbidden_error(operation, "caller does not match the target user"))
        }
    }

    /// El actor actúa en su propio nombre o es personal de la plataforma
    pub fn require_self_or_staff(&self, actor: &Actor, user_id: Uuid, operation: &str) -> AppResult<()> {
        if actor.id == user_id || actor.is_staff() {
            Ok(())
        } else {
            Err(forbidden_error(operation, "caller is neither the owner nor staff"))
        }
    }
}
