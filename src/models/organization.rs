// src/models/organization.rs

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::common::error::AppError;
use crate::models::common::{AuditStamp, RecordStatus, TenantScoped};
use crate::models::employee::date_range_error;

/// Profundidade máxima da árvore de áreas (raiz = 1).
pub const MAX_DEPTH: usize = 32;

// ---
// Area (unidade organizacional hierárquica)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub parent_id: Option<Uuid>,
    pub record_status: RecordStatus,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub stamp: AuditStamp,
}

impl TenantScoped for Department {
    const TABLE: &'static str = "departments";
    const ENTITY: &'static str = "Área";

    fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub level: Option<String>,
    pub department_id: Option<Uuid>,
    pub record_status: RecordStatus,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub stamp: AuditStamp,
}

impl TenantScoped for Position {
    const TABLE: &'static str = "positions";
    const ENTITY: &'static str = "Cargo";

    fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }
}

// Linha do tempo de puestos de um legajo
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PositionHistory {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub employee_record_id: Uuid,
    pub position_id: Uuid,
    pub valid_from: NaiveDate,
    pub valid_to: Option<NaiveDate>,
    pub record_status: RecordStatus,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub stamp: AuditStamp,
}

impl TenantScoped for PositionHistory {
    const TABLE: &'static str = "position_history";
    const ENTITY: &'static str = "Histórico de cargo";

    fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }
}

/// Valida `new_parent` como pai de `node` (`None` = área ainda não criada).
///
/// `parents` é o mapa id -> pai de todas as áreas do tenant.
pub fn validate_parent(
    node: Option<Uuid>,
    new_parent: Uuid,
    parents: &HashMap<Uuid, Option<Uuid>>,
) -> Result<(), AppError> {
    if node == Some(new_parent) {
        return Err(AppError::InvalidHierarchy("uma área não pode ser pai de si mesma".into()));
    }
    if !parents.contains_key(&new_parent) {
        return Err(AppError::NotFound(Department::ENTITY));
    }

    // Sobe a partir do novo pai; achar `node` no caminho fecha um ciclo
    let mut parent_depth = 0;
    let mut seen = HashSet::new();
    let mut cursor = Some(new_parent);
    while let Some(current) = cursor {
        if Some(current) == node {
            return Err(AppError::InvalidHierarchy("a mudança criaria um ciclo".into()));
        }
        if !seen.insert(current) {
            return Err(AppError::InvalidHierarchy("hierarquia existente já contém um ciclo".into()));
        }
        parent_depth += 1;
        cursor = parents.get(&current).copied().flatten();
    }

    let subtree = node.map_or(1, |n| subtree_height(n, parents));
    if parent_depth + subtree > MAX_DEPTH {
        return Err(AppError::InvalidHierarchy(format!(
            "profundidade máxima de {} níveis excedida",
            MAX_DEPTH
        )));
    }
    Ok(())
}

// Altura da subárvore com raiz em `node` (folha = 1)
fn subtree_height(node: Uuid, parents: &HashMap<Uuid, Option<Uuid>>) -> usize {
    let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for (&id, &parent) in parents {
        if let Some(p) = parent {
            children.entry(p).or_default().push(id);
        }
    }

    let mut height = 0;
    let mut level = vec![node];
    let mut seen = HashSet::new();
    while !level.is_empty() {
        height += 1;
        level = level
            .iter()
            .filter(|id| seen.insert(**id))
            .flat_map(|id| children.get(id).cloned().unwrap_or_default())
            .collect();
    }
    height
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewDepartment {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewPosition {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(max = 50))]
    pub level: Option<String>,
    pub department_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_assignment_dates"))]
pub struct NewPositionAssignment {
    pub employee_record_id: Uuid,
    pub position_id: Uuid,
    pub valid_from: NaiveDate,
    pub valid_to: Option<NaiveDate>,
}

fn validate_assignment_dates(input: &NewPositionAssignment) -> Result<(), ValidationError> {
    match input.valid_to {
        Some(to) if to < input.valid_from => Err(date_range_error()),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // raiz -> a -> b
    fn chain() -> (Uuid, Uuid, Uuid, HashMap<Uuid, Option<Uuid>>) {
        let (root, a, b) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let map = HashMap::from([(root, None), (a, Some(root)), (b, Some(a))]);
        (root, a, b, map)
    }

    #[test]
    fn moving_under_a_descendant_is_a_cycle() {
        let (root, _a, b, map) = chain();
        let err = validate_parent(Some(root), b, &map).unwrap_err();
        assert!(matches!(err, AppError::InvalidHierarchy(_)));
    }

    #[test]
    fn self_parent_is_rejected() {
        let (_root, a, _b, map) = chain();
        assert!(matches!(
            validate_parent(Some(a), a, &map),
            Err(AppError::InvalidHierarchy(_))
        ));
    }

    #[test]
    fn unknown_parent_is_not_found() {
        let (_root, a, _b, map) = chain();
        assert!(matches!(
            validate_parent(Some(a), Uuid::new_v4(), &map),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn valid_moves_and_new_children_pass() {
        let (root, a, b, map) = chain();
        assert!(validate_parent(Some(b), root, &map).is_ok());
        assert!(validate_parent(None, b, &map).is_ok());
        assert!(validate_parent(Some(a), root, &map).is_ok());
    }

    #[test]
    fn depth_limit_counts_the_moved_subtree() {
        let mut map = HashMap::new();
        let mut ids = Vec::new();
        let mut parent = None;
        for _ in 0..MAX_DEPTH {
            let id = Uuid::new_v4();
            map.insert(id, parent);
            ids.push(id);
            parent = Some(id);
        }
        let deepest = *ids.last().unwrap();
        // Uma folha nova abaixo do nível MAX_DEPTH estoura o limite
        assert!(validate_parent(None, deepest, &map).is_err());
        assert!(validate_parent(None, ids[MAX_DEPTH - 2], &map).is_ok());

        // Subárvore de 2 níveis pendurada num nó de nível MAX_DEPTH - 1
        let (sub_root, sub_leaf) = (Uuid::new_v4(), Uuid::new_v4());
        map.insert(sub_root, None);
        map.insert(sub_leaf, Some(sub_root));
        assert!(validate_parent(Some(sub_root), ids[MAX_DEPTH - 2], &map).is_err());
        assert!(validate_parent(Some(sub_root), ids[MAX_DEPTH - 3], &map).is_ok());
    }
}
