// src/services/permissions.rs
//
// Matriz de papéis. Cada papel é tratado com `match` exaustivo: um papel ou
// ação nova não compila até alguém decidir a regra.

use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        product::Product,
        user::{Role, User},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateProduct,
    UpdateProduct { supplier_id: Uuid },
    DeleteProduct,
    MarkUnavailable { supplier_id: Uuid },
    SubmitRating,
    SubmitComplaint,
    ViewLogs,
    ManageComplaints,
    ManageMedia,
    ViewDashboard,
}

pub fn authorize(user: &User, action: Action) -> Result<(), AppError> {
    let allowed = match user.role {
        Role::Admin => match action {
            Action::CreateProduct
            | Action::UpdateProduct { .. }
            | Action::DeleteProduct
            | Action::MarkUnavailable { .. }
            | Action::SubmitRating
            | Action::SubmitComplaint
            | Action::ViewLogs
            | Action::ManageComplaints
            | Action::ManageMedia
            | Action::ViewDashboard => true,
        },
        Role::Supplier => match action {
            Action::CreateProduct | Action::ViewLogs | Action::ManageMedia | Action::ViewDashboard => true,
            Action::UpdateProduct { supplier_id } | Action::MarkUnavailable { supplier_id } => {
                supplier_id == user.id
            }
            // Mensagens próprias, distintas do "não autorizado" genérico
            Action::SubmitRating => return Err(AppError::SupplierCannotRate),
            Action::SubmitComplaint => return Err(AppError::SupplierCannotComplain),
            Action::DeleteProduct | Action::ManageComplaints => false,
        },
        Role::User => match action {
            Action::SubmitRating | Action::SubmitComplaint => true,
            Action::CreateProduct
            | Action::UpdateProduct { .. }
            | Action::DeleteProduct
            | Action::MarkUnavailable { .. }
            | Action::ViewLogs
            | Action::ManageComplaints
            | Action::ManageMedia
            | Action::ViewDashboard => false,
        },
    };

    if allowed { Ok(()) } else { Err(AppError::Forbidden) }
}

/// Ninguém avalia o que fornece, qualquer que seja o papel.
pub fn ensure_not_own_product(user: &User, product: &Product) -> Result<(), AppError> {
    if product.supplier_id == user.id {
        return Err(AppError::CannotRateOwnProduct);
    }
    Ok(())
}
