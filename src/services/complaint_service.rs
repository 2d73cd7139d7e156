// src/services/complaint_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ComplaintStore, ProductStore, UserStore},
    models::{
        complaint::{normalize_message, Complaint, ComplaintDetail, ComplaintStatus, NewComplaint, SubmitComplaintPayload},
        log::{LogAction, LogTarget},
        user::{Caller, User},
    },
    services::{
        activity_log::ActivityLogger,
        permissions::{authorize, Action},
    },
};

#[derive(Clone)]
pub struct ComplaintService {
    users: Arc<dyn UserStore>,
    products: Arc<dyn ProductStore>,
    complaints: Arc<dyn ComplaintStore>,
    activity: ActivityLogger,
}

impl ComplaintService {
    pub fn new(
        users: Arc<dyn UserStore>,
        products: Arc<dyn ProductStore>,
        complaints: Arc<dyn ComplaintStore>,
        activity: ActivityLogger,
    ) -> Self {
        Self { users, products, complaints, activity }
    }

    async fn find_admin(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.find_by_id(id).await?.filter(User::is_admin))
    }

    // adminId inválido (ou que não é admin) cai no admin mais antigo
    async fn route_to_admin(&self, requested: Option<Uuid>) -> Result<User, AppError> {
        if let Some(id) = requested {
            if let Some(admin) = self.find_admin(id).await? {
                return Ok(admin);
            }
            tracing::debug!("Admin {} pedido na reclamação não existe; usando o padrão", id);
        }
        self.users.earliest_admin().await?.ok_or(AppError::NoAdministrator)
    }

    /// Checagens em ordem, nada é gravado antes de todas passarem:
    /// sessão, papel, mensagem, admin, produto.
    pub async fn submit_complaint(
        &self,
        caller: &Caller,
        payload: SubmitComplaintPayload,
    ) -> Result<Complaint, AppError> {
        let user = caller.require()?;
        authorize(user, Action::SubmitComplaint)?;

        let message = normalize_message(&payload.message).ok_or(AppError::MessageTooShort)?;
        let admin = self.route_to_admin(payload.admin_id).await?;

        if let Some(product_id) = payload.product_id {
            self.products
                .find(product_id)
                .await?
                .ok_or(AppError::ProductNotFound)?;
        }

        let complaint = self
            .complaints
            .create(NewComplaint {
                user_id: user.id,
                product_id: payload.product_id,
                assigned_admin_id: admin.id,
                message,
            })
            .await?;

        let target = if payload.product_id.is_some() { LogTarget::Product } else { LogTarget::General };
        self.activity
            .record(user, caller.ip(), LogAction::Complaint, target, payload.product_id)
            .await;

        tracing::info!("📨 Reclamação {} atribuída ao admin {}", complaint.id, admin.id);
        Ok(complaint)
    }

    pub async fn list_complaints(
        &self,
        caller: &Caller,
        status: Option<ComplaintStatus>,
    ) -> Result<Vec<ComplaintDetail>, AppError> {
        let user = caller.require()?;
        authorize(user, Action::ManageComplaints)?;
        self.complaints.list(status).await
    }

    pub async fn reassign_complaint(
        &self,
        caller: &Caller,
        complaint_id: Uuid,
        new_admin_id: Uuid,
    ) -> Result<(), AppError> {
        let user = caller.require()?;
        authorize(user, Action::ManageComplaints)?;

        // Valida o destino antes de mexer em qualquer coisa
        let admin = self.find_admin(new_admin_id).await?.ok_or(AppError::AdminNotFound)?;

        if !self.complaints.assign(complaint_id, admin.id).await? {
            return Err(AppError::ComplaintNotFound);
        }

        self.activity
            .record(user, caller.ip(), LogAction::Reassign, LogTarget::Complaint, Some(complaint_id))
            .await;
        Ok(())
    }

    /// Qualquer status pode ir para qualquer outro.
    pub async fn update_status(
        &self,
        caller: &Caller,
        complaint_id: Uuid,
        status: ComplaintStatus,
    ) -> Result<(), AppError> {
        let user = caller.require()?;
        authorize(user, Action::ManageComplaints)?;

        if !self.complaints.set_status(complaint_id, status).await? {
            return Err(AppError::ComplaintNotFound);
        }

        self.activity
            .record(user, caller.ip(), LogAction::UpdateStatus, LogTarget::Complaint, Some(complaint_id))
            .await;
        Ok(())
    }

    pub async fn update_message(
        &self,
        caller: &Caller,
        complaint_id: Uuid,
        message: &str,
    ) -> Result<(), AppError> {
        let user = caller.require()?;
        authorize(user, Action::ManageComplaints)?;

        let message = normalize_message(message).ok_or(AppError::MessageTooShort)?;
        if !self.complaints.set_message(complaint_id, &message).await? {
            return Err(AppError::ComplaintNotFound);
        }

        self.activity
            .record(user, caller.ip(), LogAction::Update, LogTarget::Complaint, Some(complaint_id))
            .await;
        Ok(())
    }

    pub async fn delete_complaint(&self, caller: &Caller, complaint_id: Uuid) -> Result<(), AppError> {
        let user = caller.require()?;
        authorize(user, Action::ManageComplaints)?;

        self.complaints
            .delete(complaint_id)
            .await?
            .ok_or(AppError::ComplaintNotFound)?;

        self.activity
            .record(user, caller.ip(), LogAction::Delete, LogTarget::Complaint, Some(complaint_id))
            .await;
        Ok(())
    }
}
