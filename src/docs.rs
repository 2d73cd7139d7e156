// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::common::response::NoPayload;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Sessão ---
        handlers::session::get_session,
        handlers::session::health,

        // --- Produtos ---
        handlers::products::list_products,
        handlers::products::get_product,
        handlers::products::contact_link,
        handlers::products::record_view,
        handlers::products::record_interaction,
        handlers::products::create_product,
        handlers::products::update_product,
        handlers::products::delete_product,
        handlers::products::mark_unavailable,

        // --- Avaliações ---
        handlers::ratings::list_ratings,
        handlers::ratings::submit_rating,
        handlers::ratings::delete_rating,

        // --- Reclamações ---
        handlers::complaints::submit_complaint,
        handlers::complaints::list_complaints,
        handlers::complaints::reassign_complaint,
        handlers::complaints::update_status,
        handlers::complaints::update_message,
        handlers::complaints::delete_complaint,

        // --- Logs ---
        handlers::logs::list_logs,
        handlers::logs::export_logs,

        // --- Mídia ---
        handlers::media::upload_file,
        handlers::media::delete_file,

        // --- Administradores ---
        handlers::admins::list_admins,
        handlers::admins::default_admin,

        // --- Painel ---
        handlers::dashboard::summary,
        handlers::dashboard::products,
    ),
    components(
        schemas(
            NoPayload,
            models::user::Role,
            models::user::User,
            models::user::SessionResponse,
            models::user::AdminSummary,
            models::user::AdminContact,
            models::product::Product,
            models::product::ProductView,
            models::product::ProductPayload,
            models::product::ContactLink,
            models::product::DashboardSummary,
            models::stats::ProductStat,
            models::rating::RatingLevel,
            models::rating::Rating,
            models::rating::RatingWithAuthor,
            models::rating::RatingOutcome,
            models::rating::SubmitRatingPayload,
            models::complaint::ComplaintStatus,
            models::complaint::Complaint,
            models::complaint::ComplaintDetail,
            models::complaint::ComplaintCreated,
            models::complaint::SubmitComplaintPayload,
            models::complaint::ReassignComplaintPayload,
            models::complaint::UpdateComplaintStatusPayload,
            models::complaint::UpdateComplaintMessagePayload,
            models::log::LogView,
            models::log::LogList,
            models::log::LogExport,
            models::log::ExportFormat,
            handlers::session::HealthResponse,
            handlers::products::ProductList,
            handlers::products::ProductDetail,
            handlers::products::ProductSaved,
            handlers::products::StatsUpdated,
            handlers::ratings::RatingList,
            handlers::ratings::RatingRemoved,
            handlers::complaints::ComplaintList,
            handlers::media::FileUploaded,
            handlers::media::DeleteFilePayload,
            handlers::media::UploadForm,
            handlers::admins::AdminList,
            handlers::admins::DefaultAdmin,
        )
    ),
    tags(
        (name = "Sessão", description = "Sessão do provedor de identidade"),
        (name = "Produtos", description = "Catálogo, painel e estatísticas"),
        (name = "Avaliações", description = "Escala de avaliação e média por produto"),
        (name = "Reclamações", description = "Roteamento e tratamento de reclamações"),
        (name = "Logs", description = "Log de atividade e exportação"),
        (name = "Mídia", description = "Upload de imagens"),
        (name = "Administradores", description = "Diretório de admins e contato WhatsApp"),
        (name = "Painel", description = "Resumo e produtos do painel por papel")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
