// src/middleware/auth.rs
//
// Sessão do chamador. Nunca rejeita a requisição: token ausente ou inválido
// vira sessão anônima e cada regra decide se aceita anônimos.

use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{config::AppState, middleware::client_ip::client_ip, models::user::Caller};

impl<S> FromRequestParts<S> for Caller
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let ip = client_ip(&parts.headers);

        // Header malformado conta como ausente
        let bearer = TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
            .await
            .ok();
        let token = bearer.as_ref().map(|TypedHeader(Authorization(b))| b.token());

        Ok(app_state.identity_service.session(token, ip).await)
    }
}
