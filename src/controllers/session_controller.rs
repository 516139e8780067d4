//! Controller de sesiones
//!
//! Confirmaciones de pickup/return con inspección más OTP, extensión
//! de reserva, return anticipado y chat por sesión.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Utc;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::config::EnvironmentConfig;
use crate::dto::partner_dto::{ApiResponse, OtpChallengeResponse};
use crate::dto::session_dto::{
    ChatMessageResponse, ConfirmHandoverRequest, ExtendSessionRequest, InspectionRequest,
    SendMessageRequest, SessionResponse,
};
use crate::models::session::{InspectionImageKind, InspectionRecord};
use crate::models::support::{ChatMessage, MessageSender};
use crate::repositories::session_repository::SessionRepository;
use crate::repositories::support_repository::SupportRepository;
use crate::services::collaborators::{DocumentStorage, OtpProvider};
use crate::services::retry::with_backoff;
use crate::services::session_service::SessionService;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppError, AppResult};
use crate::utils::validation::decode_image_base64;

pub struct SessionController {
    sessions: SessionRepository,
    service: SessionService,
    support: SupportRepository,
    documents: Arc<dyn DocumentStorage>,
    otp: Arc<dyn OtpProvider>,
    config: EnvironmentConfig,
    retry_base: StdDuration,
}

impl SessionController {
    pub fn new(state: &AppState) -> Self {
        Self {
            sessions: state.sessions.clone(),
            service: state.session_service.clone(),
            support: state.support.clone(),
            documents: state.documents.clone(),
            otp: state.otp.clone(),
            config: state.config.clone(),
            retry_base: StdDuration::from_millis(state.config.external_retry_base_ms),
        }
    }

    async fn owned_session(
        &self,
        partner_id: Uuid,
        session_id: Uuid,
    ) -> AppResult<crate::models::session::Session> {
        let session = self
            .sessions
            .find_by_id(session_id)
            .await
            .ok_or_else(|| not_found_error("Session", &session_id.to_string()))?;

        if session.partner_id != partner_id {
            return Err(AppError::Forbidden(
                "Session belongs to another partner".to_string(),
            ));
        }
        Ok(session)
    }

    /// Decodificar y almacenar las seis imágenes de la inspección
    async fn build_inspection(
        &self,
        partner_id: Uuid,
        request: InspectionRequest,
    ) -> AppResult<InspectionRecord> {
        let fields: [(InspectionImageKind, &'static str, &String); 6] = [
            (InspectionImageKind::Front, "front", &request.front),
            (InspectionImageKind::Back, "back", &request.back),
            (InspectionImageKind::Left, "left", &request.left),
            (InspectionImageKind::Right, "right", &request.right),
            (InspectionImageKind::Dashboard, "dashboard", &request.dashboard),
            (
                InspectionImageKind::NumberPlate,
                "number_plate",
                &request.number_plate,
            ),
        ];

        let mut images = HashMap::new();
        for (kind, field, value) in fields {
            let bytes = decode_image_base64(value).map_err(|e| {
                let mut errors = ValidationErrors::new();
                errors.add(field, e);
                AppError::Validation(errors)
            })?;

            let document_id = with_backoff(
                "documents.store",
                self.config.external_retry_max,
                self.retry_base,
                || self.documents.store(partner_id, kind.as_str(), bytes.clone()),
            )
            .await?;

            images.insert(kind, document_id);
        }

        Ok(InspectionRecord {
            images,
            fuel_level: request.fuel_level,
            odometer_km: request.odometer_km,
            damage_markers: request.damage_markers,
            recorded_at: Utc::now(),
        })
    }

    pub async fn list(&self, partner_id: Uuid) -> Result<Vec<SessionResponse>, AppError> {
        let sessions = self.sessions.list_by_partner(partner_id).await;
        Ok(sessions.into_iter().map(SessionResponse::from).collect())
    }

    pub async fn get(
        &self,
        partner_id: Uuid,
        session_id: Uuid,
    ) -> Result<SessionResponse, AppError> {
        let session = self.owned_session(partner_id, session_id).await?;
        Ok(SessionResponse::from(session))
    }

    /// Enviar el OTP de confirmación al dueño del vehículo
    pub async fn request_otp(
        &self,
        partner_id: Uuid,
        session_id: Uuid,
    ) -> Result<OtpChallengeResponse, AppError> {
        let challenge_id = self
            .service
            .request_handover_otp(partner_id, session_id)
            .await?;

        let dev_code = if self.config.is_development() {
            self.otp.dev_code(challenge_id).await
        } else {
            None
        };

        Ok(OtpChallengeResponse {
            challenge_id: challenge_id.to_string(),
            dev_code,
        })
    }

    /// Confirmar el pickup: inspección completa más OTP del dueño
    pub async fn confirm_pickup(
        &self,
        partner_id: Uuid,
        session_id: Uuid,
        request: ConfirmHandoverRequest,
    ) -> Result<ApiResponse<SessionResponse>, AppError> {
        request.validate()?;

        let inspection = self.build_inspection(partner_id, request.inspection).await?;
        let session = self
            .service
            .confirm_pickup(
                partner_id,
                session_id,
                inspection,
                request.challenge_id,
                &request.code,
            )
            .await?;

        Ok(ApiResponse::success_with_message(
            SessionResponse::from(session),
            "Handover confirmado exitosamente".to_string(),
        ))
    }

    /// Return anticipado iniciado por el partner
    pub async fn begin_return(
        &self,
        partner_id: Uuid,
        session_id: Uuid,
    ) -> Result<ApiResponse<SessionResponse>, AppError> {
        let session = self.service.begin_return(partner_id, session_id).await?;

        Ok(ApiResponse::success_with_message(
            SessionResponse::from(session),
            "Sesión lista para inspección de retorno".to_string(),
        ))
    }

    /// Confirmar el return: inspección simétrica más OTP; cierra la
    /// sesión en completed o disputed
    pub async fn confirm_return(
        &self,
        partner_id: Uuid,
        session_id: Uuid,
        request: ConfirmHandoverRequest,
    ) -> Result<ApiResponse<SessionResponse>, AppError> {
        request.validate()?;

        let inspection = self.build_inspection(partner_id, request.inspection).await?;
        let session = self
            .service
            .confirm_return(
                partner_id,
                session_id,
                inspection,
                request.challenge_id,
                &request.code,
            )
            .await?;

        Ok(ApiResponse::success_with_message(
            SessionResponse::from(session),
            "Retorno registrado exitosamente".to_string(),
        ))
    }

    /// Extender la reserva de una sesión activa
    pub async fn extend(
        &self,
        partner_id: Uuid,
        session_id: Uuid,
        request: ExtendSessionRequest,
    ) -> Result<ApiResponse<SessionResponse>, AppError> {
        request.validate()?;

        let session = self
            .service
            .extend_session(partner_id, session_id, request.hours)
            .await?;

        Ok(ApiResponse::success_with_message(
            SessionResponse::from(session),
            "Reserva extendida exitosamente".to_string(),
        ))
    }

    pub async fn list_messages(
        &self,
        partner_id: Uuid,
        session_id: Uuid,
    ) -> Result<Vec<ChatMessageResponse>, AppError> {
        self.owned_session(partner_id, session_id).await?;

        let messages = self.support.list_messages(session_id).await;
        Ok(messages.into_iter().map(ChatMessageResponse::from).collect())
    }

    pub async fn send_message(
        &self,
        partner_id: Uuid,
        session_id: Uuid,
        request: SendMessageRequest,
    ) -> Result<ChatMessageResponse, AppError> {
        request.validate()?;
        self.owned_session(partner_id, session_id).await?;

        let message = self
            .support
            .append_message(ChatMessage {
                id: Uuid::new_v4(),
                session_id,
                sender: MessageSender::Partner,
                body: request.body,
                sent_at: Utc::now(),
            })
            .await;

        Ok(ChatMessageResponse::from(message))
    }
}
