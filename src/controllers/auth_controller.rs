//! Controller de autenticación
//!
//! Registro con OTP de verificación de teléfono, login por contraseña
//! o por OTP, y perfil del partner autenticado.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use uuid::Uuid;

use crate::config::EnvironmentConfig;
use crate::dto::partner_dto::{
    ApiResponse, AuthResponse, LoginRequest, OtpChallengeResponse, PartnerResponse,
    RegisterPartnerRequest, RegisterResponse, RequestOtpRequest, VerifyOtpRequest,
};
use crate::models::auth::OtpPurpose;
use crate::models::partner::Partner;
use crate::repositories::partner_repository::PartnerRepository;
use crate::services::collaborators::OtpProvider;
use crate::services::jwt_service::JwtService;
use crate::services::retry::with_backoff;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppError, AppResult};
use validator::Validate;

pub struct AuthController {
    partners: PartnerRepository,
    jwt: Arc<JwtService>,
    otp: Arc<dyn OtpProvider>,
    config: EnvironmentConfig,
    retry_base: StdDuration,
}

impl AuthController {
    pub fn new(state: &AppState) -> Self {
        Self {
            partners: state.partners.clone(),
            jwt: state.jwt.clone(),
            otp: state.otp.clone(),
            config: state.config.clone(),
            retry_base: StdDuration::from_millis(state.config.external_retry_base_ms),
        }
    }

    async fn send_otp(&self, phone: &str, purpose: OtpPurpose) -> AppResult<OtpChallengeResponse> {
        let challenge_id = with_backoff(
            "otp.send",
            self.config.external_retry_max,
            self.retry_base,
            || self.otp.send(phone, purpose),
        )
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

    fn issue_token(&self, partner: &Partner) -> AppResult<AuthResponse> {
        let (token, expires_at) = self
            .jwt
            .generate_access_token(partner)
            .map_err(AppError::Jwt)?;

        Ok(AuthResponse {
            token,
            expires_at: expires_at.to_rfc3339(),
            partner: PartnerResponse::from(partner.clone()),
        })
    }

    /// Alta de partner; el token llega al verificar el OTP de registro
    pub async fn register(
        &self,
        request: RegisterPartnerRequest,
    ) -> Result<ApiResponse<RegisterResponse>, AppError> {
        request.validate()?;

        let password_hash = bcrypt::hash(&request.password, bcrypt::DEFAULT_COST)
            .map_err(|e| AppError::Hash(e.to_string()))?;

        let partner = self
            .partners
            .create(Partner::new(
                request.name,
                request.phone,
                request.email,
                request.city,
                request.zone,
                password_hash,
            ))
            .await?;

        let otp = self.send_otp(&partner.phone, OtpPurpose::Register).await?;

        Ok(ApiResponse::success_with_message(
            RegisterResponse {
                partner: PartnerResponse::from(partner),
                otp,
            },
            "Partner registrado exitosamente".to_string(),
        ))
    }

    /// Verificar el OTP de registro/login y emitir el token
    pub async fn verify_otp(&self, request: VerifyOtpRequest) -> Result<AuthResponse, AppError> {
        request.validate()?;

        let mut partner = self
            .partners
            .find_by_phone(&request.phone)
            .await
            .ok_or_else(|| not_found_error("Partner", &request.phone))?;

        let verified = with_backoff(
            "otp.verify",
            self.config.external_retry_max,
            self.retry_base,
            || self.otp.verify(request.challenge_id, &request.code),
        )
        .await?;

        if !verified {
            return Err(AppError::BadRequest(
                "Invalid or expired OTP code".to_string(),
            ));
        }

        if !partner.phone_verified {
            partner.phone_verified = true;
            partner = self.partners.update(partner).await?;
        }

        self.issue_token(&partner)
    }

    /// Login con teléfono y contraseña
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AppError> {
        request.validate()?;

        let partner = self
            .partners
            .find_by_phone(&request.phone)
            .await
            .ok_or_else(|| AppError::Unauthorized("Invalid phone or password".to_string()))?;

        let valid = bcrypt::verify(&request.password, &partner.password_hash)
            .map_err(|e| AppError::Hash(e.to_string()))?;

        if !valid {
            return Err(AppError::Unauthorized(
                "Invalid phone or password".to_string(),
            ));
        }

        self.issue_token(&partner)
    }

    /// Pedir un OTP de login para un partner ya registrado
    pub async fn request_login_otp(
        &self,
        request: RequestOtpRequest,
    ) -> Result<OtpChallengeResponse, AppError> {
        request.validate()?;

        let partner = self
            .partners
            .find_by_phone(&request.phone)
            .await
            .ok_or_else(|| not_found_error("Partner", &request.phone))?;

        self.send_otp(&partner.phone, OtpPurpose::Login).await
    }

    /// Perfil del partner autenticado
    pub async fn me(&self, partner_id: Uuid) -> Result<PartnerResponse, AppError> {
        let partner = self
            .partners
            .find_by_id(partner_id)
            .await
            .ok_or_else(|| not_found_error("Partner", &partner_id.to_string()))?;

        Ok(PartnerResponse::from(partner))
    }
}
