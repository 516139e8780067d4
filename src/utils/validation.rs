//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos
//! compartidas entre los DTOs de la API.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    /// Teléfono en formato E.164 laxo: prefijo opcional y 10-15 dígitos
    pub static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9]{10,15}$").unwrap();

    /// Código OTP de 6 dígitos
    pub static ref OTP_CODE_REGEX: Regex = Regex::new(r"^[0-9]{6}$").unwrap();
}

/// Validar número de teléfono
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if !PHONE_REGEX.is_match(value) {
        let mut error = ValidationError::new("phone");
        error.add_param("value".into(), &value.to_string());
        error.add_param("format".into(), &"+<10-15 digits>".to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar código OTP de 6 dígitos
pub fn validate_otp_code(value: &str) -> Result<(), ValidationError> {
    if !OTP_CODE_REGEX.is_match(value) {
        let mut error = ValidationError::new("otp_code");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Decodificar una imagen en base64 (acepta data-URLs del cliente móvil)
pub fn decode_image_base64(value: &str) -> Result<Vec<u8>, ValidationError> {
    use base64::Engine;

    // Las apps móviles suben data-URLs: "data:image/jpeg;base64,<payload>"
    let payload = match value.split_once(";base64,") {
        Some((_, payload)) => payload,
        None => value,
    };

    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|_| {
            let mut error = ValidationError::new("image_base64");
            error.add_param("reason".into(), &"invalid base64 payload".to_string());
            error
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("+5215512345678").is_ok());
        assert!(validate_phone("5512345678").is_ok());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("not-a-phone").is_err());
    }

    #[test]
    fn test_validate_otp_code() {
        assert!(validate_otp_code("123456").is_ok());
        assert!(validate_otp_code("12345").is_err());
        assert!(validate_otp_code("12345a").is_err());
    }

    #[test]
    fn test_decode_image_base64_data_url() {
        let bytes = decode_image_base64("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(bytes, b"hello");

        let bytes = decode_image_base64("aGVsbG8=").unwrap();
        assert_eq!(bytes, b"hello");

        assert!(decode_image_base64("%%%").is_err());
    }
}
