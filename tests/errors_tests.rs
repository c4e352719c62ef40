use actix_web::http::StatusCode;
use pagecloak::errors::{CloakError, FieldError, Result};
use std::error::Error;

#[cfg(test)]
mod error_creation_tests {
    use super::*;

    #[test]
    fn test_field_validation_error() {
        let error = CloakError::invalid_field("redirectUrl", "is required");

        assert!(matches!(error, CloakError::FieldValidation(_)));
        assert_eq!(error.field(), Some("redirectUrl"));
        assert_eq!(error.message(), "is required");
        assert!(error.to_string().contains("redirectUrl: is required"));
    }

    #[test]
    fn test_from_field_error() {
        let error: CloakError = FieldError::new("domain", "must not be an IP address").into();
        assert_eq!(error.field(), Some("domain"));
        assert_eq!(error.http_status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_dns_mismatch_error() {
        let error = CloakError::dns_mismatch("not pointing to 198.51.100.7");

        assert!(matches!(error, CloakError::DnsMismatch(_)));
        assert!(error.to_string().contains("DNS Mismatch"));
        assert!(!error.is_retryable());
        assert_eq!(error.http_status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_upstream_error_is_retryable() {
        let error = CloakError::upstream("control plane timed out");
        assert!(error.is_retryable());
        assert_eq!(error.http_status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_io_error_maps_to_storage() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error: CloakError = io.into();
        assert!(matches!(error, CloakError::Storage(_)));
        assert_eq!(error.http_status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_serde_error_maps_to_serialization() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{oops");
        let error: CloakError = parse.unwrap_err().into();
        assert!(matches!(error, CloakError::Serialization(_)));
        assert_eq!(error.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

#[cfg(test)]
mod error_format_tests {
    use super::*;

    #[test]
    fn test_codes_are_unique() {
        let errors = [
            CloakError::validation("x"),
            CloakError::invalid_field("f", "x"),
            CloakError::not_found("x"),
            CloakError::conflict("x"),
            CloakError::storage("x"),
            CloakError::upstream("x"),
            CloakError::dns_mismatch("x"),
            CloakError::classifier_unavailable("x"),
            CloakError::serialization("x"),
            CloakError::config("x"),
        ];
        let mut codes: Vec<&str> = errors.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_format_colored_contains_parts() {
        let error = CloakError::config("fallback_url is not a valid URL");
        let output = error.format_colored();
        assert!(output.contains(error.code()));
        assert!(output.contains("fallback_url is not a valid URL"));
    }

    #[test]
    fn test_error_trait_object() {
        let error: Box<dyn Error> = Box::new(CloakError::not_found("config 'x' not found"));
        assert!(error.to_string().contains("Resource Not Found"));
    }

    #[test]
    fn test_result_alias() {
        fn lookup(found: bool) -> Result<u32> {
            if found {
                Ok(1)
            } else {
                Err(CloakError::not_found("missing"))
            }
        }
        assert_eq!(lookup(true).unwrap(), 1);
        assert!(lookup(false).is_err());
    }
}
