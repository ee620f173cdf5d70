// ═══════════════════════════════════════════════════════════════════
// Error Tests: CoreError variants, user messages, HTTP status mapping
// ═══════════════════════════════════════════════════════════════════

use budget_tracker_core::api::http::{authorization_value, error_for_status};
use budget_tracker_core::errors::{CoreError, GENERIC_FAILURE};
use reqwest::StatusCode;

// ── Display formatting ──────────────────────────────────────────────

mod display {
    use super::*;

    #[test]
    fn validation() {
        let err = CoreError::Validation("Please enter category".into());
        assert_eq!(err.to_string(), "Validation failed: Please enter category");
    }

    #[test]
    fn invalid_credentials() {
        assert_eq!(CoreError::InvalidCredentials.to_string(), "Invalid credentials");
    }

    #[test]
    fn api_with_detail() {
        let err = CoreError::Api {
            status: 400,
            detail: Some("Amount too large".into()),
        };
        assert_eq!(err.to_string(), "API error (400): Amount too large");
    }

    #[test]
    fn api_without_detail() {
        let err = CoreError::Api {
            status: 502,
            detail: None,
        };
        assert_eq!(err.to_string(), "API error (502): no detail");
    }

    #[test]
    fn unsupported_version() {
        assert_eq!(
            CoreError::UnsupportedVersion(7).to_string(),
            "Unsupported file version: 7"
        );
    }

    #[test]
    fn busy() {
        assert_eq!(CoreError::Busy.to_string(), "Another change is still being saved");
    }
}

// ── Classification ──────────────────────────────────────────────────

mod classification {
    use super::*;

    #[test]
    fn only_auth_ends_sessions() {
        assert!(CoreError::Auth("Invalid token.".into()).is_auth());
        assert!(!CoreError::InvalidCredentials.is_auth());
        assert!(!CoreError::NotFound(String::new()).is_auth());
        assert!(!CoreError::Api { status: 500, detail: None }.is_auth());
    }

    #[test]
    fn not_found() {
        assert!(CoreError::NotFound("gone".into()).is_not_found());
        assert!(!CoreError::Api { status: 404, detail: None }.is_not_found());
    }

    #[test]
    fn validation() {
        assert!(CoreError::Validation("x".into()).is_validation());
        assert!(!CoreError::Config("x".into()).is_validation());
    }
}

// ── User-facing messages ────────────────────────────────────────────

mod user_message {
    use super::*;

    #[test]
    fn server_detail_is_shown_verbatim() {
        let err = CoreError::Api {
            status: 400,
            detail: Some("Category does not exist".into()),
        };
        assert_eq!(err.user_message(), "Category does not exist");
    }

    #[test]
    fn missing_detail_falls_back_to_generic() {
        let err = CoreError::Api {
            status: 500,
            detail: None,
        };
        assert_eq!(err.user_message(), GENERIC_FAILURE);
        assert_eq!(err.user_message(), "Something went wrong");
    }

    #[test]
    fn network_errors_are_generic() {
        let err = CoreError::Network("connection refused".into());
        assert_eq!(err.user_message(), GENERIC_FAILURE);
    }

    #[test]
    fn empty_not_found_is_generic() {
        assert_eq!(CoreError::NotFound(String::new()).user_message(), GENERIC_FAILURE);
    }

    #[test]
    fn not_found_detail_is_shown() {
        let err = CoreError::NotFound("No Transaction matches the given query.".into());
        assert_eq!(err.user_message(), "No Transaction matches the given query.");
    }

    #[test]
    fn validation_message_has_no_prefix() {
        let err = CoreError::Validation("Please enter amount".into());
        assert_eq!(err.user_message(), "Please enter amount");
    }

    #[test]
    fn invalid_credentials() {
        assert_eq!(CoreError::InvalidCredentials.user_message(), "Invalid credentials");
    }

    #[test]
    fn storage_errors_are_generic() {
        assert_eq!(CoreError::FileIO("disk full".into()).user_message(), GENERIC_FAILURE);
    }
}

// ── Status mapping ──────────────────────────────────────────────────

mod status_mapping {
    use super::*;

    #[test]
    fn unauthorized_is_auth() {
        let err = error_for_status(StatusCode::UNAUTHORIZED, r#"{"detail":"Invalid token."}"#);
        match err {
            CoreError::Auth(detail) => assert_eq!(detail, "Invalid token."),
            other => panic!("Expected Auth, got {:?}", other),
        }
    }

    #[test]
    fn forbidden_is_auth_even_without_body() {
        let err = error_for_status(StatusCode::FORBIDDEN, "");
        assert!(err.is_auth());
    }

    #[test]
    fn not_found_keeps_detail() {
        let err = error_for_status(StatusCode::NOT_FOUND, r#"{"detail":"Not found."}"#);
        match err {
            CoreError::NotFound(detail) => assert_eq!(detail, "Not found."),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn other_status_becomes_api_error() {
        let err = error_for_status(StatusCode::BAD_REQUEST, r#"{"detail":"Amount is required"}"#);
        match err {
            CoreError::Api { status, detail } => {
                assert_eq!(status, 400);
                assert_eq!(detail.as_deref(), Some("Amount is required"));
            }
            other => panic!("Expected Api, got {:?}", other),
        }
    }

    #[test]
    fn non_json_body_has_no_detail() {
        let err = error_for_status(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>");
        match err {
            CoreError::Api { status, detail } => {
                assert_eq!(status, 500);
                assert!(detail.is_none());
            }
            other => panic!("Expected Api, got {:?}", other),
        }
    }

    #[test]
    fn blank_detail_is_ignored() {
        let err = error_for_status(StatusCode::BAD_REQUEST, r#"{"detail":"   "}"#);
        assert_eq!(err.user_message(), GENERIC_FAILURE);
    }

    #[test]
    fn authorization_header_uses_token_scheme() {
        assert_eq!(authorization_value("abc123"), "Token abc123");
    }
}

// ── From impls ──────────────────────────────────────────────────────

mod from_impls {
    use super::*;

    #[test]
    fn from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let core_err: CoreError = io_err.into();
        match &core_err {
            CoreError::FileIO(msg) => assert!(msg.contains("access denied")),
            other => panic!("Expected FileIO, got {:?}", other),
        }
    }

    #[test]
    fn from_bincode_error() {
        let bad_data: &[u8] = &[0xFF, 0xFF, 0xFF, 0xFF];
        let result: Result<String, _> = bincode::deserialize(bad_data);
        let core_err: CoreError = result.unwrap_err().into();
        assert!(matches!(core_err, CoreError::Serialization(_)));
    }

    #[test]
    fn from_serde_json_error() {
        let result: Result<String, _> = serde_json::from_str("{{invalid json");
        let core_err: CoreError = result.unwrap_err().into();
        assert!(matches!(core_err, CoreError::Deserialization(_)));
    }

    #[test]
    fn implements_std_error() {
        fn assert_error<E: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<CoreError>();
    }
}
