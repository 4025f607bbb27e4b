//! Response status validation
//!
//! Runs before decoding, so an error body from a non-2xx response never
//! reaches the decoder and is never reported as a decode failure.

use crate::{
    constants::{FALLBACK_STATUS_CODE, SUCCESS_STATUS_MAX, SUCCESS_STATUS_MIN},
    error::CryptoApiError,
    transport::RawResponse,
};

/// Returns true for statuses in the inclusive success range
pub fn is_success(status: u16) -> bool {
    (SUCCESS_STATUS_MIN..=SUCCESS_STATUS_MAX).contains(&status)
}

/// Accepts the body only if the status is in the success range
///
/// A missing status is treated as a failure with the fallback code.
pub fn validate(status: Option<u16>, body: Vec<u8>) -> Result<Vec<u8>, CryptoApiError> {
    match status {
        Some(code) if is_success(code) => Ok(body),
        Some(code) => Err(CryptoApiError::ResponseError(code)),
        None => Err(CryptoApiError::ResponseError(FALLBACK_STATUS_CODE)),
    }
}

/// Validates a raw response, consuming it
pub fn validate_response(response: RawResponse) -> Result<Vec<u8>, CryptoApiError> {
    validate(response.status, response.body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_range_is_inclusive() {
        assert!(!is_success(199));
        assert!(is_success(200));
        assert!(is_success(204));
        assert!(is_success(299));
        assert!(!is_success(300));
    }

    #[test]
    fn test_every_status_outside_range_is_response_error() {
        for code in (100..600u16).filter(|c| !is_success(*c)) {
            let err = validate(Some(code), b"{}".to_vec()).unwrap_err();
            assert_eq!(err.status_code(), Some(code));
        }
    }

    #[test]
    fn test_success_passes_body_through() {
        let body = validate(Some(200), b"[1,2]".to_vec()).unwrap();
        assert_eq!(body, b"[1,2]");
    }

    #[test]
    fn test_missing_status_uses_fallback() {
        let err = validate_response(RawResponse::without_status("{}")).unwrap_err();
        assert_eq!(err.status_code(), Some(FALLBACK_STATUS_CODE));
    }
}
