/// Display bucket of an HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    None,
    Success,
    Redirect,
    ClientError,
    ServerError,
}

/// Bucket a status for display. Anything outside 2xx-4xx, 1xx included,
/// is shown as a server error.
pub fn classify(status: Option<u16>) -> StatusClass {
    match status {
        None => StatusClass::None,
        Some(200..=299) => StatusClass::Success,
        Some(300..=399) => StatusClass::Redirect,
        Some(400..=499) => StatusClass::ClientError,
        Some(_) => StatusClass::ServerError,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_should_respect_boundaries() {
        assert_eq!(classify(None), StatusClass::None);
        assert_eq!(classify(Some(200)), StatusClass::Success);
        assert_eq!(classify(Some(299)), StatusClass::Success);
        assert_eq!(classify(Some(300)), StatusClass::Redirect);
        assert_eq!(classify(Some(399)), StatusClass::Redirect);
        assert_eq!(classify(Some(400)), StatusClass::ClientError);
        assert_eq!(classify(Some(499)), StatusClass::ClientError);
        assert_eq!(classify(Some(500)), StatusClass::ServerError);
        assert_eq!(classify(Some(101)), StatusClass::ServerError);
    }

    #[test]
    fn classify_should_be_pure() {
        for code in [None, Some(0), Some(204), Some(302), Some(418), Some(599), Some(u16::MAX)] {
            assert_eq!(classify(code), classify(code));
        }
    }
}
