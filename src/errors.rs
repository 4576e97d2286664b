/// Failure of a single outbound call to the odds API, carried from the
/// client back to the handler that converts it into a JSON error envelope.
#[derive(Debug)]
pub struct UpstreamError {
    pub message: String,
}

impl UpstreamError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
