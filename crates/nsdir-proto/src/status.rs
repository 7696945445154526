/// Status field written at the start of every response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseStatus {
    /// The lookup ran; zero or more entries follow.
    Success,
    /// The lookup ran and matched nothing.
    NotFound,
    /// The directory could not be reached; retrying later may succeed.
    Unavailable,
    /// The request frame was malformed or oversized.
    ProtocolViolation,
    /// The request code is not registered.
    UnknownRequest,
    /// The daemon failed for reasons unrelated to the request.
    Internal,
}

impl ResponseStatus {
    /// Raw wire value.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::NotFound => 1,
            Self::Unavailable => 2,
            Self::ProtocolViolation => 3,
            Self::UnknownRequest => 4,
            Self::Internal => 5,
        }
    }

    /// Decodes a raw status. Returns `None` for unknown values.
    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::NotFound),
            2 => Some(Self::Unavailable),
            3 => Some(Self::ProtocolViolation),
            4 => Some(Self::UnknownRequest),
            5 => Some(Self::Internal),
            _ => None,
        }
    }
}
