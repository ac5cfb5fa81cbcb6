/// Role a codec can be started in. Encode and decode are mutually
/// exclusive on a single unit instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecRole {
    Encode,
    Decode,
}

/// Media unit state machine.
///
/// State transitions:
/// ```text
/// idle → encoding → idle
/// idle → decoding → idle
/// ```
/// Idle is both the initial state and the terminal state after stop.
/// Switching roles passes through a full teardown of the previous role's
/// wiring before the next role is established.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    Idle,
    Encoding,
    Decoding,
}

impl UnitState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_encoding(&self) -> bool {
        matches!(self, Self::Encoding)
    }

    pub fn is_decoding(&self) -> bool {
        matches!(self, Self::Decoding)
    }
}
