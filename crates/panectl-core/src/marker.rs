//! Sentinel markers echoed around a command to delimit its output.

use uuid::Uuid;

/// Hex characters appended to each marker prefix.
pub const SUFFIX_LEN: usize = 8;

/// Marker flavours. The primary strategy uses `Start`/`End`; the fallback
/// uses `Clear`/`FallbackEnd` so its markers never collide with a stale
/// primary marker left in the scrollback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    Start,
    End,
    Clear,
    FallbackEnd,
}

/// A probabilistically unique token, generated per call and never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Marker {
    token: String,
    kind: MarkerKind,
}

impl Marker {
    pub fn generate(kind: MarkerKind) -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        let suffix = &hex[..SUFFIX_LEN];
        let token = match kind {
            MarkerKind::Start => format!("CMDSTART{suffix}"),
            MarkerKind::End => format!("CMDEND{suffix}"),
            MarkerKind::Clear => format!("__CLEAR_{suffix}__"),
            MarkerKind::FallbackEnd => format!("__END_{suffix}__"),
        };
        Self { token, kind }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Shell line that prints the token on a line of its own.
    pub fn echo_command(&self) -> String {
        match self.kind {
            MarkerKind::Start | MarkerKind::End => format!("echo '{}'", self.token),
            MarkerKind::Clear | MarkerKind::FallbackEnd => format!("echo \"{}\"", self.token),
        }
    }
}
