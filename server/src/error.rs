use std::fmt;

use crate::session::ConnId;

/// Faults the server distinguishes. Only `BindFailure` and `InvalidConfig`
/// stop the process; everything else is logged and play goes on.
#[derive(Debug)]
pub enum ServerError {
    /// Both seats taken; the connection gets `full` and is closed.
    SeatUnavailable,
    /// Message from a connection that holds no seat; dropped.
    UnassignedSender(ConnId),
    /// Connection went away; its seat is released.
    TransportDisconnect(ConnId),
    BindFailure { addr: String, source: std::io::Error },
    InvalidConfig(String),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SeatUnavailable => write!(f, "room full"),
            Self::UnassignedSender(id) => write!(f, "connection {id} holds no seat"),
            Self::TransportDisconnect(id) => write!(f, "connection {id} disconnected"),
            Self::BindFailure { addr, source } => {
                write!(f, "failed to bind {addr}: {source}")?;
                if source.kind() == std::io::ErrorKind::AddrInUse {
                    write!(
                        f,
                        " (another instance may be running; stop it or choose a different PORT)"
                    )?;
                }
                Ok(())
            }
            Self::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::BindFailure { source, .. } => Some(source),
            _ => None,
        }
    }
}
