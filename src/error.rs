/// Errors raised while assembling or running a teleoperation world.
#[derive(Debug, thiserror::Error)]
pub enum WaldoError {
    #[error("broadcast connection for '{signal}' has no receivers")]
    NoReceivers { signal: String },

    #[error("no signal named '{name}' has been registered")]
    UnknownSignal { name: String },

    #[error("signal '{name}' is already registered")]
    DuplicateSignal { name: String },

    #[error("background system '{system}' failed")]
    Background {
        system: String,
        #[source]
        source: Box<WaldoError>,
    },

    #[error("control system fault: {0}")]
    Fault(String),
}
