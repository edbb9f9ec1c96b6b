//! fleetcap-source: Device telemetry source abstraction
//!
//! Provides the session traits the capacity pipeline consumes, the telemetry document types,
//! credential providers, and capture/command/recording source implementations.

pub mod capture;
pub mod command;
pub mod credentials;
pub mod error;
pub mod recorder;
pub mod traits;
pub mod types;

pub use capture::CaptureSource;
pub use command::CommandSource;
pub use credentials::{CredentialProvider, Credentials, EnvCredentials, StaticCredentials};
pub use error::SourceError;
pub use recorder::RecordingSource;
pub use traits::{DeviceSession, TelemetrySource};
