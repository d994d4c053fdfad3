//! pulsewire - a client for the PulseAudio native protocol.
//!
//! The [`protocol`] crate holds the synchronous codec: tagstruct values,
//! sink and sink-input records, commands and packet framing. The
//! [`client`] crate layers request/reply transactions on top of any
//! authenticated byte stream.
//!
//! ```no_run
//! use pulsewire::client::{Client, Connection};
//!
//! # async fn run(stream: tokio::net::UnixStream) -> Result<(), pulsewire::client::ClientError> {
//! let client = Client::new(Connection::new(stream));
//! for sink in client.sinks().await? {
//!     println!("{} {}", sink.index, sink.device_description());
//! }
//! # Ok(())
//! # }
//! ```

pub use pulsewire_client as client;
pub use pulsewire_protocol as protocol;

pub use pulsewire_client::{Client, ClientError, Connection, ConnectionConfig, Transport};
pub use pulsewire_protocol::{Command, ProtocolError, Sink, SinkInput};
