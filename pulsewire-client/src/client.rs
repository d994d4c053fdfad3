//! High-level client API.

use crate::error::ClientError;
use crate::transport::Transport;
use bytes::Bytes;
use pulsewire_protocol::{decode_all, decode_one, CVolume, Command, Sink, SinkInput, SinkSelector};
use tokio::sync::Mutex;

/// High-level client for the sink introspection and control commands.
///
/// The transport sits behind one mutex; a request and its reply are
/// exchanged under a single lock acquisition, so concurrent callers never
/// see each other's replies. Wrap the client in an `Arc` to share it.
pub struct Client<T> {
    transport: Mutex<T>,
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport: Mutex::new(transport),
        }
    }

    /// Returns the transport.
    pub fn into_inner(self) -> T {
        self.transport.into_inner()
    }

    // =========================================================================
    // Helper methods
    // =========================================================================

    /// Sends `command` and returns the raw reply body.
    pub async fn request(&self, command: &Command) -> Result<Bytes, ClientError> {
        let args = command.encode_args()?;
        let tag = command.tag();

        let mut transport = self.transport.lock().await;
        transport.send(tag, args).await?;
        let body = transport.receive().await?;
        drop(transport);

        tracing::debug!("{} answered with {} bytes", tag, body.len());
        Ok(body)
    }

    async fn execute(&self, command: Command) -> Result<(), ClientError> {
        self.request(&command).await?;
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Lists all sinks.
    pub async fn sinks(&self) -> Result<Vec<Sink>, ClientError> {
        let body = self.request(&Command::GetSinkInfoList).await?;
        Ok(decode_all(body)?)
    }

    /// Lists all sink inputs.
    pub async fn sink_inputs(&self) -> Result<Vec<SinkInput>, ClientError> {
        let body = self.request(&Command::GetSinkInputInfoList).await?;
        Ok(decode_all(body)?)
    }

    /// Gets one sink by index or name.
    pub async fn sink(&self, sink: impl Into<SinkSelector>) -> Result<Sink, ClientError> {
        let command = Command::GetSinkInfo { sink: sink.into() };
        let body = self.request(&command).await?;
        Ok(decode_one(body)?)
    }

    /// Gets one sink input.
    pub async fn sink_input(&self, index: u32) -> Result<SinkInput, ClientError> {
        let body = self.request(&Command::GetSinkInputInfo { index }).await?;
        Ok(decode_one(body)?)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub async fn set_default_sink(&self, name: &str) -> Result<(), ClientError> {
        self.execute(Command::SetDefaultSink {
            name: name.to_string(),
        })
        .await
    }

    /// Switches the active port of the sink named `sink`.
    pub async fn set_sink_port(&self, sink: &str, port: &str) -> Result<(), ClientError> {
        self.execute(Command::SetSinkPort {
            sink: sink.to_string(),
            port: port.to_string(),
        })
        .await
    }

    /// Moves a sink input to the sink named `sink`.
    pub async fn move_sink_input(&self, index: u32, sink: &str) -> Result<(), ClientError> {
        self.execute(Command::MoveSinkInput {
            index,
            sink: sink.to_string(),
        })
        .await
    }

    pub async fn set_sink_mute(
        &self,
        sink: impl Into<SinkSelector>,
        mute: bool,
    ) -> Result<(), ClientError> {
        self.execute(Command::SetSinkMute {
            sink: sink.into(),
            mute,
        })
        .await
    }

    pub async fn set_sink_input_mute(&self, index: u32, mute: bool) -> Result<(), ClientError> {
        self.execute(Command::SetSinkInputMute { index, mute }).await
    }

    pub async fn set_sink_volume(
        &self,
        sink: impl Into<SinkSelector>,
        volume: CVolume,
    ) -> Result<(), ClientError> {
        self.execute(Command::SetSinkVolume {
            sink: sink.into(),
            volume,
        })
        .await
    }

    pub async fn set_sink_input_volume(
        &self,
        index: u32,
        volume: CVolume,
    ) -> Result<(), ClientError> {
        self.execute(Command::SetSinkInputVolume { index, volume })
            .await
    }

    pub async fn kill_sink_input(&self, index: u32) -> Result<(), ClientError> {
        self.execute(Command::KillSinkInput { index }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Connection;
    use crate::test_util::init_tracing;
    use pulsewire_protocol::{
        encode, ChannelMap, CommandTag, Decoder, Encoder, ErrorCode, FormatInfo, Props,
        Response, SampleSpec, SinkPorts, TagStructWriter, Volume,
    };
    use std::collections::VecDeque;
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    /// Records sent commands and replays canned replies.
    #[derive(Default)]
    struct MockTransport {
        sent: Vec<(CommandTag, Bytes)>,
        replies: VecDeque<Result<Bytes, ClientError>>,
    }

    impl MockTransport {
        fn with_replies(replies: impl IntoIterator<Item = Result<Bytes, ClientError>>) -> Self {
            Self {
                sent: Vec::new(),
                replies: replies.into_iter().collect(),
            }
        }
    }

    impl Transport for MockTransport {
        async fn send(&mut self, command: CommandTag, args: Bytes) -> Result<(), ClientError> {
            self.sent.push((command, args));
            Ok(())
        }

        async fn receive(&mut self) -> Result<Bytes, ClientError> {
            self.replies
                .pop_front()
                .unwrap_or(Err(ClientError::ConnectionClosed))
        }
    }

    fn sink(index: u32, name: &str) -> Sink {
        Sink {
            index,
            name: name.to_string(),
            description: Some(format!("{} output", name)),
            sample_spec: SampleSpec {
                format: 3,
                channels: 2,
                rate: 44100,
            },
            channel_map: ChannelMap::stereo(),
            volume: CVolume::uniform(2, Volume::NORM),
            monitor_source_name: Some(format!("{}.monitor", name)),
            driver: Some("module-null-sink.c".to_string()),
            base_volume: Volume::NORM,
            ports: SinkPorts::Absent,
            formats: vec![FormatInfo::pcm()],
            ..Default::default()
        }
    }

    fn sink_input(index: u32, sink: u32) -> SinkInput {
        SinkInput {
            index,
            name: Some("playback".to_string()),
            sink,
            sample_spec: SampleSpec {
                format: 3,
                channels: 2,
                rate: 44100,
            },
            channel_map: ChannelMap::stereo(),
            volume: CVolume::uniform(2, Volume::NORM),
            resample_method: None,
            driver: Some("protocol-native.c".to_string()),
            props: Props::new(),
            format: FormatInfo::pcm(),
            ..Default::default()
        }
    }

    fn concat<T: pulsewire_protocol::TagStructWrite>(items: &[T]) -> Bytes {
        let mut w = TagStructWriter::new();
        for item in items {
            w.write(item).unwrap();
        }
        w.freeze()
    }

    #[tokio::test]
    async fn test_sinks_list() {
        init_tracing();
        let body = concat(&[sink(0, "speakers"), sink(1, "hdmi")]);
        let client = Client::new(MockTransport::with_replies([Ok(body)]));

        let sinks = client.sinks().await.unwrap();
        assert_eq!(sinks.len(), 2);
        assert_eq!(sinks[1].name, "hdmi");

        let transport = client.into_inner();
        assert_eq!(transport.sent.len(), 1);
        assert_eq!(transport.sent[0].0, CommandTag::GetSinkInfoList);
        assert!(transport.sent[0].1.is_empty());
    }

    #[tokio::test]
    async fn test_empty_list() {
        let client = Client::new(MockTransport::with_replies([Ok(Bytes::new())]));
        assert!(client.sink_inputs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sink_inputs_list() {
        let body = concat(&[sink_input(3, 0), sink_input(4, 1)]);
        let client = Client::new(MockTransport::with_replies([Ok(body)]));

        let inputs = client.sink_inputs().await.unwrap();
        let sinks: Vec<u32> = inputs.iter().map(|input| input.sink).collect();
        assert_eq!(sinks, vec![0, 1]);
    }

    #[tokio::test]
    async fn test_single_sink_by_name() {
        let body = encode(&sink(2, "usb")).unwrap();
        let client = Client::new(MockTransport::with_replies([Ok(body)]));

        let found = client.sink("usb").await.unwrap();
        assert_eq!(found.index, 2);

        let transport = client.into_inner();
        assert_eq!(transport.sent[0].0, CommandTag::GetSinkInfo);
        assert_eq!(transport.sent[0].1.as_ref(), b"L\xff\xff\xff\xfftusb\0");
    }

    #[tokio::test]
    async fn test_single_record_rejects_trailing_bytes() {
        let mut body = encode(&sink_input(1, 0)).unwrap().to_vec();
        body.push(b'N');
        let client = Client::new(MockTransport::with_replies([Ok(Bytes::from(body))]));

        let err = client.sink_input(1).await.unwrap_err();
        assert!(matches!(err, ClientError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_truncated_list_is_error() {
        let body = concat(&[sink(0, "speakers")]);
        let cut = body.slice(..body.len() - 3);
        let client = Client::new(MockTransport::with_replies([Ok(cut)]));

        match client.sinks().await {
            Err(ClientError::Protocol(err)) => assert!(err.is_truncated()),
            other => panic!("expected truncation, got {:?}", other.map(|s| s.len())),
        }
    }

    #[tokio::test]
    async fn test_mutations_send_expected_args() {
        let client = Client::new(MockTransport::with_replies(
            std::iter::repeat_with(|| Ok(Bytes::new())).take(8),
        ));

        client.set_default_sink("hdmi").await.unwrap();
        client.set_sink_port("analog-output", "headphones").await.unwrap();
        client.move_sink_input(7, "hdmi").await.unwrap();
        client.set_sink_mute(1u32, true).await.unwrap();
        client.set_sink_input_mute(7, false).await.unwrap();
        client
            .set_sink_volume("hdmi", CVolume::uniform(2, Volume::NORM))
            .await
            .unwrap();
        client
            .set_sink_input_volume(7, CVolume::uniform(1, Volume::MUTED))
            .await
            .unwrap();
        client.kill_sink_input(7).await.unwrap();

        let sent = client.into_inner().sent;
        let tags: Vec<CommandTag> = sent.iter().map(|(tag, _)| *tag).collect();
        assert_eq!(
            tags,
            vec![
                CommandTag::SetDefaultSink,
                CommandTag::SetSinkPort,
                CommandTag::MoveSinkInput,
                CommandTag::SetSinkMute,
                CommandTag::SetSinkInputMute,
                CommandTag::SetSinkVolume,
                CommandTag::SetSinkInputVolume,
                CommandTag::KillSinkInput,
            ]
        );
        assert_eq!(
            sent[1].1.as_ref(),
            b"L\xff\xff\xff\xfftanalog-output\0theadphones\0"
        );
        assert_eq!(sent[3].1.as_ref(), b"L\x00\x00\x00\x01N1");
        assert_eq!(sent[7].1.as_ref(), b"L\x00\x00\x00\x07");
    }

    #[tokio::test]
    async fn test_mutation_ignores_body() {
        let client = Client::new(MockTransport::with_replies([Ok(Bytes::from_static(
            b"unexpected",
        ))]));
        client.kill_sink_input(1).await.unwrap();
    }

    #[tokio::test]
    async fn test_server_error_surfaces() {
        let client = Client::new(MockTransport::with_replies([Err(ClientError::Server(
            ErrorCode::NoEntity,
        ))]));
        let err = client.set_default_sink("missing").await.unwrap_err();
        assert_eq!(err.server_code(), Some(ErrorCode::NoEntity));
    }

    #[tokio::test]
    async fn test_invalid_argument_not_sent() {
        let client = Client::new(MockTransport::default());
        let err = client.set_default_sink("bad\0name").await.unwrap_err();
        assert!(matches!(err, ClientError::Protocol(_)));
        assert!(client.into_inner().sent.is_empty());
    }

    /// Answers every request on the server side of a duplex pipe with the
    /// index of the sink named in the request.
    async fn serve(mut stream: tokio::io::DuplexStream, requests: usize) {
        let mut decoder = Decoder::new();
        let mut buf = vec![0u8; 1024];
        let mut served = 0;
        while served < requests {
            let n = stream.read(&mut buf).await.unwrap();
            assert!(n > 0, "client hung up early");
            decoder.extend(&buf[..n]);

            while let Some(request) = decoder.decode_request().unwrap() {
                let index = request.sequence;
                let mut body = TagStructWriter::new();
                body.write(&sink(index, &format!("sink-{}", index))).unwrap();
                let reply = Response::reply(request.sequence, body.freeze());
                stream
                    .write_all(&Encoder::encode_response(&reply).unwrap())
                    .await
                    .unwrap();
                served += 1;
            }
        }
    }

    #[tokio::test]
    async fn test_concurrent_callers_get_their_own_replies() {
        init_tracing();
        let (client_side, server_side) = tokio::io::duplex(4096);
        let server = tokio::spawn(serve(server_side, 16));

        let client = Arc::new(Client::new(Connection::new(client_side)));
        let mut tasks = Vec::new();
        for _ in 0..16 {
            let client = client.clone();
            tasks.push(tokio::spawn(async move {
                let found = client.sink(0u32).await.unwrap();
                assert_eq!(found.name, format!("sink-{}", found.index));
                found.index
            }));
        }

        let mut indices = Vec::new();
        for task in tasks {
            indices.push(task.await.unwrap());
        }
        indices.sort_unstable();
        assert_eq!(indices, (0..16).collect::<Vec<u32>>());

        server.await.unwrap();
    }
}
