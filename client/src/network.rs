use crate::clock::SystemClock;
use crate::config::Tuning;
use crate::error::ClientError;
use crate::events::LogSink;
use crate::game::{FrameView, RenderSurface};
use crate::input::InputSource;
use crate::session::{Session, SessionEvent, Transport};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use std::ops::ControlFlow;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Frame interval of the local simulation.
const TICK_INTERVAL: Duration = Duration::from_millis(16);

/// Queues packets for the writer task.
impl Transport for UnboundedSender<Vec<u8>> {
    fn send(&mut self, packet: Vec<u8>) -> Result<(), ClientError> {
        UnboundedSender::send(self, packet)
            .map_err(|_| ClientError::Transport("connection writer has stopped".to_string()))
    }
}

/// What the headless client does once connected.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub server_url: String,
    pub name: String,
    /// Room to join. A new room is created when absent.
    pub room: Option<String>,
    pub fake_ping_ms: u64,
    /// Bots the host adds before starting.
    pub bots: u8,
    /// Start the match (and restart it after a reset) when hosting.
    pub auto_start: bool,
    pub input: InputSource,
    pub tuning: Tuning,
}

/// Logs the match timer whenever it changes.
#[derive(Debug, Default)]
pub struct LogRenderer {
    last_timer: String,
}

impl RenderSurface for LogRenderer {
    fn present(&mut self, frame: &FrameView<'_>) {
        let timer = frame.phase.timer_text();
        if timer != self.last_timer {
            debug!("{} scores {:?}", timer, frame.scores);
            self.last_timer = timer;
        }
    }
}

pub struct Client {
    session: Session<UnboundedSender<Vec<u8>>, SystemClock>,
    reader: SplitStream<Socket>,
    writer: JoinHandle<()>,
    options: ClientOptions,
    renderer: LogRenderer,
    events: LogSink,
}

impl Client {
    pub async fn connect(options: ClientOptions) -> Result<Self, ClientError> {
        info!("Connecting to {}...", options.server_url);
        let (socket, _) = connect_async(options.server_url.as_str())
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let (sink, reader) = socket.split();
        let (tx, rx) = unbounded_channel();
        let writer = tokio::spawn(write_packets(sink, rx, options.fake_ping_ms));

        Ok(Client {
            session: Session::new(tx, SystemClock::new(), &options.name, options.tuning),
            reader,
            writer,
            options,
                    renderer: LogRenderer::default(),
            events: LogSink,
        })
    }

    /// Plays until the server closes the connection, an error occurs or Ctrl-C.
    pub async fn run(mut self) -> Result<(), ClientError> {
        let result = self.event_loop().await;
        if let Err(e) = &result {
            error!("Connection lost: {}", e);
        }

        if let Err(e) = self.session.leave_room() {
            debug!("Could not send leave: {}", e);
        }
        drop(self.session);
        if let Err(e) = self.writer.await {
            warn!("Writer task failed: {}", e);
        }

        result
    }

    async fn event_loop(&mut self) -> Result<(), ClientError> {
        self.session.login()?;

        let mut tick_interval = interval(TICK_INTERVAL);
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                message = self.reader.next() => {
                    match message {
                        Some(Ok(Message::Binary(data))) => {
                            if self.options.fake_ping_ms > 0 {
                                sleep(Duration::from_millis(self.options.fake_ping_ms / 2)).await;
                            }
                            if self.handle_packet(&data)?.is_break() {
                                return Ok(());
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            info!("Server closed the connection");
                            return Ok(());
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => return Err(ClientError::Transport(e.to_string())),
                    }
                },

                _ = tick_interval.tick() => {
                    self.on_tick()?;
                },

                _ = &mut shutdown => {
                    info!("Interrupted, disconnecting");
                    return Ok(());
                },
            }
        }
    }

    fn on_tick(&mut self) -> Result<(), ClientError> {
        let input = self.options.input;
        let Some(target) = self.session.game().map(|game| input.target(game)) else {
            return Ok(());
        };
        self.session.tick(target, &mut self.events)?;

        if let Some(game) = self.session.game() {
            self.renderer.present(&game.frame());
        }
        Ok(())
    }

    fn handle_packet(&mut self, data: &[u8]) -> Result<ControlFlow<()>, ClientError> {
        let event = self.session.handle_packet(data, &mut self.events)?;

        match event {
            SessionEvent::LoggedIn => {
                self.session.list_rooms()?;
                match self.options.room.clone() {
                    Some(room) => self.session.join_room(&room)?,
                    None => self.session.create_room()?,
                }
            }
            SessionEvent::RoomList(list) => {
                info!(
                    "Ping {}ms, {} rooms open, {} playing",
                    self.session.clock_sync().ping(),
                    list.rooms.len(),
                    list.playing_count
                );
            }
            SessionEvent::RoomCreated(room_id) => {
                info!("Others can join with --room {}", room_id);
                self.prepare_match()?;
            }
            SessionEvent::JoinedRoom => self.prepare_match()?,
            SessionEvent::MatchReset => {
                if self.is_host() && self.options.auto_start {
                    self.session.start_match()?;
                }
            }
            SessionEvent::NameRejected => {
                error!("Names may only contain letters, digits and spaces");
                return Ok(ControlFlow::Break(()));
            }
            SessionEvent::RoomJoinFailed | SessionEvent::TooManyRooms => {
                return Ok(ControlFlow::Break(()));
            }
            _ => {}
        }

        Ok(ControlFlow::Continue(()))
    }

    fn is_host(&self) -> bool {
        self.session.room().is_some_and(|room| room.is_host())
    }

    fn prepare_match(&mut self) -> Result<(), ClientError> {
        if !self.is_host() {
            return Ok(());
        }
        for _ in 0..self.options.bots {
            self.session.add_bot()?;
        }
        if self.options.auto_start {
            info!("Starting match with {} bot(s)", self.options.bots);
            self.session.start_match()?;
        }
        Ok(())
    }
}

async fn write_packets(
    mut sink: SplitSink<Socket, Message>,
    mut packets: UnboundedReceiver<Vec<u8>>,
    fake_ping_ms: u64,
) {
    while let Some(packet) = packets.recv().await {
        if fake_ping_ms > 0 {
            sleep(Duration::from_millis(fake_ping_ms / 2)).await;
        }
        if let Err(e) = sink.send(Message::Binary(packet)).await {
            error!("Error sending packet: {}", e);
            return;
        }
    }
    if let Err(e) = sink.close().await {
        debug!("Error closing socket: {}", e);
    }
}
