//! Connection lifecycle: login, lobby, room and match
//!
//! [`Session`] owns everything that lives longer than one match (the player
//! name, the round-trip estimate, the room roster) and routes every inbound
//! packet to the part of the client that handles it. It never touches a
//! socket itself; outgoing bytes go through a [`Transport`].

use crate::clock::{Clock, ClockSync};
use crate::config::Tuning;
use crate::error::ClientError;
use crate::events::EventSink;
use crate::game::Match;
use log::{debug, info, warn};
use serde::Serialize;
use shared::protocol::{
    self, JoinedRoom, LobbyRequest, LoginRequest, MoveUpdate, RoomList, RoomPlayer, RoomRequest,
    RoomSettings,
};
use shared::{ClientId, ServerMessage};
use std::mem;

/// Outgoing half of a connection.
pub trait Transport {
    fn send(&mut self, packet: Vec<u8>) -> Result<(), ClientError>;
}

/// Collects packets instead of sending them.
impl Transport for Vec<Vec<u8>> {
    fn send(&mut self, packet: Vec<u8>) -> Result<(), ClientError> {
        self.push(packet);
        Ok(())
    }
}

/// The room the local player is in.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomState {
    pub client_id: ClientId,
    pub host_id: ClientId,
    pub players: Vec<RoomPlayer>,
    pub settings: RoomSettings,
}

impl RoomState {
    pub fn is_host(&self) -> bool {
        self.client_id == self.host_id
    }

    fn from_joined(joined: JoinedRoom, name: &str) -> Self {
        let mut players = joined.players;
        players.push(RoomPlayer {
            client_id: joined.client_id,
            name: name.to_string(),
        });
        Self {
            client_id: joined.client_id,
            host_id: joined.host_id,
            players,
            settings: joined.settings,
        }
    }

    /// The creator of a room is always client 0 and its host.
    fn created(name: &str) -> Self {
        Self {
            client_id: 0,
            host_id: 0,
            players: vec![RoomPlayer {
                client_id: 0,
                name: name.to_string(),
            }],
            settings: RoomSettings::default(),
        }
    }
}

#[derive(Debug)]
pub enum SessionState {
    LoggingIn,
    Lobby,
    InRoom(RoomState),
    Playing { room: RoomState, game: Box<Match> },
}

/// What an inbound packet did, for the driver to react to.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    LoggedIn,
    NameRejected,
    RoomList(RoomList),
    RoomCreated(String),
    JoinedRoom,
    RoomJoinFailed,
    TooManyRooms,
    PlayerJoined(RoomPlayer),
    PlayerLeft(ClientId),
    SettingsChanged(RoomSettings),
    MatchStarted,
    MatchReset,
    Synced,
    /// The packet does not apply to the current state.
    Ignored,
}

pub struct Session<T: Transport, C: Clock> {
    transport: T,
    clock: C,
    name: String,
    tuning: Tuning,
    clock_sync: ClockSync,
    state: SessionState,
    login_sent_at: Option<f64>,
    list_sent_at: Option<f64>,
}

impl<T: Transport, C: Clock> Session<T, C> {
    pub fn new(transport: T, clock: C, name: &str, tuning: Tuning) -> Self {
        Self {
            transport,
            clock,
            name: name.to_string(),
            clock_sync: ClockSync::new(&tuning),
            tuning,
            state: SessionState::LoggingIn,
            login_sent_at: None,
            list_sent_at: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn clock_sync(&self) -> &ClockSync {
        &self.clock_sync
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn room(&self) -> Option<&RoomState> {
        match &self.state {
            SessionState::InRoom(room) | SessionState::Playing { room, .. } => Some(room),
            _ => None,
        }
    }

    pub fn game(&self) -> Option<&Match> {
        match &self.state {
            SessionState::Playing { game, .. } => Some(game.as_ref()),
            _ => None,
        }
    }

    fn room_mut(&mut self) -> Option<&mut RoomState> {
        match &mut self.state {
            SessionState::InRoom(room) | SessionState::Playing { room, .. } => Some(room),
            _ => None,
        }
    }

    fn send_request<M: Serialize>(&mut self, request: &M) -> Result<(), ClientError> {
        let packet = protocol::encode(request)?;
        self.transport.send(packet)
    }

    fn send_room_request(&mut self, request: RoomRequest) -> Result<(), ClientError> {
        let packet = request.encode()?;
        self.transport.send(packet)
    }

    pub fn login(&mut self) -> Result<(), ClientError> {
        info!("Logging in as {}", self.name);
        self.login_sent_at = Some(self.clock.now_ms());
        let request = LoginRequest::new(&self.name);
        self.send_request(&request)
    }

    pub fn list_rooms(&mut self) -> Result<(), ClientError> {
        self.list_sent_at = Some(self.clock.now_ms());
        self.send_request(&LobbyRequest::ListRooms)
    }

    pub fn create_room(&mut self) -> Result<(), ClientError> {
        self.send_request(&LobbyRequest::CreateRoom)
    }

    pub fn join_room(&mut self, room_id: &str) -> Result<(), ClientError> {
        info!("Joining room {}", room_id);
        self.send_request(&LobbyRequest::JoinRoom(room_id.to_string()))
    }

    /// Leaves the room (and its match, if one is running).
    pub fn leave_room(&mut self) -> Result<(), ClientError> {
        if self.room().is_none() {
            return Ok(());
        }
        self.state = SessionState::Lobby;
        self.send_room_request(RoomRequest::Leave)
    }

    pub fn start_match(&mut self) -> Result<(), ClientError> {
        self.send_room_request(RoomRequest::Start)
    }

    pub fn update_settings(&mut self, settings: RoomSettings) -> Result<(), ClientError> {
        if let Some(room) = self.room_mut() {
            room.settings = settings;
        }
        self.send_room_request(RoomRequest::UpdateSettings(settings))
    }

    pub fn add_bot(&mut self) -> Result<(), ClientError> {
        self.send_room_request(RoomRequest::AddBot)
    }

    pub fn remove_bot(&mut self) -> Result<(), ClientError> {
        self.send_room_request(RoomRequest::RemoveBot)
    }

    /// Runs one frame of the current match and sends the move packet if one is due.
    pub fn tick(
        &mut self,
        target: f32,
        events: &mut dyn EventSink,
    ) -> Result<Option<MoveUpdate>, ClientError> {
        let now = self.clock.now_ms();
        let SessionState::Playing { game, .. } = &mut self.state else {
            return Ok(None);
        };

        let update = game.tick(now, target, &self.clock_sync, events);
        if let Some(update) = update {
            self.send_room_request(RoomRequest::Move(update))?;
        }
        Ok(update)
    }

    fn observe_reply(&mut self, sent_at: Option<f64>) {
        if let Some(sent_at) = sent_at {
            let rtt = self.clock.now_ms() - sent_at;
            self.clock_sync.observe_rtt(rtt);
        }
    }

    pub fn handle_packet(
        &mut self,
        packet: &[u8],
        events: &mut dyn EventSink,
    ) -> Result<SessionEvent, ClientError> {
        let message = ServerMessage::decode(packet)?;

        let event = match message {
            ServerMessage::Outdated(reason) => return Err(ClientError::Outdated(reason)),

            ServerMessage::Ack => {
                if !matches!(self.state, SessionState::LoggingIn) {
                    return Ok(SessionEvent::Ignored);
                }
                let sent_at = self.login_sent_at.take();
                self.observe_reply(sent_at);
                self.state = SessionState::Lobby;
                info!("Logged in, ping {}ms", self.clock_sync.ping());
                SessionEvent::LoggedIn
            }

            ServerMessage::NameError => {
                warn!("Name {:?} rejected by the server", self.name);
                SessionEvent::NameRejected
            }

            ServerMessage::ListRooms(list) => {
                let sent_at = self.list_sent_at.take();
                self.observe_reply(sent_at);
                debug!(
                    "{} rooms listed, {} playing",
                    list.rooms.len(),
                    list.playing_count
                );
                SessionEvent::RoomList(list)
            }

            ServerMessage::CreatedRoom(room_id) => {
                info!("Created room {}", room_id);
                self.state = SessionState::InRoom(RoomState::created(&self.name));
                SessionEvent::RoomCreated(room_id)
            }

            ServerMessage::JoinedRoom(joined) => {
                info!(
                    "Joined room as client {} with {} other players",
                    joined.client_id,
                    joined.players.len()
                );
                self.state = SessionState::InRoom(RoomState::from_joined(joined, &self.name));
                SessionEvent::JoinedRoom
            }

            ServerMessage::RoomJoinError => {
                warn!("Room does not exist or has already started");
                SessionEvent::RoomJoinFailed
            }

            ServerMessage::TooManyRooms => {
                warn!("Maximum number of rooms per session exceeded");
                SessionEvent::TooManyRooms
            }

            ServerMessage::Join(player) => match self.room_mut() {
                Some(room) => {
                    info!("{} joined the room", player.name);
                    room.players.push(player.clone());
                    SessionEvent::PlayerJoined(player)
                }
                None => SessionEvent::Ignored,
            },

            ServerMessage::Leave(leave) => {
                let Some(room) = self.room_mut() else {
                    return Ok(SessionEvent::Ignored);
                };
                room.players.retain(|p| p.client_id != leave.left_client_id);
                room.host_id = leave.new_host_id;

                if let SessionState::Playing { game, .. } = &mut self.state {
                    game.apply_leave(&leave)?;
                }
                SessionEvent::PlayerLeft(leave.left_client_id)
            }

            ServerMessage::Settings(settings) => match self.room_mut() {
                Some(room) => {
                    debug!("Room settings changed: {:?}", settings);
                    room.settings = settings;
                    SessionEvent::SettingsChanged(settings)
                }
                None => SessionEvent::Ignored,
            },

            ServerMessage::Start(start) => {
                let now = self.clock.now_ms();
                match mem::replace(&mut self.state, SessionState::Lobby) {
                    SessionState::InRoom(room) => {
                        let game = Match::new(
                            room.client_id,
                            &self.name,
                            &room.players,
                            &start,
                            now,
                            &self.clock_sync,
                            &self.tuning,
                        );
                        match game {
                            Ok(game) => {
                                self.state = SessionState::Playing {
                                    room,
                                    game: Box::new(game),
                                };
                                SessionEvent::MatchStarted
                            }
                            Err(err) => {
                                self.state = SessionState::InRoom(room);
                                return Err(err);
                            }
                        }
                    }
                    other => {
                        self.state = other;
                        SessionEvent::Ignored
                    }
                }
            }

            ServerMessage::Sync(sync) => {
                let now = self.clock.now_ms();
                match &mut self.state {
                    SessionState::Playing { game, .. } => {
                        game.apply_sync(&sync, now, &self.clock_sync, events)?;
                        SessionEvent::Synced
                    }
                    _ => {
                        debug!("Sync outside of a match ignored");
                        SessionEvent::Ignored
                    }
                }
            }

            ServerMessage::ResetRoom => match mem::replace(&mut self.state, SessionState::Lobby) {
                SessionState::Playing { room, .. } => {
                    info!("Match reset, back in the room");
                    self.state = SessionState::InRoom(room);
                    SessionEvent::MatchReset
                }
                other => {
                    self.state = other;
                    SessionEvent::Ignored
                }
            },
        };

        Ok(event)
    }
}
