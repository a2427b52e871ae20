//! Message layouts exchanged with the game server
//!
//! Inbound packets are decoded by hand with [`PacketDecoder`]; their first
//! byte is the opcode. Outbound requests are serde enums serialized with
//! bincode's default (varint) options, which is how the server reads them.
//! The move update is the exception: its sequence number is always written in
//! the four-byte varint form so the packet has a fixed layout.

use crate::codec::{DecodeError, DecodeResult, PacketDecoder, PacketEncoder};
use crate::{NO_TEAM, PROTOCOL_VERSION};
use bincode::Options;
use serde::{Deserialize, Serialize};

pub type ClientId = u32;
pub type SeqNr = u32;

/// Opcodes of packets sent by the server.
pub mod recv {
    pub const ACK: u8 = 0;
    pub const JOIN_ROOM: u8 = 1;
    pub const LEAVE_ROOM: u8 = 2;
    pub const SYNC: u8 = 3;
    pub const CREATED_ROOM: u8 = 4;
    pub const JOINED_ROOM: u8 = 5;
    pub const LIST_ROOMS: u8 = 6;
    pub const ROOM_JOIN_ERROR: u8 = 7;
    pub const START_ROOM: u8 = 8;
    pub const NAME_ERROR: u8 = 9;
    pub const ROOM_ERROR: u8 = 10;
    pub const OUTDATED: u8 = 11;
    pub const SETTINGS: u8 = 12;
    pub const RESET_ROOM: u8 = 13;
}

fn wire_options() -> impl Options {
    bincode::DefaultOptions::new()
}

/// Serializes an outbound request the way the server deserializes it.
pub fn encode<T: Serialize>(message: &T) -> bincode::Result<Vec<u8>> {
    wire_options().serialize(message)
}

/// Deserializes a request with the server's options. Used to check outbound layouts.
pub fn decode_request<'a, T: Deserialize<'a>>(bytes: &'a [u8]) -> bincode::Result<T> {
    wire_options().deserialize(bytes)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchTime {
    Short,
    Long,
}

impl MatchTime {
    pub fn from_u8(value: u8) -> Self {
        if value == 0 {
            MatchTime::Short
        } else {
            MatchTime::Long
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MatchTime::Short => "02:30",
            MatchTime::Long => "05:00",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSettings {
    pub balls: u8,
    pub power_ups: bool,
    pub match_time: MatchTime,
    pub spin_towards_center: bool,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            balls: 2,
            power_ups: true,
            match_time: MatchTime::Short,
            spin_towards_center: false,
        }
    }
}

impl RoomSettings {
    fn decode(view: &mut PacketDecoder<'_>) -> DecodeResult<Self> {
        Ok(Self {
            balls: view.get_u8()?,
            power_ups: view.get_bool()?,
            match_time: MatchTime::from_u8(view.get_u8()?),
            spin_towards_center: view.get_bool()?,
        })
    }
}

/// First message on a fresh connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LoginRequest {
    SetName(u32, String),
}

impl LoginRequest {
    pub fn new(name: &str) -> Self {
        LoginRequest::SetName(PROTOCOL_VERSION, name.to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LobbyRequest {
    CreateRoom,
    JoinRoom(String),
    ListRooms,
}

/// Accumulated paddle movement since the previous move packet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoveUpdate {
    pub delta: f32,
    pub seq_nr: SeqNr,
    /// Index of the ball the local paddle hit, or [`NO_TEAM`].
    pub ball_hit: u8,
    pub spin: f32,
}

impl MoveUpdate {
    pub const PACKET_LEN: usize = 1 + 4 + 1 + 4 + 1 + 4;

    pub fn hit_ball(&self) -> Option<u8> {
        (self.ball_hit != NO_TEAM).then_some(self.ball_hit)
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut encoder = PacketEncoder::with_capacity(0, Self::PACKET_LEN);
        encoder
            .put_f32(self.delta)
            .put_fixed_varint(self.seq_nr)
            .put_u8(self.ball_hit)
            .put_f32(self.spin);
        encoder.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RoomRequest {
    Move(MoveUpdate),
    Leave,
    Start,
    UpdateSettings(RoomSettings),
    AddBot,
    RemoveBot,
}

impl RoomRequest {
    pub fn encode(&self) -> bincode::Result<Vec<u8>> {
        match self {
            RoomRequest::Move(update) => Ok(update.encode()),
            other => encode(other),
        }
    }
}

/// High nibble: team that last hit the ball. Low nibble: team whose arc the ball left through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitPair(pub u8);

impl HitPair {
    pub const fn new(hit_team: u8, receiving_team: u8) -> Self {
        Self((hit_team << 4) | (receiving_team & 0x0f))
    }

    pub fn hit_team(&self) -> u8 {
        self.0 >> 4
    }

    pub fn receiving_team(&self) -> u8 {
        self.0 & 0x0f
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerSync {
    pub client_id: ClientId,
    pub pos: f32,
    pub seq_nr: SeqNr,
}

impl PlayerSync {
    fn decode(view: &mut PacketDecoder<'_>) -> DecodeResult<Self> {
        Ok(Self {
            client_id: view.get_varint()?,
            pos: view.get_f32()?,
            seq_nr: view.get_varint()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BallState {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub spin: f32,
}

impl BallState {
    fn decode(view: &mut PacketDecoder<'_>) -> DecodeResult<Self> {
        Ok(Self {
            x: view.get_f32()?,
            y: view.get_f32()?,
            dx: view.get_f32()?,
            dy: view.get_f32()?,
            spin: view.get_f32()?,
        })
    }
}

/// Ball sync flag: the state is a fresh paddle hit.
pub const BALL_FLAG_HIT: u8 = 1;
/// Ball sync flag: a goal was scored and the ball respawned.
pub const BALL_FLAG_SCORED: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallSync {
    pub ball_id: u8,
    pub rallies: u8,
    pub hit_pair: HitPair,
    pub flags: u8,
    pub state: BallState,
}

impl BallSync {
    fn decode(view: &mut PacketDecoder<'_>) -> DecodeResult<Self> {
        let packed = view.get_u8()?;
        Ok(Self {
            ball_id: packed >> 4,
            rallies: packed & 0x0f,
            hit_pair: HitPair(view.get_u8()?),
            flags: view.get_u8()?,
            state: BallState::decode(view)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RebalanceTeam {
    pub min_pos: f32,
    pub max_pos: f32,
    pub w_angle: f32,
}

impl RebalanceTeam {
    fn decode(view: &mut PacketDecoder<'_>) -> DecodeResult<Self> {
        Ok(Self {
            min_pos: view.get_f32()?,
            max_pos: view.get_f32()?,
            w_angle: view.get_f32()?,
        })
    }
}

/// Power-up section at the tail of a sync packet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PowerUpEvent {
    None,
    Spawn { x: f32, y: f32, kind: u8 },
    ResizePlayers { team: u8, rebalance: RebalanceTeam },
    BonusPoints { team: u8 },
    SplitRgb { team: u8 },
    RotateField { team: u8 },
    SlowDown { team: u8, factor: f32 },
    /// A power-up type this client does not know; it still consumes the visible power-up.
    Other { packet_type: u8, team: u8 },
}

impl PowerUpEvent {
    fn decode(view: &mut PacketDecoder<'_>) -> DecodeResult<Self> {
        let packet_type = view.get_u8()?;
        if packet_type == 0 {
            return Ok(PowerUpEvent::None);
        }
        if packet_type == 1 {
            return Ok(PowerUpEvent::Spawn {
                x: view.get_f32()?,
                y: view.get_f32()?,
                kind: view.get_u8()?,
            });
        }

        let team = view.get_u8()?;
        Ok(match packet_type {
            2 => PowerUpEvent::ResizePlayers {
                team,
                rebalance: RebalanceTeam::decode(view)?,
            },
            3 => PowerUpEvent::BonusPoints { team },
            4 => PowerUpEvent::SplitRgb { team },
            5 => PowerUpEvent::RotateField { team },
            6 => PowerUpEvent::SlowDown {
                team,
                factor: view.get_f32()?,
            },
            _ => PowerUpEvent::Other { packet_type, team },
        })
    }

    /// Wire type byte of this event.
    pub fn packet_type(&self) -> u8 {
        match self {
            PowerUpEvent::None => 0,
            PowerUpEvent::Spawn { .. } => 1,
            PowerUpEvent::ResizePlayers { .. } => 2,
            PowerUpEvent::BonusPoints { .. } => 3,
            PowerUpEvent::SplitRgb { .. } => 4,
            PowerUpEvent::RotateField { .. } => 5,
            PowerUpEvent::SlowDown { .. } => 6,
            PowerUpEvent::Other { packet_type, .. } => *packet_type,
        }
    }
}

/// Periodic authoritative update during a match.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncMessage {
    pub frame_nr: f32,
    pub players: Vec<PlayerSync>,
    pub balls: Vec<BallSync>,
    pub power_up: PowerUpEvent,
}

impl SyncMessage {
    pub fn decode(view: &mut PacketDecoder<'_>) -> DecodeResult<Self> {
        let frame_nr = view.get_f32()?;

        let len = view.get_u8()? as usize;
        let mut players = Vec::with_capacity(len);
        for _ in 0..len {
            players.push(PlayerSync::decode(view)?);
        }

        let len = view.get_u8()? as usize;
        let mut balls = Vec::with_capacity(len);
        for _ in 0..len {
            balls.push(BallSync::decode(view)?);
        }

        Ok(Self {
            frame_nr,
            players,
            balls,
            power_up: PowerUpEvent::decode(view)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StartPlayer {
    pub client_id: ClientId,
    pub team_nr: u8,
    pub pos: f32,
    pub w_angle: f32,
}

/// Match-start payload: team layout, paddle placement and initial balls.
#[derive(Debug, Clone, PartialEq)]
pub struct StartMessage {
    pub team_count: u8,
    pub spin_towards_center: bool,
    /// Match length in seconds.
    pub match_time: f32,
    pub players: Vec<StartPlayer>,
    pub balls: Vec<BallState>,
}

impl StartMessage {
    fn decode(view: &mut PacketDecoder<'_>) -> DecodeResult<Self> {
        let team_count = view.get_u8()?;
        let spin_towards_center = view.get_bool()?;
        let match_time = view.get_f32()?;

        let len = view.get_u8()? as usize;
        let mut players = Vec::with_capacity(len);
        for _ in 0..len {
            players.push(StartPlayer {
                client_id: view.get_varint()?,
                team_nr: view.get_u8()?,
                pos: view.get_f32()?,
                w_angle: view.get_f32()?,
            });
        }

        let len = view.get_u8()? as usize;
        let mut balls = Vec::with_capacity(len);
        for _ in 0..len {
            balls.push(BallState::decode(view)?);
        }

        Ok(Self {
            team_count,
            spin_towards_center,
            match_time,
            players,
            balls,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomPlayer {
    pub client_id: ClientId,
    pub name: String,
}

impl RoomPlayer {
    fn decode(view: &mut PacketDecoder<'_>) -> DecodeResult<Self> {
        Ok(Self {
            client_id: view.get_varint()?,
            name: view.get_string()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRoom {
    pub client_id: ClientId,
    pub host_id: ClientId,
    pub players: Vec<RoomPlayer>,
    pub settings: RoomSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaveMessage {
    pub left_client_id: ClientId,
    pub new_host_id: ClientId,
    pub rebalance: Option<RebalanceTeam>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomListing {
    pub id: String,
    pub name: String,
    pub team_count: u8,
    pub ball_count: u8,
    pub spin_towards_center: bool,
    pub power_ups: bool,
    pub match_time: MatchTime,
    pub player_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomList {
    pub playing_count: u32,
    pub rooms: Vec<RoomListing>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutdatedReason {
    Client,
    Server,
}

/// Every inbound packet, decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    Ack,
    Join(RoomPlayer),
    Leave(LeaveMessage),
    Sync(SyncMessage),
    CreatedRoom(String),
    JoinedRoom(JoinedRoom),
    ListRooms(RoomList),
    RoomJoinError,
    Start(StartMessage),
    NameError,
    TooManyRooms,
    Outdated(OutdatedReason),
    Settings(RoomSettings),
    ResetRoom,
}

impl ServerMessage {
    pub fn decode(packet: &[u8]) -> DecodeResult<Self> {
        let mut view = PacketDecoder::new(packet);
        let opcode = view.opcode().ok_or(DecodeError::EmptyPacket)?;

        let message = match opcode {
            recv::ACK => ServerMessage::Ack,
            recv::JOIN_ROOM => ServerMessage::Join(RoomPlayer::decode(&mut view)?),
            recv::LEAVE_ROOM => {
                let left_client_id = view.get_varint()?;
                let new_host_id = view.get_varint()?;
                let rebalance = if view.get_bool()? {
                    Some(RebalanceTeam::decode(&mut view)?)
                } else {
                    None
                };
                ServerMessage::Leave(LeaveMessage {
                    left_client_id,
                    new_host_id,
                    rebalance,
                })
            }
            recv::SYNC => ServerMessage::Sync(SyncMessage::decode(&mut view)?),
            recv::CREATED_ROOM => ServerMessage::CreatedRoom(view.get_string()?),
            recv::JOINED_ROOM => {
                let client_id = view.get_varint()?;
                let host_id = view.get_varint()?;
                let len = view.get_varint()? as usize;
                let mut players = Vec::with_capacity(len.min(64));
                for _ in 0..len {
                    players.push(RoomPlayer::decode(&mut view)?);
                }
                ServerMessage::JoinedRoom(JoinedRoom {
                    client_id,
                    host_id,
                    players,
                    settings: RoomSettings::decode(&mut view)?,
                })
            }
            recv::LIST_ROOMS => {
                let playing_count = view.get_varint()?;
                let len = view.get_varint()? as usize;
                let mut rooms = Vec::with_capacity(len.min(64));
                for _ in 0..len {
                    rooms.push(RoomListing {
                        id: view.get_string()?,
                        name: view.get_string()?,
                        team_count: view.get_u8()?,
                        ball_count: view.get_u8()?,
                        spin_towards_center: view.get_bool()?,
                        power_ups: view.get_bool()?,
                        match_time: MatchTime::from_u8(view.get_u8()?),
                        player_count: view.get_varint()?,
                    });
                }
                ServerMessage::ListRooms(RoomList {
                    playing_count,
                    rooms,
                })
            }
            recv::ROOM_JOIN_ERROR => ServerMessage::RoomJoinError,
            recv::START_ROOM => ServerMessage::Start(StartMessage::decode(&mut view)?),
            recv::NAME_ERROR => ServerMessage::NameError,
            recv::ROOM_ERROR => ServerMessage::TooManyRooms,
            recv::OUTDATED => ServerMessage::Outdated(match view.get_u8()? {
                0 => OutdatedReason::Client,
                _ => OutdatedReason::Server,
            }),
            recv::SETTINGS => ServerMessage::Settings(RoomSettings::decode(&mut view)?),
            recv::RESET_ROOM => ServerMessage::ResetRoom,
            other => return Err(DecodeError::UnknownOpcode(other)),
        };

        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_login_request_layout() {
        let bytes = encode(&LoginRequest::new("bob")).unwrap();
        assert_eq!(bytes, vec![0, PROTOCOL_VERSION as u8, 3, b'b', b'o', b'b']);
    }

    #[test]
    fn test_single_byte_commands() {
        assert_eq!(encode(&LobbyRequest::CreateRoom).unwrap(), vec![0]);
        assert_eq!(encode(&LobbyRequest::ListRooms).unwrap(), vec![2]);
        assert_eq!(RoomRequest::Leave.encode().unwrap(), vec![1]);
        assert_eq!(RoomRequest::Start.encode().unwrap(), vec![2]);
        assert_eq!(RoomRequest::AddBot.encode().unwrap(), vec![4]);
        assert_eq!(RoomRequest::RemoveBot.encode().unwrap(), vec![5]);
    }

    #[test]
    fn test_join_room_request_layout() {
        let bytes = encode(&LobbyRequest::JoinRoom("ab".to_string())).unwrap();
        assert_eq!(bytes, vec![1, 2, b'a', b'b']);
    }

    #[test]
    fn test_settings_request_layout() {
        let settings = RoomSettings {
            balls: 3,
            power_ups: false,
            match_time: MatchTime::Long,
            spin_towards_center: true,
        };
        let bytes = RoomRequest::UpdateSettings(settings).encode().unwrap();
        assert_eq!(bytes, vec![3, 3, 0, 1, 1]);
    }

    #[test]
    fn test_move_packet_layout() {
        let update = MoveUpdate {
            delta: 0.25,
            seq_nr: 1234,
            ball_hit: NO_TEAM,
            spin: -0.5,
        };
        let bytes = update.encode();
        assert_eq!(bytes.len(), MoveUpdate::PACKET_LEN);
        assert_eq!(bytes[0], 0);
        assert_eq!(&bytes[1..5], &0.25f32.to_le_bytes());
        assert_eq!(bytes[5], 252);
        assert_eq!(&bytes[6..10], &1234u32.to_le_bytes());
        assert_eq!(bytes[10], NO_TEAM);
        assert_eq!(&bytes[11..15], &(-0.5f32).to_le_bytes());
        assert_eq!(update.hit_ball(), None);
    }

    #[test]
    fn test_move_packet_is_readable_by_server_options() {
        let update = MoveUpdate {
            delta: -0.1,
            seq_nr: 7,
            ball_hit: 1,
            spin: 0.02,
        };
        let bytes = RoomRequest::Move(update).encode().unwrap();
        let decoded: RoomRequest = decode_request(&bytes).unwrap();
        assert_eq!(decoded, RoomRequest::Move(update));
    }

    #[test]
    fn test_hit_pair_nibbles() {
        let pair = HitPair::new(2, 3);
        assert_eq!(pair.hit_team(), 2);
        assert_eq!(pair.receiving_team(), 3);
        assert_eq!(HitPair(0xff).hit_team(), NO_TEAM);
    }

    fn sample_sync_packet() -> Vec<u8> {
        let mut encoder = PacketEncoder::new(recv::SYNC);
        encoder.put_f32(120.0);
        encoder.put_u8(1).put_varint(300).put_f32(1.25).put_varint(70_000);
        encoder
            .put_u8(1)
            .put_u8((1 << 4) | 3)
            .put_u8(HitPair::new(2, 0).0)
            .put_u8(BALL_FLAG_HIT);
        for value in [10.0f32, 20.0, 1.0, -1.0, 0.01] {
            encoder.put_f32(value);
        }
        encoder.put_u8(6).put_u8(1).put_f32(0.5);
        encoder.finish()
    }

    #[test]
    fn test_decode_sync_message() {
        let packet = sample_sync_packet();
        let message = ServerMessage::decode(&packet).unwrap();
        let ServerMessage::Sync(sync) = message else {
            panic!("Wrong message type after decoding");
        };

        assert_approx_eq!(sync.frame_nr, 120.0, 1e-6);
        assert_eq!(sync.players.len(), 1);
        assert_eq!(sync.players[0].client_id, 300);
        assert_eq!(sync.players[0].seq_nr, 70_000);
        assert_eq!(sync.balls.len(), 1);
        assert_eq!(sync.balls[0].ball_id, 1);
        assert_eq!(sync.balls[0].rallies, 3);
        assert_eq!(sync.balls[0].hit_pair.hit_team(), 2);
        assert_eq!(sync.balls[0].flags, BALL_FLAG_HIT);
        assert_approx_eq!(sync.balls[0].state.dy, -1.0, 1e-6);
        assert_eq!(
            sync.power_up,
            PowerUpEvent::SlowDown {
                team: 1,
                factor: 0.5
            }
        );
    }

    #[test]
    fn test_truncated_sync_is_a_decode_error() {
        let packet = sample_sync_packet();
        for cut in 1..packet.len() {
            assert!(
                ServerMessage::decode(&packet[..cut]).is_err(),
                "cut at {} decoded",
                cut
            );
        }
    }

    #[test]
    fn test_decode_leave_with_rebalance() {
        let mut encoder = PacketEncoder::new(recv::LEAVE_ROOM);
        encoder
            .put_varint(4)
            .put_varint(1)
            .put_bool(true)
            .put_f32(0.0)
            .put_f32(1.0)
            .put_f32(0.5);
        let message = ServerMessage::decode(&encoder.finish()).unwrap();
        assert_eq!(
            message,
            ServerMessage::Leave(LeaveMessage {
                left_client_id: 4,
                new_host_id: 1,
                rebalance: Some(RebalanceTeam {
                    min_pos: 0.0,
                    max_pos: 1.0,
                    w_angle: 0.5
                }),
            })
        );
    }

    #[test]
    fn test_decode_start_message() {
        let mut encoder = PacketEncoder::new(recv::START_ROOM);
        encoder.put_u8(2).put_bool(true).put_f32(150.0);
        encoder.put_u8(2);
        encoder.put_varint(1).put_u8(0).put_f32(0.5).put_f32(0.6);
        encoder.put_varint(2).put_u8(1).put_f32(3.5).put_f32(0.6);
        encoder.put_u8(1);
        for value in [400.0f32, 400.0, 1.0, 0.0, 0.0] {
            encoder.put_f32(value);
        }

        let ServerMessage::Start(start) = ServerMessage::decode(&encoder.finish()).unwrap() else {
            panic!("Wrong message type after decoding");
        };
        assert_eq!(start.team_count, 2);
        assert!(start.spin_towards_center);
        assert_eq!(start.players.len(), 2);
        assert_eq!(start.players[1].team_nr, 1);
        assert_eq!(start.balls.len(), 1);
        assert_approx_eq!(start.balls[0].dx, 1.0, 1e-6);
    }

    #[test]
    fn test_decode_room_list() {
        let mut encoder = PacketEncoder::new(recv::LIST_ROOMS);
        encoder.put_varint(12).put_varint(1);
        encoder
            .put_string("abc")
            .put_string("Room")
            .put_u8(0)
            .put_u8(2)
            .put_bool(false)
            .put_bool(true)
            .put_u8(1)
            .put_varint(3);

        let ServerMessage::ListRooms(list) = ServerMessage::decode(&encoder.finish()).unwrap()
        else {
            panic!("Wrong message type after decoding");
        };
        assert_eq!(list.playing_count, 12);
        assert_eq!(list.rooms[0].id, "abc");
        assert_eq!(list.rooms[0].match_time, MatchTime::Long);
        assert_eq!(list.rooms[0].player_count, 3);
    }

    #[test]
    fn test_unknown_opcode_is_rejected() {
        assert_eq!(
            ServerMessage::decode(&[200]),
            Err(DecodeError::UnknownOpcode(200))
        );
        assert_eq!(ServerMessage::decode(&[]), Err(DecodeError::EmptyPacket));
    }
}
