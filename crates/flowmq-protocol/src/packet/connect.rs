use crate::error::{MqttError, Result};
use crate::packet::{decode_string, decode_u16, decode_u8, encode_string, FixedHeader, PacketType};

use bytes::{Buf, BufMut, BytesMut};

const PROTOCOL_NAME: &str = "MQTT";
const PROTOCOL_LEVEL: u8 = 4;

const FLAG_CLEAN_SESSION: u8 = 0b0000_0010;
const FLAG_PASSWORD: u8 = 0b0100_0000;
const FLAG_USERNAME: u8 = 0b1000_0000;

/// CONNECT packet: opens a session with the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectPacket {
    pub client_id: String,
    pub keep_alive_secs: u16,
    pub clean_session: bool,
    pub username: Option<String>,
    pub password: Option<Vec<u8>>,
}

impl ConnectPacket {
    #[must_use]
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            keep_alive_secs: 60,
            clean_session: true,
            username: None,
            password: None,
        }
    }

    #[must_use]
    pub fn with_keep_alive(mut self, secs: u16) -> Self {
        self.keep_alive_secs = secs;
        self
    }

    #[must_use]
    pub fn with_clean_session(mut self, clean: bool) -> Self {
        self.clean_session = clean;
        self
    }

    #[must_use]
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl AsRef<[u8]>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.as_ref().to_vec());
        self
    }

    fn connect_flags(&self) -> u8 {
        let mut flags = 0;
        if self.clean_session {
            flags |= FLAG_CLEAN_SESSION;
        }
        if self.username.is_some() {
            flags |= FLAG_USERNAME;
        }
        if self.password.is_some() {
            flags |= FLAG_PASSWORD;
        }
        flags
    }

    pub fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        let mut body = BytesMut::new();
        encode_string(PROTOCOL_NAME, &mut body)?;
        body.put_u8(PROTOCOL_LEVEL);
        body.put_u8(self.connect_flags());
        body.put_u16(self.keep_alive_secs);

        encode_string(&self.client_id, &mut body)?;
        if let Some(username) = &self.username {
            encode_string(username, &mut body)?;
        }
        if let Some(password) = &self.password {
            if password.len() > usize::from(u16::MAX) {
                return Err(MqttError::PacketTooLarge {
                    size: password.len(),
                    max: usize::from(u16::MAX),
                });
            }
            #[allow(clippy::cast_possible_truncation)]
            body.put_u16(password.len() as u16);
            body.put_slice(password);
        }

        #[allow(clippy::cast_possible_truncation)]
        FixedHeader::new(PacketType::Connect, 0, body.len() as u32).encode(buf)?;
        buf.extend_from_slice(&body);
        Ok(())
    }

    pub fn decode_body(buf: &mut BytesMut, _header: &FixedHeader) -> Result<Self> {
        let protocol_name = decode_string(buf)?;
        if protocol_name != PROTOCOL_NAME {
            return Err(MqttError::MalformedPacket(format!(
                "unexpected protocol name: {protocol_name:?}"
            )));
        }
        let level = decode_u8(buf)?;
        if level != PROTOCOL_LEVEL {
            return Err(MqttError::MalformedPacket(format!(
                "unsupported protocol level: {level}"
            )));
        }

        let flags = decode_u8(buf)?;
        let keep_alive_secs = decode_u16(buf)?;
        let client_id = decode_string(buf)?;

        let username = if flags & FLAG_USERNAME != 0 {
            Some(decode_string(buf)?)
        } else {
            None
        };
        let password = if flags & FLAG_PASSWORD != 0 {
            let len = usize::from(decode_u16(buf)?);
            if buf.remaining() < len {
                return Err(MqttError::MalformedPacket(
                    "truncated password field".to_string(),
                ));
            }
            Some(buf.split_to(len).to_vec())
        } else {
            None
        };

        Ok(Self {
            client_id,
            keep_alive_secs,
            clean_session: flags & FLAG_CLEAN_SESSION != 0,
            username,
            password,
        })
    }
}
