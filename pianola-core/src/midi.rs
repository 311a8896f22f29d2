use midir::{MidiOutput, MidiOutputConnection, MidiOutputPort};

use crate::config::PlaybackSettings;
use crate::error::DeviceError;
use crate::playback::DeviceSink;

const CLIENT_NAME: &str = "pianola";

/// Information about an available MIDI output port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiPortInfo {
    pub index: usize,
    pub name: String,
}

/// List the MIDI output ports the system currently offers.
pub fn list_ports() -> Result<Vec<MidiPortInfo>, DeviceError> {
    let midi_out = MidiOutput::new(CLIENT_NAME).map_err(|e| DeviceError::Init(e.to_string()))?;
    Ok(port_infos(&midi_out))
}

fn port_infos(midi_out: &MidiOutput) -> Vec<MidiPortInfo> {
    midi_out
        .ports()
        .iter()
        .enumerate()
        .map(|(index, port)| MidiPortInfo {
            index,
            name: midi_out
                .port_name(port)
                .unwrap_or_else(|_| "Unknown".to_string()),
        })
        .collect()
}

/// Note on/off sink backed by a MIDI output port.
pub struct MidiOutputSink {
    connection: Option<MidiOutputConnection>,
    port_name: String,
    channel: u8,
}

impl MidiOutputSink {
    /// Connect to the output port at `index`
    pub fn connect(index: usize, settings: &PlaybackSettings) -> Result<Self, DeviceError> {
        let midi_out = MidiOutput::new(CLIENT_NAME).map_err(|e| DeviceError::Init(e.to_string()))?;
        let ports = midi_out.ports();
        if ports.is_empty() {
            return Err(DeviceError::NoPorts);
        }
        let port = ports.get(index).ok_or(DeviceError::PortOutOfRange {
            index,
            available: ports.len(),
        })?;
        Self::open(midi_out, port, settings)
    }

    /// Connect to the first output port whose name contains `pattern`
    /// (case-insensitive)
    pub fn connect_by_name(pattern: &str, settings: &PlaybackSettings) -> Result<Self, DeviceError> {
        let midi_out = MidiOutput::new(CLIENT_NAME).map_err(|e| DeviceError::Init(e.to_string()))?;
        let ports = midi_out.ports();
        if ports.is_empty() {
            return Err(DeviceError::NoPorts);
        }
        let wanted = pattern.to_lowercase();
        let index = port_infos(&midi_out)
            .into_iter()
            .find(|info| info.name.to_lowercase().contains(&wanted))
            .map(|info| info.index)
            .ok_or_else(|| DeviceError::PortNotFound(pattern.to_string()))?;
        Self::open(midi_out, &ports[index], settings)
    }

    fn open(
        midi_out: MidiOutput,
        port: &MidiOutputPort,
        settings: &PlaybackSettings,
    ) -> Result<Self, DeviceError> {
        if settings.channel > 15 {
            return Err(DeviceError::OutOfRange {
                what: "channel",
                value: settings.channel as i32,
            });
        }
        let port_name = midi_out
            .port_name(port)
            .unwrap_or_else(|_| "Unknown".to_string());
        let connection = midi_out
            .connect(port, "pianola-out")
            .map_err(|e| DeviceError::Connect(e.to_string()))?;

        let mut sink = Self {
            connection: Some(connection),
            port_name,
            channel: settings.channel,
        };
        if let Some(program) = settings.program {
            let message = program_change(sink.channel, program)?;
            sink.send(&message)?;
        }
        log::info!(target: "midi", "connected to '{}' on channel {}", sink.port_name, sink.channel + 1);
        Ok(sink)
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Silence the channel and release the port. Later calls fail with
    /// `NotConnected`.
    pub fn close(&mut self) -> Result<(), DeviceError> {
        let message = all_notes_off(self.channel);
        let result = self.send(&message);
        if let Some(connection) = self.connection.take() {
            connection.close();
            log::info!(target: "midi", "disconnected from '{}'", self.port_name);
        }
        result
    }

    fn send(&mut self, message: &[u8]) -> Result<(), DeviceError> {
        let connection = self.connection.as_mut().ok_or(DeviceError::NotConnected)?;
        connection
            .send(message)
            .map_err(|e| DeviceError::Send(e.to_string()))
    }
}

impl DeviceSink for MidiOutputSink {
    fn note_on(&mut self, pitch_id: u8, velocity: u8) -> Result<(), DeviceError> {
        let message = note_on(self.channel, pitch_id, velocity)?;
        self.send(&message)
    }

    fn note_off(&mut self, pitch_id: u8) -> Result<(), DeviceError> {
        let message = note_off(self.channel, pitch_id)?;
        self.send(&message)
    }
}

impl Drop for MidiOutputSink {
    fn drop(&mut self) {
        if self.connection.is_some() {
            if let Err(e) = self.close() {
                log::warn!(target: "midi", "closing '{}': {}", self.port_name, e);
            }
        }
    }
}

fn data_byte(what: &'static str, value: u8) -> Result<u8, DeviceError> {
    if value > 127 {
        Err(DeviceError::OutOfRange {
            what,
            value: value as i32,
        })
    } else {
        Ok(value)
    }
}

fn note_on(channel: u8, pitch_id: u8, velocity: u8) -> Result<[u8; 3], DeviceError> {
    Ok([
        0x90 | (channel & 0x0F),
        data_byte("pitch", pitch_id)?,
        data_byte("velocity", velocity)?,
    ])
}

fn note_off(channel: u8, pitch_id: u8) -> Result<[u8; 3], DeviceError> {
    Ok([0x80 | (channel & 0x0F), data_byte("pitch", pitch_id)?, 0])
}

fn program_change(channel: u8, program: u8) -> Result<[u8; 2], DeviceError> {
    Ok([0xC0 | (channel & 0x0F), data_byte("program", program)?])
}

fn all_notes_off(channel: u8) -> [u8; 3] {
    [0xB0 | (channel & 0x0F), 123, 0]
}
