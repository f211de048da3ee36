//! One I2C channel as a bridge interface

use pontis_hal::{I2cBus, I2cPins, StreamBuffer};
use pontis_protocol::{CmdStatus, CommandReport, I2cOp, ResponseReport};

use super::command::I2cCommand;
use super::state::InterfaceStateTracker;
use super::stream::{StreamPoll, StreamState, StreamWriteController};
use super::transaction::TransactionExecutor;
use crate::config::{ChannelConfig, ConfigError, OpcodeLayout};
use crate::interface::{Interface, InterfaceState};

/// I2C master channel
///
/// Owns the bus handle, the pin pair and the stream staging buffer of one
/// hardware block. Commands outside the channel's opcode block are ignored.
pub struct I2cMaster<B: I2cBus, P: I2cPins, S: StreamBuffer> {
    index: u8,
    opcodes: OpcodeLayout,
    stream_opcode: u8,
    bus: B,
    pins: P,
    buffer: S,
    tracker: InterfaceStateTracker,
    stream: StreamWriteController,
}

impl<B: I2cBus, P: I2cPins, S: StreamBuffer> I2cMaster<B, P, S> {
    /// Create an uninitialized channel
    ///
    /// Fails if the channel's opcode block does not fit the layout.
    pub fn new(
        channel: &ChannelConfig,
        opcodes: OpcodeLayout,
        bus: B,
        pins: P,
        buffer: S,
    ) -> Result<Self, ConfigError> {
        if !opcodes.block_fits(channel.index) {
            return Err(ConfigError::OpcodeOverflow(channel.index));
        }
        let stream_opcode = opcodes
            .opcode(channel.index, I2cOp::WriteFromStream)
            .ok_or(ConfigError::OpcodeOverflow(channel.index))?;

        Ok(Self {
            index: channel.index,
            opcodes,
            stream_opcode,
            bus,
            pins,
            buffer,
            tracker: InterfaceStateTracker::new(),
            stream: StreamWriteController::new(),
        })
    }

    /// Hardware block index
    pub fn index(&self) -> u8 {
        self.index
    }

    /// Opcode tagging stream completion responses
    pub fn stream_opcode(&self) -> u8 {
        self.stream_opcode
    }

    pub fn stream_state(&self) -> StreamState {
        self.stream.state()
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn pins(&self) -> &P {
        &self.pins
    }

    /// Staging buffer the host link fills for streamed writes
    pub fn buffer_mut(&mut self) -> &mut S {
        &mut self.buffer
    }

    fn warn_if_uninitialized(&self, command: &I2cCommand<'_>) {
        let transfers = !matches!(command, I2cCommand::Init { .. } | I2cCommand::Deinit);
        if transfers && !self.tracker.state().is_initialized() {
            log_warn!("i2c{}: transfer on uninitialized channel", self.index);
        }
    }
}

impl<B: I2cBus, P: I2cPins, S: StreamBuffer> Interface for I2cMaster<B, P, S> {
    fn process(&mut self, cmd: &CommandReport, response: &mut ResponseReport) -> CmdStatus {
        let command = match I2cCommand::decode(&self.opcodes, self.index, cmd) {
            Some(command) => command,
            None => return CmdStatus::NotConcerned,
        };
        self.warn_if_uninitialized(&command);

        match command {
            I2cCommand::Init { baudrate, pull_ups } => {
                self.tracker
                    .init(&mut self.bus, &mut self.pins, baudrate, pull_ups);
                CmdStatus::Ok
            }
            I2cCommand::Deinit => {
                self.tracker.deinit(&mut self.bus, &mut self.pins);
                CmdStatus::Ok
            }
            I2cCommand::Write {
                address,
                stop,
                len,
                payload,
            } => {
                let result =
                    TransactionExecutor::new(&mut self.bus).write(address, stop, len, payload);
                CmdStatus::from_success(result.is_ok())
            }
            I2cCommand::Read { address, stop, len } => {
                let result = TransactionExecutor::new(&mut self.bus).read(
                    address,
                    stop,
                    len,
                    response.payload_mut(),
                );
                CmdStatus::from_success(result.is_ok())
            }
            I2cCommand::WriteFromStream { address, total } => {
                self.stream.begin(address, total, &mut self.buffer);
                CmdStatus::Ok
            }
            I2cCommand::WriteThenRead {
                address,
                read_stop,
                write_len,
                payload,
                read_len,
            } => {
                let result = TransactionExecutor::new(&mut self.bus).write_then_read(
                    address,
                    read_stop,
                    write_len,
                    payload,
                    read_len,
                    response.payload_mut(),
                );
                CmdStatus::from_success(result.is_ok())
            }
        }
    }

    fn task(&mut self, response: &mut ResponseReport) -> CmdStatus {
        match self.stream.poll(&mut self.bus, &mut self.buffer) {
            StreamPoll::NotConcerned => CmdStatus::NotConcerned,
            StreamPoll::InProgress => CmdStatus::NotFinished,
            StreamPoll::Completed => {
                response.set_opcode(self.stream_opcode);
                CmdStatus::Ok
            }
            StreamPoll::Failed(_) => {
                response.set_opcode(self.stream_opcode);
                CmdStatus::Nok
            }
        }
    }

    fn stage(&mut self, data: &[u8]) -> usize {
        self.buffer.stage(data)
    }

    fn state(&self) -> InterfaceState {
        self.tracker.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::StagingBuffer;
    use crate::i2c::command::{WRITE_PAYLOAD_OFFSET, WRITE_READ_PAYLOAD_OFFSET};
    use crate::mock::{BusEvent, FakeBus, FakePins, Reply};
    use pontis_hal::Stop;

    type TestMaster = I2cMaster<FakeBus, FakePins, StagingBuffer>;

    fn master(channel: &ChannelConfig) -> TestMaster {
        I2cMaster::new(
            channel,
            OpcodeLayout::DEFAULT,
            FakeBus::new(),
            FakePins::default(),
            StagingBuffer::new(),
        )
        .unwrap()
    }

    fn initialized() -> TestMaster {
        let mut m = master(&ChannelConfig::I2C0);
        let init = CommandReport::with_opcode(0xA0).set_u32_le(2, 100_000);
        assert_eq!(m.process(&init, &mut ResponseReport::new()), CmdStatus::Ok);
        m.bus_mut().events.clear();
        m
    }

    fn run(m: &mut TestMaster, cmd: &CommandReport) -> (CmdStatus, ResponseReport) {
        let mut response = ResponseReport::new();
        let status = m.process(cmd, &mut response);
        (status, response)
    }

    #[test]
    fn test_new_rejects_overflowing_block() {
        let layout = OpcodeLayout {
            base: 0xFC,
            stride: 0x10,
        };
        let result = I2cMaster::new(
            &ChannelConfig::I2C0,
            layout,
            FakeBus::new(),
            FakePins::default(),
            StagingBuffer::<512>::new(),
        );
        assert!(matches!(result, Err(ConfigError::OpcodeOverflow(0))));
    }

    #[test]
    fn test_stream_opcode_per_channel() {
        assert_eq!(master(&ChannelConfig::I2C0).stream_opcode(), 0xA4);
        assert_eq!(master(&ChannelConfig::I2C1).stream_opcode(), 0xB4);
    }

    #[test]
    fn test_unknown_opcodes_not_concerned() {
        let mut m = initialized();
        let before = m.state();

        for opcode in (0..=u8::MAX).filter(|op| !(0xA0..=0xA5).contains(op)) {
            let cmd = CommandReport::with_opcode(opcode).set_u8(1, 0x50).set_u8(3, 4);
            let (status, _) = run(&mut m, &cmd);
            assert_eq!(status, CmdStatus::NotConcerned, "opcode 0x{:02x}", opcode);
        }

        assert!(m.bus().events.is_empty());
        assert_eq!(m.state(), before);
        assert_eq!(m.stream_state(), StreamState::Idle);
    }

    #[test]
    fn test_init_then_deinit() {
        let mut m = master(&ChannelConfig::I2C1);
        let init = CommandReport::with_opcode(0xB0)
            .set_u8(1, 1)
            .set_u32_le(2, 400_000);

        assert_eq!(run(&mut m, &init).0, CmdStatus::Ok);
        assert_eq!(m.state(), InterfaceState::Initialized);
        assert!(m.pins().pull_ups);

        assert_eq!(
            run(&mut m, &CommandReport::with_opcode(0xB1)).0,
            CmdStatus::Ok
        );
        assert_eq!(m.state(), InterfaceState::NotInitialized);
        assert!(!m.pins().pull_ups);
    }

    #[test]
    fn test_oversized_write_truncated() {
        let mut m = initialized();
        let cmd = CommandReport::with_opcode(0xA2)
            .set_u8(1, 0x50)
            .set_u8(2, 0x00)
            .set_u32_le(3, 1000)
            .set_payload(WRITE_PAYLOAD_OFFSET, &[0x11; 57]);

        assert_eq!(run(&mut m, &cmd).0, CmdStatus::Ok);
        assert_eq!(m.bus().writes(), vec![(0x50, vec![0x11; 57], Stop::Send)]);
    }

    #[test]
    fn test_write_nack_is_nok() {
        let mut m = initialized();
        m.bus_mut().script_write(Reply::Nack);
        let cmd = CommandReport::with_opcode(0xA2)
            .set_u8(1, 0x50)
            .set_u8(2, 0x01)
            .set_u32_le(3, 2);

        assert_eq!(run(&mut m, &cmd).0, CmdStatus::Nok);
        assert_eq!(m.state(), InterfaceState::Initialized);
    }

    #[test]
    fn test_read_lands_in_response_payload() {
        let mut m = initialized();
        m.bus_mut().queue_read_data(&[0xCA, 0xFE]);
        let cmd = CommandReport::with_opcode(0xA3)
            .set_u8(1, 0x48)
            .set_u8(2, 0x01)
            .set_u8(3, 2);

        let (status, response) = run(&mut m, &cmd);
        assert_eq!(status, CmdStatus::Ok);
        assert_eq!(&response.payload()[..2], &[0xCA, 0xFE]);
        assert_eq!(m.bus().reads(), vec![(0x48, 2, Stop::Send)]);
    }

    #[test]
    fn test_read_longer_than_response_is_nok() {
        let mut m = initialized();
        let cmd = CommandReport::with_opcode(0xA3).set_u8(1, 0x48).set_u8(3, 63);

        assert_eq!(run(&mut m, &cmd).0, CmdStatus::Nok);
        assert!(m.bus().events.is_empty());
    }

    #[test]
    fn test_write_then_read_short_write_skips_read() {
        let mut m = initialized();
        m.bus_mut().script_write(Reply::Short(0));
        let cmd = CommandReport::with_opcode(0xA5)
            .set_u8(1, 0x68)
            .set_u8(2, 0x01)
            .set_u8(3, 2)
            .set_u8(4, 4)
            .set_payload(WRITE_READ_PAYLOAD_OFFSET, &[0x3B, 0x3C]);

        assert_eq!(run(&mut m, &cmd).0, CmdStatus::Nok);
        assert!(m.bus().reads().is_empty());
    }

    #[test]
    fn test_write_then_read_read_failure_is_nok() {
        let mut m = initialized();
        m.bus_mut().script_read(Reply::Short(1));
        let cmd = CommandReport::with_opcode(0xA5)
            .set_u8(1, 0x68)
            .set_u8(3, 1)
            .set_u8(4, 4);

        assert_eq!(run(&mut m, &cmd).0, CmdStatus::Nok);
        assert_eq!(m.bus().reads().len(), 1);
    }

    #[test]
    fn test_zero_length_stream_completes_immediately() {
        let mut m = initialized();
        let cmd = CommandReport::with_opcode(0xA4)
            .set_u8(1, 0x3C)
            .set_u32_le(2, 0);

        assert_eq!(run(&mut m, &cmd).0, CmdStatus::Ok);
        assert_eq!(m.stream_state(), StreamState::Idle);
        assert_eq!(
            m.task(&mut ResponseReport::new()),
            CmdStatus::NotConcerned
        );
        assert!(m.bus().events.is_empty());
    }

    #[test]
    fn test_stream_completion_response() {
        let mut m = initialized();
        let cmd = CommandReport::with_opcode(0xA4)
            .set_u8(1, 0x3C)
            .set_u32_le(2, 6);
        assert_eq!(run(&mut m, &cmd).0, CmdStatus::Ok);

        let mut response = ResponseReport::new();
        assert_eq!(m.task(&mut response), CmdStatus::NotFinished);

        m.buffer_mut().stage(&[1, 2, 3, 4]);
        assert_eq!(m.task(&mut response), CmdStatus::NotFinished);

        m.buffer_mut().stage(&[5, 6]);
        assert_eq!(m.task(&mut response), CmdStatus::Ok);
        assert_eq!(response.opcode(), 0xA4);

        assert_eq!(
            m.bus().writes(),
            vec![
                (0x3C, vec![1, 2, 3, 4], Stop::Suppress),
                (0x3C, vec![5, 6], Stop::Send),
            ]
        );
    }

    #[test]
    fn test_stream_failure_response() {
        let mut m = master(&ChannelConfig::I2C1);
        let cmd = CommandReport::with_opcode(0xB4)
            .set_u8(1, 0x3C)
            .set_u32_le(2, 10);
        run(&mut m, &cmd);
        m.bus_mut().script_write(Reply::Nack);
        m.buffer_mut().stage(&[1, 2]);

        let mut response = ResponseReport::new();
        assert_eq!(m.task(&mut response), CmdStatus::Nok);
        assert_eq!(response.opcode(), 0xB4);
        assert_eq!(m.stream_state(), StreamState::Idle);
    }

    #[test]
    fn test_deinit_keeps_stream_running() {
        let mut m = initialized();
        let cmd = CommandReport::with_opcode(0xA4)
            .set_u8(1, 0x3C)
            .set_u32_le(2, 2);
        run(&mut m, &cmd);
        run(&mut m, &CommandReport::with_opcode(0xA1));
        assert_eq!(m.state(), InterfaceState::NotInitialized);
        assert!(m.stream_state().is_streaming());

        m.buffer_mut().stage(&[9, 9]);
        assert_eq!(m.task(&mut ResponseReport::new()), CmdStatus::Ok);
        assert!(m
            .bus()
            .events
            .iter()
            .any(|e| matches!(e, BusEvent::Write { address: 0x3C, .. })));
    }

    #[test]
    fn test_uninitialized_channel_still_transfers() {
        let mut m = master(&ChannelConfig::I2C0);
        let cmd = CommandReport::with_opcode(0xA2)
            .set_u8(1, 0x50)
            .set_u32_le(3, 1);

        assert_eq!(run(&mut m, &cmd).0, CmdStatus::Ok);
        assert_eq!(m.bus().transfer_count(), 1);
    }
}
