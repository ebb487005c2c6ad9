//! One cooperative step of the probe loop
//!
//! Each cycle moves received bytes into the inbound queue, runs one
//! interpreter pass, and pushes as much of the outbound queue to the
//! transport as it will take. Bytes the transport refuses stay queued for
//! the next cycle.

use crate::interpreter::{CommandInterpreter, PassSummary};
use crate::queue::ByteQueue;
use crate::traits::{MemoryBus, Transport};

/// What one cycle moved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleReport {
    /// Bytes taken from the transport into the inbound queue
    pub received: usize,
    /// Bytes handed from the outbound queue to the transport
    pub sent: usize,
    pub pass: PassSummary,
}

impl CycleReport {
    /// True if the cycle did nothing at all
    pub fn is_idle(&self) -> bool {
        self.received == 0 && self.sent == 0 && self.pass.executed == 0
    }
}

/// Inbound and outbound byte queues around the interpreter
pub struct Pipeline<const IN: usize, const OUT: usize> {
    inbound: ByteQueue<IN>,
    outbound: ByteQueue<OUT>,
}

impl<const IN: usize, const OUT: usize> Default for Pipeline<IN, OUT> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const IN: usize, const OUT: usize> Pipeline<IN, OUT> {
    pub const fn new() -> Self {
        Self {
            inbound: ByteQueue::new(),
            outbound: ByteQueue::new(),
        }
    }

    pub fn inbound(&self) -> &ByteQueue<IN> {
        &self.inbound
    }

    pub fn outbound(&self) -> &ByteQueue<OUT> {
        &self.outbound
    }

    /// Drop everything buffered in both directions
    pub fn reset(&mut self) {
        self.inbound.clear();
        self.outbound.clear();
    }

    /// Run one receive, interpret and transmit cycle
    pub fn run_once<T, M>(
        &mut self,
        transport: &mut T,
        interpreter: &mut CommandInterpreter,
        memory: &mut M,
    ) -> CycleReport
    where
        T: Transport + ?Sized,
        M: MemoryBus + ?Sized,
    {
        let mut report = CycleReport {
            received: self.receive(transport),
            ..CycleReport::default()
        };
        report.pass = interpreter.process(memory, &mut self.inbound, &mut self.outbound);
        report.sent = self.transmit(transport);
        transport.service();
        report
    }

    fn receive<T: Transport + ?Sized>(&mut self, transport: &mut T) -> usize {
        let mut received = 0;
        while !self.inbound.is_full() && transport.bytes_available() > 0 {
            let Some(byte) = transport.receive_byte() else {
                break;
            };
            // cannot fail: checked for space above
            let _ = self.inbound.insert(byte);
            received += 1;
        }
        received
    }

    fn transmit<T: Transport + ?Sized>(&mut self, transport: &mut T) -> usize {
        let mut sent = 0;
        while let Some(byte) = self.outbound.peek() {
            if transport.send_byte(byte).is_err() {
                break;
            }
            self.outbound.remove();
            sent += 1;
        }
        sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegionConfig;
    use crate::memtest::BankResults;
    use crate::sim::SimBus;
    use crate::traits::WouldBlock;
    use std::collections::VecDeque;
    use std::string::String;
    use std::vec::Vec;

    /// Transport fed from a script, accepting a limited number of bytes per cycle
    struct ScriptedLink {
        rx: VecDeque<u8>,
        tx: Vec<u8>,
        tx_budget: usize,
        tx_left: usize,
        serviced: usize,
    }

    impl ScriptedLink {
        fn new(input: &[u8], tx_budget: usize) -> Self {
            Self {
                rx: input.iter().copied().collect(),
                tx: Vec::new(),
                tx_budget,
                tx_left: tx_budget,
                serviced: 0,
            }
        }

        fn output(&self) -> String {
            String::from_utf8(self.tx.clone()).unwrap()
        }
    }

    impl Transport for ScriptedLink {
        fn bytes_available(&self) -> usize {
            self.rx.len()
        }

        fn receive_byte(&mut self) -> Option<u8> {
            self.rx.pop_front()
        }

        fn send_byte(&mut self, byte: u8) -> Result<(), WouldBlock> {
            if self.tx_left == 0 {
                return Err(WouldBlock);
            }
            self.tx_left -= 1;
            self.tx.push(byte);
            Ok(())
        }

        fn service(&mut self) {
            self.tx_left = self.tx_budget;
            self.serviced += 1;
        }
    }

    fn setup() -> (CommandInterpreter, SimBus) {
        let region = RegionConfig::default();
        (
            CommandInterpreter::new(region, BankResults::new()),
            SimBus::new(region),
        )
    }

    #[test]
    fn test_single_cycle_round_trip() {
        let (mut interpreter, mut bus) = setup();
        let mut pipeline = Pipeline::<64, 256>::new();
        let mut link = ScriptedLink::new(b"sb", usize::MAX);

        let report = pipeline.run_once(&mut link, &mut interpreter, &mut bus);

        assert_eq!(report.received, 2);
        assert_eq!(report.pass.executed, 2);
        assert_eq!(link.output(), " 8192\r\nSRAM_Bank = 0\r\n");
        assert_eq!(report.sent, link.tx.len());
        assert_eq!(link.serviced, 1);
        assert!(pipeline.outbound().is_empty());
    }

    #[test]
    fn test_slow_transport_keeps_order() {
        let (mut interpreter, mut bus) = setup();
        let mut pipeline = Pipeline::<64, 256>::new();
        let mut link = ScriptedLink::new(b"ssss", 3);

        for _ in 0..20 {
            pipeline.run_once(&mut link, &mut interpreter, &mut bus);
        }

        assert_eq!(link.output(), " 8192\r\n".repeat(4));
    }

    #[test]
    fn test_inbound_limit_leaves_bytes_in_transport() {
        let (mut interpreter, mut bus) = setup();
        let mut pipeline = Pipeline::<4, 256>::new();
        let mut link = ScriptedLink::new(b"bbbbbb", usize::MAX);

        let report = pipeline.run_once(&mut link, &mut interpreter, &mut bus);
        assert_eq!(report.received, 4);
        assert_eq!(link.rx.len(), 2);

        let report = pipeline.run_once(&mut link, &mut interpreter, &mut bus);
        assert_eq!(report.received, 2);
        assert_eq!(link.output(), "SRAM_Bank = 0\r\n".repeat(6));
    }

    #[test]
    fn test_split_argument_bytes_across_cycles() {
        let (mut interpreter, mut bus) = setup();
        let mut pipeline = Pipeline::<64, 256>::new();
        let mut link = ScriptedLink::new(&[b'f', 0x00], usize::MAX);

        let report = pipeline.run_once(&mut link, &mut interpreter, &mut bus);
        assert_eq!(report.pass.executed, 0);
        assert_eq!(pipeline.inbound().count(), 2);

        link.rx.extend([0x05, 0x2A]);
        let report = pipeline.run_once(&mut link, &mut interpreter, &mut bus);
        assert_eq!(report.pass.executed, 1);
        assert_eq!(link.output(), "Filled EMA[    5] with  42\r\n");
    }

    #[test]
    fn test_idle_cycle() {
        let (mut interpreter, mut bus) = setup();
        let mut pipeline = Pipeline::<64, 256>::new();
        let mut link = ScriptedLink::new(&[], usize::MAX);

        let report = pipeline.run_once(&mut link, &mut interpreter, &mut bus);
        assert!(report.is_idle());
        assert_eq!(link.serviced, 1);
    }

    #[test]
    fn test_reset_discards_pending() {
        let (mut interpreter, mut bus) = setup();
        let mut pipeline = Pipeline::<64, 256>::new();
        let mut link = ScriptedLink::new(&[b'i', 0x00], 0);

        pipeline.run_once(&mut link, &mut interpreter, &mut bus);
        assert_eq!(pipeline.inbound().count(), 2);

        pipeline.reset();
        assert!(pipeline.inbound().is_empty());
        assert!(pipeline.outbound().is_empty());
    }
}
