//! Host-side test double for [`crate::bus::CardBus`].
//!
//! Scripts an exact sequence of byte exchanges: each call to
//! [`exchange_byte`](CardBus::exchange_byte) consumes one entry from an
//! internal queue, either asserting the outgoing byte matches an expected
//! command/data byte or ignoring the outgoing byte and handing back a
//! scripted response byte. This lets command/data/init/driver unit tests
//! exercise the exact wire sequences from the protocol without any real
//! hardware.

use std::collections::VecDeque;

use crate::bus::CardBus;

enum Op {
    /// Assert the outgoing byte equals this value; return `0xFF` (the
    /// typical don't-care byte the card drives back while the host is
    /// still clocking out a command or data frame).
    Expect(u8),
    /// Ignore the outgoing byte entirely; return `0xFF`.
    Any,
    /// Ignore the outgoing byte; return this value.
    Return(u8),
}

pub(crate) struct MockCardBus {
    ops: VecDeque<Op>,
    present: bool,
    cs_asserted: bool,
}

impl MockCardBus {
    pub(crate) fn new() -> Self {
        MockCardBus {
            ops: VecDeque::new(),
            present: true,
            cs_asserted: false,
        }
    }

    pub(crate) fn set_present(&mut self, present: bool) {
        self.present = present;
    }

    /// Enqueues the 6-byte command frame for `index`/`arg`/`crc` as
    /// expected outgoing bytes.
    pub(crate) fn expect_command(&mut self, index: u8, arg: u32, crc: u8) {
        self.ops.push_back(Op::Expect(0x40 | (index & 0x3F)));
        self.ops.push_back(Op::Expect((arg >> 24) as u8));
        self.ops.push_back(Op::Expect((arg >> 16) as u8));
        self.ops.push_back(Op::Expect((arg >> 8) as u8));
        self.ops.push_back(Op::Expect(arg as u8));
        self.ops.push_back(Op::Expect(crc));
    }

    /// Enqueues an arbitrary outgoing byte that the test does not care to
    /// check (used for data-block payload and padding writes).
    pub(crate) fn expect_any(&mut self, count: usize) {
        for _ in 0..count {
            self.ops.push_back(Op::Any);
        }
    }

    /// Enqueues `bytes` as the next incoming bytes, for the polling loops
    /// and data reads that drive the bus with dummy `0xFF` writes.
    pub(crate) fn push_response_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.ops.push_back(Op::Return(byte));
        }
    }

    pub(crate) fn assert_exhausted(&self) {
        assert!(self.ops.is_empty(), "mock bus had unconsumed scripted ops");
    }
}

impl CardBus for MockCardBus {
    type Error = ();

    fn exchange_byte(&mut self, out: u8) -> Result<u8, Self::Error> {
        match self.ops.pop_front() {
            Some(Op::Expect(expected)) => {
                assert_eq!(out, expected, "unexpected byte written to mock bus");
                Ok(0xFF)
            }
            Some(Op::Any) => Ok(0xFF),
            Some(Op::Return(byte)) => Ok(byte),
            None => panic!("mock bus exchange_byte called with no scripted op remaining"),
        }
    }

    fn assert_cs(&mut self) {
        self.cs_asserted = true;
    }

    fn release_cs(&mut self) {
        self.cs_asserted = false;
    }

    fn card_present(&mut self) -> bool {
        self.present
    }
}
