//! In-memory I2C target for driver tests
//!
//! Models a single register-mapped device: the first written byte sets the
//! register pointer, further bytes are stored with auto-increment, reads
//! return bytes from the pointer onwards.

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub struct BusState {
    pub registers: Vec<u8>,
    /// Every (register, value) write, in order
    pub writes: Vec<(u8, u8)>,
    /// Fail every transfer while set
    pub fail: bool,
}

/// Cloneable handle; clones share the same register file
#[derive(Clone)]
pub struct MockBus {
    address: u8,
    pub state: Arc<Mutex<BusState>>,
}

impl MockBus {
    pub fn new(address: u8) -> Self {
        Self {
            address,
            state: Arc::new(Mutex::new(BusState {
                registers: vec![0; 256],
                ..BusState::default()
            })),
        }
    }

    pub fn set(&self, register: u8, bytes: &[u8]) {
        let mut state = self.state.lock().unwrap();
        let start = register as usize;
        state.registers[start..start + bytes.len()].copy_from_slice(bytes);
    }

    pub fn register(&self, register: u8) -> u8 {
        self.state.lock().unwrap().registers[register as usize]
    }

    pub fn writes(&self) -> Vec<(u8, u8)> {
        self.state.lock().unwrap().writes.clone()
    }

    pub fn set_fail(&self, fail: bool) {
        self.state.lock().unwrap().fail = fail;
    }
}

impl ErrorType for MockBus {
    type Error = ErrorKind;
}

impl I2c for MockBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if address != self.address {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        let mut state = self.state.lock().unwrap();
        if state.fail {
            return Err(ErrorKind::Bus);
        }

        let mut pointer = 0usize;
        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => {
                    let Some((&register, data)) = bytes.split_first() else {
                        continue;
                    };
                    pointer = register as usize;
                    for &value in data {
                        state.registers[pointer] = value;
                        state.writes.push((pointer as u8, value));
                        pointer += 1;
                    }
                }
                Operation::Read(buf) => {
                    buf.copy_from_slice(&state.registers[pointer..pointer + buf.len()]);
                    pointer += buf.len();
                }
            }
        }
        Ok(())
    }
}
