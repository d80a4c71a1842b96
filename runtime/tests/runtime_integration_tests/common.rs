// Licensed under the Apache-2.0 license

use cryptoeng_drivers::{Addr, DriverConfig, KatId};
use cryptoeng_emu_periph::EmuHal;
use cryptoeng_runtime::{Command, Dispatcher, Drivers, Response};

/// Owner tokens of two remote callers
pub const OWNER_A: u32 = 0x11;
pub const OWNER_B: u32 = 0x22;

pub const KAT_SCRATCH: Addr = 0x3_0000;

pub fn config() -> DriverConfig {
    DriverConfig {
        max_polls: 1_000,
        ..Default::default()
    }
}

/// Dispatcher whose engines have passed every self test
pub fn run_rt_test() -> Dispatcher<EmuHal> {
    let mut drivers = Drivers::new(EmuHal::new(), &config(), KAT_SCRATCH);
    assert_eq!(drivers.init_engines(), Ok(KatId::all()));
    Dispatcher::new(drivers)
}

/// Dispatcher on which no self test ran
pub fn run_rt_test_no_kats() -> Dispatcher<EmuHal> {
    Dispatcher::new(Drivers::new(EmuHal::new(), &config(), KAT_SCRATCH))
}

pub fn hal(rt: &mut Dispatcher<EmuHal>) -> &mut EmuHal {
    &mut rt.drivers_mut().hal
}

pub fn put(rt: &mut Dispatcher<EmuHal>, addr: Addr, data: &[u8]) {
    hal(rt).mem.write(addr, data).unwrap();
}

pub fn put_hex(rt: &mut Dispatcher<EmuHal>, addr: Addr, hex_str: &str) {
    put(rt, addr, &hex::decode(hex_str).unwrap());
}

pub fn read(rt: &Dispatcher<EmuHal>, addr: Addr, len: usize) -> Vec<u8> {
    rt.drivers().hal.mem.slice(addr, len).unwrap()
}

pub fn read_hex(rt: &Dispatcher<EmuHal>, addr: Addr, len: usize) -> String {
    hex::encode(read(rt, addr, len))
}

pub fn exec(rt: &mut Dispatcher<EmuHal>, owner: u32, cmd: Command) {
    assert_eq!(rt.dispatch(owner, &cmd), Ok(Response::Done));
}
