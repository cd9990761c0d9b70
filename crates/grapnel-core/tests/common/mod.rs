//! Shared scripted collaborators for the unwind tests.
//!
//! The catalog is a small x86-64-flavoured register file with deliberately
//! scrambled debugger-kind numbering (so kind conversion is actually
//! exercised), and the other collaborators are backed by plain maps the
//! tests populate.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use grapnel_core::error::{Result, UnwindError};
use grapnel_core::plan::UnwindPlan;
use grapnel_core::target::{
    InferiorMemory, InjectedCallRegisters, RegisterCatalog, SymbolQuery, Target, ThreadRegisters, UnwindPlanSource,
};
use grapnel_core::types::{Address, RegisterInfo, RegisterKind, RegisterSet, RegisterValue};

// Debugger-kind register numbers (catalog indices).
pub const RIP: u32 = 0;
pub const RSP: u32 = 1;
pub const RBP: u32 = 2;
pub const RAX: u32 = 3;
pub const RBX: u32 = 4;
pub const RCX: u32 = 5;
pub const RDX: u32 = 6;
pub const RSI: u32 = 7;
pub const RDI: u32 = 8;
pub const R12: u32 = 9;
pub const R13: u32 = 10;

// DWARF numbers for the same registers, used when building plans.
pub const DW_RIP: u32 = 16;
pub const DW_RSP: u32 = 7;
pub const DW_RBP: u32 = 6;
pub const DW_RAX: u32 = 0;
pub const DW_RBX: u32 = 3;
pub const DW_R12: u32 = 12;

struct Entry
{
    name: &'static str,
    debugger: u32,
    dwarf: u32,
    abi: Option<u32>,
    generic: Option<u32>,
    volatile: bool,
}

pub struct TestCatalog
{
    entries: Vec<Entry>,
    infos: Vec<RegisterInfo>,
    sets: Vec<RegisterSet>,
}

impl TestCatalog
{
    pub fn x86_64() -> Self
    {
        // generic numbering: pc = 0, sp = 1, fp = 2 (GenericRegister::number)
        let entries = vec![
            Entry { name: "rip", debugger: RIP, dwarf: 16, abi: None, generic: Some(0), volatile: false },
            Entry { name: "rsp", debugger: RSP, dwarf: 7, abi: Some(107), generic: Some(1), volatile: false },
            Entry { name: "rbp", debugger: RBP, dwarf: 6, abi: Some(106), generic: Some(2), volatile: false },
            Entry { name: "rax", debugger: RAX, dwarf: 0, abi: Some(100), generic: None, volatile: true },
            Entry { name: "rbx", debugger: RBX, dwarf: 3, abi: Some(103), generic: None, volatile: false },
            Entry { name: "rcx", debugger: RCX, dwarf: 2, abi: Some(102), generic: None, volatile: true },
            Entry { name: "rdx", debugger: RDX, dwarf: 1, abi: Some(101), generic: None, volatile: true },
            Entry { name: "rsi", debugger: RSI, dwarf: 4, abi: Some(104), generic: None, volatile: true },
            Entry { name: "rdi", debugger: RDI, dwarf: 5, abi: Some(105), generic: None, volatile: true },
            Entry { name: "r12", debugger: R12, dwarf: 12, abi: Some(112), generic: None, volatile: false },
            Entry { name: "r13", debugger: R13, dwarf: 13, abi: Some(113), generic: None, volatile: false },
        ];
        let infos = entries
            .iter()
            .map(|entry| RegisterInfo {
                name: entry.name.to_string(),
                regnum: entry.debugger,
                byte_size: 8,
                is_volatile: entry.volatile,
            })
            .collect();
        let sets = vec![RegisterSet {
            name: "General Purpose Registers".to_string(),
            registers: entries.iter().map(|entry| entry.debugger).collect(),
        }];
        Self { entries, infos, sets }
    }

    fn number_in(entry: &Entry, kind: RegisterKind) -> Option<u32>
    {
        match kind {
            RegisterKind::Debugger => Some(entry.debugger),
            RegisterKind::Dwarf => Some(entry.dwarf),
            RegisterKind::Abi => entry.abi,
            RegisterKind::Generic => entry.generic,
        }
    }
}

impl RegisterCatalog for TestCatalog
{
    fn register_count(&self) -> usize
    {
        self.infos.len()
    }

    fn register_info(&self, regnum: u32) -> Option<&RegisterInfo>
    {
        self.infos.get(regnum as usize)
    }

    fn register_set_count(&self) -> usize
    {
        self.sets.len()
    }

    fn register_set(&self, index: usize) -> Option<&RegisterSet>
    {
        self.sets.get(index)
    }

    fn convert_between_kinds(&self, from: RegisterKind, num: u32, to: RegisterKind) -> Option<u32>
    {
        if from == to {
            return Some(num);
        }
        let entry = self.entries.iter().find(|entry| Self::number_in(entry, from) == Some(num))?;
        Self::number_in(entry, to)
    }
}

#[derive(Default)]
pub struct TestThread
{
    pub regs: HashMap<u32, u64>,
}

impl TestThread
{
    pub fn set(&mut self, regnum: u32, value: u64)
    {
        self.regs.insert(regnum, value);
    }
}

impl ThreadRegisters for TestThread
{
    fn read_register(&self, regnum: u32) -> Result<RegisterValue>
    {
        self.regs
            .get(&regnum)
            .map(|value| RegisterValue::from_u64(*value, 8))
            .ok_or(UnwindError::Thread(regnum))
    }

    fn write_register(&mut self, regnum: u32, value: &RegisterValue) -> Result<()>
    {
        let value = value.as_u64().ok_or(UnwindError::Thread(regnum))?;
        self.regs.insert(regnum, value);
        Ok(())
    }
}

#[derive(Default)]
pub struct TestMemory
{
    pub bytes: HashMap<u64, u8>,
}

impl TestMemory
{
    pub fn set_u64(&mut self, address: u64, value: u64)
    {
        for (index, byte) in value.to_le_bytes().iter().enumerate() {
            self.bytes.insert(address + index as u64, *byte);
        }
    }

    pub fn get_u64(&self, address: u64) -> Option<u64>
    {
        let mut le = [0u8; 8];
        for (index, slot) in le.iter_mut().enumerate() {
            *slot = *self.bytes.get(&(address + index as u64))?;
        }
        Some(u64::from_le_bytes(le))
    }
}

impl InferiorMemory for TestMemory
{
    fn read(&self, address: Address, buf: &mut [u8]) -> Result<()>
    {
        let len = buf.len();
        for (index, slot) in buf.iter_mut().enumerate() {
            *slot = *self
                .bytes
                .get(&(address.value() + index as u64))
                .ok_or(UnwindError::Memory { address, len })?;
        }
        Ok(())
    }

    fn write(&mut self, address: Address, bytes: &[u8]) -> Result<()>
    {
        for (index, byte) in bytes.iter().enumerate() {
            self.bytes.insert(address.value() + index as u64, *byte);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct TestPlans
{
    pub fast: Vec<Arc<UnwindPlan>>,
    pub full: Vec<Arc<UnwindPlan>>,
    pub fallback: Option<Arc<UnwindPlan>>,
}

impl UnwindPlanSource for TestPlans
{
    fn fast_plan(&self, pc: Address) -> Option<Arc<UnwindPlan>>
    {
        self.fast.iter().find(|plan| plan.covers_pc(pc) && plan.valid_range().is_some()).cloned()
    }

    fn full_plan(&self, pc: Address) -> Option<Arc<UnwindPlan>>
    {
        self.full.iter().find(|plan| plan.covers_pc(pc) && plan.valid_range().is_some()).cloned()
    }

    fn fallback_plan(&self) -> Option<Arc<UnwindPlan>>
    {
        self.fallback.clone()
    }
}

#[derive(Default)]
pub struct TestSymbols
{
    // (start, end, is_trap_handler)
    pub functions: Vec<(u64, u64, bool)>,
}

impl TestSymbols
{
    pub fn add_function(&mut self, start: u64, end: u64)
    {
        self.functions.push((start, end, false));
    }

    pub fn add_trap_handler(&mut self, start: u64, end: u64)
    {
        self.functions.push((start, end, true));
    }

    fn containing(&self, pc: Address) -> Option<&(u64, u64, bool)>
    {
        self.functions.iter().find(|(start, end, _)| *start <= pc.value() && pc.value() < *end)
    }
}

impl SymbolQuery for TestSymbols
{
    fn function_bounds(&self, pc: Address) -> Option<(Address, Address)>
    {
        self.containing(pc).map(|(start, end, _)| (Address::from(*start), Address::from(*end)))
    }

    fn is_trap_handler(&self, pc: Address) -> bool
    {
        self.containing(pc).is_some_and(|(_, _, trap)| *trap)
    }
}

#[derive(Default)]
pub struct TestInjected
{
    pub range: Option<(u64, u64)>,
    pub saved: Vec<(u32, u64)>,
}

impl InjectedCallRegisters for TestInjected
{
    fn is_injected_call(&self, pc: Address) -> bool
    {
        self.range.is_some_and(|(start, end)| start <= pc.value() && pc.value() < end)
    }

    fn saved_registers(&self, pc: Address) -> Option<Vec<(u32, RegisterValue)>>
    {
        if !self.is_injected_call(pc) {
            return None;
        }
        Some(
            self.saved
                .iter()
                .map(|(regnum, value)| (*regnum, RegisterValue::from_u64(*value, 8)))
                .collect(),
        )
    }
}

pub struct TestTarget
{
    pub catalog: TestCatalog,
    pub thread: TestThread,
    pub memory: TestMemory,
    pub plans: TestPlans,
    pub symbols: TestSymbols,
    pub injected: TestInjected,
}

impl TestTarget
{
    pub fn new() -> Self
    {
        Self {
            catalog: TestCatalog::x86_64(),
            thread: TestThread::default(),
            memory: TestMemory::default(),
            plans: TestPlans::default(),
            symbols: TestSymbols::default(),
            injected: TestInjected::default(),
        }
    }

    pub fn target(&mut self) -> Target<'_>
    {
        Target {
            catalog: &self.catalog,
            thread: &mut self.thread,
            memory: &mut self.memory,
            plans: &self.plans,
            symbols: &self.symbols,
            injected: &self.injected,
        }
    }
}

impl Default for TestTarget
{
    fn default() -> Self
    {
        Self::new()
    }
}

/// A four-frame stack with classic frame-pointer prologues:
///
/// ```text
/// frame 0  func_c  pc 0x4020  cfa 0x7000   (live)
/// frame 1  func_b  pc 0x3040  cfa 0x8000
/// frame 2  func_a  pc 0x2040  cfa 0x9000
/// frame 3  main    pc 0x1030  cfa 0xa000   (saved return address 0 ends it)
/// ```
///
/// Register saves: `func_c` saves rbx at `cfa0 - 24`; `func_b` saves r12 at
/// `cfa1 - 24`; rax (volatile) and r13 (non-volatile) are saved nowhere.
/// `func_c` also has a fast plan that covers only rip and rbp.
pub fn four_frame_stack() -> TestTarget
{
    use grapnel_core::plan::{CfaRule, SavedRegisterRule, UnwindPlanRow};

    let mut fixture = TestTarget::new();

    fixture.symbols.add_function(0x1000, 0x1100); // main
    fixture.symbols.add_function(0x2000, 0x2100); // func_a
    fixture.symbols.add_function(0x3000, 0x3100); // func_b
    fixture.symbols.add_function(0x4000, 0x4100); // func_c

    fixture.thread.set(RIP, 0x4020);
    fixture.thread.set(RSP, 0x6fd0);
    fixture.thread.set(RBP, 0x6ff0);
    fixture.thread.set(RAX, 0xaaaa);
    fixture.thread.set(RBX, 0x1111);
    fixture.thread.set(R12, 0x2222);
    fixture.thread.set(R13, 0x3333);

    let entry_row = || {
        UnwindPlanRow::new(0, CfaRule::RegisterPlusOffset { regnum: DW_RSP, offset: 8 })
            .with_rule(DW_RIP, SavedRegisterRule::AtCfaOffset(-8))
    };
    let body_row = || {
        UnwindPlanRow::new(0x10, CfaRule::RegisterPlusOffset { regnum: DW_RBP, offset: 16 })
            .with_rule(DW_RIP, SavedRegisterRule::AtCfaOffset(-8))
            .with_rule(DW_RBP, SavedRegisterRule::AtCfaOffset(-16))
    };

    let func_c_full = UnwindPlan::new(RegisterKind::Dwarf, "debug_frame func_c", true)
        .with_valid_range(Address::from(0x4000), Address::from(0x4100))
        .with_row(entry_row())
        .with_row(body_row().with_rule(DW_RBX, SavedRegisterRule::AtCfaOffset(-24)));
    let func_c_fast = UnwindPlan::new(RegisterKind::Dwarf, "fast func_c", false)
        .with_valid_range(Address::from(0x4000), Address::from(0x4100))
        .with_row(entry_row())
        .with_row(body_row());
    let func_b_full = UnwindPlan::new(RegisterKind::Dwarf, "debug_frame func_b", true)
        .with_valid_range(Address::from(0x3000), Address::from(0x3100))
        .with_row(entry_row())
        .with_row(body_row().with_rule(DW_R12, SavedRegisterRule::AtCfaOffset(-24)));
    let func_a_full = UnwindPlan::new(RegisterKind::Dwarf, "debug_frame func_a", true)
        .with_valid_range(Address::from(0x2000), Address::from(0x2100))
        .with_row(entry_row())
        .with_row(body_row());
    let main_full = UnwindPlan::new(RegisterKind::Dwarf, "debug_frame main", true)
        .with_valid_range(Address::from(0x1000), Address::from(0x1100))
        .with_row(entry_row())
        .with_row(body_row());

    fixture.plans.fast.push(Arc::new(func_c_fast));
    fixture.plans.full.push(Arc::new(func_c_full));
    fixture.plans.full.push(Arc::new(func_b_full));
    fixture.plans.full.push(Arc::new(func_a_full));
    fixture.plans.full.push(Arc::new(main_full));

    // frame 0 (func_c): cfa 0x7000
    fixture.memory.set_u64(0x6fe8, 0xb10b); // saved rbx
    fixture.memory.set_u64(0x6ff0, 0x7ff0); // saved rbp
    fixture.memory.set_u64(0x6ff8, 0x3040); // return address into func_b
    // frame 1 (func_b): cfa 0x8000
    fixture.memory.set_u64(0x7fe8, 0xcafe); // saved r12
    fixture.memory.set_u64(0x7ff0, 0x8ff0); // saved rbp
    fixture.memory.set_u64(0x7ff8, 0x2040); // return address into func_a
    // frame 2 (func_a): cfa 0x9000
    fixture.memory.set_u64(0x8ff0, 0x9ff0); // saved rbp
    fixture.memory.set_u64(0x8ff8, 0x1030); // return address into main
    // frame 3 (main): cfa 0xa000; zero return address ends the walk
    fixture.memory.set_u64(0x9ff0, 0);
    fixture.memory.set_u64(0x9ff8, 0);

    fixture
}
