//! The opcode fetch/dispatch loop: drives a [`calc_asm::CompiledFunction`]'s
//! raw word stream one decoded [`calc_asm::Opcode`] at a time.
//!
//! A single shared operand stack spans every active call; a [`Frame`]
//! records only what's private to one activation (locals, actual
//! arguments, the saved stack height). Schema-bound overload functions
//! (`dispatch::DispatchOutcome::CallOverload`) are invoked by pushing a
//! [`Continuation`] alongside the new frame describing what to do with its
//! return value once it completes, since a dispatch function has no way
//! to call back into the VM itself.

pub mod calls;
pub mod frame;

use crate::config::ConfigSnapshot;
use crate::dispatch;
use crate::dispatch::DispatchOutcome;
use crate::error::{InterpreterError, RuntimeError};
use crate::kernel::{TranscendentalCache, C, Q, Z};
use crate::state::ProgramState;
use crate::value::{new_slot, Object, Pointer, Schema, Slot, Value, ValueBody, ValueTag};
use calc_asm::{ConfigKey, EngineFault, ErrorCode, Opcode, Word};
use frame::Frame;
use std::rc::Rc;

/// What to do with a call's return value once its frame pops, for calls
/// the interpreter itself initiated on a dispatch function's behalf
/// rather than via an explicit [`Opcode::Call`]/[`Opcode::UserCall`].
#[derive(Debug, Clone)]
enum Continuation {
    /// Push the value straight onto the shared operand stack (ordinary
    /// `UserCall`, and every arithmetic/assign overload hook).
    Push,
    /// Apply a three-way-comparison overload's result through a
    /// relational comparator, pushing the boolean outcome.
    Relate(Comparator),
    /// An `Overload::Inc`/`Overload::Dec` hook: write the result back into
    /// `dest`, then push either the result (pre-step) or `old` (post-step).
    Step { dest: Slot, old: Option<Value> },
}

#[derive(Debug, Clone, Copy)]
enum Comparator {
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparator {
    fn apply(self, ordering: i64) -> bool {
        match self {
            Comparator::Lt => ordering < 0,
            Comparator::Le => ordering <= 0,
            Comparator::Gt => ordering > 0,
            Comparator::Ge => ordering >= 0,
        }
    }
}

enum StepOutcome {
    Continue,
    Returned(Value),
}

/// The engine: everything a compiled program can reach through its
/// opcodes, and nothing more (no filesystem, no REPL front-end).
pub struct Interpreter {
    pub functions: Vec<calc_asm::CompiledFunction>,
    pub schemas: Vec<Rc<Schema>>,
    pub globals: Vec<Slot>,
    pub config: ConfigSnapshot,
    transcendental: TranscendentalCache,
    stack: Vec<Value>,
    frames: Vec<Frame>,
    continuations: Vec<Continuation>,
    /// The value captured by the last [`Opcode::Save`] (`spec.md` §5's
    /// "old value" register, read back by [`Opcode::OldValue`]).
    saved: Value,
    /// Whether `Save` actually captures (toggled by `SaveVal`).
    save_gate: bool,
    aborted: bool,
    call_depth_limit: u32,
}

impl Interpreter {
    pub fn new(functions: Vec<calc_asm::CompiledFunction>, global_count: usize) -> Self {
        tracing::debug!(functions = functions.len(), globals = global_count, "constructing interpreter");
        Interpreter {
            functions,
            schemas: Vec::new(),
            globals: (0..global_count).map(|_| new_slot(Value::null())).collect(),
            config: ConfigSnapshot::default(),
            transcendental: TranscendentalCache::new(),
            stack: Vec::new(),
            frames: Vec::new(),
            continuations: Vec::new(),
            saved: Value::null(),
            save_gate: true,
            aborted: false,
            call_depth_limit: 1000,
        }
    }

    /// Request cooperative abort at the next [`Opcode::Debug`] checkpoint
    /// (`spec.md` §5, ctrl-C).
    pub fn request_abort(&mut self) {
        self.aborted = true;
    }

    /// Run `func_index` with `args`, to completion.
    pub fn call(&mut self, func_index: u32, args: Vec<Value>) -> Result<Value, InterpreterError> {
        self.push_call(func_index, args, Continuation::Push)
            .map_err(to_interpreter_error)?;
        self.drive()
    }

    /// Run `func_index` with `args`, folding a `QUIT` opcode into a normal
    /// [`ProgramState::Quit`] outcome instead of an error.
    pub fn run(&mut self, func_index: u32, args: Vec<Value>) -> Result<ProgramState, InterpreterError> {
        match self.call(func_index, args) {
            Ok(v) => Ok(ProgramState::Completed(v)),
            Err(InterpreterError::Halted(EngineFault::Quit(msg))) => Ok(ProgramState::Quit(msg)),
            Err(e) => Err(e),
        }
    }

    fn drive(&mut self) -> Result<Value, InterpreterError> {
        loop {
            let frame = self.frames.last().expect("drive is only entered with an active frame");
            let pc = frame.pc;
            let func_index = frame.func_index as usize;
            let (op, next_pc) = {
                let code = self.functions[func_index].code();
                calc_asm::decode_one(code, pc)
                    .map_err(|e| InterpreterError::Halted(EngineFault::MalformedProgram(e.to_string())))?
            };
            self.frames.last_mut().unwrap().pc = next_pc;

            match self.execute(op) {
                Ok(StepOutcome::Continue) => {}
                Ok(StepOutcome::Returned(value)) => {
                    self.frames.pop();
                    let cont = self.continuations.pop().expect("one continuation per frame");
                    self.apply_continuation(cont, value);
                    if self.frames.is_empty() {
                        return Ok(self.stack.pop().expect("a continuation always leaves a value"));
                    }
                }
                Err(RuntimeError::Recoverable(code)) => self.stack.push(Value::error(code)),
                Err(RuntimeError::Halt(fault)) => {
                    tracing::error!(?fault, pc, func_index, "interpreter halted");
                    return Err(InterpreterError::Halted(fault));
                }
            }
        }
    }

    fn apply_continuation(&mut self, cont: Continuation, value: Value) {
        match cont {
            Continuation::Push => self.stack.push(value),
            Continuation::Relate(cmp) => match value.as_error() {
                Some(code) => self.stack.push(Value::error(code)),
                None => {
                    let ordering = value.as_int().unwrap_or(0);
                    self.stack.push(Value::int(cmp.apply(ordering) as i64));
                }
            },
            Continuation::Step { dest, old } => match value.as_error() {
                Some(code) => self.stack.push(Value::error(code)),
                None => {
                    let written = dispatch::assign::assign(&dest, value);
                    self.stack.push(old.unwrap_or(written));
                }
            },
        }
    }

    fn push_call(&mut self, func_index: u32, args: Vec<Value>, cont: Continuation) -> Result<(), RuntimeError> {
        if self.frames.len() as u32 >= self.call_depth_limit {
            return Err(EngineFault::CallDepthExceeded(self.call_depth_limit).into());
        }
        let local_count = self
            .functions
            .get(func_index as usize)
            .ok_or(EngineFault::AddressOutOfRange(func_index))?
            .local_count as usize;
        let mut frame = Frame::new(func_index, local_count, args);
        frame.stack_base = self.stack.len();
        self.frames.push(frame);
        self.continuations.push(cont);
        Ok(())
    }

    fn pop(&mut self) -> Result<Value, RuntimeError> {
        self.stack.pop().ok_or_else(|| {
            EngineFault::StackUnderflow {
                needed: 1,
                available: 0,
            }
            .into()
        })
    }

    fn pop_n(&mut self, n: usize) -> Result<Vec<Value>, RuntimeError> {
        if self.stack.len() < n {
            return Err(EngineFault::StackUnderflow {
                needed: n,
                available: self.stack.len(),
            }
            .into());
        }
        // `split_off` keeps the removed slice in its original bottom-to-top
        // order, which is exactly call order (arg0 pushed first).
        Ok(self.stack.split_off(self.stack.len() - n))
    }

    fn pop_int(&mut self) -> Result<i64, RuntimeError> {
        let v = self.pop()?;
        v.as_int()
            .ok_or_else(|| EngineFault::TypeInvariantViolated("expected an integer operand".to_string()).into())
    }

    fn resolve(&mut self, outcome: DispatchOutcome) -> Result<(), RuntimeError> {
        match outcome {
            DispatchOutcome::Value(v) => {
                self.stack.push(v);
                Ok(())
            }
            DispatchOutcome::CallOverload { func_index, args } => self.push_call(func_index, args, Continuation::Push),
        }
    }

    fn resolve_relational(&mut self, outcome: DispatchOutcome, cmp: Comparator) -> Result<(), RuntimeError> {
        match outcome {
            DispatchOutcome::Value(v) => {
                if let Some(code) = v.as_error() {
                    self.stack.push(Value::error(code));
                } else {
                    let ordering = v.as_int().unwrap_or(0);
                    self.stack.push(Value::int(cmp.apply(ordering) as i64));
                }
                Ok(())
            }
            DispatchOutcome::CallOverload { func_index, args } => {
                self.push_call(func_index, args, Continuation::Relate(cmp))
            }
        }
    }

    fn resolve_step(&mut self, outcome: DispatchOutcome, dest: &Slot, old: Option<Value>) -> Result<(), RuntimeError> {
        match outcome {
            DispatchOutcome::Value(v) => {
                self.stack.push(old.unwrap_or(v));
                Ok(())
            }
            DispatchOutcome::CallOverload { func_index, args } => self.push_call(
                func_index,
                args,
                Continuation::Step {
                    dest: dest.clone(),
                    old,
                },
            ),
        }
    }

    fn current_local(&self, index: u16) -> Result<Slot, RuntimeError> {
        self.frames
            .last()
            .expect("opcode execution always has a frame")
            .locals
            .get(index as usize)
            .cloned()
            .ok_or_else(|| EngineFault::AddressOutOfRange(index as u32).into())
    }

    fn current_param(&self, index: u16) -> Result<Slot, RuntimeError> {
        self.frames
            .last()
            .expect("opcode execution always has a frame")
            .args
            .get(index as usize)
            .cloned()
            .ok_or_else(|| EngineFault::AddressOutOfRange(index as u32).into())
    }

    fn global(&self, index: u32) -> Result<Slot, RuntimeError> {
        self.globals
            .get(index as usize)
            .cloned()
            .ok_or_else(|| EngineFault::AddressOutOfRange(index).into())
    }

    fn load_number(&self, idx: u32, imaginary: bool) -> Result<Value, RuntimeError> {
        let frame = self.frames.last().expect("opcode execution always has a frame");
        let table = &self.functions[frame.func_index as usize].constants;
        let entry = table
            .numbers
            .get(idx as usize)
            .ok_or_else(|| EngineFault::AddressOutOfRange(idx))?;
        let parse = |s: &str| -> Result<Z, RuntimeError> {
            Z::from_decimal_str(s).ok_or_else(|| EngineFault::MalformedProgram(format!("bad constant {s:?}")).into())
        };
        let num = Q::new(parse(&entry.numerator)?, parse(&entry.denominator)?)
            .ok_or_else(|| EngineFault::MalformedProgram("zero denominator constant".to_string()))?;
        if !imaginary && entry.imag_numerator.is_none() {
            return Ok(Value::num(num));
        }
        let imag = if let (Some(n), Some(d)) = (&entry.imag_numerator, &entry.imag_denominator) {
            Q::new(parse(n)?, parse(d)?).ok_or_else(|| EngineFault::MalformedProgram("zero denominator constant".to_string()))?
        } else {
            Q::zero()
        };
        if imaginary {
            Ok(Value::from_c(C::new(Q::zero(), num)))
        } else {
            Ok(Value::from_c(C::new(num, imag)))
        }
    }

    fn load_string(&self, idx: u32) -> Result<Value, RuntimeError> {
        let frame = self.frames.last().expect("opcode execution always has a frame");
        let table = &self.functions[frame.func_index as usize].constants;
        let s = table
            .strings
            .get(idx as usize)
            .ok_or_else(|| EngineFault::AddressOutOfRange(idx))?;
        Ok(Value::string(s.clone().into_bytes()))
    }

    fn index_one(&mut self) -> Result<(Value, Value), RuntimeError> {
        let key = self.pop()?;
        let container = self.pop()?;
        Ok((container, key))
    }

    fn execute(&mut self, op: Opcode) -> Result<StepOutcome, RuntimeError> {
        use Opcode::*;
        tracing::trace!(?op, "dispatch opcode");
        match op {
            // -- Addressing ------------------------------------------------
            LocalAddr(i) => {
                let slot = self.current_local(i)?;
                self.stack.push(Value::new(ValueBody::Addr(slot)));
            }
            LocalValue(i) => {
                let slot = self.current_local(i)?;
                let v = slot.borrow().clone();
                self.stack.push(v);
            }
            GlobalAddr(i) => {
                let slot = self.global(i)?;
                self.stack.push(Value::new(ValueBody::Addr(slot)));
            }
            GlobalValue(i) => {
                let slot = self.global(i)?;
                let v = slot.borrow().clone();
                self.stack.push(v);
            }
            ParamAddr(i) => {
                let slot = self.current_param(i)?;
                self.stack.push(Value::new(ValueBody::Addr(slot)));
            }
            ParamValue(i) => {
                let slot = self.current_param(i)?;
                let v = slot.borrow().clone();
                self.stack.push(v);
            }
            ArgValue => {
                let index = self.pop_int()?;
                let slot = self.current_param((index.max(1) - 1) as u16)?;
                let v = slot.borrow().clone();
                self.stack.push(v);
            }
            OldValue => self.stack.push(self.saved.clone()),
            Ptr => {
                let v = self.pop()?;
                let ptr = match v.body() {
                    ValueBody::Addr(slot) => {
                        let narrowed = match slot.borrow().body() {
                            ValueBody::Str(rc) => Some(Pointer::SPtr(rc.clone())),
                            ValueBody::Num(rc) => Some(Pointer::NPtr(rc.clone())),
                            _ => None,
                        };
                        narrowed.unwrap_or_else(|| Pointer::VPtr(slot.clone()))
                    }
                    ValueBody::Octet(o) => Pointer::OPtr(o.clone()),
                    _ => {
                        return Err(EngineFault::TypeInvariantViolated("PTR requires an lvalue".to_string()).into())
                    }
                };
                self.stack.push(Value::new(ValueBody::Ptr(ptr)));
            }
            Deref => {
                let v = self.pop()?;
                let out = match v.body() {
                    ValueBody::Ptr(Pointer::VPtr(slot)) => slot.borrow().clone(),
                    ValueBody::Ptr(Pointer::OPtr(o)) => {
                        let byte = o.data.borrow().get(o.index).copied().unwrap_or(0);
                        Value::int(byte as i64)
                    }
                    ValueBody::Ptr(Pointer::SPtr(rc)) => Value::new(ValueBody::Str(rc.clone())),
                    ValueBody::Ptr(Pointer::NPtr(rc)) => Value::num((*rc).clone()),
                    _ => {
                        return Err(EngineFault::TypeInvariantViolated("DEREF requires a pointer".to_string()).into())
                    }
                };
                self.stack.push(out);
            }
            FiAddr => {
                let (mut container, key) = self.index_one()?;
                match dispatch::index::index(&mut container, &[key]) {
                    Ok(slot) => self.stack.push(Value::new(ValueBody::Addr(slot))),
                    Err(code) => return Err(code.into()),
                }
            }
            FiValue => {
                let (mut container, key) = self.index_one()?;
                match dispatch::index::index(&mut container, &[key]) {
                    Ok(slot) => {
                        let v = slot.borrow().clone();
                        self.stack.push(v);
                    }
                    Err(code) => return Err(code.into()),
                }
            }

            // -- Constants ---------------------------------------------------
            Number(idx) => {
                let v = self.load_number(idx, false)?;
                self.stack.push(v);
            }
            Imaginary(idx) => {
                let v = self.load_number(idx, true)?;
                self.stack.push(v);
            }
            String(idx) => {
                let v = self.load_string(idx)?;
                self.stack.push(v);
            }
            Undef => self.stack.push(Value::null()),
            Zero => self.stack.push(Value::int(0)),
            One => self.stack.push(Value::int(1)),
            ObjCreate(schema_idx) => {
                let schema = self
                    .schemas
                    .get(schema_idx as usize)
                    .cloned()
                    .ok_or(EngineFault::AddressOutOfRange(schema_idx))?;
                self.stack.push(Value::new(ValueBody::Obj(Rc::new(Object::new(schema)))));
            }
            MatCreate(dim) => {
                let mut raw = Vec::with_capacity(2 * dim as usize);
                for _ in 0..2 * dim as usize {
                    raw.push(self.pop_int()?);
                }
                raw.reverse();
                let bounds = raw
                    .chunks(2)
                    .map(|c| crate::value::Bound { min: c[0], max: c[1] })
                    .collect();
                let matrix = crate::value::Matrix::new(bounds);
                self.stack.push(Value::new(ValueBody::Mat(Rc::new(matrix))));
            }
            ElemInit(position) => {
                let value = self.pop()?;
                let container = self.stack.last().ok_or(EngineFault::StackUnderflow {
                    needed: 1,
                    available: 0,
                })?;
                let subtype = container.subtype();
                if subtype.contains(crate::value::Subtype::NO_COPY_TO) || subtype.contains(crate::value::Subtype::PROTECT_ALL) {
                    return Err(ErrorCode::NotAssignable.into());
                }
                if value.subtype().contains(crate::value::Subtype::NO_COPY_FROM) {
                    return Err(ErrorCode::NotAssignable.into());
                }
                match container.body() {
                    ValueBody::Mat(m) => {
                        if let Some(slot) = m.slot_at_position(position as usize) {
                            *slot.borrow_mut() = value;
                        }
                    }
                    ValueBody::Obj(o) => {
                        if let Some(slot) = o.element_at(position as usize) {
                            *slot.borrow_mut() = value;
                        }
                    }
                    _ => return Err(EngineFault::TypeInvariantViolated("ELEMINIT on a non-container".to_string()).into()),
                }
            }
            InitFill => {
                let fill = self.pop()?;
                let container = self.stack.last().ok_or(EngineFault::StackUnderflow {
                    needed: 1,
                    available: 0,
                })?;
                let slots: Vec<Slot> = match container.body() {
                    ValueBody::Mat(m) => m.elements().to_vec(),
                    ValueBody::Obj(o) => o.elements().to_vec(),
                    _ => return Err(EngineFault::TypeInvariantViolated("INITFILL on a non-container".to_string()).into()),
                };
                for slot in slots {
                    let is_null = slot.borrow().is_null();
                    if is_null {
                        *slot.borrow_mut() = fill.clone();
                    }
                }
            }

            // -- Arithmetic ----------------------------------------------------
            Add => {
                let (a, b) = (self.pop()?, self.pop()?);
                let outcome = dispatch::arith::add(&b, &a);
                self.resolve(outcome)?;
            }
            Sub => {
                let (a, b) = (self.pop()?, self.pop()?);
                let outcome = dispatch::arith::sub(&b, &a);
                self.resolve(outcome)?;
            }
            Mul => {
                let (a, b) = (self.pop()?, self.pop()?);
                let outcome = dispatch::arith::mul(&b, &a);
                self.resolve(outcome)?;
            }
            Div => {
                let (a, b) = (self.pop()?, self.pop()?);
                let outcome = dispatch::arith::div(&b, &a);
                self.resolve(outcome)?;
            }
            Quo => {
                let (a, b) = (self.pop()?, self.pop()?);
                self.stack.push(integer_quotient(&b, &a, self.config.quomod)?);
            }
            Mod => {
                let (a, b) = (self.pop()?, self.pop()?);
                self.stack.push(integer_remainder(&b, &a, self.config.quomod)?);
            }
            Power => {
                let (a, b) = (self.pop()?, self.pop()?);
                self.stack.push(power(&b, &a)?);
            }
            Negate => {
                let a = self.pop()?;
                let outcome = dispatch::arith::negate(&a);
                self.resolve(outcome)?;
            }
            Invert => {
                let a = self.pop()?;
                let outcome = dispatch::arith::invert(&a);
                self.resolve(outcome)?;
            }
            Square => {
                let a = self.pop()?;
                let outcome = dispatch::arith::square(&a);
                self.resolve(outcome)?;
            }
            Int => {
                let a = self.pop()?;
                let outcome = dispatch::arith::int_part(&a);
                self.resolve(outcome)?;
            }
            Frac => {
                let a = self.pop()?;
                let outcome = dispatch::arith::frac_part(&a);
                self.resolve(outcome)?;
            }
            Numerator => {
                let a = self.pop()?;
                let outcome = dispatch::arith::numerator(&a);
                self.resolve(outcome)?;
            }
            Denominator => {
                let a = self.pop()?;
                let outcome = dispatch::arith::denominator(&a);
                self.resolve(outcome)?;
            }
            Scale => {
                let (exp, a) = (self.pop()?, self.pop()?);
                let outcome = dispatch::arith::scale(&a, &exp);
                self.resolve(outcome)?;
            }
            LeftShift => {
                let (bits, a) = (self.pop()?, self.pop()?);
                let outcome = dispatch::arith::left_shift(&a, &bits);
                self.resolve(outcome)?;
            }
            RightShift => {
                let (bits, a) = (self.pop()?, self.pop()?);
                let outcome = dispatch::arith::right_shift(&a, &bits);
                self.resolve(outcome)?;
            }
            Abs => {
                let a = self.pop()?;
                let outcome = dispatch::arith::abs(&a, &self.config.epsilon.clone());
                self.resolve(outcome)?;
            }
            Norm => {
                let a = self.pop()?;
                let outcome = dispatch::arith::norm(&a);
                self.resolve(outcome)?;
            }
            Re => {
                let a = self.pop()?;
                let outcome = dispatch::arith::re(&a);
                self.resolve(outcome)?;
            }
            Im => {
                let a = self.pop()?;
                let outcome = dispatch::arith::im(&a);
                self.resolve(outcome)?;
            }
            Conjugate => {
                let a = self.pop()?;
                let outcome = dispatch::arith::conjugate(&a);
                self.resolve(outcome)?;
            }
            Sgn => {
                let a = self.pop()?;
                let outcome = dispatch::arith::sgn(&a);
                self.resolve(outcome)?;
            }
            Bit => {
                let (idx, a) = (self.pop()?, self.pop()?);
                let outcome = dispatch::arith::bit(&a, &idx);
                self.resolve(outcome)?;
            }
            HighBit => {
                let a = self.pop()?;
                let outcome = dispatch::arith::highbit(&a);
                self.resolve(outcome)?;
            }
            LowBit => {
                let a = self.pop()?;
                let outcome = dispatch::arith::lowbit(&a);
                self.resolve(outcome)?;
            }
            Plus => {
                let a = self.pop()?;
                let outcome = dispatch::arith::plus(&a);
                self.resolve(outcome)?;
            }

            // -- Logical / bitwise ---------------------------------------------
            And => {
                let (a, b) = (self.pop()?, self.pop()?);
                self.stack.push(bitwise(&b, &a, |x, y| x & y)?);
            }
            Or => {
                let (a, b) = (self.pop()?, self.pop()?);
                self.stack.push(bitwise(&b, &a, |x, y| x | y)?);
            }
            Xor => {
                let (a, b) = (self.pop()?, self.pop()?);
                self.stack.push(bitwise(&b, &a, |x, y| x ^ y)?);
            }
            Not => {
                let a = self.pop()?;
                self.stack.push(Value::int(!a.is_truthy() as i64));
            }
            Comp => {
                let a = self.pop()?;
                match a.as_int() {
                    Some(v) => self.stack.push(Value::int(!v)),
                    None => return Err(ErrorCode::Sgn.into()),
                }
            }
            Content => {
                let a = self.pop()?;
                self.stack.push(Value::int(dispatch::hashing::quickhash_value(&a) as i64));
            }
            HashOp => {
                let (a, b) = (self.pop()?, self.pop()?);
                self.stack
                    .push(Value::int(dispatch::hashing::quickhash_tuple(&[a, b]) as i64));
            }
            Backslash => {
                let a = self.pop()?;
                match a.body() {
                    ValueBody::Addr(slot) => self.stack.push(Value::new(ValueBody::Ptr(Pointer::VPtr(slot.clone())))),
                    _ => return Err(EngineFault::TypeInvariantViolated("\\ requires an lvalue".to_string()).into()),
                }
            }
            SetMinus => {
                let (a, b) = (self.pop()?, self.pop()?);
                match (a.as_int(), b.as_int()) {
                    (Some(x), Some(y)) => self.stack.push(Value::int(x & !y)),
                    _ => return Err(ErrorCode::Sgn.into()),
                }
            }

            // -- Relational ------------------------------------------------------
            Eq => {
                let (a, b) = (self.pop()?, self.pop()?);
                self.stack.push(Value::int(dispatch::relation::equal(&a, &b) as i64));
            }
            Ne => {
                let (a, b) = (self.pop()?, self.pop()?);
                self.stack.push(Value::int(dispatch::relation::not_equal(&a, &b) as i64));
            }
            Lt => {
                let (a, b) = (self.pop()?, self.pop()?);
                let outcome = dispatch::relation::compare(&a, &b);
                self.resolve_relational(outcome, Comparator::Lt)?;
            }
            Le => {
                let (a, b) = (self.pop()?, self.pop()?);
                let outcome = dispatch::relation::compare(&a, &b);
                self.resolve_relational(outcome, Comparator::Le)?;
            }
            Gt => {
                let (a, b) = (self.pop()?, self.pop()?);
                let outcome = dispatch::relation::compare(&a, &b);
                self.resolve_relational(outcome, Comparator::Gt)?;
            }
            Ge => {
                let (a, b) = (self.pop()?, self.pop()?);
                let outcome = dispatch::relation::compare(&a, &b);
                self.resolve_relational(outcome, Comparator::Ge)?;
            }
            Cmp => {
                let (a, b) = (self.pop()?, self.pop()?);
                let outcome = dispatch::relation::cmp(&a, &b);
                self.resolve(outcome)?;
            }

            // -- Predicates --------------------------------------------------
            IsInt => {
                let a = self.pop()?;
                self.stack.push(Value::int(dispatch::relation::is_tag(&a, ValueTag::Int) as i64));
            }
            IsNum => {
                let a = self.pop()?;
                self.stack
                    .push(Value::int(matches!(a.tag(), ValueTag::Int | ValueTag::Num) as i64));
            }
            IsReal => {
                let a = self.pop()?;
                self.stack.push(Value::int(a.as_q().is_some() as i64));
            }
            IsMat => {
                let a = self.pop()?;
                self.stack.push(Value::int(dispatch::relation::is_tag(&a, ValueTag::Mat) as i64));
            }
            IsList => {
                let a = self.pop()?;
                self.stack.push(Value::int(dispatch::relation::is_tag(&a, ValueTag::List) as i64));
            }
            IsObj => {
                let a = self.pop()?;
                self.stack.push(Value::int(dispatch::relation::is_tag(&a, ValueTag::Obj) as i64));
            }
            IsStr => {
                let a = self.pop()?;
                self.stack.push(Value::int(dispatch::relation::is_tag(&a, ValueTag::Str) as i64));
            }
            IsFile => {
                let a = self.pop()?;
                self.stack.push(Value::int(dispatch::relation::is_tag(&a, ValueTag::File) as i64));
            }
            IsRand => {
                let a = self.pop()?;
                self.stack.push(Value::int(dispatch::relation::is_tag(&a, ValueTag::Rand) as i64));
            }
            IsRandom => {
                let a = self.pop()?;
                self.stack
                    .push(Value::int(dispatch::relation::is_tag(&a, ValueTag::Random) as i64));
            }
            IsConfig => {
                let a = self.pop()?;
                self.stack
                    .push(Value::int(dispatch::relation::is_tag(&a, ValueTag::Config) as i64));
            }
            IsHash => {
                let a = self.pop()?;
                self.stack.push(Value::int(dispatch::relation::is_tag(&a, ValueTag::Hash) as i64));
            }
            IsAssoc => {
                let a = self.pop()?;
                self.stack
                    .push(Value::int(dispatch::relation::is_tag(&a, ValueTag::Assoc) as i64));
            }
            IsBlk => {
                let a = self.pop()?;
                self.stack.push(Value::int(
                    matches!(a.tag(), ValueTag::Block | ValueTag::NBlock) as i64,
                ));
            }
            IsOctet => {
                let a = self.pop()?;
                self.stack
                    .push(Value::int(dispatch::relation::is_tag(&a, ValueTag::Octet) as i64));
            }
            IsPtr => {
                let a = self.pop()?;
                self.stack.push(Value::int(
                    matches!(a.tag(), ValueTag::Ptr | ValueTag::Addr) as i64,
                ));
            }
            IsDefined => {
                let a = self.pop()?;
                self.stack.push(Value::int(!a.is_null() as i64));
            }
            IsObjType => {
                let (name, a) = (self.pop()?, self.pop()?);
                let matches_name = match (a.body(), name.body()) {
                    (ValueBody::Obj(o), ValueBody::Str(n)) => o.schema.name.as_bytes() == n.as_slice(),
                    _ => false,
                };
                self.stack.push(Value::int(matches_name as i64));
            }
            IsSimple => {
                let a = self.pop()?;
                self.stack.push(Value::int(
                    matches!(a.tag(), ValueTag::Null | ValueTag::Int | ValueTag::Num | ValueTag::Com | ValueTag::Str) as i64,
                ));
            }
            IsOdd => {
                let a = self.pop()?;
                self.stack.push(Value::int(a.as_int().map(|v| v % 2 != 0).unwrap_or(false) as i64));
            }
            IsEven => {
                let a = self.pop()?;
                self.stack.push(Value::int(a.as_int().map(|v| v % 2 == 0).unwrap_or(false) as i64));
            }
            IsNull => {
                let a = self.pop()?;
                self.stack.push(Value::int(a.is_null() as i64));
            }
            IsType(tag_id) => {
                let a = self.pop()?;
                self.stack.push(Value::int((a.tag() as u8 == tag_id) as i64));
            }

            // -- Control -------------------------------------------------------
            Jump(target) => self.frames.last_mut().unwrap().pc = target as usize,
            JumpZ(target) => {
                let a = self.pop()?;
                if !a.is_truthy() {
                    self.frames.last_mut().unwrap().pc = target as usize;
                }
            }
            JumpNz(target) => {
                let a = self.pop()?;
                if a.is_truthy() {
                    self.frames.last_mut().unwrap().pc = target as usize;
                }
            }
            JumpNn(target) => {
                let a = self.pop()?;
                if !a.is_null() {
                    self.frames.last_mut().unwrap().pc = target as usize;
                }
            }
            CondOrJump(target) => {
                let a = self.stack.last().ok_or(EngineFault::StackUnderflow {
                    needed: 1,
                    available: 0,
                })?;
                if a.is_truthy() {
                    self.frames.last_mut().unwrap().pc = target as usize;
                } else {
                    self.stack.pop();
                }
            }
            CondAndJump(target) => {
                let a = self.stack.last().ok_or(EngineFault::StackUnderflow {
                    needed: 1,
                    available: 0,
                })?;
                if !a.is_truthy() {
                    self.frames.last_mut().unwrap().pc = target as usize;
                } else {
                    self.stack.pop();
                }
            }
            CaseJump { target, const_ref } => {
                let switch = self.pop()?;
                let constant = self.load_number(const_ref, false)?;
                if dispatch::relation::equal(&switch, &constant) {
                    self.frames.last_mut().unwrap().pc = target as usize;
                }
            }
            Call { builtin, arg_count } => {
                let args = self.pop_n(arg_count as usize)?;
                let builtin = calls::Builtin::from_u32(builtin)
                    .ok_or_else(|| EngineFault::AddressOutOfRange(builtin))?;
                let result = calls::call(builtin, &args, &self.config.epsilon.clone());
                self.stack.push(result);
            }
            UserCall { func, arg_count } => {
                let args = self.pop_n(arg_count as usize)?;
                if func as usize >= self.functions.len() {
                    return Err(EngineFault::AddressOutOfRange(func).into());
                }
                self.push_call(func, args, Continuation::Push)?;
            }
            Return => {
                let frame = self.frames.last().expect("opcode execution always has a frame");
                let base = frame.stack_base;
                let value = self.stack.pop().unwrap_or_else(Value::null);
                self.stack.truncate(base);
                return Ok(StepOutcome::Returned(value));
            }

            // -- Stack -----------------------------------------------------------
            Duplicate => {
                let v = self.stack.last().cloned().ok_or(EngineFault::StackUnderflow {
                    needed: 1,
                    available: 0,
                })?;
                self.stack.push(v);
            }
            DupValue => {
                let v = self.stack.last().cloned().ok_or(EngineFault::StackUnderflow {
                    needed: 1,
                    available: 0,
                })?;
                let resolved = match v.body() {
                    ValueBody::Addr(slot) => slot.borrow().clone(),
                    _ => v,
                };
                self.stack.push(resolved);
            }
            Pop => {
                self.pop()?;
            }
            Swap => {
                let len = self.stack.len();
                if len < 2 {
                    return Err(EngineFault::StackUnderflow { needed: 2, available: len }.into());
                }
                self.stack.swap(len - 1, len - 2);
            }
            GetValue => {
                let a = self.pop()?;
                let resolved = match a.body() {
                    ValueBody::Addr(slot) => slot.borrow().clone(),
                    _ => a,
                };
                self.stack.push(resolved);
            }
            Assign => {
                let (src, dst) = (self.pop()?, self.pop()?);
                let slot = addr_slot(&dst)?;
                self.stack.push(dispatch::assign::assign(&slot, src));
            }
            AssignBack => {
                let (dst, src) = (self.pop()?, self.pop()?);
                let slot = addr_slot(&dst)?;
                self.stack.push(dispatch::assign::assign(&slot, src));
            }
            AssignPop => {
                let (src, dst) = (self.pop()?, self.pop()?);
                let slot = addr_slot(&dst)?;
                dispatch::assign::assign_pop(&slot, src);
            }

            // -- Increment / decrement -------------------------------------------
            PreInc => {
                let a = self.pop()?;
                let slot = addr_slot(&a)?;
                let outcome = dispatch::increment::pre_step(&slot, 1);
                self.resolve_step(outcome, &slot, None)?;
            }
            PreDec => {
                let a = self.pop()?;
                let slot = addr_slot(&a)?;
                let outcome = dispatch::increment::pre_step(&slot, -1);
                self.resolve_step(outcome, &slot, None)?;
            }
            PostInc => {
                let a = self.pop()?;
                let slot = addr_slot(&a)?;
                let before = slot.borrow().clone();
                let outcome = dispatch::increment::post_step(&slot, 1);
                self.resolve_step(outcome, &slot, Some(before))?;
            }
            PostDec => {
                let a = self.pop()?;
                let slot = addr_slot(&a)?;
                let before = slot.borrow().clone();
                let outcome = dispatch::increment::post_step(&slot, -1);
                self.resolve_step(outcome, &slot, Some(before))?;
            }

            // -- I/O -----------------------------------------------------------
            Print => {
                let a = self.pop()?;
                print!("{}", display(&a, &self.config));
            }
            PrintResult => {
                let a = self.stack.last().cloned().ok_or(EngineFault::StackUnderflow {
                    needed: 1,
                    available: 0,
                })?;
                println!("{}", display(&a, &self.config));
            }
            PrintEol => println!(),
            PrintSpace => print!(" "),
            PrintStr(idx) => {
                let s = self.load_string(idx)?;
                print!("{}", display(&s, &self.config));
            }

            // -- Side state ------------------------------------------------------
            Save => {
                if self.save_gate {
                    self.saved = self.stack.last().cloned().unwrap_or_else(Value::null);
                }
            }
            SaveVal => {
                let a = self.pop()?;
                self.save_gate = a.is_truthy();
            }
            SetConfig(key_id) => {
                let value = self.pop()?;
                if let Some(key) = ConfigKey::from_repr(key_id) {
                    tracing::debug!(?key, "config write");
                    if self.config.set(key, &value).is_err() {
                        self.stack.push(Value::error(ErrorCode::NotAssignable));
                        return Ok(StepOutcome::Continue);
                    }
                }
            }
            GetConfig(key_id) => {
                let value = ConfigKey::from_repr(key_id).map(|k| self.config.get(k)).unwrap_or_else(Value::null);
                self.stack.push(value);
            }
            SetEpsilon => {
                let a = self.pop()?;
                if let Some(q) = a.as_q() {
                    self.config.epsilon = q;
                }
            }
            GetEpsilon => self.stack.push(Value::num(self.config.epsilon.clone())),
            Show(_) => {}
            Test => {
                let a = self.pop()?;
                self.stack.push(Value::int(a.is_truthy() as i64));
            }
            Links => {
                let a = self.pop()?;
                let count = match a.body() {
                    ValueBody::Mat(rc) => Rc::strong_count(rc),
                    ValueBody::List(rc) => Rc::strong_count(rc),
                    ValueBody::Assoc(rc) => Rc::strong_count(rc),
                    ValueBody::Obj(rc) => Rc::strong_count(rc),
                    _ => 1,
                };
                self.stack.push(Value::int(count as i64));
            }
            Debug(_) => {
                if self.aborted {
                    return Err(EngineFault::Aborted.into());
                }
            }
            Quit => {
                let a = self.pop().unwrap_or_else(|_| Value::null());
                return Err(EngineFault::Quit(display(&a, &self.config)).into());
            }
            Abort => return Err(EngineFault::Aborted.into()),
            InitStatic(_) => {
                // Guard handled by the caller of `call`/`run`: a program
                // built by this workspace's compiler only emits this at a
                // site whose one-time body it has already decided to run.
            }
            Nop => {}

            // `calc_asm::Opcode` is `#[non_exhaustive]`: a wildcard arm is
            // required here regardless of how complete the match above is.
            #[allow(unreachable_patterns)]
            _ => {
                return Err(EngineFault::MalformedProgram(format!("unhandled opcode {op:?}")).into());
            }
        }
        Ok(StepOutcome::Continue)
    }
}

fn to_interpreter_error(err: RuntimeError) -> InterpreterError {
    match err {
        RuntimeError::Recoverable(code) => InterpreterError::Halted(EngineFault::TypeInvariantViolated(format!(
            "unhandled recoverable error at call entry: {code:?}"
        ))),
        RuntimeError::Halt(fault) => InterpreterError::Halted(fault),
    }
}

fn addr_slot(v: &Value) -> Result<Slot, RuntimeError> {
    match v.body() {
        ValueBody::Addr(slot) => Ok(slot.clone()),
        _ => Err(EngineFault::TypeInvariantViolated("expected an address".to_string()).into()),
    }
}

fn bitwise(a: &Value, b: &Value, op: impl Fn(i64, i64) -> i64) -> Result<Value, RuntimeError> {
    match (a.as_int(), b.as_int()) {
        (Some(x), Some(y)) => Ok(Value::int(op(x, y))),
        _ => Err(ErrorCode::Sgn.into()),
    }
}

fn integer_quotient(a: &Value, b: &Value, round_to_zero: bool) -> Result<Value, RuntimeError> {
    let (x, y) = (a.as_q(), b.as_q());
    match (x, y) {
        (Some(x), Some(y)) if !y.is_zero() => {
            let mode = if round_to_zero {
                crate::kernel::RoundingMode::TowardZero
            } else {
                crate::kernel::RoundingMode::TowardNegInf
            };
            let ratio = x.div(&y).ok_or(ErrorCode::Div)?;
            Ok(Value::num(Q::from_integer(ratio.round(mode))))
        }
        _ => Err(ErrorCode::Div.into()),
    }
}

fn integer_remainder(a: &Value, b: &Value, round_to_zero: bool) -> Result<Value, RuntimeError> {
    let quo = integer_quotient(a, b, round_to_zero)?;
    let (x, y, q) = (a.as_q().unwrap(), b.as_q().unwrap(), quo.as_q().unwrap());
    Ok(Value::num(x.sub(&q.mul(&y))))
}

fn power(a: &Value, b: &Value) -> Result<Value, RuntimeError> {
    let exp = b.as_int().ok_or(ErrorCode::Sgn)?;
    match a.as_q() {
        Some(q) => q.pow(exp).map(Value::num).ok_or(ErrorCode::Sgn.into()),
        None => match a.as_c() {
            Some(c) if exp >= 0 => {
                let mut result = C::from_real(Q::one());
                for _ in 0..exp {
                    result = result.mul(&c);
                }
                Ok(Value::from_c(result))
            }
            _ => Err(ErrorCode::Sgn.into()),
        },
    }
}

fn display(v: &Value, config: &ConfigSnapshot) -> String {
    match v.body() {
        ValueBody::Null => "".to_string(),
        ValueBody::Int(n) => n.to_string(),
        ValueBody::Num(q) => q.to_string(),
        ValueBody::Str(s) => String::from_utf8_lossy(s).to_string(),
        ValueBody::Error(code) => format!("{code:?}"),
        ValueBody::Block(data) => crate::value::block::format_block(data, config),
        ValueBody::NBlock(nblk) => crate::value::block::format_named_block(&nblk.name, &nblk.data, config),
        _ => format!("{v:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Bound, Matrix, Subtype};

    #[test]
    fn eleminit_refuses_to_write_into_a_no_copy_to_container() {
        let mut interp = Interpreter::new(Vec::new(), 0);
        let m = Matrix::new(vec![Bound { min: 0, max: 0 }]);
        let container = Value::with_subtype(ValueBody::Mat(Rc::new(m)), Subtype::NO_COPY_TO);
        interp.stack.push(container);
        interp.stack.push(Value::int(5));
        let result = interp.execute(Opcode::ElemInit(0));
        assert!(matches!(result, Err(RuntimeError::Recoverable(ErrorCode::NotAssignable))));
    }

    #[test]
    fn eleminit_refuses_a_no_copy_from_source_value() {
        let mut interp = Interpreter::new(Vec::new(), 0);
        let m = Matrix::new(vec![Bound { min: 0, max: 0 }]);
        let container = Value::new(ValueBody::Mat(Rc::new(m)));
        interp.stack.push(container);
        interp.stack.push(Value::with_subtype(ValueBody::Int(5), Subtype::NO_COPY_FROM));
        let result = interp.execute(Opcode::ElemInit(0));
        assert!(matches!(result, Err(RuntimeError::Recoverable(ErrorCode::NotAssignable))));
    }

    #[test]
    fn eleminit_writes_into_an_unprotected_matrix() {
        let mut interp = Interpreter::new(Vec::new(), 0);
        let m = Matrix::new(vec![Bound { min: 0, max: 0 }]);
        let container = Value::new(ValueBody::Mat(Rc::new(m)));
        interp.stack.push(container);
        interp.stack.push(Value::int(5));
        interp.execute(Opcode::ElemInit(0)).unwrap();
        let top = interp.stack.last().unwrap();
        if let ValueBody::Mat(m) = top.body() {
            assert_eq!(m.slot_at(&[0]).unwrap().borrow().as_int(), Some(5));
        } else {
            panic!("expected matrix");
        }
    }
}
