//! Typed configuration snapshot read and written by
//! [`calc_asm::Opcode::GetConfig`]/[`calc_asm::Opcode::SetConfig`].
//!
//! `spec.md` §6 names the parameter surface; the config*string* parser
//! that turns `config("mode", "frac")` into a write here is out of scope
//! (§1), so this module only owns the typed snapshot and the
//! get/set-by-[`ConfigKey`] operations a compiled function's opcodes
//! actually perform.

use calc_asm::ConfigKey;
use crate::kernel::Q;
use thiserror::Error;

/// Output number base/format selector (`mode`/`mode2`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputMode {
    Fraction,
    Integer,
    Real,
    Scientific,
    Hex,
    Octal,
    Binary,
}

/// `blkbase`: the byte base a block is printed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockBase {
    Hex,
    Oct,
    Char,
    Binary,
    Raw,
}

/// `blkfmt`: the byte-block layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockFormat {
    Line,
    String,
    OdStyle,
    HdStyle,
}

/// `ctrl_d`: end-of-file-on-empty-line behavior (REPL front-end concern,
/// out of scope for evaluation, but still an addressable config cell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CtrlDMode {
    VirginEof,
    NeverEof,
    EmptyEof,
}

/// A failed attempt to read or write a config entry.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0:?} is read-only")]
    ReadOnly(ConfigKey),
}

/// Snapshot of every named configuration entry.
///
/// Defaults follow the real calculator's compiled-in defaults where
/// `spec.md` doesn't otherwise constrain them.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSnapshot {
    pub mode: OutputMode,
    pub mode2: OutputMode,
    pub display: u32,
    pub epsilon: Q,
    pub trace: u32,
    pub maxprint: u32,
    pub mul2: u32,
    pub sq2: u32,
    pub pow2: u32,
    pub redc2: u32,
    pub tilde: bool,
    pub tab: bool,
    pub quomod: bool,
    pub quo: bool,
    pub modulus: bool,
    pub sqrt: bool,
    pub appr: bool,
    pub cfappr: bool,
    pub cfsim: bool,
    pub outround: u32,
    pub round: u32,
    pub leadzero: bool,
    pub fullzero: bool,
    pub maxscan: u32,
    pub prompt: String,
    pub more: String,
    pub blkmaxprint: u32,
    pub blkverbose: bool,
    pub blkbase: BlockBase,
    pub blkfmt: BlockFormat,
    pub resource_debug: u32,
    pub calc_debug: u32,
    pub user_debug: u32,
    pub verbose_quit: bool,
    pub ctrl_d: CtrlDMode,
    pub redecl_warn: bool,
    pub dupvar_warn: bool,

    // Read-only entries.
    pub program: String,
    pub basename: String,
    pub windows: bool,
    pub cygwin: bool,
    pub compile_custom: bool,
    pub allow_custom: bool,
    pub version: &'static str,
    pub baseb: u32,
    pub hz: u32,
}

impl Default for ConfigSnapshot {
    fn default() -> Self {
        ConfigSnapshot {
            mode: OutputMode::Real,
            mode2: OutputMode::Fraction,
            display: 20,
            epsilon: Q::new(crate::kernel::Z::one(), crate::kernel::Z::from_i64(1_000_000_000_000))
                .unwrap(),
            trace: 0,
            maxprint: 0,
            mul2: crate::kernel::integer::MUL2_DEFAULT,
            sq2: crate::kernel::integer::SQ2_DEFAULT,
            pow2: crate::kernel::integer::POW2_DEFAULT,
            redc2: crate::kernel::integer::REDC2_DEFAULT,
            tilde: true,
            tab: true,
            quomod: false,
            quo: false,
            modulus: false,
            sqrt: false,
            appr: false,
            cfappr: false,
            cfsim: false,
            outround: 0,
            round: 0,
            leadzero: false,
            fullzero: false,
            maxscan: 20,
            prompt: "> ".to_string(),
            more: "more> ".to_string(),
            blkmaxprint: 1024,
            blkverbose: true,
            blkbase: BlockBase::Hex,
            blkfmt: BlockFormat::HdStyle,
            resource_debug: 0,
            calc_debug: 0,
            user_debug: 0,
            verbose_quit: false,
            ctrl_d: CtrlDMode::VirginEof,
            redecl_warn: true,
            dupvar_warn: true,
            program: "calc".to_string(),
            basename: "calc".to_string(),
            windows: cfg!(windows),
            cygwin: false,
            compile_custom: false,
            allow_custom: false,
            version: env!("CARGO_PKG_VERSION"),
            baseb: 64,
            hz: 0,
        }
    }
}

impl ConfigSnapshot {
    /// Keys this snapshot refuses to `setconfig`.
    pub const fn is_read_only(key: ConfigKey) -> bool {
        matches!(
            key,
            ConfigKey::Program
                | ConfigKey::BaseName
                | ConfigKey::Windows
                | ConfigKey::Cygwin
                | ConfigKey::CompileCustom
                | ConfigKey::AllowCustom
                | ConfigKey::Version
                | ConfigKey::BaseB
                | ConfigKey::Hz
        )
    }

    /// Read one entry as a [`crate::value::Value`] for
    /// [`calc_asm::Opcode::GetConfig`]. Booleans surface as `0`/`1`
    /// integers, matching real calc's `config()` return convention.
    pub fn get(&self, key: ConfigKey) -> crate::value::Value {
        use crate::value::Value;
        match key {
            ConfigKey::Mode => Value::int(self.mode as i64),
            ConfigKey::Mode2 => Value::int(self.mode2 as i64),
            ConfigKey::Display => Value::int(self.display as i64),
            ConfigKey::Epsilon => Value::num(self.epsilon.clone()),
            ConfigKey::Trace => Value::int(self.trace as i64),
            ConfigKey::MaxPrint => Value::int(self.maxprint as i64),
            ConfigKey::Mul2 => Value::int(self.mul2 as i64),
            ConfigKey::Sq2 => Value::int(self.sq2 as i64),
            ConfigKey::Pow2 => Value::int(self.pow2 as i64),
            ConfigKey::Redc2 => Value::int(self.redc2 as i64),
            ConfigKey::Tilde => Value::int(self.tilde as i64),
            ConfigKey::Tab => Value::int(self.tab as i64),
            ConfigKey::QuoMod => Value::int(self.quomod as i64),
            ConfigKey::Quo => Value::int(self.quo as i64),
            ConfigKey::Mod => Value::int(self.modulus as i64),
            ConfigKey::Sqrt => Value::int(self.sqrt as i64),
            ConfigKey::Appr => Value::int(self.appr as i64),
            ConfigKey::CfAppr => Value::int(self.cfappr as i64),
            ConfigKey::CfSim => Value::int(self.cfsim as i64),
            ConfigKey::OutRound => Value::int(self.outround as i64),
            ConfigKey::Round => Value::int(self.round as i64),
            ConfigKey::LeadZero => Value::int(self.leadzero as i64),
            ConfigKey::FullZero => Value::int(self.fullzero as i64),
            ConfigKey::MaxScan => Value::int(self.maxscan as i64),
            ConfigKey::Prompt => Value::string(self.prompt.clone().into_bytes()),
            ConfigKey::More => Value::string(self.more.clone().into_bytes()),
            ConfigKey::BlkMaxPrint => Value::int(self.blkmaxprint as i64),
            ConfigKey::BlkVerbose => Value::int(self.blkverbose as i64),
            ConfigKey::BlkBase => Value::int(self.blkbase as i64),
            ConfigKey::BlkFmt => Value::int(self.blkfmt as i64),
            ConfigKey::ResourceDebug => Value::int(self.resource_debug as i64),
            ConfigKey::CalcDebug => Value::int(self.calc_debug as i64),
            ConfigKey::UserDebug => Value::int(self.user_debug as i64),
            ConfigKey::VerboseQuit => Value::int(self.verbose_quit as i64),
            ConfigKey::CtrlD => Value::int(self.ctrl_d as i64),
            ConfigKey::Program => Value::string(self.program.clone().into_bytes()),
            ConfigKey::BaseName => Value::string(self.basename.clone().into_bytes()),
            ConfigKey::Windows => Value::int(self.windows as i64),
            ConfigKey::Cygwin => Value::int(self.cygwin as i64),
            ConfigKey::CompileCustom => Value::int(self.compile_custom as i64),
            ConfigKey::AllowCustom => Value::int(self.allow_custom as i64),
            ConfigKey::Version => Value::string(self.version.as_bytes().to_vec()),
            ConfigKey::BaseB => Value::int(self.baseb as i64),
            ConfigKey::RedeclWarn => Value::int(self.redecl_warn as i64),
            ConfigKey::DupVarWarn => Value::int(self.dupvar_warn as i64),
            ConfigKey::Hz => Value::int(self.hz as i64),
            ConfigKey::All => Value::null(),
        }
    }

    /// Write one entry from a [`crate::value::Value`] for
    /// [`calc_asm::Opcode::SetConfig`]. Refuses read-only keys; non-integer
    /// writes to an integer/bool entry or non-rational writes to `epsilon`
    /// are simply ignored, matching the permissive style of real calc's
    /// `config()` when handed a value it can coerce loosely.
    pub fn set(&mut self, key: ConfigKey, value: &crate::value::Value) -> Result<(), ConfigError> {
        if Self::is_read_only(key) {
            return Err(ConfigError::ReadOnly(key));
        }
        let as_bool = || value.is_truthy();
        let as_u32 = || value.as_int().unwrap_or(0).max(0) as u32;
        match key {
            ConfigKey::Epsilon => {
                if let Some(q) = value.as_q() {
                    self.epsilon = q;
                }
            }
            ConfigKey::Display => self.display = as_u32(),
            ConfigKey::Trace => self.trace = as_u32(),
            ConfigKey::MaxPrint => self.maxprint = as_u32(),
            ConfigKey::Mul2 => self.mul2 = as_u32(),
            ConfigKey::Sq2 => self.sq2 = as_u32(),
            ConfigKey::Pow2 => self.pow2 = as_u32(),
            ConfigKey::Redc2 => self.redc2 = as_u32(),
            ConfigKey::Tilde => self.tilde = as_bool(),
            ConfigKey::Tab => self.tab = as_bool(),
            ConfigKey::QuoMod => self.quomod = as_bool(),
            ConfigKey::Quo => self.quo = as_bool(),
            ConfigKey::Mod => self.modulus = as_bool(),
            ConfigKey::Sqrt => self.sqrt = as_bool(),
            ConfigKey::Appr => self.appr = as_bool(),
            ConfigKey::CfAppr => self.cfappr = as_bool(),
            ConfigKey::CfSim => self.cfsim = as_bool(),
            ConfigKey::OutRound => self.outround = as_u32(),
            ConfigKey::Round => self.round = as_u32(),
            ConfigKey::LeadZero => self.leadzero = as_bool(),
            ConfigKey::FullZero => self.fullzero = as_bool(),
            ConfigKey::MaxScan => self.maxscan = as_u32(),
            ConfigKey::BlkMaxPrint => self.blkmaxprint = as_u32(),
            ConfigKey::BlkVerbose => self.blkverbose = as_bool(),
            ConfigKey::ResourceDebug => self.resource_debug = as_u32(),
            ConfigKey::CalcDebug => self.calc_debug = as_u32(),
            ConfigKey::UserDebug => self.user_debug = as_u32(),
            ConfigKey::VerboseQuit => self.verbose_quit = as_bool(),
            ConfigKey::RedeclWarn => self.redecl_warn = as_bool(),
            ConfigKey::DupVarWarn => self.dupvar_warn = as_bool(),
            _ => {}
        }
        Ok(())
    }
}
