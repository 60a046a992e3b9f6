//! Named configuration entries readable and writable through
//! [`crate::Opcode::GetConfig`]/[`crate::Opcode::SetConfig`].
//!
//! Grounded on the `configs[]` name table in `config.c`: every entry here
//! keeps that table's name and relative ordering. Entries whose value is
//! only meaningful to the out-of-scope config-string parser, resource-file
//! loader or REPL front-end (`prompt`, `more`, `program`, `basename`,
//! `windows`, `cygwin`, `ctrl_d`, ...) are kept as addressable keys — a
//! compiled function can still read or write them as opaque config state —
//! but this crate gives them no special interpreted behavior.

/// A `SetConfig`/`GetConfig` immediate names one of these. The numeric
/// value is this crate's own encoding (dense, zero-based); it does not
/// need to match calc's internal `CONFIG_*` enum, only to round-trip
/// through `ConfigKey::ALL` in the same relative order as `configs[]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter, strum::FromRepr)]
#[repr(u16)]
pub enum ConfigKey {
    All = 0,
    Mode,
    Mode2,
    Display,
    Epsilon,
    Trace,
    MaxPrint,
    Mul2,
    Sq2,
    Pow2,
    Redc2,
    Tilde,
    Tab,
    QuoMod,
    Quo,
    Mod,
    Sqrt,
    Appr,
    CfAppr,
    CfSim,
    OutRound,
    Round,
    LeadZero,
    FullZero,
    /// Also reachable under the legacy name `maxerr` (`config.c`:
    /// `"maxerr"` maps to the same `CONFIG_MAXSCAN` slot as `"maxscan"`).
    MaxScan,
    Prompt,
    More,
    BlkMaxPrint,
    BlkVerbose,
    BlkBase,
    BlkFmt,
    ResourceDebug,
    CalcDebug,
    UserDebug,
    VerboseQuit,
    CtrlD,
    Program,
    BaseName,
    Windows,
    Cygwin,
    CompileCustom,
    AllowCustom,
    Version,
    BaseB,
    RedeclWarn,
    DupVarWarn,
    Hz,
}

impl ConfigKey {
    /// The name this key is set/read by, matching `configs[].name`.
    pub const fn name(self) -> &'static str {
        use ConfigKey::*;
        match self {
            All => "all",
            Mode => "mode",
            Mode2 => "mode2",
            Display => "display",
            Epsilon => "epsilon",
            Trace => "trace",
            MaxPrint => "maxprint",
            Mul2 => "mul2",
            Sq2 => "sq2",
            Pow2 => "pow2",
            Redc2 => "redc2",
            Tilde => "tilde",
            Tab => "tab",
            QuoMod => "quomod",
            Quo => "quo",
            Mod => "mod",
            Sqrt => "sqrt",
            Appr => "appr",
            CfAppr => "cfappr",
            CfSim => "cfsim",
            OutRound => "outround",
            Round => "round",
            LeadZero => "leadzero",
            FullZero => "fullzero",
            MaxScan => "maxscan",
            Prompt => "prompt",
            More => "more",
            BlkMaxPrint => "blkmaxprint",
            BlkVerbose => "blkverbose",
            BlkBase => "blkbase",
            BlkFmt => "blkfmt",
            ResourceDebug => "resource_debug",
            CalcDebug => "calc_debug",
            UserDebug => "user_debug",
            VerboseQuit => "verbose_quit",
            CtrlD => "ctrl_d",
            Program => "program",
            BaseName => "basename",
            Windows => "windows",
            Cygwin => "cygwin",
            CompileCustom => "compile_custom",
            AllowCustom => "allow_custom",
            Version => "version",
            BaseB => "baseb",
            RedeclWarn => "redecl_warn",
            DupVarWarn => "dupvar_warn",
            Hz => "hz",
        }
    }

    /// Look up a key by its canonical or alias name (`maxerr` and `ctrl-d`
    /// resolve to [`ConfigKey::MaxScan`] and [`ConfigKey::CtrlD`]).
    pub fn from_name(name: &str) -> Option<ConfigKey> {
        use ConfigKey::*;
        Some(match name {
            "maxerr" => MaxScan,
            "ctrl-d" => CtrlD,
            "lib_debug" => ResourceDebug,
            other => return ConfigKey::ALL.into_iter().find(|k| k.name() == other),
        })
    }

    /// Every key, in `configs[]` order.
    pub const ALL: [ConfigKey; 47] = {
        use ConfigKey::*;
        [
            All, Mode, Mode2, Display, Epsilon, Trace, MaxPrint, Mul2, Sq2, Pow2, Redc2, Tilde,
            Tab, QuoMod, Quo, Mod, Sqrt, Appr, CfAppr, CfSim, OutRound, Round, LeadZero, FullZero,
            MaxScan, Prompt, More, BlkMaxPrint, BlkVerbose, BlkBase, BlkFmt, ResourceDebug,
            CalcDebug, UserDebug, VerboseQuit, CtrlD, Program, BaseName, Windows, Cygwin,
            CompileCustom, AllowCustom, Version, BaseB, RedeclWarn, DupVarWarn, Hz,
        ]
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maxerr_aliases_maxscan() {
        assert_eq!(ConfigKey::from_name("maxerr"), Some(ConfigKey::MaxScan));
        assert_eq!(ConfigKey::from_name("maxscan"), Some(ConfigKey::MaxScan));
    }

    #[test]
    fn every_key_name_resolves_back() {
        for key in ConfigKey::ALL {
            assert_eq!(ConfigKey::from_name(key.name()), Some(key));
        }
    }
}
