//! The registry of names a [`ConfigHandle`](super::ConfigHandle) accepts.

use std::any::Any;
use std::fmt;

/// The value type of a configuration option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKind {
    /// Integers and booleans (non-zero is true).
    Int,
    /// Optional strings.
    Str,
    /// Lists of strings.
    StrList,
}

impl OptionKind {
    /// Human-readable name used in errors and listings.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Str => "string",
            Self::StrList => "string list",
        }
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

macro_rules! config_keys {
    ($($variant:ident => $name:literal : $kind:ident,)*) => {
        /// Every option reachable through a configuration handle.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ConfigKey {
            $(
                #[doc = concat!("`", $name, "`")]
                $variant,
            )*
        }

        impl ConfigKey {
            /// Every key, in registry order.
            pub const ALL: &'static [ConfigKey] = &[$(ConfigKey::$variant,)*];

            /// The name the key is addressed by.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)*
                }
            }

            /// The value type of the key.
            #[must_use]
            pub const fn kind(self) -> OptionKind {
                match self {
                    $(Self::$variant => OptionKind::$kind,)*
                }
            }
        }
    };
}

config_keys! {
    // Pre-configuration
    Allocator => "allocator": Int,
    Utf8Mode => "utf8_mode": Int,
    ConfigureLocale => "configure_locale": Int,
    CoerceCLocale => "coerce_c_locale": Int,
    CoerceCLocaleWarn => "coerce_c_locale_warn": Int,
    LegacyWindowsFsEncoding => "legacy_windows_fs_encoding": Int,

    // Shared by both records
    ParseArgv => "parse_argv": Int,
    Isolated => "isolated": Int,
    UseEnvironment => "use_environment": Int,
    DevMode => "dev_mode": Int,

    // Integers and booleans
    InstallSignalHandlers => "install_signal_handlers": Int,
    UseHashSeed => "use_hash_seed": Int,
    HashSeed => "hash_seed": Int,
    Faulthandler => "faulthandler": Int,
    Tracemalloc => "tracemalloc": Int,
    PerfProfiling => "perf_profiling": Int,
    ImportTime => "import_time": Int,
    CodeDebugRanges => "code_debug_ranges": Int,
    ShowRefCount => "show_ref_count": Int,
    DumpRefs => "dump_refs": Int,
    MallocStats => "malloc_stats": Int,
    SiteImport => "site_import": Int,
    BytesWarning => "bytes_warning": Int,
    WarnDefaultEncoding => "warn_default_encoding": Int,
    Inspect => "inspect": Int,
    Interactive => "interactive": Int,
    OptimizationLevel => "optimization_level": Int,
    ParserDebug => "parser_debug": Int,
    WriteBytecode => "write_bytecode": Int,
    Verbose => "verbose": Int,
    Quiet => "quiet": Int,
    UserSiteDirectory => "user_site_directory": Int,
    ConfigureCStdio => "configure_c_stdio": Int,
    BufferedStdio => "buffered_stdio": Int,
    UseFrozenModules => "use_frozen_modules": Int,
    SafePath => "safe_path": Int,
    IntMaxStrDigits => "int_max_str_digits": Int,
    ThreadInheritContext => "thread_inherit_context": Int,
    ContextAwareWarnings => "context_aware_warnings": Int,
    CpuCount => "cpu_count": Int,
    PathconfigWarnings => "pathconfig_warnings": Int,
    ModuleSearchPathsSet => "module_search_paths_set": Int,
    SkipSourceFirstLine => "skip_source_first_line": Int,
    LegacyWindowsStdio => "legacy_windows_stdio": Int,
    UseSystemLogger => "use_system_logger": Int,
    EnableGil => "enable_gil": Int,
    TlbcEnabled => "tlbc_enabled": Int,

    // Strings
    FilesystemEncoding => "filesystem_encoding": Str,
    FilesystemErrors => "filesystem_errors": Str,
    CachePrefix => "cache_prefix": Str,
    DumpRefsFile => "dump_refs_file": Str,
    StdioEncoding => "stdio_encoding": Str,
    StdioErrors => "stdio_errors": Str,
    CheckHashCacheMode => "check_hash_cache_mode": Str,
    ProgramName => "program_name": Str,
    PathEnv => "path_env": Str,
    Home => "home": Str,
    Platlibdir => "platlibdir": Str,
    StdlibDir => "stdlib_dir": Str,
    Executable => "executable": Str,
    BaseExecutable => "base_executable": Str,
    Prefix => "prefix": Str,
    BasePrefix => "base_prefix": Str,
    ExecPrefix => "exec_prefix": Str,
    BaseExecPrefix => "base_exec_prefix": Str,
    RunCommand => "run_command": Str,
    RunModule => "run_module": Str,
    RunFilename => "run_filename": Str,

    // String lists
    Argv => "argv": StrList,
    OrigArgv => "orig_argv": StrList,
    Xoptions => "xoptions": StrList,
    Warnoptions => "warnoptions": StrList,
    ModuleSearchPaths => "module_search_paths": StrList,
}

impl ConfigKey {
    /// Look a key up by name.
    ///
    /// # Examples
    ///
    /// ```
    /// use ember_init::handle::{ConfigKey, OptionKind};
    ///
    /// let key = ConfigKey::from_name("optimization_level").unwrap();
    /// assert_eq!(key.kind(), OptionKind::Int);
    /// assert!(ConfigKey::from_name("no_such_option").is_none());
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|key| key.name() == name)
    }

    /// Whether the key is stored in both the pre-configuration and the
    /// configuration.
    #[must_use]
    pub const fn is_shared(self) -> bool {
        matches!(
            self,
            Self::ParseArgv | Self::Isolated | Self::UseEnvironment | Self::DevMode
        )
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Factory producing a builtin module instance.
pub type ModuleFactory = Box<dyn Fn() -> Box<dyn Any> + Send>;

/// A builtin module registered with a handle.
///
/// Registration never calls the factory; the runtime does, once its import
/// system is up.
pub struct BuiltinModule {
    name: String,
    factory: ModuleFactory,
}

impl BuiltinModule {
    pub(crate) fn new(name: String, factory: ModuleFactory) -> Self {
        Self { name, factory }
    }

    /// The module name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the factory.
    #[must_use]
    pub fn instantiate(&self) -> Box<dyn Any> {
        (self.factory)()
    }
}

impl fmt::Debug for BuiltinModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltinModule")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
