//! Name-addressed access to a configuration.
//!
//! [`ConfigHandle`] wraps a [`PreConfig`] and a [`Config`] behind string
//! keys so that an embedder can drive configuration from data (a settings
//! file, another language's bindings) instead of struct fields.
//!
//! # Examples
//!
//! ```
//! use ember_init::handle::ConfigHandle;
//! use ember_init::Snapshot;
//!
//! let mut handle = ConfigHandle::new();
//! handle.set_str("home", "/opt/ember").unwrap();
//! handle.set_int("optimization_level", 2).unwrap();
//! handle.set_str_list("argv", &["ember", "-c", "pass"]).unwrap();
//! handle.commit_with(&Snapshot::empty()).unwrap();
//!
//! assert_eq!(handle.get_int("optimization_level").unwrap(), Some(2));
//! assert_eq!(handle.get_str("run_command").unwrap().as_deref(), Some("pass\n"));
//! assert!(handle.set_int("verbose", 1).is_err());
//! ```

pub mod registry;

use std::any::Any;

use crate::config::{Config, CpuCount};
use crate::error::{Error, Result};
use crate::path::{FileProbe, InstallLayout, OsProbe};
use crate::preconfig::{Allocator, PreConfig};
use crate::snapshot::Snapshot;
use crate::startup;
use crate::status::Status;
use crate::string_list::StringList;

pub use registry::{BuiltinModule, ConfigKey, ModuleFactory, OptionKind};

/// A mutable view of one integer-valued field.
enum IntSlot<'a> {
    Bool(&'a mut Option<bool>),
    I32(&'a mut Option<i32>),
    Digits(&'a mut Option<i32>),
    U64(&'a mut Option<u64>),
    Cpu(&'a mut Option<CpuCount>),
    Alloc(&'a mut Option<Allocator>),
}

impl IntSlot<'_> {
    fn get(&self) -> Option<i64> {
        match self {
            Self::Bool(slot) => slot.map(i64::from),
            Self::I32(slot) | Self::Digits(slot) => slot.map(i64::from),
            Self::U64(slot) => slot.and_then(|v| i64::try_from(v).ok()),
            Self::Cpu(slot) => slot.map(CpuCount::as_i64),
            Self::Alloc(slot) => slot.map(Allocator::code),
        }
    }

    fn set(self, name: &str, value: i64) -> Result<()> {
        let out_of_storage = || Error::invalid_value(name, format!("{value} does not fit"));
        match self {
            Self::Bool(slot) => *slot = Some(value != 0),
            Self::I32(slot) => *slot = Some(i32::try_from(value).map_err(|_| out_of_storage())?),
            Self::Digits(slot) => {
                // -1 restores the default limit
                *slot = if value == -1 {
                    None
                } else {
                    Some(i32::try_from(value).map_err(|_| out_of_storage())?)
                };
            }
            Self::U64(slot) => *slot = Some(u64::try_from(value).map_err(|_| out_of_storage())?),
            Self::Cpu(slot) => {
                *slot = Some(match value {
                    -1 => CpuCount::Default,
                    n if n > 0 => CpuCount::Fixed(u32::try_from(n).map_err(|_| out_of_storage())?),
                    _ => {
                        return Err(Error::invalid_value(
                            name,
                            "expected -1 (default) or a positive count",
                        ))
                    }
                });
            }
            Self::Alloc(slot) => {
                *slot = Some(Allocator::from_code(value).ok_or_else(|| {
                    Error::invalid_value(name, format!("unknown allocator code {value}"))
                })?);
            }
        }
        Ok(())
    }
}

/// A configuration addressed by option name.
///
/// Every operation records a [`Status`] that [`ConfigHandle::status`],
/// [`ConfigHandle::get_error`] and [`ConfigHandle::get_exit_code`] report.
/// After a successful [`ConfigHandle::commit`] the handle is read-only.
#[derive(Debug)]
pub struct ConfigHandle {
    pre: PreConfig,
    config: Config,
    status: Status,
    modules: Vec<BuiltinModule>,
    committed: bool,
}

impl Default for ConfigHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigHandle {
    /// A handle over the standard presets.
    #[must_use]
    pub fn new() -> Self {
        Self::from_parts(PreConfig::standard(), Config::standard())
    }

    /// A handle over the isolated presets.
    #[must_use]
    pub fn isolated() -> Self {
        Self::from_parts(PreConfig::isolated(), Config::isolated())
    }

    /// A handle over records the caller already built.
    #[must_use]
    pub fn from_parts(pre: PreConfig, config: Config) -> Self {
        Self {
            pre,
            config,
            status: Status::ok(),
            modules: Vec::new(),
            committed: false,
        }
    }

    /// Every option name, in registry order.
    pub fn names() -> impl Iterator<Item = &'static str> {
        ConfigKey::ALL.iter().map(|key| key.name())
    }

    /// Whether `name` is a known option.
    #[must_use]
    pub fn has_option(&self, name: &str) -> bool {
        ConfigKey::from_name(name).is_some()
    }

    /// Read an integer or boolean option; `None` means unset.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidName`] for an unknown name and
    /// [`Error::TypeMismatch`] for a non-integer option.
    pub fn get_int(&mut self, name: &str) -> Result<Option<i64>> {
        let result = self
            .lookup(name, OptionKind::Int)
            .and_then(|key| Ok(self.int_slot(name, key)?.get()));
        self.record("get_int", result)
    }

    /// Read a string option; `None` means unset.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidName`] for an unknown name and
    /// [`Error::TypeMismatch`] for a non-string option.
    pub fn get_str(&mut self, name: &str) -> Result<Option<String>> {
        let result = self
            .lookup(name, OptionKind::Str)
            .and_then(|key| Ok(self.str_slot(name, key)?.clone()));
        self.record("get_str", result)
    }

    /// Read a string-list option as an owned copy.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidName`] for an unknown name and
    /// [`Error::TypeMismatch`] for a non-list option.
    pub fn get_str_list(&mut self, name: &str) -> Result<Vec<String>> {
        let result = self
            .lookup(name, OptionKind::StrList)
            .and_then(|key| Ok(self.list_slot(name, key)?.clone().into_vec()));
        self.record("get_str_list", result)
    }

    /// Set an integer or boolean option. Booleans treat non-zero as true.
    ///
    /// # Errors
    ///
    /// [`Error::AlreadyCommitted`] after a commit, the lookup errors of
    /// [`ConfigHandle::get_int`], and [`Error::InvalidValue`] when the
    /// value does not fit the option's storage.
    pub fn set_int(&mut self, name: &str, value: i64) -> Result<()> {
        let result = self.ensure_mutable().and_then(|()| {
            let key = self.lookup(name, OptionKind::Int)?;
            self.int_slot(name, key)?.set(name, value)?;
            if key.is_shared() {
                self.write_shared(key, value != 0);
            }
            Ok(())
        });
        self.record("set_int", result)
    }

    /// Set a string option.
    ///
    /// Setting one of `run_command`, `run_module` or `run_filename` clears
    /// the other two.
    ///
    /// # Errors
    ///
    /// [`Error::AlreadyCommitted`] after a commit, and the lookup errors of
    /// [`ConfigHandle::get_str`].
    pub fn set_str(&mut self, name: &str, value: &str) -> Result<()> {
        let result = self.ensure_mutable().and_then(|()| {
            let key = self.lookup(name, OptionKind::Str)?;
            if matches!(
                key,
                ConfigKey::RunCommand | ConfigKey::RunModule | ConfigKey::RunFilename
            ) {
                self.config.run_command = None;
                self.config.run_module = None;
                self.config.run_filename = None;
            }
            *self.str_slot(name, key)? = Some(value.to_string());
            Ok(())
        });
        self.record("set_str", result)
    }

    /// Replace a string-list option with a copy of `values`.
    ///
    /// # Errors
    ///
    /// [`Error::AlreadyCommitted`] after a commit, and the lookup errors of
    /// [`ConfigHandle::get_str_list`].
    pub fn set_str_list<S: AsRef<str>>(&mut self, name: &str, values: &[S]) -> Result<()> {
        let result = self.ensure_mutable().and_then(|()| {
            let key = self.lookup(name, OptionKind::StrList)?;
            *self.list_slot(name, key)? = StringList::from_raw(values);
            Ok(())
        });
        self.record("set_str_list", result)
    }

    /// Register a builtin module. The factory is stored, not called.
    ///
    /// # Errors
    ///
    /// [`Error::AlreadyCommitted`] after a commit, and
    /// [`Error::InvalidValue`] for an empty or already registered name.
    pub fn add_module<F>(&mut self, name: &str, factory: F) -> Result<()>
    where
        F: Fn() -> Box<dyn Any> + Send + 'static,
    {
        let result = self.ensure_mutable().and_then(|()| {
            if name.is_empty() {
                return Err(Error::invalid_value("module", "name must not be empty"));
            }
            if self.modules.iter().any(|module| module.name() == name) {
                return Err(Error::invalid_value(
                    "module",
                    format!("'{name}' is already registered"),
                ));
            }
            self.modules
                .push(BuiltinModule::new(name.to_string(), Box::new(factory)));
            Ok(())
        });
        self.record("add_module", result)
    }

    /// Registered builtin modules, in registration order.
    #[must_use]
    pub fn modules(&self) -> &[BuiltinModule] {
        &self.modules
    }

    /// Resolve against the live process environment.
    ///
    /// # Errors
    ///
    /// See [`ConfigHandle::commit_in`].
    pub fn commit(&mut self) -> Result<()> {
        self.commit_with(&Snapshot::capture())
    }

    /// Resolve against `snapshot` on the native layout and filesystem.
    ///
    /// # Errors
    ///
    /// See [`ConfigHandle::commit_in`].
    pub fn commit_with(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.commit_in(snapshot, &InstallLayout::native(), &OsProbe)
    }

    /// Resolve clones of both records. The handle keeps its previous values
    /// unless resolution succeeds.
    ///
    /// # Errors
    ///
    /// [`Error::AlreadyCommitted`] after a successful commit, and any
    /// resolution error, including [`Error::Exit`] for help, version and
    /// usage requests found in `argv`.
    pub fn commit_in(
        &mut self,
        snapshot: &Snapshot,
        layout: &InstallLayout,
        probe: &dyn FileProbe,
    ) -> Result<()> {
        let result = self.ensure_mutable().and_then(|()| {
            let mut pre = self.pre.clone();
            let mut config = self.config.clone();
            startup::resolve_startup_with(&mut pre, &mut config, snapshot, layout, probe)?;
            self.pre = pre;
            self.config = config;
            self.committed = true;
            Ok(())
        });
        self.record("commit", result)
    }

    /// Whether a commit has succeeded.
    #[must_use]
    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// The status of the last operation.
    #[must_use]
    pub fn status(&self) -> &Status {
        &self.status
    }

    /// The error message of the last operation, if it failed.
    #[must_use]
    pub fn get_error(&self) -> Option<&str> {
        self.status.message()
    }

    /// The exit code of the last operation, if it asked to exit.
    #[must_use]
    pub fn get_exit_code(&self) -> Option<i32> {
        self.status.exit_code()
    }

    /// The pre-configuration.
    #[must_use]
    pub fn preconfig(&self) -> &PreConfig {
        &self.pre
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Consume the handle, returning both records.
    #[must_use]
    pub fn into_parts(self) -> (PreConfig, Config) {
        (self.pre, self.config)
    }

    fn record<T>(&mut self, func: &str, result: Result<T>) -> Result<T> {
        self.status = Status::from_result(func, &result);
        if let Err(ref err) = result {
            log::debug!("{func} failed: {err}");
        }
        result
    }

    fn ensure_mutable(&self) -> Result<()> {
        if self.committed {
            Err(Error::AlreadyCommitted)
        } else {
            Ok(())
        }
    }

    fn lookup(&self, name: &str, expected: OptionKind) -> Result<ConfigKey> {
        let key = ConfigKey::from_name(name).ok_or_else(|| Error::InvalidName {
            name: name.to_string(),
        })?;
        if key.kind() != expected {
            return Err(mismatch(name, key, expected));
        }
        Ok(key)
    }

    /// Mirror a shared key into the pre-configuration.
    fn write_shared(&mut self, key: ConfigKey, value: bool) {
        let slot = match key {
            ConfigKey::ParseArgv => &mut self.pre.parse_argv,
            ConfigKey::Isolated => &mut self.pre.isolated,
            ConfigKey::UseEnvironment => &mut self.pre.use_environment,
            ConfigKey::DevMode => &mut self.pre.dev_mode,
            _ => return,
        };
        *slot = Some(value);
    }

    fn int_slot(&mut self, name: &str, key: ConfigKey) -> Result<IntSlot<'_>> {
        use ConfigKey as K;
        use IntSlot::{Alloc, Bool, Cpu, Digits, I32, U64};

        let pre = &mut self.pre;
        let c = &mut self.config;
        let slot = match key {
            K::Allocator => Alloc(&mut pre.allocator),
            K::Utf8Mode => Bool(&mut pre.utf8_mode),
            K::ConfigureLocale => Bool(&mut pre.configure_locale),
            K::CoerceCLocale => Bool(&mut pre.coerce_c_locale),
            K::CoerceCLocaleWarn => Bool(&mut pre.coerce_c_locale_warn),
            K::LegacyWindowsFsEncoding => Bool(&mut pre.platform.legacy_windows_fs_encoding),

            K::ParseArgv => Bool(&mut c.parse_argv),
            K::Isolated => Bool(&mut c.isolated),
            K::UseEnvironment => Bool(&mut c.use_environment),
            K::DevMode => Bool(&mut c.dev_mode),

            K::InstallSignalHandlers => Bool(&mut c.install_signal_handlers),
            K::UseHashSeed => Bool(&mut c.use_hash_seed),
            K::HashSeed => U64(&mut c.hash_seed),
            K::Faulthandler => Bool(&mut c.faulthandler),
            K::Tracemalloc => I32(&mut c.tracemalloc),
            K::PerfProfiling => Bool(&mut c.perf_profiling),
            K::ImportTime => I32(&mut c.import_time),
            K::CodeDebugRanges => Bool(&mut c.code_debug_ranges),
            K::ShowRefCount => Bool(&mut c.show_ref_count),
            K::DumpRefs => Bool(&mut c.dump_refs),
            K::MallocStats => Bool(&mut c.malloc_stats),
            K::SiteImport => Bool(&mut c.site_import),
            K::BytesWarning => I32(&mut c.bytes_warning),
            K::WarnDefaultEncoding => Bool(&mut c.warn_default_encoding),
            K::Inspect => Bool(&mut c.inspect),
            K::Interactive => Bool(&mut c.interactive),
            K::OptimizationLevel => I32(&mut c.optimization_level),
            K::ParserDebug => Bool(&mut c.parser_debug),
            K::WriteBytecode => Bool(&mut c.write_bytecode),
            K::Verbose => I32(&mut c.verbose),
            K::Quiet => Bool(&mut c.quiet),
            K::UserSiteDirectory => Bool(&mut c.user_site_directory),
            K::ConfigureCStdio => Bool(&mut c.configure_c_stdio),
            K::BufferedStdio => Bool(&mut c.buffered_stdio),
            K::UseFrozenModules => Bool(&mut c.use_frozen_modules),
            K::SafePath => Bool(&mut c.safe_path),
            K::IntMaxStrDigits => Digits(&mut c.int_max_str_digits),
            K::ThreadInheritContext => Bool(&mut c.thread_inherit_context),
            K::ContextAwareWarnings => Bool(&mut c.context_aware_warnings),
            K::CpuCount => Cpu(&mut c.cpu_count),
            K::PathconfigWarnings => Bool(&mut c.pathconfig_warnings),
            K::ModuleSearchPathsSet => Bool(&mut c.module_search_paths_set),
            K::SkipSourceFirstLine => Bool(&mut c.skip_source_first_line),
            K::LegacyWindowsStdio => Bool(&mut c.platform.legacy_windows_stdio),
            K::UseSystemLogger => Bool(&mut c.platform.use_system_logger),
            K::EnableGil => Bool(&mut c.platform.enable_gil),
            K::TlbcEnabled => Bool(&mut c.platform.tlbc_enabled),

            _ => return Err(mismatch(name, key, OptionKind::Int)),
        };
        Ok(slot)
    }

    fn str_slot(&mut self, name: &str, key: ConfigKey) -> Result<&mut Option<String>> {
        use ConfigKey as K;

        let c = &mut self.config;
        let slot = match key {
            K::FilesystemEncoding => &mut c.filesystem_encoding,
            K::FilesystemErrors => &mut c.filesystem_errors,
            K::CachePrefix => &mut c.cache_prefix,
            K::DumpRefsFile => &mut c.dump_refs_file,
            K::StdioEncoding => &mut c.stdio_encoding,
            K::StdioErrors => &mut c.stdio_errors,
            K::CheckHashCacheMode => &mut c.check_hash_cache_mode,
            K::ProgramName => &mut c.program_name,
            K::PathEnv => &mut c.path_env,
            K::Home => &mut c.home,
            K::Platlibdir => &mut c.platlibdir,
            K::StdlibDir => &mut c.stdlib_dir,
            K::Executable => &mut c.executable,
            K::BaseExecutable => &mut c.base_executable,
            K::Prefix => &mut c.prefix,
            K::BasePrefix => &mut c.base_prefix,
            K::ExecPrefix => &mut c.exec_prefix,
            K::BaseExecPrefix => &mut c.base_exec_prefix,
            K::RunCommand => &mut c.run_command,
            K::RunModule => &mut c.run_module,
            K::RunFilename => &mut c.run_filename,
            _ => return Err(mismatch(name, key, OptionKind::Str)),
        };
        Ok(slot)
    }

    fn list_slot(&mut self, name: &str, key: ConfigKey) -> Result<&mut StringList> {
        use ConfigKey as K;

        let c = &mut self.config;
        let slot = match key {
            K::Argv => &mut c.argv,
            K::OrigArgv => &mut c.orig_argv,
            K::Xoptions => &mut c.xoptions,
            K::Warnoptions => &mut c.warnoptions,
            K::ModuleSearchPaths => &mut c.module_search_paths,
            _ => return Err(mismatch(name, key, OptionKind::StrList)),
        };
        Ok(slot)
    }
}

fn mismatch(name: &str, key: ConfigKey, expected: OptionKind) -> Error {
    Error::TypeMismatch {
        name: name.to_string(),
        expected: expected.name(),
        found: key.kind().name(),
    }
}
